// Cross-platform color matching utilities
// Keeps the board palette consistent across terminal color capabilities

use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Adjust an ANSI-16 color for the current terminal: truecolor
/// terminals get the Windows Terminal "Campbell" RGB sample, 256-color
/// terminals a stable indexed fallback, everything else the plain ANSI
/// variant. Colors outside the palette pass through untouched.
pub fn adjust(color: Color) -> Color {
    let support = ColorSupport::stdout();

    // (R, G, B) sample and ANSI-256 index per palette entry
    let (rgb, index256) = match color {
        Color::Black => ((12, 12, 12), 232),
        Color::Red => ((197, 15, 31), 160),
        Color::Green => ((19, 161, 14), 28),
        Color::Yellow => ((193, 156, 0), 178),
        Color::Blue => ((0, 55, 218), 20),
        Color::Magenta => ((136, 23, 152), 90),
        Color::Cyan => ((58, 150, 221), 38),
        Color::Gray => ((204, 204, 204), 250),
        Color::DarkGray => ((118, 118, 118), 243),
        Color::LightBlue => ((59, 120, 255), 63),
        Color::White => ((242, 242, 242), 255),
        _ => return color,
    };

    if support.has_16m {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    } else if support.has_256 {
        Color::Indexed(index256)
    } else {
        color
    }
}

/// Classic per-count digit colors for revealed cells (1-8).
pub fn number_color(count: u8) -> Color {
    let base = match count {
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Red,
        4 => Color::Magenta,
        5 => Color::Yellow,
        6 => Color::Cyan,
        7 => Color::Black,
        _ => Color::DarkGray,
    };
    adjust(base)
}
