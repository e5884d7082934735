// Terminal UI rendering and event handling
// Raw-mode lifecycle, the frame loop, and key dispatch into the game engine

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::Duration;

use crate::xtm_color::{adjust, number_color};
use crate::xtm_game::{CellView, Game, GameConfig};
use unicode_width::UnicodeWidthStr;

// Centralized menu/key items (key, rest). Esc lives in the status row.
const MENU_ITEMS: [(&str, &str); 2] = [("F1", "Help"), ("F2", "New")];

/// Board glyph set; the ASCII variant is the fallback for terminals
/// without the default icons.
struct Glyphs {
    hidden: &'static str,
    flag: &'static str,
    bomb: &'static str,
}

impl Glyphs {
    fn new(ascii: bool) -> Self {
        if ascii {
            Glyphs { hidden: ".", flag: "F", bomb: "*" }
        } else {
            Glyphs { hidden: "■", flag: "⚑", bomb: "☼" }
        }
    }
}

// Centralized board colors, adjusted once for the terminal
struct Palette {
    board_bg: Color,
    cursor_bg: Color,
    hidden_fg: Color,
    flag_fg: Color,
    bomb_fg: Color,
    key_fg: Color,
}

impl Palette {
    fn new() -> Self {
        Palette {
            board_bg: adjust(Color::DarkGray),
            cursor_bg: adjust(Color::LightBlue),
            hidden_fg: adjust(Color::Gray),
            flag_fg: adjust(Color::Red),
            bomb_fg: adjust(Color::Black),
            key_fg: adjust(Color::Yellow),
        }
    }
}

// Group runtime UI variables into a single structure to simplify passing them around
#[derive(Debug, Default)]
struct UiState {
    showing_help: bool,
    showing_win: bool,
    showing_loss: bool,
}

/// Enter raw mode and the alternate screen, run the game loop, and
/// restore the terminal whether the loop finished cleanly or not.
pub fn run(cfg: GameConfig, ascii_icons: bool) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, cfg, ascii_icons);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: GameConfig,
    ascii_icons: bool,
) -> Result<(), Box<dyn Error>> {
    let mut game = Game::new(cfg)?;
    let mut ui = UiState::default();
    let glyphs = Glyphs::new(ascii_icons);
    let palette = Palette::new();
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| draw_frame(f, &game, &ui, &glyphs, &palette))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. }) => {
                if ui.showing_help {
                    // any key closes the help modal
                    ui.showing_help = false;
                } else if ui.showing_win || ui.showing_loss {
                    match code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        _ => {
                            game = Game::new(cfg)?;
                            ui = UiState::default();
                        }
                    }
                } else {
                    match code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
                        KeyCode::F(1) => ui.showing_help = true,
                        KeyCode::F(2) => {
                            game = Game::new(cfg)?;
                            ui = UiState::default();
                        }
                        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                            game.step_cursor(-1, 0)
                        }
                        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                            game.step_cursor(1, 0)
                        }
                        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                            game.step_cursor(0, -1)
                        }
                        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                            game.step_cursor(0, 1)
                        }
                        KeyCode::Char(' ') | KeyCode::Enter => {
                            let (r, c) = game.cursor();
                            game.reveal(r, c);
                            if game.is_lost() {
                                ui.showing_loss = true;
                            } else if game.is_won() {
                                ui.showing_win = true;
                            }
                        }
                        KeyCode::Char('f') | KeyCode::Char('F') => {
                            let (r, c) = game.cursor();
                            game.toggle_flag(r, c);
                            // flagging the last bomb can be the winning move
                            if game.is_won() {
                                ui.showing_win = true;
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn draw_frame<B: Backend>(
    f: &mut Frame<B>,
    game: &Game,
    ui: &UiState,
    glyphs: &Glyphs,
    palette: &Palette,
) {
    let size = f.size();
    let min_twidth = ((game.cols() * 2 + 7) as u16).max(46);
    let min_theight = (game.rows() + 8) as u16;
    // If terminal too small, render a centered warning and skip normal UI
    if size.width < min_twidth || size.height < min_theight {
        let warn_lines = vec![
            Spans::from(Span::raw("Terminal size too small.")),
            Spans::from(Span::raw(format!(
                "Minimum required: {} x {}",
                min_twidth, min_theight
            ))),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
            .alignment(Alignment::Center);
        f.render_widget(Clear, size);
        let w = 40u16.min(size.width.saturating_sub(2));
        let h = 5u16.min(size.height.saturating_sub(2));
        f.render_widget(warn, center_rect(w, h, size));
        return;
    }

    // layout: top menu row, center board, bottom status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
        .split(size);

    // menu row
    let mut menu_spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, rest)) in MENU_ITEMS.iter().enumerate() {
        if i > 0 {
            menu_spans.push(Span::raw("   "));
        }
        menu_spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(palette.key_fg).add_modifier(Modifier::BOLD),
        ));
        menu_spans.push(Span::raw(format!(": {}", rest)));
    }
    menu_spans.push(Span::raw(" "));
    let menu = Paragraph::new(Spans::from(menu_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(menu, chunks[0]);

    // status row (per-frame counts on the left, right-aligned Esc: Exit)
    let left_text = format!(
        " Bombs: {}   Opened: {}   Flagged: {} ",
        game.bombs(),
        game.opened_count(),
        game.flagged_count()
    );
    let inner_w = chunks[2].width.saturating_sub(2) as usize;
    let left_w = left_text.as_str().width();
    // account for the ": " between the right-hand key and its label
    let right_w = "Esc".width() + 2 + "Exit".width();
    let mid_spaces = if inner_w > left_w + right_w + 1 {
        inner_w - left_w - right_w - 1
    } else {
        1
    };
    let status_spans = vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(mid_spaces)),
        Span::styled(
            "Esc".to_string(),
            Style::default().fg(palette.key_fg).add_modifier(Modifier::BOLD),
        ),
        Span::raw(": Exit "),
    ];
    let status = Paragraph::new(Text::from(Spans::from(status_spans)))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);
    f.render_widget(status, chunks[2]);

    // board area
    let board_area = center_rect(
        (game.cols() * 2 + 3) as u16,
        (game.rows() + 2) as u16,
        chunks[1],
    );
    let mut lines = vec![];
    for r in 0..game.rows() {
        let mut spans = vec![];
        for c in 0..game.cols() {
            let (s, mut style) = match game.view(r, c) {
                CellView::Hidden => (
                    glyphs.hidden.to_string(),
                    Style::default().fg(palette.hidden_fg).bg(palette.board_bg),
                ),
                CellView::Flagged => (
                    glyphs.flag.to_string(),
                    Style::default().fg(palette.flag_fg).bg(palette.board_bg),
                ),
                CellView::Open { bomb: true, .. } => (
                    glyphs.bomb.to_string(),
                    Style::default().fg(palette.bomb_fg).bg(palette.board_bg),
                ),
                CellView::Open { bomb: false, neighbors: 0 } => {
                    (" ".to_string(), Style::default().bg(palette.board_bg))
                }
                CellView::Open { bomb: false, neighbors } => (
                    format!("{}", neighbors),
                    Style::default().fg(number_color(neighbors)).bg(palette.board_bg),
                ),
            };
            if game.cursor() == (r, c) {
                style = style.bg(palette.cursor_bg);
            }
            spans.push(Span::styled(format!(" {}", s), style));
        }
        // one-character padding column so the right edge keeps the board background
        spans.push(Span::styled(" ", Style::default().bg(palette.board_bg)));
        lines.push(Spans::from(spans));
    }
    let title = format!("{}x{}", game.cols(), game.rows());
    let board = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_alignment(Alignment::Center),
        )
        .alignment(Alignment::Left);
    f.render_widget(board, board_area);

    // modals
    if ui.showing_help {
        draw_help(f, size);
    } else if ui.showing_win {
        draw_outcome(f, size, true);
    } else if ui.showing_loss {
        draw_outcome(f, size, false);
    }
}

fn draw_help<B: Backend>(f: &mut Frame<B>, size: Rect) {
    let lines = vec![
        Spans::from(Span::raw("")),
        Spans::from(Span::raw("  Arrows / WASD   move the cursor")),
        Spans::from(Span::raw("  Space / Enter   reveal at the cursor")),
        Spans::from(Span::raw("  F               flag / unflag")),
        Spans::from(Span::raw("  F2              new game")),
        Spans::from(Span::raw("  Esc / Q         exit")),
        Spans::from(Span::raw("")),
        Spans::from(Span::raw("  Press any key to close")),
    ];
    let w = 44u16.min(size.width.saturating_sub(2));
    let h = (lines.len() as u16 + 2).min(size.height.saturating_sub(2));
    let rect = center_rect(w, h, size);
    f.render_widget(Clear, rect);
    let para = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .alignment(Alignment::Left);
    f.render_widget(para, rect);
}

fn draw_outcome<B: Backend>(f: &mut Frame<B>, size: Rect, won: bool) {
    let (title, message) = if won {
        ("You won!", "All bombs flagged and every safe cell opened.")
    } else {
        ("You lost!", "You opened a bomb.")
    };
    let lines = vec![
        Spans::from(Span::raw("")),
        Spans::from(Span::raw(message)),
        Spans::from(Span::raw("")),
        Spans::from(Span::raw("Any key: new game    Esc: exit")),
    ];
    let w = 52u16.min(size.width.saturating_sub(2));
    let h = (lines.len() as u16 + 2).min(size.height.saturating_sub(2));
    let rect = center_rect(w, h, size);
    f.render_widget(Clear, rect);
    let para = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center);
    f.render_widget(para, rect);
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
