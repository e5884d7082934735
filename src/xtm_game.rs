// Core game logic
// Handles the board, cursor, bomb seeding, flood reveal and win/loss state

use rand::prelude::*;
use std::collections::VecDeque;
use thiserror::Error;

/// Bombs are never seeded within this Manhattan distance of the first
/// reveal, so the opening move is always safe.
const SAFE_RADIUS: usize = 2;

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0), // above
    (1, 0),  // below
    (0, -1), // left
    (0, 1),  // right
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("rows and cols must be positive")]
    InvalidDimensions,
    #[error("too many bombs: {requested} requested, at most {max} fit outside the safe zone")]
    TooManyBombs { requested: usize, max: usize },
    #[error("bomb position outside the board")]
    InvalidCoords,
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Board parameters, fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub bombs: usize,
}

impl GameConfig {
    /// Reject configurations a game cannot be played with: zero
    /// dimensions, or a bomb count that could leave the seeder without
    /// enough eligible cells for some first-reveal position.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let max = Self::max_bombs(self.rows, self.cols);
        if self.bombs > max {
            return Err(GameError::TooManyBombs {
                requested: self.bombs,
                max,
            });
        }
        Ok(())
    }

    /// Largest bomb count that leaves at least the safe zone free for
    /// any anchor cell the first reveal might pick.
    pub fn max_bombs(rows: usize, cols: usize) -> usize {
        let mut largest_zone = 0;
        for r in 0..rows {
            for c in 0..cols {
                largest_zone = largest_zone.max(safe_zone_size(rows, cols, (r, c)));
            }
        }
        rows * cols - largest_zone
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cell {
    bomb: bool,
    opened: bool,
    flagged: bool,
    neighbors: u8, // adjacent bomb count (0-8)
}

/// What the render layer is allowed to know about a cell: bombs and
/// counts are only exposed once the cell is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Open { bomb: bool, neighbors: u8 },
}

/// Main game state
///
/// The board starts empty; bombs are seeded on the first reveal so the
/// opening move can never lose (safe first click). `game_over` encodes
/// the phase: `None` while playing, `Some(true)` won, `Some(false)` lost.
#[derive(Debug, Clone)]
pub struct Game {
    cfg: GameConfig,
    cells: Vec<Cell>,
    cursor: (usize, usize),
    seeded: bool,
    game_over: Option<bool>,
}

impl Game {
    /// Create a new game with all cells hidden and the cursor at the
    /// board center. Fails on an invalid configuration.
    pub fn new(cfg: GameConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Game {
            cfg,
            cells: vec![Cell::default(); cfg.rows * cfg.cols],
            cursor: (cfg.rows / 2, cfg.cols / 2),
            seeded: false,
            game_over: None,
        })
    }

    /// Build an already-seeded game from an explicit bomb layout.
    /// Duplicate coordinates collapse; the bomb count is derived from
    /// the layout.
    pub fn with_bombs(rows: usize, cols: usize, bombs: &[(usize, usize)]) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let mut game = Game {
            cfg: GameConfig { rows, cols, bombs: 0 },
            cells: vec![Cell::default(); rows * cols],
            cursor: (rows / 2, cols / 2),
            seeded: true,
            game_over: None,
        };
        for &(r, c) in bombs {
            if r >= rows || c >= cols {
                return Err(GameError::InvalidCoords);
            }
            let idx = game.index(r, c);
            if game.cells[idx].bomb {
                continue;
            }
            game.cells[idx].bomb = true;
            for (nr, nc) in game.neighbors(r, c) {
                let i = game.index(nr, nc);
                game.cells[i].neighbors += 1;
            }
        }
        game.cfg.bombs = game.cells.iter().filter(|cell| cell.bomb).count();
        Ok(game)
    }

    pub fn rows(&self) -> usize {
        self.cfg.rows
    }

    pub fn cols(&self) -> usize {
        self.cfg.cols
    }

    pub fn bombs(&self) -> usize {
        self.cfg.bombs
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn is_won(&self) -> bool {
        self.game_over == Some(true)
    }

    pub fn is_lost(&self) -> bool {
        self.game_over == Some(false)
    }

    pub fn opened_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.opened).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.flagged).count()
    }

    /// Read-only snapshot of a cell for rendering.
    pub fn view(&self, r: usize, c: usize) -> CellView {
        let cell = self.cells[self.index(r, c)];
        if cell.opened {
            CellView::Open {
                bomb: cell.bomb,
                neighbors: cell.neighbors,
            }
        } else if cell.flagged {
            CellView::Flagged
        } else {
            CellView::Hidden
        }
    }

    /// Move the cursor by a delta, clamped to the board on each axis.
    pub fn step_cursor(&mut self, d_row: isize, d_col: isize) {
        let nr = (self.cursor.0 as isize + d_row).clamp(0, (self.cfg.rows - 1) as isize) as usize;
        let nc = (self.cursor.1 as isize + d_col).clamp(0, (self.cfg.cols - 1) as isize) as usize;
        self.cursor = (nr, nc);
    }

    /// Reveal the cell at (r, c)
    /// - The first reveal seeds bombs, keeping a safe zone around (r, c)
    /// - Opening a flagged cell clears the flag
    /// - A bomb ends the game and exposes every bomb
    /// - A cell with no adjacent bombs flood-opens its region
    pub fn reveal(&mut self, r: usize, c: usize) {
        if self.game_over.is_some() {
            return;
        }
        let idx = self.index(r, c);
        if self.cells[idx].opened {
            return;
        }
        if !self.seeded {
            self.seed_bombs((r, c), &mut thread_rng());
        }
        self.cells[idx].flagged = false;
        self.cells[idx].opened = true;
        if self.cells[idx].bomb {
            self.open_all_bombs();
            self.game_over = Some(false);
            return;
        }
        if self.cells[idx].neighbors == 0 {
            self.flood_open((r, c));
        }
        self.refresh_outcome();
    }

    /// Toggle the flag on an unopened cell; opened cells are left alone.
    pub fn toggle_flag(&mut self, r: usize, c: usize) {
        if self.game_over.is_some() {
            return;
        }
        let idx = self.index(r, c);
        if self.cells[idx].opened {
            return;
        }
        self.cells[idx].flagged = !self.cells[idx].flagged;
        self.refresh_outcome();
    }

    fn index(&self, r: usize, c: usize) -> usize {
        r * self.cfg.cols + c
    }

    fn neighbors(&self, r: usize, c: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (rows, cols) = (self.cfg.rows, self.cfg.cols);
        NEIGHBOR_OFFSETS.into_iter().filter_map(move |(dr, dc)| {
            let nr = r as isize + dr;
            let nc = c as isize + dc;
            (nr >= 0 && nc >= 0 && nr < rows as isize && nc < cols as isize)
                .then(|| (nr as usize, nc as usize))
        })
    }

    /// Randomly place the configured number of bombs, excluding every
    /// cell within `SAFE_RADIUS` Manhattan distance of the anchor, and
    /// bump the neighbor count of each placed bomb's adjacent cells.
    /// Runs exactly once per game; the counts are never recomputed.
    fn seed_bombs<R: Rng>(&mut self, anchor: (usize, usize), rng: &mut R) {
        let (rows, cols) = (self.cfg.rows, self.cfg.cols);
        let mut eligible: Vec<(usize, usize)> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .filter(|&pos| manhattan(pos, anchor) > SAFE_RADIUS)
            .collect();
        let count = self.cfg.bombs.min(eligible.len());
        for _ in 0..count {
            let (r, c) = eligible.swap_remove(rng.gen_range(0..eligible.len()));
            let idx = self.index(r, c);
            self.cells[idx].bomb = true;
            for (nr, nc) in self.neighbors(r, c) {
                let i = self.index(nr, nc);
                self.cells[i].neighbors += 1;
            }
        }
        self.seeded = true;
    }

    /// Open the connected zero-neighbor region around `origin` plus its
    /// numbered border. Worklist instead of recursion; already-opened,
    /// flagged and bomb cells stop the flood locally.
    fn flood_open(&mut self, origin: (usize, usize)) {
        let mut pending = VecDeque::from([origin]);
        while let Some((r, c)) = pending.pop_front() {
            for (nr, nc) in self.neighbors(r, c) {
                let i = self.index(nr, nc);
                let cell = &mut self.cells[i];
                if cell.opened || cell.flagged || cell.bomb {
                    continue;
                }
                cell.opened = true;
                if cell.neighbors == 0 {
                    pending.push_back((nr, nc));
                }
            }
        }
    }

    fn open_all_bombs(&mut self) {
        for cell in &mut self.cells {
            if cell.bomb {
                cell.opened = true;
            }
        }
    }

    /// Won when every bomb is flagged and every other cell is opened.
    /// A flag sitting on a safe cell therefore never counts toward a win.
    fn refresh_outcome(&mut self) {
        if self.game_over.is_some() {
            return;
        }
        let won = self
            .cells
            .iter()
            .all(|cell| if cell.bomb { cell.flagged } else { cell.opened });
        if won {
            self.game_over = Some(true);
        }
    }
}

fn manhattan((r1, c1): (usize, usize), (r2, c2): (usize, usize)) -> usize {
    r1.abs_diff(r2) + c1.abs_diff(c2)
}

/// Number of cells within `SAFE_RADIUS` Manhattan distance of `anchor`,
/// clipped at the board edges (the anchor itself included).
fn safe_zone_size(rows: usize, cols: usize, anchor: (usize, usize)) -> usize {
    let mut count = 0;
    for dr in -(SAFE_RADIUS as isize)..=(SAFE_RADIUS as isize) {
        let r = anchor.0 as isize + dr;
        if r < 0 || r >= rows as isize {
            continue;
        }
        let span = SAFE_RADIUS as isize - dr.abs();
        let lo = (anchor.1 as isize - span).max(0);
        let hi = (anchor.1 as isize + span).min(cols as isize - 1);
        if hi >= lo {
            count += (hi - lo + 1) as usize;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    fn game(rows: usize, cols: usize, bombs: usize) -> Game {
        Game::new(GameConfig { rows, cols, bombs }).unwrap()
    }

    #[test]
    fn neighbor_counts_match_adjacent_bombs() {
        for seed in 0..16 {
            let mut game = game(9, 7, 10);
            game.seed_bombs((4, 3), &mut SmallRng::seed_from_u64(seed));
            for r in 0..9 {
                for c in 0..7 {
                    let expected = game
                        .neighbors(r, c)
                        .filter(|&(nr, nc)| game.cells[game.index(nr, nc)].bomb)
                        .count();
                    assert_eq!(game.cells[game.index(r, c)].neighbors as usize, expected);
                }
            }
        }
    }

    #[test]
    fn seeding_respects_safe_zone_and_bomb_count() {
        // off-center anchor as well: each delta must be measured against
        // its own axis, not mixed
        for anchor in [(4, 4), (0, 6), (8, 0)] {
            for seed in 0..16 {
                let mut game = game(9, 9, 20);
                game.seed_bombs(anchor, &mut SmallRng::seed_from_u64(seed));
                let mut placed = 0;
                for r in 0..9 {
                    for c in 0..9 {
                        if game.cells[game.index(r, c)].bomb {
                            placed += 1;
                            assert!(manhattan((r, c), anchor) > SAFE_RADIUS);
                        }
                    }
                }
                assert_eq!(placed, 20);
            }
        }
    }

    #[test]
    fn reveal_is_idempotent_on_an_opened_cell() {
        let mut game = Game::with_bombs(3, 3, &[(2, 2)]).unwrap();
        game.reveal(0, 0);
        let before = game.cells.clone();
        game.reveal(0, 0);
        assert_eq!(game.cells, before);
    }

    #[test]
    fn flood_opens_zero_region_and_numbered_border() {
        let mut game = Game::with_bombs(5, 5, &[(4, 4)]).unwrap();
        game.reveal(0, 0);
        // every safe cell opens, the numbered border does not propagate
        // into the bomb
        assert_eq!(game.opened_count(), 24);
        assert_eq!(game.view(4, 4), CellView::Hidden);
        for (r, c) in [(3, 3), (3, 4), (4, 3)] {
            assert_eq!(
                game.view(r, c),
                CellView::Open {
                    bomb: false,
                    neighbors: 1
                }
            );
        }
        // bomb not flagged, so opening everything else is not yet a win
        assert!(!game.is_won());
    }

    #[test]
    fn flood_stops_at_numbered_cells() {
        let mut game = Game::with_bombs(1, 5, &[(0, 2)]).unwrap();
        game.reveal(0, 0);
        assert_eq!(game.view(0, 0), CellView::Open { bomb: false, neighbors: 0 });
        assert_eq!(game.view(0, 1), CellView::Open { bomb: false, neighbors: 1 });
        // the numbered border does not auto-open cells beyond the bomb
        assert_eq!(game.view(0, 3), CellView::Hidden);
        assert_eq!(game.view(0, 4), CellView::Hidden);
        assert_eq!(game.opened_count(), 2);
    }

    #[test]
    fn flood_never_opens_flagged_cells() {
        let mut game = Game::with_bombs(5, 5, &[]).unwrap();
        game.toggle_flag(2, 2);
        game.reveal(0, 0);
        assert_eq!(game.view(2, 2), CellView::Flagged);
        assert_eq!(game.opened_count(), 24);
        // the flagged safe cell is neither opened nor a bomb: no win
        assert!(!game.is_won());
    }

    #[test]
    fn toggle_flag_is_self_inverse_and_skips_opened_cells() {
        let mut game = Game::with_bombs(2, 2, &[(1, 1)]).unwrap();
        game.toggle_flag(0, 0);
        assert_eq!(game.view(0, 0), CellView::Flagged);
        game.toggle_flag(0, 0);
        assert_eq!(game.view(0, 0), CellView::Hidden);

        game.reveal(0, 0);
        game.toggle_flag(0, 0);
        assert_eq!(game.view(0, 0), CellView::Open { bomb: false, neighbors: 1 });
        assert_eq!(game.flagged_count(), 0);
    }

    #[test]
    fn reveal_clears_an_existing_flag() {
        let mut game = Game::with_bombs(2, 2, &[(1, 1)]).unwrap();
        game.toggle_flag(0, 0);
        game.reveal(0, 0);
        assert_eq!(game.view(0, 0), CellView::Open { bomb: false, neighbors: 1 });
        assert_eq!(game.flagged_count(), 0);
    }

    #[test]
    fn cursor_never_leaves_the_board() {
        let mut game = game(4, 6, 0);
        assert_eq!(game.cursor(), (2, 3));
        game.step_cursor(-10, 0);
        assert_eq!(game.cursor(), (0, 3));
        game.step_cursor(0, -10);
        assert_eq!(game.cursor(), (0, 0));
        game.step_cursor(10, 10);
        assert_eq!(game.cursor(), (3, 5));
        game.step_cursor(-1, 1);
        assert_eq!(game.cursor(), (2, 5));
    }

    #[test]
    fn first_reveal_is_always_safe() {
        // 5x5 board, one bomb, cursor anchored at the center: the bomb
        // must land at Manhattan distance 3 or more and the opening
        // reveal can never lose
        for _ in 0..100 {
            let mut game = game(5, 5, 1);
            assert_eq!(game.cursor(), (2, 2));
            game.reveal(2, 2);
            assert!(!game.is_lost());
            for r in 0..5 {
                for c in 0..5 {
                    if game.cells[game.index(r, c)].bomb {
                        assert!(manhattan((r, c), (2, 2)) > SAFE_RADIUS);
                    }
                }
            }
        }
    }

    #[test]
    fn zero_bombs_win_on_the_first_reveal() {
        let mut game = game(3, 3, 0);
        let (r, c) = game.cursor();
        game.reveal(r, c);
        assert_eq!(game.opened_count(), 9);
        assert_eq!(game.flagged_count(), 0);
        assert!(game.is_won());
    }

    #[test]
    fn opening_a_bomb_loses_and_exposes_every_bomb() {
        let layout = [(0, 0), (1, 2), (3, 3)];
        let mut game = Game::with_bombs(4, 4, &layout).unwrap();
        game.reveal(1, 2);
        assert!(game.is_lost());
        for (r, c) in layout {
            assert!(matches!(game.view(r, c), CellView::Open { bomb: true, .. }));
        }
    }

    #[test]
    fn win_requires_flags_to_sit_on_bombs() {
        let layout: [(usize, usize); 10] = [
            (0, 0),
            (0, 5),
            (1, 8),
            (2, 3),
            (4, 6),
            (5, 1),
            (6, 9),
            (7, 4),
            (8, 8),
            (9, 2),
        ];

        // flag every bomb, open every safe cell: won
        let mut game = Game::with_bombs(10, 10, &layout).unwrap();
        for &(r, c) in &layout {
            game.toggle_flag(r, c);
        }
        assert!(!game.is_won());
        for r in 0..10 {
            for c in 0..10 {
                if !layout.contains(&(r, c)) {
                    game.reveal(r, c);
                }
            }
        }
        assert!(game.is_won());
        assert!(!game.is_lost());

        // one flag on a safe cell instead: never a win, even with every
        // other safe cell opened
        let mut game = Game::with_bombs(10, 10, &layout).unwrap();
        for &(r, c) in &layout[1..] {
            game.toggle_flag(r, c);
        }
        game.toggle_flag(5, 5);
        for r in 0..10 {
            for c in 0..10 {
                if !layout.contains(&(r, c)) && (r, c) != (5, 5) {
                    game.reveal(r, c);
                }
            }
        }
        assert_eq!(game.flagged_count(), 10);
        assert!(!game.is_won());
        assert!(!game.is_lost());
    }

    #[test]
    fn flagging_the_last_bomb_wins() {
        let mut game = Game::with_bombs(2, 3, &[(0, 0)]).unwrap();
        for (r, c) in [(0, 1), (0, 2), (1, 0), (1, 1), (1, 2)] {
            game.reveal(r, c);
        }
        assert!(!game.is_won());
        game.toggle_flag(0, 0);
        assert!(game.is_won());
    }

    #[test]
    fn configuration_errors_are_rejected() {
        let bad_rows = GameConfig { rows: 0, cols: 5, bombs: 0 };
        assert_eq!(bad_rows.validate(), Err(GameError::InvalidDimensions));
        let bad_cols = GameConfig { rows: 5, cols: 0, bombs: 1 };
        assert_eq!(bad_cols.validate(), Err(GameError::InvalidDimensions));

        assert_eq!(GameConfig::max_bombs(5, 5), 12);
        assert_eq!(GameConfig::max_bombs(10, 10), 87);
        assert_eq!(GameConfig::max_bombs(3, 3), 0);

        assert!(GameConfig { rows: 5, cols: 5, bombs: 12 }.validate().is_ok());
        assert!(matches!(
            GameConfig { rows: 5, cols: 5, bombs: 13 }.validate(),
            Err(GameError::TooManyBombs { max: 12, .. })
        ));
        assert!(matches!(
            Game::new(GameConfig { rows: 3, cols: 3, bombs: 1 }),
            Err(GameError::TooManyBombs { .. })
        ));

        assert_eq!(
            Game::with_bombs(3, 3, &[(3, 0)]).unwrap_err(),
            GameError::InvalidCoords
        );
    }

    #[test]
    fn finished_game_ignores_further_commands() {
        let mut game = Game::with_bombs(2, 2, &[(0, 0)]).unwrap();
        game.reveal(0, 0);
        assert!(game.is_lost());
        let before = game.cells.clone();
        game.reveal(1, 1);
        game.toggle_flag(1, 1);
        assert_eq!(game.cells, before);
    }
}
