//! Board module - the deterministic grid-transformation engine
//!
//! `apply_move` is a total, synchronous state transition: grid + direction
//! in, new grid + score delta + terminal flags out. The only randomness is
//! the owned seeded rng used for tile spawning, so identical seeds replay
//! identical games.

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::snapshot::BoardSnapshot;
use crate::tile::{Tile, TileId};
use crate::types::{Direction, GRID_SIZE, SPAWN_TWO_IN_TEN, TARGET_TILE};

/// Total number of cells on the board
const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Pre-move snapshot backing the single level of undo
#[derive(Debug, Clone)]
struct HistoryEntry {
    tiles: Vec<Tile>,
    score: u32,
}

/// Result of one `apply_move` transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// False for a no-op move: nothing slid, nothing merged, nothing spawned
    pub moved: bool,
    /// Sum of the values produced by merges in this move
    pub score_delta: u32,
    /// Number of merges performed in this move
    pub merges: u32,
}

/// Complete board state: tiles, scores, terminal flags, undo slot
#[derive(Debug, Clone)]
pub struct BoardState {
    tiles: Vec<Tile>,
    score: u32,
    best_score: u32,
    game_over: bool,
    won: bool,
    history: Option<HistoryEntry>,
    next_id: u32,
    rng: SimpleRng,
}

impl BoardState {
    /// Create a new game with two spawned tiles
    pub fn new(seed: u32) -> Self {
        let mut state = Self {
            tiles: Vec::with_capacity(CELL_COUNT),
            score: 0,
            best_score: 0,
            game_over: false,
            won: false,
            history: None,
            next_id: 0,
            rng: SimpleRng::new(seed),
        };
        state.spawn_tile();
        state.spawn_tile();
        state
    }

    /// Build a board from a value grid (0 = empty), mainly for tests and
    /// collaborators that restore a position. Terminal flags are recomputed.
    pub fn from_grid(grid: [[u32; GRID_SIZE]; GRID_SIZE], seed: u32) -> Self {
        let mut state = Self {
            tiles: Vec::with_capacity(CELL_COUNT),
            score: 0,
            best_score: 0,
            game_over: false,
            won: false,
            history: None,
            next_id: 0,
            rng: SimpleRng::new(seed),
        };
        for (row, cells) in grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value != 0 {
                    let id = state.alloc_id();
                    state
                        .tiles
                        .push(Tile::placed(id, value, row as u8, col as u8));
                }
            }
        }
        state.refresh_terminal_flags();
        state
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn can_undo(&self) -> bool {
        self.history.is_some()
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.tiles.len()
    }

    /// Value grid view, 0 for empty cells
    pub fn grid(&self) -> [[u32; GRID_SIZE]; GRID_SIZE] {
        let mut grid = [[0u32; GRID_SIZE]; GRID_SIZE];
        for tile in &self.tiles {
            grid[tile.row as usize][tile.col as usize] = tile.value;
        }
        grid
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tiles: self.tiles.clone(),
            score: self.score,
            best_score: self.best_score,
            game_over: self.game_over,
            won: self.won,
        }
    }

    /// Merge an externally persisted best score (monotonic)
    pub fn set_best_score(&mut self, value: u32) {
        self.best_score = self.best_score.max(value);
    }

    /// Reset for a new game; best score and rng sequence are preserved
    pub fn restart(&mut self) {
        self.tiles.clear();
        self.score = 0;
        self.game_over = false;
        self.won = false;
        self.history = None;
        self.spawn_tile();
        self.spawn_tile();
    }

    /// Apply one move. A no-op move (nothing slid, nothing merged) leaves the
    /// state untouched: no spawn, no history push. Rejected entirely while
    /// `game_over` is set.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.game_over {
            return MoveOutcome::default();
        }

        let mut working = self.tiles.clone();
        for tile in &mut working {
            tile.clear_transient();
        }
        let pre_move = working.clone();

        let vertical = direction.is_vertical();
        let reversed = direction.toward_far_edge();

        let mut next_tiles: Vec<Tile> = Vec::with_capacity(working.len());
        let mut next_id = self.next_id;
        let mut moved = false;
        let mut score_delta = 0u32;
        let mut merges = 0u32;

        for lane in 0..GRID_SIZE {
            // Extract the line's tiles in board order, far edge last
            let mut line: ArrayVec<Tile, GRID_SIZE> = ArrayVec::new();
            for slot in 0..GRID_SIZE {
                let (row, col) = if vertical { (slot, lane) } else { (lane, slot) };
                if let Some(tile) = working
                    .iter()
                    .find(|t| t.row as usize == row && t.col as usize == col)
                {
                    line.push(*tile);
                }
            }
            if reversed {
                line.reverse();
            }

            // Compact and merge each adjacent equal pair exactly once; the
            // merge result is skipped so it cannot merge again this pass
            let mut packed: ArrayVec<Tile, GRID_SIZE> = ArrayVec::new();
            let mut i = 0;
            while i < line.len() {
                if i + 1 < line.len() && line[i].value == line[i + 1].value {
                    let value = line[i].value * 2;
                    score_delta += value;
                    merges += 1;
                    moved = true;
                    let id = TileId::new(next_id);
                    next_id += 1;
                    packed.push(Tile::merged(id, value, [line[i].id, line[i + 1].id]));
                    i += 2;
                } else {
                    packed.push(line[i]);
                    i += 1;
                }
            }

            // Write tiles back to their new coordinates
            for (index, tile) in packed.iter_mut().enumerate() {
                let slot = if reversed { GRID_SIZE - 1 - index } else { index };
                let (row, col) = if vertical { (slot, lane) } else { (lane, slot) };
                if tile.row as usize != row || tile.col as usize != col {
                    moved = true;
                }
                tile.row = row as u8;
                tile.col = col as u8;
                next_tiles.push(*tile);
            }
        }

        if !moved {
            return MoveOutcome::default();
        }

        self.history = Some(HistoryEntry {
            tiles: pre_move,
            score: self.score,
        });
        self.tiles = next_tiles;
        self.next_id = next_id;
        self.spawn_tile();
        self.score += score_delta;
        self.best_score = self.best_score.max(self.score);
        self.refresh_terminal_flags();

        MoveOutcome {
            moved: true,
            score_delta,
            merges,
        }
    }

    /// Restore the pre-move snapshot: tiles and score exactly as captured,
    /// `game_over` forced off, history cleared (single level, non-stacking).
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.take() else {
            return false;
        };
        self.tiles = entry.tiles;
        self.score = entry.score;
        self.game_over = false;
        self.won = self.tiles.iter().any(|t| t.value == TARGET_TILE);
        true
    }

    fn alloc_id(&mut self) -> TileId {
        let id = TileId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn one tile at a uniformly random empty cell: value 2 with
    /// probability 0.9, else 4. No-op on a full board.
    fn spawn_tile(&mut self) {
        let mut empties: ArrayVec<(u8, u8), CELL_COUNT> = ArrayVec::new();
        let grid = self.grid();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if grid[row][col] == 0 {
                    empties.push((row as u8, col as u8));
                }
            }
        }
        if empties.is_empty() {
            return;
        }

        let (row, col) = empties[self.rng.next_range(empties.len() as u32) as usize];
        let value = if self.rng.next_range(10) < SPAWN_TWO_IN_TEN {
            2
        } else {
            4
        };
        let id = self.alloc_id();
        self.tiles.push(Tile::spawned(id, value, row, col));
    }

    /// Movement stays possible while any cell is empty. On a full board the
    /// check is adjacency-equality only (right and down neighbors); this is
    /// the observed policy, not a direction-specific movability search.
    fn refresh_terminal_flags(&mut self) {
        self.won = self.tiles.iter().any(|t| t.value == TARGET_TILE);
        self.game_over = self.tiles.len() == CELL_COUNT && !self.has_adjacent_equal_pair();
    }

    fn has_adjacent_equal_pair(&self) -> bool {
        let grid = self.grid();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let value = grid[row][col];
                if row + 1 < GRID_SIZE && grid[row + 1][col] == value {
                    return true;
                }
                if col + 1 < GRID_SIZE && grid[row][col + 1] == value {
                    return true;
                }
            }
        }
        false
    }
}
