use crate::tile::Tile;

/// Read-only board view handed to the presentation layer after each
/// transition. Tiles keep their transient flags so renderers can animate
/// spawns and merges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub tiles: Vec<Tile>,
    pub score: u32,
    pub best_score: u32,
    pub game_over: bool,
    pub won: bool,
}

impl BoardSnapshot {
    pub fn tile_at(&self, row: u8, col: u8) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.row == row && t.col == col)
    }
}
