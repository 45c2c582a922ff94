use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tile count must be positive")]
    ZeroTileCount,
    #[error("a {tile_count}x{tile_count} board is larger than the {max}x{max} limit")]
    BoardTooLarge { tile_count: u32, max: u32 },
    #[error("initial snake length must be at least 1")]
    ZeroSnakeLength,
    #[error("a snake of length {length} does not fit in a column of {tile_count} tiles")]
    SnakeDoesNotFit { length: u32, tile_count: u32 },
    #[error("a snake of length {length} leaves no room for an apple on a {tile_count}x{tile_count} board")]
    SnakeFillsBoard { length: u32, tile_count: u32 },
    #[error("update interval must be positive")]
    ZeroInterval,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("every tile on the board is occupied")]
    BoardFull,
}
