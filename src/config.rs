use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TILE_COUNT: u32 = 11;
pub const DEFAULT_SNAKE_LENGTH: u32 = 3;
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 100;
// Keeps board area in i32 and the terminal layout in u16
pub const MAX_TILE_COUNT: u32 = 1_000;

/// Engine constants, fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tile_count: u32,
    pub initial_snake_length: u32,
    pub update_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tile_count: DEFAULT_TILE_COUNT,
            initial_snake_length: DEFAULT_SNAKE_LENGTH,
            update_interval: Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (length, tile_count) = (self.initial_snake_length, self.tile_count);

        if tile_count == 0 {
            return Err(ConfigError::ZeroTileCount);
        }
        if tile_count > MAX_TILE_COUNT {
            return Err(ConfigError::BoardTooLarge { tile_count, max: MAX_TILE_COUNT });
        }
        if length == 0 {
            return Err(ConfigError::ZeroSnakeLength);
        }
        // The snake starts as a straight vertical line
        if length > tile_count {
            return Err(ConfigError::SnakeDoesNotFit { length, tile_count });
        }
        if u64::from(length) >= u64::from(tile_count) * u64::from(tile_count) {
            return Err(ConfigError::SnakeFillsBoard { length, tile_count });
        }
        if self.update_interval == Duration::from_millis(0) {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(())
    }
}
