pub mod calc;
pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod pool;
pub mod transform;
pub mod viewport;

pub use config::{GameConfig, ScoringConfig, ViewportConfig};
pub use error::{ConfigError, DataLoadError, GameError, GuessError};
pub use game::{GameSession, Phase};
pub use models::{Difficulty, GameSettings, Position, RegionDataset, RoundTarget};
pub use viewport::Viewport;
