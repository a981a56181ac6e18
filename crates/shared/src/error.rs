use thiserror::Error;

/// Invalid menu settings or game tuning. The game does not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one region must be selected")]
    NoRegions,
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("number of rounds must be at least 1")]
    NoRounds,
    #[error("malformed game config: {0}")]
    Malformed(String),
    #[error("invalid game config: {0}")]
    InvalidTuning(&'static str),
}

/// Dataset fetch or parse failure. Surfaced to the UI as an error state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataLoadError {
    #[error("failed to fetch region {region}: {message}")]
    Fetch { region: String, message: String },
    #[error("failed to parse dataset for region {region}: {message}")]
    Parse { region: String, message: String },
    #[error("unknown region: {0}")]
    RegionNotFound(String),
    #[error("no targets available for difficulty {difficulty}")]
    NoTargets { difficulty: String },
}

/// Misuse of the guess lifecycle. The UI is expected to prevent these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("no guess has been placed this round")]
    NoGuess,
    #[error("no target is active")]
    NoTarget,
    #[error("the guess for this round is already validated")]
    AlreadyValidated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
    #[error(transparent)]
    Guess(#[from] GuessError),
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
}
