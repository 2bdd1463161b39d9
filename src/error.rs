use thiserror::Error;

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error(
        "{provider} API key not found. Set GEMINI_API_KEY or api_key in ~/.sinu/config.toml \
         (keys: https://aistudio.google.com/app/apikey)"
    )]
    Auth { provider: String },

    #[error("{provider} returned no text: {reason}")]
    EmptyResponse { provider: String, reason: String },

    #[error("all {attempts} attempts failed:\n{failures}")]
    Exhausted { attempts: u32, failures: String },
}

// ─── Tutor errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TutorError {
    #[error("the lesson is finished; the final report is ready")]
    SessionComplete,

    #[error("message is empty")]
    EmptyMessage,

    #[error("option {index} is out of range ({available} options available)")]
    OptionOutOfRange { index: usize, available: usize },

    #[error("no quiz options are pending")]
    NoPendingOptions,

    #[error("help is only available during free conversation")]
    HelpUnavailable,
}

// ─── Observation errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("group {group:?} is not part of the {variant} experiment")]
    UnknownGroup { variant: String, group: String },

    #[error("invalid measurement {0}: must be a finite number >= 0")]
    InvalidMeasurement(f64),

    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
