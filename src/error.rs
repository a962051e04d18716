use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Expression parse error at position {position}: {message}")]
    ExpressionParse { position: usize, message: String },

    #[error("Optimizer error: {0}")]
    Optimizer(String),

    #[error("Work item {combination} failed: {message}")]
    WorkItem { combination: usize, message: String },

    #[error("Sweep coordinator failed: {0}")]
    Coordinator(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SweepError>;
