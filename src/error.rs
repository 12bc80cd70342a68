use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl AppError {
    /// Stable error code for collaborators that surface failures to users.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::ConfigError(_) | AppError::TomlError(_) => "CONFIG_ERROR",
            AppError::IoError(_) => "IO_ERROR",
            AppError::SerdeJsonError(_) => "JSON_ERROR",
        }
    }

    /// Caller mistakes are warnings; environment and parse failures are errors.
    pub fn level(&self) -> log::Level {
        match self {
            AppError::ValidationError(_) | AppError::InvalidState(_) => log::Level::Warn,
            _ => log::Level::Error,
        }
    }

    /// Logs the error once, where it leaves the process.
    pub fn report(&self) {
        log::log!(self.level(), "{} ({})", self, self.code());
    }
}
