use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Malformed input document `{snippet}`: {source}")]
    DecodeError {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{stage} exited unsuccessfully ({status})")]
    StageFailure { stage: String, status: ExitStatus },

    #[error("Failed to start {stage}: {source}")]
    StageSpawnError {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} stage aborted: {reason}")]
    StageAborted { stage: String, reason: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value `{value}` for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Process,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::YamlError(_)
            | EtlError::TomlError(_)
            | EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::DecodeError { .. } | EtlError::ProcessingError { .. } => {
                ErrorCategory::Input
            }
            EtlError::StageFailure { .. }
            | EtlError::StageSpawnError { .. }
            | EtlError::StageAborted { .. } => ErrorCategory::Process,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Process => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DecodeError { .. } => {
                "The export produced a line that is not a valid JSON document".to_string()
            }
            EtlError::StageFailure { stage, status } => match status.code() {
                Some(code) => format!("{} failed with exit code {}", stage, code),
                None => format!("{} was terminated by a signal", stage),
            },
            EtlError::StageSpawnError { stage, .. } => {
                format!("Could not start {}", stage)
            }
            EtlError::StageAborted { stage, .. } => format!("The {} stage crashed", stage),
            EtlError::MissingConfigError { field } => {
                format!("Configuration is missing `{}`", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value `{}` is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::DecodeError { .. } => {
                "Check that mongoexport runs with --type=json and emits one document per line"
            }
            EtlError::StageFailure { .. } => {
                "Inspect the stderr output of the failing tool above; the table was not fully loaded"
            }
            EtlError::StageSpawnError { .. } => {
                "Make sure mongoexport and mysql are installed and on PATH"
            }
            EtlError::StageAborted { .. } => "Re-run with --verbose and report the log",
            EtlError::YamlError(_) | EtlError::TomlError(_) => {
                "Fix the syntax of the configuration file"
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => {
                "Review the configuration file against the documented keys"
            }
            EtlError::ProcessingError { .. } => "Re-run with --verbose for more details",
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check disk space, permissions and that the pipe peers are still running"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
