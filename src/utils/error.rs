use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Shapefile error: {0}")]
    ShapefileError(#[from] shapefile::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Boundary data error: {message}")]
    BoundaryError { message: String },

    #[error("No branches were successfully geocoded ({attempted} attempted)")]
    NoBranchesGeocoded { attempted: usize },

    #[error("Rendering error: {message}")]
    RenderError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    BoundaryData,
    Geocoding,
    Rendering,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn boundary(message: impl Into<String>) -> Self {
        MapError::BoundaryError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::HttpError(_) => ErrorCategory::Network,
            MapError::ZipError(_) | MapError::ShapefileError(_) | MapError::BoundaryError { .. } => {
                ErrorCategory::BoundaryData
            }
            MapError::NoBranchesGeocoded { .. } => ErrorCategory::Geocoding,
            MapError::SerializationError(_)
            | MapError::TemplateError(_)
            | MapError::RenderError { .. } => ErrorCategory::Rendering,
            MapError::ConfigError { .. } | MapError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            MapError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Geocoding => ErrorSeverity::Medium,
            ErrorCategory::BoundaryData
            | ErrorCategory::Rendering
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Ensure you have internet access and that the remote server is reachable"
            }
            ErrorCategory::BoundaryData => {
                "Check the boundary download URL and make sure ~50MB of disk space is available"
            }
            ErrorCategory::Geocoding => {
                "The geocoding service may be rate limiting this host; wait a few minutes and try again"
            }
            ErrorCategory::Rendering => "Check that the output directory is writable",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapError::HttpError(e) if e.is_timeout() => {
                "A network request timed out".to_string()
            }
            MapError::HttpError(_) => "A network request failed".to_string(),
            MapError::NoBranchesGeocoded { .. } => {
                "No branch addresses could be geocoded, the map was not created".to_string()
            }
            MapError::BoundaryError { message } => {
                format!("Could not load county boundaries: {}", message)
            }
            other => other.to_string(),
        }
    }

    /// 依嚴重程度決定行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
