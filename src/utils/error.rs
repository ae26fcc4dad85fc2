use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Page module not found: {path}")]
    ModuleNotFound { path: String },

    #[error("Page module has no entry point: {path}")]
    NoEntryPoint { path: String },

    #[error("Page module {path} failed: {message}")]
    PageModuleError { path: String, message: String },

    #[error("Fragment {url} returned status {status}")]
    FragmentStatusError { url: String, status: u16 },

    #[error("Fragment {url} could not be fetched: {message}")]
    FragmentNetworkError { url: String, message: String },

    #[error("No container matches selector '{selector}'")]
    ContainerNotFound { selector: String },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Build error: {message}")]
    BuildError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    PageModule,
    Fragment,
    Document,
    Build,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScaffoldError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScaffoldError::HttpError(_)
            | ScaffoldError::FragmentNetworkError { .. } => ErrorCategory::Network,
            ScaffoldError::IoError(_) | ScaffoldError::SerializationError(_) => ErrorCategory::Io,
            ScaffoldError::UrlError(_)
            | ScaffoldError::ConfigError { .. }
            | ScaffoldError::InvalidConfigValueError { .. }
            | ScaffoldError::MissingConfigError { .. }
            | ScaffoldError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ScaffoldError::ModuleNotFound { .. }
            | ScaffoldError::NoEntryPoint { .. }
            | ScaffoldError::PageModuleError { .. } => ErrorCategory::PageModule,
            ScaffoldError::FragmentStatusError { .. } => ErrorCategory::Fragment,
            ScaffoldError::ContainerNotFound { .. } | ScaffoldError::InvalidSelector { .. } => {
                ErrorCategory::Document
            }
            ScaffoldError::BuildError { .. } => ErrorCategory::Build,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 頁面模組失敗只會讓頁面少一塊內容
            ErrorCategory::PageModule => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Fragment | ErrorCategory::Document => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Configuration | ErrorCategory::Build => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScaffoldError::ModuleNotFound { path } => {
                format!("No page module is registered for {}", path)
            }
            ScaffoldError::NoEntryPoint { path } => {
                format!("Page module {} exists but does nothing", path)
            }
            ScaffoldError::FragmentStatusError { url, status } => {
                format!("Could not include {} (HTTP {})", url, status)
            }
            ScaffoldError::ContainerNotFound { selector } => {
                format!("The page has no element matching '{}'", selector)
            }
            ScaffoldError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the site origin is reachable and the server is running",
            ErrorCategory::Io => "Check that the paths exist and are readable/writable",
            ErrorCategory::Configuration => "Review scaffold.toml and the command line flags",
            ErrorCategory::PageModule => "Register the page in the page registry or rename the HTML file",
            ErrorCategory::Fragment => "Make sure the fragment file exists beside the page or under includes/",
            ErrorCategory::Document => "Check the selector and the page markup",
            ErrorCategory::Build => "Check the source and output directories in the [build] section",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_failures_are_low_severity() {
        let err = ScaffoldError::ModuleNotFound {
            path: "./controller/missing.js".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::PageModule);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.user_friendly_message().contains("./controller/missing.js"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err: ScaffoldError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.recovery_suggestion().is_empty());
    }
}
