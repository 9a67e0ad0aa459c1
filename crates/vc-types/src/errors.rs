use thiserror::Error;

/// Main error type for valcurve
#[derive(Error, Debug)]
pub enum VcError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Dataset and fold-layout errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Found input variables with inconsistent numbers of samples: X has {x_rows} rows, y has {y_len} entries")]
    ShapeMismatch { x_rows: usize, y_len: usize },

    #[error("Empty dataset: at least one sample and one feature are required")]
    Empty,

    #[error("Non-finite value in feature matrix at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },

    #[error("Invalid fold count {n_splits}: at least 2 folds are required")]
    InvalidFolds { n_splits: usize },

    #[error("Cannot have number of splits {n_splits} greater than the number of samples {n_samples}")]
    TooFewSamples { n_samples: usize, n_splits: usize },

    #[error("n_splits={n_splits} cannot be greater than the number of members in each class (largest class has {largest_class})")]
    ClassTooSmall { n_splits: usize, largest_class: usize },

    #[error("Invalid score matrix: {message}")]
    InvalidScores { message: String },
}

/// Hyperparameter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Invalid parameter {name} for estimator {estimator}")]
    Unknown { estimator: String, name: String },

    #[error("Invalid value for parameter {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("Parameter name must not be empty")]
    EmptyName,

    #[error("Parameter range must contain at least one value")]
    EmptyRange,
}

/// Estimator and scoring errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Estimator {estimator} is not fitted yet")]
    NotFitted { estimator: String },

    #[error("Singular system while fitting {estimator}")]
    Singular { estimator: String },

    #[error("Fit failed: {message}")]
    FitFailed { message: String },

    #[error("Unknown scoring '{name}'")]
    UnknownScoring { name: String },

    #[error("Scoring failed: {message}")]
    ScoringFailed { message: String },
}

/// Figure construction and rendering errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    #[error("Invalid axis: {message}")]
    InvalidAxis { message: String },

    #[error("Inconsistent series '{series}': expected {expected} points, got {actual}")]
    SeriesLength {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("Drawing backend error: {message}")]
    Backend { message: String },
}

/// Result type alias for valcurve operations
pub type VcResult<T> = Result<T, VcError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::VcError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::VcError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DataError::ShapeMismatch { x_rows: 10, y_len: 9 };

        assert!(error.to_string().contains("inconsistent numbers of samples"));
        assert!(error.to_string().contains("10"));
        assert!(error.to_string().contains("9"));
    }

    #[test]
    fn test_error_conversion() {
        let param_error = ParamError::Unknown {
            estimator: "KNeighborsClassifier".to_string(),
            name: "gamma".to_string(),
        };
        let vc_error: VcError = param_error.into();

        match vc_error {
            VcError::Param(ParamError::Unknown { name, .. }) => assert_eq!(name, "gamma"),
            _ => panic!("Expected Param error"),
        }
    }

    #[test]
    fn test_macros() {
        let validation_err = validation_error!("Invalid value: {}", 42);
        assert!(matches!(validation_err, VcError::Validation(ref m) if m == "Invalid value: 42"));

        let config_err = config_error!("Missing required field: {}", "cv");
        assert!(config_err.to_string().contains("Missing required field: cv"));
    }
}
