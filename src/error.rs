use thiserror::Error;

pub type FunnelResult<T> = Result<T, FunnelError>;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sheet fetch error: {0}")]
    Fetch(String),

    #[error("Sheet layout error: {0}")]
    Layout(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    #[error("Unknown agency: {0}")]
    UnknownAgency(String),
}

impl FunnelError {
    /// True for lookups that miss on caller input rather than failing upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FunnelError::UnknownPeriod(_) | FunnelError::UnknownAgency(_)
        )
    }
}
