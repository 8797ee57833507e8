use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no published versions to plan from")]
    NoVersions,

    #[error("all versions were removed by the exclusion list")]
    AllVersionsExcluded,

    #[error("target repository must not be empty")]
    EmptyRepository,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
