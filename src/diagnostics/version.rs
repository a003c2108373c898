//! Build and version metadata served by `/info`.

use serde::Serialize;
use utoipa::ToSchema;

/// Build metadata of the running binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VersionInfo {
    pub version: String,
    pub build_number: String,
    pub build_timestamp: String,
    pub git_branch: String,
    pub git_hash: String,
}

impl VersionInfo {
    /// Metadata baked in at compile time.
    ///
    /// Reads `BUILD_NUMBER`, `BUILD_TIMESTAMP`, `GIT_BRANCH` and `GIT_HASH`
    /// from the build environment; missing values get placeholders.
    pub fn from_build_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_number: option_env!("BUILD_NUMBER").unwrap_or("00000").to_string(),
            build_timestamp: option_env!("BUILD_TIMESTAMP").unwrap_or_default().to_string(),
            git_branch: option_env!("GIT_BRANCH").unwrap_or("master").to_string(),
            git_hash: option_env!("GIT_HASH").unwrap_or_default().to_string(),
        }
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self::from_build_env()
    }
}
