//! Endpoints and names used by an update run.

use std::path::PathBuf;

/// Release feed listing every published toolchain version.
pub const DEFAULT_RELEASE_FEED_URL: &str = "https://go.dev/dl/?mode=json";

/// Host serving release archives.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://dl.google.com/go";

/// Folder every release archive nests its contents under.
pub const DEFAULT_TOP_LEVEL_PREFIX: &str = "go";

/// Settings for one update run.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Toolchain binary used for `version` and `env GOROOT`
    pub toolchain: PathBuf,

    /// JSON release feed
    pub release_feed_url: String,

    /// Base URL archives are downloaded from
    pub download_base_url: String,

    /// Top-level folder stripped during extraction
    pub top_level_prefix: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            toolchain: PathBuf::from("go"),
            release_feed_url: DEFAULT_RELEASE_FEED_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            top_level_prefix: DEFAULT_TOP_LEVEL_PREFIX.to_string(),
        }
    }
}
