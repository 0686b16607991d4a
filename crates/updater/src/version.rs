//! Latest stable release lookup.

use crate::error::{FetchError, Result, UpdateError};
use crate::http::HttpFetch;
use serde::Deserialize;
use tracing::debug;

/// One record of the release feed.
///
/// Other feed fields (per-platform file lists) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
}

/// Fetch the release feed and return the first stable version it lists.
pub fn latest_stable(fetch: &dyn HttpFetch, feed_url: &str) -> Result<String> {
    let remote_error = |source| UpdateError::RemoteFetchFailed {
        url: feed_url.to_string(),
        source,
    };

    let response = fetch.get(feed_url).map_err(remote_error)?;
    if !response.is_success() {
        return Err(remote_error(FetchError::Status(response.status)));
    }

    let releases: Vec<Release> = serde_json::from_reader(response.body)?;
    debug!(releases = releases.len(), "decoded release feed");

    first_stable(&releases).map(str::to_string)
}

/// The version of the first release flagged stable, in feed order.
pub fn first_stable(releases: &[Release]) -> Result<&str> {
    releases
        .iter()
        .find(|r| r.stable)
        .map(|r| r.version.as_str())
        .ok_or(UpdateError::NoStableVersionFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"[
        {"version": "go1.23rc1", "stable": false, "files": []},
        {"version": "go1.22.3", "stable": true, "files": [{"filename": "go1.22.3.linux-amd64.tar.gz"}]},
        {"version": "go1.21.10", "stable": true, "files": []}
    ]"#;

    #[test]
    fn test_first_stable_skips_prereleases() {
        let releases: Vec<Release> = serde_json::from_str(FEED).unwrap();
        assert_eq!(first_stable(&releases).unwrap(), "go1.22.3");
    }

    #[test]
    fn test_first_stable_none() {
        let releases = vec![Release {
            version: "go1.23rc1".to_string(),
            stable: false,
        }];
        assert!(matches!(
            first_stable(&releases),
            Err(UpdateError::NoStableVersionFound)
        ));
        assert!(matches!(first_stable(&[]), Err(UpdateError::NoStableVersionFound)));
    }

    #[test]
    fn test_missing_stable_flag_defaults_false() {
        let releases: Vec<Release> = serde_json::from_str(r#"[{"version": "go1.0"}]"#).unwrap();
        assert!(!releases[0].stable);
    }
}
