//! Per-OS download and extraction of a toolchain release.

use crate::config::UpdaterConfig;
use crate::error::{Result, UpdateError};
use crate::http::HttpFetch;
use extractor::{ArchiveFormat, ExtractStats, ExtractionPlan};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The two supported OS families.
///
/// Selected once from the OS/arch string reported by the local toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// Linux, macOS, BSDs: `.tar.gz` releases
    Unix,
    /// Windows: `.zip` releases
    Windows,
}

impl InstallerKind {
    pub fn for_os(os_arch: &str) -> Self {
        if os_arch.contains("windows") {
            InstallerKind::Windows
        } else {
            InstallerKind::Unix
        }
    }

    pub fn format(self) -> ArchiveFormat {
        match self {
            InstallerKind::Unix => ArchiveFormat::TarGz,
            InstallerKind::Windows => ArchiveFormat::Zip,
        }
    }

    pub fn suffix(self) -> &'static str {
        self.format().suffix()
    }
}

/// Downloads one release into an install directory and unpacks it there.
#[derive(Debug, Clone)]
pub struct Installer {
    kind: InstallerKind,
    version: String,
    os_arch: String,
    install_dir: PathBuf,
    download_base_url: String,
    top_level_prefix: String,
}

impl Installer {
    pub fn new(
        config: &UpdaterConfig,
        version: impl Into<String>,
        os_arch: impl Into<String>,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        let os_arch = os_arch.into();
        Self {
            kind: InstallerKind::for_os(&os_arch),
            version: version.into(),
            os_arch,
            install_dir: install_dir.into(),
            download_base_url: config.download_base_url.clone(),
            top_level_prefix: config.top_level_prefix.clone(),
        }
    }

    pub fn kind(&self) -> InstallerKind {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// `<base>/<version>.<os>-<arch><suffix>`
    pub fn download_url(&self) -> String {
        format!(
            "{}/{}.{}{}",
            self.download_base_url.trim_end_matches('/'),
            self.version,
            self.os_arch.replacen('/', "-", 1),
            self.kind.suffix()
        )
    }

    /// Where the downloaded archive is stored: `<install_dir>/<version><suffix>`.
    pub fn archive_path(&self) -> PathBuf {
        self.install_dir
            .join(format!("{}{}", self.version, self.kind.suffix()))
    }

    /// Download the release archive and return the path it was written to.
    ///
    /// Nothing is written when the server answers with a non-success status.
    pub fn download(&self, fetch: &dyn HttpFetch) -> Result<PathBuf> {
        let url = self.download_url();
        debug!(%url, "requesting archive");

        let mut response = fetch
            .get(&url)
            .map_err(|source| UpdateError::DownloadRequest {
                url: url.clone(),
                source,
            })?;

        if !response.is_success() {
            return Err(UpdateError::DownloadFailed {
                status_code: response.status,
            });
        }

        let path = self.archive_path();
        let write_error = |source| UpdateError::DownloadWrite {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut out = File::create(&path).map_err(write_error)?;
        let copied = io::copy(&mut response.body, &mut out);
        drop(out);

        match copied {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes, "archive saved");
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&path) {
                    warn!(
                        path = %path.display(),
                        error = %remove_err,
                        "failed to remove partial archive"
                    );
                }
                Err(write_error(e))
            }
        }
    }

    /// Unpack `archive` into the install directory, stripping the top-level
    /// prefix.
    pub fn extract(&self, archive: &Path) -> Result<ExtractStats> {
        let plan = ExtractionPlan::new(archive, &self.top_level_prefix, &self.install_dir);
        Ok(extractor::extract(&plan, self.kind.format())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installer(os_arch: &str) -> Installer {
        Installer::new(
            &UpdaterConfig::default(),
            "go1.22.3",
            os_arch,
            PathBuf::from("/usr/local/go"),
        )
    }

    #[test]
    fn test_kind_for_os() {
        assert_eq!(InstallerKind::for_os("windows/amd64"), InstallerKind::Windows);
        assert_eq!(InstallerKind::for_os("windows/arm64"), InstallerKind::Windows);
        assert_eq!(InstallerKind::for_os("linux/amd64"), InstallerKind::Unix);
        assert_eq!(InstallerKind::for_os("darwin/arm64"), InstallerKind::Unix);
        assert_eq!(InstallerKind::for_os("freebsd/386"), InstallerKind::Unix);
        assert_eq!(installer("windows/386").kind(), InstallerKind::Windows);
        assert_eq!(installer("linux/arm64").kind(), InstallerKind::Unix);
    }

    #[test]
    fn test_kind_format() {
        assert_eq!(InstallerKind::Unix.format(), ArchiveFormat::TarGz);
        assert_eq!(InstallerKind::Windows.format(), ArchiveFormat::Zip);
        assert_eq!(InstallerKind::Unix.suffix(), ".tar.gz");
        assert_eq!(InstallerKind::Windows.suffix(), ".zip");
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            installer("linux/amd64").download_url(),
            "https://dl.google.com/go/go1.22.3.linux-amd64.tar.gz"
        );
        assert_eq!(
            installer("windows/amd64").download_url(),
            "https://dl.google.com/go/go1.22.3.windows-amd64.zip"
        );
    }

    #[test]
    fn test_download_url_trailing_slash_base() {
        let config = UpdaterConfig {
            download_base_url: "https://mirror.example/go/".to_string(),
            ..UpdaterConfig::default()
        };
        let installer = Installer::new(&config, "go1.22.3", "darwin/arm64", "/opt/go");
        assert_eq!(
            installer.download_url(),
            "https://mirror.example/go/go1.22.3.darwin-arm64.tar.gz"
        );
    }

    #[test]
    fn test_archive_path() {
        assert_eq!(
            installer("linux/amd64").archive_path(),
            Path::new("/usr/local/go/go1.22.3.tar.gz")
        );
        assert_eq!(
            installer("windows/amd64").archive_path(),
            Path::new("/usr/local/go/go1.22.3.zip")
        );
    }
}
