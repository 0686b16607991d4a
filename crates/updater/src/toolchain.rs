//! Queries against the installed toolchain binary.

use crate::error::{Result, UpdateError};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// What the installed toolchain reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalToolchain {
    /// Version string, e.g. `go1.22.0`
    pub version: String,

    /// Host OS and architecture, e.g. `linux/amd64`
    pub os_arch: String,
}

/// The installed toolchain.
pub trait Toolchain {
    /// Version and OS/arch of the installed toolchain.
    fn local_version(&self) -> Result<LocalToolchain>;

    /// Root directory of the installation.
    fn install_dir(&self) -> Result<PathBuf>;
}

/// [`Toolchain`] answered by running the `go` binary.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    binary: PathBuf,
}

impl GoToolchain {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run the binary and return stdout followed by stderr.
    fn combined_output(&self, args: &[&str]) -> std::result::Result<String, String> {
        debug!(binary = %self.binary.display(), ?args, "running toolchain");

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run {}: {}", self.binary.display(), e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(format!(
                "{} {} exited with {}: {}",
                self.binary.display(),
                args.join(" "),
                output.status,
                combined.trim()
            ));
        }

        Ok(combined)
    }
}

impl Toolchain for GoToolchain {
    fn local_version(&self) -> Result<LocalToolchain> {
        let output = self
            .combined_output(&["version"])
            .map_err(UpdateError::LocalVersionUnavailable)?;
        parse_version_output(&output)
    }

    fn install_dir(&self) -> Result<PathBuf> {
        let output = self
            .combined_output(&["env", "GOROOT"])
            .map_err(UpdateError::InstallDirUnavailable)?;
        parse_install_dir(&output)
    }
}

/// Parse `go version` output: `go version go1.22.3 linux/amd64`.
///
/// The third and fourth whitespace-separated tokens are the version and the
/// OS/arch pair.
pub fn parse_version_output(output: &str) -> Result<LocalToolchain> {
    let mut tokens = output.split_whitespace().skip(2);
    match (tokens.next(), tokens.next()) {
        (Some(version), Some(os_arch)) => Ok(LocalToolchain {
            version: version.to_string(),
            os_arch: os_arch.to_string(),
        }),
        _ => Err(UpdateError::LocalVersionUnavailable(format!(
            "unexpected version output: {:?}",
            output.trim()
        ))),
    }
}

/// Parse `go env GOROOT` output.
pub fn parse_install_dir(output: &str) -> Result<PathBuf> {
    let dir = output.trim();
    if dir.is_empty() {
        return Err(UpdateError::InstallDirUnavailable(
            "toolchain reported an empty root directory".to_string(),
        ));
    }
    Ok(PathBuf::from(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_output() {
        let local = parse_version_output("go version go1.22.3 linux/amd64\n").unwrap();
        assert_eq!(local.version, "go1.22.3");
        assert_eq!(local.os_arch, "linux/amd64");

        let local = parse_version_output("go version go1.21.0 windows/amd64\r\n").unwrap();
        assert_eq!(local.os_arch, "windows/amd64");
    }

    #[test]
    fn test_parse_version_output_extra_tokens() {
        // Development builds append more fields after the OS/arch pair
        let local =
            parse_version_output("go version devel go1.23-abc123 Tue Jan 2 linux/arm64").unwrap();
        assert_eq!(local.version, "devel");
        assert_eq!(local.os_arch, "go1.23-abc123");
    }

    #[test]
    fn test_parse_version_output_too_short() {
        for output in ["", "go version", "go version go1.22.3"] {
            assert!(matches!(
                parse_version_output(output),
                Err(UpdateError::LocalVersionUnavailable(_))
            ));
        }
    }

    #[test]
    fn test_parse_install_dir() {
        assert_eq!(
            parse_install_dir("/usr/local/go\n").unwrap(),
            PathBuf::from("/usr/local/go")
        );
        assert_eq!(
            parse_install_dir("  D:\\apply\\go  \r\n").unwrap(),
            PathBuf::from("D:\\apply\\go")
        );
        assert!(matches!(
            parse_install_dir(" \n"),
            Err(UpdateError::InstallDirUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let toolchain = GoToolchain::new("/nonexistent/gup-test/go");
        assert!(matches!(
            toolchain.local_version(),
            Err(UpdateError::LocalVersionUnavailable(_))
        ));
        assert!(matches!(
            toolchain.install_dir(),
            Err(UpdateError::InstallDirUnavailable(_))
        ));
    }
}
