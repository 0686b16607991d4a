//! # Updater
//!
//! Replaces the installed Go toolchain with the latest stable release.
//!
//! A run asks the local `go` binary for its version, reads the release feed,
//! and when the two differ wipes the install directory, downloads the release
//! archive for the local OS/arch, unpacks it with the [`extractor`] crate and
//! deletes the archive.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use updater::{GoToolchain, HttpClient, Logger, Orchestrator, Outcome, UpdaterConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UpdaterConfig::default();
//! let toolchain = GoToolchain::new(&config.toolchain);
//! let client = HttpClient::new()?;
//! let logger = Logger::open(Path::new("."), true)?;
//!
//! match Orchestrator::new(&config, &toolchain, &client, &logger).run()? {
//!     Outcome::UpToDate { version } => println!("already on {}", version),
//!     Outcome::Updated { to, .. } => println!("installed {}", to),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod installer;
pub mod log;
pub mod orchestrator;
pub mod toolchain;
pub mod version;

// Re-export main types
pub use config::UpdaterConfig;
pub use error::{FetchError, UpdateError};
pub use http::{FetchResponse, HttpClient, HttpFetch};
pub use installer::{Installer, InstallerKind};
pub use log::Logger;
pub use orchestrator::{Orchestrator, Outcome, Phase, PhaseError, VersionCheck};
pub use toolchain::{GoToolchain, LocalToolchain, Toolchain};
pub use version::{latest_stable, Release};
