//! The update run as an explicit state machine.
//!
//! ```text
//! ResolveLocal -> ResolveRemote -> CompareVersions -+-> UpToDate
//!                                                   |
//!                                                   +-> ResolveInstallDir -> CleanOldInstall
//!                                                       -> Download -> Extract -> DeleteArchive
//! ```
//!
//! Every failure is fatal. Nothing is retried or rolled back, and a failed run
//! starts over from `ResolveLocal`. The old installation is removed before
//! the download starts, so a failed download leaves the install directory
//! empty.
//!
//! Two runs against the same install directory at the same time are unsafe;
//! there is no lock.

use crate::config::UpdaterConfig;
use crate::error::UpdateError;
use crate::fs::{clean_dir, delete_file};
use crate::http::HttpFetch;
use crate::installer::Installer;
use crate::log::Logger;
use crate::toolchain::{LocalToolchain, Toolchain};
use crate::version::latest_stable;
use extractor::ExtractStats;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info_span};

/// Stage of an update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ResolveLocal,
    ResolveRemote,
    CompareVersions,
    ResolveInstallDir,
    CleanOldInstall,
    Download,
    Extract,
    DeleteArchive,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::ResolveLocal => "resolve local version",
            Phase::ResolveRemote => "resolve latest release",
            Phase::CompareVersions => "compare versions",
            Phase::ResolveInstallDir => "resolve install directory",
            Phase::CleanOldInstall => "clean old install",
            Phase::Download => "download",
            Phase::Extract => "extract",
            Phase::DeleteArchive => "delete archive",
        };
        f.write_str(name)
    }
}

/// A stage failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("{phase}: {source}")]
pub struct PhaseError {
    pub phase: Phase,
    #[source]
    pub source: UpdateError,
}

/// How a successful run ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Local and latest versions are identical; nothing was touched.
    UpToDate { version: String },

    /// The install directory now holds `to`.
    Updated {
        from: String,
        to: String,
        install_dir: PathBuf,
        stats: ExtractStats,
    },
}

/// Local and latest versions side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    pub local: LocalToolchain,
    pub latest: String,
}

impl VersionCheck {
    /// Exact string comparison; there is no semantic ordering, so a local
    /// build that differs from the feed in any way counts as outdated.
    pub fn needs_update(&self) -> bool {
        self.local.version != self.latest
    }
}

enum State {
    ResolveLocal,
    ResolveRemote {
        local: LocalToolchain,
    },
    CompareVersions {
        check: VersionCheck,
    },
    ResolveInstallDir {
        check: VersionCheck,
    },
    CleanOldInstall {
        from: String,
        installer: Installer,
    },
    Download {
        from: String,
        installer: Installer,
    },
    Extract {
        from: String,
        installer: Installer,
        archive: PathBuf,
    },
    DeleteArchive {
        from: String,
        installer: Installer,
        archive: PathBuf,
        stats: ExtractStats,
    },
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            State::ResolveLocal => Phase::ResolveLocal,
            State::ResolveRemote { .. } => Phase::ResolveRemote,
            State::CompareVersions { .. } => Phase::CompareVersions,
            State::ResolveInstallDir { .. } => Phase::ResolveInstallDir,
            State::CleanOldInstall { .. } => Phase::CleanOldInstall,
            State::Download { .. } => Phase::Download,
            State::Extract { .. } => Phase::Extract,
            State::DeleteArchive { .. } => Phase::DeleteArchive,
        }
    }
}

enum Transition {
    Next(State),
    Done(Outcome),
}

/// Drives one update run against a toolchain, an HTTP client and a logger.
pub struct Orchestrator<'a> {
    config: &'a UpdaterConfig,
    toolchain: &'a dyn Toolchain,
    fetch: &'a dyn HttpFetch,
    logger: &'a Logger,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a UpdaterConfig,
        toolchain: &'a dyn Toolchain,
        fetch: &'a dyn HttpFetch,
        logger: &'a Logger,
    ) -> Self {
        Self {
            config,
            toolchain,
            fetch,
            logger,
        }
    }

    /// Run the full update.
    pub fn run(&self) -> Result<Outcome, PhaseError> {
        self.logger.in_scope(|| {
            let mut state = State::ResolveLocal;
            loop {
                match self.advance(state)? {
                    Transition::Next(next) => state = next,
                    Transition::Done(outcome) => return Ok(outcome),
                }
            }
        })
    }

    /// Resolve and compare versions without touching the filesystem.
    pub fn check(&self) -> Result<VersionCheck, PhaseError> {
        self.logger.in_scope(|| {
            let local = self.in_phase(Phase::ResolveLocal, || self.local_version())?;
            let latest = self.in_phase(Phase::ResolveRemote, || self.latest_release())?;

            Ok(VersionCheck { local, latest })
        })
    }

    /// Run `step` inside the span of `phase`, logging and tagging its failure.
    fn in_phase<T>(
        &self,
        phase: Phase,
        step: impl FnOnce() -> Result<T, UpdateError>,
    ) -> Result<T, PhaseError> {
        let span = info_span!("phase", %phase);
        let _entered = span.enter();
        debug!("entering phase");

        step().map_err(|source| self.fail(phase, source))
    }

    /// Perform one transition.
    fn advance(&self, state: State) -> Result<Transition, PhaseError> {
        self.in_phase(state.phase(), || self.step(state))
    }

    /// Log a stage failure to the error stream and tag it with its phase.
    fn fail(&self, phase: Phase, source: UpdateError) -> PhaseError {
        self.logger.error(&format!("{} error: {}", phase, source));
        PhaseError { phase, source }
    }

    fn local_version(&self) -> Result<LocalToolchain, UpdateError> {
        let local = self.toolchain.local_version()?;
        self.logger
            .info(&format!("local current version: {}", local.version));
        Ok(local)
    }

    fn latest_release(&self) -> Result<String, UpdateError> {
        let latest = latest_stable(self.fetch, &self.config.release_feed_url)?;
        self.logger.info(&format!("latest release: {}", latest));
        Ok(latest)
    }

    fn step(&self, state: State) -> Result<Transition, UpdateError> {
        let next = match state {
            State::ResolveLocal => State::ResolveRemote {
                local: self.local_version()?,
            },

            State::ResolveRemote { local } => {
                let latest = self.latest_release()?;
                State::CompareVersions {
                    check: VersionCheck { local, latest },
                }
            }

            State::CompareVersions { check } => {
                if !check.needs_update() {
                    self.logger.info("It is now the latest version.");
                    return Ok(Transition::Done(Outcome::UpToDate {
                        version: check.latest,
                    }));
                }
                State::ResolveInstallDir { check }
            }

            State::ResolveInstallDir { check } => {
                let install_dir = self.toolchain.install_dir()?;
                debug!(install_dir = %install_dir.display(), "resolved install directory");
                let installer = Installer::new(
                    self.config,
                    check.latest,
                    check.local.os_arch,
                    install_dir,
                );
                State::CleanOldInstall {
                    from: check.local.version,
                    installer,
                }
            }

            State::CleanOldInstall { from, installer } => {
                self.logger.info("clean up old versions.");
                let removed = clean_dir(installer.install_dir())?;
                debug!(removed, "old installation removed");
                State::Download { from, installer }
            }

            State::Download { from, installer } => {
                self.logger.info("download the latest version.");
                let archive = installer.download(self.fetch)?;
                State::Extract {
                    from,
                    installer,
                    archive,
                }
            }

            State::Extract {
                from,
                installer,
                archive,
            } => {
                self.logger.info("extract the latest version.");
                let stats = installer.extract(&archive)?;
                State::DeleteArchive {
                    from,
                    installer,
                    archive,
                    stats,
                }
            }

            State::DeleteArchive {
                from,
                installer,
                archive,
                stats,
            } => {
                self.logger.info("clean up downloaded files.");
                delete_file(&archive)?;
                self.logger.info(&format!(
                    "updated {} -> {} ({} files)",
                    from,
                    installer.version(),
                    stats.files_extracted
                ));
                return Ok(Transition::Done(Outcome::Updated {
                    from,
                    to: installer.version().to_string(),
                    install_dir: installer.install_dir().to_path_buf(),
                    stats,
                }));
            }
        };

        Ok(Transition::Next(next))
    }
}
