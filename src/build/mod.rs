//! Build orchestration.
//!
//! A run moves through a fixed sequence: the build environment is upgraded,
//! sources for the requested packages and their build dependencies are
//! fetched, live-source packages have their versions refreshed, and every
//! package the reference repository reports as outdated is built and its
//! artifacts harvested. See [`BuildOrchestrator::build_new`].

mod harvest;
mod lock;
mod orchestrator;
mod probe;
mod report;
mod resolver;

pub use harvest::{ArtifactHarvester, PACKAGE_SUFFIX, SIGNATURE_SUFFIX};
pub use lock::{LOCK_FILENAME, LockError, RunLock};
pub use orchestrator::BuildOrchestrator;
pub use probe::VersionProbe;
pub use report::{BuildArtifact, BuildOutcome, BuildReport};
pub use resolver::StalenessResolver;
