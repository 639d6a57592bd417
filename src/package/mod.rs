//! Package source model
//!
//! This module provides the data model shared by the build pipeline:
//! version descriptors, build metadata and materialized source directories.

mod source;
mod srcinfo;
mod version;

pub use source::PackageSource;
pub use srcinfo::{SRCINFO_FILE, SrcInfo, strip_constraint};
pub use version::{VersionDescriptor, vercmp};
