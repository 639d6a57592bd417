//! Well-known directories.

use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn cache_dir_impl(&self) -> Option<PathBuf> {
        dirs::cache_dir()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_cache_dir() {
        let runtime = RealRuntime;
        // CI containers may not have a home directory.
        if let Some(dir) = runtime.cache_dir() {
            assert!(dir.is_absolute());
        }
    }
}
