//! Snapshot tarball extraction.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::path::Path;
use tar::Archive;

/// Unpack a gzip-compressed snapshot tarball into `dest`.
///
/// Snapshots contain a single top-level directory named after the package
/// base. Entries escaping `dest` are rejected by the tar reader.
#[tracing::instrument(skip(tarball))]
pub fn unpack_snapshot(tarball: &[u8], dest: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(tarball));
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest)
        .with_context(|| format!("Failed to extract snapshot into {:?}", dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    fn create_tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
        let mut tar_builder = tar::Builder::new(Vec::new());
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_path(name).unwrap();
            header.set_mode(0o644);
            header.set_cksum();
            tar_builder.append(&header, content.as_bytes()).unwrap();
        }
        let tar = tar_builder.into_inner().unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_unpack_snapshot() {
        let dir = tempdir().unwrap();
        let tarball = create_tar_gz(&[
            ("foo/PKGBUILD", "pkgname=foo"),
            ("foo/.SRCINFO", "pkgbase = foo"),
        ]);

        unpack_snapshot(&tarball, dir.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("foo/.SRCINFO")).unwrap(),
            "pkgbase = foo"
        );
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let dir = tempdir().unwrap();
        assert!(unpack_snapshot(b"<html>502 Bad Gateway</html>", dir.path()).is_err());
    }
}
