//! Package version descriptors and ecosystem version comparison.
//!
//! Versions follow the pacman `[epoch:]pkgver-pkgrel` convention. Ordering
//! compares the epoch first, then the upstream version and finally the
//! release counter, both with [`vercmp`].

use anyhow::{Context, Result, anyhow};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Structured version of a package source.
#[derive(Debug, Clone, Default)]
pub struct VersionDescriptor {
    /// Optional epoch. An unset epoch sorts below every explicit epoch.
    pub epoch: Option<u64>,
    /// Upstream version (`pkgver`).
    pub version: String,
    /// Release counter (`pkgrel`).
    pub release: String,
}

impl VersionDescriptor {
    pub fn new(epoch: Option<u64>, version: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            epoch,
            version: version.into(),
            release: release.into(),
        }
    }
}

impl Ord for VersionDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| vercmp(&self.version, &other.version))
            .then_with(|| vercmp(&self.release, &other.release))
    }
}

impl PartialOrd for VersionDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionDescriptor {}

impl fmt::Display for VersionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(epoch) = self.epoch {
            write!(f, "{}:", epoch)?;
        }
        write!(f, "{}-{}", self.version, self.release)
    }
}

impl FromStr for VersionDescriptor {
    type Err = anyhow::Error;

    /// Parse `[epoch:]version-release`, e.g. `1:2.0.3-2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = epoch
                    .parse::<u64>()
                    .with_context(|| format!("Invalid epoch in version '{}'", s))?;
                (Some(epoch), rest)
            }
            None => (None, s),
        };

        let (version, release) = rest
            .rsplit_once('-')
            .ok_or_else(|| anyhow!("Version '{}' is missing a release counter", s))?;

        if version.is_empty() || release.is_empty() {
            anyhow::bail!("Invalid version '{}'", s);
        }

        Ok(Self::new(epoch, version, release))
    }
}

/// Compare two version strings the way pacman's `vercmp` does.
///
/// Strings are split into runs of digits and runs of letters; everything
/// else is a separator. Digit runs compare numerically and always beat
/// letter runs. Once one side is exhausted, a trailing letter run is older
/// (`1.0a < 1.0`) and a trailing digit run is newer (`1.0.1 > 1.0`).
pub fn vercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (sep_a, sep_b) = (i, j);
        while i < a.len() && !a[i].is_ascii_alphanumeric() {
            i += 1;
        }
        while j < b.len() && !b[j].is_ascii_alphanumeric() {
            j += 1;
        }

        if i >= a.len() || j >= b.len() {
            break;
        }

        if i - sep_a != j - sep_b {
            return (i - sep_a).cmp(&(j - sep_b));
        }

        let (start_a, start_b) = (i, j);
        let numeric = a[i].is_ascii_digit();
        let same_class: fn(&u8) -> bool = if numeric {
            u8::is_ascii_digit
        } else {
            u8::is_ascii_alphabetic
        };

        while i < a.len() && same_class(&a[i]) {
            i += 1;
        }
        while j < b.len() && same_class(&b[j]) {
            j += 1;
        }

        // Segment types differ: numbers are newer than letters.
        if j == start_b {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let (seg_a, seg_b) = (&a[start_a..i], &b[start_b..j]);
        let ord = if numeric {
            compare_numeric(seg_a, seg_b)
        } else {
            seg_a.cmp(seg_b)
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    let a_done = i >= a.len();
    let b_done = j >= b.len();
    if a_done && b_done {
        return Ordering::Equal;
    }

    let a_alpha = a.get(i).is_some_and(u8::is_ascii_alphabetic);
    let b_alpha = b.get(j).is_some_and(u8::is_ascii_alphabetic);

    if (a_done && !b_alpha) || a_alpha {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let start = digits
        .iter()
        .position(|&d| d != b'0')
        .unwrap_or(digits.len());
    &digits[start..]
}
