//! Version selection for template lookups
//!
//! Template versions are `MAJOR[.MINOR[.PATCH]]` and are compared as semver
//! after padding missing components with zero. A reference can ask for:
//!
//! | Reference version | Selects |
//! |---|---|
//! | none, `latest` | highest version |
//! | `1` | highest `1.x.y` |
//! | `1.2` | highest `1.2.y` |
//! | `1.2.3` | exactly `1.2.3` |
//! | anything else | a document whose version string is identical |

use semver::Version;

use crate::constants::LATEST_VERSION_TAG;

/// Parse a template version, padding missing components.
///
/// ```
/// use jobtmpl_cli::store::version::parse_version;
///
/// assert_eq!(parse_version("2").unwrap().to_string(), "2.0.0");
/// assert_eq!(parse_version("1.4").unwrap().to_string(), "1.4.0");
/// assert!(parse_version("stable").is_none());
/// ```
#[must_use]
pub fn parse_version(version: &str) -> Option<Version> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }
    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Which stored versions a reference accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Major(u64),
    MajorMinor(u64, u64),
    Exact(Version),
    Tag(String),
}

impl VersionSelector {
    /// Interpret the version part of a reference.
    #[must_use]
    pub fn parse(version: Option<&str>) -> Self {
        let Some(version) = version else {
            return Self::Latest;
        };
        if version == LATEST_VERSION_TAG {
            return Self::Latest;
        }

        let components = version.split('.').count();
        match (parse_version(version), components) {
            (Some(v), 1) => Self::Major(v.major),
            (Some(v), 2) => Self::MajorMinor(v.major, v.minor),
            (Some(v), _) => Self::Exact(v),
            (None, _) => Self::Tag(version.to_string()),
        }
    }

    /// Whether a stored version string satisfies this selector.
    #[must_use]
    pub fn accepts(&self, stored: &str) -> bool {
        if let Self::Tag(tag) = self {
            return tag == stored;
        }
        let Some(version) = parse_version(stored) else {
            return false;
        };
        match self {
            Self::Latest => true,
            Self::Major(major) => version.major == *major,
            Self::MajorMinor(major, minor) => version.major == *major && version.minor == *minor,
            Self::Exact(exact) => version == *exact,
            Self::Tag(_) => false,
        }
    }
}

/// Pick the highest accepted version among `candidates`.
///
/// Versions that do not parse sort below every parsed version, so a tag
/// selector still finds its single identical match.
pub fn select_highest<'a, T>(
    candidates: impl IntoIterator<Item = (&'a str, T)>,
    selector: &VersionSelector,
) -> Option<T> {
    candidates
        .into_iter()
        .filter(|(version, _)| selector.accepts(version))
        .max_by(|(a, _), (b, _)| parse_version(a).cmp(&parse_version(b)))
        .map(|(_, item)| item)
}
