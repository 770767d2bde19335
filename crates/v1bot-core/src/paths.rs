use crate::error::{Result, TrackerError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "v1bot.yaml";
pub const MAPPINGS_DIR: &str = "mappings";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn mappings_dir(root: &Path) -> PathBuf {
    root.join(MAPPINGS_DIR)
}

/// Backing file for one mapping domain: `<dir>/<domain>.json`.
pub fn mapping_path(dir: &Path, domain: &str) -> PathBuf {
    dir.join(format!("{domain}.json"))
}

// ---------------------------------------------------------------------------
// Domain name validation
// ---------------------------------------------------------------------------

static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();

fn domain_re() -> &'static Regex {
    DOMAIN_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap())
}

/// Domain names become file names, so they are restricted to lowercase
/// alphanumerics plus `-`/`_`.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() || domain.len() > 64 || !domain_re().is_match(domain) {
        return Err(TrackerError::InvalidDomainName(domain.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_domains() {
        for domain in ["projname", "v1ircnick", "team-a", "x_1"] {
            validate_domain(domain).unwrap_or_else(|_| panic!("expected valid: {domain}"));
        }
    }

    #[test]
    fn invalid_domains() {
        for domain in ["", "UPPER", "has space", "../escape", "-leading"] {
            assert!(validate_domain(domain).is_err(), "expected invalid: {domain}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/var/lib/v1bot");
        assert_eq!(
            config_path(root),
            PathBuf::from("/var/lib/v1bot/v1bot.yaml")
        );
        assert_eq!(
            mapping_path(&mappings_dir(root), "projname"),
            PathBuf::from("/var/lib/v1bot/mappings/projname.json")
        );
    }
}
