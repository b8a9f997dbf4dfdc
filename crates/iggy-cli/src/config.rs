//! Configuration parsing for iggy.toml
//!
//! The file is optional. It supplies metadata for generated InSpec profiles
//! and can point at a resource catalog file that extends the bundled one.
//!
//! ```toml
//! [profile]
//! maintainer = "Platform Team"
//! copyright = "Example Corp"
//! copyright_email = "platform@example.com"
//! license = "Apache-2.0"
//!
//! [catalog]
//! path = "catalog.yml"
//! builtin = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use iggy::inspec::Catalog;

use crate::error::{CliError, Result};

/// Configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "iggy.toml";

/// Root configuration structure for iggy.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IggyConfig {
    /// Metadata written to generated inspec.yml files
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Resource catalog selection
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl IggyConfig {
    /// Load the configuration
    ///
    /// An explicit path must exist. Without one, `iggy.toml` in the current
    /// directory is used if present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::ConfigNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from a string
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the resource catalog
    ///
    /// `override_path` (from the command line) takes precedence over
    /// `[catalog].path`.
    pub fn catalog(&self, override_path: Option<&Path>) -> Result<Catalog> {
        let base = if self.catalog.builtin {
            Catalog::builtin()
        } else {
            Catalog::default()
        };

        let extra = override_path.or(self.catalog.path.as_deref());
        let catalog = match extra {
            Some(path) => base.merge(Catalog::from_file(path)?),
            None => base,
        };

        if catalog.resource_count() == 0 {
            return Err(CliError::invalid(
                "catalog",
                "no InSpec resources available; enable the builtin catalog or provide a catalog file",
            ));
        }
        Ok(catalog)
    }
}

/// InSpec profile metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Profile title (defaults to a title derived from the profile name)
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default = "default_author")]
    pub maintainer: String,

    #[serde(default = "default_author")]
    pub copyright: String,

    #[serde(default = "default_email")]
    pub copyright_email: String,

    #[serde(default = "default_license")]
    pub license: String,

    /// Profile summary (defaults to one naming the source state file)
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            title: None,
            maintainer: default_author(),
            copyright: default_author(),
            copyright_email: default_email(),
            license: default_license(),
            summary: None,
            version: default_version(),
        }
    }
}

fn default_author() -> String {
    "The Authors".to_string()
}

fn default_email() -> String {
    "you@example.com".to_string()
}

fn default_license() -> String {
    "Apache-2.0".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Resource catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file overlaid on the builtin tables
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Start from the bundled AWS tables
    #[serde(default = "default_true")]
    pub builtin: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            builtin: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use iggy::inspec::ResourceCatalog;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[profile]
title = "Network baseline"
maintainer = "Platform Team"
copyright = "Example Corp"
copyright_email = "platform@example.com"
license = "MIT"
version = "1.2.0"

[catalog]
path = "catalog.yml"
builtin = false
"#;
        let config = IggyConfig::parse(toml, Path::new("iggy.toml")).unwrap();
        assert_eq!(config.profile.title.as_deref(), Some("Network baseline"));
        assert_eq!(config.profile.maintainer, "Platform Team");
        assert_eq!(config.profile.license, "MIT");
        assert_eq!(config.profile.version, "1.2.0");
        assert!(config.profile.summary.is_none());
        assert_eq!(config.catalog.path, Some(PathBuf::from("catalog.yml")));
        assert!(!config.catalog.builtin);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = IggyConfig::parse("", Path::new("iggy.toml")).unwrap();
        assert_eq!(config.profile.maintainer, "The Authors");
        assert_eq!(config.profile.license, "Apache-2.0");
        assert!(config.catalog.builtin);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = IggyConfig::parse("[profile\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, CliError::ConfigParse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_explicit_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iggy.toml");
        let err = IggyConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[profile]\nmaintainer = \"Ops\"").unwrap();
        let config = IggyConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.profile.maintainer, "Ops");
    }

    #[test]
    fn test_catalog_builtin_with_overlay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "resources:\n  aws_eip: [public_ip]").unwrap();

        let config = IggyConfig::default();
        let catalog = config.catalog(Some(file.path())).unwrap();
        assert!(catalog.is_known("aws_eip"));
        assert!(catalog.is_known("aws_vpc"));
    }

    #[test]
    fn test_catalog_without_builtin_or_file_is_rejected() {
        let mut config = IggyConfig::default();
        config.catalog.builtin = false;
        let err = config.catalog(None).unwrap_err();
        assert!(matches!(err, CliError::InvalidValue { ref field, .. } if field == "catalog"));
    }
}
