//! InSpec profile generation
//!
//! Lays out generated controls as a self-contained InSpec profile:
//!
//! ```text
//! <output>/
//! ├── inspec.yml
//! ├── README.md
//! └── controls/
//!     └── generated.rb
//! ```

use serde::Serialize;
use std::path::Path;

use iggy::inspec::Control;

use crate::config::ProfileConfig;
use crate::error::{CliError, Result};

/// Relative path of the generated controls file
pub const CONTROLS_FILE: &str = "controls/generated.rb";

/// A generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative path from output directory
    pub path: String,

    /// File content
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Write the file to disk
    pub fn write(&self, base_dir: &Path) -> Result<()> {
        let full_path = base_dir.join(&self.path);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CliError::OutputDirCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(&full_path, &self.content).map_err(|e| CliError::FileWrite {
            path: full_path.clone(),
            source: e,
        })
    }
}

/// inspec.yml contents
#[derive(Debug, Serialize)]
struct ProfileMetadata<'a> {
    name: &'a str,
    title: String,
    maintainer: &'a str,
    copyright: &'a str,
    copyright_email: &'a str,
    license: &'a str,
    summary: String,
    version: &'a str,
    supports: Vec<Platform>,
}

#[derive(Debug, Serialize)]
struct Platform {
    platform: &'static str,
}

/// Build all files of an InSpec profile named `name`
pub fn build(
    config: &ProfileConfig,
    name: &str,
    controls: &[Control],
    source: &Path,
) -> Result<Vec<GeneratedFile>> {
    if name.trim().is_empty() {
        return Err(CliError::invalid("name", "profile name must not be empty"));
    }

    let source = source.display().to_string();
    let title = config
        .title
        .clone()
        .unwrap_or_else(|| format!("InSpec profile {}", name));
    let summary = config
        .summary
        .clone()
        .unwrap_or_else(|| format!("Controls generated from {}", source));

    let metadata = ProfileMetadata {
        name,
        title: title.clone(),
        maintainer: &config.maintainer,
        copyright: &config.copyright,
        copyright_email: &config.copyright_email,
        license: &config.license,
        summary: summary.clone(),
        version: &config.version,
        supports: vec![Platform { platform: "aws" }],
    };

    Ok(vec![
        GeneratedFile::new("inspec.yml", serde_yaml::to_string(&metadata)?),
        GeneratedFile::new(CONTROLS_FILE, render_controls(controls, &source)),
        GeneratedFile::new("README.md", render_readme(name, &title, &summary, controls.len())),
    ])
}

/// Render all controls as one Ruby file
pub fn render_controls(controls: &[Control], source: &str) -> String {
    let mut out = String::from("# encoding: utf-8\n#\n");
    out.push_str(&format!(
        "# Generated by iggy v{} from {}\n",
        iggy::VERSION,
        source
    ));
    for control in controls {
        out.push('\n');
        out.push_str(&control.to_ruby());
    }
    out
}

fn render_readme(name: &str, title: &str, summary: &str, control_count: usize) -> String {
    format!(
        r#"# {}

{}

{}

This profile contains {} generated control(s) in `{}`.

## Usage

```bash
inspec exec {} -t aws://
```
"#,
        name, title, summary, control_count, CONTROLS_FILE, name
    )
}

/// Refuse to write into a non-empty directory unless `overwrite` is set
pub fn ensure_writable(output_dir: &Path, overwrite: bool) -> Result<()> {
    if overwrite || !output_dir.exists() {
        return Ok(());
    }
    let mut entries = std::fs::read_dir(output_dir).map_err(|e| CliError::OutputDirCreation {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    if entries.next().is_some() {
        return Err(CliError::OutputExists {
            path: output_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Write every file under `output_dir`
pub fn write_all(files: &[GeneratedFile], output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| CliError::OutputDirCreation {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    for file in files {
        file.write(output_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iggy::inspec::{Assertion, Describe};

    fn sample_controls() -> Vec<Control> {
        let mut ctrl = Control::new("aws_vpc::vpc-1", "Iggy aws_vpc::vpc-1", 1.0);
        ctrl.set_description("aws_vpc::vpc-1 from the source file /tmp/s.tfstate");
        let mut describe = Describe::new("aws_vpc", "vpc-1");
        describe.add(Assertion::Exist);
        ctrl.add_describe(describe);
        vec![ctrl]
    }

    #[test]
    fn test_build_profile_files() {
        let files = build(
            &ProfileConfig::default(),
            "network",
            &sample_controls(),
            Path::new("/tmp/s.tfstate"),
        )
        .unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["inspec.yml", CONTROLS_FILE, "README.md"]);

        let metadata: serde_yaml::Value = serde_yaml::from_str(&files[0].content).unwrap();
        assert_eq!(metadata["name"], "network");
        assert_eq!(metadata["title"], "InSpec profile network");
        assert_eq!(metadata["license"], "Apache-2.0");
        assert_eq!(metadata["summary"], "Controls generated from /tmp/s.tfstate");
        assert_eq!(metadata["supports"][0]["platform"], "aws");

        assert!(files[1].content.starts_with("# encoding: utf-8\n"));
        assert!(files[1].content.contains("control \"aws_vpc::vpc-1\" do"));
        assert!(files[1].content.contains("it { should exist }"));

        assert!(files[2].content.contains("1 generated control(s)"));
    }

    #[test]
    fn test_config_overrides_metadata() {
        let config = ProfileConfig {
            title: Some("Baseline".to_string()),
            summary: Some("Network checks".to_string()),
            ..ProfileConfig::default()
        };
        let files = build(&config, "net", &[], Path::new("s.tfstate")).unwrap();
        let metadata: serde_yaml::Value = serde_yaml::from_str(&files[0].content).unwrap();
        assert_eq!(metadata["title"], "Baseline");
        assert_eq!(metadata["summary"], "Network checks");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = build(&ProfileConfig::default(), "  ", &[], Path::new("s")).unwrap_err();
        assert!(matches!(err, CliError::InvalidValue { .. }));
    }

    #[test]
    fn test_write_and_overwrite_guard() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("profile");

        ensure_writable(&out, false).unwrap();
        let files = build(
            &ProfileConfig::default(),
            "profile",
            &sample_controls(),
            Path::new("s.tfstate"),
        )
        .unwrap();
        write_all(&files, &out).unwrap();

        let written = std::fs::read_to_string(out.join(CONTROLS_FILE)).unwrap();
        assert_eq!(written, files[1].content);
        assert!(out.join("inspec.yml").is_file());

        let err = ensure_writable(&out, false).unwrap_err();
        assert!(matches!(err, CliError::OutputExists { .. }));
        ensure_writable(&out, true).unwrap();
    }

    #[test]
    fn test_empty_existing_dir_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        ensure_writable(dir.path(), false).unwrap();
    }
}
