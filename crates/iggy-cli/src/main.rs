//! Iggy CLI - InSpec content from Terraform state
//!
//! Extracts tagged profile bindings from a state file and generates InSpec
//! profiles whose controls assert the recorded state of each resource.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use iggy::diagnostics::TracingDiagnostics;
use iggy::observability::{self, LogFormat, ObservabilityConfig};
use iggy::terraform::{extract, ControlGenerator, StateDocument};

mod config;
mod error;
mod output;
mod profile;

use config::IggyConfig;
use error::{CliError, Result};

/// Iggy - generate InSpec compliance content from Terraform state
#[derive(Parser)]
#[command(name = "iggy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to iggy.toml configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format: pretty, json, compact
    #[arg(long, global = true, env = "LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with Terraform state files
    Terraform {
        #[command(subcommand)]
        command: TerraformCommands,
    },
}

#[derive(Subcommand)]
enum TerraformCommands {
    /// List InSpec profiles bound to resources through iggy tags
    Extract {
        /// Terraform state file
        #[arg(short, long)]
        tfstate: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate an InSpec profile from a Terraform state file
    Generate {
        /// Terraform state file
        #[arg(short, long)]
        tfstate: PathBuf,

        /// Profile name
        #[arg(short, long)]
        name: String,

        /// Output directory (defaults to the profile name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Resource catalog file overlaid on the builtin one
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print controls as JSON instead of writing a profile
        #[arg(long)]
        json: bool,

        /// Don't write files, just print what would be generated
        #[arg(long)]
        dry_run: bool,

        /// Write into a non-empty output directory
        #[arg(long)]
        overwrite: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_format.as_deref()) {
        output::warning(&e.to_string());
    }

    let result = match cli.command {
        Commands::Terraform { command } => match command {
            TerraformCommands::Extract { tfstate, json } => cmd_extract(&tfstate, json),

            TerraformCommands::Generate {
                tfstate,
                name,
                output,
                catalog,
                json,
                dry_run,
                overwrite,
            } => cmd_generate(
                cli.config.as_deref(),
                &tfstate,
                GenerateOptions {
                    name,
                    output,
                    catalog,
                    json,
                    dry_run,
                    overwrite,
                },
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, log_format: Option<&str>) -> Result<()> {
    let mut config = ObservabilityConfig::from_env();
    if let Some(format) = log_format {
        config.log_format = LogFormat::parse(format).ok_or_else(|| {
            CliError::invalid("log-format", format!("Unknown format: {}. Use 'pretty', 'json', or 'compact'", format))
        })?;
    }
    if verbose {
        config.log_filter = "iggy=debug".to_string();
    }
    observability::init(&config).map_err(|e| CliError::invalid("logging", e.to_string()))
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_extract(tfstate: &Path, json: bool) -> Result<()> {
    let doc = StateDocument::load(tfstate, &TracingDiagnostics)?;
    let bindings = extract(&doc, &TracingDiagnostics)?;

    if json {
        output::print_json(&bindings)?;
    } else {
        output::print_bindings(&bindings);
    }

    Ok(())
}

struct GenerateOptions {
    name: String,
    output: Option<PathBuf>,
    catalog: Option<PathBuf>,
    json: bool,
    dry_run: bool,
    overwrite: bool,
}

fn cmd_generate(config_path: Option<&Path>, tfstate: &Path, opts: GenerateOptions) -> Result<()> {
    let config = IggyConfig::load(config_path)?;
    let catalog = config.catalog(opts.catalog.as_deref())?;

    let doc = StateDocument::load(tfstate, &TracingDiagnostics)?;
    let controls = ControlGenerator::new(&catalog, &TracingDiagnostics).generate(&doc, tfstate)?;

    if opts.json {
        output::print_json(&controls)?;
        return Ok(());
    }

    let source = std::path::absolute(tfstate).unwrap_or_else(|_| tfstate.to_path_buf());
    let files = profile::build(&config.profile, &opts.name, &controls, &source)?;

    if opts.dry_run {
        output::print_dry_run(&files);
        return Ok(());
    }

    let output_dir = opts.output.unwrap_or_else(|| PathBuf::from(&opts.name));
    profile::ensure_writable(&output_dir, opts.overwrite)?;
    tracing::debug!(
        output = %output_dir.display(),
        files = files.len(),
        "Writing InSpec profile"
    );

    output::info(&format!(
        "Generating InSpec profile {} from {}...",
        opts.name,
        tfstate.display()
    ));
    profile::write_all(&files, &output_dir)?;

    output::print_control_summary(&controls);
    output::print_generated_files(&files, &output_dir);
    output::success(&format!(
        "Generated {} control(s) in {}",
        controls.len(),
        output_dir.display()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_args() {
        let cli = Cli::try_parse_from([
            "iggy",
            "terraform",
            "generate",
            "--tfstate",
            "terraform.tfstate",
            "--name",
            "network",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Terraform {
                command:
                    TerraformCommands::Generate {
                        tfstate,
                        name,
                        output,
                        dry_run,
                        overwrite,
                        ..
                    },
            } => {
                assert_eq!(tfstate, PathBuf::from("terraform.tfstate"));
                assert_eq!(name, "network");
                assert!(output.is_none());
                assert!(dry_run);
                assert!(!overwrite);
            }
            _ => panic!("expected terraform generate"),
        }
    }

    #[test]
    fn test_extract_requires_tfstate() {
        assert!(Cli::try_parse_from(["iggy", "terraform", "extract"]).is_err());
    }

    #[test]
    fn test_generate_writes_profile() {
        let dir = tempfile::tempdir().unwrap();
        let tfstate = dir.path().join("terraform.tfstate");
        std::fs::write(
            &tfstate,
            r#"{"modules": [{"resources": {
                "aws_vpc.main": {"type": "aws_vpc", "primary": {"id": "vpc-9", "attributes": {"cidr_block": "10.9.0.0/16"}}}
            }}]}"#,
        )
        .unwrap();
        let out = dir.path().join("net");

        cmd_generate(
            None,
            &tfstate,
            GenerateOptions {
                name: "net".to_string(),
                output: Some(out.clone()),
                catalog: None,
                json: false,
                dry_run: false,
                overwrite: false,
            },
        )
        .unwrap();

        let controls = std::fs::read_to_string(out.join(profile::CONTROLS_FILE)).unwrap();
        assert!(controls.contains("describe aws_vpc(\"vpc-9\") do"));
        assert!(controls.contains("its(\"cidr_block\") { should eq \"10.9.0.0/16\" }"));
    }

    #[test]
    fn test_extract_unsupported_resource_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tfstate = dir.path().join("terraform.tfstate");
        std::fs::write(
            &tfstate,
            r#"{"modules": [{"resources": {
                "aws_s3_bucket.b": {"type": "aws_s3_bucket", "primary": {"id": "b", "attributes": {"tags.iggy_name_x": "x"}}}
            }}]}"#,
        )
        .unwrap();

        let err = cmd_extract(&tfstate, true).unwrap_err();
        assert!(matches!(
            err,
            CliError::State(ref e) if e.kind() == iggy::ErrorKind::UnsupportedResource
        ));
    }
}
