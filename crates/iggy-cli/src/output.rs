//! Output formatting and display utilities
//!
//! Provides colored, formatted output for the CLI

use colored::Colorize;
use std::path::Path;

use iggy::inspec::Control;
use iggy::terraform::ProfileBindings;

use crate::profile::GeneratedFile;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a subheader
pub fn subheader(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print extracted profile bindings with the command to run each one
pub fn print_bindings(bindings: &ProfileBindings) {
    if bindings.is_empty() {
        warning("No iggy-tagged resources found");
        return;
    }

    subheader(&format!("{} profile binding(s):", bindings.len()));
    for (key, binding) in bindings {
        println!(
            "  {} {} {}",
            "→".cyan(),
            key.bold(),
            format!("[{}]", binding.binding_type()).dimmed()
        );
        println!("    {}", binding.exec_command());
    }
    println!();
}

/// Print a short summary of generated controls
pub fn print_control_summary(controls: &[Control]) {
    subheader("Controls:");
    for control in controls {
        let checks = control.assertion_tuples().len();
        println!(
            "  {} {} {}",
            "✓".green(),
            control.id,
            format!("({} checks)", checks).dimmed()
        );
    }
}

/// Print generated files
pub fn print_generated_files(files: &[GeneratedFile], output_dir: &Path) {
    subheader("Generated files:");

    for file in files {
        let full_path = output_dir.join(&file.path);
        println!("  {} {}", "→".cyan(), full_path.display());
    }
}

/// Print generated files without writing them
pub fn print_dry_run(files: &[GeneratedFile]) {
    subheader("Would generate:");
    for file in files {
        println!("\n{}", "─".repeat(60));
        println!("{}", file.path);
        println!("{}", "─".repeat(60));
        println!("{}", file.content);
    }
}

/// Print a JSON report
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
