use {anyhow::Result, clap::Subcommand};

use std::path::Path;

use quandary_config::{QuandaryConfig, Severity, find_config_file, validate};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration as JSON. Secrets are included.
    Show,
}

pub fn handle_config(
    config: &QuandaryConfig,
    path: Option<&Path>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(config, path, verbose),
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config: &QuandaryConfig, path: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate(config);

    if let Some(path) = path.map(Path::to_path_buf).or_else(find_config_file) {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
