// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Claim Validator CLI
//!
//! Analyze claim documents from the command line with the same client the
//! web UI uses.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use claim_validator::config::AppConfig;
use claim_validator::intake::{check_total, format_bytes, ClaimFile};
use claim_validator::{analyze_documents, ClaimError, GeminiAnalyzer, Result, VerdictReport};

/// Claim Validator CLI - AI Insurance Claim Validation
#[derive(Parser, Debug)]
#[command(name = "claim-validator")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Validate insurance claim documents with a hosted AI model", long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze claim documents and print the verdict
    Analyze {
        /// Documents or directories of documents
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show AI service status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Analyze { paths, recursive }) => {
            run_analyze(config, paths, recursive, &cli.format).await
        }
        Some(Commands::Status) => run_status(config).await,
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        None => Ok(()),
    }
}

/// Run claim analysis over the given paths
async fn run_analyze(config: AppConfig, paths: Vec<PathBuf>, recursive: bool, format: &str) -> Result<()> {
    // Missing API key is fatal before any file is read
    let analyzer = GeminiAnalyzer::from_config(&config)?;

    let files = collect_files(&paths, recursive, &config)?;
    info!(
        "Collected {} document(s): {}",
        files.len(),
        files.iter().map(|f| format!("{} ({})", f.name, format_bytes(f.size))).collect::<Vec<_>>().join(", ")
    );

    let report = analyze_documents(&analyzer, &files).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", render_text(&report)),
    }

    Ok(())
}

/// Build claim files from explicit paths and directory contents.
///
/// Explicit files must be acceptable; unsupported files inside directories are skipped.
/// The combined size is held to the same upload limit as the web UI.
fn collect_files(paths: &[PathBuf], recursive: bool, config: &AppConfig) -> Result<Vec<ClaimFile>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in walk(path, recursive)? {
                match ClaimFile::from_path(&entry, &config.intake) {
                    Ok(file) => files.push(file),
                    Err(e @ ClaimError::UnsupportedFileType(_)) => debug!("Skipping {:?}: {}", entry, e),
                    Err(e) => warn!("Skipping {:?}: {}", entry, e),
                }
            }
        } else {
            files.push(ClaimFile::from_path(path, &config.intake)?);
        }
    }

    check_total(&files, &config.intake)?;
    Ok(files)
}

/// List files in a directory, sorted for a stable upload order
fn walk(path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(path)? {
        let p = entry?.path();
        if p.is_dir() {
            if recursive {
                files.extend(walk(&p, recursive)?);
            }
        } else if p.is_file() {
            files.push(p);
        }
    }

    files.sort();
    Ok(files)
}

/// Plain-text rendering of a verdict report
fn render_text(report: &VerdictReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", report.final_verdict.title()));
    out.push_str(&format!(
        "  Fraud score:       {}/100 ({})\n",
        report.display_score(),
        report.fraud_band().label()
    ));
    out.push_str(&format!("  Estimated payout:  {}\n", report.estimated_payout));
    out.push_str(&format!("\nSummary:\n  {}\n", report.summary.trim()));
    let outcome = if report.policy_checks.all_passed() { "all passed" } else { "failed" };
    out.push_str(&format!("\nPolicy rule checks ({}):\n", outcome));
    for (label, passed) in report.policy_checks.items() {
        let mark = if passed { "✓" } else { "✗" };
        out.push_str(&format!("  {} {}\n", mark, label));
    }

    out
}

/// Run status check
async fn run_status(config: AppConfig) -> Result<()> {
    println!("Claim Validator v{} Status", env!("CARGO_PKG_VERSION"));
    println!("==========================");
    println!("Service: {}", config.ai_engine.url);
    println!("Model:   {}", config.ai_engine.model);

    let analyzer = match GeminiAnalyzer::from_config(&config) {
        Ok(analyzer) => {
            println!("API key: set (${})", config.ai_engine.api_key_env);
            analyzer
        }
        Err(e) => {
            println!("API key: ✗ {}", e);
            return Ok(());
        }
    };

    match analyzer.client().model_available(analyzer.model()).await {
        Ok(true) => {
            println!("Service: Reachable");
            println!("Model:   → {} available", analyzer.model());
        }
        Ok(false) => {
            println!("Service: Reachable");
            println!("Model:   {} not listed (aliases such as *-latest may still resolve)", analyzer.model());
        }
        Err(e) => println!("Service: ✗ Error - {}", e),
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            println!("Configuration at {:?} is valid", config_path);
            println!("  Model: {}", config.ai_engine.model);
            println!("  API key variable: {}", config.ai_engine.api_key_env);
            println!("  Max file size: {}", format_bytes(config.intake.max_file_bytes));
            println!("  Accepted types: {}", config.intake.accepted.join(", "));
            println!("  Web UI: http://{}", config.bind_addr());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_validator::PolicyChecks;
    use claim_validator::Verdict;

    #[test]
    fn test_cli_analyze_command() {
        let cli = Cli::try_parse_from([
            "claim-validator", "analyze", "/tmp/invoice.pdf", "/tmp/photos", "--recursive", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.format, "json");
        match cli.command {
            Some(Commands::Analyze { paths, recursive }) => {
                assert!(recursive);
                assert_eq!(paths, vec![PathBuf::from("/tmp/invoice.pdf"), PathBuf::from("/tmp/photos")]);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_analyze_requires_paths() {
        assert!(Cli::try_parse_from(["claim-validator", "analyze"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["claim-validator", "--format", "yaml", "status"]).is_err());
    }

    #[test]
    fn test_render_text() {
        let report = VerdictReport {
            final_verdict: Verdict::Valid,
            fraud_score: 12.0,
            summary: "All documents agree.".to_string(),
            estimated_payout: "$2,400".to_string(),
            policy_checks: PolicyChecks {
                policy_active: true,
                incident_covered: true,
                time_limit_ok: false,
            },
        };

        let text = render_text(&report);
        assert!(text.starts_with("Claim Valid\n"));
        assert!(text.contains("12/100 (low)"));
        assert!(text.contains("$2,400"));
        assert!(text.contains("✗ Claim filed within allowed time limit"));
        assert!(text.contains("✓ Policy is active and in good standing"));
        assert!(text.contains("Policy rule checks (failed):"));
    }

    #[test]
    fn test_collect_files_skips_unsupported_in_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("claim.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"hello").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("nested").join("receipt.pdf"), b"%PDF-1.4").unwrap();

        let config = AppConfig::default();
        let flat = collect_files(&[tmp.path().to_path_buf()], false, &config).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].name, "claim.pdf");

        let deep = collect_files(&[tmp.path().to_path_buf()], true, &config).unwrap();
        assert_eq!(deep.len(), 2);

        let explicit = collect_files(&[tmp.path().join("notes.txt")], false, &config);
        assert!(matches!(explicit, Err(ClaimError::UnsupportedFileType(_))));
    }

    #[test]
    fn test_collect_files_rejects_batch_over_upload_limit() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"%PDF-1.4 first").unwrap();
        std::fs::write(tmp.path().join("b.pdf"), b"%PDF-1.4 second").unwrap();

        let mut config = AppConfig::default();
        config.intake.max_upload_bytes = 20;

        let one = collect_files(&[tmp.path().join("a.pdf")], false, &config).unwrap();
        assert_eq!(one.len(), 1);

        let both = collect_files(&[tmp.path().to_path_buf()], false, &config);
        assert!(matches!(both, Err(ClaimError::BatchTooLarge { total: 29, limit: 20 })));
    }
}
