//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::similarity::Strategy;

/// Structural fingerprinting of JavaScript bundles against known libraries
#[derive(Parser, Debug)]
#[command(name = "jsfinger")]
#[command(about = "Identify embedded JavaScript libraries by structural signature")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a jsfinger.toml configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the structural signature of a source file as JSON
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Rank corpus libraries by similarity to a source file
    #[command(visible_alias = "m")]
    Match(MatchArgs),

    /// List candidate libraries for each source file by shared literals
    #[command(visible_alias = "c")]
    Candidates(CandidatesArgs),
}

// ============================================
// Extract Subcommand
// ============================================

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// JavaScript/TypeScript file to fingerprint
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Omit variable and parameter declaration tokens
    #[arg(long)]
    pub skip_declarations: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

// ============================================
// Match Subcommand
// ============================================

/// Arguments for the match command
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Unknown source file to identify
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory of `<name>@<version>.json` library signatures
    #[arg(long, value_name = "DIR")]
    pub corpus: PathBuf,

    /// Similarity strategy (e.g. function-tokens-loose, literals-jaccard)
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<Strategy>,

    /// Number of libraries to report
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Score every library instead of only literal-sharing candidates
    #[arg(long)]
    pub no_candidate_filter: bool,

    /// Omit variable and parameter declaration tokens
    #[arg(long)]
    pub skip_declarations: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

// ============================================
// Candidates Subcommand
// ============================================

/// Arguments for the candidates command
#[derive(Args, Debug)]
pub struct CandidatesArgs {
    /// Source files to pre-filter
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Directory of `<name>@<version>.json` library signatures
    #[arg(long, value_name = "DIR")]
    pub corpus: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

fn parse_strategy(value: &str) -> Result<Strategy, String> {
    value.parse().map_err(|e: crate::error::FingerprintError| {
        let names: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
        format!("{} (expected one of: {})", e, names.join(", "))
    })
}
