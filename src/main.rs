//! jsfinger CLI entry point
//!
//! All file I/O lives here: reading sources, loading the corpus directory and
//! the config file. The library only sees parsed trees and signatures.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jsfinger::cli::{CandidatesArgs, ExtractArgs, MatchArgs};
use jsfinger::{
    candidate_map, extract_signature, parse_source, rank, Cli, Commands, DetectConfig,
    ExtractOptions, FingerprintError, Lang, LibraryCorpus, LibraryId, Signature, TokenMode,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<FingerprintError>() {
                Some(fingerprint_error) => fingerprint_error.exit_code(),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = match &cli.config {
        Some(path) => DetectConfig::load(path)?,
        None => DetectConfig::default(),
    };
    init_tracing(cli.verbose, &config.logging.level);

    match &cli.command {
        Commands::Extract(args) => run_extract(args, &config),
        Commands::Match(args) => run_match(args, &config),
        Commands::Candidates(args) => run_candidates(args, &config),
    }
}

fn init_tracing(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    let mut filter = EnvFilter::from_default_env();
    match format!("jsfinger={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring log level '{}': {}", level, e),
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, FingerprintError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Read, parse and fingerprint one source file
fn signature_of(path: &Path, options: &ExtractOptions) -> Result<Signature, FingerprintError> {
    if !path.exists() {
        return Err(FingerprintError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let lang = Lang::from_path(path)?;
    let source = fs::read_to_string(path)?;
    tracing::debug!("Read {} bytes from {}", source.len(), path.display());

    let unit = parse_source(&source, lang)?;
    extract_signature(&unit, options)
}

/// Load every `<name>@<version>.json` signature in a directory
fn load_corpus(dir: &Path) -> anyhow::Result<LibraryCorpus> {
    if !dir.is_dir() {
        return Err(FingerprintError::FileNotFound {
            path: dir.display().to_string(),
        }
        .into());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading corpus directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut corpus = LibraryCorpus::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let id: LibraryId = match stem.parse() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading library signature {}", path.display()))?;
        match serde_json::from_str::<Signature>(&content) {
            Ok(signature) => corpus.add(id, signature),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    tracing::info!("Loaded {} library signatures from {}", corpus.len(), dir.display());
    Ok(corpus)
}

fn run_extract(args: &ExtractArgs, config: &DetectConfig) -> anyhow::Result<String> {
    let mut options = config.extract_options();
    if args.skip_declarations {
        options.mode = TokenMode::SkipDeclarations;
    }

    let signature = signature_of(&args.file, &options)?;
    Ok(to_json(&signature, args.pretty)?)
}

fn run_match(args: &MatchArgs, config: &DetectConfig) -> anyhow::Result<String> {
    let mut options = config.extract_options();
    if args.skip_declarations {
        options.mode = TokenMode::SkipDeclarations;
    }

    let mut rank_options = config.rank_options();
    if let Some(top_n) = args.top_n {
        rank_options.top_n = top_n;
    }
    if args.no_candidate_filter {
        rank_options.use_candidate_filter = false;
    }
    let strategy = args.strategy.unwrap_or(config.matching.strategy);

    let unknown = signature_of(&args.file, &options)?;
    let corpus = load_corpus(&args.corpus)?;
    let ranked = rank(&unknown, &corpus, strategy, &rank_options);
    Ok(to_json(&ranked, args.pretty)?)
}

fn run_candidates(args: &CandidatesArgs, config: &DetectConfig) -> anyhow::Result<String> {
    let corpus = load_corpus(&args.corpus)?;
    let options = config.extract_options();

    // A unit that fails to parse is reported and skipped, not fatal to the batch
    let mut units: Vec<(String, Signature)> = Vec::new();
    for path in &args.files {
        match signature_of(path, &options) {
            Ok(signature) => units.push((path.display().to_string(), signature)),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    let map = candidate_map(units.iter().map(|(id, s)| (id.as_str(), s)), &corpus);
    Ok(to_json(&map, args.pretty)?)
}
