//! Rhymescope CLI — rhyme-cluster analysis for song lyrics.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rhymescope_core::cache::FsCacheStore;
use rhymescope_core::language::{devanagari, english, hinglish, script, unified};
use rhymescope_core::rhyme::{cluster, tail};
use rhymescope_core::types::Script;
use rhymescope_core::{AnalysisFlags, Analyzer};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "rhymescope",
    about = "Pronunciation-based rhyme detection and highlighting for lyrics",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze lyrics into rhyme clusters (JSON on stdout)
    Analyze(AnalyzeArgs),
    /// Show the phoneme pipeline stages for a single word
    Phonemes(PhonemesArgs),
    /// Inspect or clear the result cache
    Cache(CacheArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Lyrics file, or "-" for stdin
    input: PathBuf,

    /// Enable syllable-window (multisyllable / internal) rhyme detection
    #[arg(long, default_value_t = false)]
    multisyllable: bool,

    /// Enable Devanagari / Hinglish script routing
    #[arg(long, default_value_t = false)]
    multilingual: bool,

    /// Disable the result cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// CMU-format pronunciation dictionary to use instead of the seed lexicon
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct PhonemesArgs {
    /// The word to trace
    word: String,

    /// Route the word through script detection (otherwise English)
    #[arg(long, default_value_t = false)]
    multilingual: bool,
}

#[derive(Parser, Debug)]
struct CacheArgs {
    /// Remove all cached entries
    #[arg(long, default_value_t = false)]
    clear: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let outcome = match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Phonemes(args) => run_phonemes(args),
        Command::Cache(args) => run_cache(args),
    };

    if let Err(e) = outcome {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── analyze ─────────────────────────────────────────────────────

fn read_lyrics(input: &PathBuf) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read lyrics from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read lyrics: {}", input.display()))
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let lyrics = read_lyrics(&args.input)?;

    let mut analyzer = Analyzer::new();
    if let Some(path) = &args.dictionary {
        analyzer = analyzer.with_dictionary_file(path);
    }
    if !args.no_cache {
        analyzer = analyzer.with_cache(FsCacheStore::new(FsCacheStore::default_dir()));
    }

    let flags = AnalysisFlags {
        multisyllable: args.multisyllable,
        multilingual: args.multilingual,
        cache: !args.no_cache,
        oracle: false,
    };

    let result = analyzer.analyze(&lyrics, &flags);
    log::info!(
        "{} tokens, {} clusters{}",
        result.tokens.len(),
        result.clusters.len(),
        if result.degraded { " (degraded)" } else { "" }
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    Ok(())
}

// ─── phonemes ────────────────────────────────────────────────────

fn run_phonemes(args: PhonemesArgs) -> Result<()> {
    let word = args.word.trim();
    let detected = if args.multilingual {
        script::detect(word)
    } else {
        Script::English
    };
    println!("word:    {}", word);
    println!("script:  {:?}", detected);

    let lower = word.to_lowercase();
    let sequence = match detected {
        Script::Devanagari => devanagari::to_phonemes(word),
        Script::Hinglish => {
            let form = hinglish::transliterate(&lower);
            println!("devanagari: {}", form);
            devanagari::to_phonemes(&form)
        }
        Script::English => english::to_phonemes(&lower, &english::EmbeddedDictionary),
    };

    let raw: Vec<&str> = sequence.phonemes.iter().map(|p| p.symbol.as_str()).collect();
    println!("phonemes: {} ({:?})", raw.join(" "), sequence.origin);

    let unified_seq = unified::unify(&sequence);
    println!("unified:  {}", cluster::join_symbols(&unified_seq));
    println!("tail:     {}", cluster::join_symbols(tail::extract(&unified_seq)));
    println!("class:    {}", cluster::class_for(&unified_seq));
    Ok(())
}

// ─── cache ───────────────────────────────────────────────────────

fn run_cache(args: CacheArgs) -> Result<()> {
    let dir = FsCacheStore::default_dir();
    let store = FsCacheStore::new(&dir);

    if args.clear {
        store.clear().context("Failed to clear cache")?;
        println!("Cleared cache at {}", dir.display());
        return Ok(());
    }

    let info = store.info();
    println!("cache dir:   {}", dir.display());
    println!("entries:     {}", info.entries);
    println!("total bytes: {}", info.total_bytes);
    Ok(())
}
