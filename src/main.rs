//! hamt CLI - exercise a trie over generated keys
//!
//! Builds a trie from the keys "aaa", "aab", ... with each value set to the
//! key's insertion index, checks every lookup, optionally deletes a prefix of
//! the keys, and prints the resulting trie statistics.

use anyhow::{bail, Context};
use clap::Parser;
use hamt_trie::{Config, Hamt, HashWidth, TableMode, TransientHamt};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "hamt")]
#[command(about = "Build, verify and inspect a hash-array-mapped trie")]
#[command(version)]
struct Cli {
    /// JSON config file; overrides --width, --bits and --table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hash width in bits (32 or 64)
    #[arg(short, long, default_value = "64")]
    width: u32,

    /// Hash bits consumed per level (defaults to 5 for 32-bit, 6 for 64-bit)
    #[arg(short, long)]
    bits: Option<u32>,

    /// Table representation
    #[arg(short, long, default_value = "hybrid")]
    table: TableArg,

    /// Build with in-place updates instead of path copying
    #[arg(long)]
    transient: bool,

    /// Number of keys to insert
    #[arg(short = 'n', long, default_value = "17576")]
    count: usize,

    /// Number of keys to delete afterwards, starting from the first
    #[arg(short, long, default_value = "0")]
    delete: usize,

    /// Include the rendered node tree in the output
    #[arg(long)]
    dump: bool,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum TableArg {
    Fixed,
    Sparse,
    Hybrid,
}

impl From<TableArg> for TableMode {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Fixed => TableMode::Fixed,
            TableArg::Sparse => TableMode::Sparse,
            TableArg::Hybrid => TableMode::Hybrid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    config.validate()?;

    if cli.delete > cli.count {
        bail!("cannot delete {} of {} keys", cli.delete, cli.count);
    }

    let keys = generate_keys(cli.count);
    eprintln!(
        "Building {} trie ({}-bit hash, {} bits/level, {} tables) with {} keys...",
        if cli.transient { "transient" } else { "functional" },
        config.hash_width.bits(),
        config.index_bits,
        config.table_mode.name(),
        keys.len()
    );

    let started = Instant::now();
    let hamt = if cli.transient {
        build_transient(config, &keys, cli.delete)?
    } else {
        build_functional(config, &keys, cli.delete)?
    };
    let elapsed = started.elapsed();

    verify(&hamt, &keys, cli.delete)?;
    eprintln!("✓ Verified {} lookups", keys.len());

    let stats = hamt.stats();
    eprintln!("{stats}");

    let mut report = serde_json::json!({
        "status": "ok",
        "config": config,
        "discipline": if cli.transient { "transient" } else { "functional" },
        "inserted": keys.len(),
        "deleted": cli.delete,
        "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
        "stats": stats,
    });
    if cli.dump {
        report["dump"] = serde_json::Value::String(hamt.dump());
    }
    output(&cli.format, &report);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        return Ok(config);
    }

    let width = HashWidth::try_from(cli.width)?;
    let mut config = Config::new(width).with_table_mode(cli.table.into());
    if let Some(bits) = cli.bits {
        config = config.with_index_bits(bits);
    }
    Ok(config)
}

fn build_functional(
    config: Config,
    keys: &[String],
    delete: usize,
) -> anyhow::Result<Hamt<String, usize>> {
    let mut hamt = Hamt::with_config(config)?;
    for (i, key) in keys.iter().enumerate() {
        let (next, inserted) = hamt.put(key.clone(), i);
        if !inserted {
            bail!("duplicate key generated: {key}");
        }
        hamt = next;
    }
    for key in &keys[..delete] {
        let (next, removed) = hamt.delete(key.as_str());
        if removed.is_none() {
            bail!("delete of {key} found nothing");
        }
        hamt = next;
    }
    Ok(hamt)
}

fn build_transient(
    config: Config,
    keys: &[String],
    delete: usize,
) -> anyhow::Result<Hamt<String, usize>> {
    let mut hamt = TransientHamt::with_config(config)?;
    for (i, key) in keys.iter().enumerate() {
        if !hamt.put(key.clone(), i) {
            bail!("duplicate key generated: {key}");
        }
    }
    for key in &keys[..delete] {
        if hamt.delete(key.as_str()).is_none() {
            bail!("delete of {key} found nothing");
        }
    }
    Ok(hamt.to_functional())
}

fn verify(hamt: &Hamt<String, usize>, keys: &[String], deleted: usize) -> anyhow::Result<()> {
    for (i, key) in keys.iter().enumerate() {
        let found = hamt.get(key.as_str()).copied();
        let expected = (i >= deleted).then_some(i);
        if found != expected {
            bail!("lookup of {key}: expected {expected:?}, found {found:?}");
        }
    }
    if hamt.len() != keys.len() - deleted {
        bail!("length {} but expected {}", hamt.len(), keys.len() - deleted);
    }
    Ok(())
}

/// Keys "aaa", "aab", ..., "zzz", "aaaa", ...
fn generate_keys(count: usize) -> Vec<String> {
    let mut keys = Vec::with_capacity(count);
    let mut key = b"aaa".to_vec();
    for _ in 0..count {
        keys.push(String::from_utf8_lossy(&key).into_owned());
        next_key(&mut key);
    }
    keys
}

/// Increment like an odometer over 'a'..='z', growing a digit on overflow
fn next_key(key: &mut Vec<u8>) {
    for digit in key.iter_mut().rev() {
        if *digit < b'z' {
            *digit += 1;
            return;
        }
        *digit = b'a';
    }
    key.insert(0, b'a');
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Text => serde_json::to_string_pretty(value),
    };
    match text {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Failed to render output: {e}"),
    }
}
