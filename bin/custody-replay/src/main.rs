//! Replays keygen transactions and epoch changes against a custody state and prints the outcome
//! of each entry as a JSON line.

use std::{
    fs,
    io::{self, BufRead, BufReader, Write},
    path::Path,
};

use anyhow::Context as _;
use clap::Parser;
use config::Config;
use custody_common::{logging, logging::LoggerConfig};
use custody_params::Params;
use custody_store::{KvStore, MemStore, SledStore};
use replay::{Entry, Replayer};
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};

mod adapter;
mod args;
mod config;
mod replay;

fn main() -> anyhow::Result<()> {
    logging::init(LoggerConfig::with_base_name("custody-replay"))?;

    let cli = args::Cli::parse();

    let params = match &cli.params {
        Some(path) => parse_toml::<Params>(path)?,
        None => Params::default(),
    };
    params.validate().context("invalid params")?;

    let config = parse_toml::<Config>(&cli.config)?;

    let mut sled_store = None;
    let mut mem_store = MemStore::new();
    let store: &mut dyn KvStore = match &config.datadir {
        Some(datadir) => sled_store.insert(SledStore::open(datadir)?),
        None => &mut mem_store,
    };

    let mut replayer = Replayer::new(&params, &config.chains);
    replayer.apply_genesis(store, &config.genesis)?;

    let txs = fs::File::open(&cli.txs)
        .with_context(|| format!("failed to open {}", cli.txs.display()))?;
    let mut stdout = io::stdout().lock();
    let mut applied = 0usize;
    let mut rejected = 0usize;

    for (idx, line) in BufReader::new(txs).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: Entry = serde_json::from_str(&line)
            .with_context(|| format!("line {}: malformed entry", idx + 1))?;
        let outcome = replayer
            .apply(store, &entry)
            .with_context(|| format!("line {}: replay aborted", idx + 1))?;

        if matches!(outcome, replay::Outcome::Tx { code, .. } if code != 0) {
            rejected += 1;
        }
        applied += 1;

        serde_json::to_writer(&mut stdout, &outcome)?;
        writeln!(stdout)?;
    }

    if let Some(sled_store) = &sled_store {
        let flushed = sled_store.flush()?;
        debug!(%flushed, "flushed state to disk");
    }

    info!(%applied, %rejected, "replay complete");

    Ok(())
}

/// Reads and parses a TOML file from the given path into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    trace!(?contents, "read file");

    let parsed = toml::from_str::<T>(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
