//! Parses command-line arguments for the replay CLI.

use std::path::PathBuf;

use clap::{crate_version, Parser};

#[derive(Debug, Parser)]
#[clap(
    name = "custody-replay",
    about = "Replays keygen transactions and epoch changes against a custody state",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[clap(
        long,
        short = 'p',
        help = "The file containing the consensus params. Built-in defaults are used if absent"
    )]
    pub params: Option<PathBuf>,

    #[clap(
        long,
        short = 'c',
        help = "The file containing the replay configuration",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    #[clap(
        long,
        short = 't',
        help = "The file with one JSON-encoded entry per line to replay"
    )]
    pub txs: PathBuf,
}
