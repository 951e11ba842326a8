use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tally_core::domain::MovementKind;

#[derive(Parser)]
#[command(author, version, about = "tallydev CLI (alpha)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Inbound,
    Outbound,
    TransferOut,
    TransferIn,
}

impl From<KindArg> for MovementKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Inbound => MovementKind::Inbound,
            KindArg::Outbound => MovementKind::Outbound,
            KindArg::TransferOut => MovementKind::TransferOut,
            KindArg::TransferIn => MovementKind::TransferIn,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the catalog snapshot from a JSON row file
    Sync {
        /// store directory
        store: PathBuf,
        /// JSON array of catalog rows
        catalog: PathBuf,
    },

    /// Dump the stored catalog as JSON
    Export {
        store: PathBuf,
        /// write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Append one movement to the ledger
    Record {
        store: PathBuf,
        #[arg(long)]
        kind: KindArg,
        #[arg(long)]
        item: String,
        #[arg(long)]
        site: String,
        #[arg(long, default_value = "")]
        cost_element: String,
        #[arg(long, default_value = "")]
        lot: String,
        #[arg(long)]
        qty: String,
    },

    /// Print the current balance table
    Balances {
        store: PathBuf,
        /// keep only these sites (repeatable)
        #[arg(long = "site")]
        sites: Vec<String>,
        /// keep only these items (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
        /// print the piece/weight totals instead of rows
        #[arg(long)]
        summary: bool,
        /// emit JSON instead of the text table
        #[arg(long)]
        json: bool,
    },

    /// Delete every chunk of the catalog snapshot
    Clear { store: PathBuf },

    /// Probe the backing store
    Status { store: PathBuf },
}
