pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use tally_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync { store, catalog } => handlers::handle_sync(store, catalog),
        Commands::Export { store, out } => handlers::handle_export(store, out),
        Commands::Record {
            store,
            kind,
            item,
            site,
            cost_element,
            lot,
            qty,
        } => handlers::handle_record(store, kind, item, site, cost_element, lot, qty),
        Commands::Balances {
            store,
            sites,
            items,
            summary,
            json,
        } => handlers::handle_balances(store, sites, items, summary, json),
        Commands::Clear { store } => handlers::handle_clear(store),
        Commands::Status { store } => handlers::handle_status(store),
    }
}
