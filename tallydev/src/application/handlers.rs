use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tally_core::backend_factory::{Kind, open_backend};
use tally_core::domain::{CatalogRow, ItemKey, MovementEvent};
use tally_core::error::{Result, TallyError};
use tally_core::{BalanceFilter, Inventory};

use crate::presentation::cli::KindArg;

fn open_inventory(store: &PathBuf) -> Result<Inventory> {
    let backend = open_backend(Kind::Fs, store)?;
    Ok(Inventory::open(backend))
}

pub fn handle_sync(store: PathBuf, catalog: PathBuf) -> Result<()> {
    let f = File::open(&catalog)?;
    let rows: Vec<CatalogRow> = serde_json::from_reader(f)
        .map_err(|e| TallyError::Format(format!("catalog json: {e}")))?;
    let n = rows.len();

    let inv = open_inventory(&store)?;
    let report = inv.replace_catalog(rows)?;
    eprintln!(
        "sync: {n} rows -> {} chunks ({} bytes), {} old chunks removed",
        report.chunks_written, report.bytes_written, report.chunks_deleted
    );
    Ok(())
}

pub fn handle_export(store: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let inv = open_inventory(&store)?;
    let table = inv.read_catalog()?;
    let json = serde_json::to_string_pretty(&table.rows)
        .map_err(|e| TallyError::Format(format!("catalog json: {e}")))?;
    match out {
        Some(path) => {
            let mut f = File::create(&path)?;
            f.write_all(json.as_bytes())?;
            eprintln!("export: {} rows -> {}", table.rows.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn handle_record(
    store: PathBuf,
    kind: KindArg,
    item: String,
    site: String,
    cost_element: String,
    lot: String,
    qty: String,
) -> Result<()> {
    let inv = open_inventory(&store)?;
    let event = MovementEvent::now(
        kind.into(),
        ItemKey {
            site_code: site,
            item_code: item,
            cost_element_code: cost_element,
            lot_code: lot,
        },
        qty,
    );
    let id = inv.record_movement(&event)?;
    eprintln!("record: {id}");
    Ok(())
}

pub fn handle_balances(
    store: PathBuf,
    sites: Vec<String>,
    items: Vec<String>,
    summary: bool,
    json: bool,
) -> Result<()> {
    let inv = open_inventory(&store)?;
    let filter = BalanceFilter {
        sites,
        items,
        ..Default::default()
    };

    let rows = match inv.balances(Some(&filter)) {
        Ok(rows) => rows,
        Err(TallyError::EmptySnapshot(_)) => {
            eprintln!("balances: no catalog loaded yet (run `tallydev sync` first)");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if summary {
        let s = tally_core::summarize(&rows);
        if json {
            println!(
                "{}",
                serde_json::to_string(&s)
                    .map_err(|e| TallyError::Format(format!("summary json: {e}")))?
            );
        } else {
            println!("pieces: {:.2}", s.pieces);
            println!("weight: {:.2}", s.weight);
        }
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows)
                .map_err(|e| TallyError::Format(format!("balances json: {e}")))?
        );
    } else {
        for r in &rows {
            println!(
                "{:<12} {:<14} {:<10} {:<8} init={:<5} net={:<8} qty={:<8} kg={:.2}",
                r.key.site_code,
                r.key.item_code,
                r.key.cost_element_code,
                r.key.lot_code,
                r.initial_quantity,
                r.net_movement,
                r.current_quantity,
                r.current_weight
            );
        }
        eprintln!("balances: {} rows", rows.len());
    }
    Ok(())
}

pub fn handle_clear(store: PathBuf) -> Result<()> {
    let inv = open_inventory(&store)?;
    let n = inv.clear_catalog()?;
    eprintln!("clear: {n} chunks removed");
    Ok(())
}

pub fn handle_status(store: PathBuf) -> Result<()> {
    let inv = open_inventory(&store)?;
    inv.status()?;
    eprintln!("status: OK");
    Ok(())
}
