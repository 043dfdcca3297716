//! Summarize an OpSim run stored as Parquet or CSV files.
//!
//! ```text
//! cargo run --example summarize -- <run_dir> [options.toml]
//! OPSIM_VERSION=v4 OPSIM_SUBSET=wfd RUST_LOG=opsimsummary=debug cargo run --example summarize -- baseline2018a
//! ```
//!
//! The run directory holds `Proposal` and the summary table of the version, either as
//! `<name>.parquet` or `<name>.csv`. Options come from the TOML file if given, then the
//! `OPSIM_*` environment variables.
use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use tracing_subscriber::EnvFilter;

use opsimsummary::storage::{CsvStore, ParquetStore, TableStore};
use opsimsummary::{CatalogOptions, OpSimError, PointingCatalog};

fn open_store(root: &Utf8PathBuf) -> Box<dyn TableStore> {
    let parquet = ParquetStore::new(root.clone());
    if parquet.path_for("Proposal").exists() {
        Box::new(parquet)
    } else {
        Box::new(CsvStore::new(root.clone()))
    }
}

fn main() -> Result<(), OpSimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opsimsummary=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(root) = args.next().map(Utf8PathBuf::from) else {
        eprintln!("usage: summarize <run_dir> [options.toml]");
        std::process::exit(2);
    };
    let options = match args.next() {
        Some(path) => CatalogOptions::from_toml_file(&Utf8PathBuf::from(path))?,
        None => CatalogOptions::default(),
    }
    .with_env()?;

    let store = open_store(&root);
    let catalog = PointingCatalog::from_store(store.as_ref(), &options)?;

    let names: BTreeMap<_, _> = catalog
        .proposals()
        .iter()
        .map(|p| (p.prop_id, (p.name.as_str(), p.role.map_or("-", |r| r.as_str()))))
        .collect();

    println!(
        "{} run at {root}, subset {}: {} pointings",
        catalog.version(),
        catalog.subset(),
        catalog.len()
    );
    for (prop_id, count) in catalog.count_by_proposal() {
        let (name, role) = names.get(&prop_id).copied().unwrap_or(("?", "-"));
        println!("{prop_id:>6} {role:<4} {count:>8}  {name}");
    }

    if let (Some(first), Some(last)) = (catalog.records().first(), catalog.records().last()) {
        println!("MJD span: {:.5} .. {:.5}", first.exp_mjd, last.exp_mjd);
    }
    Ok(())
}
