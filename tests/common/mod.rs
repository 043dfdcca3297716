#![allow(dead_code)]

use opsimsummary::storage::{MemoryStore, TableStore};
use opsimsummary::table::{Column, Table};

fn ints(values: &[i64]) -> Column {
    Column::Int64(values.to_vec())
}

fn floats(values: &[f64]) -> Column {
    Column::Float64(values.to_vec())
}

fn strings(values: &[&str]) -> Column {
    Column::Utf8(values.iter().map(|s| s.to_string()).collect())
}

/// Raw `lsstv3` run: proposals 1 (WFD), 2 (DDF), 3 (galactic plane), angles in radians.
///
/// | obsHistID | propID | expMJD   |
/// |-----------|--------|----------|
/// | 100       | 1, 2   | 59580.10 |
/// | 101       | 2      | 59580.05 |
/// | 102       | 3      | 59580.20 |
/// | 103       | 1      | 59580.00 |
/// | 104       | 3, 2   | 59580.30 |
pub fn lsstv3_run() -> (Table, Table) {
    let proposals = Table::new()
        .with_column("propID", ints(&[1, 2, 3]))
        .unwrap()
        .with_column(
            "propConf",
            strings(&[
                "../conf/survey/Universal-18-0824B.conf",
                "../conf/survey/DDcosmology1.conf",
                "../conf/survey/GalacticPlaneProp.conf",
            ]),
        )
        .unwrap();

    let summary = Table::new()
        .with_column("obsHistID", ints(&[100, 100, 101, 102, 103, 104, 104]))
        .unwrap()
        .with_column("propID", ints(&[1, 2, 2, 3, 1, 3, 2]))
        .unwrap()
        .with_column(
            "ditheredRA",
            floats(&[0.50, 0.50, 1.10, 2.00, 0.30, 1.60, 1.60]),
        )
        .unwrap()
        .with_column(
            "ditheredDec",
            floats(&[-0.20, -0.20, -0.60, 0.10, -0.90, -0.40, -0.40]),
        )
        .unwrap()
        .with_column("fieldRA", floats(&[0.52, 0.52, 1.00, 2.00, 0.31, 1.50, 1.50]))
        .unwrap()
        .with_column(
            "fieldDec",
            floats(&[-0.21, -0.21, -0.50, 0.10, -0.88, -0.45, -0.45]),
        )
        .unwrap()
        .with_column(
            "expMJD",
            floats(&[59580.10, 59580.10, 59580.05, 59580.20, 59580.00, 59580.30, 59580.30]),
        )
        .unwrap()
        .with_column("FWHMeff", floats(&[0.7, 0.7, 0.9, 1.1, 0.8, 0.75, 0.75]))
        .unwrap()
        .with_column(
            "filtSkyBrightness",
            floats(&[21.0, 21.0, 20.2, 19.8, 21.3, 20.9, 20.9]),
        )
        .unwrap();

    (proposals, summary)
}

/// Raw `lsstv4` run: proposals 1 (other), 3 (WFD), 5 (DDF), angles in degrees.
///
/// Pointing 1 is logged under proposals 3 and 5.
pub fn lsstv4_run() -> (Table, Table) {
    let proposals = Table::new()
        .with_column("propId", ints(&[1, 3, 5]))
        .unwrap()
        .with_column(
            "propName",
            strings(&["NorthEclipticSpur", "WideFastDeep", "DeepDrillingCosmology1"]),
        )
        .unwrap();

    let summary = Table::new()
        .with_column("observationId", ints(&[1, 1, 2, 3]))
        .unwrap()
        .with_column("proposalId", ints(&[5, 3, 5, 1]))
        .unwrap()
        .with_column("fieldRA", floats(&[180.0, 180.0, 90.0, 10.0]))
        .unwrap()
        .with_column("fieldDec", floats(&[-45.0, -45.0, 0.0, 20.0]))
        .unwrap()
        .with_column(
            "observationStartMJD",
            floats(&[59853.2, 59853.2, 59853.1, 59853.4]),
        )
        .unwrap()
        .with_column("seeingFwhmEff", floats(&[0.8, 0.8, 1.0, 0.9]))
        .unwrap()
        .with_column("skyBrightness", floats(&[20.5, 20.5, 19.9, 21.1]))
        .unwrap();

    (proposals, summary)
}

/// Raw `sstf` run: proposals 1 (WFD), 2 (DDF), one record per pointing.
pub fn sstf_run() -> (Table, Table) {
    let proposals = Table::new()
        .with_column("propId", ints(&[1, 2]))
        .unwrap()
        .with_column("propName", strings(&["WideFastDeep", "Deep Drilling"]))
        .unwrap();

    let summary = Table::new()
        .with_column("observationId", ints(&[10, 11, 12]))
        .unwrap()
        .with_column("proposalId", ints(&[1, 2, 1]))
        .unwrap()
        .with_column("fieldRA", floats(&[0.0, 90.0, 270.0]))
        .unwrap()
        .with_column("fieldDec", floats(&[-30.0, -60.0, 0.0]))
        .unwrap()
        .with_column("observationStartMJD", floats(&[59853.0, 59853.5, 59853.2]))
        .unwrap()
        .with_column("seeingFwhmEff", floats(&[0.7, 0.9, 0.8]))
        .unwrap()
        .with_column("skyBrightness", floats(&[21.0, 20.0, 20.5]))
        .unwrap();

    (proposals, summary)
}

/// Store holding a raw run under the table names its version uses.
pub fn raw_store(proposals: Table, summary: Table, summary_table: &str) -> MemoryStore {
    MemoryStore::new()
        .with_table("Proposal", proposals)
        .with_table(summary_table, summary)
}

/// Write a raw run into any store.
pub fn write_run<S: TableStore>(store: &mut S, run: &(Table, Table), summary_table: &str) {
    store.write_table("Proposal", &run.0).unwrap();
    store.write_table(summary_table, &run.1).unwrap();
}
