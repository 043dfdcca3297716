//! # opsimsummary
//!
//! Normalized access to the survey pointings produced by the LSST Operations Simulator
//! (OpSim). Three generations of OpSim output (`lsstv3`, `sstf`, `lsstv4`) name their tables
//! and columns differently, store angles in different units, and label the survey proposals
//! differently. This crate reads any of them into a single canonical
//! [`catalog::PointingCatalog`]:
//!
//! - proposals classified into wide-fast-deep and deep-drilling roles,
//! - pointings filtered to a [`subset::Subset`] of proposals,
//! - RA/Dec converted to radians,
//! - one record per pointing (except for the `_all` subset),
//! - a canonical table that can be cached and reloaded through a [`storage::TableStore`].
//!
//! ```rust,no_run
//! use opsimsummary::{CatalogOptions, OpSimVersion, PointingCatalog, Subset};
//! use opsimsummary::storage::ParquetStore;
//!
//! # fn demo() -> Result<(), opsimsummary::OpSimError> {
//! let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::Combined);
//! let catalog = PointingCatalog::from_store(&ParquetStore::new("minion_1016"), &options)?;
//! for (prop_id, count) in catalog.count_by_proposal() {
//!     println!("{prop_id}: {count}");
//! }
//! # Ok(()) }
//! ```
pub mod catalog;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod opsim_errors;
pub mod pointing;
pub mod proposals;
pub mod storage;
pub mod subset;
pub mod table;
pub mod version;

pub use catalog::PointingCatalog;
pub use config::CatalogOptions;
pub use opsim_errors::OpSimError;
pub use subset::Subset;
pub use version::OpSimVersion;
