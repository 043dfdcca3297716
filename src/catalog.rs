//! # PointingCatalog: normalized pointings of one OpSim run
//!
//! [`PointingCatalog`] is the canonical in-memory view of an OpSim output, whatever the OpSim
//! version that produced it. Building one runs a fixed pipeline:
//!
//! 1. **Classify proposals** of the run into roles ([`crate::proposals::classify`]).
//! 2. **Resolve the proposal-ID filter** of the requested [`Subset`]
//!    ([`crate::subset::resolve_ids`]), possibly overridden by explicit IDs.
//! 3. **Read** the summary table: whole-table read for `_all`/`unique_all`, an
//!    [`InQuery`] on the proposal-ID column otherwise.
//! 4. **Rename** the version-specific columns to the canonical schema.
//! 5. **Zero deep-drilling dithers** if requested and meaningful for the version.
//! 6. **Convert** RA/Dec to radians (`_ra`, `_dec`).
//! 7. **Restrict** to the proposal-ID filter (never for `_all`).
//! 8. **De-duplicate** pointings logged under several proposals (not for `_all`).
//! 9. **Index** by pointing ID, checking uniqueness for de-duplicated subsets.
//!
//! Construction either succeeds completely or returns an [`OpSimError`]; there is no partial
//! catalog. Once built, the catalog is read-only.
//!
//! ## Example
//!
//! ```rust,no_run
//! use opsimsummary::catalog::PointingCatalog;
//! use opsimsummary::config::CatalogOptions;
//! use opsimsummary::storage::{MemoryStore, ParquetStore};
//! use opsimsummary::subset::Subset;
//! use opsimsummary::version::OpSimVersion;
//!
//! # fn demo() -> Result<(), opsimsummary::opsim_errors::OpSimError> {
//! let run = ParquetStore::new("baseline2018a");
//! let options = CatalogOptions::new(OpSimVersion::LsstV4, Subset::Combined);
//! let catalog = PointingCatalog::from_store(&run, &options)?;
//! println!("{} unique WFD+DDF pointings", catalog.len());
//!
//! // Cache the full run once, then reload subsets from the cache
//! let full = PointingCatalog::from_store(&run, &CatalogOptions::new(OpSimVersion::LsstV4, Subset::All))?;
//! let mut cache = MemoryStore::new();
//! full.persist(&mut cache)?;
//! let wfd = PointingCatalog::from_persisted(&cache, OpSimVersion::LsstV4, Subset::WideFastDeep, None)?;
//! # Ok(()) }
//! ```
use std::collections::{BTreeMap, BTreeSet};

use ahash::RandomState;
use itertools::Itertools;

use crate::config::CatalogOptions;
use crate::constants::{
    PointingId, PropId, DITHERED_DEC, DITHERED_RA, EXP_MJD, FIELD_DEC, FIELD_RA,
    FILT_SKY_BRIGHTNESS, FWHM_EFF, OBS_HIST_ID, PROPOSAL_KEY, PROP_ID, SUMMARY_KEY,
};
use crate::dedup::dedupe_for_version;
use crate::opsim_errors::OpSimError;
use crate::pointing::{records_from_canonical, records_to_table, PointingRecord};
use crate::proposals::{
    classify, proposals_from_canonical, proposals_from_table, proposals_to_table,
    ProposalRecord, Role, RoleMap,
};
use crate::storage::memory::FastHashMap;
use crate::storage::{InQuery, TableStore};
use crate::subset::{override_prop_ids, resolve_ids, Subset};
use crate::table::Table;
use crate::version::{OpSimVersion, SchemaDescriptor};

#[derive(Debug, Clone)]
pub struct PointingCatalog {
    version: OpSimVersion,
    subset: Subset,
    role_map: RoleMap,
    prop_ids: BTreeSet<PropId>,
    proposals: Vec<ProposalRecord>,
    records: Vec<PointingRecord>,
    /// Pointing ID → position of its first record
    index: FastHashMap<PointingId, usize>,
}

/// Proposal side of a catalog, resolved before the pointings are read.
struct ProposalContext {
    proposals: Vec<ProposalRecord>,
    role_map: RoleMap,
    prop_ids: BTreeSet<PropId>,
}

impl ProposalContext {
    fn resolve(
        proposals: Vec<ProposalRecord>,
        role_map: RoleMap,
        subset: Subset,
        explicit: Option<&BTreeSet<PropId>>,
    ) -> Result<Self, OpSimError> {
        let derived = resolve_ids(subset, &role_map, &proposals)?;
        Ok(ProposalContext {
            prop_ids: override_prop_ids(explicit, derived),
            proposals,
            role_map,
        })
    }
}

impl PointingCatalog {
    /// Build a catalog from a raw OpSim output exposed through a [`TableStore`].
    ///
    /// Arguments
    /// -----------------
    /// * `store`: the OpSim output; must provide the `Proposal` table and the summary table
    ///   of the version (`Summary` or `SummaryAllProps`).
    /// * `options`: version, subset, explicit IDs and dither-zeroing flag.
    ///
    /// Return
    /// ----------
    /// * The normalized catalog, or the first error met. Storage errors are returned as is.
    ///
    /// See also
    /// ------------
    /// * [`PointingCatalog::from_tables`] – same pipeline over tables already in memory.
    pub fn from_store<S>(store: &S, options: &CatalogOptions) -> Result<Self, OpSimError>
    where
        S: TableStore + ?Sized,
    {
        let descriptor = options.version.descriptor();
        let context = Self::proposal_context(&store.read_table(PROPOSAL_KEY)?, options)?;

        let summary = if options.subset.reads_whole_table() {
            store.read_table(descriptor.summary_table)?
        } else {
            let query = InQuery::new(
                descriptor.summary_table,
                descriptor.prop_id_in_summary,
                context.prop_ids.clone(),
            );
            tracing::debug!(%query, "querying summary table");
            store.read_query(&query)?
        };

        Self::normalize(&summary, context, options)
    }

    /// Build a catalog from raw, in-memory proposal and summary tables of one OpSim run.
    ///
    /// `summary` may hold the whole summary table; the subset filter is applied here, after
    /// dither zeroing. Deep-drilling rows therefore still need field-center columns when
    /// zeroing is on, even for a `wfd` catalog, whereas [`PointingCatalog::from_store`] only
    /// reads the rows of the subset's proposals and never sees them.
    pub fn from_tables(
        proposal_table: &Table,
        summary: &Table,
        options: &CatalogOptions,
    ) -> Result<Self, OpSimError> {
        let context = Self::proposal_context(proposal_table, options)?;
        Self::normalize(summary, context, options)
    }

    /// Reload a catalog written by [`PointingCatalog::persist`].
    ///
    /// The persisted tables are already canonical (radians, explicit roles), so only the
    /// subset filter and de-duplication are applied.
    ///
    /// Arguments
    /// -----------------
    /// * `store`: the store holding the `Summary` and `Proposal` keys.
    /// * `version`: version of the run the cache was built from.
    /// * `subset`: subset to extract from the cached run.
    /// * `prop_ids`: optional explicit proposal IDs, overriding the subset-derived ones.
    pub fn from_persisted<S>(
        store: &S,
        version: OpSimVersion,
        subset: Subset,
        prop_ids: Option<&BTreeSet<PropId>>,
    ) -> Result<Self, OpSimError>
    where
        S: TableStore + ?Sized,
    {
        let proposals = proposals_from_canonical(&store.read_table(PROPOSAL_KEY)?)?;
        let role_map = RoleMap::from_records(&proposals);
        let context = ProposalContext::resolve(proposals, role_map, subset, prop_ids)?;

        let records = records_from_canonical(&store.read_table(SUMMARY_KEY)?)?;
        Self::assemble(version, subset, prop_ids.is_some(), context, records)
    }

    /// Write the catalog under the `Summary` and `Proposal` keys.
    ///
    /// Only a `_all` catalog can be persisted: a filtered view has lost the pointings needed
    /// to rebuild the other subsets.
    pub fn persist<S>(&self, store: &mut S) -> Result<(), OpSimError>
    where
        S: TableStore + ?Sized,
    {
        if self.subset != Subset::All {
            return Err(OpSimError::InvalidOperation(format!(
                "only a {} catalog can be persisted, this one is {}",
                Subset::All,
                self.subset
            )));
        }
        store.write_table(SUMMARY_KEY, &self.summary_table()?)?;
        store.write_table(PROPOSAL_KEY, &proposals_to_table(&self.proposals)?)?;
        tracing::info!(version = %self.version, rows = self.len(), "persisted catalog");
        Ok(())
    }

    fn proposal_context(
        proposal_table: &Table,
        options: &CatalogOptions,
    ) -> Result<ProposalContext, OpSimError> {
        let descriptor = options.version.descriptor();
        let raw = proposals_from_table(proposal_table, descriptor)?;
        let (proposals, role_map) = classify(&raw, descriptor);
        ProposalContext::resolve(proposals, role_map, options.subset, options.prop_ids.as_ref())
    }

    /// Rename, zero dithers and convert angles, then hand over to [`Self::assemble`].
    fn normalize(
        summary: &Table,
        context: ProposalContext,
        options: &CatalogOptions,
    ) -> Result<Self, OpSimError> {
        let descriptor = options.version.descriptor();
        let canonical = summary.project_renamed(&canonical_columns(summary, descriptor))?;
        let mut records = records_from_canonical(&canonical)?;

        if zero_ddf_dithers_enabled(options, descriptor) {
            match context.role_map.get(Role::Ddf) {
                None => tracing::warn!(
                    version = %descriptor.version,
                    "dither zeroing requested but the run has no deep-drilling proposal"
                ),
                Some(ddf_ids) => {
                    for record in records.iter_mut().filter(|r| ddf_ids.contains(&r.prop_id)) {
                        if !record.zero_dither() {
                            return Err(OpSimError::MissingColumn(descriptor.field_ra.to_string()));
                        }
                    }
                }
            }
        }

        for record in records.iter_mut() {
            record.set_radians(descriptor.angle_unit);
        }

        Self::assemble(
            options.version,
            options.subset,
            options.prop_ids.is_some(),
            context,
            records,
        )
    }

    /// Filter, de-duplicate, order and index canonical records.
    fn assemble(
        version: OpSimVersion,
        subset: Subset,
        explicit_ids: bool,
        context: ProposalContext,
        mut records: Vec<PointingRecord>,
    ) -> Result<Self, OpSimError> {
        let ProposalContext {
            proposals,
            role_map,
            prop_ids,
        } = context;

        // `_all` is never filtered; `unique_all` only when the caller named proposals.
        let restrict = match subset {
            Subset::All => false,
            Subset::UniqueAll => explicit_ids,
            _ => true,
        };
        if restrict {
            records.retain(|r| prop_ids.contains(&r.prop_id));
        }

        if subset.drops_duplicates() {
            records = dedupe_for_version(records, &role_map, version.descriptor());
        }
        records.sort_by(|a, b| a.exp_mjd.total_cmp(&b.exp_mjd));

        let mut index: FastHashMap<PointingId, usize> =
            FastHashMap::with_capacity_and_hasher(records.len(), RandomState::default());
        for (pos, record) in records.iter().enumerate() {
            let first = *index.entry(record.obs_hist_id).or_insert(pos);
            if first != pos && subset.drops_duplicates() {
                return Err(OpSimError::DuplicatePointingID(record.obs_hist_id));
            }
        }

        tracing::info!(
            %version,
            %subset,
            pointings = records.len(),
            proposals = prop_ids.len(),
            "built pointing catalog"
        );

        Ok(PointingCatalog {
            version,
            subset,
            role_map,
            prop_ids,
            proposals,
            records,
            index,
        })
    }

    pub fn version(&self) -> OpSimVersion {
        self.version
    }

    pub fn descriptor(&self) -> &'static SchemaDescriptor {
        self.version.descriptor()
    }

    pub fn subset(&self) -> Subset {
        self.subset
    }

    pub fn role_map(&self) -> &RoleMap {
        &self.role_map
    }

    /// Effective proposal-ID filter: explicit IDs if given, else the subset's IDs.
    pub fn prop_ids(&self) -> &BTreeSet<PropId> {
        &self.prop_ids
    }

    /// Every proposal of the run, labelled with its role.
    pub fn proposals(&self) -> &[ProposalRecord] {
        &self.proposals
    }

    /// Records ordered by exposure time.
    pub fn records(&self) -> &[PointingRecord] {
        &self.records
    }

    /// Pointing IDs ordered by exposure time.
    pub fn pointing_ids(&self) -> Vec<PointingId> {
        self.records.iter().map(|r| r.obs_hist_id).collect()
    }

    /// First record of `pointing_id` in exposure-time order.
    pub fn get(&self, pointing_id: PointingId) -> Option<&PointingRecord> {
        self.index.get(&pointing_id).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records per proposal ID.
    pub fn count_by_proposal(&self) -> BTreeMap<PropId, usize> {
        self.records
            .iter()
            .map(|r| r.prop_id)
            .counts()
            .into_iter()
            .collect()
    }

    /// Canonical Summary table of the catalog.
    pub fn summary_table(&self) -> Result<Table, OpSimError> {
        records_to_table(&self.records)
    }
}

fn zero_ddf_dithers_enabled(options: &CatalogOptions, descriptor: &SchemaDescriptor) -> bool {
    if options.zero_ddf_dithers && descriptor.zeroes_ddf_dithers_upstream {
        tracing::warn!(
            version = %descriptor.version,
            "zero_ddf_dithers requested, but this version already logs deep-drilling pointings \
             at their field centers; proceeding without it"
        );
        return false;
    }
    options.zero_ddf_dithers
}

/// `(source, canonical)` column pairs of a raw summary table.
///
/// The field-center columns are optional in the source.
fn canonical_columns<'a>(
    summary: &Table,
    descriptor: &'a SchemaDescriptor,
) -> Vec<(&'a str, &'static str)> {
    let mut pairs = vec![
        (descriptor.pointing_id, OBS_HIST_ID),
        (descriptor.prop_id_in_summary, PROP_ID),
        (descriptor.pointing_ra, DITHERED_RA),
        (descriptor.pointing_dec, DITHERED_DEC),
    ];
    if summary.has_column(descriptor.field_ra) && summary.has_column(descriptor.field_dec) {
        pairs.push((descriptor.field_ra, FIELD_RA));
        pairs.push((descriptor.field_dec, FIELD_DEC));
    }
    pairs.extend([
        (descriptor.exp_mjd, EXP_MJD),
        (descriptor.fwhm_eff, FWHM_EFF),
        (descriptor.filt_sky_brightness, FILT_SKY_BRIGHTNESS),
    ]);
    pairs
}

#[cfg(test)]
mod catalog_test {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::table::Column;
    use approx::assert_relative_eq;

    fn v3_proposals() -> Table {
        Table::new()
            .with_column("propID", Column::Int64(vec![1, 2]))
            .unwrap()
            .with_column(
                "propConf",
                Column::Utf8(vec!["Universal-18-0824B".into(), "DDcosmology1".into()]),
            )
            .unwrap()
    }

    fn v3_summary() -> Table {
        Table::new()
            .with_column("obsHistID", Column::Int64(vec![100, 100, 101]))
            .unwrap()
            .with_column("propID", Column::Int64(vec![1, 2, 2]))
            .unwrap()
            .with_column("ditheredRA", Column::Float64(vec![10.0, 10.0, 1.1]))
            .unwrap()
            .with_column("ditheredDec", Column::Float64(vec![20.0, 20.0, -0.6]))
            .unwrap()
            .with_column("fieldRA", Column::Float64(vec![10.0, 10.0, 1.0]))
            .unwrap()
            .with_column("fieldDec", Column::Float64(vec![20.0, 20.0, -0.5]))
            .unwrap()
            .with_column("expMJD", Column::Float64(vec![59580.1, 59580.1, 59580.0]))
            .unwrap()
            .with_column("FWHMeff", Column::Float64(vec![0.7, 0.7, 0.9]))
            .unwrap()
            .with_column("filtSkyBrightness", Column::Float64(vec![21.0, 21.0, 20.2]))
            .unwrap()
    }

    #[test]
    fn test_combined_keeps_wfd_record() {
        let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::Combined);
        let catalog = PointingCatalog::from_tables(&v3_proposals(), &v3_summary(), &options).unwrap();

        assert_eq!(catalog.pointing_ids(), vec![101, 100]);
        assert_eq!(catalog.get(100).unwrap().prop_id, 1);
        assert_eq!(catalog.prop_ids(), &BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_ddf_dithers_zeroed_in_radians() {
        let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::DeepDrilling);
        let catalog = PointingCatalog::from_tables(&v3_proposals(), &v3_summary(), &options).unwrap();

        let ddf = catalog.get(101).unwrap();
        assert_relative_eq!(ddf.ra, 1.0);
        assert_relative_eq!(ddf.dec, -0.5);

        let options = options.with_zero_ddf_dithers(false);
        let catalog = PointingCatalog::from_tables(&v3_proposals(), &v3_summary(), &options).unwrap();
        assert_relative_eq!(catalog.get(101).unwrap().ra, 1.1);
    }

    #[test]
    fn test_all_keeps_duplicates_and_persists() {
        let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::All);
        let catalog = PointingCatalog::from_tables(&v3_proposals(), &v3_summary(), &options).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.count_by_proposal(), BTreeMap::from([(1, 1), (2, 2)]));

        let mut store = MemoryStore::new();
        catalog.persist(&mut store).unwrap();
        assert!(store.contains(SUMMARY_KEY));
        assert!(store.contains(PROPOSAL_KEY));
    }

    #[test]
    fn test_persist_rejects_subsets() {
        let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::UniqueAll);
        let catalog = PointingCatalog::from_tables(&v3_proposals(), &v3_summary(), &options).unwrap();
        assert_eq!(catalog.len(), 2);

        let err = catalog.persist(&mut MemoryStore::new()).unwrap_err();
        assert!(matches!(err, OpSimError::InvalidOperation(_)));
    }

    #[test]
    fn test_zeroing_without_field_center_depends_on_rows_read() {
        let summary = v3_summary();
        let pairs: Vec<(&str, &str)> = summary
            .column_names()
            .filter(|n| *n != "fieldRA" && *n != "fieldDec")
            .map(|n| (n, n))
            .collect();
        let without_center = summary.project_renamed(&pairs).unwrap();
        let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::WideFastDeep);

        let err = PointingCatalog::from_tables(&v3_proposals(), &without_center, &options)
            .unwrap_err();
        assert_eq!(err, OpSimError::MissingColumn("fieldRA".into()));

        let store = MemoryStore::new()
            .with_table(PROPOSAL_KEY, v3_proposals())
            .with_table("Summary", without_center);
        let catalog = PointingCatalog::from_store(&store, &options).unwrap();
        assert_eq!(catalog.pointing_ids(), vec![100]);
    }

    #[test]
    fn test_dither_zeroing_needs_field_center() {
        let summary = v3_summary();
        let names: Vec<&str> = summary
            .column_names()
            .filter(|n| *n != "fieldRA" && *n != "fieldDec")
            .collect();
        let pairs: Vec<(&str, &str)> = names.iter().map(|n| (*n, *n)).collect();
        let without_center = summary.project_renamed(&pairs).unwrap();

        let options = CatalogOptions::new(OpSimVersion::LsstV3, Subset::Combined);
        let err = PointingCatalog::from_tables(&v3_proposals(), &without_center, &options).unwrap_err();
        assert_eq!(err, OpSimError::MissingColumn("fieldRA".into()));

        let options = options.with_zero_ddf_dithers(false);
        assert!(PointingCatalog::from_tables(&v3_proposals(), &without_center, &options).is_ok());
    }
}
