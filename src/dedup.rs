//! # De-duplication of pointings logged under several proposals
//!
//! OpSim logs a visit once per proposal that claims it, so the same `obsHistID` may appear
//! several times with different `propID`s. Any subset other than `_all` must keep exactly one
//! record per pointing. Which one survives is decided by a [`ProposalPriority`]:
//!
//! 1. the wide-fast-deep record,
//! 2. else the deep-drilling record,
//! 3. else the first record of any other proposal,
//!
//! where "first" means first after a stable sort by exposure time. The output is ordered by
//! exposure time as well.
//!
//! ```rust
//! use opsimsummary::dedup::{dedupe, ProposalPriority};
//! # use opsimsummary::pointing::PointingRecord;
//! # fn visit(id: i64, prop_id: i64, t: f64) -> PointingRecord {
//! #     PointingRecord { obs_hist_id: id, prop_id, dithered_ra: 0.0, dithered_dec: 0.0,
//! #         field_ra: None, field_dec: None, exp_mjd: t, fwhm_eff: 0.7,
//! #         filt_sky_brightness: 21.0, ra: 0.0, dec: 0.0 }
//! # }
//! struct PreferLowIds;
//! impl ProposalPriority for PreferLowIds {
//!     fn priority_of(&self, prop_id: i64) -> u8 {
//!         if prop_id < 10 { 0 } else { 1 }
//!     }
//! }
//!
//! let kept = dedupe(vec![visit(7, 12, 1.0), visit(7, 3, 1.0)], &PreferLowIds);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].prop_id, 3);
//! ```
use std::collections::hash_map::Entry;

use ahash::RandomState;
use itertools::Itertools;

use crate::constants::{PointingId, PropId};
use crate::pointing::PointingRecord;
use crate::proposals::{Role, RoleMap};
use crate::storage::memory::FastHashMap;
use crate::version::SchemaDescriptor;

/// Rank of a proposal when the same pointing is logged more than once. Lower wins.
pub trait ProposalPriority {
    fn priority_of(&self, prop_id: PropId) -> u8;
}

impl ProposalPriority for RoleMap {
    fn priority_of(&self, prop_id: PropId) -> u8 {
        match self.role_of(prop_id) {
            Some(Role::Wfd) => 0,
            Some(Role::Ddf) => 1,
            None => 2,
        }
    }
}

/// Keep one record per pointing ID, chosen by `priority`, ordered by exposure time.
///
/// Arguments
/// -----------------
/// * `records`: pointing records, in any order.
/// * `priority`: proposal ranking; [`RoleMap`] ranks wide-fast-deep, then deep-drilling,
///   then everything else.
///
/// Return
/// ----------
/// * The surviving records, sorted by `exp_mjd` (stable). Running it again on its own output
///   returns the same records.
pub fn dedupe<P>(mut records: Vec<PointingRecord>, priority: &P) -> Vec<PointingRecord>
where
    P: ProposalPriority + ?Sized,
{
    records.sort_by(|a, b| a.exp_mjd.total_cmp(&b.exp_mjd));

    let mut winner: FastHashMap<PointingId, usize> =
        FastHashMap::with_capacity_and_hasher(records.len(), RandomState::default());
    for (idx, record) in records.iter().enumerate() {
        match winner.entry(record.obs_hist_id) {
            Entry::Vacant(v) => {
                v.insert(idx);
            }
            Entry::Occupied(mut o) => {
                let current = &records[*o.get()];
                if priority.priority_of(record.prop_id) < priority.priority_of(current.prop_id) {
                    o.insert(idx);
                }
            }
        }
    }

    let before = records.len();
    let keep: Vec<usize> = winner.into_values().sorted_unstable().collect();
    let mut keep = keep.into_iter().peekable();
    let deduped: Vec<PointingRecord> = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| keep.next_if_eq(&idx).map(|_| record))
        .collect();

    tracing::debug!(
        before,
        after = deduped.len(),
        "dropped pointings logged under several proposals"
    );
    deduped
}

/// [`dedupe`] for a given OpSim version: a passthrough for versions that never log a
/// pointing under more than one proposal.
pub fn dedupe_for_version(
    records: Vec<PointingRecord>,
    roles: &RoleMap,
    descriptor: &SchemaDescriptor,
) -> Vec<PointingRecord> {
    if !descriptor.logs_cross_proposal_duplicates {
        return records;
    }
    dedupe(records, roles)
}

#[cfg(test)]
mod dedup_test {
    use super::*;
    use crate::proposals::{classify, ProposalRecord};
    use crate::version::OpSimVersion;

    fn visit(id: PointingId, prop_id: PropId, t: f64) -> PointingRecord {
        PointingRecord {
            obs_hist_id: id,
            prop_id,
            dithered_ra: 0.1,
            dithered_dec: -0.2,
            field_ra: None,
            field_dec: None,
            exp_mjd: t,
            fwhm_eff: 0.7,
            filt_sky_brightness: 20.5,
            ra: 0.1,
            dec: -0.2,
        }
    }

    fn roles() -> RoleMap {
        let raw = vec![
            ProposalRecord::new(1, "conf/survey/Universal-18-0824B.conf"),
            ProposalRecord::new(2, "conf/survey/DDcosmology1.conf"),
            ProposalRecord::new(3, "conf/survey/GalacticPlaneProp.conf"),
            ProposalRecord::new(4, "conf/survey/SouthCelestialPole-18.conf"),
        ];
        classify(&raw, OpSimVersion::LsstV3.descriptor()).1
    }

    fn ids_and_props(records: &[PointingRecord]) -> Vec<(PointingId, PropId)> {
        records.iter().map(|r| (r.obs_hist_id, r.prop_id)).collect()
    }

    #[test]
    fn test_wfd_wins_over_ddf() {
        let records = vec![visit(100, 2, 10.0), visit(100, 1, 10.0)];
        let out = dedupe(records, &roles());
        assert_eq!(ids_and_props(&out), vec![(100, 1)]);
    }

    #[test]
    fn test_ddf_wins_over_other_proposals() {
        let records = vec![visit(7, 3, 5.0), visit(7, 2, 5.0), visit(7, 4, 5.0)];
        let out = dedupe(records, &roles());
        assert_eq!(ids_and_props(&out), vec![(7, 2)]);
    }

    #[test]
    fn test_other_proposals_keep_first_by_time() {
        let records = vec![visit(9, 4, 2.0), visit(9, 3, 1.0)];
        let out = dedupe(records, &roles());
        assert_eq!(ids_and_props(&out), vec![(9, 3)]);
    }

    #[test]
    fn test_output_sorted_by_exposure_time() {
        let records = vec![
            visit(3, 3, 3.0),
            visit(1, 1, 1.0),
            visit(2, 2, 2.0),
            visit(1, 2, 1.0),
            visit(4, 4, 0.5),
        ];
        let out = dedupe(records, &roles());
        assert_eq!(ids_and_props(&out), vec![(4, 4), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            visit(1, 2, 1.0),
            visit(1, 1, 1.0),
            visit(2, 3, 2.0),
            visit(2, 4, 2.0),
            visit(3, 2, 0.5),
        ];
        let once = dedupe(records, &roles());
        let twice = dedupe(once.clone(), &roles());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_passthrough_for_sstf() {
        let records = vec![visit(1, 2, 1.0), visit(1, 1, 1.0)];
        let out = dedupe_for_version(records.clone(), &roles(), OpSimVersion::Sstf.descriptor());
        assert_eq!(out, records);

        let out = dedupe_for_version(records, &roles(), OpSimVersion::LsstV4.descriptor());
        assert_eq!(out.len(), 1);
    }
}
