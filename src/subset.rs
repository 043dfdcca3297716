//! # Subsets of an OpSim run
//!
//! A [`Subset`] names which proposals' pointings a catalog should hold. [`resolve_ids`] turns
//! it into the concrete set of proposal IDs of the run:
//!
//! | subset       | proposal IDs                         | de-duplicated |
//! |--------------|--------------------------------------|---------------|
//! | `_all`       | every proposal of the run            | no            |
//! | `unique_all` | every proposal of the run            | yes           |
//! | `wfd`        | wide-fast-deep                       | yes           |
//! | `ddf`        | deep-drilling                        | yes           |
//! | `combined`   | deep-drilling ∪ wide-fast-deep       | yes           |
//!
//! Callers may bypass the role lookup by passing explicit proposal IDs; see
//! [`override_prop_ids`].
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::PropId;
use crate::opsim_errors::OpSimError;
use crate::proposals::{ProposalRecord, Role, RoleMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subset {
    /// The whole summary table, duplicates included
    All,
    /// The whole summary table, one record per pointing
    UniqueAll,
    WideFastDeep,
    DeepDrilling,
    /// Wide-fast-deep and deep-drilling pointings
    Combined,
}

impl Subset {
    pub const ALL: [Subset; 5] = [
        Subset::All,
        Subset::UniqueAll,
        Subset::WideFastDeep,
        Subset::DeepDrilling,
        Subset::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::All => "_all",
            Subset::UniqueAll => "unique_all",
            Subset::WideFastDeep => "wfd",
            Subset::DeepDrilling => "ddf",
            Subset::Combined => "combined",
        }
    }

    /// Whether the subset spans every proposal, i.e. whole-table reads without a filter.
    pub fn reads_whole_table(&self) -> bool {
        matches!(self, Subset::All | Subset::UniqueAll)
    }

    /// Whether pointings logged under several proposals must be collapsed.
    pub fn drops_duplicates(&self) -> bool {
        !matches!(self, Subset::All)
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subset {
    type Err = OpSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "_all" | "all" => Ok(Subset::All),
            "unique_all" | "unique-all" => Ok(Subset::UniqueAll),
            "wfd" | "wide-fast-deep" => Ok(Subset::WideFastDeep),
            "ddf" | "deep-drilling" => Ok(Subset::DeepDrilling),
            "combined" => Ok(Subset::Combined),
            _ => Err(OpSimError::UnsupportedSubset(s.to_string())),
        }
    }
}

impl Serialize for Subset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Subset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Proposal IDs making up `subset` in this run.
///
/// Arguments
/// -----------------
/// * `subset`: the requested subset.
/// * `roles`: role → proposal IDs of the run, from [`crate::proposals::classify`].
/// * `proposals`: every proposal of the run; used by the whole-table subsets.
///
/// Return
/// ----------
/// * The set of proposal IDs, or [`OpSimError::UnknownRole`] if the subset needs a role the
///   run does not have.
pub fn resolve_ids(
    subset: Subset,
    roles: &RoleMap,
    proposals: &[ProposalRecord],
) -> Result<BTreeSet<PropId>, OpSimError> {
    let ids = match subset {
        Subset::WideFastDeep => roles.ids(Role::Wfd)?.iter().copied().collect(),
        Subset::DeepDrilling => roles.ids(Role::Ddf)?.iter().copied().collect(),
        Subset::Combined => roles
            .ids(Role::Ddf)?
            .iter()
            .chain(roles.ids(Role::Wfd)?)
            .copied()
            .collect(),
        Subset::All | Subset::UniqueAll => proposals.iter().map(|p| p.prop_id).collect(),
    };
    Ok(ids)
}

/// Pick the proposal-ID filter when the caller may have supplied explicit IDs.
///
/// Explicit IDs always win. When they differ (as sets) from the IDs derived from the subset,
/// a warning is logged and construction proceeds with the explicit ones.
pub fn override_prop_ids(
    explicit: Option<&BTreeSet<PropId>>,
    derived: BTreeSet<PropId>,
) -> BTreeSet<PropId> {
    match explicit {
        None => derived,
        Some(explicit) => {
            if *explicit != derived {
                tracing::warn!(
                    explicit = ?explicit,
                    derived = ?derived,
                    "explicit proposal IDs do not match the IDs of the requested subset, using explicit IDs"
                );
            }
            explicit.clone()
        }
    }
}

#[cfg(test)]
mod subset_test {
    use super::*;
    use crate::proposals::classify;
    use crate::version::OpSimVersion;

    fn v4_run() -> (Vec<ProposalRecord>, RoleMap) {
        let raw = vec![
            ProposalRecord::new(1, "NorthEclipticSpur"),
            ProposalRecord::new(3, "WideFastDeep"),
            ProposalRecord::new(5, "DeepDrillingCosmology1"),
        ];
        classify(&raw, OpSimVersion::LsstV4.descriptor())
    }

    fn set(ids: &[PropId]) -> BTreeSet<PropId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_resolve_each_subset() {
        let (proposals, roles) = v4_run();
        assert_eq!(
            resolve_ids(Subset::WideFastDeep, &roles, &proposals).unwrap(),
            set(&[3])
        );
        assert_eq!(
            resolve_ids(Subset::DeepDrilling, &roles, &proposals).unwrap(),
            set(&[5])
        );
        assert_eq!(
            resolve_ids(Subset::Combined, &roles, &proposals).unwrap(),
            set(&[3, 5])
        );
        assert_eq!(
            resolve_ids(Subset::All, &roles, &proposals).unwrap(),
            set(&[1, 3, 5])
        );
        assert_eq!(
            resolve_ids(Subset::UniqueAll, &roles, &proposals).unwrap(),
            set(&[1, 3, 5])
        );
    }

    #[test]
    fn test_resolve_missing_role() {
        let raw = vec![ProposalRecord::new(3, "WideFastDeep")];
        let (proposals, roles) = classify(&raw, OpSimVersion::LsstV4.descriptor());
        assert_eq!(
            resolve_ids(Subset::Combined, &roles, &proposals).unwrap_err(),
            OpSimError::UnknownRole("ddf".into())
        );
        assert_eq!(
            resolve_ids(Subset::WideFastDeep, &roles, &proposals).unwrap(),
            set(&[3])
        );
    }

    #[test]
    fn test_subset_names() {
        assert_eq!("Combined".parse::<Subset>().unwrap(), Subset::Combined);
        assert_eq!("wide-fast-deep".parse::<Subset>().unwrap(), Subset::WideFastDeep);
        assert_eq!("unique-all".parse::<Subset>().unwrap(), Subset::UniqueAll);
        assert_eq!("all".parse::<Subset>().unwrap(), Subset::All);
        assert_eq!(
            "galactic".parse::<Subset>().unwrap_err(),
            OpSimError::UnsupportedSubset("galactic".into())
        );
        for subset in Subset::ALL {
            assert_eq!(subset.as_str().parse::<Subset>().unwrap(), subset);
        }
    }

    #[test]
    fn test_override_prop_ids() {
        assert_eq!(override_prop_ids(None, set(&[3, 5])), set(&[3, 5]));
        assert_eq!(override_prop_ids(Some(&set(&[5, 3])), set(&[3, 5])), set(&[3, 5]));
        // mismatch is not an error
        assert_eq!(override_prop_ids(Some(&set(&[1])), set(&[3, 5])), set(&[1]));
    }
}
