//! # Proposal classification
//!
//! Each OpSim run carries a proposal table mapping numeric proposal IDs to version-specific
//! proposal names (`conf/survey/Universal-18-0824B.conf`, `WideFastDeep`, ...). Downstream code
//! only cares about two semantic [`Role`]s:
//!
//! - **wfd**: the wide-fast-deep main survey,
//! - **ddf**: the deep-drilling fields.
//!
//! [`classify`] is a pure function: it returns a new, labelled copy of the proposal records
//! together with a [`RoleMap`] from role to the proposal ID(s) used for it in this run. The
//! input records are left untouched.
//!
//! A role with no matching proposal is simply absent from the [`RoleMap`]; asking for it
//! through [`RoleMap::ids`] is what fails, with [`OpSimError::UnknownRole`].
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::constants::{PropId, PROP_ID, PROP_NAME, PROP_ROLE};
use crate::opsim_errors::OpSimError;
use crate::table::{Column, Table};
use crate::version::SchemaDescriptor;

/// Semantic role of a proposal. The derived order is the de-duplication priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Wide-fast-deep main survey
    Wfd,
    /// Deep-drilling fields
    Ddf,
}

impl Role {
    /// Canonical role token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Wfd => "wfd",
            Role::Ddf => "ddf",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = OpSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wfd" => Ok(Role::Wfd),
            "ddf" => Ok(Role::Ddf),
            other => Err(OpSimError::UnknownRole(other.to_string())),
        }
    }
}

/// One row of the proposal table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalRecord {
    pub prop_id: PropId,
    /// Proposal name as found in the OpSim output
    pub name: String,
    /// Role assigned by [`classify`], `None` for unclassified proposals
    pub role: Option<Role>,
}

impl ProposalRecord {
    pub fn new(prop_id: PropId, name: impl Into<String>) -> Self {
        ProposalRecord {
            prop_id,
            name: name.into(),
            role: None,
        }
    }

    /// Role token for classified proposals, raw name otherwise.
    pub fn label(&self) -> &str {
        self.role.map_or(self.name.as_str(), |r| r.as_str())
    }
}

/// Proposal IDs observed for each role in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMap {
    ids: BTreeMap<Role, SmallVec<[PropId; 2]>>,
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group already-labelled records by role.
    pub fn from_records(records: &[ProposalRecord]) -> Self {
        let mut map = RoleMap::new();
        for record in records {
            if let Some(role) = record.role {
                map.insert(role, record.prop_id);
            }
        }
        map
    }

    pub fn insert(&mut self, role: Role, prop_id: PropId) {
        let ids = self.ids.entry(role).or_default();
        if !ids.contains(&prop_id) {
            ids.push(prop_id);
        }
    }

    /// Proposal IDs of `role`, or [`OpSimError::UnknownRole`] if the run has none.
    pub fn ids(&self, role: Role) -> Result<&[PropId], OpSimError> {
        self.ids
            .get(&role)
            .map(|ids| ids.as_slice())
            .ok_or_else(|| OpSimError::UnknownRole(role.to_string()))
    }

    pub fn get(&self, role: Role) -> Option<&[PropId]> {
        self.ids.get(&role).map(|ids| ids.as_slice())
    }

    pub fn contains(&self, role: Role) -> bool {
        self.ids.contains_key(&role)
    }

    /// Highest-priority role claiming `prop_id`.
    pub fn role_of(&self, prop_id: PropId) -> Option<Role> {
        self.ids
            .iter()
            .find(|(_, ids)| ids.contains(&prop_id))
            .map(|(role, _)| *role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &[PropId])> {
        self.ids.iter().map(|(role, ids)| (*role, ids.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Assign roles to proposals by substring match against the version literals.
///
/// The wide-fast-deep literal is tested first, then the deep-drilling one; records matching
/// neither keep `role = None`.
///
/// Arguments
/// -----------------
/// * `records`: proposal rows of the run, usually from [`proposals_from_table`].
/// * `descriptor`: physical schema of the run's OpSim version.
///
/// Return
/// ----------
/// * The labelled copy of `records` (same order) and the [`RoleMap`] built from it.
pub fn classify(
    records: &[ProposalRecord],
    descriptor: &SchemaDescriptor,
) -> (Vec<ProposalRecord>, RoleMap) {
    let labelled: Vec<ProposalRecord> = records
        .iter()
        .map(|record| {
            let role = if record.name.contains(descriptor.wfd_literal) {
                Some(Role::Wfd)
            } else if record.name.contains(descriptor.ddf_literal) {
                Some(Role::Ddf)
            } else {
                None
            };
            ProposalRecord {
                role,
                ..record.clone()
            }
        })
        .collect();

    let role_map = RoleMap::from_records(&labelled);
    tracing::debug!(version = %descriptor.version, ?role_map, "classified proposals");
    (labelled, role_map)
}

/// Read raw proposal rows from an OpSim proposal table.
pub fn proposals_from_table(
    table: &Table,
    descriptor: &SchemaDescriptor,
) -> Result<Vec<ProposalRecord>, OpSimError> {
    let ids = table.ints(descriptor.prop_id_in_proposal)?;
    let names = table.strings(descriptor.prop_name)?;
    Ok(ids
        .iter()
        .zip(names)
        .map(|(&id, name)| ProposalRecord::new(id, name.clone()))
        .collect())
}

/// Read labelled proposal rows from the canonical table written by [`proposals_to_table`].
pub fn proposals_from_canonical(table: &Table) -> Result<Vec<ProposalRecord>, OpSimError> {
    let ids = table.ints(PROP_ID)?;
    let names = table.strings(PROP_NAME)?;
    let roles = table.strings(PROP_ROLE)?;

    ids.iter()
        .zip(names)
        .zip(roles)
        .map(|((&prop_id, name), role)| {
            let role = match role.as_str() {
                "" => None,
                token => Some(token.parse::<Role>()?),
            };
            Ok::<_, OpSimError>(ProposalRecord {
                prop_id,
                name: name.clone(),
                role,
            })
        })
        .collect()
}

/// Canonical proposal table: `propID`, `propName`, `role`.
pub fn proposals_to_table(records: &[ProposalRecord]) -> Result<Table, OpSimError> {
    Table::new()
        .with_column(
            PROP_ID,
            Column::Int64(records.iter().map(|r| r.prop_id).collect()),
        )?
        .with_column(
            PROP_NAME,
            Column::Utf8(records.iter().map(|r| r.name.clone()).collect()),
        )?
        .with_column(
            PROP_ROLE,
            Column::Utf8(
                records
                    .iter()
                    .map(|r| r.role.map(|role| role.to_string()).unwrap_or_default())
                    .collect(),
            ),
        )
}
