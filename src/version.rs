//! # OpSim output versions and their physical schemas
//!
//! Successive releases of the LSST Operations Simulator wrote their pointing logs with
//! different table names, column names and angle units. This module encodes those facts as
//! **data**: one static [`SchemaDescriptor`] per [`OpSimVersion`], looked up with
//! [`descriptor_for`] or [`OpSimVersion::descriptor`].
//!
//! | version  | aliases       | summary table     | angles  |
//! |----------|---------------|-------------------|---------|
//! | `lsstv3` | `v3`          | `Summary`         | radians |
//! | `sstf`   | `streamlined` | `SummaryAllProps` | degrees |
//! | `lsstv4` | `v4`          | `SummaryAllProps` | degrees |
//!
//! ```rust
//! use opsimsummary::version::{descriptor_for, AngleUnit};
//!
//! let desc = descriptor_for("lsstv4").unwrap();
//! assert_eq!(desc.summary_table, "SummaryAllProps");
//! assert_eq!(desc.angle_unit, AngleUnit::Degrees);
//! assert!(descriptor_for("lsstv5").is_err());
//! ```
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::opsim_errors::OpSimError;

/// Unit of the raw right ascension / declination columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AngleUnit::Degrees => "degrees",
            AngleUnit::Radians => "radians",
        }
    }
}

impl FromStr for AngleUnit {
    type Err = OpSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "degrees" | "deg" => Ok(AngleUnit::Degrees),
            "radians" | "rad" => Ok(AngleUnit::Radians),
            _ => Err(OpSimError::UnsupportedAngleUnit(s.to_string())),
        }
    }
}

/// Version of the OpSim output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpSimVersion {
    /// OpSim v3 outputs (`enigma_1189`, `minion_1016`, ...)
    LsstV3,
    /// Streamlined scheduler outputs
    Sstf,
    /// OpSim v4 outputs (`baseline2018a`, ...)
    LsstV4,
}

impl OpSimVersion {
    pub const ALL: [OpSimVersion; 3] = [OpSimVersion::LsstV3, OpSimVersion::Sstf, OpSimVersion::LsstV4];

    /// Canonical tag of the version.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpSimVersion::LsstV3 => "lsstv3",
            OpSimVersion::Sstf => "sstf",
            OpSimVersion::LsstV4 => "lsstv4",
        }
    }

    /// Physical schema used by this version.
    pub fn descriptor(&self) -> &'static SchemaDescriptor {
        &SCHEMA_DESCRIPTORS[*self as usize]
    }
}

impl fmt::Display for OpSimVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpSimVersion {
    type Err = OpSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsstv3" | "v3" => Ok(OpSimVersion::LsstV3),
            "sstf" | "streamlined" => Ok(OpSimVersion::Sstf),
            "lsstv4" | "v4" => Ok(OpSimVersion::LsstV4),
            _ => Err(OpSimError::UnsupportedVersion(s.to_string())),
        }
    }
}

impl Serialize for OpSimVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpSimVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Physical table/column names and conventions of one OpSim version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub version: OpSimVersion,
    /// Name of the table holding one row per (pointing, proposal)
    pub summary_table: &'static str,
    pub pointing_id: &'static str,
    /// Proposal ID column, as named in the summary table
    pub prop_id_in_summary: &'static str,
    /// Proposal name column of the proposal table
    pub prop_name: &'static str,
    /// Proposal ID column, as named in the proposal table
    pub prop_id_in_proposal: &'static str,
    pub pointing_ra: &'static str,
    pub pointing_dec: &'static str,
    pub field_ra: &'static str,
    pub field_dec: &'static str,
    pub exp_mjd: &'static str,
    pub fwhm_eff: &'static str,
    pub filt_sky_brightness: &'static str,
    pub angle_unit: AngleUnit,
    /// Substring identifying the wide-fast-deep proposal name
    pub wfd_literal: &'static str,
    /// Substring identifying the deep-drilling proposal name
    pub ddf_literal: &'static str,
    /// Deep-drilling pointings are already logged at their field centers
    pub zeroes_ddf_dithers_upstream: bool,
    /// The same pointing may be logged once per proposal that claims it
    pub logs_cross_proposal_duplicates: bool,
}

// Indexed by `OpSimVersion as usize`.
static SCHEMA_DESCRIPTORS: [SchemaDescriptor; 3] = [
    SchemaDescriptor {
        version: OpSimVersion::LsstV3,
        summary_table: "Summary",
        pointing_id: "obsHistID",
        prop_id_in_summary: "propID",
        prop_name: "propConf",
        prop_id_in_proposal: "propID",
        pointing_ra: "ditheredRA",
        pointing_dec: "ditheredDec",
        field_ra: "fieldRA",
        field_dec: "fieldDec",
        exp_mjd: "expMJD",
        fwhm_eff: "FWHMeff",
        filt_sky_brightness: "filtSkyBrightness",
        angle_unit: AngleUnit::Radians,
        // enigma outputs prefix these with `..`, hence substring matching
        wfd_literal: "Universal-18-0824B",
        ddf_literal: "DDcosmology1",
        zeroes_ddf_dithers_upstream: false,
        logs_cross_proposal_duplicates: true,
    },
    SchemaDescriptor {
        version: OpSimVersion::Sstf,
        summary_table: "SummaryAllProps",
        pointing_id: "observationId",
        prop_id_in_summary: "proposalId",
        prop_name: "propName",
        prop_id_in_proposal: "propId",
        pointing_ra: "fieldRA",
        pointing_dec: "fieldDec",
        field_ra: "fieldRA",
        field_dec: "fieldDec",
        exp_mjd: "observationStartMJD",
        fwhm_eff: "seeingFwhmEff",
        filt_sky_brightness: "skyBrightness",
        angle_unit: AngleUnit::Degrees,
        wfd_literal: "WideFastDeep",
        ddf_literal: "Deep Drilling",
        zeroes_ddf_dithers_upstream: true,
        logs_cross_proposal_duplicates: false,
    },
    SchemaDescriptor {
        version: OpSimVersion::LsstV4,
        summary_table: "SummaryAllProps",
        pointing_id: "observationId",
        prop_id_in_summary: "proposalId",
        prop_name: "propName",
        prop_id_in_proposal: "propId",
        pointing_ra: "fieldRA",
        pointing_dec: "fieldDec",
        field_ra: "fieldRA",
        field_dec: "fieldDec",
        exp_mjd: "observationStartMJD",
        fwhm_eff: "seeingFwhmEff",
        filt_sky_brightness: "skyBrightness",
        angle_unit: AngleUnit::Degrees,
        wfd_literal: "WideFastDeep",
        ddf_literal: "DeepDrillingCosmology1",
        zeroes_ddf_dithers_upstream: true,
        logs_cross_proposal_duplicates: true,
    },
];

/// Look up the physical schema of a version tag (`lsstv3`, `sstf`, `lsstv4` or an alias).
///
/// Return
/// ----------
/// * The static [`SchemaDescriptor`], or [`OpSimError::UnsupportedVersion`].
pub fn descriptor_for(version_tag: &str) -> Result<&'static SchemaDescriptor, OpSimError> {
    Ok(version_tag.parse::<OpSimVersion>()?.descriptor())
}

#[cfg(test)]
mod version_test {
    use super::*;

    #[test]
    fn test_descriptor_per_version() {
        for version in OpSimVersion::ALL {
            let desc = version.descriptor();
            assert_eq!(desc.version, version);

            let names = [
                desc.summary_table,
                desc.pointing_id,
                desc.prop_id_in_summary,
                desc.prop_name,
                desc.prop_id_in_proposal,
                desc.pointing_ra,
                desc.pointing_dec,
                desc.field_ra,
                desc.field_dec,
                desc.exp_mjd,
                desc.fwhm_eff,
                desc.filt_sky_brightness,
                desc.wfd_literal,
                desc.ddf_literal,
            ];
            assert!(names.iter().all(|n| !n.is_empty()), "{version}");
        }
    }

    #[test]
    fn test_version_aliases() {
        assert_eq!("v3".parse::<OpSimVersion>().unwrap(), OpSimVersion::LsstV3);
        assert_eq!("LSSTv3".parse::<OpSimVersion>().unwrap(), OpSimVersion::LsstV3);
        assert_eq!("streamlined".parse::<OpSimVersion>().unwrap(), OpSimVersion::Sstf);
        assert_eq!("v4".parse::<OpSimVersion>().unwrap(), OpSimVersion::LsstV4);
        assert_eq!(
            descriptor_for("opsim2").unwrap_err(),
            OpSimError::UnsupportedVersion("opsim2".into())
        );
    }

    #[test]
    fn test_version_specific_facts() {
        let v3 = descriptor_for("lsstv3").unwrap();
        assert_eq!(v3.angle_unit, AngleUnit::Radians);
        assert!(!v3.zeroes_ddf_dithers_upstream);

        let sstf = descriptor_for("sstf").unwrap();
        assert!(!sstf.logs_cross_proposal_duplicates);
        assert_eq!(sstf.ddf_literal, "Deep Drilling");

        let v4 = descriptor_for("lsstv4").unwrap();
        assert_eq!(v4.ddf_literal, "DeepDrillingCosmology1");
    }

    #[test]
    fn test_angle_unit_parse() {
        assert_eq!("degrees".parse::<AngleUnit>().unwrap(), AngleUnit::Degrees);
        assert_eq!(
            "arcsec".parse::<AngleUnit>().unwrap_err(),
            OpSimError::UnsupportedAngleUnit("arcsec".into())
        );
    }
}
