//! # Constants and type definitions for OpSimSummary
//!
//! This module centralizes the **canonical column names**, **storage keys**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Canonical names of the normalized Summary and Proposal tables
//! - Keys under which a normalized catalog is persisted
//! - Core type aliases for identifiers and angles

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Identifier of a single pointing (`obsHistID` in the canonical schema)
pub type PointingId = i64;
/// Numeric identifier of an observing proposal (`propID` in the canonical schema)
pub type PropId = i64;

// -------------------------------------------------------------------------------------------------
// Canonical Summary table
// -------------------------------------------------------------------------------------------------

/// Pointing identifier
pub const OBS_HIST_ID: &str = "obsHistID";
/// Proposal identifier of the pointing
pub const PROP_ID: &str = "propID";
/// Pointing RA as logged, in the unit of the source version
pub const DITHERED_RA: &str = "ditheredRA";
/// Pointing Dec as logged, in the unit of the source version
pub const DITHERED_DEC: &str = "ditheredDec";
/// Field-center RA (un-dithered)
pub const FIELD_RA: &str = "fieldRA";
/// Field-center Dec (un-dithered)
pub const FIELD_DEC: &str = "fieldDec";
/// Exposure start time (MJD)
pub const EXP_MJD: &str = "expMJD";
/// Effective seeing FWHM (arcsec)
pub const FWHM_EFF: &str = "FWHMeff";
/// Sky brightness in the filter (mag/arcsec²)
pub const FILT_SKY_BRIGHTNESS: &str = "filtSkyBrightness";
/// Pointing RA in radians
pub const RA_RAD: &str = "_ra";
/// Pointing Dec in radians
pub const DEC_RAD: &str = "_dec";

// -------------------------------------------------------------------------------------------------
// Canonical Proposal table
// -------------------------------------------------------------------------------------------------

/// Raw proposal name as it appeared in the source run
pub const PROP_NAME: &str = "propName";
/// Canonical role token (`wfd`, `ddf`, or empty)
pub const PROP_ROLE: &str = "role";

// -------------------------------------------------------------------------------------------------
// Storage keys
// -------------------------------------------------------------------------------------------------

/// Key of the pointing table of a persisted catalog
pub const SUMMARY_KEY: &str = "Summary";
/// Key of the proposal table, both in raw OpSim outputs and persisted catalogs
pub const PROPOSAL_KEY: &str = "Proposal";
