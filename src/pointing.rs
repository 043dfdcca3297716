//! # Pointing records
//!
//! [`PointingRecord`] is one row of the canonical Summary table: a single telescope visit
//! logged under one proposal. The same visit may appear under several proposals in the raw
//! OpSim output; see [`crate::dedup`] for how those are collapsed.
//!
//! Angles are kept twice: `dithered_ra`/`dithered_dec` (and the optional field center) in the
//! unit of the source version, and `ra`/`dec` in radians.
use crate::constants::{
    PointingId, PropId, Radian, DEC_RAD, DITHERED_DEC, DITHERED_RA, EXP_MJD, FIELD_DEC,
    FIELD_RA, FILT_SKY_BRIGHTNESS, FWHM_EFF, MJD, OBS_HIST_ID, PROP_ID, RA_RAD,
};
use crate::opsim_errors::OpSimError;
use crate::table::{Column, Table};
use crate::version::AngleUnit;

#[derive(Debug, Clone, PartialEq)]
pub struct PointingRecord {
    pub obs_hist_id: PointingId,
    pub prop_id: PropId,
    /// Pointing RA as logged (unit of the source version)
    pub dithered_ra: f64,
    /// Pointing Dec as logged (unit of the source version)
    pub dithered_dec: f64,
    /// Field-center RA, when the source logs it separately
    pub field_ra: Option<f64>,
    /// Field-center Dec, when the source logs it separately
    pub field_dec: Option<f64>,
    pub exp_mjd: MJD,
    /// Effective seeing FWHM (arcsec)
    pub fwhm_eff: f64,
    pub filt_sky_brightness: f64,
    pub ra: Radian,
    pub dec: Radian,
}

impl PointingRecord {
    /// Fill `ra`/`dec` from the logged coordinates.
    pub fn set_radians(&mut self, unit: AngleUnit) {
        (self.ra, self.dec) = match unit {
            AngleUnit::Degrees => (self.dithered_ra.to_radians(), self.dithered_dec.to_radians()),
            AngleUnit::Radians => (self.dithered_ra, self.dithered_dec),
        };
    }

    /// Move the pointing back to its field center. Returns `false` if no center is known.
    pub fn zero_dither(&mut self) -> bool {
        match (self.field_ra, self.field_dec) {
            (Some(ra), Some(dec)) => {
                self.dithered_ra = ra;
                self.dithered_dec = dec;
                true
            }
            _ => false,
        }
    }
}

/// Build records from a table already using the canonical column names.
///
/// `_ra`/`_dec` are read when present, else left at zero for the caller to fill with
/// [`PointingRecord::set_radians`]. `fieldRA`/`fieldDec` are optional.
pub fn records_from_canonical(table: &Table) -> Result<Vec<PointingRecord>, OpSimError> {
    let ids = table.ints(OBS_HIST_ID)?;
    let prop_ids = table.ints(PROP_ID)?;
    let dithered_ra = table.floats(DITHERED_RA)?;
    let dithered_dec = table.floats(DITHERED_DEC)?;
    let exp_mjd = table.floats(EXP_MJD)?;
    let fwhm_eff = table.floats(FWHM_EFF)?;
    let sky = table.floats(FILT_SKY_BRIGHTNESS)?;

    let optional = |name: &str| -> Result<Option<Vec<f64>>, OpSimError> {
        if table.has_column(name) {
            Ok(Some(table.floats(name)?.into_owned()))
        } else {
            Ok(None)
        }
    };
    let field_ra = optional(FIELD_RA)?;
    let field_dec = optional(FIELD_DEC)?;
    let ra = optional(RA_RAD)?;
    let dec = optional(DEC_RAD)?;

    let records = (0..table.num_rows())
        .map(|i| PointingRecord {
            obs_hist_id: ids[i],
            prop_id: prop_ids[i],
            dithered_ra: dithered_ra[i],
            dithered_dec: dithered_dec[i],
            field_ra: field_ra.as_ref().map(|v| v[i]),
            field_dec: field_dec.as_ref().map(|v| v[i]),
            exp_mjd: exp_mjd[i],
            fwhm_eff: fwhm_eff[i],
            filt_sky_brightness: sky[i],
            ra: ra.as_ref().map_or(0.0, |v| v[i]),
            dec: dec.as_ref().map_or(0.0, |v| v[i]),
        })
        .collect();
    Ok(records)
}

/// Canonical Summary table of `records`.
///
/// The field-center columns are written only if every record carries them.
pub fn records_to_table(records: &[PointingRecord]) -> Result<Table, OpSimError> {
    let floats = |f: fn(&PointingRecord) -> f64| Column::Float64(records.iter().map(f).collect());

    let mut table = Table::new()
        .with_column(
            OBS_HIST_ID,
            Column::Int64(records.iter().map(|r| r.obs_hist_id).collect()),
        )?
        .with_column(
            PROP_ID,
            Column::Int64(records.iter().map(|r| r.prop_id).collect()),
        )?
        .with_column(DITHERED_RA, floats(|r| r.dithered_ra))?
        .with_column(DITHERED_DEC, floats(|r| r.dithered_dec))?;

    let field_ra: Option<Vec<f64>> = records.iter().map(|r| r.field_ra).collect();
    let field_dec: Option<Vec<f64>> = records.iter().map(|r| r.field_dec).collect();
    if let (Some(field_ra), Some(field_dec)) = (field_ra, field_dec) {
        table.push_column(FIELD_RA, Column::Float64(field_ra))?;
        table.push_column(FIELD_DEC, Column::Float64(field_dec))?;
    }

    table
        .with_column(EXP_MJD, floats(|r| r.exp_mjd))?
        .with_column(FWHM_EFF, floats(|r| r.fwhm_eff))?
        .with_column(FILT_SKY_BRIGHTNESS, floats(|r| r.filt_sky_brightness))?
        .with_column(RA_RAD, floats(|r| r.ra))?
        .with_column(DEC_RAD, floats(|r| r.dec))
}

#[cfg(test)]
mod pointing_test {
    use super::*;
    use approx::assert_relative_eq;

    fn record() -> PointingRecord {
        PointingRecord {
            obs_hist_id: 1,
            prop_id: 3,
            dithered_ra: 180.0,
            dithered_dec: -45.0,
            field_ra: Some(181.0),
            field_dec: Some(-44.0),
            exp_mjd: 59853.0,
            fwhm_eff: 0.8,
            filt_sky_brightness: 21.0,
            ra: 0.0,
            dec: 0.0,
        }
    }

    #[test]
    fn test_set_radians() {
        let mut r = record();
        r.set_radians(AngleUnit::Degrees);
        assert_relative_eq!(r.ra, std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(r.dec, -std::f64::consts::FRAC_PI_4, epsilon = 1e-12);

        r.set_radians(AngleUnit::Radians);
        assert_eq!(r.ra, 180.0);
    }

    #[test]
    fn test_zero_dither() {
        let mut r = record();
        assert!(r.zero_dither());
        assert_eq!((r.dithered_ra, r.dithered_dec), (181.0, -44.0));

        let mut no_center = PointingRecord {
            field_ra: None,
            ..record()
        };
        assert!(!no_center.zero_dither());
        assert_eq!(no_center.dithered_ra, 180.0);
    }

    #[test]
    fn test_canonical_table_round_trip() {
        let mut r = record();
        r.set_radians(AngleUnit::Degrees);
        let without_center = PointingRecord {
            field_ra: None,
            field_dec: None,
            ..r.clone()
        };

        let table = records_to_table(&[r.clone()]).unwrap();
        assert!(table.has_column(FIELD_RA));
        assert_eq!(records_from_canonical(&table).unwrap(), vec![r.clone()]);

        let table = records_to_table(&[r, without_center]).unwrap();
        assert!(!table.has_column(FIELD_RA));
    }
}
