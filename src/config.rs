//! Catalog configuration.
//!
//! The four externally supplied values of a catalog build: OpSim version, subset, optional
//! explicit proposal IDs, and the deep-drilling dither-zeroing flag. They can be given in
//! code, in a TOML document, or through `OPSIM_*` environment variables:
//!
//! ```toml
//! version = "lsstv4"          # lsstv3 | sstf | lsstv4 (or v3, streamlined, v4)
//! subset = "combined"         # _all | unique_all | wfd | ddf | combined
//! prop_ids = [3, 5]           # optional, overrides the subset-derived IDs
//! zero_ddf_dithers = true
//! ```
//!
//! | variable                 | field              | format                |
//! |--------------------------|--------------------|-----------------------|
//! | `OPSIM_VERSION`          | `version`          | version tag           |
//! | `OPSIM_SUBSET`           | `subset`           | subset name           |
//! | `OPSIM_PROP_IDS`         | `prop_ids`         | comma separated ints  |
//! | `OPSIM_ZERO_DDF_DITHERS` | `zero_ddf_dithers` | `true`/`1`, else false |
use std::collections::BTreeSet;
use std::env;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::constants::PropId;
use crate::opsim_errors::OpSimError;
use crate::subset::Subset;
use crate::version::OpSimVersion;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    pub version: OpSimVersion,
    pub subset: Subset,
    /// Explicit proposal IDs; when set, they replace the IDs derived from `subset`
    pub prop_ids: Option<BTreeSet<PropId>>,
    /// Move deep-drilling pointings back to their field centers
    pub zero_ddf_dithers: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        CatalogOptions {
            version: OpSimVersion::LsstV3,
            subset: Subset::Combined,
            prop_ids: None,
            zero_ddf_dithers: true,
        }
    }
}

impl CatalogOptions {
    pub fn new(version: OpSimVersion, subset: Subset) -> Self {
        CatalogOptions {
            version,
            subset,
            ..Default::default()
        }
    }

    pub fn with_prop_ids(mut self, prop_ids: impl IntoIterator<Item = PropId>) -> Self {
        self.prop_ids = Some(prop_ids.into_iter().collect());
        self
    }

    pub fn with_zero_ddf_dithers(mut self, zero_ddf_dithers: bool) -> Self {
        self.zero_ddf_dithers = zero_ddf_dithers;
        self
    }

    /// Parse options from a TOML document. Missing keys take their default value.
    pub fn from_toml_str(text: &str) -> Result<Self, OpSimError> {
        toml::from_str(text).map_err(|e| OpSimError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Utf8Path) -> Result<Self, OpSimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Default options overridden by the `OPSIM_*` environment variables.
    pub fn from_env() -> Result<Self, OpSimError> {
        Self::default().with_env()
    }

    /// Override fields from the `OPSIM_*` environment variables that are set.
    pub fn with_env(self) -> Result<Self, OpSimError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Override fields from a key → value lookup using the `OPSIM_*` names.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, OpSimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(version) = lookup("OPSIM_VERSION") {
            self.version = version.parse()?;
        }
        if let Some(subset) = lookup("OPSIM_SUBSET") {
            self.subset = subset.parse()?;
        }
        if let Some(ids) = lookup("OPSIM_PROP_IDS") {
            let ids = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<PropId>()
                        .map_err(|e| OpSimError::Config(format!("OPSIM_PROP_IDS: '{s}': {e}")))
                })
                .collect::<Result<BTreeSet<_>, _>>()?;
            self.prop_ids = Some(ids);
        }
        if let Some(flag) = lookup("OPSIM_ZERO_DDF_DITHERS") {
            self.zero_ddf_dithers = flag.to_lowercase() == "true" || flag == "1";
        }
        Ok(self)
    }
}
