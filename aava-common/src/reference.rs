//! Reference data for rule checks
//!
//! Maps a region name to the districts and pincodes known to belong to it.
//! The rule checker only sees the [`RegionLookup`] capability, so a
//! deployment can swap the built-in sample for a full dataset loaded from
//! TOML:
//!
//! ```toml
//! [regions.Karnataka]
//! districts = ["Bengaluru", "Mysuru"]
//! pincodes = ["560001", "560002"]
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Lookup capability consumed by the rule checker
pub trait RegionLookup: Send + Sync {
    /// Whether any region lists this pincode
    fn contains_pincode(&self, pincode: &str) -> bool;

    /// Whether any region lists this district (case-insensitive)
    fn contains_district(&self, district: &str) -> bool;
}

/// Districts and pincodes of one region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(default)]
    pub districts: Vec<String>,
    #[serde(default)]
    pub pincodes: Vec<String>,
}

/// In-memory region table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTable {
    #[serde(default)]
    pub regions: BTreeMap<String, RegionRecord>,
}

impl ReferenceTable {
    pub fn new(regions: BTreeMap<String, RegionRecord>) -> Self {
        Self { regions }
    }

    /// Small built-in sample covering three regions
    pub fn sample() -> Self {
        let region = |districts: &[&str], pincodes: &[&str]| RegionRecord {
            districts: districts.iter().map(|s| s.to_string()).collect(),
            pincodes: pincodes.iter().map(|s| s.to_string()).collect(),
        };

        let mut regions = BTreeMap::new();
        regions.insert(
            "Karnataka".to_string(),
            region(&["Bengaluru", "Mysuru"], &["560001", "560002", "560003"]),
        );
        regions.insert(
            "Delhi".to_string(),
            region(&["New Delhi", "South Delhi"], &["110001", "110002"]),
        );
        regions.insert(
            "Rajasthan".to_string(),
            region(&["Jaipur", "Jodhpur"], &["302001", "302002"]),
        );
        Self { regions }
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: ReferenceTable = toml::from_str(content)?;
        if table.regions.is_empty() {
            return Err(Error::Config("Reference table defines no regions".to_string()));
        }
        Ok(table)
    }

    /// Load a table from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            regions = table.regions.len(),
            "Loaded reference table"
        );
        Ok(table)
    }

    /// Name of the first region listing this pincode
    pub fn region_for_pincode(&self, pincode: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, record)| record.pincodes.iter().any(|p| p == pincode))
            .map(|(name, _)| name.as_str())
    }
}

impl RegionLookup for ReferenceTable {
    fn contains_pincode(&self, pincode: &str) -> bool {
        self.region_for_pincode(pincode).is_some()
    }

    fn contains_district(&self, district: &str) -> bool {
        let needle = district.to_lowercase();
        self.regions
            .values()
            .flat_map(|record| record.districts.iter())
            .any(|d| d.to_lowercase() == needle)
    }
}
