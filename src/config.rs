// Dashboard settings, loaded from an optional JSON file.
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Which source columns play which role.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub value: String,
    pub vendor: String,
    pub money: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            date: "transaction_date".to_string(),
            type_: "project_type_name".to_string(),
            value: "contract_price_agree".to_string(),
            vendor: "winner_name".to_string(),
            money: "project_money".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardSettings {
    pub data_path: String,
    pub columns: ColumnMapping,
    pub fiscal_year: bool,
    pub top_n: usize,
    pub preview_rows: usize,
    pub output_dir: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            data_path: "procurement.csv".to_string(),
            columns: ColumnMapping::default(),
            fiscal_year: true,
            top_n: 10,
            preview_rows: 5,
            output_dir: ".".to_string(),
        }
    }
}

impl DashboardSettings {
    /// Read settings from `path`; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&text)?;
        info!(path = %path.display(), "loaded dashboard settings");
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
