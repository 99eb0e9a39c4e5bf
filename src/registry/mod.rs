//! Plugin registry document
//!
//! The registry is a JSON array of plugin records kept in object storage. The
//! document is held as raw JSON values so that fields this tool does not know
//! about, and the key order of every record, survive a read-modify-write cycle.
//! [`PluginRecord`] and [`WagonRecord`] are typed views used for validation and
//! bundle planning.

pub mod reconcile;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::error::{self, Result};

pub use reconcile::{AssetOutcome, MatchOutcome, ReconcileReport, Reconciled, apply_assets};
pub use store::RegistryStore;

/// One plugin/version entry of the registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginRecord {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub version: String,
    /// URL of the plugin YAML
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub wagons: Vec<WagonRecord>,
}

/// One packaged build of a plugin for one distribution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WagonRecord {
    /// Distribution label, e.g. `Centos Core`
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub md5url: Option<String>,
}

impl PluginRecord {
    pub fn wagon(&self, distro_label: &str) -> Option<&WagonRecord> {
        self.wagons.iter().find(|w| w.name == distro_label)
    }
}

/// The registry: an ordered list of plugin records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryDocument {
    records: Vec<Value>,
}

impl RegistryDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a registry document; the top level must be an array of objects
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| error::registry::invalid(format!("not valid JSON: {e}")))?;
        let Value::Array(records) = value else {
            return Err(error::registry::invalid("top level must be a list of plugins"));
        };
        if let Some(index) = records.iter().position(|r| !r.is_object()) {
            return Err(error::registry::invalid(format!(
                "entry {index} is not an object"
            )));
        }
        Ok(Self { records })
    }

    /// Serialize with four-space indentation, the layout the registry is published in
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.records.serialize(&mut serializer)?;
        out.push(b'\n');
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Typed view of one record
    pub fn record(&self, index: usize) -> Result<PluginRecord> {
        let raw = self
            .records
            .get(index)
            .ok_or_else(|| error::registry::invalid(format!("no entry at index {index}")))?;
        PluginRecord::deserialize(raw)
            .map_err(|e| error::registry::invalid(format!("entry {index}: {e}")))
    }

    /// Typed view of every record, failing on the first malformed one
    pub fn records(&self) -> Result<Vec<PluginRecord>> {
        (0..self.records.len()).map(|i| self.record(i)).collect()
    }

    /// Raw JSON of one record
    #[cfg(test)]
    pub(crate) fn raw(&self, index: usize) -> Option<&Value> {
        self.records.get(index)
    }

    pub(crate) fn raw_records_mut(&mut self) -> &mut [Value] {
        &mut self.records
    }
}
