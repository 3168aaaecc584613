//! Region identity
//!
//! Describes the data partition that owns a WAL entry. Sequencing only
//! carries it; nothing here is mutated after construction.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Name of the table a region belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor of one region: a table's key range plus a creation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    table: TableName,
    start_key: Vec<u8>,
    end_key: Vec<u8>,
    /// Creation time in epoch milliseconds; distinguishes successive
    /// regions over the same key range.
    region_id: i64,
    encoded_name: String,
}

impl RegionInfo {
    /// Region stamped with the current wall-clock time as its id.
    pub fn new(table: TableName, start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> Self {
        Self::with_region_id(table, start_key, end_key, Utc::now().timestamp_millis())
    }

    pub fn with_region_id(
        table: TableName,
        start_key: impl Into<Vec<u8>>,
        end_key: impl Into<Vec<u8>>,
        region_id: i64,
    ) -> Self {
        let start_key = start_key.into();
        let end_key = end_key.into();
        let encoded_name = encode_region_name(&region_name(&table, &start_key, region_id));
        Self {
            table,
            start_key,
            end_key,
            region_id,
            encoded_name,
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn start_key(&self) -> &[u8] {
        &self.start_key
    }

    pub fn end_key(&self) -> &[u8] {
        &self.end_key
    }

    pub fn region_id(&self) -> i64 {
        self.region_id
    }

    /// Full region name: `table,start_key,region_id`.
    pub fn region_name(&self) -> Vec<u8> {
        region_name(&self.table, &self.start_key, self.region_id)
    }

    /// Fixed-width hex digest of the region name, used as the region's key
    /// in per-region bookkeeping.
    pub fn encoded_name(&self) -> &str {
        &self.encoded_name
    }

    /// Whether `row` falls inside `[start_key, end_key)`; an empty end key
    /// is unbounded.
    pub fn contains_row(&self, row: &[u8]) -> bool {
        row >= self.start_key.as_slice() && (self.end_key.is_empty() || row < self.end_key.as_slice())
    }
}

impl fmt::Display for RegionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ENCODED => {}, NAME => '{}', STARTKEY => '{}', ENDKEY => '{}'}}",
            self.encoded_name,
            String::from_utf8_lossy(&self.region_name()),
            String::from_utf8_lossy(&self.start_key),
            String::from_utf8_lossy(&self.end_key)
        )
    }
}

fn region_name(table: &TableName, start_key: &[u8], region_id: i64) -> Vec<u8> {
    let mut name = Vec::with_capacity(table.as_str().len() + start_key.len() + 24);
    name.extend_from_slice(table.as_str().as_bytes());
    name.push(b',');
    name.extend_from_slice(start_key);
    name.push(b',');
    name.extend_from_slice(region_id.to_string().as_bytes());
    name
}

/// First 16 bytes of SHA-256 over the region name, lowercase hex.
fn encode_region_name(region_name: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(region_name);
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
}
