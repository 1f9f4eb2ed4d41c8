//! Loading property snapshots from the external data source.
//!
//! Records are validated once here so that filtering and searching never
//! have to deal with malformed input.

use crate::index::types::{PropertyId, PropertyRecord};
use crate::query::criteria::STAR_FILTER_META;
use memmap2::Mmap;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed property data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate property id {0}")]
    DuplicateId(PropertyId),

    #[error("property {id} has invalid rate {rate}")]
    InvalidRate { id: PropertyId, rate: f64 },

    #[error("property {id} has invalid star rating {stars}")]
    InvalidStars { id: PropertyId, stars: f64 },
}

/// An immutable, validated snapshot of property records
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    records: Vec<PropertyRecord>,
    by_id: FxHashMap<PropertyId, usize>,
}

impl PropertySource {
    /// Memory-map a JSON array of records and validate it
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let io_err = |source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();
        if len == 0 {
            return Self::from_records(Vec::new());
        }

        // SAFETY: the snapshot is read once and not kept past parsing
        let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
        let source = Self::from_slice(&mmap)?;
        debug!(path = %path.display(), records = source.len(), "loaded property data");
        Ok(source)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, IngestError> {
        let records: Vec<PropertyRecord> = serde_json::from_slice(bytes)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<PropertyRecord>) -> Result<Self, IngestError> {
        let mut by_id = FxHashMap::default();
        by_id.reserve(records.len());

        for (pos, record) in records.iter().enumerate() {
            validate(record)?;
            if by_id.insert(record.id, pos).is_some() {
                return Err(IngestError::DuplicateId(record.id));
            }
        }

        Ok(Self { records, by_id })
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PropertyRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: PropertyId) -> Option<&PropertyRecord> {
        self.by_id.get(&id).map(|&pos| &self.records[pos])
    }

    /// Distinct location codes, sorted
    pub fn countries(&self) -> Vec<String> {
        self.distinct(|r| &r.country)
    }

    pub fn house_types(&self) -> Vec<String> {
        self.distinct(|r| &r.house_type)
    }

    pub fn place_types(&self) -> Vec<String> {
        self.distinct(|r| &r.place_type)
    }

    fn distinct(&self, field: impl Fn(&PropertyRecord) -> &String) -> Vec<String> {
        let set: BTreeSet<&String> = self.records.iter().map(field).collect();
        set.into_iter().cloned().collect()
    }
}

fn validate(record: &PropertyRecord) -> Result<(), IngestError> {
    if !record.rate.is_finite() || record.rate < 0.0 {
        return Err(IngestError::InvalidRate {
            id: record.id,
            rate: record.rate,
        });
    }

    if !(STAR_FILTER_META.min..=STAR_FILTER_META.max).contains(&record.stars) {
        return Err(IngestError::InvalidStars {
            id: record.id,
            stars: record.stars,
        });
    }

    Ok(())
}
