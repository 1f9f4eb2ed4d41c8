//! Per-host rating aggregates and Super Host classification.

use crate::index::types::{HostId, PropertyRecord};
use ahash::RandomState;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::hash::{BuildHasher, Hasher};

/// Minimum average star rating for a host to count as a Super Host
pub const SUPER_HOST_THRESHOLD: f64 = 4.0;

/// Host id to Super Host flag
pub type SuperHostMap = FxHashMap<HostId, bool>;

/// Running totals over one host's listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HostAggregate {
    pub sum_of_stars: f64,
    pub property_count: usize,
}

impl HostAggregate {
    #[inline]
    fn add(&mut self, stars: f64) {
        self.sum_of_stars += stars;
        self.property_count += 1;
    }

    pub fn average_stars(&self) -> f64 {
        if self.property_count == 0 {
            0.0
        } else {
            self.sum_of_stars / self.property_count as f64
        }
    }

    pub fn is_super_host(&self) -> bool {
        self.property_count > 0 && self.average_stars() >= SUPER_HOST_THRESHOLD
    }
}

/// Aggregate star ratings per host in a single pass
pub fn compute_host_aggregates(properties: &[PropertyRecord]) -> FxHashMap<HostId, HostAggregate> {
    let mut hosts: FxHashMap<HostId, HostAggregate> = FxHashMap::default();
    for property in properties {
        hosts.entry(property.host_id).or_default().add(property.stars);
    }
    hosts
}

/// Flag every host appearing in `properties` as Super Host or not
pub fn compute_super_host_map(properties: &[PropertyRecord]) -> SuperHostMap {
    compute_host_aggregates(properties)
        .into_iter()
        .map(|(host_id, aggregate)| (host_id, aggregate.is_super_host()))
        .collect()
}

/// Hosts missing from the map are never Super Hosts
#[inline]
pub fn is_super_host(map: &SuperHostMap, host_id: HostId) -> bool {
    map.get(&host_id).copied().unwrap_or(false)
}

/// Content fingerprint of the fields the Super Host map depends on.
///
/// Equal for two collections holding the same (id, host, stars) triples in
/// the same order; used as a memo key, never for equality decisions on its own.
pub fn fingerprint(properties: &[PropertyRecord]) -> u64 {
    let mut hasher = RandomState::with_seeds(
        0x517cc1b727220a95,
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
    )
    .build_hasher();

    hasher.write_usize(properties.len());
    for property in properties {
        hasher.write_u64(property.id);
        hasher.write_u64(property.host_id);
        hasher.write_u64(property.stars.to_bits());
    }
    hasher.finish()
}
