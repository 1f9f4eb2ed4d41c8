use crate::index::types::PropertyRecord;
use crate::query::criteria::{FilterCriteria, RangeFilter};
use crate::query::hosts::{SuperHostMap, compute_super_host_map, fingerprint, is_super_host};
use lru::LruCache;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Criteria lowered into the form used per record
struct CompiledFilter<'c> {
    location: Option<&'c str>,
    super_hosts: Option<&'c SuperHostMap>,
    rate: Option<RangeFilter>,
    stars: Option<RangeFilter>,
    house_types: FxHashSet<&'c str>,
    place_types: FxHashSet<&'c str>,
}

impl<'c> CompiledFilter<'c> {
    fn new(criteria: &'c FilterCriteria, super_hosts: Option<&'c SuperHostMap>) -> Self {
        Self {
            location: criteria.location_filter.as_deref(),
            super_hosts: if criteria.super_host_filter {
                super_hosts
            } else {
                None
            },
            rate: criteria.rate_filter,
            stars: criteria.stars_filter,
            house_types: criteria.house_type_filter.iter().map(String::as_str).collect(),
            place_types: criteria.place_type_filter.iter().map(String::as_str).collect(),
        }
    }

    /// All active predicates ANDed, cheapest first
    fn matches(&self, property: &PropertyRecord) -> bool {
        if let Some(location) = self.location {
            if location != property.country {
                return false;
            }
        }

        if let Some(map) = self.super_hosts {
            if !is_super_host(map, property.host_id) {
                return false;
            }
        }

        if fails_range(self.rate, property.rate) || fails_range(self.stars, property.stars) {
            return false;
        }

        if fails_set(&self.house_types, &property.house_type)
            || fails_set(&self.place_types, &property.place_type)
        {
            return false;
        }

        true
    }
}

#[inline]
fn fails_range(range: Option<RangeFilter>, value: f64) -> bool {
    range.is_some_and(|r| !r.contains(value))
}

#[inline]
fn fails_set(set: &FxHashSet<&str>, value: &str) -> bool {
    !set.is_empty() && !set.contains(value)
}

/// Hit/miss counters of the Super Host memo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Evaluates filter criteria over property snapshots.
///
/// Stateless apart from an optional memo of Super Host maps keyed by a
/// content fingerprint of the input; the memo never changes results.
pub struct FilterEngine {
    super_host_cache: Option<Mutex<LruCache<u64, Arc<SuperHostMap>>>>,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterEngine {
    /// Engine that recomputes the Super Host map on every call
    pub fn new() -> Self {
        Self {
            super_host_cache: None,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    /// Engine remembering up to `capacity` Super Host maps (0 disables the memo)
    pub fn with_cache(capacity: usize) -> Self {
        Self {
            super_host_cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            ..Self::new()
        }
    }

    /// Super Host flags for every host in `properties`
    pub fn super_hosts(&self, properties: &[PropertyRecord]) -> Arc<SuperHostMap> {
        let Some(cache) = &self.super_host_cache else {
            return Arc::new(compute_super_host_map(properties));
        };

        let key = fingerprint(properties);
        if let Some(map) = lock(cache).get(&key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(map);
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let map = Arc::new(compute_super_host_map(properties));
        lock(cache).put(key, Arc::clone(&map));
        map
    }

    /// Records satisfying every active criterion, in their original order.
    ///
    /// The Super Host map is computed from `properties` itself, and only when
    /// the criterion is active.
    pub fn apply<'a>(
        &self,
        properties: &'a [PropertyRecord],
        criteria: &FilterCriteria,
    ) -> Vec<&'a PropertyRecord> {
        if properties.is_empty() {
            return Vec::new();
        }

        let super_hosts = criteria.super_host_filter.then(|| self.super_hosts(properties));
        self.apply_with_hosts(properties, criteria, super_hosts.as_deref())
    }

    /// Like [`FilterEngine::apply`] but with a caller-supplied Super Host map.
    ///
    /// Passing a map computed over the full catalogue makes re-filtering an
    /// already filtered subset return that subset unchanged. With the
    /// criterion active and no map, every record is rejected.
    pub fn apply_with_hosts<'a>(
        &self,
        properties: &'a [PropertyRecord],
        criteria: &FilterCriteria,
        super_hosts: Option<&SuperHostMap>,
    ) -> Vec<&'a PropertyRecord> {
        if properties.is_empty() {
            return Vec::new();
        }

        let empty = SuperHostMap::default();
        let hosts = super_hosts.unwrap_or(&empty);
        let filter = CompiledFilter::new(criteria, Some(hosts));

        let results: Vec<&PropertyRecord> =
            properties.iter().filter(|p| filter.matches(p)).collect();

        debug!(
            input = properties.len(),
            retained = results.len(),
            super_host = criteria.super_host_filter,
            "filter applied"
        );
        results
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.super_host_cache.as_ref().map_or(0, |c| lock(c).len()),
            capacity: self.super_host_cache.as_ref().map_or(0, |c| lock(c).cap().get()),
        }
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.super_host_cache {
            lock(cache).clear();
        }
    }
}

/// Memo contents stay valid even if another thread panicked mid-update
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Filter with a throwaway engine
pub fn filter_properties<'a>(
    properties: &'a [PropertyRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a PropertyRecord> {
    FilterEngine::new().apply(properties, criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::criteria::DEFAULT_FILTERS;

    fn listing(
        id: u64,
        host_id: u64,
        country: &str,
        rate: f64,
        stars: f64,
        house_type: &str,
        place_type: &str,
    ) -> PropertyRecord {
        PropertyRecord {
            id,
            name: format!("Listing {}", id),
            host_id,
            country: country.to_string(),
            rate,
            stars,
            house_type: house_type.to_string(),
            place_type: place_type.to_string(),
            city: None,
            territory: None,
            image_src: None,
            image_alt_text: None,
        }
    }

    fn catalogue() -> Vec<PropertyRecord> {
        vec![
            listing(1, 10, "US", 100.0, 5.0, "House", "Entire place"),
            listing(2, 10, "US", 300.0, 3.0, "House", "Entire place"),
            listing(3, 20, "CA", 80.0, 2.5, "Apartment", "Private room"),
            listing(4, 20, "CA", 120.0, 4.0, "Apartment", "Shared room"),
            listing(5, 30, "CR", 150.0, 4.8, "Boutique hotel", "Hotel room"),
        ]
    }

    fn ids(results: &[&PropertyRecord]) -> Vec<u64> {
        results.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_default_filters_keep_everything() {
        let properties = catalogue();
        let results = filter_properties(&properties, &DEFAULT_FILTERS);
        assert_eq!(ids(&results), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_input() {
        let criteria = FilterCriteria::new().super_hosts_only(true);
        assert!(filter_properties(&[], &criteria).is_empty());
    }

    #[test]
    fn test_location_filter() {
        let properties = catalogue();
        let results = filter_properties(&properties, &FilterCriteria::new().with_location("CA"));
        assert_eq!(ids(&results), vec![3, 4]);
    }

    #[test]
    fn test_rate_range_inclusive_bounds() {
        let properties = vec![
            listing(1, 1, "US", 99.0, 3.0, "House", "Entire place"),
            listing(2, 1, "US", 100.0, 3.0, "House", "Entire place"),
            listing(3, 1, "US", 101.0, 3.0, "House", "Entire place"),
        ];
        let criteria = FilterCriteria::new().with_rate(100.0, 100.0);
        let results = filter_properties(&properties, &criteria);
        assert_eq!(ids(&results), vec![2]);
    }

    #[test]
    fn test_stars_range() {
        let properties = catalogue();
        let results = filter_properties(&properties, &FilterCriteria::new().with_stars(4.0, 5.0));
        assert_eq!(ids(&results), vec![1, 4, 5]);
    }

    #[test]
    fn test_category_sets() {
        let properties = catalogue();

        let houses = FilterCriteria::new().with_house_types(["House", "Boutique hotel"]);
        assert_eq!(ids(&filter_properties(&properties, &houses)), vec![1, 2, 5]);

        let places = FilterCriteria::new().with_place_types(["Private room", "Shared room"]);
        assert_eq!(ids(&filter_properties(&properties, &places)), vec![3, 4]);

        let none: [&str; 0] = [];
        let empty = FilterCriteria::new().with_house_types(none);
        assert_eq!(filter_properties(&properties, &empty).len(), properties.len());
    }

    #[test]
    fn test_super_host_filter() {
        let properties = catalogue();
        // host 10 averages 4.0, host 20 averages 3.25, host 30 averages 4.8
        let results = filter_properties(&properties, &FilterCriteria::new().super_hosts_only(true));
        assert_eq!(ids(&results), vec![1, 2, 5]);
    }

    #[test]
    fn test_criteria_are_anded() {
        let properties = catalogue();
        let criteria = FilterCriteria::new()
            .with_location("US")
            .super_hosts_only(true)
            .with_rate(0.0, 150.0);
        assert_eq!(ids(&filter_properties(&properties, &criteria)), vec![1]);
    }

    #[test]
    fn test_apply_with_hosts_missing_host_rejected() {
        let properties = catalogue();
        let criteria = FilterCriteria::new().super_hosts_only(true);
        let engine = FilterEngine::new();

        let mut partial = SuperHostMap::default();
        partial.insert(30, true);
        assert_eq!(ids(&engine.apply_with_hosts(&properties, &criteria, Some(&partial))), vec![5]);
        assert!(engine.apply_with_hosts(&properties, &criteria, None).is_empty());
    }

    #[test]
    fn test_apply_with_hosts_ignores_map_when_inactive() {
        let properties = catalogue();
        let engine = FilterEngine::new();
        let results = engine.apply_with_hosts(&properties, &DEFAULT_FILTERS, None);
        assert_eq!(results.len(), properties.len());
    }

    #[test]
    fn test_cache_hits_on_same_content() {
        let properties = catalogue();
        let engine = FilterEngine::with_cache(4);
        let criteria = FilterCriteria::new().super_hosts_only(true);

        let first = engine.apply(&properties, &criteria);
        let copy = properties.clone();
        let second = engine.apply(&copy, &criteria);
        assert_eq!(ids(&first), ids(&second));

        let stats = engine.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.hit_rate(), 0.5);

        engine.clear_cache();
        assert_eq!(engine.cache_stats().size, 0);
    }

    #[test]
    fn test_cache_not_touched_without_super_host_criterion() {
        let properties = catalogue();
        let engine = FilterEngine::with_cache(4);
        engine.apply(&properties, &FilterCriteria::new().with_location("US"));
        assert_eq!(engine.cache_stats().miss_count, 0);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let engine = FilterEngine::with_cache(0);
        assert_eq!(engine.cache_stats(), CacheStats::default());
    }
}
