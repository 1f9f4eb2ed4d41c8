#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing never fails; any criteria it yields must be well formed
    let query = kbnb::query::parse_filter_query(data);
    for range in [query.criteria.rate_filter, query.criteria.stars_filter].into_iter().flatten() {
        assert!(range.min() <= range.max());
    }

    // Lenient JSON criteria must not panic either
    let _ = serde_json::from_str::<kbnb::query::FilterCriteria>(data);
});
