use crate::index::source::PropertySource;
use crate::index::trie::PrefixIndex;
use crate::index::types::BuildStats;
use crate::query::hosts::compute_host_aggregates;
use serde::Serialize;

/// Summary of a loaded catalogue and its search index
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub record_count: usize,
    pub host_count: usize,
    pub super_host_count: usize,
    pub index_nodes: usize,
    pub index_matches: usize,
    pub build: BuildStats,
    pub countries: Vec<String>,
    pub house_types: Vec<String>,
    pub place_types: Vec<String>,
}

impl CatalogStats {
    pub fn collect(source: &PropertySource, index: &PrefixIndex) -> Self {
        let hosts = compute_host_aggregates(source.records());
        Self {
            record_count: source.len(),
            host_count: hosts.len(),
            super_host_count: hosts.values().filter(|h| h.is_super_host()).count(),
            index_nodes: index.node_count(),
            index_matches: index.len(),
            build: index.stats(),
            countries: source.countries(),
            house_types: source.house_types(),
            place_types: source.place_types(),
        }
    }
}

/// Display catalogue statistics
pub fn show_stats(stats: &CatalogStats) {
    println!("Catalog Statistics");
    println!("==================");
    println!();
    println!("Properties:       {}", stats.record_count);
    println!("Hosts:            {}", stats.host_count);
    println!("Super Hosts:      {}", stats.super_host_count);
    println!();
    println!("Index nodes:      {}", stats.index_nodes);
    println!("Index matches:    {}", stats.index_matches);
    println!("Skipped (empty):  {}", stats.build.skipped_empty);
    println!("Name collisions:  {}", stats.build.collisions);
    println!();
    println!("Countries:        {}", join_or_none(&stats.countries));
    println!("House types:      {}", join_or_none(&stats.house_types));
    println!("Place types:      {}", join_or_none(&stats.place_types));
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_stats() {
        let json = r#"[
            {"id": 1, "name": "Sunny Cabin", "hostId": 10, "country": "US", "rate": 100,
             "stars": 5, "houseType": "House", "placeType": "Entire place"},
            {"id": 2, "name": "Sunset Villa", "hostId": 10, "country": "US", "rate": 300,
             "stars": 3, "houseType": "House", "placeType": "Entire place"},
            {"id": 3, "name": "", "hostId": 11, "country": "CA", "rate": 80,
             "stars": 2, "houseType": "Apartment", "placeType": "Shared room"}
        ]"#;
        let source = PropertySource::from_slice(json.as_bytes()).unwrap();
        let index = PrefixIndex::build(source.records());
        let stats = CatalogStats::collect(&source, &index);

        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.host_count, 2);
        assert_eq!(stats.super_host_count, 1);
        assert_eq!(stats.index_matches, 2);
        assert_eq!(stats.build.skipped_empty, 1);
        assert_eq!(stats.countries, vec!["CA", "US"]);
    }

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(&[]), "(none)");
        assert_eq!(join_or_none(&["a".to_string(), "b".to_string()]), "a, b");
    }
}
