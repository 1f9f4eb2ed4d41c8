use crate::index::trie::{InsertOutcome, PrefixIndex, fold_key};
use crate::index::types::{BuildStats, CollisionPolicy, IndexConfig, Searchable};
use std::time::Instant;
use tracing::debug;

/// Incremental builder for a [`PrefixIndex`]
pub struct IndexBuilder {
    index: PrefixIndex,
    stats: BuildStats,
    started: Instant,
}

impl IndexBuilder {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            index: PrefixIndex::empty(config.collision_policy),
            stats: BuildStats::default(),
            started: Instant::now(),
        }
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self::new(&IndexConfig {
            collision_policy: policy,
        })
    }

    /// Add one entity. Entities with an empty name are skipped and counted.
    pub fn add<S: Searchable + ?Sized>(&mut self, entity: &S) -> &mut Self {
        let name = entity.search_name();
        if name.is_empty() {
            self.stats.skipped_empty += 1;
            debug!(id = entity.search_id(), "skipping entity with empty name");
            return self;
        }

        let key = fold_key(name);
        match self.index.insert(&key, entity.to_match()) {
            InsertOutcome::Inserted | InsertOutcome::Replaced => self.stats.indexed += 1,
            InsertOutcome::Collided => {
                self.stats.indexed += 1;
                self.stats.collisions += 1;
                debug!(id = entity.search_id(), name = %key, "name collision");
            }
        }
        self
    }

    pub fn extend<I, S>(&mut self, entities: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Searchable,
    {
        for entity in entities {
            self.add(&entity);
        }
        self
    }

    pub fn finish(self) -> PrefixIndex {
        let mut index = self.index;
        index.stats = self.stats;

        debug!(
            indexed = self.stats.indexed,
            skipped_empty = self.stats.skipped_empty,
            collisions = self.stats.collisions,
            nodes = index.node_count(),
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "prefix index built"
        );
        index
    }
}

impl PrefixIndex {
    /// Build an index over `entities` with the default collision policy
    pub fn build<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Searchable,
    {
        Self::build_with_config(entities, &IndexConfig::default())
    }

    pub fn build_with_config<I, S>(entities: I, config: &IndexConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Searchable,
    {
        let mut builder = IndexBuilder::new(config);
        builder.extend(entities);
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{Match, PropertyRecord};

    fn record(id: u64, name: &str) -> PropertyRecord {
        PropertyRecord {
            id,
            name: name.to_string(),
            host_id: 1,
            country: "US".to_string(),
            rate: 100.0,
            stars: 4.0,
            house_type: "House".to_string(),
            place_type: "Entire place".to_string(),
            city: None,
            territory: None,
            image_src: None,
            image_alt_text: None,
        }
    }

    #[test]
    fn test_build_from_records() {
        let records = vec![record(1, "Sunny Cabin"), record(2, "Sunset Villa")];
        let index = PrefixIndex::build(&records);
        assert_eq!(index.query_ids("SUN"), vec![1, 2]);
        assert_eq!(index.stats().indexed, 2);
    }

    #[test]
    fn test_empty_names_are_skipped() {
        let records = vec![record(1, ""), record(2, "Loft"), record(3, "")];
        let index = PrefixIndex::build(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index.stats().skipped_empty, 2);
        assert_eq!(index.stats().indexed, 1);
    }

    #[test]
    fn test_build_from_matches() {
        let matches = vec![Match::new(5, "Harbor View"), Match::new(6, "harbour")];
        let index = PrefixIndex::build(matches);
        assert_eq!(index.query_ids("harb"), vec![5, 6]);
        assert_eq!(index.query_ids("harbo"), vec![6]);
    }

    #[test]
    fn test_collision_counted_under_both_policies() {
        let records = vec![record(1, "Loft"), record(2, "loft")];

        let keep_all = PrefixIndex::build(&records);
        assert_eq!(keep_all.stats().collisions, 1);
        assert_eq!(keep_all.len(), 2);

        let config = IndexConfig {
            collision_policy: CollisionPolicy::LastWriteWins,
        };
        let lww = PrefixIndex::build_with_config(&records, &config);
        assert_eq!(lww.stats().collisions, 1);
        assert_eq!(lww.query_ids("loft"), vec![2]);
    }

    #[test]
    fn test_builder_chaining() {
        let mut builder = IndexBuilder::with_policy(CollisionPolicy::KeepAll);
        builder.add(&Match::new(1, "Alpha")).add(&Match::new(2, "Beta"));
        let index = builder.finish();
        assert_eq!(index.query_ids("a"), vec![1]);
        assert_eq!(index.query_ids("b"), vec![2]);
    }
}
