#![no_main]

use arbitrary::Arbitrary;
use kbnb::index::{CollisionPolicy, IndexConfig, Match, PrefixIndex, fold_key};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    names: Vec<(u8, String)>,
    query: String,
}

fuzz_target!(|input: Input| {
    let entities: Vec<Match> = input
        .names
        .iter()
        .map(|(id, name)| Match::new(*id as u64, name.clone()))
        .collect();
    let index = PrefixIndex::build_with_config(
        &entities,
        &IndexConfig {
            collision_policy: CollisionPolicy::KeepAll,
        },
    );

    let key = fold_key(&input.query);
    for m in index.query(&input.query) {
        assert!(fold_key(&m.name).starts_with(&key));
    }
    if input.query.is_empty() {
        assert!(index.query("").is_empty());
    }

    // Every char-prefix of an indexed name finds that name's id
    for entity in &entities {
        let ends = entity
            .name
            .char_indices()
            .map(|(pos, _)| pos)
            .skip(1)
            .chain(std::iter::once(entity.name.len()));
        for end in ends {
            let prefix = &entity.name[..end];
            if prefix.is_empty() {
                continue;
            }
            assert!(
                index.query_ids(prefix).contains(&entity.id),
                "prefix {:?} lost {:?}",
                prefix,
                entity.name
            );
        }
    }
});
