//! Property-based tests for parsing, slugs and target rendering.

use proptest::collection::btree_map;
use proptest::prelude::*;
use sync_agent::cache::CacheStore;
use sync_agent::duration;
use sync_agent::mappings::Mapping;
use sync_agent::target;
use vault_client::SecretSnapshot;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_duration_suffix_scales(
        n in 0u64..10_000,
        unit in prop_oneof![Just('s'), Just('m'), Just('h'), Just('d')],
    ) {
        let scale = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            _ => 86_400,
        };
        let parsed = duration::parse(&format!("{n}{unit}")).unwrap();
        prop_assert_eq!(parsed, n * scale);
    }

    #[test]
    fn prop_duration_bare_number_is_seconds(n in 0u64..1_000_000) {
        prop_assert_eq!(duration::parse(&n.to_string()).unwrap(), n);
    }

    #[test]
    fn prop_duration_never_panics(input in ".*") {
        let _ = duration::parse(&input);
    }

    #[test]
    fn prop_slug_only_safe_characters(path in ".{0,64}") {
        let slug = CacheStore::slug(&path);
        prop_assert!(
            slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        );
    }

    #[test]
    fn prop_slug_idempotent(path in ".{0,64}") {
        let once = CacheStore::slug(&path);
        let twice = CacheStore::slug(&once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_render_no_trailing_newline(
        entries in btree_map("[A-Z_]{1,10}", "[ -~]{0,24}", 1..8),
    ) {
        let rendered = target::render(&entries);
        prop_assert!(!rendered.ends_with('\n'));
    }

    #[test]
    fn prop_render_one_line_per_entry(
        entries in btree_map("[A-Z_]{1,10}", "[ -~]{0,24}", 1..8),
    ) {
        let rendered = target::render(&entries);
        prop_assert_eq!(rendered.lines().count(), entries.len());
    }

    #[test]
    fn prop_render_round_trips(
        entries in btree_map("[A-Z_]{1,10}", "[ -~]{0,24}", 0..8),
    ) {
        let rendered = target::render(&entries);
        let parsed: SecretSnapshot = rendered
            .lines()
            .map(|line| {
                let (key, value) = line.split_once('=').expect("line has separator");
                (key.to_string(), value.to_string())
            })
            .collect();
        prop_assert_eq!(parsed, entries);
    }

    #[test]
    fn prop_cache_round_trips(
        entries in btree_map("[A-Za-z0-9_]{1,12}", "[ -~]{0,32}", 0..6),
        path in "[ -~]{1,32}",
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mapping = Mapping::new(path, "out.env");

        tokio_test::block_on(async {
            store.save(&mapping, &entries).await.unwrap();
            let loaded = store.load(&mapping).await.unwrap();
            assert_eq!(loaded, Some(entries.clone()));
        });
    }
}
