//! End-to-end tiering behavior through the store API.
//!
//! Covers window retention, flush idempotence, archive round-trips and
//! window-keyed routing.

use std::sync::Arc;

use tiervec::{
    ArchiveLookup, ManualClock, RoutedResults, StoreConfig, Tier, TieredVectorStore,
};

const MIN: u64 = 60_000;

fn store_with(clock: &ManualClock, retain: u64) -> TieredVectorStore {
    let mut config = StoreConfig {
        dimension: Some(4),
        seed: Some(42),
        ..StoreConfig::default()
    };
    config.tiering.retain_window_count = retain;
    TieredVectorStore::with_clock(config, Arc::new(clock.clone())).expect("valid config")
}

fn embedding(i: u64) -> Vec<f32> {
    let x = i as f32;
    vec![x, x * 0.5, (x * 0.3).sin(), 1.0]
}

/// Three consecutive windows, keep two: only the oldest is archived.
#[test]
fn flush_archives_exactly_the_oldest_window() {
    let clock = ManualClock::from_millis(20 * MIN);
    let store = store_with(&clock, 2);

    let mut ids_by_window = Vec::new();
    for (w, window) in [20 * MIN, 21 * MIN, 22 * MIN].into_iter().enumerate() {
        let ids: Vec<u64> = (0..5)
            .map(|i| {
                let n = (w * 5 + i) as u64;
                store.insert(embedding(n), window + i as u64 * 1_000).unwrap()
            })
            .collect();
        ids_by_window.push(ids);
    }

    // Flush just after the third window opened.
    clock.set_ms(22 * MIN + 500);
    let created = store.flush_now();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].window_start, 20 * MIN);
    assert_eq!(created[0].count, 5);

    let stats = store.stats();
    assert_eq!(stats.live_count, 10);
    assert_eq!(
        stats.per_window_counts.keys().copied().collect::<Vec<_>>(),
        vec![21 * MIN, 22 * MIN]
    );

    store.with_index(|index| {
        assert!(ids_by_window[0].iter().all(|id| !index.contains(*id)));
        assert!(ids_by_window[1].iter().all(|id| index.contains(*id)));
        assert!(index.validate().is_ok());
    });
}

#[test]
fn second_flush_is_a_no_op() {
    let clock = ManualClock::from_millis(5 * MIN);
    let store = store_with(&clock, 1);
    for i in 0..8 {
        store.insert(embedding(i), 5 * MIN + i).unwrap();
    }

    clock.set_ms(6 * MIN + 10);
    let first = store.flush_now();
    assert_eq!(first.len(), 1);
    let after_first = store.stats();

    let second = store.flush_now();
    assert!(second.is_empty());
    assert_eq!(store.stats(), after_first);
}

#[test]
fn archived_record_is_its_own_nearest_neighbor() {
    let clock = ManualClock::from_millis(30 * MIN);
    let store = store_with(&clock, 1);
    let ids: Vec<u64> = (0..12)
        .map(|i| store.insert(embedding(i), 30 * MIN + i * 100).unwrap())
        .collect();

    clock.set_ms(31 * MIN);
    store.flush_now();

    for (i, id) in ids.iter().enumerate() {
        let query = embedding(i as u64);
        let hits = store
            .archive_query(&query, 30 * MIN, 3)
            .unwrap()
            .into_hits();
        assert_eq!(hits[0].id, *id);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[0].embedding, query);
    }
}

#[test]
fn unarchived_window_is_reported_distinctly() {
    let clock = ManualClock::from_millis(MIN);
    let store = store_with(&clock, 2);
    store.insert_now(embedding(1)).unwrap();

    assert_eq!(
        store.archive_query(&embedding(1), 50 * MIN, 1).unwrap(),
        ArchiveLookup::WindowNotArchived
    );
    assert_eq!(
        store.query_window(&embedding(1), 50 * MIN, 1, None).unwrap(),
        RoutedResults::WindowNotFound
    );
}

/// A resident window is always served by the graph, even when an archive
/// partition with the same key exists from an earlier flush.
#[test]
fn resident_window_routes_to_hot_tier_despite_archive_partition() {
    let clock = ManualClock::from_millis(10 * MIN);
    let store = store_with(&clock, 1);

    let archived_id = store.insert(embedding(0), 10 * MIN + 5).unwrap();
    clock.set_ms(11 * MIN);
    assert_eq!(store.flush_now().len(), 1);

    // A late record lands in the already-archived window and stays resident
    // until the next flush.
    let late_id = store.insert(embedding(50), 10 * MIN + 900).unwrap();

    let routed = store
        .query_window(&embedding(0), 10 * MIN, 1, None)
        .unwrap();
    assert_eq!(routed.tier(), Some(Tier::Hot));
    assert_eq!(routed.hits()[0].id, late_id);

    // The archive still answers direct lookups for that window.
    let direct = store.archive_query(&embedding(0), 10 * MIN, 1).unwrap().into_hits();
    assert_eq!(direct[0].id, archived_id);
}

#[test]
fn duplicate_window_flush_creates_versioned_partition() {
    let clock = ManualClock::from_millis(10 * MIN);
    let store = store_with(&clock, 1);

    let first_id = store.insert(embedding(3), 10 * MIN + 1).unwrap();
    clock.set_ms(11 * MIN);
    let first = store.flush_now();

    let late_id = store.insert(embedding(9), 10 * MIN + 2).unwrap();
    let second = store.flush_now();

    assert_eq!(first[0].window_start, second[0].window_start);
    assert_eq!(first[0].sequence, 0);
    assert_eq!(second[0].sequence, 1);
    assert_ne!(first[0].name, second[0].name);

    // Once nothing is resident in the window, the archive serves it and
    // ranks both partitions together.
    let routed = store
        .query_window(&embedding(9), 10 * MIN, 2, None)
        .unwrap();
    assert_eq!(routed.tier(), Some(Tier::Archive));
    let ids: Vec<u64> = routed.hits().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![late_id, first_id]);

    let stats = store.stats();
    assert_eq!(stats.archived_partition_count, 2);
    assert_eq!(stats.archived_record_count, 2);
}

#[test]
fn k_larger_than_live_count_returns_everything_once() {
    let clock = ManualClock::from_millis(MIN);
    let store = store_with(&clock, 2);
    let ids: Vec<u64> = (0..6).map(|i| store.insert_now(embedding(i)).unwrap()).collect();

    let hits = store.search(&embedding(2), 50, None).unwrap();
    assert_eq!(hits.len(), ids.len());

    let mut seen: Vec<u64> = hits.iter().map(|h| h.id).collect();
    seen.sort_unstable();
    assert_eq!(seen, ids);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(hits[0].id, ids[2]);
}

#[test]
fn first_insert_becomes_entry_point() {
    let clock = ManualClock::from_millis(MIN);
    let store = store_with(&clock, 2);
    let id = store.insert_now(embedding(7)).unwrap();

    store.with_index(|index| {
        assert_eq!(index.entry_point(), Some(id));
        assert_eq!(index.len(), 1);
        let level = index.get(id).map(|r| r.level);
        assert_eq!(level, Some(index.max_level()));
    });
}
