use super::{PointTable, Reading, ReadingKind, TopicLayout, TopicRegistry};

fn registry_abc() -> TopicRegistry {
    TopicRegistry::new(vec![
        Some("a".to_string()),
        Some("b".to_string()),
        Some("c".to_string()),
    ])
}

#[test]
fn test_registry_keeps_missing_slots() {
    let registry = TopicRegistry::new(vec![
        Some("hall".to_string()),
        None,
        Some("  ".to_string()),
        Some("kitchen".to_string()),
    ]);
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.lookup_index("kitchen"), Some(3));
    assert_eq!(registry.topic(1), None);
    assert_eq!(registry.topic(2), None);
    assert_eq!(registry.missing().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_registry_lookup_first_duplicate_wins() {
    let registry = TopicRegistry::new(vec![
        Some("dup".to_string()),
        Some("dup".to_string()),
    ]);
    assert_eq!(registry.lookup_index("dup"), Some(0));
    assert_eq!(registry.lookup_index("other"), None);
}

#[test]
fn test_split_subscriptions() {
    let registry = TopicRegistry::new(vec![
        Some("a".to_string()),
        None,
        Some("c".to_string()),
    ]);
    assert_eq!(
        registry.subscriptions(TopicLayout::Split),
        vec!["a/temperature", "a/humidity", "c/temperature", "c/humidity"]
    );
    assert_eq!(registry.subscriptions(TopicLayout::Direct), vec!["a", "c"]);
}

#[test]
fn test_split_route() {
    let registry = registry_abc();
    assert_eq!(
        registry.route(TopicLayout::Split, "a/temperature"),
        Some((0, ReadingKind::Temperature))
    );
    assert_eq!(
        registry.route(TopicLayout::Split, "c/humidity"),
        Some((2, ReadingKind::Humidity))
    );
    assert_eq!(registry.route(TopicLayout::Split, "d/temperature"), None);
    assert_eq!(registry.route(TopicLayout::Split, "a/pressure"), None);
    assert_eq!(registry.route(TopicLayout::Split, "a"), None);
}

#[test]
fn test_split_route_keeps_nested_base() {
    let registry = TopicRegistry::new(vec![Some("home/floor1/hall".to_string())]);
    assert_eq!(
        registry.route(TopicLayout::Split, "home/floor1/hall/humidity"),
        Some((0, ReadingKind::Humidity))
    );
}

#[test]
fn test_direct_route_is_exact_and_temperature() {
    let registry = registry_abc();
    assert_eq!(
        registry.route(TopicLayout::Direct, "b"),
        Some((1, ReadingKind::Temperature))
    );
    assert_eq!(registry.route(TopicLayout::Direct, "b/temperature"), None);
}

#[test]
fn test_table_apply_and_clear() {
    let mut table = PointTable::new(3);
    assert!(table.iter().all(|(_, p)| p.is_absent()));

    assert!(table.apply(Reading {
        index: 1,
        kind: ReadingKind::Temperature,
        value: 21.5,
    }));
    assert!(table.apply(Reading {
        index: 1,
        kind: ReadingKind::Humidity,
        value: 40.0,
    }));
    let point = table.get(1).unwrap();
    assert_eq!(point.temperature, Some(21.5));
    assert_eq!(point.humidity, Some(40.0));
    assert!(point.updated_at.is_some());

    let cleared = table.clear(1);
    assert_eq!(cleared, vec![ReadingKind::Temperature, ReadingKind::Humidity]);
    assert!(table.get(1).unwrap().is_absent());
    assert!(table.clear(1).is_empty());
}

#[test]
fn test_table_rejects_out_of_range() {
    let mut table = PointTable::new(2);
    assert!(!table.apply(Reading {
        index: 5,
        kind: ReadingKind::Temperature,
        value: 1.0,
    }));
    assert!(table.clear(5).is_empty());
    assert_eq!(table.len(), 2);
}

#[test]
fn test_kind_suffix_roundtrip() {
    for kind in TopicLayout::Split.kinds() {
        assert_eq!(ReadingKind::from_suffix(kind.suffix()), Some(*kind));
    }
    assert_eq!(TopicLayout::Direct.kinds(), &[ReadingKind::Temperature]);
}
