use keepsake_types::EntityId;
use std::collections::HashSet;
use std::str::FromStr;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn default_is_unassigned() {
    let id = EntityId::default();
    assert_eq!(id, EntityId::UNASSIGNED);
    assert!(!id.is_assigned());
}

#[test]
fn new_holds_raw_value() {
    let id = EntityId::new(42);
    assert_eq!(id.get(), 42);
    assert!(id.is_assigned());
}

#[test]
fn first_is_one() {
    assert_eq!(EntityId::FIRST.get(), 1);
}

#[test]
fn next_increments() {
    assert_eq!(EntityId::new(7).next(), Some(EntityId::new(8)));
}

#[test]
fn next_is_none_at_max() {
    assert_eq!(EntityId::new(u64::MAX).next(), None);
    assert_eq!(
        EntityId::new(u64::MAX - 1).next(),
        Some(EntityId::new(u64::MAX))
    );
}

#[test]
fn u64_conversions() {
    let id: EntityId = 9u64.into();
    let raw: u64 = id.into();
    assert_eq!(raw, 9);
}

// ── Parsing & display ────────────────────────────────────────────

#[test]
fn display_and_parse() {
    let id = EntityId::new(1234);
    let s = id.to_string();
    assert_eq!(s, "1234");
    assert_eq!(EntityId::parse(&s).unwrap(), id);
}

#[test]
fn from_str() {
    let id: EntityId = EntityId::from_str("17").unwrap();
    assert_eq!(id.get(), 17);
}

#[test]
fn parse_invalid() {
    assert!(EntityId::parse("not-a-number").is_err());
    assert!(EntityId::parse("-3").is_err());
}

// ── Traits ───────────────────────────────────────────────────────

#[test]
fn ordering_follows_value() {
    assert!(EntityId::new(2) < EntityId::new(10));
}

#[test]
fn hash_and_eq() {
    let id = EntityId::new(5);
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn serializes_as_plain_integer() {
    let json = serde_json::to_string(&EntityId::new(31)).unwrap();
    assert_eq!(json, "31");
    let parsed: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, EntityId::new(31));
}
