//! Unit tests for the Deck Manager.

use chrono::NaiveDate;
use rstest::rstest;

use deckvault::database::ConnectionManager;
use deckvault::managers::deck_manager::{DeckManager, DeckManagerTrait};
use deckvault::types::deck::{Condition, DeckFilter, NewDeck};
use deckvault::types::errors::DatabaseError;

fn setup() -> ConnectionManager {
    ConnectionManager::open_in_memory().expect("Failed to open in-memory database")
}

fn deck(name: &str, manufacturer: &str, condition: Condition) -> NewDeck {
    NewDeck {
        name: name.to_string(),
        manufacturer: manufacturer.to_string(),
        release_year: Some(2015),
        condition,
        purchase_date: None,
        purchase_price: 10.0,
        notes: String::new(),
    }
}

#[test]
fn test_add_then_list_returns_deck_unchanged() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);

    let new = NewDeck {
        name: "Bicycle Rider Back".to_string(),
        manufacturer: "USPCC".to_string(),
        release_year: Some(1885),
        condition: Condition::NearMint,
        purchase_date: NaiveDate::from_ymd_opt(2023, 4, 12),
        purchase_price: 4.99,
        notes: "Red back, sealed".to_string(),
    };
    let id = mgr.add_deck(&new, None).unwrap();

    let decks = mgr.get_all_decks().unwrap();
    assert_eq!(decks.len(), 1);
    let stored = &decks[0];
    assert_eq!(stored.id, id);
    assert_eq!(stored.name, new.name);
    assert_eq!(stored.manufacturer, new.manufacturer);
    assert_eq!(stored.release_year, new.release_year);
    assert_eq!(stored.condition, new.condition);
    assert_eq!(stored.purchase_date, new.purchase_date);
    assert_eq!(stored.purchase_price, new.purchase_price);
    assert_eq!(stored.notes, new.notes);
    assert!(!stored.has_image);
}

#[test]
fn test_list_is_newest_first() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);

    let first = mgr.add_deck(&deck("Monarchs", "Theory11", Condition::Mint), None).unwrap();
    let second = mgr.add_deck(&deck("Tycoon", "Theory11", Condition::Good), None).unwrap();
    let third = mgr.add_deck(&deck("Fontaine", "Fontaine", Condition::Fair), None).unwrap();

    let ids: Vec<i64> = mgr.get_all_decks().unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![third, second, first]);
}

#[test]
fn test_get_deck_missing_returns_none() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    assert!(mgr.get_deck(12345).unwrap().is_none());
}

#[test]
fn test_image_is_stored_verbatim() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let image = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];

    let with_image = mgr
        .add_deck(&deck("Jerry's Nuggets", "USPCC", Condition::Excellent), Some(&image))
        .unwrap();
    let without_image = mgr.add_deck(&deck("Bee", "USPCC", Condition::Good), None).unwrap();

    assert_eq!(mgr.get_deck_image(with_image).unwrap(), Some(image));
    assert!(mgr.get_deck(with_image).unwrap().unwrap().has_image);
    assert_eq!(mgr.get_deck_image(without_image).unwrap(), None);
    assert_eq!(mgr.get_deck_image(9999).unwrap(), None);
}

#[rstest]
#[case("", "USPCC", 1.0)]
#[case("   ", "USPCC", 1.0)]
#[case("Bee", "", 1.0)]
#[case("Bee", "USPCC", -1.0)]
#[case("Bee", "USPCC", f64::NAN)]
fn test_invalid_deck_is_rejected_without_writing(
    #[case] name: &str,
    #[case] manufacturer: &str,
    #[case] price: f64,
) {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let mut new = deck(name, manufacturer, Condition::Mint);
    new.purchase_price = price;

    let result = mgr.add_deck(&new, None);
    assert!(matches!(result, Err(DatabaseError::InvalidInput(_))));
    assert!(mgr.get_all_decks().unwrap().is_empty());
}

#[rstest]
#[case("monarch")]
#[case("MONARCH")]
#[case("MoNaRcH")]
#[case("theory")]
fn test_search_is_case_insensitive(#[case] query: &str) {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let hit = mgr.add_deck(&deck("Monarchs", "Theory11", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("Bee Stingers", "USPCC", Condition::Good), None).unwrap();

    let results = mgr.search_decks(query).unwrap();
    assert_eq!(results.len(), 1, "query {:?}", query);
    assert_eq!(results[0].id, hit);
}

#[rstest]
#[case("éclat")]
#[case("ÉCLAT")]
#[case("ORCHIDÉE")]
#[case("orchidée")]
fn test_search_folds_non_ascii_case(#[case] query: &str) {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let hit = mgr.add_deck(&deck("Éclat Orchidée", "Cartamundi", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("Eclat Orchidee", "Cartamundi", Condition::Mint), None).unwrap();

    let ids: Vec<i64> = mgr.search_decks(query).unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![hit], "query {:?}", query);
}

#[test]
fn test_search_matches_notes() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let mut with_notes = deck("Arcane", "Ellusionist", Condition::Mint);
    with_notes.notes = "Gift from the 2019 convention".to_string();
    let id = mgr.add_deck(&with_notes, None).unwrap();

    let results = mgr.search_decks("Convention").unwrap();
    assert_eq!(results.iter().map(|d| d.id).collect::<Vec<_>>(), vec![id]);
}

#[test]
fn test_search_treats_wildcards_literally() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let literal = mgr.add_deck(&deck("100% Cotton", "Card Mafia", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("1000 Cranes", "Card Mafia", Condition::Mint), None).unwrap();

    let results = mgr.search_decks("0%").unwrap();
    assert_eq!(results.iter().map(|d| d.id).collect::<Vec<_>>(), vec![literal]);

    assert!(mgr.search_decks("_").unwrap().is_empty());
}

#[test]
fn test_filter_by_manufacturer_and_condition() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    let a = mgr.add_deck(&deck("Monarchs", "Theory11", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("Tycoon", "Theory11", Condition::Poor), None).unwrap();
    let c = mgr.add_deck(&deck("Bee", "USPCC", Condition::Mint), None).unwrap();

    let by_condition = DeckFilter {
        manufacturers: vec![],
        conditions: vec![Condition::Mint],
    };
    let ids: Vec<i64> = mgr.filter_decks(&by_condition).unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![c, a]);

    let both = DeckFilter {
        manufacturers: vec!["Theory11".to_string()],
        conditions: vec![Condition::Mint],
    };
    let ids: Vec<i64> = mgr.filter_decks(&both).unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![a]);

    assert_eq!(mgr.filter_decks(&DeckFilter::default()).unwrap().len(), 3);
}

#[test]
fn test_manufacturers_are_distinct_and_sorted() {
    let mut db = setup();
    let mut mgr = DeckManager::new(&mut db);
    mgr.add_deck(&deck("Monarchs", "Theory11", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("Tycoon", "Theory11", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("Bee", "USPCC", Condition::Mint), None).unwrap();
    mgr.add_deck(&deck("Fulton", "art of play", Condition::Mint), None).unwrap();

    assert_eq!(
        mgr.manufacturers().unwrap(),
        vec!["art of play".to_string(), "Theory11".to_string(), "USPCC".to_string()]
    );
}
