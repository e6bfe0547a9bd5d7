use crate::voice::{NumberWords, normalize};

use std::collections::BTreeMap;

/// WHAT: German number words become digits
/// WHY: Spoken "zwei" must match a registry value of "2"
#[test]
fn given_german_number_word_when_normalizing_then_digit() {
    let words = NumberWords::default();

    assert_eq!(normalize("set volume zwei", &words), "set volume 2");
    assert_eq!(normalize("zwölf", &words), "12");
    assert_eq!(normalize("fünf uhr", &words), "5 uhr");
}

/// WHAT: English number words become digits
/// WHY: The fallback language uses the same normalization
#[test]
fn given_english_number_word_when_normalizing_then_digit() {
    let words = NumberWords::default();

    assert_eq!(normalize("volume twenty", &words), "volume 20");
    assert_eq!(normalize("desk one two", &words), "desk 1 2");
}

/// WHAT: Words inside longer words are not replaced
/// WHY: "zweihundert" must not become "2hundert"
#[test]
fn given_number_word_inside_longer_word_when_normalizing_then_unchanged() {
    let words = NumberWords::default();

    assert_eq!(normalize("zweihundert", &words), "zweihundert");
    assert_eq!(normalize("someone", &words), "someone");
    assert_eq!(normalize("nullpunkt acht", &words), "nullpunkt 8");
}

/// WHAT: Matching is case-sensitive and spacing is preserved
/// WHY: Normalization must only touch exact number tokens
#[test]
fn given_capitalized_word_and_double_spaces_when_normalizing_then_only_exact_tokens_changed() {
    let words = NumberWords::default();

    assert_eq!(normalize("Zwei  zwei", &words), "Zwei  2");
    assert_eq!(normalize("", &words), "");
}

/// WHAT: Built-in tables cover zero through twenty in both languages
/// WHY: The table is the whole contract for number recognition
#[test]
fn given_default_tables_when_building_then_forty_two_words() {
    let words = NumberWords::default();

    assert_eq!(words.len(), 42);
    assert_eq!(words.get("null"), Some("0"));
    assert_eq!(words.get("zero"), Some("0"));
    assert_eq!(words.get("zwanzig"), Some("20"));
}

/// WHAT: Custom per-language tables replace the defaults
/// WHY: Configuration can add a language or alternate word forms
#[test]
fn given_custom_table_when_normalizing_then_custom_words_used() {
    // Given: A French-only table
    let mut languages = BTreeMap::new();
    languages.insert(
        "fr".to_string(),
        BTreeMap::from([("deux".to_string(), "2".to_string())]),
    );
    let words = NumberWords::from_languages(&languages);

    // When/Then: French is normalized, German is not
    assert_eq!(normalize("volume deux", &words), "volume 2");
    assert_eq!(normalize("volume zwei", &words), "volume zwei");
}
