use proptest::prelude::*;

use super::super::testutil::DictBuilder;
use super::{chars, sample_bytes};
use crate::dict::format::{CharGroup, MAX_WORD_LENGTH};
use crate::dict::resolver::{resolve, word_at};
use crate::dict::Header;

fn root(bytes: &[u8]) -> usize {
    Header::parse(bytes).unwrap().root()
}

#[test]
fn test_resolve_terminals() {
    let bytes = sample_bytes();
    let root = root(&bytes);
    for word in ["cat", "car", "can", "cats", "food", "Paris", "catz", "crap"] {
        let pos = resolve(&bytes, root, &chars(word), false).unwrap();
        let pos = pos.unwrap_or_else(|| panic!("{word} should resolve"));
        assert!(CharGroup::read(&bytes, pos).unwrap().flags.is_terminal());
    }
}

#[test]
fn test_resolve_misses() {
    let bytes = sample_bytes();
    let root = root(&bytes);
    // "ca" is a prefix only, "fo" ends mid-run, "foods" runs past a leaf.
    for word in ["ca", "fo", "foods", "dog", "c", "cart", "Cat", ""] {
        assert_eq!(resolve(&bytes, root, &chars(word), false).unwrap(), None, "{word}");
    }
}

#[test]
fn test_resolve_force_lower_case() {
    let bytes = sample_bytes();
    let root = root(&bytes);
    let exact = resolve(&bytes, root, &chars("cat"), false).unwrap();
    assert!(exact.is_some());
    assert_eq!(resolve(&bytes, root, &chars("CAT"), true).unwrap(), exact);
    assert_eq!(resolve(&bytes, root, &chars("cAt"), true).unwrap(), exact);
    // Stored code points are not folded: "Paris" needs its capital.
    assert_eq!(resolve(&bytes, root, &chars("PARIS"), true).unwrap(), None);
}

#[test]
fn test_resolve_rejects_overlong_word() {
    let long = "a".repeat(MAX_WORD_LENGTH + 1);
    let bytes = DictBuilder::new().word("a", 1).build();
    assert_eq!(resolve(&bytes, root(&bytes), &chars(&long), false).unwrap(), None);
}

#[test]
fn test_resolve_without_multi_char_runs() {
    let bytes = DictBuilder::new()
        .word("food", 150)
        .word("fool", 90)
        .multi_char_runs(false)
        .build();
    let root = root(&bytes);
    assert!(resolve(&bytes, root, &chars("fool"), false).unwrap().is_some());
    assert_eq!(resolve(&bytes, root, &chars("foo"), false).unwrap(), None);
}

#[test]
fn test_word_at_roundtrips_every_terminal() {
    let bytes = sample_bytes();
    let root = root(&bytes);
    let mut out = Vec::new();
    for word in ["cat", "car", "can", "cats", "food", "Paris", "catz", "crap"] {
        let pos = resolve(&bytes, root, &chars(word), false).unwrap().unwrap();
        let group = word_at(&bytes, root, pos, &mut out).unwrap().unwrap();
        assert_eq!(group.pos, pos);
        assert_eq!(out, chars(word));
    }
}

#[test]
fn test_word_at_non_terminal() {
    let bytes = sample_bytes();
    let root = root(&bytes);
    let mut out = Vec::new();
    // The root array itself and offsets before it hold no word.
    assert_eq!(word_at(&bytes, root, root, &mut out).unwrap(), None);
    assert_eq!(word_at(&bytes, root, 0, &mut out).unwrap(), None);
    assert!(out.is_empty());
}

#[test]
fn test_resolve_truncated_blob_errors() {
    let bytes = sample_bytes();
    let root = root(&bytes);
    let cut = &bytes[..root + 4];
    assert!(resolve(cut, root, &chars("food"), false).is_err());
}

fn arb_word() -> impl Strategy<Value = String> {
    "[a-e]{1,6}"
}

proptest! {
    #[test]
    fn prop_probability_independent_of_siblings(
        others in prop::collection::btree_map(arb_word(), 1u8..=255, 0..40),
        target in arb_word(),
        probability in 1u8..=255,
    ) {
        let mut builder = DictBuilder::new();
        for (word, p) in &others {
            if *word != target {
                builder = builder.word(word, *p);
            }
        }
        let bytes = builder.word(&target, probability).build();
        let root = root(&bytes);
        let pos = resolve(&bytes, root, &chars(&target), false).unwrap();
        let pos = pos.expect("target resolves");
        let group = CharGroup::read(&bytes, pos).unwrap();
        prop_assert_eq!(group.probability, Some(probability));

        let mut out = Vec::new();
        prop_assert!(word_at(&bytes, root, pos, &mut out).unwrap().is_some());
        prop_assert_eq!(out, chars(&target));
    }

    #[test]
    fn prop_case_folded_resolution_matches_exact(
        words in prop::collection::btree_set(arb_word(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut builder = DictBuilder::new();
        for word in &words {
            builder = builder.word(word, 100);
        }
        let bytes = builder.build();
        let root = root(&bytes);
        let words: Vec<&String> = words.iter().collect();
        let word = pick.get(&words);
        let exact = resolve(&bytes, root, &chars(word), false).unwrap();
        let upper = resolve(&bytes, root, &chars(&word.to_uppercase()), true).unwrap();
        prop_assert!(exact.is_some());
        prop_assert_eq!(exact, upper);
    }
}
