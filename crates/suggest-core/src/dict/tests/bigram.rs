use std::collections::HashMap;

use super::super::testutil::DictBuilder;
use super::{chars, sample_bytes, with_dict};
use crate::dict::resolver::resolve;
use crate::dict::{bigram_probability, Header};
use crate::suggestion::OutputType;

#[test]
fn test_bigram_validity_is_asymmetric() {
    with_dict(&sample_bytes(), |dict| {
        assert!(dict.is_valid_bigram("cat", "food"));
        assert!(!dict.is_valid_bigram("food", "cat"));
        assert!(dict.is_valid_bigram("food", "cats"));
        assert!(!dict.is_valid_bigram("cats", "food"));
        assert!(!dict.is_valid_bigram("car", "food"));
        assert!(!dict.is_valid_bigram("cat", "dog"));
    });
}

#[test]
fn test_empty_words_short_circuit() {
    with_dict(&sample_bytes(), |dict| {
        assert!(!dict.is_valid_bigram("", "food"));
        assert!(!dict.is_valid_bigram("cat", ""));
        assert!(dict.get_bigrams("", &[]).is_empty());
        assert!(dict.bigrams().lookup(&[]).is_empty());
    });
    // No blob access happens: even garbage past the header is never read.
    let mut bytes = sample_bytes();
    let root = Header::parse(&bytes).unwrap().root();
    for b in &mut bytes[root + 1..] {
        *b = 0xFF;
    }
    with_dict(&bytes, |dict| {
        assert!(!dict.is_valid_bigram("", "x"));
        assert!(dict.get_bigrams("", &['f']).is_empty());
    });
}

#[test]
fn test_lookup_entries() {
    let bytes = sample_bytes();
    with_dict(&bytes, |dict| {
        let root = dict.header().root();
        let food = resolve(&bytes, root, &chars("food"), false).unwrap().unwrap();
        let entries = dict.bigrams().lookup(&chars("cat"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, food);
        assert_eq!(entries[0].strength, 5);
        assert!(dict.bigrams().lookup(&chars("car")).is_empty());
        assert!(dict.bigrams().lookup(&chars("nope")).is_empty());
    });
}

#[test]
fn test_lookup_falls_back_to_lower_case() {
    with_dict(&sample_bytes(), |dict| {
        assert_eq!(dict.bigrams().lookup(&chars("CAT")).len(), 1);
        // Validity stays exact-case.
        assert!(!dict.is_valid_bigram("CAT", "food"));
    });
}

#[test]
fn test_predictions() {
    with_dict(&sample_bytes(), |dict| {
        let out = dict.get_bigrams("cat", &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].word, "food");
        assert_eq!(out[0].output_type, OutputType::Prediction);
        assert_eq!(out[0].probability, Some(150));
        assert_eq!(out[0].score, bigram_probability(150, 5) as i32);

        assert_eq!(dict.get_bigrams("cat", &['F', 'x']).len(), 1);
        assert!(dict.get_bigrams("cat", &['c']).is_empty());
        assert!(dict.get_bigrams("dog", &[]).is_empty());
    });
}

#[test]
fn test_predictions_rank_and_skip_invalid_targets() {
    let bytes = DictBuilder::new()
        .word("the", 200)
        .word("cat", 100)
        .word("car", 150)
        .word("dog", 120)
        .blacklisted("darn", 220)
        .bigram("the", "cat", 15)
        .bigram("the", "car", 0)
        .bigram("the", "dog", 8)
        .bigram("the", "darn", 15)
        .build();
    with_dict(&bytes, |dict| {
        let out = dict.get_bigrams("the", &[]);
        let words: Vec<&str> = out.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "dog", "car"]);
        for w in out.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
        assert!(dict.is_valid_bigram("the", "darn"));
    });
}

#[test]
fn test_backward_bigram_targets() {
    // "zoo" is laid out after "ant", so zoo → ant points backwards.
    let bytes = DictBuilder::new()
        .word("ant", 50)
        .word("zoo", 60)
        .bigram("zoo", "ant", 3)
        .bigram("ant", "zoo", 4)
        .build();
    with_dict(&bytes, |dict| {
        assert!(dict.is_valid_bigram("zoo", "ant"));
        assert!(dict.is_valid_bigram("ant", "zoo"));
        assert_eq!(dict.get_bigrams("zoo", &[])[0].word, "ant");
    });
}

#[test]
fn test_strengths_map() {
    let bytes = sample_bytes();
    with_dict(&bytes, |dict| {
        let mut map = HashMap::new();
        map.insert(1, 1);
        dict.bigrams().strengths(&chars("cat"), &mut map);
        assert_eq!(map.len(), 1);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![5]);
        dict.bigrams().strengths(&[], &mut map);
        assert!(map.is_empty());
    });
}

#[test]
fn test_corrupt_bigram_target_is_ignored() {
    let mut bytes = DictBuilder::new()
        .word("cat", 100)
        .word("food", 150)
        .bigram("cat", "food", 5)
        .build();
    let root = Header::parse(&bytes).unwrap().root();
    let cat = resolve(&bytes, root, &chars("cat"), false).unwrap().unwrap();
    let list = crate::dict::CharGroup::read(&bytes, cat).unwrap().bigrams.unwrap();
    // Point the entry backwards, into the header.
    bytes[list] |= 0x40;
    bytes[list + 1] = (list + 1 - 4) as u8;
    with_dict(&bytes, |dict| {
        assert!(dict.bigrams().lookup(&chars("cat")).is_empty());
        assert!(dict.get_bigrams("cat", &[]).is_empty());
        assert!(!dict.is_valid_bigram("cat", "food"));
    });
}
