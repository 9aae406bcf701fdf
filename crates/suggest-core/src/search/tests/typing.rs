use super::{cat_car_can, typed, words};
use crate::dict::testutil::DictBuilder;
use crate::dictionary::Dictionary;
use crate::input::{InputPoint, KeySet, QueryInput};
use crate::suggestion::OutputType;

#[test]
fn test_exact_key_sets_rank_exact_word_first() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    let input = QueryInput::from_key_sets(vec!["c".into(), "a".into(), "t".into()]);
    let out = typed(&dict, &input, None, 0);
    assert_eq!(out[0].word, "cat");
    assert_eq!(out[0].output_type, OutputType::Exact);
    assert_eq!(out[0].probability, Some(120));
    assert!(out[0].space_indices.is_empty());
}

#[test]
fn test_ambiguous_last_key_orders_by_probability() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    for order in ["trn", "rtn", "ntr"] {
        let last = KeySet::ambiguous(order.chars().collect());
        let input = QueryInput::from_key_sets(vec!["c".into(), "a".into(), last]);
        let out = typed(&dict, &input, None, 0);
        assert_eq!(words(&out), vec!["cat", "car", "can"], "key order {order}");
        assert!(out[0].score > out[1].score && out[1].score > out[2].score);
        assert!(out.iter().all(|w| w.output_type == OutputType::Exact));
    }
}

#[test]
fn test_ranked_runner_up_key_is_a_correction() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    let input = QueryInput::from_key_sets(vec!["c".into(), "a".into(), "rtn".into()]);
    let out = typed(&dict, &input, None, 0);
    assert_eq!(out[0].word, "car");
    assert_eq!(out[0].output_type, OutputType::Exact);
    let cat = out.iter().find(|w| w.word == "cat").unwrap();
    assert_eq!(cat.output_type, OutputType::Correction);
}

#[test]
fn test_touch_between_keys_orders_by_probability() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    // The last touch lands midway between r and t; the typed letter is 'r'.
    let points = vec![
        InputPoint::new(400, 250, 0),
        InputPoint::new(100, 150, 100),
        InputPoint::new(400, 50, 200),
    ];
    let out = typed(&dict, &QueryInput::touched("car", points), None, 0);
    assert_eq!(words(&out), vec!["cat", "car", "can"]);
    assert_eq!(out[0].output_type, OutputType::Exact);
}

#[test]
fn test_commit_point_fixes_prefix() {
    let bytes = DictBuilder::new()
        .word("vast", 250)
        .word("cast", 50)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    let input = QueryInput::from_key_sets(vec!["cv".into(), "a".into(), "s".into(), "t".into()]);

    let free = typed(&dict, &input, None, 0);
    assert_eq!(free[0].word, "vast");

    let committed = typed(&dict, &input, None, 2);
    assert!(!committed.is_empty());
    assert_eq!(committed[0].word, "cast");
    assert!(committed.iter().all(|w| w.word.starts_with("ca")));
}

#[test]
fn test_previous_word_bigram_boost() {
    let bytes = DictBuilder::new()
        .word("cat", 120)
        .word("food", 100)
        .word("fool", 110)
        .bigram("cat", "food", 5)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    let input = QueryInput::typed("foo");

    let plain = typed(&dict, &input, None, 0);
    assert_eq!(words(&plain)[..2], ["fool", "food"]);
    assert_eq!(plain[0].output_type, OutputType::Completion);

    let boosted = typed(&dict, &input, Some("cat"), 0);
    assert_eq!(words(&boosted)[..2], ["food", "fool"]);
    // The boost changes ranking, not the reported unigram.
    assert_eq!(boosted[0].probability, Some(100));
}

#[test]
fn test_proximity_from_layout() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    // 's' sits next to 'a'.
    let out = typed(&dict, &QueryInput::typed("cst"), None, 0);
    assert_eq!(out[0].word, "cat");
    assert_eq!(out[0].output_type, OutputType::Correction);
}

#[test]
fn test_case_mismatch_is_cheap() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    let out = typed(&dict, &QueryInput::typed("Cat"), None, 0);
    assert_eq!(out[0].word, "cat");
    assert_eq!(out[0].output_type, OutputType::Exact);
}

#[test]
fn test_single_edits() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    for typo in ["caat", "ct", "cpt"] {
        let out = typed(&dict, &QueryInput::typed(typo), None, 0);
        assert!(words(&out).contains(&"cat"), "{typo} -> {:?}", words(&out));
        let cat = out.iter().find(|w| w.word == "cat").unwrap();
        assert_eq!(cat.output_type, OutputType::Correction);
    }
    // Two edits exceed the default budget.
    let out = typed(&dict, &QueryInput::typed("cpp"), None, 0);
    assert!(!words(&out).contains(&"cat"));
}

#[test]
fn test_completions() {
    let bytes = DictBuilder::new()
        .word("c", 10)
        .word("cat", 120)
        .word("catalogue", 90)
        .word("catastrophically", 200)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    let out = typed(&dict, &QueryInput::typed("cat"), None, 0);
    let found = words(&out);
    assert_eq!(found[0], "cat");
    assert!(found.contains(&"catalogue"));
    // Thirteen code points past the input exceed the completion budget.
    assert!(!found.contains(&"catastrophically"));
    let catalogue = out.iter().find(|w| w.word == "catalogue").unwrap();
    assert_eq!(catalogue.output_type, OutputType::Completion);
}

#[test]
fn test_empty_input_yields_nothing() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    assert!(typed(&dict, &QueryInput::default(), None, 0).is_empty());
}

#[test]
fn test_unsuggestible_words_are_hidden() {
    let bytes = DictBuilder::new()
        .word("cat", 50)
        .not_a_word("cats", 250)
        .blacklisted("cab", 250)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    let out = typed(&dict, &QueryInput::typed("cat"), None, 0);
    assert_eq!(words(&out), vec!["cat"]);
    let out = typed(&dict, &QueryInput::typed("cab"), None, 0);
    assert!(!words(&out).contains(&"cab"));
}

#[test]
fn test_shortcuts() {
    let bytes = DictBuilder::new()
        .word("thx", 100)
        .shortcut("thx", "thanks", 5)
        .shortcut("thx", "thank you", 15)
        .blacklisted("dang", 100)
        .shortcut("dang", "darn", 3)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();

    let out = typed(&dict, &QueryInput::typed("thx"), None, 0);
    assert_eq!(words(&out), vec!["thank you", "thx", "thanks"]);
    assert_eq!(out[0].output_type, OutputType::Shortcut);
    assert_eq!(out[0].score, out[1].score + 1);
    assert_eq!(out[2].score, out[1].score - 1);

    let out = typed(&dict, &QueryInput::typed("dang"), None, 0);
    assert_eq!(words(&out), vec!["darn"]);
    assert_eq!(out[0].output_type, OutputType::Shortcut);
}

#[test]
fn test_max_results_truncates() {
    let bytes = DictBuilder::new()
        .word("a", 10)
        .word("ab", 20)
        .word("abc", 30)
        .word("abd", 40)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    let layout = crate::proximity::KeyboardLayout::qwerty();
    let mut session = crate::session::TraversalSession::new();
    let options = crate::session::SuggestOptions {
        max_results: 2,
        ..crate::session::SuggestOptions::typing()
    };
    let out = dict.get_suggestions(&layout, &mut session, &QueryInput::typed("a"), None, 0, options);
    assert_eq!(out.len(), 2);
}
