use super::{cat_car_can, traced, words};
use crate::dict::testutil::DictBuilder;
use crate::dictionary::Dictionary;
use crate::input::{InputPoint, QueryInput};
use crate::proximity::KeyboardLayout;
use crate::session::{SuggestOptions, TraversalSession};
use crate::suggestion::OutputType;

#[test]
fn test_trace_ranks_traced_word_first() {
    let bytes = DictBuilder::new()
        .word("cat", 120)
        .word("car", 100)
        .word("can", 80)
        .word("cab", 60)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    let out = traced(&dict, "cat", None);
    assert_eq!(out[0].word, "cat");
    assert_eq!(out[0].output_type, OutputType::Correction);
    assert!(out[0].space_indices.is_empty());
    assert!(!words(&out).contains(&"car"));
}

#[test]
fn test_trace_infers_space() {
    let bytes = DictBuilder::new().word("go", 150).word("to", 150).build();
    let dict = Dictionary::new(&bytes).unwrap();
    let out = traced(&dict, "goto", None);
    assert_eq!(out[0].word, "go to");
    assert_eq!(out[0].space_indices, vec![2]);
    // Neither word alone covers the whole trajectory.
    assert!(!words(&out).contains(&"go"));
    assert!(!words(&out).contains(&"to"));
}

#[test]
fn test_doubled_letters_reuse_sample() {
    let bytes = DictBuilder::new().word("too", 100).word("to", 120).build();
    let dict = Dictionary::new(&bytes).unwrap();
    let out = traced(&dict, "to", None);
    let found = words(&out);
    assert_eq!(found[0], "to");
    assert!(found.contains(&"too"));
}

#[test]
fn test_short_trajectory_yields_nothing() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    let layout = KeyboardLayout::qwerty();
    let mut session = TraversalSession::new();
    let input = QueryInput::gesture(vec![InputPoint::new(400, 250, 0)]);
    let out = dict.get_suggestions(&layout, &mut session, &input, None, 0, SuggestOptions::gesture());
    assert!(out.is_empty());
}

#[test]
fn test_second_pointer_is_ignored() {
    let bytes = cat_car_can();
    let dict = Dictionary::new(&bytes).unwrap();
    let layout = KeyboardLayout::qwerty();
    let mut points = layout.trace("cat", 20.0);
    let stray: Vec<InputPoint> = layout
        .trace("pp", 20.0)
        .into_iter()
        .map(|p| InputPoint { pointer_id: 7, ..p })
        .collect();
    points.splice(5..5, stray);
    let mut session = TraversalSession::new();
    let out = dict.get_suggestions(
        &layout,
        &mut session,
        &QueryInput::gesture(points),
        None,
        0,
        SuggestOptions::gesture(),
    );
    assert_eq!(out[0].word, "cat");
}

#[test]
fn test_previous_word_boosts_first_gesture_word() {
    let bytes = DictBuilder::new()
        .word("the", 200)
        .word("car", 110)
        .word("cat", 100)
        .bigram("the", "cat", 15)
        .build();
    let dict = Dictionary::new(&bytes).unwrap();
    // The trace stops between 'r' and 't', a little closer to 'r'.
    let layout = KeyboardLayout::qwerty();
    let mut points = layout.trace("ca", 20.0);
    let (ax, ay) = (100.0f32, 150.0f32);
    let (ex, ey) = (400.0f32, 50.0f32);
    for i in 1..=16 {
        let t = i as f32 / 16.0;
        let time = points.len() as i32 * 10;
        points.push(InputPoint::new(
            (ax + (ex - ax) * t).round() as i32,
            (ay + (ey - ay) * t).round() as i32,
            time,
        ));
    }
    let input = QueryInput::gesture(points);
    let mut session = TraversalSession::new();
    let plain = dict.get_suggestions(&layout, &mut session, &input, None, 0, SuggestOptions::gesture());
    assert_eq!(plain[0].word, "car");
    let boosted =
        dict.get_suggestions(&layout, &mut session, &input, Some("the"), 0, SuggestOptions::gesture());
    assert_eq!(boosted[0].word, "cat");
}
