mod gesture;
mod typing;

use crate::dict::testutil::DictBuilder;
use crate::dictionary::Dictionary;
use crate::input::QueryInput;
use crate::proximity::KeyboardLayout;
use crate::session::{SuggestOptions, TraversalSession};
use crate::suggestion::SuggestedWord;

fn cat_car_can() -> Vec<u8> {
    DictBuilder::new()
        .word("cat", 120)
        .word("car", 100)
        .word("can", 80)
        .build()
}

fn typed(
    dict: &Dictionary<'_>,
    input: &QueryInput,
    previous_word: Option<&str>,
    commit_point: usize,
) -> Vec<SuggestedWord> {
    let layout = KeyboardLayout::qwerty();
    let mut session = TraversalSession::new();
    dict.get_suggestions(
        &layout,
        &mut session,
        input,
        previous_word,
        commit_point,
        SuggestOptions::typing(),
    )
}

fn traced(dict: &Dictionary<'_>, word: &str, previous_word: Option<&str>) -> Vec<SuggestedWord> {
    let layout = KeyboardLayout::qwerty();
    let input = QueryInput::gesture(layout.trace(word, 20.0));
    let mut session = TraversalSession::new();
    dict.get_suggestions(
        &layout,
        &mut session,
        &input,
        previous_word,
        0,
        SuggestOptions::gesture(),
    )
}

fn words(out: &[SuggestedWord]) -> Vec<&str> {
    out.iter().map(|w| w.word.as_str()).collect()
}
