mod bigram;
mod resolver;

use super::testutil::DictBuilder;
use crate::dictionary::Dictionary;

/// cat/car/can share the "ca" run; "cats" extends a terminal; "food" only
/// follows "cat".
pub(super) fn sample_bytes() -> Vec<u8> {
    DictBuilder::new()
        .word("cat", 120)
        .word("car", 100)
        .word("can", 80)
        .word("cats", 90)
        .word("food", 150)
        .word("Paris", 140)
        .not_a_word("catz", 200)
        .blacklisted("crap", 180)
        .bigram("cat", "food", 5)
        .bigram("food", "cats", 2)
        .attribute("locale", "en_US")
        .attribute("version", "54")
        .build()
}

pub(super) fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

pub(super) fn with_dict<R>(bytes: &[u8], f: impl FnOnce(&Dictionary<'_>) -> R) -> R {
    let dict = Dictionary::new(bytes).unwrap();
    f(&dict)
}
