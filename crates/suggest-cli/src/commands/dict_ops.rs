use std::path::Path;
use std::process;

use suggest_core::{
    DictionaryFile, KeyboardLayout, OutputType, ProximityInfo, QueryInput, SuggestOptions,
    SuggestedWord, TraversalSession,
};
use tracing::debug;

fn open(dict_file: &str) -> DictionaryFile {
    die!(
        DictionaryFile::open(Path::new(dict_file)),
        "Error opening {dict_file}: {}"
    )
}

pub fn info(dict_file: &str) {
    let file = open(dict_file);
    let dict = die!(file.dictionary(), "Error reading dictionary: {}");
    let header = dict.header();
    let flags = header.flags();

    println!("Dictionary: {dict_file}");
    println!("File size:  {} bytes", file.len());
    println!("Version:    {}", header.version());
    println!("Root:       {}", header.root());
    println!("Flags:      {:#06x}", flags.bits());
    if flags.requires_german_umlaut_processing() {
        println!("  german umlaut processing");
    }
    if flags.requires_french_ligature_processing() {
        println!("  french ligature processing");
    }
    if flags.supports_dynamic_update() {
        println!("  dynamic update");
    }
    if !header.attributes().is_empty() {
        println!("Attributes:");
        for (key, value) in header.attributes() {
            println!("  {key} = {value}");
        }
    }
}

pub fn probability(dict_file: &str, word: &str) {
    let file = open(dict_file);
    let dict = die!(file.dictionary(), "Error reading dictionary: {}");
    match dict.get_probability(word) {
        Some(p) => println!("{word}\t{p}"),
        None => {
            eprintln!("'{word}' not found");
            process::exit(1);
        }
    }
}

pub fn bigrams(dict_file: &str, previous: &str, prefix: &str) {
    let file = open(dict_file);
    let dict = die!(file.dictionary(), "Error reading dictionary: {}");
    let prefix: Vec<char> = prefix.chars().collect();
    let out = dict.get_bigrams(previous, &prefix);
    if out.is_empty() {
        println!("No predictions after '{previous}'");
        return;
    }
    print_ranked(&out);
}

pub fn valid_bigram(dict_file: &str, first: &str, second: &str) {
    let file = open(dict_file);
    let dict = die!(file.dictionary(), "Error reading dictionary: {}");
    let valid = dict.is_valid_bigram(first, second);
    println!("{first} -> {second}: {}", if valid { "yes" } else { "no" });
    if !valid {
        process::exit(1);
    }
}

pub struct SuggestArgs<'a> {
    pub input: &'a str,
    pub previous: Option<&'a str>,
    pub commit_point: usize,
    pub gesture: bool,
    pub full_edit_distance: bool,
    pub max_results: Option<usize>,
}

/// Run one suggestion query. A gesture query traces `input` across a
/// QWERTY layout.
pub fn suggest(dict_file: &str, args: &SuggestArgs<'_>) {
    let file = open(dict_file);
    let dict = die!(file.dictionary(), "Error reading dictionary: {}");
    let layout = KeyboardLayout::qwerty();

    let mut options = if args.gesture {
        SuggestOptions::gesture()
    } else {
        SuggestOptions::typing()
    };
    options.use_full_edit_distance = args.full_edit_distance;
    if let Some(n) = args.max_results {
        options.max_results = n;
    }
    let input = if args.gesture {
        let points = layout.trace(args.input, layout.key_width() / 5.0);
        debug!(samples = points.len(), word = args.input, "traced gesture");
        QueryInput::gesture(points)
    } else {
        QueryInput::typed(args.input)
    };

    let mut session = TraversalSession::new();
    let out = dict.get_suggestions(
        &layout,
        &mut session,
        &input,
        args.previous,
        args.commit_point,
        options,
    );
    if out.is_empty() {
        println!("No suggestions for '{}'", args.input);
        return;
    }
    print_ranked(&out);
}

fn print_ranked(out: &[SuggestedWord]) {
    for (i, w) in out.iter().enumerate() {
        let probability = w
            .probability
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "{:>3}  {:<24} {:>8}  {:<10} p={}",
            i + 1,
            w.word,
            w.score,
            output_label(w.output_type),
            probability
        );
    }
}

fn output_label(t: OutputType) -> &'static str {
    match t {
        OutputType::Exact => "exact",
        OutputType::Correction => "correction",
        OutputType::Completion => "completion",
        OutputType::Shortcut => "shortcut",
        OutputType::Prediction => "prediction",
    }
}
