//! Serializer for small test and benchmark dictionaries.
//!
//! Arrays are written in depth-first pre-order so every children pointer
//! points forward. Address widths start at one byte and only ever grow until
//! the layout stops changing.

use std::collections::BTreeMap;

use super::format::{CHARACTER_ARRAY_TERMINATOR, MAX_WORD_LENGTH};
use super::header::{MAGIC, VERSION};
use super::NodeFlags;

#[derive(Debug, Clone, Default)]
struct WordEntry {
    probability: u8,
    not_a_word: bool,
    blacklisted: bool,
    shortcuts: Vec<(String, u8)>,
    bigrams: Vec<(String, u8)>,
}

#[derive(Debug, Clone, Default)]
pub struct DictBuilder {
    words: BTreeMap<String, WordEntry>,
    attributes: Vec<(String, String)>,
    flags: u16,
    multi_char_runs: bool,
}

impl DictBuilder {
    pub fn new() -> Self {
        Self {
            multi_char_runs: true,
            ..Self::default()
        }
    }

    pub fn word(mut self, word: &str, probability: u8) -> Self {
        self.words.entry(word.to_string()).or_default().probability = probability;
        self
    }

    pub fn not_a_word(mut self, word: &str, probability: u8) -> Self {
        let entry = self.words.entry(word.to_string()).or_default();
        entry.probability = probability;
        entry.not_a_word = true;
        self
    }

    pub fn blacklisted(mut self, word: &str, probability: u8) -> Self {
        let entry = self.words.entry(word.to_string()).or_default();
        entry.probability = probability;
        entry.blacklisted = true;
        self
    }

    /// `word` must be added separately.
    pub fn shortcut(mut self, word: &str, target: &str, probability: u8) -> Self {
        self.words
            .entry(word.to_string())
            .or_default()
            .shortcuts
            .push((target.to_string(), probability));
        self
    }

    /// Both words must be added separately.
    pub fn bigram(mut self, first: &str, second: &str, strength: u8) -> Self {
        self.words
            .entry(first.to_string())
            .or_default()
            .bigrams
            .push((second.to_string(), strength));
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    /// Merge single-child chains into multi-char groups (on by default).
    pub fn multi_char_runs(mut self, enabled: bool) -> Self {
        self.multi_char_runs = enabled;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header();
        let root = out.len();
        let layout = self.layout(root);
        layout.write(&mut out, &self.words);
        out
    }

    fn header(&self) -> Vec<u8> {
        let mut attrs = Vec::new();
        for (k, v) in &self.attributes {
            write_chars(&mut attrs, k);
            attrs.push(CHARACTER_ARRAY_TERMINATOR);
            write_chars(&mut attrs, v);
            attrs.push(CHARACTER_ARRAY_TERMINATOR);
        }
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&((12 + attrs.len()) as u32).to_be_bytes());
        out.extend_from_slice(&attrs);
        out
    }

    fn layout(&self, root: usize) -> Layout {
        let mut trie = TrieNode::default();
        for word in self.words.keys() {
            let chars: Vec<char> = word.chars().collect();
            assert!(!chars.is_empty() && chars.len() <= MAX_WORD_LENGTH, "bad test word {word:?}");
            trie.insert(&chars, word);
        }
        if self.multi_char_runs {
            trie.compress();
        }
        let mut layout = Layout {
            root,
            arrays: Vec::new(),
            groups: Vec::new(),
            terminals: BTreeMap::new(),
            array_pos: Vec::new(),
            group_pos: Vec::new(),
        };
        layout.flatten(&trie.children);
        for (word, entry) in &self.words {
            let g = layout.terminals[word];
            let group = &mut layout.groups[g];
            group.shortcuts = entry.shortcuts.clone();
            group.bigram_sizes = vec![1; entry.bigrams.len()];
            group.bigrams = entry
                .bigrams
                .iter()
                .map(|(target, strength)| {
                    let t = *layout
                        .terminals
                        .get(target)
                        .unwrap_or_else(|| panic!("bigram target {target:?} not in dictionary"));
                    (t, *strength)
                })
                .collect();
        }
        layout.settle();
        layout
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    chars: Vec<char>,
    word: Option<String>,
    children: Vec<TrieNode>,
}

impl TrieNode {
    fn insert(&mut self, chars: &[char], word: &str) {
        let Some((&first, rest)) = chars.split_first() else {
            self.word = Some(word.to_string());
            return;
        };
        let i = match self.children.iter().position(|c| c.chars[0] == first) {
            Some(i) => i,
            None => {
                self.children.push(TrieNode {
                    chars: vec![first],
                    ..TrieNode::default()
                });
                self.children.sort_by_key(|c| c.chars[0]);
                self.children
                    .iter()
                    .position(|c| c.chars[0] == first)
                    .unwrap()
            }
        };
        self.children[i].insert(rest, word);
    }

    fn compress(&mut self) {
        for child in &mut self.children {
            while child.word.is_none() && child.children.len() == 1 {
                let only = child.children.pop().unwrap();
                child.chars.extend(only.chars);
                child.word = only.word;
                child.children = only.children;
            }
            child.compress();
        }
    }
}

#[derive(Debug, Default)]
struct FlatGroup {
    chars: Vec<char>,
    word: Option<String>,
    children: Option<usize>,
    child_size: usize,
    shortcuts: Vec<(String, u8)>,
    bigrams: Vec<(usize, u8)>,
    bigram_sizes: Vec<usize>,
}

impl FlatGroup {
    fn chars_len(&self) -> usize {
        let body: usize = self.chars.iter().map(|&c| code_point_size(c)).sum();
        if self.chars.len() > 1 {
            body + 1
        } else {
            body
        }
    }

    /// Offset of the children address field from the flags byte.
    fn children_field(&self) -> usize {
        1 + self.chars_len() + usize::from(self.word.is_some())
    }

    fn shortcuts_len(&self) -> usize {
        if self.shortcuts.is_empty() {
            return 0;
        }
        2 + self
            .shortcuts
            .iter()
            .map(|(t, _)| 2 + t.chars().map(code_point_size).sum::<usize>())
            .sum::<usize>()
    }

    /// Offset of the bigram list from the flags byte.
    fn bigrams_field(&self) -> usize {
        let child = if self.children.is_some() { self.child_size } else { 0 };
        self.children_field() + child + self.shortcuts_len()
    }

    fn len(&self) -> usize {
        self.bigrams_field() + self.bigram_sizes.iter().map(|s| 1 + s).sum::<usize>()
    }
}

struct Layout {
    root: usize,
    arrays: Vec<Vec<usize>>,
    groups: Vec<FlatGroup>,
    terminals: BTreeMap<String, usize>,
    array_pos: Vec<usize>,
    group_pos: Vec<usize>,
}

impl Layout {
    fn flatten(&mut self, nodes: &[TrieNode]) -> usize {
        let array = self.arrays.len();
        self.arrays.push(Vec::new());
        let mut ids = Vec::new();
        for node in nodes {
            let id = self.groups.len();
            if let Some(word) = &node.word {
                self.terminals.insert(word.clone(), id);
            }
            self.groups.push(FlatGroup {
                chars: node.chars.clone(),
                word: node.word.clone(),
                child_size: 1,
                ..FlatGroup::default()
            });
            ids.push(id);
        }
        self.arrays[array] = ids.clone();
        for (node, id) in nodes.iter().zip(ids) {
            if !node.children.is_empty() {
                let child = self.flatten(&node.children);
                self.groups[id].children = Some(child);
            }
        }
        array
    }

    fn place(&mut self) {
        self.array_pos = vec![0; self.arrays.len()];
        self.group_pos = vec![0; self.groups.len()];
        let mut pos = self.root;
        for (a, ids) in self.arrays.iter().enumerate() {
            self.array_pos[a] = pos;
            pos += if ids.len() < 0x80 { 1 } else { 2 };
            for &g in ids {
                self.group_pos[g] = pos;
                pos += self.groups[g].len();
            }
        }
    }

    /// Grow address widths until every offset fits.
    fn settle(&mut self) {
        loop {
            self.place();
            let mut changed = false;
            for g in 0..self.groups.len() {
                let base = self.group_pos[g];
                if let Some(child) = self.groups[g].children {
                    let field = base + self.groups[g].children_field();
                    let need = address_size(self.array_pos[child] - field);
                    if need > self.groups[g].child_size {
                        self.groups[g].child_size = need;
                        changed = true;
                    }
                }
                let mut attr = base + self.groups[g].bigrams_field();
                for i in 0..self.groups[g].bigrams.len() {
                    let target = self.group_pos[self.groups[g].bigrams[i].0];
                    let need = address_size(target.abs_diff(attr + 1));
                    let size = &mut self.groups[g].bigram_sizes[i];
                    if need > *size {
                        *size = need;
                        changed = true;
                    }
                    attr += 1 + *size;
                }
            }
            if !changed {
                return;
            }
        }
    }

    fn write(&self, out: &mut Vec<u8>, words: &BTreeMap<String, WordEntry>) {
        for (a, ids) in self.arrays.iter().enumerate() {
            assert_eq!(out.len(), self.array_pos[a]);
            if ids.len() < 0x80 {
                out.push(ids.len() as u8);
            } else {
                out.extend_from_slice(&(0x8000 | ids.len() as u16).to_be_bytes());
            }
            for &g in ids {
                assert_eq!(out.len(), self.group_pos[g]);
                self.write_group(out, g, words);
            }
        }
    }

    fn write_group(&self, out: &mut Vec<u8>, g: usize, words: &BTreeMap<String, WordEntry>) {
        let group = &self.groups[g];
        let entry = group.word.as_ref().map(|w| &words[w]);
        let mut flags = match (group.children.is_some(), group.child_size) {
            (false, _) => 0,
            (true, 1) => 0x40,
            (true, 2) => 0x80,
            (true, _) => 0xC0,
        };
        if group.chars.len() > 1 {
            flags |= NodeFlags::HAS_MULTIPLE_CHARS;
        }
        if let Some(entry) = entry {
            flags |= NodeFlags::IS_TERMINAL;
            if !entry.shortcuts.is_empty() {
                flags |= NodeFlags::HAS_SHORTCUT_TARGETS;
            }
            if !entry.bigrams.is_empty() {
                flags |= NodeFlags::HAS_BIGRAMS;
            }
            if entry.not_a_word {
                flags |= NodeFlags::IS_NOT_A_WORD;
            }
            if entry.blacklisted {
                flags |= NodeFlags::IS_BLACKLISTED;
            }
        }
        let start = out.len();
        out.push(flags);
        for &c in &group.chars {
            write_code_point(out, c);
        }
        if group.chars.len() > 1 {
            out.push(CHARACTER_ARRAY_TERMINATOR);
        }
        if let Some(entry) = entry {
            out.push(entry.probability);
        }
        if let Some(child) = group.children {
            let offset = self.array_pos[child] - out.len();
            write_uint(out, offset, group.child_size);
        }
        if !group.shortcuts.is_empty() {
            out.extend_from_slice(&(group.shortcuts_len() as u16).to_be_bytes());
            let last = group.shortcuts.len() - 1;
            for (i, (target, probability)) in group.shortcuts.iter().enumerate() {
                let has_next = if i < last { 0x80 } else { 0 };
                out.push(has_next | (probability & 0x0F));
                write_chars(out, target);
                out.push(CHARACTER_ARRAY_TERMINATOR);
            }
        }
        let count = group.bigrams.len();
        for (i, (&(target, strength), &size)) in
            group.bigrams.iter().zip(&group.bigram_sizes).enumerate()
        {
            let origin = out.len() + 1;
            let target = self.group_pos[target];
            let mut attr = match size {
                1 => 0x10,
                2 => 0x20,
                _ => 0x30,
            } | (strength & 0x0F);
            if i + 1 < count {
                attr |= 0x80;
            }
            if target < origin {
                attr |= 0x40;
            }
            out.push(attr);
            write_uint(out, target.abs_diff(origin), size);
        }
        assert_eq!(out.len() - start, group.len());
    }
}

fn code_point_size(c: char) -> usize {
    if (0x20..=0xFF).contains(&(c as u32)) {
        1
    } else {
        3
    }
}

fn write_code_point(out: &mut Vec<u8>, c: char) {
    let v = c as u32;
    if code_point_size(c) == 1 {
        out.push(v as u8);
    } else {
        out.extend_from_slice(&v.to_be_bytes()[1..]);
    }
}

fn write_chars(out: &mut Vec<u8>, s: &str) {
    for c in s.chars() {
        write_code_point(out, c);
    }
}

fn address_size(offset: usize) -> usize {
    match offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        _ => 3,
    }
}

fn write_uint(out: &mut Vec<u8>, value: usize, size: usize) {
    out.extend_from_slice(&(value as u32).to_be_bytes()[4 - size..]);
}
