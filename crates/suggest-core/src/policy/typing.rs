use tracing::trace;

use super::{weighted_language_cost, Edge, EdgeKind, EdgeScorer, NodeState, Query, SearchPolicy};
use crate::input::{KeySet, QueryInput};
use crate::proximity::ProximityInfo;
use crate::settings::TypingSettings;
use crate::unicode::eq_ignore_case;

/// Discrete key presses scored against ranked key sets.
pub struct TypingPolicy {
    settings: TypingSettings,
}

impl TypingPolicy {
    pub fn new(settings: TypingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TypingSettings {
        &self.settings
    }
}

impl SearchPolicy for TypingPolicy {
    fn name(&self) -> &'static str {
        "typing"
    }

    fn beam_width(&self) -> usize {
        self.settings.beam_width
    }

    fn prepare<'q>(&'q self, query: Query<'q>) -> Option<Box<dyn EdgeScorer + 'q>> {
        let key_sets = key_sets_for(query.input, query.proximity);
        if key_sets.is_empty() {
            return None;
        }
        let max_edits = if query.options.use_full_edit_distance {
            key_sets.len()
        } else {
            self.settings.max_edits
        };
        trace!(positions = key_sets.len(), max_edits, "typing query prepared");
        Some(Box::new(TypingScorer {
            settings: &self.settings,
            commit_point: query.commit_point.min(key_sets.len()),
            key_sets,
            max_edits,
        }))
    }
}

/// Explicit key sets win; otherwise ask the proximity model around each touch
/// point, or around the typed key's own centre.
fn key_sets_for(input: &QueryInput, proximity: &dyn ProximityInfo) -> Vec<KeySet> {
    if !input.key_sets.is_empty() {
        return input.key_sets.clone();
    }
    input
        .code_points
        .iter()
        .enumerate()
        .map(|(i, &c)| match input.points.get(i) {
            Some(p) => proximity.key_set_at(p.x, p.y, c),
            None => match proximity.key_center(c) {
                Some((x, y)) => proximity.key_set_at(x.round() as i32, y.round() as i32, c),
                None => KeySet::single(c),
            },
        })
        .collect()
}

struct TypingScorer<'q> {
    settings: &'q TypingSettings,
    key_sets: Vec<KeySet>,
    commit_point: usize,
    max_edits: usize,
}

impl TypingScorer<'_> {
    fn can_edit(&self, state: &NodeState) -> bool {
        state.edits < self.max_edits && state.consumed >= self.commit_point
    }
}

impl EdgeScorer for TypingScorer<'_> {
    fn input_len(&self) -> usize {
        self.key_sets.len()
    }

    fn edges(&self, state: &NodeState, c: char, out: &mut Vec<Edge>) {
        let s = self.settings;
        let i = state.consumed;
        let Some(keys) = self.key_sets.get(i) else {
            if state.completion_len < s.max_completion_chars {
                out.push(Edge {
                    consumed: 0,
                    cost: s.completion_cost,
                    kind: EdgeKind::Completion,
                });
            }
            return;
        };

        let primary = keys.primary();
        let case_cost = |k: char| if k == c { 0.0 } else { s.case_mismatch_cost };
        if i < self.commit_point {
            if let Some(p) = primary.filter(|&p| eq_ignore_case(p, c)) {
                out.push(Edge {
                    consumed: 1,
                    cost: case_cost(p),
                    kind: EdgeKind::Match,
                });
            }
            return;
        }

        match keys.find(c) {
            Some((key, 0)) => out.push(Edge {
                consumed: 1,
                cost: case_cost(key),
                kind: EdgeKind::Match,
            }),
            Some(_) => out.push(Edge {
                consumed: 1,
                cost: s.proximity_cost,
                kind: EdgeKind::Proximity,
            }),
            None if self.can_edit(state) => out.push(Edge {
                consumed: 1,
                cost: s.substitution_cost,
                kind: EdgeKind::Substitution,
            }),
            None => {}
        }
        if self.can_edit(state) {
            out.push(Edge {
                consumed: 0,
                cost: s.omission_cost,
                kind: EdgeKind::Omission,
            });
        }
    }

    fn skip_edges(&self, state: &NodeState, out: &mut Vec<Edge>) {
        if state.consumed < self.key_sets.len() && self.can_edit(state) {
            out.push(Edge {
                consumed: 1,
                cost: self.settings.insertion_cost,
                kind: EdgeKind::Insertion,
            });
        }
    }

    fn terminal_cost(&self, state: &NodeState) -> Option<f32> {
        (state.consumed == self.key_sets.len()).then_some(0.0)
    }

    fn language_cost(&self, probability: u8) -> f32 {
        weighted_language_cost(self.settings.language_weight, probability)
    }
}
