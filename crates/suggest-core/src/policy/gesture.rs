use tracing::trace;

use super::{weighted_language_cost, Edge, EdgeKind, EdgeScorer, NodeState, Query, SearchPolicy};
use crate::input::InputPoint;
use crate::proximity::ProximityInfo;
use crate::settings::GestureSettings;
use crate::suggestion::OutputType;
use crate::unicode::eq_ignore_case;

/// Relative speed below which a sample counts as a deliberate key hit;
/// absorbs the jitter of integer sample coordinates.
const PACE_SLACK: f32 = 1.25;

/// Continuous trajectories scored by distance to key centres.
///
/// Each code point is pinned to the closest sample in a window after the
/// previously matched one. Samples skipped on the way are expected to lie on
/// the straight line between the two keys, and the finger is expected to slow
/// down on the keys it means: pinning a key to a sample moving clearly faster
/// than the trajectory's median speed costs extra.
pub struct GesturePolicy {
    settings: GestureSettings,
}

impl GesturePolicy {
    pub fn new(settings: GestureSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }
}

impl SearchPolicy for GesturePolicy {
    fn name(&self) -> &'static str {
        "gesture"
    }

    fn beam_width(&self) -> usize {
        self.settings.beam_width
    }

    fn prepare<'q>(&'q self, query: Query<'q>) -> Option<Box<dyn EdgeScorer + 'q>> {
        let samples = trajectory(&query.input.points);
        if samples.len() < 2 {
            return None;
        }
        let key_width = query.proximity.key_width();
        if key_width.is_nan() || key_width <= 0.0 {
            return None;
        }
        trace!(samples = samples.len(), "gesture query prepared");
        Some(Box::new(GestureScorer {
            settings: &self.settings,
            proximity: query.proximity,
            pace: relative_speeds(&samples),
            points: samples.iter().map(|p| (p.x as f32, p.y as f32)).collect(),
            key_width,
        }))
    }
}

/// Samples of the first pointer, in input order.
fn trajectory(points: &[InputPoint]) -> Vec<InputPoint> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    points
        .iter()
        .filter(|p| p.pointer_id == first.pointer_id)
        .copied()
        .collect()
}

/// Speed at each sample divided by the median speed, measured over the
/// neighbouring samples. Samples whose timestamps do not advance count as
/// median speed.
fn relative_speeds(samples: &[InputPoint]) -> Vec<f32> {
    let at = |i: usize| (samples[i].x as f32, samples[i].y as f32);
    let last = samples.len().saturating_sub(1);
    let speeds: Vec<Option<f32>> = (0..samples.len())
        .map(|j| {
            let (lo, hi) = (j.saturating_sub(1), (j + 1).min(last));
            let dt = samples[hi].time.saturating_sub(samples[lo].time);
            (dt > 0).then(|| distance(at(lo), at(hi)) / dt as f32)
        })
        .collect();
    let mut known: Vec<f32> = speeds.iter().flatten().copied().collect();
    if known.is_empty() {
        return vec![1.0; samples.len()];
    }
    let mid = known.len() / 2;
    let (_, &mut median, _) = known.select_nth_unstable_by(mid, f32::total_cmp);
    if median <= 0.0 {
        return vec![1.0; samples.len()];
    }
    speeds
        .into_iter()
        .map(|v| v.map_or(1.0, |v| v / median))
        .collect()
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    distance(p, (a.0 + t * dx, a.1 + t * dy))
}

struct GestureScorer<'q> {
    settings: &'q GestureSettings,
    proximity: &'q dyn ProximityInfo,
    points: Vec<(f32, f32)>,
    /// Per-sample speed relative to the median.
    pace: Vec<f32>,
    key_width: f32,
}

impl GestureScorer<'_> {
    /// Closest sample to `center` in the look-ahead window for `state`.
    fn closest_sample(&self, state: &NodeState, center: (f32, f32)) -> Option<(usize, f32)> {
        let s = self.settings;
        let (start, len) = if state.words == 0 && state.depth == 0 {
            (0, s.first_window)
        } else {
            (state.consumed, s.window)
        };
        let end = start.saturating_add(len).min(self.points.len());
        (start..end)
            .map(|j| (j, distance(self.points[j], center)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Mean normalised deviation of the samples between the last match and
    /// `j` from the segment joining the previous key and `center`.
    fn path_deviation(&self, state: &NodeState, j: usize, center: (f32, f32)) -> f32 {
        if state.consumed == 0 || j <= state.consumed {
            return 0.0;
        }
        let anchor = state
            .last_char
            .and_then(|c| self.proximity.key_center(c))
            .unwrap_or(self.points[state.consumed - 1]);
        let skipped = &self.points[state.consumed..j];
        let total: f32 = skipped
            .iter()
            .map(|&p| segment_distance(p, anchor, center))
            .sum();
        total / skipped.len() as f32 / self.key_width
    }
}

impl EdgeScorer for GestureScorer<'_> {
    fn input_len(&self) -> usize {
        self.points.len()
    }

    fn edges(&self, state: &NodeState, c: char, out: &mut Vec<Edge>) {
        let s = self.settings;
        if state.depth > 0 && state.last_char.is_some_and(|l| eq_ignore_case(l, c)) {
            out.push(Edge {
                consumed: 0,
                cost: s.doubled_letter_cost,
                kind: EdgeKind::Match,
            });
            return;
        }
        let Some(center) = self.proximity.key_center(c) else {
            out.push(Edge {
                consumed: 0,
                cost: s.unknown_char_cost,
                kind: EdgeKind::Match,
            });
            return;
        };
        let Some((j, d)) = self.closest_sample(state, center) else {
            return;
        };
        let nd = d / self.key_width;
        if nd > s.max_key_distance {
            return;
        }
        let cost = s.distance_weight * nd
            + s.path_weight * self.path_deviation(state, j, center)
            + s.speed_weight * (self.pace[j] / PACE_SLACK).ln().max(0.0);
        out.push(Edge {
            consumed: (j + 1).saturating_sub(state.consumed),
            cost,
            kind: EdgeKind::Match,
        });
    }

    fn terminal_cost(&self, state: &NodeState) -> Option<f32> {
        if state.consumed == 0 {
            return None;
        }
        let n = self.points.len();
        let remaining = n.saturating_sub(state.consumed);
        (remaining <= self.settings.tail_samples)
            .then(|| self.settings.tail_weight * remaining as f32 / n as f32)
    }

    fn space_cost(&self, state: &NodeState) -> Option<f32> {
        (state.consumed > 0
            && state.consumed < self.points.len()
            && state.words + 1 < self.settings.max_words)
            .then_some(self.settings.space_cost)
    }

    fn language_cost(&self, probability: u8) -> f32 {
        weighted_language_cost(self.settings.language_weight, probability)
    }

    fn max_words(&self) -> usize {
        self.settings.max_words
    }

    fn output_type(&self, _state: &NodeState) -> OutputType {
        OutputType::Correction
    }
}
