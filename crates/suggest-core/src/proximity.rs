//! Keyboard geometry consumed by the search policies.
//!
//! The engine only needs the `ProximityInfo` capability. `KeyboardLayout` is a
//! plain rectangular-key implementation, with a QWERTY preset, used by the CLI
//! and tests.

use crate::input::{InputPoint, KeySet};
use crate::unicode::to_lower;

pub trait ProximityInfo: Send + Sync {
    /// Keys near `(x, y)`, nearest first, with `primary` always leading.
    /// Keys about as close as the nearest one share rank 0 with `primary`.
    fn key_set_at(&self, x: i32, y: i32, primary: char) -> KeySet;

    /// Centre of the key producing `code_point`, ignoring case.
    fn key_center(&self, code_point: char) -> Option<(f32, f32)>;

    /// Typical key width; distances are normalised by it.
    fn key_width(&self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code_point: char,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Key {
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    keys: Vec<Key>,
    key_width: f32,
    /// Keys whose centre lies within this distance join a key set.
    proximity_radius: f32,
    /// Keys within this much of the nearest distance tie with it.
    tie_tolerance: f32,
}

impl KeyboardLayout {
    pub fn new(keys: Vec<Key>) -> Self {
        let key_width = most_common_width(&keys);
        Self {
            keys,
            key_width,
            proximity_radius: key_width * 1.2,
            tie_tolerance: key_width * 0.1,
        }
    }

    /// Three-row lowercase QWERTY with 100×100 keys; rows are staggered by
    /// half a key.
    pub fn qwerty() -> Self {
        const ROWS: [(&str, i32); 3] = [("qwertyuiop", 0), ("asdfghjkl", 50), ("zxcvbnm", 150)];
        let mut keys = Vec::new();
        for (row, (letters, indent)) in ROWS.iter().enumerate() {
            for (col, c) in letters.chars().enumerate() {
                keys.push(Key {
                    code_point: c,
                    x: indent + col as i32 * 100,
                    y: row as i32 * 100,
                    width: 100,
                    height: 100,
                });
            }
        }
        Self::new(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, code_point: char) -> Option<&Key> {
        let c = to_lower(code_point);
        self.keys.iter().find(|k| k.code_point == c)
    }

    /// Synthesize a gesture through the key centres of `word`, one sample
    /// every `step` pixels, 10 ms apart. Code points without a key are skipped.
    pub fn trace(&self, word: &str, step: f32) -> Vec<InputPoint> {
        let centers: Vec<(f32, f32)> = word.chars().filter_map(|c| self.key_center(c)).collect();
        let mut points = Vec::new();
        let mut push = |x: f32, y: f32| {
            let time = points.len() as i32 * 10;
            points.push(InputPoint::new(x.round() as i32, y.round() as i32, time));
        };
        let Some(&(x0, y0)) = centers.first() else {
            return Vec::new();
        };
        push(x0, y0);
        for pair in centers.windows(2) {
            let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
            let dist = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
            let steps = (dist / step.max(1.0)).ceil().max(1.0) as usize;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                push(ax + (bx - ax) * t, ay + (by - ay) * t);
            }
        }
        points
    }
}

impl ProximityInfo for KeyboardLayout {
    fn key_set_at(&self, x: i32, y: i32, primary: char) -> KeySet {
        let (x, y) = (x as f32, y as f32);
        let mut near: Vec<(f32, char)> = self
            .keys
            .iter()
            .filter_map(|k| {
                let (cx, cy) = k.center();
                let d = ((cx - x).powi(2) + (cy - y).powi(2)).sqrt();
                (d <= self.proximity_radius).then_some((d, k.code_point))
            })
            .collect();
        near.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let tied = near.first().map_or(0.0, |&(d, _)| d + self.tie_tolerance);
        let primary_lower = to_lower(primary);
        let mut keys = vec![(primary, 0)];
        keys.extend(
            near.into_iter()
                .filter(|&(_, c)| c != primary_lower)
                .map(|(d, c)| (c, usize::from(d > tied))),
        );
        KeySet::ranked(keys)
    }

    fn key_center(&self, code_point: char) -> Option<(f32, f32)> {
        self.key(code_point).map(Key::center)
    }

    fn key_width(&self) -> f32 {
        self.key_width
    }
}

fn most_common_width(keys: &[Key]) -> f32 {
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for k in keys {
        match counts.iter_mut().find(|(w, _)| *w == k.width) {
            Some((_, n)) => *n += 1,
            None => counts.push((k.width, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|&(w, n)| (n, w))
        .map_or(1.0, |(w, _)| w.max(1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qwerty_centers() {
        let layout = KeyboardLayout::qwerty();
        assert_eq!(layout.key_center('q'), Some((50.0, 50.0)));
        assert_eq!(layout.key_center('A'), Some((100.0, 150.0)));
        assert_eq!(layout.key_center('c'), Some((400.0, 250.0)));
        assert_eq!(layout.key_center('\''), None);
        assert_eq!(layout.key_width(), 100.0);
    }

    #[test]
    fn key_set_is_primary_then_neighbours() {
        let layout = KeyboardLayout::qwerty();
        let (x, y) = layout.key_center('s').unwrap();
        let set = layout.key_set_at(x as i32, y as i32, 's');
        assert_eq!(set.primary(), Some('s'));
        for near in ['a', 'd', 'w', 'e', 'z'] {
            assert!(set.rank_of(near).is_some(), "{near} should be near s");
        }
        assert!(set.rank_of('x').is_none());
        assert!(set.rank_of('p').is_none());
    }

    #[test]
    fn touch_between_keys_ties_them() {
        let layout = KeyboardLayout::qwerty();
        // Midway between r (350, 50) and t (450, 50); f sits 100 below.
        let set = layout.key_set_at(400, 50, 'r');
        assert_eq!(set.primary(), Some('r'));
        assert_eq!(set.rank_of('t'), Some(0));
        assert_eq!(set.rank_of('f'), Some(1));

        let centred = layout.key_set_at(450, 50, 't');
        assert_eq!(centred.rank_of('r'), Some(1));
        assert_eq!(centred.rank_of('y'), Some(1));
    }

    #[test]
    fn key_set_keeps_uppercase_primary_once() {
        let layout = KeyboardLayout::qwerty();
        let set = layout.key_set_at(400, 250, 'C');
        assert_eq!(set.primary(), Some('C'));
        assert_eq!(set.keys().iter().filter(|&&k| k == 'c').count(), 0);
    }

    #[test]
    fn trace_starts_and_ends_on_keys() {
        let layout = KeyboardLayout::qwerty();
        let points = layout.trace("cat", 20.0);
        let first = points.first().unwrap();
        let last = points.last().unwrap();
        assert_eq!((first.x, first.y), (400, 250));
        assert_eq!((last.x, last.y), (450, 50));
        assert!(points.windows(2).all(|w| w[0].time < w[1].time));
    }
}
