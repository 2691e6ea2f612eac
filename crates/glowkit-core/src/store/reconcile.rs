// ── Light-set merge ──
//
// Fetched lights are authoritative. Anything cached but absent from a
// fetch is kept as last seen: a missing device is treated as offline,
// not deleted.

use std::collections::HashSet;

use crate::model::Light;

/// Merge a fetched light list into the cached one.
///
/// Fetched lights come first, deduplicated by id in first-seen order.
/// Cached lights whose id was not fetched follow in their existing
/// relative order.
pub fn merge_lights(old: &[Light], fetched: Vec<Light>) -> Vec<Light> {
    let mut seen: HashSet<String> = HashSet::with_capacity(fetched.len() + old.len());
    let mut merged = Vec::with_capacity(fetched.len() + old.len());

    for light in fetched {
        if seen.insert(light.id.clone()) {
            merged.push(light);
        }
    }
    for light in old {
        if !seen.contains(&light.id) {
            seen.insert(light.id.clone());
            merged.push(light.clone());
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::model::Color;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn light(id: &str, brightness: f64) -> Light {
        Light {
            id: id.into(),
            power: true,
            brightness,
            color: Color::default(),
            label: id.to_uppercase(),
            connected: true,
            group: None,
            location: None,
            touched_at: Utc::now(),
        }
    }

    fn ids(lights: &[Light]) -> Vec<&str> {
        lights.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn stale_lights_follow_fresh_ones() {
        let old = vec![light("1", 1.0), light("2", 1.0)];
        let fetched = vec![light("2", 0.4), light("3", 1.0)];

        let merged = merge_lights(&old, fetched);
        assert_eq!(ids(&merged), vec!["2", "3", "1"]);
        assert_eq!(merged[0].brightness, 0.4);
    }

    #[test]
    fn stale_entries_keep_relative_order() {
        let old = vec![light("a", 1.0), light("b", 1.0), light("c", 1.0)];
        let merged = merge_lights(&old, vec![light("b", 1.0)]);
        assert_eq!(ids(&merged), vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_fetched_ids_keep_first() {
        let merged = merge_lights(&[], vec![light("x", 0.1), light("x", 0.9)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].brightness, 0.1);
    }

    #[test]
    fn identical_fetch_is_a_no_op() {
        let old = vec![light("1", 0.5), light("2", 0.5)];
        let merged = merge_lights(&old, old.clone());
        assert_eq!(merged, old);
    }
}
