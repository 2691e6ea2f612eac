// ── Target resolution ──
//
// Compiles a Selector into a predicate over lights. Scene selectors
// expand into the union of their states' selectors, resolved against
// the scene list current at compile time.

use std::collections::HashSet;

use crate::model::{Light, Scene, Selector, SelectorKind};

/// Nesting limit for scene selectors that refer to other scenes.
const MAX_SCENE_DEPTH: usize = 8;

/// A compiled selector predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    Always,
    Never,
    Id(String),
    Group(String),
    Location(String),
    Label(String),
    /// True if any inner matcher is.
    Any(Vec<Matcher>),
}

impl Matcher {
    /// Compile `selector` against the given scenes.
    ///
    /// A scene id with no matching scene compiles to [`Matcher::Never`].
    /// Cyclic scene references are cut off rather than followed.
    pub fn compile(selector: &Selector, scenes: &[Scene]) -> Self {
        let mut visiting = HashSet::new();
        compile_inner(selector, scenes, &mut visiting)
    }

    pub fn matches(&self, light: &Light) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Id(id) => light.id == *id,
            Self::Group(id) => light.group_id() == Some(id.as_str()),
            Self::Location(id) => light.location_id() == Some(id.as_str()),
            Self::Label(label) => light.label == *label,
            Self::Any(inner) => inner.iter().any(|m| m.matches(light)),
        }
    }

    /// Matching lights in cache order.
    pub fn filter<'a>(&'a self, lights: &'a [Light]) -> impl Iterator<Item = &'a Light> + 'a {
        lights.iter().filter(move |l| self.matches(l))
    }
}

fn compile_inner<'s>(
    selector: &Selector,
    scenes: &'s [Scene],
    visiting: &mut HashSet<&'s str>,
) -> Matcher {
    let value = selector.value();
    match selector.kind() {
        SelectorKind::All => Matcher::Always,
        SelectorKind::Id => Matcher::Id(value.into()),
        SelectorKind::GroupId => Matcher::Group(value.into()),
        SelectorKind::LocationId => Matcher::Location(value.into()),
        SelectorKind::Label => Matcher::Label(value.into()),
        SelectorKind::SceneId => {
            let Some(scene) = find_scene(scenes, selector) else {
                return Matcher::Never;
            };
            if visiting.len() >= MAX_SCENE_DEPTH || !visiting.insert(scene.uuid.as_str()) {
                return Matcher::Never;
            }
            let inner = scene
                .states
                .iter()
                .map(|state| compile_inner(&state.selector, scenes, visiting))
                .filter(|m| *m != Matcher::Never)
                .collect::<Vec<_>>();
            visiting.remove(scene.uuid.as_str());
            if inner.is_empty() {
                Matcher::Never
            } else {
                Matcher::Any(inner)
            }
        }
    }
}

/// The scene whose derived selector equals `selector`.
pub fn find_scene<'s>(scenes: &'s [Scene], selector: &Selector) -> Option<&'s Scene> {
    scenes.iter().find(|s| s.to_selector() == *selector)
}
