// ── Target ──
//
// A live view over the lights matched by one selector. Nothing is
// snapshotted: every read resolves the selector against the cache as it
// is right now.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::client::Client;
use crate::command::{Command, CommandHandle};
use crate::error::CoreError;
use crate::model::{Color, Light, Selector, StateChange};
use crate::resolve::{Matcher, find_scene};
use crate::store::ObserverToken;

#[derive(Clone)]
pub struct Target {
    client: Client,
    selector: Selector,
}

impl Target {
    pub(crate) fn new(client: Client, selector: Selector) -> Self {
        Self { client, selector }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Matching lights in cache order.
    pub fn lights(&self) -> Vec<Light> {
        self.client.store().matching(&self.selector)
    }

    pub fn count(&self) -> usize {
        self.lights().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn first(&self) -> Option<Light> {
        self.lights().into_iter().next()
    }

    // ── Aggregate reads ──────────────────────────────────────────
    //
    // Each reports the first matching light. An empty target reads as
    // off, zero brightness, default white and an empty label.

    pub fn power(&self) -> bool {
        self.first().is_some_and(|l| l.power)
    }

    pub fn brightness(&self) -> f64 {
        self.first().map_or(0.0, |l| l.brightness)
    }

    pub fn color(&self) -> Color {
        self.first().map(|l| l.color).unwrap_or_default()
    }

    /// The scene name for scene targets, otherwise the first light's label.
    pub fn label(&self) -> String {
        if self.selector.is_scene() {
            let scenes = self.client.scenes();
            if let Some(scene) = find_scene(&scenes, &self.selector) {
                return scene.name.clone();
            }
        }
        self.first().map(|l| l.label).unwrap_or_default()
    }

    /// True if any matching light is reachable.
    pub fn connected(&self) -> bool {
        self.lights().iter().any(|l| l.connected)
    }

    /// Most recent touch across the matching lights.
    pub fn touched_at(&self) -> Option<DateTime<Utc>> {
        self.lights().iter().map(|l| l.touched_at).max()
    }

    // ── Partitioning ─────────────────────────────────────────────

    /// One target per matching light.
    pub fn to_light_targets(&self) -> Vec<Target> {
        self.lights()
            .iter()
            .map(|l| self.child(l.to_selector()))
            .collect()
    }

    /// One target per distinct group among the matching lights.
    pub fn to_group_targets(&self) -> Vec<Target> {
        let lights = self.lights();
        let mut seen = HashSet::new();
        lights
            .iter()
            .filter_map(|l| l.group.as_ref())
            .filter(|g| seen.insert(g.id.clone()))
            .map(|g| self.child(g.to_selector()))
            .collect()
    }

    /// One target per distinct location among the matching lights.
    pub fn to_location_targets(&self) -> Vec<Target> {
        let lights = self.lights();
        let mut seen = HashSet::new();
        lights
            .iter()
            .filter_map(|l| l.location.as_ref())
            .filter(|loc| seen.insert(loc.id.clone()))
            .map(|loc| self.child(loc.to_selector()))
            .collect()
    }

    fn child(&self, selector: Selector) -> Target {
        Target::new(self.client.clone(), selector)
    }

    // ── Mutations ────────────────────────────────────────────────
    //
    // Each applies to the cache immediately, then queues the request.
    // `duration` is the transition time.

    pub fn set_power(&self, on: bool, duration: Duration) -> CommandHandle {
        self.set_state(StateChange::power(on), duration)
    }

    pub fn set_color(&self, color: Color, duration: Duration) -> CommandHandle {
        self.set_state(StateChange::color(color), duration)
    }

    pub fn set_brightness(&self, brightness: f64, duration: Duration) -> CommandHandle {
        self.set_state(StateChange::brightness(brightness), duration)
    }

    pub fn set_state(&self, change: StateChange, duration: Duration) -> CommandHandle {
        self.client.execute(Command::SetState {
            selector: self.selector.clone(),
            change,
            duration,
        })
    }

    /// Replay every state of this target's scene against its own
    /// selector, one command per state.
    ///
    /// Fails with [`CoreError::NotAScene`] for non-scene targets and
    /// [`CoreError::SceneNotFound`] when the scene is not cached.
    pub fn restore_state(&self, duration: Duration) -> CommandHandle {
        if !self.selector.is_scene() {
            return CommandHandle::ready(Err(CoreError::NotAScene {
                selector: self.selector.to_wire(),
            }));
        }
        let scenes = self.client.scenes();
        let Some(scene) = find_scene(&scenes, &self.selector) else {
            return CommandHandle::ready(Err(CoreError::SceneNotFound {
                uuid: self.selector.value().to_owned(),
            }));
        };

        let handles = scene
            .states
            .iter()
            .filter(|state| !state.change.is_empty())
            .map(|state| {
                self.client.execute(Command::SetState {
                    selector: state.selector.clone(),
                    change: state.change,
                    duration,
                })
            })
            .collect();
        CommandHandle::join(handles)
    }

    /// Activate this target's scene server-side in a single request.
    pub fn activate(&self, duration: Duration) -> CommandHandle {
        if !self.selector.is_scene() {
            return CommandHandle::ready(Err(CoreError::NotAScene {
                selector: self.selector.to_wire(),
            }));
        }
        self.client.execute(Command::ActivateScene {
            selector: self.selector.clone(),
            duration,
        })
    }

    // ── Observation ──────────────────────────────────────────────

    /// Register a callback fired with this target's lights whenever they
    /// change. Changes elsewhere in the cache are ignored.
    ///
    /// The callback holds the cache weakly and stops firing once the
    /// client is gone.
    pub fn add_observer<F>(&self, observer: F) -> ObserverToken
    where
        F: Fn(&[Light]) + Send + Sync + 'static,
    {
        let store = Arc::downgrade(self.client.store());
        let selector = self.selector.clone();
        let last = Mutex::new(self.lights());

        self.client.add_observer_arc(Arc::new(move |lights: &[Light]| {
            let Some(store) = store.upgrade() else {
                return;
            };
            let scenes = store.scenes();
            let matcher = Matcher::compile(&selector, &scenes);
            let current: Vec<Light> = matcher.filter(lights).cloned().collect();

            let mut last = last.lock().unwrap_or_else(PoisonError::into_inner);
            if *last == current {
                return;
            }
            last.clone_from(&current);
            drop(last);
            observer(&current);
        }))
    }

    pub fn remove_observer(&self, token: ObserverToken) -> bool {
        self.client.remove_observer(token)
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}
