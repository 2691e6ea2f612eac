// ── LightStore ──
//
// Single source of truth for cached lights and scenes. Every mutation
// goes through one mutex. Observers run outside the lock, one delivery
// at a time and in commit order, and only when the light set changed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::observers::{LightsObserver, ObserverRegistry, ObserverToken};
use super::reconcile::merge_lights;
use crate::model::{Light, OperationResult, OperationStatus, Scene, Selector, StateChange};
use crate::resolve::{Matcher, find_scene};
use crate::stream::LightStream;

struct CacheState {
    lights: Arc<Vec<Light>>,
    scenes: Arc<Vec<Scene>>,
    observers: ObserverRegistry,
    /// Committed snapshots not yet handed to observers, oldest first.
    pending: VecDeque<Arc<Vec<Light>>>,
    /// Set while some caller is draining `pending`.
    delivering: bool,
    last_touch: Option<DateTime<Utc>>,
}

impl CacheState {
    /// A touch time strictly later than any previous one, so a light's
    /// `touched_at` identifies the write that produced it.
    fn touch(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last_touch {
            Some(last) if now <= last => last + chrono::Duration::nanoseconds(1),
            _ => now,
        };
        self.last_touch = Some(stamp);
        stamp
    }
}

/// Record of an optimistic update, used to roll it back on failure.
///
/// One entry per affected light: its value before the update and the
/// value the update left behind.
#[derive(Debug, Clone, Default)]
pub(crate) struct OptimisticUpdate {
    pub previous: Vec<Light>,
    pub applied: Vec<Light>,
}

pub struct LightStore {
    state: Mutex<CacheState>,
    lights_tx: watch::Sender<Arc<Vec<Light>>>,
}

impl LightStore {
    pub fn new(lights: Vec<Light>, scenes: Vec<Scene>) -> Self {
        let lights = Arc::new(lights);
        let (lights_tx, _) = watch::channel(Arc::clone(&lights));
        Self {
            state: Mutex::new(CacheState {
                lights,
                scenes: Arc::new(scenes),
                observers: ObserverRegistry::default(),
                pending: VecDeque::new(),
                delivering: false,
                last_touch: None,
            }),
            lights_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn lights(&self) -> Arc<Vec<Light>> {
        Arc::clone(&self.lock().lights)
    }

    pub fn scenes(&self) -> Arc<Vec<Scene>> {
        Arc::clone(&self.lock().scenes)
    }

    /// Lights currently matched by `selector`, in cache order.
    pub fn matching(&self, selector: &Selector) -> Vec<Light> {
        let state = self.lock();
        let matcher = Matcher::compile(selector, &state.scenes);
        matcher.filter(&state.lights).cloned().collect()
    }

    pub fn subscribe(&self) -> LightStream {
        LightStream::new(self.lights_tx.subscribe())
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn add_observer(&self, observer: LightsObserver) -> ObserverToken {
        self.lock().observers.add(observer)
    }

    pub fn remove_observer(&self, token: ObserverToken) -> bool {
        self.lock().observers.remove(token)
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Merge a fetch result into the cache. Returns `true` if the light
    /// set changed and observers were notified.
    pub fn apply_fetched(&self, fetched: Vec<Light>) -> bool {
        let state = self.lock();
        let merged = merge_lights(&state.lights, fetched);
        if merged == *state.lights {
            debug!(count = merged.len(), "fetched lights unchanged");
            return false;
        }
        debug!(count = merged.len(), "fetched lights merged");
        self.commit(state, merged);
        true
    }

    /// Replace the cached scene list. Scenes carry no observers.
    pub fn replace_scenes(&self, scenes: Vec<Scene>) {
        debug!(count = scenes.len(), "scenes replaced");
        self.lock().scenes = Arc::new(scenes);
    }

    /// Apply `change` to every light matched by `selector`, in place.
    pub(crate) fn apply_optimistic(
        &self,
        selector: &Selector,
        change: &StateChange,
        now: DateTime<Utc>,
    ) -> OptimisticUpdate {
        let state = self.lock();
        self.apply_changes(state, &[(selector, change)], now)
    }

    /// Apply every state of the cached scene `selector` names as one
    /// update. An unknown scene changes nothing.
    pub(crate) fn apply_scene(&self, selector: &Selector, now: DateTime<Utc>) -> OptimisticUpdate {
        let state = self.lock();
        let scenes = Arc::clone(&state.scenes);
        let Some(scene) = find_scene(&scenes, selector) else {
            return OptimisticUpdate::default();
        };
        let changes: Vec<(&Selector, &StateChange)> = scene
            .states
            .iter()
            .map(|s| (&s.selector, &s.change))
            .collect();
        self.apply_changes(state, &changes, now)
    }

    /// Apply `changes` in order under one lock and commit at most once.
    fn apply_changes(
        &self,
        mut state: MutexGuard<'_, CacheState>,
        changes: &[(&Selector, &StateChange)],
        now: DateTime<Utc>,
    ) -> OptimisticUpdate {
        let now = state.touch(now);
        let mut next: Vec<Light> = state.lights.as_ref().clone();
        let mut touched = vec![false; next.len()];

        for (selector, change) in changes {
            let matcher = Matcher::compile(selector, &state.scenes);
            for (light, hit) in next.iter_mut().zip(touched.iter_mut()) {
                if matcher.matches(light) {
                    *light = light.with_change(change, now);
                    *hit = true;
                }
            }
        }

        let mut update = OptimisticUpdate::default();
        for ((before, after), hit) in state.lights.iter().zip(&next).zip(&touched) {
            if *hit {
                update.previous.push(before.clone());
                update.applied.push(after.clone());
            }
        }

        if update.applied.is_empty() {
            return update;
        }
        if next == *state.lights {
            // Values already matched; record the touch without notifying.
            state.lights = Arc::new(next);
            return update;
        }
        self.commit(state, next);
        update
    }

    /// Undo an optimistic update for lights that still hold exactly the
    /// write it made. Lights touched since then are left alone.
    pub(crate) fn revert(&self, update: &OptimisticUpdate, now: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        let now = state.touch(now);
        let mut changed = false;
        let next: Vec<Light> = state
            .lights
            .iter()
            .map(|light| {
                let restore = update
                    .applied
                    .iter()
                    .position(|a| a.touched_at == light.touched_at && a == light)
                    .map(|i| &update.previous[i]);
                match restore {
                    Some(previous) if previous != light => {
                        changed = true;
                        Light {
                            touched_at: now,
                            ..previous.clone()
                        }
                    }
                    _ => light.clone(),
                }
            })
            .collect();

        if !changed {
            return false;
        }
        debug!(count = update.applied.len(), "optimistic update reverted");
        self.commit(state, next);
        true
    }

    /// Fold per-light command results into connectivity.
    pub(crate) fn apply_results(&self, results: &[OperationResult], now: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        let now = state.touch(now);
        let mut changed = false;
        let next: Vec<Light> = state
            .lights
            .iter()
            .map(|light| {
                let connected = results
                    .iter()
                    .find(|r| r.id == light.id)
                    .and_then(|r| match r.status {
                        OperationStatus::Ok => Some(true),
                        OperationStatus::Offline => Some(false),
                        OperationStatus::TimedOut | OperationStatus::Unknown => None,
                    });
                match connected {
                    Some(c) if c != light.connected => {
                        changed = true;
                        light.with_connected(c, now)
                    }
                    _ => light.clone(),
                }
            })
            .collect();

        if !changed {
            return false;
        }
        self.commit(state, next);
        true
    }

    /// Publish a new light set.
    ///
    /// The watch channel is updated under the lock. Observer delivery is
    /// queued: if a delivery is already running, on another thread or
    /// further up this one's stack, it picks this snapshot up in order.
    fn commit(&self, mut state: MutexGuard<'_, CacheState>, lights: Vec<Light>) {
        let lights = Arc::new(lights);
        state.lights = Arc::clone(&lights);
        self.lights_tx.send_replace(Arc::clone(&lights));
        state.pending.push_back(lights);
        if state.delivering {
            return;
        }
        state.delivering = true;
        drop(state);
        self.deliver();
    }

    fn deliver(&self) {
        let _reset = DeliveryGuard(self);
        loop {
            let (lights, callbacks) = {
                let mut state = self.lock();
                let Some(lights) = state.pending.pop_front() else {
                    state.delivering = false;
                    return;
                };
                (lights, state.observers.callbacks())
            };
            for callback in callbacks {
                callback(&lights);
            }
        }
    }
}

/// Clears the delivery state if an observer panics mid-delivery.
struct DeliveryGuard<'a>(&'a LightStore);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut state = self.0.lock();
            state.delivering = false;
            state.pending.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::model::{Color, Group, OperationStatus, State};
    use pretty_assertions::assert_eq;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn light(id: &str, group: &str) -> Light {
        Light {
            id: id.into(),
            power: true,
            brightness: 1.0,
            color: Color::default(),
            label: id.to_uppercase(),
            connected: true,
            group: Some(Group::new(group, group.to_uppercase())),
            location: None,
            touched_at: Utc::now(),
        }
    }

    fn counting(store: &LightStore) -> (Arc<AtomicUsize>, ObserverToken) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let token = store.add_observer(Arc::new(move |_: &[Light]| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        (hits, token)
    }

    #[test]
    fn fetch_merge_notifies_once_with_stale_tail() {
        let store = LightStore::new(vec![light("a", "g"), light("b", "g")], vec![]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.add_observer(Arc::new(move |lights: &[Light]| {
            let ids: Vec<String> = lights.iter().map(|l| l.id.clone()).collect();
            sink.lock().unwrap().push(ids);
        }));

        let mut b = light("b", "g");
        b.brightness = 0.2;
        assert!(store.apply_fetched(vec![b, light("c", "g")]));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec!["b", "c", "a"]);
    }

    #[test]
    fn identical_fetch_does_not_notify() {
        let store = LightStore::new(vec![light("a", "g")], vec![]);
        let (hits, _) = counting(&store);
        assert!(!store.apply_fetched(vec![light("a", "g")]));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn optimistic_update_touches_only_matches() {
        let store = LightStore::new(vec![light("a", "g1"), light("b", "g2")], vec![]);
        let (hits, _) = counting(&store);

        let update = store.apply_optimistic(
            &Selector::group("g1"),
            &StateChange::brightness(0.3),
            Utc::now(),
        );
        assert_eq!(update.applied.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let lights = store.lights();
        assert_eq!(lights[0].brightness, 0.3);
        assert_eq!(lights[1].brightness, 1.0);
    }

    #[test]
    fn optimistic_update_through_scene_selector() {
        let scene = Scene {
            uuid: "s1".into(),
            name: "Evening".into(),
            states: vec![State {
                selector: Selector::id("b"),
                change: StateChange::default(),
            }],
        };
        let store = LightStore::new(vec![light("a", "g"), light("b", "g")], vec![scene]);
        store.apply_optimistic(&Selector::scene("s1"), &StateChange::power(false), Utc::now());
        let lights = store.lights();
        assert!(lights[0].power);
        assert!(!lights[1].power);
    }

    #[test]
    fn revert_skips_lights_changed_since() {
        let store = LightStore::new(vec![light("a", "g"), light("b", "g")], vec![]);
        let update =
            store.apply_optimistic(&Selector::all(), &StateChange::power(false), Utc::now());

        // A fetch overwrote light b in the meantime.
        let mut fresh_b = light("b", "g");
        fresh_b.brightness = 0.5;
        fresh_b.power = false;
        store.apply_fetched(vec![fresh_b.clone()]);

        assert!(store.revert(&update, Utc::now()));
        let lights = store.lights();
        let a = lights.iter().find(|l| l.id == "a").unwrap();
        let b = lights.iter().find(|l| l.id == "b").unwrap();
        assert!(a.power);
        assert_eq!(*b, fresh_b);
    }

    #[test]
    fn revert_leaves_a_later_identical_write() {
        let store = LightStore::new(vec![light("a", "g")], vec![]);
        let now = Utc::now();
        let first = store.apply_optimistic(&Selector::all(), &StateChange::brightness(0.2), now);
        store.apply_optimistic(&Selector::all(), &StateChange::brightness(0.2), now);

        assert!(!store.revert(&first, now));
        assert_eq!(store.lights()[0].brightness, 0.2);
    }

    #[test]
    fn scene_applies_as_one_update() {
        let scene = Scene {
            uuid: "s1".into(),
            name: "Evening".into(),
            states: vec![
                State {
                    selector: Selector::id("a"),
                    change: StateChange::power(false),
                },
                State {
                    selector: Selector::group("g"),
                    change: StateChange::brightness(0.3),
                },
            ],
        };
        let store = LightStore::new(
            vec![light("a", "g"), light("b", "g"), light("c", "h")],
            vec![scene],
        );
        let (hits, _) = counting(&store);

        let update = store.apply_scene(&Selector::scene("s1"), Utc::now());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(update.applied.len(), 2);
        let lights = store.lights();
        assert!(!lights[0].power);
        assert_eq!(lights[0].brightness, 0.3);
        assert!(lights[1].power);
        assert_eq!(lights[1].brightness, 0.3);
        assert_eq!(lights[2].brightness, 1.0);

        assert!(store.revert(&update, Utc::now()));
        let lights = store.lights();
        assert!(lights[0].power);
        assert_eq!(lights[0].brightness, 1.0);
        assert_eq!(lights[1].brightness, 1.0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_scene_applies_nothing() {
        let store = LightStore::new(vec![light("a", "g")], vec![]);
        let (hits, _) = counting(&store);
        let update = store.apply_scene(&Selector::scene("missing"), Utc::now());
        assert!(update.applied.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn observers_receive_commits_in_commit_order() {
        let store = Arc::new(LightStore::new(vec![light("a", "g")], vec![]));

        // The first observer stalls its first delivery until the main
        // thread has committed a newer value.
        let gate = Arc::new(Barrier::new(2));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let entered_tx = Mutex::new(Some(entered_tx));
        let stall = Arc::clone(&gate);
        store.add_observer(Arc::new(move |_: &[Light]| {
            if let Some(tx) = entered_tx.lock().unwrap().take() {
                tx.send(()).unwrap();
                stall.wait();
            }
        }));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.add_observer(Arc::new(move |lights: &[Light]| {
            sink.lock().unwrap().push(lights[0].brightness);
        }));

        let background = Arc::clone(&store);
        let writer = std::thread::spawn(move || {
            background.apply_optimistic(&Selector::all(), &StateChange::brightness(0.1), Utc::now());
        });
        entered_rx.recv().unwrap();
        store.apply_optimistic(&Selector::all(), &StateChange::brightness(0.9), Utc::now());
        gate.wait();
        writer.join().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0.1, 0.9]);
        assert_eq!(store.lights()[0].brightness, 0.9);
        assert_eq!(store.subscribe().current()[0].brightness, 0.9);
    }

    #[test]
    fn observer_may_write_back_into_the_store() {
        let store = Arc::new(LightStore::new(vec![light("a", "g")], vec![]));
        let weak = Arc::downgrade(&store);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.add_observer(Arc::new(move |lights: &[Light]| {
            sink.lock().unwrap().push((lights[0].power, lights[0].brightness));
            if !lights[0].power && lights[0].brightness > 0.5 {
                if let Some(store) = weak.upgrade() {
                    store.apply_optimistic(&Selector::all(), &StateChange::brightness(0.5), Utc::now());
                }
            }
        }));

        store.apply_optimistic(&Selector::all(), &StateChange::power(false), Utc::now());

        assert_eq!(*seen.lock().unwrap(), vec![(false, 1.0), (false, 0.5)]);
        assert_eq!(store.lights()[0].brightness, 0.5);
    }

    #[test]
    fn results_update_connectivity() {
        let store = LightStore::new(vec![light("a", "g"), light("b", "g")], vec![]);
        let results = vec![
            OperationResult {
                id: "a".into(),
                status: OperationStatus::Offline,
            },
            OperationResult {
                id: "b".into(),
                status: OperationStatus::TimedOut,
            },
        ];
        assert!(store.apply_results(&results, Utc::now()));
        let lights = store.lights();
        assert!(!lights[0].connected);
        assert!(lights[1].connected);
    }

    #[test]
    fn removed_observer_is_not_called() {
        let store = LightStore::new(vec![light("a", "g")], vec![]);
        let (hits, token) = counting(&store);
        assert!(store.remove_observer(token));
        store.apply_optimistic(&Selector::all(), &StateChange::power(false), Utc::now());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(store.observer_count(), 0);
    }

    #[tokio::test]
    async fn subscribers_see_committed_snapshot() {
        let store = LightStore::new(vec![light("a", "g")], vec![]);
        let mut stream = store.subscribe();
        store.apply_optimistic(&Selector::all(), &StateChange::brightness(0.1), Utc::now());
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap[0].brightness, 0.1);
    }
}
