// ── Observer registry ──
//
// Callbacks keyed by an opaque token. Removal is by token, so two
// identical closures registered separately stay independently removable.

use std::sync::Arc;

use crate::model::Light;

/// Callback invoked with the full, ordered light set after it changes.
pub type LightsObserver = Arc<dyn Fn(&[Light]) + Send + Sync>;

/// Handle returned by `add_observer`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<(ObserverToken, LightsObserver)>,
}

impl ObserverRegistry {
    pub(crate) fn add(&mut self, observer: LightsObserver) -> ObserverToken {
        let token = ObserverToken(self.next_id);
        self.next_id += 1;
        self.entries.push((token, observer));
        token
    }

    /// Returns `true` if the token was registered.
    pub(crate) fn remove(&mut self, token: ObserverToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| *t != token);
        self.entries.len() != before
    }

    /// Callbacks in registration order.
    pub(crate) fn callbacks(&self) -> Vec<LightsObserver> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
