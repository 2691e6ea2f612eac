// ── Light cache ──
//
// Mutex-guarded light/scene cache with observer notification.

mod light_store;
mod observers;
mod reconcile;

pub use light_store::LightStore;
pub(crate) use light_store::OptimisticUpdate;
pub use observers::{LightsObserver, ObserverToken};
pub use reconcile::merge_lights;
