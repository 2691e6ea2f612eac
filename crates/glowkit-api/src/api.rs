// The network collaborator seam.
//
// `glowkit-core` talks to the service exclusively through this trait so
// the reconciliation engine can be driven by `HttpSession` in production
// and by in-memory fakes in tests.

use futures_util::future::BoxFuture;

use crate::error::Error;
use crate::types::{LightResponse, ResultResponse, SceneResponse, StateChangeRequest};

/// Operations the core consumes from the remote lighting service.
///
/// Every selector argument is the canonical `type:value` / `all` string.
pub trait LightsApi: Send + Sync {
    /// `fetchLights(selector)`.
    fn list_lights<'a>(&'a self, selector: &'a str)
    -> BoxFuture<'a, Result<Vec<LightResponse>, Error>>;

    /// `fetchScenes()`.
    fn list_scenes(&self) -> BoxFuture<'_, Result<Vec<SceneResponse>, Error>>;

    /// `sendStateChange(selector, desiredState, duration)`.
    fn set_state<'a>(
        &'a self,
        selector: &'a str,
        change: &'a StateChangeRequest,
    ) -> BoxFuture<'a, Result<Vec<ResultResponse>, Error>>;

    /// `activateScene(selector, duration)`. `duration` is in seconds.
    fn activate_scene<'a>(
        &'a self,
        selector: &'a str,
        duration: f64,
    ) -> BoxFuture<'a, Result<Vec<ResultResponse>, Error>>;
}
