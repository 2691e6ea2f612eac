// ── Client ──
//
// Owns the light cache and the connection to the lighting service.
// Fetches merge into the cache; mutations apply optimistically, then
// queue on a single command processor that talks to the service in
// submission order.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use glowkit_api::{HttpSession, LightsApi};

use crate::command::{Command, CommandEnvelope, CommandHandle, CommandResponse};
use crate::config::{ClientConfig, RollbackPolicy, SyncOptions};
use crate::convert::state_change_request;
use crate::error::CoreError;
use crate::model::{Light, OperationResult, Scene, Selector};
use crate::store::{LightStore, LightsObserver, ObserverToken};
use crate::stream::LightStream;
use crate::target::Target;

// ── Client ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ClientInner>`. Background tasks hold only
/// the API and the store, so dropping the last clone stops them.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

/// What background tasks need; never holds the client itself.
#[derive(Clone)]
struct SyncContext {
    api: Arc<dyn LightsApi>,
    store: Arc<LightStore>,
    options: SyncOptions,
}

struct ClientInner {
    ctx: SyncContext,
    command_tx: mpsc::UnboundedSender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::UnboundedReceiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Client {
    /// Build a client backed by an [`HttpSession`]. Does not fetch or
    /// spawn anything.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let session = HttpSession::new(&config.session)?;
        Ok(Self::with_api(Arc::new(session), config.sync))
    }

    /// Build a client over any [`LightsApi`] implementation.
    pub fn with_api(api: Arc<dyn LightsApi>, options: SyncOptions) -> Self {
        Self::seeded(api, options, Vec::new(), Vec::new())
    }

    /// Build a client with a pre-populated cache.
    pub fn seeded(
        api: Arc<dyn LightsApi>,
        options: SyncOptions,
        lights: Vec<Light>,
        scenes: Vec<Scene>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(ClientInner {
                ctx: SyncContext {
                    api,
                    store: Arc::new(LightStore::new(lights, scenes)),
                    options,
                },
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.inner.ctx.options
    }

    pub fn store(&self) -> &Arc<LightStore> {
        &self.inner.ctx.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the command processor and, if configured, the periodic
    /// refresh task. Calling it again is a no-op.
    ///
    /// Must run inside a tokio runtime; outside one, commands stay
    /// queued until a later call succeeds.
    pub fn start(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("start called outside a tokio runtime; commands stay queued");
            return;
        };
        if self.inner.cancel.is_cancelled() {
            return;
        }
        let Some(rx) = lock(&self.inner.command_rx).take() else {
            return;
        };

        let mut handles = lock(&self.inner.task_handles);
        let ctx = self.inner.ctx.clone();
        let cancel = self.inner.cancel.clone();
        handles.push(runtime.spawn(command_processor_task(ctx, rx, cancel)));

        let interval_secs = self.inner.ctx.options.refresh_interval_secs;
        if interval_secs > 0 {
            let ctx = self.inner.ctx.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(runtime.spawn(refresh_task(ctx, interval_secs, cancel)));
        }
        info!(refresh_interval_secs = interval_secs, "client started");
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled() && lock(&self.inner.command_rx).is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Stop accepting commands, let queued ones finish, and join the
    /// background tasks.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handles: Vec<JoinHandle<()>> = lock(&self.inner.task_handles).drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        info!("client shut down");
    }

    // ── Fetching ─────────────────────────────────────────────────

    /// Fetch lights and scenes concurrently. Every failure is returned;
    /// an empty list means both succeeded.
    pub async fn fetch(&self) -> Vec<CoreError> {
        self.inner.ctx.fetch_all().await
    }

    /// Fetch all lights and merge them into the cache. Returns whether
    /// the cached light set changed.
    pub async fn fetch_lights(&self) -> Result<bool, CoreError> {
        self.inner.ctx.fetch_lights().await
    }

    /// Fetch scenes and replace the cached list.
    pub async fn fetch_scenes(&self) -> Result<(), CoreError> {
        self.inner.ctx.fetch_scenes().await
    }

    // ── Cache access ─────────────────────────────────────────────

    pub fn lights(&self) -> Arc<Vec<Light>> {
        self.inner.ctx.store.lights()
    }

    pub fn scenes(&self) -> Arc<Vec<Scene>> {
        self.inner.ctx.store.scenes()
    }

    pub fn subscribe_lights(&self) -> LightStream {
        self.inner.ctx.store.subscribe()
    }

    /// Register a callback invoked with the full light set after every
    /// change, in registration order.
    pub fn add_observer<F>(&self, observer: F) -> ObserverToken
    where
        F: Fn(&[Light]) + Send + Sync + 'static,
    {
        self.inner.ctx.store.add_observer(Arc::new(observer))
    }

    pub(crate) fn add_observer_arc(&self, observer: LightsObserver) -> ObserverToken {
        self.inner.ctx.store.add_observer(observer)
    }

    pub fn remove_observer(&self, token: ObserverToken) -> bool {
        self.inner.ctx.store.remove_observer(token)
    }

    // ── Targets ──────────────────────────────────────────────────

    pub fn all_lights_target(&self) -> Target {
        self.target(Selector::all())
    }

    pub fn target(&self, selector: Selector) -> Target {
        Target::new(self.clone(), selector)
    }

    /// Parse `selector` and build a target for it.
    pub fn target_str(&self, selector: &str) -> Result<Target, CoreError> {
        Selector::parse(selector)
            .map(|s| self.target(s))
            .ok_or_else(|| CoreError::InvalidSelector {
                input: selector.to_owned(),
            })
    }

    // ── Command execution ────────────────────────────────────────

    /// Apply `command` optimistically to the cache and queue it.
    ///
    /// Returns immediately; the handle resolves once the service has
    /// answered. A closed client rejects the command without touching
    /// the cache.
    pub fn execute(&self, command: Command) -> CommandHandle {
        if self.is_closed() {
            return CommandHandle::ready(Err(CoreError::ClientClosed));
        }

        let store = &self.inner.ctx.store;
        let now = Utc::now();
        let optimistic = match &command {
            Command::SetState {
                selector, change, ..
            } => store.apply_optimistic(selector, change, now),
            Command::ActivateScene { selector, .. } => store.apply_scene(selector, now),
        };
        debug!(%command, lights = optimistic.applied.len(), "optimistic update applied");

        if Handle::try_current().is_ok() {
            self.start();
        }

        let (response_tx, response_rx) = tokio::sync::oneshot::channel();
        let envelope = CommandEnvelope {
            command,
            optimistic,
            response_tx,
        };
        if self.inner.command_tx.send(envelope).is_err() {
            return CommandHandle::ready(Err(CoreError::ClientClosed));
        }
        CommandHandle::from_receiver(response_rx)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Build, start, fetch, run `f`, shut down.
    ///
    /// Periodic refresh is disabled. Fails with the first fetch error.
    pub async fn oneshot<F, Fut, T, E>(config: ClientConfig, f: F) -> Result<T, E>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        let mut cfg = config;
        cfg.sync.refresh_interval_secs = 0;

        let client = Client::new(cfg)?;
        client.start();
        if let Some(err) = client.fetch().await.into_iter().next() {
            client.shutdown().await;
            return Err(err.into());
        }
        let result = f(client.clone()).await;
        client.shutdown().await;
        result
    }
}

impl SyncContext {
    async fn fetch_lights(&self) -> Result<bool, CoreError> {
        let fetched: Vec<Light> = self
            .api
            .list_lights(Selector::all().to_wire().as_str())
            .await?
            .into_iter()
            .map(Light::from)
            .collect();
        Ok(self.store.apply_fetched(fetched))
    }

    async fn fetch_scenes(&self) -> Result<(), CoreError> {
        let scenes: Vec<Scene> = self
            .api
            .list_scenes()
            .await?
            .into_iter()
            .map(Scene::from)
            .collect();
        self.store.replace_scenes(scenes);
        Ok(())
    }

    async fn fetch_all(&self) -> Vec<CoreError> {
        let (lights, scenes) = tokio::join!(self.fetch_lights(), self.fetch_scenes());
        let errors: Vec<CoreError> = [lights.err(), scenes.err()].into_iter().flatten().collect();
        debug!(
            lights = self.store.lights().len(),
            scenes = self.store.scenes().len(),
            errors = errors.len(),
            "fetch complete"
        );
        errors
    }

    async fn route_command(&self, command: &Command) -> CommandResponse {
        let results = match command {
            Command::SetState {
                selector,
                change,
                duration,
            } => {
                let body = state_change_request(change, *duration);
                self.api.set_state(&selector.to_wire(), &body).await?
            }
            Command::ActivateScene { selector, duration } => {
                self.api
                    .activate_scene(&selector.to_wire(), duration.as_secs_f64())
                    .await?
            }
        };
        Ok(results.into_iter().map(OperationResult::from).collect())
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically fetch lights and scenes.
async fn refresh_task(ctx: SyncContext, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                for e in ctx.fetch_all().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Execute queued commands one at a time, in submission order.
///
/// On cancellation the queue is closed and whatever is already queued
/// still runs before the task exits.
async fn command_processor_task(
    ctx: SyncContext,
    mut rx: mpsc::UnboundedReceiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    let mut closing = false;
    loop {
        let envelope = if closing {
            rx.recv().await
        } else {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    rx.close();
                    closing = true;
                    continue;
                }
                envelope = rx.recv() => envelope,
            }
        };
        let Some(envelope) = envelope else { break };

        let result = ctx.route_command(&envelope.command).await;
        let now = Utc::now();
        match &result {
            Ok(results) => {
                ctx.store.apply_results(results, now);
            }
            Err(e) => {
                warn!(command = %envelope.command, error = %e, "command failed");
                if ctx.options.rollback == RollbackPolicy::Revert {
                    ctx.store.revert(&envelope.optimistic, now);
                }
            }
        }
        let _ = envelope.response_tx.send(result);
    }
    debug!("command processor stopped");
}
