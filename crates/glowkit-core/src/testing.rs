// In-memory `LightsApi` used by the engine tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use glowkit_api::Error;
use glowkit_api::LightsApi;
use glowkit_api::types::{
    ColorResponse, GroupResponse, LightResponse, LocationResponse, ResultResponse, ResultStatus,
    SceneResponse, StateChangeRequest, StateResponse,
};

/// A recorded outbound request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListLights(String),
    ListScenes,
    SetState(String, StateChangeRequest),
    ActivateScene(String, f64),
}

type Failure = fn() -> Error;

#[derive(Default)]
pub(crate) struct FakeApi {
    pub lights: Mutex<Vec<LightResponse>>,
    pub scenes: Mutex<Vec<SceneResponse>>,
    pub results: Mutex<Vec<ResultResponse>>,
    pub lights_failure: Mutex<Option<Failure>>,
    pub scenes_failure: Mutex<Option<Failure>>,
    pub commands_failure: Mutex<Option<Failure>>,
    pub next_command_failure: Mutex<Option<Failure>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub(crate) fn with_lights(lights: Vec<LightResponse>) -> Self {
        Self {
            lights: Mutex::new(lights),
            ..Self::default()
        }
    }

    pub(crate) fn fail_lights(&self, failure: Failure) {
        *self.lights_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn fail_scenes(&self, failure: Failure) {
        *self.scenes_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn fail_commands(&self, failure: Failure) {
        *self.commands_failure.lock().unwrap() = Some(failure);
    }

    /// Fail only the next state-changing request.
    pub(crate) fn fail_next_command(&self, failure: Failure) {
        *self.next_command_failure.lock().unwrap() = Some(failure);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn command_outcome(&self) -> Result<Vec<ResultResponse>, Error> {
        if let Some(fail) = self.next_command_failure.lock().unwrap().take() {
            return Err(fail());
        }
        match *self.commands_failure.lock().unwrap() {
            Some(fail) => Err(fail()),
            None => Ok(self.results.lock().unwrap().clone()),
        }
    }
}

impl LightsApi for FakeApi {
    fn list_lights<'a>(
        &'a self,
        selector: &'a str,
    ) -> BoxFuture<'a, Result<Vec<LightResponse>, Error>> {
        self.record(Call::ListLights(selector.to_owned()));
        let outcome = match *self.lights_failure.lock().unwrap() {
            Some(fail) => Err(fail()),
            None => Ok(self.lights.lock().unwrap().clone()),
        };
        async move { outcome }.boxed()
    }

    fn list_scenes(&self) -> BoxFuture<'_, Result<Vec<SceneResponse>, Error>> {
        self.record(Call::ListScenes);
        let outcome = match *self.scenes_failure.lock().unwrap() {
            Some(fail) => Err(fail()),
            None => Ok(self.scenes.lock().unwrap().clone()),
        };
        async move { outcome }.boxed()
    }

    fn set_state<'a>(
        &'a self,
        selector: &'a str,
        change: &'a StateChangeRequest,
    ) -> BoxFuture<'a, Result<Vec<ResultResponse>, Error>> {
        self.record(Call::SetState(selector.to_owned(), change.clone()));
        let outcome = self.command_outcome();
        async move { outcome }.boxed()
    }

    fn activate_scene<'a>(
        &'a self,
        selector: &'a str,
        duration: f64,
    ) -> BoxFuture<'a, Result<Vec<ResultResponse>, Error>> {
        self.record(Call::ActivateScene(selector.to_owned(), duration));
        let outcome = self.command_outcome();
        async move { outcome }.boxed()
    }
}

// ── Fixtures ─────────────────────────────────────────────────────

pub(crate) fn light_response(id: &str, group: &str, location: &str) -> LightResponse {
    LightResponse {
        id: id.into(),
        power: "on".into(),
        brightness: 1.0,
        color: ColorResponse {
            hue: 0.0,
            saturation: 0.0,
            kelvin: 3500,
        },
        label: format!("Light {id}"),
        connected: true,
        group: Some(GroupResponse {
            id: group.into(),
            name: format!("Group {group}"),
        }),
        location: Some(LocationResponse {
            id: location.into(),
            name: format!("Location {location}"),
        }),
    }
}

pub(crate) fn scene_response(uuid: &str, name: &str, states: Vec<StateResponse>) -> SceneResponse {
    SceneResponse {
        uuid: uuid.into(),
        name: name.into(),
        states,
    }
}

pub(crate) fn state_response(selector: &str, power: Option<&str>, brightness: Option<f64>) -> StateResponse {
    StateResponse {
        selector: selector.into(),
        power: power.map(str::to_owned),
        color: None,
        brightness,
    }
}

pub(crate) fn result(id: &str, status: ResultStatus) -> ResultResponse {
    ResultResponse {
        id: id.into(),
        status,
    }
}
