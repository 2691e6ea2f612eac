// HTTP session for the lighting API
//
// Wraps `reqwest::Client` with bearer auth, URL construction, status
// validation and body decoding. Requests pass through a FIFO gate so a
// session never has more than one request in flight.

use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::api::LightsApi;
use crate::error::Error;
use crate::transport::SessionConfig;
use crate::types::{
    LightResponse, ResultResponse, ResultsEnvelope, SceneActivateRequest, SceneResponse,
    StateChangeRequest,
};

const OK: &[u16] = &[200];
const OK_OR_MULTI: &[u16] = &[200, 207];

/// Async client for the cloud lighting API.
pub struct HttpSession {
    http: reqwest::Client,
    base_url: Url,
    /// Serializes requests in submission order (tokio's mutex is fair).
    queue: Mutex<()>,
}

impl HttpSession {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(config: &SessionConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        Self::from_reqwest(&config.base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            queue: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET lights/{selector}`.
    pub async fn lights(&self, selector: &str) -> Result<Vec<LightResponse>, Error> {
        let url = self.url(&["lights", selector])?;
        self.get(url, OK).await
    }

    /// `GET scenes`.
    ///
    /// Scene objects missing required fields are skipped rather than
    /// failing the whole listing.
    pub async fn scenes(&self) -> Result<Vec<SceneResponse>, Error> {
        let url = self.url(&["scenes"])?;
        let raw: Vec<serde_json::Value> = self.get(url, OK).await?;
        Ok(raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(scene) => Some(scene),
                Err(e) => {
                    debug!(error = %e, "skipping malformed scene");
                    None
                }
            })
            .collect())
    }

    /// `PUT lights/{selector}/state`.
    pub async fn set_lights_state(
        &self,
        selector: &str,
        change: &StateChangeRequest,
    ) -> Result<Vec<ResultResponse>, Error> {
        let url = self.url(&["lights", selector, "state"])?;
        let envelope: ResultsEnvelope = self.put(url, change, OK_OR_MULTI).await?;
        Ok(envelope.results)
    }

    /// `PUT scenes/{selector}/activate`.
    pub async fn activate_scene(
        &self,
        selector: &str,
        duration: f64,
    ) -> Result<Vec<ResultResponse>, Error> {
        let url = self.url(&["scenes", selector, "activate"])?;
        let body = SceneActivateRequest { duration };
        let envelope: ResultsEnvelope = self.put(url, &body, OK_OR_MULTI).await?;
        Ok(envelope.results)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url, expected: &[u16]) -> Result<T, Error> {
        let _turn = self.queue.lock().await;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp, expected).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        expected: &[u16],
    ) -> Result<T, Error> {
        let _turn = self.queue.lock().await;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_response(resp, expected).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    expected: &[u16],
) -> Result<T, Error> {
    validate_status(resp.status(), expected)?;

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::MalformedResponse {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

fn validate_status(status: StatusCode, expected: &[u16]) -> Result<(), Error> {
    let code = status.as_u16();
    if expected.contains(&code) {
        return Ok(());
    }
    Err(match code {
        401 => Error::Unauthorized,
        403 => Error::Forbidden,
        429 => Error::RateLimited,
        500 | 502 | 503 | 523 => Error::ServerError { status: code },
        got => Error::UnexpectedStatus {
            expected: expected.to_vec(),
            got,
        },
    })
}

// ── Collaborator trait ───────────────────────────────────────────────

impl LightsApi for HttpSession {
    fn list_lights<'a>(
        &'a self,
        selector: &'a str,
    ) -> BoxFuture<'a, Result<Vec<LightResponse>, Error>> {
        Box::pin(self.lights(selector))
    }

    fn list_scenes(&self) -> BoxFuture<'_, Result<Vec<SceneResponse>, Error>> {
        Box::pin(self.scenes())
    }

    fn set_state<'a>(
        &'a self,
        selector: &'a str,
        change: &'a StateChangeRequest,
    ) -> BoxFuture<'a, Result<Vec<ResultResponse>, Error>> {
        Box::pin(self.set_lights_state(selector, change))
    }

    fn activate_scene<'a>(
        &'a self,
        selector: &'a str,
        duration: f64,
    ) -> BoxFuture<'a, Result<Vec<ResultResponse>, Error>> {
        Box::pin(HttpSession::activate_scene(self, selector, duration))
    }
}
