//! Request pipeline of the simulated server.
//!
//! Every request goes through the same stages: route match, armed error
//! override, auth check, multipart pre-parse, the operation handler under
//! the store's write lock, then envelope rendering for the negotiated media
//! type.

use super::builders::{self, errors};
use super::filter::Filter;
use super::pager::PageRequest;
use super::request::{FormData, QueryParams, SimulatedRequest, SimulatedResponse};
use super::routes::{self, PathParams, Resolution, Route, RouteId};
use super::store::{ServerState, Session, TableauData};
use super::uploads::FileUploads;
use crate::api::models::SiteType;
use crate::api::serialization::{HttpContentSerializer, MediaType};
use crate::api::{EmptyResponse, Envelope, RestError};
use crate::error::SimulationError;
use crate::storage::config::SimulatorConfig;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Multipart part carrying the XML or JSON request document.
pub const REQUEST_PAYLOAD_PART: &str = "request_payload";

pub type Handler = fn(&RequestContext<'_>, &mut ServerState) -> Result<Built, SimulationError>;

pub enum Body {
    Envelope(Box<dyn Envelope>),
    Raw { content_type: String, bytes: Vec<u8> },
    Empty,
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Envelope(_) => f.write_str("Envelope"),
            Body::Raw {
                content_type,
                bytes,
            } => write!(f, "Raw({}, {} bytes)", content_type, bytes.len()),
            Body::Empty => f.write_str("Empty"),
        }
    }
}

/// Status and body produced by a handler.
#[derive(Debug)]
pub struct Built {
    pub status: StatusCode,
    pub body: Body,
}

impl Built {
    pub fn new(status: StatusCode, envelope: impl Envelope + 'static) -> Self {
        Self {
            status,
            body: Body::Envelope(Box::new(envelope)),
        }
    }

    pub fn ok(envelope: impl Envelope + 'static) -> Self {
        Self::new(StatusCode::OK, envelope)
    }

    pub fn created(envelope: impl Envelope + 'static) -> Self {
        Self::new(StatusCode::CREATED, envelope)
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Body::Empty,
        }
    }

    pub fn raw(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Body::Raw {
                content_type: content_type.into(),
                bytes,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorOverride {
    pub error: RestError,
    pub once: bool,
}

/// Errors armed per operation; an armed operation answers with the error
/// instead of running its handler.
#[derive(Debug, Default)]
pub struct ErrorOverrides {
    armed: Mutex<HashMap<RouteId, ErrorOverride>>,
}

impl ErrorOverrides {
    pub fn arm(&self, route: RouteId, error: RestError) {
        self.insert(route, ErrorOverride { error, once: false });
    }

    /// Arms an error that fires for the next request only.
    pub fn arm_once(&self, route: RouteId, error: RestError) {
        self.insert(route, ErrorOverride { error, once: true });
    }

    pub fn disarm(&self, route: RouteId) -> Option<ErrorOverride> {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&route)
    }

    pub fn clear(&self) {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn take(&self, route: RouteId) -> Option<RestError> {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = armed.get(&route)?;
        if entry.once {
            armed.remove(&route).map(|entry| entry.error)
        } else {
            Some(entry.error.clone())
        }
    }

    fn insert(&self, route: RouteId, entry: ErrorOverride) {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(route, entry);
    }
}

/// Everything a handler may read about the current request.
pub struct RequestContext<'a> {
    pub request: &'a SimulatedRequest,
    pub route: &'static Route,
    pub params: PathParams,
    pub query: QueryParams,
    pub form: Option<FormData>,
    pub config: &'a SimulatorConfig,
    pub uploads: &'a FileUploads,
}

impl RequestContext<'_> {
    pub fn param(&self, name: &str) -> Result<&str, RestError> {
        self.params
            .get(name)
            .ok_or_else(|| errors::bad_request(format!("Missing path parameter '{}'", name)))
    }

    pub fn id_param(&self, name: &str) -> Result<Uuid, RestError> {
        let raw = self.param(name)?;
        Uuid::parse_str(raw)
            .map_err(|_| errors::bad_request(format!("'{}' is not a valid {}", raw, name)))
    }

    /// `?key=contentUrl` selects lookup by content URL instead of id.
    pub fn by_content_url(&self) -> bool {
        self.query
            .get("key")
            .is_some_and(|key| key.eq_ignore_ascii_case("contentUrl"))
    }

    /// Typed request document from the raw body.
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        parse_document(
            &self.request.body,
            MediaType::from_content_type(self.request.content_type()),
        )
    }

    /// Typed request document from the `request_payload` part of a multipart
    /// body, or the raw body for single-part requests.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        match &self.form {
            Some(form) => {
                let part = form.part(REQUEST_PAYLOAD_PART).ok_or_else(|| {
                    errors::bad_request(format!(
                        "Multipart request has no '{}' part",
                        REQUEST_PAYLOAD_PART
                    ))
                })?;
                parse_document(
                    &part.data,
                    MediaType::from_content_type(part.content_type.as_deref()),
                )
            }
            None => self.body(),
        }
    }

    pub fn page(&self) -> Result<PageRequest, RestError> {
        PageRequest::from_query(
            &self.query,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    pub fn filter(&self) -> Result<Filter, RestError> {
        Filter::from_query(&self.query)
    }

    /// The signed-in session; its absence is a setup error, not a response.
    pub fn session<'s>(&self, state: &'s ServerState) -> Result<&'s Session, SimulationError> {
        state
            .session
            .as_ref()
            .ok_or_else(|| SimulationError::SessionRequired {
                operation: self.route.id.to_string(),
            })
    }
}

fn parse_document<T: DeserializeOwned>(bytes: &[u8], media_type: MediaType) -> Result<T, RestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(errors::bad_request("The request body is empty".to_string()));
    }
    HttpContentSerializer::deserialize(bytes, media_type).map_err(|e| {
        errors::bad_request(format!("The request body could not be parsed: {}", e))
    })
}

pub struct Simulator {
    data: Arc<TableauData>,
    config: SimulatorConfig,
    overrides: ErrorOverrides,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let site = SiteType::new(config.site_name.clone(), config.site_content_url.clone());
        Self::with_data(config, Arc::new(TableauData::new(site)))
    }

    pub fn with_data(config: SimulatorConfig, data: Arc<TableauData>) -> Self {
        Self {
            data,
            config,
            overrides: ErrorOverrides::default(),
        }
    }

    pub fn data(&self) -> &Arc<TableauData> {
        &self.data
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn overrides(&self) -> &ErrorOverrides {
        &self.overrides
    }

    /// `/api/{version}`
    pub fn api_path(&self) -> String {
        format!("/api/{}", self.config.api_version)
    }

    /// `/api/{version}/sites/{site-id}`
    pub fn site_path(&self) -> String {
        format!("{}/sites/{}", self.api_path(), self.data.read().site.id)
    }

    /// Runs one request through the pipeline.
    ///
    /// Simulated failures come back as error envelopes inside `Ok`; `Err` is
    /// reserved for setup errors such as a missing session.
    pub async fn dispatch(
        &self,
        request: SimulatedRequest,
    ) -> Result<SimulatedResponse, SimulationError> {
        let media_type = request.accept();
        let segments = request.path_segments();
        debug!("{} {}", request.method, request.url.path());

        let (route, params) = match routes::resolve(&request.method, &segments) {
            Resolution::Matched { route, params } => (route, params),
            Resolution::MethodNotAllowed => {
                let error = errors::method_not_allowed(&request.method, request.url.path());
                return self.error_response(&error, media_type);
            }
            Resolution::NotFound => {
                let error = errors::unknown_resource(request.url.path());
                return self.error_response(&error, media_type);
            }
        };

        if let Some(error) = self.overrides.take(route.id) {
            debug!("{} answered by armed error {}", route.id, error.code());
            return self.error_response(&error, media_type);
        }

        if route.requires_auth && self.config.enforce_auth {
            let signed_in = {
                let state = self.data.read();
                match (&state.session, request.auth_token()) {
                    (Some(session), Some(token)) => session.token == token,
                    _ => false,
                }
            };
            if !signed_in {
                return self.error_response(&errors::UNAUTHORIZED.build(), media_type);
            }
        }

        let form = match request.content_type() {
            Some(content_type) if request.is_multipart() => {
                match FormData::parse(content_type, request.body.clone()).await {
                    Ok(form) => Some(form),
                    Err(error) => return self.error_response(&error, media_type),
                }
            }
            _ => None,
        };

        let context = RequestContext {
            request: &request,
            route,
            params,
            query: request.query(),
            form,
            config: &self.config,
            uploads: self.data.uploads(),
        };

        let handler = builders::handler_for(route.id);
        let outcome = {
            let mut state = self.data.write();
            handler(&context, &mut state)
        };

        match outcome {
            Ok(built) => {
                debug!("{} -> {}", route.id, built.status);
                render(built, media_type)
            }
            Err(SimulationError::Rest(error)) => self.error_response(&error, media_type),
            Err(other) => {
                error!("{} failed: {}", route.id, other);
                Err(other)
            }
        }
    }

    fn error_response(
        &self,
        error: &RestError,
        media_type: MediaType,
    ) -> Result<SimulatedResponse, SimulationError> {
        info!("Simulated error {}", error);
        let body = EmptyResponse::error(error).render(media_type)?;
        Ok(SimulatedResponse::new(
            error.status_code(),
            Some(media_type.content_type().to_string()),
            body,
        ))
    }
}

fn render(built: Built, media_type: MediaType) -> Result<SimulatedResponse, SimulationError> {
    let response = match built.body {
        Body::Envelope(envelope) => SimulatedResponse::new(
            built.status,
            Some(media_type.content_type().to_string()),
            envelope.render(media_type)?,
        ),
        Body::Raw {
            content_type,
            bytes,
        } => SimulatedResponse::new(built.status, Some(content_type), bytes),
        Body::Empty => SimulatedResponse::new(built.status, None, Vec::new()),
    };
    Ok(response)
}

/// Header name used for response bodies; re-exported for adapters.
pub fn content_type_header() -> &'static str {
    CONTENT_TYPE.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::UserType;
    use http::Method;
    use serde_json::Value;

    fn simulator() -> Simulator {
        Simulator::new(SimulatorConfig::default())
    }

    fn get(path: &str) -> SimulatedRequest {
        SimulatedRequest::parse(Method::GET, &format!("http://localhost{}", path))
            .expect("url")
            .with_accept(MediaType::Json)
    }

    fn json(response: &SimulatedResponse) -> Value {
        serde_json::from_slice(&response.body).expect("json body")
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let simulator = simulator();
        let request = get("/api/3.19/sites/x/flows");
        let response = simulator.dispatch(request).await.expect("dispatch");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(json(&response)["error"]["code"], "404000");
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let simulator = simulator();
        let request = SimulatedRequest::parse(
            Method::PATCH,
            "http://localhost/api/3.19/serverinfo",
        )
        .expect("url");
        let response = simulator.dispatch(request).await.expect("dispatch");
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_auth_required() {
        let simulator = simulator();
        let path = format!("{}/users", simulator.site_path());
        let response = simulator
            .dispatch(get(&path))
            .await
            .expect("dispatch");
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&response)["error"]["code"], "401000");

        let user = simulator.data().add_user(UserType::new("admin", "SiteAdministratorCreator"));
        let session = simulator.data().sign_in(user.id);
        let response = simulator
            .dispatch(get(&path).with_auth(&session.token))
            .await
            .expect("dispatch");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(json(&response)["pagination"]["totalAvailable"], 1);
    }

    #[tokio::test]
    async fn test_error_override_once_and_persistent() {
        let simulator = simulator();
        let path = format!("{}/serverinfo", simulator.api_path());
        simulator
            .overrides()
            .arm_once(RouteId::ServerInfo, RestError::new(500, 0, "Boom", "armed"));

        let first = simulator.dispatch(get(&path)).await.expect("dispatch");
        assert_eq!(first.status, StatusCode::INTERNAL_SERVER_ERROR);
        let second = simulator.dispatch(get(&path)).await.expect("dispatch");
        assert_eq!(second.status, StatusCode::OK);

        simulator
            .overrides()
            .arm(RouteId::ServerInfo, RestError::new(503, 1, "Down", "armed"));
        for _ in 0..2 {
            let response = simulator.dispatch(get(&path)).await.expect("dispatch");
            assert_eq!(json(&response)["error"]["code"], "503001");
        }
        assert!(simulator.overrides().disarm(RouteId::ServerInfo).is_some());
    }

    #[tokio::test]
    async fn test_missing_session_is_a_setup_error() {
        let config = SimulatorConfig {
            enforce_auth: false,
            ..SimulatorConfig::default()
        };
        let simulator = Simulator::new(config);
        let path = format!("{}/projects", simulator.site_path());
        let request = SimulatedRequest::parse(Method::POST, &format!("http://localhost{}", path))
            .expect("url")
            .with_body("application/xml", r#"<tsRequest><project name="P"/></tsRequest>"#);

        let result = simulator.dispatch(request).await;
        assert!(matches!(
            result,
            Err(SimulationError::SessionRequired { .. })
        ));
    }

    #[tokio::test]
    async fn test_xml_is_the_default_media_type() {
        let simulator = simulator();
        let request = SimulatedRequest::parse(
            Method::GET,
            &format!("http://localhost{}/serverinfo", simulator.api_path()),
        )
        .expect("url");
        let response = simulator.dispatch(request).await.expect("dispatch");
        assert!(
            response
                .content_type
                .as_deref()
                .is_some_and(|value| value.starts_with("application/xml"))
        );
        assert!(response.text().contains("<serverInfo>"));
    }
}
