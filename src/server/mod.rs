//! Simulated server: the request pipeline mounted on a `wiremock` server.
//!
//! Every request that reaches the mock server is converted into a
//! [`SimulatedRequest`], run through [`Simulator::dispatch`] and answered with
//! the converted [`SimulatedResponse`].

use crate::api::RestError;
use crate::core::request::{SimulatedRequest, SimulatedResponse};
use crate::core::routes::RouteId;
use crate::core::simulator::Simulator;
use crate::core::store::TableauData;
use crate::error::ServerError;
use crate::storage::config::SimulatorConfig;
use bytes::Bytes;
use log::{debug, error};
use std::net::TcpListener;
use std::sync::Arc;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

impl From<&Request> for SimulatedRequest {
    fn from(request: &Request) -> Self {
        SimulatedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: Bytes::from(request.body.clone()),
        }
    }
}

impl From<SimulatedResponse> for ResponseTemplate {
    fn from(response: SimulatedResponse) -> Self {
        let template = ResponseTemplate::new(response.status.as_u16());
        match response.content_type {
            Some(content_type) => template.set_body_raw(response.body, &content_type),
            None => template,
        }
    }
}

struct SimulatorResponder {
    simulator: Arc<Simulator>,
}

impl Respond for SimulatorResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        // dispatch never waits on I/O, so it completes on this thread
        let outcome = futures::executor::block_on(self.simulator.dispatch(request.into()));
        match outcome {
            Ok(response) => response.into(),
            Err(e) => {
                error!("{} {} could not be simulated: {}", request.method, request.url, e);
                ResponseTemplate::new(500).set_body_string(e.to_string())
            }
        }
    }
}

/// A running simulated server; stops when dropped.
pub struct SimulatedServer {
    server: MockServer,
    simulator: Arc<Simulator>,
}

impl SimulatedServer {
    /// Starts on a random local port.
    pub async fn start(config: SimulatorConfig) -> Self {
        let server = MockServer::start().await;
        Self::mount(server, Simulator::new(config)).await
    }

    /// Starts on an already bound listener.
    pub async fn start_on(listener: TcpListener, simulator: Simulator) -> Self {
        let server = MockServer::builder().listener(listener).start().await;
        Self::mount(server, simulator).await
    }

    /// Binds `127.0.0.1:{port}` and starts there.
    pub async fn bind(port: u16, simulator: Simulator) -> Result<Self, ServerError> {
        let address = format!("127.0.0.1:{}", port);
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        Ok(Self::start_on(listener, simulator).await)
    }

    async fn mount(server: MockServer, simulator: Simulator) -> Self {
        let simulator = Arc::new(simulator);
        Mock::given(any())
            .respond_with(SimulatorResponder {
                simulator: Arc::clone(&simulator),
            })
            .mount(&server)
            .await;
        debug!("Simulated server listening on {}", server.uri());
        Self { server, simulator }
    }

    /// Base URI, e.g. `http://127.0.0.1:40123`.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Base URI of the site, e.g. `http://127.0.0.1:40123/api/3.19/sites/{id}`.
    pub fn site_uri(&self) -> String {
        format!("{}{}", self.uri(), self.simulator.site_path())
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn data(&self) -> &Arc<TableauData> {
        self.simulator.data()
    }

    /// Answers every call to `route` with `error` until disarmed.
    pub fn arm_error(&self, route: RouteId, error: RestError) {
        self.simulator.overrides().arm(route, error);
    }

    /// Answers the next call to `route` with `error`.
    pub fn arm_error_once(&self, route: RouteId, error: RestError) {
        self.simulator.overrides().arm_once(route, error);
    }

    pub fn disarm_error(&self, route: RouteId) {
        self.simulator.overrides().disarm(route);
    }

    /// Requests received so far, oldest first.
    pub async fn received_requests(&self) -> Vec<SimulatedRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(SimulatedRequest::from)
            .collect()
    }
}
