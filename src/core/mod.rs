//! Simulation core: the in-memory store, the route table and the request
//! pipeline that turns a [`SimulatedRequest`](request::SimulatedRequest) into
//! a [`SimulatedResponse`](request::SimulatedResponse).

pub mod builders;
pub mod filter;
pub mod pager;
pub mod request;
pub mod routes;
pub mod seed;
pub mod simulator;
pub mod store;
pub mod uploads;
