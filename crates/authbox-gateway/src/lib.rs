//! HTTP surface: POST `/email` ingestion, the Basic-auth admin view, and a
//! health endpoint.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::{AdminCredentials, GatewayServer};
