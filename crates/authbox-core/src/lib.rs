//! Core wiring: configuration, inbound message types, and the per-message
//! extraction pipeline.

pub mod config;
pub mod email;
pub mod pipeline;

pub use config::Config;
pub use email::{Disposition, EmailRecord};
pub use pipeline::Pipeline;
