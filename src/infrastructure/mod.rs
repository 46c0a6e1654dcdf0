//! Infrastructure layer - Endpoint transport, services, logging and metrics

pub mod endpoint;
pub mod logging;
pub mod metrics;
pub mod services;
