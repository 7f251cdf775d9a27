//! EduNexus course marketplace backend.
//!
//! Hexagonal layout: [`domain`] holds entities, services, and ports;
//! [`inbound`] adapts HTTP requests onto the driving ports; [`outbound`]
//! implements the driven ports over PostgreSQL, Redis, and in-memory
//! stores. [`wiring`] composes them for the server binary.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
mod test_support;
pub mod wiring;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
