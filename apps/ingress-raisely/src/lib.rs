//! Raisely webhook ingress.
//!
//! Accepts Raisely donation, subscription and custom action webhooks on `/`
//! and forwards them to the Streamlabs alert API through
//! [`streamhook_core::Bridge`].

pub mod config;
pub mod cors;
pub mod reqid;
pub mod respond;
pub mod routes;

pub use config::ServiceConfig;
pub use cors::CorsPolicy;
pub use routes::{AppState, build_router};
