//! Raisely to Streamlabs translation core.
//!
//! Holds the webhook wire types, the record-to-form mapping, the static
//! campaign token table, the Streamlabs client and the [`Bridge`] that ties
//! them together. HTTP serving lives in the ingress app.
pub mod bridge;
pub mod client;
pub mod mapping;
pub mod tenants;
pub mod types;

pub use bridge::{Bridge, BridgeConfig, BridgeError, EventKind, Outcome, Rejection};
pub use client::{AlertService, StreamlabsClient, UpstreamError};
pub use mapping::{AlertForm, DonationForm, PointsForm, display_name};
pub use tenants::CampaignTokens;
pub use types::{ActionRecord, InboundEnvelope, PlatformEvent, Supporter, SupporterRecord};
