//! Routes a Raisely webhook to the matching Streamlabs call(s).

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::info;

use crate::client::{AlertService, UpstreamError};
use crate::mapping::{action_forms, donation_form, subscription_alert};
use crate::tenants::CampaignTokens;
use crate::types::{
    ACTION_TAKEN, ActionRecord, DONATION_SUCCEEDED, InboundEnvelope, PlatformEvent,
    SUBSCRIPTION_SUCCEEDED, SupporterRecord,
};

#[derive(Clone)]
pub struct BridgeConfig {
    pub shared_secret: String,
    pub campaigns: CampaignTokens,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("shared_secret", &"<redacted>")
            .field("campaigns", &self.campaigns.campaigns().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Donation,
    Subscription,
    Action,
}

impl EventKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            DONATION_SUCCEEDED => Some(Self::Donation),
            SUBSCRIPTION_SUCCEEDED => Some(Self::Subscription),
            ACTION_TAKEN => Some(Self::Action),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donation => DONATION_SUCCEEDED,
            Self::Subscription => SUBSCRIPTION_SUCCEEDED,
            Self::Action => ACTION_TAKEN,
        }
    }
}

/// Expected anomalies. They are answered with a normal response so the
/// webhook sender does not retry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidAuth,
    UnknownCampaign(String),
    UnknownEvent(String),
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::UnknownCampaign(_) => "unknown_campaign",
            Self::UnknownEvent(_) => "unknown_event",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAuth => f.write_str("invalid auth"),
            Self::UnknownCampaign(campaign) => write!(f, "Campaign unknown {campaign}"),
            Self::UnknownEvent(kind) => write!(f, "unknown event {kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Forwarded { event: EventKind, response: Value },
    Rejected(Rejection),
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

pub struct Bridge {
    config: BridgeConfig,
    alerts: Arc<dyn AlertService>,
}

impl Bridge {
    pub fn new(config: BridgeConfig, alerts: Arc<dyn AlertService>) -> Self {
        Self { config, alerts }
    }

    /// Authenticates, resolves the campaign and forwards the event.
    ///
    /// Rejections come back as `Ok(Outcome::Rejected(_))`; only undecodable
    /// records and upstream failures are errors.
    pub async fn handle(&self, envelope: InboundEnvelope) -> Result<Outcome, BridgeError> {
        if !self.authenticate(envelope.secret.as_deref()) {
            return Ok(Outcome::Rejected(Rejection::InvalidAuth));
        }

        let data = envelope
            .data
            .ok_or_else(|| BridgeError::InvalidPayload("missing event data".into()))?;
        let event: PlatformEvent = serde_json::from_value(data)
            .map_err(|err| BridgeError::InvalidPayload(format!("event: {err}")))?;

        let campaign = event.campaign_id();
        let Some(token) = self.config.campaigns.token_for(campaign) else {
            return Ok(Outcome::Rejected(Rejection::UnknownCampaign(
                campaign.to_string(),
            )));
        };

        info!(
            event_type = %event.kind,
            source = %event.source,
            campaign,
            "event received"
        );

        let Some(kind) = EventKind::parse(&event.kind) else {
            return Ok(Outcome::Rejected(Rejection::UnknownEvent(event.kind.clone())));
        };

        let response = match kind {
            EventKind::Donation => self.forward_donation(&event, campaign, token).await?,
            EventKind::Subscription => self.forward_subscription(&event, campaign, token).await?,
            EventKind::Action => self.forward_action(&event, campaign, token).await?,
        };

        Ok(Outcome::Forwarded {
            event: kind,
            response,
        })
    }

    fn authenticate(&self, provided: Option<&str>) -> bool {
        match provided {
            Some(secret) if !secret.is_empty() => secret
                .as_bytes()
                .ct_eq(self.config.shared_secret.as_bytes())
                .into(),
            _ => false,
        }
    }

    async fn forward_donation(
        &self,
        event: &PlatformEvent,
        campaign: &str,
        token: &str,
    ) -> Result<Value, BridgeError> {
        let donation: SupporterRecord = decode_record(event)?;
        info!(
            donation = donation.uuid.as_deref().unwrap_or_default(),
            campaign, "donation processing"
        );
        let form = donation_form(&donation, token);
        Ok(self.alerts.create_donation(&form).await?)
    }

    async fn forward_subscription(
        &self,
        event: &PlatformEvent,
        campaign: &str,
        token: &str,
    ) -> Result<Value, BridgeError> {
        let subscription: SupporterRecord = decode_record(event)?;
        info!(
            subscription = subscription.uuid.as_deref().unwrap_or_default(),
            campaign, "subscription processing"
        );
        let form = subscription_alert(&subscription, token);
        Ok(self.alerts.create_alert(&form).await?)
    }

    /// Points and alert go out together; the first failure fails the action.
    async fn forward_action(
        &self,
        event: &PlatformEvent,
        campaign: &str,
        token: &str,
    ) -> Result<Value, BridgeError> {
        let action: ActionRecord = decode_record(event)?;
        info!(
            action = action.name.as_deref().unwrap_or_default(),
            user = %action.username,
            campaign,
            "action processing"
        );
        let (points, alert) = action_forms(&action, token);
        let (points_res, alert_res) = tokio::try_join!(
            self.alerts.edit_user_points(&points),
            self.alerts.create_alert(&alert),
        )?;
        Ok(Value::Array(vec![points_res, alert_res]))
    }
}

fn decode_record<T: DeserializeOwned>(event: &PlatformEvent) -> Result<T, BridgeError> {
    serde_json::from_value(event.data.clone())
        .map_err(|err| BridgeError::InvalidPayload(format!("{} record: {err}", event.kind)))
}
