//! Wire types for Raisely webhook deliveries.
//!
//! Everything is decoded leniently: a webhook with a missing secret must be
//! reported as an auth failure, not rejected by the JSON decoder.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DONATION_SUCCEEDED: &str = "donation.succeeded";
pub const SUBSCRIPTION_SUCCEEDED: &str = "subscription.succeeded";
pub const ACTION_TAKEN: &str = "action.taken";

/// Body of an inbound webhook: the shared secret plus the still-encoded
/// platform event. The event is only decoded once the secret has been
/// checked, so a malformed event can never mask a valid secret.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct InboundEnvelope {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl InboundEnvelope {
    /// Decodes a raw request body. Anything that is not a JSON object
    /// decodes to an empty envelope, which then fails authentication. A
    /// non-string `secret` counts as missing.
    pub fn from_slice(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "webhook body is not valid JSON");
                return Self::default();
            }
        };
        Self {
            secret: value.get("secret").and_then(Value::as_str).map(str::to_string),
            data: value.get("data").filter(|data| !data.is_null()).cloned(),
        }
    }

    /// Event `type` as sent, without decoding the rest of the event.
    pub fn event_type(&self) -> Option<&str> {
        self.data.as_ref()?.get("type")?.as_str()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PlatformEvent {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// `"<kind>:<uuid>"`, e.g. `campaign:830a1280-...`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default)]
    pub data: Value,
}

impl PlatformEvent {
    /// Campaign id carried in `source`: the segment after the first colon.
    pub fn campaign_id(&self) -> &str {
        self.source.split(':').nth(1).unwrap_or_default()
    }
}

/// Raisely user attached to a donation or subscription.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supporter {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Donation or subscription record (`data.data` for both event types).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupporterRecord {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub user: Option<Supporter>,
    /// Minor currency units (cents).
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: Option<bool>,
}

impl SupporterRecord {
    pub fn is_anonymous(&self) -> bool {
        self.anonymous.unwrap_or(false)
    }
}

/// Custom event fired from the browser with the shared secret.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ActionRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

// Raisely sends explicit nulls for unset fields; treat them like absent ones.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn campaign_id_is_second_source_segment() {
        let event = PlatformEvent {
            source: "campaign:830a1280-6e17-11ea-858b-f7d7d2f43749".into(),
            ..Default::default()
        };
        assert_eq!(event.campaign_id(), "830a1280-6e17-11ea-858b-f7d7d2f43749");
    }

    #[test]
    fn campaign_id_ignores_trailing_segments() {
        let event = PlatformEvent {
            source: "campaign:abc:extra".into(),
            ..Default::default()
        };
        assert_eq!(event.campaign_id(), "abc");
    }

    #[test]
    fn campaign_id_empty_without_colon() {
        let event = PlatformEvent {
            source: "campaign".into(),
            ..Default::default()
        };
        assert_eq!(event.campaign_id(), "");
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let env = InboundEnvelope::from_slice(br#"{"data":{"type":"donation.succeeded"}}"#);
        assert!(env.secret.is_none());
        assert_eq!(env.event_type(), Some("donation.succeeded"));
    }

    #[test]
    fn secret_survives_a_malformed_event() {
        let env = InboundEnvelope::from_slice(
            br#"{"secret":"sh!","data":{"type":null,"source":7,"data":[]}}"#,
        );
        assert_eq!(env.secret.as_deref(), Some("sh!"));
        assert!(env.data.is_some());
        assert_eq!(env.event_type(), None);
    }

    #[test]
    fn non_string_secret_counts_as_missing() {
        let env = InboundEnvelope::from_slice(br#"{"secret":42,"data":null}"#);
        assert!(env.secret.is_none());
        assert!(env.data.is_none());
    }

    #[test]
    fn null_event_fields_decode_as_empty() {
        let event: PlatformEvent =
            serde_json::from_value(json!({ "type": null, "source": null })).unwrap();
        assert_eq!(event.kind, "");
        assert_eq!(event.campaign_id(), "");
    }

    #[test]
    fn garbage_body_decodes_to_empty_envelope() {
        assert_eq!(InboundEnvelope::from_slice(b"not json"), InboundEnvelope::default());
    }

    #[test]
    fn supporter_record_reads_camel_case() {
        let record: SupporterRecord = serde_json::from_value(json!({
            "uuid": "d-1",
            "user": {"preferredName": "Al", "firstName": "Alexandria", "uuid": "u-1"},
            "amount": 2050,
            "currency": "AUD",
            "anonymous": true
        }))
        .unwrap();
        let user = record.user.as_ref().unwrap();
        assert_eq!(user.preferred_name.as_deref(), Some("Al"));
        assert_eq!(record.amount, 2050.0);
        assert!(record.is_anonymous());
        assert!(record.message.is_none());
    }

    #[test]
    fn supporter_record_accepts_nulls() {
        let record: SupporterRecord = serde_json::from_value(json!({
            "uuid": "d-2",
            "user": null,
            "amount": 500,
            "anonymous": null
        }))
        .unwrap();
        assert!(record.user.is_none());
        assert!(!record.is_anonymous());
    }

    #[test]
    fn null_amount_and_message_fall_back_to_defaults() {
        let record: SupporterRecord =
            serde_json::from_value(json!({ "uuid": "d-3", "amount": null })).unwrap();
        assert_eq!(record.amount, 0.0);

        let action: ActionRecord =
            serde_json::from_value(json!({ "username": "Alexandria", "message": null }))
                .unwrap();
        assert_eq!(action.message, "");
    }
}
