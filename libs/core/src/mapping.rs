//! Raisely record to Streamlabs form mapping.

use serde::{Serialize, Serializer};

use crate::types::{ActionRecord, Supporter, SupporterRecord};

pub const ANONYMOUS_NAME: &str = "Someone";
pub const MAX_NAME_CHARS: usize = 25;

const SUBSCRIPTION_ALERT: &str = "subscription";
const ACTION_ALERT: &str = "follow";
const POINTS_PER_ACTION: u32 = 1;

/// Form posted to `/api/v1.0/donations`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DonationForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Major currency units.
    #[serde(serialize_with = "shortest_decimal")]
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub access_token: String,
}

/// Form posted to `/api/v1.0/alerts`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertForm {
    pub access_token: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

/// Form posted to `/api/v1.0/points/user_point_edit`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PointsForm {
    pub access_token: String,
    pub username: String,
    pub points: u32,
}

/// Name shown on stream for a donation or subscription.
///
/// Anonymous records always show [`ANONYMOUS_NAME`]. Otherwise the first
/// non-empty of preferred, first and full name is used, cut to
/// [`MAX_NAME_CHARS`] characters.
pub fn display_name(record: &SupporterRecord) -> String {
    if record.is_anonymous() {
        return ANONYMOUS_NAME.to_string();
    }
    record
        .user
        .as_ref()
        .and_then(first_name_candidate)
        .map(|name| name.chars().take(MAX_NAME_CHARS).collect())
        .unwrap_or_else(|| ANONYMOUS_NAME.to_string())
}

fn first_name_candidate(user: &Supporter) -> Option<&str> {
    [&user.preferred_name, &user.first_name, &user.full_name]
        .into_iter()
        .filter_map(|name| name.as_deref())
        .find(|name| !name.is_empty())
}

/// Converts minor currency units to major units.
pub fn major_units(minor: f64) -> f64 {
    minor / 100.0
}

pub fn donation_form(record: &SupporterRecord, access_token: &str) -> DonationForm {
    DonationForm {
        name: display_name(record),
        message: record.message.clone(),
        identifier: record.user.as_ref().and_then(|user| user.uuid.clone()),
        amount: major_units(record.amount),
        currency: record.currency.clone(),
        access_token: access_token.to_string(),
    }
}

pub fn subscription_alert(record: &SupporterRecord, access_token: &str) -> AlertForm {
    AlertForm {
        access_token: access_token.to_string(),
        kind: SUBSCRIPTION_ALERT.into(),
        message: format!("{} subscribed", display_name(record)),
        user_message: record.message.clone(),
    }
}

/// Both forms sent for a custom action: a point for the user, then an alert.
pub fn action_forms(action: &ActionRecord, access_token: &str) -> (PointsForm, AlertForm) {
    let points = PointsForm {
        access_token: access_token.to_string(),
        username: action.username.clone(),
        points: POINTS_PER_ACTION,
    };
    let alert = AlertForm {
        access_token: access_token.to_string(),
        kind: ACTION_ALERT.into(),
        message: action.message.clone(),
        user_message: None,
    };
    (points, alert)
}

// Display gives "20.5" for 20.5 and "20" for 20.0, matching what the
// alert overlay shows.
fn shortest_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
