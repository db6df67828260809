use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scheduler::BookingDate;

/// Reservation window in minutes-since-midnight notation used by the API.
pub const BOOKING_FROM: u16 = 900;
pub const BOOKING_TO: u16 = 1800;

const DEFAULT_TEMPLATE: &str = "Desk booking failed for {{ identity }}";

/// Shared settings from `conf.json`.
#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub slack_hook: String,
    #[serde(default)]
    pub slack_template: Option<TemplateSource>,
}

impl GeneralConfig {
    /// The configured notification template, or the built-in one when absent.
    pub fn template(&self) -> TemplateSource {
        self.slack_template
            .clone()
            .unwrap_or_else(|| TemplateSource::text(DEFAULT_TEMPLATE))
    }
}

/// `slack_template` is either a ready-made message or a JSON object whose
/// string values may reference `{{ identity }}` (or `{{.Identity}}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TemplateSource {
    Literal(String),
    Structured(Map<String, Value>),
}

impl TemplateSource {
    /// A structured `{"text": ...}` template.
    pub fn text(template: &str) -> Self {
        TemplateSource::Structured(Map::from_iter([(
            "text".to_string(),
            Value::from(template),
        )]))
    }
}

/// One user's credentials and desk, read from an authorization file.
/// Missing keys fall back to empty values; the API is left to reject them.
#[derive(Default, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub desk_id: String,
    #[serde(default)]
    pub space_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub excluding_days: Vec<i32>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("desk_id", &self.desk_id)
            .field("space_id", &self.space_id)
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .field("excluding_days", &self.excluding_days)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    pub day: String,
    #[serde(skip)]
    pub weekday: u8,
    pub from: u16,
    pub to: u16,
    pub desk_id: String,
    pub space_id: String,
}

impl BookingRequest {
    pub fn new(auth: &AuthConfig, date: &BookingDate) -> Self {
        Self {
            day: date.day.clone(),
            weekday: date.weekday,
            from: BOOKING_FROM,
            to: BOOKING_TO,
            desk_id: auth.desk_id.clone(),
            space_id: auth.space_id.clone(),
        }
    }
}
