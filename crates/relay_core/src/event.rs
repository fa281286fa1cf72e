//! Webhook payload model.
//!
//! Deliveries are JSON objects tagged by a `type` string. Every nested field is
//! optional: the provider omits fields that do not apply to an event type and
//! adds new ones over time, so the model only requires the tag.
//!
//! ```json
//! {
//!   "type": "deployment.succeeded",
//!   "id": "evt_1",
//!   "createdAt": 1700000000000,
//!   "payload": {
//!     "deployment": { "name": "my-app", "url": "my-app.vercel.app", "target": "production" },
//!     "links": { "deployment": "https://vercel.com/acme/my-app/abc" }
//!   }
//! }
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

/// Event type tag.
///
/// Unrecognised tags are preserved in [`EventKind::Unknown`] so that new
/// upstream event types flow through the generic renderer instead of failing
/// deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    DeploymentCreated,
    DeploymentSucceeded,
    DeploymentError,
    DeploymentCanceled,
    DeploymentPromoted,
    ProjectCreated,
    ProjectRemoved,
    AttackDetected,
    Unknown(String),
}

impl EventKind {
    /// The wire tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::DeploymentCreated => "deployment.created",
            EventKind::DeploymentSucceeded => "deployment.succeeded",
            EventKind::DeploymentError => "deployment.error",
            EventKind::DeploymentCanceled => "deployment.canceled",
            EventKind::DeploymentPromoted => "deployment.promoted",
            EventKind::ProjectCreated => "project.created",
            EventKind::ProjectRemoved => "project.removed",
            EventKind::AttackDetected => "attack.detected",
            EventKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "deployment.created" => EventKind::DeploymentCreated,
            "deployment.succeeded" => EventKind::DeploymentSucceeded,
            "deployment.error" => EventKind::DeploymentError,
            "deployment.canceled" => EventKind::DeploymentCanceled,
            "deployment.promoted" => EventKind::DeploymentPromoted,
            "project.created" => EventKind::ProjectCreated,
            "project.removed" => EventKind::ProjectRemoved,
            "attack.detected" => EventKind::AttackDetected,
            _ => EventKind::Unknown(tag),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Unknown(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Event type tag
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Provider-assigned event identifier
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Time the event occurred, in milliseconds since the Unix epoch
    #[serde(
        default,
        deserialize_with = "lenient_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,

    /// Event-specific data
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub payload: EventPayload,
}

impl WebhookEvent {
    /// Event time as a UTC timestamp, if present and representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(DateTime::from_timestamp_millis)
    }
}

/// Event-specific data. Which fields are present depends on the event type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub deployment: Option<DeploymentInfo>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<ProjectInfo>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub links: Option<Links>,

    /// Deployment target at payload level (`production`, `preview`, ...)
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<String>,

    /// Project name at payload level
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<ErrorInfo>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub attack: Option<AttackInfo>,
}

impl EventPayload {
    /// Best available project name: project, then payload, then deployment.
    pub fn project_name(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or(self.name.as_deref())
            .or_else(|| self.deployment.as_ref().and_then(|d| d.name.as_deref()))
    }

    /// Deployment target, preferring the deployment's own field.
    pub fn target(&self) -> Option<&str> {
        self.deployment
            .as_ref()
            .and_then(|d| d.target.as_deref())
            .or(self.target.as_deref())
    }

    /// Public deployment URL, always with a scheme.
    pub fn deployment_url(&self) -> Option<String> {
        self.deployment
            .as_ref()
            .and_then(|d| d.url.as_deref())
            .filter(|url| !url.is_empty())
            .map(with_https_scheme)
    }

    /// Git branch the deployment was built from.
    pub fn branch(&self) -> Option<&str> {
        self.deployment
            .as_ref()
            .and_then(|d| d.meta.as_ref())
            .and_then(|m| m.github_commit_ref.as_deref())
    }

    /// Commit message of the deployed revision.
    pub fn commit_message(&self) -> Option<&str> {
        self.deployment
            .as_ref()
            .and_then(|d| d.meta.as_ref())
            .and_then(|m| m.github_commit_message.as_deref())
    }

    /// Domain aliases assigned to the deployment.
    pub fn aliases(&self) -> &[String] {
        self.deployment
            .as_ref()
            .map(|d| d.alias.as_slice())
            .unwrap_or_default()
    }

    /// Dashboard link for the deployment.
    pub fn inspector_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.deployment.as_deref())
            .or_else(|| {
                self.deployment
                    .as_ref()
                    .and_then(|d| d.inspector_url.as_deref())
            })
    }

    /// Dashboard link for the project.
    pub fn project_url(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.project.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// Deployment hostname, usually without a scheme
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<String>,

    #[serde(default, deserialize_with = "lenient_text_list")]
    pub alias: Vec<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub inspector_url: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta: Option<DeploymentMeta>,
}

/// Git metadata attached by the provider's Git integration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMeta {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_commit_ref: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_commit_message: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_commit_author_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_commit_sha: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
}

/// Dashboard links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub deployment: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<String>,
}

/// Failure details for `deployment.error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
}

/// Firewall details for `attack.detected`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackInfo {
    /// Attack classification, e.g. `ddos`
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,

    /// Mitigation applied by the firewall
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_ip: Option<String>,

    /// Request path targeted by the attack
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<String>,
}

fn with_https_scheme(url: &str) -> String {
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

// Optional fields of an unexpected shape read as absent instead of failing
// the whole payload. Only the `type` tag is strict.

/// Deserializes `T`, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

/// Like [`lenient`], falling back to `T::default()`.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a scalar as text; numbers and booleans are stringified.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Reads a list of scalars, skipping entries that are not scalars.
fn lenient_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    })
}

/// Reads epoch milliseconds from an integer, a float, a numeric string or an
/// RFC 3339 timestamp.
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|t| t.timestamp_millis())
            })
        }
        _ => None,
    })
}
