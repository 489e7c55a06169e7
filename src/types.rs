//! # Wire Types
//!
//! Request and response shapes exchanged with the EcoVerse backend, plus the
//! small vocabulary (collections, join targets) the probe steps are built from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProbeError, ProbeResult};

/// Account record returned by the sync and profile endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remaining fields, kept for diagnostics
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Activity submission fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "co2Saved")]
    pub co2_saved: f64,
}

/// How the activity fields are put on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityEncoding {
    /// `application/x-www-form-urlencoded`
    #[default]
    Form,
    /// `multipart/form-data` with text parts only
    Multipart,
    /// `application/json`
    Json,
}

impl fmt::Display for ActivityEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityEncoding::Form => write!(f, "form"),
            ActivityEncoding::Multipart => write!(f, "multipart"),
            ActivityEncoding::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ActivityEncoding {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" | "urlencoded" => Ok(ActivityEncoding::Form),
            "multipart" => Ok(ActivityEncoding::Multipart),
            "json" => Ok(ActivityEncoding::Json),
            other => Err(ProbeError::invalid_input(format!(
                "Unknown activity encoding '{other}' (expected form, multipart or json)"
            ))),
        }
    }
}

/// Identifier of a record captured from a listing
///
/// The backend may hand out string or numeric ids; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the `id` field of a JSON record
    ///
    /// An empty string cannot address a record and is rejected.
    pub fn from_record(record: &Value) -> ProbeResult<Self> {
        match record.get("id") {
            Some(Value::String(id)) if id.is_empty() => {
                Err(ProbeError::unexpected_shape("non-empty id", "empty string"))
            }
            Some(Value::String(id)) => Ok(Self(id.clone())),
            Some(Value::Number(id)) => Ok(Self(id.to_string())),
            Some(other) => Err(ProbeError::unexpected_shape(
                "string or number id",
                json_kind(other),
            )),
            None => Err(ProbeError::MissingField("id".to_string())),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// List endpoints the probe reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Activities,
    Missions,
    ShopItems,
    Tours,
    Circles,
    Leaderboard,
    CarbonCredits,
}

impl Collection {
    /// Path relative to the API base
    pub fn path(self) -> &'static str {
        match self {
            Collection::Activities => "activities",
            Collection::Missions => "missions",
            Collection::ShopItems => "shop/items",
            Collection::Tours => "tours",
            Collection::Circles => "circles",
            Collection::Leaderboard => "user/leaderboard",
            Collection::CarbonCredits => "carbon/my-credits",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Activities => "activities",
            Collection::Missions => "missions",
            Collection::ShopItems => "shop items",
            Collection::Tours => "tours",
            Collection::Circles => "circles",
            Collection::Leaderboard => "leaderboard entries",
            Collection::CarbonCredits => "carbon credits",
        }
    }

    /// Whether an empty listing counts as a failure
    pub fn requires_records(self) -> bool {
        !matches!(self, Collection::CarbonCredits)
    }
}

/// Joinable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinTarget {
    Mission,
    Circle,
}

impl JoinTarget {
    /// Collection segment the join endpoint lives under
    pub fn collection(self) -> &'static str {
        match self {
            JoinTarget::Mission => "missions",
            JoinTarget::Circle => "circles",
        }
    }

    /// Path segments of the join endpoint, id kept as a single segment
    pub fn path_segments(self, id: &RecordId) -> [&str; 3] {
        [self.collection(), id.as_str(), "join"]
    }

    /// Lowercase body marker identifying a repeated join
    pub fn already_marker(self) -> &'static str {
        match self {
            JoinTarget::Mission => "already joined",
            JoinTarget::Circle => "already",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JoinTarget::Mission => "mission",
            JoinTarget::Circle => "circle",
        }
    }

    /// Map a join response onto an outcome
    ///
    /// 200/201 join; a 400 whose body carries the marker is a repeat join;
    /// anything else is an unexpected status.
    pub fn classify(self, status: u16, body: &str) -> ProbeResult<JoinOutcome> {
        match status {
            200 | 201 => Ok(JoinOutcome::Joined { status }),
            400 if body.to_lowercase().contains(self.already_marker()) => {
                Ok(JoinOutcome::AlreadyJoined)
            }
            _ => Err(ProbeError::unexpected_status(status, JOIN_SUCCESS, body)),
        }
    }
}

/// Status codes a join may succeed with
pub const JOIN_SUCCESS: &[u16] = &[200, 201];

/// Result of a join call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined { status: u16 },
    AlreadyJoined,
}

/// Short name of a JSON value's type, for shape errors
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
