//! # Probe Steps
//!
//! The fixed, ordered catalogue of backend checks and the logic of each one.
//! Listing steps hand captured ids back as values; join steps receive them as
//! arguments and skip when nothing was captured.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api_clients::EcoverseApi;
use crate::error::{ProbeError, ProbeResult};
use crate::types::{
    json_kind, ActivityEncoding, Collection, JoinOutcome, JoinTarget, NewActivity, RecordId,
    UserProfile,
};

/// One check in the probe sequence. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    SyncUser,
    GetProfile,
    CreateActivity,
    ListActivities,
    ListMissions,
    JoinMission,
    ListShopItems,
    ListTours,
    ListCircles,
    JoinCircle,
    Leaderboard,
    CarbonCredits,
    ApiDocument,
}

impl StepId {
    /// Steps every run executes
    pub const CORE: [StepId; 10] = [
        StepId::SyncUser,
        StepId::GetProfile,
        StepId::CreateActivity,
        StepId::ListActivities,
        StepId::ListMissions,
        StepId::JoinMission,
        StepId::ListShopItems,
        StepId::ListTours,
        StepId::ListCircles,
        StepId::JoinCircle,
    ];

    /// Opt-in checks appended after the core sequence
    pub const EXTENDED: [StepId; 3] = [
        StepId::Leaderboard,
        StepId::CarbonCredits,
        StepId::ApiDocument,
    ];

    pub fn all() -> impl Iterator<Item = StepId> {
        Self::CORE.into_iter().chain(Self::EXTENDED)
    }

    pub fn name(self) -> &'static str {
        match self {
            StepId::SyncUser => "sync-user",
            StepId::GetProfile => "get-profile",
            StepId::CreateActivity => "create-activity",
            StepId::ListActivities => "list-activities",
            StepId::ListMissions => "list-missions",
            StepId::JoinMission => "join-mission",
            StepId::ListShopItems => "list-shop-items",
            StepId::ListTours => "list-tours",
            StepId::ListCircles => "list-circles",
            StepId::JoinCircle => "join-circle",
            StepId::Leaderboard => "leaderboard",
            StepId::CarbonCredits => "carbon-credits",
            StepId::ApiDocument => "api-document",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StepId::SyncUser => "POST /user/sync returns the fixture account",
            StepId::GetProfile => "GET /user/profile returns the fixture account",
            StepId::CreateActivity => "POST /activities accepts a new activity",
            StepId::ListActivities => "GET /activities is a non-empty list",
            StepId::ListMissions => "GET /missions is a non-empty list",
            StepId::JoinMission => "POST /missions/{id}/join joins or is already joined",
            StepId::ListShopItems => "GET /shop/items is a non-empty list",
            StepId::ListTours => "GET /tours is a non-empty list",
            StepId::ListCircles => "GET /circles is a non-empty list",
            StepId::JoinCircle => "POST /circles/{id}/join joins or is already joined",
            StepId::Leaderboard => "GET /user/leaderboard is a non-empty list",
            StepId::CarbonCredits => "GET /carbon/my-credits is a list",
            StepId::ApiDocument => "GET /docs.json is an OpenAPI document",
        }
    }

    /// Listing step whose captured id this step consumes
    pub fn depends_on(self) -> Option<StepId> {
        match self {
            StepId::JoinMission => Some(StepId::ListMissions),
            StepId::JoinCircle => Some(StepId::ListCircles),
            _ => None,
        }
    }

    pub fn is_extended(self) -> bool {
        Self::EXTENDED.contains(&self)
    }

    /// Join target whose captured id this step consumes
    pub fn joins(self) -> Option<JoinTarget> {
        match self {
            StepId::JoinMission => Some(JoinTarget::Mission),
            StepId::JoinCircle => Some(JoinTarget::Circle),
            _ => None,
        }
    }

    /// Join target whose id this listing step captures
    fn captures(self) -> Option<JoinTarget> {
        match self {
            StepId::ListMissions => Some(JoinTarget::Mission),
            StepId::ListCircles => Some(JoinTarget::Circle),
            _ => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepId {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        StepId::all()
            .find(|step| step.name() == wanted)
            .ok_or_else(|| {
                ProbeError::invalid_input(format!(
                    "Unknown step '{}' (known steps: {})",
                    s,
                    StepId::all().map(StepId::name).collect::<Vec<_>>().join(", ")
                ))
            })
    }
}

/// Which steps a run executes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSelection {
    pub extended: bool,
    /// When non-empty, only these steps run
    pub only: Vec<StepId>,
    pub skip: Vec<StepId>,
}

impl StepSelection {
    /// Steps in execution order, each paired with whether it is enabled.
    ///
    /// Extended steps appear only when requested, either through `extended`
    /// or by naming one in `only`.
    pub fn plan(&self) -> Vec<(StepId, bool)> {
        let include_extended = self.extended || self.only.iter().any(|s| s.is_extended());

        StepId::all()
            .filter(|step| include_extended || !step.is_extended())
            .map(|step| {
                let selected = self.only.is_empty() || self.only.contains(&step);
                (step, selected && !self.skip.contains(&step))
            })
            .collect()
    }
}

/// Inputs the steps check against
#[derive(Debug, Clone)]
pub struct StepInputs {
    pub expected_email: String,
    pub activity: NewActivity,
    pub encoding: ActivityEncoding,
}

/// Non-failing result of a step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    Passed {
        detail: String,
        captured: Option<(JoinTarget, RecordId)>,
    },
    Skipped {
        reason: String,
    },
}

impl StepOutput {
    fn passed(detail: impl Into<String>) -> Self {
        StepOutput::Passed {
            detail: detail.into(),
            captured: None,
        }
    }
}

/// Run a single step.
///
/// `captured` is the id recorded by the step's dependency, if any.
pub async fn execute<A>(
    step: StepId,
    api: &A,
    inputs: &StepInputs,
    captured: Option<&RecordId>,
) -> ProbeResult<StepOutput>
where
    A: EcoverseApi + ?Sized,
{
    match step {
        StepId::SyncUser => {
            let profile = api.sync_user().await?;
            check_email(&profile, &inputs.expected_email)?;
            Ok(StepOutput::passed(format!("synced {}", inputs.expected_email)))
        }
        StepId::GetProfile => {
            let profile = api.get_profile().await?;
            check_email(&profile, &inputs.expected_email)?;
            Ok(StepOutput::passed(format!("profile {}", inputs.expected_email)))
        }
        StepId::CreateActivity => {
            let status = api.create_activity(&inputs.activity, inputs.encoding).await?;
            Ok(StepOutput::passed(format!(
                "created '{}' ({}, {} encoded)",
                inputs.activity.title, status, inputs.encoding
            )))
        }
        StepId::ListActivities => list_step(api, Collection::Activities, None).await,
        StepId::ListMissions => list_step(api, Collection::Missions, step.captures()).await,
        StepId::ListShopItems => list_step(api, Collection::ShopItems, None).await,
        StepId::ListTours => list_step(api, Collection::Tours, None).await,
        StepId::ListCircles => list_step(api, Collection::Circles, step.captures()).await,
        StepId::JoinMission => join_step(api, JoinTarget::Mission, captured).await,
        StepId::JoinCircle => join_step(api, JoinTarget::Circle, captured).await,
        StepId::Leaderboard => list_step(api, Collection::Leaderboard, None).await,
        StepId::CarbonCredits => list_step(api, Collection::CarbonCredits, None).await,
        StepId::ApiDocument => {
            let document = api.api_document().await?;
            let path_count = check_api_document(&document)?;
            Ok(StepOutput::passed(format!("{} documented paths", path_count)))
        }
    }
}

fn check_email(profile: &UserProfile, expected: &str) -> ProbeResult<()> {
    match profile.email.as_deref() {
        Some(email) if email == expected => Ok(()),
        Some(email) => Err(ProbeError::field_mismatch("email", expected, email)),
        None => Err(ProbeError::MissingField("email".to_string())),
    }
}

async fn list_step<A>(
    api: &A,
    collection: Collection,
    capture: Option<JoinTarget>,
) -> ProbeResult<StepOutput>
where
    A: EcoverseApi + ?Sized,
{
    let records = api.list(collection).await?;
    if records.is_empty() && collection.requires_records() {
        return Err(ProbeError::EmptyCollection(collection.label().to_string()));
    }

    let captured = match (capture, records.first()) {
        (Some(target), Some(first)) => Some((target, RecordId::from_record(first)?)),
        _ => None,
    };

    let detail = match &captured {
        Some((target, id)) => format!(
            "{} {} (first {} {})",
            records.len(),
            collection.label(),
            target.label(),
            id
        ),
        None => format!("{} {}", records.len(), collection.label()),
    };

    Ok(StepOutput::Passed { detail, captured })
}

async fn join_step<A>(
    api: &A,
    target: JoinTarget,
    id: Option<&RecordId>,
) -> ProbeResult<StepOutput>
where
    A: EcoverseApi + ?Sized,
{
    let Some(id) = id else {
        return Ok(StepOutput::Skipped {
            reason: format!("no {} id available", target.label()),
        });
    };

    let detail = match api.join(target, id).await? {
        JoinOutcome::Joined { status } => format!("joined {} {} ({})", target.label(), id, status),
        JoinOutcome::AlreadyJoined => format!("{} {} already joined", target.label(), id),
    };
    Ok(StepOutput::passed(detail))
}

fn check_api_document(document: &Value) -> ProbeResult<usize> {
    let object = document
        .as_object()
        .ok_or_else(|| ProbeError::unexpected_shape("object", json_kind(document)))?;
    match object.get("paths") {
        Some(Value::Object(paths)) => Ok(paths.len()),
        Some(other) => Err(ProbeError::unexpected_shape(
            "object at 'paths'",
            json_kind(other),
        )),
        None => Err(ProbeError::MissingField("paths".to_string())),
    }
}
