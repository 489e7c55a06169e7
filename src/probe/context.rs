//! Identifiers captured by listing steps and consumed by join steps.

use crate::types::{JoinTarget, RecordId};

/// Per-run state handed explicitly from listing steps to join steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    mission_id: Option<RecordId>,
    circle_id: Option<RecordId>,
}

impl RunContext {
    /// Store the id captured for a join target. The first capture wins.
    pub fn capture(&mut self, target: JoinTarget, id: RecordId) {
        let slot = match target {
            JoinTarget::Mission => &mut self.mission_id,
            JoinTarget::Circle => &mut self.circle_id,
        };
        if slot.is_none() {
            *slot = Some(id);
        }
    }

    pub fn id_for(&self, target: JoinTarget) -> Option<&RecordId> {
        match target {
            JoinTarget::Mission => self.mission_id.as_ref(),
            JoinTarget::Circle => self.circle_id.as_ref(),
        }
    }
}
