//! Durable goal ledger.
//!
//! Holds every goal (active and archived) in insertion order, newest
//! first, mirroring each mutation to the storage backend before
//! returning. The `0 <= current <= target` invariant is enforced by
//! clamping on every mutation -- out-of-range input saturates, it never
//! errors.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use creo_types::error::{GoalError, StorageError};
use creo_types::goal::{Goal, GoalDraft};

use crate::storage::StorageBackend;

/// Storage key for the goal ledger.
pub const GOALS_KEY: &str = "creo-goals";

/// Durable mapping from goal id to progress record.
pub struct GoalLedger<S: StorageBackend> {
    backend: S,
    goals: Vec<Goal>,
}

impl<S: StorageBackend> GoalLedger<S> {
    /// Load the ledger from the backend; malformed JSON fails open to an
    /// empty ledger (logged, never fatal).
    pub async fn load(backend: S) -> Result<Self, StorageError> {
        let goals = match backend.get(GOALS_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(goals) => goals,
                Err(e) => {
                    warn!(error = %e, "malformed goals payload, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Ok(Self { backend, goals })
    }

    /// Create a goal from a draft.
    ///
    /// Rejects an empty title or a non-positive/non-finite target. An empty
    /// unit falls back to `Units`. The new goal goes to the front of the
    /// ledger.
    pub async fn create(&mut self, draft: GoalDraft) -> Result<Goal, GoalError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(GoalError::EmptyTitle);
        }
        if !draft.target_value.is_finite() || draft.target_value <= 0.0 {
            return Err(GoalError::InvalidTarget(draft.target_value));
        }

        let unit = match draft.unit.trim() {
            "" => "Units".to_string(),
            unit => unit.to_string(),
        };
        let current = if draft.current_value.is_finite() {
            draft.current_value.clamp(0.0, draft.target_value)
        } else {
            0.0
        };

        let goal = Goal {
            id: Uuid::now_v7(),
            title: title.to_string(),
            platform: draft.platform,
            target_value: draft.target_value,
            current_value: current,
            unit,
            created_at: Utc::now(),
            archived_at: None,
        };

        self.goals.insert(0, goal.clone());
        self.flush().await?;
        info!(goal_id = %goal.id, platform = %goal.platform, "goal created");
        Ok(goal)
    }

    /// Set a goal's current value, clamped into `[0, target]`.
    /// Out-of-range input silently saturates.
    pub async fn update_progress(&mut self, id: Uuid, value: f64) -> Result<Goal, GoalError> {
        let goal = self.goal_mut(id)?;
        goal.current_value = if value.is_finite() {
            value.clamp(0.0, goal.target_value)
        } else {
            0.0
        };
        let updated = goal.clone();
        self.flush().await?;
        Ok(updated)
    }

    /// Archive a goal, stamping `archived_at` with the current time.
    /// Re-archiving restamps; callers should check state first.
    pub async fn archive(&mut self, id: Uuid) -> Result<Goal, GoalError> {
        let goal = self.goal_mut(id)?;
        goal.archived_at = Some(Utc::now());
        let archived = goal.clone();
        self.flush().await?;
        info!(goal_id = %id, "goal archived");
        Ok(archived)
    }

    /// Raise (or lower) a goal's target. The target must be positive and
    /// finite; the current value is re-clamped so the invariant holds.
    pub async fn retarget(&mut self, id: Uuid, new_target: f64) -> Result<Goal, GoalError> {
        if !new_target.is_finite() || new_target <= 0.0 {
            return Err(GoalError::InvalidTarget(new_target));
        }
        let goal = self.goal_mut(id)?;
        goal.target_value = new_target;
        goal.current_value = goal.current_value.min(new_target);
        let updated = goal.clone();
        self.flush().await?;
        Ok(updated)
    }

    /// Delete a goal record.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), GoalError> {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        if self.goals.len() == before {
            return Err(GoalError::NotFound);
        }
        self.flush().await?;
        Ok(())
    }

    /// All goals, newest first.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Look up a goal by id.
    pub fn get(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Unarchived goals, in ledger order.
    pub fn active(&self) -> Vec<&Goal> {
        self.goals.iter().filter(|g| !g.is_archived()).collect()
    }

    /// Archived goals, most recently archived first.
    pub fn archived(&self) -> Vec<&Goal> {
        let mut archived: Vec<&Goal> = self.goals.iter().filter(|g| g.is_archived()).collect();
        archived.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        archived
    }

    fn goal_mut(&mut self, id: Uuid) -> Result<&mut Goal, GoalError> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(GoalError::NotFound)
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.goals)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.set(GOALS_KEY, &raw).await
    }
}
