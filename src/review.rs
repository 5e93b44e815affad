//! Human review of a candidate plan before it becomes the active one.

use thiserror::Error;

use crate::{
    models::{ExerciseEdit, Plan},
    planner::PlanSource,
    storage::ActivePlan,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("describe the changes you want")]
    EmptyInstructions,

    #[error("no day #{0} in this plan")]
    NoSuchDay(usize),

    #[error("day #{day} has no exercise #{exercise}")]
    NoSuchExercise { day: usize, exercise: usize },

    #[error("nothing to change; pass at least one field")]
    EmptyEdit,

    #[error("sets must be at least 1")]
    InvalidSets,
}

/// What approval did to the active plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub plan_id: String,
    /// Weekday labels used by more than one day; only the first of each is scheduled.
    pub duplicate_weekdays: Vec<String>,
    /// The plan has no days, so every session starts with no workout.
    pub no_training_days: bool,
}

/// A plan waiting for the user's verdict.
#[derive(Debug, Clone)]
pub struct PlanReview {
    pending: Plan,
}

impl PlanReview {
    pub fn new(candidate: Plan) -> Self {
        Self { pending: candidate }
    }

    pub fn plan(&self) -> &Plan {
        &self.pending
    }

    /// Replaces the active plan with the reviewed one.
    pub fn approve(self, active: &ActivePlan) -> Approval {
        let duplicate_weekdays = self.pending.duplicate_weekdays();
        if !duplicate_weekdays.is_empty() {
            tracing::warn!(days = ?duplicate_weekdays, "approved plan repeats weekdays");
        }
        let no_training_days = self.pending.days.is_empty();
        if no_training_days {
            tracing::warn!(plan = %self.pending.id, "approved plan has no training days");
        }
        let plan_id = self.pending.id.clone();
        active.set(self.pending);
        Approval {
            plan_id,
            duplicate_weekdays,
            no_training_days,
        }
    }

    /// Re-adapts the candidate from free text. The source never fails; at worst
    /// the candidate comes back unchanged.
    pub async fn modify(
        &mut self,
        source: &dyn PlanSource,
        instructions: &str,
    ) -> Result<(), ReviewError> {
        let instructions = instructions.trim();
        if instructions.is_empty() {
            return Err(ReviewError::EmptyInstructions);
        }
        self.pending = source.adapt(&self.pending, instructions).await;
        Ok(())
    }

    /// Edits one exercise in place. `day` and `exercise` are 1-based.
    pub fn edit_exercise(
        &mut self,
        day: usize,
        exercise: usize,
        edit: &ExerciseEdit,
    ) -> Result<(), ReviewError> {
        if edit.is_empty() {
            return Err(ReviewError::EmptyEdit);
        }
        if edit.sets == Some(0) {
            return Err(ReviewError::InvalidSets);
        }

        let d = day
            .checked_sub(1)
            .and_then(|i| self.pending.days.get_mut(i))
            .ok_or(ReviewError::NoSuchDay(day))?;
        let ex = exercise
            .checked_sub(1)
            .and_then(|i| d.exercises.get_mut(i))
            .ok_or(ReviewError::NoSuchExercise { day, exercise })?;

        edit.apply(ex);
        Ok(())
    }

    /// Drops the candidate; the active plan is untouched.
    pub fn reject(self) {
        tracing::info!(plan = %self.pending.id, "candidate plan discarded");
    }
}
