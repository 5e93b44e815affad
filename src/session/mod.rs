//! Live workout session for today's training day.
//!
//! [`WorkoutSession`] owns every piece of session-scoped state (position, set
//! counter, rest countdown, recorded sets) and is driven by discrete events:
//! user actions and rest ticks. Nothing here performs I/O; the only rejectable
//! action is [`WorkoutSession::record_set`].

pub mod clock;
pub mod timer;

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local};
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::{Exercise, Plan},
    utils::{leading_number, parse_rest_seconds, weekday_name},
};

pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::{IntervalTicker, ManualTicker, TickScheduler, TickToken};

pub const DEFAULT_CUES: [&str; 4] = [
    "Maintain proper form throughout the movement",
    "Control the weight on both concentric and eccentric phases",
    "Breathe properly during the exercise",
    "Focus on the target muscle groups",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// No plan day matches today. Only exit is meaningful.
    NoWorkoutToday,
    Exercising,
    Resting { remaining: u32, paused: bool },
    Complete,
}

/// Plan exercise normalised for the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionExercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub weight: String,
    pub rest_seconds: u32,
    pub muscle_groups: Vec<String>,
    pub instructions: Vec<String>,
}

impl SessionExercise {
    fn from_plan(position: usize, ex: &Exercise) -> Self {
        let notes = ex.notes.trim();
        let instructions = if notes.is_empty() {
            DEFAULT_CUES.iter().map(|c| c.to_string()).collect()
        } else {
            vec![notes.to_string()]
        };

        Self {
            id: (position + 1).to_string(),
            name: ex.name.clone(),
            sets: ex.sets.max(1),
            reps: ex.reps.clone(),
            weight: ex.weight.clone(),
            rest_seconds: parse_rest_seconds(&ex.rest_time),
            muscle_groups: ex.muscle_groups.clone(),
            instructions,
        }
    }

    pub fn has_fixed_weight(&self) -> bool {
        !self.weight.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletedSet {
    pub reps: u32,
    pub weight: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetRejected {
    #[error("enter the reps you completed")]
    MissingReps,

    #[error("enter the weight you used")]
    MissingWeight,

    #[error("reps must be a whole number, got `{0}`")]
    InvalidReps(String),

    #[error("no set is waiting to be recorded")]
    NotExercising,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// More sets to go; rest countdown started for `seconds`.
    Resting { seconds: u32 },
    /// Moved on to the exercise at `index`.
    NextExercise { index: usize },
    /// Last set of the last exercise recorded.
    Complete { elapsed_minutes: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token, paused, or not resting.
    Ignored,
    Counting { remaining: u32 },
    RestFinished,
}

pub struct WorkoutSession<S: TickScheduler, C: Clock> {
    day_name: Option<String>,
    exercises: Vec<SessionExercise>,
    index: usize,
    set: u32,
    state: SessionState,
    reps_input: String,
    weight_input: String,
    completed: HashMap<String, Vec<CompletedSet>>,
    started_at: DateTime<Local>,
    rest_token: Option<TickToken>,
    scheduler: S,
    clock: C,
}

impl<S: TickScheduler, C: Clock> WorkoutSession<S, C> {
    /// Opens a session on the first plan day whose weekday is today's.
    pub fn start(plan: &Plan, clock: C, scheduler: S) -> Self {
        let started_at = clock.now();
        let today = weekday_name(started_at.weekday());

        let (day_name, exercises) = match plan.day_for(today) {
            Some(day) => (
                Some(day.name.clone()),
                day.exercises
                    .iter()
                    .enumerate()
                    .map(|(i, ex)| SessionExercise::from_plan(i, ex))
                    .collect::<Vec<_>>(),
            ),
            None => (None, Vec::new()),
        };

        let state = if exercises.is_empty() {
            tracing::info!(weekday = today, "no workout scheduled today");
            SessionState::NoWorkoutToday
        } else {
            tracing::info!(
                weekday = today,
                day = day_name.as_deref().unwrap_or_default(),
                exercises = exercises.len(),
                "session started"
            );
            SessionState::Exercising
        };

        let weight_input = exercises
            .first()
            .map(|e| e.weight.clone())
            .unwrap_or_default();

        Self {
            day_name,
            exercises,
            index: 0,
            set: 1,
            state,
            reps_input: String::new(),
            weight_input,
            completed: HashMap::new(),
            started_at,
            rest_token: None,
            scheduler,
            clock,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn day_name(&self) -> Option<&str> {
        self.day_name.as_deref()
    }

    pub fn exercises(&self) -> &[SessionExercise] {
        &self.exercises
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_exercise(&self) -> Option<&SessionExercise> {
        match self.state {
            SessionState::NoWorkoutToday => None,
            _ => self.exercises.get(self.index),
        }
    }

    pub fn current_set(&self) -> u32 {
        self.set
    }

    pub fn completed_sets(&self, exercise_id: &str) -> &[CompletedSet] {
        self.completed
            .get(exercise_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn reps_input(&self) -> &str {
        &self.reps_input
    }

    pub fn weight_input(&self) -> &str {
        &self.weight_input
    }

    pub fn set_reps_input(&mut self, reps: impl Into<String>) {
        self.reps_input = reps.into();
    }

    pub fn set_weight_input(&mut self, weight: impl Into<String>) {
        self.weight_input = weight.into();
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Manual rest is only offered once the first set is done.
    pub fn can_start_rest(&self) -> bool {
        self.state == SessionState::Exercising && self.set > 1
    }

    pub fn elapsed_minutes(&self) -> u32 {
        let secs = (self.clock.now() - self.started_at).num_seconds().max(0);
        (secs / 60) as u32
    }

    /// Share of the workout done, 0..=100. Moving back lowers it.
    pub fn progress_percent(&self) -> f64 {
        let Some(ex) = self.current_exercise() else {
            return 0.0;
        };
        let total = self.exercises.len() as f64;
        let fraction = (self.index as f64 + self.set as f64 / ex.sets as f64) / total;
        fraction * 100.0
    }

    pub fn record_set(&mut self) -> Result<SetOutcome, SetRejected> {
        if self.state != SessionState::Exercising {
            return Err(SetRejected::NotExercising);
        }
        let Some(ex) = self.exercises.get(self.index) else {
            return Err(SetRejected::NotExercising);
        };

        let reps_text = self.reps_input.trim();
        if reps_text.is_empty() {
            return Err(SetRejected::MissingReps);
        }
        if ex.has_fixed_weight() && self.weight_input.trim().is_empty() {
            return Err(SetRejected::MissingWeight);
        }
        let reps: u32 = reps_text
            .parse()
            .map_err(|_| SetRejected::InvalidReps(reps_text.to_string()))?;

        let record = CompletedSet {
            reps,
            weight: leading_number(&self.weight_input).unwrap_or(0.0),
        };
        let target_sets = ex.sets;
        let has_fixed_weight = ex.has_fixed_weight();
        let id = ex.id.clone();
        self.completed.entry(id.clone()).or_default().push(record);
        tracing::debug!(exercise = %id, set = self.set, reps, weight = record.weight, "set recorded");

        if self.set < target_sets {
            self.set += 1;
            self.reps_input.clear();
            if !has_fixed_weight {
                self.weight_input.clear();
            }
            let seconds = self.begin_rest();
            return Ok(SetOutcome::Resting { seconds });
        }

        if self.index + 1 < self.exercises.len() {
            self.go_to(self.index + 1);
            return Ok(SetOutcome::NextExercise { index: self.index });
        }

        self.stop_rest();
        self.state = SessionState::Complete;
        let elapsed_minutes = self.elapsed_minutes();
        tracing::info!(elapsed_minutes, "session complete");
        Ok(SetOutcome::Complete { elapsed_minutes })
    }

    /// One second of rest has passed.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if self.rest_token != Some(token) {
            return TickOutcome::Ignored;
        }
        let SessionState::Resting {
            remaining,
            paused: false,
        } = self.state
        else {
            return TickOutcome::Ignored;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.stop_rest();
            self.state = SessionState::Exercising;
            TickOutcome::RestFinished
        } else {
            self.state = SessionState::Resting {
                remaining,
                paused: false,
            };
            TickOutcome::Counting { remaining }
        }
    }

    /// Flips the countdown between running and paused. Returns the new paused
    /// flag, or `None` when not resting.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        let SessionState::Resting { remaining, paused } = self.state else {
            return None;
        };

        if paused {
            self.rest_token = Some(self.scheduler.start());
        } else {
            self.stop_rest();
        }
        self.state = SessionState::Resting {
            remaining,
            paused: !paused,
        };
        Some(!paused)
    }

    pub fn skip_rest(&mut self) -> bool {
        if !matches!(self.state, SessionState::Resting { .. }) {
            return false;
        }
        self.stop_rest();
        self.state = SessionState::Exercising;
        true
    }

    /// Restarts the countdown from the exercise's rest time.
    pub fn start_rest(&mut self) -> Option<u32> {
        if !self.can_start_rest() {
            return None;
        }
        Some(self.begin_rest())
    }

    pub fn next_exercise(&mut self) -> bool {
        if !self.can_navigate() || self.index + 1 >= self.exercises.len() {
            return false;
        }
        self.go_to(self.index + 1);
        true
    }

    pub fn previous_exercise(&mut self) -> bool {
        if !self.can_navigate() || self.index == 0 {
            return false;
        }
        self.go_to(self.index - 1);
        true
    }

    /// Abandons the session. Nothing is kept.
    pub fn exit(mut self) {
        self.stop_rest();
        tracing::info!(
            state = ?self.state,
            elapsed_minutes = self.elapsed_minutes(),
            "session exited"
        );
    }

    fn can_navigate(&self) -> bool {
        matches!(
            self.state,
            SessionState::Exercising | SessionState::Resting { .. }
        )
    }

    fn go_to(&mut self, index: usize) {
        self.stop_rest();
        self.index = index;
        self.set = 1;
        self.reps_input.clear();
        self.weight_input = self.exercises[index].weight.clone();
        self.state = SessionState::Exercising;
    }

    fn begin_rest(&mut self) -> u32 {
        let seconds = self.exercises[self.index].rest_seconds;
        self.rest_token = Some(self.scheduler.start());
        self.state = SessionState::Resting {
            remaining: seconds,
            paused: false,
        };
        seconds
    }

    fn stop_rest(&mut self) {
        if self.rest_token.take().is_some() {
            self.scheduler.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;
    use chrono::{Duration, TimeZone};

    // 2024-06-03 was a Monday.
    fn monday() -> ManualClock {
        ManualClock::at(Local.with_ymd_and_hms(2024, 6, 3, 18, 0, 0).unwrap())
    }

    fn ex(name: &str, sets: u32, weight: &str, rest: &str) -> Exercise {
        Exercise {
            name: name.into(),
            sets,
            reps: "8-10".into(),
            weight: weight.into(),
            rest_time: rest.into(),
            notes: String::new(),
            muscle_groups: vec!["chest".into()],
        }
    }

    fn plan(weekday: &str, exercises: Vec<Exercise>) -> Plan {
        Plan {
            id: "p1".into(),
            name: "Test".into(),
            duration: "4 weeks".into(),
            days: vec![Day {
                day: weekday.into(),
                name: "Push".into(),
                exercises,
                duration: 45,
            }],
            goals: vec![],
            notes: String::new(),
        }
    }

    fn session(p: &Plan) -> WorkoutSession<ManualTicker, ManualClock> {
        WorkoutSession::start(p, monday(), ManualTicker::default())
    }

    fn tick_n(s: &mut WorkoutSession<ManualTicker, ManualClock>, n: u32) -> TickOutcome {
        let mut last = TickOutcome::Ignored;
        for _ in 0..n {
            let token = s.scheduler().current().unwrap();
            last = s.tick(token);
        }
        last
    }

    #[test]
    fn starts_on_first_exercise_when_today_matches() {
        let s = session(&plan("Monday", vec![ex("Push-ups", 3, "", "60 seconds")]));

        assert_eq!(s.state(), SessionState::Exercising);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.current_set(), 1);
        assert!(s.completed_sets("1").is_empty());
        assert_eq!(s.day_name(), Some("Push"));
        assert_eq!(s.exercises()[0].instructions.len(), 4);
    }

    #[test]
    fn no_workout_when_no_day_matches() {
        let mut s = session(&plan("Tuesday", vec![ex("Push-ups", 3, "", "60 seconds")]));

        assert_eq!(s.state(), SessionState::NoWorkoutToday);
        assert!(s.current_exercise().is_none());
        assert_eq!(s.record_set(), Err(SetRejected::NotExercising));
        assert!(!s.next_exercise());
        assert_eq!(s.toggle_pause(), None);
        assert_eq!(s.progress_percent(), 0.0);
        s.exit();
    }

    #[test]
    fn record_set_starts_rest() {
        let mut s = session(&plan("Monday", vec![ex("Push-ups", 3, "", "90 seconds")]));
        s.set_reps_input("10");

        assert_eq!(s.record_set(), Ok(SetOutcome::Resting { seconds: 90 }));
        assert_eq!(
            s.state(),
            SessionState::Resting {
                remaining: 90,
                paused: false
            }
        );
        assert_eq!(s.current_set(), 2);
        assert_eq!(s.completed_sets("1"), [CompletedSet { reps: 10, weight: 0.0 }]);
        assert_eq!(s.reps_input(), "");
        assert!(s.scheduler().is_active());
    }

    #[test]
    fn missing_inputs_are_rejected_without_change() {
        let mut s = session(&plan("Monday", vec![ex("Bench", 3, "60kg", "2 minutes")]));
        assert_eq!(s.weight_input(), "60kg");

        assert_eq!(s.record_set(), Err(SetRejected::MissingReps));
        s.set_reps_input("8");
        s.set_weight_input("  ");
        assert_eq!(s.record_set(), Err(SetRejected::MissingWeight));
        s.set_reps_input("eight");
        s.set_weight_input("62.5kg");
        assert_eq!(s.record_set(), Err(SetRejected::InvalidReps("eight".into())));

        assert_eq!(s.state(), SessionState::Exercising);
        assert_eq!(s.current_set(), 1);
        assert!(s.completed_sets("1").is_empty());

        s.set_reps_input("8");
        s.record_set().unwrap();
        assert_eq!(s.completed_sets("1")[0].weight, 62.5);
        // fixed-weight exercises keep the weight input between sets
        assert_eq!(s.weight_input(), "62.5kg");
    }

    #[test]
    fn final_set_advances_then_completes() {
        let mut s = session(&plan(
            "Monday",
            vec![ex("A", 2, "", "1 minute"), ex("B", 1, "Bodyweight", "")],
        ));

        s.set_reps_input("5");
        s.record_set().unwrap();
        s.skip_rest();
        s.set_reps_input("5");
        assert_eq!(s.record_set(), Ok(SetOutcome::NextExercise { index: 1 }));
        assert_eq!(s.current_set(), 1);
        assert_eq!(s.weight_input(), "Bodyweight");

        s.set_reps_input("12");
        assert_eq!(s.record_set(), Ok(SetOutcome::Complete { elapsed_minutes: 0 }));
        assert_eq!(s.state(), SessionState::Complete);
        assert_eq!(s.progress_percent(), 100.0);
        assert_eq!(s.record_set(), Err(SetRejected::NotExercising));
    }

    #[test]
    fn countdown_reaches_zero_after_n_ticks() {
        let mut s = session(&plan("Monday", vec![ex("A", 2, "", "5 seconds")]));
        s.set_reps_input("5");
        s.record_set().unwrap();

        assert_eq!(tick_n(&mut s, 4), TickOutcome::Counting { remaining: 1 });
        assert_eq!(tick_n(&mut s, 1), TickOutcome::RestFinished);
        assert_eq!(s.state(), SessionState::Exercising);
        assert!(!s.scheduler().is_active());
    }

    #[test]
    fn pause_preserves_remaining_and_drops_stale_ticks() {
        let mut s = session(&plan("Monday", vec![ex("A", 2, "", "10 seconds")]));
        s.set_reps_input("5");
        s.record_set().unwrap();
        tick_n(&mut s, 3);

        let stale = s.scheduler().current().unwrap();
        assert_eq!(s.toggle_pause(), Some(true));
        assert!(!s.scheduler().is_active());
        for _ in 0..20 {
            assert_eq!(s.tick(stale), TickOutcome::Ignored);
        }
        assert_eq!(
            s.state(),
            SessionState::Resting {
                remaining: 7,
                paused: true
            }
        );

        assert_eq!(s.toggle_pause(), Some(false));
        assert_eq!(s.tick(stale), TickOutcome::Ignored);
        assert_eq!(tick_n(&mut s, 7), TickOutcome::RestFinished);
    }

    #[test]
    fn skip_rest_zeroes_countdown() {
        let mut s = session(&plan("Monday", vec![ex("A", 3, "", "2-3 minutes")]));
        s.set_reps_input("5");
        assert_eq!(s.record_set(), Ok(SetOutcome::Resting { seconds: 2 }));

        assert!(s.skip_rest());
        assert_eq!(s.state(), SessionState::Exercising);
        assert!(!s.scheduler().is_active());
        assert!(!s.skip_rest());
    }

    #[test]
    fn manual_rest_only_after_first_set() {
        let mut s = session(&plan("Monday", vec![ex("A", 3, "", "unspecified")]));
        assert!(!s.can_start_rest());
        assert_eq!(s.start_rest(), None);

        s.set_reps_input("5");
        s.record_set().unwrap();
        s.skip_rest();
        assert_eq!(s.start_rest(), Some(120));
    }

    #[test]
    fn navigation_keeps_history_and_cancels_rest() {
        let mut s = session(&plan(
            "Monday",
            vec![ex("A", 1, "", "60 seconds"), ex("B", 3, "20kg", "60 seconds")],
        ));
        s.set_reps_input("10");
        s.record_set().unwrap();
        s.set_reps_input("8");
        s.record_set().unwrap();
        assert!(matches!(s.state(), SessionState::Resting { .. }));
        let before = s.progress_percent();

        assert!(s.previous_exercise());
        assert_eq!(s.state(), SessionState::Exercising);
        assert!(!s.scheduler().is_active());
        assert_eq!(s.current_set(), 1);
        assert_eq!(s.completed_sets("1").len(), 1);
        assert_eq!(s.completed_sets("2").len(), 1);
        assert!(s.progress_percent() < before);

        assert!(!s.previous_exercise());
        assert!(s.next_exercise());
        assert_eq!(s.weight_input(), "20kg");
        assert!(!s.next_exercise());
    }

    #[test]
    fn elapsed_minutes_floor_and_monotonic() {
        let clock = monday();
        let s = WorkoutSession::start(
            &plan("Monday", vec![ex("A", 1, "", "")]),
            clock.clone(),
            ManualTicker::default(),
        );

        assert_eq!(s.elapsed_minutes(), 0);
        clock.advance(Duration::seconds(119));
        assert_eq!(s.elapsed_minutes(), 1);
        clock.advance(Duration::seconds(1));
        assert_eq!(s.elapsed_minutes(), 2);
    }

    #[test]
    fn first_matching_day_is_used() {
        let mut p = plan("Monday", vec![ex("A", 1, "", "")]);
        p.days.push(Day {
            day: "Monday".into(),
            name: "Shadowed".into(),
            exercises: vec![ex("Z", 1, "", "")],
            duration: 10,
        });
        assert_eq!(session(&p).day_name(), Some("Push"));
    }

    #[test]
    fn zero_target_sets_count_as_one() {
        let s = session(&plan("Monday", vec![ex("A", 0, "", "")]));
        assert_eq!(s.exercises()[0].sets, 1);
    }
}
