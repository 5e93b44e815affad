//! Plan source: turns a profile into a plan and adapts plans from free text.
//!
//! Both operations always hand back a usable [`Plan`]. A failed or unparseable
//! model call degrades to a locally built fallback (`generate`) or to the
//! untouched input (`adapt`); callers never see the error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::{
    llm::{LlmError, TextModel, extract_json},
    models::{Day, Exercise, Plan, Profile},
    utils::leading_number,
};

#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn generate(&self, profile: &Profile) -> Plan;
    async fn adapt(&self, current: &Plan, instructions: &str) -> Plan;
}

pub struct Planner {
    model: Arc<dyn TextModel>,
}

impl Planner {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    async fn try_generate(&self, profile: &Profile) -> Result<Plan, LlmError> {
        let text = self.model.complete(&generation_prompt(profile)).await?;
        let raw: PlanPatch = serde_json::from_str(&extract_json(&text)?)
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let name = raw.name.filter(|n| !n.trim().is_empty());
        let (Some(name), Some(days)) = (name, raw.days) else {
            return Err(LlmError::Parse("Invalid plan structure".to_string()));
        };

        Ok(Plan {
            id: new_id("plan"),
            name,
            duration: raw.duration.unwrap_or_default(),
            days,
            goals: raw.goals.unwrap_or_default(),
            notes: raw.notes.unwrap_or_default(),
        })
    }

    async fn try_adapt(&self, current: &Plan, instructions: &str) -> Result<Plan, LlmError> {
        let current_json =
            serde_json::to_string(current).map_err(|e| LlmError::Parse(e.to_string()))?;
        let text = self
            .model
            .complete(&adaptation_prompt(&current_json, instructions))
            .await?;
        let patch: PlanPatch = serde_json::from_str(&extract_json(&text)?)
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let mut plan = patch.merge_over(current);
        plan.id = new_id("plan");
        Ok(plan)
    }
}

#[async_trait]
impl PlanSource for Planner {
    async fn generate(&self, profile: &Profile) -> Plan {
        match self.try_generate(profile).await {
            Ok(plan) => {
                tracing::info!(plan = %plan.id, days = plan.days.len(), "generated plan");
                plan
            }
            Err(e) => {
                tracing::warn!(error = %e, "plan generation failed, using fallback plan");
                fallback_plan(profile)
            }
        }
    }

    async fn adapt(&self, current: &Plan, instructions: &str) -> Plan {
        match self.try_adapt(current, instructions).await {
            Ok(plan) => {
                tracing::info!(from = %current.id, to = %plan.id, "adapted plan");
                plan
            }
            Err(e) => {
                tracing::warn!(error = %e, "plan adaptation failed, keeping current plan");
                current.clone()
            }
        }
    }
}

/// Top-level plan fields as the model may return them; anything missing stays `None`.
#[derive(Debug, Default, Deserialize)]
struct PlanPatch {
    name: Option<String>,
    duration: Option<String>,
    days: Option<Vec<Day>>,
    goals: Option<Vec<String>>,
    notes: Option<String>,
}

impl PlanPatch {
    /// Shallow merge: every field the model sent replaces the current one.
    fn merge_over(self, current: &Plan) -> Plan {
        let mut plan = current.clone();
        if let Some(name) = self.name {
            plan.name = name;
        }
        if let Some(duration) = self.duration {
            plan.duration = duration;
        }
        if let Some(days) = self.days {
            plan.days = days;
        }
        if let Some(goals) = self.goals {
            plan.goals = goals;
        }
        if let Some(notes) = self.notes {
            plan.notes = notes;
        }
        plan
    }
}

fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

/// `pct` of a benchmark lift, rounded to whole kilograms.
fn scaled_weight(benchmark: &str, pct: f64, otherwise: &str) -> String {
    match leading_number(benchmark) {
        Some(kg) => format!("{}kg", (kg * pct).round() as i64),
        None => otherwise.to_string(),
    }
}

fn exercise(
    name: &str,
    sets: u32,
    reps: &str,
    weight: String,
    rest: &str,
    notes: &str,
    muscles: &[&str],
) -> Exercise {
    Exercise {
        name: name.to_string(),
        sets,
        reps: reps.to_string(),
        weight,
        rest_time: rest.to_string(),
        notes: notes.to_string(),
        muscle_groups: muscles.iter().map(|m| m.to_string()).collect(),
    }
}

/// Deterministic three-day program built from the profile's benchmarks and goals.
pub fn fallback_plan(profile: &Profile) -> Plan {
    let pull_up_reps = if profile.pull_ups.trim().is_empty() {
        "5-8".to_string()
    } else {
        profile.pull_ups.trim().to_string()
    };

    let days = vec![
        Day {
            day: "Monday".into(),
            name: "Upper Body Strength".into(),
            exercises: vec![
                exercise(
                    "Bench Press",
                    4,
                    "8-10",
                    scaled_weight(&profile.bench_press, 0.7, "Start light"),
                    "2-3 minutes",
                    "Focus on controlled movement and full range of motion",
                    &["chest", "triceps", "shoulders"],
                ),
                exercise(
                    "Barbell Rows",
                    3,
                    "8-10",
                    scaled_weight(&profile.rows, 0.8, "Moderate weight"),
                    "2 minutes",
                    "Pull to lower chest, squeeze shoulder blades together",
                    &["back", "biceps"],
                ),
                exercise(
                    "Overhead Press",
                    3,
                    "6-8",
                    scaled_weight(&profile.overhead_press, 0.8, "Start light"),
                    "2-3 minutes",
                    "Keep core tight, press straight up",
                    &["shoulders", "triceps", "core"],
                ),
            ],
            duration: 60,
        },
        Day {
            day: "Wednesday".into(),
            name: "Lower Body Power".into(),
            exercises: vec![
                exercise(
                    "Squats",
                    4,
                    "8-10",
                    scaled_weight(&profile.squat, 0.7, "Start with bodyweight"),
                    "2-3 minutes",
                    "Descend until thighs are parallel to floor",
                    &["quads", "glutes", "hamstrings"],
                ),
                exercise(
                    "Deadlifts",
                    3,
                    "5-8",
                    scaled_weight(&profile.deadlift, 0.7, "Start moderate"),
                    "3 minutes",
                    "Keep back neutral, drive through heels",
                    &["hamstrings", "glutes", "back"],
                ),
                exercise(
                    "Walking Lunges",
                    3,
                    "12 each leg",
                    "Bodyweight or light dumbbells".into(),
                    "90 seconds",
                    "Step forward into lunge, alternate legs",
                    &["quads", "glutes", "calves"],
                ),
            ],
            duration: 55,
        },
        Day {
            day: "Friday".into(),
            name: "Full Body Circuit".into(),
            exercises: vec![
                exercise(
                    "Pull-ups",
                    3,
                    &pull_up_reps,
                    "Bodyweight".into(),
                    "2 minutes",
                    "Use assistance if needed, focus on full range",
                    &["lats", "rhomboids", "biceps"],
                ),
                exercise(
                    "Push-ups",
                    3,
                    "10-15",
                    "Bodyweight".into(),
                    "90 seconds",
                    "Maintain straight body line",
                    &["chest", "triceps", "shoulders"],
                ),
                exercise(
                    "Plank",
                    3,
                    "30-60 seconds",
                    "Bodyweight".into(),
                    "60 seconds",
                    "Keep body straight, engage core",
                    &["core", "shoulders"],
                ),
            ],
            duration: 40,
        },
    ];

    let goals = [&profile.primary_goal, &profile.secondary_goal]
        .into_iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty() && *g != "none")
        .map(str::to_string)
        .collect();

    Plan {
        id: new_id("fallback"),
        name: format!("{} Program for {}", profile.primary_goal, profile.name),
        duration: "4-6 weeks".into(),
        days,
        goals,
        notes: format!(
            "Progressive overload program designed for {}. Increase weight by 2.5-5kg when you can \
             complete all sets and reps with good form. Rest 48-72 hours between sessions. Focus \
             on proper form over heavy weight.",
            profile.primary_goal
        ),
    }
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default)
}

pub fn generation_prompt(p: &Profile) -> String {
    let specs = match &p.additional_specs {
        Some(s) if !s.is_empty() => format!(
            "Additional Specifications:
- Injuries/Limitations: {}
- Medications: {}
- Sleep Hours: {}
- Stress Level: {}/10
- Preferred Workout Time: {}
- Available Equipment: {}
- Training Experience: {}
- Motivation: {}
",
            or_default(s.injuries.as_deref(), "None specified"),
            or_default(s.medications.as_deref(), "None specified"),
            or_default(s.sleep_hours.as_deref(), "Not specified"),
            or_default(s.stress_level.as_deref(), "Not specified"),
            or_default(s.workout_time.as_deref(), "Not specified"),
            or_default(s.equipment.as_deref(), "Standard gym equipment"),
            or_default(s.experience.as_deref(), "Not specified"),
            or_default(s.motivation.as_deref(), "General fitness improvement"),
        ),
        _ => String::new(),
    };

    format!(
        r#"You are a professional fitness trainer and exercise physiologist. Create a detailed, personalized workout plan for a user with the following profile. The plan should be scientifically sound, progressive, and tailored to their specific goals and current fitness level.

Personal Info:
- Name: {name}
- Age: {age}
- Height: {height}
- Weight: {weight}
- Gender: {gender}
- Body Fat: {body_fat}%
- Muscle Mass: {muscle_mass}

Fitness Info:
- Primary Goal: {primary}
- Secondary Goal: {secondary}
- Weekly Availability: {availability}
- Preferred Days: {days}

Current Strength Levels:
- Bench Press: {bench}
- Squat: {squat}
- Deadlift: {deadlift}
- Overhead Press: {ohp}
- Pull-ups: {pull_ups}
- Rows: {rows}

Diet Info:
- Diet Style: {diet}
- Daily Meals: {meals}
- Daily Calories: {calories}
- Protein Intake: {protein}g

Current Program: {program}

{specs}
IMPORTANT: You must respond with ONLY a valid JSON object, no additional text or formatting. The JSON should follow this exact structure:

{{
  "name": "Descriptive Plan Name",
  "duration": "4-6 weeks",
  "days": [
    {{
      "day": "Monday",
      "name": "Workout Name",
      "exercises": [
        {{
          "name": "Exercise Name",
          "sets": 4,
          "reps": "6-8",
          "weight": "suggested weight or bodyweight",
          "restTime": "2-3 minutes",
          "notes": "Form cues and tips",
          "muscleGroups": ["primary", "secondary"]
        }}
      ],
      "duration": 45
    }}
  ],
  "goals": ["primary goal", "secondary goal"],
  "notes": "Important program notes and progression guidelines"
}}

Create a plan with {availability} training days per week. Focus on {primary} as the primary goal. Include compound movements, proper progression, and consider their current strength levels. Make the plan challenging but achievable."#,
        name = p.name,
        age = p.age,
        height = p.height,
        weight = p.weight,
        gender = p.gender,
        body_fat = p.body_fat,
        muscle_mass = p.muscle_mass,
        primary = p.primary_goal,
        secondary = p.secondary_goal,
        availability = p.weekly_availability,
        days = p.preferred_days.join(", "),
        bench = p.bench_press,
        squat = p.squat,
        deadlift = p.deadlift,
        ohp = p.overhead_press,
        pull_ups = p.pull_ups,
        rows = p.rows,
        diet = p.diet_style,
        meals = p.daily_meals,
        calories = p.daily_calories,
        protein = p.protein_intake,
        program = p.current_program,
        specs = specs,
    )
}

pub fn adaptation_prompt(current_json: &str, instructions: &str) -> String {
    format!(
        r#"You are a professional fitness trainer. Modify the following workout plan based on the user's feedback. Respond with ONLY a valid JSON object in the same format as the original plan.

Current Plan: {current_json}

User Modifications: {instructions}

Make the requested changes while maintaining the scientific integrity of the program. Ensure proper exercise selection, volume, and progression."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned replies in order; an exhausted script fails like a dead endpoint.
    struct Scripted(Mutex<Vec<Result<String, LlmError>>>);

    impl Scripted {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(replies.into_iter().rev().collect())))
        }
    }

    #[async_trait]
    impl TextModel for Scripted {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::Request("script exhausted".into())))
        }
    }

    fn profile() -> Profile {
        Profile {
            name: "Sam".into(),
            bench_press: "80".into(),
            squat: "100kg".into(),
            deadlift: "".into(),
            overhead_press: "50".into(),
            rows: "60".into(),
            pull_ups: "6".into(),
            primary_goal: "increase-strength".into(),
            secondary_goal: "none".into(),
            weekly_availability: "3".into(),
            ..Default::default()
        }
    }

    #[test]
    fn fallback_scales_benchmarks() {
        let plan = fallback_plan(&profile());

        assert!(plan.id.starts_with("fallback-"));
        assert_eq!(plan.name, "increase-strength Program for Sam");
        assert_eq!(plan.goals, ["increase-strength"]);

        let days: Vec<&str> = plan.days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, ["Monday", "Wednesday", "Friday"]);

        let weights: Vec<&str> = plan.days[0].exercises.iter().map(|e| e.weight.as_str()).collect();
        assert_eq!(weights, ["56kg", "48kg", "40kg"]);
        assert_eq!(plan.days[1].exercises[0].weight, "70kg");
        assert_eq!(plan.days[1].exercises[1].weight, "Start moderate");
        assert_eq!(plan.days[2].exercises[0].reps, "6");
    }

    #[tokio::test]
    async fn generate_parses_fenced_reply() {
        let reply = r#"```json
{"name":"Power Builder","duration":"6 weeks","days":[{"day":"Tuesday","name":"Legs","exercises":[{"name":"Squat","sets":5,"reps":"5","weight":"90kg","restTime":"3 minutes","notes":"","muscleGroups":["quads"]}],"duration":50}],"goals":["increase-strength"],"notes":"Go heavy"}
```"#;
        let planner = Planner::new(Scripted::new(vec![Ok(reply.into())]));

        let plan = planner.generate(&profile()).await;
        assert!(plan.id.starts_with("plan-"));
        assert_eq!(plan.name, "Power Builder");
        assert_eq!(plan.days[0].exercises[0].rest_time, "3 minutes");
    }

    #[tokio::test]
    async fn generate_falls_back_on_error_or_bad_shape() {
        let planner = Planner::new(Scripted::new(vec![
            Err(LlmError::Api("quota".into())),
            Ok(r#"{"duration":"4 weeks","days":[]}"#.into()),
            Ok("not json at all".into()),
        ]));

        for _ in 0..3 {
            let plan = planner.generate(&profile()).await;
            assert!(plan.id.starts_with("fallback-"), "got {}", plan.id);
        }
    }

    #[tokio::test]
    async fn adapt_merges_over_current_plan() {
        let current = fallback_plan(&profile());
        let planner = Planner::new(Scripted::new(vec![Ok(
            r#"{"name":"Lighter Program","notes":"Deload week"}"#.into(),
        )]));

        let adapted = planner.adapt(&current, "make it lighter").await;
        assert_eq!(adapted.name, "Lighter Program");
        assert_eq!(adapted.notes, "Deload week");
        assert_eq!(adapted.days, current.days);
        assert!(adapted.id.starts_with("plan-"));
    }

    #[tokio::test]
    async fn adapt_keeps_current_plan_on_failure() {
        let current = fallback_plan(&profile());
        let planner = Planner::new(Scripted::new(vec![Ok("sorry, cannot".into())]));

        let adapted = planner.adapt(&current, "more cardio").await;
        assert_eq!(adapted, current);
    }

    #[test]
    fn prompt_includes_specs_only_when_given() {
        let mut p = profile();
        assert!(!generation_prompt(&p).contains("Additional Specifications"));

        p.additional_specs = Some(crate::models::AdditionalSpecs {
            injuries: Some("left knee".into()),
            ..Default::default()
        });
        let prompt = generation_prompt(&p);
        assert!(prompt.contains("- Injuries/Limitations: left knee"));
        assert!(prompt.contains("- Available Equipment: Standard gym equipment"));
    }
}
