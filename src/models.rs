use serde::{Deserialize, Serialize};

/// A complete multi-day workout program.
/// Days keep insertion order; nothing enforces unique weekday labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// One weekday's scheduled workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// English weekday name, matched by exact string equality.
    pub day: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Target duration in minutes.
    #[serde(default)]
    pub duration: u32,
}

/// A prescribed movement. Reps, weight and rest time are free text on purpose
/// ("8-10", "Bodyweight", "2-3 minutes").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub rest_time: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
}

fn default_sets() -> u32 {
    1
}

impl Plan {
    /// First day whose label equals `weekday`; later duplicates are shadowed.
    pub fn day_for(&self, weekday: &str) -> Option<&Day> {
        self.days.iter().find(|d| d.day == weekday)
    }

    /// Weekday labels that appear on more than one day, in first-seen order.
    pub fn duplicate_weekdays(&self) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        let mut dups: Vec<String> = Vec::new();
        for d in &self.days {
            if seen.contains(&d.day.as_str()) {
                if !dups.iter().any(|x| x == &d.day) {
                    dups.push(d.day.clone());
                }
            } else {
                seen.push(&d.day);
            }
        }
        dups
    }

    pub fn total_exercises(&self) -> usize {
        self.days.iter().map(|d| d.exercises.len()).sum()
    }

    /// Rounded mean of the days' target minutes, 0 for an empty plan.
    pub fn average_duration(&self) -> u32 {
        if self.days.is_empty() {
            return 0;
        }
        let total: u32 = self.days.iter().map(|d| d.duration).sum();
        (total as f64 / self.days.len() as f64).round() as u32
    }
}

impl Exercise {
    pub fn has_suggested_weight(&self) -> bool {
        !self.weight.trim().is_empty()
    }
}

/// Everything the onboarding questionnaire collects.
/// Numeric answers stay free text; the planner reads leading numbers out of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub gender: String,
    pub body_fat: String,
    pub muscle_mass: String,
    pub diet_style: String,
    pub daily_meals: String,
    pub daily_calories: String,
    pub protein_intake: String,
    pub current_program: String,
    pub bench_press: String,
    pub squat: String,
    pub deadlift: String,
    pub overhead_press: String,
    pub pull_ups: String,
    pub rows: String,
    pub primary_goal: String,
    pub secondary_goal: String,
    pub weekly_availability: String,
    pub preferred_days: Vec<String>,
    pub additional_specs: Option<AdditionalSpecs>,
}

/// Optional context the user may add before generating a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalSpecs {
    pub injuries: Option<String>,
    pub medications: Option<String>,
    pub sleep_hours: Option<String>,
    pub stress_level: Option<String>,
    pub workout_time: Option<String>,
    pub equipment: Option<String>,
    pub experience: Option<String>,
    pub motivation: Option<String>,
}

impl AdditionalSpecs {
    pub fn is_empty(&self) -> bool {
        [
            &self.injuries,
            &self.medications,
            &self.sleep_hours,
            &self.stress_level,
            &self.workout_time,
            &self.equipment,
            &self.experience,
            &self.motivation,
        ]
        .iter()
        .all(|f| f.as_deref().map(str::trim).unwrap_or("").is_empty())
    }
}

/// Field-level patch for a single exercise. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, clap::Args)]
pub struct ExerciseEdit {
    /// New exercise name
    #[arg(long)]
    pub name: Option<String>,

    /// Target sets (at least 1)
    #[arg(long)]
    pub sets: Option<u32>,

    /// Target reps, e.g. "8-10"
    #[arg(long)]
    pub reps: Option<String>,

    /// Suggested weight, e.g. "60kg" or "Bodyweight"
    #[arg(long)]
    pub weight: Option<String>,

    /// Rest time, e.g. "90 seconds"
    #[arg(long)]
    pub rest: Option<String>,

    /// Coaching notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Comma-separated muscle groups
    #[arg(long, value_delimiter = ',')]
    pub muscles: Option<Vec<String>>,
}

impl ExerciseEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, ex: &mut Exercise) {
        if let Some(n) = &self.name {
            ex.name = n.clone();
        }
        if let Some(s) = self.sets {
            ex.sets = s;
        }
        if let Some(r) = &self.reps {
            ex.reps = r.clone();
        }
        if let Some(w) = &self.weight {
            ex.weight = w.clone();
        }
        if let Some(r) = &self.rest {
            ex.rest_time = r.clone();
        }
        if let Some(n) = &self.notes {
            ex.notes = n.clone();
        }
        if let Some(m) = &self.muscles {
            ex.muscle_groups = m.iter().map(|s| s.trim().to_string()).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(label: &str, name: &str) -> Day {
        Day {
            day: label.into(),
            name: name.into(),
            exercises: vec![],
            duration: 30,
        }
    }

    #[test]
    fn parses_camel_case_plan_json() {
        let json = r#"{
            "name": "Strength",
            "duration": "4-6 weeks",
            "days": [{
                "day": "Monday",
                "name": "Push",
                "exercises": [{
                    "name": "Bench Press",
                    "sets": 4,
                    "reps": "6-8",
                    "weight": "60kg",
                    "restTime": "2-3 minutes",
                    "notes": "Control the bar",
                    "muscleGroups": ["chest", "triceps"]
                }],
                "duration": 45
            }],
            "goals": ["increase-strength"],
            "notes": "Add weight weekly"
        }"#;

        let plan: Plan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.id, "");
        assert_eq!(plan.days[0].exercises[0].rest_time, "2-3 minutes");
        assert_eq!(plan.days[0].exercises[0].muscle_groups, ["chest", "triceps"]);
        assert_eq!(plan.days[0].duration, 45);
    }

    #[test]
    fn first_matching_day_wins() {
        let plan = Plan {
            id: "p".into(),
            name: "P".into(),
            duration: String::new(),
            days: vec![day("Monday", "A"), day("Tuesday", "B"), day("Monday", "C")],
            goals: vec![],
            notes: String::new(),
        };

        assert_eq!(plan.day_for("Monday").unwrap().name, "A");
        assert!(plan.day_for("Sunday").is_none());
        assert_eq!(plan.duplicate_weekdays(), ["Monday"]);
    }

    #[test]
    fn edit_only_touches_given_fields() {
        let mut ex = Exercise {
            name: "Squat".into(),
            sets: 3,
            reps: "5".into(),
            weight: "100kg".into(),
            rest_time: "3 minutes".into(),
            notes: String::new(),
            muscle_groups: vec!["quads".into()],
        };
        let edit = ExerciseEdit {
            sets: Some(5),
            muscles: Some(vec![" quads".into(), "glutes ".into()]),
            ..Default::default()
        };

        edit.apply(&mut ex);
        assert_eq!(ex.sets, 5);
        assert_eq!(ex.weight, "100kg");
        assert_eq!(ex.muscle_groups, ["quads", "glutes"]);
    }
}
