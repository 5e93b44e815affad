use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;
use tokio::io::AsyncBufRead;

use super::{AppContext, error, info, plan, warning};
use crate::{
    console::Console,
    models::{AdditionalSpecs, Profile},
    review::PlanReview,
    storage::{load_profile, save_profile},
    types::{ALLOWED_GOALS, DIET_STYLES, GENDERS, WORKOUT_TIMES, best_suggestion, canonical_choice, goal_label},
    utils::WEEKDAYS,
};

/// Unwraps an answer or abandons the questionnaire at end of input.
macro_rules! answer {
    ($e:expr) => {
        match $e.await? {
            Some(v) => v,
            None => return Ok(None),
        }
    };
}

pub async fn handle<R: AsyncBufRead + Unpin>(
    ctx: &mut AppContext,
    console: &mut Console<R>,
    profile_file: Option<PathBuf>,
    save_to: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let profile = match profile_file {
        Some(path) => match load_profile(&path) {
            Ok(p) if p.name.trim().is_empty() => {
                error(format!("{} has no `name`", path.display()));
                return Ok(());
            }
            Ok(p) => p,
            Err(e) => {
                error(e);
                return Ok(());
            }
        },
        None => match questionnaire(console).await? {
            Some(p) => p,
            None => {
                println!();
                warning("onboarding cancelled");
                return Ok(());
            }
        },
    };

    if let Some(path) = save_to {
        save_profile(&path, &profile)?;
        info(format!("profile saved to {}", path.display()));
    }

    println!(
        "\n{} {}",
        "Rex is building your plan for".dimmed(),
        profile.name.bold()
    );
    let generated = ctx.source.generate(&profile).await;
    if generated.id.starts_with("fallback-") {
        warning("couldn't reach the plan generator; here's a starter plan built from your numbers");
    }
    ctx.profile = Some(profile);

    let review = PlanReview::new(generated);
    if yes {
        plan::approve(review, ctx);
    } else {
        plan::review_loop(review, ctx, console).await?;
    }
    Ok(())
}

fn step(n: u8, title: &str) {
    println!("\n{} {}", format!("Step {}/5", n).yellow().bold(), title.bold());
}

async fn optional<R: AsyncBufRead + Unpin>(
    console: &mut Console<R>,
    label: &str,
) -> Result<Option<String>> {
    console.prompt(&format!("{label} (optional):")).await
}

/// Asks until the answer is one of `allowed`, suggesting the closest match on typos.
/// An empty answer is accepted only when `optional`.
async fn choice<R: AsyncBufRead + Unpin>(
    console: &mut Console<R>,
    label: &str,
    allowed: &[&'static str],
    optional: bool,
) -> Result<Option<String>> {
    let prompt = format!("{} ({}):", label, allowed.join("/"));
    loop {
        let Some(ans) = console.prompt(&prompt).await? else {
            return Ok(None);
        };
        if ans.is_empty() && optional {
            return Ok(Some(String::new()));
        }
        if let Some(c) = canonical_choice(&ans, allowed.iter()) {
            return Ok(Some(c.to_string()));
        }
        match best_suggestion(&ans, allowed.iter()) {
            Some(sug) => warning(format!("unknown `{}` -- did you mean: `{}`?", ans, sug.green())),
            None => warning(format!("`{}` is not one of: {}", ans, allowed.join(", "))),
        }
    }
}

/// "mon, Wed,friday" -> Monday, Wednesday, Friday. Unknown names are returned as errors.
fn parse_days(input: &str) -> Result<Vec<String>, String> {
    let mut days = Vec::new();
    for raw in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let lower = raw.to_ascii_lowercase();
        let day = WEEKDAYS
            .iter()
            .find(|d| lower.len() >= 3 && d.to_ascii_lowercase().starts_with(&lower))
            .ok_or_else(|| raw.to_string())?;
        days.push(day.to_string());
    }
    Ok(days.into_iter().unique().collect())
}

async fn questionnaire<R: AsyncBufRead + Unpin>(console: &mut Console<R>) -> Result<Option<Profile>> {
    let goals: Vec<&'static str> = ALLOWED_GOALS.iter().copied().sorted().collect();
    let mut p = Profile::default();

    println!("{}", "Let's get to know you. Ctrl-D cancels.".dimmed());

    step(1, "Personal info");
    p.name = answer!(console.ask("Name", None));
    p.age = answer!(console.ask("Age", None));
    p.height = answer!(console.ask("Height (cm)", None));
    p.weight = answer!(console.ask("Weight (kg)", None));
    p.gender = answer!(choice(console, "Gender", &GENDERS, false));

    step(2, "Body composition and diet");
    p.body_fat = answer!(optional(console, "Body fat %"));
    p.muscle_mass = answer!(optional(console, "Muscle mass (kg)"));
    p.diet_style = answer!(choice(console, "Diet style", &DIET_STYLES, false));
    p.daily_meals = answer!(console.ask("Meals per day", Some("3")));
    p.daily_calories = answer!(optional(console, "Daily calories"));
    p.protein_intake = answer!(optional(console, "Protein per day (g)"));

    step(3, "Current program");
    p.current_program = answer!(console.ask("What do you train now?", Some("None")));

    step(4, "Strength benchmarks (kg, leave blank if unknown)");
    p.bench_press = answer!(optional(console, "Bench press"));
    p.squat = answer!(optional(console, "Squat"));
    p.deadlift = answer!(optional(console, "Deadlift"));
    p.overhead_press = answer!(optional(console, "Overhead press"));
    p.pull_ups = answer!(optional(console, "Pull-ups (max reps)"));
    p.rows = answer!(optional(console, "Barbell row"));

    step(5, "Goals and schedule");
    for g in &goals {
        println!("  {} {}", g.green(), goal_label(g).dimmed());
    }
    p.primary_goal = answer!(choice(console, "Primary goal", &goals, false));
    let secondary: Vec<&'static str> = goals
        .iter()
        .copied()
        .filter(|g| *g != p.primary_goal)
        .chain(["none"])
        .collect();
    p.secondary_goal = answer!(choice(console, "Secondary goal", &secondary, false));

    p.weekly_availability = loop {
        let ans = answer!(console.ask("Training days per week (3-7)", Some("3")));
        match ans.parse::<u8>() {
            Ok(n @ 3..=7) => break n.to_string(),
            _ => warning("enter a number from 3 to 7"),
        }
    };

    p.preferred_days = loop {
        let ans = answer!(optional(console, "Preferred days (comma separated)"));
        match parse_days(&ans) {
            Ok(days) => break days,
            Err(bad) => warning(format!("`{}` is not a weekday", bad)),
        }
    };

    if console.confirm("Add details (injuries, sleep, equipment...)?").await? {
        let mut specs = AdditionalSpecs::default();
        let some = |s: String| (!s.is_empty()).then_some(s);
        specs.injuries = some(answer!(optional(console, "Injuries or limitations")));
        specs.medications = some(answer!(optional(console, "Medications")));
        specs.sleep_hours = some(answer!(optional(console, "Sleep hours per night")));
        specs.stress_level = some(answer!(optional(console, "Stress level (1-10)")));
        specs.workout_time = some(answer!(choice(console, "Preferred workout time", &WORKOUT_TIMES, true)));
        specs.equipment = some(answer!(optional(console, "Available equipment")));
        specs.experience = some(answer!(optional(console, "Training experience")));
        specs.motivation = some(answer!(optional(console, "What motivates you")));
        if !specs.is_empty() {
            p.additional_specs = Some(specs);
        }
    }

    Ok(Some(p))
}
