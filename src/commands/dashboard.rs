use anyhow::Result;
use chrono::{Datelike, Local, Timelike};
use colored::Colorize;
use serde::Serialize;

use super::AppContext;
use crate::{
    models::{Day, Plan},
    quotes::quote_for,
    types::{emit, goal_label},
    utils::{format_minutes, weekday_name},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    greeting: String,
    weekday: &'static str,
    today: Option<Day>,
    stats: Option<Stats>,
    goals: Vec<String>,
    quote: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    plan_name: String,
    training_days: usize,
    average_minutes: u32,
    total_exercises: usize,
    program_duration: String,
}

fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

impl Stats {
    fn of(plan: &Plan) -> Self {
        Self {
            plan_name: plan.name.clone(),
            training_days: plan.days.len(),
            average_minutes: plan.average_duration(),
            total_exercises: plan.total_exercises(),
            program_duration: plan.duration.clone(),
        }
    }
}

pub fn handle(ctx: &AppContext) -> Result<()> {
    let now = Local::now();
    let weekday = weekday_name(now.weekday());
    let plan = ctx.active.get();

    let name = ctx.profile.as_ref().map(|p| p.name.as_str()).unwrap_or("");
    let greeting = if name.is_empty() {
        format!("{}!", greeting(now.hour()))
    } else {
        format!("{}, {}!", greeting(now.hour()), name)
    };

    let board = Dashboard {
        greeting,
        weekday,
        today: plan.as_ref().and_then(|p| p.day_for(weekday).cloned()),
        stats: plan.as_ref().map(Stats::of),
        goals: plan.as_ref().map(|p| p.goals.clone()).unwrap_or_default(),
        quote: quote_for(&now),
    };

    emit(ctx.fmt, &board, print)
}

fn print(board: &Dashboard) {
    println!("\n{}", board.greeting.bold().cyan());
    println!("{}", format!("Happy {}", board.weekday).dimmed());

    let Some(stats) = &board.stats else {
        println!(
            "\n{} no plan yet; run `rex onboard` to get one",
            "info:".blue().bold()
        );
        println!("\n💪 {}", board.quote.italic());
        return;
    };

    println!("\n{}", "Today's workout".bold());
    match &board.today {
        Some(day) => {
            println!(
                "  {} {}",
                day.name.green().bold(),
                format!(
                    "{} exercises • {}",
                    day.exercises.len(),
                    format_minutes(day.duration)
                )
                .dimmed()
            );
            for ex in day.exercises.iter().take(3) {
                println!("  • {} {}", ex.name, format!("{} × {}", ex.sets, ex.reps).dimmed());
            }
            if day.exercises.len() > 3 {
                println!("  {}", format!("+{} more", day.exercises.len() - 3).dimmed());
            }
            println!("  {}", "start with `rex session`".dimmed());
        }
        None => println!("  {}", "Rest day. Recovery is part of the plan.".dimmed()),
    }

    println!("\n{}", stats.plan_name.bold());
    let rows = [
        ("Training days", format!("{}/week", stats.training_days)),
        ("Avg duration", format_minutes(stats.average_minutes)),
        ("Exercises", stats.total_exercises.to_string()),
        ("Program", stats.program_duration.clone()),
    ];
    for (label, value) in rows {
        println!("  {} {}", format!("{:<14}", label).dimmed(), value.yellow());
    }

    if !board.goals.is_empty() {
        let goals: Vec<&str> = board.goals.iter().map(|g| goal_label(g)).collect();
        println!("\n{} {}", "Goals:".bold(), goals.join(", "));
    }
    println!("\n💪 {}", board.quote.italic());
}
