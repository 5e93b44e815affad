use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate, Weekday};
use colored::Colorize;

use super::{AppContext, error};
use crate::{
    models::Plan,
    utils::{WEEKDAYS, format_minutes, weekday_name},
};

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

fn is_training_day(plan: &Plan, day: Weekday) -> bool {
    plan.day_for(weekday_name(day)).is_some()
}

pub fn handle(ctx: &AppContext, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let today = Local::now().date_naive();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());

    if !(1..=12).contains(&month) {
        error("month must be between 1 and 12");
        return Ok(());
    }
    let Some((first_day, last_day)) = month_bounds(year, month) else {
        error(format!("{}-{} is out of range", year, month));
        return Ok(());
    };
    let plan = ctx.active.get();

    println!("\n{}", first_day.format("%B %Y").to_string().bold().cyan());
    println!("{}", "Su Mo Tu We Th Fr Sa".dimmed());

    let first_weekday = first_day.weekday().num_days_from_sunday() as usize;
    print!("{}", "   ".repeat(first_weekday));

    for date in first_day.iter_days().take_while(|d| *d <= last_day) {
        let cell = format!("{:2}", date.day());
        let training = plan.as_ref().is_some_and(|p| is_training_day(p, date.weekday()));
        let cell = match (date == today, training) {
            (true, true) => cell.black().on_green().bold(),
            (true, false) => cell.reversed(),
            (false, true) => cell.green().bold(),
            (false, false) => cell.normal(),
        };
        print!("{} ", cell);

        if date.weekday() == Weekday::Sat {
            println!();
        }
    }
    println!("\n");

    let Some(plan) = plan else {
        println!("{}", "(no active plan)".dimmed());
        return Ok(());
    };

    println!("{}", "Weekly overview:".bold().cyan());
    for name in WEEKDAYS {
        match plan.day_for(name) {
            Some(day) => println!(
                "  {} {} {}",
                format!("{:<10}", name).green(),
                day.name.bold(),
                format!(
                    "({} exercises, {})",
                    day.exercises.len(),
                    format_minutes(day.duration)
                )
                .dimmed()
            ),
            None => println!("  {} {}", format!("{:<10}", name).dimmed(), "rest".dimmed()),
        }
    }
    Ok(())
}
