use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;

use super::AppContext;
use crate::models::Plan;

/// Weekly sets per muscle group, highest first (ties by name).
fn sets_per_muscle(plan: &Plan) -> Vec<(String, u32)> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for ex in plan.days.iter().flat_map(|d| &d.exercises) {
        for m in &ex.muscle_groups {
            *totals.entry(m.trim().to_lowercase()).or_default() += ex.sets.max(1);
        }
    }
    totals
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

fn bar(value: u32, max: u32, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * width as f64).round() as usize;
    "■".repeat(len.max(1))
}

/// Column chart of minutes per training day with a y-axis.
fn minutes_chart(plan: &Plan, height: usize) -> Vec<String> {
    if plan.days.is_empty() || height < 2 {
        return vec!["No data available".to_string()];
    }

    let max = plan.days.iter().map(|d| d.duration).max().unwrap_or(0).max(1);
    let col_w = 5;
    let mut grid = vec![vec![' '; plan.days.len() * col_w]; height];

    for (i, day) in plan.days.iter().enumerate() {
        let filled = ((day.duration as f64 / max as f64) * height as f64).round() as usize;
        for row in grid.iter_mut().rev().take(filled) {
            for c in &mut row[i * col_w + 1..i * col_w + 4] {
                *c = '█';
            }
        }
    }

    let mut out = Vec::new();
    let step = max as f64 / height as f64;
    for (i, row) in grid.iter().enumerate() {
        let value = step * (height - i) as f64;
        out.push(format!("{:4.0} │{}", value, row.iter().collect::<String>()));
    }
    out.push(format!("     └{}", "─".repeat(plan.days.len() * col_w)));
    let labels: String = plan
        .days
        .iter()
        .map(|d| format!(" {:<3} ", d.day.chars().take(3).collect::<String>()))
        .collect();
    out.push(format!("      {}", labels));
    out
}

pub fn handle(ctx: &AppContext) -> Result<()> {
    let Some(plan) = ctx.require_plan() else {
        return Ok(());
    };
    let (term_width, _) = term_size::dimensions().unwrap_or((80, 24));

    println!("\n{} {}", plan.name.bold().cyan(), "analytics".dimmed());

    println!("\n{}", "Weekly sets per muscle group".bold());
    let sets = sets_per_muscle(&plan);
    if sets.is_empty() {
        println!("  {}", "No muscle groups tagged".dimmed());
    }
    let label_w = sets.iter().map(|(m, _)| m.len()).max().unwrap_or(0);
    let max = sets.first().map(|(_, n)| *n).unwrap_or(0);
    let bar_w = term_width.saturating_sub(label_w + 12).clamp(10, 50);
    for (muscle, n) in &sets {
        println!(
            "  {:<label_w$} {} {}",
            muscle,
            bar(*n, max, bar_w).green(),
            n.to_string().yellow()
        );
    }

    println!("\n{}", "Planned minutes per training day".bold());
    for line in minutes_chart(&plan, 8) {
        println!("{}", line);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Profile, planner::fallback_plan};

    #[test]
    fn counts_sets_across_days() {
        let sets = sets_per_muscle(&fallback_plan(&Profile::default()));
        let get = |m: &str| sets.iter().find(|(k, _)| k == m).map(|(_, n)| *n);

        // bench 4 + ohp 3 + push-ups 3
        assert_eq!(get("triceps"), Some(10));
        assert_eq!(get("glutes"), Some(10));
        assert_eq!(sets[0], ("shoulders".to_string(), 13));
        assert_eq!(get("lats"), Some(3));
    }

    #[test]
    fn bars_scale_to_max() {
        assert_eq!(bar(10, 10, 4), "■■■■");
        assert_eq!(bar(1, 10, 4), "■");
        assert_eq!(bar(0, 0, 4), "");
    }

    #[test]
    fn column_chart_has_axis_and_labels() {
        let chart = minutes_chart(&fallback_plan(&Profile::default()), 4);
        assert_eq!(chart.len(), 6);
        assert!(chart[4].contains('└'));
        assert!(chart[5].contains("Mon") && chart[5].contains("Fri"));
        assert!(chart[0].starts_with("  60"));
    }
}
