use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::AsyncBufRead;

use super::{AppContext, error, info, ok, shell::split_args, warning};
use crate::{
    cli::PlanCmd,
    console::Console,
    models::{Day, ExerciseEdit, Plan},
    review::{Approval, PlanReview},
    storage::{export_plan, import_plan},
    types::{emit, goal_label},
    utils::{format_minutes, plain_len},
};

pub async fn handle<R: AsyncBufRead + Unpin>(
    cmd: PlanCmd,
    ctx: &mut AppContext,
    console: &mut Console<R>,
) -> Result<()> {
    match cmd {
        PlanCmd::Show => {
            let Some(plan) = ctx.require_plan() else {
                return Ok(());
            };
            emit(ctx.fmt, &plan, print_overview)?;
        }

        PlanCmd::Details { day } => {
            let Some(plan) = ctx.require_plan() else {
                return Ok(());
            };
            match day {
                None => print_details(&plan, None),
                Some(sel) => match find_day(&plan, &sel) {
                    Some(idx) => print_details(&plan, Some(idx)),
                    None => error(format!("no day `{}` in this plan", sel)),
                },
            }
        }

        PlanCmd::Modify { instructions, yes } => {
            let Some(plan) = ctx.require_plan() else {
                return Ok(());
            };
            let text = instructions.join(" ");
            let mut review = PlanReview::new(plan);
            println!("{}", "Rex is thinking...".dimmed());
            if let Err(e) = review.modify(ctx.source.as_ref(), &text).await {
                error(e);
                return Ok(());
            }
            if yes {
                approve(review, ctx);
            } else {
                review_loop(review, ctx, console).await?;
            }
        }

        PlanCmd::Edit {
            day,
            exercise,
            edit,
        } => {
            let Some(plan) = ctx.require_plan() else {
                return Ok(());
            };
            let mut review = PlanReview::new(plan);
            match review.edit_exercise(day, exercise, &edit) {
                Ok(()) => {
                    let name = &review.plan().days[day - 1].exercises[exercise - 1].name;
                    ok(format!("updated `{}` on day {}", name.bold(), day));
                    ctx.active.set(review.plan().clone());
                }
                Err(e) => error(e),
            }
        }

        PlanCmd::Export { file } => {
            let Some(plan) = ctx.require_plan() else {
                return Ok(());
            };
            export_plan(&file, &plan)?;
            ok(format!("wrote `{}` to {}", plan.name, file.display()));
        }

        PlanCmd::Import { file, yes } => {
            let plan = match import_plan(&file) {
                Ok(p) => p,
                Err(e) => {
                    error(e);
                    return Ok(());
                }
            };
            let review = PlanReview::new(plan);
            if yes || !ctx.active.is_set() {
                approve(review, ctx);
            } else {
                print_overview(review.plan());
                if console.confirm("Replace the active plan?").await? {
                    approve(review, ctx);
                } else {
                    review.reject();
                    info("active plan unchanged");
                }
            }
        }

        PlanCmd::Clear => {
            if ctx.active.is_set() {
                ctx.active.clear();
                info("active plan cleared");
            } else {
                warning("no active plan");
            }
        }
    }
    Ok(())
}

/// 1-based index or weekday name (case-insensitive, first match).
fn find_day(plan: &Plan, sel: &str) -> Option<usize> {
    if let Ok(n) = sel.parse::<usize>() {
        return (n >= 1 && n <= plan.days.len()).then(|| n - 1);
    }
    plan.days
        .iter()
        .position(|d| d.day.eq_ignore_ascii_case(sel.trim()))
}

pub(crate) fn approve(review: PlanReview, ctx: &AppContext) {
    let name = review.plan().name.clone();
    let approval = review.approve(&ctx.active);
    ok(format!("`{}` is now your active plan", name.bold()));
    report_approval(&approval);
}

pub(crate) fn report_approval(approval: &Approval) {
    if approval.no_training_days {
        warning("this plan has no training days; sessions will find no workout");
    }
    if !approval.duplicate_weekdays.is_empty() {
        warning(format!(
            "{} appear more than once; only the first day for each is scheduled",
            approval.duplicate_weekdays.join(", ")
        ));
    }
}

#[derive(Parser, Debug)]
#[command(name = "review", no_binary_name = true, disable_help_flag = true)]
struct ReviewLine {
    #[command(subcommand)]
    action: ReviewAction,
}

#[derive(Subcommand, Debug)]
enum ReviewAction {
    /// Make this the active plan
    #[command(visible_alias = "a")]
    Approve,

    /// Ask Rex to change it: modify <INSTRUCTIONS>...
    #[command(visible_alias = "m")]
    Modify {
        #[arg(trailing_var_arg = true)]
        instructions: Vec<String>,
    },

    /// Change one exercise: edit DAY EXERCISE --sets 4 ...
    #[command(visible_alias = "e")]
    Edit {
        day: usize,
        exercise: usize,
        #[command(flatten)]
        edit: ExerciseEdit,
    },

    /// Show the overview again
    Show,

    /// Show every exercise
    Details,

    /// Discard this plan
    #[command(visible_aliases = ["back", "b"])]
    Reject,
}

/// Lets the user approve, modify, edit or discard a candidate plan.
/// Returns whether the plan was approved.
pub(crate) async fn review_loop<R: AsyncBufRead + Unpin>(
    mut review: PlanReview,
    ctx: &AppContext,
    console: &mut Console<R>,
) -> Result<bool> {
    print_overview(review.plan());
    println!(
        "{}",
        "approve | modify <text> | edit <day> <exercise> --field value | details | reject".dimmed()
    );

    loop {
        let Some(line) = console.prompt("review>").await? else {
            review.reject();
            return Ok(false);
        };
        if line.is_empty() {
            continue;
        }

        let action = match ReviewLine::try_parse_from(split_args(&line)) {
            Ok(l) => l.action,
            Err(e) => {
                println!("{}", e.render());
                continue;
            }
        };

        match action {
            ReviewAction::Approve => {
                approve(review, ctx);
                return Ok(true);
            }
            ReviewAction::Modify { instructions } => {
                println!("{}", "Rex is thinking...".dimmed());
                match review.modify(ctx.source.as_ref(), &instructions.join(" ")).await {
                    Ok(()) => print_overview(review.plan()),
                    Err(e) => error(e),
                }
            }
            ReviewAction::Edit {
                day,
                exercise,
                edit,
            } => match review.edit_exercise(day, exercise, &edit) {
                Ok(()) => {
                    ok("exercise updated");
                    print_details(review.plan(), Some(day - 1));
                }
                Err(e) => error(e),
            },
            ReviewAction::Show => print_overview(review.plan()),
            ReviewAction::Details => print_details(review.plan(), None),
            ReviewAction::Reject => {
                review.reject();
                info("plan discarded");
                return Ok(false);
            }
        }
    }
}

pub fn print_overview(plan: &Plan) {
    println!("\n{}", plan.name.bold().cyan());
    let mut meta = vec![format!("{} days/week", plan.days.len())];
    if !plan.duration.is_empty() {
        meta.push(plan.duration.clone());
    }
    meta.push(format!("avg {}", format_minutes(plan.average_duration())));
    println!("{}", meta.join(" • ").dimmed());

    if !plan.goals.is_empty() {
        let goals: Vec<&str> = plan.goals.iter().map(|g| goal_label(g)).collect();
        println!("{} {}", "Goals:".bold(), goals.join(", "));
    }
    println!();

    let idx_w = plan.days.len().to_string().len();
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (i, day) in plan.days.iter().enumerate() {
        left.push(format!(
            " {} {} {}",
            format!("{:>idx_w$}", i + 1).yellow(),
            format!("{:<9}", day.day).green(),
            day.name.bold()
        ));
        right.push(format!(
            "{} exercises, {}",
            day.exercises.len(),
            format_minutes(day.duration)
        ));

        let n = day.exercises.len();
        for (j, ex) in day.exercises.iter().enumerate() {
            let connector = if j + 1 == n { "└─" } else { "├─" };
            left.push(format!(
                " {} {} {}",
                " ".repeat(idx_w),
                connector.dimmed(),
                ex.name
            ));
            right.push(format!("{} × {}", ex.sets, ex.reps).dimmed().to_string());
        }
    }

    let pad_plain = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);
    for (l, r) in left.into_iter().zip(right) {
        let pad = pad_plain + (l.len() - plain_len(&l));
        println!("{:<pad$} {} {}", l, "|".blue(), r, pad = pad);
    }

    if !plan.notes.is_empty() {
        println!("\n{} {}", "Notes:".bold(), plan.notes);
    }
}

fn print_day(idx: usize, day: &Day) {
    println!(
        "\n{} {} {} {}",
        format!("{}.", idx + 1).yellow(),
        day.day.green().bold(),
        day.name.bold(),
        format!("({})", format_minutes(day.duration)).dimmed()
    );
    for (j, ex) in day.exercises.iter().enumerate() {
        println!("  {} {}", format!("{}.", j + 1).yellow(), ex.name.bold());
        let weight = if ex.has_suggested_weight() {
            ex.weight.as_str()
        } else {
            "-"
        };
        println!(
            "     {} sets × {} reps  •  {}  •  rest {}",
            ex.sets, ex.reps, weight, ex.rest_time
        );
        if !ex.muscle_groups.is_empty() {
            println!("     {}", ex.muscle_groups.join(", ").cyan());
        }
        if !ex.notes.is_empty() {
            println!("     {}", ex.notes.dimmed());
        }
    }
}

pub fn print_details(plan: &Plan, only: Option<usize>) {
    println!("\n{}", plan.name.bold().cyan());
    for (i, day) in plan.days.iter().enumerate() {
        if only.is_none_or(|o| o == i) {
            print_day(i, day);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Profile, planner::fallback_plan};

    #[test]
    fn finds_day_by_index_or_name() {
        let plan = fallback_plan(&Profile::default());
        assert_eq!(find_day(&plan, "2"), Some(1));
        assert_eq!(find_day(&plan, "friday"), Some(2));
        assert_eq!(find_day(&plan, "0"), None);
        assert_eq!(find_day(&plan, "4"), None);
        assert_eq!(find_day(&plan, "Sunday"), None);
    }

    #[test]
    fn review_line_parses_actions() {
        let l = ReviewLine::try_parse_from(split_args("edit 1 2 --reps \"6-8\" --weight 70kg")).unwrap();
        let ReviewAction::Edit { day, exercise, edit } = l.action else {
            panic!("expected edit");
        };
        assert_eq!((day, exercise), (1, 2));
        assert_eq!(edit.reps.as_deref(), Some("6-8"));

        let l = ReviewLine::try_parse_from(split_args("m add more core work")).unwrap();
        assert!(matches!(l.action, ReviewAction::Modify { instructions } if instructions.len() == 4));
        assert!(matches!(
            ReviewLine::try_parse_from(split_args("back")).unwrap().action,
            ReviewAction::Reject
        ));
    }
}
