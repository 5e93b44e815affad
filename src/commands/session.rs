use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use tokio::io::AsyncBufRead;

use super::{AppContext, error, info, ok, plan::report_approval, warning};
use crate::{
    chat::{ChatContext, RexChat},
    console::Console,
    quotes::quote_for,
    session::{
        Clock, IntervalTicker, SessionState, SetOutcome, SystemClock, TickOutcome, TickScheduler,
        WorkoutSession,
    },
    utils::format_time,
};

const HELP: &str = "done <reps> [weight] | reps N | weight W | pause | skip | rest | next | prev | \
status | ask <question> | approve | reject | exit";

enum Flow {
    Continue,
    Finished,
}

pub async fn handle<R: AsyncBufRead + Unpin>(
    ctx: &mut AppContext,
    console: &mut Console<R>,
) -> Result<()> {
    let Some(plan) = ctx.require_plan() else {
        return Ok(());
    };

    let (ticker, mut ticks) = IntervalTicker::every_second();
    let mut session = WorkoutSession::start(&plan, SystemClock, ticker);

    if session.state() == SessionState::NoWorkoutToday {
        println!("\n{}", "No workout scheduled today.".bold());
        println!("Rest up and come back on your next training day.");
        println!("{} {}", "💪".dimmed(), quote_for(&SystemClock.now()).italic());
        session.exit();
        return Ok(());
    }

    let mut rex = RexChat::new(ctx.model.clone(), ctx.source.clone());
    print_status(&session);
    println!("{}", HELP.dimmed());

    loop {
        tokio::select! {
            Some(token) = ticks.recv() => match session.tick(token) {
                TickOutcome::Counting { remaining } => {
                    print!("\r{} {} ", "rest".blue().bold(), format_time(remaining));
                    std::io::stdout().flush()?;
                }
                TickOutcome::RestFinished => {
                    println!();
                    ok("Rest complete! Ready for your next set.");
                    print_status(&session);
                }
                TickOutcome::Ignored => {}
            },

            line = console.next_line() => {
                let Some(line) = line? else {
                    session.exit();
                    return Ok(());
                };
                if line.is_empty() {
                    continue;
                }
                if matches!(line.as_str(), "exit" | "quit" | "q") {
                    session.exit();
                    info("session ended; nothing was saved");
                    return Ok(());
                }
                if let Flow::Finished = run_line(&mut session, &mut rex, ctx, &line).await {
                    return Ok(());
                }
            }
        }
    }
}

async fn run_line<S: TickScheduler, C: Clock>(
    session: &mut WorkoutSession<S, C>,
    rex: &mut RexChat,
    ctx: &AppContext,
    line: &str,
) -> Flow {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd {
        "done" | "d" => {
            let mut parts = rest.split_whitespace();
            if let Some(reps) = parts.next() {
                session.set_reps_input(reps);
            }
            let weight: Vec<&str> = parts.collect();
            if !weight.is_empty() {
                session.set_weight_input(weight.join(" "));
            }
            return record(session);
        }
        "reps" => {
            session.set_reps_input(rest);
            info(format!("reps: {}", rest));
        }
        "weight" | "w" => {
            session.set_weight_input(rest);
            info(format!("weight: {}", rest));
        }
        "pause" | "p" | "resume" => match session.toggle_pause() {
            Some(true) => info("rest paused"),
            Some(false) => info("rest resumed"),
            None => warning("not resting"),
        },
        "skip" => {
            if session.skip_rest() {
                println!();
                info("rest skipped");
                print_status(session);
            } else {
                warning("not resting");
            }
        }
        "rest" => match session.start_rest() {
            Some(secs) => info(format!("resting {}", format_time(secs))),
            None => warning("rest is available after your first set"),
        },
        "next" | "n" => {
            if session.next_exercise() {
                print_status(session);
            } else {
                warning("this is the last exercise");
            }
        }
        "prev" | "previous" => {
            if session.previous_exercise() {
                print_status(session);
            } else {
                warning("this is the first exercise");
            }
        }
        "status" | "s" => print_status(session),
        "ask" => {
            let ctx = ChatContext {
                user_data: ctx.profile.clone(),
                workout_plan: ctx.active.get(),
                is_workout_mode: true,
                current_exercise: session.current_exercise().map(|e| e.name.clone()),
            };
            if let Some(reply) = rex.send(rest, &ctx).await {
                println!("{} {}", "Rex:".cyan().bold(), reply.content);
            }
            if rex.pending().is_some() {
                println!("{}", "approve | reject".dimmed());
            }
        }
        "approve" => match rex.approve(&ctx.active) {
            Some(approval) => {
                ok("Plan updated! Your workout plan has been successfully modified.");
                report_approval(&approval);
                info("this session carries on with the workout it started with");
            }
            None => warning("no plan changes waiting for approval"),
        },
        "reject" => {
            if rex.reject() {
                info("Changes rejected. Your original workout plan remains unchanged.");
            } else {
                warning("no plan changes waiting for approval");
            }
        }
        "help" | "h" | "?" => println!("{}", HELP.dimmed()),
        other => error(format!("unknown command `{}`; {}", other, HELP)),
    }
    Flow::Continue
}

fn record<S: TickScheduler, C: Clock>(session: &mut WorkoutSession<S, C>) -> Flow {
    let set = session.current_set();
    match session.record_set() {
        Ok(SetOutcome::Resting { seconds }) => {
            ok(format!("set {} logged", set));
            info(format!(
                "rest {} (pause | skip | next)",
                format_time(seconds)
            ));
        }
        Ok(SetOutcome::NextExercise { .. }) => {
            ok("exercise complete!");
            print_status(session);
        }
        Ok(SetOutcome::Complete { elapsed_minutes }) => {
            println!();
            ok(format!(
                "{} {} minutes. Great job!",
                "Workout complete!".bold(),
                elapsed_minutes
            ));
            return Flow::Finished;
        }
        Err(e) => error(e),
    }
    Flow::Continue
}

fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn print_status<S: TickScheduler, C: Clock>(session: &WorkoutSession<S, C>) {
    let Some(ex) = session.current_exercise() else {
        return;
    };
    let total = session.exercises().len();

    println!(
        "\n{} {}  {}",
        session.day_name().unwrap_or_default().bold().cyan(),
        format!("{}m", session.elapsed_minutes()).dimmed(),
        format!(
            "{} {:.0}%",
            progress_bar(session.progress_percent(), 20),
            session.progress_percent()
        )
        .green()
    );
    println!(
        "{} {}  {}",
        format!("[{}/{}]", session.current_index() + 1, total).yellow(),
        ex.name.bold(),
        format!("set {}/{}", session.current_set(), ex.sets).magenta()
    );

    let weight = if ex.has_fixed_weight() {
        ex.weight.as_str()
    } else {
        "-"
    };
    println!(
        "  target {} reps • {} • rest {}",
        ex.reps,
        weight,
        format_time(ex.rest_seconds)
    );
    if !ex.muscle_groups.is_empty() {
        println!("  {}", ex.muscle_groups.join(", ").cyan());
    }
    for cue in &ex.instructions {
        println!("  {} {}", "•".dimmed(), cue.dimmed());
    }

    let done = session.completed_sets(&ex.id);
    if !done.is_empty() {
        let logged: Vec<String> = done
            .iter()
            .map(|s| {
                if s.weight > 0.0 {
                    format!("{}×{}", s.reps, s.weight)
                } else {
                    s.reps.to_string()
                }
            })
            .collect();
        println!("  logged: {}", logged.join(", "));
    }

    match session.state() {
        SessionState::Resting { remaining, paused } => {
            let label = if paused { "paused" } else { "resting" };
            println!("  {} {}", label.blue().bold(), format_time(remaining));
        }
        SessionState::Exercising => {
            let mut hint = String::from("done <reps>");
            if ex.has_fixed_weight() {
                hint.push_str(&format!(" [weight, now {}]", session.weight_input()));
            }
            println!("  {}", hint.dimmed());
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use async_trait::async_trait;
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::{
        llm::{LlmError, TextModel},
        models::Profile,
        planner::fallback_plan,
        session::{ManualClock, ManualTicker},
    };

    struct Fixed(&'static str);

    #[async_trait]
    impl TextModel for Fixed {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn monday() -> ManualClock {
        ManualClock::at(Local.with_ymd_and_hms(2024, 6, 3, 18, 0, 0).unwrap())
    }

    fn context() -> AppContext {
        let ctx = AppContext::new(
            Arc::new(Fixed(r#"{"name":"Four Day Split"}"#)),
            PathBuf::from("unused"),
        );
        ctx.active.set(fallback_plan(&Profile::default()));
        ctx
    }

    #[tokio::test]
    async fn plan_change_asked_mid_workout_can_be_approved() {
        let ctx = context();
        let before = ctx.active.get().unwrap();
        let mut session = WorkoutSession::start(&before, monday(), ManualTicker::default());
        let mut rex = RexChat::new(ctx.model.clone(), ctx.source.clone());

        run_line(&mut session, &mut rex, &ctx, "ask please change my plan to four days").await;
        assert_eq!(rex.pending().unwrap().name, "Four Day Split");
        assert_eq!(ctx.active.get().unwrap().id, before.id);

        assert!(matches!(
            run_line(&mut session, &mut rex, &ctx, "approve").await,
            Flow::Continue
        ));
        assert!(rex.pending().is_none());
        assert_eq!(ctx.active.get().unwrap().name, "Four Day Split");
        // the running workout is untouched
        assert_eq!(session.day_name(), Some(before.days[0].name.as_str()));
        assert_eq!(session.state(), SessionState::Exercising);
    }

    #[tokio::test]
    async fn rejected_plan_change_keeps_active_plan() {
        let ctx = context();
        let before = ctx.active.get().unwrap();
        let mut session = WorkoutSession::start(&before, monday(), ManualTicker::default());
        let mut rex = RexChat::new(ctx.model.clone(), ctx.source.clone());

        run_line(&mut session, &mut rex, &ctx, "ask adjust my plan please").await;
        assert!(rex.pending().is_some());
        run_line(&mut session, &mut rex, &ctx, "reject").await;

        assert!(rex.pending().is_none());
        assert_eq!(ctx.active.get().unwrap(), before);
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(50.0, 4), "██░░");
        assert_eq!(progress_bar(100.0, 4), "████");
        assert_eq!(progress_bar(150.0, 4), "████");
    }
}
