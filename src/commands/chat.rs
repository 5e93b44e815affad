use anyhow::Result;
use colored::Colorize;
use tokio::io::AsyncBufRead;

use super::{
    AppContext, info,
    plan::{print_overview, report_approval},
};
use crate::{
    chat::{ChatContext, RexChat, Sender},
    console::Console,
};

fn context(ctx: &AppContext) -> ChatContext {
    ChatContext {
        user_data: ctx.profile.clone(),
        workout_plan: ctx.active.get(),
        is_workout_mode: false,
        current_exercise: None,
    }
}

fn say(content: &str) {
    println!("{} {}", "Rex:".cyan().bold(), content);
}

pub async fn handle<R: AsyncBufRead + Unpin>(
    ctx: &mut AppContext,
    console: &mut Console<R>,
    message: Vec<String>,
) -> Result<()> {
    let mut rex = RexChat::new(ctx.model.clone(), ctx.source.clone());

    if !message.is_empty() {
        let text = message.join(" ");
        if let Some(reply) = rex.send(&text, &context(ctx)).await {
            say(&reply.content);
        }
        if rex.pending().is_some() {
            decide(&mut rex, ctx, console).await?;
        }
        return Ok(());
    }

    if let Some(greeting) = rex.messages().iter().find(|m| m.sender == Sender::Rex) {
        say(&greeting.content);
    }
    println!("{}", "(empty line or `bye` to leave)".dimmed());

    loop {
        let Some(line) = console.prompt("you>").await? else {
            println!();
            return Ok(());
        };
        if line.is_empty() || matches!(line.to_lowercase().as_str(), "bye" | "exit" | "quit") {
            return Ok(());
        }

        println!("{}", "Rex is thinking...".dimmed());
        if let Some(reply) = rex.send(&line, &context(ctx)).await {
            say(&reply.content);
        }
        if rex.pending().is_some() {
            decide(&mut rex, ctx, console).await?;
        }
    }
}

/// Shows the modification Rex proposed and applies or drops it.
async fn decide<R: AsyncBufRead + Unpin>(
    rex: &mut RexChat,
    ctx: &AppContext,
    console: &mut Console<R>,
) -> Result<()> {
    if let Some(plan) = rex.pending() {
        print_overview(plan);
    }
    if console.confirm("Approve these changes?").await? {
        if let Some(approval) = rex.approve(&ctx.active) {
            info("Plan updated! Your workout plan has been successfully modified.");
            report_approval(&approval);
        }
    } else {
        rex.reject();
        info("Changes rejected. Your original workout plan remains unchanged.");
    }
    Ok(())
}
