pub mod calendar;
pub mod charts;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod onboard;
pub mod plan;
pub mod session;
pub mod shell;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use colored::Colorize;
use tokio::io::AsyncBufRead;

use crate::{
    cli::Commands,
    console::Console,
    llm::TextModel,
    models::{Plan, Profile},
    planner::{PlanSource, Planner},
    storage::ActivePlan,
    types::OutputFmt,
};

/// Everything a command needs; lives for the whole process (or shell).
pub struct AppContext {
    pub fmt: OutputFmt,
    pub active: ActivePlan,
    pub profile: Option<Profile>,
    pub model: Arc<dyn TextModel>,
    pub source: Arc<dyn PlanSource>,
    pub config_path: PathBuf,
}

impl AppContext {
    pub fn new(model: Arc<dyn TextModel>, config_path: PathBuf) -> Self {
        let source = Arc::new(Planner::new(model.clone()));
        Self {
            fmt: OutputFmt::Text,
            active: ActivePlan::new(),
            profile: None,
            model,
            source,
            config_path,
        }
    }

    /// Active plan, or prints how to get one.
    pub fn require_plan(&self) -> Option<Plan> {
        let plan = self.active.get();
        if plan.is_none() {
            println!(
                "{} no active plan; run `rex onboard` or `rex plan import FILE`",
                "error:".red().bold()
            );
        }
        plan
    }
}

pub async fn dispatch<R: AsyncBufRead + Unpin>(
    cmd: Commands,
    ctx: &mut AppContext,
    console: &mut Console<R>,
) -> Result<()> {
    match cmd {
        Commands::Onboard {
            profile,
            save_profile,
            yes,
        } => onboard::handle(ctx, console, profile, save_profile, yes).await,
        Commands::Plan(cmd) => plan::handle(cmd, ctx, console).await,
        Commands::Dashboard => dashboard::handle(ctx),
        Commands::Calendar { year, month } => calendar::handle(ctx, year, month),
        Commands::Charts => charts::handle(ctx),
        Commands::Session => session::handle(ctx, console).await,
        Commands::Chat { message } => chat::handle(ctx, console, message).await,
        Commands::Config(cmd) => config::handle(cmd, ctx),
    }
}

pub(crate) fn ok(msg: impl std::fmt::Display) {
    println!("{} {}", "ok:".green().bold(), msg);
}

pub(crate) fn info(msg: impl std::fmt::Display) {
    println!("{} {}", "info:".blue().bold(), msg);
}

pub(crate) fn warning(msg: impl std::fmt::Display) {
    println!("{} {}", "warning:".yellow().bold(), msg);
}

pub(crate) fn error(msg: impl std::fmt::Display) {
    println!("{} {}", "error:".red().bold(), msg);
}
