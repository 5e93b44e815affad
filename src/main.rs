use anyhow::{Context, Result};
use clap::Parser;
use rexcoach::{
    cli::Cli,
    commands::{self, AppContext},
    console::Console,
    llm::model_from_settings,
    storage::import_plan,
    types::{Config, OutputFmt, Settings},
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rex=warn,rexcoach=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config_path = Config::default_path()?;
    let settings = Settings::resolve(&Config::load(&config_path)?);
    tracing::debug!(model = %settings.model, api_base = %settings.api_base, "settings resolved");

    let mut ctx = AppContext::new(model_from_settings(&settings), config_path);
    if cli.json {
        ctx.fmt = OutputFmt::Json;
    }
    if let Some(path) = &cli.plan {
        let plan = import_plan(path).with_context(|| format!("loading --plan {}", path.display()))?;
        ctx.active.set(plan);
    }

    let mut console = Console::stdin();
    match cli.cmd {
        Some(cmd) => commands::dispatch(cmd, &mut ctx, &mut console).await?,
        None => commands::shell::run(&mut ctx, &mut console).await?,
    }

    Ok(())
}
