use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::ExerciseEdit;

#[derive(Parser, Debug)]
#[command(name = "rex", version, about = "AI fitness coach: workout plans and guided sessions")]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Load the active plan from a TOML file at start-up.
    #[arg(global = true, long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// Without a command, an interactive shell starts.
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer the profile questionnaire and generate a plan
    #[command(visible_alias = "o")]
    Onboard {
        /// Read the profile from a TOML file instead of prompting
        #[arg(short, long, value_name = "FILE")]
        profile: Option<PathBuf>,

        /// Write the collected profile to a TOML file
        #[arg(long, value_name = "FILE")]
        save_profile: Option<PathBuf>,

        /// Approve the generated plan without reviewing it
        #[arg(short, long)]
        yes: bool,
    },

    /// Inspect and change the active plan
    #[command(subcommand, visible_alias = "p")]
    Plan(PlanCmd),

    /// Today's workout, plan stats and a quote
    #[command(visible_alias = "d")]
    Dashboard,

    /// Month view of scheduled training days
    #[command(visible_alias = "cal")]
    Calendar {
        /// Year to show (defaults to current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show (1-12, defaults to current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Sets per muscle group and minutes per training day
    Charts,

    /// Start today's workout
    #[command(visible_alias = "s")]
    Session,

    /// Talk to Rex. Without a message, opens a conversation
    Chat {
        /// One-off message
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// View or edit rex config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Subcommand, Debug)]
pub enum PlanCmd {
    /// Overview of the active plan
    #[command(visible_alias = "ls")]
    Show,

    /// Every exercise with sets, reps, weight, rest and cues
    #[command(visible_alias = "i")]
    Details {
        /// Only this day (1-based index or weekday name)
        day: Option<String>,
    },

    /// Ask Rex to rework the plan from a description
    #[command(visible_alias = "m")]
    #[command(override_usage = "plan modify <INSTRUCTIONS>...")]
    Modify {
        #[arg(required = true, trailing_var_arg = true)]
        instructions: Vec<String>,

        /// Approve the result without reviewing it
        #[arg(short, long)]
        yes: bool,
    },

    /// Change fields of one exercise - Usage: plan edit DAY EXERCISE --sets 4
    #[command(visible_alias = "e")]
    Edit {
        /// Day index (1-based)
        #[arg(value_name = "DAY")]
        day: usize,

        /// Exercise index within the day (1-based)
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        #[command(flatten)]
        edit: ExerciseEdit,
    },

    /// Write the active plan to a TOML file
    Export { file: PathBuf },

    /// Replace the active plan with one from a TOML file
    Import {
        file: PathBuf,

        /// Replace without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Forget the active plan
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Show every key
    #[command(visible_alias = "ls")]
    List,

    /// Print one key
    Get { key: String },

    /// Set a key
    Set { key: String, val: String },

    /// Remove a key
    #[command(visible_alias = "rm")]
    Unset { key: String },
}
