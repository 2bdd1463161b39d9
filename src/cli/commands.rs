use crate::observations::ExperimentVariant;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::Level;

/// `Sinu` - English tutor chatbot and science observation log.
#[derive(Parser, Debug)]
#[command(name = "sinu")]
#[command(version)]
#[command(about = "A scripted English tutor and classroom experiment log.", long_about = None)]
pub struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Max log level for this invocation. Logs share stderr with the
    /// interactive prompts, so a lesson only logs errors unless `--verbose`
    /// is given. Retry warnings are covered by the apology message.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if matches!(self.command, Commands::Chat { .. }) {
            Level::ERROR
        } else {
            Level::INFO
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a lesson: review quiz, free conversation, then a report card
    Chat {
        /// Model to use (overrides config)
        #[arg(long)]
        model: Option<String>,

        /// Temperature (0.0 - 2.0)
        #[arg(short, long)]
        temperature: Option<f64>,
    },

    /// Add one measurement to an experiment log
    Record {
        /// Experiment to record into
        #[arg(value_enum)]
        variant: ExperimentVariant,

        /// Group name or its number in the list (asked interactively if omitted)
        #[arg(short, long)]
        group: Option<String>,

        /// Measured value, in the experiment's unit
        #[arg(short = 'm', long = "value")]
        value: f64,

        /// Free-form note
        #[arg(short, long, default_value = "")]
        note: String,

        /// Observation date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List every record of an experiment
    Records {
        #[arg(value_enum)]
        variant: ExperimentVariant,
    },

    /// Show per-group averages and the date × group table
    Analyze {
        #[arg(value_enum)]
        variant: ExperimentVariant,
    },

    /// Print the active configuration
    Config,
}
