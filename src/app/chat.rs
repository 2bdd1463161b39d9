//! Interactive lesson loop on top of [`TutorSession`].

use super::render;
use crate::Config;
use crate::error::TutorError;
use crate::providers::create_resilient_provider;
use crate::tutor::{SessionSettings, Transition, TurnOutput, TutorSession};
use anyhow::{Result, ensure};
use console::style;
use dialoguer::{Input, Select};
use tracing::info;

const QUIT_COMMAND: &str = "/quit";
const HELP_SHORTCUT: &str = "/help";

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Send(String),
    Choose(usize),
    Help,
    Quit,
}

fn interpret_input(text: &str, help_available: bool) -> Action {
    match text.trim() {
        QUIT_COMMAND => Action::Quit,
        HELP_SHORTCUT if help_available => Action::Help,
        _ => Action::Send(text.to_string()),
    }
}

pub async fn run(config: &Config, model: Option<String>, temperature: Option<f64>) -> Result<()> {
    let mut settings = SessionSettings::from_config(config);
    if let Some(model) = model {
        settings.model = model;
    }
    if let Some(temperature) = temperature {
        ensure!(
            (0.0..=2.0).contains(&temperature),
            "temperature must be in [0.0, 2.0], got {temperature}"
        );
        settings.temperature = temperature;
    }

    let provider = create_resilient_provider(config);
    provider.warmup().await?;
    let model_name = settings.model.clone();
    let mut session = TutorSession::new(provider, settings);
    info!(session = %session.id(), model = %model_name, "Lesson started");

    println!();
    println!("  {}", style(t!("chat.title")).white().bold());
    println!(
        "  {}",
        style(t!("chat.quit_hint", command = QUIT_COMMAND)).dim()
    );
    println!();
    println!("{}", render::tutor_message(session.greeting()));

    loop {
        let result = match next_action(&session)? {
            Action::Quit => {
                println!("  {}", style(t!("chat.goodbye")).dim());
                return Ok(());
            }
            Action::Send(text) => session.advance(&text).await,
            Action::Choose(index) => session.choose_option(index).await,
            Action::Help => session.request_help().await,
        };

        match result {
            Ok(TurnOutput::Reply {
                message,
                transition,
                ..
            }) => {
                if transition == Transition::ConversationStarted {
                    println!("  {}", style(t!("chat.conversation_started")).dim());
                }
                println!("{}", render::tutor_message(&message));
            }
            Ok(TurnOutput::Unavailable { apology }) => {
                println!("{}", render::tutor_message(&style(apology).yellow().to_string()));
            }
            Ok(TurnOutput::ReportReady { notice, report }) => {
                println!("\n  {}", style(notice).green().bold());
                println!("{}", render::report_card(&report));
                info!(
                    session = %session.id(),
                    turns = session.state().turn_count(),
                    "Lesson finished"
                );
                return Ok(());
            }
            Err(TutorError::EmptyMessage) => {}
            Err(e) => println!("  {} {e}", style("✗").red()),
        }
    }
}

fn next_action(session: &TutorSession) -> Result<Action> {
    let options = session.pending_options();
    if !options.is_empty() {
        let mut items: Vec<String> = options.iter().map(|o| format!("› {o}")).collect();
        items.push(format!("✎ {}", t!("chat.write_own")));
        let index = Select::new()
            .with_prompt(format!("  {}", t!("chat.choose")))
            .items(&items)
            .default(0)
            .interact()?;
        if index < options.len() {
            return Ok(Action::Choose(index));
        }
    }

    let help_available = session.can_request_help();
    let prompt = if help_available {
        t!("chat.prompt_with_help", command = HELP_SHORTCUT)
    } else {
        t!("chat.prompt")
    };
    let text: String = Input::new()
        .with_prompt(format!("  {prompt}"))
        .allow_empty(true)
        .interact_text()?;
    Ok(interpret_input(&text, help_available))
}
