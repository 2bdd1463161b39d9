use crate::Config;
use crate::cli::{Cli, Commands};
use crate::observations::{ExperimentVariant, Observation, ObservationStore, analyze};
use anyhow::{Context, Result, bail};
use chrono::Local;
use dialoguer::Select;
use tracing::info;

use super::render;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    rust_i18n::set_locale(&config.tutor.locale);

    match cli.command {
        Commands::Chat { model, temperature } => {
            super::chat::run(&config, model, temperature).await
        }

        Commands::Record {
            variant,
            group,
            value,
            note,
            date,
        } => {
            let group = match group {
                Some(input) => match variant.resolve_group(&input) {
                    Some(group) => group,
                    None => bail!(
                        "{}",
                        t!(
                            "observations.unknown_group",
                            group = input,
                            groups = variant.groups().join(", ")
                        )
                    ),
                },
                None => pick_group(variant)?,
            };
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let store = ObservationStore::new(config.observations_dir());
            let observation = Observation::new(date, group, value, note);
            store.append(variant, &observation)?;
            println!(
                "  ✓ {}",
                t!(
                    "observations.saved",
                    title = variant.title(),
                    path = store.path_for(variant).display()
                )
            );
            Ok(())
        }

        Commands::Records { variant } => {
            let store = ObservationStore::new(config.observations_dir());
            let records = store.records(variant)?;
            println!("{}", render::records_table(variant, &records));
            Ok(())
        }

        Commands::Analyze { variant } => {
            let store = ObservationStore::new(config.observations_dir());
            let analysis = analyze(&store, variant)?;
            info!(variant = %variant, records = analysis.record_count, "Analysis complete");
            println!("{}", render::analysis_report(&analysis));
            Ok(())
        }

        Commands::Config => {
            println!("{}", render::config_summary(&config));
            Ok(())
        }
    }
}

fn pick_group(variant: ExperimentVariant) -> Result<&'static str> {
    let groups = variant.groups();
    let index = Select::new()
        .with_prompt(format!("  {}", t!("observations.select_group")))
        .items(groups)
        .default(0)
        .interact()
        .context("Failed to read group selection")?;
    Ok(groups[index])
}
