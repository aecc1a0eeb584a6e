use anyhow::Context;
use clap::Parser;
use inquire::{InquireError, Text};
use std::path::{Path, PathBuf};
use store_portal::utils::{logger, validation::Validate};
use store_portal::{CliConfig, EtlEngine, LocalStorage, PortalConfig, PortalError, PortalPipeline};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting store-portal");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match cli.portal_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Could not load portal config: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    match &cli.dir {
        Some(dir) => {
            if let Err(e) = run_directory(dir, &cli, &config) {
                report_failure(&e);
                std::process::exit(e.exit_code());
            }
        }
        None => interactive(&cli, &config)?,
    }

    Ok(())
}

/// Prompts for directories until the user quits.
fn interactive(cli: &CliConfig, config: &PortalConfig) -> anyhow::Result<()> {
    loop {
        let answer = match Text::new("Enter the directory").prompt() {
            Ok(answer) => answer,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(())
            }
            Err(e) => return Err(e).context("failed to read directory"),
        };

        let dir = PathBuf::from(answer.trim());
        if !dir.is_dir() {
            println!("Invalid directory!");
        } else if let Err(e) = run_directory(&dir, cli, config) {
            report_failure(&e);
        }

        let again = match Text::new(
            "Press \"Q\" to Quit or any other key to work on another directory.",
        )
        .prompt()
        {
            Ok(again) => again,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(())
            }
            Err(e) => return Err(e).context("failed to read answer"),
        };

        if again.trim().eq_ignore_ascii_case("q") {
            return Ok(());
        }
    }
}

fn run_directory(dir: &Path, cli: &CliConfig, config: &PortalConfig) -> Result<(), PortalError> {
    let storage = LocalStorage::new(dir);
    let mut pipeline = PortalPipeline::new(storage, config.clone(), cli.format);
    if let Some(output) = &cli.output {
        pipeline = pipeline.with_export(LocalStorage::new(output));
    }

    let run = EtlEngine::new(pipeline).run()?;
    println!("{}", run.rendered);

    let (_, summary) = &run.model;
    for outcome in summary.failed_stages() {
        if let Some(err) = &outcome.error {
            eprintln!("⚠️  {}: {}", outcome.stage, err.user_friendly_message());
        }
    }

    Ok(())
}

fn report_failure(e: &PortalError) {
    tracing::error!("❌ Run failed: {} (Severity: {:?})", e, e.severity());
    eprintln!("❌ {}", e.user_friendly_message());
}
