//! Hackathon Architect
//!
//! CLI entry point: the TUI by default, batch generation and section listing
//! as subcommands.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use futures::future::join_all;
use tracing::{debug, info};

use blueprint::blueprint::{AnalysisStatus, Gallery, Orchestrator, RenderStyle, Section, extract};
use blueprint::cli::{Cli, Command, generate_after_help, get_log_path};
use blueprint::config::Config;
use blueprint::export;
use blueprint::llm::{LlmClient, create_client};
use blueprint::prompts::PromptLoader;
use blueprint::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        text_model = %config.llm.text_model,
        image_model = %config.llm.image_model,
        "Blueprint loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Generate { problem, images, out }) => {
            debug!(images, ?out, "main: matched Generate command");
            cmd_generate(&config, &problem, images, out).await
        }
        Some(Command::Sections) => {
            debug!("main: matched Sections command");
            cmd_sections();
            Ok(())
        }
        None => {
            debug!("main: no command specified, launching TUI");
            cmd_tui(&config).await
        }
    }
}

fn workdir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Launch the interactive TUI
async fn cmd_tui(config: &Config) -> Result<()> {
    debug!("cmd_tui: called");
    // A missing key is not fatal here: the run surfaces it as its Error state
    let client = create_client(&config.llm).context("Failed to create generation client")?;
    let prompts = PromptLoader::new(workdir());
    tui::run(client, prompts, config.output_dir.expanded()).await
}

/// Generate one blueprint and print it
async fn cmd_generate(config: &Config, problem: &str, images: bool, out: Option<PathBuf>) -> Result<()> {
    debug!(images, ?out, "cmd_generate: called");
    config.validate()?;

    let problem = if problem == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read problem statement from stdin")?;
        buf
    } else {
        problem.to_string()
    };
    if problem.trim().is_empty() {
        return Err(eyre!("Problem statement is empty"));
    }

    let client = create_client(&config.llm).context("Failed to create generation client")?;
    let mut orchestrator = Orchestrator::new(PromptLoader::new(workdir()));

    eprintln!("{}", "Generating blueprint...".dimmed());
    orchestrator.run(Arc::clone(&client), &problem).await;
    let result = match (orchestrator.status(), orchestrator.result()) {
        (AnalysisStatus::Success, Some(result)) => result.clone(),
        _ => {
            let reason = orchestrator.error().unwrap_or("unknown error");
            return Err(eyre!("Blueprint generation failed: {}", reason));
        }
    };

    for (section, text) in result.iter() {
        let view = extract(text);
        println!("{}", format!("==== {}. {} ====", section.index() + 1, section.label()).bold().cyan());
        match section.render_style() {
            RenderStyle::Code => println!("{}", view.display_text.green()),
            RenderStyle::Text => println!("{}", view.display_text),
        }
        for (i, prompt) in view.prompts.iter().enumerate() {
            println!("{}", format!("  [visual {}] {}", i + 1, prompt.replace('\n', " ")).dimmed());
        }
        println!();
    }

    let mut gallery = Gallery::new(orchestrator.generation(), &result);
    if images {
        generate_all_images(&mut gallery, client).await;
    }

    if images || out.is_some() {
        let base = out.unwrap_or_else(|| config.output_dir.expanded());
        let dir = export::export_blueprint(&base, &problem, &result, &gallery.images())
            .context("Failed to export blueprint")?;
        println!("{} {}", "Exported to".green(), dir.display());
    }

    Ok(())
}

/// Generate visuals section by section
///
/// Only one section's prompts are in flight at a time.
async fn generate_all_images(gallery: &mut Gallery, client: Arc<dyn LlmClient>) {
    debug!("generate_all_images: called");
    for section in Section::ALL {
        let jobs = gallery.show(section);
        if jobs.is_empty() {
            continue;
        }
        eprintln!(
            "{}",
            format!("Generating {} visual(s) for {}...", jobs.len(), section.label()).dimmed()
        );
        let outcomes = join_all(jobs.into_iter().map(|job| job.run(Arc::clone(&client)))).await;
        for outcome in outcomes {
            gallery.complete(outcome);
        }
    }
    gallery.hide();

    let stats = gallery.stats();
    let summary = format!("Visuals: {} generated, {} failed", stats.success, stats.error);
    if stats.error > 0 {
        eprintln!("{}", summary.yellow());
    } else {
        eprintln!("{}", summary.green());
    }
}

/// List the nine sections
fn cmd_sections() {
    debug!("cmd_sections: called");
    println!("{}", format!("{:<3} {:<11} {:<22} {}", "#", "TAB", "LABEL", "MARKER").bold());
    for section in Section::ALL {
        println!(
            "{:<3} {:<11} {:<22} {}",
            section.index() + 1,
            section.tab_id().cyan(),
            section.label(),
            section.marker().dimmed()
        );
    }
}
