use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tempcheck_core::temperature::{recommended_scenario, MAX_TEMPERATURE, MIN_TEMPERATURE};
use tempcheck_core::{
    classify, Config, Credential, GeminiClient, GenerationOutcome, RequestController,
    ResolvePolicy, ScenarioId, Temperature,
};
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

/// Environment variable consulted for the API key at startup.
const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Parser)]
#[command(name = "tempcheck", version)]
#[command(about = "The Coder vs. The Poet: see how LLM temperature changes the output")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Starting temperature (0.0 - 2.0)
    #[arg(short, long, global = true, value_parser = parse_temperature)]
    temperature: Option<Temperature>,

    /// Gemini model to use
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Base URL of the generation API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only let the most recently started request update the output
    #[arg(long, global = true)]
    last_started_wins: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every slider position with its color, zone, and recommendation
    Zones,
    /// Generate once for a scenario and print the result
    Generate {
        /// Scenario to run: coder or poet
        #[arg(value_parser = parse_scenario)]
        scenario: ScenarioId,
        /// Prompt to use instead of the scenario default
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Write a config file with default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_temperature(s: &str) -> Result<Temperature, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
        return Err(format!(
            "temperature must be between {MIN_TEMPERATURE:.1} and {MAX_TEMPERATURE:.1}"
        ));
    }
    Ok(Temperature::new(value))
}

fn parse_scenario(s: &str) -> Result<ScenarioId, String> {
    ScenarioId::from_str(s).ok_or_else(|| format!("unknown scenario '{s}' (expected coder or poet)"))
}

impl Cli {
    fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::get_config_path(),
        }
    }

    /// File settings with command-line overrides applied.
    fn settings(&self) -> Result<Config> {
        let config = Config::load_from(&self.config_path()?)?;
        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(temperature) = self.temperature {
            config.default_temperature = temperature;
        }
        if self.last_started_wins {
            config.resolve_policy = ResolvePolicy::LastStarted;
        }
        config
    }
}

fn build_controller(config: &Config) -> Result<RequestController> {
    let client = GeminiClient::from_config(config).context("Failed to build HTTP client")?;
    let mut controller = RequestController::new(Arc::new(client))
        .with_policy(config.resolve_policy)
        .with_temperature(config.default_temperature);

    if let Some(credential) = Credential::from_env(API_KEY_ENV) {
        controller.set_credential(credential);
    }
    Ok(controller)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            let config = cli.settings()?;
            run_tui(&config).await
        }
        Some(Commands::Zones) => {
            print_zones();
            Ok(())
        }
        Some(Commands::Generate { scenario, prompt }) => {
            logging::init_stderr_logging()?;
            let config = cli.settings()?;
            generate_once(&config, *scenario, prompt.as_deref()).await
        }
        Some(Commands::InitConfig { force }) => init_config(&cli, *force),
    }
}

async fn run_tui(config: &Config) -> Result<()> {
    let log_path = match logging::init_file_logging() {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };
    let controller = build_controller(config)?;
    info!(
        model = %config.model,
        policy = ?config.resolve_policy,
        log = ?log_path,
        "starting tempcheck"
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(controller, config.model.clone());
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if app.controller.in_flight() > 0 {
        warn!(in_flight = app.controller.in_flight(), "exiting with requests still in flight");
    }
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;

        for pending in app.take_dispatched() {
            events.spawn_generation(pending);
        }
    }
    Ok(())
}

async fn generate_once(config: &Config, scenario: ScenarioId, prompt: Option<&str>) -> Result<()> {
    let mut controller = build_controller(config)?;
    if let Some(prompt) = prompt {
        controller.prompts_mut().set(scenario, prompt);
    }

    let zone = classify(controller.temperature()).zone;
    let outcome = controller.run(scenario).await;
    match outcome {
        GenerationOutcome::Succeeded { text, .. } => {
            let title = scenario.scenario().title;
            let badge = outcome.badge().unwrap_or_default();
            println!("{title} · {badge} · {}", zone.short_name());
            println!();
            println!("{text}");
            Ok(())
        }
        GenerationOutcome::Failed { message, .. } => bail!("{message}"),
        other => bail!("generation did not complete: {other:?}"),
    }
}

fn print_zones() {
    println!("{:<6} {:<20} {:<15} Recommended", "Temp", "Color", "Zone");
    for temperature in Temperature::all() {
        let classification = classify(temperature);
        let recommended = recommended_scenario(temperature)
            .map(|id| id.scenario().title)
            .unwrap_or("-");
        println!(
            "{:<6} {:<20} {:<15} {}",
            temperature.to_string(),
            classification.color.to_string(),
            classification.zone.short_name(),
            recommended
        );
    }
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = cli.config_path()?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    // An existing file is replaced, not merged
    let config = cli.apply_overrides(Config::default());
    config.save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
