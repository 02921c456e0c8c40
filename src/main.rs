use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use product_analysis_lib::commands::{self, AnalyzeOutcome, AnalyzeRequest, CheckStatus};
use product_analysis_lib::config::{load_merged_config, CliOverrides};
use product_analysis_lib::AnalysisDepth;

/// Product Analysis - run a product idea through a sequence of analyst agents
#[derive(Parser, Debug)]
#[command(name = "product-analysis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the global config.toml
    #[arg(long, global = true, env = "PRODUCT_ANALYSIS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a product idea (default)
    Analyze(AnalyzeArgs),
    /// List stored ideas
    Ideas,
    /// Check configuration, API key and output directory
    Doctor,
    /// Manage provider tokens in secrets.toml
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SecretsAction {
    /// Store the API token for a provider; prompted for when --token is omitted
    Set {
        /// Provider preset id (openrouter, openai, gemini)
        provider: String,

        /// Token value
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    /// Idea text; prompted for when omitted
    #[arg(long)]
    idea: Option<String>,

    /// Analysis depth; prompted for when omitted
    #[arg(long, value_enum)]
    depth: Option<DepthArg>,

    /// Answer every stage with placeholder text instead of calling the provider
    #[arg(long)]
    dry_run: bool,

    /// Do not open the report when it is written
    #[arg(long)]
    no_open: bool,

    /// Model name for the selected provider
    #[arg(long)]
    model: Option<String>,

    /// Provider preset (openrouter, openai, gemini, ollama)
    #[arg(long)]
    provider: Option<String>,

    /// Directory receiving chart images
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DepthArg {
    Quick,
    Full,
}

impl From<DepthArg> for AnalysisDepth {
    fn from(depth: DepthArg) -> Self {
        match depth {
            DepthArg::Quick => AnalysisDepth::Quick,
            DepthArg::Full => AnalysisDepth::Full,
        }
    }
}

impl AnalyzeArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            output_dir: self.output_dir.clone(),
            dry_run: self.dry_run.then_some(true),
            open_in_browser: self.no_open.then_some(false),
        }
    }
}

fn main() {
    // API keys may live in a local .env
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Ideas) => run_ideas(cli.config),
        Some(Command::Doctor) => run_doctor(cli.config),
        Some(Command::Secrets { action }) => run_secrets(action),
        Some(Command::Analyze(args)) => run_analyze(cli.config, args),
        None => run_analyze(cli.config, AnalyzeArgs::default()),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run_analyze(config_path: Option<PathBuf>, args: AnalyzeArgs) -> Result<bool> {
    let config = load_merged_config(config_path.as_deref(), Some(args.overrides()))?;

    let idea = match args.idea {
        Some(idea) => idea,
        None => prompt_line("Enter your product idea: ")?,
    };
    let depth = match args.depth {
        Some(depth) => depth.into(),
        None => prompt_depth()?,
    };

    let request = AnalyzeRequest { idea, depth };
    match commands::analyze(&config, &request)? {
        AnalyzeOutcome::Quick {
            stage_title,
            text,
            failed,
            ..
        } => {
            println!("\n=== {} ===\n", stage_title);
            println!("{}", text);
            Ok(!failed)
        }
        AnalyzeOutcome::Full {
            report_path,
            chart_files,
            skipped_charts,
            failed_stages,
            ..
        } => {
            println!("\nReport written to {}", report_path.display());
            println!("{} charts in {}", chart_files.len(), config.report.output_dir.display());
            if !skipped_charts.is_empty() {
                println!("Skipped charts: {}", skipped_charts.join(", "));
            }
            if !failed_stages.is_empty() {
                println!("Failed stages: {}", failed_stages.join(", "));
            }
            Ok(true)
        }
    }
}

fn run_ideas(config_path: Option<PathBuf>) -> Result<bool> {
    let config = load_merged_config(config_path.as_deref(), None)?;
    let ideas = commands::list_ideas(&config)?;

    if ideas.is_empty() {
        println!("No ideas stored in {}", config.storage.ideas_file.display());
        return Ok(true);
    }
    for (i, idea) in ideas.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}",
            i + 1,
            idea.submitted_at.format("%Y-%m-%d %H:%M"),
            idea.text
        );
    }
    Ok(true)
}

fn run_doctor(config_path: Option<PathBuf>) -> Result<bool> {
    let config = load_merged_config(config_path.as_deref(), None)?;
    let report = commands::doctor(&config, config_path.as_deref());

    for check in &report.checks {
        let mark = match check.status {
            CheckStatus::Pass => "ok  ",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "FAIL",
        };
        println!("[{}] {:<11} {}", mark, check.name, check.detail);
    }
    Ok(report.is_healthy())
}

fn run_secrets(action: SecretsAction) -> Result<bool> {
    match action {
        SecretsAction::Set { provider, token } => {
            let token = match token {
                Some(token) => token,
                None => prompt_line(&format!("Token for {}: ", provider))?,
            };
            let path = commands::set_secret(&provider, &token)?;
            println!("Stored token for {} in {}", provider, path.display());
            Ok(true)
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Err(anyhow!("No input"));
    }
    Ok(line.trim().to_string())
}

fn prompt_depth() -> Result<AnalysisDepth> {
    println!("Choose analysis depth:");
    println!("  1. Quick (first stage only, no report)");
    println!("  2. Full (all stages, charts and HTML report)");
    loop {
        let choice = prompt_line("Enter 1 or 2: ")?;
        match AnalysisDepth::from_choice(&choice) {
            Some(depth) => return Ok(depth),
            None => println!("Please enter 1 or 2."),
        }
    }
}
