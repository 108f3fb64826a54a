use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use flowchart::config::ConfigError;
use flowchart::controller::SetupError;
use flowchart::error::ErrorCode;
use flowchart::reference::ReferenceBuilder;
use flowchart::{PipelineConfig, PipelineController, PipelineError, encoder};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("setup: {0}")]
    Setup(#[from] SetupError),
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
    #[error("cannot read {path}: {source}")]
    ReadInput { path: String, source: std::io::Error },
    #[error("invalid token: {0}")]
    Decode(#[from] encoder::DecodeError),
}

#[derive(Parser, Debug)]
#[command(name = "flowchart", about = "Generate, render, and export PlantUML flowcharts from prompts")]
struct Cli {
    /// Generation service endpoint.
    #[arg(long, global = true, env = "FLOWCHART_GENERATE_URL")]
    generate_url: Option<String>,

    /// Render service base URL.
    #[arg(long, global = true, env = "FLOWCHART_RENDER_BASE_URL")]
    render_base_url: Option<String>,

    /// Directory for flowchart.png.
    #[arg(long, global = true, env = "FLOWCHART_OUT_DIR")]
    out_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a diagram from a prompt and print its source and image URL.
    Generate {
        prompt: String,
        /// Also export the rendered image as PNG.
        #[arg(long)]
        export: bool,
    },
    /// Print the image URL for a PlantUML document (file or stdin).
    Render { file: Option<PathBuf> },
    /// Print the PlantUML source behind a render token.
    Decode { token: String },
    /// Render a PlantUML document (file or stdin) and save it as PNG.
    Export { file: Option<PathBuf> },
    /// Interactive session: prompt, submit, edit, export, reset.
    Session,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Load `.env` first so it can carry `RUST_LOG`, then install the subscriber.
fn init_tracing() {
    let dotenv = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "ignoring malformed .env"),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(url) = cli.generate_url {
        config.generate_url = url;
    }
    if let Some(url) = cli.render_base_url {
        config.render_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(dir) = cli.out_dir {
        config.out_dir = dir;
    }

    match cli.command {
        Command::Generate { prompt, export } => run_generate(&config, prompt, export).await,
        Command::Render { file } => {
            let document = read_document(file.as_ref())?;
            let url = ReferenceBuilder::new(config.render_base_url).reference_for(&document);
            if !url.is_empty() {
                println!("{url}");
            }
            Ok(())
        }
        Command::Decode { token } => {
            println!("{}", encoder::decode(token.trim())?);
            Ok(())
        }
        Command::Export { file } => {
            let document = read_document(file.as_ref())?;
            let mut controller = PipelineController::from_config(&config)?;
            controller.edit_document(document);
            report_export(controller.export().await?);
            Ok(())
        }
        Command::Session => run_session(&config).await,
    }
}

async fn run_generate(config: &PipelineConfig, prompt: String, export: bool) -> Result<(), CliError> {
    let mut controller = PipelineController::from_config(config)?;
    controller.set_prompt(prompt);
    controller.submit().await?;
    println!("{}", controller.state().document());
    println!();
    println!("{}", controller.state().image_reference());
    if export {
        report_export(controller.export().await?);
    }
    Ok(())
}

fn report_export(path: Option<PathBuf>) {
    match path {
        Some(path) => println!("saved {}", path.display()),
        None => println!("nothing to export"),
    }
}

fn read_document(file: Option<&PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|source| CliError::ReadInput { path: path.display().to_string(), source }),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::ReadInput { path: "stdin".into(), source })?;
            Ok(text)
        }
    }
}

// =============================================================================
// INTERACTIVE SESSION
// =============================================================================

const SESSION_HELP: &str = "\
commands:
  prompt <text>   set the prompt
  submit          generate a diagram from the prompt
  edit <file>     replace the document with the contents of <file>
  show            print state, document, and image URL
  export          save the image as flowchart.png
  reset           clear everything
  quit";

/// One line of input to the interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCommand<'a> {
    Blank,
    Prompt(&'a str),
    Submit,
    Edit(&'a str),
    Show,
    Export,
    Reset,
    Quit,
    Help,
}

impl<'a> SessionCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();
        match command {
            "" => Self::Blank,
            "prompt" => Self::Prompt(arg),
            "submit" => Self::Submit,
            "edit" => Self::Edit(arg),
            "show" => Self::Show,
            "export" => Self::Export,
            "reset" => Self::Reset,
            "quit" | "exit" => Self::Quit,
            _ => Self::Help,
        }
    }

    /// Whether running this command can leave a new error on the session.
    fn reports_error(self) -> bool {
        matches!(self, Self::Submit | Self::Export)
    }
}

async fn run_session(config: &PipelineConfig) -> Result<(), CliError> {
    let mut controller = PipelineController::from_config(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{SESSION_HELP}");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(source) => return Err(CliError::ReadInput { path: "stdin".into(), source }),
        };
        let command = SessionCommand::parse(&line);
        match command {
            SessionCommand::Blank => continue,
            SessionCommand::Prompt(text) => controller.set_prompt(text),
            SessionCommand::Submit => {
                if controller.submit().await.is_ok() {
                    print_state(&controller);
                }
            }
            SessionCommand::Edit(path) => match std::fs::read_to_string(path) {
                Ok(text) => println!("{}", controller.edit_document(text)),
                Err(e) => eprintln!("cannot read {path}: {e}"),
            },
            SessionCommand::Show => print_state(&controller),
            SessionCommand::Export => {
                if let Ok(path) = controller.export().await {
                    report_export(path);
                }
            }
            SessionCommand::Reset => controller.reset(),
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{SESSION_HELP}"),
        }
        if command.reports_error() {
            if let Some(err) = controller.state().error() {
                eprintln!("{err} [{}]", err.error_code());
            }
        }
    }
    Ok(())
}

fn print_state(controller: &PipelineController) {
    let state = controller.state();
    println!("state: {:?}", state.phase());
    if !state.prompt().is_empty() {
        println!("prompt: {}", state.prompt());
    }
    if !state.document().is_empty() {
        println!("---\n{}\n---", state.document());
    }
    if !state.image_reference().is_empty() {
        println!("image: {}", state.image_reference());
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
