//! Command-line surface.
//!
//! One-shot subcommands operate on a hydrated [`Session`] and return a
//! [`CliResult`]; `interactive` hands the session to the line-oriented loop
//! in [`interactive`].

pub mod interactive;
pub mod render;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::output::ClipboardSink;
use crate::replies::GenerationMode;
use crate::session::Session;
use crate::strategy::{Strategy, Template};

/// Draft replies to difficult messages with a chosen communication strategy.
#[derive(Parser, Debug)]
#[command(name = "emailer-legend", version, about)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the communication strategies
    Strategies,

    /// List the built-in message templates
    Templates,

    /// Generate a reply
    Generate(GenerateArgs),

    /// Show saved replies, newest first
    History {
        /// Maximum number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Print a saved reply
    Show {
        /// History entry id
        id: i64,
    },

    /// Show usage statistics
    Stats,

    /// Start an interactive drafting session
    Interactive,
}

/// Arguments for `generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Generation mode: single, multiple or compare
    #[arg(long, default_value = "single")]
    pub mode: GenerationMode,

    /// Strategy id, e.g. BUILD_RAPPORT (required for single and multiple)
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Incoming message text, or @PATH to read it from a file
    #[arg(long, conflicts_with = "template")]
    pub message: Option<String>,

    /// Fill message and context from a template: work, friend or customer
    #[arg(long)]
    pub template: Option<Template>,

    /// Context and goal text, or @PATH to read it from a file
    #[arg(long)]
    pub context: Option<String>,

    /// Save the reply to history (single mode)
    #[arg(long)]
    pub save: bool,

    /// Export the reply to a text file in this directory (single mode)
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Copy the reply to the clipboard
    #[arg(long)]
    pub copy: bool,
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a one-shot command. `interactive` is handled by the caller.
pub async fn execute_command(
    command: Commands,
    session: &mut Session,
    clipboard: &mut dyn ClipboardSink,
) -> CliResult {
    match command {
        Commands::Strategies => CliResult::success(render::render_strategies()),
        Commands::Templates => CliResult::success(render::render_templates()),
        Commands::Generate(args) => execute_generate(args, session, clipboard).await,
        Commands::History { limit } => {
            CliResult::success(render::render_history(session.history(), limit))
        }
        Commands::Show { id } => execute_show(id, session),
        Commands::Stats => CliResult::success(render::render_stats(session.stats())),
        Commands::Interactive => CliResult::error("interactive mode must be started from main"),
    }
}

async fn execute_generate(
    args: GenerateArgs,
    session: &mut Session,
    clipboard: &mut dyn ClipboardSink,
) -> CliResult {
    if let Err(e) = apply_generate_args(&args, session) {
        return CliResult::error(e.to_string());
    }

    if let Err(e) = session.generate().await {
        return CliResult::error(e.to_string());
    }

    let Some(result) = session.current_result() else {
        return CliResult::error("No result was produced");
    };
    let mut out = render::render_result(&result, session.strategy());

    if args.save {
        match session.save_to_history().await {
            Ok(entry) => out.push_str(&format!("\nSaved to history as {}\n", entry.id)),
            Err(e) => return CliResult::error(format!("{}{}", out, e)),
        }
    }

    if let Some(dir) = &args.export {
        match session.export_single(dir).await {
            Ok(path) => out.push_str(&format!("\nExported to {}\n", path.display())),
            Err(e) => return CliResult::error(format!("{}{}", out, e)),
        }
    }

    if args.copy {
        let Some(text) = session.copyable_text(None) else {
            return CliResult::error(format!("{}Nothing to copy", out));
        };
        if let Err(e) = session.copy_text(clipboard, &text) {
            return CliResult::error(format!("{}{}", out, e));
        }
        out.push_str("\nCopied to clipboard\n");
    }

    CliResult::success(out)
}

/// Move `generate` arguments into the session inputs.
fn apply_generate_args(args: &GenerateArgs, session: &mut Session) -> AppResult<()> {
    if let Some(template) = args.template {
        session.apply_template(template);
    }
    if let Some(message) = &args.message {
        session.set_message(read_text_arg(message)?);
    }
    if let Some(context) = &args.context {
        session.set_context(read_text_arg(context)?);
    }
    session.set_mode(args.mode);
    session.select_strategy(args.strategy);
    Ok(())
}

fn execute_show(id: i64, session: &mut Session) -> CliResult {
    match session.load_history_entry(id) {
        Ok(()) => match session.current_result() {
            Some(result) => CliResult::success(render::render_result(&result, session.strategy())),
            None => CliResult::error("Entry could not be loaded"),
        },
        Err(e) => CliResult::error(e.to_string()),
    }
}

/// Literal text, or the contents of a file when prefixed with `@`.
pub fn read_text_arg(value: &str) -> AppResult<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            AppError::validation(format!("Could not read {}: {}", path, e))
        }),
        None => Ok(value.to_string()),
    }
}
