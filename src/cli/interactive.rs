//! Line-oriented interactive session.
//!
//! Each input line is parsed into a [`ReplCommand`] and applied to the
//! session; pending notices are printed after every command.

use std::path::PathBuf;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::render;
use crate::error::AppResult;
use crate::output::ClipboardSink;
use crate::replies::GenerationMode;
use crate::session::Session;
use crate::strategy::{Strategy, Template};

const HELP: &str = "\
Commands:
  message <text>        set the incoming message (\\n for a line break)
  context <text>        set the context and goal
  template <name>       fill both fields: work, friend or customer
  strategy <ID>         select a strategy (again to deselect)
  strategies            list strategies
  mode <m>              single, multiple or compare
  generate              draft a reply for the current mode
  save                  save the single reply to history
  history [n]           list saved replies
  load <id>             restore a saved reply
  copy [n]              copy the reply (n picks a variation or strategy)
  export <dir>          write the single reply to a text file
  clear                 clear all output
  show                  show inputs and the current result
  stats                 usage statistics
  help                  this text
  quit                  leave";

/// A parsed interactive command.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Set the incoming message.
    Message(String),
    /// Set the context.
    Context(String),
    /// Apply a template.
    Template(Template),
    /// Toggle a strategy.
    Strategy(Strategy),
    /// List strategies.
    Strategies,
    /// Switch mode.
    Mode(GenerationMode),
    /// Generate.
    Generate,
    /// Save to history.
    Save,
    /// List history.
    History(usize),
    /// Load a history entry.
    Load(i64),
    /// Copy a reply; the index is zero-based.
    Copy(Option<usize>),
    /// Export to a directory.
    Export(PathBuf),
    /// Clear output.
    Clear,
    /// Show session.
    Show,
    /// Show stats.
    Stats,
    /// Print help.
    Help,
    /// Leave the loop.
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "message" | "m" => ReplCommand::Message(unescape(rest)),
        "context" | "c" => ReplCommand::Context(unescape(rest)),
        "template" | "t" => {
            ReplCommand::Template(Template::lookup(rest).map_err(|e| e.to_string())?)
        }
        "strategy" | "s" => {
            ReplCommand::Strategy(Strategy::lookup(rest).map_err(|e| e.to_string())?)
        }
        "strategies" => ReplCommand::Strategies,
        "mode" => ReplCommand::Mode(rest.parse()?),
        "generate" | "g" => ReplCommand::Generate,
        "save" => ReplCommand::Save,
        "history" => ReplCommand::History(parse_optional(rest)?.unwrap_or(20)),
        "load" => ReplCommand::Load(
            rest.parse()
                .map_err(|_| format!("Expected a history id, got '{}'", rest))?,
        ),
        "copy" => ReplCommand::Copy(match parse_optional::<usize>(rest)? {
            Some(0) => return Err("Items are numbered from 1".to_string()),
            Some(n) => Some(n - 1),
            None => None,
        }),
        "export" => {
            if rest.is_empty() {
                return Err("Usage: export <dir>".to_string());
            }
            ReplCommand::Export(PathBuf::from(rest))
        }
        "clear" => ReplCommand::Clear,
        "show" => ReplCommand::Show,
        "stats" => ReplCommand::Stats,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("Unknown command '{}'. Type help.", other)),
    };
    Ok(Some(command))
}

fn parse_optional<T: std::str::FromStr>(rest: &str) -> Result<Option<T>, String> {
    if rest.is_empty() {
        return Ok(None);
    }
    rest.parse()
        .map(Some)
        .map_err(|_| format!("Expected a number, got '{}'", rest))
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Apply `command`. Returns the text to print, or `None` to quit.
pub async fn apply(
    command: ReplCommand,
    session: &mut Session,
    clipboard: &mut dyn ClipboardSink,
) -> Option<String> {
    let output = match command {
        ReplCommand::Message(text) => {
            session.set_message(text);
            String::new()
        }
        ReplCommand::Context(text) => {
            session.set_context(text);
            String::new()
        }
        ReplCommand::Template(template) => {
            session.apply_template(template);
            render::render_session(session)
        }
        ReplCommand::Strategy(strategy) => {
            session.toggle_strategy(strategy);
            match session.strategy() {
                Some(s) => format!("Strategy: {}", s.details().name),
                None => "Strategy cleared".to_string(),
            }
        }
        ReplCommand::Strategies => render::render_strategies(),
        ReplCommand::Mode(mode) => {
            session.set_mode(mode);
            format!("Mode: {}", mode.label())
        }
        ReplCommand::Generate => {
            println_flush("Generating...").await;
            match session.generate().await {
                Ok(()) => session
                    .current_result()
                    .map(|r| render::render_result(&r, session.strategy()))
                    .unwrap_or_default(),
                Err(_) => String::new(),
            }
        }
        ReplCommand::Save => match session.save_to_history().await {
            Ok(entry) => format!("Saved as {}", entry.id),
            Err(_) => String::new(),
        },
        ReplCommand::History(limit) => render::render_history(session.history(), limit),
        ReplCommand::Load(id) => match session.load_history_entry(id) {
            Ok(()) => render::render_session(session),
            Err(_) => String::new(),
        },
        ReplCommand::Copy(index) => match session.copyable_text(index) {
            Some(text) => {
                let _ = session.copy_text(clipboard, &text);
                String::new()
            }
            None => "Nothing to copy".to_string(),
        },
        ReplCommand::Export(dir) => match session.export_single(&dir).await {
            Ok(path) => format!("Wrote {}", path.display()),
            Err(_) => String::new(),
        },
        ReplCommand::Clear => {
            session.clear_output();
            String::new()
        }
        ReplCommand::Show => render::render_session(session),
        ReplCommand::Stats => render::render_stats(session.stats()),
        ReplCommand::Help => HELP.to_string(),
        ReplCommand::Quit => return None,
    };
    Some(output)
}

async fn println_flush(text: &str) {
    let mut stdout = tokio::io::stdout();
    let _ = stdout.write_all(format!("{}\n", text).as_bytes()).await;
    let _ = stdout.flush().await;
}

/// Run the loop on stdin until `quit` or end of input.
pub async fn run(session: &mut Session, clipboard: &mut dyn ClipboardSink) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println_flush("Emailer Legend Pro. Type help for commands.").await;

    loop {
        let _ = stdout.write_all(b"> ").await;
        let _ = stdout.flush().await;

        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };

        let output = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                debug!(?command, "Interactive command");
                match apply(command, session, clipboard).await {
                    Some(output) => output,
                    None => break,
                }
            }
            Err(message) => message,
        };

        let mut text = output.trim_end().to_string();
        for notice in session.notifications_mut().active(Instant::now()) {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&render::render_notice(&notice));
        }
        session.notifications_mut().drain();

        if !text.is_empty() {
            println_flush(&text).await;
        }
    }

    Ok(())
}
