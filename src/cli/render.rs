//! Plain-text rendering of catalog entries, results, history and notices.

use std::fmt::Write;

use crate::replies::{ComparisonResult, ReplyResult, SingleResult, VariationsResult};
use crate::session::{History, Notice, NoticeLevel, Session, Status, UsageStats};
use crate::strategy::{Strategy, Template};

const RULE: &str = "───────────────────────────────────────────────────────────────";

/// The strategy catalog, one block per strategy.
pub fn render_strategies() -> String {
    let mut out = String::new();
    for strategy in Strategy::all() {
        let details = strategy.details();
        let _ = writeln!(
            out,
            "{:<20} {}: {}",
            strategy.id(),
            details.name,
            details.description
        );
        let _ = writeln!(out, "{:<20} {}", "", strategy.instruction());
    }
    out
}

/// The built-in templates.
pub fn render_templates() -> String {
    let mut out = String::new();
    for template in Template::ALL {
        let _ = writeln!(out, "[{}]", template.name());
        let _ = writeln!(out, "  message: {}", first_line(template.message()));
        let _ = writeln!(out, "  context: {}", template.context());
    }
    out
}

/// A generation result under its mode heading.
pub fn render_result(result: &ReplyResult, strategy: Option<Strategy>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.mode().label());
    let _ = writeln!(out, "{}", RULE);
    match result {
        ReplyResult::Single(single) => render_single(&mut out, single, strategy),
        ReplyResult::Variations(variations) => render_variations(&mut out, variations),
        ReplyResult::Comparison(comparison) => render_comparison(&mut out, comparison),
    }
    out
}

fn render_single(out: &mut String, single: &SingleResult, strategy: Option<Strategy>) {
    if let Some(strategy) = strategy {
        let _ = writeln!(out, "Strategy: {}", strategy.details().name);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", single.reply);
    let _ = writeln!(out);
    let _ = writeln!(out, "Analysis: {}", single.analysis);
}

fn render_variations(out: &mut String, variations: &VariationsResult) {
    for (i, variation) in variations.variations.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "[{}] {}", i + 1, variation.title);
        let _ = writeln!(out, "{}", variation.reply);
    }
}

fn render_comparison(out: &mut String, comparison: &ComparisonResult) {
    for (i, item) in comparison.comparison.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out);
        }
        let marker = if comparison.is_best(item) {
            "  ★ recommended"
        } else {
            ""
        };
        let _ = writeln!(out, "[{}] {}{}", i + 1, item.strategy_name, marker);
        let _ = writeln!(out, "{}", item.reply);
        let _ = writeln!(out, "Analysis: {}", item.analysis);
    }
}

/// Saved replies, newest first, at most `limit`.
pub fn render_history(history: &History, limit: usize) -> String {
    if history.is_empty() {
        return "No saved replies yet.\n".to_string();
    }

    let mut out = String::new();
    for entry in history.entries().iter().take(limit) {
        let strategy = entry
            .strategy
            .map(|s| s.details().name)
            .unwrap_or(crate::session::NOT_APPLICABLE);
        let _ = writeln!(
            out,
            "{}  {}  {:<20}  {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            strategy,
            preview(&entry.response, 60)
        );
    }
    out
}

/// Usage counters.
pub fn render_stats(stats: UsageStats) -> String {
    format!(
        "Responses generated: {}\nTime saved: {} min\n",
        stats.total_responses, stats.time_saved_minutes
    )
}

/// A one-line notice.
pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
        NoticeLevel::Info => "info",
    };
    format!("[{}] {}", tag, notice.message)
}

/// Inputs, selection and the active result.
pub fn render_session(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mode:     {}", session.mode().label());
    let _ = writeln!(
        out,
        "Strategy: {}",
        session
            .strategy()
            .map(|s| s.id())
            .unwrap_or("(none)")
    );
    let _ = writeln!(out, "Message:  {}", preview(session.message(), 70));
    let _ = writeln!(out, "Context:  {}", preview(session.context(), 70));
    if session.status() == Status::Loading {
        let _ = writeln!(out, "Generating...");
    }
    let _ = writeln!(out);
    match session.current_result() {
        Some(result) => out.push_str(&render_result(&result, session.strategy())),
        None => out.push_str("Your AI-generated response will appear here\n"),
    }
    out
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Single-line preview, cut to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
