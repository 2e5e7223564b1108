//! Status command - one refresh of every endpoint, printed once
//!
//! `newsdeskctl status`
//! Runs both refresh groups against an in-memory page, then prints the page.
//! Exits non-zero when any endpoint failed.

use crate::errors::{EXIT_BACKEND_UNAVAILABLE, EXIT_SUCCESS};
use crate::poller::{PollerOptions, StatusPoller};
use crate::render::{Cell, IndicatorState, PageModel, TargetContent, Tone};
use crate::source::HttpStatusSource;
use anyhow::Result;
use newsdesk_common::{DashboardConfig, DisplayTargets, Endpoint, FetchError};
use owo_colors::OwoColorize;
use serde_json::json;
use std::fmt::Write;
use std::sync::Arc;

/// Execute `newsdeskctl status`, returning the process exit code
pub async fn execute_status_command(config: &DashboardConfig, as_json: bool) -> Result<i32> {
    let source = Arc::new(HttpStatusSource::new(&config.api, &config.http)?);
    let page = Arc::new(PageModel::for_targets(&config.targets));
    let poller = StatusPoller::new(
        source,
        page.clone(),
        config.targets.clone(),
        PollerOptions::from_config(config),
    );

    let (frequent, infrequent) =
        tokio::join!(poller.load_frequent_data(), poller.load_infrequent_data());

    let mut failures: Vec<(Endpoint, &FetchError)> = frequent.failures();
    failures.extend(infrequent.failures());

    if as_json {
        let targets: serde_json::Map<String, serde_json::Value> = page
            .snapshot()
            .into_iter()
            .map(|(name, content)| serde_json::to_value(content).map(|value| (name, value)))
            .collect::<Result<_, serde_json::Error>>()?;
        let errors: serde_json::Map<String, serde_json::Value> = failures
            .iter()
            .map(|(endpoint, e)| (endpoint.to_string(), json!(e.to_string())))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "targets": targets, "errors": errors }))?
        );
    } else {
        print!("{}", render_page(&page, &config.targets, true));
        if !failures.is_empty() {
            println!();
            println!("{}", paint("Failures:", Tone::Plain, true).bold());
            for (endpoint, e) in &failures {
                println!("  {} {}: {}", paint("✗", Tone::Danger, true), endpoint, e);
            }
        }
    }

    Ok(if failures.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_BACKEND_UNAVAILABLE
    })
}

/// Apply a tone's color when `colored` is set
pub fn paint(text: &str, tone: Tone, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    match tone {
        Tone::Plain => text.to_string(),
        Tone::Primary => text.blue().to_string(),
        Tone::Secondary => text.bright_black().to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Danger => text.red().to_string(),
        Tone::Dark => text.dimmed().to_string(),
    }
}

fn cell_text(cell: &Cell, colored: bool) -> String {
    let text = if cell.badge {
        format!("[{}]", cell.text)
    } else {
        cell.text.clone()
    };
    paint(&text, cell.tone, colored)
}

fn content_text(content: Option<TargetContent>, colored: bool) -> String {
    match content {
        Some(TargetContent::Text(s)) => s,
        Some(TargetContent::Indicator(state)) => paint(state.label(), state.tone(), colored),
        _ => paint("-", Tone::Dark, colored),
    }
}

/// Plain-text rendition of the whole page
pub fn render_page(page: &PageModel, targets: &DisplayTargets, colored: bool) -> String {
    let mut out = String::new();
    let heading = |title: &str| {
        if colored {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    };

    let _ = writeln!(out, "{}", heading("Newsdesk Status"));
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Articles:"));
    let labels = [
        "Total",
        "Pending",
        "Processing",
        "Processed",
        "Published",
        "Failed",
        "Published today",
    ];
    for (label, target) in labels.iter().zip(targets.stat_targets()) {
        let _ = writeln!(
            out,
            "  {:<16} {}",
            label,
            content_text(page.content(target), colored)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("AI keys:"));
    match page.rows(&targets.ai_status_container) {
        Some(rows) if !rows.is_empty() => {
            for row in rows {
                let cells: Vec<String> = row.cells.iter().map(|c| cell_text(c, colored)).collect();
                let _ = writeln!(out, "  {}", cells.join(" "));
            }
        }
        _ => {
            let _ = writeln!(out, "  {}", paint("no data", Tone::Dark, colored));
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Services:"));
    let _ = writeln!(
        out,
        "  {:<16} {}",
        "Scheduler",
        content_text(page.content(&targets.scheduler_status), colored)
    );
    if let Some(next_run) = page.text(&targets.scheduler_next_run) {
        let _ = writeln!(out, "  {:<16} {}", "", next_run);
    }
    let wordpress = match page.indicator(&targets.wordpress_status) {
        Some(state) => paint(state.label(), state.tone(), colored),
        None => paint(IndicatorState::Unknown.label(), Tone::Warning, colored),
    };
    let _ = writeln!(out, "  {:<16} {}", "WordPress", wordpress);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", heading("Recent articles:"));
    match page.rows(&targets.recent_articles_body) {
        Some(rows) if !rows.is_empty() => {
            for row in rows {
                let cells: Vec<String> = row.cells.iter().map(|c| cell_text(c, colored)).collect();
                let _ = writeln!(out, "  {}", cells.join("  "));
            }
        }
        _ => {
            let _ = writeln!(out, "  {}", paint("no data", Tone::Dark, colored));
        }
    }

    out
}
