//! Terminal rendering of the dashboard page.

use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use console::{style, Term};
use queuewatch_core::view::{element, PLACEHOLDER};
use tokio::sync::watch;

use crate::page::{Page, PageSnapshot};

const ID_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 12;
const MEDIA_WIDTH: usize = 13;
const TIME_WIDTH: usize = 25;

/// Redraws a [`Page`] on the terminal whenever it changes.
pub struct TerminalView {
    page: Arc<Page>,
    term: Term,
    title: String,
}

impl TerminalView {
    pub fn new(page: Arc<Page>, title: impl Into<String>) -> Self {
        Self {
            page,
            term: Term::stdout(),
            title: title.into(),
        }
    }

    /// Clear the screen and draw the current page.
    pub fn draw(&self) -> io::Result<()> {
        let frame = render_snapshot(&self.page.snapshot(), &self.title);
        self.term.clear_screen()?;
        self.term.write_str(&frame)
    }

    /// Redraw on every page change until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut revisions = self.page.subscribe();

        if let Err(e) = self.draw() {
            tracing::warn!(error = %e, "Failed to draw dashboard");
        }

        loop {
            tokio::select! {
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Err(e) = self.draw() {
                        tracing::warn!(error = %e, "Failed to draw dashboard");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

/// Render a page snapshot as styled text.
pub fn render_snapshot(snapshot: &PageSnapshot, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(title).bold().cyan());
    let _ = writeln!(out);

    let counters = [
        ("Queued", element::QUEUED),
        ("Processing", element::PROCESSING),
        ("Done", element::DONE),
        ("Failed", element::FAILED),
    ];
    let counts: Vec<String> = counters
        .iter()
        .map(|(label, id)| {
            format!(
                "{} {}",
                style(format!("{}:", label)).dim(),
                style(snapshot.text_or_placeholder(id)).bold()
            )
        })
        .collect();
    let _ = writeln!(out, "  {}", counts.join("   "));
    let _ = writeln!(
        out,
        "  {} {}   {} {}",
        style("p50:").dim(),
        latency(snapshot, element::P50),
        style("p95:").dim(),
        latency(snapshot, element::P95),
    );
    let _ = writeln!(out);

    let header = format!(
        "{:<id$}{:<status$}{:<media$}{:<time$}{}",
        "ID",
        "STATUS",
        "MEDIA",
        "CREATED",
        "UPDATED",
        id = ID_WIDTH,
        status = STATUS_WIDTH,
        media = MEDIA_WIDTH,
        time = TIME_WIDTH,
    );
    let _ = writeln!(out, "  {}", style(header).underlined());

    if snapshot.jobs.is_empty() {
        let _ = writeln!(out, "  {}", style("no jobs").dim());
    }

    for row in &snapshot.jobs {
        let status = format!("{:<width$}", row.status, width = STATUS_WIDTH);
        let status = match row.status.as_str() {
            "done" => style(status).green(),
            "failed" => style(status).red(),
            "processing" => style(status).yellow(),
            _ => style(status).cyan(),
        };
        let _ = writeln!(
            out,
            "  {:<id$}{}{:<media$}{:<time$}{}",
            row.short_id,
            status,
            row.media,
            row.created,
            row.updated,
            id = ID_WIDTH,
            media = MEDIA_WIDTH,
            time = TIME_WIDTH,
        );
    }

    out
}

fn latency(snapshot: &PageSnapshot, id: &str) -> String {
    match snapshot.texts.get(id) {
        Some(text) if text != PLACEHOLDER => format!("{}s", text),
        _ => PLACEHOLDER.to_string(),
    }
}
