/// Output formatting: JSON, table and HTML modes. TTY detection.
use std::io::{IsTerminal, Write};

use comfy_table::{Cell, Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::OutputFormat;
use crate::engine::SearchOutcome;
use crate::panel::render::{NO_RESULTS_TEXT, display_value};
use crate::panel::{FieldsTemplate, MatchedFieldTemplate, ResultTemplate, render_panel};
use crate::types::{GroupOutput, MatchOutput, WatchOutput};

/// Resolve the effective output format, handling `--json` flag and TTY auto-detection.
#[must_use]
pub fn resolve_format(fmt: OutputFormat, json_flag: bool) -> OutputFormat {
    if json_flag {
        return OutputFormat::Json;
    }
    if fmt == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        fmt
    }
}

/// Output context passed to all formatters.
pub struct OutputCtx {
    pub format: OutputFormat,
    pub fields: Option<Vec<String>>,
    pub no_header: bool,
    /// When true, print phase timings to stderr.
    pub debug: bool,
    /// Highlight the query in HTML panels.
    pub highlight: bool,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(
        fmt: OutputFormat,
        json_flag: bool,
        fields: Option<&str>,
        no_header: bool,
        debug: bool,
    ) -> Self {
        let format = resolve_format(fmt, json_flag);
        let fields = fields.map(|f| {
            f.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        });
        Self {
            format,
            fields,
            no_header,
            debug,
            highlight: true,
        }
    }

    /// Set whether HTML panels are highlighted (builder style).
    #[must_use]
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Start a named debug timer. Prints elapsed on drop only when `--debug` is set.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> DebugTimer {
        DebugTimer::new(label, self.debug)
    }

    /// Template for the content of each result row.
    fn template(&self) -> Box<dyn ResultTemplate> {
        match &self.fields {
            Some(fields) => Box::new(FieldsTemplate::new(fields.clone())),
            None => Box::new(MatchedFieldTemplate),
        }
    }

    fn panel_html(&self, outcome: &SearchOutcome) -> String {
        render_panel(outcome, self.template().as_ref(), self.highlight).to_html()
    }
}

// --- Search results ---

/// Write the matches of a search to stdout.
pub fn write_outcome(outcome: &SearchOutcome, ctx: &OutputCtx) {
    let matches = MatchOutput::from_outcome(outcome);
    match ctx.format {
        OutputFormat::Json => print_json(&matches),
        OutputFormat::Compact => print_compact_json(&matches),
        OutputFormat::Ndjson => print_ndjson(&matches),
        OutputFormat::Html => println!("{}", ctx.panel_html(outcome)),
        OutputFormat::Table | OutputFormat::Auto => write_matches_table(&matches, ctx),
    }
}

fn write_matches_table(matches: &[MatchOutput], ctx: &OutputCtx) {
    if matches.is_empty() {
        println!("{NO_RESULTS_TEXT}");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);

    match &ctx.fields {
        Some(fields) => {
            if !ctx.no_header {
                let mut headers = vec![Cell::new("GROUP")];
                headers.extend(fields.iter().map(|f| Cell::new(f.to_uppercase())));
                table.set_header(headers);
            }
            for m in matches {
                let mut row = vec![Cell::new(&m.group)];
                row.extend(fields.iter().map(|f| Cell::new(display_value(m.row.get(f)))));
                table.add_row(row);
            }
        }
        None => {
            if !ctx.no_header {
                table.set_header(["GROUP", "FIELD", "VALUE"]);
            }
            for m in matches {
                table.add_row([m.group.as_str(), m.field.as_str(), m.value.as_str()]);
            }
        }
    }

    println!("{table}");
}

// --- Watch events ---

/// Write one `watch` event. Machine formats stream one compact object per line.
pub fn write_watch_event(event: &WatchOutput, outcome: Option<&SearchOutcome>, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json | OutputFormat::Compact | OutputFormat::Ndjson => {
            print_compact_json(event);
        }
        OutputFormat::Html => {
            if let Some(outcome) = outcome {
                println!("{}", ctx.panel_html(outcome));
            }
        }
        OutputFormat::Table | OutputFormat::Auto => match event {
            WatchOutput::Rendered {
                query, matches, ..
            } => {
                println!("» {query}");
                write_matches_table(matches, ctx);
            }
            WatchOutput::Hidden { .. } => println!("» (results hidden)"),
            // Failed searches render nothing; the notice goes through the reporter.
            WatchOutput::Failed { .. } => {}
        },
    }
}

// --- Groups ---

/// Write group list to stdout.
pub fn write_groups(groups: &[GroupOutput], ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json => print_json(groups),
        OutputFormat::Compact => print_compact_json(groups),
        OutputFormat::Ndjson => print_ndjson(groups),
        OutputFormat::Table | OutputFormat::Auto | OutputFormat::Html => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            if !ctx.no_header {
                table.set_header(["GROUP", "RECORDS"]);
            }
            for g in groups {
                table.add_row([g.name.as_str(), &g.records.to_string()]);
            }
            println!("{table}");
        }
    }
}

// --- Error output ---

/// Write a structured error to stderr.
pub fn write_error(err: &crate::types::ErrorOutput, format: OutputFormat, json_flag: bool) {
    let fmt = resolve_format(format, json_flag);
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    match fmt {
        OutputFormat::Json | OutputFormat::Compact | OutputFormat::Ndjson => {
            let s = serde_json::to_string_pretty(err).unwrap_or_default();
            let _ = writeln!(out, "{s}");
        }
        _ => {
            let _ = writeln!(out, "Error: {}", err.error.message);
            if let Some(status) = err.error.status {
                let _ = writeln!(out, "  HTTP status: {status}");
            }
        }
    }
}

// --- Debug timer ---

/// A RAII timer that prints elapsed milliseconds to stderr on drop.
///
/// Created via [`OutputCtx::timer`]. Does nothing when `debug` is false.
pub struct DebugTimer {
    label: &'static str,
    start: std::time::Instant,
    active: bool,
}

impl DebugTimer {
    #[must_use]
    fn new(label: &'static str, active: bool) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
            active,
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        if self.active {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            eprintln!("[debug] {}: {ms:.2}ms", self.label);
        }
    }
}

// --- Generic JSON helpers ---

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

fn print_compact_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

fn print_ndjson<T: Serialize>(values: &[T]) {
    for v in values {
        match serde_json::to_string(v) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("JSON serialization error: {e}"),
        }
    }
}
