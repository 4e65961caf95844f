pub mod view;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::catalog::Artwork;
use crate::pager::SelectionSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn build_records(selection: &SelectionSet) -> Vec<&Artwork> {
    selection.iter().collect()
}

pub fn render_text(records: &[&Artwork]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&r.id.to_string());
        out.push('\t');
        out.push_str(&r.title);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(records: &[&Artwork]) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]".to_vec());
    out.push(b'\n');
    out
}

pub fn render_selection(selection: &SelectionSet, format: OutputFormat) -> Vec<u8> {
    let records = build_records(selection);
    match format {
        OutputFormat::Text => render_text(&records),
        OutputFormat::Json => render_json(&records),
    }
}

/// Write the selection to `path`. Returns the number of records written.
pub async fn export_selection(
    selection: &SelectionSet,
    path: &str,
    format: Option<OutputFormat>,
) -> Result<usize, String> {
    let format = format
        .or_else(|| infer_format_from_path(path))
        .unwrap_or(OutputFormat::Text);
    let rendered = render_selection(selection, format);

    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file '{path}': {e}"))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
    Ok(selection.len())
}

/// Spinner shown on stderr while the pager is busy.
pub struct BusyIndicator {
    spinner: Option<ProgressBar>,
    hidden: bool,
}

impl BusyIndicator {
    pub fn new(hidden: bool) -> Self {
        Self {
            spinner: None,
            hidden,
        }
    }

    pub fn set(&mut self, busy: bool) {
        match (busy, self.spinner.is_some()) {
            (true, false) => {
                let pb = ProgressBar::new_spinner();
                if self.hidden {
                    pb.set_draw_target(ProgressDrawTarget::hidden());
                } else {
                    pb.set_draw_target(ProgressDrawTarget::stderr());
                }
                if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                    pb.set_style(style);
                }
                pb.set_message("loading...");
                pb.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(pb);
            }
            (false, true) => {
                if let Some(pb) = self.spinner.take() {
                    pb.finish_and_clear();
                }
            }
            _ => {}
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }
}
