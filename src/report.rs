//! Terminal rendering of a finished scan.

use tabled::{Table, Tabled, settings::Style};

use crate::domain::SetupSignal;
use crate::engine::{ScanState, TimeframeReport};
use crate::utils::TimeUtils;

#[derive(Tabled)]
struct SignalRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Setup")]
    direction: String,
    #[tabled(rename = "Close")]
    close: String,
}

impl From<&SetupSignal> for SignalRow {
    fn from(s: &SetupSignal) -> Self {
        Self {
            symbol: s.symbol.clone(),
            direction: s.direction.to_string(),
            close: s.reference_close.to_string(),
        }
    }
}

fn bucket(out: &mut String, title: &str, signals: &[SetupSignal]) {
    if signals.is_empty() {
        return;
    }
    let table = Table::new(signals.iter().map(SignalRow::from))
        .with(Style::rounded())
        .to_string();
    out.push_str(&format!("  {} ({})\n{}\n", title, signals.len(), table));
}

fn timeframe_section(out: &mut String, report: &TimeframeReport) {
    out.push_str(&format!("\n== {} == {} scanned", report.timeframe, report.scanned));
    if report.skipped_insufficient > 0 {
        out.push_str(&format!(", {} with too few candles", report.skipped_insufficient));
    }
    out.push('\n');

    if report.signal_count() == 0 {
        out.push_str("  No cradle setups.\n");
    } else {
        bucket(out, "Current candle", &report.current);
        bucket(out, "Second-last candle", &report.second_last);
    }

    for f in &report.failures {
        out.push_str(&format!("  ⚠ {} skipped: {}\n", f.symbol, f.reason));
    }
}

pub fn render(state: &ScanState) -> String {
    let mut out = String::new();
    match state.last_scanned {
        Some(at) => out.push_str(&format!(
            "Last scanned: {}\n",
            at.format(TimeUtils::STANDARD_TIME_FORMAT)
        )),
        None => out.push_str("Not scanned yet.\n"),
    }

    for report in &state.reports {
        timeframe_section(&mut out, report);
    }

    if state.cancelled {
        out.push_str("\nScan was cancelled, results are partial.\n");
    }
    if !state.reports.is_empty() && state.total_signals() == 0 {
        out.push_str("\nNo setups found on any timeframe.\n");
    }
    out
}
