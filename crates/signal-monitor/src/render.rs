//! Plain-text rendering of annotated series.

use signal_core::types::{AnnotatedSeries, Signal};
use std::fmt::Write;

const TIME_WIDTH: usize = 19;
const VALUE_WIDTH: usize = 12;

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.4}", value)
    }
}

fn signal_label(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "BUY",
        Signal::Hold => "hold",
        Signal::Sell => "SELL",
    }
}

/// Table of the newest `rows` bars: time, close, every indicator column and the signal.
pub fn render_table(annotated: &AnnotatedSeries, rows: usize) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<TIME_WIDTH$} {:>VALUE_WIDTH$}", "time (UTC)", "close");
    for column in annotated.columns() {
        let _ = write!(out, " {:>VALUE_WIDTH$}", column.name);
    }
    let _ = writeln!(out, " {:>6}", "signal");

    let skip = annotated.len().saturating_sub(rows);
    for (bar, values, signal) in annotated.rows().skip(skip) {
        let _ = write!(
            out,
            "{:<TIME_WIDTH$} {:>VALUE_WIDTH$}",
            bar.datetime().format("%Y-%m-%d %H:%M:%S").to_string(),
            format_value(bar.close)
        );
        for column in annotated.columns() {
            let value = values.get(column.name.as_str()).copied().unwrap_or(f64::NAN);
            let _ = write!(out, " {:>VALUE_WIDTH$}", format_value(value));
        }
        let _ = writeln!(out, " {:>6}", signal_label(signal));
    }

    out
}

/// One-line summary: market, strategy, bar count, signal counts and latest signal.
pub fn render_summary(annotated: &AnnotatedSeries) -> String {
    let series = annotated.series();
    let counts = annotated.signal_counts();
    let latest = annotated
        .latest_signal()
        .map(signal_label)
        .unwrap_or("-");

    format!(
        "{} {} [{}] {} bars | buy {} hold {} sell {} | latest {}",
        series.symbol,
        series.timeframe,
        annotated.strategy(),
        annotated.len(),
        counts.buy,
        counts.hold,
        counts.sell,
        latest
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::types::{Bar, BarSeries, Column, Timeframe};

    fn annotated() -> AnnotatedSeries {
        let bars = (0..4)
            .map(|i| Bar::new(i * 60_000, 1.0, 1.0, 1.0, 10.0 + i as f64, 1.0))
            .collect();
        let series = BarSeries::from_bars("BTC/USDT", Timeframe::Minute1, bars);
        AnnotatedSeries::new(
            series,
            "rsi",
            vec![Column::new("rsi", vec![f64::NAN, f64::NAN, 20.0, 80.0])],
            vec![Signal::Hold, Signal::Hold, Signal::Buy, Signal::Sell],
        )
    }

    #[test]
    fn test_render_table_tail() {
        let table = render_table(&annotated(), 2);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("rsi"));
        assert!(lines[1].starts_with("1970-01-01 00:02:00"));
        assert!(lines[1].contains("20.0000"));
        assert!(lines[1].ends_with("BUY"));
        assert!(lines[2].ends_with("SELL"));
    }

    #[test]
    fn test_undefined_values_render_as_dash() {
        let table = render_table(&annotated(), 10);
        let first_row = table.lines().nth(1).unwrap();
        assert!(first_row.contains(" -"));
        assert!(first_row.ends_with("hold"));
    }

    #[test]
    fn test_render_summary() {
        assert_eq!(
            render_summary(&annotated()),
            "BTC/USDT 1m [rsi] 4 bars | buy 1 hold 2 sell 1 | latest SELL"
        );
    }
}
