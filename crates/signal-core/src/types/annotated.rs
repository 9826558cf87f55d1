//! Bar series annotated with indicator columns and per-bar signals.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

use super::{Bar, BarSeries, Signal};

/// A named indicator column, one value per bar.
///
/// Values are `f64::NAN` where the indicator's lookback is not yet satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of bars for which the column is defined.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}

/// How many bars carry each signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub buy: usize,
    pub hold: usize,
    pub sell: usize,
}

/// Immutable view of a series plus the output of one strategy run.
///
/// Every column and the signal vector have exactly one entry per bar.
#[derive(Debug, Clone)]
pub struct AnnotatedSeries {
    series: BarSeries,
    strategy: String,
    columns: Vec<Column>,
    signals: Vec<Signal>,
}

impl AnnotatedSeries {
    /// Pair a series snapshot with its indicator columns and signals.
    pub fn new(
        series: BarSeries,
        strategy: impl Into<String>,
        columns: Vec<Column>,
        signals: Vec<Signal>,
    ) -> Self {
        debug_assert_eq!(signals.len(), series.len());
        debug_assert!(columns.iter().all(|c| c.values.len() == series.len()));
        Self {
            series,
            strategy: strategy.into(),
            columns,
            signals,
        }
    }

    /// The annotated bars.
    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    /// Name of the strategy that produced the annotation.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// All indicator columns in the order the strategy produced them.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up an indicator column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Per-bar signals.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Signal of the newest bar.
    pub fn latest_signal(&self) -> Option<Signal> {
        self.signals.last().copied()
    }

    pub fn signal_counts(&self) -> SignalCounts {
        self.signals
            .iter()
            .fold(SignalCounts::default(), |mut counts, signal| {
                match signal {
                    Signal::Buy => counts.buy += 1,
                    Signal::Hold => counts.hold += 1,
                    Signal::Sell => counts.sell += 1,
                }
                counts
            })
    }

    /// Iterate rows of (bar, indicator values by column name, signal).
    pub fn rows(&self) -> impl Iterator<Item = (&Bar, BTreeMap<&str, f64>, Signal)> + '_ {
        self.series
            .iter()
            .zip(self.signals.iter())
            .enumerate()
            .map(move |(i, (bar, signal))| {
                let values = self
                    .columns
                    .iter()
                    .map(|c| (c.name.as_str(), c.values[i]))
                    .collect();
                (bar, values, *signal)
            })
    }
}

/// Row shape used for serialization; NaN becomes `null`.
#[derive(serde::Serialize)]
struct RowView<'a> {
    #[serde(flatten)]
    bar: &'a Bar,
    #[serde(flatten)]
    indicators: BTreeMap<&'a str, Option<f64>>,
    signal: Signal,
}

impl Serialize for AnnotatedSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows()
            .map(|(bar, values, signal)| RowView {
                bar,
                indicators: values
                    .into_iter()
                    .map(|(name, v)| (name, if v.is_nan() { None } else { Some(v) }))
                    .collect(),
                signal,
            })
            .collect();

        let mut state = serializer.serialize_struct("AnnotatedSeries", 4)?;
        state.serialize_field("symbol", &self.series.symbol)?;
        state.serialize_field("timeframe", &self.series.timeframe)?;
        state.serialize_field("strategy", &self.strategy)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}
