//! CSV export of annotated series.

use csv::Writer;
use signal_core::error::{SignalError, SignalResult};
use signal_core::types::AnnotatedSeries;
use std::io::Write;
use std::path::Path;

/// Write one row per bar: time, OHLCV, indicator columns, signal.
///
/// Undefined indicator values are written as empty fields.
pub fn write_csv<W: Write>(annotated: &AnnotatedSeries, out: W) -> SignalResult<()> {
    let mut writer = Writer::from_writer(out);
    let serialization = |e: csv::Error| SignalError::Serialization(e.to_string());

    let mut header = vec!["timestamp", "datetime", "open", "high", "low", "close", "volume"];
    header.extend(annotated.columns().iter().map(|c| c.name.as_str()));
    header.push("signal");
    writer.write_record(&header).map_err(serialization)?;

    for (i, (bar, signal)) in annotated
        .series()
        .iter()
        .zip(annotated.signals())
        .enumerate()
    {
        let mut record = vec![
            bar.timestamp.to_string(),
            bar.datetime().format("%Y-%m-%d %H:%M:%S").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        for column in annotated.columns() {
            let value = column.values[i];
            record.push(if value.is_nan() {
                String::new()
            } else {
                value.to_string()
            });
        }
        record.push(signal.value().to_string());
        writer.write_record(&record).map_err(serialization)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the annotated series to a file.
pub fn save_csv(annotated: &AnnotatedSeries, path: impl AsRef<Path>) -> SignalResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv(annotated, file)
}
