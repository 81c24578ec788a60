//! CSV Waveform Source

use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Column holding the APG samples in device exports
pub const DEFAULT_WAVE_COLUMN: &str = "APG Wave";

/// Errors reading a waveform source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Column '{column}' not found (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Read one numeric column of a CSV source.
///
/// Blank or unparsable cells become NaN, which the preprocessor imputes.
pub fn read_wave_column<R: io::Read>(reader: R, column: &str) -> Result<Vec<f64>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let Some(position) = headers.iter().position(|h| h == column) else {
        return Err(SourceError::MissingColumn {
            column: column.to_string(),
            available: headers.iter().map(str::to_string).collect(),
        });
    };

    let mut samples = Vec::new();
    let mut unparsable = 0usize;
    for record in reader.records() {
        let record = record?;
        let sample = match record.get(position) {
            Some(cell) if !cell.is_empty() => cell.parse::<f64>().unwrap_or_else(|_| {
                unparsable += 1;
                f64::NAN
            }),
            _ => f64::NAN,
        };
        samples.push(sample);
    }

    if unparsable > 0 {
        warn!(column, unparsable, "Unparsable cells treated as missing");
    }
    debug!(column, samples = samples.len(), "Read waveform column");
    Ok(samples)
}

/// Read one numeric column of a CSV file
pub fn read_wave_file(path: impl AsRef<Path>, column: &str) -> Result<Vec<f64>, SourceError> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    read_wave_column(io::BufReader::new(file), column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_named_column() {
        let data = "Time,APG Wave\n0,0.5\n1,-0.25\n2,1.0\n";
        let samples = read_wave_column(data.as_bytes(), DEFAULT_WAVE_COLUMN).unwrap();
        assert_eq!(samples, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn test_blank_and_bad_cells_are_missing() {
        let data = "APG Wave,Other\n1.0,x\n,y\nabc,z\n2.0\n";
        let samples = read_wave_column(data.as_bytes(), "APG Wave").unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 1.0);
        assert!(samples[1].is_nan());
        assert!(samples[2].is_nan());
        assert_eq!(samples[3], 2.0);
    }

    #[test]
    fn test_short_rows_are_missing() {
        let data = "Time,APG Wave\n0,1.5\n1\n";
        let samples = read_wave_column(data.as_bytes(), "APG Wave").unwrap();
        assert_eq!(samples[0], 1.5);
        assert!(samples[1].is_nan());
    }

    #[test]
    fn test_missing_column() {
        let data = "Time,PPG\n0,1\n";
        match read_wave_column(data.as_bytes(), "APG Wave") {
            Err(SourceError::MissingColumn { column, available }) => {
                assert_eq!(column, "APG Wave");
                assert_eq!(available, vec!["Time".to_string(), "PPG".to_string()]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_wave_file("/nonexistent/wave.csv", DEFAULT_WAVE_COLUMN),
            Err(SourceError::Csv(_))
        ));
    }
}
