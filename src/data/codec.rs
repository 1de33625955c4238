use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use super::model::{
    BRIGHTNESS_COLUMN, Dataset, Observation, PREDICTIONS_COLUMN, TRUE_SIZE_COLUMN,
};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// How the header row is mapped onto the dataset schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Look up `Brightness` and `True Size` (and optionally `predictions`)
    /// by exact, case-sensitive name after trimming whitespace.
    ByName,
    /// Exactly two columns, taken as `Brightness`, `True Size` in that order
    /// whatever the header says.
    Positional,
}

/// Column indices resolved from the header row.
struct Layout {
    brightness: usize,
    true_size: usize,
    predictions: Option<usize>,
}

impl Layout {
    fn resolve(headers: &[String], mode: HeaderMode) -> Result<Self> {
        match mode {
            HeaderMode::Positional => {
                if headers.len() != 2 {
                    return Err(DataError::schema(format!(
                        "expected exactly 2 columns, found {}",
                        headers.len()
                    )));
                }
                Ok(Layout {
                    brightness: 0,
                    true_size: 1,
                    predictions: None,
                })
            }
            HeaderMode::ByName => {
                let find = |name: &str| headers.iter().position(|h| h == name);
                match (find(BRIGHTNESS_COLUMN), find(TRUE_SIZE_COLUMN)) {
                    (Some(brightness), Some(true_size)) => Ok(Layout {
                        brightness,
                        true_size,
                        predictions: find(PREDICTIONS_COLUMN),
                    }),
                    _ => Err(DataError::schema(format!(
                        "Columns '{BRIGHTNESS_COLUMN}' and '{TRUE_SIZE_COLUMN}' are required in the dataset"
                    ))),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Parse a CSV byte stream, resolving columns by name.
pub fn decode(bytes: &[u8]) -> Result<Dataset> {
    decode_with(bytes, HeaderMode::ByName)
}

/// Parse a CSV byte stream with the given header mapping.
///
/// Header names and cell values are trimmed before use. A row with the wrong
/// number of fields, a non-UTF-8 body or a non-numeric cell is
/// [`DataError::MalformedInput`]; missing columns are [`DataError::Schema`].
pub fn decode_with(bytes: &[u8], mode: HeaderMode) -> Result<Dataset> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DataError::malformed(format!("input is not UTF-8: {e}")))?;
    if text.trim().is_empty() {
        return Err(DataError::malformed("input is empty"));
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let layout = Layout::resolve(&headers, mode)?;

    let mut observations = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let brightness = parse_cell(&record, layout.brightness, row_no, BRIGHTNESS_COLUMN)?;
        let true_size = parse_cell(&record, layout.true_size, row_no, TRUE_SIZE_COLUMN)?;
        let prediction = match layout.predictions {
            Some(idx) if !record.get(idx).unwrap_or("").is_empty() => {
                Some(parse_cell(&record, idx, row_no, PREDICTIONS_COLUMN)?)
            }
            _ => None,
        };
        observations.push(Observation {
            brightness,
            true_size,
            prediction,
        });
    }

    Ok(Dataset {
        observations,
        prediction_column: layout.predictions.is_some(),
    })
}

fn parse_cell(record: &StringRecord, idx: usize, row: usize, col: &str) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>().map_err(|_| {
        DataError::malformed(format!("row {row}, column '{col}': '{raw}' is not a number"))
    })
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize a dataset as CSV: header row first, then one row per
/// observation in order. The `predictions` column is written when any row
/// carries a prediction; rows without one get an empty cell.
pub fn encode(dataset: &Dataset) -> Result<Vec<u8>> {
    let with_predictions = dataset.has_predictions();
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_predictions {
        writer.write_record([BRIGHTNESS_COLUMN, TRUE_SIZE_COLUMN, PREDICTIONS_COLUMN])?;
    } else {
        writer.write_record([BRIGHTNESS_COLUMN, TRUE_SIZE_COLUMN])?;
    }

    for obs in &dataset.observations {
        if with_predictions {
            writer.serialize((obs.brightness, obs.true_size, obs.prediction))?;
        } else {
            writer.serialize((obs.brightness, obs.true_size))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| DataError::Render(format!("flushing CSV output: {e}")))
}
