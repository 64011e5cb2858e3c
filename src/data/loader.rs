use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{
    Dataset, Publication, COUNTRY_COLUMN, FIRST_GENDER_COLUMN, KNOWN_COLUMNS, LAST_GENDER_COLUMN,
    TOPICS_COLUMN, YEAR_COLUMN,
};
use super::tags::parse_tag_list;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a publication table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; `MeSH_Clean` holds a string-encoded list
/// * `.json`    – `[{ "Year": 2012, "Country": "Japan", ... }, ...]`
/// * `.parquet` – `MeSH_Clean` as a string column or a list of strings
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut decoder = RowDecoder::default();
    let dataset = match ext.as_str() {
        "csv" => load_csv(path, &mut decoder)?,
        "json" => load_json(path, &mut decoder)?,
        "parquet" | "pq" => load_parquet(path, &mut decoder)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!("Loaded {} records from {}", dataset.len(), path.display());
    if decoder.malformed_tags > 0 {
        log::warn!(
            "{}: {} rows had an unreadable {TOPICS_COLUMN} list and were given no topics",
            path.display(),
            decoder.malformed_tags
        );
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Shared cell decoding
// ---------------------------------------------------------------------------

/// Cell-level decoding shared by all formats; tallies malformed tag lists.
#[derive(Debug, Default)]
struct RowDecoder {
    malformed_tags: usize,
}

impl RowDecoder {
    fn topics(&mut self, raw: Option<&str>) -> BTreeSet<String> {
        match raw.map(parse_tag_list) {
            None => BTreeSet::new(),
            Some(Some(tags)) => tags,
            Some(None) => {
                self.malformed_tags += 1;
                BTreeSet::new()
            }
        }
    }
}

/// Parse a year written either as an integer or as an integral float
/// (`2012.0`, which is how pandas writes nullable integer columns).
fn parse_year(text: &str, row: usize) -> Result<i32, LoadError> {
    let trimmed = text.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Ok(year);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(year_from_f64)
        .ok_or_else(|| LoadError::InvalidYear {
            row,
            value: text.to_string(),
        })
}

fn year_from_f64(value: f64) -> Option<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i32)
}

/// Blank cells are treated as missing.
fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; the five known columns are
/// required, all other columns are kept as extra preview columns.
fn load_csv(path: &Path, decoder: &mut RowDecoder) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let year_idx = column(YEAR_COLUMN)?;
    let country_idx = column(COUNTRY_COLUMN)?;
    let topics_idx = column(TOPICS_COLUMN)?;
    let first_idx = column(FIRST_GENDER_COLUMN)?;
    let last_idx = column(LAST_GENDER_COLUMN)?;

    let extra_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !KNOWN_COLUMNS.contains(&h.as_str()))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let extra = extra_columns
            .iter()
            .map(|(idx, name)| (name.clone(), cell(*idx).to_string()))
            .collect();

        records.push(Publication {
            year: parse_year(cell(year_idx), row_no)?,
            country: non_empty(cell(country_idx)),
            topics: decoder.topics(Some(cell(topics_idx))),
            first_gender: non_empty(cell(first_idx)),
            last_gender: non_empty(cell(last_idx)),
            extra,
        });
    }

    let extra_names = extra_columns.into_iter().map(|(_, name)| name).collect();
    Ok(Dataset::from_records(records, extra_names))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Year": 2012,
///     "Country": "United States",
///     "MeSH_Clean": "['Endometriosis', 'Humans']",
///     "Predicted_First_Gender": "female",
///     "Predicted_Last_Gender": null
///   }
/// ]
/// ```
///
/// `MeSH_Clean` may also be a plain JSON array of strings.
fn load_json(path: &Path, decoder: &mut RowDecoder) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or(LoadError::InvalidRow {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    let mut extra_names: Vec<String> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or_else(|| LoadError::InvalidRow {
            row: i,
            message: "not a JSON object".to_string(),
        })?;

        let year = match obj.get(YEAR_COLUMN) {
            Some(JsonValue::Number(n)) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .or_else(|| n.as_f64().and_then(year_from_f64)),
            Some(JsonValue::String(s)) => Some(parse_year(s, i)?),
            _ => None,
        }
        .ok_or_else(|| LoadError::InvalidYear {
            row: i,
            value: obj.get(YEAR_COLUMN).map(|v| v.to_string()).unwrap_or_default(),
        })?;

        let topics = match obj.get(TOPICS_COLUMN) {
            Some(JsonValue::Array(items)) => {
                let tags: Option<BTreeSet<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                tags.unwrap_or_else(|| {
                    decoder.malformed_tags += 1;
                    BTreeSet::new()
                })
            }
            Some(JsonValue::String(s)) => decoder.topics(Some(s)),
            Some(JsonValue::Null) | None => BTreeSet::new(),
            Some(_) => {
                decoder.malformed_tags += 1;
                BTreeSet::new()
            }
        };

        let mut extra = BTreeMap::new();
        for (key, val) in obj {
            if KNOWN_COLUMNS.contains(&key.as_str()) {
                continue;
            }
            if !extra_names.contains(key) {
                extra_names.push(key.clone());
            }
            extra.insert(key.clone(), json_to_text(val));
        }

        records.push(Publication {
            year,
            country: json_string(obj.get(COUNTRY_COLUMN)),
            topics,
            first_gender: json_string(obj.get(FIRST_GENDER_COLUMN)),
            last_gender: json_string(obj.get(LAST_GENDER_COLUMN)),
            extra,
        });
    }

    Ok(Dataset::from_records(records, extra_names))
}

fn json_string(val: Option<&JsonValue>) -> Option<String> {
    val.and_then(|v| v.as_str()).and_then(non_empty)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by pandas (`df.to_parquet()`) or Polars.
///
/// Known columns are cast to the types we need, so `Year` may be any integer,
/// float or string column and the text columns may be `Utf8` or `LargeUtf8`.
fn load_parquet(path: &Path, decoder: &mut RowDecoder) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    let mut extra_names: Vec<String> = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let years = cast(required_column(&batch, YEAR_COLUMN)?, &DataType::Float64)?;
        let years = years.as_primitive::<Float64Type>();
        let countries = cast(required_column(&batch, COUNTRY_COLUMN)?, &DataType::Utf8)?;
        let countries = countries.as_string::<i32>();
        let firsts = cast(required_column(&batch, FIRST_GENDER_COLUMN)?, &DataType::Utf8)?;
        let firsts = firsts.as_string::<i32>();
        let lasts = cast(required_column(&batch, LAST_GENDER_COLUMN)?, &DataType::Utf8)?;
        let lasts = lasts.as_string::<i32>();
        let topics = TopicColumn::new(required_column(&batch, TOPICS_COLUMN)?)?;

        let options = FormatOptions::default();
        let mut extras = Vec::new();
        for (idx, field) in schema.fields().iter().enumerate() {
            if KNOWN_COLUMNS.contains(&field.name().as_str()) {
                continue;
            }
            if !extra_names.contains(field.name()) {
                extra_names.push(field.name().clone());
            }
            let formatter = ArrayFormatter::try_new(batch.column(idx).as_ref(), &options)?;
            extras.push((field.name().clone(), formatter));
        }

        let string_at = |arr: &arrow::array::StringArray, row: usize| {
            if arr.is_null(row) {
                None
            } else {
                non_empty(arr.value(row))
            }
        };

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let year = (!years.is_null(row))
                .then(|| year_from_f64(years.value(row)))
                .flatten()
                .ok_or_else(|| LoadError::InvalidYear {
                    row: row_no,
                    value: if years.is_null(row) {
                        "null".to_string()
                    } else {
                        years.value(row).to_string()
                    },
                })?;

            let extra = extras
                .iter()
                .map(|(name, fmt)| (name.clone(), fmt.value(row).to_string()))
                .collect();

            records.push(Publication {
                year,
                country: string_at(countries, row),
                topics: topics.tags(row, decoder),
                first_gender: string_at(firsts, row),
                last_gender: string_at(lasts, row),
                extra,
            });
        }
    }

    Ok(Dataset::from_records(records, extra_names))
}

// -- Parquet / Arrow helpers --

fn required_column<'b>(
    batch: &'b RecordBatch,
    name: &'static str,
) -> Result<&'b ArrayRef, LoadError> {
    batch
        .schema_ref()
        .index_of(name)
        .map(|idx| batch.column(idx))
        .map_err(|_| LoadError::MissingColumn(name))
}

/// `MeSH_Clean` either as encoded text or as a native list of strings.
enum TopicColumn {
    Encoded(ArrayRef),
    List(ArrayRef),
}

impl TopicColumn {
    fn new(col: &ArrayRef) -> Result<Self, LoadError> {
        match col.data_type() {
            DataType::List(_) | DataType::LargeList(_) => {
                let item = Arc::new(Field::new("item", DataType::Utf8, true));
                Ok(TopicColumn::List(cast(col, &DataType::List(item))?))
            }
            _ => Ok(TopicColumn::Encoded(cast(col, &DataType::Utf8)?)),
        }
    }

    fn tags(&self, row: usize, decoder: &mut RowDecoder) -> BTreeSet<String> {
        match self {
            TopicColumn::Encoded(arr) => {
                let arr = arr.as_string::<i32>();
                decoder.topics((!arr.is_null(row)).then(|| arr.value(row)))
            }
            TopicColumn::List(arr) => {
                let list = arr.as_list::<i32>();
                if list.is_null(row) {
                    return BTreeSet::new();
                }
                let items = list.value(row);
                items
                    .as_string::<i32>()
                    .iter()
                    .flatten()
                    .map(str::to_string)
                    .collect()
            }
        }
    }
}
