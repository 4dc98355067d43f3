use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::config::{Indicator, N_INDICATORS};

use super::model::{HealthDataset, IndicatorRecord};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A failed load never yields a partially-populated table: callers get
/// exactly one of these and halt the render pass.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("source is missing the required '{0}' column")]
    MissingColumn(&'static str),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Column-name resolution
// ---------------------------------------------------------------------------
//
// The consolidated source file circulated with its original Portuguese
// headers (`ANO`, `Macro`, `MUN`, ...). Re-exports tend to use
// snake_case instead, so both spellings are accepted for every column.

const YEAR_ALIASES: &[&str] = &["year", "ano"];
const MACRO_ALIASES: &[&str] = &["macro_region", "macro"];
const REGIONAL_ALIASES: &[&str] = &["regional"];
const MUNICIPALITY_ALIASES: &[&str] = &["municipality", "mun"];
const LATITUDE_ALIASES: &[&str] = &["latitude", "lat_res"];
const LONGITUDE_ALIASES: &[&str] = &["longitude", "lon_res"];

fn is_alias(header: &str, aliases: &[&str]) -> bool {
    aliases.iter().any(|a| header.eq_ignore_ascii_case(a))
}

/// Which indicator a column header names, if any. Matches the legacy
/// code exactly and the snake_case alias case-insensitively.
fn indicator_for_header(header: &str) -> Option<Indicator> {
    Indicator::ALL
        .into_iter()
        .find(|ind| header == ind.code() || header.eq_ignore_ascii_case(ind.alias()))
}

/// Resolved positions of the fixed columns within a header row.
/// Indicator columns are optional: an absent column simply means that
/// indicator is missing for every row.
#[derive(Debug)]
struct ColumnMap {
    year: usize,
    macro_region: usize,
    regional: usize,
    municipality: usize,
    latitude: usize,
    longitude: usize,
    indicators: [Option<usize>; N_INDICATORS],
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let find = |aliases: &[&str], name: &'static str| -> Result<usize, LoadError> {
            headers
                .iter()
                .position(|h| is_alias(h, aliases))
                .ok_or(LoadError::MissingColumn(name))
        };

        let mut indicators = [None; N_INDICATORS];
        for (idx, header) in headers.iter().enumerate() {
            if let Some(ind) = indicator_for_header(header) {
                indicators[ind.index()] = Some(idx);
            }
        }

        Ok(ColumnMap {
            year: find(YEAR_ALIASES, "year")?,
            macro_region: find(MACRO_ALIASES, "macro_region")?,
            regional: find(REGIONAL_ALIASES, "regional")?,
            municipality: find(MUNICIPALITY_ALIASES, "municipality")?,
            latitude: find(LATITUDE_ALIASES, "latitude")?,
            longitude: find(LONGITUDE_ALIASES, "longitude")?,
            indicators,
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the indicator table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat columns, one row per observation (recommended)
/// * `.csv`     – header row, one observation per line
/// * `.json`    – records orientation: `[{ "year": 2018, ... }, ...]`
pub fn load_file(path: &Path) -> Result<HealthDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Memoizing cache
// ---------------------------------------------------------------------------

/// Explicit memoization of the load step, keyed on the configured
/// source path. `load` reads the file at most once per process
/// lifetime; `invalidate` is the manual hook that forces a re-read.
pub struct DatasetCache {
    path: PathBuf,
    cached: Option<Arc<HealthDataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetCache {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The memoized table, reading the source on the first call only.
    /// A failed read caches nothing, so the next call retries.
    pub fn load(&mut self) -> Result<Arc<HealthDataset>, LoadError> {
        if let Some(ds) = &self.cached {
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(load_file(&self.path)?);
        log::info!(
            "Loaded {} rows ({} macro-regions, {} regionals) from {}",
            ds.len(),
            ds.macro_regions.len(),
            ds.regionals.len(),
            self.path.display()
        );
        self.cached = Some(Arc::clone(&ds));
        Ok(ds)
    }

    /// Drop the memoized table; the next `load` re-reads the source.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Point the cache at a different source file and invalidate.
    pub fn swap_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.cached = None;
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<HealthDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

fn read_csv<R: std::io::Read>(reader: R) -> Result<HealthDataset, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let year: i32 = field(columns.year)
            .parse()
            .with_context(|| format!("CSV row {row_no}: invalid year '{}'", field(columns.year)))?;
        let latitude = parse_f64(field(columns.latitude), row_no, "latitude")?;
        let longitude = parse_f64(field(columns.longitude), row_no, "longitude")?;

        let mut values = [None; N_INDICATORS];
        for (slot, col) in values.iter_mut().zip(columns.indicators.iter()) {
            if let Some(idx) = col {
                let raw = field(*idx);
                // Blank cells are missing observations, not zeros.
                if !raw.is_empty() {
                    *slot = Some(parse_f64(raw, row_no, &headers[*idx])?);
                }
            }
        }

        records.push(IndicatorRecord {
            year,
            macro_region: field(columns.macro_region).to_string(),
            regional: field(columns.regional).to_string(),
            municipality: field(columns.municipality).to_string(),
            latitude,
            longitude,
            values,
        });
    }

    Ok(HealthDataset::from_records(records))
}

fn parse_f64(s: &str, row: usize, col: &str) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, column '{col}': '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the shape `df.to_json(orient='records')`
/// produces: a top-level array of flat objects. Keys follow the same
/// alias rules as CSV headers; `null` indicator values are missing.
fn load_json(path: &Path) -> Result<HealthDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<HealthDataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root
        .as_array()
        .context("expected a top-level JSON array of records")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let lookup = |aliases: &[&str]| -> Option<&JsonValue> {
            obj.iter()
                .find(|(k, _)| is_alias(k, aliases))
                .map(|(_, v)| v)
        };
        let string_field = |aliases: &[&str], name: &'static str| -> Result<String, LoadError> {
            let value = lookup(aliases).ok_or(LoadError::MissingColumn(name))?;
            value
                .as_str()
                .map(str::to_string)
                .with_context(|| format!("Row {i}: '{name}' is not a string"))
                .map_err(LoadError::from)
        };
        let f64_field = |aliases: &[&str], name: &'static str| -> Result<f64, LoadError> {
            let value = lookup(aliases).ok_or(LoadError::MissingColumn(name))?;
            value
                .as_f64()
                .with_context(|| format!("Row {i}: '{name}' is not a number"))
                .map_err(LoadError::from)
        };

        let year = f64_field(YEAR_ALIASES, "year")? as i32;

        let mut values = [None; N_INDICATORS];
        for (key, val) in obj {
            if let Some(ind) = indicator_for_header(key) {
                values[ind.index()] = match val {
                    JsonValue::Null => None,
                    other => Some(
                        other
                            .as_f64()
                            .with_context(|| format!("Row {i}, '{key}': not a number"))?,
                    ),
                };
            }
        }

        records.push(IndicatorRecord {
            year,
            macro_region: string_field(MACRO_ALIASES, "macro_region")?,
            regional: string_field(REGIONAL_ALIASES, "regional")?,
            municipality: string_field(MUNICIPALITY_ALIASES, "municipality")?,
            latitude: f64_field(LATITUDE_ALIASES, "latitude")?,
            longitude: f64_field(LONGITUDE_ALIASES, "longitude")?,
            values,
        });
    }

    Ok(HealthDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat-column Parquet, one row per observation. Works with files
/// written by both Pandas (`df.to_parquet()`) and the bundled
/// `generate_sample` binary; indicator columns may be nullable.
fn load_parquet(path: &Path) -> Result<HealthDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let columns = ColumnMap::resolve(&headers)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let year = extract_i32(batch.column(columns.year), row)
                .with_context(|| format!("Row {row}: failed to read year"))?;
            let macro_region = extract_string(batch.column(columns.macro_region), row)
                .with_context(|| format!("Row {row}: failed to read macro-region"))?;
            let regional = extract_string(batch.column(columns.regional), row)
                .with_context(|| format!("Row {row}: failed to read regional"))?;
            let municipality = extract_string(batch.column(columns.municipality), row)
                .with_context(|| format!("Row {row}: failed to read municipality"))?;
            let latitude = extract_f64(batch.column(columns.latitude), row)
                .with_context(|| format!("Row {row}: failed to read latitude"))?;
            let longitude = extract_f64(batch.column(columns.longitude), row)
                .with_context(|| format!("Row {row}: failed to read longitude"))?;

            let mut values = [None; N_INDICATORS];
            for (slot, col) in values.iter_mut().zip(columns.indicators.iter()) {
                if let Some(idx) = col {
                    let array = batch.column(*idx);
                    if !array.is_null(row) {
                        *slot = Some(
                            extract_f64(array, row)
                                .with_context(|| format!("Row {row}: bad indicator value"))?,
                        );
                    }
                }
            }

            records.push(IndicatorRecord {
                year,
                macro_region,
                regional,
                municipality,
                latitude,
                longitude,
                values,
            });
        }
    }

    Ok(HealthDataset::from_records(records))
}

// -- Arrow downcast helpers --

fn extract_i32(col: &ArrayRef, row: usize) -> Result<i32> {
    if col.is_null(row) {
        bail!("unexpected null");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().context("expected Int32Array")?;
            Ok(arr.value(row))
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().context("expected Int64Array")?;
            Ok(arr.value(row) as i32)
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("unexpected null");
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(arr.value(row) as f64)
        }
        DataType::Int32 => extract_i32(col, row).map(|v| v as f64),
        DataType::Int64 => extract_i32(col, row).map(|v| v as f64),
        other => bail!("expected a numeric column, got {other:?}"),
    }
}

fn extract_string(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("unexpected null");
    }
    let arr = col
        .as_any()
        .downcast_ref::<StringArray>()
        .context("expected StringArray")?;
    Ok(arr.value(row).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Indicator;

    #[test]
    fn resolves_legacy_portuguese_headers() {
        let headers: Vec<String> = [
            "ANO",
            "Macro",
            "Regional",
            "MUN",
            "LAT_RES",
            "LON_RES",
            "IN1(6 CONSULTAS)",
            "IN5Q1 (RMM)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let map = ColumnMap::resolve(&headers).unwrap();
        assert_eq!(map.year, 0);
        assert_eq!(map.macro_region, 1);
        assert_eq!(map.municipality, 3);
        assert_eq!(map.indicators[Indicator::PrenatalVisits.index()], Some(6));
        assert_eq!(map.indicators[Indicator::MaternalMortality.index()], Some(7));
        assert_eq!(map.indicators[Indicator::CesareanDeliveries.index()], None);
    }

    #[test]
    fn missing_key_column_is_reported() {
        let headers: Vec<String> =
            ["year", "macro_region", "regional", "municipality", "latitude"]
                .iter()
                .map(|s| s.to_string())
                .collect();
        match ColumnMap::resolve(&headers) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, "longitude"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn csv_blank_cells_are_missing_not_zero() {
        let csv = "\
year,macro_region,regional,municipality,latitude,longitude,prenatal_visits
2018,Norte,R1,Teresina,-5.09,-42.80,81.5
2018,Sul,R2,Picos,-7.08,-41.47,
";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].value(Indicator::PrenatalVisits), Some(81.5));
        assert_eq!(ds.records[1].value(Indicator::PrenatalVisits), None);
        assert_eq!(ds.macro_regions, vec!["Norte", "Sul"]);
    }

    #[test]
    fn json_records_with_nulls() {
        let text = r#"[
            {"year": 2019, "macro_region": "Norte", "regional": "R1",
             "municipality": "Teresina", "latitude": -5.09, "longitude": -42.8,
             "hiv_syphilis_testing": 64.2},
            {"year": 2019, "macro_region": "Sul", "regional": "R2",
             "municipality": "Picos", "latitude": -7.08, "longitude": -41.47,
             "hiv_syphilis_testing": null}
        ]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.records[0].value(Indicator::HivSyphilisTesting),
            Some(64.2)
        );
        assert_eq!(ds.records[1].value(Indicator::HivSyphilisTesting), None);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        match load_file(Path::new("data/table.xlsx")) {
            Err(LoadError::UnsupportedExtension(ext)) => assert_eq!(ext, "xlsx"),
            other => panic!("expected UnsupportedExtension, got {other:?}"),
        }
    }

    #[test]
    fn cache_memoizes_until_invalidated() {
        let path = std::env::temp_dir().join("materna_cache_test.csv");
        std::fs::write(
            &path,
            "year,macro_region,regional,municipality,latitude,longitude\n\
             2020,Norte,R1,Teresina,-5.09,-42.80\n",
        )
        .unwrap();

        let mut cache = DatasetCache::new(&path);
        let first = cache.load().unwrap();
        let second = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.invalidate();
        let third = cache.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 1);

        std::fs::remove_file(&path).ok();
    }
}
