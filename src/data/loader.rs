use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// On-disk layouts a table can be decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// `.xlsx`, `.xlsm`, `.xls`, `.ods` – first worksheet only.
    Workbook,
    Csv,
    Json,
    Parquet,
}

impl SheetFormat {
    /// Pick the decoder from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
            "csv" => Ok(SheetFormat::Csv),
            "json" => Ok(SheetFormat::Json),
            "parquet" | "pq" => Ok(SheetFormat::Parquet),
            _ => Err(LoadError::UnsupportedFormat { extension: ext }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// The first row of the sheet becomes the header row, every following
/// row is data.
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let format = SheetFormat::from_path(path)?;

    if format == SheetFormat::Parquet {
        let file =
            std::fs::File::open(path).map_err(|e| LoadError::io(path.to_path_buf(), e))?;
        return Ok(load_parquet(file)?);
    }

    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path.to_path_buf(), e))?;
    Ok(parse_bytes(&bytes, format)?)
}

/// Decode an in-memory sheet.
pub fn parse_bytes(bytes: &[u8], format: SheetFormat) -> Result<Table> {
    match format {
        SheetFormat::Workbook => parse_workbook(bytes),
        SheetFormat::Csv => parse_csv(bytes),
        SheetFormat::Json => parse_json(bytes),
        SheetFormat::Parquet => bail!("Parquet data must be read from a file"),
    }
}

// ---------------------------------------------------------------------------
// Workbook loader (calamine)
// ---------------------------------------------------------------------------

fn parse_workbook(bytes: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| anyhow!("opening workbook: {e}"))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| anyhow!("reading first worksheet: {e}"))?,
        None => bail!("Workbook contains no worksheets"),
    };

    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(Table::from_grid(grid))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::Empty => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Plain CSV; ragged rows are accepted and squared up by [`Table::new`].
fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        grid.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Table::from_grid(grid))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two accepted shapes:
///
/// ```json
/// [["Year", "Revenue"], [2020, 100], [2021, 150]]
/// ```
///
/// or records (`df.to_json(orient='records')`), whose keys in first-seen
/// order become the headers:
///
/// ```json
/// [{ "Year": 2020, "Revenue": 100 }, { "Year": 2021, "Revenue": 150 }]
/// ```
fn parse_json(bytes: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let items = root.as_array().context("Expected top-level JSON array")?;

    match items.first() {
        None => Ok(Table::default()),
        Some(JsonValue::Array(_)) => {
            let grid = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let cells = item
                        .as_array()
                        .with_context(|| format!("Row {i} is not a JSON array"))?;
                    Ok(cells.iter().map(json_to_cell).collect())
                })
                .collect::<Result<Vec<Vec<CellValue>>>>()?;
            Ok(Table::from_grid(grid))
        }
        Some(JsonValue::Object(_)) => {
            let mut headers: Vec<String> = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let obj = item
                    .as_object()
                    .with_context(|| format!("Row {i} is not a JSON object"))?;
                for key in obj.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }

            let rows = items
                .iter()
                .filter_map(|item| item.as_object())
                .map(|obj| {
                    headers
                        .iter()
                        .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                        .collect()
                })
                .collect();

            Ok(Table::new(headers, rows))
        }
        Some(_) => bail!("Expected an array of rows or an array of records"),
    }
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::number(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns.
///
/// Column names become the headers; works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(file: std::fs::File) -> Result<Table> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(Table::new(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let typed = match col.data_type() {
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            array_value_to_string(col.as_ref(), row).ok().map(CellValue::Date)
        }
        _ => None,
    };

    typed.unwrap_or_else(|| match array_value_to_string(col.as_ref(), row) {
        Ok(s) => CellValue::String(s),
        Err(_) => CellValue::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::StringArray;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use rust_xlsxwriter::Workbook;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn xlsx_first_row_becomes_headers() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Year").unwrap();
        sheet.write_string(0, 1, "Revenue").unwrap();
        sheet.write_string(0, 2, "Region").unwrap();
        for (r, (year, rev, region)) in [(2020, 100, "A"), (2021, 150, "B")].iter().enumerate() {
            let r = r as u32 + 1;
            sheet.write_number(r, 0, *year as f64).unwrap();
            sheet.write_number(r, 1, *rev as f64).unwrap();
            sheet.write_string(r, 2, *region).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let table = parse_bytes(&bytes, SheetFormat::Workbook).unwrap();
        assert_eq!(table.headers(), ["Year", "Revenue", "Region"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[0],
            vec![CellValue::Integer(2020), CellValue::Integer(100), s("A")]
        );
    }

    #[test]
    fn garbage_workbook_is_an_error() {
        assert!(parse_bytes(b"not a spreadsheet", SheetFormat::Workbook).is_err());
    }

    #[test]
    fn csv_cells_are_typed() {
        let table = parse_bytes(b"Year,Revenue,Region\n2020,100.5,A\n2021,,B\n", SheetFormat::Csv)
            .unwrap();
        assert_eq!(table.headers(), ["Year", "Revenue", "Region"]);
        assert_eq!(
            table.rows()[0],
            vec![CellValue::Integer(2020), CellValue::Float(100.5), s("A")]
        );
        assert_eq!(table.rows()[1][1], CellValue::Null);
    }

    #[test]
    fn empty_csv_gives_empty_table() {
        let table = parse_bytes(b"", SheetFormat::Csv).unwrap();
        assert_eq!(table.width(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn json_grid_and_records_agree() {
        let grid = parse_bytes(
            br#"[["Year","Region"],[2020,"A"],[2021,"B"]]"#,
            SheetFormat::Json,
        )
        .unwrap();
        let records = parse_bytes(
            br#"[{"Year":2020,"Region":"A"},{"Year":2021,"Region":"B"}]"#,
            SheetFormat::Json,
        )
        .unwrap();
        assert_eq!(grid.headers(), records.headers());
        assert_eq!(grid.rows(), records.rows());
    }

    #[test]
    fn json_records_keep_first_seen_key_order() {
        let table = parse_bytes(
            br#"[{"b":1,"a":2},{"c":3}]"#,
            SheetFormat::Json,
        )
        .unwrap();
        assert_eq!(table.headers(), ["b", "a", "c"]);
        assert_eq!(table.rows()[1], vec![CellValue::Null, CellValue::Null, CellValue::Integer(3)]);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { extension } if extension == "txt"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn load_file_reads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x,y\n1,2\n3,4").unwrap();
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn parquet_scalar_columns_load() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Region", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2020, 2021])),
                Arc::new(StringArray::from(vec![Some("A"), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.headers(), ["Year", "Region"]);
        assert_eq!(table.rows()[0], vec![CellValue::Integer(2020), s("A")]);
        assert_eq!(table.rows()[1][1], CellValue::Null);
    }
}
