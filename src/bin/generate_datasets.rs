use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::json;

const OUTPUT_DIR: &str = "datasets";
const YEARS: std::ops::RangeInclusive<i64> = 2015..=2023;
const HOSPITALS: [&str; 4] = ["Central", "Norte", "Sur", "Infantil"];
const TIPOS: [&str; 3] = ["Farmacia", "Fungible", "Implante"];
const ORIGENES: [&str; 3] = ["Nacional", "UE", "Importado"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }
}

/// A cell written to the sheet.
enum Cell {
    Int(i64),
    Num(f64),
    Text(String),
}

struct Sheet {
    file: &'static str,
    label: &'static str,
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

fn write_xlsx(dir: &Path, sheet: &Sheet) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (c, name) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *name, &bold)?;
    }
    for (r, row) in sheet.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Int(v) => worksheet.write_number(r, c, *v as f64)?,
                Cell::Num(v) => worksheet.write_number(r, c, *v)?,
                Cell::Text(v) => worksheet.write_string(r, c, v)?,
            };
        }
    }

    let path = dir.join(sheet.file);
    workbook
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} rows to {}", sheet.rows.len(), path.display());
    Ok(())
}

fn year_tipo(rng: &mut SimpleRng) -> Sheet {
    let mut rows = Vec::new();
    for year in YEARS {
        for tipo in TIPOS {
            rows.push(vec![
                Cell::Int(year),
                Cell::Int(rng.range(200, 900)),
                Cell::Text(tipo.to_string()),
            ]);
        }
    }
    Sheet {
        file: "year_tipo.xlsx",
        label: "Year - Type",
        headers: vec!["YEAR", "PEDIDOS", "TIPO"],
        rows,
    }
}

fn year_tipo_average(rng: &mut SimpleRng) -> Sheet {
    let mut rows = Vec::new();
    for year in YEARS {
        for (k, tipo) in TIPOS.iter().enumerate() {
            let base = 15.0 * (k + 1) as f64;
            let avg = base + rng.next_f64() * 10.0 + (year - 2015) as f64 * 0.8;
            rows.push(vec![
                Cell::Int(year),
                Cell::Num((avg * 100.0).round() / 100.0),
                Cell::Text(tipo.to_string()),
            ]);
        }
    }
    Sheet {
        file: "year_tipo_average.xlsx",
        label: "Year - Average type",
        headers: vec!["YEAR", "PRECIO_MEDIO", "TIPO"],
        rows,
    }
}

fn year_purchases(rng: &mut SimpleRng) -> Sheet {
    let rows = YEARS
        .map(|year| vec![Cell::Int(year), Cell::Int(rng.range(1500, 4000))])
        .collect();
    Sheet {
        file: "year_purchases.xlsx",
        label: "Year - Purchase",
        headers: vec!["YEAR", "PEDIDOS"],
        rows,
    }
}

fn year_money(rng: &mut SimpleRng) -> Sheet {
    let rows = YEARS
        .map(|year| {
            let money = 250_000.0 + (year - 2015) as f64 * 18_000.0 + rng.next_f64() * 40_000.0;
            vec![Cell::Int(year), Cell::Num(money.round())]
        })
        .collect();
    Sheet {
        file: "year_money.xlsx",
        label: "Year - Money",
        headers: vec!["YEAR", "IMPORTE"],
        rows,
    }
}

fn hospital_year_purchases(rng: &mut SimpleRng) -> Sheet {
    let mut rows = Vec::new();
    for year in YEARS {
        for hospital in HOSPITALS {
            rows.push(vec![
                Cell::Int(year),
                Cell::Int(rng.range(100, 1200)),
                Cell::Text(hospital.to_string()),
            ]);
        }
    }
    Sheet {
        file: "hospital_year_purchases.xlsx",
        label: "Hospital year - Purchases",
        headers: vec!["YEAR", "PEDIDOS", "HOSPITAL"],
        rows,
    }
}

fn codigo_origen(rng: &mut SimpleRng) -> Sheet {
    let rows = (0..60)
        .map(|i| {
            let origen = ORIGENES[rng.range(0, ORIGENES.len() as i64 - 1) as usize];
            vec![
                Cell::Text(format!("C{:04}", 1000 + i * 7)),
                Cell::Int(rng.range(1, 500)),
                Cell::Text(origen.to_string()),
            ]
        })
        .collect();
    Sheet {
        file: "codigo_origen_df.xlsx",
        label: "Code - Origin",
        headers: vec!["CODIGO", "CANTIDAD", "ORIGEN"],
        rows,
    }
}

/// Parquet copy of a sheet, for the File → Open… path.
fn write_parquet(dir: &Path, sheet: &Sheet) -> Result<()> {
    let fields: Vec<Field> = sheet
        .headers
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let data_type = match sheet.rows.first().map(|r| &r[c]) {
                Some(Cell::Int(_)) => DataType::Int64,
                Some(Cell::Num(_)) => DataType::Float64,
                _ => DataType::Utf8,
            };
            Field::new(*name, data_type, false)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<Arc<dyn arrow::array::Array>> = (0..sheet.headers.len())
        .map(|c| -> Arc<dyn arrow::array::Array> {
            match sheet.rows.first().map(|r| &r[c]) {
                Some(Cell::Int(_)) => Arc::new(Int64Array::from_iter_values(
                    sheet.rows.iter().map(|r| match &r[c] {
                        Cell::Int(v) => *v,
                        _ => 0,
                    }),
                )),
                Some(Cell::Num(_)) => Arc::new(Float64Array::from_iter_values(
                    sheet.rows.iter().map(|r| match &r[c] {
                        Cell::Num(v) => *v,
                        _ => f64::NAN,
                    }),
                )),
                _ => Arc::new(StringArray::from_iter_values(sheet.rows.iter().map(
                    |r| match &r[c] {
                        Cell::Text(v) => v.clone(),
                        Cell::Int(v) => v.to_string(),
                        Cell::Num(v) => v.to_string(),
                    },
                ))),
            }
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let path = dir.join(sheet.file).with_extension("parquet");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    println!("Wrote {} rows to {}", sheet.rows.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(dir).with_context(|| format!("creating {OUTPUT_DIR}"))?;

    let sheets = vec![
        codigo_origen(&mut rng),
        hospital_year_purchases(&mut rng),
        year_money(&mut rng),
        year_purchases(&mut rng),
        year_tipo_average(&mut rng),
        year_tipo(&mut rng),
    ];

    for sheet in &sheets {
        write_xlsx(dir, sheet)?;
    }
    if let Some(sheet) = sheets.iter().find(|s| s.file == "hospital_year_purchases.xlsx") {
        write_parquet(dir, sheet)?;
    }

    let catalog: Vec<_> = sheets
        .iter()
        .map(|s| json!({ "id": s.file, "label": s.label }))
        .collect();
    let catalog_path = dir.join("catalog.json");
    std::fs::write(&catalog_path, serde_json::to_string_pretty(&catalog)?)
        .with_context(|| format!("writing {}", catalog_path.display()))?;
    println!("Wrote {} catalog entries to {}", catalog.len(), catalog_path.display());

    Ok(())
}
