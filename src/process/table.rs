use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, Float64Array, StringArray},
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use regex::Regex;
use std::{io::Cursor, sync::Arc};
use tracing::debug;

use crate::process::{
    date_parser::{format_curve_date, parse_curve_date},
    utils::clean_str,
};

pub const DATE_COLUMN: &str = "Date";

pub const MATURITY_COUNT: usize = 11;

/// Maturities plotted on the x-axis, shortest first.
pub const MATURITIES: [&str; MATURITY_COUNT] = [
    "1 Mo", "3 Mo", "6 Mo", "1 Yr", "2 Yr", "3 Yr", "5 Yr", "7 Yr", "10 Yr", "20 Yr", "30 Yr",
];

/// Cells treated as missing yields.
const NULL_PATTERN: &str = r"^\s*(N/A|NA|ND)?\s*$";

const BATCH_SIZE: usize = 1024;

/// One day's par yields across [`MATURITIES`].
#[derive(Clone, Debug, PartialEq)]
pub struct CurveRow {
    pub date: NaiveDate,
    pub yields: [Option<f64>; MATURITY_COUNT],
}

impl CurveRow {
    pub fn label(&self) -> String {
        format_curve_date(self.date)
    }

    /// `(maturity index, yield)` for every maturity with a value.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.yields
            .iter()
            .enumerate()
            .filter_map(|(i, y)| y.map(|v| (i, v)))
    }
}

/// A month of daily curves, kept in ascending date order.
#[derive(Clone, Debug, Default)]
pub struct YieldTable {
    rows: Vec<CurveRow>,
}

impl YieldTable {
    /// Stable-sorts `rows` by date, so rows sharing a date keep input order.
    pub fn new(mut rows: Vec<CurveRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self { rows }
    }

    pub fn rows(&self) -> &[CurveRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The row with the greatest date; among equal dates, the last one read.
    pub fn latest(&self) -> Option<&CurveRow> {
        self.rows.last()
    }
}

/// Parse a treasury yield-curve CSV document.
///
/// The header decides the layout: `Date` is read as text and every other
/// column as a nullable float. Maturities absent from the header are null on
/// every row; columns outside [`MATURITIES`] are ignored.
pub fn parse_table(text: &str) -> Result<YieldTable> {
    let text = text.trim_start_matches('\u{feff}');
    let schema = header_schema(text)?;
    if schema.index_of(DATE_COLUMN).is_err() {
        bail!("CSV has no {} column", DATE_COLUMN);
    }

    let null_regex = Regex::new(NULL_PATTERN).context("compiling null pattern")?;
    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_quote(b'"')
        .with_delimiter(b',')
        .with_null_regex(null_regex)
        .build(Cursor::new(text.as_bytes()))
        .context("creating CSV reader")?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.context("reading CSV batch")?;
        rows.extend(batch_to_rows(&batch)?);
    }
    debug!(rows = rows.len(), "parsed yield table");
    Ok(YieldTable::new(rows))
}

fn header_schema(text: &str) -> Result<Schema> {
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(text.as_bytes()), Some(0))
        .context("reading CSV header")?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            let name = clean_str(f.name());
            let dtype = if name == DATE_COLUMN {
                DataType::Utf8
            } else {
                DataType::Float64
            };
            Field::new(name, dtype, true)
        })
        .collect();
    Ok(Schema::new(fields))
}

fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<CurveRow>> {
    let schema = batch.schema();
    let dates = schema
        .index_of(DATE_COLUMN)
        .ok()
        .and_then(|i| batch.column(i).as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("{} column is not text", DATE_COLUMN))?;

    let columns: Vec<Option<&Float64Array>> = MATURITIES
        .iter()
        .map(|m| {
            schema
                .index_of(m)
                .ok()
                .and_then(|i| batch.column(i).as_any().downcast_ref::<Float64Array>())
        })
        .collect();

    let mut rows = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        if dates.is_null(row) {
            bail!("row {} has an empty {}", row, DATE_COLUMN);
        }
        let raw = dates.value(row);
        let date = parse_curve_date(raw)
            .ok_or_else(|| anyhow!("unparseable {} {:?} in row {}", DATE_COLUMN, raw, row))?;

        let mut yields = [None; MATURITY_COUNT];
        for (slot, column) in yields.iter_mut().zip(&columns) {
            if let Some(column) = column {
                if column.is_valid(row) {
                    *slot = Some(column.value(row));
                }
            }
        }
        rows.push(CurveRow { date, yields });
    }
    Ok(rows)
}
