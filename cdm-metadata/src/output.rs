//! Writing the flattened join stream
//!
//! Two formats: JSON lines (one object per record) and a tab-separated
//! table whose header is the engine's sorted field set. Both accept an
//! optional column projection.

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{MetadataError, Result};
use crate::join::MetadataJoinEngine;

/// Columns to emit: `fields` if given, else every field the engine knows
///
/// # Errors
///
/// `FieldNotFound` for the first requested field the engine does not know.
pub fn select_columns(engine: &MetadataJoinEngine, fields: Option<&[String]>) -> Result<Vec<String>> {
    let known = engine.fields();
    match fields {
        None => Ok(known.into_iter().collect()),
        Some(requested) => {
            if let Some(missing) = requested.iter().find(|name| !known.contains(*name)) {
                return Err(MetadataError::FieldNotFound(missing.clone()));
            }
            Ok(requested.to_vec())
        }
    }
}

/// Write every record as one JSON object per line, returning the record count
///
/// Without a projection each object carries only the record's own fields.
pub fn write_jsonl<W: Write>(
    engine: &MetadataJoinEngine,
    fields: Option<&[String]>,
    mut out: W,
) -> Result<usize> {
    let columns = fields.map(|_| select_columns(engine, fields)).transpose()?;

    let mut count = 0;
    for record in engine {
        let record = record?;
        match &columns {
            None => serde_json::to_writer(&mut out, &record)?,
            Some(columns) => {
                let projected: BTreeMap<&str, String> = columns
                    .iter()
                    .filter_map(|name| {
                        record
                            .get(name)
                            .ok()
                            .map(|value| (name.as_str(), value.into_owned()))
                    })
                    .collect();
                serde_json::to_writer(&mut out, &projected)?;
            }
        }
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Write every record as a row of a tab-separated table, returning the row count
///
/// Fields a record lacks are written as empty cells.
pub fn write_tsv<W: Write>(
    engine: &MetadataJoinEngine,
    fields: Option<&[String]>,
    out: W,
) -> Result<usize> {
    let columns = select_columns(engine, fields)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
    writer.write_record(&columns)?;

    let mut count = 0;
    for record in engine {
        let record = record?;
        let row: Vec<String> = columns
            .iter()
            .map(|name| record.get(name).map(|v| v.into_owned()).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Human-readable counts and field list
pub fn write_summary<W: Write>(engine: &MetadataJoinEngine, mut out: W) -> Result<()> {
    let pages: usize = engine.records().iter().map(|r| r.page_count()).sum();
    writeln!(out, "items:   {}", engine.records().len())?;
    writeln!(out, "pages:   {}", pages)?;
    writeln!(out, "records: {}", engine.len())?;
    if let Some(tabular) = engine.tabular() {
        writeln!(out, "tabular: {}", tabular.path().display())?;
    }
    if let Some(markup) = engine.markup() {
        writeln!(out, "markup:  {}", markup.path().display())?;
    }
    writeln!(out, "fields:")?;
    for field in engine.fields() {
        writeln!(out, "  {}", field)?;
    }
    Ok(())
}
