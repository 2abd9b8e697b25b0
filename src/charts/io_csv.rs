// Primitives for reading CSV files.

use crate::charts::{
    io_common::{ColumnIndices, RawRow},
    *,
};

/// Reads all the data rows of a CSV file with a header.
///
/// Rows shorter than the header are kept: their missing cells are dropped later.
pub fn read_csv_rows(path: &str) -> ChartResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvParseSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvParseSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_rows: header: {:?}", header);
    if header.iter().all(|h| h.trim().is_empty()) {
        return SourceEmptySnafu { path }.fail();
    }
    let columns = ColumnIndices::from_header(&header, path)?;

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let line = line_r.context(CsvParseSnafu { path })?;
        let lineno = line
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        if line.len() > header.len() {
            return SourceMalformedSnafu {
                path,
                reason: format!(
                    "line {}: {} fields for {} columns",
                    lineno,
                    line.len(),
                    header.len()
                ),
            }
            .fail();
        }
        let row = columns.extract(lineno, |col| line.get(col).map(|s| s.to_string()));
        debug!("read_csv_rows: {:?}", row);
        res.push(row);
    }
    Ok(res)
}
