// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::charts::{
    io_common::{ColumnIndices, RawRow},
    *,
};

/// Reads the rows of a worksheet (the first one by default). The first row is the header.
pub fn read_excel_rows(path: &str, worksheet_name: Option<&str>) -> ChartResult<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange: Range<DataType> = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(SourceMalformedSnafu {
                path,
                reason: format!("no worksheet named {:?}", name),
            })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(SourceEmptySnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(cells) => cells
            .iter()
            .map(|c| read_cell(c).unwrap_or_default())
            .collect(),
        None => return SourceEmptySnafu { path }.fail(),
    };
    debug!("read_excel_rows: header: {:?}", header);
    let columns = ColumnIndices::from_header(&header, path)?;

    // Line numbers as displayed by spreadsheet programs.
    let first_line = wrange.start().map(|(r, _)| r as usize).unwrap_or(0) + 1;
    let mut res: Vec<RawRow> = Vec::new();
    for (idx, cells) in iter.enumerate() {
        let row = columns.extract(first_line + idx + 1, |col| cells.get(col).and_then(read_cell));
        debug!("read_excel_rows: {:?}", row);
        res.push(row);
    }
    Ok(res)
}

fn read_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        other => Some(format!("{:?}", other)),
    }
}
