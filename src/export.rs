use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::dataset::Dataset;
use crate::summary::{Cell, SummaryTable, dashboard_queries, run_query};

pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
}

pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

pub fn export_summaries(path: &Path, dataset: &Dataset) -> Result<ExportReport> {
    export_summaries_with_progress(path, dataset, |_| {})
}

/// Writes one worksheet per dashboard summary.
pub fn export_summaries_with_progress(
    path: &Path,
    dataset: &Dataset,
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<ExportReport> {
    let queries = dashboard_queries();
    let total = queries.len();
    let header = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let mut rows = 0usize;
    for (idx, query) in queries.iter().enumerate() {
        let table = run_query(dataset, query);
        let sheet_name = query.sheet_name();
        {
            let sheet = workbook.add_worksheet();
            sheet
                .set_name(&sheet_name)
                .with_context(|| format!("name worksheet {sheet_name}"))?;
            write_table(sheet, &table, &header)
                .with_context(|| format!("write worksheet {sheet_name}"))?;
        }
        rows += table.len();
        on_progress(ExportProgress {
            current: idx + 1,
            total,
            message: format!("{} ({} rows)", table.title, table.len()),
        });
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    info!(
        "exported {} summaries ({rows} rows) to {}",
        total,
        path.display()
    );

    Ok(ExportReport {
        sheets: total,
        rows,
    })
}

fn write_table(worksheet: &mut Worksheet, table: &SummaryTable, header: &Format) -> Result<()> {
    for (col_idx, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, name, header)
            .with_context(|| format!("write header cell (0,{col_idx})"))?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = row_idx as u32 + 1;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = col_idx as u16;
            let written = match cell {
                Cell::Int(n) => worksheet.write_number(sheet_row, col, *n as f64),
                Cell::Text(s) => worksheet.write_string(sheet_row, col, s),
            };
            written.with_context(|| format!("write cell ({sheet_row},{col_idx})"))?;
        }
    }
    Ok(())
}
