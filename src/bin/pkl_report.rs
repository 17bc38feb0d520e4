use anyhow::{Context, Result};

use pkl_terminal::config::{self, DashboardConfig};
use pkl_terminal::dataset;
use pkl_terminal::logging;
use pkl_terminal::summary::{Query, SummaryTable, dashboard_queries, run_query};

fn main() -> Result<()> {
    logging::init_stderr();
    let cfg = DashboardConfig::from_env_and_args();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let as_json = config::has_flag(&args, "--json");

    let dataset = dataset::load_dataset(&cfg.matches_path, &cfg.rosters_path)
        .context("load PKL dataset")?;

    let mut queries = dashboard_queries();
    if let Some(name) = config::arg_value(&args, "--player") {
        queries.push(Query::PlayerCards { name });
    }
    let tables = queries
        .iter()
        .map(|query| run_query(&dataset, query))
        .collect::<Vec<_>>();

    if as_json {
        let json = serde_json::to_string_pretty(&tables).context("serialize summaries")?;
        println!("{json}");
        return Ok(());
    }

    println!("PKL summary report");
    println!("Matches: {}", cfg.matches_path.display());
    println!("Rosters: {}", cfg.rosters_path.display());
    for table in &tables {
        println!();
        print_table(table);
    }
    Ok(())
}

fn print_table(table: &SummaryTable) {
    println!("== {} ==", table.title);
    if table.is_empty() {
        println!("  (no rows)");
        return;
    }

    let mut widths = table
        .columns
        .iter()
        .map(|c| c.chars().count())
        .collect::<Vec<_>>();
    for row in &table.rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.to_string().chars().count();
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(len);
            }
        }
    }

    let header = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &width)| format!("{name:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  {header}");
    for row in &table.rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell.to_string()))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {line}");
    }
}
