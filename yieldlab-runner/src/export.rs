//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for dividend analyses:
//! - **JSON**: full comparison tables and single-ticker profiles
//! - **CSV**: one pivot table or per-ticker metric per file
//! - **Markdown**: human-readable profile and comparison reports

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use yieldlab_core::{DividendAsset, DividendAssetProfile};

use crate::comparison::{AssetComparisonAggregator, ComparisonTable, PivotTable, TickerValues};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_comparison_json(table: &ComparisonTable) -> Result<String> {
    serde_json::to_string_pretty(table).context("failed to serialize ComparisonTable to JSON")
}

pub fn import_comparison_json(json: &str) -> Result<ComparisonTable> {
    serde_json::from_str(json).context("failed to deserialize ComparisonTable from JSON")
}

pub fn export_profile_json(profile: &DividendAssetProfile) -> Result<String> {
    serde_json::to_string_pretty(profile).context("failed to serialize profile to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a pivot table as CSV: a `year` column followed by one column per ticker.
/// Empty cells are written as empty fields.
pub fn export_pivot_csv(table: &PivotTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["year".to_string()];
    header.extend(table.tickers().iter().cloned());
    wtr.write_record(&header)?;

    for (year, cells) in table.rows() {
        let mut record = vec![year.to_string()];
        record.extend(cells.iter().map(|c| c.map(|v| format!("{v:.6}")).unwrap_or_default()));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export per-ticker metrics as CSV with `ticker` and `column` columns.
pub fn export_ticker_values_csv(values: &TickerValues, column: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", column])?;
    for (ticker, value) in values.iter() {
        let value = format!("{value:.6}");
        wtr.write_record([ticker, value.as_str()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Every comparison table as consecutive CSV blocks separated by a blank line:
/// annual yields, percent changes, then per-ticker risk metrics.
pub fn export_comparison_csv(table: &ComparisonTable) -> Result<String> {
    let blocks = [
        export_pivot_csv(&table.annual_yields)?,
        export_pivot_csv(&table.percent_changes)?,
        risk_csv(table)?,
    ];
    Ok(blocks.join("\n"))
}

// ─── Markdown reports ───────────────────────────────────────────────

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        Some(_) => "NaN".to_string(),
        None => "—".to_string(),
    }
}

fn pivot_markdown(out: &mut String, title: &str, table: &PivotTable, precision: usize) {
    let _ = writeln!(out, "## {title}\n");
    if table.is_empty() {
        let _ = writeln!(out, "_No data._\n");
        return;
    }
    let _ = writeln!(out, "| Year | {} |", table.tickers().join(" | "));
    let _ = writeln!(out, "|------|{}", "------:|".repeat(table.tickers().len()));
    for (year, cells) in table.rows() {
        let row: Vec<String> = cells.iter().map(|&c| cell(c, precision)).collect();
        let _ = writeln!(out, "| {year} | {} |", row.join(" | "));
    }
    out.push('\n');
}

/// Markdown report for a single ticker.
pub fn profile_markdown(asset: &DividendAsset) -> String {
    let mut out = String::new();
    let dd = asset.drawdowns();
    let vol = asset.volatility();

    let _ = writeln!(out, "# {} Dividend Profile\n", asset.ticker());
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|--------|------:|");
    let _ = writeln!(out, "| Payments analysed | {} |", asset.yields().len());
    let _ = writeln!(out, "| Complete years | {} |", asset.annual_yields().len());
    let _ = writeln!(out, "| Max quarterly drawdown | {:.3} |", dd.max_quarterly_drawdown);
    let _ = writeln!(out, "| Max annual drawdown | {:.3} |", dd.max_annual_drawdown);
    let _ = writeln!(
        out,
        "| Annual yield std dev | {} |",
        cell(Some(vol.standard_deviation), 4)
    );
    let ret = asset.returns();
    let _ = writeln!(out, "| Latest price | {:.2} |", ret.latest_price);
    let _ = writeln!(out, "| Average return | {} |", cell(Some(ret.average_return), 4));
    let _ = writeln!(out, "| Return std dev | {} |", cell(Some(ret.return_std_dev), 4));
    let _ = writeln!(out, "| Sharpe ratio | {} |", cell(Some(ret.sharpe_ratio), 4));
    out.push('\n');

    let _ = writeln!(out, "## Annual Yield\n");
    let _ = writeln!(out, "| Year | Yield (%) | Change |");
    let _ = writeln!(out, "|------|----------:|-------:|");
    for (point, change) in vol.series.iter().zip(&vol.percent_change) {
        let _ = writeln!(
            out,
            "| {} | {:.4} | {} |",
            point.year,
            point.percent_yield,
            cell(change.change.map(|c| c * 100.0), 2)
        );
    }
    out.push('\n');

    let _ = writeln!(out, "## Normality\n");
    let _ = writeln!(out, "| Test | Statistic | p-value | alpha | Gaussian |");
    let _ = writeln!(out, "|------|----------:|--------:|------:|:--------:|");
    for row in asset.normality().rows() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            row.test,
            cell(Some(row.statistic), 4),
            cell(Some(row.p_value), 4),
            row.alpha,
            if row.is_gaussian { "yes" } else { "no" }
        );
    }

    if !asset.warnings().is_empty() {
        out.push('\n');
        for w in asset.warnings() {
            let _ = writeln!(out, "> {w}");
        }
    }
    out
}

/// Markdown report comparing several tickers, including any that failed.
pub fn comparison_markdown(comparison: &AssetComparisonAggregator) -> String {
    let table = comparison.comparison_table();
    let mut out = String::new();

    let _ = writeln!(out, "# Dividend Comparison\n");
    pivot_markdown(&mut out, "Annual Yield (%)", &table.annual_yields, 4);
    pivot_markdown(&mut out, "Annual Yield Change", &table.percent_changes, 4);

    let _ = writeln!(out, "## Risk\n");
    let _ = writeln!(out, "| Ticker | Max Annual Drawdown | Std Dev | Sharpe |");
    let _ = writeln!(out, "|--------|--------------------:|--------:|-------:|");
    for (ticker, drawdown) in table.max_annual_drawdowns.iter() {
        let _ = writeln!(
            out,
            "| {ticker} | {drawdown:.3} | {} | {} |",
            cell(table.standard_deviations.get(ticker), 4),
            cell(table.sharpe_ratios.get(ticker), 4)
        );
    }

    if !comparison.failures().is_empty() {
        let _ = writeln!(out, "\n## Skipped\n");
        for f in comparison.failures() {
            let _ = writeln!(out, "- **{}**: {}", f.ticker, f.error);
        }
    }
    out
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a comparison run.
///
/// Creates a directory named `comparison_{timestamp}/` under `output_dir`
/// containing:
/// - `comparison.json` — every aggregate
/// - `annual_yields.csv` and `percent_changes.csv` — pivot tables
/// - `risk.csv` — max annual drawdown, standard deviation and Sharpe ratio per ticker
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(comparison: &AssetComparisonAggregator, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "comparison_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let table = comparison.comparison_table();
    let files = [
        ("comparison.json", export_comparison_json(&table)?),
        ("annual_yields.csv", export_pivot_csv(&table.annual_yields)?),
        ("percent_changes.csv", export_pivot_csv(&table.percent_changes)?),
        ("risk.csv", risk_csv(&table)?),
        ("report.md", comparison_markdown(comparison)),
    ];
    for (name, content) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

fn risk_csv(table: &ComparisonTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticker",
        "max_annual_drawdown",
        "standard_deviation",
        "sharpe_ratio",
    ])?;
    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.6}")).unwrap_or_default();
    for (ticker, drawdown) in table.max_annual_drawdowns.iter() {
        let std_dev = fmt(table.standard_deviations.get(ticker));
        let sharpe = fmt(table.sharpe_ratios.get(ticker));
        let drawdown = format!("{drawdown:.6}");
        wtr.write_record([ticker, drawdown.as_str(), std_dev.as_str(), sharpe.as_str()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
