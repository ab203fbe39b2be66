// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Table images for the dashboard.
//!
//! Each summary table is written as a standalone SVG image: a shaded header
//! row, centered cells, optional highlighted trailing rows, a legend box and
//! a footer line.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::format_utils::format_thousands;
use crate::models::stats::Summary;
use crate::services::archive::write_atomic;

const CHAR_WIDTH: f64 = 8.0;
const CELL_PADDING: f64 = 24.0;
const ROW_HEIGHT: f64 = 28.0;
const MARGIN: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;
const SHADE: &str = "#e6e6e6";

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Display form: integers without decimals, floats with one.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => format_thousands(*n as f64, 0),
            Cell::Float(f) => format_thousands(*f, 1),
        }
    }
}

/// A table to render.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// File stem of the image
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub footer: Option<String>,
    pub legend: Option<String>,
    /// Number of trailing rows drawn shaded and bold
    pub highlight_last_rows: usize,
}

impl Table {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = Some(legend.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Plain-text rendering for the log.
    pub fn to_text(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c.to_uppercase(), w = *w))
            .collect();
        out.push_str(header.join("  ").trim_end());
        for row in &self.rows {
            out.push('\n');
            let line: Vec<String> = (0..self.columns.len())
                .map(|i| {
                    let text = row.get(i).map(Cell::display).unwrap_or_default();
                    format!("{:<w$}", text, w = widths[i])
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
        }
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        (0..self.columns.len())
            .map(|i| {
                let cells = self
                    .rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.display().chars().count());
                cells
                    .chain(std::iter::once(self.columns[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render the table as an SVG document.
    pub fn to_svg(&self) -> String {
        let col_widths: Vec<f64> = self
            .column_widths()
            .into_iter()
            .map(|w| w as f64 * CHAR_WIDTH + CELL_PADDING)
            .collect();
        let table_width: f64 = col_widths.iter().sum();
        let table_height = ROW_HEIGHT * (self.rows.len() + 1) as f64;

        let legend_lines: Vec<&str> = self
            .legend
            .as_deref()
            .map(|l| l.lines().collect())
            .unwrap_or_default();
        let legend_width = legend_lines
            .iter()
            .map(|l| l.chars().count() as f64 * 6.5 + 2.0 * MARGIN)
            .fold(0.0, f64::max);
        let legend_height = if legend_lines.is_empty() {
            0.0
        } else {
            legend_lines.len() as f64 * LINE_HEIGHT + MARGIN + MARGIN
        };
        let footer_height = if self.footer.is_some() { LINE_HEIGHT + MARGIN } else { 0.0 };

        let width = table_width.max(legend_width) + 2.0 * MARGIN;
        let height = table_height + legend_height + footer_height + 2.0 * MARGIN;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="Helvetica, Arial, sans-serif" font-size="12">"#,
            w = width,
            h = height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        let highlight_from = self.rows.len().saturating_sub(self.highlight_last_rows);
        let header = self.columns.iter().map(|c| Cell::Text(c.clone())).collect::<Vec<_>>();
        let all_rows = std::iter::once((&header, true, false)).chain(
            self.rows
                .iter()
                .enumerate()
                .map(|(i, r)| (r, false, i >= highlight_from)),
        );

        for (row_idx, (row, is_header, highlighted)) in all_rows.enumerate() {
            let y = MARGIN + row_idx as f64 * ROW_HEIGHT;
            let mut x = MARGIN;
            for (col_idx, col_width) in col_widths.iter().enumerate() {
                let fill = if is_header || highlighted { SHADE } else { "white" };
                let _ = writeln!(
                    svg,
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{col_width:.1}" height="{ROW_HEIGHT:.1}" fill="{fill}" stroke="black" stroke-width="0.5"/>"#
                );
                let text = row.get(col_idx).map(Cell::display).unwrap_or_default();
                let weight = if highlighted { r#" font-weight="bold""# } else { "" };
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" dominant-baseline="middle"{weight}>{}</text>"#,
                    x + col_width / 2.0,
                    y + ROW_HEIGHT / 2.0,
                    escape_xml(&text)
                );
                x += col_width;
            }
        }

        let mut y = MARGIN + table_height;
        if !legend_lines.is_empty() {
            y += MARGIN;
            let box_x = width - MARGIN - legend_width;
            let _ = writeln!(
                svg,
                r#"<rect x="{box_x:.1}" y="{y:.1}" width="{legend_width:.1}" height="{:.1}" rx="4" fill="white" stroke="gray"/>"#,
                legend_lines.len() as f64 * LINE_HEIGHT + MARGIN
            );
            for (i, line) in legend_lines.iter().enumerate() {
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" font-size="9">{}</text>"#,
                    box_x + MARGIN,
                    y + MARGIN + i as f64 * LINE_HEIGHT + 4.0,
                    escape_xml(line)
                );
            }
            y += legend_height - MARGIN;
        }

        if let Some(footer) = &self.footer {
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="8" fill="gray">{}</text>"#,
                width / 2.0,
                y + MARGIN + LINE_HEIGHT / 2.0,
                escape_xml(footer)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Build the dashboard tables from a summary.
pub fn dashboard_tables(summary: &Summary) -> Vec<Table> {
    let mut tables = Vec::new();
    if summary.is_empty() {
        return tables;
    }

    let year_range = summary.global_value("Year Range").unwrap_or("Unknown");
    let mut global = Table::new("1_global_stats", &["Metric", "Value"])
        .with_footer(format!("{} Strava activity data", year_range));
    for row in &summary.global_stats {
        global.push_row(vec![Cell::text(&row.metric), Cell::text(&row.value)]);
    }
    tables.push(global);

    let mut sports = Table::new("2_sport_stats", &["Sport", "Count", "Total", "Unit"])
        .with_footer(format!("{} Strava activity data", year_range));
    for row in &summary.sport_ranking {
        sports.push_row(vec![
            Cell::text(&row.sport),
            Cell::Int(row.count as i64),
            Cell::Int(row.total as i64),
            Cell::text(row.unit.label()),
        ]);
    }
    tables.push(sports);

    let mut bikes = Table::new("3_bike_stats", &["Bike", "Miles"])
        .with_footer("Source: Strava activity data");
    for row in &summary.bike_lifetime_miles {
        bikes.push_row(vec![Cell::text(&row.bike), Cell::Float(row.miles)]);
    }
    tables.push(bikes);

    let mut annual = Table::new("4_annual_stats", &["Year", "Bike (mi)", "Swim (m)", "Ski (ft)"]);
    for row in &summary.annual_totals {
        annual.push_row(vec![
            Cell::Text(row.year.to_string()),
            Cell::Int(row.bike_miles as i64),
            Cell::Int(row.swim_meters as i64),
            Cell::Int(row.ski_vert_ft as i64),
        ]);
    }
    tables.push(annual);

    let eq = &summary.equity_stats;
    if !eq.breakdown.is_empty() || eq.actual_bike_miles > 0.0 {
        let mut equity = Table::new("5_equity_stats", &["Sport", "Source Dist", "Total Miles"])
            .with_legend(
                "Mileage Equivalents:\n\
                 • Snow sports: 1,000 vert ft = 1 bike mile\n\
                 • Swimming: 100 meters = 1 bike mile",
            );
        if let Some(year) = eq.year {
            equity = equity.with_footer(format!("{} Strava activity data", year));
        }
        for row in &eq.breakdown {
            equity.push_row(vec![
                Cell::text(&row.source_sport),
                Cell::Text(format!(
                    "{} {}",
                    format_thousands(row.source_val, 0),
                    row.source_unit
                )),
                Cell::Float(row.total_miles),
            ]);
        }
        equity.push_row(vec![
            Cell::text("Actual Bike"),
            Cell::text("-"),
            Cell::Float(eq.actual_bike_miles),
        ]);
        equity.push_row(vec![
            Cell::text("TOTAL"),
            Cell::text("-"),
            Cell::Float(eq.total_miles()),
        ]);
        equity.highlight_last_rows = 2;
        tables.push(equity);
    }

    tables
}

/// Write every dashboard table into `images_dir`.
///
/// Returns the paths written. Empty tables are skipped with a warning.
pub fn publish_dashboard(summary: &Summary, images_dir: &Path) -> Result<Vec<PathBuf>> {
    if summary.is_empty() {
        tracing::warn!("No summary data to publish");
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    for table in dashboard_tables(summary) {
        if table.rows.is_empty() {
            tracing::warn!(table = %table.name, "No data for table, skipping");
            continue;
        }

        tracing::info!(table = %table.name, "\n{}", table.to_text());

        let path = images_dir.join(format!("{}.svg", table.name));
        write_atomic(&path, table.to_svg().as_bytes())?;
        tracing::info!(path = %path.display(), "Saved image");
        written.push(path);
    }

    let unmatched = &summary.equity_stats.unmatched;
    if unmatched.is_empty() {
        tracing::info!("No unmatched equivalency tags");
    } else {
        tracing::warn!(count = unmatched.len(), names = ?unmatched, "Unmatched equivalency tags");
    }

    Ok(written)
}

/// Write the summary as pretty JSON.
pub fn write_summary(summary: &Summary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), "Summary written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Int(12000).display(), "12,000");
        assert_eq!(Cell::Float(12.34).display(), "12.3");
        assert_eq!(Cell::text("Ride").display(), "Ride");
    }

    #[test]
    fn test_svg_escapes_and_highlights() {
        let mut table = Table::new("t", &["Sport", "Total"]).with_footer("R&D <data>");
        table.push_row(vec![Cell::text("Swim"), Cell::Int(10)]);
        table.push_row(vec![Cell::text("TOTAL"), Cell::Int(10)]);
        table.highlight_last_rows = 1;

        let svg = table.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("R&amp;D &lt;data&gt;"));
        assert_eq!(svg.matches(r#"font-weight="bold""#).count(), 2);
    }

    #[test]
    fn test_to_text_aligns_columns() {
        let mut table = Table::new("t", &["Year", "Bike (mi)"]);
        table.push_row(vec![Cell::text("2024"), Cell::Int(1500)]);

        assert_eq!(table.to_text(), "YEAR  BIKE (MI)\n2024  1,500");
    }

    #[test]
    fn test_dashboard_tables_empty_summary() {
        assert!(dashboard_tables(&Summary::default()).is_empty());
    }
}
