use super::{display_row, sector_tables, DisplayRow};
use super::{COLUMNS, EXPLANATION_HEADING, EXPLANATION_INTRO, EXPLANATION_POINTS, PAGE_CAPTION, PAGE_TITLE};
use crate::domain::recommendation::ResultSet;
use std::fmt::Write;

/// Plain-text rendering for terminals and logs.
pub fn render(results: &ResultSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{PAGE_TITLE}");
    let _ = writeln!(out, "{PAGE_CAPTION}");

    for table in sector_tables(results) {
        let rows: Vec<DisplayRow> = table.rows.iter().map(|r| display_row(r)).collect();
        let _ = writeln!(out);
        let _ = writeln!(out, "📂 Sector: {}", table.sector);
        write_table(&mut out, &rows);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "{EXPLANATION_HEADING}");
    let _ = writeln!(out, "{EXPLANATION_INTRO}");
    let _ = writeln!(out);
    for (label, text) in EXPLANATION_POINTS {
        let _ = writeln!(out, "- {label} → {text}");
    }
    out
}

fn write_table(out: &mut String, rows: &[DisplayRow]) {
    let mut widths = COLUMNS.map(width);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(width(cell));
        }
    }

    write_line(out, &COLUMNS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    write_line(out, &rule, &widths);
    for row in rows {
        write_line(out, &row.cells(), &widths);
    }
}

fn write_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        if i != 0 {
            line.push_str(" | ");
        }
        line.push_str(cell);
        line.push_str(&" ".repeat(w.saturating_sub(width(cell))));
    }
    let _ = writeln!(out, "{}", line.trim_end());
}

// Char count; close enough for the emoji and accented labels used here.
fn width(s: &str) -> usize {
    s.chars().count()
}
