use super::{display_row, sector_tables};
use super::{COLUMNS, EXPLANATION_HEADING, EXPLANATION_INTRO, EXPLANATION_POINTS, PAGE_CAPTION, PAGE_TITLE};
use crate::domain::recommendation::{Recommendation, ResultSet, Signal};
use chrono::NaiveDate;
use std::fmt::Write;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;max-width:1100px}\
table{border-collapse:collapse;margin-bottom:1.5rem;min-width:60%}\
th,td{border:1px solid #ddd;padding:.35rem .75rem;text-align:left}\
th{background:#f4f4f4}td.num{text-align:right}\
tr.buy td:last-child{color:#0a7d28}tr.sell td:last-child{color:#b00020}\
tr.na td{color:#777}.caption{color:#555}";

/// Full dashboard page.
pub fn render_page(results: &ResultSet, as_of_date: NaiveDate) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\">\
         <title>Dashboard de Señales de Trading</title><style>{STYLE}</style></head><body>"
    );
    let _ = write!(out, "<h1>{}</h1>", escape(PAGE_TITLE));
    let _ = write!(
        out,
        "<p class=\"caption\">{} · {}</p>",
        escape(PAGE_CAPTION),
        as_of_date
    );

    for table in sector_tables(results) {
        let _ = write!(out, "<h2>📂 Sector: {}</h2><table><thead><tr>", escape(table.sector));
        for col in COLUMNS {
            let _ = write!(out, "<th>{}</th>", escape(col));
        }
        let _ = write!(out, "</tr></thead><tbody>");

        for record in table.rows {
            let row = display_row(record);
            let class = match record.recommendation {
                Recommendation::Signal(Signal::Buy) => "buy",
                Recommendation::Signal(Signal::Sell) => "sell",
                Recommendation::Signal(Signal::Hold) => "hold",
                Recommendation::InsufficientData | Recommendation::Error(_) => "na",
            };
            let _ = write!(
                out,
                "<tr class=\"{class}\"><th scope=\"row\">{}</th><td class=\"num\">{}</td>\
                 <td class=\"num\">{}</td><td>{}</td></tr>",
                escape(&row.ticker),
                escape(&row.price),
                escape(&row.change),
                escape(&row.recommendation)
            );
        }
        let _ = write!(out, "</tbody></table>");
    }

    let _ = write!(
        out,
        "<hr><p><strong>{}</strong><br>{}</p><ul>",
        escape(EXPLANATION_HEADING),
        escape(EXPLANATION_INTRO)
    );
    for (label, text) in EXPLANATION_POINTS {
        let _ = write!(out, "<li><strong>{}</strong> → {}</li>", escape(label), escape(text));
    }
    let _ = write!(out, "</ul></body></html>");
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::{RecommendationRecord, TickerError};
    use crate::domain::ticker::TickerEntry;

    #[test]
    fn escapes_error_text() {
        let set = ResultSet::new(vec![RecommendationRecord::error(
            &TickerEntry::new("TEM", "Tecnología"),
            TickerError::DataSource("<html>bad gateway</html>".into()),
        )]);
        let page = render_page(&set, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());

        assert!(page.contains("&lt;html&gt;bad gateway&lt;/html&gt;"));
        assert!(!page.contains("<html>bad gateway"));
        assert!(page.contains("<tr class=\"na\">"));
    }

    #[test]
    fn renders_one_table_per_sector_in_order() {
        let set = ResultSet::new(vec![
            RecommendationRecord::signal(&TickerEntry::new("LLY", "Salud"), Signal::Sell, 700.0, Some(-1.5)),
            RecommendationRecord::signal(&TickerEntry::new("COST", "Consumo"), Signal::Buy, 900.0, Some(0.4)),
        ]);
        let page = render_page(&set, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());

        assert_eq!(page.matches("<table>").count(), 2);
        let consumo = page.find("Sector: Consumo").unwrap();
        let salud = page.find("Sector: Salud").unwrap();
        assert!(consumo < salud);
        assert!(page.contains("<tr class=\"sell\">"));
        assert!(page.contains("-1.50%"));
        assert!(page.contains("2026-01-05"));
    }
}
