pub mod html;
pub mod text;

use crate::domain::recommendation::{Recommendation, RecommendationRecord, ResultSet, Signal};

pub const PAGE_TITLE: &str = "📈 Dashboard de Recomendaciones de Trading";
pub const PAGE_CAPTION: &str = "Modelo basado en NVDA: 📈 Comprar / ➖ Mantener / 🔻 Vender";
pub const COLUMNS: [&str; 4] = ["Ticker", "Precio actual", "Variación (%)", "Recomendación"];

pub const EXPLANATION_HEADING: &str = "🧠 ¿Cómo funciona este modelo?";
pub const EXPLANATION_INTRO: &str = "Este sistema de IA analiza 15 indicadores técnicos y evalúa \
la probabilidad de que una acción suba o baje en los próximos 5 días.";
pub const EXPLANATION_POINTS: [(&str, &str); 3] = [
    ("📈 Comprar", "Si se espera que el precio suba más de +1%"),
    ("🔻 Vender", "Si se espera que baje más de -1%"),
    ("➖ Mantener", "Si se espera que fluctúe dentro de ±1%"),
];

const NOT_AVAILABLE: &str = "N/A";

/// One rendered table: a sector and its records in display order.
#[derive(Debug, Clone)]
pub struct SectorTable<'a> {
    pub sector: &'a str,
    pub rows: Vec<&'a RecommendationRecord>,
}

/// Display strings for one record, in [`COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub ticker: String,
    pub price: String,
    pub change: String,
    pub recommendation: String,
}

impl DisplayRow {
    pub fn cells(&self) -> [&str; 4] {
        [&self.ticker, &self.price, &self.change, &self.recommendation]
    }
}

/// Groups records into one table per sector, sectors in lexicographic order.
pub fn sector_tables(results: &ResultSet) -> Vec<SectorTable<'_>> {
    let mut out: Vec<SectorTable<'_>> = Vec::new();
    for record in results.records() {
        match out.iter_mut().find(|t| t.sector == record.sector) {
            Some(table) => table.rows.push(record),
            None => out.push(SectorTable {
                sector: &record.sector,
                rows: vec![record],
            }),
        }
    }
    out.sort_by(|a, b| a.sector.cmp(b.sector));
    out
}

pub fn display_row(record: &RecommendationRecord) -> DisplayRow {
    let (price, change) = match record.recommendation {
        Recommendation::Signal(_) => (
            record
                .latest_price
                .map(|p| format!("${p:.2}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            record
                .change_pct
                .map(|c| format!("{c:.2}%"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        _ => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    DisplayRow {
        ticker: record.ticker.clone(),
        price,
        change,
        recommendation: recommendation_label(&record.recommendation),
    }
}

pub fn signal_label(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "📈 Comprar",
        Signal::Hold => "➖ Mantener",
        Signal::Sell => "🔻 Vender",
    }
}

pub fn recommendation_label(rec: &Recommendation) -> String {
    match rec {
        Recommendation::Signal(s) => signal_label(*s).to_string(),
        Recommendation::InsufficientData => "❌ Datos insuficientes".to_string(),
        Recommendation::Error(err) => format!("⚠️ Error: {err}"),
    }
}
