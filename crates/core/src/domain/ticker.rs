use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub sector: String,
}

impl TickerEntry {
    pub fn new(symbol: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            sector: sector.into(),
        }
    }
}

// Iteration order of the dashboard. Ordering within a sector table follows this list.
const REGISTRY: &[(&str, &str)] = &[
    ("NVDA", "Tecnología"),
    ("AAPL", "Tecnología"),
    ("MSFT", "Tecnología"),
    ("AMZN", "Consumo"),
    ("META", "Tecnología"),
    ("GOOGL", "Tecnología"),
    ("TSLA", "Consumo / Industrial"),
    ("ASML", "Tecnología"),
    ("VST", "Energía / Utilities"),
    ("TSM", "Tecnología"),
    ("NFLX", "Consumo / Media"),
    ("PLTR", "Tecnología"),
    ("GEV", "Energía"),
    ("HIMS", "Salud"),
    ("HOOD", "Financiero / Tecnología"),
    ("TEM", "Tecnología"),
    ("JPM", "Financiero"),
    ("LLY", "Salud"),
    ("AVGO", "Tecnología"),
    ("COIN", "Financiero / Cripto"),
    ("COST", "Consumo"),
    ("CRM", "Tecnología"),
    ("CSCO", "Tecnología"),
    ("DIS", "Consumo / Media"),
    ("ROST", "Consumo"),
    ("T", "Telecomunicaciones"),
    ("V", "Financiero"),
    ("MA", "Financiero"),
    ("SHOP", "Consumo"),
    ("WMT", "Consumo"),
    ("BITB", "Cripto"),
    ("MELI", "Consumo"),
    ("BABA", "Consumo / Tecnología"),
    ("PYPL", "Financiero / Tecnología"),
    ("CMG", "Consumo"),
    ("AMAT", "Tecnología"),
    ("CMCSA", "Telecomunicaciones"),
    ("A", "Tecnología"),
    ("FBTC", "Cripto"),
    ("BLK", "Financiero"),
    ("BRK-B", "Financiero"),
    ("CTSH", "Tecnología"),
    ("EPAM", "Tecnología"),
    ("IXN", "ETF Tecnología"),
    ("LMT", "Industrial / Defensa"),
    ("MRNA", "Salud"),
    ("HACK", "ETF Ciberseguridad"),
    ("ROBO", "ETF Robótica"),
    ("VCR", "ETF Consumo Discrecional"),
    ("VHT", "ETF Salud"),
];

/// The fixed ticker universe shown on the dashboard.
pub fn default_registry() -> Vec<TickerEntry> {
    REGISTRY
        .iter()
        .map(|(symbol, sector)| TickerEntry::new(*symbol, *sector))
        .collect()
}
