use signalboard_core::domain::ticker::TickerEntry;

#[derive(Debug, Clone, Default)]
pub struct UniverseFilter {
    /// Symbols to keep (case-insensitive). Empty keeps everything.
    pub only: Vec<String>,

    /// Sector to keep (case-insensitive, exact label).
    pub sector: Option<String>,
}

/// Restricts the registry for an operator run. Registry order is preserved.
pub fn select(registry: Vec<TickerEntry>, filter: &UniverseFilter) -> anyhow::Result<Vec<TickerEntry>> {
    let only: Vec<String> = filter
        .only
        .iter()
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    for symbol in &only {
        anyhow::ensure!(
            registry.iter().any(|e| e.symbol == *symbol),
            "unknown ticker {symbol}"
        );
    }

    let sector = filter.sector.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let out: Vec<TickerEntry> = registry
        .into_iter()
        .filter(|e| only.is_empty() || only.contains(&e.symbol))
        .filter(|e| sector.map_or(true, |s| e.sector.to_lowercase() == s.to_lowercase()))
        .collect();

    anyhow::ensure!(!out.is_empty(), "ticker selection is empty");
    Ok(out)
}
