use serde::{Serialize, Serializer};

pub const FEATURE_COUNT: usize = 15;

/// Column order the classifier was trained on. Inference input must follow it exactly.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "RSI",
    "MACD",
    "MACD_Signal",
    "SMA_10",
    "EMA_10",
    "Momentum",
    "Volume",
    "bb_bbm",
    "bb_bbh",
    "bb_bbl",
    "bb_bandwidth",
    "atr",
    "cci",
    "adx",
    "roc",
];

/// One trading day of model features.
///
/// Always holds exactly [`FEATURE_COUNT`] finite values in [`FEATURE_NAMES`] order. Missing or
/// non-finite inputs are stored as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRow {
    pub fn new(values: [Option<f64>; FEATURE_COUNT]) -> Self {
        Self {
            values: values.map(zero_fill),
        }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}

impl Default for FeatureRow {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

fn zero_fill(v: Option<f64>) -> f64 {
    match v {
        Some(x) if x.is_finite() => x,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_non_finite_values_become_zero() {
        let mut raw = [Some(1.5); FEATURE_COUNT];
        raw[0] = None;
        raw[3] = Some(f64::NAN);
        raw[7] = Some(f64::INFINITY);

        let row = FeatureRow::new(raw);
        assert_eq!(row.get("RSI"), Some(0.0));
        assert_eq!(row.get("SMA_10"), Some(0.0));
        assert_eq!(row.get("bb_bbm"), Some(0.0));
        assert_eq!(row.get("MACD"), Some(1.5));
        assert!(row.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn serializes_exactly_the_named_features() {
        let row = FeatureRow::new([Some(2.0); FEATURE_COUNT]);
        let v = serde_json::to_value(row).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), FEATURE_COUNT);
        for name in FEATURE_NAMES {
            assert_eq!(obj.get(name).and_then(|x| x.as_f64()), Some(2.0));
        }
    }

    #[test]
    fn unknown_feature_is_absent() {
        assert_eq!(FeatureRow::default().get("Close"), None);
    }
}
