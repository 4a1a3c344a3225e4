mod oscillator;
mod trend;
mod volatility;

use crate::ingest::types::PriceSeries;
use std::collections::BTreeMap;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, MovingAverageConvergenceDivergence, RateOfChange,
    SimpleMovingAverage,
};
use ta::Next;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const MA_PERIOD: usize = 10;
pub const MOMENTUM_LAG: usize = 4;
pub const BB_PERIOD: usize = 20;
pub const BB_STD_DEV: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;
pub const CCI_PERIOD: usize = 20;
pub const ADX_PERIOD: usize = 14;
pub const ROC_PERIOD: usize = 12;

pub type Column = Vec<Option<f64>>;

#[derive(Debug, thiserror::Error)]
pub enum IndicatorError {
    #[error("price series has no observations")]
    NoData,

    #[error("invalid indicator parameters: {0}")]
    Parameter(String),
}

/// Price history extended with named indicator columns.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    len: usize,
    columns: BTreeMap<&'static str, Column>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    fn insert(&mut self, name: &'static str, column: Column) {
        debug_assert_eq!(column.len(), self.len, "column {name} is misaligned");
        self.columns.insert(name, column);
    }
}

/// Computes every model indicator over one ticker's daily history.
///
/// Columns are aligned with the input bars. A cell is `None` inside the indicator's warm-up
/// window or where it is undefined (e.g. a zero denominator); the feature assembler turns those
/// into `0.0`.
pub fn compute(series: &PriceSeries) -> Result<IndicatorFrame, IndicatorError> {
    if series.is_empty() {
        return Err(IndicatorError::NoData);
    }

    let close = series.closes();
    let high: Vec<f64> = series.bars.iter().map(|b| b.high).collect();
    let low: Vec<f64> = series.bars.iter().map(|b| b.low).collect();
    let volume: Vec<f64> = series.bars.iter().map(|b| b.volume).collect();
    let n = close.len();

    let mut frame = IndicatorFrame {
        len: n,
        columns: BTreeMap::new(),
    };

    frame.insert("RSI", oscillator::rsi(&close, RSI_PERIOD));

    let mut macd =
        MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL).map_err(param)?;
    let macd_out: Vec<_> = close.iter().map(|c| macd.next(*c)).collect();
    frame.insert(
        "MACD",
        warm(macd_out.iter().map(|o| o.macd), MACD_SLOW - 1),
    );
    frame.insert(
        "MACD_Signal",
        warm(macd_out.iter().map(|o| o.signal), MACD_SLOW + MACD_SIGNAL - 2),
    );

    let mut sma = SimpleMovingAverage::new(MA_PERIOD).map_err(param)?;
    frame.insert("SMA_10", streamed(&close, MA_PERIOD - 1, |c| sma.next(c)));

    let mut ema = ExponentialMovingAverage::new(MA_PERIOD).map_err(param)?;
    frame.insert("EMA_10", streamed(&close, MA_PERIOD - 1, |c| ema.next(c)));

    frame.insert("Momentum", momentum(&close, MOMENTUM_LAG));
    frame.insert("Volume", volume.into_iter().map(Some).collect());

    let mut bb = BollingerBands::new(BB_PERIOD, BB_STD_DEV).map_err(param)?;
    let bb_out: Vec<_> = close.iter().map(|c| bb.next(*c)).collect();
    let bb_mid = warm(bb_out.iter().map(|o| o.average), BB_PERIOD - 1);
    let bb_high = warm(bb_out.iter().map(|o| o.upper), BB_PERIOD - 1);
    let bb_low = warm(bb_out.iter().map(|o| o.lower), BB_PERIOD - 1);
    let bandwidth = bb_high
        .iter()
        .zip(&bb_low)
        .map(|(h, l)| Some((*h)? - (*l)?))
        .collect();
    frame.insert("bb_bbm", bb_mid);
    frame.insert("bb_bbh", bb_high);
    frame.insert("bb_bbl", bb_low);
    frame.insert("bb_bandwidth", bandwidth);

    frame.insert("atr", volatility::atr(&high, &low, &close, ATR_PERIOD));
    frame.insert("cci", volatility::cci(&high, &low, &close, CCI_PERIOD));
    frame.insert("adx", trend::adx(&high, &low, &close, ADX_PERIOD));

    let mut roc = RateOfChange::new(ROC_PERIOD).map_err(param)?;
    frame.insert("roc", streamed(&close, ROC_PERIOD, |c| roc.next(c)));

    Ok(frame)
}

fn param(err: ta::errors::TaError) -> IndicatorError {
    IndicatorError::Parameter(format!("{err:?}"))
}

fn streamed(input: &[f64], first_valid: usize, mut f: impl FnMut(f64) -> f64) -> Column {
    warm(input.iter().map(|x| f(*x)), first_valid)
}

/// Blanks everything before `first_valid`, then drops non-finite values.
fn warm(values: impl Iterator<Item = f64>, first_valid: usize) -> Column {
    values
        .enumerate()
        .map(|(i, v)| (i >= first_valid && v.is_finite()).then_some(v))
        .collect()
}

fn momentum(close: &[f64], lag: usize) -> Column {
    (0..close.len())
        .map(|i| (i >= lag).then(|| close[i] - close[i - lag]))
        .collect()
}
