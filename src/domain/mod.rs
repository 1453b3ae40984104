// Domain types and value objects
mod candle;
mod instrument;
mod series;
mod signal;
mod timeframe;

pub use candle::{Candle, CandleType};
pub use instrument::{Instrument, MarketKind};
pub use series::Series;
pub use signal::{DetectedOn, Direction, SetupSignal, bullish_first};
pub use timeframe::Timeframe;
