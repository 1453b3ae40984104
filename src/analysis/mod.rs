// EMA, cradle band and the setup matcher
pub mod cradle;
pub mod detector;
pub mod ema;

pub use cradle::{CradleBand, CradleIndicators, build_band};
pub use detector::{CradleDetector, DetectorMode, MIN_WINDOW, detect_at, detect_historical};
pub use ema::{alpha_for_span, ema_adjusted};
