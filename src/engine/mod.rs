mod core;
mod messages;
mod scanner;
mod scheduler;
mod state;

pub use core::ScreenerEngine;

pub use messages::{FetchFailure, ScanEvent, ScanProgress, TimeframeReport, estimate_remaining};
pub use scanner::{CancelFlag, EventSender, Scanner, detect_series};
pub use scheduler::{AutoRunScheduler, TRIGGER_WINDOW_SECS, TickDecision, should_trigger};
pub use state::{ScanState, ScanStatus};
