mod perf;
mod time_utils;

pub use time_utils::{
    TimeUtils, epoch_ms_to_utc, format_duration, now_epoch_secs, now_utc, token_to_secs,
};
