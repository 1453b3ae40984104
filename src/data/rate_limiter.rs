use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Request-weight budget per wall-clock minute, shared by every caller of one exchange client.
#[derive(Clone)]
pub struct GlobalRateLimiter {
    inner: Arc<Mutex<InnerLimiter>>,
}

struct InnerLimiter {
    used_weight: u32,
    // We track the specific minute we are currently counting for
    // e.g. 28,500,123 minutes since Epoch
    current_minute_idx: u64,
    limit: u32,
}

impl GlobalRateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerLimiter {
                used_weight: 0,
                current_minute_idx: Self::get_current_minute_idx(),
                limit,
            })),
        }
    }

    /// Acquires permission to use `cost` weight, sleeping into the next minute if the budget
    /// for this one is spent.
    pub async fn acquire(&self, cost: u32, context: &str) {
        loop {
            let (wait_duration, stats) = {
                let mut guard = self.inner.lock().await;
                let now_idx = Self::get_current_minute_idx();

                // 1. Check for New Minute (Wall Clock)
                if now_idx > guard.current_minute_idx {
                    guard.used_weight = 0;
                    guard.current_minute_idx = now_idx;
                }

                // 2. Check Capacity
                if guard.used_weight + cost <= guard.limit {
                    guard.used_weight += cost;
                    return;
                }

                // 3. Calculate Wait (Until next :00)
                let seconds_into_minute = Self::now_secs() % 60;
                let wait_secs = 60 - seconds_into_minute;

                // Add a tiny buffer (100ms) to ensure we land IN the next minute
                let wait = Duration::from_secs(wait_secs) + Duration::from_millis(100);

                (wait, (guard.used_weight, guard.limit))
            };

            log::warn!(
                "🛑 Rate limit saturated for [{}]. Used: {}/{}. Waiting {:.1}s (until :00)...",
                context,
                stats.0,
                stats.1,
                wait_duration.as_secs_f64()
            );

            tokio::time::sleep(wait_duration).await;
        }
    }

    pub async fn used_weight(&self) -> u32 {
        self.inner.lock().await.used_weight
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }

    fn get_current_minute_idx() -> u64 {
        Self::now_secs() / 60
    }
}
