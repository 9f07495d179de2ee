pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;
pub mod model;
pub mod scheduler;
pub mod selection;
pub mod services;
pub mod source;

pub use cache::{CacheStats, DataOrigin, Fetched, RepositoryCache};
pub use error::FetchError;
pub use model::{Profile, RepositorySummary};

/// Test utilities shared by unit tests.
#[cfg(test)]
pub mod test_utils {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{DateTime, Utc};

    use crate::clock::Clock;

    /// Returns the instant test clocks start at: 2024-06-01T00:00:00Z.
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap()
    }

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self {
                now: Arc::new(Mutex::new(test_epoch())),
            }
        }
    }

    impl ManualClock {
        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(by).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
