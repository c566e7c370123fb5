use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};

/// Represents an entity responsible for providing the current time across the application.
/// This can allow it to be used for testing. All values are naive local wall-clock time;
/// entries are keyed by the calendar day the user experienced.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    async fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Clock pinned to a fixed moment. Tests advance it manually.
    #[derive(Clone)]
    pub struct FixedClock {
        now: Arc<Mutex<NaiveDateTime>>,
    }

    impl FixedClock {
        pub fn at(now: NaiveDateTime) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        pub fn advance(&self, delta: chrono::Duration) {
            *self.now.lock().unwrap() += delta;
        }
    }

    #[async_trait]
    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            tokio::time::sleep(duration).await;
        }
    }
}
