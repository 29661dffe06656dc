use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing dates across application. This allows the
/// dashboard to be rendered for an arbitrary moment (`--at`) and keeps tests deterministic.
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single moment.
pub struct FixedClock {
    moment: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(moment: DateTime<Utc>) -> Self {
        Self { moment }
    }
}

impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.moment
    }
}
