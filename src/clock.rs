use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};

// Time source injected into the engine. Every date-sensitive operation
// reads the clock instead of ambient system time, so tests can pin "now".
pub trait Clock {
    // Timestamp used for review history entries.
    fn now(&self) -> DateTime<Utc>;

    // Calendar date at day granularity, in the process-local time zone.
    // Streaks and due dates compare at this granularity only.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

// A clock pinned to a fixed instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn on_date(date: NaiveDate) -> Self {
        let now = date.and_time(NaiveTime::MIN).and_utc();
        Self { now }
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn advance_days(&mut self, days: i64) {
        self.now += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
