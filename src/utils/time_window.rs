use chrono::{DateTime, Days, NaiveTime, Utc};

/// Half-open kickoff window `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// From `now` until midnight UTC `days_ahead` calendar days later
    pub fn upcoming(now: DateTime<Utc>, days_ahead: u32) -> Self {
        let end = now
            .date_naive()
            .checked_add_days(Days::new(u64::from(days_ahead)))
            .map(|day| day.and_time(NaiveTime::MIN).and_utc())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start: now, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Parse a feed timestamp and keep it only when it falls in the window.
    /// Unparseable timestamps are treated as outside.
    pub fn admit(&self, commence_time: &str) -> Option<DateTime<Utc>> {
        parse_kickoff(commence_time).filter(|kickoff| self.contains(*kickoff))
    }
}

/// ISO-8601 / RFC 3339 timestamp to a UTC instant
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
