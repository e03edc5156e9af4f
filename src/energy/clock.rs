//! Simulated calendar time.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::error::ConfigError;

/// Format of configured start dates.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Calendar information agents need during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarContext {
    /// 1 = January
    pub month: u32,
}

impl CalendarContext {
    pub fn new(month: u32) -> Self {
        Self { month }
    }
}

/// Simulation clock advanced once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    start: NaiveDateTime,
    now: NaiveDateTime,
}

impl SimClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start, now: start }
    }

    /// Clock starting at a `DATE_FORMAT` timestamp.
    pub fn parse(start: &str) -> Result<Self, ConfigError> {
        let start = NaiveDateTime::parse_from_str(start, DATE_FORMAT).map_err(|e| ConfigError::Invalid {
            field: "simulation.start_date",
            reason: e.to_string(),
        })?;
        Ok(Self::new(start))
    }

    pub fn advance(&mut self, dt: f64) {
        self.now += Duration::microseconds((dt * 1e6).round() as i64);
    }

    #[inline]
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Simulated seconds since the start.
    pub fn elapsed_secs(&self) -> f64 {
        (self.now - self.start).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6
    }

    pub fn calendar(&self) -> CalendarContext {
        CalendarContext::new(self.now.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_rolls_over() {
        let mut clock = SimClock::parse("2025-01-31T23:59:59").unwrap();
        assert_eq!(clock.calendar().month, 1);
        clock.advance(1.5);
        assert_eq!(clock.calendar().month, 2);
        assert!((clock.elapsed_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(SimClock::parse("01.01.2025").is_err());
    }
}
