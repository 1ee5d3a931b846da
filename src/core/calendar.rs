//! Simulation clock and time-of-day tracking
//!
//! All per-agent timers compare against `SimClock::now`, never wall time,
//! so behaviour is identical at any tick rate.

use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Time of day periods used by daily routines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Morning,    // 06:00-12:00
    Afternoon,  // 12:00-18:00
    Evening,    // 18:00-22:00
    Night,      // 22:00-06:00
}

impl TimePeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimePeriod::Morning,
            12..=17 => TimePeriod::Afternoon,
            18..=21 => TimePeriod::Evening,
            _ => TimePeriod::Night, // 22-23, 0-5
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "morning",
            TimePeriod::Afternoon => "afternoon",
            TimePeriod::Evening => "evening",
            TimePeriod::Night => "night",
        }
    }
}

/// Simulated clock: elapsed seconds plus a wrapping time of day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    now: SimTime,
    day_minutes: f64,
    day: u64,
    minutes_per_second: f64,
}

impl SimClock {
    pub fn new(start_minutes: f64, minutes_per_second: f64) -> Self {
        Self {
            now: 0.0,
            day_minutes: start_minutes.rem_euclid(MINUTES_PER_DAY),
            day: 0,
            minutes_per_second,
        }
    }

    /// Advance by `dt` simulated seconds
    pub fn advance(&mut self, dt: f64) {
        self.now += dt;
        self.day_minutes += dt * self.minutes_per_second;
        while self.day_minutes >= MINUTES_PER_DAY {
            self.day_minutes -= MINUTES_PER_DAY;
            self.day += 1;
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn current_day(&self) -> u64 {
        self.day
    }

    pub fn current_hour(&self) -> u32 {
        (self.day_minutes / 60.0).floor() as u32
    }

    pub fn current_minute(&self) -> u32 {
        (self.day_minutes % 60.0).floor() as u32
    }

    pub fn time_period(&self) -> TimePeriod {
        TimePeriod::from_hour(self.current_hour())
    }

    /// "HH:MM" for logs and prompts
    pub fn clock_label(&self) -> String {
        format!("{:02}:{:02}", self.current_hour(), self.current_minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_bands() {
        assert_eq!(TimePeriod::from_hour(6), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(11), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(12), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(18), TimePeriod::Evening);
        assert_eq!(TimePeriod::from_hour(22), TimePeriod::Night);
        assert_eq!(TimePeriod::from_hour(3), TimePeriod::Night);
    }

    #[test]
    fn test_clock_wraps_at_midnight() {
        let mut clock = SimClock::new(23.0 * 60.0, 10.0);
        assert_eq!(clock.time_period(), TimePeriod::Night);
        // 90 seconds = 900 minutes -> 23:00 + 15h = 14:00 next day
        clock.advance(90.0);
        assert_eq!(clock.current_day(), 1);
        assert_eq!(clock.current_hour(), 14);
        assert_eq!(clock.time_period(), TimePeriod::Afternoon);
        assert!((clock.now() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_clock_label() {
        let clock = SimClock::new(8.0 * 60.0 + 5.0, 10.0);
        assert_eq!(clock.clock_label(), "08:05");
    }
}
