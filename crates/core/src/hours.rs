//! Site configuration and the derived "open now" flag.

use core::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Weekday abbreviations indexed from Sunday = 0.
const DAY_ABBREVIATIONS: [&str; 7] = ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"];

/// Days shown when the backend does not list open days.
const DEFAULT_OPEN_DAYS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    minutes: u32,
}

impl TimeOfDay {
    /// Parse `HH:MM`, ignoring any trailing `:SS`.
    ///
    /// Returns `None` for anything malformed or out of range.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(':');
        let hours: u32 = parts.next()?.trim().parse().ok()?;
        let minutes: u32 = parts.next()?.trim().parse().ok()?;
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self {
            minutes: hours * 60 + minutes,
        })
    }

    /// Time of day of a local timestamp.
    #[must_use]
    pub fn of(datetime: NaiveDateTime) -> Self {
        Self {
            minutes: datetime.hour() * 60 + datetime.minute(),
        }
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.minutes
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

/// Opening hours as configured in the backend.
///
/// Also the on-disk format of the cached copy used when the backend is
/// unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    /// Weekdays the restaurant opens, Sunday = 0. Absent means every day.
    #[serde(default)]
    pub open_days: Option<Vec<u32>>,
    /// ISO dates (`YYYY-MM-DD`) the restaurant stays closed.
    #[serde(default)]
    pub closed_dates: Vec<String>,
}

impl SiteConfig {
    /// Whether the restaurant is open at local time `now`.
    ///
    /// Closed when today is a closed date, when today is not an open day,
    /// or when either time is missing or malformed. Otherwise open within
    /// `[open, close)`; a close time before the open time wraps past
    /// midnight.
    #[must_use]
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        let today = now.date().format("%Y-%m-%d").to_string();
        if self.closed_dates.iter().any(|date| date.trim() == today) {
            return false;
        }

        let weekday = now.weekday().num_days_from_sunday();
        if let Some(days) = &self.open_days {
            if !days.contains(&weekday) {
                return false;
            }
        }

        let (Some(open), Some(close)) = (self.open(), self.close()) else {
            return false;
        };

        let current = TimeOfDay::of(now);
        if open <= close {
            current >= open && current < close
        } else {
            current >= open || current < close
        }
    }

    /// Parsed opening time.
    #[must_use]
    pub fn open(&self) -> Option<TimeOfDay> {
        self.open_time.as_deref().and_then(TimeOfDay::parse)
    }

    /// Parsed closing time.
    #[must_use]
    pub fn close(&self) -> Option<TimeOfDay> {
        self.close_time.as_deref().and_then(TimeOfDay::parse)
    }

    /// `"20:00 - 02:00"`, when both times are set.
    #[must_use]
    pub fn hours_label(&self) -> Option<String> {
        match (self.open_time.as_deref(), self.close_time.as_deref()) {
            (Some(open), Some(close)) if !open.is_empty() && !close.is_empty() => {
                Some(format!("{open} - {close}"))
            }
            _ => None,
        }
    }

    /// `"Lun, Mar, Mié"`; Monday to Saturday when open days are not listed.
    #[must_use]
    pub fn days_label(&self) -> String {
        let days = self
            .open_days
            .as_deref()
            .unwrap_or(&DEFAULT_OPEN_DAYS);

        days.iter()
            .filter_map(|day| {
                usize::try_from(*day)
                    .ok()
                    .and_then(|index| DAY_ABBREVIATIONS.get(index))
                    .copied()
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Closed dates joined for display.
    #[must_use]
    pub fn closed_label(&self) -> Option<String> {
        if self.closed_dates.is_empty() {
            None
        } else {
            Some(self.closed_dates.join(", "))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    /// 2026-10-14 is a Wednesday.
    fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn config(open: &str, close: &str) -> SiteConfig {
        SiteConfig {
            open_time: Some(open.to_string()),
            close_time: Some(close.to_string()),
            open_days: None,
            closed_dates: Vec::new(),
        }
    }

    #[test]
    fn test_time_of_day_parse() {
        assert_eq!(TimeOfDay::parse("20:00").unwrap().minutes(), 1200);
        assert_eq!(TimeOfDay::parse("02:30:00").unwrap().minutes(), 150);
        assert_eq!(TimeOfDay::parse("9:05").unwrap().to_string(), "09:05");
        assert!(TimeOfDay::parse("").is_none());
        assert!(TimeOfDay::parse("20").is_none());
        assert!(TimeOfDay::parse("aa:bb").is_none());
        assert!(TimeOfDay::parse("24:00").is_none());
    }

    #[test]
    fn test_same_day_window() {
        let cfg = config("11:00", "15:00");
        assert!(cfg.is_open_at(at((2026, 10, 14), 11, 0)));
        assert!(cfg.is_open_at(at((2026, 10, 14), 14, 59)));
        assert!(!cfg.is_open_at(at((2026, 10, 14), 15, 0)));
        assert!(!cfg.is_open_at(at((2026, 10, 14), 10, 59)));
    }

    #[test]
    fn test_overnight_window() {
        let cfg = config("20:00", "02:00");
        assert!(cfg.is_open_at(at((2026, 10, 14), 23, 30)));
        assert!(cfg.is_open_at(at((2026, 10, 15), 1, 0)));
        assert!(!cfg.is_open_at(at((2026, 10, 14), 10, 0)));
        assert!(!cfg.is_open_at(at((2026, 10, 15), 2, 0)));
    }

    #[test]
    fn test_closed_date_overrides_hours() {
        let mut cfg = config("20:00", "02:00");
        cfg.closed_dates = vec!["2026-10-14".to_string()];
        assert!(!cfg.is_open_at(at((2026, 10, 14), 23, 30)));
        assert!(cfg.is_open_at(at((2026, 10, 13), 23, 30)));
    }

    #[test]
    fn test_open_days_restrict() {
        let mut cfg = config("20:00", "23:59");
        // Wednesday is 3
        cfg.open_days = Some(vec![4, 5, 6]);
        assert!(!cfg.is_open_at(at((2026, 10, 14), 21, 0)));
        cfg.open_days = Some(vec![3]);
        assert!(cfg.is_open_at(at((2026, 10, 14), 21, 0)));
    }

    #[test]
    fn test_malformed_or_missing_times_are_closed() {
        assert!(!config("late", "02:00").is_open_at(at((2026, 10, 14), 23, 0)));
        assert!(!SiteConfig::default().is_open_at(at((2026, 10, 14), 23, 0)));
    }

    #[test]
    fn test_labels() {
        let mut cfg = config("20:00", "02:00");
        assert_eq!(cfg.hours_label().as_deref(), Some("20:00 - 02:00"));
        assert_eq!(cfg.days_label(), "Lun, Mar, Mié, Jue, Vie, Sáb");
        cfg.open_days = Some(vec![0, 5, 9]);
        assert_eq!(cfg.days_label(), "Dom, Vie");
        assert!(cfg.closed_label().is_none());
        cfg.closed_dates = vec!["2026-12-24".to_string(), "2026-12-25".to_string()];
        assert_eq!(cfg.closed_label().as_deref(), Some("2026-12-24, 2026-12-25"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let cfg: SiteConfig = serde_json::from_str(r#"{"open_time":"20:00"}"#).unwrap();
        assert_eq!(cfg.open_time.as_deref(), Some("20:00"));
        assert!(cfg.close_time.is_none());
        assert!(cfg.closed_dates.is_empty());
    }
}
