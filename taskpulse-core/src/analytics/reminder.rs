//! Reminder time derivation.

use chrono::NaiveTime;

use super::HourAnalysis;

/// Earliest hour a reminder is scheduled for.
pub const EARLIEST_REMINDER_HOUR: u32 = 14;
/// Latest hour a reminder is scheduled for.
pub const LATEST_REMINDER_HOUR: u32 = 20;
/// How far ahead of the weakest hour the reminder fires.
const LEAD_HOURS: i64 = 2;

/// Schedule the daily reminder two hours before the user's weakest
/// completion hour, kept within 14:00..=20:00.
pub fn optimal_reminder_time(hours: &HourAnalysis) -> NaiveTime {
    let hour = (i64::from(hours.worst_hour) - LEAD_HOURS).clamp(
        i64::from(EARLIEST_REMINDER_HOUR),
        i64::from(LATEST_REMINDER_HOUR),
    ) as u32;

    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder_for(worst_hour: u32) -> NaiveTime {
        optimal_reminder_time(&HourAnalysis {
            worst_hour,
            ..HourAnalysis::default()
        })
    }

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_early_hours_are_raised_to_afternoon() {
        assert_eq!(reminder_for(0), at(14));
        assert_eq!(reminder_for(16), at(14));
    }

    #[test]
    fn test_late_hours_are_capped() {
        assert_eq!(reminder_for(23), at(20));
        assert_eq!(reminder_for(22), at(20));
    }

    #[test]
    fn test_in_range_hours_lead_by_two() {
        assert_eq!(reminder_for(17), at(15));
        assert_eq!(reminder_for(21), at(19));
    }

    #[test]
    fn test_default_worst_hour() {
        // Fallback worst hour of 18 gives a 16:00 reminder
        assert_eq!(optimal_reminder_time(&HourAnalysis::default()), at(16));
    }
}
