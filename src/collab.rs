//! Services the engine consumes from whatever presents it: the journal date
//! picker, yes/no and free-text prompts, transient notifications, and the clock.

use chrono::{DateTime, Local, NaiveDate, TimeZone};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The journal date input. Holds a `YYYY-MM-DD` string or nothing.
pub trait DatePicker {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);

    /// The picker contents as a date, if they hold a valid one.
    fn date(&self) -> Option<NaiveDate> {
        parse_date_key(&self.value())
    }
}

/// Plain text field used by both front ends.
#[derive(Debug, Clone, Default)]
pub struct PickerField {
    value: String,
}

impl PickerField {
    pub fn new(value: impl Into<String>) -> Self {
        PickerField {
            value: value.into(),
        }
    }
}

impl DatePicker for PickerField {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.trim().to_string();
    }
}

pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;
    /// `None` when the user cancelled.
    fn prompt_text(&mut self, message: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
}

pub trait Notifier {
    fn notify(&mut self, message: &str, kind: NoticeKind);
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        local_today()
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn local_today() -> NaiveDate {
    calendar_day(&Local::now())
}

/// Calendar date as seen in the timestamp's own zone. Never converts to UTC first.
pub fn calendar_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn calendar_day_does_not_shift_to_utc_after_local_midnight() {
        // 00:30 in UTC+09:00 is still the previous day in UTC.
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let just_after_midnight = tokyo.with_ymd_and_hms(2026, 3, 1, 0, 30, 0).unwrap();
        assert_eq!(
            calendar_day(&just_after_midnight),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert_eq!(
            calendar_day(&just_after_midnight.with_timezone(&Utc)),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }

    #[test]
    fn calendar_day_does_not_shift_to_utc_before_local_midnight() {
        // 23:45 in UTC-05:00 is already the next day in UTC.
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        let late_evening = new_york.with_ymd_and_hms(2026, 12, 31, 23, 45, 0).unwrap();
        assert_eq!(
            calendar_day(&late_evening),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
        );
    }

    #[test]
    fn picker_parses_only_full_dates() {
        let mut picker = PickerField::default();
        assert_eq!(picker.date(), None);
        picker.set_value(" 2026-10-18 ");
        assert_eq!(picker.value(), "2026-10-18");
        assert_eq!(picker.date(), NaiveDate::from_ymd_opt(2026, 10, 18));
        picker.set_value("18/10/2026");
        assert_eq!(picker.date(), None);
    }

    #[test]
    fn date_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(date_key(date), "2026-01-05");
        assert_eq!(parse_date_key("2026-01-05"), Some(date));
    }
}
