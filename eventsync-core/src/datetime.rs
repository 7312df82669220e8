//! Turning listing date and time-of-day strings into zoned instants.

use chrono::offset::LocalResult;
use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeZone,
};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::{SyncError, SyncResult};

/// `eventDate` as sent by the listing API.
const EVENT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// 12-hour clock, e.g. "9:00 AM".
const TIME_OF_DAY_FORMAT: &str = "%I:%M %p";

/// Start and end of one event in the calendar time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpan {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl EventSpan {
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// IANA name of the zone both instants are expressed in.
    pub fn time_zone(&self) -> &'static str {
        self.start.timezone().name()
    }
}

/// Normalizes event dates into one fixed time zone.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    tz: Tz,
}

impl Normalizer {
    pub fn new(tz: Tz) -> Self {
        Normalizer { tz }
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    /// Combine the event date with its start and end times.
    ///
    /// An empty `end_time` yields a zero-length event.
    pub fn normalize(
        &self,
        event_date: &str,
        start_time: &str,
        end_time: &str,
    ) -> SyncResult<EventSpan> {
        if event_date.trim().is_empty() {
            return Err(SyncError::MissingField("eventDate"));
        }
        if start_time.trim().is_empty() {
            return Err(SyncError::MissingField("startTime"));
        }
        let end_time = if end_time.trim().is_empty() {
            start_time
        } else {
            end_time
        };

        let date = parse_event_date(event_date)?;
        let start = self.localize(date.and_time(parse_time_of_day(start_time)?));
        let end = self.localize(date.and_time(parse_time_of_day(end_time)?));

        Ok(EventSpan { start, end })
    }

    /// Attach the zone to a wall-clock time, preferring standard time.
    ///
    /// A repeated time (clocks falling back) takes the standard-offset
    /// instant. A skipped time (clocks springing forward) keeps its wall
    /// clock reading under the offset in force before the transition.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(first, second) => {
                if first.offset().dst_offset() == Duration::zero() {
                    first
                } else {
                    second
                }
            }
            LocalResult::None => {
                let before = self.tz.offset_from_utc_datetime(&(naive - Duration::days(1))).fix();
                self.tz.from_utc_datetime(&(naive - before))
            }
        }
    }
}

/// Calendar date part of an `eventDate` string.
pub fn parse_event_date(raw: &str) -> SyncResult<NaiveDate> {
    let raw = raw.trim();
    EVENT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| SyncError::InvalidDate(raw.to_string()))
}

pub fn parse_time_of_day(raw: &str) -> SyncResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_OF_DAY_FORMAT)
        .map_err(|_| SyncError::InvalidTime(raw.to_string()))
}
