use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::model::Ms;

/// Why a time expression was not accepted. Callers must match on this —
/// there is no nullable escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRejection {
    /// Missing or garbled hour/period token.
    Malformed,
    /// Hour outside 1–12.
    HourOutOfRange,
    /// Minutes outside 0–59.
    MinuteOutOfRange,
    /// Resulting timestamp is earlier than the reference now.
    InPast,
    /// Resulting timestamp is further out than the configured horizon.
    BeyondHorizon,
    /// The wall-clock time does not exist (or is ambiguous) in the
    /// reference zone, e.g. inside a DST gap.
    NonexistentLocalTime,
}

impl std::fmt::Display for TimeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRejection::Malformed => write!(f, "expected a time like 4pm or 8:30pm"),
            TimeRejection::HourOutOfRange => write!(f, "hour must be between 1 and 12"),
            TimeRejection::MinuteOutOfRange => write!(f, "minutes must be between 00 and 59"),
            TimeRejection::InPast => write!(f, "that time has already passed"),
            TimeRejection::BeyondHorizon => write!(f, "that time is too far in the future"),
            TimeRejection::NonexistentLocalTime => {
                write!(f, "that time does not exist in the local zone")
            }
        }
    }
}

/// Parse `[tomorrow ]H[:MM](am|pm)` against a reference instant.
///
/// Case-insensitive and whitespace-tolerant. The result is localized to
/// `tz` with seconds truncated to zero. Accepts instants in
/// `[now, now + horizon_ms]`; everything else is a `TimeRejection`.
pub fn parse(text: &str, now: Ms, tz: Tz, horizon_ms: Ms) -> Result<Ms, TimeRejection> {
    let lowered = text.trim().to_lowercase();
    let (tomorrow, rest) = match lowered.strip_prefix("tomorrow") {
        Some(rest) => (true, rest),
        None => (false, lowered.as_str()),
    };
    let compact: String = rest.chars().filter(|c| !c.is_whitespace()).collect();

    let (clock, pm) = if let Some(c) = compact.strip_suffix("pm") {
        (c, true)
    } else if let Some(c) = compact.strip_suffix("am") {
        (c, false)
    } else {
        return Err(TimeRejection::Malformed);
    };

    let (hour_text, minute_text) = match clock.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (clock, None),
    };
    if hour_text.is_empty() || hour_text.len() > 2 || !hour_text.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(TimeRejection::Malformed);
    }
    let hour: u32 = hour_text.parse().map_err(|_| TimeRejection::Malformed)?;
    if !(1..=12).contains(&hour) {
        return Err(TimeRejection::HourOutOfRange);
    }

    let minute: u32 = match minute_text {
        None => 0,
        Some(m) => {
            // Minutes are written :MM, always two digits
            if m.len() != 2 || !m.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimeRejection::Malformed);
            }
            let m: u32 = m.parse().map_err(|_| TimeRejection::Malformed)?;
            if m > 59 {
                return Err(TimeRejection::MinuteOutOfRange);
            }
            m
        }
    };

    let hour24 = match (hour, pm) {
        (12, true) => 12,
        (12, false) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    };

    let local_now = local_datetime(now, tz).ok_or(TimeRejection::NonexistentLocalTime)?;
    let date = if tomorrow {
        local_now
            .date_naive()
            .succ_opt()
            .ok_or(TimeRejection::Malformed)?
    } else {
        local_now.date_naive()
    };
    let naive = date
        .and_hms_opt(hour24, minute, 0)
        .ok_or(TimeRejection::Malformed)?;
    let instant = tz
        .from_local_datetime(&naive)
        .single()
        .ok_or(TimeRejection::NonexistentLocalTime)?;

    let ts = instant.timestamp_millis();
    if ts < now {
        return Err(TimeRejection::InPast);
    }
    if ts > now + horizon_ms {
        return Err(TimeRejection::BeyondHorizon);
    }
    Ok(ts)
}

fn local_datetime(ms: Ms, tz: Tz) -> Option<DateTime<Tz>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.with_timezone(&tz))
}

/// Render an instant as a local clock time, e.g. "4:30pm".
pub fn fmt_local(ms: Ms, tz: Tz) -> String {
    match local_datetime(ms, tz) {
        Some(dt) => dt.format("%-I:%M%P").to_string(),
        None => format!("@{ms}ms"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HOUR_MS, MINUTE_MS};
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    const HORIZON: Ms = 24 * HOUR_MS;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Ms {
        New_York
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn plain_afternoon_time() {
        let now = at(2025, 6, 2, 9, 0);
        let ts = parse("4pm", now, New_York, HORIZON).unwrap();
        assert_eq!(ts, at(2025, 6, 2, 16, 0));
    }

    #[test]
    fn minutes_and_mixed_case_and_spaces() {
        let now = at(2025, 6, 2, 9, 0);
        assert_eq!(
            parse("8:30PM", now, New_York, HORIZON).unwrap(),
            at(2025, 6, 2, 20, 30)
        );
        assert_eq!(
            parse("  8 : 30 pm ", now, New_York, HORIZON).unwrap(),
            at(2025, 6, 2, 20, 30)
        );
    }

    #[test]
    fn noon_and_midnight_mapping() {
        let now = at(2025, 6, 2, 1, 0);
        assert_eq!(
            parse("12pm", now, New_York, HORIZON).unwrap(),
            at(2025, 6, 2, 12, 0)
        );
        // 12am today is already past at 1:00 — say "tomorrow 12am"
        assert_eq!(
            parse("tomorrow 12am", now, New_York, HORIZON).unwrap(),
            at(2025, 6, 3, 0, 0)
        );
    }

    #[test]
    fn tomorrow_prefix() {
        let now = at(2025, 6, 2, 9, 0);
        assert_eq!(
            parse("Tomorrow 6am", now, New_York, HORIZON).unwrap(),
            at(2025, 6, 3, 6, 0)
        );
    }

    #[test]
    fn malformed_inputs() {
        let now = at(2025, 6, 2, 9, 0);
        for text in ["", "4", "pm", "4xm", "four pm", "4:pm", ":30pm", "4:301pm", "123pm", "4:5pm"] {
            assert_eq!(
                parse(text, now, New_York, HORIZON),
                Err(TimeRejection::Malformed),
                "input: {text:?}"
            );
        }
    }

    #[test]
    fn hour_out_of_range() {
        let now = at(2025, 6, 2, 9, 0);
        assert_eq!(
            parse("0pm", now, New_York, HORIZON),
            Err(TimeRejection::HourOutOfRange)
        );
        assert_eq!(
            parse("13pm", now, New_York, HORIZON),
            Err(TimeRejection::HourOutOfRange)
        );
    }

    #[test]
    fn minute_out_of_range() {
        let now = at(2025, 6, 2, 9, 0);
        assert_eq!(
            parse("4:60pm", now, New_York, HORIZON),
            Err(TimeRejection::MinuteOutOfRange)
        );
    }

    #[test]
    fn past_time_rejected_equal_accepted() {
        let now = at(2025, 6, 2, 6, 1);
        assert_eq!(parse("6am", now, New_York, HORIZON), Err(TimeRejection::InPast));
        // Exactly now is accepted
        assert_eq!(parse("6:01am", now, New_York, HORIZON).unwrap(), now);
    }

    #[test]
    fn horizon_boundary() {
        // Exactly now + 24h is accepted
        let now = at(2025, 6, 2, 6, 0);
        assert_eq!(
            parse("tomorrow 6am", now, New_York, HORIZON).unwrap(),
            now + HORIZON
        );
        // One minute further out is not
        let earlier = at(2025, 6, 2, 5, 59);
        assert_eq!(
            parse("tomorrow 6am", earlier, New_York, HORIZON),
            Err(TimeRejection::BeyondHorizon)
        );
    }

    #[test]
    fn tomorrow_within_horizon_accepted() {
        // 6:01am → tomorrow 6am is 23h59m out, inside a 24h horizon
        let now = at(2025, 6, 2, 6, 1);
        assert_eq!(
            parse("tomorrow 6am", now, New_York, HORIZON).unwrap(),
            at(2025, 6, 3, 6, 0)
        );
    }

    #[test]
    fn twelve_hour_horizon() {
        let now = at(2025, 6, 2, 9, 0);
        assert_eq!(
            parse("tomorrow 8am", now, New_York, 12 * HOUR_MS),
            Err(TimeRejection::BeyondHorizon)
        );
        assert!(parse("8pm", now, New_York, 12 * HOUR_MS).is_ok());
    }

    #[test]
    fn dst_gap_rejected() {
        // 2:30am on 2025-03-09 does not exist in America/New_York
        let now = at(2025, 3, 9, 1, 0);
        assert_eq!(
            parse("2:30am", now, New_York, HORIZON),
            Err(TimeRejection::NonexistentLocalTime)
        );
    }

    #[test]
    fn seconds_truncated() {
        let now = at(2025, 6, 2, 9, 0) + 30_500; // 9:00:30.5
        let ts = parse("10am", now, New_York, HORIZON).unwrap();
        assert_eq!(ts % MINUTE_MS, 0);
    }

    #[test]
    fn fmt_local_clock() {
        assert_eq!(fmt_local(at(2025, 6, 2, 16, 30), New_York), "4:30pm");
        assert_eq!(fmt_local(at(2025, 6, 2, 0, 5), New_York), "12:05am");
    }
}
