use chrono::{DateTime, Datelike, LocalResult, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Floor `ts` to the top of its wall-clock hour in `zone` and return the
/// matching instant. The result is never later than `ts`. When a
/// daylight-saving fall-back makes the floored wall time ambiguous, the
/// later instant wins if it still precedes `ts`, otherwise the earlier.
pub fn align_to_hour(ts: DateTime<Utc>, zone: Tz) -> DateTime<Utc> {
    let local = ts.with_timezone(&zone);
    let Some(wall) = local.date_naive().and_hms_opt(local.hour(), 0, 0) else {
        return utc_hour_floor(ts);
    };

    let aligned = match zone.from_local_datetime(&wall) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, later) => {
            let later = later.with_timezone(&Utc);
            if later <= ts {
                later
            } else {
                earlier.with_timezone(&Utc)
            }
        }
        // The wall-clock hour start fell inside a spring-forward jump.
        LocalResult::None => utc_hour_floor(ts),
    };

    // Never hand back a boundary later than the input.
    if aligned > ts {
        utc_hour_floor(ts)
    } else {
        aligned
    }
}

fn utc_hour_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(ts.year(), ts.month(), ts.day(), ts.hour(), 0, 0)
        .single()
        .unwrap_or(ts)
}
