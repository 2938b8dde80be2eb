//! Conversion between 12-hour slot labels (`"10:00 AM"`) shown in the booking
//! UI and the 24-hour times (`"10:00"`, `"10:00:00"`) stored by the backend.
//!
//! Neither direction fails; input that does not look like a time is handed
//! back unchanged.

/// `"10:00 AM"` -> `"10:00"`, `"12:00 AM"` -> `"00:00"`, `"1:30 pm"` -> `"13:30"`.
///
/// A label without a meridian is returned as-is (trimmed).
pub fn to_24_hour(label: &str) -> String {
    let label = label.trim();
    let Some((time, meridian)) = label.split_once(' ') else {
        return label.to_string();
    };
    let Some((hour, minute)) = split_clock(time) else {
        return label.to_string();
    };
    if hour > 12 {
        return label.to_string();
    }

    let meridian = meridian.trim();
    let hour = if meridian.eq_ignore_ascii_case("PM") && hour != 12 {
        hour + 12
    } else if meridian.eq_ignore_ascii_case("AM") && hour == 12 {
        0
    } else {
        hour
    };
    format!("{hour:02}:{minute:02}")
}

/// `"13:30"` -> `"1:30 PM"`, `"00:00"` -> `"12:00 AM"`, `"09:05:00"` -> `"9:05 AM"`.
pub fn to_12_hour(time24: &str) -> String {
    if time24.is_empty() {
        return String::new();
    }
    let Some((hour, minute)) = split_clock(time24.trim()) else {
        return time24.to_string();
    };
    if hour > 23 {
        return time24.to_string();
    }

    let meridian = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02} {meridian}")
}

/// Reduce either form to `HH:MM` so UI labels can be matched against stored times.
pub fn canonical_slot(value: &str) -> String {
    let value = value.trim();
    if value.contains(' ') {
        to_24_hour(value)
    } else {
        to_24_hour(&to_12_hour(value))
    }
}

/// True when both values name the same clock slot, whatever form they are in.
pub fn same_slot(a: &str, b: &str) -> bool {
    canonical_slot(a) == canonical_slot(b)
}

/// Hour and minute of an `H[:MM[:SS]]` string. Seconds are ignored.
fn split_clock(time: &str) -> Option<(u32, u32)> {
    let mut parts = time.split(':');
    let hour = parts.next()?.parse::<u32>().ok()?;
    let minute = match parts.next() {
        Some(m) if !m.is_empty() => m.parse::<u32>().ok()?,
        _ => 0,
    };
    (minute < 60).then_some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_to_twenty_four() {
        assert_eq!(to_24_hour("10:00 AM"), "10:00");
        assert_eq!(to_24_hour("12:00 PM"), "12:00");
        assert_eq!(to_24_hour("12:00 AM"), "00:00");
        assert_eq!(to_24_hour("1:30 pm"), "13:30");
        assert_eq!(to_24_hour("7 PM"), "19:00");
        assert_eq!(to_24_hour("  9:05 Am "), "09:05");
    }

    #[test]
    fn twenty_four_to_twelve() {
        assert_eq!(to_12_hour("00:00"), "12:00 AM");
        assert_eq!(to_12_hour("13:30"), "1:30 PM");
        assert_eq!(to_12_hour("12:00"), "12:00 PM");
        assert_eq!(to_12_hour("09:05"), "9:05 AM");
        assert_eq!(to_12_hour("18"), "6:00 PM");
        assert_eq!(to_12_hour("10:00:00"), "10:00 AM");
        assert_eq!(to_12_hour("6:5"), "6:05 AM");
    }

    #[test]
    fn unparseable_values_pass_through() {
        assert_eq!(to_24_hour("10:00"), "10:00");
        assert_eq!(to_24_hour("Flexible Time"), "Flexible Time");
        assert_eq!(to_24_hour("13:00 PM"), "13:00 PM");
        assert_eq!(to_12_hour(""), "");
        assert_eq!(to_12_hour("noon"), "noon");
        assert_eq!(to_12_hour("24:00"), "24:00");
        assert_eq!(to_12_hour("10:75"), "10:75");
    }

    #[test]
    fn round_trip_covers_every_minute_of_the_day() {
        for hour in 0..24 {
            for minute in 0..60 {
                let t = format!("{hour:02}:{minute:02}");
                assert_eq!(to_24_hour(&to_12_hour(&t)), t);
            }
        }
        assert_eq!(to_24_hour(&to_12_hour("09:05")), "09:05");
    }

    #[test]
    fn slots_match_across_forms() {
        assert!(same_slot("10:00 AM", "10:00:00"));
        assert!(same_slot("4:30 PM", "16:30"));
        assert!(same_slot("12:00 AM", "0:00"));
        assert!(!same_slot("10:00 AM", "10:00 PM"));
        assert_eq!(canonical_slot("6:00:00"), "06:00");
    }
}
