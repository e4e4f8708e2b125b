/// Renders a signed decimal hour value as `±H:MMh`, the display format used
/// throughout the "Arbeitszeitkonto" views. The sign is carried on the whole
/// expression, never on the minute component, and minutes are rounded to the
/// nearest whole minute (carrying into the hour component at the 60 boundary).
pub fn format_hours(hours: f64) -> String {
    let sign = if hours < 0.0 { "-" } else { "" };
    let magnitude = hours.abs();
    let mut whole_hours = magnitude.trunc() as i64;
    let mut minutes = ((magnitude - whole_hours as f64) * 60.0).round() as i64;
    if minutes >= 60 {
        whole_hours += 1;
        minutes -= 60;
    }
    format!("{sign}{whole_hours}:{minutes:02}h")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_scenarios_from_the_ledger_spec() {
        assert_eq!(format_hours(-23.5), "-23:30h");
        assert_eq!(format_hours(-24.0), "-24:00h");
        assert_eq!(format_hours(-0.5), "-0:30h");
        assert_eq!(format_hours(-1.25), "-1:15h");
        assert_eq!(format_hours(8.33), "8:20h");
        assert_eq!(format_hours(-100.5), "-100:30h");
    }

    #[test]
    fn zero_has_no_sign() {
        assert_eq!(format_hours(0.0), "0:00h");
    }

    #[test]
    fn minute_rounding_carries_into_hour() {
        assert_eq!(format_hours(8.999), "9:00h");
        assert_eq!(format_hours(-8.999), "-9:00h");
    }
}
