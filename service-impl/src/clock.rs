use service::clock::ClockService;
use time::OffsetDateTime;
use time_tz::{timezones, OffsetDateTimeExt, Tz};

/// "Today" is always derived from the tenant's configured civil timezone
/// (the source repo's own default is `Europe/Berlin`), never from UTC
/// midnight - an unknown zone name falls back to UTC rather than panicking
/// at startup.
pub struct ClockServiceImpl {
    tz: &'static Tz,
}

impl ClockServiceImpl {
    pub fn new(timezone: &str) -> Self {
        let tz = timezones::get_by_name(timezone).unwrap_or(timezones::db::UTC);
        Self { tz }
    }
}

impl ClockService for ClockServiceImpl {
    fn today(&self) -> time::Date {
        OffsetDateTime::now_utc().to_timezone(self.tz).date()
    }

    fn now(&self) -> time::PrimitiveDateTime {
        let local = OffsetDateTime::now_utc().to_timezone(self.tz);
        time::PrimitiveDateTime::new(local.date(), local.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_timezone_falls_back_to_utc_instead_of_panicking() {
        let clock = ClockServiceImpl::new("Not/A_Real_Zone");
        // Should not panic; "today" should be within a day of UTC today.
        let _ = clock.today();
    }
}
