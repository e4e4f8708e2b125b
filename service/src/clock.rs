use mockall::automock;

/// "Today" is always derived from the tenant's configured civil timezone,
/// never from UTC midnight - injected everywhere so tests can supply a
/// deterministic instance instead of reading the wall clock.
#[automock]
pub trait ClockService {
    fn today(&self) -> time::Date;
    fn now(&self) -> time::PrimitiveDateTime;
}
