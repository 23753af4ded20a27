use chrono::NaiveDate;

/// Markup added on top of the nightly rate.
pub const SERVICE_FEE_PERCENT: i64 = 10;

/// Number of days a booking covers, counting both endpoints.
pub fn days_booked(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Total charged for a stay: `ceil(days * nightly_price * 1.1)`.
///
/// Computed in integers so that e.g. 2 days at 100 comes out as exactly 220
/// instead of tripping over the binary representation of 1.1. Bookings whose
/// end precedes their start are not rejected here; the same formula applies.
/// Returns `None` when the total does not fit in an `i64`.
pub fn total_cost(start: NaiveDate, end: NaiveDate, nightly_price: i64) -> Option<i64> {
    let numerator = days_booked(start, end)
        .checked_mul(nightly_price)?
        .checked_mul(100 + SERVICE_FEE_PERCENT)?;
    ceil_div(numerator, 100)
}

fn ceil_div(numerator: i64, denominator: i64) -> Option<i64> {
    Some(numerator.checked_add(denominator - 1)?.div_euclid(denominator))
}
