use chrono::NaiveDate;

/// Every day in `[start, end)`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d < end)
        .collect()
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> crate::error::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?)
}
