use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use validator::Validate;

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

/// Parses any `FromStr` enum, turning its message into a 400.
pub fn parse_enum<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(AppError::BadRequest)
}

pub fn parse_optional_enum<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = String>,
{
    raw.filter(|s| !s.trim().is_empty()).map(parse_enum::<T>).transpose()
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

pub fn parse_date_or_today(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(today()),
    }
}

/// RFC 3339 timestamp, or now when absent.
pub fn parse_timestamp_or_now(raw: Option<&str>) -> Result<DateTime<Utc>, AppError> {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| AppError::BadRequest("Invalid date format".to_string())),
        None => Ok(Utc::now()),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
