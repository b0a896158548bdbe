use std::str::FromStr;

use axum::{
    extract::{FromRequestParts, Path},
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use time::Date;

use crate::database::DATE_FORMAT;

/// Path parameters where a segment that fails to parse means the route does not match.
///
/// Axum's `Path` answers such segments with 400; here they become a plain 404,
/// the same response an unknown URL gets.
#[derive(Debug)]
pub struct RoutePath<T>(pub T);

impl<S, T> FromRequestParts<S> for RoutePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(RoutePath(value)),
            Err(rejection) => {
                tracing::debug!(
                    uri = %parts.uri,
                    "path does not match route: {}",
                    rejection.body_text()
                );
                Err(StatusCode::NOT_FOUND)
            }
        }
    }
}

/// A `YYYY-MM-DD` calendar date taken from a URL segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate(pub Date);

impl FromStr for CalendarDate {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let bytes = value.as_bytes();
        let well_shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_shaped {
            return Err(format!("'{}' is not a YYYY-MM-DD date", value));
        }

        Date::parse(value, DATE_FORMAT)
            .map(CalendarDate)
            .map_err(|e| format!("'{}' is not a valid date: {}", value, e))
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
