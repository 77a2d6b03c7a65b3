// Sharing a lock reference as `lat`/`lon` query parameters, and joining one.

use std::fmt;

use super::geo::Coordinates;
use super::session::LockReference;

#[derive(Clone, Debug, PartialEq)]
pub enum ShareError {
    MissingParam(&'static str),
    InvalidNumber { param: &'static str, value: String },
    OutOfRange { param: &'static str, value: f64 },
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareError::MissingParam(p) => write!(f, "join link has no `{p}` parameter"),
            ShareError::InvalidNumber { param, value } => {
                write!(f, "join link `{param}` is not a number: {value:?}")
            }
            ShareError::OutOfRange { param, value } => {
                write!(f, "join link `{param}` is out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ShareError {}

pub fn share_url(base: &str, lock: &LockReference) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}lat={:.6}&lon={:.6}", lock.latitude, lock.longitude)
}

/// Accepts a full URL or a bare query string (`lat=..&lon=..`).
pub fn parse_join_url(url: &str) -> Result<LockReference, ShareError> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let query = match without_fragment.split_once('?') {
        Some((_, q)) => q,
        None => without_fragment,
    };

    let mut lat = None;
    let mut lon = None;
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key.trim() {
            "lat" => lat = Some(value.trim()),
            "lon" => lon = Some(value.trim()),
            _ => {}
        }
    }

    let latitude = parse_param("lat", lat, 90.0)?;
    let longitude = parse_param("lon", lon, 180.0)?;
    Ok(Coordinates::new(latitude, longitude))
}

fn parse_param(param: &'static str, raw: Option<&str>, limit: f64) -> Result<f64, ShareError> {
    let raw = raw.ok_or(ShareError::MissingParam(param))?;
    let value: f64 = raw.parse().map_err(|_| ShareError::InvalidNumber {
        param,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ShareError::InvalidNumber { param, value: raw.to_string() });
    }
    if !(-limit..=limit).contains(&value) {
        return Err(ShareError::OutOfRange { param, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_valid_link() {
        let lock = parse_join_url("https://example.org/beat?lat=45.1234&lon=-122.5678").unwrap();
        assert!((lock.latitude - 45.1234).abs() < 1e-4);
        assert!((lock.longitude + 122.5678).abs() < 1e-4);
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = parse_join_url("https://example.org/?lat=95&lon=10").unwrap_err();
        assert_eq!(err, ShareError::OutOfRange { param: "lat", value: 95.0 });
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let err = parse_join_url("lat=10&lon=-180.5").unwrap_err();
        assert_eq!(err, ShareError::OutOfRange { param: "lon", value: -180.5 });
    }

    #[test]
    fn rejects_missing_and_garbage_params() {
        assert_eq!(parse_join_url("https://example.org/?lat=10"), Err(ShareError::MissingParam("lon")));
        assert!(matches!(
            parse_join_url("?lat=north&lon=3"),
            Err(ShareError::InvalidNumber { param: "lat", .. })
        ));
        assert!(matches!(
            parse_join_url("?lat=NaN&lon=3"),
            Err(ShareError::InvalidNumber { param: "lat", .. })
        ));
    }

    #[test]
    fn ignores_fragment_and_other_params() {
        let lock = parse_join_url("https://x.y/?mode=free&lon=2.5&lat=-3.25#top").unwrap();
        assert_eq!(lock, Coordinates::new(-3.25, 2.5));
    }

    #[test]
    fn shared_link_joins_back_to_the_same_place() {
        let lock = Coordinates::new(45.1234, -122.5678);
        let url = share_url("https://example.org/beat", &lock);
        assert_eq!(url, "https://example.org/beat?lat=45.123400&lon=-122.567800");
        let joined = parse_join_url(&url).unwrap();
        assert!((joined.latitude - lock.latitude).abs() < 1e-4);
        assert!((joined.longitude - lock.longitude).abs() < 1e-4);
    }
}
