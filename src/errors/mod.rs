//! Public error type of the almanac

use crate::planetlib::{Body, EphemerisError};
use crate::time::civil::local_date;
use crate::time::{Time, TimeError};
use chrono::{Duration, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlmanacError {
    /// The requested dates fall outside the ephemeris; carries the usable civil dates
    #[error("The date must be between {min_date} and {max_date}")]
    OutOfRangeDate {
        min_date: NaiveDate,
        max_date: NaiveDate,
    },

    #[error("The start date ({start}) must be before the end date ({end})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A radius-dependent computation was asked of a body without a radius
    #[error("{0} has no known radius")]
    MissingPhysicalProperty(Body),

    #[error("ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),

    #[error("time error: {0}")]
    Time(#[from] TimeError),
}

pub type Result<T> = std::result::Result<T, AlmanacError>;

impl AlmanacError {
    /// Turn an ephemeris coverage failure into the civil dates a caller may ask for
    ///
    /// `padding_days` is how far the failing search reaches beyond the requested
    /// date on each side; the usable range shrinks by that much. Other errors
    /// pass through untouched.
    pub(crate) fn with_date_range(self, offset_hours: f64, padding_days: i64) -> Self {
        let (start_jd, end_jd) = match self {
            AlmanacError::Ephemeris(EphemerisError::Coverage { start_jd, end_jd }) => {
                (start_jd, end_jd)
            }
            other => return other,
        };

        let bounds = local_date(&Time::from_tdb_jd(start_jd), offset_hours).and_then(|start| {
            Ok((start, local_date(&Time::from_tdb_jd(end_jd), offset_hours)?))
        });
        match bounds {
            Ok((start, end)) => AlmanacError::OutOfRangeDate {
                min_date: start + Duration::days(padding_days),
                max_date: end - Duration::days(padding_days),
            },
            Err(error) => AlmanacError::Time(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let error = AlmanacError::OutOfRangeDate {
            min_date: NaiveDate::from_ymd_opt(1899, 7, 29).unwrap(),
            max_date: NaiveDate::from_ymd_opt(2053, 10, 7).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "The date must be between 1899-07-29 and 2053-10-07"
        );

        let error = AlmanacError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2021, 1, 28).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 1, 26).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "The start date (2021-01-28) must be before the end date (2021-01-26)"
        );

        assert_eq!(
            AlmanacError::MissingPhysicalProperty(Body::Earth).to_string(),
            "Earth has no known radius"
        );
    }

    #[test]
    fn test_coverage_becomes_date_range() {
        // 1899-07-29 06:00 to 2053-10-08 18:00
        let coverage = || EphemerisError::Coverage {
            start_jd: 2_414_864.75,
            end_jd: 2_471_184.25,
        };

        match AlmanacError::from(coverage()).with_date_range(0.0, 1) {
            AlmanacError::OutOfRangeDate { min_date, max_date } => {
                assert_eq!(min_date, NaiveDate::from_ymd_opt(1899, 7, 30).unwrap());
                assert_eq!(max_date, NaiveDate::from_ymd_opt(2053, 10, 7).unwrap());
            }
            other => panic!("expected OutOfRangeDate, got {other:?}"),
        }

        match AlmanacError::from(coverage()).with_date_range(0.0, 12) {
            AlmanacError::OutOfRangeDate { min_date, max_date } => {
                assert_eq!(min_date, NaiveDate::from_ymd_opt(1899, 8, 10).unwrap());
                assert_eq!(max_date, NaiveDate::from_ymd_opt(2053, 9, 26).unwrap());
            }
            other => panic!("expected OutOfRangeDate, got {other:?}"),
        }

        // a timezone far east pushes the start date forward
        match AlmanacError::from(coverage()).with_date_range(20.0, 0) {
            AlmanacError::OutOfRangeDate { min_date, .. } => {
                assert_eq!(min_date, NaiveDate::from_ymd_opt(1899, 7, 30).unwrap());
            }
            other => panic!("expected OutOfRangeDate, got {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_pass_through() {
        let error = AlmanacError::MissingPhysicalProperty(Body::Earth).with_date_range(2.0, 1);
        assert!(matches!(error, AlmanacError::MissingPhysicalProperty(Body::Earth)));
    }
}
