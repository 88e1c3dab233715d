//! Error taxonomy for the estimation pipeline.

use crate::models::VesselId;
use chrono::NaiveDate;
use std::error::Error as StdError;

/// Boxed error returned by injected collaborators.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of a failure, used by callers to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Route data the caller sent cannot be processed.
    BadInput,
    /// A weather or fuel-sample collaborator failed.
    Upstream,
    /// No fuel samples exist for the vessel.
    NotFound,
    /// A contract between components was broken.
    Internal,
    /// The request was cancelled or ran past its deadline.
    Cancelled,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::BadInput => "bad input",
            Kind::Upstream => "upstream unavailable",
            Kind::NotFound => "not found",
            Kind::Internal => "internal error",
            Kind::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("waypoint {index} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("segment {index} has non-positive elapsed time of {elapsed_minutes} minutes")]
    NonPositiveElapsed { index: usize, elapsed_minutes: f64 },

    #[error("weather lookup failed for {date}")]
    WeatherLookup {
        date: NaiveDate,
        #[source]
        source: BoxError,
    },

    #[error("fuel sample lookup failed for vessel {vessel_id} at draught {draught}")]
    FuelSampleLookup {
        vessel_id: VesselId,
        draught: f64,
        #[source]
        source: BoxError,
    },

    #[error("no fuel samples for vessel {vessel_id} near draught {draught}")]
    NoFuelSamples { vessel_id: VesselId, draught: f64 },

    #[error("no candidate fuel samples to match segment {index} against")]
    EmptyCandidates { index: usize },

    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    #[error("route {index} failed")]
    Route {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> Kind {
        match self {
            Error::InvalidCoordinates { .. } | Error::NonPositiveElapsed { .. } => Kind::BadInput,
            Error::WeatherLookup { .. } | Error::FuelSampleLookup { .. } => Kind::Upstream,
            Error::NoFuelSamples { .. } => Kind::NotFound,
            Error::EmptyCandidates { .. } => Kind::Internal,
            Error::Cancelled { .. } => Kind::Cancelled,
            Error::Route { source, .. } => source.kind(),
        }
    }

    pub(crate) fn in_route(self, index: usize) -> Self {
        Error::Route {
            index,
            source: Box::new(self),
        }
    }

    /// Messages of this error and every underlying cause, outermost first.
    pub fn causes(&self) -> Vec<String> {
        let mut causes = vec![self.to_string()];
        let mut current = StdError::source(self);
        while let Some(err) = current {
            causes.push(err.to_string());
            current = err.source();
        }
        causes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_error_takes_kind_of_inner_error() {
        let err = Error::NonPositiveElapsed {
            index: 2,
            elapsed_minutes: 0.0,
        }
        .in_route(1);
        assert_eq!(err.kind(), Kind::BadInput);

        let err = Error::Cancelled {
            operation: "weather lookup",
        }
        .in_route(0);
        assert_eq!(err.kind(), Kind::Cancelled);
    }

    #[test]
    fn causes_walk_the_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "weather api timed out");
        let err = Error::WeatherLookup {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            source: Box::new(io),
        }
        .in_route(3);

        assert_eq!(err.kind(), Kind::Upstream);
        assert_eq!(
            err.causes(),
            vec![
                "route 3 failed".to_string(),
                "weather lookup failed for 2024-03-01".to_string(),
                "weather api timed out".to_string(),
            ]
        );
    }
}
