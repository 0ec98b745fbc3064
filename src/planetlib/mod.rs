//! Solar system bodies and the ephemeris provider seam
//!
//! Everything above this module asks an [`EphemerisProvider`] for barycentric
//! positions and never touches kernel files directly. [`SpkEphemeris`] is the
//! provider backed by a JPL planetary kernel such as DE421.

use crate::constants::DAY_S;
use crate::jplephem::{JplephemError, SPK};
use crate::time::Time;
use nalgebra::Vector3;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[cfg(test)]
pub(crate) mod analytic;

/// Error type for ephemeris queries
#[derive(Debug, Error)]
pub enum EphemerisError {
    /// The instant falls outside the span the provider can answer for
    #[error("ephemeris covers TDB JD {start_jd} to {end_jd}")]
    Coverage { start_jd: f64, end_jd: f64 },

    #[error("{0:?} is not available from this ephemeris")]
    MissingBody(Body),

    #[error("kernel error: {0}")]
    Kernel(#[from] JplephemError),
}

/// Result type for ephemeris queries
pub type Result<T> = std::result::Result<T, EphemerisError>;

/// Enum representing the major solar system bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }

    /// NAIF id of the body's system barycenter, or of the body itself for
    /// the Sun, Earth and Moon
    pub fn naif_id(&self) -> i32 {
        match self {
            Body::Sun => 10,
            Body::Moon => 301,
            Body::Mercury => 1,
            Body::Venus => 2,
            Body::Earth => 399,
            Body::Mars => 4,
            Body::Jupiter => 5,
            Body::Saturn => 6,
            Body::Uranus => 7,
            Body::Neptune => 8,
            Body::Pluto => 9,
        }
    }

    /// Every body, in declaration order
    pub const ALL: [Body; 11] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of barycentric body positions
///
/// Positions are ICRF vectors in km relative to the solar system barycenter,
/// velocities are km/day.
pub trait EphemerisProvider {
    fn barycentric_position(&self, body: Body, t: &Time) -> Result<Vector3<f64>>;

    /// Velocity by central difference over one minute; providers with
    /// analytic derivatives should override this
    fn barycentric_velocity(&self, body: Body, t: &Time) -> Result<Vector3<f64>> {
        let h = 60.0 / DAY_S;
        let ahead = self.barycentric_position(body, &(*t + h))?;
        let behind = self.barycentric_position(body, &(*t - h))?;
        Ok((ahead - behind) / (2.0 * h))
    }

    /// First and last instant the provider can answer for
    fn coverage(&self) -> (Time, Time);
}

/// Chain of (center, target) segments summing to a barycentric position
type Chain = Vec<(i32, i32)>;

/// Planetary ephemeris read from an SPK kernel
#[derive(Debug)]
pub struct SpkEphemeris {
    spk: SPK,
    chains: Vec<(Body, Chain)>,
    start_jd: f64,
    end_jd: f64,
}

impl SpkEphemeris {
    /// Open the kernel at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_spk(SPK::open(path)?)
    }

    /// Wrap an already opened kernel, resolving a segment chain per body
    pub fn from_spk(spk: SPK) -> Result<Self> {
        let mut chains = Vec::new();
        for body in Body::ALL {
            if let Some(chain) = Self::resolve_chain(&spk, body) {
                chains.push((body, chain));
            }
        }

        let mut start_jd = f64::NEG_INFINITY;
        let mut end_jd = f64::INFINITY;
        for (_, chain) in &chains {
            for &(center, target) in chain {
                let segment = spk.get_segment(center, target)?;
                start_jd = start_jd.max(segment.start_jd);
                end_jd = end_jd.min(segment.end_jd);
            }
        }
        if chains.is_empty() || start_jd > end_jd {
            return Err(JplephemError::InvalidFormat(
                "kernel carries no usable planetary segments".to_string(),
            )
            .into());
        }

        log::debug!(
            "ephemeris {} resolves {} bodies, TDB JD {start_jd}..{end_jd}",
            spk.daf.path.display(),
            chains.len()
        );

        Ok(Self {
            spk,
            chains,
            start_jd,
            end_jd,
        })
    }

    fn resolve_chain(spk: &SPK, body: Body) -> Option<Chain> {
        let first = match body {
            Body::Earth => (3, 399),
            Body::Moon => (3, 301),
            other => (0, other.naif_id()),
        };

        let mut chain = Vec::new();
        if first.0 != 0 {
            chain.push((0, first.0));
        }
        chain.push(first);

        // planets inside their system barycenter, when the kernel has them
        let barycenter = first.1;
        if (1..=9).contains(&barycenter) && spk.contains(barycenter, barycenter * 100 + 99) {
            chain.push((barycenter, barycenter * 100 + 99));
        }

        chain
            .iter()
            .all(|&(center, target)| spk.contains(center, target))
            .then_some(chain)
    }

    fn chain(&self, body: Body) -> Result<&Chain> {
        self.chains
            .iter()
            .find(|(b, _)| *b == body)
            .map(|(_, chain)| chain)
            .ok_or(EphemerisError::MissingBody(body))
    }

    fn check_coverage(&self, t: &Time) -> Result<()> {
        let jd = t.tdb();
        if jd < self.start_jd || jd > self.end_jd {
            return Err(EphemerisError::Coverage {
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }
        Ok(())
    }

    /// Bodies this kernel can position
    pub fn bodies(&self) -> Vec<Body> {
        self.chains.iter().map(|(body, _)| *body).collect()
    }

    /// The underlying kernel
    pub fn spk(&self) -> &SPK {
        &self.spk
    }

    /// Drop every cached segment; coefficients reload from the kernel on demand
    pub fn clear_cache(&mut self) {
        self.spk.clear_cache();
    }
}

impl EphemerisProvider for SpkEphemeris {
    fn barycentric_position(&self, body: Body, t: &Time) -> Result<Vector3<f64>> {
        self.check_coverage(t)?;
        let seconds = t.tdb_seconds_from_j2000();
        self.chain(body)?
            .iter()
            .try_fold(
                Vector3::zeros(),
                |sum, &(center, target)| -> Result<Vector3<f64>> {
                    Ok(sum + self.spk.compute(center, target, seconds)?)
                },
            )
    }

    fn barycentric_velocity(&self, body: Body, t: &Time) -> Result<Vector3<f64>> {
        self.check_coverage(t)?;
        let seconds = t.tdb_seconds_from_j2000();
        let km_per_s = self.chain(body)?.iter().try_fold(
            Vector3::zeros(),
            |sum, &(center, target)| -> Result<Vector3<f64>> {
                let (_, velocity) = self.spk.compute_and_differentiate(center, target, seconds)?;
                Ok(sum + velocity)
            },
        )?;
        Ok(km_per_s * DAY_S)
    }

    fn coverage(&self) -> (Time, Time) {
        (
            Time::from_tdb_jd(self.start_jd),
            Time::from_tdb_jd(self.end_jd),
        )
    }
}
