//! Search routines for discrete changes and extrema of time-dependent values
//!
//! Modeled on skyfield's `searchlib`. A function is sampled on a grid sized
//! from its rough period, then every bracket that shows a change (or a local
//! extremum) is refined until it is narrower than the requested tolerance.
//! Anything that happens faster than the grid can see is missed.

use crate::constants::SAMPLES_PER_PERIOD;
use crate::time::Time;

/// A function of time tagged with the period over which it is expected to
/// change at most once
pub struct Observable<F> {
    f: F,
    /// Expected time between changes, in days
    pub rough_period: f64,
}

impl<F> Observable<F> {
    pub fn new(rough_period: f64, f: F) -> Self {
        Self { f, rough_period }
    }
}

impl<F, T, E> Observable<F>
where
    F: Fn(&Time) -> Result<T, E>,
{
    /// Evaluate the observable at `t`
    pub fn at(&self, t: &Time) -> Result<T, E> {
        (self.f)(t)
    }

    /// Grid of sample times covering `[start, end]`
    fn grid(&self, start: Time, end: Time) -> Vec<Time> {
        let span = end - start;
        let periods = (span / self.rough_period).max(1.0);
        let intervals = (periods * SAMPLES_PER_PERIOD).ceil().max(1.0) as usize;
        let step = span / intervals as f64;
        log::trace!(
            "sampling {} points every {:.5} days from {}",
            intervals + 1,
            step,
            start
        );
        (0..=intervals)
            .map(|i| if i == intervals { end } else { start + step * i as f64 })
            .collect()
    }
}

/// Find the times at which a discrete observable changes value
///
/// Returns each change as the instant just after it and the new value,
/// ordered in time. Results are accurate to `epsilon` days and no two of
/// them are closer than `epsilon`.
pub fn find_discrete<F, T, E>(
    start: Time,
    end: Time,
    observable: &Observable<F>,
    epsilon: f64,
) -> Result<Vec<(Time, T)>, E>
where
    F: Fn(&Time) -> Result<T, E>,
    T: PartialEq + Copy,
{
    if end <= start {
        return Ok(Vec::new());
    }

    let times = observable.grid(start, end);
    let values = times
        .iter()
        .map(|t| observable.at(t))
        .collect::<Result<Vec<T>, E>>()?;

    let mut changes = Vec::new();
    for i in 1..times.len() {
        if values[i - 1] != values[i] {
            refine_change(
                observable,
                (times[i - 1], values[i - 1]),
                (times[i], values[i]),
                epsilon,
                &mut changes,
            )?;
        }
    }

    Ok(dedup_within(changes, epsilon))
}

/// Bisect `(a, b)` until the bracket is narrower than `epsilon`
///
/// Both halves are kept when the midpoint differs from both ends, so a
/// bracket hiding two changes yields both of them.
fn refine_change<F, T, E>(
    observable: &Observable<F>,
    (a, value_a): (Time, T),
    (b, value_b): (Time, T),
    epsilon: f64,
    changes: &mut Vec<(Time, T)>,
) -> Result<(), E>
where
    F: Fn(&Time) -> Result<T, E>,
    T: PartialEq + Copy,
{
    if b - a <= epsilon {
        changes.push((b, value_b));
        return Ok(());
    }

    let mid = a + (b - a) / 2.0;
    let value_mid = observable.at(&mid)?;
    if value_mid != value_a {
        refine_change(observable, (a, value_a), (mid, value_mid), epsilon, changes)?;
    }
    if value_mid != value_b {
        refine_change(observable, (mid, value_mid), (b, value_b), epsilon, changes)?;
    }
    Ok(())
}

/// Drop results closer than `epsilon` to their predecessor, keeping the later one
fn dedup_within<T>(items: Vec<(Time, T)>, epsilon: f64) -> Vec<(Time, T)> {
    let mut kept: Vec<(Time, T)> = Vec::with_capacity(items.len());
    for item in items {
        match kept.last() {
            Some((previous, _)) if item.0 - *previous < epsilon => {
                kept.pop();
                kept.push(item);
            }
            _ => kept.push(item),
        }
    }
    kept
}

/// Find the local maxima of a numeric observable strictly inside `[start, end]`
///
/// Returns the time and value of each maximum, accurate to `epsilon` days.
pub fn find_maxima<F, E>(
    start: Time,
    end: Time,
    observable: &Observable<F>,
    epsilon: f64,
) -> Result<Vec<(Time, f64)>, E>
where
    F: Fn(&Time) -> Result<f64, E>,
{
    find_extrema(start, end, observable, epsilon, 1.0)
}

/// Find the local minima of a numeric observable strictly inside `[start, end]`
pub fn find_minima<F, E>(
    start: Time,
    end: Time,
    observable: &Observable<F>,
    epsilon: f64,
) -> Result<Vec<(Time, f64)>, E>
where
    F: Fn(&Time) -> Result<f64, E>,
{
    find_extrema(start, end, observable, epsilon, -1.0)
        .map(|found| found.into_iter().map(|(t, v)| (t, -v)).collect())
}

/// Maxima of `sign * f`
fn find_extrema<F, E>(
    start: Time,
    end: Time,
    observable: &Observable<F>,
    epsilon: f64,
    sign: f64,
) -> Result<Vec<(Time, f64)>, E>
where
    F: Fn(&Time) -> Result<f64, E>,
{
    if end <= start {
        return Ok(Vec::new());
    }

    // sample a little past both ends so that an extremum right at a
    // boundary still shows up as an interior sample
    let bump = observable.rough_period / SAMPLES_PER_PERIOD;
    let times = observable.grid(start - bump, end + bump);
    let values = times
        .iter()
        .map(|t| observable.at(t).map(|v| sign * v))
        .collect::<Result<Vec<f64>, E>>()?;

    let mut extrema = Vec::new();
    let mut i = 1;
    while i + 1 < times.len() {
        let rising = exceeds(values[i], values[i - 1]);
        // a plateau counts once, at its first sample
        let mut j = i;
        while j + 1 < times.len()
            && !exceeds(values[j + 1], values[i])
            && !exceeds(values[i], values[j + 1])
        {
            j += 1;
        }
        if rising && j + 1 < times.len() && exceeds(values[j], values[j + 1]) {
            let (t, v) = golden_section(observable, sign, times[i - 1], times[j + 1], epsilon)?;
            if t > start && t < end {
                extrema.push((t, v));
            }
        }
        i = j + 1;
    }

    Ok(dedup_within(extrema, epsilon))
}

/// Relative size below which two samples are rounding noise of one value
const RELATIVE_NOISE: f64 = 1e-12;

/// `a > b` by more than rounding noise
fn exceeds(a: f64, b: f64) -> bool {
    a - b > RELATIVE_NOISE * a.abs().max(b.abs())
}

/// Golden-section search for the maximum of `sign * f` inside `(a, b)`
fn golden_section<F, E>(
    observable: &Observable<F>,
    sign: f64,
    mut a: Time,
    mut b: Time,
    epsilon: f64,
) -> Result<(Time, f64), E>
where
    F: Fn(&Time) -> Result<f64, E>,
{
    const INV_PHI: f64 = 0.618_033_988_749_894_8;

    let value = |t: &Time| observable.at(t).map(|v| sign * v);

    let mut c = b - (b - a) * INV_PHI;
    let mut d = a + (b - a) * INV_PHI;
    let mut value_c = value(&c)?;
    let mut value_d = value(&d)?;

    while b - a > epsilon {
        if value_c >= value_d {
            b = d;
            d = c;
            value_d = value_c;
            c = b - (b - a) * INV_PHI;
            value_c = value(&c)?;
        } else {
            a = c;
            c = d;
            value_c = value_d;
            d = a + (b - a) * INV_PHI;
            value_d = value(&d)?;
        }
    }

    let t = a + (b - a) / 2.0;
    Ok((t, value(&t)?))
}
