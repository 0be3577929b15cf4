use geo::{Bearing, Distance, Geodesic, InterpolatePoint, Line, LineLocatePoint, LineString, Point};

/// Inverse geodesic distance between two positions, in meters.
#[inline]
pub fn distance(a: &Point<f64>, b: &Point<f64>) -> f64 {
    Geodesic.distance(*a, *b)
}

/// Initial geodesic bearing from `a` towards `b`, in degrees `[0, 360)`.
#[inline]
pub fn azimuth(a: &Point<f64>, b: &Point<f64>) -> f64 {
    normalize_azimuth(Geodesic.bearing(*a, *b))
}

/// Maps an angle in degrees onto `[0, 360)`.
///
/// Exact `a mod 360`, so `normalize_azimuth(a + 360k) == normalize_azimuth(a)`
/// for any integral `k`. Non-finite input passes through untouched.
#[inline]
pub fn normalize_azimuth(degrees: f64) -> f64 {
    let rem = degrees % 360.0;
    if rem < 0.0 { rem + 360.0 } else { rem }
}

/// Smallest absolute difference between two headings, in degrees `[0, 180]`.
#[inline]
pub fn azimuth_delta(a: f64, b: f64) -> f64 {
    let delta = (normalize_azimuth(a) - normalize_azimuth(b)).abs();
    if delta > 180.0 { 360.0 - delta } else { delta }
}

/// Geodesic length of a polyline, in meters.
pub fn length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| Geodesic.distance(segment.start_point(), segment.end_point()))
        .sum()
}

/// The fraction of the segment `[a, b]` closest to `q`, clamped to `[0, 1]`.
///
/// `NaN` when the segment is degenerate.
pub fn intercept(a: &Point<f64>, b: &Point<f64>, q: &Point<f64>) -> f64 {
    Line::new(*a, *b)
        .line_locate_point(q)
        .map(|fraction| fraction.clamp(0.0, 1.0))
        .unwrap_or(f64::NAN)
}

/// Interpolates the point at cumulative length fraction `f` along a polyline.
pub fn interpolate(line: &LineString<f64>, fraction: f64) -> Point<f64> {
    let fraction = fraction.clamp(0.0, 1.0);
    let points = line.points().collect::<Vec<_>>();

    let (cumulative, total) = cumulative_lengths(&points);
    if total <= 0.0 {
        return points[0];
    }

    let along = fraction * total;
    for (i, window) in points.windows(2).enumerate() {
        let span = cumulative[i + 1] - cumulative[i];
        if along <= cumulative[i + 1] && span > 0.0 {
            let ratio = (along - cumulative[i]) / span;
            return Geodesic.point_at_ratio_between(window[0], window[1], ratio);
        }
    }

    points[points.len() - 1]
}

/// Projects `q` onto the polyline, returning the closest on-line point
/// and its cumulative length fraction.
///
/// Ties resolve to the earliest segment, so the result is deterministic.
pub fn project(line: &LineString<f64>, q: &Point<f64>) -> (Point<f64>, f64) {
    let points = line.points().collect::<Vec<_>>();
    let (cumulative, total) = cumulative_lengths(&points);

    let mut nearest = (points[0], 0.0);
    let mut minimum = f64::INFINITY;

    for (i, window) in points.windows(2).enumerate() {
        let segment = intercept(&window[0], &window[1], q);
        let segment = if segment.is_nan() { 0.0 } else { segment };

        let on_line = Geodesic.point_at_ratio_between(window[0], window[1], segment);
        let gap = Geodesic.distance(*q, on_line);

        if gap < minimum {
            let span = cumulative[i + 1] - cumulative[i];
            let fraction = if total > 0.0 {
                (cumulative[i] + segment * span) / total
            } else {
                0.0
            };
            nearest = (on_line, fraction.clamp(0.0, 1.0));
            minimum = gap;
        }
    }

    nearest
}

/// Tangent heading of the polyline at cumulative length fraction `f`,
/// in degrees `[0, 360)`.
pub fn azimuth_at(line: &LineString<f64>, fraction: f64) -> f64 {
    let fraction = fraction.clamp(0.0, 1.0);
    let points = line.points().collect::<Vec<_>>();

    let (cumulative, total) = cumulative_lengths(&points);
    let along = fraction * total;

    for (i, window) in points.windows(2).enumerate() {
        let span = cumulative[i + 1] - cumulative[i];
        if (along <= cumulative[i + 1] && span > 0.0) || i == points.len() - 2 {
            return azimuth(&window[0], &window[1]);
        }
    }

    f64::NAN
}

/// Extracts the sub-polyline between cumulative length fractions
/// `start <= end`, both clamped to `[0, 1]`.
pub fn subline(line: &LineString<f64>, start: f64, end: f64) -> LineString<f64> {
    let start = start.clamp(0.0, 1.0);
    let end = end.clamp(start, 1.0);

    let points = line.points().collect::<Vec<_>>();
    let (cumulative, total) = cumulative_lengths(&points);

    let mut coords = vec![interpolate(line, start).0];
    if total > 0.0 {
        for (i, point) in points.iter().enumerate() {
            let fraction = cumulative[i] / total;
            if fraction > start && fraction < end {
                coords.push(point.0);
            }
        }
    }
    coords.push(interpolate(line, end).0);

    coords.dedup_by(|a, b| a == b);
    if coords.len() < 2 {
        coords.push(coords[0]);
    }

    LineString::new(coords)
}

/// Cumulative geodesic lengths at every vertex, plus the total.
fn cumulative_lengths(points: &[Point<f64>]) -> (Vec<f64>, f64) {
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;

    cumulative.push(0.0);
    for window in points.windows(2) {
        total += Geodesic.distance(window[0], window[1]);
        cumulative.push(total);
    }

    (cumulative, total)
}
