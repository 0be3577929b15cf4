/// Tunables of the matcher, with the defaults the filter was validated
/// against.
#[derive(Clone, Copy, Debug)]
pub struct MatcherConfig {
    /// Spatial noise stddev of the emission Gaussian, meters.
    pub sigma: f64,
    /// Scale of the route/straight-line deviation exponential, meters.
    pub beta: f64,
    /// Stddev of the wrapped-normal heading factor, degrees.
    pub sigma_azimuth: f64,
    /// Multiplier widening `sigma` for samples flagged as GPS outage.
    pub outage_factor: f64,
    /// Candidate search radius, meters.
    pub radius: f64,
    /// Ceiling for search-radius widening, meters.
    pub radius_max: f64,
    /// Speed ceiling for the transition bound, m/s.
    pub v_max: f64,
    /// Samples arriving closer than this are skipped, milliseconds.
    pub min_interval: i64,
    /// Samples moving less than this are skipped, meters.
    pub min_distance: f64,
    /// State window bound by count, `None` for unbounded.
    pub k: Option<usize>,
    /// State window bound by age, milliseconds, `None` for unbounded.
    pub tau: Option<i64>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            sigma: 5.0,
            beta: 5.0,
            sigma_azimuth: 25.0,
            outage_factor: 10.0,
            radius: 200.0,
            radius_max: 500.0,
            v_max: 36.0,
            min_interval: 0,
            min_distance: 0.0,
            k: None,
            tau: None,
        }
    }
}
