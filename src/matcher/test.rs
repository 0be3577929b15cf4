#![cfg(test)]

use crate::map::{BaseRoad, Direction, RoadMap};
use crate::markov::StateCandidate;
use crate::matcher::{CandidateRecord, Matcher, MatcherCandidate, MatcherConfig, MatcherSample};
use crate::spatial;

use approx::assert_relative_eq;
use geo::{coord, LineString, Point};

fn base(id: i64, source: i64, target: i64, direction: Direction, coords: &[(f64, f64)]) -> BaseRoad {
    let geometry =
        LineString::new(coords.iter().map(|(x, y)| coord! { x: *x, y: *y }).collect());
    let length = spatial::length(&geometry);
    BaseRoad::new(id, id, source, target, direction, 0, 1.0, 20.0, 20.0, length, geometry)
}

/// One one-way road running north along the meridian, ~111m.
fn straight_map() -> RoadMap {
    RoadMap::from_roads([base(
        1,
        1,
        2,
        Direction::Forward,
        &[(0.0, 0.0), (0.0, 0.001)],
    )])
    .expect("valid road")
}

/// One two-way road running north, ~221m: edges 2 (north) and 3 (south).
fn two_way_map() -> RoadMap {
    RoadMap::from_roads([base(
        1,
        1,
        2,
        Direction::Both,
        &[(0.0, 0.0), (0.0, 0.002)],
    )])
    .expect("valid road")
}

fn gaussian(x: f64, sigma: f64) -> f64 {
    (1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt())) * (-0.5 * (x / sigma).powi(2)).exp()
}

#[test]
fn single_fix_matches_the_straight_road() {
    let map = straight_map();
    let mut matcher = Matcher::new(&map);

    let sample = MatcherSample::new("z1", 0, Point::new(0.00001, 0.0005));
    assert!(matcher.update(sample.clone()).expect("valid sample"));

    let vector = matcher.vector();
    assert_eq!(vector.len(), 1);

    let estimate = matcher.estimate().expect("one candidate");
    assert_eq!(estimate.point().road().id(), 2);
    assert_relative_eq!(estimate.point().fraction(), 0.5, epsilon = 1e-2);
    assert_relative_eq!(estimate.filtprob(), 1.0, epsilon = 1e-12);

    // With a single candidate the sequence probability is the emission.
    let gap = spatial::distance(&sample.point(), &estimate.point().position());
    assert_relative_eq!(
        estimate.seqprob(),
        gaussian(gap, matcher.config().sigma).log10(),
        epsilon = 1e-9
    );

    // The trajectory degenerates to the single matched point.
    let trajectory = matcher.trajectory().expect("trivial trajectory");
    assert_eq!(trajectory.roads().len(), 1);
}

#[test]
fn state_probabilities_stay_normalized() {
    let map = two_way_map();
    let mut matcher = Matcher::new(&map);

    for (time, y) in [(0, 0.0004), (10_000, 0.0009), (20_000, 0.0015)] {
        let sample = MatcherSample::new(format!("z{time}"), time, Point::new(0.00001, y));
        assert!(matcher.update(sample).expect("valid sample"));

        let total: f64 = matcher.vector().iter().map(StateCandidate::filtprob).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn transitions_connect_consecutive_road_points() {
    let map = two_way_map();
    let mut matcher = Matcher::new(&map);

    for (time, y) in [(0, 0.0004), (10_000, 0.0009), (20_000, 0.0015)] {
        let sample = MatcherSample::new(format!("z{time}"), time, Point::new(0.00001, y))
            .with_azimuth(0.0);
        matcher.update(sample).expect("valid sample");
    }

    let chain = matcher.sequence();
    assert_eq!(chain.len(), 3);

    for window in chain.windows(2) {
        let route = window[1].transition().expect("chained candidate").route();
        assert_eq!(route.source(), window[0].point());
        assert_eq!(route.target(), window[1].point());
    }
}

#[test_log::test]
fn unreachable_gap_breaks_and_restarts() {
    // Two disconnected roads ~11km apart.
    let map = RoadMap::from_roads([
        base(1, 1, 2, Direction::Forward, &[(0.0, 0.0), (0.0, 0.001)]),
        base(2, 3, 4, Direction::Forward, &[(0.1, 0.0), (0.1, 0.001)]),
    ])
    .expect("valid roads");

    let config = MatcherConfig {
        v_max: 40.0,
        ..MatcherConfig::default()
    };
    let mut matcher = Matcher::with_config(&map, config);

    let near = MatcherSample::new("z1", 0, Point::new(0.000005, 0.0005));
    assert!(matcher.update(near).expect("valid sample"));

    // One second later, 11km away: no route fits under 40 m/s.
    let far = MatcherSample::new("z2", 1000, Point::new(0.100005, 0.0005));
    assert!(matcher.update(far).expect("valid sample"));

    let vector = matcher.vector();
    assert_eq!(vector.len(), 1);
    assert_eq!(vector[0].point().road().id(), 4);
    assert_relative_eq!(vector[0].filtprob(), 1.0, epsilon = 1e-12);

    // The restart cut the predecessor chain.
    assert!(vector[0].predecessor().is_none());
    assert_eq!(matcher.sequence().len(), 1);
}

#[test]
fn forced_u_turn_uses_the_sibling_edge() {
    let map = two_way_map();
    let mut matcher = Matcher::new(&map);

    // North, further north, then back south.
    let track = [
        (0, 0.0008, 0.0),
        (10_000, 0.0014, 0.0),
        (20_000, 0.0006, 180.0),
    ];
    for (time, y, azimuth) in track {
        let sample = MatcherSample::new(format!("z{time}"), time, Point::new(0.00001, y))
            .with_azimuth(azimuth);
        assert!(matcher.update(sample).expect("valid sample"));
    }

    let estimate = matcher.estimate().expect("candidates remain");
    assert_eq!(estimate.point().road().id(), 3, "southbound edge after the turn");

    let last = matcher.sequence().pop().expect("chained candidate");
    let route = last.transition().expect("transition present").route();
    assert_eq!(
        route.roads().iter().map(|road| road.id()).collect::<Vec<_>>(),
        vec![2, 3]
    );
    assert!(route.is_uturn());

    let trajectory = matcher.trajectory().expect("trajectory");
    assert!(trajectory.is_uturn());
}

#[test]
fn matching_is_deterministic() {
    let run = || {
        let map = two_way_map();
        let mut vectors: Vec<Vec<MatcherCandidate>> = Vec::new();
        let mut matcher = Matcher::new(&map);

        for (time, y) in [(0, 0.0004), (10_000, 0.0009), (20_000, 0.0013)] {
            let sample = MatcherSample::new(format!("z{time}"), time, Point::new(0.00001, y));
            matcher.update(sample).expect("valid sample");
            vectors.push(matcher.vector());
        }
        vectors
    };

    let first = run();
    let second = run();

    for (a, b) in first.iter().flatten().zip(second.iter().flatten()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.point().road().id(), b.point().road().id());
        assert_eq!(a.point().fraction(), b.point().fraction());
        assert_eq!(a.filtprob(), b.filtprob());
        assert_eq!(a.seqprob(), b.seqprob());
        assert_eq!(a.predecessor(), b.predecessor());
    }
}

#[test]
fn azimuth_sharpens_the_emission() {
    let map = two_way_map();
    let mut matcher = Matcher::new(&map);

    let sample = MatcherSample::new("z1", 0, Point::new(0.00001, 0.0005)).with_azimuth(0.0);
    matcher.update(sample).expect("valid sample");

    let vector = matcher.vector();
    let northbound = vector.iter().find(|c| c.point().road().id() == 2).unwrap();
    let southbound = vector.iter().find(|c| c.point().road().id() == 3).unwrap();

    assert!(
        northbound.filtprob() > southbound.filtprob(),
        "heading-aligned candidate must dominate"
    );
}

#[test]
fn search_radius_widens_up_to_the_cap() {
    // The road sits ~167m east of the fix, past the initial radius.
    let map = RoadMap::from_roads([base(
        1,
        1,
        2,
        Direction::Forward,
        &[(0.0015, 0.0), (0.0015, 0.001)],
    )])
    .expect("valid road");

    let config = MatcherConfig {
        sigma: 100.0,
        radius: 50.0,
        radius_max: 500.0,
        ..MatcherConfig::default()
    };
    let mut matcher = Matcher::with_config(&map, config);

    let sample = MatcherSample::new("z1", 0, Point::new(0.0, 0.0005));
    assert!(matcher.update(sample).expect("valid sample"));
    assert_eq!(matcher.vector().len(), 1);
}

#[test]
fn gating_skips_dense_samples() {
    let map = straight_map();
    let config = MatcherConfig {
        min_interval: 5000,
        ..MatcherConfig::default()
    };
    let mut matcher = Matcher::with_config(&map, config);

    assert!(matcher
        .update(MatcherSample::new("z1", 0, Point::new(0.00001, 0.0004)))
        .expect("valid sample"));
    let before = matcher.vector();

    // Too soon; the state stays put.
    assert!(!matcher
        .update(MatcherSample::new("z2", 1000, Point::new(0.00001, 0.0006)))
        .expect("valid sample"));

    let after = matcher.vector();
    assert_eq!(
        before.iter().map(StateCandidate::id).collect::<Vec<_>>(),
        after.iter().map(StateCandidate::id).collect::<Vec<_>>()
    );
}

#[test]
fn out_of_order_samples_are_rejected() {
    let map = straight_map();
    let mut matcher = Matcher::new(&map);

    matcher
        .update(MatcherSample::new("z1", 1000, Point::new(0.00001, 0.0005)))
        .expect("valid sample");

    let stale = MatcherSample::new("z2", 500, Point::new(0.00001, 0.0006));
    assert!(matches!(
        matcher.update(stale),
        Err(crate::matcher::error::MatchError::OutOfOrderSample { .. })
    ));
}

#[test]
fn degenerate_samples_are_rejected() {
    let map = straight_map();
    let mut matcher = Matcher::new(&map);

    let broken = MatcherSample::new("z1", 0, Point::new(f64::NAN, 0.0005));
    assert!(matches!(
        matcher.update(broken),
        Err(crate::matcher::error::MatchError::DegenerateSample(_))
    ));

    let off_globe = MatcherSample::new("z2", 0, Point::new(0.0, 91.0));
    assert!(matches!(
        matcher.update(off_globe),
        Err(crate::matcher::error::MatchError::DegenerateSample(_))
    ));
}

#[test]
fn sample_round_trips_through_json() {
    let sample = MatcherSample::new("z1", 1_700_000_000_000, Point::new(11.5645, 48.1492))
        .with_azimuth(451.5)
        .with_gps_outage(true)
        .with_velocity(13.9)
        .with_accuracy(3.5)
        .with_trace("trace-7");

    let encoded = serde_json::to_string(&sample).expect("serializable");
    let decoded: MatcherSample = serde_json::from_str(&encoded).expect("parseable");

    assert_eq!(sample, decoded);
    // The azimuth was normalized on construction.
    assert_relative_eq!(decoded.azimuth().unwrap(), 91.5, epsilon = 1e-9);

    // Optional fields may be absent entirely.
    let bare: MatcherSample =
        serde_json::from_str(r#"{"id":"z2","time":0,"point":"POINT(0 0)"}"#).expect("parseable");
    assert_eq!(bare.azimuth(), None);
    assert!(!bare.gps_outage());
}

#[test]
fn candidate_round_trips_through_json() {
    let map = two_way_map();
    let mut matcher = Matcher::new(&map);

    for (time, y) in [(0, 0.0004), (10_000, 0.0009)] {
        let sample = MatcherSample::new(format!("z{time}"), time, Point::new(0.00001, y))
            .with_azimuth(0.0);
        matcher.update(sample).expect("valid sample");
    }

    let candidate = matcher.estimate().expect("candidates remain");
    assert!(candidate.transition().is_some(), "expected a routed candidate");

    let record = candidate.record();
    let encoded = serde_json::to_string(&record).expect("serializable");
    let decoded: CandidateRecord = serde_json::from_str(&encoded).expect("parseable");
    assert_eq!(record, decoded);

    let restored = MatcherCandidate::from_record(&decoded, &map).expect("resolvable");
    assert_eq!(restored.id(), candidate.id());
    assert_eq!(restored.point(), candidate.point());
    assert_eq!(restored.predecessor(), candidate.predecessor());
    assert_eq!(restored.filtprob(), candidate.filtprob());
    assert_eq!(restored.seqprob(), candidate.seqprob());
    assert_eq!(
        restored
            .transition()
            .map(|t| t.route().roads().iter().map(|r| r.id()).collect::<Vec<_>>()),
        candidate
            .transition()
            .map(|t| t.route().roads().iter().map(|r| r.id()).collect::<Vec<_>>())
    );

    // Unknown edges surface as errors instead of corrupt state.
    let mut corrupt = record.clone();
    corrupt.roadpoint.road = 99;
    assert!(matches!(
        MatcherCandidate::from_record(&corrupt, &map),
        Err(crate::matcher::error::MatchError::UnknownEdge(99))
    ));
}
