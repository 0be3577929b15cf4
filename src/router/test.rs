#![cfg(test)]

use crate::map::{BaseRoad, Direction, RoadMap, RoadPoint};
use crate::router::{Bounds, Cost, Dijkstra, Distance, Time};

use approx::assert_relative_eq;
use geo::{coord, LineString};

/// A road with an exact `length`, so cost arithmetic stays round.
fn base(
    id: i64,
    source: i64,
    target: i64,
    direction: Direction,
    length: f64,
    coords: &[(f64, f64)],
) -> BaseRoad {
    let geometry =
        LineString::new(coords.iter().map(|(x, y)| coord! { x: *x, y: *y }).collect());
    BaseRoad::new(id, id, source, target, direction, 0, 1.0, 20.0, 20.0, length, geometry)
}

/// Three one-way roads chained west to east: edges 2, 4, 6 of 100m.
fn chain() -> RoadMap {
    RoadMap::from_roads([
        base(1, 1, 2, Direction::Forward, 100.0, &[(0.0, 0.0), (0.001, 0.0)]),
        base(2, 2, 3, Direction::Forward, 100.0, &[(0.001, 0.0), (0.002, 0.0)]),
        base(3, 3, 4, Direction::Forward, 100.0, &[(0.002, 0.0), (0.003, 0.0)]),
    ])
    .expect("valid roads")
}

fn point(map: &RoadMap, edge: i64, fraction: f64) -> RoadPoint {
    RoadPoint::new(map.edge(edge).expect("edge exists").clone(), fraction)
}

#[test]
fn routes_along_a_chain() {
    let map = chain();
    let source = point(&map, 2, 0.5);
    let targets = [point(&map, 6, 0.5)];

    let routes = Dijkstra.route(&map, &source, &targets, &Distance, None, Bounds::unbounded());
    let path = routes[0].as_ref().expect("target reachable");

    let ids = path.roads().iter().map(|road| road.id()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 4, 6]);

    // First edge holds the source, last the target, neighbors connect.
    assert_eq!(path.roads()[0].id(), path.source().road().id());
    assert_eq!(path.roads()[2].id(), path.target().road().id());
    for window in path.roads().windows(2) {
        assert_eq!(window[0].target(), window[1].source());
    }

    assert_relative_eq!(path.length(), 200.0, epsilon = 1e-9);
    assert_relative_eq!(path.cost(&Time), 10.0, epsilon = 1e-9);
}

#[test]
fn same_edge_forward_settles_immediately() {
    let map = chain();
    let source = point(&map, 2, 0.2);
    let targets = [point(&map, 2, 0.7)];

    let routes = Dijkstra.route(&map, &source, &targets, &Distance, None, Bounds::unbounded());
    let path = routes[0].as_ref().expect("target reachable");

    assert_eq!(path.roads().len(), 1);
    assert_relative_eq!(path.length(), 50.0, epsilon = 1e-9);
}

#[test]
fn same_edge_backward_needs_a_loop() {
    // On the open chain there is no way back.
    let map = chain();
    let source = point(&map, 2, 0.7);
    let targets = [point(&map, 2, 0.2)];

    let routes = Dijkstra.route(&map, &source, &targets, &Distance, None, Bounds::unbounded());
    assert!(routes[0].is_none());

    // On a one-way ring the router re-enters the source edge through
    // its source vertex.
    let ring = RoadMap::from_roads([
        base(1, 1, 2, Direction::Forward, 100.0, &[(0.0, 0.0), (0.001, 0.0)]),
        base(2, 2, 3, Direction::Forward, 100.0, &[(0.001, 0.0), (0.001, 0.001)]),
        base(3, 3, 4, Direction::Forward, 100.0, &[(0.001, 0.001), (0.0, 0.001)]),
        base(4, 4, 1, Direction::Forward, 100.0, &[(0.0, 0.001), (0.0, 0.0)]),
    ])
    .expect("valid roads");

    let source = point(&ring, 2, 0.75);
    let targets = [point(&ring, 2, 0.25)];

    let routes = Dijkstra.route(&ring, &source, &targets, &Distance, None, Bounds::unbounded());
    let path = routes[0].as_ref().expect("loop closes");

    let ids = path.roads().iter().map(|road| road.id()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 4, 6, 8, 2]);
    assert_relative_eq!(path.length(), 350.0, epsilon = 1e-9);
}

#[test]
fn bound_prunes_and_admits_exactly() {
    let map = chain();
    let source = point(&map, 2, 0.5);
    let targets = [point(&map, 6, 0.5)];

    // The route is 200m under the Distance bound.
    let exact = Dijkstra.route(&map, &source, &targets, &Time, Some(&Distance), Bounds::cost(200.0));
    assert!(exact[0].is_some(), "a target exactly at the bound settles");

    let short = Dijkstra.route(&map, &source, &targets, &Time, Some(&Distance), Bounds::cost(199.9));
    assert!(short[0].is_none(), "a target beyond the bound is null");
}

#[test]
fn time_bound_honours_the_speed_ceiling() {
    let map = chain();
    let source = point(&map, 2, 0.0);
    let targets = [point(&map, 6, 1.0)];

    // 300m at 20 m/s takes 15s.
    let tight = Dijkstra.route(
        &map,
        &source,
        &targets,
        &Distance,
        None,
        Bounds::unbounded().with_time(14.9, None),
    );
    assert!(tight[0].is_none());

    let enough = Dijkstra.route(
        &map,
        &source,
        &targets,
        &Distance,
        None,
        Bounds::unbounded().with_time(15.0, None),
    );
    assert!(enough[0].is_some());

    // A 50 m/s ceiling makes the optimistic traversal 6s.
    let ceiling = Dijkstra.route(
        &map,
        &source,
        &targets,
        &Distance,
        None,
        Bounds::unbounded().with_time(14.9, Some(50.0)),
    );
    assert!(ceiling[0].is_some());
}

#[test]
fn equal_cost_routes_tie_break_by_edge_id() {
    // Two parallel 100m roads between vertices 2 and 3.
    let map = RoadMap::from_roads([
        base(1, 1, 2, Direction::Forward, 100.0, &[(0.0, 0.0), (0.001, 0.0)]),
        base(5, 2, 3, Direction::Forward, 100.0, &[(0.001, 0.0), (0.002, 0.0)]),
        base(7, 2, 3, Direction::Forward, 100.0, &[(0.001, 0.0), (0.002, 0.0001)]),
        base(8, 3, 4, Direction::Forward, 100.0, &[(0.002, 0.0), (0.003, 0.0)]),
    ])
    .expect("valid roads");

    let source = point(&map, 2, 0.0);
    let targets = [point(&map, 16, 1.0)];

    let routes = Dijkstra.route(&map, &source, &targets, &Distance, None, Bounds::unbounded());
    let path = routes[0].as_ref().expect("target reachable");

    let ids = path.roads().iter().map(|road| road.id()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 10, 16], "the smaller parallel edge id wins");
}

#[test]
fn multi_target_settles_each_independently() {
    let map = RoadMap::from_roads([
        base(1, 1, 2, Direction::Forward, 100.0, &[(0.0, 0.0), (0.001, 0.0)]),
        base(2, 2, 3, Direction::Forward, 100.0, &[(0.001, 0.0), (0.002, 0.0)]),
        base(3, 3, 4, Direction::Forward, 100.0, &[(0.002, 0.0), (0.003, 0.0)]),
        // An island no route reaches.
        base(9, 7, 8, Direction::Forward, 100.0, &[(0.01, 0.0), (0.011, 0.0)]),
    ])
    .expect("valid roads");

    let source = point(&map, 2, 0.5);
    let targets = [point(&map, 4, 0.5), point(&map, 6, 0.25), point(&map, 18, 0.5)];

    let routes = Dijkstra.route(&map, &source, &targets, &Distance, None, Bounds::unbounded());

    assert_relative_eq!(routes[0].as_ref().unwrap().length(), 100.0, epsilon = 1e-9);
    assert_relative_eq!(routes[1].as_ref().unwrap().length(), 175.0, epsilon = 1e-9);
    assert!(routes[2].is_none(), "unreachable targets map to null");
}

#[test]
fn u_turn_runs_over_the_sibling_edge() {
    let map = RoadMap::from_roads([base(
        1,
        1,
        2,
        Direction::Both,
        100.0,
        &[(0.0, 0.0), (0.001, 0.0)],
    )])
    .expect("valid road");

    let source = point(&map, 2, 0.8);
    let targets = [point(&map, 3, 0.9)];

    let routes = Dijkstra.route(&map, &source, &targets, &Distance, None, Bounds::unbounded());
    let path = routes[0].as_ref().expect("u-turn possible");

    let ids = path.roads().iter().map(|road| road.id()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 3]);
    assert!(path.is_uturn());
    assert_relative_eq!(path.length(), 110.0, epsilon = 1e-9);
}

#[test]
fn priority_scales_costs() {
    let mut weighted = base(1, 1, 2, Direction::Forward, 100.0, &[(0.0, 0.0), (0.001, 0.0)]);
    weighted.priority = 1.5;
    let map = RoadMap::from_roads([weighted]).expect("valid road");

    let road = map.edge(2).unwrap();
    assert_relative_eq!(crate::router::DistancePriority.cost(road), 150.0, epsilon = 1e-9);
    assert_relative_eq!(crate::router::TimePriority.cost(road), 7.5, epsilon = 1e-9);
    assert_relative_eq!(Distance.partial(road, 0.25), 25.0, epsilon = 1e-9);
}
