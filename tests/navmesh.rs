//! Navmesh construction and path query properties.

mod common;

use common::rect;
use kshetra::config::NavmeshConfig;
use kshetra::core::{Point2D, Polygon, densify};
use kshetra::navmesh::{NavMesh, polyline_length, search};
use kshetra::scenario::ScenarioLayout;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn field_mesh() -> (NavMesh, Vec<Polygon>) {
    let layout = ScenarioLayout::default();
    let walls = layout.walls();
    let holes: Vec<Vec<Point2D>> = walls.iter().map(|w| densify(w.points(), 2)).collect();
    let mesh = NavMesh::build(&layout.boundary, &holes, &[], &NavmeshConfig::default()).unwrap();
    (mesh, walls)
}

fn random_free_point(rng: &mut StdRng, obstacles: &[Polygon]) -> Point2D {
    loop {
        let p = Point2D::new(rng.random_range(0.1..19.9), rng.random_range(0.1..14.9));
        if obstacles.iter().all(|o| !o.contains(&p)) {
            return p;
        }
    }
}

#[test]
fn empty_square_is_one_cell_and_straight_path() {
    let mesh = NavMesh::build(&rect(0.0, 0.0, 10.0, 10.0), &[], &[], &NavmeshConfig::default()).unwrap();
    assert_eq!(mesh.cell_count(), 1);

    let path = mesh
        .find_shortest_path(Point2D::new(1.0, 1.0), Point2D::new(9.0, 9.0))
        .unwrap();
    assert_eq!(path.points, vec![Point2D::new(9.0, 9.0)]);
    assert!((path.length - 11.3137).abs() < 1e-3);
}

#[test]
fn path_detours_around_hole() {
    let hole = rect(4.0, 2.0, 6.0, 8.0);
    let mesh = NavMesh::build(&rect(0.0, 0.0, 10.0, 10.0), &[hole.clone()], &[], &NavmeshConfig::default()).unwrap();

    let start = Point2D::new(2.0, 5.0);
    let end = Point2D::new(8.0, 5.0);
    let path = mesh.find_shortest_path(start, end).unwrap();

    assert!(path.length > start.distance(&end) + 1e-6);
    assert_eq!(path.points.last().copied(), Some(end));
    // Corners of the hole become the turning points
    assert!(path.points.len() >= 3);

    // No segment crosses the hole interior
    let shrunk = Polygon::new(hole).inflate(-1e-6);
    let mut polyline = vec![start];
    polyline.extend(path.points.iter().copied());
    for seg in polyline.windows(2) {
        for k in 0..=100 {
            let p = seg[0] + (seg[1] - seg[0]) * (k as f64 / 100.0);
            assert!(!shrunk.contains(&p), "({}, {}) inside hole", p.x, p.y);
        }
    }

    // Going over either pair of corners is the shortest possible detour
    let shortest = start.distance(&Point2D::new(4.0, 8.0)) + 2.0 + Point2D::new(6.0, 8.0).distance(&end);
    assert!(path.length >= shortest - 1e-6);
}

#[test]
fn cells_are_convex_and_conserve_area() {
    let (mesh, walls) = field_mesh();
    let boundary_area = Polygon::new(ScenarioLayout::default().boundary).area();
    let holes_area: f64 = walls.iter().map(Polygon::area).sum();

    for poly in mesh.polygons() {
        assert!(poly.is_convex());
        assert!(poly.area() > 0.0);
    }
    assert!((mesh.total_area() - (boundary_area - holes_area)).abs() < 1e-6);
    assert!(mesh.cell_count() > 1);
}

#[test]
fn merging_reduces_cell_count() {
    let layout = ScenarioLayout::default();
    let holes: Vec<Vec<Point2D>> = layout.walls().into_iter().map(Polygon::into_points).collect();
    let merged = NavMesh::build(&layout.boundary, &holes, &[], &NavmeshConfig::default()).unwrap();
    let raw = NavMesh::build(
        &layout.boundary,
        &holes,
        &[],
        &NavmeshConfig {
            merge_cells: false,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(merged.cell_count() < raw.cell_count());
    assert!((merged.total_area() - raw.total_area()).abs() < 1e-6);
}

#[test]
fn queries_are_deterministic() {
    let (mesh, walls) = field_mesh();
    let (mesh2, _) = field_mesh();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let a = random_free_point(&mut rng, &walls);
        let b = random_free_point(&mut rng, &walls);
        let first = mesh.find_shortest_path(a, b).unwrap();
        assert_eq!(first, mesh.find_shortest_path(a, b).unwrap());
        assert_eq!(first, mesh2.find_shortest_path(a, b).unwrap());
    }
}

#[test]
fn funnel_never_longer_than_portal_midpoints() {
    let (mesh, walls) = field_mesh();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let start = random_free_point(&mut rng, &walls);
        let end = random_free_point(&mut rng, &walls);
        let path = mesh.find_shortest_path(start, end).unwrap();

        let corridor = search::shortest_cell_path(mesh.graph(), mesh.locate_cell(start), mesh.locate_cell(end))
            .unwrap()
            .cells;
        let midpoints: Vec<Point2D> = mesh.portals(&corridor, start, end).iter().map(|p| p.midpoint()).collect();
        let naive = polyline_length(&midpoints);

        assert!(path.length <= naive + 1e-9, "funnel {} > naive {}", path.length, naive);
        assert!(path.length >= start.distance(&end) - 1e-9);
    }
}

#[test]
fn point_outside_mesh_still_gets_a_path() {
    let (mesh, _) = field_mesh();
    let path = mesh
        .find_shortest_path(Point2D::new(-3.0, -3.0), Point2D::new(10.0, 10.0))
        .unwrap();
    assert_eq!(path.points.last().copied(), Some(Point2D::new(10.0, 10.0)));
}

#[test]
fn intersecting_obstacle_is_fatal() {
    let err = NavMesh::build(
        &rect(0.0, 0.0, 10.0, 10.0),
        &[rect(8.0, 4.0, 12.0, 6.0)],
        &[],
        &NavmeshConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.code(), "SELF_INTERSECTION");
}
