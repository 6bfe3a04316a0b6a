//! Shared assertions for the diagram tests: the structural and geometric
//! invariants a correct bounded Voronoi diagram satisfies.

use crate::boundingbox::BoundingBox;
use crate::diagram::{Diagram, VertexKey};
use crate::voronoi_builder::FortuneAlgorithm;
use cgmath::{MetricSpace, Point2};
use std::collections::HashMap;

pub const TOL: f64 = 1e-6;

pub fn build_bounded(points: &[Point2<f64>], bbox: BoundingBox) -> (Diagram, BoundingBox) {
    let mut algorithm = FortuneAlgorithm::new(points);
    algorithm.construct();
    let mut grown = bbox;
    algorithm.bound(&mut grown);
    (algorithm.into_diagram(), grown)
}

pub fn on_boundary(point: Point2<f64>, bbox: &BoundingBox) -> bool {
    (point.x - bbox.left).abs() <= TOL
        || (point.x - bbox.right).abs() <= TOL
        || (point.y - bbox.bottom).abs() <= TOL
        || (point.y - bbox.top).abs() <= TOL
}

/// twin(twin(h)) = h, and twins run between the same endpoints reversed.
pub fn check_twin_symmetry(diagram: &Diagram) {
    for half_edge in diagram.get_half_edge_keys() {
        if let Some(twin) = diagram.get_half_edge_twin(half_edge) {
            assert_eq!(diagram.get_half_edge_twin(twin), Some(half_edge));
            assert_eq!(
                diagram.get_half_edge_origin(twin),
                diagram.get_half_edge_destination(half_edge)
            );
            assert_eq!(
                diagram.get_half_edge_destination(twin),
                diagram.get_half_edge_origin(half_edge)
            );
        }
    }
}

/// Every face boundary is a closed `next` cycle of edges of that face, with
/// matching `prev` links and continuous endpoints.
pub fn check_face_cycles(diagram: &Diagram) {
    for face in 0..diagram.get_site_count() {
        let edges: Vec<_> = diagram.outer_edge_iter(face).collect();
        assert!(!edges.is_empty(), "face {} has an empty boundary", face);
        for (i, &edge) in edges.iter().enumerate() {
            assert_eq!(diagram.get_half_edge_incident_face(edge), face);
            let next = diagram.get_half_edge_next(edge).unwrap();
            assert_eq!(next, edges[(i + 1) % edges.len()]);
            assert_eq!(diagram.get_half_edge_prev(next), Some(edge));
            assert_eq!(
                diagram.get_half_edge_destination(edge),
                diagram.get_half_edge_origin(next)
            );
        }
    }
}

/// Euler characteristic of the bounded subdivision. Interior edges carry two
/// half edges, box-wall edges one; the outer face is counted implicitly.
pub fn check_euler(diagram: &Diagram) {
    let mut paired = 0usize;
    let mut boundary = 0usize;
    for half_edge in diagram.get_half_edge_keys() {
        if diagram.get_half_edge_twin(half_edge).is_some() {
            paired += 1;
        } else {
            boundary += 1;
        }
    }
    assert_eq!(paired % 2, 0);
    let vertices = diagram.get_vertex_count() as i64;
    let edges = (paired / 2 + boundary) as i64;
    let faces = diagram.get_site_count() as i64 + 1;
    assert_eq!(vertices - edges + faces, 2);
}

/// Interior vertices are equidistant from the sites of all their incident
/// cells, and no site is strictly closer (the empty-circle property).
pub fn check_vertices_equidistant(diagram: &Diagram, points: &[Point2<f64>], bbox: &BoundingBox) {
    let mut incident: HashMap<VertexKey, Vec<usize>> = HashMap::new();
    for face in 0..diagram.get_site_count() {
        for edge in diagram.outer_edge_iter(face) {
            let origin = diagram.get_half_edge_origin(edge).unwrap();
            incident.entry(origin).or_insert_with(Vec::new).push(face);
        }
    }
    for (vertex, faces) in incident {
        let point = diagram.get_vertex_point(vertex);
        if on_boundary(point, bbox) {
            continue;
        }
        assert!(
            faces.len() >= 3,
            "interior vertex {:?} has fewer than three cells",
            point
        );
        let nearest = points
            .iter()
            .map(|&site| site.distance(point))
            .fold(f64::INFINITY, f64::min);
        let allowed = TOL * (1.0 + nearest);
        for face in faces {
            let distance = points[face].distance(point);
            assert!(
                (distance - nearest).abs() <= allowed,
                "vertex {:?} not equidistant: {} vs nearest {}",
                point,
                distance,
                nearest
            );
        }
    }
}

/// Every shared edge lies on the perpendicular bisector of its two sites:
/// both endpoints are equidistant from them.
pub fn check_bisector_property(diagram: &Diagram, points: &[Point2<f64>]) {
    for half_edge in diagram.get_half_edge_keys() {
        if let Some(twin) = diagram.get_half_edge_twin(half_edge) {
            let face = diagram.get_half_edge_incident_face(half_edge);
            let twin_face = diagram.get_half_edge_incident_face(twin);
            let endpoints = [
                diagram.get_half_edge_origin_point(half_edge),
                diagram.get_half_edge_destination_point(half_edge),
            ];
            for point in endpoints.iter() {
                let to_face = points[face].distance(*point);
                let to_twin_face = points[twin_face].distance(*point);
                assert!((to_face - to_twin_face).abs() <= TOL * (1.0 + to_face));
            }
        }
    }
}

pub fn check_all_invariants(diagram: &Diagram, points: &[Point2<f64>], bbox: &BoundingBox) {
    check_twin_symmetry(diagram);
    check_face_cycles(diagram);
    check_euler(diagram);
    check_vertices_equidistant(diagram, points, bbox);
    check_bisector_property(diagram, points);
}

pub fn total_face_area(diagram: &Diagram) -> f64 {
    (0..diagram.get_site_count())
        .map(|face| diagram.get_face_area(face))
        .sum()
}
