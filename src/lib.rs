#![warn(clippy::all)]
#![forbid(unsafe_code)]
//! A planar Voronoi diagram constructor built on
//! [Fortune's algorithm](https://en.wikipedia.org/wiki/Fortune%27s_algorithm).
//!
//! The diagram is produced as a
//! [doubly connected edge list](https://en.wikipedia.org/wiki/Doubly_connected_edge_list)
//! of faces, half edges and vertices, and is clipped to an axis-aligned
//! bounding box so that every cell is a closed polygon.
//!
//! # Example
//!
//! ```rust
//! use cgmath::Point2;
//! use fortune_voronoi::{generate_diagram, BoundingBox};
//!
//! let points = vec![
//!     Point2::new(0.25, 0.3),
//!     Point2::new(0.7, 0.6),
//!     Point2::new(0.4, 0.9),
//! ];
//! let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
//! let diagram = generate_diagram(&points, &bbox);
//! assert_eq!(diagram.get_site_count(), 3);
//! ```
//!
//! For finer control (constructing without clipping, or clipping to a
//! different box later) drive [`FortuneAlgorithm`] and
//! [`Diagram::intersect`](diagram::Diagram::intersect) directly.

mod beachline;
pub mod boundingbox;
mod clipper;
pub mod delauney;
pub mod diagram;
mod event;
#[cfg(test)]
mod test_utils;
pub mod vector2;
mod voronoi_builder;

pub use boundingbox::BoundingBox;
pub use diagram::Diagram;
pub use voronoi_builder::FortuneAlgorithm;

use cgmath::Point2;

/// Generates the Voronoi diagram of the supplied points, bounded and clipped
/// to `bbox`.
///
/// The sweep runs to completion, the still-open cells are closed against a
/// copy of `bbox` grown to cover every diagram vertex, and the result is
/// clipped back to `bbox` itself.
///
/// The points must be distinct; coincident sites are undefined behavior of
/// the construction, not detected.
pub fn generate_diagram(points: &[Point2<f64>], bbox: &BoundingBox) -> Diagram {
    let mut algorithm = FortuneAlgorithm::new(points);
    algorithm.construct();
    let mut bounding_box = *bbox;
    algorithm.bound(&mut bounding_box);
    let mut diagram = algorithm.into_diagram();
    diagram.intersect(bbox);
    diagram
}

/// Performs [Lloyd's relaxation](https://en.wikipedia.org/wiki/Lloyd%27s_algorithm)
/// on the supplied points: each iteration replaces every point with the
/// centroid of its Voronoi cell, spreading the points more evenly over the
/// box.
pub fn lloyds_relaxation(
    points: &[Point2<f64>],
    bbox: &BoundingBox,
    iterations: usize,
) -> Vec<Point2<f64>> {
    let mut points = points.to_vec();
    for _ in 0..iterations {
        let diagram = generate_diagram(&points, bbox);
        points = (0..diagram.get_site_count())
            .map(|face| diagram.calculate_face_center(face))
            .collect();
    }
    points
}
