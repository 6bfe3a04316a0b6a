use crate::diagram::Diagram;
use cgmath::Point2;
use petgraph::graph::{NodeIndex, UnGraph};

/// Builds the Delaunay dual of a completed Voronoi diagram: one node per
/// site, one edge per pair of cells sharing a Voronoi edge.
pub fn get_delauney_graph(diagram: &Diagram) -> UnGraph<Point2<f64>, ()> {
    let mut graph = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..diagram.get_site_count())
        .map(|site| graph.add_node(diagram.get_site_point(site)))
        .collect();

    for site in 0..diagram.get_site_count() {
        if diagram.get_face_outer_component(site).is_none() {
            continue;
        }
        for edge in diagram.outer_edge_iter(site) {
            if let Some(twin) = diagram.get_half_edge_twin(edge) {
                let neighbor = diagram.get_half_edge_incident_face(twin);
                // Every adjacency is seen from both cells; record it once.
                if site < neighbor {
                    graph.update_edge(nodes[site], nodes[neighbor], ());
                }
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundingbox::BoundingBox;
    use crate::generate_diagram;

    #[test]
    fn triangle_dual_is_complete() {
        let points = [
            Point2::new(0.0, 0.2),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 3.0),
        ];
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        let diagram = generate_diagram(&points, &bbox);
        let graph = get_delauney_graph(&diagram);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn convex_quadrilateral_dual_has_one_diagonal() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.3),
            Point2::new(0.1, 2.0),
            Point2::new(2.2, 1.9),
        ];
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        let diagram = generate_diagram(&points, &bbox);
        let graph = get_delauney_graph(&diagram);
        assert_eq!(graph.node_count(), 4);
        // Four hull edges plus exactly one diagonal.
        assert_eq!(graph.edge_count(), 5);
    }
}
