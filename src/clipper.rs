//! Clipping of an already bounded diagram to a smaller box.
//!
//! Each face boundary is walked once; every half edge is classified by
//! whether its endpoints are inside the box and how often it crosses the
//! boundary, then truncated, dropped or kept. Where the boundary leaves and
//! re-enters the box, wall edges are stitched in along the cyclic wall order
//! Left -> Bottom -> Right -> Top, inserting corner vertices as needed.

use crate::boundingbox::{BoundingBox, Side};
use crate::diagram::{Diagram, HalfEdgeKey, VertexKey};
use log::warn;
use std::collections::HashSet;

impl Diagram {
    /// Clips every face to `bbox`, so that all cells are closed polygons
    /// inside it. The diagram must already be bounded: every face boundary a
    /// closed chain with all endpoints set.
    ///
    /// Returns false if an edge crossed the boundary an impossible number of
    /// times (a geometric anomaly); clipping continues regardless so the
    /// partial diagram can be inspected.
    pub fn intersect(&mut self, bbox: &BoundingBox) -> bool {
        let mut error = false;
        let mut processed_half_edges: HashSet<HalfEdgeKey> = HashSet::new();
        let mut vertices_to_remove: HashSet<VertexKey> = HashSet::new();

        for face in 0..self.get_site_count() {
            let outer_component = match self.get_face_outer_component(face) {
                Some(half_edge) => half_edge,
                None => continue,
            };

            let mut half_edge = outer_component;
            let mut inside = bbox.contains(self.get_half_edge_origin_point(half_edge));
            let outer_component_dirty = !inside;
            // First half edge coming into the box and last going out, with
            // the walls they cross.
            let mut incoming: Option<(HalfEdgeKey, Side)> = None;
            let mut outgoing: Option<(HalfEdgeKey, Side)> = None;

            loop {
                let origin_point = self.get_half_edge_origin_point(half_edge);
                let destination_point = self.get_half_edge_destination_point(half_edge);
                let intersections = bbox.get_intersections(origin_point, destination_point);
                let next_inside = bbox.contains(destination_point);
                let next_half_edge = self
                    .get_half_edge_next(half_edge)
                    .expect("face boundary is not a closed chain");

                if !inside && !next_inside {
                    match intersections.len() {
                        // Entirely outside: drop the edge.
                        0 => {
                            if let Some(origin) = self.get_half_edge_origin(half_edge) {
                                vertices_to_remove.insert(origin);
                            }
                            self.remove_half_edge(half_edge);
                        }
                        // Crosses the box: shrink the edge to the two
                        // crossing points (reusing the twin's endpoints if it
                        // was clipped first).
                        2 => {
                            if let Some(origin) = self.get_half_edge_origin(half_edge) {
                                vertices_to_remove.insert(origin);
                            }
                            let twin = self.get_half_edge_twin(half_edge);
                            if twin.map_or(false, |twin| processed_half_edges.contains(&twin)) {
                                let twin = twin.unwrap();
                                let twin_destination = self.get_half_edge_destination(twin);
                                let twin_origin = self.get_half_edge_origin(twin);
                                self.set_half_edge_origin(half_edge, twin_destination);
                                self.set_half_edge_destination(half_edge, twin_origin);
                            } else {
                                let origin = self.create_vertex(intersections[0].point);
                                let destination = self.create_vertex(intersections[1].point);
                                self.set_half_edge_origin(half_edge, Some(origin));
                                self.set_half_edge_destination(half_edge, Some(destination));
                            }
                            if let Some((outgoing_half_edge, outgoing_side)) = outgoing {
                                self.link_box_boundary(
                                    bbox,
                                    outgoing_half_edge,
                                    outgoing_side,
                                    half_edge,
                                    intersections[0].side,
                                );
                            }
                            if incoming.is_none() {
                                incoming = Some((half_edge, intersections[0].side));
                            }
                            outgoing = Some((half_edge, intersections[1].side));
                            processed_half_edges.insert(half_edge);
                        }
                        _ => error = true,
                    }
                } else if inside && !next_inside {
                    // Leaving the box: truncate at the crossing.
                    if intersections.len() == 1 {
                        let twin = self.get_half_edge_twin(half_edge);
                        if twin.map_or(false, |twin| processed_half_edges.contains(&twin)) {
                            let twin_origin = self.get_half_edge_origin(twin.unwrap());
                            self.set_half_edge_destination(half_edge, twin_origin);
                        } else {
                            let destination = self.create_vertex(intersections[0].point);
                            self.set_half_edge_destination(half_edge, Some(destination));
                        }
                        outgoing = Some((half_edge, intersections[0].side));
                        processed_half_edges.insert(half_edge);
                    } else {
                        error = true;
                    }
                } else if !inside && next_inside {
                    // Entering the box: truncate, then stitch the wall run
                    // from the last exit.
                    if intersections.len() == 1 {
                        if let Some(origin) = self.get_half_edge_origin(half_edge) {
                            vertices_to_remove.insert(origin);
                        }
                        let twin = self.get_half_edge_twin(half_edge);
                        if twin.map_or(false, |twin| processed_half_edges.contains(&twin)) {
                            let twin_destination = self.get_half_edge_destination(twin.unwrap());
                            self.set_half_edge_origin(half_edge, twin_destination);
                        } else {
                            let origin = self.create_vertex(intersections[0].point);
                            self.set_half_edge_origin(half_edge, Some(origin));
                        }
                        if let Some((outgoing_half_edge, outgoing_side)) = outgoing {
                            self.link_box_boundary(
                                bbox,
                                outgoing_half_edge,
                                outgoing_side,
                                half_edge,
                                intersections[0].side,
                            );
                        }
                        if incoming.is_none() {
                            incoming = Some((half_edge, intersections[0].side));
                        }
                        processed_half_edges.insert(half_edge);
                    } else {
                        error = true;
                    }
                }

                half_edge = next_half_edge;
                inside = next_inside;
                if half_edge == outer_component {
                    break;
                }
            }

            if outer_component_dirty {
                // Close the gap between the last exit and the first entry,
                // and rehome the outer component inside the box.
                if let Some((incoming_half_edge, incoming_side)) = incoming {
                    let (outgoing_half_edge, outgoing_side) =
                        outgoing.expect("face entered the box without leaving it");
                    self.link_box_boundary(
                        bbox,
                        outgoing_half_edge,
                        outgoing_side,
                        incoming_half_edge,
                        incoming_side,
                    );
                }
                self.set_face_outer_component(face, incoming.map(|(half_edge, _)| half_edge));
            }
        }

        for vertex in vertices_to_remove {
            self.remove_vertex(vertex);
        }

        if error {
            warn!("clipping met an impossible boundary crossing; diagram may be incomplete");
        }
        !error
    }

    /// Stitches wall half edges from the crossing of `start` to the crossing
    /// of `end`, walking the walls in cyclic order and dropping a corner
    /// vertex at every wall change.
    fn link_box_boundary(
        &mut self,
        bbox: &BoundingBox,
        start: HalfEdgeKey,
        start_side: Side,
        end: HalfEdgeKey,
        end_side: Side,
    ) {
        let face = self.get_half_edge_incident_face(start);
        let mut half_edge = start;
        let mut side = start_side as usize;
        while side != end_side as usize {
            side = (side + 1) % 4;
            let wall_edge = self.create_half_edge(face);
            self.link_half_edges(half_edge, wall_edge);
            let origin = self.get_half_edge_destination(half_edge);
            self.set_half_edge_origin(wall_edge, origin);
            let corner = self.create_corner(bbox, Side::from_index(side));
            self.set_half_edge_destination(wall_edge, Some(corner));
            half_edge = wall_edge;
        }
        let closing_edge = self.create_half_edge(face);
        self.link_half_edges(half_edge, closing_edge);
        self.link_half_edges(closing_edge, end);
        let origin = self.get_half_edge_destination(half_edge);
        self.set_half_edge_origin(closing_edge, origin);
        let destination = self.get_half_edge_origin(end);
        self.set_half_edge_destination(closing_edge, destination);
    }
}
