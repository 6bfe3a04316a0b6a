use crate::beachline::{ArcKey, Beachline};
use crate::boundingbox::{BoundingBox, Side};
use crate::diagram::{Diagram, HalfEdgeKey, SiteIndex, VertexKey};
use crate::event::{EventQueue, EventType};
use crate::vector2::{compute_circumcircle_center, get_orthogonal};
use cgmath::{EuclideanSpace, MetricSpace, Point2};
use log::{debug, trace};

/// Fortune's sweep-line construction of a Voronoi diagram.
///
/// The sweep line moves downward: events are processed in descending `y`.
/// `construct` runs the event loop; `bound` closes the still-open cells
/// against a box so every face becomes a simple closed polygon. Clipping an
/// already bounded diagram to a smaller box is `Diagram::intersect`.
pub struct FortuneAlgorithm {
    diagram: Diagram,
    beachline: Beachline,
    events: EventQueue,
    beachline_y: f64,
}

/// A vertex sitting on the box boundary during `bound`, with the half edges
/// arriving at and leaving it, filled in as walls are stitched. Slot arrays
/// index into one shared arena so a corner shared by two wall slots is a
/// single record.
struct LinkedVertex {
    prev_half_edge: Option<HalfEdgeKey>,
    vertex: VertexKey,
    next_half_edge: Option<HalfEdgeKey>,
}

impl FortuneAlgorithm {
    pub fn new(points: &[Point2<f64>]) -> Self {
        FortuneAlgorithm {
            diagram: Diagram::new(points),
            beachline: Beachline::new(),
            events: EventQueue::new(),
            beachline_y: 0.0,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn into_diagram(self) -> Diagram {
        self.diagram
    }

    /// Runs the sweep to completion. Afterwards the diagram holds every
    /// finite vertex and edge; edges still open at the remaining breakpoints
    /// are finished by `bound`.
    pub fn construct(&mut self) {
        for site in 0..self.diagram.get_site_count() {
            let y = self.diagram.get_site_point(site).y;
            self.events.add_site_event(y, site);
        }

        let mut processed = 0usize;
        while let Some(event) = self.events.pop() {
            self.beachline_y = event.y;
            processed += 1;
            match event.event_type {
                EventType::SiteEvent { site } => self.handle_site_event(site),
                EventType::CircleEvent { point, arc } => self.handle_circle_event(point, arc),
            }
        }
        debug!(
            "sweep finished: {} events, {} vertices",
            processed,
            self.diagram.get_vertex_count()
        );
    }

    fn handle_site_event(&mut self, site: SiteIndex) {
        trace!("site event for site {} at y = {}", site, self.beachline_y);

        if self.beachline.is_empty() {
            let root = self.beachline.create_arc(site);
            self.beachline.set_root(root);
            return;
        }

        // Split the arc directly above the new site into three.
        let point = self.diagram.get_site_point(site);
        let arc_to_break = self
            .beachline
            .locate_arc_above(point, self.beachline_y, &self.diagram);
        self.delete_event(arc_to_break);
        let middle_arc = self.break_arc(arc_to_break, site);
        let left_arc = self.beachline.get_prev(middle_arc);
        let right_arc = self.beachline.get_next(middle_arc);

        // One new edge pair; both fresh breakpoints trace it until they
        // separate at a circle event.
        self.add_edge(left_arc, middle_arc);
        let middle_left = self.beachline.get_left_half_edge(middle_arc);
        self.beachline.set_right_half_edge(middle_arc, middle_left);
        let left_right = self.beachline.get_right_half_edge(left_arc);
        self.beachline.set_left_half_edge(right_arc, left_right);

        let before = self.beachline.get_prev(left_arc);
        if !self.beachline.is_nil(before) {
            self.add_event(before, left_arc, middle_arc);
        }
        let after = self.beachline.get_next(right_arc);
        if !self.beachline.is_nil(after) {
            self.add_event(middle_arc, right_arc, after);
        }
    }

    fn handle_circle_event(&mut self, point: Point2<f64>, arc: ArcKey) {
        trace!("circle event at y = {}", self.beachline_y);

        let vertex = self.diagram.create_vertex(point);
        let left_arc = self.beachline.get_prev(arc);
        let right_arc = self.beachline.get_next(arc);

        // The neighbors' pending events assumed the vanishing arc still
        // existed.
        self.delete_event(left_arc);
        self.delete_event(right_arc);

        self.remove_arc(arc, vertex);

        let before = self.beachline.get_prev(left_arc);
        if !self.beachline.is_nil(before) {
            self.add_event(before, left_arc, right_arc);
        }
        let after = self.beachline.get_next(right_arc);
        if !self.beachline.is_nil(after) {
            self.add_event(left_arc, right_arc, after);
        }
    }

    /// Replaces `arc` with a fresh arc for `site` flanked by two halves of
    /// the original arc, which inherit its outer half edges.
    fn break_arc(&mut self, arc: ArcKey, site: SiteIndex) -> ArcKey {
        let arc_site = self.beachline.get_site(arc).unwrap();
        let middle_arc = self.beachline.create_arc(site);
        let left_arc = self.beachline.create_arc(arc_site);
        let left_half_edge = self.beachline.get_left_half_edge(arc);
        self.beachline.set_left_half_edge(left_arc, left_half_edge);
        let right_arc = self.beachline.create_arc(arc_site);
        let right_half_edge = self.beachline.get_right_half_edge(arc);
        self.beachline.set_right_half_edge(right_arc, right_half_edge);

        self.beachline.replace(arc, middle_arc);
        self.beachline.insert_before(middle_arc, left_arc);
        self.beachline.insert_after(middle_arc, right_arc);
        middle_arc
    }

    /// Removes the arc converged away by a circle event, closing its edges at
    /// `vertex` and starting the new edge between its former neighbors.
    fn remove_arc(&mut self, arc: ArcKey, vertex: VertexKey) {
        let prev = self.beachline.get_prev(arc);
        let next = self.beachline.get_next(arc);
        let left_half_edge = self.beachline.get_left_half_edge(arc).unwrap();
        let right_half_edge = self.beachline.get_right_half_edge(arc).unwrap();

        // End the edges meeting at the vanishing arc.
        self.set_destination(prev, arc, vertex);
        self.set_destination(arc, next, vertex);

        // Close the boundary of the vanishing arc's face around the vertex.
        self.diagram.link_half_edges(left_half_edge, right_half_edge);

        self.beachline.remove(arc);

        // A new edge grows downward from the vertex between the remaining
        // neighbors; chain it to the edges just ended.
        let prev_half_edge = self.beachline.get_right_half_edge(prev).unwrap();
        let next_half_edge = self.beachline.get_left_half_edge(next).unwrap();
        self.add_edge(prev, next);
        self.set_origin(prev, next, vertex);
        let new_prev_right = self.beachline.get_right_half_edge(prev).unwrap();
        self.diagram.link_half_edges(new_prev_right, prev_half_edge);
        let new_next_left = self.beachline.get_left_half_edge(next).unwrap();
        self.diagram.link_half_edges(next_half_edge, new_next_left);
    }

    /// Creates the twin half-edge pair traced by the breakpoint between two
    /// adjacent arcs.
    fn add_edge(&mut self, left: ArcKey, right: ArcKey) {
        let left_face = self
            .diagram
            .get_site_face(self.beachline.get_site(left).unwrap());
        let right_face = self
            .diagram
            .get_site_face(self.beachline.get_site(right).unwrap());
        let (half_edge_1, half_edge_2) = self.diagram.add_edge(left_face, right_face);
        self.beachline.set_right_half_edge(left, Some(half_edge_1));
        self.beachline.set_left_half_edge(right, Some(half_edge_2));
    }

    fn set_origin(&mut self, left: ArcKey, right: ArcKey, vertex: VertexKey) {
        let left_half_edge = self.beachline.get_right_half_edge(left).unwrap();
        self.diagram
            .set_half_edge_destination(left_half_edge, Some(vertex));
        let right_half_edge = self.beachline.get_left_half_edge(right).unwrap();
        self.diagram.set_half_edge_origin(right_half_edge, Some(vertex));
    }

    fn set_destination(&mut self, left: ArcKey, right: ArcKey, vertex: VertexKey) {
        let left_half_edge = self.beachline.get_right_half_edge(left).unwrap();
        self.diagram.set_half_edge_origin(left_half_edge, Some(vertex));
        let right_half_edge = self.beachline.get_left_half_edge(right).unwrap();
        self.diagram
            .set_half_edge_destination(right_half_edge, Some(vertex));
    }

    /// Tests the triple for a convergence and schedules a circle event for
    /// the middle arc if both breakpoints are heading toward the circumcenter
    /// and the convergence lies at or below the sweep line.
    fn add_event(&mut self, left: ArcKey, middle: ArcKey, right: ArcKey) {
        let left_point = self
            .diagram
            .get_site_point(self.beachline.get_site(left).unwrap());
        let middle_point = self
            .diagram
            .get_site_point(self.beachline.get_site(middle).unwrap());
        let right_point = self
            .diagram
            .get_site_point(self.beachline.get_site(right).unwrap());

        let (y, convergence_point) =
            compute_convergence_point(left_point, middle_point, right_point);
        let is_below = y <= self.beachline_y;

        let left_breakpoint_moving_right = is_moving_right(left_point, middle_point);
        let right_breakpoint_moving_right = is_moving_right(middle_point, right_point);
        let left_initial_x = get_initial_x(left_point, middle_point, left_breakpoint_moving_right);
        let right_initial_x =
            get_initial_x(middle_point, right_point, right_breakpoint_moving_right);

        let is_valid = ((left_breakpoint_moving_right && left_initial_x < convergence_point.x)
            || (!left_breakpoint_moving_right && left_initial_x > convergence_point.x))
            && ((right_breakpoint_moving_right && right_initial_x < convergence_point.x)
                || (!right_breakpoint_moving_right && right_initial_x > convergence_point.x));

        if is_valid && is_below {
            trace!("circle event scheduled at y = {}", y);
            let event = self.events.add_circle_event(y, convergence_point, middle);
            self.beachline.set_arc_event(middle, event);
        }
    }

    /// Invalidates the arc's pending circle event, if any.
    fn delete_event(&mut self, arc: ArcKey) {
        let event = self.beachline.take_arc_event(arc);
        self.events.remove(&event);
    }

    /// Closes the diagram against `bbox`, which is first grown to contain
    /// every vertex the sweep produced.
    ///
    /// Each breakpoint still on the beachline is shot outward onto the box,
    /// ending its half edges there; then every cell's cut points are joined
    /// along the walls (cyclic order Left -> Bottom -> Right -> Top),
    /// inserting corner vertices where consecutive cut points lie on
    /// different walls.
    pub fn bound(&mut self, bbox: &mut BoundingBox) {
        for point in self.diagram.get_vertex_points() {
            bbox.left = bbox.left.min(point.x);
            bbox.bottom = bbox.bottom.min(point.y);
            bbox.right = bbox.right.max(point.x);
            bbox.top = bbox.top.max(point.y);
        }

        let mut linked_vertices: Vec<LinkedVertex> = vec![];
        let mut cell_vertices: Vec<[Option<usize>; 8]> =
            vec![[None; 8]; self.diagram.get_site_count()];

        // Close the edges of the breakpoints still on the beachline.
        if !self.beachline.is_empty() {
            let mut left_arc = self.beachline.get_leftmost_arc();
            let mut right_arc = self.beachline.get_next(left_arc);
            while !self.beachline.is_nil(right_arc) {
                let left_site = self.beachline.get_site(left_arc).unwrap();
                let right_site = self.beachline.get_site(right_arc).unwrap();
                let left_point = self.diagram.get_site_point(left_site);
                let right_point = self.diagram.get_site_point(right_site);

                let direction = get_orthogonal(left_point - right_point);
                let origin = left_point.midpoint(right_point);
                let intersection = bbox.get_first_intersection(origin, direction);

                let vertex = self.diagram.create_vertex(intersection.point);
                self.set_destination(left_arc, right_arc, vertex);

                let side = intersection.side as usize;
                linked_vertices.push(LinkedVertex {
                    prev_half_edge: None,
                    vertex,
                    next_half_edge: self.beachline.get_right_half_edge(left_arc),
                });
                cell_vertices[left_site][2 * side + 1] = Some(linked_vertices.len() - 1);
                linked_vertices.push(LinkedVertex {
                    prev_half_edge: self.beachline.get_left_half_edge(right_arc),
                    vertex,
                    next_half_edge: None,
                });
                cell_vertices[right_site][2 * side] = Some(linked_vertices.len() - 1);

                left_arc = right_arc;
                right_arc = self.beachline.get_next(right_arc);
            }
        }

        // Insert corners wherever a cell enters and exits on different walls.
        // The fifth iteration revisits the first wall once the wrap-around
        // state is known.
        for cell in cell_vertices.iter_mut() {
            for i in 0..5 {
                let side = i % 4;
                let next_side = (side + 1) % 4;
                if cell[2 * side].is_none() && cell[2 * side + 1].is_some() {
                    let prev_side = (side + 3) % 4;
                    let corner = self.diagram.create_corner(bbox, Side::from_index(side));
                    linked_vertices.push(LinkedVertex {
                        prev_half_edge: None,
                        vertex: corner,
                        next_half_edge: None,
                    });
                    cell[2 * prev_side + 1] = Some(linked_vertices.len() - 1);
                    cell[2 * side] = Some(linked_vertices.len() - 1);
                } else if cell[2 * side].is_some() && cell[2 * side + 1].is_none() {
                    let corner = self.diagram.create_corner(bbox, Side::from_index(next_side));
                    linked_vertices.push(LinkedVertex {
                        prev_half_edge: None,
                        vertex: corner,
                        next_half_edge: None,
                    });
                    cell[2 * side + 1] = Some(linked_vertices.len() - 1);
                    cell[2 * next_side] = Some(linked_vertices.len() - 1);
                }
            }
        }

        // Join each cell's cut points with boundary half edges.
        for (site, cell) in cell_vertices.iter().enumerate() {
            for side in 0..4 {
                if let Some(start) = cell[2 * side] {
                    let end = cell[2 * side + 1].expect("wall with an entry must have an exit");
                    let face = self.diagram.get_site_face(site);
                    let half_edge = self.diagram.create_half_edge(face);
                    self.diagram
                        .set_half_edge_origin(half_edge, Some(linked_vertices[start].vertex));
                    self.diagram
                        .set_half_edge_destination(half_edge, Some(linked_vertices[end].vertex));

                    linked_vertices[start].next_half_edge = Some(half_edge);
                    self.diagram
                        .set_half_edge_prev(half_edge, linked_vertices[start].prev_half_edge);
                    if let Some(prev) = linked_vertices[start].prev_half_edge {
                        self.diagram.set_half_edge_next(prev, Some(half_edge));
                    }
                    linked_vertices[end].prev_half_edge = Some(half_edge);
                    self.diagram
                        .set_half_edge_next(half_edge, linked_vertices[end].next_half_edge);
                    if let Some(next) = linked_vertices[end].next_half_edge {
                        self.diagram.set_half_edge_prev(next, Some(half_edge));
                    }
                }
            }
        }

        debug!(
            "bound: {} boundary vertices, box [{}, {}] x [{}, {}]",
            linked_vertices.len(),
            bbox.left,
            bbox.right,
            bbox.bottom,
            bbox.top
        );
    }
}

fn is_moving_right(left: Point2<f64>, right: Point2<f64>) -> bool {
    left.y < right.y
}

fn get_initial_x(left: Point2<f64>, right: Point2<f64>, moving_right: bool) -> f64 {
    if moving_right {
        left.x
    } else {
        right.x
    }
}

/// Circumcircle of the three sites; the event fires when the sweep line
/// reaches the bottom of the circle.
fn compute_convergence_point(
    point1: Point2<f64>,
    point2: Point2<f64>,
    point3: Point2<f64>,
) -> (f64, Point2<f64>) {
    let center = compute_circumcircle_center(point1, point2, point3);
    let radius = center.distance(point1);
    (center.y - radius, center)
}
