use crate::boundingbox::{BoundingBox, Side};
use cgmath::Point2;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct VertexKey;
    pub struct HalfEdgeKey;
}

/// Sites and faces are stored in parallel dense vectors, so a plain index
/// addresses both: `SiteIndex` `i` is the site supplied `i`-th and the face of
/// its cell.
pub type SiteIndex = usize;

/// An input point of the diagram. Immutable after construction.
pub struct Site {
    index: SiteIndex,
    point: Point2<f64>,
    face: SiteIndex,
}

/// A vertex of the diagram, shared by two or more edges.
pub struct Vertex {
    point: Point2<f64>,
}

/// A directed edge of the diagram.
///
/// Stores the origin and destination vertices (either may be missing while
/// the edge is under construction), the incident face, the twin half edge
/// running in the opposite direction between the same two faces, and the
/// previous and next half edges around the incident face: the previous half
/// edge's destination is this one's origin and the next half edge's origin is
/// this one's destination.
#[derive(Debug)]
pub struct HalfEdge {
    origin: Option<VertexKey>,
    destination: Option<VertexKey>,
    twin: Option<HalfEdgeKey>,
    incident_face: SiteIndex,
    prev: Option<HalfEdgeKey>,
    next: Option<HalfEdgeKey>,
}

impl HalfEdge {
    fn new(incident_face: SiteIndex) -> Self {
        HalfEdge {
            origin: None,
            destination: None,
            twin: None,
            incident_face,
            prev: None,
            next: None,
        }
    }
}

/// One cell of the diagram: the region of the plane closer to its site than
/// to any other. Holds one bordering half edge; after bounding or clipping
/// the cell boundary is reachable from it through `next` links.
pub struct Face {
    site: SiteIndex,
    outer_component: Option<HalfEdgeKey>,
}

/// Iterator over the half edges bounding a single face, in `next` order.
pub struct EdgeIterator<'a> {
    diagram: &'a Diagram,
    start_edge: HalfEdgeKey,
    current_edge: Option<HalfEdgeKey>,
}

impl<'a> Iterator for EdgeIterator<'a> {
    type Item = HalfEdgeKey;

    fn next(&mut self) -> Option<HalfEdgeKey> {
        match self.current_edge {
            None => self.current_edge = Some(self.start_edge),
            Some(edge) => {
                self.current_edge = self.diagram.get_half_edge_next(edge);
                if self.current_edge == Some(self.start_edge) {
                    self.current_edge = None;
                }
            }
        }
        self.current_edge
    }
}

/// The Voronoi diagram as a doubly connected edge list: sites, faces,
/// vertices and half edges, with the methods to allocate, link and unlink
/// them.
pub struct Diagram {
    sites: Vec<Site>,
    faces: Vec<Face>,
    vertices: SlotMap<VertexKey, Vertex>,
    half_edges: SlotMap<HalfEdgeKey, HalfEdge>,
}

impl Diagram {
    /// Builds the site and face records for the supplied points. Vertices and
    /// half edges are added by the sweep.
    pub fn new(points: &[Point2<f64>]) -> Self {
        let sites = points
            .iter()
            .enumerate()
            .map(|(index, &point)| Site {
                index,
                point,
                face: index,
            })
            .collect();
        let faces = (0..points.len())
            .map(|site| Face {
                site,
                outer_component: None,
            })
            .collect();
        Diagram {
            sites,
            faces,
            vertices: SlotMap::with_key(),
            half_edges: SlotMap::with_key(),
        }
    }

    pub fn get_site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn get_site_point(&self, site: SiteIndex) -> Point2<f64> {
        self.sites[site].point
    }

    pub fn get_site_index(&self, site: SiteIndex) -> SiteIndex {
        self.sites[site].index
    }

    /// The face of a site's cell. Site and face indices coincide by
    /// construction; this keeps the back reference explicit.
    pub fn get_site_face(&self, site: SiteIndex) -> SiteIndex {
        self.sites[site].face
    }

    pub fn get_face_site(&self, face: SiteIndex) -> SiteIndex {
        self.faces[face].site
    }

    pub fn get_face_outer_component(&self, face: SiteIndex) -> Option<HalfEdgeKey> {
        self.faces[face].outer_component
    }

    pub fn set_face_outer_component(&mut self, face: SiteIndex, half_edge: Option<HalfEdgeKey>) {
        self.faces[face].outer_component = half_edge;
    }

    pub fn get_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn get_half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn get_vertex_point(&self, vertex: VertexKey) -> Point2<f64> {
        self.vertices[vertex].point
    }

    pub fn get_vertex_keys(&self) -> Vec<VertexKey> {
        self.vertices.keys().collect()
    }

    pub fn get_half_edge_keys(&self) -> Vec<HalfEdgeKey> {
        self.half_edges.keys().collect()
    }

    /// The location of every vertex in the diagram.
    pub fn get_vertex_points(&self) -> Vec<Point2<f64>> {
        self.vertices.values().map(|vertex| vertex.point).collect()
    }

    /// Adds a new vertex at `point`.
    pub fn create_vertex(&mut self, point: Point2<f64>) -> VertexKey {
        self.vertices.insert(Vertex { point })
    }

    /// Adds a vertex at the box corner paired with `side` (the corner the
    /// clockwise boundary walk reaches from that side's start).
    pub fn create_corner(&mut self, bbox: &BoundingBox, side: Side) -> VertexKey {
        self.create_vertex(bbox.corner(side))
    }

    /// Adds a new half edge incident to `face`. The face claims it as outer
    /// component if it has none yet.
    pub fn create_half_edge(&mut self, face: SiteIndex) -> HalfEdgeKey {
        let half_edge = self.half_edges.insert(HalfEdge::new(face));
        if self.faces[face].outer_component.is_none() {
            self.faces[face].outer_component = Some(half_edge);
        }
        half_edge
    }

    /// Adds the twin pair of half edges for a new diagram edge between two
    /// faces. The halves know their face and each other; endpoints and chain
    /// links are filled in as the sweep discovers them.
    pub fn add_edge(
        &mut self,
        left_face: SiteIndex,
        right_face: SiteIndex,
    ) -> (HalfEdgeKey, HalfEdgeKey) {
        let half_edge_1 = self.create_half_edge(left_face);
        let half_edge_2 = self.create_half_edge(right_face);
        self.half_edges[half_edge_1].twin = Some(half_edge_2);
        self.half_edges[half_edge_2].twin = Some(half_edge_1);
        (half_edge_1, half_edge_2)
    }

    pub fn get_half_edge_origin(&self, half_edge: HalfEdgeKey) -> Option<VertexKey> {
        self.half_edges[half_edge].origin
    }

    pub fn set_half_edge_origin(&mut self, half_edge: HalfEdgeKey, origin: Option<VertexKey>) {
        self.half_edges[half_edge].origin = origin;
    }

    pub fn get_half_edge_destination(&self, half_edge: HalfEdgeKey) -> Option<VertexKey> {
        self.half_edges[half_edge].destination
    }

    pub fn set_half_edge_destination(
        &mut self,
        half_edge: HalfEdgeKey,
        destination: Option<VertexKey>,
    ) {
        self.half_edges[half_edge].destination = destination;
    }

    pub fn get_half_edge_origin_point(&self, half_edge: HalfEdgeKey) -> Point2<f64> {
        let origin = self.half_edges[half_edge]
            .origin
            .expect("half edge origin not set");
        self.get_vertex_point(origin)
    }

    pub fn get_half_edge_destination_point(&self, half_edge: HalfEdgeKey) -> Point2<f64> {
        let destination = self.half_edges[half_edge]
            .destination
            .expect("half edge destination not set");
        self.get_vertex_point(destination)
    }

    pub fn get_half_edge_twin(&self, half_edge: HalfEdgeKey) -> Option<HalfEdgeKey> {
        self.half_edges[half_edge].twin
    }

    pub fn get_half_edge_incident_face(&self, half_edge: HalfEdgeKey) -> SiteIndex {
        self.half_edges[half_edge].incident_face
    }

    pub fn get_half_edge_prev(&self, half_edge: HalfEdgeKey) -> Option<HalfEdgeKey> {
        self.half_edges[half_edge].prev
    }

    pub fn set_half_edge_prev(&mut self, half_edge: HalfEdgeKey, prev: Option<HalfEdgeKey>) {
        self.half_edges[half_edge].prev = prev;
    }

    pub fn get_half_edge_next(&self, half_edge: HalfEdgeKey) -> Option<HalfEdgeKey> {
        self.half_edges[half_edge].next
    }

    pub fn set_half_edge_next(&mut self, half_edge: HalfEdgeKey, next: Option<HalfEdgeKey>) {
        self.half_edges[half_edge].next = next;
    }

    /// Links two half edges as consecutive around their shared face.
    pub fn link_half_edges(&mut self, prev: HalfEdgeKey, next: HalfEdgeKey) {
        self.half_edges[prev].next = Some(next);
        self.half_edges[next].prev = Some(prev);
    }

    /// Unlinks a vertex from the diagram. O(1); keys of other vertices stay
    /// valid.
    pub fn remove_vertex(&mut self, vertex: VertexKey) {
        self.vertices.remove(vertex);
    }

    /// Unlinks a half edge from the diagram. O(1); keys of other half edges
    /// stay valid.
    pub fn remove_half_edge(&mut self, half_edge: HalfEdgeKey) {
        self.half_edges.remove(half_edge);
    }

    /// Iterates the boundary of a completed face starting from its outer
    /// component.
    ///
    /// # Panics
    /// If the face has no outer component yet.
    pub fn outer_edge_iter(&self, face: SiteIndex) -> EdgeIterator {
        let start_edge = self.faces[face]
            .outer_component
            .expect("face has no outer component");
        EdgeIterator {
            diagram: self,
            start_edge,
            current_edge: None,
        }
    }

    /// Endpoint pairs of every fully built edge, one entry per half edge.
    pub fn get_edge_segments(&self) -> Vec<(Point2<f64>, Point2<f64>)> {
        let mut segments = vec![];
        for half_edge in self.half_edges.values() {
            if let (Some(origin), Some(destination)) = (half_edge.origin, half_edge.destination) {
                segments.push((self.get_vertex_point(origin), self.get_vertex_point(destination)));
            }
        }
        segments
    }

    /// Centroid of a completed face, the arithmetic mean of its boundary
    /// vertices. Used by Lloyd relaxation.
    pub fn calculate_face_center(&self, face: SiteIndex) -> Point2<f64> {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut count = 0;
        for edge in self.outer_edge_iter(face) {
            let point = self.get_half_edge_origin_point(edge);
            x += point.x;
            y += point.y;
            count += 1;
        }
        Point2::new(x / f64::from(count), y / f64::from(count))
    }

    /// Area of a completed face by the shoelace formula.
    pub fn get_face_area(&self, face: SiteIndex) -> f64 {
        self.outer_edge_iter(face)
            .fold(0.0, |acc, edge| {
                let origin = self.get_half_edge_origin_point(edge);
                let destination = self.get_half_edge_destination_point(edge);
                acc + origin.x * destination.y - destination.x * origin.y
            })
            .abs()
            * 0.5
    }

    /// Whether the face touches the diagram boundary, i.e. has a boundary
    /// half edge with no twin.
    pub fn is_face_on_border(&self, face: SiteIndex) -> bool {
        self.outer_edge_iter(face)
            .any(|edge| self.get_half_edge_twin(edge).is_none())
    }
}
