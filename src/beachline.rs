use crate::diagram::{Diagram, HalfEdgeKey, SiteIndex};
use crate::event::Event;
use cgmath::Point2;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Weak;

new_key_type! {
    pub struct ArcKey;
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
enum Color {
    Red,
    Black,
}

/// A parabolic arc of the beachline: a node of the red-black tree, threaded
/// through `prev`/`next` in left-to-right beachline order.
///
/// `left_half_edge` and `right_half_edge` are the growing diagram edges
/// traced by the breakpoints on either side of the arc; `event` is the circle
/// event that would remove this arc, if one is pending.
pub struct Arc {
    parent: ArcKey,
    left: ArcKey,
    right: ArcKey,
    color: Color,

    site: Option<SiteIndex>,
    left_half_edge: Option<HalfEdgeKey>,
    right_half_edge: Option<HalfEdgeKey>,
    event: Weak<RefCell<Event>>,

    prev: ArcKey,
    next: ArcKey,
}

/// The beachline: a red-black tree of arcs whose in-order traversal matches
/// the geometric left-to-right order of the parabolas under the sweep line.
///
/// A single sentinel arc stands for "nil" everywhere (colored black, no
/// site), so rotations and fixups never special-case missing children. The
/// sibling thread gives O(1) neighbor access and is untouched by rotations,
/// which preserve in-order order.
pub struct Beachline {
    arcs: SlotMap<ArcKey, Arc>,
    nil: ArcKey,
    root: ArcKey,
}

impl Beachline {
    pub fn new() -> Self {
        let mut arcs = SlotMap::with_key();
        let nil = arcs.insert_with_key(|key| Arc {
            parent: key,
            left: key,
            right: key,
            color: Color::Black,
            site: None,
            left_half_edge: None,
            right_half_edge: None,
            event: Weak::new(),
            prev: key,
            next: key,
        });
        Beachline {
            arcs,
            nil,
            root: nil,
        }
    }

    /// Allocates a detached red arc for `site`, all pointers at the sentinel.
    pub fn create_arc(&mut self, site: SiteIndex) -> ArcKey {
        let nil = self.nil;
        self.arcs.insert(Arc {
            parent: nil,
            left: nil,
            right: nil,
            color: Color::Red,
            site: Some(site),
            left_half_edge: None,
            right_half_edge: None,
            event: Weak::new(),
            prev: nil,
            next: nil,
        })
    }

    pub fn is_nil(&self, x: ArcKey) -> bool {
        x == self.nil
    }

    pub fn is_empty(&self) -> bool {
        self.is_nil(self.root)
    }

    pub fn set_root(&mut self, x: ArcKey) {
        self.root = x;
        self.arcs[x].color = Color::Black;
    }

    pub fn get_leftmost_arc(&self) -> ArcKey {
        let mut x = self.root;
        while !self.is_nil(self.arcs[x].prev) {
            x = self.arcs[x].prev;
        }
        x
    }

    /// Finds the arc vertically above `point` with the sweep line at `l`.
    ///
    /// Descends from the root comparing `point.x` against the node's left and
    /// right breakpoints (the ends of the beachline act as infinite
    /// breakpoints). In-order monotonicity of breakpoints guarantees
    /// termination.
    pub fn locate_arc_above(&self, point: Point2<f64>, l: f64, diagram: &Diagram) -> ArcKey {
        let mut node = self.root;
        loop {
            let arc = &self.arcs[node];
            let site = arc.site.unwrap();
            let breakpoint_left = if !self.is_nil(arc.prev) {
                let prev_site = self.arcs[arc.prev].site.unwrap();
                compute_breakpoint(
                    diagram.get_site_point(prev_site),
                    diagram.get_site_point(site),
                    l,
                )
            } else {
                f64::NEG_INFINITY
            };
            let breakpoint_right = if !self.is_nil(arc.next) {
                let next_site = self.arcs[arc.next].site.unwrap();
                compute_breakpoint(
                    diagram.get_site_point(site),
                    diagram.get_site_point(next_site),
                    l,
                )
            } else {
                f64::INFINITY
            };

            if point.x < breakpoint_left {
                node = arc.left;
            } else if point.x > breakpoint_right {
                node = arc.right;
            } else {
                return node;
            }
        }
    }

    /// Inserts `y` as the in-order predecessor of `x`.
    pub fn insert_before(&mut self, x: ArcKey, y: ArcKey) {
        if self.is_nil(self.arcs[x].left) {
            self.arcs[x].left = y;
            self.arcs[y].parent = x;
        } else {
            let prev = self.arcs[x].prev;
            self.arcs[prev].right = y;
            self.arcs[y].parent = prev;
        }
        let x_prev = self.arcs[x].prev;
        self.arcs[y].prev = x_prev;
        if !self.is_nil(x_prev) {
            self.arcs[x_prev].next = y;
        }
        self.arcs[y].next = x;
        self.arcs[x].prev = y;
        self.insert_fixup(y);
    }

    /// Inserts `y` as the in-order successor of `x`.
    pub fn insert_after(&mut self, x: ArcKey, y: ArcKey) {
        if self.is_nil(self.arcs[x].right) {
            self.arcs[x].right = y;
            self.arcs[y].parent = x;
        } else {
            let next = self.arcs[x].next;
            self.arcs[next].left = y;
            self.arcs[y].parent = next;
        }
        let x_next = self.arcs[x].next;
        self.arcs[y].next = x_next;
        if !self.is_nil(x_next) {
            self.arcs[x_next].prev = y;
        }
        self.arcs[y].prev = x;
        self.arcs[x].next = y;
        self.insert_fixup(y);
    }

    /// Substitutes `y` for `x` at the same tree position, inheriting
    /// children, color and thread links. The tree shape is unchanged, so no
    /// rebalancing is needed. `x` is freed.
    pub fn replace(&mut self, x: ArcKey, y: ArcKey) {
        self.transplant(x, y);
        let (x_left, x_right, x_prev, x_next, x_color) = {
            let arc = &self.arcs[x];
            (arc.left, arc.right, arc.prev, arc.next, arc.color)
        };
        self.arcs[y].left = x_left;
        self.arcs[y].right = x_right;
        if !self.is_nil(x_left) {
            self.arcs[x_left].parent = y;
        }
        if !self.is_nil(x_right) {
            self.arcs[x_right].parent = y;
        }
        self.arcs[y].prev = x_prev;
        self.arcs[y].next = x_next;
        if !self.is_nil(x_prev) {
            self.arcs[x_prev].next = y;
        }
        if !self.is_nil(x_next) {
            self.arcs[x_next].prev = y;
        }
        self.arcs[y].color = x_color;
        self.arcs.remove(x);
    }

    /// Red-black deletion of `z`, splicing it out of the sibling thread and
    /// freeing its slot.
    pub fn remove(&mut self, z: ArcKey) {
        let mut y = z;
        let mut y_original_color = self.arcs[y].color;
        let x;
        if self.is_nil(self.arcs[z].left) {
            x = self.arcs[z].right;
            self.transplant(z, x);
        } else if self.is_nil(self.arcs[z].right) {
            x = self.arcs[z].left;
            self.transplant(z, x);
        } else {
            y = self.minimum(self.arcs[z].right);
            y_original_color = self.arcs[y].color;
            x = self.arcs[y].right;
            if self.arcs[y].parent == z {
                // x may be the sentinel; the fixup still needs its parent.
                self.arcs[x].parent = y;
            } else {
                self.transplant(y, x);
                let z_right = self.arcs[z].right;
                self.arcs[y].right = z_right;
                self.arcs[z_right].parent = y;
            }
            self.transplant(z, y);
            let z_left = self.arcs[z].left;
            self.arcs[y].left = z_left;
            self.arcs[z_left].parent = y;
            self.arcs[y].color = self.arcs[z].color;
        }
        if y_original_color == Color::Black {
            self.remove_fixup(x);
        }

        let prev = self.arcs[z].prev;
        let next = self.arcs[z].next;
        if !self.is_nil(prev) {
            self.arcs[prev].next = next;
        }
        if !self.is_nil(next) {
            self.arcs[next].prev = prev;
        }
        self.arcs.remove(z);
    }

    fn minimum(&self, x: ArcKey) -> ArcKey {
        let mut x = x;
        while !self.is_nil(self.arcs[x].left) {
            x = self.arcs[x].left;
        }
        x
    }

    fn transplant(&mut self, u: ArcKey, v: ArcKey) {
        let u_parent = self.arcs[u].parent;
        if self.is_nil(u_parent) {
            self.root = v;
        } else if u == self.arcs[u_parent].left {
            self.arcs[u_parent].left = v;
        } else {
            self.arcs[u_parent].right = v;
        }
        self.arcs[v].parent = u_parent;
    }

    fn insert_fixup(&mut self, z: ArcKey) {
        let mut z = z;
        while self.arcs[self.arcs[z].parent].color == Color::Red {
            let parent = self.arcs[z].parent;
            let grandparent = self.arcs[parent].parent;
            if parent == self.arcs[grandparent].left {
                let uncle = self.arcs[grandparent].right;
                if self.arcs[uncle].color == Color::Red {
                    self.arcs[parent].color = Color::Black;
                    self.arcs[uncle].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.arcs[parent].right {
                        z = parent;
                        self.left_rotate(z);
                    }
                    let parent = self.arcs[z].parent;
                    let grandparent = self.arcs[parent].parent;
                    self.arcs[parent].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    self.right_rotate(grandparent);
                }
            } else {
                let uncle = self.arcs[grandparent].left;
                if self.arcs[uncle].color == Color::Red {
                    self.arcs[parent].color = Color::Black;
                    self.arcs[uncle].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.arcs[parent].left {
                        z = parent;
                        self.right_rotate(z);
                    }
                    let parent = self.arcs[z].parent;
                    let grandparent = self.arcs[parent].parent;
                    self.arcs[parent].color = Color::Black;
                    self.arcs[grandparent].color = Color::Red;
                    self.left_rotate(grandparent);
                }
            }
        }
        let root = self.root;
        self.arcs[root].color = Color::Black;
    }

    fn remove_fixup(&mut self, x: ArcKey) {
        let mut x = x;
        while x != self.root && self.arcs[x].color == Color::Black {
            let parent = self.arcs[x].parent;
            if x == self.arcs[parent].left {
                let mut w = self.arcs[parent].right;
                if self.arcs[w].color == Color::Red {
                    self.arcs[w].color = Color::Black;
                    self.arcs[parent].color = Color::Red;
                    self.left_rotate(parent);
                    w = self.arcs[parent].right;
                }
                if self.arcs[self.arcs[w].left].color == Color::Black
                    && self.arcs[self.arcs[w].right].color == Color::Black
                {
                    self.arcs[w].color = Color::Red;
                    x = parent;
                } else {
                    if self.arcs[self.arcs[w].right].color == Color::Black {
                        let w_left = self.arcs[w].left;
                        self.arcs[w_left].color = Color::Black;
                        self.arcs[w].color = Color::Red;
                        self.right_rotate(w);
                        w = self.arcs[parent].right;
                    }
                    self.arcs[w].color = self.arcs[parent].color;
                    self.arcs[parent].color = Color::Black;
                    let w_right = self.arcs[w].right;
                    self.arcs[w_right].color = Color::Black;
                    self.left_rotate(parent);
                    x = self.root;
                }
            } else {
                let mut w = self.arcs[parent].left;
                if self.arcs[w].color == Color::Red {
                    self.arcs[w].color = Color::Black;
                    self.arcs[parent].color = Color::Red;
                    self.right_rotate(parent);
                    w = self.arcs[parent].left;
                }
                if self.arcs[self.arcs[w].right].color == Color::Black
                    && self.arcs[self.arcs[w].left].color == Color::Black
                {
                    self.arcs[w].color = Color::Red;
                    x = parent;
                } else {
                    if self.arcs[self.arcs[w].left].color == Color::Black {
                        let w_right = self.arcs[w].right;
                        self.arcs[w_right].color = Color::Black;
                        self.arcs[w].color = Color::Red;
                        self.left_rotate(w);
                        w = self.arcs[parent].left;
                    }
                    self.arcs[w].color = self.arcs[parent].color;
                    self.arcs[parent].color = Color::Black;
                    let w_left = self.arcs[w].left;
                    self.arcs[w_left].color = Color::Black;
                    self.right_rotate(parent);
                    x = self.root;
                }
            }
        }
        self.arcs[x].color = Color::Black;
    }

    // Rotations leave the sibling thread alone: in-order order is preserved.
    fn left_rotate(&mut self, x: ArcKey) {
        let y = self.arcs[x].right;
        let y_left = self.arcs[y].left;
        self.arcs[x].right = y_left;
        if !self.is_nil(y_left) {
            self.arcs[y_left].parent = x;
        }
        let x_parent = self.arcs[x].parent;
        self.arcs[y].parent = x_parent;
        if self.is_nil(x_parent) {
            self.root = y;
        } else if x == self.arcs[x_parent].left {
            self.arcs[x_parent].left = y;
        } else {
            self.arcs[x_parent].right = y;
        }
        self.arcs[y].left = x;
        self.arcs[x].parent = y;
    }

    fn right_rotate(&mut self, y: ArcKey) {
        let x = self.arcs[y].left;
        let x_right = self.arcs[x].right;
        self.arcs[y].left = x_right;
        if !self.is_nil(x_right) {
            self.arcs[x_right].parent = y;
        }
        let y_parent = self.arcs[y].parent;
        self.arcs[x].parent = y_parent;
        if self.is_nil(y_parent) {
            self.root = x;
        } else if y == self.arcs[y_parent].left {
            self.arcs[y_parent].left = x;
        } else {
            self.arcs[y_parent].right = x;
        }
        self.arcs[x].right = y;
        self.arcs[y].parent = x;
    }

    pub fn get_site(&self, node: ArcKey) -> Option<SiteIndex> {
        self.arcs[node].site
    }

    pub fn get_prev(&self, node: ArcKey) -> ArcKey {
        self.arcs[node].prev
    }

    pub fn get_next(&self, node: ArcKey) -> ArcKey {
        self.arcs[node].next
    }

    pub fn get_left_half_edge(&self, node: ArcKey) -> Option<HalfEdgeKey> {
        self.arcs[node].left_half_edge
    }

    pub fn set_left_half_edge(&mut self, node: ArcKey, half_edge: Option<HalfEdgeKey>) {
        self.arcs[node].left_half_edge = half_edge;
    }

    pub fn get_right_half_edge(&self, node: ArcKey) -> Option<HalfEdgeKey> {
        self.arcs[node].right_half_edge
    }

    pub fn set_right_half_edge(&mut self, node: ArcKey, half_edge: Option<HalfEdgeKey>) {
        self.arcs[node].right_half_edge = half_edge;
    }

    pub fn set_arc_event(&mut self, node: ArcKey, event: Weak<RefCell<Event>>) {
        self.arcs[node].event = event;
    }

    /// Detaches and returns the arc's pending circle event handle.
    pub fn take_arc_event(&mut self, node: ArcKey) -> Weak<RefCell<Event>> {
        std::mem::replace(&mut self.arcs[node].event, Weak::new())
    }
}

/// X coordinate of the breakpoint between the arcs of `point1` (left) and
/// `point2` (right) with the sweep line at `l`: the right-hand root of the
/// parabola intersection, which is the correct one for an arc pair in this
/// order.
fn compute_breakpoint(point1: Point2<f64>, point2: Point2<f64>, l: f64) -> f64 {
    let (x1, y1) = (point1.x, point1.y);
    let (x2, y2) = (point2.x, point2.y);
    let d1 = 1.0 / (2.0 * (y1 - l));
    let d2 = 1.0 / (2.0 * (y2 - l));
    let a = d1 - d2;
    let b = 2.0 * (x2 * d2 - x1 * d1);
    let c = (y1 * y1 + x1 * x1 - l * l) * d1 - (y2 * y2 + x2 * x2 - l * l) * d2;
    let delta = b * b - 4.0 * a * c;
    (-b + delta.sqrt()) / (2.0 * a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread_order(beachline: &Beachline) -> Vec<SiteIndex> {
        let mut order = vec![];
        if beachline.is_empty() {
            return order;
        }
        let mut arc = beachline.get_leftmost_arc();
        while !beachline.is_nil(arc) {
            order.push(beachline.get_site(arc).unwrap());
            arc = beachline.get_next(arc);
        }
        order
    }

    fn in_order(beachline: &Beachline, node: ArcKey, out: &mut Vec<SiteIndex>) {
        if beachline.is_nil(node) {
            return;
        }
        in_order(beachline, beachline.arcs[node].left, out);
        out.push(beachline.get_site(node).unwrap());
        in_order(beachline, beachline.arcs[node].right, out);
    }

    // Black height of the subtree, checking red-black invariants on the way.
    fn check_rb(beachline: &Beachline, node: ArcKey) -> usize {
        if beachline.is_nil(node) {
            return 1;
        }
        let arc = &beachline.arcs[node];
        if arc.color == Color::Red {
            assert_eq!(beachline.arcs[arc.parent].color, Color::Black, "red-red violation");
        }
        let left_height = check_rb(beachline, arc.left);
        let right_height = check_rb(beachline, arc.right);
        assert_eq!(left_height, right_height, "black height mismatch");
        left_height + if arc.color == Color::Black { 1 } else { 0 }
    }

    fn assert_consistent(beachline: &Beachline, expected: &[SiteIndex]) {
        assert_eq!(thread_order(beachline), expected);
        let mut tree_order = vec![];
        in_order(beachline, beachline.root, &mut tree_order);
        assert_eq!(tree_order, expected, "thread and tree orders diverge");
        if !beachline.is_empty() {
            assert_eq!(beachline.arcs[beachline.root].color, Color::Black);
            check_rb(beachline, beachline.root);
        }
    }

    // Mimics a site event: the located arc splits into left/middle/right.
    fn break_arc(beachline: &mut Beachline, arc: ArcKey, site: SiteIndex) -> ArcKey {
        let old_site = beachline.get_site(arc).unwrap();
        let middle = beachline.create_arc(site);
        let left = beachline.create_arc(old_site);
        let right = beachline.create_arc(old_site);
        beachline.replace(arc, middle);
        beachline.insert_before(middle, left);
        beachline.insert_after(middle, right);
        middle
    }

    #[test]
    fn insert_before_and_after_thread_correctly() {
        let mut beachline = Beachline::new();
        let root = beachline.create_arc(0);
        beachline.set_root(root);
        let middle = break_arc(&mut beachline, root, 1);
        assert_consistent(&beachline, &[0, 1, 0]);

        // Split the middle arc again.
        break_arc(&mut beachline, middle, 2);
        assert_consistent(&beachline, &[0, 1, 2, 1, 0]);
    }

    #[test]
    fn repeated_splits_keep_the_tree_balanced() {
        let mut beachline = Beachline::new();
        let root = beachline.create_arc(0);
        beachline.set_root(root);
        let mut expected = vec![0];
        // Always split the rightmost arc; the fixups must keep rebalancing.
        for site in 1..=20 {
            let mut arc = beachline.get_leftmost_arc();
            while !beachline.is_nil(beachline.get_next(arc)) {
                arc = beachline.get_next(arc);
            }
            let old = *expected.last().unwrap();
            break_arc(&mut beachline, arc, site);
            expected.pop();
            expected.extend_from_slice(&[old, site, old]);
            assert_consistent(&beachline, &expected);
        }
    }

    #[test]
    fn remove_splices_thread_and_rebalances() {
        let mut beachline = Beachline::new();
        let root = beachline.create_arc(0);
        beachline.set_root(root);
        let middle = break_arc(&mut beachline, root, 1);
        break_arc(&mut beachline, middle, 2);
        // [0, 1, 2, 1, 0]: removing the middle 2 mimics a circle event.
        let mut arc = beachline.get_leftmost_arc();
        arc = beachline.get_next(arc);
        let doomed = beachline.get_next(arc);
        assert_eq!(beachline.get_site(doomed), Some(2));

        beachline.remove(doomed);
        assert_consistent(&beachline, &[0, 1, 1, 0]);

        // Remove from both ends as well.
        let leftmost = beachline.get_leftmost_arc();
        beachline.remove(leftmost);
        assert_consistent(&beachline, &[1, 1, 0]);

        let mut rightmost = beachline.get_leftmost_arc();
        while !beachline.is_nil(beachline.get_next(rightmost)) {
            rightmost = beachline.get_next(rightmost);
        }
        beachline.remove(rightmost);
        assert_consistent(&beachline, &[1, 1]);

        let leftmost = beachline.get_leftmost_arc();
        beachline.remove(leftmost);
        let last = beachline.get_leftmost_arc();
        beachline.remove(last);
        assert!(beachline.is_empty());
    }

    // Height of the parabola with the given focus and directrix y = l.
    fn parabola_y(focus: Point2<f64>, l: f64, x: f64) -> f64 {
        ((x - focus.x) * (x - focus.x) + focus.y * focus.y - l * l) / (2.0 * (focus.y - l))
    }

    #[test]
    fn compute_breakpoint_lies_on_both_parabolas() {
        let p1 = Point2::new(0.2, 0.8);
        let p2 = Point2::new(0.7, 0.4);
        let l = 0.1;
        let x = compute_breakpoint(p1, p2, l);
        let y1 = parabola_y(p1, l, x);
        let y2 = parabola_y(p2, l, x);
        assert!((y1 - y2).abs() < 1e-9, "{} vs {}", y1, y2);

        // The breakpoint is equidistant from both sites.
        let d1 = ((x - p1.x).powi(2) + (y1 - p1.y).powi(2)).sqrt();
        let d2 = ((x - p2.x).powi(2) + (y1 - p2.y).powi(2)).sqrt();
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn breakpoint_orders_follow_arc_order() {
        // Two arcs of the same pair of sites have two intersections; the
        // breakpoint of (a, b) and of (b, a) must be the two distinct roots.
        let a = Point2::new(0.0, 1.0);
        let b = Point2::new(1.0, 2.0);
        let l = 0.5;
        let ab = compute_breakpoint(a, b, l);
        let ba = compute_breakpoint(b, a, l);
        assert!(ab != ba);
        // The lower site's arc is the sharper one; between (a, b) with b
        // higher, the (b, a) crossing lies left of the (a, b) crossing.
        assert!(ba < ab);
    }
}
