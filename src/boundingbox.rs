use cgmath::{Point2, Vector2};

/// Default tolerance for box inclusion and segment intersection tests.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// The four walls of a bounding box.
///
/// The discriminants matter: corner stitching walks the walls in the cyclic
/// order Left -> Bottom -> Right -> Top, and indexes per-cell slot arrays by
/// `2 * side + {0, 1}`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Left = 0,
    Bottom = 1,
    Right = 2,
    Top = 3,
}

impl Side {
    pub(crate) fn from_index(index: usize) -> Side {
        match index % 4 {
            0 => Side::Left,
            1 => Side::Bottom,
            2 => Side::Right,
            _ => Side::Top,
        }
    }
}

/// A point where a ray or segment meets the box boundary, and the wall it
/// meets it on.
#[derive(Clone, Copy, Debug)]
pub struct Intersection {
    pub side: Side,
    pub point: Point2<f64>,
}

/// Axis-aligned box `[left, right] x [bottom, top]`.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    epsilon: f64,
}

impl BoundingBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        BoundingBox {
            left,
            bottom,
            right,
            top,
            epsilon: DEFAULT_EPSILON,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Inclusion test, tolerant by epsilon on every side.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.left - self.epsilon
            && point.x <= self.right + self.epsilon
            && point.y >= self.bottom - self.epsilon
            && point.y <= self.top + self.epsilon
    }

    /// First intersection of the ray `origin + t * direction` (smallest
    /// positive `t`) with the box boundary. The origin must be inside the box
    /// and the direction nonzero.
    pub fn get_first_intersection(
        &self,
        origin: Point2<f64>,
        direction: Vector2<f64>,
    ) -> Intersection {
        let mut t = f64::INFINITY;
        let mut intersection = None;
        if direction.x > 0.0 {
            t = (self.right - origin.x) / direction.x;
            intersection = Some(Intersection {
                side: Side::Right,
                point: origin + direction * t,
            });
        } else if direction.x < 0.0 {
            t = (self.left - origin.x) / direction.x;
            intersection = Some(Intersection {
                side: Side::Left,
                point: origin + direction * t,
            });
        }
        if direction.y > 0.0 {
            let t_by_y = (self.top - origin.y) / direction.y;
            if t_by_y < t {
                intersection = Some(Intersection {
                    side: Side::Top,
                    point: origin + direction * t_by_y,
                });
            }
        } else if direction.y < 0.0 {
            let t_by_y = (self.bottom - origin.y) / direction.y;
            if t_by_y < t {
                intersection = Some(Intersection {
                    side: Side::Bottom,
                    point: origin + direction * t_by_y,
                });
            }
        }
        intersection.expect("ray direction must be nonzero")
    }

    /// Intersections of the open segment `(origin, destination)` with the box
    /// boundary: zero, one or two, in ascending order along the segment.
    ///
    /// A crossing at parameter `t` counts only if `epsilon < t < 1 - epsilon`
    /// and the hit point lies on the wall within epsilon, so endpoints sitting
    /// exactly on the boundary are classified the same way `contains` sees
    /// them.
    pub fn get_intersections(
        &self,
        origin: Point2<f64>,
        destination: Point2<f64>,
    ) -> Vec<Intersection> {
        let direction = destination - origin;
        let eps = self.epsilon;
        let mut found: Vec<(f64, Intersection)> = Vec::with_capacity(2);

        if (origin.x < self.left - eps || destination.x < self.left - eps)
            && direction.x.abs() > eps
        {
            let t = (self.left - origin.x) / direction.x;
            if eps < t && t < 1.0 - eps {
                let point = origin + direction * t;
                if point.y >= self.bottom - eps && point.y <= self.top + eps {
                    found.push((
                        t,
                        Intersection {
                            side: Side::Left,
                            point,
                        },
                    ));
                }
            }
        }
        if (origin.x > self.right + eps || destination.x > self.right + eps)
            && direction.x.abs() > eps
        {
            let t = (self.right - origin.x) / direction.x;
            if eps < t && t < 1.0 - eps {
                let point = origin + direction * t;
                if point.y >= self.bottom - eps && point.y <= self.top + eps {
                    found.push((
                        t,
                        Intersection {
                            side: Side::Right,
                            point,
                        },
                    ));
                }
            }
        }
        if (origin.y < self.bottom - eps || destination.y < self.bottom - eps)
            && direction.y.abs() > eps
            && found.len() < 2
        {
            let t = (self.bottom - origin.y) / direction.y;
            if eps < t && t < 1.0 - eps {
                let point = origin + direction * t;
                if point.x >= self.left - eps && point.x <= self.right + eps {
                    found.push((
                        t,
                        Intersection {
                            side: Side::Bottom,
                            point,
                        },
                    ));
                }
            }
        }
        if (origin.y > self.top + eps || destination.y > self.top + eps)
            && direction.y.abs() > eps
            && found.len() < 2
        {
            let t = (self.top - origin.y) / direction.y;
            if eps < t && t < 1.0 - eps {
                let point = origin + direction * t;
                if point.x >= self.left - eps && point.x <= self.right + eps {
                    found.push((
                        t,
                        Intersection {
                            side: Side::Top,
                            point,
                        },
                    ));
                }
            }
        }

        if found.len() == 2 && found[0].0 > found[1].0 {
            found.swap(0, 1);
        }
        found.into_iter().map(|(_, intersection)| intersection).collect()
    }

    /// The corner reached by walking the boundary clockwise from the start of
    /// `side`. Corner stitching relies on this exact pairing.
    pub fn corner(&self, side: Side) -> Point2<f64> {
        match side {
            Side::Left => Point2::new(self.left, self.top),
            Side::Bottom => Point2::new(self.left, self.bottom),
            Side::Right => Point2::new(self.right, self.bottom),
            Side::Top => Point2::new(self.right, self.top),
        }
    }
}
