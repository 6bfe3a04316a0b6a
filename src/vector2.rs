use cgmath::EuclideanSpace;

/// Returns the vector rotated 90 degrees counterclockwise.
pub fn get_orthogonal(a: cgmath::Vector2<f64>) -> cgmath::Vector2<f64> {
    cgmath::Vector2::new(-a.y, a.x)
}

pub fn get_det(a: cgmath::Vector2<f64>, b: cgmath::Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Center of the circle through the three points, i.e. the point equidistant
/// from all of them. The points must not be collinear.
pub fn compute_circumcircle_center(
    point_1: cgmath::Point2<f64>,
    point_2: cgmath::Point2<f64>,
    point_3: cgmath::Point2<f64>,
) -> cgmath::Point2<f64> {
    let v1 = get_orthogonal(point_1 - point_2);
    let v2 = get_orthogonal(point_2 - point_3);
    let delta = (point_3 - point_1) * 0.5;
    let t = get_det(delta, v2) / get_det(v1, v2);
    (point_1 + point_2.to_vec()) * 0.5 + v1 * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cgmath::{MetricSpace, Point2, Vector2};

    #[test]
    fn orthogonal_is_ccw() {
        let v = get_orthogonal(Vector2::new(1.0, 0.0));
        assert_eq!(v, Vector2::new(0.0, 1.0));
        let v = get_orthogonal(v);
        assert_eq!(v, Vector2::new(-1.0, 0.0));
    }

    #[test]
    fn det_sign() {
        assert_eq!(get_det(Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0)), 1.0);
        assert_eq!(get_det(Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0)), -1.0);
    }

    #[test]
    fn circumcircle_center_is_equidistant() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(4.0, 0.0);
        let p3 = Point2::new(2.0, 3.0);
        let center = compute_circumcircle_center(p1, p2, p3);
        assert_abs_diff_eq!(center.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(center.y, 7.0 / 6.0, epsilon = 1e-12);
        let r = center.distance(p1);
        assert_abs_diff_eq!(center.distance(p2), r, epsilon = 1e-12);
        assert_abs_diff_eq!(center.distance(p3), r, epsilon = 1e-12);
    }
}
