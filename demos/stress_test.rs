use fortune_voronoi::BoundingBox;
use rand::Rng;

fn main() {
    for _ in 0..100 {
        let mut points: Vec<cgmath::Point2<f64>> = vec![];
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            points.push(cgmath::Point2::new(rng.gen(), rng.gen()));
        }

        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        fortune_voronoi::generate_diagram(&points, &bbox);
    }
}
