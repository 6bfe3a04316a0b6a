use cgmath::Point2;
use fortune_voronoi::{generate_diagram, BoundingBox};
use log::{info, Level, LevelFilter, Metadata, Record, SetLoggerError};

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug))
}

fn main() {
    init().expect("Failed to initialise logger");

    let points = vec![
        Point2::new(0.7, 0.5),
        Point2::new(0.2, 0.2),
        Point2::new(0.4, 0.3),
        Point2::new(0.8, 0.9),
    ];
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);

    let diagram = generate_diagram(&points, &bbox);

    info!(
        "diagram of {} sites: {} vertices, {} half edges, {} segments",
        diagram.get_site_count(),
        diagram.get_vertex_count(),
        diagram.get_half_edge_count(),
        diagram.get_edge_segments().len()
    );
    for face in 0..diagram.get_site_count() {
        info!("cell {} area {:.4}", face, diagram.get_face_area(face));
    }
}
