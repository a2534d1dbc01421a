pub mod edge_detector;
pub mod phase_timer;

pub use edge_detector::{EdgeDetector, EdgeEvent, EdgeLatch};
pub use phase_timer::PhaseTimer;
