pub mod cadence;
pub mod direction;

pub use cadence::{CadenceClassifier, CadenceState};
pub use direction::{Direction, DirectionEstimator};
