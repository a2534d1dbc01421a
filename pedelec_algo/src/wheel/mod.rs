pub mod speed_estimator;

pub use speed_estimator::SpeedEstimator;
