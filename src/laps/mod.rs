// Lap segmentation and lap-time statistics

pub mod grouping;
pub mod segmenter;
pub mod statistics;

pub use segmenter::segment_laps;
pub use statistics::LapStatistics;
