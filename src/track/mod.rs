// Reference track model built from one lap

pub mod baseline;
pub mod segments;

pub use baseline::{
    Baseline, BaselineLocation, TrackCorner, TurnDirection, build_baseline,
    build_baseline_for_lap, build_baseline_with, select_reference_lap,
};
pub use segments::SegmentClass;
