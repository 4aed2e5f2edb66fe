// Corner analysis: cross-lap matching, apex/exit windows and kinematic features

pub mod apex;
pub mod features;
pub mod matcher;
pub mod reference;

pub use apex::{ApexExit, detect_apex_exit};
pub use features::{CornerFeature, CornerWindow, KinematicFeatures, extract_features};
pub use matcher::{LapTrack, LapTrackCache, query_corner, query_corner_cached};
pub use reference::{ReferenceLap, reference_corners};
