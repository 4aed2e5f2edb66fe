// Planar geometry of GPS traces

pub mod curvature;
pub mod projection;
pub mod smoothing;
pub mod spatial_index;

pub use curvature::{
    cumulative_arc_length, curvature, offset_boundaries, segment_lengths, signed_curvature,
};
pub use projection::{GeoPoint, PlanarPoint, Projector, sample_position};
pub use smoothing::{Identity, SavitzkyGolay, Smoother};
pub use spatial_index::{Nearest, PointIndex};
