//! Coordinate reference system transformations.
//!
//! Implements the projections behind the MapML tiled CRSs from scratch
//! without external dependencies, plus sampled reprojection of bounding
//! boxes between them.

pub mod ellipsoid;
pub mod geographic;
pub mod lambert;
pub mod mercator;
pub mod polar;
pub mod transform;

pub use ellipsoid::Ellipsoid;
pub use geographic::Geographic;
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use polar::PolarStereographic;
pub use transform::{
    projection_for, transform_point, BoundsProjector, Projection, ProjectionError,
    SampledReprojector,
};
