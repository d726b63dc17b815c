//! Coordinate reference system transformations.
//!
//! Implements the Transverse Mercator projection from scratch for the UTM
//! output systems and falls back to proj4rs for any other EPSG code. Both
//! sit behind a [`Transformer`] keyed by [`dged_common::CrsCode`]s.

pub mod ellipsoid;
pub mod transform;
pub mod transverse_mercator;

pub use ellipsoid::Ellipsoid;
pub use transform::{ProjectionError, Transformer};
pub use transverse_mercator::TransverseMercator;
