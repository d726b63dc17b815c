//! DGED tile-grid resolution.
//!
//! Turns a georeferenced elevation raster into the list of DGED output
//! tiles covering it: bounds with the one-sample overlap, sample spacing and
//! canonical file name for every tile.
//!
//! The pipeline runs leaf-first:
//!
//! 1. [`extent`]: native extent of the raster
//! 2. [`reference`]: output CRS (WGS84, or a UTM zone)
//! 3. [`bounds`]: extent reprojected to an output bounding box
//! 4. [`levels`]: tile size and spacing for the product level
//! 5. [`grid`]: tiles covering the bounding box
//! 6. [`naming`]: DGED file name of each tile
//!
//! [`TilePlan`] runs steps 1-4 once and yields named [`TileSpec`]s lazily.
//!
//! ```ignore
//! let info = geotiff_parser::GeoTiffInfo::from_file(path)?;
//! let plan = TilePlan::projected(&info, Level::L5, ZoneSelection::Autodetect, CornerPolicy::Diagonal)?;
//! for tile in plan.tiles(&ProductCodes::default()) {
//!     println!("{} {:?}", tile.basename, tile.bounds);
//! }
//! ```

pub mod bounds;
pub mod error;
pub mod extent;
pub mod grid;
pub mod levels;
pub mod naming;
pub mod plan;
pub mod reference;
pub mod source;

pub use bounds::CornerPolicy;
pub use error::{Result, TilingError};
pub use extent::RasterExtent;
pub use grid::{GridResolution, TileBounds, TileGrid};
pub use levels::{Level, LevelParams, Mode};
pub use naming::ProductCodes;
pub use plan::{TilePlan, TileSpec};
pub use reference::{OutputReference, ZoneSelection};
pub use source::{RasterInfo, RasterSource};
