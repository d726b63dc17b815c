//! Bounding box of a raster extent in the output reference.

use dged_common::BoundingBox;
use projection::Transformer;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TilingError};
use crate::extent::RasterExtent;

/// Which transformed corners span the output box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerPolicy {
    /// Lower-left and upper-right only. Matches historical DGED output but
    /// can clip rasters whose edges curve in the output projection.
    #[default]
    Diagonal,
    /// All four corners.
    AllCorners,
}

/// Transform the extent corners and take the axis-aligned box around them.
pub fn transform_bounds(
    extent: &RasterExtent,
    transformer: &Transformer,
    policy: CornerPolicy,
) -> Result<BoundingBox> {
    let [ll, ul, ur, lr] = extent.corners();
    let corners = match policy {
        CornerPolicy::Diagonal => vec![ll, ur],
        CornerPolicy::AllCorners => vec![ll, ul, ur, lr],
    };

    let transformed = transformer.transform_points(&corners)?;
    let Some(bbox) = BoundingBox::from_points(&transformed) else {
        return Err(TilingError::DegenerateBoundingBox(extent.bbox));
    };
    if bbox.is_degenerate() {
        return Err(TilingError::DegenerateBoundingBox(bbox));
    }

    debug!(
        %bbox,
        from = %transformer.source_crs(),
        to = %transformer.target_crs(),
        ?policy,
        "Output bounding box"
    );
    Ok(bbox)
}
