//! Viewport configuration and coverage types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the geometry engine and its configuration.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The viewport configuration is missing required parameters.
    #[error("invalid viewport configuration: {0}")]
    InvalidConfig(String),

    /// The external engine could not be initialized.
    #[error("geometry engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Setting the viewing orientation on the engine failed.
    #[error("failed to set viewing orientation: {0}")]
    SetOrientation(String),

    /// The engine's region-computation step failed.
    #[error("viewport region computation failed: {0}")]
    ComputeRegion(String),

    /// Reading the coverage descriptor back from the engine failed.
    #[error("failed to read content coverage: {0}")]
    ReadCoverage(String),
}

/// A spherical content coverage region: centre plus extent, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentCoverage {
    /// Azimuth of the region centre.
    pub centre_azimuth: f64,
    /// Elevation of the region centre.
    pub centre_elevation: f64,
    /// Azimuthal extent of the region.
    pub azimuth_range: f64,
    /// Elevation extent of the region.
    pub elevation_range: f64,
}

impl ContentCoverage {
    /// Create a coverage region from centre and extent.
    pub fn new(
        centre_azimuth: f64,
        centre_elevation: f64,
        azimuth_range: f64,
        elevation_range: f64,
    ) -> Self {
        Self {
            centre_azimuth,
            centre_elevation,
            azimuth_range,
            elevation_range,
        }
    }

    /// Planar Euclidean distance between this region's centre and another's.
    ///
    /// With equal ranges across regions, centre distance alone ranks overlap.
    pub fn centre_distance(&self, other: &Self) -> f64 {
        let da = self.centre_azimuth - other.centre_azimuth;
        let de = self.centre_elevation - other.centre_elevation;
        (da * da + de * de).sqrt()
    }
}

/// Per-resolution tile layout for planar-tiled sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Full frame width in pixels at this resolution.
    pub frame_width: u32,
    /// Full frame height in pixels at this resolution.
    pub frame_height: u32,
    /// Width of one tile in pixels.
    pub tile_width: u32,
    /// Height of one tile in pixels.
    pub tile_height: u32,
    /// Quality ranking of this resolution (1 = highest).
    pub quality_rank: u32,
}

/// Source-video-to-sphere mapping and its tiling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Equirectangular projection with a uniform tile grid.
    Equirectangular { tile_rows: u32, tile_cols: u32 },
    /// Cubemap projection; rows/cols describe the per-face tile grid.
    Cubemap { tile_rows: u32, tile_cols: u32 },
    /// Planar (untiled sphere) sources with per-resolution tile descriptors.
    PlanarTiled { resolutions: Vec<TileGrid> },
}

/// Viewport configuration, immutable after `configure_viewport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Horizontal field of view in degrees.
    pub horizontal_fov_deg: f64,
    /// Vertical field of view in degrees.
    pub vertical_fov_deg: f64,
    /// Projection kind and tiling parameters.
    pub projection: Projection,
}

impl ViewportConfig {
    /// Validate required parameters for the configured projection kind.
    ///
    /// Equirectangular and cubemap sources need non-zero FOVs and dimensions;
    /// planar-tiled sources need non-zero dimensions and at least one tile
    /// descriptor instead of FOVs.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.width == 0 || self.height == 0 {
            return Err(GeometryError::InvalidConfig(
                "viewport dimensions must be non-zero".into(),
            ));
        }

        match &self.projection {
            Projection::Equirectangular { .. } | Projection::Cubemap { .. } => {
                if self.horizontal_fov_deg <= 0.0 || self.vertical_fov_deg <= 0.0 {
                    return Err(GeometryError::InvalidConfig(
                        "field of view must be non-zero".into(),
                    ));
                }
            }
            Projection::PlanarTiled { resolutions } => {
                if resolutions.is_empty() {
                    return Err(GeometryError::InvalidConfig(
                        "planar-tiled sources need at least one tile descriptor".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Startup information reported by the headset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadsetInfo {
    /// Initial viewing yaw in degrees.
    pub initial_yaw_deg: f64,
    /// Initial viewing pitch in degrees.
    pub initial_pitch_deg: f64,
}
