//! Map rendering surface interface.

use image::RgbaImage;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::render::{LayerId, SymbolLayer};

/// Default map style.
pub const DEFAULT_STYLE_URL: &str = "mapbox://styles/mapbox/outdoors-v10";

/// Default viewport center (Helsinki city centre) as `[longitude, latitude]`.
pub const DEFAULT_CENTER: [f64; 2] = [24.9414377, 60.1718441];

/// Zoom used both for the initial viewport and when following the position.
pub const DEFAULT_ZOOM: f64 = 14.8;

/// Resolves once the surface has loaded its style and tiles.
///
/// A dropped sender means the surface will never become ready.
pub type ReadySignal = oneshot::Receiver<()>;

/// Options used to construct the map viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub style_url: String,
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            style_url: DEFAULT_STYLE_URL.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Errors returned by a map surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// Layer or image operation before the surface signalled ready.
    #[error("map surface is not ready")]
    NotReady,

    /// A layer with this identifier already exists.
    #[error("layer {0} already exists")]
    DuplicateLayer(LayerId),

    /// No layer with this identifier exists.
    #[error("layer {0} does not exist")]
    UnknownLayer(LayerId),

    /// The surface rejected an icon image.
    #[error("image {name} rejected: {reason}")]
    Image { name: String, reason: String },
}

/// The map rendering surface.
///
/// Implementations wrap a concrete map engine. All layer and image
/// operations are only valid after the [`ReadySignal`] returned by
/// [`load`](Self::load) has resolved.
pub trait MapSurface: Send {
    /// Construct the viewport and start loading style and tiles.
    fn load(&mut self, options: &MapOptions) -> ReadySignal;

    /// Register an icon image under `name`.
    fn add_image(&mut self, name: &str, image: &RgbaImage) -> Result<(), SurfaceError>;

    fn has_image(&self, name: &str) -> bool;

    /// Install a symbol layer.
    fn add_layer(&mut self, layer: SymbolLayer) -> Result<(), SurfaceError>;

    fn has_layer(&self, id: &LayerId) -> bool;

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), SurfaceError>;

    /// Animate the viewport to `center` (`[longitude, latitude]`) at `zoom`.
    fn fly_to(&mut self, center: [f64; 2], zoom: f64);
}
