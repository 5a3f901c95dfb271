//! Map surface, lifecycle and coordination.
//!
//! - [`MapSurface`] abstracts the map engine (style loading, images, layers,
//!   viewport animation). [`HeadlessSurface`] is the in-process
//!   implementation used by the CLI and tests.
//! - [`MapHandle`] exclusively owns a surface together with the marker
//!   renderer that mutates it.
//! - [`MapCoordinator`] drives the lifecycle and wires the station feed,
//!   position tracker and refresh trigger into the map.

mod coordinator;
mod handle;
mod headless;
mod icons;
mod surface;

pub use coordinator::{CoordinatorConfig, MapCoordinator, MapSources, MapState};
pub use handle::MapHandle;
pub use headless::{Camera, HeadlessSurface, ReadyHandle, SurfaceOp, SurfaceRegistry};
pub use icons::{icon_path, IconSet};
pub use surface::{
    MapOptions, MapSurface, ReadySignal, SurfaceError, DEFAULT_CENTER, DEFAULT_STYLE_URL,
    DEFAULT_ZOOM,
};
