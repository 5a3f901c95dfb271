//! Exclusively owned map surface handle.

use geojson::Feature;
use tracing::{debug, info, warn};

use super::icons::IconSet;
use super::surface::{MapOptions, MapSurface, ReadySignal};
use crate::render::{LayerId, LayerKind, MarkerRenderer, RenderError};

/// Owns the map surface and the renderer that mutates it.
///
/// Once [`detach`](Self::detach) is called the surface is gone and every
/// operation becomes a no-op, so callbacks that arrive after teardown
/// cannot touch a discarded map.
pub struct MapHandle<S> {
    surface: Option<S>,
    renderer: MarkerRenderer,
}

impl<S: MapSurface> MapHandle<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface: Some(surface),
            renderer: MarkerRenderer::new(),
        }
    }

    /// Start loading the surface.
    pub fn load(&mut self, options: &MapOptions) -> Option<ReadySignal> {
        let surface = self.surface.as_mut()?;
        Some(surface.load(options))
    }

    /// Register every icon in the set; returns how many were accepted.
    pub fn register_icons(&mut self, icons: &IconSet) -> usize {
        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };

        let mut registered = 0;
        for (icon, image) in icons.iter() {
            if surface.has_image(icon.name()) {
                continue;
            }
            match surface.add_image(icon.name(), image) {
                Ok(()) => registered += 1,
                Err(e) => warn!(icon = icon.name(), error = %e, "Failed to register marker icon"),
            }
        }

        info!(registered, available = icons.len(), "Marker icons registered");
        registered
    }

    /// Replace the layer of `kind`.
    ///
    /// Returns `None` when the surface has been detached.
    pub fn render(
        &mut self,
        kind: LayerKind,
        features: Vec<Feature>,
    ) -> Option<Result<LayerId, RenderError>> {
        let Some(surface) = self.surface.as_mut() else {
            debug!(kind = %kind, "Render skipped, map detached");
            return None;
        };
        Some(self.renderer.render(surface, kind, features))
    }

    /// Animate the viewport; returns `false` when detached.
    pub fn fly_to(&mut self, center: [f64; 2], zoom: f64) -> bool {
        match self.surface.as_mut() {
            Some(surface) => {
                surface.fly_to(center, zoom);
                true
            }
            None => false,
        }
    }

    pub fn active_layer(&self, kind: LayerKind) -> Option<&LayerId> {
        self.renderer.active_layer(kind)
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    /// Release the surface.
    pub fn detach(&mut self) -> Option<S> {
        self.surface.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeadlessSurface;
    use crate::render::MarkerIcon;
    use image::RgbaImage;

    #[test]
    fn test_detached_handle_ignores_operations() {
        let surface = HeadlessSurface::new();
        let registry = surface.registry();
        let mut handle = MapHandle::new(surface);
        let _ready = handle.load(&MapOptions::default());

        assert!(handle.detach().is_some());
        assert!(!handle.is_attached());
        assert!(handle.render(LayerKind::AvailableStations, Vec::new()).is_none());
        assert!(!handle.fly_to([24.9, 60.1], 14.8));
        assert!(handle.load(&MapOptions::default()).is_none());

        // Only the initial load reached the surface
        assert_eq!(registry.lock().ops().len(), 1);
    }

    #[test]
    fn test_icons_registered_once() {
        let mut handle = MapHandle::new(HeadlessSurface::new());
        let _ready = handle.load(&MapOptions::default());

        let mut icons = IconSet::empty();
        icons.insert(MarkerIcon::Red, RgbaImage::new(2, 2));
        icons.insert(MarkerIcon::Yellow, RgbaImage::new(2, 2));

        assert_eq!(handle.register_icons(&icons), 2);
        assert_eq!(handle.register_icons(&icons), 0);
    }

    #[test]
    fn test_rejected_icon_does_not_stop_others() {
        let mut handle = MapHandle::new(HeadlessSurface::new());
        let _ready = handle.load(&MapOptions::default());

        let mut icons = IconSet::empty();
        icons.insert(MarkerIcon::Red, RgbaImage::new(0, 0));
        icons.insert(MarkerIcon::White, RgbaImage::new(2, 2));

        assert_eq!(handle.register_icons(&icons), 1);
    }
}
