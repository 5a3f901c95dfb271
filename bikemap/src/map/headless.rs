//! In-process map surface without a renderer.
//!
//! `HeadlessSurface` keeps the image and layer registries a real map engine
//! would keep, and records every operation. Hosts without a graphical map
//! (the CLI) print from it, and tests inspect it through
//! [`HeadlessSurface::registry`].

use std::collections::BTreeMap;
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::surface::{MapOptions, MapSurface, ReadySignal, SurfaceError};
use crate::render::{LayerId, LayerKind, SymbolLayer};

/// One recorded surface operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Load(MapOptions),
    AddImage(String),
    AddLayer(LayerId, LayerKind),
    RemoveLayer(LayerId),
    FlyTo { center: [f64; 2], zoom: f64 },
}

/// Current viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: [f64; 2],
    pub zoom: f64,
}

/// Shared state of a headless surface.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    ready: bool,
    camera: Option<Camera>,
    images: BTreeMap<String, (u32, u32)>,
    layers: Vec<SymbolLayer>,
    ops: Vec<SurfaceOp>,
}

impl SurfaceRegistry {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn camera(&self) -> Option<Camera> {
        self.camera
    }

    /// Registered images with their dimensions.
    pub fn images(&self) -> &BTreeMap<String, (u32, u32)> {
        &self.images
    }

    /// Installed layers in installation order.
    pub fn layers(&self) -> &[SymbolLayer] {
        &self.layers
    }

    pub fn layers_of_kind(&self, kind: LayerKind) -> Vec<&SymbolLayer> {
        self.layers.iter().filter(|l| l.kind == kind).collect()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Layer additions and removals as `add <id>` / `remove <id>` lines.
    pub fn layer_ops(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::AddLayer(id, _) => Some(format!("add {}", id)),
                SurfaceOp::RemoveLayer(id) => Some(format!("remove {}", id)),
                _ => None,
            })
            .collect()
    }

    /// Number of viewport animations performed.
    pub fn fly_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::FlyTo { .. }))
            .count()
    }

    fn mark_ready(&mut self) {
        self.ready = true;
    }
}

/// Map surface holding its state in a shared [`SurfaceRegistry`].
pub struct HeadlessSurface {
    registry: Arc<Mutex<SurfaceRegistry>>,
    ready_tx: Option<oneshot::Sender<()>>,
    ready_rx: Option<ReadySignal>,
    manual: bool,
}

/// Fires the ready signal of a manually readied [`HeadlessSurface`].
pub struct ReadyHandle {
    registry: Arc<Mutex<SurfaceRegistry>>,
    tx: oneshot::Sender<()>,
}

impl ReadyHandle {
    /// Marks the surface ready and resolves its ready signal.
    pub fn fire(self) {
        self.registry.lock().mark_ready();
        let _ = self.tx.send(());
    }
}

impl HeadlessSurface {
    /// Creates a surface that becomes ready as soon as it is loaded.
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            registry: Arc::new(Mutex::new(SurfaceRegistry::default())),
            ready_tx: Some(tx),
            ready_rx: Some(rx),
            manual: false,
        }
    }

    /// Creates a surface whose readiness is controlled by the returned handle.
    pub fn with_manual_ready() -> (Self, ReadyHandle) {
        let (tx, rx) = oneshot::channel();
        let registry = Arc::new(Mutex::new(SurfaceRegistry::default()));
        let surface = Self {
            registry: Arc::clone(&registry),
            ready_tx: None,
            ready_rx: Some(rx),
            manual: true,
        };
        (surface, ReadyHandle { registry, tx })
    }

    /// Shared view of the surface state.
    pub fn registry(&self) -> Arc<Mutex<SurfaceRegistry>> {
        Arc::clone(&self.registry)
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for HeadlessSurface {
    fn load(&mut self, options: &MapOptions) -> ReadySignal {
        {
            let mut registry = self.registry.lock();
            registry.ops.push(SurfaceOp::Load(options.clone()));
            registry.camera = Some(Camera {
                center: options.center,
                zoom: options.zoom,
            });
            if !self.manual {
                registry.mark_ready();
            }
        }

        if let Some(tx) = self.ready_tx.take() {
            let _ = tx.send(());
        }

        // A second load gets a signal that never resolves successfully
        self.ready_rx
            .take()
            .unwrap_or_else(|| oneshot::channel().1)
    }

    fn add_image(&mut self, name: &str, image: &RgbaImage) -> Result<(), SurfaceError> {
        let mut registry = self.registry.lock();
        if !registry.ready {
            return Err(SurfaceError::NotReady);
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(SurfaceError::Image {
                name: name.to_string(),
                reason: "image is empty".to_string(),
            });
        }

        registry
            .images
            .insert(name.to_string(), (image.width(), image.height()));
        registry.ops.push(SurfaceOp::AddImage(name.to_string()));
        Ok(())
    }

    fn has_image(&self, name: &str) -> bool {
        self.registry.lock().images.contains_key(name)
    }

    fn add_layer(&mut self, layer: SymbolLayer) -> Result<(), SurfaceError> {
        let mut registry = self.registry.lock();
        if !registry.ready {
            return Err(SurfaceError::NotReady);
        }
        if registry.layers.iter().any(|l| l.id == layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id));
        }

        registry
            .ops
            .push(SurfaceOp::AddLayer(layer.id.clone(), layer.kind));
        registry.layers.push(layer);
        Ok(())
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        self.registry.lock().layers.iter().any(|l| &l.id == id)
    }

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), SurfaceError> {
        let mut registry = self.registry.lock();
        let before = registry.layers.len();
        registry.layers.retain(|l| &l.id != id);
        if registry.layers.len() == before {
            return Err(SurfaceError::UnknownLayer(id.clone()));
        }

        registry.ops.push(SurfaceOp::RemoveLayer(id.clone()));
        Ok(())
    }

    fn fly_to(&mut self, center: [f64; 2], zoom: f64) {
        let mut registry = self.registry.lock();
        registry.camera = Some(Camera { center, zoom });
        registry.ops.push(SurfaceOp::FlyTo { center, zoom });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::feature_collection;

    fn layer(id: &str) -> SymbolLayer {
        SymbolLayer::new(
            LayerId::from(id),
            LayerKind::AvailableStations,
            feature_collection(Vec::new()),
        )
    }

    #[tokio::test]
    async fn test_immediate_surface_ready_on_load() {
        let mut surface = HeadlessSurface::new();
        let ready = surface.load(&MapOptions::default());

        assert!(ready.await.is_ok());
        assert!(surface.registry().lock().is_ready());
        assert_eq!(
            surface.registry().lock().camera(),
            Some(Camera {
                center: [24.9414377, 60.1718441],
                zoom: 14.8
            })
        );
    }

    #[tokio::test]
    async fn test_manual_surface_rejects_layers_until_ready() {
        let (mut surface, handle) = HeadlessSurface::with_manual_ready();
        let ready = surface.load(&MapOptions::default());

        assert_eq!(surface.add_layer(layer("a")), Err(SurfaceError::NotReady));

        handle.fire();
        assert!(ready.await.is_ok());
        assert!(surface.add_layer(layer("a")).is_ok());
    }

    #[test]
    fn test_duplicate_and_unknown_layers() {
        let mut surface = HeadlessSurface::new();
        let _ready = surface.load(&MapOptions::default());

        surface.add_layer(layer("a")).unwrap();
        assert_eq!(
            surface.add_layer(layer("a")),
            Err(SurfaceError::DuplicateLayer(LayerId::from("a")))
        );
        assert_eq!(
            surface.remove_layer(&LayerId::from("b")),
            Err(SurfaceError::UnknownLayer(LayerId::from("b")))
        );
    }

    #[test]
    fn test_images_registered_after_ready() {
        let mut surface = HeadlessSurface::new();
        let icon = RgbaImage::new(8, 8);
        assert_eq!(surface.add_image("red", &icon), Err(SurfaceError::NotReady));

        let _ready = surface.load(&MapOptions::default());
        surface.add_image("red", &icon).unwrap();
        assert!(surface.has_image("red"));
        assert_eq!(surface.registry().lock().images().get("red"), Some(&(8, 8)));
    }

    #[test]
    fn test_fly_to_moves_camera() {
        let mut surface = HeadlessSurface::new();
        surface.fly_to([24.95, 60.17], 14.8);

        let registry = surface.registry();
        let registry = registry.lock();
        assert_eq!(registry.fly_count(), 1);
        assert_eq!(registry.camera().unwrap().center, [24.95, 60.17]);
    }
}
