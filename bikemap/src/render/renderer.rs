//! Per-kind layer replacement.

use geojson::Feature;
use thiserror::Error;
use tracing::{debug, warn};

use super::features::feature_collection;
use super::layer::{LayerId, LayerIdGenerator, LayerKind, SymbolLayer};
use crate::map::{MapSurface, SurfaceError};

/// Errors that can occur while installing a layer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface rejected the new layer; the previous one is kept.
    #[error("failed to add {kind} layer: {source}")]
    AddLayer {
        kind: LayerKind,
        #[source]
        source: SurfaceError,
    },
}

/// Installed-layer state for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayerSlot {
    #[default]
    Empty,
    Active(LayerId),
}

impl LayerSlot {
    pub fn active_id(&self) -> Option<&LayerId> {
        match self {
            LayerSlot::Empty => None,
            LayerSlot::Active(id) => Some(id),
        }
    }
}

/// Installs marker layers, keeping one layer per [`LayerKind`].
///
/// Each render adds a new uniquely named layer and only then removes the
/// previous layer of the same kind, so the markers never disappear between
/// updates. Kinds are tracked independently.
#[derive(Debug, Default)]
pub struct MarkerRenderer {
    slots: [LayerSlot; 3],
    ids: LayerIdGenerator,
}

impl MarkerRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the layer of `kind` with one holding `features`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::AddLayer`] if the surface rejects the new
    /// layer. The slot then still points at the previous layer.
    pub fn render(
        &mut self,
        surface: &mut dyn MapSurface,
        kind: LayerKind,
        features: Vec<Feature>,
    ) -> Result<LayerId, RenderError> {
        let id = self.ids.next(kind);
        let feature_count = features.len();
        let layer = SymbolLayer::new(id.clone(), kind, feature_collection(features));

        surface
            .add_layer(layer)
            .map_err(|source| RenderError::AddLayer { kind, source })?;

        let slot = &mut self.slots[kind.index()];
        let previous = std::mem::replace(slot, LayerSlot::Active(id.clone()));

        if let LayerSlot::Active(previous) = previous {
            if surface.has_layer(&previous) {
                if let Err(e) = surface.remove_layer(&previous) {
                    warn!(layer = %previous, error = %e, "Failed to remove replaced layer");
                }
            }
        }

        debug!(kind = %kind, layer = %id, features = feature_count, "Layer installed");
        Ok(id)
    }

    /// Current state of the given kind.
    pub fn slot(&self, kind: LayerKind) -> &LayerSlot {
        &self.slots[kind.index()]
    }

    /// Identifier of the active layer of the given kind.
    pub fn active_layer(&self, kind: LayerKind) -> Option<&LayerId> {
        self.slot(kind).active_id()
    }
}
