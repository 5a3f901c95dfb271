//! Terminal map surface.
//!
//! Wraps a [`HeadlessSurface`] and prints every change so a session can be
//! followed without a graphical map.

use std::sync::Arc;

use bikemap::map::{
    HeadlessSurface, MapOptions, MapSurface, ReadySignal, SurfaceError, SurfaceRegistry,
};
use bikemap::render::{LayerId, LayerKind, SymbolLayer};
use console::style;
use image::RgbaImage;
use parking_lot::Mutex;

/// Map surface that echoes layer and viewport changes to stdout.
pub struct TerminalSurface {
    inner: HeadlessSurface,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            inner: HeadlessSurface::new(),
        }
    }

    pub fn registry(&self) -> Arc<Mutex<SurfaceRegistry>> {
        self.inner.registry()
    }
}

impl MapSurface for TerminalSurface {
    fn load(&mut self, options: &MapOptions) -> ReadySignal {
        println!(
            "{} {} centred on {:.5}, {:.5} at zoom {}",
            style("map").cyan().bold(),
            options.style_url,
            options.center[1],
            options.center[0],
            options.zoom
        );
        self.inner.load(options)
    }

    fn add_image(&mut self, name: &str, image: &RgbaImage) -> Result<(), SurfaceError> {
        self.inner.add_image(name, image)
    }

    fn has_image(&self, name: &str) -> bool {
        self.inner.has_image(name)
    }

    fn add_layer(&mut self, layer: SymbolLayer) -> Result<(), SurfaceError> {
        let line = describe_layer(&layer);
        self.inner.add_layer(layer)?;
        println!("{}", line);
        Ok(())
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        self.inner.has_layer(id)
    }

    fn remove_layer(&mut self, id: &LayerId) -> Result<(), SurfaceError> {
        self.inner.remove_layer(id)
    }

    fn fly_to(&mut self, center: [f64; 2], zoom: f64) {
        println!(
            "{} flying to {:.5}, {:.5} (zoom {})",
            style("map").cyan().bold(),
            center[1],
            center[0],
            zoom
        );
        self.inner.fly_to(center, zoom);
    }
}

fn describe_layer(layer: &SymbolLayer) -> String {
    let count = layer.feature_count();
    match layer.kind {
        LayerKind::CurrentLocation => {
            format!("{} current location updated", style("●").red())
        }
        LayerKind::AvailableStations => format!(
            "{} {} stations with bikes",
            style("●").yellow(),
            style(count).bold()
        ),
        LayerKind::UnavailableStations => format!(
            "{} {} stations without bikes",
            style("○").white(),
            style(count).bold()
        ),
    }
}
