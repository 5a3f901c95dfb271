//! Marker icon images.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, warn};

use crate::render::MarkerIcon;

/// Decoded marker icons, ready to register with a map surface.
///
/// Icons that fail to load are left out. Layers referring to a missing icon
/// still render, just without that image.
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    icons: Vec<(MarkerIcon, RgbaImage)>,
}

impl IconSet {
    /// An icon set with no images.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `red.png`, `yellow.png` and `white.png` from `directory`.
    pub fn load(directory: &Path) -> Self {
        let mut set = Self::empty();

        for icon in MarkerIcon::ALL {
            let path = directory.join(icon.file_name());
            match load_icon(&path) {
                Ok(image) => {
                    debug!(icon = icon.name(), path = %path.display(), "Loaded marker icon");
                    set.insert(icon, image);
                }
                Err(e) => {
                    warn!(
                        icon = icon.name(),
                        path = %path.display(),
                        error = %e,
                        "Failed to load marker icon"
                    );
                }
            }
        }

        set
    }

    /// Add or replace an icon.
    pub fn insert(&mut self, icon: MarkerIcon, image: RgbaImage) {
        self.icons.retain(|(existing, _)| *existing != icon);
        self.icons.push((icon, image));
    }

    pub fn get(&self, icon: MarkerIcon) -> Option<&RgbaImage> {
        self.icons
            .iter()
            .find(|(existing, _)| *existing == icon)
            .map(|(_, image)| image)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarkerIcon, &RgbaImage)> {
        self.icons.iter().map(|(icon, image)| (*icon, image))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

/// Path of an icon inside a directory.
pub fn icon_path(directory: &Path, icon: MarkerIcon) -> PathBuf {
    directory.join(icon.file_name())
}

fn load_icon(path: &Path) -> Result<RgbaImage, image::ImageError> {
    Ok(image::open(path)?.to_rgba8())
}
