//! Asset references found in embed syntax (images, drawings).

use serde::{Deserialize, Serialize};

/// An asset referenced by an embed in the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// What kind of asset this is
    pub kind: AssetKind,

    /// The raw embed text (e.g., `![[diagram.png|300]]`)
    pub embed: String,

    /// Filename with any directory prefix removed
    pub filename: String,
}

impl AssetReference {
    /// Create an image reference.
    pub fn image(embed: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Image,
            embed: embed.into(),
            filename: filename.into(),
        }
    }

    /// Create a drawing reference from the drawing's base name.
    ///
    /// `name` is the drawing name without the drawing extension, e.g.
    /// `Pendulum` for `Pendulum.excalidraw`.
    pub fn drawing(embed: impl Into<String>, name: &str, extension: &str) -> Self {
        let drawing = DrawingAsset::new(name, extension);
        Self {
            kind: AssetKind::Drawing(drawing.clone()),
            embed: embed.into(),
            filename: drawing.scene_file,
        }
    }

    /// Check if this is an image reference.
    pub fn is_image(&self) -> bool {
        matches!(self.kind, AssetKind::Image)
    }

    /// File name the LaTeX output refers to.
    pub fn output_filename(&self) -> &str {
        match &self.kind {
            AssetKind::Image => &self.filename,
            AssetKind::Drawing(drawing) => &drawing.rendered_file,
        }
    }
}

/// Asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssetKind {
    /// Raster image or PDF, included as-is
    Image,
    /// Vector drawing that must be exported and rasterized externally
    Drawing(DrawingAsset),
}

/// File names involved in rendering one drawing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawingAsset {
    /// Scene file the drawing tool stores (e.g., `Pendulum.excalidraw`)
    pub scene_file: String,

    /// Rasterized file the LaTeX output includes (e.g., `Pendulum.svg.png`)
    pub rendered_file: String,
}

impl DrawingAsset {
    /// Derive scene and rendered names from a drawing base name.
    pub fn new(name: &str, extension: &str) -> Self {
        Self {
            scene_file: format!("{}.{}", name, extension),
            rendered_file: format!("{}.svg.png", name),
        }
    }
}
