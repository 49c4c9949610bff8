//! Image and drawing embeds.
//!
//! Embeds are rewritten into figure blocks and collected as
//! [`AssetReference`]s. Nothing here touches the filesystem; resolving the
//! names against a vault is done by [`crate::vault`].

use regex::{Captures, Regex};

use super::ConvertOptions;
use crate::model::AssetReference;

/// Matches embed syntax for the configured image and drawing extensions.
#[derive(Debug, Clone)]
pub struct AssetMatcher {
    image: Option<Regex>,
    drawing: Option<Regex>,
    drawing_extension: String,
    figure_width: f32,
}

impl AssetMatcher {
    /// Build matchers from conversion options.
    pub fn new(options: &ConvertOptions) -> Self {
        let image = if options.image_extensions.is_empty() {
            None
        } else {
            let alternatives = options
                .image_extensions
                .iter()
                .map(|ext| regex::escape(ext))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(
                r"!\[\[(?P<path>[^\]|]*?\.(?i:{}))(?:\|[^\]]*)?\]\]",
                alternatives
            ))
            .ok()
        };

        let drawing = if options.drawing_extension.is_empty() {
            None
        } else {
            Regex::new(&format!(
                r"!\[\[(?P<path>[^\]|]*?)\.(?i:{})[^\]|]*(?:\|[^\]]*)?\]\]",
                regex::escape(&options.drawing_extension)
            ))
            .ok()
        };

        Self {
            image,
            drawing,
            drawing_extension: options.drawing_extension.clone(),
            figure_width: options.figure_width,
        }
    }

    /// Check if a line embeds an image.
    pub fn is_image_embed(&self, line: &str) -> bool {
        self.image.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Check if a line embeds a drawing.
    pub fn is_drawing_embed(&self, line: &str) -> bool {
        self.drawing.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Rewrite every image embed in `line` into a figure block.
    pub fn rewrite_images(&self, line: &str, found: &mut Vec<AssetReference>) -> String {
        let Some(re) = &self.image else {
            return line.to_string();
        };

        re.replace_all(line, |caps: &Captures| {
            let filename = basename(&caps["path"]);
            let asset = AssetReference::image(&caps[0], filename);
            let figure = self.figure(asset.output_filename());
            found.push(asset);
            figure
        })
        .into_owned()
    }

    /// Rewrite every drawing embed in `line` into a figure block that
    /// includes the rendered drawing.
    pub fn rewrite_drawings(&self, line: &str, found: &mut Vec<AssetReference>) -> String {
        let Some(re) = &self.drawing else {
            return line.to_string();
        };

        re.replace_all(line, |caps: &Captures| {
            let name = basename(&caps["path"]);
            let asset = AssetReference::drawing(&caps[0], name, &self.drawing_extension);
            let figure = self.figure(asset.output_filename());
            found.push(asset);
            figure
        })
        .into_owned()
    }

    fn figure(&self, filename: &str) -> String {
        format!(
            "\\begin{{figure}}[h]\\includegraphics[width={}\\textwidth]{{{}}}\\centering\\end{{figure}}",
            self.figure_width, filename
        )
    }
}

/// Strip any directory prefix up to the last path separator.
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path).trim()
}
