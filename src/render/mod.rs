//! Rendering of converted notes: inline substitution, templates, JSON.

mod inline;
mod json;
mod result;
mod template;

pub use inline::{escape_ampersands, render_inline};
pub use json::{to_json, JsonFormat};
pub use result::ConvertStats;
pub use template::{Template, TemplateVars};
