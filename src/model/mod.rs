//! Data model for notes being converted.
//!
//! Every value here is created and consumed within a single conversion;
//! only [`Metadata`] and the asset types reach the caller through
//! [`crate::ConvertResult`].

mod asset;
mod document;
mod region;

pub use asset::{AssetKind, AssetReference, DrawingAsset};
pub use document::{DeletionSet, Document, Metadata};
pub use region::{in_any_region, MathRegion, TableBlock};
