//! PPTX (Office Open XML) package reading and slide editing.
//!
//! A `.pptx` file is a ZIP archive of XML parts. [`PptxPackage`] loads the
//! whole archive into memory and handles the package-level bookkeeping
//! (relationships, content types, slide ids). [`SlideShapes`] reads shape
//! text, geometry, and first-run styles out of a slide part, and
//! [`SlideEditor`] inserts new shapes by patching the slide's `p:spTree`.
//! Parts that are never edited round-trip byte-for-byte.

pub mod edit;
pub mod inspect;
pub mod package;
pub(crate) mod xmlutil;

pub use edit::SlideEditor;
pub use inspect::{Shape, SlideShapes};
pub use package::{ImageFormat, PptxPackage};

#[cfg(test)]
pub(crate) mod testutil;
