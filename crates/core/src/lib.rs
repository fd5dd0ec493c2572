//! Core domain types, geometry, and text matching for patching a
//! presentation deck.

pub mod error;
pub mod geometry;
pub mod style;
pub mod text;

pub use error::{Error, Result};
pub use geometry::{Emu, Rect};
pub use style::{Align, Color, TextStyle};
