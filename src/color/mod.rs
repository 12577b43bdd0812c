//! Part colors and color matching

pub mod matcher;

pub use matcher::{ColorEntry, ColorMatcher, ColorTable};
