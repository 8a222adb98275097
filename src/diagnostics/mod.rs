//! Diagnostics: turning nmstatectl failures into status messages
//!
//! - [`classifier`] decides which lines of the tool output are noise.
//! - [`normalizer`] builds the indented status message.
//! - [`codec`] keeps a compressed copy of the original output.

pub mod classifier;
pub mod codec;
pub mod normalizer;

pub use classifier::{classify, next_kept, LineClass};
pub use normalizer::{normalize, original_message, NormalizedMessage};
