//! Text-level scanning: code protection, parameter lists, macro splitting and
//! inline-macro extraction. Nothing in here knows about concrete macro types.

pub mod guard;
pub mod inline;
pub mod params;
pub mod splitter;

pub use guard::{protect, restore, Fence, Guarded, ProtectedBlock};
pub use inline::{extract, Extracted};
pub use params::{parse_params, ParamMap, ParamValue, POSITIONAL_KEY};
pub use splitter::{split, RawMacroBlock, Segment};
