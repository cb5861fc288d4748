//! Step tag expansion.
//!
//! Scans a document for `<mk img src="a.png => b.png => c.png">` tags and
//! replaces each with a row of images joined by arrow glyphs:
//! - `StepTagDescriptor` - Path-list parsing
//! - `StepExpander` - Style injection, tag replacement, remote script bootstrap
//! - `placeholder_data_uri` - Embedded image swapped in on load failure
//!
//! # Example
//!
//! ```ignore
//! use step_core::StepConfig;
//! use step_dom::VirtualDocument;
//! use step_expander::StepExpander;
//!
//! let mut doc = VirtualDocument::new();
//! let expander = StepExpander::new(StepConfig::default());
//! expander.inject_style(&mut doc);
//! let summary = expander.parse_all_tags(&mut doc);
//! ```

mod descriptor;
mod expander;
mod placeholder;
mod style;

pub use descriptor::*;
pub use expander::*;
pub use placeholder::*;
pub use style::*;
