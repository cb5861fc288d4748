//! Public SDK for the step image parser.
//!
//! This crate re-exports the expander, the offline worker and their
//! supporting types:
//!
//! ```ignore
//! use step_sdk::prelude::*;
//!
//! let mut doc = VirtualDocument::new();
//! let body = doc.body();
//! doc.append_element(body, "mk", &[("img", ""), ("src", "1.png => 2.png")]);
//!
//! let expander = StepExpander::from_global();
//! expander.init_once(&mut doc);
//! println!("{}", doc.to_html());
//! ```

pub use step_cache;
pub use step_core;
pub use step_dom;
pub use step_expander;
pub use step_observability;
pub use step_worker;

/// Prelude for convenient imports.
pub mod prelude {
    pub use step_cache::*;
    pub use step_core::*;
    pub use step_dom::*;
    pub use step_expander::*;
    pub use step_observability::*;
    pub use step_worker::*;
}
