//! Render-target primitives for DOM-coupled side effects.
//!
//! This crate provides:
//! - `RenderTarget` - The capability interface expansion logic runs against
//! - `Selector` - Tag-plus-attribute matching (`mk[img][src]`)
//! - `EventHandler` / `DomEvent` - Listener registration
//! - `VirtualDocument` - In-memory document with event dispatch and HTML output

mod document;
mod event;
mod selector;
mod target;

pub use document::*;
pub use event::*;
pub use selector::*;
pub use target::*;
