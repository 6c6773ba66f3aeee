//! Per-element UI state: hover, selection and inline text editing.
//!
//! Elements stay pure data. The widget layer tracks which one the pointer is
//! over, which one is selected and which one is hidden behind a text editor.

mod manager;
mod state;

pub use manager::{TextEdit, WidgetManager};
pub use state::WidgetState;
