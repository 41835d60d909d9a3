//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering and layout
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `table`: The branch table and pagination bar

pub mod input;
pub mod render;
pub mod styles;
pub mod table;
