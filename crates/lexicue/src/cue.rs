//! The target CUE expression tree and its textual rendering.

pub mod ast;
pub mod format;
