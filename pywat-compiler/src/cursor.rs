//! Navigation interface over a concrete syntax tree.
//!
//! Tree lowering only ever sees a concrete tree through this trait, so any
//! parser that can expose its output as a cursor can be plugged in front of
//! the pipeline. The method set follows the shape of common incremental
//! parsing libraries: move to the first child, the next sibling or the
//! parent, and read the kind tag and byte range of the current node.
//!
//! Lowering functions that take a cursor promise to return with it on the
//! node they were entered on, whether they succeed or fail.

use std::ops::Range;

pub trait TreeCursor {
    /// Textual type tag of the current node, e.g. `"BinaryExpression"`.
    fn kind(&self) -> &str;

    /// Byte range of the current node in the source text.
    fn byte_range(&self) -> Range<usize>;

    /// Move to the first child. Returns `false` (and stays put) for leaves.
    fn goto_first_child(&mut self) -> bool;

    /// Move to the next sibling. Returns `false` (and stays put) on the last child.
    fn goto_next_sibling(&mut self) -> bool;

    /// Move to the parent. Returns `false` (and stays put) at the root.
    fn goto_parent(&mut self) -> bool;
}
