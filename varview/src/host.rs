//! Capabilities the engine consumes from the host editor.
//!
//! The engine never reaches into editor internals. Every operation that needs
//! the editor receives it explicitly as one of these traits, which keeps the
//! forest and the suppressor free of global state and lets tests and the CLI
//! run against [`MemoryHost`](crate::MemoryHost).
//!
//! ```text
//! Decorator  -> Annotation   (line decorations backing forest nodes)
//! FoldHost   -> RowMarker    (directive rows), FoldId (collapsed ranges)
//! StyleHost  -> StyleSheetId (installed stylesheet text)
//! ```

use crate::{FoldRange, Interval, Position};

/// A rendered line annotation backing one [`DecorationNode`](crate::DecorationNode).
pub trait Annotation {
    /// Current row range. Hosts track this across edits.
    fn range(&self) -> Interval;

    /// Replace the class name the annotation renders with.
    fn attach_class(&mut self, class_name: &str);

    /// Remove the annotation from the display and free its marker.
    fn release(self);
}

/// Creates annotations for the forest.
pub trait Decorator {
    type Annotation: Annotation;

    fn decorate(&mut self, interval: Interval, class_name: &str) -> Self::Annotation;
}

/// A persistent marker on one row that follows the row through edits.
pub trait RowMarker {
    fn row(&self) -> u32;

    fn release(self);
}

/// Handle to a fold created through [`FoldHost::fold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FoldId(pub u64);

/// Folding, row markers and cursor control.
pub trait FoldHost {
    type Marker: RowMarker;

    fn mark_row(&mut self, row: u32) -> Self::Marker;

    fn fold(&mut self, range: FoldRange) -> FoldId;

    /// Release a fold. Unknown ids are ignored.
    fn unfold(&mut self, id: FoldId);

    /// Length of `row` in columns.
    fn line_length(&self, row: u32) -> u32;

    /// Move the cursor. The host reports the move back through its usual
    /// cursor-changed notification.
    fn set_cursor(&mut self, position: Position);
}

/// Handle to a stylesheet installed through [`StyleHost::add_stylesheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleSheetId(pub u64);

pub trait StyleHost {
    fn add_stylesheet(&mut self, source: &str) -> StyleSheetId;

    fn remove_stylesheet(&mut self, id: StyleSheetId);
}

/// Everything a [`VariationalSession`](crate::VariationalSession) needs.
pub trait Host: Decorator + FoldHost + StyleHost {}

impl<T: Decorator + FoldHost + StyleHost> Host for T {}
