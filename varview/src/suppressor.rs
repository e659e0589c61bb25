//! PredicateSuppressor: keeps directive lines folded away from the cursor.
//!
//! Directive lines (`#ifdef X`, `#else`, `#endif`) are noise once their regions
//! are colored, so each tracked row is folded into the end of the line above
//! it. When the cursor steps onto a hidden row from an adjacent one, that row
//! is unfolded and the cursor is placed on it, clamped to the line's length.
//!
//! ```text
//!  row 4  int x;                 row 4  int x;
//!  row 5  #ifdef DEC   (hidden)  row 5  #ifdef DEC|  <- cursor moved down from 4
//!  row 6  x++;                   row 6  x++;
//! ```
//!
//! # States
//!
//! Every predicate is either [`Visibility::Hidden`] (a fold exists) or
//! [`Visibility::Shown`]. At most the predicate on the row the cursor was last
//! placed on is shown.
//!
//! # Re-entrancy
//!
//! Placing the cursor makes the host report another cursor move. The position
//! the suppressor asked for is remembered, and the event reporting exactly that
//! position is consumed without further action.

use crate::{
    coords::{FoldRange, Position},
    host::{FoldHost, FoldId, RowMarker, StyleHost, StyleSheetId},
    style::SUPPRESS_LINE_STYLESHEET,
};
use tracing::{debug, trace};

/// Cursor moved from `old` to `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMoved {
    pub old: Position,
    pub new: Position,
}

impl CursorMoved {
    pub fn new(old: Position, new: Position) -> Self {
        Self { old, new }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

/// What [`PredicateSuppressor::handle_cursor_moved`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorResponse {
    /// The event reported a position the suppressor placed the cursor at.
    Consumed,
    /// The cursor stayed on its row.
    SameRow,
    /// The cursor changed rows without reaching a hidden predicate.
    Moved,
    /// A predicate was revealed and the cursor placed on it.
    Revealed(Position),
}

struct Predicate<M> {
    marker: M,
    fold: Option<FoldId>,
}

impl<M: RowMarker> Predicate<M> {
    fn row(&self) -> u32 {
        self.marker.row()
    }

    fn visibility(&self) -> Visibility {
        match self.fold {
            Some(_) => Visibility::Hidden,
            None => Visibility::Shown,
        }
    }

    fn hide<H: FoldHost<Marker = M>>(&mut self, host: &mut H) {
        if self.fold.is_some() {
            return;
        }
        let row = self.row();
        match FoldRange::collapse_into_previous(row) {
            Some(range) => {
                trace!(row, "hide predicate");
                self.fold = Some(host.fold(range));
            }
            None => trace!(row, "predicate on first row stays shown"),
        }
    }

    fn show<H: FoldHost<Marker = M>>(&mut self, host: &mut H) {
        if let Some(fold) = self.fold.take() {
            trace!(row = self.row(), "show predicate");
            host.unfold(fold);
        }
    }
}

/// Tracks directive rows and folds them unless the cursor is on them.
pub struct PredicateSuppressor<M> {
    predicates: Vec<Predicate<M>>,
    expected: Option<Position>,
    stylesheet: Option<StyleSheetId>,
}

impl<M: RowMarker> PredicateSuppressor<M> {
    /// Create a suppressor and install the rule that hides fold placeholders.
    pub fn new<H: StyleHost>(host: &mut H) -> Self {
        Self {
            predicates: Vec::new(),
            expected: None,
            stylesheet: Some(host.add_stylesheet(SUPPRESS_LINE_STYLESHEET)),
        }
    }

    /// Start tracking `rows`, hiding each one. Rows already tracked are left as they are.
    pub fn add<H, I>(&mut self, host: &mut H, rows: I)
    where
        H: FoldHost<Marker = M>,
        I: IntoIterator<Item = u32>,
    {
        for row in rows {
            if self.find(row).is_some() {
                continue;
            }
            let mut predicate = Predicate {
                marker: host.mark_row(row),
                fold: None,
            };
            predicate.hide(host);
            self.predicates.push(predicate);
        }
    }

    /// Visibility of the predicate on `row`, or `None` if the row is not tracked.
    pub fn visibility(&self, row: u32) -> Option<Visibility> {
        self.predicates
            .iter()
            .find(|predicate| predicate.row() == row)
            .map(Predicate::visibility)
    }

    pub fn is_hidden(&self, row: u32) -> bool {
        self.visibility(row) == Some(Visibility::Hidden)
    }

    /// Tracked rows in ascending order.
    pub fn tracked_rows(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self.predicates.iter().map(Predicate::row).collect();
        rows.sort_unstable();
        rows
    }

    /// Rows whose predicate is currently shown.
    pub fn shown_rows(&self) -> Vec<u32> {
        let mut rows: Vec<u32> = self
            .predicates
            .iter()
            .filter(|predicate| predicate.visibility() == Visibility::Shown)
            .map(Predicate::row)
            .collect();
        rows.sort_unstable();
        rows
    }

    /// The position the suppressor last placed the cursor at, until the host reports it.
    pub fn expected_position(&self) -> Option<Position> {
        self.expected
    }

    /// React to the cursor moving.
    pub fn handle_cursor_moved<H: FoldHost<Marker = M>>(
        &mut self,
        host: &mut H,
        event: CursorMoved,
    ) -> CursorResponse {
        let CursorMoved { old, new } = event;

        if self.expected == Some(new) {
            trace!(%new, "consume self-placed cursor move");
            self.expected = None;
            return CursorResponse::Consumed;
        }

        if old.row == new.row {
            self.expected = None;
            return CursorResponse::SameRow;
        }

        if let Some(ix) = self.find(old.row) {
            self.predicates[ix].hide(host);
        }

        let expected = self.adjusted_position(host, old, new);
        if expected == new {
            self.expected = None;
            return CursorResponse::Moved;
        }

        debug!(%old, %new, %expected, "reveal predicate under cursor");
        self.expected = Some(expected);
        for predicate in &mut self.predicates {
            if predicate.row() != expected.row {
                predicate.hide(host);
            }
        }
        for predicate in &mut self.predicates {
            if predicate.row() == expected.row {
                predicate.show(host);
            }
        }
        host.set_cursor(expected);
        CursorResponse::Revealed(expected)
    }

    /// Where the cursor should land: on the predicate adjacent to `old` in the
    /// direction of travel, if there is one, else where it already is.
    fn adjusted_position<H: FoldHost<Marker = M>>(
        &self,
        host: &H,
        old: Position,
        new: Position,
    ) -> Position {
        let row = if new.row > old.row {
            old.row.checked_add(1)
        } else {
            old.row.checked_sub(1)
        };
        let Some(row) = row.filter(|row| self.find(*row).is_some()) else {
            return new;
        };
        Position::new(row, new.column.min(host.line_length(row)))
    }

    fn find(&self, row: u32) -> Option<usize> {
        self.predicates
            .iter()
            .position(|predicate| predicate.row() == row)
    }

    /// Release every fold, marker and the placeholder stylesheet.
    pub fn destroy<H>(&mut self, host: &mut H)
    where
        H: FoldHost<Marker = M> + StyleHost,
    {
        for mut predicate in self.predicates.drain(..) {
            predicate.show(host);
            predicate.marker.release();
        }
        if let Some(stylesheet) = self.stylesheet.take() {
            host.remove_stylesheet(stylesheet);
        }
        self.expected = None;
    }
}
