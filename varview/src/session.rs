//! VariationalSession: keeps one document's decorations, colors, folds and
//! directive suppression in step with its parse tree.
//!
//! Every reparse goes through [`VariationalSession::resync`], which is a mark
//! and sweep over the forest and the palette followed by a fresh stylesheet:
//!
//! ```text
//! unmark forest, palette
//!   for each choice (parents first):
//!     palette.register(name)
//!     forest.add_decoration(then branch)       re-marks unchanged branches
//!     forest.add_decoration(else branch)       only if the else branch has lines
//!     predicates.add(directive rows)           #ifdef / #else / #endif
//! sweep forest, palette
//! regenerate stylesheet
//! ```

use crate::{
    color::Rgb,
    coords::FoldRange,
    forest::{BranchCondition, DecorationForest, ForestError},
    host::{FoldHost, FoldId, Host, StyleHost, StyleSheetId},
    interval::{Interval, IntervalError},
    palette::Palette,
    style::{generate_stylesheet, StyleConfig, StyleError},
    suppressor::{CursorMoved, CursorResponse, PredicateSuppressor},
    tree::{Choice, Region, Span},
    Config,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use snafu::{ResultExt, Snafu};
use tracing::{debug, trace, warn};

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("Failed to place branch of dimension {dimension}"))]
    Forest {
        dimension: String,
        source: ForestError,
    },

    #[snafu(display("Branch of dimension {dimension} has an invalid span"))]
    InvalidSpan {
        dimension: String,
        source: IntervalError,
    },

    #[snafu(display("Failed to generate stylesheet"))]
    Style { source: StyleError },
}

/// Folds held for one dimension by [`VariationalSession::show_dimension_choice`].
#[derive(Debug, Clone)]
struct ChoiceFolds {
    branch: BranchCondition,
    folds: Vec<FoldId>,
}

struct InstalledStylesheet {
    id: StyleSheetId,
    source: String,
}

pub struct VariationalSession<H: Host> {
    forest: DecorationForest<H::Annotation>,
    predicates: PredicateSuppressor<H::Marker>,
    palette: Palette,
    style: StyleConfig,
    choice_folds: FxHashMap<String, ChoiceFolds>,
    stylesheet: Option<InstalledStylesheet>,
}

impl<H: Host> VariationalSession<H> {
    pub fn new(host: &mut H, style: StyleConfig, palette: Palette) -> Self {
        Self {
            forest: DecorationForest::new(),
            predicates: PredicateSuppressor::new(host),
            palette,
            style,
            choice_folds: FxHashMap::default(),
            stylesheet: None,
        }
    }

    pub fn from_config(host: &mut H, config: &Config) -> Self {
        Self::new(host, config.style(), config.palette())
    }

    pub fn forest(&self) -> &DecorationForest<H::Annotation> {
        &self.forest
    }

    pub fn predicates(&self) -> &PredicateSuppressor<H::Marker> {
        &self.predicates
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Text of the stylesheet currently installed on the host.
    pub fn stylesheet(&self) -> Option<&str> {
        self.stylesheet
            .as_ref()
            .map(|installed| installed.source.as_str())
    }

    /// Bring decorations, colors and directive suppression in line with `region`.
    ///
    /// Stops at the first error without sweeping; the next successful resync
    /// clears whatever was left behind. Decorations left over from the previous
    /// parse never block placement, since one the new tree cuts across is
    /// dropped on the spot.
    ///
    /// Directive rows only accumulate: rows of a choice that has since been
    /// removed stay tracked and folded until [`destroy`](Self::destroy).
    pub fn resync(&mut self, host: &mut H, region: &Region) -> Result<(), SessionError> {
        self.forest.unmark();
        self.palette.unmark();

        for choice in region.choices() {
            self.add_choice(host, choice)?;
        }

        let removed = self.forest.sweep();
        let dimensions = self.palette.sweep();
        debug!(
            removed,
            ?dimensions,
            decorations = self.forest.len(),
            "resynced document"
        );
        self.refresh_stylesheet(host)
    }

    fn add_choice(&mut self, host: &mut H, choice: &Choice) -> Result<(), SessionError> {
        self.palette.register(&choice.name);

        match choice.thenbranch.span {
            Some(span) => {
                let interval = branch_interval(&choice.name, span)?;
                self.forest
                    .add_decoration(host, interval, &choice.name, choice.then_condition())
                    .context(ForestSnafu {
                        dimension: &choice.name,
                    })?;
            }
            None => warn!(dimension = %choice.name, "then branch has no span; not decorated"),
        }

        if !choice.elsebranch.is_empty() {
            if let Some(span) = choice.elsebranch.span {
                let interval = branch_interval(&choice.name, span)?;
                self.forest
                    .add_decoration(host, interval, &choice.name, choice.else_condition())
                    .context(ForestSnafu {
                        dimension: &choice.name,
                    })?;
            }
        }

        let rows = directive_rows(choice);
        trace!(dimension = %choice.name, ?rows, "directive rows");
        self.predicates.add(host, rows);
        Ok(())
    }

    fn refresh_stylesheet(&mut self, host: &mut H) -> Result<(), SessionError> {
        let source =
            generate_stylesheet(self.forest.decorations(), &self.palette, &self.style)
                .context(StyleSnafu)?;
        if let Some(installed) = self.stylesheet.take() {
            host.remove_stylesheet(installed.id);
        }
        let id = host.add_stylesheet(&source);
        self.stylesheet = Some(InstalledStylesheet { id, source });
        Ok(())
    }

    /// Change the color of `dimension` and restyle.
    pub fn set_dimension_color(
        &mut self,
        host: &mut H,
        dimension: &str,
        color: Rgb,
    ) -> Result<(), SessionError> {
        self.palette.set_color(dimension, color);
        self.refresh_stylesheet(host)
    }

    /// Show only the `branch` side of `dimension` by folding every branch on the
    /// other side, or with `None` unfold everything folded for the dimension.
    ///
    /// Returns the number of folds created.
    pub fn show_dimension_choice(
        &mut self,
        host: &mut H,
        dimension: &str,
        branch: Option<BranchCondition>,
    ) -> usize {
        if let Some(previous) = self.choice_folds.remove(dimension) {
            trace!(dimension, branch = %previous.branch, "unfold choice");
            for fold in previous.folds {
                host.unfold(fold);
            }
        }

        let Some(branch) = branch else {
            return 0;
        };
        let folded = branch.opposite();
        let folds: Vec<FoldId> = self
            .forest
            .filter_dimension_choice(dimension, folded)
            .into_iter()
            .filter_map(|node| choice_fold(node.interval()))
            .map(|range| host.fold(range))
            .collect();

        debug!(dimension, %branch, folds = folds.len(), "show dimension choice");
        let count = folds.len();
        self.choice_folds.insert(
            dimension.to_string(),
            ChoiceFolds {
                branch: folded,
                folds,
            },
        );
        count
    }

    /// Branch condition currently folded away for `dimension`.
    pub fn folded_choice(&self, dimension: &str) -> Option<BranchCondition> {
        self.choice_folds
            .get(dimension)
            .map(|choice_folds| choice_folds.branch)
    }

    pub fn handle_cursor_moved(&mut self, host: &mut H, event: CursorMoved) -> CursorResponse {
        self.predicates.handle_cursor_moved(host, event)
    }

    /// Release everything the session holds on the host.
    pub fn destroy(&mut self, host: &mut H) {
        for (_, choice_folds) in self.choice_folds.drain() {
            for fold in choice_folds.folds {
                host.unfold(fold);
            }
        }
        self.forest.destroy();
        self.predicates.destroy(host);
        if let Some(installed) = self.stylesheet.take() {
            host.remove_stylesheet(installed.id);
        }
        debug!("destroyed session");
    }
}

/// Decorated rows of a branch: the lines after its opening directive, up to
/// the line holding the next directive.
fn branch_interval(dimension: &str, span: Span) -> Result<Interval, SessionError> {
    Interval::new(span.start.row + 1, span.end.row).context(InvalidSpanSnafu { dimension })
}

/// Rows of a choice's `#ifdef`, `#else` and `#endif` lines.
pub fn directive_rows(choice: &Choice) -> SmallVec<[u32; 3]> {
    let mut rows = SmallVec::new();
    if let Some(span) = choice.thenbranch.span {
        rows.push(span.start.row);
    }
    let else_span = choice
        .elsebranch
        .span
        .filter(|_| !choice.elsebranch.is_empty());
    if let Some(span) = else_span {
        rows.push(span.start.row);
    }
    let end = choice
        .span
        .or(else_span)
        .or(choice.thenbranch.span)
        .map(|span| span.end.row);
    if let Some(row) = end {
        if !rows.contains(&row) {
            rows.push(row);
        }
    }
    rows
}

/// Fold hiding a branch's lines, leaving its directives visible.
fn choice_fold(interval: Interval) -> Option<FoldRange> {
    let last = interval.end().checked_sub(1)?;
    (interval.start() <= last).then_some(FoldRange::rows(interval.start(), last))
}
