//! Decoration, styling and directive folding for variational source files.
//!
//! A variational file is source text with preprocessor choices:
//!
//! ```text
//!  0  int x;
//!  1  #ifdef DEC          <- directive, folded away unless the cursor is on it
//!  2  x++;                <- DEC defbranch, tinted with DEC's color
//!  3  #else
//!  4  x--;                <- DEC ndefbranch, a darker shade of the same color
//!  5  #endif
//! ```
//!
//! The parser's [`Region`] tree drives three parts:
//!
//! - [`DecorationForest`] keeps one line decoration per choice branch, nested
//!   like the branches, and resynchronizes against a new tree by mark and sweep.
//! - [`generate_stylesheet`] walks the forest breadth first and emits one rule
//!   set per class name, layering nested branches as gradient bands.
//! - [`PredicateSuppressor`] folds directive lines and reveals one when the
//!   cursor steps onto it.
//!
//! [`VariationalSession`] ties them together. Everything the engine needs from
//! an editor goes through the traits in [`host`]; [`MemoryHost`] implements
//! them in memory.

pub mod color;
pub mod config;
pub mod coords;
pub mod forest;
pub mod host;
pub mod interval;
pub mod memory_host;
pub mod palette;
pub mod session;
pub mod style;
pub mod suppressor;
pub mod tree;

pub use color::{ColorError, Rgb, Rgba};
pub use config::Config;
pub use coords::{FoldRange, Position};
pub use forest::{BranchCondition, DecorationForest, DecorationNode, ForestError};
pub use host::{Annotation, Decorator, FoldHost, FoldId, Host, RowMarker, StyleHost, StyleSheetId};
pub use interval::{classify, Interval, IntervalError, Relation};
pub use memory_host::{MemoryAnnotation, MemoryHost, MemoryMarker};
pub use palette::{Palette, DEFAULT_DIMENSION_COLOR};
pub use session::{directive_rows, SessionError, VariationalSession};
pub use style::{generate_stylesheet, ColorLookup, StyleConfig, StyleError};
pub use suppressor::{CursorMoved, CursorResponse, PredicateSuppressor, Visibility};
pub use tree::{parse_tree, Choice, ChoiceKind, Region, Segment, Span, Text, TreeError};
