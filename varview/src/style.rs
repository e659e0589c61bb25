//! Stylesheet generation for the decoration forest.
//!
//! Each distinct class name gets three rules (plain line, cursor line, hovered
//! line). Top-level branches get a flat translucent background; nested branches
//! get a `linear-gradient` that repeats every ancestor's color and adds their
//! own one percentage point further along, so each level of nesting shows as
//! another band at the left edge of the line:
//!
//! ```text
//! dimension-marker-A-defbranch                 rgba(A) 0%
//! dimension-marker-A-defbranch-B-ndefbranch    rgba(A) 0%, rgba(B) 1%
//! ...-B-ndefbranch-C-defbranch                 rgba(A) 0%, rgba(B) 1%, rgba(C) 2%
//! ```
//!
//! The forest is walked breadth first, so every rule for a shallower class is
//! emitted before any deeper one. Rules have equal specificity, which makes the
//! deeper, later rule win.

use crate::{
    color::Rgb,
    forest::{BranchCondition, DecorationNode},
    host::Annotation,
};
use rustc_hash::FxHashMap;
use snafu::{OptionExt, Snafu};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Hides the placeholder glyph of folds created for hidden directive lines.
pub const SUPPRESS_LINE_STYLESHEET: &str =
    ".line .fold-marker.suppress-line { visibility: hidden; }";

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum StyleError {
    #[snafu(display("Dimension {dimension} has no color; cannot style {class_name}"))]
    UnknownDimension {
        dimension: String,
        class_name: String,
    },
}

/// Supplies the base color of each dimension.
pub trait ColorLookup {
    fn dimension_color(&self, dimension: &str) -> Option<Rgb>;
}

impl<F> ColorLookup for F
where
    F: Fn(&str) -> Option<Rgb>,
{
    fn dimension_color(&self, dimension: &str) -> Option<Rgb> {
        self(dimension)
    }
}

/// Rendering options for generated rules.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Selector for the editor element the rules are scoped to.
    pub editor_selector: String,
    /// Alpha applied to every shaded color.
    pub opacity: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            editor_selector: "atom-text-editor".to_string(),
            opacity: 0.3,
        }
    }
}

/// Shading, in percent, for the plain, cursor and hover variants of a branch.
///
/// Defined branches are lightened, undefined ones darkened, so the two sides of
/// one dimension stay distinguishable with a single base color.
fn shades(branch: BranchCondition) -> [i16; 3] {
    match branch {
        BranchCondition::Defbranch => [10, 20, 30],
        BranchCondition::Ndefbranch => [-30, -20, -10],
    }
}

/// Gradient stops accumulated along one nesting path.
#[derive(Debug, Clone)]
struct Gradient {
    stops: String,
    last_offset: u32,
}

struct Visit<'a, A> {
    parent_class: Option<&'a str>,
    node: &'a DecorationNode<A>,
}

/// Generate the stylesheet for a forest's top-level `decorations`.
pub fn generate_stylesheet<A, C>(
    decorations: &[DecorationNode<A>],
    colors: &C,
    config: &StyleConfig,
) -> Result<String, StyleError>
where
    A: Annotation,
    C: ColorLookup + ?Sized,
{
    let mut queue: VecDeque<Visit<'_, A>> = decorations
        .iter()
        .map(|node| Visit {
            parent_class: None,
            node,
        })
        .collect();

    let mut gradients: FxHashMap<&str, Gradient> = FxHashMap::default();
    let mut css = String::new();

    while let Some(Visit { parent_class, node }) = queue.pop_front() {
        let class_name = node.class_name();
        queue.extend(node.children().iter().map(|child| Visit {
            parent_class: Some(class_name),
            node: child,
        }));

        if gradients.contains_key(class_name) {
            trace!(class_name, "style already generated");
            continue;
        }

        let base = colors
            .dimension_color(node.dimension())
            .context(UnknownDimensionSnafu {
                dimension: node.dimension(),
                class_name,
            })?;
        let [plain, cursor, hover] =
            shades(node.branch()).map(|percent| base.shade(percent).with_alpha(config.opacity));

        let selector = format!("{} div.{}.line", config.editor_selector, class_name);
        let mut rule = |suffix: &str, declaration: String| {
            css.push_str(&format!("{selector}{suffix} {{ {declaration} }}\n"));
        };
        let parent = parent_class.and_then(|parent| gradients.get(parent));
        let gradient = match parent {
            Some(parent) => {
                let offset = parent.last_offset + 1;
                let stop = |color| format!("{}, {} {}%", parent.stops, color, offset);
                let (plain, cursor, hover) = (stop(plain), stop(cursor), stop(hover));
                rule("", format!("background: linear-gradient(90deg, {plain})"));
                rule(".cursor-line", format!("background: linear-gradient(90deg, {cursor})"));
                rule(".hover-alt", format!("background: linear-gradient(90deg, {hover})"));
                Gradient {
                    stops: plain,
                    last_offset: offset,
                }
            }
            None => {
                rule("", format!("background-color: {plain}"));
                rule(".cursor-line", format!("background-color: {cursor}"));
                rule(".hover-alt", format!("background-color: {hover}"));
                Gradient {
                    stops: format!("{plain} 0%"),
                    last_offset: 0,
                }
            }
        };
        gradients.insert(class_name, gradient);
    }

    debug!(classes = gradients.len(), bytes = css.len(), "generated stylesheet");
    Ok(css)
}
