//! Per-dimension base colors.

use crate::{color::Rgb, style::ColorLookup};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Color given to a dimension nobody has picked a color for.
pub const DEFAULT_DIMENSION_COLOR: Rgb = Rgb::new(127, 71, 62);

#[derive(Debug, Clone, Copy)]
struct Entry {
    color: Rgb,
    marked: bool,
}

/// The dimensions present in a document and the color each is drawn with.
///
/// Follows the forest's mark and sweep. A dimension that disappears from the
/// document is swept, but its color is remembered, so deleting and retyping an
/// `#ifdef` does not lose a color the user picked.
#[derive(Debug, Clone)]
pub struct Palette {
    default_color: Rgb,
    entries: BTreeMap<String, Entry>,
    remembered: FxHashMap<String, Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION_COLOR)
    }
}

impl Palette {
    pub fn new(default_color: Rgb) -> Self {
        Self {
            default_color,
            entries: BTreeMap::new(),
            remembered: FxHashMap::default(),
        }
    }

    /// Palette with initial colors for dimensions that have not been seen yet.
    pub fn with_colors<I, S>(default_color: Rgb, colors: I) -> Self
    where
        I: IntoIterator<Item = (S, Rgb)>,
        S: Into<String>,
    {
        let mut palette = Self::new(default_color);
        palette.remembered = colors
            .into_iter()
            .map(|(name, color)| (name.into(), color))
            .collect();
        palette
    }

    pub fn default_color(&self) -> Rgb {
        self.default_color
    }

    /// Mark `dimension` as present, assigning it a color if it is new.
    pub fn register(&mut self, dimension: &str) -> Rgb {
        if let Some(entry) = self.entries.get_mut(dimension) {
            entry.marked = true;
            return entry.color;
        }
        let color = self
            .remembered
            .get(dimension)
            .copied()
            .unwrap_or(self.default_color);
        trace!(dimension, %color, "register dimension");
        self.entries.insert(
            dimension.to_string(),
            Entry {
                color,
                marked: true,
            },
        );
        color
    }

    /// Set the color of `dimension`, registering it if it is new.
    pub fn set_color(&mut self, dimension: &str, color: Rgb) {
        debug!(dimension, %color, "set dimension color");
        self.remembered.insert(dimension.to_string(), color);
        match self.entries.get_mut(dimension) {
            Some(entry) => entry.color = color,
            None => {
                self.entries.insert(
                    dimension.to_string(),
                    Entry {
                        color,
                        marked: true,
                    },
                );
            }
        }
    }

    /// Color of a registered dimension.
    pub fn color(&self, dimension: &str) -> Option<Rgb> {
        self.entries.get(dimension).map(|entry| entry.color)
    }

    pub fn contains(&self, dimension: &str) -> bool {
        self.entries.contains_key(dimension)
    }

    /// Registered dimensions, sorted by name.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, Rgb)> + '_ {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.color))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unmark(&mut self) {
        for entry in self.entries.values_mut() {
            entry.marked = false;
        }
    }

    /// Drop dimensions not registered since [`unmark`](Self::unmark). Returns their names.
    pub fn sweep(&mut self) -> Vec<String> {
        let swept: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.marked)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &swept {
            if let Some(entry) = self.entries.remove(name) {
                self.remembered.insert(name.clone(), entry.color);
            }
        }
        if !swept.is_empty() {
            debug!(?swept, "swept dimensions");
        }
        swept
    }
}

impl ColorLookup for Palette {
    fn dimension_color(&self, dimension: &str) -> Option<Rgb> {
        self.color(dimension)
    }
}
