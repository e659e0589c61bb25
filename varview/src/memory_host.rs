//! In-memory host for headless rendering and tests.
//!
//! Records every decoration, fold, marker and stylesheet the engine creates so
//! callers can inspect the result without an editor. Annotations and markers
//! share the host's state and update it when relabelled or released.

use crate::{
    coords::{FoldRange, Position},
    host::{Annotation, Decorator, FoldHost, FoldId, RowMarker, StyleHost, StyleSheetId},
    interval::Interval,
    suppressor::CursorMoved,
};
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Default)]
struct State {
    lines: Vec<String>,
    next_id: u64,
    decorations: BTreeMap<u64, (Interval, String)>,
    decorations_created: usize,
    markers: BTreeMap<u64, u32>,
    folds: BTreeMap<u64, FoldRange>,
    stylesheets: BTreeMap<u64, String>,
    cursor: Position,
    cursor_events: Vec<CursorMoved>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<State>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host over a document, used for line lengths.
    pub fn with_text(text: &str) -> Self {
        let host = Self::new();
        host.state.lock().lines = text.lines().map(str::to_string).collect();
        host
    }

    /// Live decorations in creation order.
    pub fn decorations(&self) -> Vec<(Interval, String)> {
        self.state.lock().decorations.values().cloned().collect()
    }

    /// Number of annotations ever created, released ones included.
    pub fn decorations_created(&self) -> usize {
        self.state.lock().decorations_created
    }

    /// Live folds in creation order.
    pub fn folds(&self) -> Vec<FoldRange> {
        self.state.lock().folds.values().copied().collect()
    }

    pub fn marker_count(&self) -> usize {
        self.state.lock().markers.len()
    }

    /// Installed stylesheets in installation order.
    pub fn stylesheets(&self) -> Vec<String> {
        self.state.lock().stylesheets.values().cloned().collect()
    }

    pub fn cursor(&self) -> Position {
        self.state.lock().cursor
    }

    /// Move the cursor as a user would, returning the event to deliver.
    pub fn move_cursor(&mut self, position: Position) -> CursorMoved {
        let mut state = self.state.lock();
        let event = CursorMoved::new(state.cursor, position);
        state.cursor = position;
        event
    }

    /// Cursor moves made through [`FoldHost::set_cursor`] since the last call.
    pub fn take_cursor_events(&mut self) -> Vec<CursorMoved> {
        std::mem::take(&mut self.state.lock().cursor_events)
    }
}

pub struct MemoryAnnotation {
    id: u64,
    interval: Interval,
    state: Arc<Mutex<State>>,
}

impl Annotation for MemoryAnnotation {
    fn range(&self) -> Interval {
        self.interval
    }

    fn attach_class(&mut self, class_name: &str) {
        if let Some(decoration) = self.state.lock().decorations.get_mut(&self.id) {
            decoration.1 = class_name.to_string();
        }
    }

    fn release(self) {
        self.state.lock().decorations.remove(&self.id);
    }
}

impl Decorator for MemoryHost {
    type Annotation = MemoryAnnotation;

    fn decorate(&mut self, interval: Interval, class_name: &str) -> MemoryAnnotation {
        let mut state = self.state.lock();
        let id = state.next_id();
        state
            .decorations
            .insert(id, (interval, class_name.to_string()));
        state.decorations_created += 1;
        MemoryAnnotation {
            id,
            interval,
            state: self.state.clone(),
        }
    }
}

pub struct MemoryMarker {
    id: u64,
    row: u32,
    state: Arc<Mutex<State>>,
}

impl RowMarker for MemoryMarker {
    fn row(&self) -> u32 {
        self.row
    }

    fn release(self) {
        self.state.lock().markers.remove(&self.id);
    }
}

impl FoldHost for MemoryHost {
    type Marker = MemoryMarker;

    fn mark_row(&mut self, row: u32) -> MemoryMarker {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.markers.insert(id, row);
        MemoryMarker {
            id,
            row,
            state: self.state.clone(),
        }
    }

    fn fold(&mut self, range: FoldRange) -> FoldId {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.folds.insert(id, range);
        FoldId(id)
    }

    fn unfold(&mut self, id: FoldId) {
        self.state.lock().folds.remove(&id.0);
    }

    fn line_length(&self, row: u32) -> u32 {
        let state = self.state.lock();
        let length = state
            .lines
            .get(row as usize)
            .map_or(0, |line| line.chars().count());
        u32::try_from(length).unwrap_or(u32::MAX)
    }

    fn set_cursor(&mut self, position: Position) {
        let mut state = self.state.lock();
        let event = CursorMoved::new(state.cursor, position);
        state.cursor = position;
        state.cursor_events.push(event);
    }
}

impl StyleHost for MemoryHost {
    fn add_stylesheet(&mut self, source: &str) -> StyleSheetId {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.stylesheets.insert(id, source.to_string());
        StyleSheetId(id)
    }

    fn remove_stylesheet(&mut self, id: StyleSheetId) {
        self.state.lock().stylesheets.remove(&id.0);
    }
}
