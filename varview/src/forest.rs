//! DecorationForest: nested line decorations mirroring a document's choices.
//!
//! Every choice branch in a variational document becomes one
//! [`DecorationNode`]. Nodes nest the way the branches nest in the text, so the
//! forest is an ordered set of trees:
//!
//! ```text
//! (virtual root)
//!   [2, 10)  DEC defbranch      dimension-marker-DEC-defbranch
//!     [4, 6)   DEC defbranch    dimension-marker-DEC-defbranch-DEC-defbranch
//!   [12, 15) DEC defbranch      dimension-marker-DEC-defbranch
//! ```
//!
//! # Invariants
//!
//! - Siblings are disjoint and sorted by row; each child lies strictly inside
//!   its parent. Insertions that would break this fail with
//!   [`ForestError::MalformedNesting`] before any marked node is modified.
//!   An unmarked node the new interval cuts across is dropped on the spot, as
//!   the coming sweep would drop it, and its children take its place.
//! - A node's class name is derived from its ancestry plus its own dimension
//!   and branch. Whenever a node moves, its subtree is relabelled and the new
//!   class names are pushed to the annotations.
//!
//! # Resynchronization
//!
//! Annotations are host objects and expensive to recreate, so a reparse does
//! not rebuild the forest. Instead the caller runs mark and sweep:
//!
//! ```ignore
//! forest.unmark();
//! for (interval, dimension, branch) in parsed_branches {
//!     forest.add_decoration(host, interval, dimension, branch)?; // re-marks exact matches
//! }
//! forest.sweep(); // drops what was not re-marked, promoting its children
//! ```

use crate::{
    host::{Annotation, Decorator},
    interval::{classify, Interval, Relation},
};
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::{fmt, mem};
use tracing::{debug, trace};

/// Class name prefix for top-level decorations.
pub const ROOT_CLASS_PREFIX: &str = "dimension-marker";

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ForestError {
    #[snafu(display(
        "Dimension is malformed: {new} neither nests inside nor is disjoint from {existing}"
    ))]
    MalformedNesting { new: Interval, existing: Interval },
}

/// Which side of a choice a branch renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchCondition {
    /// Lines kept when the dimension is defined.
    Defbranch,
    /// Lines kept when the dimension is not defined.
    Ndefbranch,
}

impl BranchCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchCondition::Defbranch => "defbranch",
            BranchCondition::Ndefbranch => "ndefbranch",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            BranchCondition::Defbranch => BranchCondition::Ndefbranch,
            BranchCondition::Ndefbranch => BranchCondition::Defbranch,
        }
    }
}

impl fmt::Display for BranchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class name for a node under `parent_class` (or at top level when `None`).
pub fn class_name_for(
    parent_class: Option<&str>,
    dimension: &str,
    branch: BranchCondition,
) -> String {
    format!(
        "{}-{}-{}",
        parent_class.unwrap_or(ROOT_CLASS_PREFIX),
        dimension,
        branch
    )
}

/// One rendered choice branch.
pub struct DecorationNode<A> {
    dimension: String,
    branch: BranchCondition,
    class_name: String,
    marked: bool,
    annotation: A,
    children: Vec<DecorationNode<A>>,
}

impl<A: Annotation> DecorationNode<A> {
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn branch(&self) -> BranchCondition {
        self.branch
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Row range, as currently tracked by the annotation.
    pub fn interval(&self) -> Interval {
        self.annotation.range()
    }

    pub fn children(&self) -> &[DecorationNode<A>] {
        &self.children
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Recompute class names for this subtree and push changes to the annotations.
    fn relabel(&mut self, parent_class: Option<&str>) {
        let class_name = class_name_for(parent_class, &self.dimension, self.branch);
        if class_name != self.class_name {
            trace!(from = %self.class_name, to = %class_name, "relabel decoration");
            self.annotation.attach_class(&class_name);
            self.class_name = class_name;
        }
        for child in &mut self.children {
            child.relabel(Some(&self.class_name));
        }
    }

    fn unmark(&mut self) {
        self.marked = false;
        for child in &mut self.children {
            child.unmark();
        }
    }

    fn release(self) {
        self.annotation.release();
        for child in self.children {
            child.release();
        }
    }

    fn collect<'a, F>(&'a self, matches: &F, out: &mut Vec<&'a DecorationNode<A>>)
    where
        F: Fn(&DecorationNode<A>) -> bool,
    {
        if matches(self) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(matches, out);
        }
    }
}

/// The set of decoration trees for one document.
///
/// Annotations are only released by [`sweep`](Self::sweep) and
/// [`destroy`](Self::destroy); dropping a forest leaves them on the host.
pub struct DecorationForest<A> {
    roots: Vec<DecorationNode<A>>,
}

impl<A> Default for DecorationForest<A> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<A: Annotation> DecorationForest<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a branch decoration in the forest.
    ///
    /// An interval identical to an existing node updates that node in place and
    /// marks it live; no second annotation is created. New nodes get their
    /// annotation from `decorator` once their position, and with it their
    /// class name, is known.
    pub fn add_decoration<D>(
        &mut self,
        decorator: &mut D,
        interval: Interval,
        dimension: &str,
        branch: BranchCondition,
    ) -> Result<(), ForestError>
    where
        D: Decorator<Annotation = A>,
    {
        insert(&mut self.roots, None, decorator, interval, dimension, branch)
    }

    /// Clear the liveness flag on every node ahead of a resync.
    pub fn unmark(&mut self) {
        for root in &mut self.roots {
            root.unmark();
        }
    }

    /// Remove every node not re-marked since [`unmark`](Self::unmark).
    ///
    /// A removed node's children take its place in its parent, keeping their
    /// order and their own nesting. Returns the number of nodes removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        self.roots = sweep_nodes(mem::take(&mut self.roots), &mut removed);
        for root in &mut self.roots {
            root.relabel(None);
        }
        debug!(removed, remaining = self.len(), "swept decorations");
        removed
    }

    /// Every node of `dimension`, depth first.
    pub fn filter_dimension(&self, dimension: &str) -> Vec<&DecorationNode<A>> {
        self.filter(|node| node.dimension == dimension)
    }

    /// Every node of `dimension` on the `branch` side, depth first.
    pub fn filter_dimension_choice(
        &self,
        dimension: &str,
        branch: BranchCondition,
    ) -> Vec<&DecorationNode<A>> {
        self.filter(|node| node.dimension == dimension && node.branch == branch)
    }

    fn filter<F>(&self, matches: F) -> Vec<&DecorationNode<A>>
    where
        F: Fn(&DecorationNode<A>) -> bool,
    {
        let mut out = Vec::new();
        for root in &self.roots {
            root.collect(&matches, &mut out);
        }
        out
    }

    /// The top-level nodes; the root itself is virtual and carries no annotation.
    pub fn decorations(&self) -> &[DecorationNode<A>] {
        &self.roots
    }

    /// Pre-order traversal of every node.
    pub fn iter(&self) -> Iter<'_, A> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Release every annotation and empty the forest.
    pub fn destroy(&mut self) {
        for root in mem::take(&mut self.roots) {
            root.release();
        }
    }

    /// Indented dump, one node per line.
    pub fn outline(&self) -> String {
        fn write_node<A: Annotation>(node: &DecorationNode<A>, depth: usize, out: &mut String) {
            out.push_str(&format!(
                "{:indent$}{} {} {} {}\n",
                "",
                node.interval(),
                node.dimension,
                node.branch,
                node.class_name,
                indent = depth * 2
            ));
            for child in &node.children {
                write_node(child, depth + 1, out);
            }
        }

        let mut out = String::new();
        for root in &self.roots {
            write_node(root, 0, &mut out);
        }
        out
    }
}

impl<A: Annotation> fmt::Debug for DecorationForest<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outline())
    }
}

/// Pre-order iterator over a [`DecorationForest`].
pub struct Iter<'a, A> {
    stack: Vec<&'a DecorationNode<A>>,
}

impl<'a, A> Iterator for Iter<'a, A> {
    type Item = &'a DecorationNode<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn insert<A, D>(
    siblings: &mut Vec<DecorationNode<A>>,
    parent_class: Option<&str>,
    decorator: &mut D,
    interval: Interval,
    dimension: &str,
    branch: BranchCondition,
) -> Result<(), ForestError>
where
    A: Annotation,
    D: Decorator<Annotation = A>,
{
    let (ix, relation, end) = loop {
        match locate(siblings, interval) {
            Placement::Last => {
                let node = new_node(decorator, parent_class, interval, dimension, branch);
                siblings.push(node);
                return Ok(());
            }
            Placement::At { ix, relation, end } => break (ix, relation, end),
            // Left over from the previous parse and about to be swept anyway.
            Placement::Overlap(ix) if !siblings[ix].marked => evict(siblings, ix, parent_class),
            Placement::Overlap(ix) => {
                return MalformedNestingSnafu {
                    new: interval,
                    existing: siblings[ix].interval(),
                }
                .fail();
            }
        }
    };

    match relation {
        Relation::Child => {
            let DecorationNode {
                children,
                class_name,
                ..
            } = &mut siblings[ix];
            insert(
                children,
                Some(class_name.as_str()),
                decorator,
                interval,
                dimension,
                branch,
            )
        }
        Relation::Same => {
            let node = &mut siblings[ix];
            if node.dimension != dimension || node.branch != branch {
                debug!(
                    %interval,
                    from = %node.class_name,
                    dimension,
                    %branch,
                    "update decoration in place"
                );
                node.dimension = dimension.to_string();
                node.branch = branch;
                node.relabel(parent_class);
            }
            node.marked = true;
            Ok(())
        }
        Relation::Above => {
            let node = new_node(decorator, parent_class, interval, dimension, branch);
            siblings.insert(ix, node);
            Ok(())
        }
        Relation::Parent => {
            let mut node = new_node(decorator, parent_class, interval, dimension, branch);
            node.children = siblings.drain(ix..end).collect();
            for child in &mut node.children {
                child.relabel(Some(&node.class_name));
            }
            debug!(%interval, adopted = node.children.len(), "decoration adopts siblings");
            siblings.insert(ix, node);
            Ok(())
        }
        Relation::Below => unreachable!("placement skips siblings the interval is below"),
    }
}

enum Placement {
    /// Below every sibling.
    Last,
    /// `relation` to the sibling at `ix`. For `Parent`, the enclosed run is `ix..end`.
    At {
        ix: usize,
        relation: Relation,
        end: usize,
    },
    /// Partial overlap with the sibling at `ix`.
    Overlap(usize),
}

fn locate<A: Annotation>(siblings: &[DecorationNode<A>], interval: Interval) -> Placement {
    // Siblings are sorted and disjoint, so the first one the new interval is not
    // below decides where it goes.
    let Some(ix) = siblings
        .iter()
        .position(|sibling| classify(interval, sibling.interval()) != Some(Relation::Below))
    else {
        return Placement::Last;
    };
    let Some(relation) = classify(interval, siblings[ix].interval()) else {
        return Placement::Overlap(ix);
    };

    // A parent encloses a run of siblings; check the whole run before adopting.
    let mut end = ix + 1;
    if relation == Relation::Parent {
        while end < siblings.len() {
            match classify(interval, siblings[end].interval()) {
                Some(Relation::Parent) => end += 1,
                Some(_) => break,
                None => return Placement::Overlap(end),
            }
        }
    }
    Placement::At { ix, relation, end }
}

/// Remove the unmarked node at `ix` ahead of its sweep, splicing its children in
/// where it stood.
fn evict<A: Annotation>(
    siblings: &mut Vec<DecorationNode<A>>,
    ix: usize,
    parent_class: Option<&str>,
) {
    let DecorationNode {
        annotation,
        mut children,
        class_name,
        ..
    } = siblings.remove(ix);
    debug!(interval = %annotation.range(), %class_name, "evict stale decoration");
    annotation.release();
    for child in &mut children {
        child.relabel(parent_class);
    }
    siblings.splice(ix..ix, children);
}

fn new_node<A, D>(
    decorator: &mut D,
    parent_class: Option<&str>,
    interval: Interval,
    dimension: &str,
    branch: BranchCondition,
) -> DecorationNode<A>
where
    A: Annotation,
    D: Decorator<Annotation = A>,
{
    let class_name = class_name_for(parent_class, dimension, branch);
    trace!(%interval, %class_name, "create decoration");
    let annotation = decorator.decorate(interval, &class_name);
    DecorationNode {
        dimension: dimension.to_string(),
        branch,
        class_name,
        marked: true,
        annotation,
        children: Vec::new(),
    }
}

fn sweep_nodes<A: Annotation>(
    nodes: Vec<DecorationNode<A>>,
    removed: &mut usize,
) -> Vec<DecorationNode<A>> {
    let mut kept = Vec::with_capacity(nodes.len());
    for mut node in nodes {
        node.children = sweep_nodes(mem::take(&mut node.children), removed);
        if node.marked {
            kept.push(node);
            continue;
        }

        trace!(class_name = %node.class_name, "sweep decoration");
        *removed += 1;
        let DecorationNode {
            annotation,
            children,
            ..
        } = node;
        annotation.release();
        kept.extend(children);
    }
    kept
}
