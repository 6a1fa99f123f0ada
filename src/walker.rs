//! Generic depth-first traversal over a tree-sitter syntax tree
//!
//! A [`NodeFilter`] decides, per visited node, whether to attach data at that
//! location and whether to descend into the node's children. The walker
//! turns those decisions into a forest of [`TreePath`] entries that mirrors
//! the nesting of the emitting nodes only:
//!
//! - data + continue: emit here, nested emissions become `children`
//! - data + stop: emit here, subtree is never visited
//! - no data + continue: nested emissions are lifted into the enclosing list
//! - no data + stop: subtree pruned silently
//!
//! The traversal is iterative (explicit frame stack over a `TreeCursor`) so
//! deeply nested minified bundles cannot overflow the call stack.

use serde::Serialize;
use tree_sitter::Node;

use crate::error::Result;
use crate::syntax::is_comment;

/// Whether the walker should visit a node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Continue,
    Stop,
}

/// Per-node decision returned by a [`NodeFilter`]
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSignal<T> {
    pub data: Option<T>,
    pub descend: Descend,
}

impl<T> WalkSignal<T> {
    /// Nothing to report here, keep looking inside
    pub fn pass() -> Self {
        Self {
            data: None,
            descend: Descend::Continue,
        }
    }

    /// Nothing to report and nothing worth visiting inside
    pub fn prune() -> Self {
        Self {
            data: None,
            descend: Descend::Stop,
        }
    }

    /// Report data and keep exploring nested structure
    pub fn emit(data: T) -> Self {
        Self {
            data: Some(data),
            descend: Descend::Continue,
        }
    }

    /// Report data and skip the subtree
    pub fn emit_and_stop(data: T) -> Self {
        Self {
            data: Some(data),
            descend: Descend::Stop,
        }
    }
}

/// One entry of the filtered output forest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePath<T> {
    /// Dotted/bracketed address of the node, for identity and debugging only
    pub location_path: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreePath<T>>,
}

impl<T> TreePath<T> {
    /// Total number of entries in this subtree, including self
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreePath::size).sum::<usize>()
    }
}

/// Node filter driven by [`walk`]
pub trait NodeFilter<'tree> {
    type Output;

    /// Decide what to do with one named node reached at `path`
    fn visit(&mut self, path: &str, node: Node<'tree>) -> Result<WalkSignal<Self::Output>>;
}

struct Frame<T> {
    path: String,
    data: Option<T>,
    collected: Vec<TreePath<T>>,
    next_index: usize,
}

impl<T> Frame<T> {
    fn new(path: String, data: Option<T>) -> Self {
        Self {
            path,
            data,
            collected: Vec::new(),
            next_index: 0,
        }
    }

    fn child_path(&self, field: Option<&str>, index: usize) -> String {
        match field {
            Some(field) => format!("{}.{}", self.path, field),
            None => format!("{}[{}]", self.path, index),
        }
    }

    /// Fold a finished child frame into this one
    fn absorb(&mut self, child: Frame<T>) {
        match child.data {
            Some(data) => self.collected.push(TreePath {
                location_path: child.path,
                data,
                children: child.collected,
            }),
            None => self.collected.extend(child.collected),
        }
    }
}

/// Walk the named descendants of `root` (not `root` itself) with `filter`.
///
/// Anonymous tokens and comments are never offered to the filter. Errors
/// raised by the filter abort the walk and are returned unchanged.
pub fn walk<'tree, F>(root: Node<'tree>, filter: &mut F) -> Result<Vec<TreePath<F::Output>>>
where
    F: NodeFilter<'tree>,
{
    let mut stack: Vec<Frame<F::Output>> = vec![Frame::new(root.kind().to_string(), None)];
    let mut cursor = root.walk();

    if !cursor.goto_first_child() {
        return Ok(Vec::new());
    }

    loop {
        let node = cursor.node();
        let field = cursor.field_name();
        let mut entered: Option<Frame<F::Output>> = None;

        if let Some(frame) = stack.last_mut() {
            let index = frame.next_index;
            frame.next_index += 1;

            if node.is_named() && !is_comment(node.kind()) {
                let path = frame.child_path(field, index);
                let signal = filter.visit(&path, node)?;

                if signal.descend == Descend::Continue && cursor.goto_first_child() {
                    entered = Some(Frame::new(path, signal.data));
                } else if let Some(data) = signal.data {
                    frame.collected.push(TreePath {
                        location_path: path,
                        data,
                        children: Vec::new(),
                    });
                }
            }
        }

        if let Some(frame) = entered {
            stack.push(frame);
            continue;
        }

        // Advance to the next sibling, closing finished frames on the way up
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if stack.len() <= 1 || !cursor.goto_parent() {
                let root_frame = stack.pop().map(|f| f.collected).unwrap_or_default();
                return Ok(root_frame);
            }
            if let Some(finished) = stack.pop() {
                if let Some(parent) = stack.last_mut() {
                    parent.absorb(finished);
                }
            }
        }
    }
}
