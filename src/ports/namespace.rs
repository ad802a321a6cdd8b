//! # Namespace Port
//!
//! The tree of groups and datasets inside an array file, and the scoped
//! handle that keeps a file open while its datasets are read.

use std::sync::Arc;

use super::source::{ArraySource, SourceResult};

/// A node of a file's namespace
#[derive(Clone)]
pub enum Node {
    /// A terminal array
    Array(Arc<dyn ArraySource>),
    /// A named collection of child nodes
    Group(Group),
}

impl Node {
    /// Dispatch to the visitor method for this node's kind
    pub fn accept<V: NodeVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Node::Array(array) => visitor.visit_array(array),
            Node::Group(group) => visitor.visit_group(group),
        }
    }

    /// Full path of the node
    pub fn name(&self) -> &str {
        match self {
            Node::Array(array) => array.name(),
            Node::Group(group) => &group.name,
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Array(array) => f
                .debug_struct("Array")
                .field("name", &array.name())
                .field("shape", &array.shape())
                .finish(),
            Node::Group(group) => f
                .debug_struct("Group")
                .field("name", &group.name)
                .field("children", &group.children.len())
                .finish(),
        }
    }
}

/// A named collection of nodes
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Full path, e.g. `/ctd`
    pub name: String,
    pub children: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }
}

/// Capability-based walk over a namespace
pub trait NodeVisitor {
    fn visit_array(&mut self, array: &Arc<dyn ArraySource>);

    /// Descend into a group; the default visits every child
    fn visit_group(&mut self, group: &Group) {
        for child in &group.children {
            child.accept(self);
        }
    }
}

/// A file that can be opened for reading
pub trait ArrayFile {
    /// Human-readable label (usually the path) used in records and logs
    fn label(&self) -> String;

    /// Open the file; the handle keeps it open until dropped
    fn open(&self) -> SourceResult<Box<dyn OpenFile>>;
}

/// An open file
///
/// Dropping the handle releases the file.
pub trait OpenFile {
    /// Top-level nodes of the file
    fn root(&self) -> &[Node];
}

impl<F: ArrayFile + ?Sized> ArrayFile for Box<F> {
    fn label(&self) -> String {
        (**self).label()
    }

    fn open(&self) -> SourceResult<Box<dyn OpenFile>> {
        (**self).open()
    }
}

impl<F: ArrayFile + ?Sized> ArrayFile for Arc<F> {
    fn label(&self) -> String {
        (**self).label()
    }

    fn open(&self) -> SourceResult<Box<dyn OpenFile>> {
        (**self).open()
    }
}
