// crates/autobox-core/src/toolset.rs
// ============================================================================
// Module: Toolset Tree
// Description: Arena of named toolsets holding script tools.
// Purpose: Group tools into nested, virtual folders of a toolbox.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Toolsets live in an arena addressed by [`ToolsetId`]. Every node records
//! its parent index, so qualified names (`Parent\Child`) are computed by
//! walking up the table instead of holding back-references. Traversals are
//! iterative and breadth-first, matching the order in which toolsets are
//! numbered inside the toolbox documents.
//!
//! Sibling names must be unique ignoring case at every depth; the same name
//! may appear under different parents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::VecDeque;

use crate::ToolboxError;
use crate::sanitize::repeated_names;
use crate::sanitize::validate_toolset_name;
use crate::script::ScriptTool;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Index of a toolset inside its [`ToolsetTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolsetId(usize);

/// Arena node.
#[derive(Debug)]
struct ToolsetNode {
    /// Sanitized toolset name.
    name: String,
    /// Parent toolset; `None` for toolsets at the toolbox root.
    parent: Option<ToolsetId>,
    /// Child toolsets in insertion order.
    children: Vec<ToolsetId>,
    /// Tools held directly by this toolset.
    tools: Vec<ScriptTool>,
}

/// Arena of toolsets.
///
/// # Invariants
/// - Parent indices always point at earlier nodes, so the tree is acyclic.
/// - `roots` and every `children` list keep insertion order.
#[derive(Debug, Default)]
pub struct ToolsetTree {
    /// All nodes; a [`ToolsetId`] is a position in this list.
    nodes: Vec<ToolsetNode>,
    /// Toolsets attached directly to the toolbox.
    roots: Vec<ToolsetId>,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl ToolsetTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Adds a toolset below `parent`, or at the root when `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] for invalid names and unknown parents.
    pub fn add_toolset(
        &mut self,
        parent: Option<ToolsetId>,
        name: &str,
    ) -> Result<ToolsetId, ToolboxError> {
        let validated = validate_toolset_name(name)
            .ok_or_else(|| ToolboxError::Validation(format!("invalid toolset name: {name}")))?;
        let id = ToolsetId(self.nodes.len());
        match parent {
            Some(parent_id) => self.node_mut(parent_id)?.children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(ToolsetNode {
            name: validated,
            parent,
            children: Vec::new(),
            tools: Vec::new(),
        });
        Ok(id)
    }

    /// Appends a tool to a toolset.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Validation`] when the toolset is unknown.
    pub fn add_tool(&mut self, id: ToolsetId, tool: ScriptTool) -> Result<(), ToolboxError> {
        self.node_mut(id)?.tools.push(tool);
        Ok(())
    }

    /// Returns a mutable node or an unknown-toolset error.
    fn node_mut(&mut self, id: ToolsetId) -> Result<&mut ToolsetNode, ToolboxError> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| ToolboxError::Validation(format!("unknown toolset index: {}", id.0)))
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns true when the tree holds no toolsets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the name of a toolset.
    #[must_use]
    pub fn name(&self, id: ToolsetId) -> Option<&str> {
        self.nodes.get(id.0).map(|node| node.name.as_str())
    }

    /// Returns the parent of a toolset.
    #[must_use]
    pub(crate) fn parent(&self, id: ToolsetId) -> Option<ToolsetId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Returns the children of a toolset; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: ToolsetId) -> &[ToolsetId] {
        self.nodes.get(id.0).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    /// Returns the tools held directly by a toolset; empty for unknown ids.
    #[must_use]
    pub fn tools(&self, id: ToolsetId) -> &[ScriptTool] {
        self.nodes.get(id.0).map(|node| node.tools.as_slice()).unwrap_or_default()
    }

    /// Returns the `\`-joined path of names from the root down to `id`.
    #[must_use]
    pub fn qualified_name(&self, id: ToolsetId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(current_id) = current {
            names.push(self.name(current_id)?);
            current = self.parent(current_id);
        }
        names.reverse();
        Some(names.join("\\"))
    }

    /// Finds a toolset by qualified name, ignoring case.
    #[must_use]
    pub fn find(&self, qualified_name: &str) -> Option<ToolsetId> {
        let wanted = qualified_name.to_lowercase();
        (0 .. self.nodes.len()).map(ToolsetId).find(|id| {
            self.qualified_name(*id).is_some_and(|name| name.to_lowercase() == wanted)
        })
    }

    /// Returns true when the toolset or any descendant holds a tool.
    #[must_use]
    pub fn has_tools(&self, id: ToolsetId) -> bool {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get(current.0) else {
                continue;
            };
            if !node.tools.is_empty() {
                return true;
            }
            pending.extend(node.children.iter().copied());
        }
        false
    }

    /// Returns every toolset in breadth-first order starting from the roots.
    #[must_use]
    pub fn breadth_first(&self) -> Vec<ToolsetId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<ToolsetId> = self.roots.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.children(id).iter().copied());
        }
        order
    }

    /// Iterates every tool held anywhere in the tree, breadth-first.
    pub fn all_tools(&self) -> impl Iterator<Item = &ScriptTool> {
        self.breadth_first().into_iter().flat_map(move |id| self.tools(id).iter())
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Checks sibling-name uniqueness at the root and below every toolset.
    ///
    /// Groups are checked breadth-first; the first violating group is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Repetition`] listing the sorted qualified names
    /// of the conflicting siblings.
    pub fn check_sibling_names(&self) -> Result<(), ToolboxError> {
        self.check_group(&self.roots)?;
        for id in self.breadth_first() {
            self.check_group(self.children(id))?;
        }
        Ok(())
    }

    /// Checks one sibling group.
    fn check_group(&self, siblings: &[ToolsetId]) -> Result<(), ToolboxError> {
        let repeated = repeated_names(siblings.iter().filter_map(|id| self.name(*id)));
        if repeated.is_empty() {
            return Ok(());
        }
        let folded: BTreeSet<String> = repeated.iter().map(|name| name.to_lowercase()).collect();
        let paths: BTreeSet<String> = siblings
            .iter()
            .filter(|id| self.name(**id).is_some_and(|name| folded.contains(&name.to_lowercase())))
            .filter_map(|id| self.qualified_name(*id))
            .collect();
        Err(ToolboxError::Repetition(format!(
            "Toolset name repetition detected: {}",
            paths.into_iter().collect::<Vec<_>>().join("; ")
        )))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
