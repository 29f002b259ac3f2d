//! In-memory scene graph.
//!
//! A root node owns every drawable node through parent → child edges. Draw
//! order is kept explicitly (back-most first) because the editor treats the
//! scene as the single source of truth for z-order.

use crate::id::ElementId;
use crate::model::{NodeKind, NodeMeta, SceneNode};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serialized form of a whole scene. Node metadata is kept so identity and
/// lock state survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub nodes: Vec<SceneNode>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// The underlying directed graph.
    pub graph: StableDiGraph<SceneNode, ()>,

    /// The root node index.
    pub root: NodeIndex,

    /// Children of the root, back-most first.
    draw_order: Vec<NodeIndex>,

    /// Index from ElementId → NodeIndex. Nodes without an id are absent.
    id_index: HashMap<ElementId, NodeIndex>,
}

impl SceneGraph {
    /// Create a new empty scene graph with a root node.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode {
            kind: NodeKind::Other {
                type_name: "root".into(),
            },
            meta: NodeMeta::default(),
        });
        Self {
            graph,
            root,
            draw_order: Vec::new(),
            id_index: HashMap::new(),
        }
    }

    pub fn from_document(doc: SceneDocument) -> Self {
        let mut scene = Self::new();
        for node in doc.nodes {
            scene.add_node(node);
        }
        scene
    }

    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            nodes: self.nodes().cloned().collect(),
        }
    }

    /// Add a node on top of the draw order. Returns its index.
    pub fn add_node(&mut self, node: SceneNode) -> NodeIndex {
        let id = node.id();
        let idx = self.graph.add_node(node);
        self.graph.add_edge(self.root, idx, ());
        self.draw_order.push(idx);
        if let Some(id) = id {
            self.id_index.entry(id).or_insert(idx);
        }
        idx
    }

    /// Remove the node carrying `id`, keeping the index synchronized.
    pub fn remove(&mut self, id: ElementId) -> Option<SceneNode> {
        let idx = self.index_of(id)?;
        self.draw_order.retain(|&i| i != idx);
        let removed = self.graph.remove_node(idx);
        self.rebuild_index();
        removed
    }

    /// Drop every node except the root.
    pub fn clear(&mut self) {
        for idx in self.draw_order.drain(..) {
            self.graph.remove_node(idx);
        }
        self.id_index.clear();
    }

    pub fn len(&self) -> usize {
        self.draw_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_order.is_empty()
    }

    /// Nodes in draw order, back-most first.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.draw_order.iter().map(|&idx| &self.graph[idx])
    }

    pub fn node_at(&self, pos: usize) -> Option<&SceneNode> {
        self.draw_order.get(pos).map(|&idx| &self.graph[idx])
    }

    /// Look up a node by its element id.
    pub fn get(&self, id: ElementId) -> Option<&SceneNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Look up a node mutably by its element id.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut SceneNode> {
        self.index_of(id).map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: ElementId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Draw-order slot of the node carrying `id`.
    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        let idx = self.index_of(id)?;
        self.draw_order.iter().position(|&i| i == idx)
    }

    /// Replace the metadata of the node at draw slot `pos`.
    pub fn set_meta_at(&mut self, pos: usize, meta: NodeMeta) -> bool {
        let Some(&idx) = self.draw_order.get(pos) else {
            return false;
        };
        self.graph[idx].meta = meta;
        self.rebuild_index();
        true
    }

    /// Move a node one step toward the front. Returns true if the z-order
    /// changed.
    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        let Some(pos) = self.position_of(id) else {
            return false;
        };
        if pos + 1 >= self.draw_order.len() {
            return false; // already at front
        }
        self.rebuild_child_order(pos, pos + 1)
    }

    /// Move a node one step toward the back. Returns true if the z-order
    /// changed.
    pub fn send_backward(&mut self, id: ElementId) -> bool {
        let Some(pos) = self.position_of(id) else {
            return false;
        };
        if pos == 0 {
            return false; // already at back
        }
        self.rebuild_child_order(pos, pos - 1)
    }

    /// Rebuild root edges, moving the child at `from` to `to`.
    fn rebuild_child_order(&mut self, from: usize, to: usize) -> bool {
        for &child in &self.draw_order {
            if let Some(edge) = self.graph.find_edge(self.root, child) {
                self.graph.remove_edge(edge);
            }
        }
        let child = self.draw_order.remove(from);
        self.draw_order.insert(to, child);
        for &child in &self.draw_order {
            self.graph.add_edge(self.root, child, ());
        }
        true
    }

    /// Rebuild the `id_index`. When two nodes claim the same id the
    /// back-most one keeps it.
    pub fn rebuild_index(&mut self) {
        self.id_index.clear();
        for &idx in &self.draw_order {
            if let Some(id) = self.graph[idx].id() {
                self.id_index.entry(id).or_insert(idx);
            }
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
