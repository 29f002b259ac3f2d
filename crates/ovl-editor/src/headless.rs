//! A `SceneAdapter` with no renderer behind it.
//!
//! Nodes live in an `ovl_core::SceneGraph`. Clone and deserialize requests
//! are queued and only run when the host polls for completions, which is
//! how a browser scene behaves from the core's point of view. Used by the
//! replay binary and by the test suites.

use crate::adapter::{Completion, ExportedImage, SceneAdapter, TaskOutput};
use crate::error::AdapterError;
use crate::spacing::SpacingHint;
use crate::task::TaskTicket;
use ovl_core::{
    Bounds, ElementId, NodeMeta, NodePatch, SceneDocument, SceneGraph, SceneNode, TextSize,
    estimate_text_size, text_bounds,
};
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
enum QueuedOp {
    Clone { ticket: TaskTicket, id: ElementId },
    Deserialize { ticket: TaskTicket, payload: String },
}

/// What the last `rasterize` call saw.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub multiplier: f64,
    /// Overlay items present while rasterizing. Always zero for a correct
    /// caller.
    pub overlay_items: usize,
}

#[derive(Debug)]
pub struct HeadlessScene {
    graph: SceneGraph,
    width: f64,
    height: f64,
    active: Option<ElementId>,
    selection: Vec<ElementId>,
    measured: HashMap<ElementId, TextSize>,
    queue: VecDeque<QueuedOp>,
    fail_next: Option<String>,
    overlay: Vec<SpacingHint>,
    repaints: usize,
    last_export: Option<ExportRecord>,
}

impl HeadlessScene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            graph: SceneGraph::new(),
            width,
            height,
            active: None,
            selection: Vec::new(),
            measured: HashMap::new(),
            queue: VecDeque::new(),
            fail_next: None,
            overlay: Vec::new(),
            repaints: 0,
            last_export: None,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Direct access, bypassing the editor. Simulates interactive edits.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Use a measured text size for `id` instead of the estimate.
    pub fn set_measured_size(&mut self, id: ElementId, width: f64, height: f64) {
        self.measured.insert(id, TextSize { width, height });
    }

    /// Rubber-band selection. Locked and unknown nodes are skipped; an active
    /// node exists only when exactly one node ends up selected.
    pub fn select_many(&mut self, ids: &[ElementId]) -> usize {
        self.selection = ids
            .iter()
            .copied()
            .filter(|&id| self.graph.get(id).is_some_and(|n| !n.meta.locked))
            .collect();
        self.active = match self.selection.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        self.selection.len()
    }

    /// Make the next queued task fail with `message`.
    pub fn fail_next_task(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Tasks queued and not yet polled.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn overlay(&self) -> &[SpacingHint] {
        &self.overlay
    }

    pub fn repaint_count(&self) -> usize {
        self.repaints
    }

    pub fn last_export(&self) -> Option<&ExportRecord> {
        self.last_export.as_ref()
    }

    fn forget_selected(&mut self, id: ElementId) {
        self.selection.retain(|&s| s != id);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    fn run_clone(&self, id: ElementId) -> Result<TaskOutput, AdapterError> {
        self.graph
            .get(id)
            .cloned()
            .map(TaskOutput::Cloned)
            .ok_or(AdapterError::NodeNotFound(id))
    }

    fn run_deserialize(&mut self, payload: &str) -> Result<TaskOutput, AdapterError> {
        let doc: SceneDocument = serde_json::from_str(payload)
            .map_err(|e| AdapterError::Deserialize(e.to_string()))?;
        self.graph = SceneGraph::from_document(doc);
        self.selection.clear();
        self.active = None;
        Ok(TaskOutput::Deserialized)
    }
}

impl SceneAdapter for HeadlessScene {
    fn add_node(&mut self, node: SceneNode) {
        self.graph.add_node(node);
    }

    fn remove_node(&mut self, id: ElementId) -> Option<SceneNode> {
        let removed = self.graph.remove(id)?;
        self.forget_selected(id);
        self.measured.remove(&id);
        Some(removed)
    }

    fn nodes(&self) -> Vec<SceneNode> {
        self.graph.nodes().cloned().collect()
    }

    fn node(&self, id: ElementId) -> Option<SceneNode> {
        self.graph.get(id).cloned()
    }

    fn position_of(&self, id: ElementId) -> Option<usize> {
        self.graph.position_of(id)
    }

    fn set_props(&mut self, id: ElementId, patch: &NodePatch) -> bool {
        match self.graph.get_mut(id).and_then(SceneNode::text_props_mut) {
            Some(props) => {
                patch.apply(props);
                true
            }
            None => false,
        }
    }

    fn set_meta_at(&mut self, pos: usize, meta: NodeMeta) -> bool {
        let Some(previous) = self.graph.node_at(pos).map(|n| n.meta) else {
            return false;
        };
        if !self.graph.set_meta_at(pos, meta) {
            return false;
        }
        if meta.locked {
            for id in [previous.id, meta.id].into_iter().flatten() {
                self.forget_selected(id);
            }
        }
        true
    }

    fn bounding_rect(&self, id: ElementId) -> Option<Bounds> {
        let props = self.graph.get(id)?.text_props()?;
        let size = self
            .measured
            .get(&id)
            .copied()
            .unwrap_or_else(|| estimate_text_size(props));
        Some(text_bounds(props, size))
    }

    fn bring_forward(&mut self, id: ElementId) -> bool {
        self.graph.bring_forward(id)
    }

    fn send_backward(&mut self, id: ElementId) -> bool {
        self.graph.send_backward(id)
    }

    fn begin_clone(&mut self, ticket: TaskTicket, id: ElementId) {
        self.queue.push_back(QueuedOp::Clone { ticket, id });
    }

    fn serialize(&self) -> Result<String, AdapterError> {
        serde_json::to_string(&self.graph.to_document())
            .map_err(|e| AdapterError::Serialize(e.to_string()))
    }

    fn begin_deserialize(&mut self, ticket: TaskTicket, payload: String) {
        self.queue.push_back(QueuedOp::Deserialize { ticket, payload });
    }

    fn active(&self) -> Option<ElementId> {
        self.active
    }

    fn set_active(&mut self, id: Option<ElementId>) -> bool {
        match id {
            None => {
                self.active = None;
                self.selection.clear();
                true
            }
            Some(id) => {
                let selectable = self.graph.get(id).is_some_and(|n| !n.meta.locked);
                if selectable {
                    self.active = Some(id);
                    self.selection = vec![id];
                }
                selectable
            }
        }
    }

    fn selected(&self) -> Vec<ElementId> {
        self.selection.clone()
    }

    fn set_dimensions(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn request_repaint(&mut self) {
        self.repaints += 1;
    }

    fn clear_overlay(&mut self) {
        self.overlay.clear();
    }

    fn draw_gap(&mut self, hint: &SpacingHint) {
        self.overlay.push(hint.clone());
    }

    fn rasterize(&mut self, multiplier: f64) -> Result<ExportedImage, AdapterError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(AdapterError::Rasterize(format!(
                "invalid multiplier {multiplier}"
            )));
        }
        self.last_export = Some(ExportRecord {
            multiplier,
            overlay_items: self.overlay.len(),
        });
        // No pixels here: the "image" is the visible scene as JSON.
        let visible: Vec<&SceneNode> = self
            .graph
            .nodes()
            .filter(|n| n.text_props().is_some_and(|p| p.visible))
            .collect();
        let bytes =
            serde_json::to_vec(&visible).map_err(|e| AdapterError::Rasterize(e.to_string()))?;
        Ok(ExportedImage {
            width: (self.width * multiplier).round() as u32,
            height: (self.height * multiplier).round() as u32,
            bytes,
        })
    }

    /// Queued tasks are dropped along with the nodes; their tickets are
    /// never completed.
    fn clear(&mut self) {
        self.graph.clear();
        self.queue.clear();
        self.selection.clear();
        self.active = None;
        self.measured.clear();
        self.overlay.clear();
    }

    fn poll_completion(&mut self) -> Option<Completion> {
        let op = self.queue.pop_front()?;
        let failure = self.fail_next.take();
        let completion = match op {
            QueuedOp::Clone { ticket, id } => Completion {
                ticket,
                result: match failure {
                    Some(message) => Err(AdapterError::Clone(message)),
                    None => self.run_clone(id),
                },
            },
            QueuedOp::Deserialize { ticket, payload } => Completion {
                ticket,
                result: match failure {
                    Some(message) => Err(AdapterError::Deserialize(message)),
                    None => self.run_deserialize(&payload),
                },
            },
        };
        Some(completion)
    }
}
