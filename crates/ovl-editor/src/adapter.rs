//! The scene capability consumed by the editing core.
//!
//! The renderer owns the live scene: draw order, geometry, selection state
//! and the overlay surface spacing hints are drawn on. The core only talks
//! to it through `SceneAdapter`, and treats it as the source of truth for
//! identity and z-order.

use crate::error::AdapterError;
use crate::spacing::SpacingHint;
use crate::task::TaskTicket;
use ovl_core::{Bounds, ElementId, NodeMeta, NodePatch, SceneNode};

/// Result payload of an asynchronous scene task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    /// Detached deep copy of a node, metadata included. Not yet in the scene.
    Cloned(SceneNode),
    /// The scene has been replaced by the deserialized payload.
    Deserialized,
}

/// Completion notification for a task started with `begin_clone` or
/// `begin_deserialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub ticket: TaskTicket,
    pub result: Result<TaskOutput, AdapterError>,
}

/// Final raster produced by `rasterize`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes, format chosen by the renderer.
    pub bytes: Vec<u8>,
}

pub trait SceneAdapter {
    /// Add a node on top of the draw order.
    fn add_node(&mut self, node: SceneNode);

    fn remove_node(&mut self, id: ElementId) -> Option<SceneNode>;

    /// Every node in draw order, back-most first.
    fn nodes(&self) -> Vec<SceneNode>;

    fn node(&self, id: ElementId) -> Option<SceneNode>;

    /// Draw slot of the node carrying `id`.
    fn position_of(&self, id: ElementId) -> Option<usize> {
        self.nodes().iter().position(|n| n.id() == Some(id))
    }

    /// Write one property on a live text node. False if no such node.
    fn set_props(&mut self, id: ElementId, patch: &NodePatch) -> bool;

    /// Replace the metadata of the node at draw slot `pos`. Addressed by
    /// slot because nodes without an id cannot be addressed otherwise.
    fn set_meta_at(&mut self, pos: usize, meta: NodeMeta) -> bool;

    /// Axis-aligned bounds including rotation and scale.
    fn bounding_rect(&self, id: ElementId) -> Option<Bounds>;

    /// One slot toward the front. False at the top slot.
    fn bring_forward(&mut self, id: ElementId) -> bool;

    /// One slot toward the back. False at the bottom slot.
    fn send_backward(&mut self, id: ElementId) -> bool;

    /// Start cloning a node. Completes with `TaskOutput::Cloned`.
    fn begin_clone(&mut self, ticket: TaskTicket, id: ElementId);

    /// Serialize the whole scene, node metadata included.
    fn serialize(&self) -> Result<String, AdapterError>;

    /// Start replacing the scene from `payload`. Completes with
    /// `TaskOutput::Deserialized`.
    fn begin_deserialize(&mut self, ticket: TaskTicket, payload: String);

    /// The single node property edits target, if any.
    fn active(&self) -> Option<ElementId>;

    /// Make `id` the active node, or clear with `None`. Locked nodes are
    /// refused.
    fn set_active(&mut self, id: Option<ElementId>) -> bool;

    /// Every node currently selected, active one included.
    fn selected(&self) -> Vec<ElementId>;

    fn set_dimensions(&mut self, width: f64, height: f64);

    fn request_repaint(&mut self);

    /// Wipe the overlay surface. Overlay content is never exported.
    fn clear_overlay(&mut self);

    fn draw_gap(&mut self, hint: &SpacingHint);

    /// Produce the final raster at `multiplier` × canvas size.
    fn rasterize(&mut self, multiplier: f64) -> Result<ExportedImage, AdapterError>;

    /// Remove every node and any selection.
    fn clear(&mut self);

    /// Next queued completion, for adapters that buffer them instead of
    /// calling back into the editor.
    fn poll_completion(&mut self) -> Option<Completion> {
        None
    }
}
