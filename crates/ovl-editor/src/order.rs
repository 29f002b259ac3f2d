//! Z-order, duplicate, lock, visibility and delete.
//!
//! Draw order is only ever changed on the scene; the layer list is re-sorted
//! from it afterwards.

use crate::adapter::SceneAdapter;
use crate::editor::{Editor, PendingTask};
use crate::store::StateStore;
use crate::task::{TaskKind, TaskTicket};
use ovl_core::{ElementId, NodeMeta, NodePatch, SceneNode, TextElement};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward the front.
    Up,
    /// Toward the back.
    Down,
}

impl<S: SceneAdapter, P: StateStore> Editor<S, P> {
    /// Move an element one slot in draw order. False at the top (up) or
    /// bottom (down) slot.
    pub fn reorder(&mut self, id: ElementId, direction: Direction) -> bool {
        if self.edits_blocked("reorder") {
            return false;
        }
        if !self.layers.contains(id) {
            log::debug!("reorder: no element {id}");
            return false;
        }
        let moved = match direction {
            Direction::Up => self.scene.bring_forward(id),
            Direction::Down => self.scene.send_backward(id),
        };
        if !moved {
            log::debug!("reorder: {id} already at the {direction:?} end");
            return false;
        }
        if !self.layers.reorder_from_scene(&self.scene) {
            log::warn!("layer list drifted from scene, reconciling");
            self.recover();
        }
        self.refresh();
        self.commit();
        true
    }

    /// Start duplicating an element. The copy is inserted when the clone
    /// completes; until then nothing changes.
    pub fn duplicate(&mut self, id: ElementId) -> Option<TaskTicket> {
        if self.edits_blocked("duplicate") {
            return None;
        }
        if !self.layers.contains(id) {
            log::debug!("duplicate: no element {id}");
            return None;
        }
        let Some(ticket) = self
            .tasks
            .begin(TaskKind::Clone, PendingTask::Clone { source: id })
        else {
            log::debug!("duplicate: a clone is already in flight");
            return None;
        };
        self.scene.begin_clone(ticket, id);
        Some(ticket)
    }

    /// Insert a finished clone of `source` on top, offset, under a fresh id.
    pub(crate) fn finish_duplicate(&mut self, source: ElementId, mut node: SceneNode) -> bool {
        let locked = self
            .layers
            .get(source)
            .map_or(node.meta.locked, |e| e.locked);
        let (dx, dy) = self.config.duplicate_offset;
        let Some(props) = node.text_props_mut() else {
            log::warn!("clone of {source} is not a text node");
            self.recover();
            return false;
        };
        props.placement.left += dx;
        props.placement.top += dy;
        let props = props.clone();

        let id = self.fresh_id();
        node.meta = NodeMeta {
            id: Some(id),
            locked,
        };
        self.scene.add_node(node);
        self.layers.push(TextElement { id, locked, props });
        if !locked {
            self.scene.set_active(Some(id));
        }
        self.sync_selection();
        self.refresh();
        self.commit();
        log::info!("duplicated {source} as {id}");
        true
    }

    /// Flip the lock flag on both the scene node and the record. Locking a
    /// selected element drops the selection.
    pub fn toggle_lock(&mut self, id: ElementId) -> bool {
        if self.edits_blocked("toggle_lock") {
            return false;
        }
        let Some(locked) = self.layers.get(id).map(|e| !e.locked) else {
            log::debug!("toggle_lock: no element {id}");
            return false;
        };
        let written = self
            .scene
            .position_of(id)
            .is_some_and(|pos| self.scene.set_meta_at(pos, NodeMeta { id: Some(id), locked }));
        if !written {
            log::warn!("toggle_lock: {id} is in the layer list but not the scene");
            self.recover();
            return false;
        }
        self.layers.set_locked(id, locked);
        if locked && self.selection.contains(id) {
            self.scene.set_active(None);
        }
        self.sync_selection();
        self.refresh();
        self.commit();
        true
    }

    /// Show or hide an element. Independent of the lock flag.
    pub fn toggle_visibility(&mut self, id: ElementId) -> bool {
        if self.edits_blocked("toggle_visibility") {
            return false;
        }
        let Some(visible) = self.layers.get(id).map(|e| !e.props.visible) else {
            log::debug!("toggle_visibility: no element {id}");
            return false;
        };
        let patch = NodePatch::Visible(visible);
        if !self.scene.set_props(id, &patch) {
            log::warn!("toggle_visibility: {id} is in the layer list but not the scene");
            self.recover();
            return false;
        }
        self.layers.apply_patch(id, &patch);
        self.refresh();
        self.commit();
        true
    }

    /// Remove an element. Clears the selection if it was selected.
    pub fn delete(&mut self, id: ElementId) -> bool {
        if self.edits_blocked("delete") {
            return false;
        }
        if !self.layers.contains(id) {
            log::debug!("delete: no element {id}");
            return false;
        }
        let was_selected = self.selection.contains(id);
        if self.scene.remove_node(id).is_none() {
            log::warn!("delete: {id} was already gone from the scene");
        }
        self.layers.remove(id);
        if was_selected {
            self.scene.set_active(None);
        }
        self.sync_selection();
        self.refresh();
        self.commit();
        log::info!("deleted {id}");
        true
    }
}
