//! The editing core.
//!
//! `Editor` owns the layer list, history, selection and task guard, and
//! drives a `SceneAdapter`. Every committed mutation follows the same path:
//! write the scene, bring the layer list in line (directly for edits the
//! core authors, by reconciling otherwise), record a snapshot, persist.
//!
//! Asynchronous work (clone, restore, load) is started here and finished in
//! `complete`, the single place completions are applied.

use crate::adapter::{Completion, ExportedImage, SceneAdapter, TaskOutput};
use crate::background::{Background, fit_canvas};
use crate::config::EditorConfig;
use crate::edit::PropertyEdit;
use crate::error::{AdapterError, EditorError, EditorResult};
use crate::history::{HistoryEngine, Snapshot};
use crate::layers::LayerStore;
use crate::spacing::{SpacingHint, SpacingHintEngine};
use crate::store::{PersistedState, StateStore};
use crate::task::{TaskGuard, TaskKind, TaskTicket};
use ovl_core::{
    Color, ElementId, FontWeight, Placement, TextAlign, TextElement, TextProps, Typography,
};
use smallvec::SmallVec;

/// Context kept while an asynchronous task is outstanding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingTask {
    Clone { source: ElementId },
    Restore {
        target: usize,
        background: Background,
    },
    Load,
}

/// The current selection as the core sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Target of property edits. Never locked.
    pub active: Option<ElementId>,
    /// Everything concurrently selected, used for spacing hints only.
    pub group: SmallVec<[ElementId; 4]>,
}

impl Selection {
    pub fn contains(&self, id: ElementId) -> bool {
        self.active == Some(id) || self.group.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.group.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub struct Editor<S: SceneAdapter, P: StateStore> {
    pub(crate) scene: S,
    pub(crate) store: P,
    pub(crate) config: EditorConfig,
    pub(crate) layers: LayerStore,
    pub(crate) history: HistoryEngine,
    pub(crate) tasks: TaskGuard<PendingTask>,
    pub(crate) selection: Selection,
    pub(crate) spacing: SpacingHintEngine,
    pub(crate) background: Background,
    pub(crate) notices: Vec<Notice>,
}

impl<S: SceneAdapter, P: StateStore> Editor<S, P> {
    /// Build an editor, restoring whatever `store` holds.
    ///
    /// A malformed blob is discarded and the editor starts fresh. Elements
    /// missing from `scene` are re-created from their records.
    pub fn new(mut scene: S, mut store: P, config: EditorConfig) -> EditorResult<Self> {
        let state = match store.load()? {
            Some(blob) => PersistedState::from_json(&blob).unwrap_or_else(|e| {
                log::warn!("discarding persisted state: {e}");
                PersistedState::default()
            }),
            None => PersistedState::default(),
        };

        let background = Background {
            reference: state.background_image_reference,
            canvas_width: state.canvas_width.unwrap_or(config.default_canvas_width),
            canvas_height: state.canvas_height.unwrap_or(config.default_canvas_height),
            native_width: state.original_width,
            native_height: state.original_height,
        };
        scene.set_dimensions(background.canvas_width, background.canvas_height);

        for element in &state.elements {
            if scene.node(element.id).is_none() {
                scene.add_node(element.to_node());
            }
        }

        let history = HistoryEngine::from_parts(
            state.history_snapshots,
            state.history_cursor,
            config.history_capacity,
        );

        let mut editor = Self {
            scene,
            store,
            config,
            layers: LayerStore::new(),
            history,
            tasks: TaskGuard::new(),
            selection: Selection::default(),
            spacing: SpacingHintEngine::new(),
            background,
            notices: Vec::new(),
        };
        editor.recover();
        if editor.history.is_empty() {
            editor.commit();
        }
        log::info!(
            "editor ready: {} elements, {} snapshots",
            editor.layers.len(),
            editor.history.len()
        );
        Ok(editor)
    }

    // ─── Canvas ──────────────────────────────────────────────────────────

    /// Place the overlays on a new background image of the given native
    /// size. The canvas is fitted into the configured maximum.
    pub fn set_background(
        &mut self,
        reference: impl Into<String>,
        native_width: f64,
        native_height: f64,
    ) -> bool {
        if self.edits_blocked("set_background") {
            return false;
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(native_width) || !valid(native_height) {
            log::error!("background has unusable size {native_width} × {native_height}");
            self.notify(NoticeLevel::Error, "Failed to load image");
            return false;
        }
        let (width, height) = fit_canvas(
            native_width,
            native_height,
            self.config.max_canvas_width,
            self.config.max_canvas_height,
        );
        self.scene.set_dimensions(width, height);
        self.background = Background {
            reference: Some(reference.into()),
            canvas_width: width,
            canvas_height: height,
            native_width: Some(native_width),
            native_height: Some(native_height),
        };
        self.refresh();
        self.commit();
        log::info!("background set, canvas {width} × {height}");
        self.notify(NoticeLevel::Info, "Image uploaded successfully!");
        true
    }

    /// Add a text element with default styling at the canvas centre and
    /// select it.
    pub fn add_text(&mut self) -> Option<ElementId> {
        if self.edits_blocked("add_text") {
            return None;
        }
        let id = self.fresh_id();
        let props = TextProps {
            text: self.config.default_text.clone(),
            typography: Typography {
                font_family: self.config.default_font_family.clone(),
                font_size: self.config.default_font_size,
                font_weight: FontWeight::Normal,
                fill: Color::BLACK,
                opacity: 1.0,
                text_align: TextAlign::Left,
                ..Typography::default()
            },
            placement: Placement {
                left: self.background.canvas_width / 2.0,
                top: self.background.canvas_height / 2.0,
                ..Placement::default()
            },
            ..TextProps::default()
        };
        let element = TextElement::new(id, props);
        self.scene.add_node(element.to_node());
        self.layers.push(element);
        self.scene.set_active(Some(id));
        self.sync_selection();
        self.refresh();
        self.commit();
        log::info!("added text {id}");
        self.notify(NoticeLevel::Info, "Text layer added!");
        Some(id)
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Change one property of an element, on the scene and the record.
    ///
    /// Refused for locked elements and unknown ids.
    pub fn update_field(&mut self, id: ElementId, edit: PropertyEdit) -> bool {
        if self.edits_blocked("update_field") {
            return false;
        }
        match self.layers.get(id) {
            None => {
                log::debug!("update_field: no element {id}");
                return false;
            }
            Some(element) if element.locked => {
                log::debug!("update_field: {id} is locked");
                return false;
            }
            Some(_) => {}
        }
        let patch = edit.into_patch();
        if !self.scene.set_props(id, &patch) {
            log::warn!("update_field: {id} is in the layer list but not the scene");
            self.recover();
            return false;
        }
        self.layers.apply_patch(id, &patch);
        self.refresh();
        self.commit();
        true
    }

    /// An interactive transform (move, scale, rotate, text edit) finished
    /// on the scene side.
    pub fn on_object_modified(&mut self) -> bool {
        if self.edits_blocked("on_object_modified") {
            return false;
        }
        self.recover();
        self.refresh();
        self.commit();
        true
    }

    /// The scene's selection changed interactively.
    pub fn on_selection_changed(&mut self) {
        self.sync_selection();
        self.refresh();
    }

    /// Make `id` the active element. Locked elements cannot be selected.
    pub fn select(&mut self, id: ElementId) -> bool {
        if !self.layers.contains(id) {
            log::debug!("select: no element {id}");
            return false;
        }
        if !self.scene.set_active(Some(id)) {
            log::debug!("select: {id} refused by scene");
            return false;
        }
        self.sync_selection();
        self.refresh();
        true
    }

    pub fn clear_selection(&mut self) {
        self.scene.set_active(None);
        self.sync_selection();
        self.refresh();
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Start restoring the previous snapshot. `None` at the oldest
    /// snapshot or while a restore or load is in flight.
    pub fn undo(&mut self) -> Option<TaskTicket> {
        if self.tasks.blocks_edits() {
            log::debug!("undo ignored: restore in flight");
            return None;
        }
        let target = self.history.undo_target()?;
        self.begin_restore(target)
    }

    /// Start restoring the next snapshot. `None` at the newest snapshot or
    /// while a restore or load is in flight.
    pub fn redo(&mut self) -> Option<TaskTicket> {
        if self.tasks.blocks_edits() {
            log::debug!("redo ignored: restore in flight");
            return None;
        }
        let target = self.history.redo_target()?;
        self.begin_restore(target)
    }

    fn begin_restore(&mut self, target: usize) -> Option<TaskTicket> {
        let snapshot = match Snapshot::from_json(self.history.snapshot(target)?) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("history snapshot {target} is unreadable: {e}");
                self.notify(NoticeLevel::Error, "Failed to restore history");
                return None;
            }
        };
        let ticket = self.tasks.begin(
            TaskKind::Restore,
            PendingTask::Restore {
                target,
                background: snapshot.background,
            },
        )?;
        self.scene.begin_deserialize(ticket, snapshot.scene);
        log::debug!("restoring snapshot {target}");
        Some(ticket)
    }

    /// Replace the scene with a serialized one. Committed like an edit once
    /// it completes.
    pub fn load_scene(&mut self, payload: impl Into<String>) -> EditorResult<TaskTicket> {
        if self.tasks.blocks_edits() {
            return Err(EditorError::Busy(TaskKind::Load));
        }
        let ticket = self
            .tasks
            .begin(TaskKind::Load, PendingTask::Load)
            .ok_or(EditorError::Busy(TaskKind::Load))?;
        self.scene.begin_deserialize(ticket, payload.into());
        Ok(ticket)
    }

    // ─── Completions ─────────────────────────────────────────────────────

    /// Apply the result of an asynchronous task. Returns true if anything
    /// was committed.
    pub fn complete(&mut self, completion: Completion) -> bool {
        let Some(task) = self.tasks.finish(completion.ticket) else {
            log::warn!("dropping stale {:?} completion", completion.ticket.kind);
            return false;
        };
        match (task, completion.result) {
            (PendingTask::Restore { target, background }, Ok(TaskOutput::Deserialized)) => {
                self.history.move_to(target);
                self.scene.set_dimensions(background.canvas_width, background.canvas_height);
                self.background = background;
                self.recover();
                self.refresh();
                self.persist();
                log::debug!("restored snapshot {target}");
                true
            }
            (PendingTask::Load, Ok(TaskOutput::Deserialized)) => {
                self.recover();
                self.refresh();
                self.commit();
                log::info!("loaded scene with {} elements", self.layers.len());
                true
            }
            (PendingTask::Clone { source }, Ok(TaskOutput::Cloned(node))) => {
                if self.tasks.blocks_edits() {
                    log::warn!("duplicate of {source} abandoned: scene is being replaced");
                    self.notify(NoticeLevel::Info, "Duplicate cancelled");
                    return false;
                }
                self.finish_duplicate(source, node)
            }
            (task, Ok(output)) => {
                log::warn!("{task:?} completed with unexpected {output:?}");
                self.recover();
                false
            }
            (task, Err(e)) => {
                log::error!("{task:?} failed: {e}");
                let message = match task {
                    PendingTask::Clone { .. } => "Failed to duplicate layer",
                    PendingTask::Restore { .. } => "Failed to restore history",
                    PendingTask::Load => "Failed to load scene",
                };
                self.notify(NoticeLevel::Error, message);
                self.recover();
                false
            }
        }
    }

    /// Apply every completion the scene has queued. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.scene.poll_completion() {
            self.complete(completion);
            applied += 1;
        }
        applied
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Redraw spacing hints for the current selection without scheduling
    /// another render. Meant for the host's after-render hook.
    pub fn repaint(&mut self) -> &[SpacingHint] {
        self.spacing.repaint(&mut self.scene, &self.selection.group)
    }

    /// Rasterize the scene at the background's native resolution, with no
    /// hints in the image.
    pub fn export(&mut self) -> EditorResult<ExportedImage> {
        let multiplier = self.background.export_multiplier();
        self.scene.clear_overlay();
        let result = self.scene.rasterize(multiplier);
        self.refresh();
        match result {
            Ok(image) => {
                log::info!("exported {} × {}", image.width, image.height);
                self.notify(NoticeLevel::Info, "Image exported successfully!");
                Ok(image)
            }
            Err(e) => {
                log::error!("export failed: {e}");
                self.notify(NoticeLevel::Error, "Failed to export image");
                Err(e.into())
            }
        }
    }

    /// Drop everything: scene, layers, history, background and the
    /// persisted blob.
    pub fn reset(&mut self) -> EditorResult<()> {
        self.tasks.clear();
        self.scene.clear();
        self.scene.clear_overlay();
        self.layers.clear();
        self.history.clear();
        self.selection = Selection::default();
        self.spacing.clear();
        self.background = Background::blank(
            self.config.default_canvas_width,
            self.config.default_canvas_height,
        );
        self.scene
            .set_dimensions(self.background.canvas_width, self.background.canvas_height);
        self.store.clear()?;
        self.snapshot();
        self.refresh();
        log::info!("editor reset");
        self.notify(NoticeLevel::Info, "Editor reset!");
        Ok(())
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// For hosts that drive the scene interactively. Follow up with
    /// `on_object_modified` or `on_selection_changed`.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn elements(&self) -> &[TextElement] {
        self.layers.elements()
    }

    pub fn element(&self, id: ElementId) -> Option<&TextElement> {
        self.layers.get(id)
    }

    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn active(&self) -> Option<ElementId> {
        self.selection.active
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn hints(&self) -> &[SpacingHint] {
        self.spacing.hints()
    }

    pub fn is_busy(&self, kind: TaskKind) -> bool {
        self.tasks.is_busy(kind)
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    pub(crate) fn edits_blocked(&self, op: &str) -> bool {
        let blocked = self.tasks.blocks_edits();
        if blocked {
            log::debug!("{op} refused: scene is being replaced");
        }
        blocked
    }

    /// An id not used by any record or scene node.
    pub(crate) fn fresh_id(&self) -> ElementId {
        ElementId::mint_unique(&self.config.id_prefix, |c| {
            self.layers.contains(c) || self.scene.node(c).is_some()
        })
    }

    /// Snapshot and persist.
    pub(crate) fn commit(&mut self) {
        self.snapshot();
        self.persist();
    }

    /// Record the scene and background as one history entry.
    fn snapshot(&mut self) {
        let entry = self.scene.serialize().and_then(|scene| {
            Snapshot {
                background: self.background.clone(),
                scene,
            }
            .to_json()
            .map_err(|e| AdapterError::Serialize(e.to_string()))
        });
        match entry {
            Ok(entry) => self.history.record(entry),
            Err(e) => {
                log::error!("snapshot skipped: {e}");
                self.notify(NoticeLevel::Error, "Failed to save history");
            }
        }
    }

    fn persist(&mut self) {
        let state = PersistedState {
            background_image_reference: self.background.reference.clone(),
            elements: self.layers.elements().to_vec(),
            history_snapshots: self.history.snapshots().to_vec(),
            history_cursor: self.history.cursor_value(),
            canvas_width: Some(self.background.canvas_width),
            canvas_height: Some(self.background.canvas_height),
            original_width: self.background.native_width,
            original_height: self.background.native_height,
        };
        let saved = state.to_json().and_then(|blob| self.store.save(&blob));
        if let Err(e) = saved {
            log::error!("failed to persist editor state: {e}");
        }
    }

    /// Redraw hints for the current selection and schedule a render.
    pub(crate) fn refresh(&mut self) {
        self.spacing.repaint(&mut self.scene, &self.selection.group);
        self.scene.request_repaint();
    }

    /// Rebuild the layer list from the scene and resync selection.
    pub(crate) fn recover(&mut self) {
        let minted = self.layers.reconcile(&mut self.scene, &self.config.id_prefix);
        if minted > 0 {
            log::debug!("reconcile attached {minted} new ids");
        }
        self.sync_selection();
    }

    pub(crate) fn sync_selection(&mut self) {
        let layers = &self.layers;
        self.selection.active = self
            .scene
            .active()
            .filter(|&id| layers.get(id).is_some_and(|e| !e.locked));
        self.selection.group = self
            .scene
            .selected()
            .into_iter()
            .filter(|&id| layers.get(id).is_some_and(|e| !e.locked))
            .collect();
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }
}

impl<S: SceneAdapter + std::fmt::Debug, P: StateStore + std::fmt::Debug> std::fmt::Debug
    for Editor<S, P>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("store", &self.store)
            .field("layers", &self.layers)
            .field("history_len", &self.history.len())
            .field("selection", &self.selection)
            .finish()
    }
}
