//! Replay scripts: a JSON array of editor actions.
//!
//! ```json
//! [
//!   { "action": "addText" },
//!   { "action": "text", "target": "@last", "value": "Hello" },
//!   { "action": "opacity", "target": "@last", "percent": 40 },
//!   { "action": "duplicate", "target": "@last" },
//!   { "action": "undo" }
//! ]
//! ```
//!
//! Targets are element ids, or `@last` for the element most recently added
//! or duplicated.

use ovl_core::{Color, ElementId, FontWeight, TextAlign, TextElement};
use ovl_editor::{
    Direction, Editor, EditorError, HeadlessScene, Notice, NoticeLevel, PropertyEdit,
    StateStore, opacity_percent,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LAST: &str = "@last";

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("`@last` used before any element was created")]
    NoLast,
    #[error("invalid value `{0}`")]
    BadValue(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    AddText,
    Background {
        reference: String,
        width: f64,
        height: f64,
    },
    Text {
        target: String,
        value: String,
    },
    Font {
        target: String,
        family: String,
    },
    FontSize {
        target: String,
        value: f64,
    },
    FontWeight {
        target: String,
        value: String,
    },
    Fill {
        target: String,
        value: String,
    },
    Opacity {
        target: String,
        percent: f64,
    },
    Align {
        target: String,
        value: TextAlign,
    },
    Rotate {
        target: String,
        degrees: f64,
    },
    /// Interactive drag: moves the node on the scene, then reports it.
    Drag {
        target: String,
        left: f64,
        top: f64,
    },
    Reorder {
        target: String,
        direction: Direction,
    },
    Duplicate {
        target: String,
    },
    ToggleLock {
        target: String,
    },
    ToggleVisibility {
        target: String,
    },
    Delete {
        target: String,
    },
    Select {
        targets: Vec<String>,
    },
    Undo,
    Redo,
    Load {
        path: String,
    },
    Export,
    Reset,
}

pub fn parse_script(json: &str) -> Result<Vec<Action>, ReplayError> {
    Ok(serde_json::from_str(json)?)
}

/// One layer as printed in the report, front-most first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub id: String,
    pub text: String,
    pub opacity_percent: u8,
    pub locked: bool,
    pub visible: bool,
    pub left: f64,
    pub top: f64,
}

impl From<&TextElement> for LayerSummary {
    fn from(element: &TextElement) -> Self {
        Self {
            id: element.id.to_string(),
            text: element.props.text.clone(),
            opacity_percent: opacity_percent(element),
            locked: element.locked,
            visible: element.props.visible,
            left: element.props.placement.left,
            top: element.props.placement.top,
        }
    }
}

/// What the editor looks like after a replay.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub layers: Vec<LayerSummary>,
    pub active: Option<String>,
    pub history_length: usize,
    pub history_cursor: i64,
    pub spacing_hints: Vec<String>,
    pub applied: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

pub struct Replay<P: StateStore> {
    editor: Editor<HeadlessScene, P>,
    last: Option<ElementId>,
    applied: usize,
    skipped: usize,
    errors: Vec<String>,
}

impl<P: StateStore> Replay<P> {
    pub fn new(editor: Editor<HeadlessScene, P>) -> Self {
        let last = editor.layers().elements().last().map(|e| e.id);
        Self {
            editor,
            last,
            applied: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Run every action in order. Actions the editor refuses are counted
    /// as skipped; malformed ones abort the replay.
    pub fn run_all(&mut self, actions: Vec<Action>) -> Result<(), ReplayError> {
        for (step, action) in actions.into_iter().enumerate() {
            log::debug!("step {step}: {action:?}");
            if self.run(action)? {
                self.applied += 1;
            } else {
                log::info!("step {step} had no effect");
                self.skipped += 1;
            }
            self.collect_errors();
        }
        Ok(())
    }

    /// Apply one action, delivering any completions it started.
    pub fn run(&mut self, action: Action) -> Result<bool, ReplayError> {
        let applied = match action {
            Action::AddText => {
                let id = self.editor.add_text();
                if id.is_some() {
                    self.last = id;
                }
                id.is_some()
            }
            Action::Background {
                reference,
                width,
                height,
            } => self.editor.set_background(reference, width, height),
            Action::Text { target, value } => self.edit(&target, PropertyEdit::Text(value))?,
            Action::Font { target, family } => {
                self.edit(&target, PropertyEdit::FontFamily(family))?
            }
            Action::FontSize { target, value } => self.edit(&target, PropertyEdit::FontSize(value))?,
            Action::FontWeight { target, value } => {
                let weight = FontWeight::from_token(&value).ok_or(ReplayError::BadValue(value))?;
                self.edit(&target, PropertyEdit::FontWeight(weight))?
            }
            Action::Fill { target, value } => {
                let color = Color::from_hex(&value).ok_or(ReplayError::BadValue(value))?;
                self.edit(&target, PropertyEdit::Fill(color))?
            }
            Action::Opacity { target, percent } => {
                self.edit(&target, PropertyEdit::OpacityPercent(percent))?
            }
            Action::Align { target, value } => self.edit(&target, PropertyEdit::TextAlign(value))?,
            Action::Rotate { target, degrees } => {
                self.edit(&target, PropertyEdit::Rotation(degrees))?
            }
            Action::Drag { target, left, top } => {
                let id = self.resolve(&target)?;
                let moved = self
                    .editor
                    .scene_mut()
                    .graph_mut()
                    .get_mut(id)
                    .filter(|node| !node.meta.locked)
                    .and_then(|node| node.text_props_mut())
                    .map(|props| {
                        props.placement.left = left;
                        props.placement.top = top;
                    })
                    .is_some();
                moved && self.editor.on_object_modified()
            }
            Action::Reorder { target, direction } => {
                let id = self.resolve(&target)?;
                self.editor.reorder(id, direction)
            }
            Action::Duplicate { target } => {
                let id = self.resolve(&target)?;
                let before = self.editor.layers().len();
                self.editor.duplicate(id).is_some() && {
                    self.editor.pump();
                    let added = self.editor.layers().len() > before;
                    if added {
                        self.last = self.editor.layers().elements().last().map(|e| e.id);
                    }
                    added
                }
            }
            Action::ToggleLock { target } => {
                let id = self.resolve(&target)?;
                self.editor.toggle_lock(id)
            }
            Action::ToggleVisibility { target } => {
                let id = self.resolve(&target)?;
                self.editor.toggle_visibility(id)
            }
            Action::Delete { target } => {
                let id = self.resolve(&target)?;
                let deleted = self.editor.delete(id);
                if deleted && self.last == Some(id) {
                    self.last = None;
                }
                deleted
            }
            Action::Select { targets } => {
                let ids = targets
                    .iter()
                    .map(|t| self.resolve(t))
                    .collect::<Result<Vec<_>, _>>()?;
                let selected = self.editor.scene_mut().select_many(&ids);
                self.editor.on_selection_changed();
                selected > 0
            }
            Action::Undo => self.editor.undo().is_some() && self.editor.pump() > 0,
            Action::Redo => self.editor.redo().is_some() && self.editor.pump() > 0,
            Action::Load { path } => {
                let payload = std::fs::read_to_string(&path)
                    .map_err(|source| ReplayError::Io { path, source })?;
                self.editor.load_scene(payload)?;
                self.editor.pump() > 0
            }
            Action::Export => {
                let image = self.editor.export()?;
                log::info!(
                    "export: {} × {}, {} bytes",
                    image.width,
                    image.height,
                    image.bytes.len()
                );
                true
            }
            Action::Reset => {
                self.editor.reset()?;
                self.last = None;
                true
            }
        };
        Ok(applied)
    }

    pub fn report(&self) -> Report {
        let history = self.editor.history();
        Report {
            layers: self
                .editor
                .layers()
                .top_down()
                .map(LayerSummary::from)
                .collect(),
            active: self.editor.active().map(|id| id.to_string()),
            history_length: history.len(),
            history_cursor: history.cursor_value(),
            spacing_hints: self.editor.hints().iter().map(|h| h.label()).collect(),
            applied: self.applied,
            skipped: self.skipped,
            errors: self.errors.clone(),
        }
    }

    fn edit(&mut self, target: &str, edit: PropertyEdit) -> Result<bool, ReplayError> {
        let id = self.resolve(target)?;
        Ok(self.editor.update_field(id, edit))
    }

    fn resolve(&self, target: &str) -> Result<ElementId, ReplayError> {
        if target == LAST {
            self.last.ok_or(ReplayError::NoLast)
        } else {
            Ok(ElementId::intern(target))
        }
    }

    fn collect_errors(&mut self) {
        let notices: Vec<Notice> = self.editor.take_notices();
        self.errors.extend(
            notices
                .into_iter()
                .filter(|n| n.level == NoticeLevel::Error)
                .map(|n| n.message),
        );
    }
}
