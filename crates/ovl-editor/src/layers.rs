//! Canonical layer list, reconciled from the scene.
//!
//! The scene is the source of truth for identity and order. `reconcile`
//! rebuilds the list from it after anything the core did not author itself
//! (interactive edits, loads, restores); property edits the core authors
//! are written to both sides directly.

use crate::adapter::SceneAdapter;
use ovl_core::{ElementId, NodeMeta, NodePatch, TextElement};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    /// Back-most first, matching scene draw order.
    elements: Vec<TextElement>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the list from every text node in the scene, in draw order.
    ///
    /// Nodes without an id, or repeating an id already claimed by a node
    /// further back, get a freshly minted one written back onto the node.
    /// Returns how many ids were minted.
    pub fn reconcile<S: SceneAdapter + ?Sized>(&mut self, scene: &mut S, id_prefix: &str) -> usize {
        let nodes = scene.nodes();
        let taken: HashSet<ElementId> = nodes.iter().filter_map(|n| n.id()).collect();
        let mut claimed: HashSet<ElementId> = HashSet::with_capacity(nodes.len());
        let mut elements = Vec::with_capacity(nodes.len());
        let mut minted = 0;

        for (pos, node) in nodes.iter().enumerate() {
            let Some(props) = node.text_props() else {
                continue;
            };
            let id = match node.id() {
                Some(id) if !claimed.contains(&id) => id,
                _ => {
                    let id = ElementId::mint_unique(id_prefix, |c| {
                        taken.contains(&c) || claimed.contains(&c)
                    });
                    scene.set_meta_at(
                        pos,
                        NodeMeta {
                            id: Some(id),
                            locked: node.meta.locked,
                        },
                    );
                    log::debug!("attached id {id} to scene node at slot {pos}");
                    minted += 1;
                    id
                }
            };
            claimed.insert(id);
            elements.push(TextElement {
                id,
                locked: node.meta.locked,
                props: props.clone(),
            });
        }

        self.elements = elements;
        minted
    }

    /// Re-sort the list by the scene's draw order without touching records.
    ///
    /// Returns false when the list and the scene disagree on membership; the
    /// caller must reconcile instead.
    pub fn reorder_from_scene<S: SceneAdapter + ?Sized>(&mut self, scene: &S) -> bool {
        let order: HashMap<ElementId, usize> = scene
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.text_props().is_some())
            .filter_map(|(pos, n)| n.id().map(|id| (id, pos)))
            .collect();
        if order.len() != self.elements.len()
            || self.elements.iter().any(|e| !order.contains_key(&e.id))
        {
            return false;
        }
        self.elements.sort_by_key(|e| order[&e.id]);
        true
    }

    /// Append a record for a node the caller just put on top of the scene.
    pub fn push(&mut self, element: TextElement) {
        self.elements.push(element);
    }

    /// Write one property into a record.
    pub fn apply_patch(&mut self, id: ElementId, patch: &NodePatch) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                patch.apply(&mut element.props);
                true
            }
            None => false,
        }
    }

    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                element.locked = locked;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ElementId) -> Option<TextElement> {
        let pos = self.position(id)?;
        Some(self.elements.remove(pos))
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    /// Front-most first, the order a layers panel lists them in.
    pub fn top_down(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().rev()
    }

    pub fn get(&self, id: ElementId) -> Option<&TextElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut TextElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessScene;
    use ovl_core::{NodeKind, SceneNode, TextProps};
    use pretty_assertions::assert_eq;

    fn text(content: &str) -> TextProps {
        TextProps {
            text: content.into(),
            ..Default::default()
        }
    }

    fn with_id(id: &str, content: &str) -> SceneNode {
        TextElement::new(ElementId::intern(id), text(content)).to_node()
    }

    #[test]
    fn reconcile_keeps_existing_ids_in_draw_order() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.add_node(with_id("layers-a", "A"));
        scene.add_node(with_id("layers-b", "B"));

        let mut layers = LayerStore::new();
        assert_eq!(layers.reconcile(&mut scene, "text"), 0);
        let texts: Vec<&str> = layers.elements().iter().map(|e| e.props.text.as_str()).collect();
        assert_eq!(texts, ["A", "B"]);
        assert_eq!(layers.ids(), [ElementId::intern("layers-a"), ElementId::intern("layers-b")]);
    }

    #[test]
    fn reconcile_mints_and_attaches_missing_ids() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.add_node(SceneNode::text(text("anonymous")));

        let mut layers = LayerStore::new();
        assert_eq!(layers.reconcile(&mut scene, "text"), 1);
        let id = layers.elements()[0].id;
        assert_eq!(scene.nodes()[0].id(), Some(id));

        // A second pass is stable.
        assert_eq!(layers.reconcile(&mut scene, "text"), 0);
        assert_eq!(layers.elements()[0].id, id);
    }

    #[test]
    fn reconcile_splits_duplicate_ids() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.add_node(with_id("layers-twin", "first"));
        scene.add_node(with_id("layers-twin", "second"));

        let mut layers = LayerStore::new();
        assert_eq!(layers.reconcile(&mut scene, "text"), 1);
        let ids = layers.ids();
        assert_eq!(ids[0], ElementId::intern("layers-twin"));
        assert_ne!(ids[1], ids[0]);
        assert_eq!(scene.nodes()[1].id(), Some(ids[1]));
    }

    #[test]
    fn reconcile_skips_non_text_nodes() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.add_node(SceneNode {
            kind: NodeKind::Other {
                type_name: "image".into(),
            },
            meta: NodeMeta::default(),
        });
        scene.add_node(with_id("layers-only", "only"));

        let mut layers = LayerStore::new();
        layers.reconcile(&mut scene, "text");
        assert_eq!(layers.len(), 1);
        assert!(scene.nodes()[0].id().is_none());
    }

    #[test]
    fn reorder_from_scene_follows_draw_order() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.add_node(with_id("layers-x", "x"));
        scene.add_node(with_id("layers-y", "y"));
        let mut layers = LayerStore::new();
        layers.reconcile(&mut scene, "text");

        scene.bring_forward(ElementId::intern("layers-x"));
        assert!(layers.reorder_from_scene(&scene));
        assert_eq!(layers.ids(), [ElementId::intern("layers-y"), ElementId::intern("layers-x")]);

        scene.remove_node(ElementId::intern("layers-y"));
        assert!(!layers.reorder_from_scene(&scene));
    }

    #[test]
    fn patches_and_lock_flags_hit_only_their_record() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.add_node(with_id("layers-p", "p"));
        scene.add_node(with_id("layers-q", "q"));
        let mut layers = LayerStore::new();
        layers.reconcile(&mut scene, "text");

        let p = ElementId::intern("layers-p");
        assert!(layers.apply_patch(p, &NodePatch::FontSize(48.0)));
        assert!(layers.set_locked(p, true));
        assert!(!layers.apply_patch(ElementId::intern("layers-missing"), &NodePatch::Left(1.0)));

        assert_eq!(layers.get(p).unwrap().props.typography.font_size, 48.0);
        assert!(layers.get(p).unwrap().locked);
        let q = layers.get(ElementId::intern("layers-q")).unwrap();
        assert_eq!(q.props.typography.font_size, 32.0);
        assert!(!q.locked);

        let top: Vec<ElementId> = layers.top_down().map(|e| e.id).collect();
        assert_eq!(top[0], ElementId::intern("layers-q"));
    }
}
