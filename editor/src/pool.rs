//! Element pool: the in-memory owner of every placed element.
//!
//! The pool holds the element array, the selection (an insertion-ordered set
//! of ids), the "elements are being dragged" flag and the template variable
//! map. Geometry policy (grid, viewport clipping) lives in the editor; the
//! pool only stores what it is told.
//!
//! Array order carries no meaning for display. Draw order is derived from
//! each element's `zindex` via [`ElementPool::display_order`].

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;

use std::collections::BTreeSet;

use crate::element::{DElement, DElementData, ElementId};
use crate::geom::Coords;
use crate::pack::{ElementPack, PropertyKind};
use crate::vars::{self, Variables};

/// Errors raised by pool mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("unknown element class: {0}")]
    UnknownKind(String),
}

/// Owner of all placed elements and of the selection.
#[derive(Debug, Clone, Default)]
pub struct ElementPool {
    items: Vec<DElement>,
    selected: Vec<ElementId>,
    dragged: bool,
    variables: Variables,
    variables_map_id: u64,
}

impl ElementPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Elements ---

    #[must_use]
    pub fn items(&self) -> &[DElement] {
        &self.items
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut DElement> {
        self.items.iter_mut()
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&DElement> {
        self.items.iter().find(|el| el.id == *id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut DElement> {
        self.items.iter_mut().find(|el| el.id == *id)
    }

    /// Position of an element in the backing array.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.items.iter().position(|el| el.id == *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Create an element of `kind` at `pos` with a deep copy of the class defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnknownKind`] when the pack has no such class.
    pub fn add(&mut self, pack: &ElementPack, kind: &str, pos: Coords) -> Result<ElementId, PoolError> {
        let class = pack.class(kind).ok_or_else(|| PoolError::UnknownKind(kind.to_owned()))?;
        let el = DElement::from_data(DElementData {
            kind: kind.to_owned(),
            params: class.defaults.clone(),
            position: pos,
            zindex: 0,
        });
        let id = el.id;
        self.items.push(el);
        Ok(id)
    }

    /// Append an already-built element.
    pub fn push(&mut self, el: DElement) -> ElementId {
        let id = el.id;
        self.items.push(el);
        id
    }

    /// Remove an element. Unknown ids are ignored.
    pub fn delete(&mut self, id: &ElementId) -> Option<DElement> {
        let idx = self.index_of(id)?;
        self.selected.retain(|s| s != id);
        Some(self.items.remove(idx))
    }

    /// Remove every element and reset selection and drag state.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected.clear();
        self.dragged = false;
    }

    // --- Selection ---

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Add an element to the selection. Unknown or already selected ids are ignored.
    pub fn select(&mut self, id: ElementId) {
        if self.get(&id).is_some() && !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    /// Make `id` the only selected element.
    pub fn set_selected(&mut self, id: ElementId) {
        self.selected.clear();
        self.select(id);
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle_selected(&mut self, id: ElementId) {
        if self.is_selected(&id) {
            self.selected.retain(|s| *s != id);
        } else {
            self.select(id);
        }
    }

    /// Replace the selection wholesale, keeping only ids that exist.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selected.clear();
        for id in ids {
            self.select(id);
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub fn selection_active(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Selected ids in the order they were selected.
    #[must_use]
    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selected
    }

    /// Array indices of the selected elements, for undo snapshots.
    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().filter_map(|id| self.index_of(id)).collect()
    }

    pub fn selected_elements(&self) -> impl Iterator<Item = &DElement> {
        self.selected.iter().filter_map(|id| self.get(id))
    }

    /// The selected element drawn on top; ties go to the most recently selected.
    #[must_use]
    pub fn top_selected_element(&self) -> Option<&DElement> {
        self.selected_elements()
            .enumerate()
            .max_by_key(|(order, el)| (el.zindex, *order))
            .map(|(_, el)| el)
    }

    // --- Drag ---

    pub fn set_dragged(&mut self, dragged: bool) {
        self.dragged = dragged;
    }

    #[must_use]
    pub fn elements_dragged(&self) -> bool {
        self.dragged
    }

    // --- Variables ---

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn set_variables(&mut self, variables: Variables) {
        self.variables = variables;
        self.variables_map_id += 1;
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
        self.variables_map_id += 1;
    }

    /// Changes whenever the variable map changes.
    #[must_use]
    pub fn variables_map_id(&self) -> u64 {
        self.variables_map_id
    }

    /// Parameters of `id` with template variables resolved.
    #[must_use]
    pub fn resolved_params(&self, id: &ElementId) -> Option<serde_json::Value> {
        self.get(id).map(|el| vars::substitute_value(&el.params, &self.variables))
    }

    /// OIDs the host should keep state subscriptions for.
    ///
    /// Every string parameter declared as `oid_subscribed` by its class,
    /// after variable substitution, de-duplicated and sorted.
    #[must_use]
    pub fn oids_to_subscribe(&self, pack: &ElementPack) -> Vec<String> {
        let mut oids = BTreeSet::new();
        for el in &self.items {
            let Some(class) = pack.class(&el.kind) else {
                continue;
            };
            for (name, value) in el.params().iter() {
                let subscribed = class
                    .property(name)
                    .is_some_and(|p| p.kind == PropertyKind::OidSubscribed);
                if !subscribed {
                    continue;
                }
                if let Some(oid) = value.as_str().filter(|s| !s.is_empty()) {
                    oids.insert(vars::substitute(oid, &self.variables));
                }
            }
        }
        oids.into_iter().collect()
    }

    // --- Import / export ---

    /// Persisted form of every element, in array order.
    #[must_use]
    pub fn export(&self) -> Vec<DElementData> {
        self.items.iter().map(DElement::to_data).collect()
    }

    /// Replace all elements with `data`, assigning fresh ids.
    pub fn import(&mut self, data: Vec<DElementData>) {
        self.items = data.into_iter().map(DElement::from_data).collect();
        self.selected.clear();
        self.dragged = false;
    }

    /// Elements in draw order: ascending `zindex`, array order within a layer.
    #[must_use]
    pub fn display_order(&self) -> Vec<&DElement> {
        let mut out: Vec<&DElement> = self.items.iter().collect();
        out.sort_by_key(|el| el.zindex);
        out
    }
}
