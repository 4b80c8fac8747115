use egui::{Pos2, vec2};

use crate::element::{Element, ElementPatch, ElementPrototype};
use crate::id_generator::{ElementId, generate_id};

/// Offset applied to duplicated elements so the copy is visible
pub const DUPLICATE_OFFSET: f32 = 20.0;

/// The live element collection plus the current selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
    selected: Option<ElementId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            selected: None,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Elements in paint order: ascending z, ties by collection order
    pub fn elements_by_z(&self) -> Vec<&Element> {
        let mut sorted = self.elements.iter().collect::<Vec<_>>();
        // stable sort keeps collection order for equal z
        sorted.sort_by_key(|e| e.z_index);
        sorted
    }

    /// Top-most element containing `pos`
    pub fn element_at(&self, pos: Pos2) -> Option<&Element> {
        self.elements_by_z()
            .into_iter()
            .rev()
            .find(|e| e.hit_test(pos))
    }

    /// Append a new element built from `prototype` and select it.
    /// Its z-index is the collection length at insertion time.
    pub fn add(&mut self, prototype: &ElementPrototype) -> ElementId {
        let element = prototype.instantiate(self.elements.len());
        let id = element.id;
        self.elements.push(element);
        self.selected = Some(id);
        id
    }

    /// Merge `patch` into the element. Returns false for unknown ids.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove an element, clearing the selection if it pointed at it
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.elements.remove(index))
    }

    /// Replace the whole collection and clear the selection
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.selected = None;
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        // never select something that isn't there
        self.selected = id.filter(|id| self.element(*id).is_some());
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.element(self.selected?)
    }

    /// Copy an element with a fresh id, offset down and right, and select the copy
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let mut copy = self.element(id)?.clone();
        copy.id = generate_id();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.z_index = self.elements.len();
        let new_id = copy.id;
        self.elements.push(copy);
        self.selected = Some(new_id);
        Some(new_id)
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let max = self.elements.iter().map(|e| e.z_index).max().unwrap_or(0);
        match self.element_mut(id) {
            Some(element) => {
                element.z_index = max + 1;
                true
            }
            None => false,
        }
    }

    /// Put an element below all others. At z 0 the rest are shifted up instead.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        let min = self.elements.iter().map(|e| e.z_index).min().unwrap_or(0);
        if min > 0 {
            if let Some(element) = self.element_mut(id) {
                element.z_index = min - 1;
            }
        } else {
            for element in &mut self.elements {
                if element.id == id {
                    element.z_index = 0;
                } else {
                    element.z_index += 1;
                }
            }
        }
        true
    }

    /// Move an element by a delta, keeping it on the page
    pub fn nudge(&mut self, id: ElementId, dx: f32, dy: f32, page: egui::Vec2) -> bool {
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        let max = (page - vec2(element.width, element.height)).max(egui::Vec2::ZERO);
        element.x = (element.x + dx).clamp(0.0, max.x);
        element.y = (element.y + dy).clamp(0.0, max.y);
        true
    }
}
