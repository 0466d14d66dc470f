//! Canvas document: object storage and z-order.

use crate::objects::{CanvasObject, LinkObject, ObjectId, TextObject};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All objects on the canvas, keyed by id, plus their z-order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// All objects in the document, keyed by ID.
    objects: HashMap<ObjectId, CanvasObject>,
    /// Z-order of objects (back to front, i.e. insertion order unless reordered).
    z_order: Vec<ObjectId>,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from objects listed back to front.
    pub fn from_ordered(objects: impl IntoIterator<Item = CanvasObject>) -> Self {
        let mut document = Self::new();
        for object in objects {
            document.add(object);
        }
        document
    }

    /// Add an object on top of the z-order. Returns its id.
    pub fn add(&mut self, object: CanvasObject) -> ObjectId {
        let id = object.id();
        if self.objects.insert(id, object).is_none() {
            self.z_order.push(id);
        }
        id
    }

    /// Remove an object. Links referring to it are left for [`Self::prune_orphan_links`].
    pub fn remove(&mut self, id: ObjectId) -> Option<CanvasObject> {
        self.z_order.retain(|&object_id| object_id != id);
        self.objects.remove(&id)
    }

    /// Clear all objects from the document.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Look up a text object by id.
    pub fn text(&self, id: ObjectId) -> Option<&TextObject> {
        self.get(id).and_then(CanvasObject::as_text)
    }

    pub fn text_mut(&mut self, id: ObjectId) -> Option<&mut TextObject> {
        self.get_mut(id).and_then(CanvasObject::as_text_mut)
    }

    /// Objects in z-order (back to front).
    pub fn ordered(&self) -> impl DoubleEndedIterator<Item = &CanvasObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Ids in z-order (back to front).
    pub fn ids(&self) -> &[ObjectId] {
        &self.z_order
    }

    /// Position of an object in the z-order.
    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        self.z_order.iter().position(|&object_id| object_id == id)
    }

    /// Objects in paint order: guides first, then everything else, each
    /// group keeping its z-order.
    pub fn paint_order(&self) -> impl Iterator<Item = &CanvasObject> {
        let guides = self.ordered().filter(|o| o.is_guide());
        let rest = self.ordered().filter(|o| !o.is_guide());
        guides.chain(rest)
    }

    /// Bring an object to the front (topmost).
    pub fn bring_to_front(&mut self, id: ObjectId) {
        if self.contains(id) {
            self.z_order.retain(|&object_id| object_id != id);
            self.z_order.push(id);
        }
    }

    /// Send an object to the back (bottommost).
    pub fn send_to_back(&mut self, id: ObjectId) {
        if self.contains(id) {
            self.z_order.retain(|&object_id| object_id != id);
            self.z_order.insert(0, id);
        }
    }

    /// Links that have `id` as an endpoint.
    pub fn links_touching(&self, id: ObjectId) -> Vec<ObjectId> {
        self.ordered()
            .filter_map(CanvasObject::as_link)
            .filter(|link| link.references(id))
            .map(LinkObject::id)
            .collect()
    }

    /// Whether `a` and `b` are already joined by a link, in either direction.
    pub fn are_linked(&self, a: ObjectId, b: ObjectId) -> bool {
        self.ordered()
            .filter_map(CanvasObject::as_link)
            .any(|link| link.connects(a, b))
    }

    /// Remove every link whose endpoints no longer resolve to text objects.
    ///
    /// Returns the ids of the removed links.
    pub fn prune_orphan_links(&mut self) -> Vec<ObjectId> {
        let orphans: Vec<ObjectId> = self
            .ordered()
            .filter_map(CanvasObject::as_link)
            .filter(|link| self.text(link.from).is_none() || self.text(link.to).is_none())
            .map(LinkObject::id)
            .collect();
        for &id in &orphans {
            self.remove(id);
        }
        if !orphans.is_empty() {
            log::debug!("Pruned {} orphan link(s)", orphans.len());
        }
        orphans
    }

    /// Objects back to front, cloned (for snapshots and export).
    pub fn to_ordered_vec(&self) -> Vec<CanvasObject> {
        self.ordered().cloned().collect()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }
}
