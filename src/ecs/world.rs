use super::component::{Component, ComponentManager};
use super::entity::{EntityId, EntityManager};
use super::resource::ResourceManager;

/// Owns every entity, component, and shared resource for one simulation run.
///
/// A hand-rolled `World` (entity/component/resource managers behind a thin
/// facade) rather than `bevy::prelude::World` — this engine drives a fixed,
/// hand-ordered phase sequence, not a generic schedule, so there is no
/// system registry on the world itself.
#[derive(Default)]
pub struct World {
    entities: EntityManager,
    components: ComponentManager,
    resources: ResourceManager,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        self.entities.create()
    }

    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.entities.remove(entity)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn insert<T: Component>(&mut self, entity: EntityId, component: T) {
        self.components.insert(entity, component);
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.components.get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> bool {
        self.components.remove(entity)
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.components.contains::<T>(entity)
    }

    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.components.iter::<T>()
    }

    pub fn insert_resource<R: Send + Sync + 'static>(&mut self, resource: R) {
        self.resources.insert(resource);
    }

    pub fn resource<R: Send + Sync + 'static>(&self) -> Option<&R> {
        self.resources.get()
    }

    pub fn resource_mut<R: Send + Sync + 'static>(&mut self) -> Option<&mut R> {
        self.resources.get_mut()
    }
}
