use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::EntityId;

/// Marker for types that can be attached to an entity.
pub trait Component: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Component for T {}

trait ErasedStorage: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove(&mut self, entity: EntityId) -> bool;
    fn contains(&self, entity: EntityId) -> bool;
}

struct VecStorage<T> {
    data: Vec<Option<T>>,
}

impl<T> VecStorage<T> {
    fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn insert(&mut self, entity: EntityId, value: T) {
        let index = entity.index();
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
        self.data[index] = Some(value);
    }

    fn get(&self, entity: EntityId) -> Option<&T> {
        self.data.get(entity.index()).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.data.get_mut(entity.index()).and_then(Option::as_mut)
    }

    fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|c| (EntityId::new(i as u32), c)))
    }
}

impl<T: Send + Sync + 'static> ErasedStorage for VecStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        let index = entity.index();
        if index < self.data.len() && self.data[index].is_some() {
            self.data[index] = None;
            true
        } else {
            false
        }
    }

    fn contains(&self, entity: EntityId) -> bool {
        let index = entity.index();
        index < self.data.len() && self.data[index].is_some()
    }
}

/// Type-keyed storage for every [`Component`] type attached anywhere in the
/// [`super::World`]. One [`VecStorage<T>`] is lazily created per distinct `T`.
#[derive(Default)]
pub struct ComponentManager {
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl ComponentManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage_mut<T: Component>(&mut self) -> &mut VecStorage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(VecStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<VecStorage<T>>()
            .expect("storage type mismatch")
    }

    pub fn insert<T: Component>(&mut self, entity: EntityId, component: T) {
        self.storage_mut::<T>().insert(entity, component);
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<VecStorage<T>>()
            .and_then(|s| s.get(entity))
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storage_mut::<T>().get_mut(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> bool {
        match self.storages.get_mut(&TypeId::of::<T>()) {
            Some(storage) => storage.remove(entity),
            None => false,
        }
    }

    pub fn contains<T: Component>(&self, entity: EntityId) -> bool {
        self.storages
            .get(&TypeId::of::<T>())
            .map_or(false, |s| s.contains(entity))
    }

    pub fn iter<T: Component>(&self) -> Box<dyn Iterator<Item = (EntityId, &T)> + '_> {
        match self.storages.get(&TypeId::of::<T>()) {
            Some(storage) => match storage.as_any().downcast_ref::<VecStorage<T>>() {
                Some(s) => Box::new(s.iter()),
                None => Box::new(std::iter::empty()),
            },
            None => Box::new(std::iter::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f64,
    }

    #[test]
    fn insert_and_get() {
        let mut cm = ComponentManager::new();
        let e = EntityId::new(0);
        cm.insert(e, Position { x: 1.0 });
        assert_eq!(cm.get::<Position>(e), Some(&Position { x: 1.0 }));
    }

    #[test]
    fn remove_clears_slot() {
        let mut cm = ComponentManager::new();
        let e = EntityId::new(0);
        cm.insert(e, Position { x: 1.0 });
        assert!(cm.remove::<Position>(e));
        assert_eq!(cm.get::<Position>(e), None);
    }

    #[test]
    fn iterates_all_entities_with_component() {
        let mut cm = ComponentManager::new();
        cm.insert(EntityId::new(0), Position { x: 1.0 });
        cm.insert(EntityId::new(1), Position { x: 2.0 });
        let found: Vec<_> = cm.iter::<Position>().collect();
        assert_eq!(found.len(), 2);
    }
}
