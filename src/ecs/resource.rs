use std::any::{Any, TypeId};
use std::collections::HashMap;

/// A singleton value shared by every system in a tick (e.g. the atmosphere
/// model, or the timestep), keyed by its concrete type the way a `bevy`-style
/// resource table keys its resources.
#[derive(Default)]
pub struct ResourceManager {
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<R: Send + Sync + 'static>(&mut self, resource: R) {
        self.resources.insert(TypeId::of::<R>(), Box::new(resource));
    }

    pub fn get<R: Send + Sync + 'static>(&self) -> Option<&R> {
        self.resources.get(&TypeId::of::<R>())?.downcast_ref::<R>()
    }

    pub fn get_mut<R: Send + Sync + 'static>(&mut self) -> Option<&mut R> {
        self.resources
            .get_mut(&TypeId::of::<R>())?
            .downcast_mut::<R>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_fetch() {
        let mut rm = ResourceManager::new();
        rm.insert(9.81_f64);
        assert_eq!(*rm.get::<f64>().unwrap(), 9.81);
    }

    #[test]
    fn mutate_in_place() {
        let mut rm = ResourceManager::new();
        rm.insert(1_i32);
        *rm.get_mut::<i32>().unwrap() += 1;
        assert_eq!(*rm.get::<i32>().unwrap(), 2);
    }
}
