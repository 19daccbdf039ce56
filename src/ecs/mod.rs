pub mod component;
pub mod entity;
pub mod resource;
pub mod world;

pub use component::{Component, ComponentManager};
pub use entity::{EntityId, EntityManager};
pub use resource::ResourceManager;
pub use world::World;
