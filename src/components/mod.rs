//! Inert geometry/mass components attachable to a vehicle entity.

mod bodytube;
mod finset;
mod nosecone;
mod parachute;

pub use bodytube::Bodytube;
pub use finset::Finset;
pub use nosecone::Nosecone;
pub use parachute::{EventTag, Parachute};
