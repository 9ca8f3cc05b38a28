//! Domain layer: topology, remote bindings and sync states

pub mod entities;
pub mod value_objects;
