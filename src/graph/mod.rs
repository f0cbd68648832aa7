mod entity;

pub use entity::{CyclePolicy, Entity, EntityGraph, EntityId, GraphError, Relation};
