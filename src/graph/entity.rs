use crate::model::{ClassKind, ClassLike, name_key, normalize_name};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Inheritance cycle through {entity}")]
    Cycle { entity: String },
}

/// What an ancestor/descendant walk does when it meets an entity already on
/// the current path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Treat the cycle as "no API reachable through this path".
    #[default]
    Ignore,
    /// Fail the query with `GraphError::Cycle`.
    Error,
}

impl std::str::FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(CyclePolicy::Ignore),
            "error" => Ok(CyclePolicy::Error),
            _ => Err(format!("Unknown cycle policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Extends,
    Implements,
    Uses,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub kind: ClassKind,
    pub is_api: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(NodeIndex);

/// Class hierarchy of one snapshot.
///
/// Each edge points from the declaring entity to the entity it extends,
/// implements or uses, so one stored edge answers both `extends` and
/// `extended_by`.
#[derive(Debug, Default)]
pub struct EntityGraph {
    graph: DiGraph<Entity, Relation>,
    node_indices: HashMap<String, NodeIndex>,
    cycle_policy: CyclePolicy,
}

impl EntityGraph {
    pub fn new(cycle_policy: CyclePolicy) -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            cycle_policy,
        }
    }

    /// Build the hierarchy from scanned declarations. Referenced names that are
    /// never declared still become entities, typed by how they were referenced.
    pub fn build<'a>(
        declarations: impl IntoIterator<Item = &'a ClassLike>,
        cycle_policy: CyclePolicy,
    ) -> Self {
        let mut graph = Self::new(cycle_policy);

        for decl in declarations {
            let id = graph.find_or_create(&decl.name, decl.kind);
            graph.set_api(id, decl.is_api);

            for parent in &decl.extends {
                let parent_kind = match decl.kind {
                    ClassKind::Interface => ClassKind::Interface,
                    _ => ClassKind::Class,
                };
                let parent_id = graph.find_or_create(parent, parent_kind);
                graph.add_extends(id, parent_id);
            }
            for interface in &decl.implements {
                let interface_id = graph.find_or_create_interface(interface);
                graph.add_implements(id, interface_id);
            }
            for used in &decl.uses {
                let trait_id = graph.find_or_create_trait(used);
                graph.add_uses(id, trait_id);
            }
        }

        tracing::debug!(
            entities = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "Built entity graph"
        );

        graph
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Insert an entity, replacing the kind and API flag of an existing one.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let key = name_key(&entity.name);
        if let Some(&idx) = self.node_indices.get(&key) {
            self.graph[idx] = entity;
            return EntityId(idx);
        }
        let idx = self.graph.add_node(entity);
        self.node_indices.insert(key, idx);
        EntityId(idx)
    }

    pub fn find_entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.id_of(name).map(|id| self.entity(id))
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.node_indices
            .get(&name_key(name))
            .map(|&idx| EntityId(idx))
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.graph[id.0]
    }

    pub fn find_or_create_class(&mut self, name: &str) -> EntityId {
        self.find_or_create(name, ClassKind::Class)
    }

    pub fn find_or_create_interface(&mut self, name: &str) -> EntityId {
        self.find_or_create(name, ClassKind::Interface)
    }

    pub fn find_or_create_trait(&mut self, name: &str) -> EntityId {
        self.find_or_create(name, ClassKind::Trait)
    }

    fn find_or_create(&mut self, name: &str, kind: ClassKind) -> EntityId {
        if let Some(id) = self.id_of(name) {
            return id;
        }
        self.add_entity(Entity {
            name: normalize_name(name),
            kind,
            is_api: false,
        })
    }

    pub fn set_api(&mut self, id: EntityId, is_api: bool) {
        self.graph[id.0].is_api = is_api;
    }

    pub fn add_extends(&mut self, child: EntityId, parent: EntityId) {
        self.add_relation(child, parent, Relation::Extends);
    }

    pub fn add_implements(&mut self, class: EntityId, interface: EntityId) {
        self.add_relation(class, interface, Relation::Implements);
    }

    pub fn add_uses(&mut self, class: EntityId, used: EntityId) {
        self.add_relation(class, used, Relation::Uses);
    }

    fn add_relation(&mut self, from: EntityId, to: EntityId, relation: Relation) {
        let exists = self
            .graph
            .edges_connecting(from.0, to.0)
            .any(|edge| *edge.weight() == relation);
        if !exists {
            self.graph.add_edge(from.0, to.0, relation);
        }
    }

    fn related(&self, id: EntityId, relation: Relation, direction: Direction) -> Vec<&Entity> {
        let mut related: Vec<&Entity> = self
            .graph
            .edges_directed(id.0, direction)
            .filter(|edge| *edge.weight() == relation)
            .map(|edge| match direction {
                Direction::Outgoing => &self.graph[edge.target()],
                Direction::Incoming => &self.graph[edge.source()],
            })
            .collect();
        related.sort_by(|a, b| a.name.cmp(&b.name));
        related
    }

    pub fn extends(&self, id: EntityId) -> Vec<&Entity> {
        self.related(id, Relation::Extends, Direction::Outgoing)
    }

    pub fn extended_by(&self, id: EntityId) -> Vec<&Entity> {
        self.related(id, Relation::Extends, Direction::Incoming)
    }

    pub fn implements(&self, id: EntityId) -> Vec<&Entity> {
        self.related(id, Relation::Implements, Direction::Outgoing)
    }

    pub fn implemented_by(&self, id: EntityId) -> Vec<&Entity> {
        self.related(id, Relation::Implements, Direction::Incoming)
    }

    pub fn uses(&self, id: EntityId) -> Vec<&Entity> {
        self.related(id, Relation::Uses, Direction::Outgoing)
    }

    pub fn used_by(&self, id: EntityId) -> Vec<&Entity> {
        self.related(id, Relation::Uses, Direction::Incoming)
    }

    /// Whether any transitive extends/implements/uses predecessor is API.
    pub fn has_api_ancestor(&self, id: EntityId) -> Result<bool, GraphError> {
        self.reaches(id, Direction::Outgoing, &|entity| entity.is_api, None)
    }

    /// Whether any transitive extender, implementor or user is API.
    pub fn has_api_descendant(&self, id: EntityId) -> Result<bool, GraphError> {
        self.reaches(id, Direction::Incoming, &|entity| entity.is_api, None)
    }

    /// Whether `child` is `ancestor` or reaches it through extends edges.
    pub fn inherits_from(&self, child: &str, ancestor: &str) -> Result<bool, GraphError> {
        let (Some(child), Some(ancestor)) = (self.id_of(child), self.id_of(ancestor)) else {
            return Ok(false);
        };
        if child == ancestor {
            return Ok(true);
        }
        self.reaches(
            child,
            Direction::Outgoing,
            &|entity| self.id_of(&entity.name) == Some(ancestor),
            Some(&[Relation::Extends]),
        )
    }

    fn reaches(
        &self,
        start: EntityId,
        direction: Direction,
        matches: &dyn Fn(&Entity) -> bool,
        relations: Option<&[Relation]>,
    ) -> Result<bool, GraphError> {
        let mut visited = HashSet::from([start.0]);
        let mut on_path = HashSet::from([start.0]);
        self.walk(
            start.0,
            direction,
            matches,
            relations,
            &mut visited,
            &mut on_path,
        )
    }

    fn walk(
        &self,
        node: NodeIndex,
        direction: Direction,
        matches: &dyn Fn(&Entity) -> bool,
        relations: Option<&[Relation]>,
        visited: &mut HashSet<NodeIndex>,
        on_path: &mut HashSet<NodeIndex>,
    ) -> Result<bool, GraphError> {
        for edge in self.graph.edges_directed(node, direction) {
            if relations.is_some_and(|allowed| !allowed.contains(edge.weight())) {
                continue;
            }
            let next = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };

            if on_path.contains(&next) {
                match self.cycle_policy {
                    CyclePolicy::Ignore => {
                        tracing::warn!(
                            entity = %self.graph[next].name,
                            "Inheritance cycle ignored"
                        );
                        continue;
                    }
                    CyclePolicy::Error => {
                        return Err(GraphError::Cycle {
                            entity: self.graph[next].name.clone(),
                        });
                    }
                }
            }
            if !visited.insert(next) {
                continue;
            }
            if matches(&self.graph[next]) {
                return Ok(true);
            }

            on_path.insert(next);
            let found = self.walk(next, direction, matches, relations, visited, on_path)?;
            on_path.remove(&next);
            if found {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
