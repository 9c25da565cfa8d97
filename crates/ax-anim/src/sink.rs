//! Node transform sinks
//!
//! The player writes local transforms into a [`NodeTransformSink`]. Hosts
//! with their own rig can implement the trait directly; otherwise
//! [`NodeTransformTable`] is a plain name-keyed table, and
//! [`SharedNodeTransforms`] hands snapshots of it to another thread.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::RwLock;
use serde::Serialize;

use crate::clip::AnimationSet;

/// Local transform of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeTransform {
    /// Local translation
    pub translation: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
}

impl NodeTransform {
    /// No translation, no rotation, unit scale
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Destination for sampled node transforms.
///
/// Only nodes the sink already exposes are written; unknown names are
/// skipped.
pub trait NodeTransformSink {
    /// Mutable transform of a node, `None` if the host does not expose it
    fn node_mut(&mut self, name: &str) -> Option<&mut NodeTransform>;

    /// Names of every exposed node
    fn node_names(&self) -> Vec<String>;
}

impl<S: NodeTransformSink + ?Sized> NodeTransformSink for &mut S {
    fn node_mut(&mut self, name: &str) -> Option<&mut NodeTransform> {
        (**self).node_mut(name)
    }

    fn node_names(&self) -> Vec<String> {
        (**self).node_names()
    }
}

/// Name-keyed node transform table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeTransformTable {
    nodes: BTreeMap<String, NodeTransform>,
}

impl NodeTransformTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with an identity entry for every node of `set`
    pub fn for_set(set: &AnimationSet) -> Self {
        Self::preserving(set, Self::new())
    }

    /// Table covering every node of `set`, keeping values already in
    /// `existing`
    pub fn preserving(set: &AnimationSet, existing: NodeTransformTable) -> Self {
        let mut nodes = existing.nodes;
        for name in set.nodes.keys() {
            nodes.entry(name.clone()).or_default();
        }
        Self { nodes }
    }

    /// Transform of a node
    pub fn get(&self, name: &str) -> Option<&NodeTransform> {
        self.nodes.get(name)
    }

    /// Add or replace a node transform
    pub fn insert(&mut self, name: impl Into<String>, transform: NodeTransform) {
        self.nodes.insert(name.into(), transform);
    }

    /// Node names and transforms in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeTransform)> {
        self.nodes.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the table has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeTransformSink for NodeTransformTable {
    fn node_mut(&mut self, name: &str) -> Option<&mut NodeTransform> {
        self.nodes.get_mut(name)
    }

    fn node_names(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }
}

/// Single-writer, single-reader snapshot buffer for node transforms.
///
/// The writer publishes a finished table; readers clone the latest `Arc`
/// and never hold a reference into the writer's working table.
#[derive(Debug, Default)]
pub struct SharedNodeTransforms {
    /// Latest snapshot and the number of snapshots published so far
    latest: RwLock<(Arc<NodeTransformTable>, u64)>,
}

impl SharedNodeTransforms {
    /// Empty buffer at version 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a copy of `table` as the latest snapshot
    pub fn publish(&self, table: &NodeTransformTable) {
        let snapshot = Arc::new(table.clone());
        let mut latest = self.latest.write();
        latest.0 = snapshot;
        latest.1 += 1;
    }

    /// Latest published snapshot
    pub fn latest(&self) -> Arc<NodeTransformTable> {
        Arc::clone(&self.latest.read().0)
    }

    /// Number of snapshots published so far
    pub fn version(&self) -> u64 {
        self.latest.read().1
    }

    /// Latest snapshot together with its version, read under one lock
    pub fn latest_versioned(&self) -> (Arc<NodeTransformTable>, u64) {
        let latest = self.latest.read();
        (Arc::clone(&latest.0), latest.1)
    }
}
