//! Swarm membership
//!
//! A swarm is not an allocated entity of its own: it is the set of particles
//! sharing one [`SwarmGroup`] handle. The handle lives as long as its
//! longest-surviving member and only holds weak references to members, so
//! particles and groups never keep each other alive in a cycle.
//!
//! Structural changes (attach/detach) are serialized by the group lock.
//! Enumeration returns a snapshot; callers fan out over it without holding
//! the lock, so a concurrent join or leave may be missed or seen twice.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::identity::ParticleId;
use crate::particle::Particle;

#[derive(Debug, Default)]
struct GroupInner {
    members: Mutex<Vec<(ParticleId, Weak<Particle>)>>,
}

/// Shared membership handle of a swarm
#[derive(Debug, Clone, Default)]
pub struct SwarmGroup {
    inner: Arc<GroupInner>,
}

impl SwarmGroup {
    /// Create an empty group
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ParticleId, Weak<Particle>)>> {
        self.inner
            .members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a member
    pub(crate) fn attach(&self, id: ParticleId, particle: Weak<Particle>) {
        self.lock().push((id, particle));
    }

    /// Remove a member by id; returns whether it was present
    pub(crate) fn detach(&self, id: ParticleId) -> bool {
        let mut members = self.lock();
        let before = members.len();
        members.retain(|(member, _)| *member != id);
        members.len() != before
    }

    /// Snapshot of the live members, in join order
    pub fn members(&self) -> Vec<Arc<Particle>> {
        self.lock()
            .iter()
            .filter_map(|(_, particle)| particle.upgrade())
            .collect()
    }

    /// Number of live members
    pub fn size(&self) -> usize {
        self.lock()
            .iter()
            .filter(|(_, particle)| particle.strong_count() > 0)
            .count()
    }

    /// Whether the group has no live members
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether the particle with this id is a member
    pub fn contains(&self, id: ParticleId) -> bool {
        self.lock().iter().any(|(member, _)| *member == id)
    }

    /// The leader as currently believed by the first member that has one
    pub fn leader(&self) -> Option<Arc<Particle>> {
        self.members().into_iter().find_map(|p| p.leader())
    }

    /// Whether both handles denote the same swarm
    pub fn same_as(&self, other: &SwarmGroup) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Spread (max - min) of the members' current positions along `coord`.
    ///
    /// Returns `0.0` when no member has that coordinate.
    pub fn extent(&self, coord: usize) -> f64 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in self.members() {
            if let Some(x) = p.position().get(coord).copied() {
                min = min.min(x);
                max = max.max(x);
            }
        }
        if min > max {
            0.0
        } else {
            max - min
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ParticleSwarmConfig;

    #[test]
    fn attach_detach_tracks_membership() {
        let group = SwarmGroup::new();
        let p = Particle::new(ParticleSwarmConfig::default());
        group.attach(p.id(), Arc::downgrade(&p));
        assert!(group.contains(p.id()));
        assert_eq!(group.size(), 1);

        assert!(group.detach(p.id()));
        assert!(!group.detach(p.id()));
        assert!(group.is_empty());
    }

    #[test]
    fn dropped_members_are_not_enumerated() {
        let group = SwarmGroup::new();
        let p = Particle::new(ParticleSwarmConfig::default());
        group.attach(p.id(), Arc::downgrade(&p));
        drop(p);
        assert_eq!(group.size(), 0);
        assert!(group.members().is_empty());
    }

    #[test]
    fn clones_denote_the_same_swarm() {
        let a = SwarmGroup::new();
        let b = a.clone();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&SwarmGroup::new()));
    }

    #[test]
    fn extent_of_empty_group_is_zero() {
        assert_eq!(SwarmGroup::new().extent(0), 0.0);
    }
}
