//! The particle engine
//!
//! A [`Particle`] is an autonomous search agent. It belongs to at most one
//! swarm (a shared [`SwarmGroup`] handle), follows that swarm's leader, and
//! runs the evaluate/update step against the swarm's shared objective.
//!
//! Locking discipline:
//! - `state` guards position, velocity, both solutions and the random source.
//! - `membership` guards the swarm handle, leader and objective.
//! - `structural` serializes this particle's own `join`/`leave`.
//!
//! A thread never holds locks on two particles at the same time. Reads of a
//! neighbour (its leader, its best position) are individually consistent but
//! the combination is not atomic; concurrent leadership claims resolve as
//! last-write-wins.

use core::fmt;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithms::{self, ParticleSwarmConfig};
use crate::identity::ParticleId;
use crate::observe::{ObserverRegistry, ObserverScope};
use crate::solution::{write_coords, Solution};
use crate::swarm::SwarmGroup;
use crate::traits::{Objective, ProblemSpace, SwarmObserver};
use crate::{Error, Result};

struct ParticleState {
    velocity: Vec<f64>,
    current: Solution,
    best: Solution,
    rng: StdRng,
}

impl ParticleState {
    fn new(dimension: usize, rng: StdRng) -> Self {
        Self {
            velocity: vec![0.0; dimension],
            current: Solution::new(dimension),
            best: Solution::new(dimension),
            rng,
        }
    }

    fn reshape(&mut self, dimension: usize) {
        self.velocity = vec![0.0; dimension];
        self.current = Solution::new(dimension);
        self.best = Solution::new(dimension);
    }

    fn reset_fitness(&mut self) {
        self.current.reset_fitness();
        self.best.reset_fitness();
    }
}

#[derive(Default)]
struct Membership {
    group: Option<SwarmGroup>,
    leader: Option<Weak<Particle>>,
    objective: Option<Arc<dyn Objective>>,
}

/// A member of a swarm
pub struct Particle {
    id: ParticleId,
    this: Weak<Particle>,
    config: ParticleSwarmConfig,
    state: RwLock<ParticleState>,
    membership: RwLock<Membership>,
    structural: Mutex<()>,
    particle_observers: ObserverRegistry,
    swarm_observers: ObserverRegistry,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Particle {
    /* --- Construction --- */

    fn build(
        config: ParticleSwarmConfig,
        dimension: usize,
        objective: Option<Arc<dyn Objective>>,
    ) -> Arc<Self> {
        let id = ParticleId::next();
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id.get())),
            None => StdRng::from_entropy(),
        };
        Arc::new_cyclic(|this| Particle {
            id,
            this: this.clone(),
            config,
            state: RwLock::new(ParticleState::new(dimension, rng)),
            membership: RwLock::new(Membership {
                objective,
                ..Membership::default()
            }),
            structural: Mutex::new(()),
            particle_observers: ObserverRegistry::default(),
            swarm_observers: ObserverRegistry::default(),
        })
    }

    /// Create a particle forming a new singleton swarm, with no problem to solve
    pub fn new(config: ParticleSwarmConfig) -> Arc<Self> {
        let particle = Self::build(config, 0, None);
        particle.found_swarm();
        particle
    }

    /// Create a particle forming a new singleton swarm solving `space`
    pub fn with_problem(space: &dyn ProblemSpace, config: ParticleSwarmConfig) -> Arc<Self> {
        let particle = Self::build(config, space.dimension(), Some(space.objective()));
        particle.found_swarm();
        particle
    }

    /// Create a swarm of `size` particles solving `space`.
    ///
    /// The swarm does not own its members: the returned particles (first one
    /// leading) are only kept alive by the caller.
    pub fn swarm(
        space: &dyn ProblemSpace,
        size: usize,
        config: ParticleSwarmConfig,
    ) -> Vec<Arc<Self>> {
        let first = Self::with_problem(space, config);
        let mut members = Vec::with_capacity(size.max(1));
        for _ in 1..size {
            members.push(first.replicate());
        }
        members.insert(0, first);
        members
    }

    /// Create a new particle in the same swarm as this one
    ///
    /// The replica shares the configuration, dimension and objective. If this
    /// particle is detached, the replica forms its own singleton swarm.
    pub fn replicate(&self) -> Arc<Self> {
        let objective = read(&self.membership).objective.clone();
        let replica = Self::build(self.config.clone(), self.dimension(), objective);
        if replica.join(self).is_err() {
            replica.found_swarm();
        }
        replica
    }

    fn arc(&self) -> Option<Arc<Self>> {
        self.this.upgrade()
    }

    fn found_swarm(&self) {
        let group = SwarmGroup::new();
        group.attach(self.id, self.this.clone());
        {
            let mut membership = write(&self.membership);
            membership.group = Some(group);
            membership.leader = Some(self.this.clone());
        }
        self.swarm_observers.notify(self);
    }

    /* --- Accessors --- */

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn config(&self) -> &ParticleSwarmConfig {
        &self.config
    }

    /// Number of variables in the problem space
    pub fn dimension(&self) -> usize {
        read(&self.state).current.dimension()
    }

    /// Current position
    pub fn position(&self) -> Vec<f64> {
        read(&self.state).current.position.clone()
    }

    /// Personal best position
    pub fn best_position(&self) -> Vec<f64> {
        read(&self.state).best.position.clone()
    }

    pub fn velocity(&self) -> Vec<f64> {
        read(&self.state).velocity.clone()
    }

    /// Fitness at the current position (`+inf` if not yet evaluated)
    pub fn fitness(&self) -> f64 {
        read(&self.state).current.fitness
    }

    /// Personal best fitness (`+inf` if not yet evaluated)
    pub fn fitness_best(&self) -> f64 {
        read(&self.state).best.fitness
    }

    pub fn current(&self) -> Solution {
        read(&self.state).current.clone()
    }

    pub fn best(&self) -> Solution {
        read(&self.state).best.clone()
    }

    /// The particle this one currently follows
    pub fn leader(&self) -> Option<Arc<Particle>> {
        read(&self.membership).leader.as_ref().and_then(Weak::upgrade)
    }

    /// Whether this particle currently follows itself
    pub fn is_leader(&self) -> bool {
        read(&self.membership)
            .leader
            .as_ref()
            .is_some_and(|l| Weak::ptr_eq(l, &self.this))
    }

    /// The swarm this particle belongs to, if any
    pub fn swarm_group(&self) -> Option<SwarmGroup> {
        read(&self.membership).group.clone()
    }

    /// The objective shared by this particle's swarm
    pub fn objective(&self) -> Option<Arc<dyn Objective>> {
        read(&self.membership).objective.clone()
    }

    /// Members of this particle's swarm (empty when detached)
    pub fn members(&self) -> Vec<Arc<Particle>> {
        self.swarm_group()
            .map(|g| g.members())
            .unwrap_or_default()
    }

    /// Number of particles in this particle's swarm (0 when detached)
    pub fn size_of_swarm(&self) -> usize {
        self.swarm_group().map(|g| g.size()).unwrap_or(0)
    }

    /// Whether `other` belongs to the same swarm as this particle
    pub fn is_neighbor(&self, other: &Particle) -> bool {
        match (self.swarm_group(), other.swarm_group()) {
            (Some(a), Some(b)) => a.same_as(&b),
            _ => false,
        }
    }

    /// Spread of the swarm's current positions along `coord`
    pub fn extent(&self, coord: usize) -> f64 {
        self.swarm_group().map(|g| g.extent(coord)).unwrap_or(0.0)
    }

    /* --- Membership --- */

    /// Add this particle to `target`'s swarm.
    ///
    /// Leaves the current swarm first. The particle adopts the target's
    /// leader, objective and dimension, and its fitness is reset. Joining a
    /// swarm the particle already belongs to is a no-op. A detached particle
    /// may join itself to found a new singleton swarm.
    pub fn join(&self, target: &Particle) -> Result<()> {
        let _guard = lock(&self.structural);

        if self.is_neighbor(target) {
            return Ok(());
        }
        if core::ptr::eq(self, target) {
            self.leave_locked();
            self.found_swarm();
            return Ok(());
        }

        let (group, leader, objective) = {
            let membership = read(&target.membership);
            let group = membership.group.clone().ok_or(Error::Detached)?;
            let leader = membership
                .leader
                .clone()
                .unwrap_or_else(|| target.this.clone());
            (group, leader, membership.objective.clone())
        };
        let dimension = target.dimension();

        self.leave_locked();

        group.attach(self.id, self.this.clone());
        {
            let mut state = write(&self.state);
            if state.current.dimension() != dimension {
                state.reshape(dimension);
            }
            state.reset_fitness();
        }
        {
            let mut membership = write(&self.membership);
            membership.group = Some(group);
            membership.objective = objective;
        }
        tracing::debug!(particle = %self.id, target = %target.id, "joined swarm");

        match leader.upgrade() {
            Some(leader) => self.follow(&leader),
            None => self.follow(target),
        }
        Ok(())
    }

    /// Remove this particle from its swarm.
    ///
    /// If it was the leader, leadership is handed to an arbitrary remaining
    /// member. The particle ends up isolated with both fitness values reset.
    pub fn leave(&self) {
        let _guard = lock(&self.structural);
        self.leave_locked();
    }

    fn leave_locked(&self) {
        let (group, was_leader) = {
            let mut membership = write(&self.membership);
            let was_leader = membership
                .leader
                .take()
                .is_some_and(|l| Weak::ptr_eq(&l, &self.this));
            (membership.group.take(), was_leader)
        };
        write(&self.state).reset_fitness();

        let Some(group) = group else {
            return;
        };
        group.detach(self.id);
        tracing::debug!(particle = %self.id, was_leader, "left swarm");

        if was_leader {
            hand_off_leadership(&group);
        }
    }

    /// Follow `candidate` and notify swarm-scoped observers
    pub fn follow(&self, candidate: &Particle) {
        write(&self.membership).leader = Some(candidate.this.clone());
        self.swarm_observers.notify(self);
    }

    /// Announce this particle as the leader of every member of its swarm
    pub fn notify_swarm(&self) -> Result<()> {
        let group = self.swarm_group().ok_or(Error::Detached)?;
        for member in group.members() {
            member.follow(self);
        }
        Ok(())
    }

    /// Redirect every member of this particle's swarm to solve `space`.
    ///
    /// Each member receives the shared objective, a zero velocity and fresh
    /// unevaluated solutions. Members running concurrently may observe a mix
    /// of old and new state for one step.
    pub fn set_problem_space(&self, space: &dyn ProblemSpace) {
        let dimension = space.dimension();
        let objective = space.objective();
        let members = match self.swarm_group() {
            Some(group) => group.members(),
            None => self.arc().into_iter().collect(),
        };
        for member in &members {
            write(&member.membership).objective = Some(objective.clone());
            write(&member.state).reshape(dimension);
        }
        tracing::debug!(
            particle = %self.id,
            members = members.len(),
            dimension,
            "problem space assigned"
        );
    }

    /// Reset to a uniformly random position within `[lower, upper]`.
    ///
    /// The personal best moves with it, velocity is redrawn from `U(0,1)` per
    /// dimension and both fitness values are reset.
    pub fn randomize(&self, lower: &[f64], upper: &[f64]) -> Result<()> {
        let mut state = write(&self.state);
        let dimension = state.current.dimension();
        let shortest = lower.len().min(upper.len());
        if shortest < dimension {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: shortest,
            });
        }

        let ParticleState {
            velocity,
            current,
            best,
            rng,
        } = &mut *state;
        for i in 0..dimension {
            let x = lower[i] + (upper[i] - lower[i]) * rng.gen::<f64>();
            current.position[i] = x;
            best.position[i] = x;
            velocity[i] = rng.gen::<f64>();
        }
        current.reset_fitness();
        best.reset_fitness();
        Ok(())
    }

    /* --- Observers --- */

    /// Register an observer of this particle's updates
    pub fn register_particle_observer(&self, observer: Arc<dyn SwarmObserver>) {
        self.particle_observers.register(observer);
    }

    /// Register an observer of this particle's leadership changes
    pub fn register_swarm_observer(&self, observer: Arc<dyn SwarmObserver>) {
        self.swarm_observers.register(observer);
    }

    /// Register an observer in the given scope
    pub fn register_observer(&self, scope: ObserverScope, observer: Arc<dyn SwarmObserver>) {
        match scope {
            ObserverScope::Particle => self.register_particle_observer(observer),
            ObserverScope::Swarm => self.register_swarm_observer(observer),
        }
    }

    pub fn unregister_particle_observer(&self, observer: &Arc<dyn SwarmObserver>) -> bool {
        self.particle_observers.unregister(observer)
    }

    pub fn unregister_swarm_observer(&self, observer: &Arc<dyn SwarmObserver>) -> bool {
        self.swarm_observers.unregister(observer)
    }

    /// Notify particle-scoped observers
    pub fn notify_observers(&self) {
        self.particle_observers.notify(self);
    }

    /// Notify swarm-scoped observers
    pub fn notify_swarm_observers(&self) {
        self.swarm_observers.notify(self);
    }

    /* --- Search --- */

    /// Score the current position and update the personal best.
    ///
    /// A strict improvement that also beats the leader's best makes this
    /// particle claim leadership of its swarm. Returns the new fitness.
    pub fn evaluate(&self) -> Result<f64> {
        let (objective, leader) = {
            let membership = read(&self.membership);
            if membership.group.is_none() {
                return Err(Error::Detached);
            }
            let objective = membership.objective.clone().ok_or(Error::NoObjective)?;
            (objective, membership.leader.clone())
        };

        let fitness = objective.compute_fitness(self);

        let improved = {
            let mut state = write(&self.state);
            state.current.fitness = fitness;
            if fitness < state.best.fitness {
                state.best.position = state.current.position.clone();
                state.best.fitness = fitness;
                true
            } else {
                false
            }
        };

        if improved {
            // A leader that no longer exists counts as unbeaten by nobody
            let leader_best = leader
                .and_then(|l| l.upgrade())
                .map_or(f64::INFINITY, |l| l.fitness_best());
            if fitness < leader_best {
                tracing::debug!(particle = %self.id, fitness, "claiming leadership");
                self.notify_swarm()?;
            }
        }
        tracing::trace!(particle = %self.id, fitness, improved, "evaluated");
        Ok(fitness)
    }

    /// Move one PSO step towards the leader's best and the personal best,
    /// then notify particle-scoped observers.
    pub fn update(&self) -> Result<()> {
        let leader = {
            let membership = read(&self.membership);
            if membership.group.is_none() {
                return Err(Error::Detached);
            }
            membership.leader.clone()
        };
        let leader_best = leader
            .and_then(|l| l.upgrade())
            .filter(|l| l.id != self.id)
            .map(|l| l.best_position());

        {
            let mut state = write(&self.state);
            let ParticleState {
                velocity,
                current,
                best,
                rng,
            } = &mut *state;
            let attractor: &[f64] = match &leader_best {
                Some(position) => position,
                None => &best.position,
            };
            algorithms::advance(
                &self.config,
                rng,
                &mut current.position,
                velocity,
                &best.position,
                attractor,
            );
        }

        self.notify_observers();
        Ok(())
    }

    /// One evaluate/update iteration
    pub fn step(&self) -> Result<f64> {
        let fitness = self.evaluate()?;
        self.update()?;
        Ok(fitness)
    }
}

/// Make an arbitrary remaining member of `group` its leader
fn hand_off_leadership(group: &SwarmGroup) {
    if let Some(heir) = group.members().into_iter().next() {
        // heir is attached to `group`, so it cannot be detached here
        let _ = heir.notify_swarm();
    }
}

impl Drop for Particle {
    fn drop(&mut self) {
        let (group, leader) = {
            let membership = self
                .membership
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner);
            (membership.group.take(), membership.leader.take())
        };
        let Some(group) = group else {
            return;
        };
        group.detach(self.id);
        if leader.is_some_and(|l| Weak::ptr_eq(&l, &self.this)) {
            tracing::debug!(particle = %self.id, "leader dropped");
            hand_off_leadership(&group);
        }
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Particle {}

impl PartialOrd for Particle {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Particle {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// `Particle[id*]: pcurr=f(x,y); pbest=f(x,y); vcurr=(vx,vy)`, `*` marking the leader.
impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_leader() { "*" } else { "" };
        let state = read(&self.state);
        write!(
            f,
            "Particle[{}{}]: pcurr={}{}; pbest={}{}; vcurr=",
            self.id,
            marker,
            state.current.fitness as f32,
            state.current,
            state.best.fitness as f32,
            state.best,
        )?;
        write_coords(f, &state.velocity)
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("id", &self.id)
            .field("dimension", &self.dimension())
            .field("leader", &self.leader().map(|l| l.id))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutObjective, PlanarGraphLayout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> ParticleSwarmConfig {
        ParticleSwarmConfig::default().with_rng_seed(42)
    }

    fn view_center() -> PlanarGraphLayout {
        PlanarGraphLayout::new(LayoutObjective::ViewCenter, Vec::new())
    }

    fn pin(p: &Particle, x: f64, y: f64) {
        p.randomize(&[x, y], &[x, y]).unwrap();
    }

    #[test]
    fn new_particle_leads_its_own_singleton_swarm() {
        let p = Particle::new(config());
        assert_eq!(p.size_of_swarm(), 1);
        assert!(p.is_leader());
        assert_eq!(p.dimension(), 0);
        assert_eq!(p.fitness(), f64::INFINITY);
    }

    #[test]
    fn swarm_constructor_builds_a_shared_swarm() {
        let swarm = Particle::swarm(&view_center(), 4, config());
        let first = &swarm[0];
        let members = first.members();
        assert_eq!(members.len(), 4);
        assert_eq!(first.size_of_swarm(), 4);
        for m in &members {
            assert_eq!(m.dimension(), 2);
            assert!(m.is_neighbor(first));
            assert_eq!(m.leader().map(|l| l.id()), Some(first.id()));
            assert!(m.objective().is_some());
        }
    }

    #[test]
    fn join_moves_particle_between_swarms() {
        let swarm = Particle::swarm(&view_center(), 2, config());
        let a = &swarm[0];
        let b = Particle::with_problem(&view_center(), config());

        b.join(a).unwrap();

        assert!(b.is_neighbor(a));
        assert_eq!(a.size_of_swarm(), 3);
        assert_eq!(b.leader().map(|l| l.id()), Some(a.id()));
        assert_eq!(b.fitness_best(), f64::INFINITY);
    }

    #[test]
    fn join_own_swarm_is_a_no_op() {
        let swarm = Particle::swarm(&view_center(), 2, config());
        let a = &swarm[0];
        let second = &swarm[1];
        second.join(a).unwrap();
        assert_eq!(a.size_of_swarm(), 2);
    }

    #[test]
    fn join_adopts_target_dimension() {
        let a = Particle::with_problem(&view_center(), config());
        let b = Particle::new(config());
        b.join(&a).unwrap();
        assert_eq!(b.dimension(), 2);
        assert_eq!(b.velocity().len(), 2);
    }

    #[test]
    fn join_detached_target_fails() {
        let a = Particle::new(config());
        let b = Particle::new(config());
        a.leave();
        assert_eq!(b.join(&a), Err(Error::Detached));
        assert_eq!(b.size_of_swarm(), 1);
    }

    #[test]
    fn leave_isolates_particle_and_removes_it_from_enumeration() {
        let swarm = Particle::swarm(&view_center(), 3, config());
        let a = &swarm[0];
        let leaver = &swarm[2];
        pin(leaver, 1.0, 1.0);
        leaver.evaluate().unwrap();

        leaver.leave();

        assert_eq!(leaver.size_of_swarm(), 0);
        assert!(leaver.leader().is_none());
        assert_eq!(leaver.fitness(), f64::INFINITY);
        assert_eq!(leaver.fitness_best(), f64::INFINITY);
        assert_eq!(a.size_of_swarm(), 2);
        assert!(a.members().iter().all(|m| m.id() != leaver.id()));
        assert_eq!(leaver.evaluate(), Err(Error::Detached));
        assert_eq!(leaver.update(), Err(Error::Detached));
    }

    #[test]
    fn leader_handoff_targets_a_remaining_member() {
        let swarm = Particle::swarm(&view_center(), 3, config());
        let a = &swarm[0];
        assert!(a.is_leader());
        let rest = &swarm[1..];

        a.leave();

        let heir = rest[0].leader().expect("leader after handoff");
        assert_ne!(heir.id(), a.id());
        assert!(rest.iter().any(|m| m.id() == heir.id()));
        for m in rest {
            assert_eq!(m.leader().map(|l| l.id()), Some(heir.id()));
        }
    }

    #[test]
    fn rejoining_self_after_leave_founds_a_new_swarm() {
        let a = Particle::new(config());
        a.leave();
        a.join(&a).unwrap();
        assert_eq!(a.size_of_swarm(), 1);
        assert!(a.is_leader());
    }

    #[test]
    fn notify_swarm_makes_caller_everyones_leader() {
        let swarm = Particle::swarm(&view_center(), 5, config());
        let a = &swarm[0];
        let claimant = &swarm[3];

        claimant.notify_swarm().unwrap();

        for m in a.members() {
            assert_eq!(m.leader().map(|l| l.id()), Some(claimant.id()));
        }
    }

    #[test]
    fn follow_fires_swarm_observers_once() {
        let a = Particle::new(config());
        let b = Particle::new(config());
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        a.register_swarm_observer(Arc::new(move |_: &Particle| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        a.follow(&b);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn update_fires_particle_observers_every_step() {
        let p = Particle::with_problem(&view_center(), config());
        pin(&p, 100.0, 100.0);
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let observer: Arc<dyn SwarmObserver> = Arc::new(move |_: &Particle| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        p.register_particle_observer(observer.clone());

        for _ in 0..3 {
            p.step().unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(p.unregister_particle_observer(&observer));
        p.step().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn randomize_stays_within_bounds_and_resets_fitness() {
        let p = Particle::with_problem(&view_center(), config());
        let lower = [10.0, -5.0];
        let upper = [20.0, 5.0];
        for _ in 0..50 {
            p.randomize(&lower, &upper).unwrap();
            let position = p.position();
            for i in 0..2 {
                assert!(lower[i] <= position[i] && position[i] <= upper[i]);
            }
            assert_eq!(p.best_position(), position);
            assert!(p.velocity().iter().all(|v| (0.0..1.0).contains(v)));
            assert_eq!(p.fitness(), f64::INFINITY);
            assert_eq!(p.fitness_best(), f64::INFINITY);
        }
    }

    #[test]
    fn randomize_rejects_short_bounds() {
        let p = Particle::with_problem(&view_center(), config());
        assert_eq!(
            p.randomize(&[0.0], &[1.0, 1.0]),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn evaluate_without_objective_fails() {
        let p = Particle::new(config());
        assert_eq!(p.evaluate(), Err(Error::NoObjective));
    }

    #[test]
    fn evaluate_records_strict_improvements_only() {
        let p = Particle::with_problem(&view_center(), config());
        pin(&p, 398.0, 287.0);
        assert_eq!(p.evaluate().unwrap(), 0.0);
        assert_eq!(p.best_position(), vec![398.0, 287.0]);

        for _ in 0..5 {
            p.update().unwrap();
            p.evaluate().unwrap();
            // Nothing beats the ideal score, so the best never moves
            assert_eq!(p.fitness_best(), 0.0);
            assert_eq!(p.best_position(), vec![398.0, 287.0]);
        }
    }

    #[test]
    fn better_member_claims_leadership() {
        let members = Particle::swarm(&view_center(), 3, config());
        pin(&members[0], 0.0, 0.0);
        pin(&members[1], 398.0, 287.0);
        pin(&members[2], 800.0, 600.0);

        members[0].evaluate().unwrap();
        assert!(members[0].is_leader());

        members[1].evaluate().unwrap();
        for m in &members {
            assert_eq!(m.leader().map(|l| l.id()), Some(members[1].id()));
        }

        members[2].evaluate().unwrap();
        assert_eq!(
            members[2].leader().map(|l| l.id()),
            Some(members[1].id())
        );
    }

    #[test]
    fn set_problem_space_resets_every_member() {
        let swarm = Particle::swarm(&view_center(), 3, config());
        let a = &swarm[0];
        for m in &swarm {
            pin(m, 5.0, 5.0);
            m.step().unwrap();
        }

        let space = PlanarGraphLayout::new(LayoutObjective::Equidistant, Vec::new());
        a.set_problem_space(&space);

        for m in a.members() {
            assert_eq!(m.fitness(), f64::INFINITY);
            assert_eq!(m.fitness_best(), f64::INFINITY);
            assert_eq!(m.velocity(), vec![0.0, 0.0]);
            assert_eq!(m.position(), vec![0.0, 0.0]);
            assert!(Arc::ptr_eq(
                &m.objective().unwrap(),
                &a.objective().unwrap()
            ));
        }
    }

    #[test]
    fn particles_order_by_id() {
        let a = Particle::new(config());
        let b = Particle::new(config());
        assert!(*a < *b);
        assert_ne!(*a, *b);
    }

    #[test]
    fn display_marks_the_leader() {
        let p = Particle::with_problem(&view_center(), config());
        let text = p.to_string();
        assert!(text.starts_with(&format!("Particle[{}*]: pcurr=inf(0,0)", p.id())));
        assert!(text.ends_with("vcurr=(0,0)"));
    }

    #[test]
    fn dropping_the_leader_hands_off_leadership() {
        let mut swarm = Particle::swarm(&view_center(), 3, config());
        pin(&swarm[0], 398.0, 287.0);
        pin(&swarm[1], 0.0, 0.0);
        pin(&swarm[2], 800.0, 600.0);
        for m in &swarm {
            m.evaluate().unwrap();
        }
        assert!(swarm[0].is_leader());

        let leader = swarm.remove(0);
        let dropped = leader.id();
        drop(leader);

        let heir = swarm[0].leader().expect("leader after drop");
        assert_ne!(heir.id(), dropped);
        assert!(swarm.iter().any(|m| m.id() == heir.id()));
        for m in &swarm {
            assert_eq!(m.leader().map(|l| l.id()), Some(heir.id()));
        }
        let group = swarm[0].swarm_group().unwrap();
        assert_eq!(group.size(), 2);
        assert_eq!(group.leader().map(|l| l.id()), Some(heir.id()));

        // Stale fitness no longer blocks the swarm from having a leader
        for m in &swarm {
            m.evaluate().unwrap();
        }
        assert!(group.leader().is_some());
    }

    #[test]
    fn dropping_a_member_shrinks_the_swarm() {
        let swarm = Particle::swarm(&view_center(), 2, config());
        let a = &swarm[0];
        let extra = a.replicate();
        assert_eq!(a.size_of_swarm(), 3);
        drop(extra);
        assert_eq!(a.size_of_swarm(), 2);
    }
}
