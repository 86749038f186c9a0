//! Planar graph layout problem
//!
//! Each node of the graph is a swarm; the swarm's leader is the node's
//! position. Objectives here score a particle by its distances to the leaders
//! of the adjacent swarms (and/or to the centre of the view), so that
//! minimizing them spreads connected nodes evenly across the plane.
//!
//! Neighbour leaders are resolved and read at call time, one leader at a
//! time. A neighbour moving mid-evaluation contributes whichever best
//! position it held when it was read.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::objective::{CompositeMode, CompositeObjective};
use crate::particle::Particle;
use crate::swarm::SwarmGroup;
use crate::traits::{Objective, ProblemSpace};

/// The layout problem is always planar
pub const LAYOUT_DIMENSION: usize = 2;

/// Anchor of the view-centre objective
pub const VIEW_CENTER: [f64; 2] = [398.0, 287.0];

/// Beyond this leader distance the equidistant score saturates to 1
pub const EQUIDISTANT_MAX_REACH: f64 = 320.0;

/// Below this leader distance the equidistant score saturates to 1
pub const EQUIDISTANT_MIN_REACH: f64 = 80.0;

/// Distance normalizer floor of the centroid objective
pub const CENTER_NORMALIZER: f64 = 300.0;

/// Distance normalizer floor of the view-centre objective
pub const VIEW_CENTER_NORMALIZER: f64 = 400.0;

/// Preferred nearest-leader distance of the adjacency objective
pub const ADJACENT_NEAR: f64 = 210.0;

/// Preferred farthest-leader distance of the adjacency objective
pub const ADJACENT_FAR: f64 = 250.0;

/// Layout objective selector
///
/// Discriminants are the request codes accepted by [`LayoutObjective::from_code`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutObjective {
    /// Stay close to the centre of the view
    ViewCenter = 0,
    /// Keep every adjacent leader at the same distance
    #[default]
    Equidistant = 1,
    /// Sit on the centroid of the adjacent leaders
    Center = 2,
    /// Equidistant combined with Center
    EquiCenter = 3,
    /// Equidistant combined with ViewCenter
    EquiView = 4,
    /// (Equidistant with ViewCenter) combined with Center
    EquiViewCenter = 5,
    /// (Equidistant with ViewCenter) combined multiplicatively with Center
    CenterViewCenter = 6,
    /// Keep adjacent leaders inside a preferred distance band
    Adjacent = 7,
}

impl LayoutObjective {
    /// Every selectable objective
    pub const ALL: [LayoutObjective; 8] = [
        LayoutObjective::ViewCenter,
        LayoutObjective::Equidistant,
        LayoutObjective::Center,
        LayoutObjective::EquiCenter,
        LayoutObjective::EquiView,
        LayoutObjective::EquiViewCenter,
        LayoutObjective::CenterViewCenter,
        LayoutObjective::Adjacent,
    ];

    /// Resolve a request code; unrecognized codes select [`LayoutObjective::Equidistant`]
    pub fn from_code(code: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|o| o.code() == code)
            .unwrap_or_default()
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// Instantiate the objective over the given adjacent swarms
    pub fn build(self, adjacent: &[SwarmGroup]) -> Arc<dyn Objective> {
        let equidistant = || -> Arc<dyn Objective> {
            Arc::new(EquidistantObjective::new(adjacent.to_vec()))
        };
        let center = || -> Arc<dyn Objective> { Arc::new(CenterObjective::new(adjacent.to_vec())) };
        let view = || -> Arc<dyn Objective> { Arc::new(ViewCenterObjective) };

        match self {
            LayoutObjective::ViewCenter => view(),
            LayoutObjective::Equidistant => equidistant(),
            LayoutObjective::Center => center(),
            LayoutObjective::Adjacent => Arc::new(AdjacentObjective::new(adjacent.to_vec())),
            LayoutObjective::EquiCenter => {
                Arc::new(CompositeObjective::additive(equidistant(), center()))
            }
            LayoutObjective::EquiView => Arc::new(CompositeObjective::additive(equidistant(), view())),
            LayoutObjective::EquiViewCenter => Arc::new(CompositeObjective::additive(
                Arc::new(CompositeObjective::additive(equidistant(), view())),
                center(),
            )),
            LayoutObjective::CenterViewCenter => Arc::new(CompositeObjective::new(
                Arc::new(CompositeObjective::additive(equidistant(), view())),
                center(),
                CompositeMode::Multiplicative,
            )),
        }
    }
}

/// Problem space for laying out a graph of swarms in the plane
#[derive(Clone)]
pub struct PlanarGraphLayout {
    kind: LayoutObjective,
    adjacent: Vec<SwarmGroup>,
    objective: Arc<dyn Objective>,
}

impl PlanarGraphLayout {
    /// Build the layout problem for one swarm given the swarms adjacent to it
    pub fn new(kind: LayoutObjective, adjacent: Vec<SwarmGroup>) -> Self {
        let objective = kind.build(&adjacent);
        Self {
            kind,
            adjacent,
            objective,
        }
    }

    /// Same as [`PlanarGraphLayout::new`], naming each adjacent swarm by any of its members.
    /// Detached particles are skipped.
    pub fn from_representatives(kind: LayoutObjective, representatives: &[Arc<Particle>]) -> Self {
        let adjacent = representatives
            .iter()
            .filter_map(|p| p.swarm_group())
            .collect();
        Self::new(kind, adjacent)
    }

    pub fn kind(&self) -> LayoutObjective {
        self.kind
    }

    pub fn adjacent(&self) -> &[SwarmGroup] {
        &self.adjacent
    }
}

impl ProblemSpace for PlanarGraphLayout {
    fn dimension(&self) -> usize {
        LAYOUT_DIMENSION
    }

    fn objective(&self) -> Arc<dyn Objective> {
        self.objective.clone()
    }
}

impl core::fmt::Debug for PlanarGraphLayout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlanarGraphLayout")
            .field("kind", &self.kind)
            .field("adjacent", &self.adjacent.len())
            .finish()
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Best positions of the current leaders of `adjacent`, skipping leaderless swarms
fn leader_positions(adjacent: &[SwarmGroup]) -> Vec<Vec<f64>> {
    adjacent
        .iter()
        .filter_map(SwarmGroup::leader)
        .map(|leader| leader.best_position())
        .collect()
}

/// (min, max) distance from `position` to the adjacent leaders.
///
/// With no leaders this is `(+inf, -inf)`.
fn distance_extremes(position: &[f64], adjacent: &[SwarmGroup]) -> (f64, f64) {
    leader_positions(adjacent)
        .iter()
        .map(|leader| distance(position, leader))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        })
}

/// Normalized spread of the distances to adjacent leaders, saturating to 1
/// when any leader is too far or too close.
#[derive(Debug, Clone)]
pub struct EquidistantObjective {
    adjacent: Vec<SwarmGroup>,
}

impl EquidistantObjective {
    pub fn new(adjacent: Vec<SwarmGroup>) -> Self {
        Self { adjacent }
    }
}

impl Objective for EquidistantObjective {
    fn compute_fitness(&self, particle: &Particle) -> f64 {
        let (min, max) = distance_extremes(&particle.position(), &self.adjacent);
        if max > EQUIDISTANT_MAX_REACH || min < EQUIDISTANT_MIN_REACH {
            return 1.0;
        }
        (max - min) / max
    }
}

/// Distance to the centroid of the adjacent leaders
#[derive(Debug, Clone)]
pub struct CenterObjective {
    adjacent: Vec<SwarmGroup>,
}

impl CenterObjective {
    pub fn new(adjacent: Vec<SwarmGroup>) -> Self {
        Self { adjacent }
    }
}

impl Objective for CenterObjective {
    fn compute_fitness(&self, particle: &Particle) -> f64 {
        let position = particle.position();
        let leaders = leader_positions(&self.adjacent);
        let count = leaders.len() as f64;

        let mut centroid = vec![0.0; position.len()];
        for leader in &leaders {
            for (c, x) in centroid.iter_mut().zip(leader) {
                *c += x;
            }
        }
        for c in centroid.iter_mut() {
            *c /= count;
        }

        let dist = distance(&position, &centroid);
        dist / dist.max(CENTER_NORMALIZER)
    }
}

/// Distance to the fixed centre of the view; ignores the graph
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewCenterObjective;

impl Objective for ViewCenterObjective {
    fn compute_fitness(&self, particle: &Particle) -> f64 {
        let dist = distance(&particle.position(), &VIEW_CENTER);
        dist / dist.max(VIEW_CENTER_NORMALIZER)
    }
}

/// Equidistance blended with a preference for leaders between
/// [`ADJACENT_NEAR`] and [`ADJACENT_FAR`] away.
#[derive(Debug, Clone)]
pub struct AdjacentObjective {
    adjacent: Vec<SwarmGroup>,
}

impl AdjacentObjective {
    pub fn new(adjacent: Vec<SwarmGroup>) -> Self {
        Self { adjacent }
    }
}

impl Objective for AdjacentObjective {
    fn compute_fitness(&self, particle: &Particle) -> f64 {
        let (min, max) = distance_extremes(&particle.position(), &self.adjacent);
        let spread = (max - min) / max;
        let band = ((min - ADJACENT_NEAR).abs() / ADJACENT_NEAR)
            * ((max - ADJACENT_FAR).abs() / ADJACENT_FAR);
        (spread + band) / 2.0
    }
}
