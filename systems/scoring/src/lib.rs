#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that scores units by narrative interest.
//!
//! A unit's score is the product of its type tier (how remarkable the unit
//! is) and the weight of the order it is currently executing (how dramatic
//! its activity is). Tier and order memberships are static lookup tables
//! registered by the host at construction; the weights themselves are fixed.

use std::collections::{HashMap, HashSet};

use replay_director_core::{OrderId, PlayerId, UnitSnapshot, UnitTypeId};

/// Rank weight applied to unit types absent from every tier table.
const UNRANKED_WEIGHT: f32 = 0.1;

/// Default number of real player slots; owners at or past it are observers.
const DEFAULT_MAX_REAL_PLAYERS: u8 = 8;

/// Narrative tier of a unit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitRank {
    /// Capital ships, heroes and game-ending special units.
    Capital,
    /// High-impact combat units and key production structures.
    Elite,
    /// Mainline combat units and common military structures.
    Frontline,
    /// Basic infantry and low-value support structures.
    Basic,
    /// Workers, scouting units and static economy structures.
    Support,
}

impl UnitRank {
    /// Fixed score weight of the tier.
    #[must_use]
    pub const fn weight(self) -> f32 {
        match self {
            Self::Capital => 1.0,
            Self::Elite => 0.8,
            Self::Frontline => 0.6,
            Self::Basic => 0.4,
            Self::Support => 0.2,
        }
    }
}

/// Priority band of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderBand {
    /// Unclassified or idle orders.
    Idle,
    /// Passive guarding and building-placement orders.
    Passive,
    /// Basic movement, hold-position and repair orders.
    Movement,
    /// Training, healing and morphing orders.
    Production,
    /// Combat maneuvers: attack-move, loading, lift-off, sieging, research.
    Maneuver,
    /// Direct combat, special-ability casts and death.
    Combat,
}

impl OrderBand {
    /// Fixed score weight of the band.
    #[must_use]
    pub const fn weight(self) -> f32 {
        match self {
            Self::Idle => 0.01,
            Self::Passive => 0.1,
            Self::Movement => 0.3,
            Self::Production => 0.5,
            Self::Maneuver => 0.8,
            Self::Combat => 1.0,
        }
    }
}

/// Static tier membership table for unit types.
#[derive(Clone, Debug, Default)]
pub struct TierTable {
    entries: HashMap<UnitTypeId, UnitRank>,
}

impl TierTable {
    /// Builds the table from one membership list per tier.
    #[must_use]
    pub fn from_tiers(
        capital: &[UnitTypeId],
        elite: &[UnitTypeId],
        frontline: &[UnitTypeId],
        basic: &[UnitTypeId],
        support: &[UnitTypeId],
    ) -> Self {
        let mut entries = HashMap::new();
        for (types, rank) in [
            (capital, UnitRank::Capital),
            (elite, UnitRank::Elite),
            (frontline, UnitRank::Frontline),
            (basic, UnitRank::Basic),
            (support, UnitRank::Support),
        ] {
            for type_id in types {
                let _ = entries.insert(*type_id, rank);
            }
        }
        Self { entries }
    }

    /// Tier of the provided type, if it appears in any membership list.
    #[must_use]
    pub fn rank(&self, type_id: UnitTypeId) -> Option<UnitRank> {
        self.entries.get(&type_id).copied()
    }
}

/// Static band membership table for orders.
#[derive(Clone, Debug, Default)]
pub struct OrderTable {
    entries: HashMap<OrderId, OrderBand>,
}

impl OrderTable {
    /// Builds the table from one membership list per band.
    ///
    /// Idle needs no list: every unregistered order falls into it.
    #[must_use]
    pub fn from_bands(
        passive: &[OrderId],
        movement: &[OrderId],
        production: &[OrderId],
        maneuver: &[OrderId],
        combat: &[OrderId],
    ) -> Self {
        let mut entries = HashMap::new();
        for (orders, band) in [
            (passive, OrderBand::Passive),
            (movement, OrderBand::Movement),
            (production, OrderBand::Production),
            (maneuver, OrderBand::Maneuver),
            (combat, OrderBand::Combat),
        ] {
            for order in orders {
                let _ = entries.insert(*order, band);
            }
        }
        Self { entries }
    }

    /// Band of the provided order; unregistered orders are idle.
    #[must_use]
    pub fn band(&self, order: OrderId) -> OrderBand {
        self.entries.get(&order).copied().unwrap_or(OrderBand::Idle)
    }
}

/// Stateless scorer combining the tier and order tables.
#[derive(Clone, Debug)]
pub struct InterestScorer {
    tiers: TierTable,
    orders: OrderTable,
    resource_containers: HashSet<UnitTypeId>,
    max_real_players: u8,
}

impl InterestScorer {
    /// Creates a scorer over the provided static tables.
    ///
    /// `resource_containers` lists passive resource-node types excluded from
    /// scoring entirely.
    #[must_use]
    pub fn new(
        tiers: TierTable,
        orders: OrderTable,
        resource_containers: &[UnitTypeId],
    ) -> Self {
        Self {
            tiers,
            orders,
            resource_containers: resource_containers.iter().copied().collect(),
            max_real_players: DEFAULT_MAX_REAL_PLAYERS,
        }
    }

    /// Overrides the number of real player slots used by the observer filter.
    #[must_use]
    pub fn with_max_real_players(mut self, max_real_players: u8) -> Self {
        self.max_real_players = max_real_players;
        self
    }

    /// Tier weight of the unit's type; unlisted types weigh 0.1.
    #[must_use]
    pub fn unit_rank(&self, type_id: UnitTypeId) -> f32 {
        self.tiers
            .rank(type_id)
            .map_or(UNRANKED_WEIGHT, UnitRank::weight)
    }

    /// Band weight of the order; unlisted orders weigh 0.01.
    #[must_use]
    pub fn order_weight(&self, order: OrderId) -> f32 {
        self.orders.band(order).weight()
    }

    /// Narrative score of a single unit.
    #[must_use]
    pub fn unit_score(&self, unit: &UnitSnapshot) -> f32 {
        self.order_weight(unit.order) * self.unit_rank(unit.type_id)
    }

    /// Whether the unit participates in scoring at all.
    ///
    /// Excludes passive resource nodes and units owned by observer
    /// pseudo-player slots. Runs once per tick at grid-insertion time.
    #[must_use]
    pub fn eligible_for_scoring(&self, unit: &UnitSnapshot) -> bool {
        !self.resource_containers.contains(&unit.type_id)
            && unit.owner < PlayerId::new(self.max_real_players)
    }

    /// Average score of a unit set, damped by one.
    ///
    /// The divisor is `count + 1` on purpose: empty and near-empty sets are
    /// pushed toward low scores instead of dividing by zero, so a lone unit
    /// never outranks a real engagement.
    #[must_use]
    pub fn average_score(&self, units: &[UnitSnapshot]) -> f32 {
        let sum: f32 = units.iter().map(|unit| self.unit_score(unit)).sum();
        sum / (units.len() + 1) as f32
    }

    /// Maximum score over the set, or 0.0 for an empty set.
    #[must_use]
    pub fn max_score(&self, units: &[UnitSnapshot]) -> f32 {
        units
            .iter()
            .map(|unit| self.unit_score(unit))
            .fold(0.0, f32::max)
    }

    /// Unit with the maximum score; ties resolve to the first encountered.
    #[must_use]
    pub fn argmax_unit<'a>(&self, units: &'a [UnitSnapshot]) -> Option<&'a UnitSnapshot> {
        let mut best: Option<(&UnitSnapshot, f32)> = None;
        for unit in units {
            let score = self.unit_score(unit);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((unit, score)),
            }
        }
        best.map(|(unit, _)| unit)
    }
}
