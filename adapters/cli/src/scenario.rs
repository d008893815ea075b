//! Synthetic two-army skirmish used to exercise the director headlessly.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use replay_director_core::{
    OrderId, PlayerId, PlayerRoster, PlayerSlot, UnitId, UnitSnapshot, UnitTypeId, WorldPoint,
};
use replay_director_system_scoring::{InterestScorer, OrderTable, TierTable};

pub(crate) const FLAGSHIP: UnitTypeId = UnitTypeId::new(1);
pub(crate) const CRUISER: UnitTypeId = UnitTypeId::new(2);
pub(crate) const TROOPER: UnitTypeId = UnitTypeId::new(3);
pub(crate) const MEDIC: UnitTypeId = UnitTypeId::new(4);
pub(crate) const ORE_FIELD: UnitTypeId = UnitTypeId::new(9);

pub(crate) const GUARD: OrderId = OrderId::new(1);
pub(crate) const ADVANCE: OrderId = OrderId::new(2);
pub(crate) const ATTACK: OrderId = OrderId::new(3);

/// Distance at which opposing units stop marching and open fire.
const ENGAGEMENT_RANGE: f32 = 24.0;

/// March speed in world units per tick.
const MARCH_SPEED: f32 = 0.8;

/// Per-tick casualty chance for an engaged trooper.
const CASUALTY_CHANCE: f64 = 0.02;

/// Scorer wired for the skirmish vocabulary above.
pub(crate) fn scorer() -> InterestScorer {
    InterestScorer::new(
        TierTable::from_tiers(&[FLAGSHIP], &[CRUISER], &[TROOPER], &[], &[MEDIC]),
        OrderTable::from_bands(&[GUARD], &[ADVANCE], &[], &[], &[ATTACK]),
        &[ORE_FIELD],
    )
}

/// Deterministic skirmish between two armies marching at each other.
pub(crate) struct Skirmish {
    rng: ChaCha8Rng,
    units: Vec<UnitSnapshot>,
    roster: PlayerRoster,
    casualties: Vec<UnitSnapshot>,
    world_extent: f32,
}

impl Skirmish {
    pub(crate) fn new(seed: u64, world_extent: f32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let margin = world_extent / 8.0;
        let south_west = WorldPoint::new(margin, margin);
        let north_east = WorldPoint::new(world_extent - margin, world_extent - margin);

        let mut units = Vec::new();
        let mut next_id = 1;
        for (owner, base) in [
            (PlayerId::new(0), south_west),
            (PlayerId::new(1), north_east),
        ] {
            Self::muster_army(&mut rng, &mut units, &mut next_id, owner, base);
        }

        // Neutral ore fields dotted along the midline.
        for i in 0..4 {
            let along = world_extent * (0.2 + 0.2 * i as f32);
            units.push(UnitSnapshot {
                id: UnitId::new(next_id),
                owner: PlayerId::new(0),
                type_id: ORE_FIELD,
                order: GUARD,
                position: WorldPoint::new(along, world_extent - along),
            });
            next_id += 1;
        }

        let roster = PlayerRoster::from_slots(vec![
            PlayerSlot {
                id: PlayerId::new(0),
                start_location: Some(south_west),
            },
            PlayerSlot {
                id: PlayerId::new(1),
                start_location: Some(north_east),
            },
        ]);

        Self {
            rng,
            units,
            roster,
            casualties: Vec::new(),
            world_extent,
        }
    }

    fn muster_army(
        rng: &mut ChaCha8Rng,
        units: &mut Vec<UnitSnapshot>,
        next_id: &mut u32,
        owner: PlayerId,
        base: WorldPoint,
    ) {
        let composition = [
            (FLAGSHIP, 1),
            (CRUISER, 2),
            (TROOPER, 6),
            (MEDIC, 2),
        ];
        for (type_id, count) in composition {
            for _ in 0..count {
                let position = WorldPoint::new(
                    base.x + rng.gen_range(-12.0..12.0),
                    base.y + rng.gen_range(-12.0..12.0),
                );
                units.push(UnitSnapshot {
                    id: UnitId::new(*next_id),
                    owner,
                    type_id,
                    order: ADVANCE,
                    position,
                });
                *next_id += 1;
            }
        }
    }

    pub(crate) const fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    /// Advances the skirmish one tick.
    ///
    /// Returns the unit snapshots for the tick; casualties that fell during
    /// the tick are available from [`Skirmish::casualties`] until the next
    /// call.
    pub(crate) fn advance(&mut self) -> &[UnitSnapshot] {
        self.casualties.clear();

        // March phase. Each mobile unit closes on the enemy base until an
        // opposing unit is inside engagement range.
        let positions: Vec<(PlayerId, WorldPoint)> = self
            .units
            .iter()
            .filter(|unit| unit.type_id != ORE_FIELD)
            .map(|unit| (unit.owner, unit.position))
            .collect();

        for unit in &mut self.units {
            if unit.type_id == ORE_FIELD {
                continue;
            }

            let engaged = positions.iter().any(|(owner, position)| {
                *owner != unit.owner && position.distance_to(unit.position) < ENGAGEMENT_RANGE
            });
            if engaged {
                unit.order = ATTACK;
                continue;
            }

            unit.order = ADVANCE;
            let goal = match self.roster.slot(enemy_of(unit.owner)) {
                Some(slot) => slot.start_location.unwrap_or(unit.position),
                None => unit.position,
            };
            let dx = goal.x - unit.position.x;
            let dy = goal.y - unit.position.y;
            let length = (dx * dx + dy * dy).sqrt();
            if length > MARCH_SPEED {
                let jitter_x = self.rng.gen_range(-0.2..0.2);
                let jitter_y = self.rng.gen_range(-0.2..0.2);
                unit.position = WorldPoint::new(
                    (unit.position.x + dx / length * MARCH_SPEED + jitter_x)
                        .clamp(0.0, self.world_extent),
                    (unit.position.y + dy / length * MARCH_SPEED + jitter_y)
                        .clamp(0.0, self.world_extent),
                );
            }
        }

        // Casualty phase. Engaged troopers occasionally fall.
        let rng = &mut self.rng;
        let casualties = &mut self.casualties;
        self.units.retain(|unit| {
            let falls = unit.type_id == TROOPER
                && unit.order == ATTACK
                && rng.gen_bool(CASUALTY_CHANCE);
            if falls {
                casualties.push(*unit);
            }
            !falls
        });

        &self.units
    }

    /// Units lost during the most recent [`Skirmish::advance`] call.
    pub(crate) fn casualties(&self) -> &[UnitSnapshot] {
        &self.casualties
    }
}

const fn enemy_of(player: PlayerId) -> PlayerId {
    match player.get() {
        0 => PlayerId::new(1),
        _ => PlayerId::new(0),
    }
}

#[cfg(test)]
mod tests {
    use super::{scorer, Skirmish};
    use replay_director_core::{Directive, GridTelemetry};
    use replay_director_system_director::{CameraDirector, DirectorConfig, TrackingState};

    #[test]
    fn skirmish_drives_the_director_out_of_idle() {
        let config = DirectorConfig {
            world_width: 256.0,
            world_height: 256.0,
            seed: 42,
            ..DirectorConfig::default()
        };
        let mut director = CameraDirector::new(config, scorer()).expect("valid config");
        let mut skirmish = Skirmish::new(42, 256.0);
        let mut out: Vec<Directive> = Vec::new();
        let mut telemetry = GridTelemetry::default();

        for tick in 0..32 {
            let units: Vec<_> = skirmish.advance().to_vec();
            assert!(!units.is_empty());
            out.clear();
            director.handle_tick(tick, &units, &mut out, &mut telemetry);
            for fallen in skirmish.casualties() {
                director.handle_unit_destroyed(fallen);
            }
        }

        // The armies are on the march from the first tick, so the director
        // has locked onto something by now and keeps reporting the grid.
        assert_ne!(director.state(), TrackingState::Idle);
        assert_eq!(telemetry.cells.len(), 64);
        assert!(telemetry.cells.iter().any(|cell| cell.units > 0));
    }
}
