#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous spectator-camera director for battle replays.
//!
//! Each tick the director re-buckets the host's unit snapshots into a coarse
//! grid, scores every cell by narrative interest, suppresses recently shown
//! regions through a decaying cooldown field, and steers one or two virtual
//! viewports toward the most interesting cells. Camera moves are gated by a
//! dwell policy so the view never flickers, framing distance follows the
//! positional spread of the selected cluster, and playback speed is damped
//! during high-tension moments.

mod framing;

use std::collections::HashSet;

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use replay_director_core::{
    CellCoord, CellTelemetry, Directive, GridTelemetry, PlayerId, PlayerRoster, UnitId,
    UnitSnapshot, ViewportId, WorldPoint,
};
use replay_director_grid::{CooldownField, GridTransform, SpatialGrid};
use replay_director_system_scoring::InterestScorer;

/// Decay factor applied to a cell when a unit dies inside it.
const UNIT_DEATH_DECAY: f32 = 0.9;

/// Fraction of the base distance used by the secondary viewport.
const SECONDARY_DISTANCE_FRACTION: f32 = 0.75;

/// World-unit radius around an enemy start location for the roster predicate.
const ENEMY_START_PROXIMITY: f32 = 32.0;

/// World-unit radius treated as a player's own base exclusion zone.
const OWN_START_PROXIMITY: f32 = 320.0;

/// Tunable parameters of the director.
///
/// Times are expressed in simulation ticks, angles controlling the framing
/// jitter in degrees, everything spatial in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectorConfig {
    /// Grid resolution in cells per side.
    pub grid_size: u32,
    /// Width of the battlefield in world units.
    pub world_width: f32,
    /// Height of the battlefield in world units.
    pub world_height: f32,
    /// Horizontal origin offset applied before quantisation.
    pub world_offset_x: f32,
    /// Vertical origin offset applied before quantisation.
    pub world_offset_y: f32,
    /// Full dwell time a shot holds before any move is allowed.
    pub camera_move_time: u64,
    /// Minimum dwell time before a higher-priority event may preempt.
    pub camera_move_time_min: u64,
    /// Ticks between interval decays of the cooldown field.
    pub heatmap_update_interval: u64,
    /// Multiplicative decay factor applied at each interval, in `(0, 1)`.
    pub heatmap_decay: f32,
    /// Cells with cooldown at or above this value are skipped, in `[0, 1]`.
    pub cooldown_threshold: f32,
    /// Framing distance for a fully collapsed cluster.
    pub base_distance: f32,
    /// Additional distance reached by a maximally spread cluster.
    pub distance_variance: f32,
    /// Rest polar angle of the primary viewport in radians.
    pub minimum_polar_angle: f32,
    /// Upper bound of the random polar jitter in degrees.
    pub polar_variance: f32,
    /// Total span of the random azimuth jitter in degrees.
    pub azimuth_variance: f32,
    /// Ground distance below which the secondary view is force-disabled.
    pub pip_proximity: f32,
    /// Fastest playback multiplier requested during lulls.
    pub speed_ceiling: f32,
    /// Seed for the deterministic framing-jitter RNG.
    pub seed: u64,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            world_width: 256.0,
            world_height: 256.0,
            world_offset_x: 0.0,
            world_offset_y: 0.0,
            camera_move_time: 96,
            camera_move_time_min: 24,
            heatmap_update_interval: 48,
            heatmap_decay: 0.9,
            cooldown_threshold: 0.2,
            base_distance: 55.0,
            distance_variance: 30.0,
            minimum_polar_angle: std::f32::consts::PI / 32.0,
            polar_variance: 10.0,
            azimuth_variance: 20.0,
            pip_proximity: 16.0,
            speed_ceiling: 8.0,
            seed: 0,
        }
    }
}

impl DirectorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::InvalidGridSize {
                grid_size: self.grid_size,
            });
        }
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(ConfigError::InvalidWorldExtent {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if !(self.heatmap_decay > 0.0 && self.heatmap_decay < 1.0) {
            return Err(ConfigError::InvalidDecayFactor {
                factor: self.heatmap_decay,
            });
        }
        if !(0.0..=1.0).contains(&self.cooldown_threshold) {
            return Err(ConfigError::InvalidCooldownThreshold {
                threshold: self.cooldown_threshold,
            });
        }
        Ok(())
    }
}

/// Errors reported when a [`DirectorConfig`] fails validation.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Grid resolution must be positive.
    #[error("grid_size must be positive (received {grid_size})")]
    InvalidGridSize {
        /// Provided resolution that failed validation.
        grid_size: u32,
    },
    /// The world extent must have positive area.
    #[error("world extent must be positive (received {width}x{height})")]
    InvalidWorldExtent {
        /// Provided world width.
        width: f32,
        /// Provided world height.
        height: f32,
    },
    /// The interval decay factor must lie strictly between zero and one.
    #[error("heatmap_decay must lie in (0, 1) (received {factor})")]
    InvalidDecayFactor {
        /// Provided decay factor.
        factor: f32,
    },
    /// The cooldown suppression threshold must lie within the unit range.
    #[error("cooldown_threshold must lie in [0, 1] (received {threshold})")]
    InvalidCooldownThreshold {
        /// Provided threshold.
        threshold: f32,
    },
}

/// Current tracking posture of the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    /// No target selected yet.
    Idle,
    /// The primary viewport is locked to a cell.
    TrackingPrimary,
    /// Primary plus an active auxiliary picture-in-picture view.
    TrackingPrimaryAndSecondary,
}

/// Spectator-camera director driving the host's viewports.
///
/// Single-threaded and tick-driven: the host invokes [`handle_tick`] from
/// its per-tick callback, [`handle_unit_destroyed`] and [`handle_reset`]
/// from the matching lifecycle events. All scratch buffers are owned by the
/// director and reused across ticks.
///
/// [`handle_tick`]: CameraDirector::handle_tick
/// [`handle_unit_destroyed`]: CameraDirector::handle_unit_destroyed
/// [`handle_reset`]: CameraDirector::handle_reset
#[derive(Debug)]
pub struct CameraDirector {
    config: DirectorConfig,
    scorer: InterestScorer,
    grid: SpatialGrid,
    heatmap: CooldownField,
    rng: ChaCha8Rng,
    max_spread_variance: f32,

    last_move_tick: Option<u64>,
    last_move_priority: f32,
    last_heatmap_tick: u64,

    primary_cell: Option<CellCoord>,
    secondary_cell: Option<CellCoord>,
    primary_target: Option<WorldPoint>,
    secondary_target: Option<WorldPoint>,
    secondary_enabled: bool,

    followed_units: HashSet<UnitId>,
    secondary_followed: Option<UnitId>,
    secondary_followed_position: Option<WorldPoint>,

    followed_positions: Vec<WorldPoint>,
    cell_scratch: Vec<UnitSnapshot>,
    id_scratch: Vec<UnitId>,
}

impl CameraDirector {
    /// Creates a director over a validated configuration.
    pub fn new(config: DirectorConfig, scorer: InterestScorer) -> Result<Self, ConfigError> {
        config.validate()?;

        let transform = GridTransform::new(
            config.grid_size,
            config.world_width,
            config.world_height,
            config.world_offset_x,
            config.world_offset_y,
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            max_spread_variance: framing::max_total_variance(
                config.world_width,
                config.world_height,
            ),
            grid: SpatialGrid::new(transform),
            heatmap: CooldownField::new(config.grid_size),
            scorer,
            config,
            last_move_tick: None,
            last_move_priority: 0.0,
            last_heatmap_tick: 0,
            primary_cell: None,
            secondary_cell: None,
            primary_target: None,
            secondary_target: None,
            secondary_enabled: false,
            followed_units: HashSet::new(),
            secondary_followed: None,
            secondary_followed_position: None,
            followed_positions: Vec::new(),
            cell_scratch: Vec::new(),
            id_scratch: Vec::new(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Current tracking posture.
    #[must_use]
    pub fn state(&self) -> TrackingState {
        if self.followed_units.is_empty() {
            TrackingState::Idle
        } else if self.secondary_enabled {
            TrackingState::TrackingPrimaryAndSecondary
        } else {
            TrackingState::TrackingPrimary
        }
    }

    /// Cell currently held by the primary viewport, if any.
    #[must_use]
    pub const fn primary_cell(&self) -> Option<CellCoord> {
        self.primary_cell
    }

    /// Cell currently shown by the auxiliary viewport, if any.
    #[must_use]
    pub const fn secondary_cell(&self) -> Option<CellCoord> {
        self.secondary_cell
    }

    /// Consumes one tick's unit snapshots and emits camera directives.
    ///
    /// `out` is appended to, never cleared; `telemetry` is rebuilt in place.
    pub fn handle_tick(
        &mut self,
        tick: u64,
        units: &[UnitSnapshot],
        out: &mut Vec<Directive>,
        telemetry: &mut GridTelemetry,
    ) {
        // Rebuild the grid and refresh followed-unit positions.
        self.grid.reset();
        self.followed_positions.clear();
        for unit in units {
            if self.scorer.eligible_for_scoring(unit) {
                self.grid.insert(*unit);
            }
            if self.followed_units.contains(&unit.id) {
                self.followed_positions.push(unit.position);
            }
            if self.secondary_followed == Some(unit.id) {
                self.secondary_followed_position = Some(unit.position);
            }
        }

        // Interval decay runs on its own cadence, independent of selection.
        if tick.saturating_sub(self.last_heatmap_tick) > self.config.heatmap_update_interval {
            self.heatmap.decay_all(self.config.heatmap_decay);
            self.last_heatmap_tick = tick;
        }

        // Row-major scan. The runner-up is the candidate displaced from
        // first place during this scan, not the independent second-highest
        // score; downstream pacing depends on that exact bookkeeping.
        let mut high_score = 0.0_f32;
        let mut primary: Option<CellCoord> = None;
        let mut secondary: Option<CellCoord> = None;
        let mut score_sum = 0.0_f32;

        for cell in self.grid.cells() {
            let score = self.scorer.average_score(cell.units());
            score_sum += score;
            if score > high_score {
                if self.heatmap.value(cell.coord()) < self.config.cooldown_threshold {
                    high_score = score;
                    secondary = primary;
                    primary = Some(cell.coord());
                } else {
                    trace!(
                        "cell ({}, {}) scored {score:.3} but is still hot",
                        cell.coord().column(),
                        cell.coord().row(),
                    );
                }
            }
        }

        let mean_score = score_sum / self.grid.cell_count() as f32;

        // Selection, gated by the dwell policy.
        if let Some(primary_coord) = primary {
            let has_units = !self.grid.cell(primary_coord).units().is_empty();
            if has_units && self.should_move(tick, high_score) {
                self.activate_primary(tick, primary_coord, high_score, out);

                let secondary_active = match secondary {
                    Some(secondary_coord) => {
                        let secondary_score = self
                            .scorer
                            .average_score(self.grid.cell(secondary_coord).units());
                        secondary_score > mean_score
                            && self.activate_secondary(secondary_coord, out)
                    }
                    None => false,
                };

                self.secondary_enabled = secondary_active;
                if !secondary_active {
                    self.secondary_cell = None;
                }
                out.push(Directive::SetSecondaryViewportEnabled {
                    enabled: secondary_active,
                });

                let damping = framing::ease_out_quint(high_score.clamp(0.0, 1.0));
                let speed = (self.config.speed_ceiling * (1.0 - damping)).max(1.0);
                out.push(Directive::SetPlaybackSpeed { multiplier: speed });
                debug!(
                    "primary move to ({}, {}) score {high_score:.3} speed {speed:.2}",
                    primary_coord.column(),
                    primary_coord.row(),
                );
            }
        }

        // Continuous tracking between discrete re-selections.
        if let Some(center) = framing::centroid(&self.followed_positions) {
            out.push(Directive::MoveCamera {
                viewport: ViewportId::Primary,
                target: center,
                smoothed: true,
            });
            self.primary_target = Some(center);
        }
        if self.secondary_followed.is_some() {
            if let Some(position) = self.secondary_followed_position {
                out.push(Directive::MoveCamera {
                    viewport: ViewportId::Secondary,
                    target: position,
                    smoothed: true,
                });
                self.secondary_target = Some(position);
            }
        }

        // Auxiliary suppression when both views frame the same spot.
        if self.secondary_enabled {
            if let (Some(primary_target), Some(secondary_target)) =
                (self.primary_target, self.secondary_target)
            {
                if primary_target.distance_to(secondary_target) < self.config.pip_proximity {
                    self.secondary_enabled = false;
                    out.push(Directive::SetSecondaryViewportEnabled { enabled: false });
                    debug!(
                        "secondary view suppressed: targets within {:.1} world units",
                        self.config.pip_proximity
                    );
                }
            }
        }

        self.fill_telemetry(tick, telemetry);
    }

    /// Reacts to a unit's death: local cooldown drop, follow bookkeeping.
    pub fn handle_unit_destroyed(&mut self, unit: &UnitSnapshot) {
        if self.secondary_followed == Some(unit.id) {
            self.secondary_followed = None;
            self.secondary_followed_position = None;
        }

        let cell = self.grid.transform().cell_for(unit.position);
        self.heatmap.decay_one(cell, UNIT_DEATH_DECAY);
        trace!(
            "unit {} destroyed in cell ({}, {})",
            unit.id.get(),
            cell.column(),
            cell.row(),
        );
    }

    /// Clears all persistent state after a simulation reset or replay seek.
    pub fn handle_reset(&mut self) {
        self.grid.reset();
        self.heatmap.clear();
        self.followed_units.clear();
        self.followed_positions.clear();
        self.secondary_followed = None;
        self.secondary_followed_position = None;
        self.primary_cell = None;
        self.secondary_cell = None;
        self.primary_target = None;
        self.secondary_target = None;
        self.secondary_enabled = false;
        self.last_move_tick = None;
        self.last_move_priority = 0.0;
        self.last_heatmap_tick = 0;
    }

    fn should_move(&self, tick: u64, priority: f32) -> bool {
        let Some(last_move) = self.last_move_tick else {
            return true;
        };

        let delta = tick.saturating_sub(last_move);
        let full_dwell_elapsed = delta >= self.config.camera_move_time;
        let preemption_window_open = delta >= self.config.camera_move_time_min;
        let higher_priority = priority > self.last_move_priority;

        full_dwell_elapsed || (higher_priority && preemption_window_open)
    }

    fn activate_primary(
        &mut self,
        tick: u64,
        coord: CellCoord,
        score: f32,
        out: &mut Vec<Directive>,
    ) {
        let units = self.grid.cell(coord).units();
        self.cell_scratch.clear();
        self.cell_scratch.extend_from_slice(units);

        let Some(focus) = self.scorer.argmax_unit(&self.cell_scratch).copied() else {
            return;
        };

        out.push(Directive::MoveCamera {
            viewport: ViewportId::Primary,
            target: focus.position,
            smoothed: true,
        });

        // Tight clusters zoom in, spread clusters zoom out.
        let spread = framing::normalized_spread(&self.cell_scratch, self.max_spread_variance);
        let distance = framing::lerp(
            self.config.base_distance,
            self.config.base_distance + self.config.distance_variance,
            framing::ease_out_cubic(spread),
        );
        out.push(Directive::SetCameraDistance {
            viewport: ViewportId::Primary,
            distance,
            smoothed: true,
        });

        // Small randomised offsets keep repeated shots of one cell varied.
        let polar_delta = self.config.minimum_polar_angle
            + self.rng.gen::<f32>() * self.config.polar_variance.to_radians();
        let azimuth_delta =
            (self.rng.gen::<f32>() - 0.5) * self.config.azimuth_variance.to_radians();
        out.push(Directive::SetCameraOrientation {
            viewport: ViewportId::Primary,
            polar_delta,
            azimuth_delta,
            smoothed: true,
        });

        self.followed_units.clear();
        self.followed_positions.clear();
        self.id_scratch.clear();
        for unit in &self.cell_scratch {
            let _ = self.followed_units.insert(unit.id);
            self.followed_positions.push(unit.position);
            self.id_scratch.push(unit.id);
        }
        out.push(Directive::SetFollowedUnits {
            units: self.id_scratch.clone(),
        });
        out.push(Directive::SetSelectedUnits {
            units: self.id_scratch.clone(),
        });

        self.heatmap.mark_hot(coord);
        self.primary_cell = Some(coord);
        self.primary_target = Some(focus.position);
        self.last_move_tick = Some(tick);
        self.last_move_priority = score;
    }

    fn activate_secondary(&mut self, coord: CellCoord, out: &mut Vec<Directive>) -> bool {
        let units = self.grid.cell(coord).units();
        self.cell_scratch.clear();
        self.cell_scratch.extend_from_slice(units);

        let Some(focus) = self.scorer.argmax_unit(&self.cell_scratch).copied() else {
            return false;
        };

        self.secondary_followed = Some(focus.id);
        self.secondary_followed_position = Some(focus.position);

        out.push(Directive::MoveCamera {
            viewport: ViewportId::Secondary,
            target: focus.position,
            smoothed: true,
        });
        out.push(Directive::SetCameraDistance {
            viewport: ViewportId::Secondary,
            distance: self.config.base_distance * SECONDARY_DISTANCE_FRACTION,
            smoothed: true,
        });

        self.secondary_cell = Some(coord);
        self.secondary_target = Some(focus.position);
        true
    }

    fn fill_telemetry(&self, tick: u64, telemetry: &mut GridTelemetry) {
        telemetry.begin(
            tick,
            self.grid.size(),
            self.last_move_tick,
            self.last_heatmap_tick,
        );
        for cell in self.grid.cells() {
            telemetry.cells.push(CellTelemetry {
                column: cell.coord().column(),
                row: cell.coord().row(),
                score: self.scorer.average_score(cell.units()),
                units: cell.units().len() as u32,
                cooldown: self.heatmap.value(cell.coord()),
            });
        }
    }
}

/// Reports whether a position lies close to an *enemy* start location.
///
/// Start locations inside the given player's own base exclusion zone are
/// ignored. Auxiliary helper for host-side shot vetting; not used by the
/// main selection loop.
#[must_use]
pub fn near_enemy_start_location(
    roster: &PlayerRoster,
    player: Option<PlayerId>,
    position: WorldPoint,
) -> bool {
    for slot in roster.iter() {
        if let Some(start) = slot.start_location {
            if !near_own_start_location(roster, player, start)
                && start.distance_to(position) <= ENEMY_START_PROXIMITY
            {
                return true;
            }
        }
    }
    false
}

/// Reports whether a position lies within the player's own base zone.
#[must_use]
pub fn near_own_start_location(
    roster: &PlayerRoster,
    player: Option<PlayerId>,
    position: WorldPoint,
) -> bool {
    let Some(player) = player else {
        return false;
    };
    let Some(slot) = roster.slot(player) else {
        return false;
    };
    let Some(start) = slot.start_location else {
        return false;
    };
    start.distance_to(position) <= OWN_START_PROXIMITY
}

#[cfg(test)]
mod tests {
    use super::{
        near_enemy_start_location, near_own_start_location, CameraDirector, ConfigError,
        DirectorConfig,
    };
    use replay_director_core::{PlayerId, PlayerRoster, PlayerSlot, WorldPoint};
    use replay_director_system_scoring::{InterestScorer, OrderTable, TierTable};

    fn scorer() -> InterestScorer {
        InterestScorer::new(TierTable::default(), OrderTable::default(), &[])
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        let config = DirectorConfig {
            grid_size: 0,
            ..DirectorConfig::default()
        };
        assert_eq!(
            CameraDirector::new(config, scorer()).err(),
            Some(ConfigError::InvalidGridSize { grid_size: 0 })
        );
    }

    #[test]
    fn decay_factor_must_lie_strictly_inside_unit_interval() {
        for factor in [0.0, 1.0, 1.5, -0.25] {
            let config = DirectorConfig {
                heatmap_decay: factor,
                ..DirectorConfig::default()
            };
            assert_eq!(
                CameraDirector::new(config, scorer()).err(),
                Some(ConfigError::InvalidDecayFactor { factor })
            );
        }
    }

    #[test]
    fn negative_world_extent_is_rejected() {
        let config = DirectorConfig {
            world_width: -64.0,
            ..DirectorConfig::default()
        };
        assert!(matches!(
            CameraDirector::new(config, scorer()),
            Err(ConfigError::InvalidWorldExtent { .. })
        ));
    }

    #[test]
    fn dwell_policy_gates_and_preempts() {
        let config = DirectorConfig {
            camera_move_time: 10,
            camera_move_time_min: 2,
            ..DirectorConfig::default()
        };
        let mut director = CameraDirector::new(config, scorer()).expect("valid config");

        // No prior move: always allowed.
        assert!(director.should_move(0, 0.1));

        director.last_move_tick = Some(0);
        director.last_move_priority = 0.5;

        // Inside the dwell window a higher priority preempts, a lower waits.
        assert!(director.should_move(5, 0.9));
        assert!(!director.should_move(5, 0.4));
        assert!(!director.should_move(5, 0.5));

        // Before the preemption window even a higher priority waits.
        assert!(!director.should_move(1, 0.9));

        // After the full dwell time any priority may move.
        assert!(director.should_move(11, 0.1));
        assert!(director.should_move(10, 0.1));
    }

    fn roster() -> PlayerRoster {
        PlayerRoster::from_slots(vec![
            PlayerSlot {
                id: PlayerId::new(0),
                start_location: Some(WorldPoint::new(0.0, 0.0)),
            },
            PlayerSlot {
                id: PlayerId::new(1),
                start_location: Some(WorldPoint::new(1000.0, 1000.0)),
            },
            PlayerSlot {
                id: PlayerId::new(2),
                start_location: None,
            },
        ])
    }

    #[test]
    fn enemy_start_predicate_ignores_own_base() {
        let roster = roster();
        let viewer = Some(PlayerId::new(0));

        // Near the enemy base at (1000, 1000).
        assert!(near_enemy_start_location(
            &roster,
            viewer,
            WorldPoint::new(1010.0, 1000.0)
        ));
        // The viewer's own start location never counts as an enemy base.
        assert!(!near_enemy_start_location(
            &roster,
            viewer,
            WorldPoint::new(5.0, 5.0)
        ));
        // Far from every start location.
        assert!(!near_enemy_start_location(
            &roster,
            viewer,
            WorldPoint::new(500.0, 500.0)
        ));
    }

    #[test]
    fn own_start_predicate_requires_player_and_hint() {
        let roster = roster();
        assert!(near_own_start_location(
            &roster,
            Some(PlayerId::new(0)),
            WorldPoint::new(100.0, 100.0)
        ));
        assert!(!near_own_start_location(
            &roster,
            None,
            WorldPoint::new(0.0, 0.0)
        ));
        assert!(!near_own_start_location(
            &roster,
            Some(PlayerId::new(2)),
            WorldPoint::new(0.0, 0.0)
        ));
    }
}
