#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Replay Director.
//!
//! This crate defines the message surface that connects the host simulation
//! to the director systems. The host feeds read-only [`UnitSnapshot`] values
//! each tick, the director responds with [`Directive`] values describing
//! camera and playback intent, and a [`GridTelemetry`] payload summarises the
//! scored grid for observability consumers. Nothing in this crate mutates
//! host state.

use serde::{Deserialize, Serialize};

/// Unique identifier assigned to a unit by the host simulation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Player slot that owns units within the replay.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a new player identifier with the provided slot index.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric slot index of the player.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Identifier of a unit type within the host's static unit catalogue.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitTypeId(u16);

impl UnitTypeId {
    /// Creates a new unit type identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the type identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Identifier of the order (action) a unit is currently executing.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct OrderId(u16);

impl OrderId {
    /// Creates a new order identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the order identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Position on the battlefield's ground plane expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate in world units.
    pub x: f32,
    /// Vertical coordinate in world units.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another world-space point.
    #[must_use]
    pub fn distance_to(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Immutable per-tick description of a single unit, owned by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier assigned to the unit by the host.
    pub id: UnitId,
    /// Player slot that owns the unit.
    pub owner: PlayerId,
    /// Static type of the unit.
    pub type_id: UnitTypeId,
    /// Order the unit is currently executing.
    pub order: OrderId,
    /// Ground-plane position of the unit in world units.
    pub position: WorldPoint,
}

/// Virtual viewport addressed by camera directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewportId {
    /// Full-screen main view.
    Primary,
    /// Auxiliary picture-in-picture view.
    Secondary,
}

/// Commands issued by the director toward the host viewport and playhead.
///
/// Directives express intent only; the host may smooth, clamp or ignore them.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// Moves a viewport's camera target to the provided ground position.
    MoveCamera {
        /// Viewport whose camera should move.
        viewport: ViewportId,
        /// Ground-plane position the camera should center on.
        target: WorldPoint,
        /// Whether the host should interpolate toward the target.
        smoothed: bool,
    },
    /// Adjusts the camera-to-target distance of a viewport.
    SetCameraDistance {
        /// Viewport whose framing distance should change.
        viewport: ViewportId,
        /// Requested camera-to-target distance in world units.
        distance: f32,
        /// Whether the host should interpolate toward the distance.
        smoothed: bool,
    },
    /// Adjusts a viewport's orbit orientation relative to its rest pose.
    SetCameraOrientation {
        /// Viewport whose orientation should change.
        viewport: ViewportId,
        /// Polar (inclination) offset in radians.
        polar_delta: f32,
        /// Azimuth offset in radians.
        azimuth_delta: f32,
        /// Whether the host should interpolate toward the orientation.
        smoothed: bool,
    },
    /// Replaces the set of units the primary view follows between moves.
    SetFollowedUnits {
        /// Identifiers of the units to follow; empty clears the set.
        units: Vec<UnitId>,
    },
    /// Replaces the host-side unit selection shown in the HUD.
    SetSelectedUnits {
        /// Identifiers of the units to select; empty clears the selection.
        units: Vec<UnitId>,
    },
    /// Enables or disables the auxiliary picture-in-picture viewport.
    SetSecondaryViewportEnabled {
        /// Whether the secondary viewport should be visible.
        enabled: bool,
    },
    /// Requests a playback speed multiplier from the host simulation.
    SetPlaybackSpeed {
        /// Desired speed multiplier; 1.0 is real time.
        multiplier: f32,
    },
}

/// One player's roster entry with an optional start-location hint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSlot {
    /// Slot identifier of the player.
    pub id: PlayerId,
    /// Start location of the player's base, when the host knows it.
    pub start_location: Option<WorldPoint>,
}

/// Roster of the players participating in the replay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRoster {
    slots: Vec<PlayerSlot>,
}

impl PlayerRoster {
    /// Creates a roster from the provided slots.
    #[must_use]
    pub fn from_slots(slots: Vec<PlayerSlot>) -> Self {
        Self { slots }
    }

    /// Iterator over the roster slots in host order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerSlot> {
        self.slots.iter()
    }

    /// Looks up the slot for the provided player, if present.
    #[must_use]
    pub fn slot(&self, player: PlayerId) -> Option<&PlayerSlot> {
        self.slots.iter().find(|slot| slot.id == player)
    }
}

/// Per-cell diagnostic entry published alongside each tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellTelemetry {
    /// Zero-based column index of the cell.
    pub column: u32,
    /// Zero-based row index of the cell.
    pub row: u32,
    /// Average interest score of the cell this tick.
    pub score: f32,
    /// Number of eligible units bucketed into the cell this tick.
    pub units: u32,
    /// Current cooldown value of the cell in `[0, 1]`.
    pub cooldown: f32,
}

/// Read-only grid summary emitted once per tick for observability consumers.
///
/// The payload never feeds back into the director; it exists so UI layers
/// can visualise what the selection loop saw. Buffers are reused across
/// ticks by [`GridTelemetry::begin`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridTelemetry {
    /// Tick the summary describes.
    pub tick: u64,
    /// Grid resolution (cells per side).
    pub size: u32,
    /// Tick of the most recent primary camera move, if any.
    pub last_move_tick: Option<u64>,
    /// Tick of the most recent interval heatmap decay.
    pub last_decay_tick: u64,
    /// Per-cell entries in row-major order.
    pub cells: Vec<CellTelemetry>,
}

impl GridTelemetry {
    /// Resets the summary for a new tick, retaining the cell buffer.
    pub fn begin(
        &mut self,
        tick: u64,
        size: u32,
        last_move_tick: Option<u64>,
        last_decay_tick: u64,
    ) {
        self.tick = tick;
        self.size = size;
        self.last_move_tick = last_move_tick;
        self.last_decay_tick = last_decay_tick;
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, OrderId, PlayerId, PlayerRoster, PlayerSlot, UnitId, UnitTypeId, WorldPoint};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn unit_id_round_trips_through_bincode() {
        assert_round_trip(&UnitId::new(42));
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn identifier_accessors_return_wrapped_values() {
        assert_eq!(PlayerId::new(3).get(), 3);
        assert_eq!(UnitTypeId::new(900).get(), 900);
        assert_eq!(OrderId::new(14).get(), 14);
    }

    #[test]
    fn world_point_distance_matches_euclidean_expectation() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f32::EPSILON);
        assert!((b.distance_to(a) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn roster_lookup_finds_registered_slots() {
        let roster = PlayerRoster::from_slots(vec![
            PlayerSlot {
                id: PlayerId::new(0),
                start_location: Some(WorldPoint::new(32.0, 32.0)),
            },
            PlayerSlot {
                id: PlayerId::new(1),
                start_location: None,
            },
        ]);

        assert!(roster.slot(PlayerId::new(0)).is_some());
        assert!(roster.slot(PlayerId::new(1)).is_some());
        assert!(roster.slot(PlayerId::new(7)).is_none());
        assert_eq!(roster.iter().count(), 2);
    }
}
