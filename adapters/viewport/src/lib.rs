#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-side viewport plumbing.
//!
//! The director emits abstract [`Directive`]s; this adapter routes them onto
//! concrete camera rigs, clamping everything to the host's physical limits
//! along the way. Hosts implement the three small traits here and hand their
//! implementations to a [`ViewportRouter`].

use glam::Vec2;

use replay_director_core::{Directive, UnitId, ViewportId, WorldPoint};

/// Converts a battlefield position into the host's 2D vector type.
#[must_use]
pub fn world_to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x, point.y)
}

/// A steerable camera owned by the host.
pub trait CameraRig {
    /// Points the camera's ground target at `target`.
    fn move_to(&mut self, target: Vec2, smoothed: bool);
    /// Sets the camera's distance from its ground target.
    fn dolly_to(&mut self, distance: f32, smoothed: bool);
    /// Sets the camera's absolute polar and azimuth angles in radians.
    fn rotate_to(&mut self, polar: f32, azimuth: f32, smoothed: bool);
}

/// Playback-rate control of the replay host.
pub trait PlaybackControl {
    /// Requests a playback speed multiplier, `1.0` meaning real time.
    fn set_speed(&mut self, multiplier: f32);
}

/// Receives the unit lists the director wants tracked and highlighted.
pub trait SelectionSink {
    /// Replaces the set of units the camera follows between moves.
    fn follow_units(&mut self, units: &[UnitId]);
    /// Replaces the host's visible unit selection.
    fn select_units(&mut self, units: &[UnitId]);
}

/// Physical limits of the host's camera rigs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraLimits {
    /// Closest allowed dolly distance.
    pub min_distance: f32,
    /// Farthest allowed dolly distance.
    pub max_distance: f32,
    /// Shallowest allowed polar angle in radians.
    pub min_polar: f32,
    /// Steepest allowed polar angle in radians.
    pub max_polar: f32,
    /// Largest allowed azimuth swing either side of centre, in radians.
    pub max_azimuth: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_distance: 20.0,
            max_distance: 128.0,
            min_polar: 2.0 * std::f32::consts::PI / 64.0,
            max_polar: 10.0 * std::f32::consts::PI / 64.0,
            max_azimuth: std::f32::consts::FRAC_PI_4,
        }
    }
}

impl CameraLimits {
    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }

    fn clamp_polar(&self, polar: f32) -> f32 {
        polar.clamp(self.min_polar, self.max_polar)
    }

    fn clamp_azimuth(&self, azimuth: f32) -> f32 {
        azimuth.clamp(-self.max_azimuth, self.max_azimuth)
    }
}

/// Screen placement of the auxiliary picture-in-picture view.
///
/// Fractions are relative to the full window; the view is anchored to the
/// bottom-right corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SecondaryViewportLayout {
    height_fraction: f32,
    right_margin: f32,
    bottom_margin: f32,
}

impl Default for SecondaryViewportLayout {
    fn default() -> Self {
        Self {
            height_fraction: 0.3,
            right_margin: 0.05,
            bottom_margin: 0.05,
        }
    }
}

impl SecondaryViewportLayout {
    /// Builds a layout, rejecting fractions outside the window.
    pub fn new(
        height_fraction: f32,
        right_margin: f32,
        bottom_margin: f32,
    ) -> Result<Self, ViewportError> {
        if !(height_fraction > 0.0 && height_fraction < 1.0) {
            return Err(ViewportError::InvalidHeightFraction {
                fraction: height_fraction,
            });
        }
        for margin in [right_margin, bottom_margin] {
            if !(0.0..0.5).contains(&margin) {
                return Err(ViewportError::InvalidMargin { margin });
            }
        }
        Ok(Self {
            height_fraction,
            right_margin,
            bottom_margin,
        })
    }

    /// Height of the view as a fraction of the window height.
    #[must_use]
    pub const fn height_fraction(&self) -> f32 {
        self.height_fraction
    }

    /// Gap between the view and the right window edge, as a fraction.
    #[must_use]
    pub const fn right_margin(&self) -> f32 {
        self.right_margin
    }

    /// Gap between the view and the bottom window edge, as a fraction.
    #[must_use]
    pub const fn bottom_margin(&self) -> f32 {
        self.bottom_margin
    }
}

/// Errors produced while configuring viewport plumbing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportError {
    /// The picture-in-picture height fraction must lie strictly in `(0, 1)`.
    InvalidHeightFraction {
        /// Provided fraction.
        fraction: f32,
    },
    /// Margins must lie in `[0, 0.5)`.
    InvalidMargin {
        /// Provided margin.
        margin: f32,
    },
}

impl std::fmt::Display for ViewportError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeightFraction { fraction } => {
                write!(
                    formatter,
                    "secondary viewport height fraction must lie in (0, 1), received {fraction}"
                )
            }
            Self::InvalidMargin { margin } => {
                write!(
                    formatter,
                    "secondary viewport margins must lie in [0, 0.5), received {margin}"
                )
            }
        }
    }
}

impl std::error::Error for ViewportError {}

/// Routes director directives onto the host's rigs and controls.
///
/// Orientation directives carry offsets from the rig's rest pose; the
/// router resolves each one to absolute angles and clamps against
/// [`CameraLimits`] before forwarding, so rigs only ever see legal values
/// and successive shots never drift toward a limit.
#[derive(Debug)]
pub struct ViewportRouter<R, P, S> {
    primary: R,
    secondary: R,
    playback: P,
    selection: S,
    limits: CameraLimits,
    layout: SecondaryViewportLayout,
    secondary_visible: bool,
}

impl<R: CameraRig, P: PlaybackControl, S: SelectionSink> ViewportRouter<R, P, S> {
    /// Wires two rigs, a playback control and a selection sink together.
    pub fn new(
        primary: R,
        secondary: R,
        playback: P,
        selection: S,
        limits: CameraLimits,
        layout: SecondaryViewportLayout,
    ) -> Self {
        Self {
            primary,
            secondary,
            playback,
            selection,
            limits,
            layout,
            secondary_visible: false,
        }
    }

    /// Whether the picture-in-picture view should currently be drawn.
    #[must_use]
    pub const fn secondary_visible(&self) -> bool {
        self.secondary_visible
    }

    /// Screen placement of the picture-in-picture view.
    #[must_use]
    pub const fn layout(&self) -> &SecondaryViewportLayout {
        &self.layout
    }

    /// Applies one tick's worth of directives in order.
    pub fn apply(&mut self, directives: &[Directive]) {
        for directive in directives {
            match directive {
                Directive::MoveCamera {
                    viewport,
                    target,
                    smoothed,
                } => {
                    self.rig_mut(*viewport)
                        .move_to(world_to_vec2(*target), *smoothed);
                }
                Directive::SetCameraDistance {
                    viewport,
                    distance,
                    smoothed,
                } => {
                    let distance = self.limits.clamp_distance(*distance);
                    self.rig_mut(*viewport).dolly_to(distance, *smoothed);
                }
                Directive::SetCameraOrientation {
                    viewport,
                    polar_delta,
                    azimuth_delta,
                    smoothed,
                } => {
                    // Each directive stands alone: offsets resolve against
                    // the rest pose, never against the previous shot.
                    let polar = self.limits.clamp_polar(self.limits.min_polar + *polar_delta);
                    let azimuth = self.limits.clamp_azimuth(*azimuth_delta);
                    self.rig_mut(*viewport).rotate_to(polar, azimuth, *smoothed);
                }
                Directive::SetFollowedUnits { units } => {
                    self.selection.follow_units(units);
                }
                Directive::SetSelectedUnits { units } => {
                    self.selection.select_units(units);
                }
                Directive::SetSecondaryViewportEnabled { enabled } => {
                    self.secondary_visible = *enabled;
                }
                Directive::SetPlaybackSpeed { multiplier } => {
                    self.playback.set_speed(*multiplier);
                }
            }
        }
    }

    fn rig_mut(&mut self, viewport: ViewportId) -> &mut R {
        match viewport {
            ViewportId::Primary => &mut self.primary,
            ViewportId::Secondary => &mut self.secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CameraLimits, CameraRig, PlaybackControl, SecondaryViewportLayout, SelectionSink,
        ViewportError, ViewportRouter,
    };
    use glam::Vec2;
    use replay_director_core::{Directive, UnitId, ViewportId, WorldPoint};

    #[derive(Debug, PartialEq)]
    enum Event {
        Move(Vec2, bool),
        Dolly(f32, bool),
        Rotate(f32, f32, bool),
    }

    #[derive(Default)]
    struct RecordingRig {
        events: Vec<Event>,
    }

    impl CameraRig for &mut RecordingRig {
        fn move_to(&mut self, target: Vec2, smoothed: bool) {
            self.events.push(Event::Move(target, smoothed));
        }

        fn dolly_to(&mut self, distance: f32, smoothed: bool) {
            self.events.push(Event::Dolly(distance, smoothed));
        }

        fn rotate_to(&mut self, polar: f32, azimuth: f32, smoothed: bool) {
            self.events.push(Event::Rotate(polar, azimuth, smoothed));
        }
    }

    #[derive(Default)]
    struct RecordingPlayback {
        speeds: Vec<f32>,
    }

    impl PlaybackControl for &mut RecordingPlayback {
        fn set_speed(&mut self, multiplier: f32) {
            self.speeds.push(multiplier);
        }
    }

    #[derive(Default)]
    struct RecordingSelection {
        followed: Vec<UnitId>,
        selected: Vec<UnitId>,
    }

    impl SelectionSink for &mut RecordingSelection {
        fn follow_units(&mut self, units: &[UnitId]) {
            self.followed = units.to_vec();
        }

        fn select_units(&mut self, units: &[UnitId]) {
            self.selected = units.to_vec();
        }
    }

    fn router<'a>(
        primary: &'a mut RecordingRig,
        secondary: &'a mut RecordingRig,
        playback: &'a mut RecordingPlayback,
        selection: &'a mut RecordingSelection,
    ) -> ViewportRouter<&'a mut RecordingRig, &'a mut RecordingPlayback, &'a mut RecordingSelection>
    {
        ViewportRouter::new(
            primary,
            secondary,
            playback,
            selection,
            CameraLimits::default(),
            SecondaryViewportLayout::default(),
        )
    }

    #[test]
    fn moves_are_routed_to_the_addressed_rig() {
        let mut primary = RecordingRig::default();
        let mut secondary = RecordingRig::default();
        let mut playback = RecordingPlayback::default();
        let mut selection = RecordingSelection::default();

        let mut router = router(&mut primary, &mut secondary, &mut playback, &mut selection);
        router.apply(&[
            Directive::MoveCamera {
                viewport: ViewportId::Primary,
                target: WorldPoint::new(10.0, 20.0),
                smoothed: true,
            },
            Directive::MoveCamera {
                viewport: ViewportId::Secondary,
                target: WorldPoint::new(30.0, 40.0),
                smoothed: false,
            },
        ]);

        assert_eq!(primary.events, vec![Event::Move(Vec2::new(10.0, 20.0), true)]);
        assert_eq!(
            secondary.events,
            vec![Event::Move(Vec2::new(30.0, 40.0), false)]
        );
    }

    #[test]
    fn distances_are_clamped_to_the_rig_limits() {
        let mut primary = RecordingRig::default();
        let mut secondary = RecordingRig::default();
        let mut playback = RecordingPlayback::default();
        let mut selection = RecordingSelection::default();

        let mut router = router(&mut primary, &mut secondary, &mut playback, &mut selection);
        router.apply(&[
            Directive::SetCameraDistance {
                viewport: ViewportId::Primary,
                distance: 500.0,
                smoothed: true,
            },
            Directive::SetCameraDistance {
                viewport: ViewportId::Primary,
                distance: 1.0,
                smoothed: true,
            },
        ]);

        assert_eq!(
            primary.events,
            vec![Event::Dolly(128.0, true), Event::Dolly(20.0, true)]
        );
    }

    #[test]
    fn orientation_offsets_resolve_against_the_rest_pose() {
        let mut primary = RecordingRig::default();
        let mut secondary = RecordingRig::default();
        let mut playback = RecordingPlayback::default();
        let mut selection = RecordingSelection::default();

        let limits = CameraLimits::default();
        let jitters = [0.01_f32, 0.08, 0.15];
        let directives: Vec<Directive> = jitters
            .iter()
            .map(|jitter| Directive::SetCameraOrientation {
                viewport: ViewportId::Primary,
                polar_delta: limits.min_polar + jitter,
                azimuth_delta: jitter - 0.08,
                smoothed: false,
            })
            .collect();

        let mut router = router(&mut primary, &mut secondary, &mut playback, &mut selection);
        router.apply(&directives);
        drop(router);

        // Every shot lands at rest pose plus its own offset, so successive
        // shots of similar size stay distinct instead of drifting upward.
        let expected: Vec<Event> = jitters
            .iter()
            .map(|jitter| {
                Event::Rotate(
                    limits.min_polar + (limits.min_polar + jitter),
                    jitter - 0.08,
                    false,
                )
            })
            .collect();
        assert_eq!(primary.events, expected);
        assert!(primary
            .events
            .iter()
            .all(|event| !matches!(event, Event::Rotate(polar, _, _) if *polar >= limits.max_polar)));
    }

    #[test]
    fn extreme_offsets_clamp_without_pinning_later_shots() {
        let mut primary = RecordingRig::default();
        let mut secondary = RecordingRig::default();
        let mut playback = RecordingPlayback::default();
        let mut selection = RecordingSelection::default();

        let limits = CameraLimits::default();
        let mut router = router(&mut primary, &mut secondary, &mut playback, &mut selection);
        router.apply(&[
            Directive::SetCameraOrientation {
                viewport: ViewportId::Primary,
                polar_delta: 10.0,
                azimuth_delta: -10.0,
                smoothed: false,
            },
            Directive::SetCameraOrientation {
                viewport: ViewportId::Primary,
                polar_delta: 0.0,
                azimuth_delta: 0.0,
                smoothed: false,
            },
        ]);

        // The first shot hits the limits; the second returns to the rest
        // pose, proving nothing carried over from the clamped shot.
        assert_eq!(
            primary.events,
            vec![
                Event::Rotate(limits.max_polar, -limits.max_azimuth, false),
                Event::Rotate(limits.min_polar, 0.0, false),
            ]
        );
    }

    #[test]
    fn selection_playback_and_visibility_reach_the_host() {
        let mut primary = RecordingRig::default();
        let mut secondary = RecordingRig::default();
        let mut playback = RecordingPlayback::default();
        let mut selection = RecordingSelection::default();

        let mut router = router(&mut primary, &mut secondary, &mut playback, &mut selection);
        assert!(!router.secondary_visible());
        router.apply(&[
            Directive::SetFollowedUnits {
                units: vec![UnitId::new(3), UnitId::new(4)],
            },
            Directive::SetSelectedUnits {
                units: vec![UnitId::new(3)],
            },
            Directive::SetSecondaryViewportEnabled { enabled: true },
            Directive::SetPlaybackSpeed { multiplier: 2.5 },
        ]);

        assert!(router.secondary_visible());
        drop(router);
        assert_eq!(selection.followed, vec![UnitId::new(3), UnitId::new(4)]);
        assert_eq!(selection.selected, vec![UnitId::new(3)]);
        assert_eq!(playback.speeds, vec![2.5]);
    }

    #[test]
    fn layout_rejects_out_of_window_fractions() {
        assert!(SecondaryViewportLayout::new(0.3, 0.05, 0.05).is_ok());
        assert_eq!(
            SecondaryViewportLayout::new(1.2, 0.05, 0.05),
            Err(ViewportError::InvalidHeightFraction { fraction: 1.2 })
        );
        assert_eq!(
            SecondaryViewportLayout::new(0.3, 0.6, 0.05),
            Err(ViewportError::InvalidMargin { margin: 0.6 })
        );
    }
}
