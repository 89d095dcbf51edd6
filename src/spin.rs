//! Spin gesture for the turntable disk.
//!
//! A click while idle starts a spin with a random number of full turns. Every
//! rendered frame then feeds the elapsed time into [`advance`], which moves the
//! disk along a slow-fast-slow velocity curve and snaps it onto the exact target
//! angle once the spin duration has elapsed.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

/// Fewest full turns a spin makes
pub const MIN_FULL_ROTATIONS: u32 = 3;
/// Number of possible turn counts starting at `MIN_FULL_ROTATIONS`
const ROTATION_CHOICES: u32 = 5;
pub const MAX_FULL_ROTATIONS: u32 = MIN_FULL_ROTATIONS + ROTATION_CHOICES - 1;

const BASE_DURATION_S: f32 = 2.0;
const DURATION_PER_ROTATION_S: f32 = 0.3;
/// Upper bound for the length of a single spin
pub const MAX_DURATION_S: f32 = 5.0;

/// Angular velocity (rad/s) reached at `PEAK_PROGRESS`
pub const PEAK_ANGULAR_VELOCITY: f32 = 25.0;
/// Progress at which the disk stops speeding up and starts slowing down
pub const PEAK_PROGRESS: f32 = 0.3;

/// Something in the scene that can be turned around its vertical axis.
pub trait Rotatable {
    fn rotation_y(&self) -> f32;
    fn set_rotation_y(&mut self, angle: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveSpin {
    pub full_rotations: u32,
    /// Total angle to cover, always a whole number of turns
    pub target_rotation_rad: f32,
    /// Disk angle when the spin was requested
    pub start_angle_rad: f32,
    pub duration: Duration,
    pub started_at: Instant,
}

impl ActiveSpin {
    pub fn final_angle(&self) -> f32 {
        self.start_angle_rad + self.target_rotation_rad
    }

    /// Normalized elapsed time, clamped to [0, 1]. A `now` earlier than the
    /// start of the spin counts as no time elapsed.
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            return 1.0;
        }
        ((elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SpinState {
    #[default]
    Idle,
    Spinning(ActiveSpin),
}

impl SpinState {
    pub fn is_spinning(&self) -> bool {
        matches!(self, SpinState::Spinning(_))
    }
}

/// Length of a spin with the given number of full turns.
pub fn spin_duration_s(full_rotations: u32) -> f32 {
    (BASE_DURATION_S + full_rotations as f32 * DURATION_PER_ROTATION_S).min(MAX_DURATION_S)
}

/// Velocity profile of a spin: linear ramp from 0 up to the peak at
/// `PEAK_PROGRESS`, then linear ramp back down to 0 at the end.
pub fn angular_velocity(progress: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    if progress < PEAK_PROGRESS {
        PEAK_ANGULAR_VELOCITY * (progress / PEAK_PROGRESS)
    } else {
        PEAK_ANGULAR_VELOCITY * ((1.0 - progress) / (1.0 - PEAK_PROGRESS))
    }
}

/// Starts a new spin from `current_angle` if the disk is idle. Requests made
/// while a spin is running are dropped and the state is returned untouched.
pub fn request_spin<R: Rng + ?Sized>(
    state: SpinState,
    current_angle: f32,
    now: Instant,
    rng: &mut R,
) -> SpinState {
    if state.is_spinning() {
        debug!("Spin already in progress, ignoring request");
        return state;
    }

    let full_rotations = MIN_FULL_ROTATIONS + rng.random_range(0..ROTATION_CHOICES);
    let duration_s = spin_duration_s(full_rotations);
    info!(
        "Starting spin: {} turns over {:.1}s",
        full_rotations, duration_s
    );

    SpinState::Spinning(ActiveSpin {
        full_rotations,
        target_rotation_rad: full_rotations as f32 * TAU,
        start_angle_rad: current_angle,
        duration: Duration::from_secs_f32(duration_s),
        started_at: now,
    })
}

/// One frame step. Returns the next state and the new disk angle.
///
/// While the spin is running the angle is integrated from the current
/// velocity so it stays continuous with wherever the disk already is. Once
/// the duration has elapsed the angle is set to the exact target and the
/// state goes back to idle.
pub fn advance(state: SpinState, rotation: f32, now: Instant, dt: f32) -> (SpinState, f32) {
    let SpinState::Spinning(spin) = state else {
        return (state, rotation);
    };

    let progress = spin.progress(now);
    if progress < 1.0 {
        (state, rotation + angular_velocity(progress) * dt)
    } else {
        debug!("Spin finished at {:.3} rad", spin.final_angle());
        (SpinState::Idle, spin.final_angle())
    }
}

/// Owns the spin state between frames and applies it to a mesh.
#[derive(Debug, Default)]
pub struct SpinAnimator {
    state: SpinState,
}

impl SpinAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.state.is_spinning()
    }

    /// Returns true when a new spin was started.
    pub fn request_spin(&mut self, mesh: &impl Rotatable, now: Instant) -> bool {
        self.request_spin_with(mesh, now, &mut rand::rng())
    }

    pub fn request_spin_with<R: Rng + ?Sized>(
        &mut self,
        mesh: &impl Rotatable,
        now: Instant,
        rng: &mut R,
    ) -> bool {
        let was_spinning = self.state.is_spinning();
        self.state = request_spin(self.state, mesh.rotation_y(), now, rng);
        !was_spinning && self.state.is_spinning()
    }

    pub fn tick(&mut self, mesh: &mut impl Rotatable, now: Instant, dt: f32) {
        if !self.state.is_spinning() {
            return;
        }
        let (state, rotation) = advance(self.state, mesh.rotation_y(), now, dt);
        mesh.set_rotation_y(rotation);
        self.state = state;
    }

    /// Current angular velocity, zero when idle.
    pub fn angular_velocity(&self, now: Instant) -> f32 {
        match self.state {
            SpinState::Idle => 0.0,
            SpinState::Spinning(spin) => angular_velocity(spin.progress(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[derive(Default)]
    struct Disk {
        angle: f32,
    }

    impl Rotatable for Disk {
        fn rotation_y(&self) -> f32 {
            self.angle
        }

        fn set_rotation_y(&mut self, angle: f32) {
            self.angle = angle;
        }
    }

    fn active(state: SpinState) -> ActiveSpin {
        match state {
            SpinState::Spinning(spin) => spin,
            SpinState::Idle => panic!("Expected an active spin"),
        }
    }

    #[test]
    fn test_velocity_curve_boundaries() {
        assert_eq!(angular_velocity(0.0), 0.0);
        assert_eq!(angular_velocity(PEAK_PROGRESS), PEAK_ANGULAR_VELOCITY);
        assert_eq!(angular_velocity(1.0), 0.0);
    }

    #[test]
    fn test_velocity_curve_is_continuous_at_peak() {
        let just_before = angular_velocity(PEAK_PROGRESS - 1e-5);
        assert!((just_before - PEAK_ANGULAR_VELOCITY).abs() < 1e-2);
        assert!((angular_velocity(0.15) - 12.5).abs() < 1e-4);
        assert!((angular_velocity(0.65) - 12.5).abs() < 1e-4);
    }

    #[test]
    fn test_duration_grows_with_rotations_and_is_capped() {
        let mut previous = 0.0;
        for rotations in MIN_FULL_ROTATIONS..=MAX_FULL_ROTATIONS {
            let duration = spin_duration_s(rotations);
            assert!(duration > 2.0 && duration <= MAX_DURATION_S);
            assert!(duration >= previous);
            previous = duration;
        }
        assert_eq!(spin_duration_s(100), MAX_DURATION_S);
    }

    #[test]
    fn test_idle_advance_is_noop() {
        let now = Instant::now();
        let (state, rotation) = advance(SpinState::Idle, 1.25, now, 0.016);
        assert_eq!(state, SpinState::Idle);
        assert_eq!(rotation, 1.25);
    }

    #[test]
    fn test_request_while_spinning_is_ignored() {
        let mut rng = StdRng::seed_from_u64(7);
        let start = Instant::now();
        let spinning = request_spin(SpinState::Idle, 0.5, start, &mut rng);
        let later = start + Duration::from_millis(300);
        let again = request_spin(spinning, 3.0, later, &mut rng);
        assert_eq!(again, spinning);
    }

    #[test]
    fn test_spin_records_start_angle_and_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();
        let spin = active(request_spin(SpinState::Idle, 0.75, now, &mut rng));
        assert_eq!(spin.start_angle_rad, 0.75);
        assert_eq!(spin.started_at, now);
        assert_eq!(spin.target_rotation_rad, spin.full_rotations as f32 * TAU);
    }

    #[test]
    fn test_early_now_counts_as_zero_progress() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = Instant::now() + Duration::from_secs(1);
        let state = request_spin(SpinState::Idle, 0.0, start, &mut rng);
        let (next, rotation) = advance(state, 0.0, start - Duration::from_millis(500), 0.016);
        assert!(next.is_spinning());
        assert_eq!(rotation, 0.0);
    }

    #[test]
    fn test_rotation_is_integrated_mid_spin() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = Instant::now();
        let state = request_spin(SpinState::Idle, 2.0, start, &mut rng);
        let spin = active(state);
        let now = start + spin.duration.mul_f32(PEAK_PROGRESS);
        let (next, rotation) = advance(state, 2.0, now, 0.1);
        assert!(next.is_spinning());
        let expected = 2.0 + angular_velocity(spin.progress(now)) * 0.1;
        assert!((rotation - expected).abs() < 1e-5);
        assert!(rotation > 2.0);
    }

    #[test]
    fn test_animator_drives_mesh_to_target() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut disk = Disk { angle: 0.4 };
        let mut animator = SpinAnimator::new();
        let start = Instant::now();

        assert!(animator.request_spin_with(&disk, start, &mut rng));
        assert!(!animator.request_spin_with(&disk, start, &mut rng));
        let spin = active(animator.state());

        let frame = Duration::from_micros(16_667);
        let mut now = start;
        while animator.is_spinning() {
            now += frame;
            animator.tick(&mut disk, now, frame.as_secs_f32());
        }

        assert_eq!(disk.angle, 0.4 + spin.target_rotation_rad);
        assert_eq!(animator.angular_velocity(now), 0.0);
        assert!(animator.request_spin_with(&disk, now, &mut rng));
    }

    // Property: every spin started from rest makes between 3 and 7 full
    // turns and lasts longer than 2s but no more than 5s
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_spin_parameters_in_range(seed in any::<u64>(), angle in -100.0f32..100.0f32) {
            let mut rng = StdRng::seed_from_u64(seed);
            let spin = active(request_spin(SpinState::Idle, angle, Instant::now(), &mut rng));

            prop_assert!((MIN_FULL_ROTATIONS..=MAX_FULL_ROTATIONS).contains(&spin.full_rotations));
            let duration_s = spin.duration.as_secs_f32();
            prop_assert!(duration_s > 2.0 && duration_s <= MAX_DURATION_S + 1e-6);
        }

        // Property: whatever the frame timing, a finished spin lands exactly on
        // start + target and the state is idle again
        #[test]
        fn prop_spin_lands_exactly_on_target(
            seed in any::<u64>(),
            angle in -10.0f32..10.0f32,
            weights in prop::collection::vec(1u64..1000u64, 1..200),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = Instant::now();
            let mut state = request_spin(SpinState::Idle, angle, start, &mut rng);
            let spin = active(state);

            // split the spin duration into positive steps that sum to it exactly
            let total_nanos = spin.duration.as_nanos() as u64;
            let total_weight: u64 = weights.iter().sum();
            let mut steps: Vec<u64> = weights
                .iter()
                .map(|w| (total_nanos * w / total_weight).max(1))
                .collect();
            let assigned: u64 = steps.iter().sum();
            if assigned < total_nanos {
                *steps.last_mut().unwrap() += total_nanos - assigned;
            } else {
                let mut surplus = assigned - total_nanos;
                for step in steps.iter_mut() {
                    let take = surplus.min(step.saturating_sub(1));
                    *step -= take;
                    surplus -= take;
                }
            }
            prop_assert_eq!(steps.iter().sum::<u64>(), total_nanos);

            let mut rotation = angle;
            let mut now = start;
            for step in steps {
                let dt = Duration::from_nanos(step);
                now += dt;
                let (next, next_rotation) = advance(state, rotation, now, dt.as_secs_f32());
                state = next;
                rotation = next_rotation;
            }

            prop_assert!(!state.is_spinning());
            prop_assert_eq!(rotation, angle + spin.target_rotation_rad);
        }
    }
}
