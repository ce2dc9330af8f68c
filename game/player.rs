use ::thiserror::Error;
use ::vecmath::{vec2_add, vec2_len, vec2_scale, vec2_square_len, vec2_sub};

pub const TRANSITION_TICKS: u32 = 30;
pub const STOP_DECAY: f32 = 0.9;
pub const STOP_EPSILON: f32 = 0.01; // reached from max speed within 66 ticks
pub const PLAYER_RADIUS: f32 = 10.0;
pub const PLAYER_MAX_SPEED: f32 = 10.0;

/// What the velocity is currently doing.
#[derive(Clone,Copy, Debug, PartialEq,Eq)]
pub enum Transition {
    Idle,
    /// Counting down a fixed window of `TRANSITION_TICKS`.
    /// `ticks_left` is never stored as zero.
    Accelerating { ticks_left: u32 },
    /// Exponential decay toward zero. Never reaches it.
    Decelerating,
}

#[derive(Error, Clone,Copy, Debug, PartialEq,Eq)]
pub enum MoveError {
    #[error("move direction has zero length")]
    ZeroDirection,
}

/// One step of the quadratic ease used while accelerating.
/// `t` is the progress through the window, from 0 (no-op) toward 1.
/// The blend factor passes 1 near the end, so the last few steps
/// overshoot the target slightly before the final tick snaps to it.
fn ease_step(current: [f32;2],  target: [f32;2],  t: f32) -> [f32;2] {
    let factor = 0.5*t*t + t;
    vec2_add(current, vec2_scale(vec2_sub(target, current), factor))
}

/// Frame-based interpolation of a velocity toward a requested target.
///
/// Accelerating runs a fixed 30-tick window and ends exactly on the
/// target. Stopping is an open-ended decay by a constant factor per
/// tick. A stop requested while a window runs is deferred until the
/// window completes; a move request always wins over a pending stop.
pub struct VelocityController {
    velocity: [f32;2],
    target_velocity: [f32;2],
    max_speed: f32,
    transition: Transition,
    stop_pending: bool,
}

impl VelocityController {
    pub fn new(max_speed: f32) -> Self {VelocityController {
        velocity: [0.0, 0.0],
        target_velocity: [0.0, 0.0],
        max_speed,
        transition: Transition::Idle,
        stop_pending: false,
    } }

    pub fn velocity(&self) -> [f32;2] {
        self.velocity
    }
    pub fn target_velocity(&self) -> [f32;2] {
        self.target_velocity
    }
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }
    pub fn transition(&self) -> Transition {
        self.transition
    }
    pub fn is_effectively_stopped(&self) -> bool {
        vec2_len(self.velocity) < STOP_EPSILON
    }

    /// Start accelerating toward `direction`, restarting the window if
    /// one is already running. Directions longer than the speed limit
    /// are rescaled to it; shorter ones are used as-is.
    /// A zero-length direction is rejected without changing anything.
    pub fn request_move(&mut self,  direction: [f32;2]) -> Result<(), MoveError> {
        if vec2_square_len(direction) == 0.0 {
            return Err(MoveError::ZeroDirection);
        }
        let speed = vec2_len(direction);
        self.target_velocity = if speed > self.max_speed {
            vec2_scale(direction, self.max_speed / speed)
        } else {
            direction
        };
        self.transition = Transition::Accelerating { ticks_left: TRANSITION_TICKS };
        self.stop_pending = false;
        Ok(())
    }

    /// Start decelerating, or remember to once the current window completes.
    pub fn request_stop(&mut self) {
        match self.transition {
            Transition::Idle => self.transition = Transition::Decelerating,
            Transition::Accelerating{..} => self.stop_pending = true,
            Transition::Decelerating => {}
        }
    }

    pub fn tick(&mut self) {
        match self.transition {
            Transition::Idle => {}
            Transition::Accelerating { ticks_left } => {
                let t = 1.0 - ticks_left as f32 / TRANSITION_TICKS as f32;
                self.velocity = ease_step(self.velocity, self.target_velocity, t);
                if ticks_left == 1 {
                    self.velocity = self.target_velocity; // exact, no residual error
                    self.transition = if self.stop_pending {
                        self.stop_pending = false;
                        Transition::Decelerating
                    } else {
                        Transition::Idle
                    };
                } else {
                    self.transition = Transition::Accelerating { ticks_left: ticks_left-1 };
                }
            }
            Transition::Decelerating => {
                self.velocity = vec2_scale(self.velocity, STOP_DECAY);
            }
        }
    }
}

pub struct Player {
    pub position: [f32;2],
    radius: f32,
    ctrl: VelocityController,
}

impl Player {
    pub fn new() -> Self {Player {
        position: [0.0, 0.0],
        radius: PLAYER_RADIUS,
        ctrl: VelocityController::new(PLAYER_MAX_SPEED),
    } }

    pub fn radius(&self) -> f32 {
        self.radius
    }
    pub fn velocity(&self) -> [f32;2] {
        self.ctrl.velocity()
    }
    pub fn target_velocity(&self) -> [f32;2] {
        self.ctrl.target_velocity()
    }
    pub fn max_speed(&self) -> f32 {
        self.ctrl.max_speed()
    }
    pub fn transition(&self) -> Transition {
        self.ctrl.transition()
    }
    pub fn request_move(&mut self,  direction: [f32;2]) -> Result<(), MoveError> {
        self.ctrl.request_move(direction)
    }
    pub fn request_stop(&mut self) {
        self.ctrl.request_stop()
    }
    /// Direct position offset from the arrow keys. Bypasses the controller.
    pub fn nudge(&mut self,  delta: [f32;2]) {
        self.position = vec2_add(self.position, delta);
    }

    /// Integrate position with the velocity decided last tick,
    /// then advance the velocity transition.
    pub fn tick(&mut self) {
        self.position = vec2_add(self.position, self.ctrl.velocity());
        self.ctrl.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_controller_is_idle() {
        let ctrl = VelocityController::new(10.0);
        assert!(matches!(ctrl.transition(), Transition::Idle));
        assert_eq!(ctrl.velocity(), [0.0, 0.0]);
        assert!(ctrl.is_effectively_stopped());
    }

    #[test]
    fn test_within_limit_request_kept_exact() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([3.0, 4.0]).unwrap();
        assert_eq!(ctrl.target_velocity(), [3.0, 4.0]);
        // magnitude exactly at the limit is not rescaled either
        ctrl.request_move([10.0, 0.0]).unwrap();
        assert_eq!(ctrl.target_velocity(), [10.0, 0.0]);
    }

    #[test]
    fn test_overspeed_request_is_rescaled() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([30.0, 40.0]).unwrap(); // length 50
        let target = ctrl.target_velocity();
        assert!((vec2_len(target) - 10.0).abs() < 1e-4);
        assert!((target[0] - 6.0).abs() < 1e-4);
        assert!((target[1] - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_direction_is_rejected_without_mutation() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([4.0, 0.0]).unwrap();
        for _ in 0..3 {
            ctrl.tick();
        }
        let velocity = ctrl.velocity();
        let transition = ctrl.transition();
        assert_eq!(ctrl.request_move([0.0, 0.0]), Err(MoveError::ZeroDirection));
        assert_eq!(ctrl.velocity(), velocity);
        assert_eq!(ctrl.transition(), transition);
        assert_eq!(ctrl.target_velocity(), [4.0, 0.0]);
    }

    #[test]
    fn test_first_transition_tick_leaves_velocity() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        ctrl.tick(); // t=0, blend factor 0
        assert_eq!(ctrl.velocity(), [0.0, 0.0]);
        assert_eq!(ctrl.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS-1 });
    }

    #[test]
    fn test_transition_reaches_target_exactly() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        for _ in 0..TRANSITION_TICKS {
            ctrl.tick();
        }
        assert_eq!(ctrl.velocity(), [10.0, 0.0]);
        assert_eq!(ctrl.transition(), Transition::Idle);
    }

    #[test]
    fn test_retarget_restarts_window() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        for _ in 0..10 {
            ctrl.tick();
        }
        ctrl.request_move([0.0, 10.0]).unwrap();
        assert_eq!(ctrl.transition(), Transition::Accelerating { ticks_left: TRANSITION_TICKS });
        for _ in 0..TRANSITION_TICKS {
            ctrl.tick();
        }
        assert_eq!(ctrl.velocity(), [0.0, 10.0]);
    }

    #[test]
    fn test_stop_from_idle_decays_next_tick() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        for _ in 0..TRANSITION_TICKS {
            ctrl.tick();
        }
        ctrl.request_stop();
        assert_eq!(ctrl.transition(), Transition::Decelerating);
        ctrl.tick();
        assert_eq!(ctrl.velocity(), [9.0, 0.0]);
    }

    #[test]
    fn test_stop_mid_transition_is_deferred() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        for _ in 0..5 {
            ctrl.tick();
        }
        ctrl.request_stop();
        assert!(matches!(ctrl.transition(), Transition::Accelerating{..}));
        for _ in 5..TRANSITION_TICKS {
            ctrl.tick();
        }
        // the window completed first, then the deferred stop kicked in
        assert_eq!(ctrl.velocity(), [10.0, 0.0]);
        assert_eq!(ctrl.transition(), Transition::Decelerating);
    }

    #[test]
    fn test_move_cancels_pending_stop() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        ctrl.tick();
        ctrl.request_stop();
        ctrl.request_move([10.0, 0.0]).unwrap();
        for _ in 0..TRANSITION_TICKS {
            ctrl.tick();
        }
        assert_eq!(ctrl.transition(), Transition::Idle);
        assert_eq!(ctrl.velocity(), [10.0, 0.0]);
    }

    #[test]
    fn test_decay_is_strict_and_crosses_epsilon() {
        let mut ctrl = VelocityController::new(10.0);
        ctrl.request_move([10.0, 0.0]).unwrap();
        for _ in 0..TRANSITION_TICKS {
            ctrl.tick();
        }
        ctrl.request_stop();
        let mut previous = vec2_len(ctrl.velocity());
        for _ in 0..66 {
            ctrl.tick();
            let speed = vec2_len(ctrl.velocity());
            assert!(speed < previous);
            previous = speed;
        }
        assert!(previous < STOP_EPSILON);
        assert!(previous > 0.0); // decays forever, never exactly zero
        assert!(ctrl.is_effectively_stopped());
    }

    #[test]
    fn test_position_integrates_pre_tick_velocity() {
        let mut player = Player::new();
        player.request_move([10.0, 0.0]).unwrap();
        for _ in 0..TRANSITION_TICKS {
            player.tick();
        }
        let before = player.position;
        player.tick(); // idle, so velocity stays [10, 0]
        assert_eq!(player.position, [before[0] + 10.0, before[1]]);
    }

    #[test]
    fn test_nudge_does_not_touch_velocity() {
        let mut player = Player::new();
        player.nudge([10.0, -10.0]);
        assert_eq!(player.position, [10.0, -10.0]);
        assert_eq!(player.velocity(), [0.0, 0.0]);
        assert!(matches!(player.transition(), Transition::Idle));
    }
}
