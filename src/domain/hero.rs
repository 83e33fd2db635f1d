/// The controllable actor: kinematic state only, no world knowledge.
///
/// Two independent machines, both advanced in fixed 1/60 s ticks:
///   - horizontal: a bounded-acceleration velocity servo that ramps
///     `actual_vx` toward `target_vx`, giving trapezoidal speed profiles
///     instead of instant start/stop
///   - vertical: a three-phase jump (Idle → Ascending → Descending →
///     Idle) whose apex is computed analytically up front, with hard
///     clamps at the apex and at landing so tick quantization never
///     accumulates across jumps
///
/// Screen y grows downward. Only these tick methods mutate the state.

use crate::config::PhysicsConfig;

/// Fixed simulation step.
pub const TICK_DT: f32 = 1.0 / 60.0;

/// Below this magnitude the servo snaps `actual_vx` to exactly zero.
const VELOCITY_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpPhase {
    Idle,
    Ascending,
    Descending,
}

/// Discrete movement commands from the input layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveIntent {
    Left,
    FastLeft,
    Right,
    FastRight,
    Stop,
}

/// Frame input: movement is level-triggered (held key), jump is
/// edge-triggered (fresh press).
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub movement: MoveIntent,
    pub jump: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        FrameInput { movement: MoveIntent::Stop, jump: false }
    }
}

#[derive(Clone, Debug)]
pub struct Hero {
    /// Kinematic position, world frame, pixels.
    pub x: f32,
    pub y: f32,
    /// Bounding box size, pixels.
    pub w: f32,
    pub h: f32,

    pub target_vx: f32,
    pub actual_vx: f32,

    pub jump: JumpPhase,
    jump_origin_y: f32,
    jump_apex: f32,
    jump_ticks: u32,

    motion: PhysicsConfig,
}

impl Hero {
    pub fn new(x: f32, y: f32, w: f32, h: f32, motion: PhysicsConfig) -> Self {
        Hero {
            x,
            y,
            w,
            h,
            target_vx: 0.0,
            actual_vx: 0.0,
            jump: JumpPhase::Idle,
            jump_origin_y: 0.0,
            jump_apex: 0.0,
            jump_ticks: 0,
            motion,
        }
    }

    // ── Intents ──

    pub fn apply(&mut self, intent: MoveIntent) {
        let v = match intent {
            MoveIntent::Left => -self.motion.walk_speed,
            MoveIntent::FastLeft => -self.motion.run_speed,
            MoveIntent::Right => self.motion.walk_speed,
            MoveIntent::FastRight => self.motion.run_speed,
            MoveIntent::Stop => 0.0,
        };
        self.set_target_velocity(v);
    }

    /// Stop is a target of zero, not an instant halt: the servo still
    /// ramps `actual_vx` down through the normal deceleration rule.
    pub fn set_target_velocity(&mut self, v: f32) {
        self.target_vx = v;
    }

    /// Is there any horizontal motion left to resolve this tick?
    pub fn moving(&self) -> bool {
        self.actual_vx != 0.0 || self.target_vx != 0.0
    }

    // ── Horizontal servo ──

    /// Advance the velocity servo one tick, returning the attempted
    /// horizontal displacement in pixels.
    ///
    /// The at-target comparison rounds `actual_vx` to one decimal so a
    /// ramp that lands within float jitter of the target switches to the
    /// constant-velocity branch instead of oscillating around it.
    pub fn tick_horizontal(&mut self) -> f32 {
        let dt = TICK_DT;
        let accel = self.motion.accel;
        let dx;

        if self.target_vx == round1(self.actual_vx) {
            dx = self.target_vx * dt;
        } else if self.target_vx > self.actual_vx {
            dx = self.actual_vx * dt + accel * dt * dt / 2.0;
            self.actual_vx += accel * dt;
        } else {
            dx = self.actual_vx * dt - accel * dt * dt / 2.0;
            self.actual_vx -= accel * dt;
        }

        if self.actual_vx.abs() < VELOCITY_EPSILON {
            self.actual_vx = 0.0;
        }
        dx
    }

    // ── Jump state machine ──

    /// Begin a jump. Accepted only while Idle; returns whether the
    /// intent was taken. The total rise is fixed analytically here
    /// (`v0² / 2g`), so ascent and descent mirror each other regardless
    /// of discrete rounding.
    pub fn start_jump(&mut self) -> bool {
        if self.jump != JumpPhase::Idle {
            return false;
        }
        self.jump = JumpPhase::Ascending;
        self.jump_origin_y = self.y;
        self.jump_apex =
            self.motion.jump_velocity * self.motion.jump_velocity / (2.0 * self.motion.gravity);
        self.jump_ticks = 1;
        true
    }

    /// Total rise of the jump in flight, pixels. Zero while Idle.
    #[allow(dead_code)]
    pub fn jump_apex(&self) -> f32 {
        self.jump_apex
    }

    /// Advance the jump one tick, returning the vertical displacement.
    /// Returns 0.0 while Idle.
    pub fn tick_vertical(&mut self) -> f32 {
        let prev = self.y;
        let v0 = self.motion.jump_velocity;
        let g = self.motion.gravity;

        match self.jump {
            JumpPhase::Idle => return 0.0,
            JumpPhase::Ascending => {
                let t = self.jump_ticks as f32 / 60.0;
                self.y = self.jump_origin_y - v0 * t + g * t * t / 2.0;
                self.jump_ticks += 1;
                // Apex reached: either the accumulated rise covers the
                // analytic apex distance, or the launch velocity is
                // spent (g·t ≥ v0 — catches apex times that fall
                // between ticks, where the sampled rise peaks just
                // short of the analytic value).
                if self.jump_origin_y - self.y >= self.jump_apex || g * t >= v0 {
                    self.y = self.jump_origin_y - self.jump_apex;
                    self.jump = JumpPhase::Descending;
                    self.jump_ticks = 1;
                }
            }
            JumpPhase::Descending => {
                let t = self.jump_ticks as f32 / 60.0;
                self.y = self.jump_origin_y - self.jump_apex + g * t * t / 2.0;
                self.jump_ticks += 1;
                if self.y >= self.jump_origin_y {
                    self.y = self.jump_origin_y;
                    self.jump = JumpPhase::Idle;
                    self.jump_apex = 0.0;
                    self.jump_ticks = 0;
                }
            }
        }
        self.y - prev
    }
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}
