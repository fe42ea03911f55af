use serde::{Deserialize, Serialize};

use flock_core::events::AgentId;

use crate::config::PhysicsConfig;

/// One evaluated agent. Only the vertical state changes after spawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    x: f32,
    pub y: f32,
    pub velocity: f32,
    /// Ticks since the last jump; the independent variable of the arc.
    pub tick_count: u32,
    /// `y` at the last jump.
    pub jump_height: f32,
    /// Visual tilt in degrees. Never read by physics, collision or scoring.
    pub tilt: f32,
    /// Wing frame the agent is showing, and therefore colliding with.
    pub frame: usize,
    /// Position in the wing cycle.
    pub anim_tick: u32,
    pub alive: bool,
}

impl Agent {
    pub fn new(id: AgentId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            velocity: 0.0,
            tick_count: 0,
            jump_height: y,
            tilt: 0.0,
            frame: 0,
            anim_tick: 0,
            alive: true,
        }
    }

    /// Horizontal position, fixed for the agent's lifetime.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Give the agent an upward impulse and restart its arc from here.
    pub fn jump(&mut self, physics: &PhysicsConfig) {
        self.velocity = physics.jump_velocity;
        self.tick_count = 0;
        self.jump_height = self.y;
    }

    /// Advance the agent by one tick. Returns the displacement applied.
    pub fn advance(&mut self, physics: &PhysicsConfig) -> f32 {
        self.tick_count = self.tick_count.saturating_add(1);

        let raw = raw_displacement(self.velocity, self.tick_count, physics.gravity);
        let displacement = clamp_displacement(raw, physics);
        self.y += displacement;

        if displacement < 0.0 || self.y < self.jump_height + physics.tilt_hold_margin {
            if self.tilt < physics.max_tilt {
                self.tilt = physics.max_tilt;
            }
        } else if self.tilt > physics.min_tilt {
            self.tilt -= physics.tilt_step;
        }

        self.animate(physics);
        displacement
    }

    /// Step the wing cycle: frames 0, 1, 2, 1 held `animation_ticks` each, then
    /// a single tick of frame 0. A gliding agent holds frame 1 and resumes the
    /// cycle from frame 2 once it levels out.
    pub fn animate(&mut self, physics: &PhysicsConfig) {
        let hold = physics.animation_ticks;
        self.anim_tick += 1;
        self.frame = if self.anim_tick <= hold {
            0
        } else if self.anim_tick <= hold * 2 {
            1
        } else if self.anim_tick <= hold * 3 {
            2
        } else if self.anim_tick <= hold * 4 {
            1
        } else {
            self.anim_tick = 0;
            0
        };

        if self.tilt <= physics.glide_tilt {
            self.frame = 1;
            self.anim_tick = hold * 2;
        }
    }
}

/// `v*n + 0.5*k*n^2`, before any clamping.
pub fn raw_displacement(velocity: f32, tick_count: u32, gravity: f32) -> f32 {
    let n = tick_count as f32;
    velocity * n + 0.5 * gravity * n * n
}

/// Cap falling at terminal displacement and exaggerate rising by the nudge.
pub fn clamp_displacement(raw: f32, physics: &PhysicsConfig) -> f32 {
    if raw >= physics.terminal_displacement {
        physics.terminal_displacement
    } else if raw < 0.0 {
        raw - physics.upward_nudge
    } else {
        raw
    }
}
