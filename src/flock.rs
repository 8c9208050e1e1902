use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Fixed integration step applied once per tick, independent of frame time.
pub const STEP_SECONDS: f32 = 0.001;

/// Chance per tick that a sprite picks a fresh random heading.
pub const REDIRECT_PROBABILITY: f32 = 0.002;

// ── Sprite ──────────────────────────────────────────────────────────────────

/// One flying silhouette.  Positions are in normalised device coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Uniform half-size of the drawn quad, also the wrap margin.
    pub scale: f32,
    pub alpha: f32,
    /// Animation frames advanced per second.
    pub anim_speed: f32,
    /// Multiplier on velocity integration.
    pub move_speed: f32,
    /// Heading derived from `velocity`; rewritten on every update.
    #[serde(skip)]
    pub rotation: f32,
}

impl Sprite {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        scale: f32,
        alpha: f32,
        anim_speed: f32,
        move_speed: f32,
    ) -> Self {
        Self {
            position,
            velocity,
            scale,
            alpha,
            anim_speed,
            move_speed,
            rotation: heading(velocity),
        }
    }

    /// Advance one tick: integrate, wrap, maybe re-randomise the heading,
    /// then derive `rotation` from the resulting velocity.
    pub fn update(&mut self, rng: &mut fastrand::Rng) {
        self.position += self.velocity * STEP_SECONDS * self.move_speed;
        self.position.x = wrap_axis(self.position.x, self.scale);
        self.position.y = wrap_axis(self.position.y, self.scale);

        if rng.f32() < REDIRECT_PROBABILITY {
            self.velocity = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0);
        }

        self.rotation = heading(self.velocity);
    }

    /// Scale, then rotate about Z, then translate; no projection.
    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(self.scale, self.rotation, self.position)
    }

    fn validate(&self, index: usize) -> Result<(), Error> {
        let finite = self.position.is_finite()
            && self.velocity.is_finite()
            && self.move_speed.is_finite();
        if !finite {
            return Err(Error::InvalidConfig(format!("sprite {index}: non-finite value")));
        }
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(Error::InvalidConfig(format!("sprite {index}: scale must be positive")));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidConfig(format!("sprite {index}: alpha outside [0, 1]")));
        }
        if self.anim_speed.is_nan() || self.anim_speed <= 0.0 {
            return Err(Error::InvalidConfig(format!("sprite {index}: anim_speed must be positive")));
        }
        Ok(())
    }
}

/// Torus wrap on the padded NDC square `[-1 - margin, 1 + margin]`.
pub fn wrap_axis(value: f32, margin: f32) -> f32 {
    let edge = 1.0 + margin;
    if value > edge {
        -edge
    } else if value < -edge {
        edge
    } else {
        value
    }
}

pub fn heading(velocity: Vec2) -> f32 {
    velocity.y.atan2(velocity.x)
}

pub fn model_matrix(scale: f32, rotation: f32, position: Vec2) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(scale, scale, 1.0),
        Quat::from_rotation_z(rotation),
        position.extend(0.0),
    )
}

/// Animation frame shown at `elapsed_ms` since start.
///
/// Pure in its inputs: there is no per-sprite frame counter, so missed or
/// delayed ticks never make the cycle drift.  Negative elapsed clamps to 0.
pub fn frame_index(elapsed_ms: f64, anim_speed: f32, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let frames = (elapsed_ms.max(0.0) * anim_speed as f64 / 1000.0).floor();
    (frames as u64 % frame_count as u64) as usize
}

// ── Flock ───────────────────────────────────────────────────────────────────

/// Fixed set of sprites, created once and updated in a stable order.
#[derive(Clone, Debug)]
pub struct Flock {
    sprites: Vec<Sprite>,
}

impl Flock {
    pub fn new(sprites: Vec<Sprite>) -> Result<Self, Error> {
        if sprites.is_empty() {
            return Err(Error::InvalidConfig("flock has no sprites".into()));
        }
        for (i, s) in sprites.iter().enumerate() {
            s.validate(i)?;
        }
        Ok(Self { sprites })
    }

    /// Parse a JSON array of sprites (`rotation` is derived, not read).
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let sprites: Vec<Sprite> = serde_json::from_str(json)?;
        let sprites = sprites
            .into_iter()
            .map(|s| Sprite::new(s.position, s.velocity, s.scale, s.alpha, s.anim_speed, s.move_speed))
            .collect();
        Self::new(sprites)
    }

    /// The three birds shipped in `resources/flock.json`.
    pub fn default_flock() -> Result<Self, Error> {
        Self::from_json(crate::DEFAULT_FLOCK)
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn update(&mut self, rng: &mut fastrand::Rng) {
        for sprite in &mut self.sprites {
            sprite.update(rng);
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
