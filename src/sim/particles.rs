//! Ephemeral visual feedback: pickup bursts, damage sparks, bubble trail
//!
//! Particles never affect gameplay. They cycle through an `ObjectPool` so a
//! busy streak doesn't allocate every frame.

use glam::Vec2;
use rand::Rng;

use super::color::Color;
use super::pool::{ObjectPool, Poolable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Circle,
    Heart,
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// px per frame unit
    pub vel: Vec2,
    /// 1.0 -> 0.0
    pub life: f32,
    pub opacity: f32,
    pub size: f32,
    pub color: Color,
    pub shape: ParticleShape,
    /// Life lost per frame unit
    pub decay: f32,
    /// Downward acceleration per frame unit (negative floats up)
    pub gravity: f32,
}

impl Poolable for Particle {
    fn fresh() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            life: 1.0,
            opacity: 1.0,
            size: 1.0,
            color: Color::WHITE,
            shape: ParticleShape::Circle,
            decay: 0.02,
            gravity: 0.0,
        }
    }

    // Every other field is written by `ParticleSystem::emit`.
    fn reset(&mut self) {
        self.life = 1.0;
        self.opacity = 1.0;
    }
}

/// Parameters for one emitted particle
#[derive(Debug, Clone, Copy)]
pub struct Emit {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    pub shape: ParticleShape,
    pub decay: f32,
    pub gravity: f32,
}

#[derive(Debug)]
pub struct ParticleSystem {
    live: Vec<Particle>,
    pool: ObjectPool<Particle>,
    max_live: usize,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            live: Vec::with_capacity(max_particles.min(256)),
            pool: ObjectPool::new(max_particles),
            max_live: max_particles,
        }
    }

    pub fn live(&self) -> &[Particle] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pool(&self) -> &ObjectPool<Particle> {
        &self.pool
    }

    /// Spawn one particle. Silently skipped at the live cap.
    pub fn emit(&mut self, emit: Emit) {
        if self.live.len() >= self.max_live {
            return;
        }
        let mut p = self.pool.acquire();
        p.pos = emit.pos;
        p.vel = emit.vel;
        p.size = emit.size;
        p.color = emit.color;
        p.shape = emit.shape;
        p.decay = emit.decay;
        p.gravity = emit.gravity;
        self.live.push(p);
    }

    /// Radial burst around `at`
    pub fn burst<R: Rng>(
        &mut self,
        rng: &mut R,
        at: Vec2,
        count: u32,
        color: Color,
        shape: ParticleShape,
    ) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.0..4.0);
            self.emit(Emit {
                pos: at,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size: rng.random_range(3.0..7.0),
                color,
                shape,
                decay: rng.random_range(0.015..0.03),
                gravity: 0.05,
            });
        }
    }

    /// Bubble drifting up from behind the player
    pub fn trail<R: Rng>(&mut self, rng: &mut R, from: Vec2) {
        self.emit(Emit {
            pos: from + Vec2::new(0.0, rng.random_range(-6.0..6.0)),
            vel: Vec2::new(rng.random_range(-2.5..-1.0), rng.random_range(-0.6..-0.1)),
            size: rng.random_range(2.0..5.0),
            color: Color::BUBBLE,
            shape: ParticleShape::Circle,
            decay: 0.012,
            gravity: -0.01,
        });
    }

    /// Advance every live particle and recycle the dead ones
    pub fn update(&mut self, frame_factor: f32) {
        let mut i = 0;
        while i < self.live.len() {
            let p = &mut self.live[i];
            p.vel.y += p.gravity * frame_factor;
            p.pos += p.vel * frame_factor;
            p.life -= p.decay * frame_factor;
            p.opacity = p.life.clamp(0.0, 1.0);
            p.size = (p.size * 0.995_f32.powf(frame_factor)).max(0.5);

            if p.life <= 0.0 || p.opacity <= 0.0 {
                let dead = self.live.swap_remove(i);
                self.pool.release(dead);
            } else {
                i += 1;
            }
        }
    }

    /// Change the live cap. Particles beyond it are dropped.
    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.max_live = max_particles;
        self.live.truncate(max_particles);
        self.pool.set_max_size(max_particles);
    }

    /// Return every live particle to the pool
    pub fn clear(&mut self) {
        for p in self.live.drain(..) {
            self.pool.release(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_and_decay_recycles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ps = ParticleSystem::new(64);
        ps.burst(&mut rng, Vec2::ZERO, 20, Color::GOLD, ParticleShape::Heart);
        assert_eq!(ps.len(), 20);
        assert!(ps.live().iter().all(|p| p.shape == ParticleShape::Heart));

        // slowest decay is 0.015/unit, so 100 units kills everything
        for _ in 0..100 {
            ps.update(1.0);
        }
        assert!(ps.is_empty());
        assert_eq!(ps.pool().free_len(), 20);

        // reuse comes back fully alive
        ps.burst(&mut rng, Vec2::ZERO, 5, Color::RED, ParticleShape::Circle);
        assert!(ps.live().iter().all(|p| p.life == 1.0 && p.opacity == 1.0));
        assert_eq!(ps.pool().stats().reused, 5);
    }

    #[test]
    fn test_live_cap() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ps = ParticleSystem::new(8);
        ps.burst(&mut rng, Vec2::ZERO, 50, Color::GOLD, ParticleShape::Circle);
        assert_eq!(ps.len(), 8);
    }

    #[test]
    fn test_zero_cap_disables_particles() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ps = ParticleSystem::new(0);
        ps.trail(&mut rng, Vec2::ZERO);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_clear_returns_to_pool() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ps = ParticleSystem::new(16);
        ps.burst(&mut rng, Vec2::ZERO, 10, Color::GOLD, ParticleShape::Circle);
        ps.clear();
        assert!(ps.is_empty());
        assert_eq!(ps.pool().free_len(), 10);
    }

    #[test]
    fn test_lowering_cap_drops_excess() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut ps = ParticleSystem::new(32);
        ps.burst(&mut rng, Vec2::ZERO, 20, Color::GOLD, ParticleShape::Circle);
        ps.set_max_particles(5);
        assert_eq!(ps.len(), 5);
        ps.burst(&mut rng, Vec2::ZERO, 3, Color::GOLD, ParticleShape::Circle);
        assert_eq!(ps.len(), 5);
    }

    #[test]
    fn test_trail_bubbles_float_up() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ps = ParticleSystem::new(4);
        ps.trail(&mut rng, Vec2::new(100.0, 100.0));
        let y0 = ps.live()[0].pos.y;
        ps.update(1.0);
        assert!(ps.live()[0].pos.y < y0);
    }
}
