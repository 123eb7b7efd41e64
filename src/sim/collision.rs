//! Axis-aligned collision boxes
//!
//! Collisions are tested on the current frame's boxes only. There is no
//! swept test, so a very fast item can skip over a thin player box.

use glam::Vec2;

/// Axis-aligned box, `pos` is the top-left corner (screen space, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap: boxes that only touch along an edge do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Bottom half of the box (fish hooks only hurt at the barb end)
    pub fn lower_half(&self) -> Aabb {
        Aabb {
            pos: Vec2::new(self.pos.x, self.pos.y + self.size.y * 0.5),
            size: Vec2::new(self.size.x, self.size.y * 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Aabb::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(20.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(0.0, 10.0, 10.0, 10.0)), "edge contact");
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(9.0, -3.0, 4.0, 4.0);
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn test_lower_half() {
        let hook = Aabb::new(100.0, 40.0, 30.0, 80.0);
        let barb = hook.lower_half();
        assert_eq!(barb.top(), 80.0);
        assert_eq!(barb.bottom(), hook.bottom());

        // player touching only the line part of the hook is safe
        let player = Aabb::new(95.0, 40.0, 40.0, 30.0);
        assert!(hook.overlaps(&player));
        assert!(!barb.overlaps(&player));
    }

    #[test]
    fn test_thin_box_tunnelling_is_not_detected() {
        let player = Aabb::new(100.0, 0.0, 4.0, 40.0);
        // item jumps from x=110 to x=80 in one frame
        let before = Aabb::new(110.0, 10.0, 10.0, 10.0);
        let after = Aabb::new(80.0, 10.0, 10.0, 10.0);
        assert!(!player.overlaps(&before));
        assert!(!player.overlaps(&after));
    }
}
