/// Axis-aligned collision resolution against static region geometry.
///
/// Resolution is contact-based, not swept-and-sorted: a region
/// participates when it overlaps the span the actor's box covers this
/// tick, and the allowed displacement is the signed gap to the blocking
/// edge. The region the actor currently stands on is exempt from
/// horizontal blocking — the actor rides slightly sunk into its floor,
/// so without the exemption the floor itself would block every step.
///
/// The exemption matches by floor-top height, not region identity, so a
/// different region that happens to share the same top edge is exempted
/// too. Kept as-is; see DESIGN.md.

use crate::domain::tile::{RegionStyle, TileTraits, TileType};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap: boxes that merely touch along an edge do not
    /// intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    #[inline]
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// The horizontal span swept by moving this box by `dx`.
    fn swept_x(&self, dx: f32) -> Rect {
        Rect {
            x: self.x + dx.min(0.0),
            y: self.y,
            w: self.w + dx.abs(),
            h: self.h,
        }
    }

    /// Does this rect's horizontal span contain either bottom corner of
    /// `bbox`?
    #[inline]
    fn straddles_bottom_corner(&self, bbox: &Rect) -> bool {
        (self.left() <= bbox.left() && bbox.left() <= self.right())
            || (self.left() <= bbox.right() && bbox.right() <= self.right())
    }
}

/// One decomposed rectangle promoted to world collision geometry:
/// pixel rect plus the behavior flags and composition style resolved at
/// catalog build.
#[derive(Clone, Debug)]
pub struct StaticRegion {
    pub tile: TileType,
    pub rect: Rect,
    pub traits: TileTraits,
    pub style: RegionStyle,
}

/// Result of a floor probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloorProbe {
    pub grounded: bool,
    pub floor_top: Option<f32>,
}

/// Stateless over the world except for the one cached floor height that
/// feeds the horizontal-block exemption.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    last_floor_top: Option<f32>,
}

impl CollisionResolver {
    pub fn new() -> Self {
        CollisionResolver::default()
    }

    /// Clamp an attempted horizontal displacement so the actor's box
    /// cannot enter a physical region. Regions whose top edge equals the
    /// cached floor height are exempt. Returns `attempted_dx` unchanged
    /// when nothing blocks; the most restrictive blocking edge wins.
    pub fn resolve_horizontal(
        &self,
        bbox: &Rect,
        attempted_dx: f32,
        regions: &[StaticRegion],
    ) -> f32 {
        if attempted_dx == 0.0 {
            return 0.0;
        }

        let swept = bbox.swept_x(attempted_dx);
        let mut allowed = attempted_dx;

        for region in regions {
            if !region.traits.physical {
                continue;
            }
            if !region.rect.intersects(&swept) {
                continue;
            }
            if Some(region.rect.top()) == self.last_floor_top {
                continue;
            }

            if attempted_dx < 0.0 {
                // Moving left: the region's right edge blocks.
                if bbox.right() > region.rect.right() {
                    let gap = (region.rect.right() - bbox.left()).min(0.0);
                    allowed = allowed.max(gap);
                }
            } else {
                // Moving right: the region's left edge blocks.
                if bbox.left() < region.rect.left() {
                    let gap = (region.rect.left() - bbox.right()).max(0.0);
                    allowed = allowed.min(gap);
                }
            }
        }
        allowed
    }

    /// Find the floor under the actor. The first physical region whose
    /// horizontal span straddles either bottom corner of the box, and
    /// which the box's bottom edge has sunk into, grounds the actor and
    /// its top becomes the cached floor height. No tie-break beyond
    /// iteration order. A miss clears the cache.
    pub fn probe_floor(&mut self, bbox: &Rect, regions: &[StaticRegion]) -> FloorProbe {
        for region in regions {
            if !region.traits.physical {
                continue;
            }
            if !region.rect.intersects(bbox) {
                continue;
            }
            if region.rect.straddles_bottom_corner(bbox) && bbox.bottom() >= region.rect.top() {
                self.last_floor_top = Some(region.rect.top());
                return FloorProbe {
                    grounded: true,
                    floor_top: self.last_floor_top,
                };
            }
        }
        self.last_floor_top = None;
        FloorProbe::default()
    }

    /// Is the actor overlapping any deadly region? Classification only;
    /// consequences belong to the game-state layer.
    pub fn hazard_contact(&self, bbox: &Rect, regions: &[StaticRegion]) -> bool {
        regions
            .iter()
            .any(|r| r.traits.deadly && r.rect.intersects(bbox))
    }

    /// Cached floor height from the most recent probe, if grounded.
    #[allow(dead_code)]
    pub fn floor_top(&self) -> Option<f32> {
        self.last_floor_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn region(x: f32, y: f32, w: f32, h: f32) -> StaticRegion {
        StaticRegion {
            tile: TileType::Ground,
            rect: Rect::new(x, y, w, h),
            traits: TileTraits {
                deadly: false,
                transparent: false,
                physical: true,
                maskable: false,
            },
            style: RegionStyle::Simple,
        }
    }

    fn water(x: f32, y: f32, w: f32, h: f32) -> StaticRegion {
        let mut r = region(x, y, w, h);
        r.tile = TileType::Water;
        r.traits.physical = false;
        r
    }

    fn deadly(x: f32, y: f32, w: f32, h: f32) -> StaticRegion {
        let mut r = region(x, y, w, h);
        r.tile = TileType::DeadlyGround;
        r.traits.deadly = true;
        r
    }

    // ── resolve_horizontal ──

    #[test]
    fn open_space_passes_displacement_through() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(0.0, 0.0, 50.0, 25.0);
        assert_eq!(resolver.resolve_horizontal(&bbox, 10.0, &[]), 10.0);
        assert_eq!(resolver.resolve_horizontal(&bbox, -10.0, &[]), -10.0);
    }

    #[test]
    fn wall_ahead_clamps_rightward_motion() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(0.0, 0.0, 50.0, 25.0);
        let wall = [region(60.0, 0.0, 40.0, 100.0)];

        // 10 px gap, 25 px attempted: clamp to the gap
        assert_eq!(resolver.resolve_horizontal(&bbox, 25.0, &wall), 10.0);
        // Inside the gap: untouched
        assert_eq!(resolver.resolve_horizontal(&bbox, 5.0, &wall), 5.0);
    }

    #[test]
    fn wall_behind_clamps_leftward_motion() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(100.0, 0.0, 50.0, 25.0);
        let wall = [region(0.0, 0.0, 90.0, 100.0)];

        assert_eq!(resolver.resolve_horizontal(&bbox, -25.0, &wall), -10.0);
        assert_eq!(resolver.resolve_horizontal(&bbox, -5.0, &wall), -5.0);
    }

    #[test]
    fn touching_wall_blocks_completely() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(0.0, 0.0, 50.0, 25.0);
        let wall = [region(50.0, 0.0, 40.0, 100.0)];
        assert_eq!(resolver.resolve_horizontal(&bbox, 25.0, &wall), 0.0);
    }

    #[test]
    fn wall_outside_vertical_span_does_not_block() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(0.0, 0.0, 50.0, 25.0);
        let below = [region(60.0, 100.0, 40.0, 40.0)];
        assert_eq!(resolver.resolve_horizontal(&bbox, 25.0, &below), 25.0);
    }

    #[test]
    fn water_never_blocks() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(0.0, 0.0, 50.0, 25.0);
        let pool = [water(60.0, 0.0, 40.0, 100.0)];
        assert_eq!(resolver.resolve_horizontal(&bbox, 25.0, &pool), 25.0);
    }

    #[test]
    fn current_floor_is_exempt_from_blocking() {
        let mut resolver = CollisionResolver::new();
        // Actor sunk 1 px into a wide floor
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let floor = [region(0.0, 99.0, 400.0, 30.0)];

        let probe = resolver.probe_floor(&bbox, &floor);
        assert!(probe.grounded);

        // The floor intersects the box but must not block walking
        assert_eq!(resolver.resolve_horizontal(&bbox, 10.0, &floor), 10.0);
        assert_eq!(resolver.resolve_horizontal(&bbox, -10.0, &floor), -10.0);
    }

    #[test]
    fn most_restrictive_edge_wins() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(0.0, 0.0, 50.0, 25.0);
        let walls = [region(80.0, 0.0, 40.0, 100.0), region(60.0, 0.0, 10.0, 100.0)];
        assert_eq!(resolver.resolve_horizontal(&bbox, 100.0, &walls), 10.0);
    }

    // ── probe_floor ──

    #[test]
    fn grounded_when_sunk_into_floor() {
        let mut resolver = CollisionResolver::new();
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let floor = [region(0.0, 99.0, 400.0, 30.0)];

        let probe = resolver.probe_floor(&bbox, &floor);
        assert!(probe.grounded);
        assert_eq!(probe.floor_top, Some(99.0));
        assert_eq!(resolver.floor_top(), Some(99.0));
    }

    #[test]
    fn airborne_clears_the_cache() {
        let mut resolver = CollisionResolver::new();
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let floor = [region(0.0, 99.0, 400.0, 30.0)];
        resolver.probe_floor(&bbox, &floor);
        assert!(resolver.floor_top().is_some());

        let airborne = Rect::new(100.0, 0.0, 50.0, 25.0);
        let probe = resolver.probe_floor(&airborne, &floor);
        assert!(!probe.grounded);
        assert_eq!(resolver.floor_top(), None);
    }

    #[test]
    fn floor_must_straddle_a_bottom_corner() {
        let mut resolver = CollisionResolver::new();
        // Narrow post fully inside the actor's span: straddles neither
        // corner, so it does not ground
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let post = [region(110.0, 99.0, 20.0, 30.0)];
        assert!(!resolver.probe_floor(&bbox, &post).grounded);
    }

    #[test]
    fn water_does_not_ground() {
        let mut resolver = CollisionResolver::new();
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let pool = [water(0.0, 99.0, 400.0, 30.0)];
        assert!(!resolver.probe_floor(&bbox, &pool).grounded);
    }

    #[test]
    fn first_matching_region_wins() {
        let mut resolver = CollisionResolver::new();
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let floors = [region(0.0, 99.0, 400.0, 30.0), region(0.0, 95.0, 400.0, 4.0)];
        let probe = resolver.probe_floor(&bbox, &floors);
        assert_eq!(probe.floor_top, Some(99.0));
    }

    // ── hazard ──

    #[test]
    fn deadly_region_is_reported() {
        let resolver = CollisionResolver::new();
        let bbox = Rect::new(100.0, 75.0, 50.0, 25.0);
        let spikes = [deadly(120.0, 90.0, 40.0, 40.0)];
        assert!(resolver.hazard_contact(&bbox, &spikes));
        assert!(!resolver.hazard_contact(&Rect::new(0.0, 0.0, 10.0, 10.0), &spikes));
    }

    // ── properties ──

    proptest! {
        /// Starting outside a wall, no allowed displacement ever moves
        /// the box into overlap with it.
        #[test]
        fn never_penetrates_a_blocking_region(
            bx in 0.0f32..300.0,
            by in 0.0f32..200.0,
            dx in -500.0f32..500.0,
        ) {
            let bbox = Rect::new(bx, by, 50.0, 25.0);
            let wall = region(400.0, 0.0, 60.0, 300.0);
            prop_assume!(!bbox.intersects(&wall.rect));

            let resolver = CollisionResolver::new();
            let allowed = resolver.resolve_horizontal(&bbox, dx, &[wall.clone()]);

            let mut moved = bbox;
            moved.translate(allowed, 0.0);
            prop_assert!(!moved.intersects(&wall.rect));
            prop_assert!(allowed.abs() <= dx.abs() + 1e-3);
        }
    }
}
