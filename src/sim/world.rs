/// RegionCatalog and GameSession: ownership of the running world.
///
/// ## Coordinate model
///
/// Everything collides in screen space. The hero's bounding box sits at
/// a fixed anchor; the catalog's regions carry all relative motion by
/// being translated (scrolled) by the negative of each tick's resolved
/// hero displacement. The hero's own `x`/`y` advance in the world frame
/// purely as kinematic bookkeeping for the servo and jump formulas.
///
/// The catalog is the sole mutable owner of region positions: scroll()
/// translates them in place, nothing ever resizes them after build.

use crate::config::GameConfig;
use crate::domain::collision::{CollisionResolver, Rect, StaticRegion};
use crate::domain::hero::Hero;
use crate::sim::assets::TraitTable;
use crate::sim::grid::Region;
use crate::sim::level::WorldError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Dead,
}

/// Static collision geometry for the loaded world, in screen-space
/// pixels.
#[derive(Debug, Default)]
pub struct RegionCatalog {
    regions: Vec<StaticRegion>,
    scroll_x: f32,
    scroll_y: f32,
}

impl RegionCatalog {
    /// Promote decomposed tile-unit regions to pixel geometry. `dy`
    /// anchors the world bottom to the viewport (screen_h − world_h).
    /// Every materialized type must have a trait entry.
    pub fn build(
        regions: &[Region],
        table: &TraitTable,
        cell_w: f32,
        cell_h: f32,
        dy: f32,
    ) -> Result<RegionCatalog, WorldError> {
        let mut out = Vec::with_capacity(regions.len());
        for region in regions {
            let entry = table
                .get(region.tile)
                .ok_or(WorldError::MissingTraits { tile: region.tile })?;
            out.push(StaticRegion {
                tile: region.tile,
                rect: Rect::new(
                    region.x as f32 * cell_w,
                    region.y as f32 * cell_h + dy,
                    region.width as f32 * cell_w,
                    region.height as f32 * cell_h,
                ),
                traits: entry.traits,
                style: table.style_for(region.tile),
            });
        }
        Ok(RegionCatalog {
            regions: out,
            scroll_x: 0.0,
            scroll_y: 0.0,
        })
    }

    /// Translate every region in place and accumulate the offset.
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        for region in &mut self.regions {
            region.rect.translate(dx, dy);
        }
        self.scroll_x += dx;
        self.scroll_y += dy;
    }

    pub fn regions(&self) -> &[StaticRegion] {
        &self.regions
    }

    /// Cumulative scroll applied since build.
    pub fn scroll_offset(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Broad phase: plain iteration over regions overlapping `bbox`.
    pub fn intersecting<'a>(
        &'a self,
        bbox: &'a Rect,
    ) -> impl Iterator<Item = (usize, &'a StaticRegion)> {
        self.regions
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.rect.intersects(bbox))
    }
}

/// Everything a running game owns, by value. Tick functions receive the
/// session explicitly; there is no global world state.
pub struct GameSession {
    pub catalog: RegionCatalog,
    pub hero: Hero,
    pub resolver: CollisionResolver,
    pub phase: Phase,
    pub tick: u64,

    /// Screen position the hero is pinned to.
    pub anchor: (f32, f32),
    pub grounded: bool,

    /// Catalog indices of crates already picked up.
    pub collected_crates: Vec<usize>,
    pub crates_collected: u32,

    /// Catalog index of the checkpoint currently being stood on, and
    /// the scroll offset captured when it was first touched.
    pub checkpoint_region: Option<usize>,
    pub checkpoint_scroll: Option<(f32, f32)>,

    pub world_name: String,
    pub screen_w: u32,
    pub screen_h: u32,
}

impl GameSession {
    pub fn new(
        catalog: RegionCatalog,
        anchor: (f32, f32),
        world_name: String,
        config: &GameConfig,
    ) -> Self {
        let hero = Hero::new(
            anchor.0,
            anchor.1,
            config.hero.width,
            config.hero.height,
            config.physics,
        );
        GameSession {
            catalog,
            hero,
            resolver: CollisionResolver::new(),
            phase: Phase::Title,
            tick: 0,
            anchor,
            grounded: false,
            collected_crates: Vec::new(),
            crates_collected: 0,
            checkpoint_region: None,
            checkpoint_scroll: None,
            world_name,
            screen_w: config.screen.width,
            screen_h: config.screen.height,
        }
    }

    /// The hero's screen-space collision box. Fixed at the anchor; the
    /// world scrolls underneath it.
    pub fn hero_bbox(&self) -> Rect {
        Rect::new(self.anchor.0, self.anchor.1, self.hero.w, self.hero.h)
    }

    /// Has this crate region been picked up already?
    pub fn crate_collected(&self, idx: usize) -> bool {
        self.collected_crates.contains(&idx)
    }
}
