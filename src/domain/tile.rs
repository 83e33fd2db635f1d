/// Tile types and the behavior flags attached to them.
/// The enum is the closed palette; per-type flags (deadly, physical, ...)
/// come from the asset trait table at world-load time, not from the enum,
/// so tile behavior stays data-driven.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TileType {
    Ground,
    Platform,
    Water,
    LootCrate,
    DeadlyGround,
    CheckpointGround,
    Empty,
}

/// Palette order matches the authoring tool's colour table.
/// Serialized matrices store these indices; -1 is the background sentinel.
pub const PALETTE: [TileType; 7] = [
    TileType::Ground,
    TileType::Platform,
    TileType::Water,
    TileType::LootCrate,
    TileType::DeadlyGround,
    TileType::CheckpointGround,
    TileType::Empty,
];

impl TileType {
    /// Resolve a serialized palette index. Returns None for anything
    /// outside the palette (the -1 background sentinel included).
    pub fn from_index(idx: i8) -> Option<TileType> {
        if idx < 0 {
            return None;
        }
        PALETTE.get(idx as usize).copied()
    }

    pub fn index(self) -> i8 {
        PALETTE.iter().position(|&t| t == self).unwrap_or(0) as i8
    }

    /// Lookup key into the asset trait table.
    pub fn name(self) -> &'static str {
        match self {
            TileType::Ground => "ground",
            TileType::Platform => "platform",
            TileType::Water => "water",
            TileType::LootCrate => "loot_crate",
            TileType::DeadlyGround => "deadly_ground",
            TileType::CheckpointGround => "checkpoint_ground",
            TileType::Empty => "empty",
        }
    }
}

impl Default for TileType {
    fn default() -> Self {
        TileType::Empty
    }
}

/// Behavior flags resolved from asset metadata.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TileTraits {
    /// Touching the region kills the hero.
    pub deadly: bool,
    /// Rendered with transparency.
    pub transparent: bool,
    /// Blocks movement and carries the hero. Water is not physical.
    pub physical: bool,
    /// A mask is cut from the region image when composing.
    pub maskable: bool,
}

/// How a region's image is composed. Chosen once at catalog build from
/// the trait table; the collision core never inspects it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegionStyle {
    /// One tile image repeated over the whole rectangle.
    Simple,
    /// Top-row image plus a repeating bottom filler (ground blocks).
    BottomRepeating,
    /// Image trimmed by a mask.
    MaskTrimmed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_roundtrip() {
        for &tile in &PALETTE {
            assert_eq!(TileType::from_index(tile.index()), Some(tile));
        }
    }

    #[test]
    fn background_sentinel_resolves_to_none() {
        assert_eq!(TileType::from_index(-1), None);
        assert_eq!(TileType::from_index(7), None);
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
