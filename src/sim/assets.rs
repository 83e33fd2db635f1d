/// Asset trait lookup: which behavior flags and image modes each tile
/// type carries.
///
/// Asset files follow the naming rule
/// `NAME-MODE-FEATURE1-...-FEATUREn.png` where MODE is `top` or
/// `bottom` and features come from {deadly, transparent, physical,
/// maskable}. Only filenames are read here — pixel data never reaches
/// the sim layer; image composition belongs to the renderer side.
///
/// When no asset directory is present, a built-in table with the same
/// shape keeps the game playable out of the box.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::tile::{RegionStyle, TileTraits, TileType, PALETTE};

/// Traits plus which image modes exist for one tile type.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetEntry {
    pub traits: TileTraits,
    pub has_top: bool,
    pub has_bottom: bool,
}

#[derive(Clone, Debug)]
pub struct TraitTable {
    entries: HashMap<TileType, AssetEntry>,
}

impl TraitTable {
    /// Built-in trait set mirroring the shipped asset pack.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();

        let solid = TileTraits {
            physical: true,
            ..TileTraits::default()
        };
        entries.insert(
            TileType::Ground,
            AssetEntry { traits: solid, has_top: true, has_bottom: true },
        );
        entries.insert(
            TileType::Platform,
            AssetEntry { traits: solid, has_top: true, has_bottom: false },
        );
        entries.insert(
            TileType::Water,
            AssetEntry {
                traits: TileTraits {
                    transparent: true,
                    maskable: true,
                    ..TileTraits::default()
                },
                has_top: true,
                has_bottom: false,
            },
        );
        entries.insert(
            TileType::LootCrate,
            AssetEntry {
                traits: TileTraits {
                    transparent: true,
                    ..TileTraits::default()
                },
                has_top: true,
                has_bottom: false,
            },
        );
        entries.insert(
            TileType::DeadlyGround,
            AssetEntry {
                traits: TileTraits {
                    deadly: true,
                    physical: true,
                    ..TileTraits::default()
                },
                has_top: true,
                has_bottom: true,
            },
        );
        entries.insert(
            TileType::CheckpointGround,
            AssetEntry { traits: solid, has_top: true, has_bottom: false },
        );

        TraitTable { entries }
    }

    /// Scan a directory of asset filenames. Returns None when the
    /// directory cannot be read or holds no recognizable assets.
    pub fn scan_dir(dir: &Path) -> Option<Self> {
        let entries_iter = std::fs::read_dir(dir).ok()?;
        let mut entries: HashMap<TileType, AssetEntry> = HashMap::new();

        for file in entries_iter.flatten() {
            let path = file.path();
            if path.extension().map_or(true, |e| e != "png") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_ascii_lowercase(),
                None => continue,
            };

            // Longest-name match first so "deadly_ground" is not
            // swallowed by "ground".
            let tile = PALETTE
                .iter()
                .filter(|t| **t != TileType::Empty && stem.starts_with(t.name()))
                .max_by_key(|t| t.name().len())
                .copied();
            let tile = match tile {
                Some(t) => t,
                None => {
                    log::debug!("ignoring unrecognized asset file {}", path.display());
                    continue;
                }
            };

            let rest = &stem[tile.name().len()..];
            let tokens: Vec<&str> = rest.split('-').filter(|t| !t.is_empty()).collect();
            let entry = entries.entry(tile).or_default();

            if tokens.contains(&"bottom") {
                entry.has_bottom = true;
            } else {
                // Top image carries the feature flags.
                entry.has_top = true;
                entry.traits = TileTraits {
                    deadly: tokens.contains(&"deadly"),
                    transparent: tokens.contains(&"transparent"),
                    physical: tokens.contains(&"physical"),
                    maskable: tokens.contains(&"maskable"),
                };
            }
        }

        // Every type needs at least its top image; partial entries
        // (a stray bottom file with no top) are dropped.
        entries.retain(|tile, e| {
            if !e.has_top {
                log::warn!("asset set for '{}' has no top image, skipping", tile.name());
            }
            e.has_top
        });

        if entries.is_empty() {
            None
        } else {
            Some(TraitTable { entries })
        }
    }

    /// Scan `dir` when it exists, otherwise fall back to the built-in
    /// table.
    pub fn load(dir: &Path) -> Self {
        if let Some(table) = TraitTable::scan_dir(dir) {
            log::info!(
                "asset traits: {} types scanned from {}",
                table.entries.len(),
                dir.display()
            );
            return table;
        }
        log::info!("asset traits: using built-in table");
        TraitTable::builtin()
    }

    pub fn get(&self, tile: TileType) -> Option<&AssetEntry> {
        self.entries.get(&tile)
    }

    /// Composition style for a region of this type, decided once from
    /// the table. Bottom filler wins over mask trimming.
    pub fn style_for(&self, tile: TileType) -> RegionStyle {
        match self.entries.get(&tile) {
            Some(e) if e.has_bottom => RegionStyle::BottomRepeating,
            Some(e) if e.traits.maskable => RegionStyle::MaskTrimmed,
            _ => RegionStyle::Simple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_all_materializable_types() {
        let table = TraitTable::builtin();
        for &tile in PALETTE.iter().filter(|t| **t != TileType::Empty) {
            assert!(table.get(tile).is_some(), "no entry for {:?}", tile);
        }
        assert!(table.get(TileType::Empty).is_none());
    }

    #[test]
    fn builtin_water_is_not_physical() {
        let table = TraitTable::builtin();
        let water = table.get(TileType::Water).unwrap();
        assert!(!water.traits.physical);
        assert!(water.traits.transparent);
    }

    #[test]
    fn builtin_deadly_ground_is_deadly_and_physical() {
        let table = TraitTable::builtin();
        let spikes = table.get(TileType::DeadlyGround).unwrap();
        assert!(spikes.traits.deadly);
        assert!(spikes.traits.physical);
    }

    #[test]
    fn style_selection_prefers_bottom_filler() {
        let table = TraitTable::builtin();
        assert_eq!(table.style_for(TileType::Ground), RegionStyle::BottomRepeating);
        assert_eq!(table.style_for(TileType::Water), RegionStyle::MaskTrimmed);
        assert_eq!(table.style_for(TileType::Platform), RegionStyle::Simple);
        assert_eq!(table.style_for(TileType::Empty), RegionStyle::Simple);
    }
}
