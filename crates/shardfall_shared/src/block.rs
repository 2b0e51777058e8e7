use std::fmt;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockKindId(pub u16);

impl BlockKindId {
    pub const DIRT: Self = Self(1);
    pub const STONE: Self = Self(2);
    pub const CRYSTAL: Self = Self(3);
    pub const MAGMA: Self = Self(4);
}

impl fmt::Display for BlockKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// What happens when a block of this kind is destroyed.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        const DROPS_ITEM = 1 << 0;
        const SPARKS = 1 << 1;
        const SHOCKWAVE = 1 << 2;
        /// Rings when broken and drops a crystal-styled item.
        const RESONANT = 1 << 3;
        const TRAIL = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockKind {
    pub id: BlockKindId,
    pub name: String,
    pub max_hp: u32,
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: f32,
    pub flags: BlockFlags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockError {
    UnknownBlockKind(BlockKindId),
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlockKind(id) => write!(f, "unknown block kind {id}"),
        }
    }
}

impl std::error::Error for BlockError {}

#[derive(Default, Debug, Clone)]
pub struct BlockRegistry {
    kinds: Vec<BlockKind>,
    by_id: FxHashMap<BlockKindId, usize>,
    by_name: FxHashMap<String, BlockKindId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same id twice is a programming error.
    pub fn register(&mut self, kind: BlockKind) -> BlockKindId {
        let id = kind.id;
        assert!(
            !self.by_id.contains_key(&id),
            "block kind {id} registered twice"
        );

        self.by_id.insert(id, self.kinds.len());
        self.by_name.insert(kind.name.clone(), id);
        self.kinds.push(kind);
        id
    }

    pub fn lookup(&self, id: BlockKindId) -> Result<&BlockKind, BlockError> {
        self.by_id
            .get(&id)
            .map(|&index| &self.kinds[index])
            .ok_or(BlockError::UnknownBlockKind(id))
    }

    pub fn get_by_name(&self, name: &str) -> Option<BlockKindId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockKind> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

pub fn register_default_blocks() -> BlockRegistry {
    #[allow(clippy::too_many_arguments)]
    fn kind(
        id: BlockKindId,
        name: &str,
        max_hp: u32,
        color: u32,
        roughness: f32,
        metalness: f32,
        emissive: f32,
        flags: BlockFlags,
    ) -> BlockKind {
        BlockKind {
            id,
            name: name.to_string(),
            max_hp,
            color: rgb_from_hex(color),
            roughness,
            metalness,
            emissive,
            flags,
        }
    }

    let mut registry = BlockRegistry::new();

    let defaults = [
        kind(BlockKindId::DIRT, "dirt", 30, 0x8B5A2B, 0.9, 0.1, 0.0, BlockFlags::DROPS_ITEM),
        kind(
            BlockKindId::STONE,
            "stone",
            80,
            0x888899,
            0.7,
            0.2,
            0.0,
            BlockFlags::DROPS_ITEM | BlockFlags::SHOCKWAVE,
        ),
        kind(
            BlockKindId::CRYSTAL,
            "crystal",
            150,
            0x00FFFF,
            0.1,
            0.8,
            0.8,
            BlockFlags::DROPS_ITEM
                | BlockFlags::SPARKS
                | BlockFlags::SHOCKWAVE
                | BlockFlags::RESONANT,
        ),
        kind(
            BlockKindId::MAGMA,
            "magma",
            40,
            0xFF4400,
            0.4,
            0.4,
            1.0,
            BlockFlags::SPARKS | BlockFlags::SHOCKWAVE | BlockFlags::TRAIL,
        ),
    ];

    for props in defaults {
        registry.register(props);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::{register_default_blocks, rgb_from_hex, BlockError, BlockFlags, BlockKindId};

    #[test]
    fn registry_returns_known_block_kinds() {
        let registry = register_default_blocks();
        assert_eq!(registry.len(), 4);

        let dirt = registry.lookup(BlockKindId::DIRT).expect("dirt registered");
        assert_eq!(dirt.name, "dirt");
        assert_eq!(dirt.max_hp, 30);
        assert_eq!(dirt.emissive, 0.0);

        let crystal = registry.lookup(BlockKindId::CRYSTAL).expect("crystal registered");
        assert_eq!(crystal.max_hp, 150);
        assert_eq!(crystal.color, [0.0, 1.0, 1.0]);
        assert!(crystal.flags.contains(BlockFlags::RESONANT));

        let magma = registry.lookup(BlockKindId::MAGMA).expect("magma registered");
        assert_eq!(magma.emissive, 1.0);
        assert!(!magma.flags.contains(BlockFlags::DROPS_ITEM));

        assert_eq!(registry.get_by_name("stone"), Some(BlockKindId::STONE));
        assert_eq!(registry.get_by_name("granite"), None);
    }

    #[test]
    fn lookup_of_unregistered_id_fails() {
        let registry = register_default_blocks();
        assert_eq!(
            registry.lookup(BlockKindId(99)),
            Err(BlockError::UnknownBlockKind(BlockKindId(99)))
        );
        assert_eq!(
            registry.lookup(BlockKindId(0)).unwrap_err().to_string(),
            "unknown block kind #0"
        );
    }

    #[test]
    fn material_properties_stay_in_unit_range() {
        let registry = register_default_blocks();
        for kind in registry.iter() {
            assert!(kind.max_hp > 0, "{} has no hit points", kind.name);
            for value in [kind.roughness, kind.metalness, kind.emissive] {
                assert!((0.0..=1.0).contains(&value), "{} out of range", kind.name);
            }
        }
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut registry = register_default_blocks();
        let dirt = registry
            .lookup(BlockKindId::DIRT)
            .expect("dirt registered")
            .clone();
        registry.register(dirt);
    }

    #[test]
    fn hex_colors_decode_per_channel() {
        assert_eq!(rgb_from_hex(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0x0000FF), [0.0, 0.0, 1.0]);
        let dirt = rgb_from_hex(0x8B5A2B);
        assert!((dirt[0] - 139.0 / 255.0).abs() < 1e-6);
    }
}
