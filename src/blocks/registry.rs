/// Built-in block registry for the sandbox world
///
/// Real deployments feed `BlockPropertyTable::build` from the game client's
/// registry at world load. The demo binary and the integration tests use
/// this fixed vanilla-like kind set instead.
use lazy_static::lazy_static;

use super::properties::{BlockKindDef, BlockPropertyTable, ToolClass};

fn def(name: &str, build: impl FnOnce(&mut BlockKindDef)) -> BlockKindDef {
    let mut d = BlockKindDef::named(name);
    build(&mut d);
    d
}

fn solid(name: &str, hardness: f32, tool: ToolClass) -> BlockKindDef {
    def(name, |d| {
        d.walk_on = true;
        d.diggable = true;
        d.hardness = hardness;
        d.best_tool = tool;
    })
}

lazy_static! {
    static ref SANDBOX_REGISTRY: Vec<BlockKindDef> = vec![
        // Kind 0 is always air
        def("air", |d| {
            d.fully_passable = true;
            d.walk_through = true;
        }),
        solid("stone", 1.5, ToolClass::Pickaxe),
        solid("cobblestone", 2.0, ToolClass::Pickaxe),
        solid("dirt", 0.5, ToolClass::Shovel),
        solid("grass_block", 0.6, ToolClass::Shovel),
        def("sand", |d| {
            d.walk_on = true;
            d.diggable = true;
            d.falling = true;
            d.hardness = 0.5;
            d.best_tool = ToolClass::Shovel;
        }),
        def("gravel", |d| {
            d.walk_on = true;
            d.diggable = true;
            d.falling = true;
            d.hardness = 0.6;
            d.best_tool = ToolClass::Shovel;
        }),
        def("water", |d| {
            d.water = true;
            d.fully_passable = true;
        }),
        def("lava", |d| {
            d.lava = true;
        }),
        solid("oak_log", 2.0, ToolClass::Axe),
        solid("oak_planks", 2.0, ToolClass::Axe),
        def("oak_leaves", |d| {
            d.walk_on = true;
            d.diggable = true;
            d.hardness = 0.2;
        }),
        def("ladder", |d| {
            d.climbable = true;
            d.walk_through = true;
            d.diggable = true;
            d.hardness = 0.4;
            d.best_tool = ToolClass::Axe;
        }),
        def("vine", |d| {
            d.climbable = true;
            d.walk_through = true;
            d.fully_passable = true;
            d.diggable = true;
            d.hardness = 0.2;
        }),
        def("torch", |d| {
            d.fully_passable = true;
            d.walk_through = true;
            d.diggable = true;
        }),
        def("tall_grass", |d| {
            d.fully_passable = true;
            d.walk_through = true;
            d.diggable = true;
        }),
        def("bedrock", |d| {
            d.walk_on = true;
        }),
        def("obsidian", |d| {
            d.walk_on = true;
            d.diggable = true;
            d.hardness = 50.0;
            d.best_tool = ToolClass::Pickaxe;
        }),
        def("oak_fence", |d| {
            d.fence = true;
            d.diggable = true;
            d.hardness = 2.0;
            d.best_tool = ToolClass::Axe;
        }),
        def("oak_fence_gate", |d| {
            d.fence = true;
            d.openable = true;
            d.diggable = true;
            d.hardness = 2.0;
            d.best_tool = ToolClass::Axe;
        }),
        def("white_carpet", |d| {
            d.carpet = true;
            d.walk_through = true;
            d.diggable = true;
            d.hardness = 0.1;
        }),
        def("oak_door", |d| {
            d.openable = true;
            d.diggable = true;
            d.hardness = 3.0;
            d.best_tool = ToolClass::Axe;
        }),
        def("oak_trapdoor", |d| {
            d.openable = true;
            d.diggable = true;
            d.hardness = 3.0;
            d.best_tool = ToolClass::Axe;
        }),
        def("chest", |d| {
            d.walk_on = true;
            d.avoid_break = true;
            d.diggable = true;
            d.hardness = 2.5;
            d.best_tool = ToolClass::Axe;
        }),
        solid("crafting_table", 2.5, ToolClass::Axe),
        def("farmland", |d| {
            d.walk_on = true;
            d.diggable = true;
            d.hardness = 0.6;
            d.best_tool = ToolClass::Shovel;
        }),
        def("wheat", |d| {
            d.fully_passable = true;
            d.walk_through = true;
            d.diggable = true;
        }),
        solid("sandstone", 0.8, ToolClass::Pickaxe),
        def("snow_layer", |d| {
            d.carpet = true;
            d.walk_through = true;
            d.diggable = true;
            d.hardness = 0.1;
            d.best_tool = ToolClass::Shovel;
        }),
        solid("ice", 0.5, ToolClass::Pickaxe),
        solid("coal_ore", 3.0, ToolClass::Pickaxe),
        solid("iron_ore", 3.0, ToolClass::Pickaxe),
        solid("diamond_ore", 3.0, ToolClass::Pickaxe),
    ];
}

/// The fixed sandbox kind set (ids assigned by index)
pub fn sandbox_registry() -> &'static [BlockKindDef] {
    &SANDBOX_REGISTRY
}

/// Property table built from the sandbox registry
pub fn sandbox_table() -> BlockPropertyTable {
    BlockPropertyTable::build(sandbox_registry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::properties::{NavClass, Passability};

    #[test]
    fn test_air_is_kind_zero() {
        let table = sandbox_table();
        assert_eq!(table.id_by_name("air").unwrap().0, 0);
        assert_eq!(table.nav_class(table.id_by_name("air").unwrap()), NavClass::Air);
    }

    #[test]
    fn test_registry_covers_maybe_cases() {
        let table = sandbox_table();
        for name in ["oak_door", "oak_trapdoor", "oak_fence_gate"] {
            let id = table.id_by_name(name).unwrap();
            assert_eq!(table.passability(id), Passability::Maybe, "{}", name);
        }
    }

    #[test]
    fn test_bedrock_not_diggable() {
        let table = sandbox_table();
        let id = table.id_by_name("bedrock").unwrap();
        assert!(!table.props(id).diggable());
    }
}
