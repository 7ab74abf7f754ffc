/// Path nodes and the per-search arena
///
/// All nodes of a single `compute` session live in one arena and refer to
/// each other by `u32` index, never by pointer. The arena is dropped with
/// the session, so no parent reference can dangle across replans.
use std::collections::HashMap;

use crate::pathfinding::moves::MoveKind;
use crate::types::BlockPos;

/// One A* node
#[derive(Debug, Clone)]
pub struct PathNode {
    pub pos: BlockPos,
    /// Cost from the search origin
    pub g: f64,
    /// Heuristic estimate to the goal
    pub h: f64,
    /// Arena index of the predecessor; `None` only for the start node
    pub parent: Option<u32>,
    /// Movement that produced this node from its parent
    pub kind: Option<MoveKind>,
    pub to_break: Vec<BlockPos>,
    pub to_place: Vec<BlockPos>,
    /// Position in the open set; -1 when not queued
    pub heap_index: i32,
}

impl PathNode {
    /// A* evaluation key
    #[inline]
    pub fn f(&self) -> f64 {
        self.g + self.h
    }

    #[inline]
    pub fn in_open_set(&self) -> bool {
        self.heap_index >= 0
    }
}

/// Arena of nodes keyed by position hash
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<PathNode>,
    by_hash: HashMap<i64, u32>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, index: u32) -> &PathNode {
        &self.nodes[index as usize]
    }

    #[inline]
    pub fn node_mut(&mut self, index: u32) -> &mut PathNode {
        &mut self.nodes[index as usize]
    }

    /// Existing node index for a position, if the search has seen it
    pub fn lookup(&self, pos: BlockPos) -> Option<u32> {
        self.by_hash.get(&pos.long_hash()).copied()
    }

    /// Insert a fresh node; the caller guarantees the position is new
    pub fn insert(&mut self, pos: BlockPos, g: f64, h: f64) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(PathNode {
            pos,
            g,
            h,
            parent: None,
            kind: None,
            to_break: Vec::new(),
            to_place: Vec::new(),
            heap_index: -1,
        });
        self.by_hash.insert(pos.long_hash(), index);
        index
    }

    /// Drop every node; the next session starts clean
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_hash.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_lookup_round_trip() {
        let mut arena = NodeArena::new();
        let a = arena.insert(BlockPos::new(0, 64, 0), 0.0, 10.0);
        let b = arena.insert(BlockPos::new(1, 64, 0), 4.6, 6.0);
        assert_eq!(arena.lookup(BlockPos::new(0, 64, 0)), Some(a));
        assert_eq!(arena.lookup(BlockPos::new(1, 64, 0)), Some(b));
        assert_eq!(arena.lookup(BlockPos::new(2, 64, 0)), None);
        assert_eq!(arena.node(b).f(), 10.6);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut arena = NodeArena::new();
        arena.insert(BlockPos::new(0, 64, 0), 0.0, 0.0);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.lookup(BlockPos::new(0, 64, 0)), None);
    }
}
