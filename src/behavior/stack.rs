/// The behavior stack
///
/// Push deep-copies the top frame so a behavior can tweak preferences and
/// pop back to the previous state when it finishes. The stack never goes
/// empty: popping the last frame reinstalls the defaults.
use bevy::log::warn;
use bevy::prelude::Resource;

use super::frame::BehaviorFrame;

#[derive(Resource)]
pub struct BehaviorStack {
    frames: Vec<BehaviorFrame>,
}

impl Default for BehaviorStack {
    fn default() -> Self {
        Self {
            frames: vec![BehaviorFrame::default()],
        }
    }
}

impl BehaviorStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Active frame (always present)
    pub fn top(&self) -> &BehaviorFrame {
        self.frames.last().expect("behavior stack is never empty")
    }

    pub fn top_mut(&mut self) -> &mut BehaviorFrame {
        self.frames.last_mut().expect("behavior stack is never empty")
    }

    /// Push a copy of the current top frame and return it for editing
    pub fn push(&mut self) -> &mut BehaviorFrame {
        let copy = self.top().clone();
        self.frames.push(copy);
        self.top_mut()
    }

    /// Push a caller-crafted frame
    pub fn push_state(&mut self, frame: BehaviorFrame) {
        self.frames.push(frame);
    }

    /// Discard the top frame. Popping the bottom frame reinstalls defaults
    /// so consumers always see at least one frame.
    pub fn pop(&mut self) -> BehaviorFrame {
        let frame = self.frames.pop().expect("behavior stack is never empty");
        if self.frames.is_empty() {
            warn!("behavior stack popped to empty - reinstalling default frame");
            self.frames.push(BehaviorFrame::default());
        }
        frame
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_never_drops_below_one() {
        let mut stack = BehaviorStack::new();
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 1);
        stack.pop();
        stack.pop();
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_push_copies_top() {
        let mut stack = BehaviorStack::new();
        stack.top_mut().allow_parkour = true;
        let frame = stack.push();
        assert!(frame.allow_parkour);
        frame.allow_parkour = false;

        assert!(!stack.top().allow_parkour);
        stack.pop();
        assert!(stack.top().allow_parkour);
    }

    #[test]
    fn test_pop_then_push_restores_depth() {
        let mut stack = BehaviorStack::new();
        stack.push();
        stack.push();
        let depth = stack.depth();
        stack.pop();
        stack.push();
        assert_eq!(stack.depth(), depth);
    }

    #[test]
    fn test_bottom_pop_reinstalls_defaults() {
        let mut stack = BehaviorStack::new();
        stack.top_mut().allow_break = false;
        let popped = stack.pop();
        assert!(!popped.allow_break);
        // Fresh bottom frame is back to defaults
        assert!(stack.top().allow_break);
    }
}
