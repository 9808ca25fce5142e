use serde::{Deserialize, Serialize};

/// Number of nodes after which the story concludes.
pub const MAX_NODES: u32 = 5;

/// First node count that belongs to the middle phase.
pub const MIDDLE_PHASE_START: u32 = 3;

// =============================================================================
// Story Phase
// =============================================================================

/// Narrative stage of the adventure, derived from the node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryPhase {
    Beginning,
    Middle,
    Conclusion,
}

impl StoryPhase {
    /// Phase policy: `Conclusion` once `node_count >= max_nodes`, `Middle` from
    /// [`MIDDLE_PHASE_START`], `Beginning` otherwise.
    pub fn for_node(node_count: u32, max_nodes: u32) -> Self {
        if node_count >= max_nodes {
            StoryPhase::Conclusion
        } else if node_count >= MIDDLE_PHASE_START {
            StoryPhase::Middle
        } else {
            StoryPhase::Beginning
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StoryPhase::Beginning => "Beginning",
            StoryPhase::Middle => "Middle",
            StoryPhase::Conclusion => "Conclusion",
        }
    }
}

impl std::fmt::Display for StoryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// =============================================================================
// Story State
// =============================================================================

/// Per-request progression state.
///
/// Built from the caller-supplied node count, advanced exactly once while the
/// request is handled, then dropped. The phase is never set directly; it is
/// always recomputed from `node_count` and `max_nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryState {
    node_count: u32,
    max_nodes: u32,
    phase: StoryPhase,
}

impl StoryState {
    pub fn new(node_count: u32) -> Self {
        Self {
            node_count,
            max_nodes: MAX_NODES,
            phase: StoryPhase::for_node(node_count, MAX_NODES),
        }
    }

    /// Move to the next node and recompute the phase.
    pub fn advance(&mut self) {
        self.node_count = self.node_count.saturating_add(1);
        self.phase = StoryPhase::for_node(self.node_count, self.max_nodes);
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn max_nodes(&self) -> u32 {
        self.max_nodes
    }

    pub fn phase(&self) -> StoryPhase {
        self.phase
    }

    pub fn is_conclusion(&self) -> bool {
        self.phase == StoryPhase::Conclusion
    }

    /// True on the last node before the conclusion, where the finale is set up.
    pub fn is_penultimate(&self) -> bool {
        self.node_count == self.max_nodes.saturating_sub(1)
    }
}

impl Default for StoryState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_nodes_are_beginning() {
        for node_count in 0..MIDDLE_PHASE_START {
            assert_eq!(StoryState::new(node_count).phase(), StoryPhase::Beginning);
        }
    }

    #[test]
    fn nodes_before_max_are_middle() {
        for node_count in MIDDLE_PHASE_START..MAX_NODES {
            assert_eq!(StoryState::new(node_count).phase(), StoryPhase::Middle);
        }
    }

    #[test]
    fn max_and_beyond_conclude() {
        for node_count in [MAX_NODES, MAX_NODES + 1, 42, u32::MAX] {
            let state = StoryState::new(node_count);
            assert_eq!(state.phase(), StoryPhase::Conclusion);
            assert!(state.is_conclusion());
        }
    }

    #[test]
    fn advance_recomputes_phase() {
        let mut state = StoryState::new(2);
        assert_eq!(state.phase(), StoryPhase::Beginning);

        state.advance();
        assert_eq!(state.node_count(), 3);
        assert_eq!(state.phase(), StoryPhase::Middle);

        state.advance();
        state.advance();
        assert_eq!(state.node_count(), 5);
        assert!(state.is_conclusion());
    }

    #[test]
    fn advance_saturates() {
        let mut state = StoryState::new(u32::MAX);
        state.advance();
        assert_eq!(state.node_count(), u32::MAX);
        assert!(state.is_conclusion());
    }

    #[test]
    fn penultimate_is_one_before_max() {
        assert!(StoryState::new(MAX_NODES - 1).is_penultimate());
        assert!(!StoryState::new(MAX_NODES - 2).is_penultimate());
        assert!(!StoryState::new(MAX_NODES).is_penultimate());
    }

    #[test]
    fn default_starts_at_zero() {
        let state = StoryState::default();
        assert_eq!(state.node_count(), 0);
        assert_eq!(state.max_nodes(), MAX_NODES);
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&StoryPhase::Conclusion).unwrap();
        assert_eq!(json, "\"conclusion\"");
    }
}
