//! Per-session cache of the placement.
use crate::{graph::GraphDescription, layout::Positions};

/// Whether a request needs a new placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Ask the layout engine.
    Compute,
    /// Keep the cached coordinates.
    Reuse,
}

/// What a session remembers between two requests.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    last: Option<GraphDescription>,
    positions: Option<Positions>,
    frozen: bool,
    fingerprint: Option<u64>,
    visible: Option<String>,
}

impl RenderState {
    /// A state without any cached data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides how the next request is placed, given the fingerprint of its framework,
    /// the key of its visible labels and whether the positions are to be pinned.
    ///
    /// 1. A changed framework invalidates the cache.
    /// 2. Pinning without cached coordinates places once.
    /// 3. Pinning with cached coordinates reuses them.
    /// 4. Otherwise a new placement is made whenever the visible labels change.
    pub fn plan(&mut self, fingerprint: u64, visible: &str, freeze: bool) -> Plan {
        if self.fingerprint != Some(fingerprint) {
            log::debug!("framework changed, dropping the cached placement");
            self.fingerprint = Some(fingerprint);
            self.positions = None;
            self.visible = None;
            self.frozen = false;
            return Plan::Compute;
        }
        match (freeze, &self.positions) {
            (true, Some(_)) => {
                self.frozen = true;
                Plan::Reuse
            }
            (true, None) => Plan::Compute,
            (false, Some(_)) if self.visible.as_deref() == Some(visible) => {
                self.frozen = false;
                Plan::Reuse
            }
            (false, _) => {
                self.frozen = false;
                Plan::Compute
            }
        }
    }

    /// Caches a new placement.
    pub fn store_layout(&mut self, positions: Positions, visible: &str, freeze: bool) {
        self.positions = Some(positions);
        self.visible = Some(visible.to_string());
        self.frozen = freeze;
    }

    /// The cached coordinates.
    pub fn positions(&self) -> Option<&Positions> {
        self.positions.as_ref()
    }

    /// Returns [true] if the cached coordinates are pinned.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The last description handed out.
    pub fn last(&self) -> Option<&GraphDescription> {
        self.last.as_ref()
    }

    pub(crate) fn remember(&mut self, graph: GraphDescription) {
        self.last = Some(graph);
    }

    /// Forgets everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::Point;
    use test_log::test;

    fn positions() -> Positions {
        [("a".to_string(), Point::new(0.0, 0.0))].into_iter().collect()
    }

    #[test]
    fn policy() {
        let mut state = RenderState::new();
        assert_eq!(state.plan(1, "x", false), Plan::Compute);
        state.store_layout(positions(), "x", false);
        assert_eq!(state.plan(1, "x", false), Plan::Reuse);
        assert_eq!(state.plan(1, "y", false), Plan::Compute);
        state.store_layout(positions(), "y", false);
        assert_eq!(state.plan(1, "z", true), Plan::Reuse);
        assert!(state.is_frozen());
        assert_eq!(state.plan(1, "w", true), Plan::Reuse);
        assert_eq!(state.plan(2, "w", true), Plan::Compute);
        assert!(state.positions().is_none());
        assert!(!state.is_frozen());
        state.store_layout(positions(), "w", true);
        assert!(state.is_frozen());
        assert_eq!(state.plan(2, "w", false), Plan::Reuse);
        assert!(!state.is_frozen());
        state.reset();
        assert_eq!(state.plan(2, "w", false), Plan::Compute);
    }
}
