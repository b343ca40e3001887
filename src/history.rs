//! Undo stack of serialized scenario-list snapshots.
//!
//! Snapshots are stored as JSON text so that a restored list shares nothing
//! with the live one. Only destructive actions push; there is no redo.

use crate::debug_log;
use crate::error::Result;
use crate::model::Scenario;

#[derive(Debug, Default, Clone)]
pub struct History {
    snapshots: Vec<String>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history that keeps at most `limit` snapshots, dropping the oldest.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            snapshots: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, scenarios: &[Scenario]) -> Result<()> {
        let snapshot = serde_json::to_string(scenarios)?;
        self.snapshots.push(snapshot);
        if let Some(limit) = self.limit
            && self.snapshots.len() > limit
        {
            let excess = self.snapshots.len() - limit;
            self.snapshots.drain(..excess);
        }
        debug_log!("history push, depth now {}", self.snapshots.len());
        Ok(())
    }

    /// Pops the most recent snapshot. `Ok(None)` when nothing was saved.
    pub fn pop(&mut self) -> Result<Option<Vec<Scenario>>> {
        let Some(snapshot) = self.snapshots.pop() else {
            return Ok(None);
        };
        let scenarios = serde_json::from_str(&snapshot)?;
        debug_log!("history pop, depth now {}", self.snapshots.len());
        Ok(Some(scenarios))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
