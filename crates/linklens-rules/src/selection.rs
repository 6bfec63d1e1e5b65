//! Rule list selection state machine
//!
//! ```text
//! SingleSelect
//!   ↓ explicit trigger (long press / toggle)
//! MultiSelect
//!   ↓ bulk delete or exit
//! SingleSelect
//! ```
//!
//! Positions are resolved to stable rule ids before any bulk operation, so
//! deletions stay correct no matter the order items leave the list.

use std::collections::BTreeSet;
use uuid::Uuid;

use crate::manager::UserRuleManager;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// One item at a time: tap edits, no checkboxes
    SingleSelect,
    /// Bulk operations over a selection set
    MultiSelect,
}

#[derive(Debug)]
pub struct SelectionState {
    mode: SelectionMode,
    selected: BTreeSet<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::SingleSelect,
            selected: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_multi_select(&self) -> bool {
        self.mode == SelectionMode::MultiSelect
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.selected.contains(&position)
    }

    /// Enter multi-select mode, clearing any prior selection.
    pub fn enter_multi_select(&mut self) {
        self.mode = SelectionMode::MultiSelect;
        self.selected.clear();
    }

    /// Leave multi-select without acting on the selection.
    pub fn exit_multi_select(&mut self) {
        self.mode = SelectionMode::SingleSelect;
        self.selected.clear();
    }

    /// Flip one position in or out of the selection set. No-op outside
    /// multi-select mode.
    pub fn toggle(&mut self, position: usize) {
        if self.mode != SelectionMode::MultiSelect {
            return;
        }
        if !self.selected.remove(&position) {
            self.selected.insert(position);
        }
    }

    /// Select every position when not everything is selected, otherwise
    /// clear the selection.
    pub fn toggle_select_all(&mut self, len: usize) {
        if self.mode != SelectionMode::MultiSelect {
            return;
        }
        if self.selected.len() == len && len > 0 {
            self.selected.clear();
        } else {
            self.selected = (0..len).collect();
        }
    }

    /// Delete the selected rules from `manager` and return to single-select.
    ///
    /// Selected positions are mapped to rule ids up front; out-of-range
    /// positions are dropped. Returns how many rules were removed.
    pub fn delete_selected(&mut self, manager: &mut UserRuleManager) -> Result<usize> {
        let ids: Vec<Uuid> = self
            .selected
            .iter()
            .rev()
            .filter_map(|&pos| manager.rules().get(pos))
            .map(|r| r.id)
            .collect();

        let removed = manager.delete_many(&ids)?;
        self.exit_multi_select();
        Ok(removed)
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}
