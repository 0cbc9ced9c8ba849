//! Staged transactions
//!
//! A transaction is a frame of buffered inserts, updates and deletes that
//! has not reached the row store yet. Frames stack: `begin` pushes one,
//! `commit` applies the top frame and pops it, `rollback` pops it without
//! applying anything. Commit is per frame, so an outer frame stays open
//! after an inner one commits.

use crate::error::{Error, Result};
use crate::storage::RowStore;
use crate::types::Row;
use serde::{Deserialize, Serialize};

/// Whether any frame is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    /// No open frame; writes must go directly to the row store
    Idle,
    /// One or more stacked frames
    Open,
}

/// Buffered operations of one transaction frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFrame {
    /// New rows, applied in staging order
    pub inserts: Vec<Row>,
    /// Replacement rows by position
    pub updates: Vec<(usize, Row)>,
    /// Positions to remove
    pub deletes: Vec<usize>,
}

impl TransactionFrame {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }

    /// Checks the whole frame against the current store, so that applying it
    /// cannot fail halfway. Updates and deletes may target rows this frame
    /// inserts, since inserts are applied first.
    fn validate(&self, store: &RowStore) -> Result<()> {
        for row in &self.inserts {
            store.validate(row)?;
        }
        let len_after_inserts = store.len() + self.inserts.len();
        for (position, row) in &self.updates {
            if *position >= len_after_inserts {
                return Err(Error::RowNotFound(*position));
            }
            store.validate(row)?;
        }
        if let Some(&position) = self.deletes.iter().find(|&&p| p >= len_after_inserts) {
            return Err(Error::RowNotFound(position));
        }
        Ok(())
    }
}

/// Counts of what a commit applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// The stack of open frames of one table
#[derive(Debug, Clone, Default)]
pub struct TransactionStack {
    frames: Vec<TransactionFrame>,
}

impl TransactionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransactionState {
        if self.frames.is_empty() {
            TransactionState::Idle
        } else {
            TransactionState::Open
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pushes an empty frame and returns the new depth.
    pub fn begin(&mut self) -> usize {
        self.frames.push(TransactionFrame::default());
        self.frames.len()
    }

    fn top_mut(&mut self) -> Result<&mut TransactionFrame> {
        self.frames.last_mut().ok_or(Error::NoActiveTransaction)
    }

    /// The innermost open frame.
    pub fn top(&self) -> Result<&TransactionFrame> {
        self.frames.last().ok_or(Error::NoActiveTransaction)
    }

    pub fn stage_insert(&mut self, row: Row) -> Result<()> {
        self.top_mut()?.inserts.push(row);
        Ok(())
    }

    pub fn stage_update(&mut self, position: usize, row: Row) -> Result<()> {
        self.top_mut()?.updates.push((position, row));
        Ok(())
    }

    pub fn stage_delete(&mut self, position: usize) -> Result<()> {
        self.top_mut()?.deletes.push(position);
        Ok(())
    }

    /// Applies the top frame to the store and pops it: inserts in staging
    /// order, then updates, then deletes from the highest position down.
    /// If the frame does not fit the store it stays on the stack and the
    /// store is left as it was.
    pub fn commit(&mut self, store: &mut RowStore) -> Result<CommitSummary> {
        self.top()?.validate(store)?;
        let frame = self.frames.pop().ok_or(Error::NoActiveTransaction)?;

        let mut summary = CommitSummary::default();
        for row in frame.inserts {
            store.insert(row)?;
            summary.inserted += 1;
        }
        for (position, row) in frame.updates {
            store.update(position, row)?;
            summary.updated += 1;
        }
        summary.deleted = store.delete_positions(frame.deletes)?;
        Ok(summary)
    }

    /// Pops the top frame without applying it.
    pub fn rollback(&mut self) -> Result<TransactionFrame> {
        self.frames.pop().ok_or(Error::NoActiveTransaction)
    }
}
