//! Transaction stack implementation

use crate::overlay::Overlay;

use super::TransactionEntry;

/// One BEGIN…COMMIT/ROLLBACK unit, entries in insertion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scope {
    entries: Vec<TransactionEntry>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TransactionEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TransactionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a committed child's entries after this scope's own
    ///
    /// Unwinding the merged scope later undoes the child's work first,
    /// exactly as unwinding both scopes one after the other would.
    pub fn absorb(&mut self, child: Scope) {
        self.entries.extend(child.entries);
    }

    /// Undo every entry, most recent first
    ///
    /// Afterwards the overlay is identical to what it was when the scope
    /// was pushed.
    pub fn unwind(self, overlay: &mut Overlay) {
        for entry in self.entries.into_iter().rev() {
            overlay.restore(entry.key(), entry.prior_overlay());
        }
    }
}

/// Open scopes, outermost first
#[derive(Debug, Default)]
pub struct TransactionStack {
    scopes: Vec<Scope>,
}

impl TransactionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new empty innermost scope
    pub fn begin(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// The innermost scope
    pub fn current_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// Remove and return the innermost scope
    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// All open scopes, outermost first
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}
