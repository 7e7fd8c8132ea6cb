//! Core, non-public data structures for the container.

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

/// A type-erased, shared service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

/// Which record under an identifier is being built: the single registration
/// or one member of its `multiple` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
  Single,
  Member(usize),
}

#[derive(Clone, PartialEq, Eq)]
struct Pending {
  owner: usize,
  id: Identifier,
  slot: Slot,
}

impl Pending {
  fn describe(&self) -> String {
    match self.slot {
      Slot::Single => self.id.to_string(),
      Slot::Member(position) => format!("{}[{}]", self.id, position),
    }
  }
}

thread_local! {
  // The services currently under construction on this thread, tagged with the
  // address of the container building them. Order is kept for error reports.
  static RESOLVING_STACK: RefCell<Vec<Pending>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard to detect circular dependencies.
///
/// Entering pushes the identifier onto the thread-local resolution stack. If
/// the same container is already building that identifier, the dependency
/// graph has a cycle and an error describing the chain is returned instead.
/// Dropping the guard pops the entry again.
pub(crate) struct ResolutionGuard {
  pending: Pending,
}

impl ResolutionGuard {
  pub(crate) fn enter(owner: usize, id: &Identifier, slot: Slot) -> Result<Self> {
    let pending = Pending {
      owner,
      id: id.clone(),
      slot,
    };

    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let cycle_start = stack.iter().position(|entry| *entry == pending);

      if let Some(start) = cycle_start {
        let chain = stack[start..]
          .iter()
          .filter(|entry| entry.owner == owner)
          .map(Pending::describe)
          .chain(std::iter::once(pending.describe()))
          .collect::<Vec<_>>()
          .join(" -> ");
        return Err(Error::CircularDependency(chain));
      }

      stack.push(pending.clone());
      Ok(())
    })?;

    Ok(Self { pending })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      // Guards drop in reverse order, so the entry is normally on top.
      if let Some(index) = stack.iter().rposition(|entry| *entry == self.pending) {
        stack.remove(index);
      }
    });
  }
}
