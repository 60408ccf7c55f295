//! Stable group ids for solutions.
//!
//! A renderer colours each solution by its group id, so ids must not
//! shuffle between ticks. A solution found again (same canonical key) keeps
//! its id; ids of solutions that disappeared are freed before any new
//! solution is given one, and the smallest freed id is reused first.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::solver::Solution;

/// Identifier for one accepted solution, stable while the solution persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Group({})", self.0)
    }
}

/// Hands out group ids: freed ids first (smallest first), then fresh ones.
#[derive(Clone, Debug, Default)]
pub struct GroupIdAllocator {
    free: BTreeSet<GroupId>,
    next: u32,
}

impl GroupIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> GroupId {
        if let Some(id) = self.free.pop_first() {
            return id;
        }
        let id = GroupId(self.next);
        self.next += 1;
        id
    }

    pub fn release(&mut self, id: GroupId) {
        debug_assert!(id.0 < self.next, "{id} was never allocated");
        let fresh = self.free.insert(id);
        debug_assert!(fresh, "{id} released twice");
    }

    /// Ids currently handed out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.next as usize - self.free.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A solution with its id for this tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub solution: Solution,
}

/// Current groups, keyed by solution key across ticks.
#[derive(Clone, Debug, Default)]
pub struct GroupTable {
    allocator: GroupIdAllocator,
    by_key: FxHashMap<String, GroupId>,
    groups: Vec<Group>,
}

impl GroupTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current groups with this tick's solutions.
    ///
    /// Returns the new groups ordered by id.
    pub fn update(&mut self, solutions: Vec<Solution>) -> &[Group] {
        let mut previous = std::mem::take(&mut self.by_key);
        let mut groups = Vec::with_capacity(solutions.len());
        let mut fresh = Vec::new();

        for solution in solutions {
            match previous.remove(solution.key()) {
                Some(id) => groups.push(Group { id, solution }),
                None => fresh.push(solution),
            }
        }

        for (_, id) in previous {
            self.allocator.release(id);
        }

        for solution in fresh {
            if groups.iter().any(|g: &Group| g.solution.key() == solution.key()) {
                continue;
            }
            let id = self.allocator.allocate();
            groups.push(Group { id, solution });
        }

        groups.sort_by_key(|g| g.id);
        self.by_key = groups
            .iter()
            .map(|g| (g.solution.key().to_owned(), g.id))
            .collect();
        self.groups = groups;
        &self.groups
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    #[must_use]
    pub fn id_for_key(&self, key: &str) -> Option<GroupId> {
        self.by_key.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.allocator.reset();
        self.by_key.clear();
        self.groups.clear();
    }
}
