//! Node and arc consistency.

use bit_set::BitSet;
use log::trace;
use std::collections::{HashSet, VecDeque};

use crate::search::Search;
use crate::{Error, PsResult};

impl Search<'_> {
    /// Remove every word whose length differs from its slot's length.
    pub(crate) fn enforce_node_consistency(&mut self) {
        let problem = self.problem;
        for (x, slot) in problem.slots.iter().enumerate() {
            self.domains
                .retain(x, |w| problem.words[w].len() == slot.length);
        }
    }

    /// Make slot `x` arc consistent with slot `y`: drop every candidate of
    /// `x` that no candidate of `y` agrees with on their shared cell.
    ///
    /// Returns whether the domain of `x` changed.
    pub(crate) fn revise(&mut self, x: usize, y: usize) -> bool {
        let problem = self.problem;
        let (i, j) = match problem.overlap(x, y) {
            Some(overlap) => overlap,
            None => return false,
        };

        let letters = self
            .domains
            .iter(y)
            .filter_map(|v| problem.words[v].letters.get(j).copied())
            .collect::<HashSet<char>>();

        self.domains.retain(x, |w| {
            problem.words[w]
                .letters
                .get(i)
                .map_or(false, |c| letters.contains(c))
        })
    }

    /// AC-3 over every arc of the puzzle.
    pub(crate) fn ac3(&mut self) -> PsResult<()> {
        let problem = self.problem;
        self.ac3_with(problem.arcs())
    }

    /// AC-3 starting from the given arcs.  Fails as soon as any slot is
    /// left without candidates.
    pub(crate) fn ac3_with<I>(&mut self, arcs: I) -> PsResult<()>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let problem = self.problem;
        if let Some(x) = self.domains.first_empty() {
            return Err(Error::UnsatisfiableDomain(problem.slots[x]));
        }

        // Arcs between slots that don't overlap constrain nothing.
        let mut queue = VecDeque::new();
        let mut queued = BitSet::with_capacity(problem.num_arcs());
        for (x, y) in arcs {
            if let Some(id) = problem.arc_id(x, y) {
                if queued.insert(id) {
                    queue.push_back((x, y, id));
                }
            }
        }

        while let Some((x, y, id)) = queue.pop_front() {
            queued.remove(id);

            if !self.revise(x, y) {
                continue;
            }

            if self.domains.is_empty(x) {
                trace!("ac3: {} emptied by {}", problem.slots[x], problem.slots[y]);
                return Err(Error::UnsatisfiableDomain(problem.slots[x]));
            }

            for &(z, _) in problem.neighbors[x].iter() {
                if z == y {
                    continue;
                }
                if let Some(id) = problem.arc_id(z, x) {
                    if queued.insert(id) {
                        queue.push_back((z, x, id));
                    }
                }
            }
        }

        Ok(())
    }
}
