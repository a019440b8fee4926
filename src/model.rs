//! The puzzle as seen by the solver.

use std::collections::{BTreeSet, HashMap};

use crate::{Overlap, Slot};

/// The structure and vocabulary of a puzzle.
///
/// Implementations must keep `overlap` symmetric: if `overlap(a, b)` is
/// `Some((i, j))` then `overlap(b, a)` is `Some((j, i))`, and `neighbors(a)`
/// yields exactly the slots that overlap `a`.
pub trait PuzzleModel {
    /// All of the slots, in a stable order.
    fn variables<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Slot> + 'a>;

    /// The slots that cross the given slot.
    fn neighbors<'a>(&'a self, slot: &Slot) -> Box<dyn Iterator<Item = &'a Slot> + 'a>;

    /// The offsets into `a` and `b` of their shared cell, if any.
    fn overlap(&self, a: &Slot, b: &Slot) -> Option<Overlap>;

    /// The candidate words.
    fn vocabulary<'a>(&'a self) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

/// A candidate word, split into characters for offset lookups.
#[derive(Debug)]
pub(crate) struct Word {
    pub(crate) text: String,
    pub(crate) letters: Vec<char>,
}

impl Word {
    fn new(text: &str) -> Self {
        Word {
            text: text.to_string(),
            letters: text.chars().collect(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.letters.len()
    }
}

/// Dense snapshot of a puzzle model.  Slots and words are referred to by
/// index from here on.
#[derive(Debug)]
pub(crate) struct Problem {
    pub(crate) slots: Vec<Slot>,
    index: HashMap<Slot, usize>,

    // For every slot, its neighbors and the overlap (own offset first).
    pub(crate) neighbors: Vec<Vec<(usize, Overlap)>>,

    // Index of each slot's first arc in a flat numbering of all arcs.
    arc_start: Vec<usize>,

    pub(crate) words: Vec<Word>,
}

impl Problem {
    pub(crate) fn new<P: PuzzleModel + ?Sized>(puzzle: &P) -> Self {
        let mut slots = Vec::new();
        let mut index = HashMap::new();
        for &slot in puzzle.variables() {
            if !index.contains_key(&slot) {
                index.insert(slot, slots.len());
                slots.push(slot);
            }
        }

        let mut neighbors = vec![Vec::new(); slots.len()];
        for (x, slot) in slots.iter().enumerate() {
            for other in puzzle.neighbors(slot) {
                let y = match index.get(other) {
                    Some(&y) if y != x => y,
                    _ => continue,
                };
                if neighbors[x].iter().any(|&(z, _)| z == y) {
                    continue;
                }

                let overlap = match puzzle.overlap(slot, other) {
                    Some(overlap) => overlap,
                    None => continue,
                };
                debug_assert_eq!(
                    puzzle.overlap(other, slot),
                    Some((overlap.1, overlap.0)),
                    "asymmetric overlap between {} and {}",
                    slot,
                    other
                );
                debug_assert!(overlap.0 < slot.length && overlap.1 < other.length);

                neighbors[x].push((y, overlap));
            }
        }

        let mut arc_start = Vec::with_capacity(slots.len() + 1);
        let mut num_arcs = 0;
        for ns in neighbors.iter() {
            arc_start.push(num_arcs);
            num_arcs += ns.len();
        }
        arc_start.push(num_arcs);

        let vocabulary: BTreeSet<&str> = puzzle.vocabulary().collect();
        let words = vocabulary.into_iter().map(Word::new).collect();

        Problem {
            slots,
            index,
            neighbors,
            arc_start,
            words,
        }
    }

    #[inline]
    pub(crate) fn num_slots(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn num_words(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn slot_index(&self, slot: &Slot) -> Option<usize> {
        self.index.get(slot).copied()
    }

    pub(crate) fn overlap(&self, x: usize, y: usize) -> Option<Overlap> {
        self.neighbors[x]
            .iter()
            .find(|&&(z, _)| z == y)
            .map(|&(_, overlap)| overlap)
    }

    /// The number of ordered pairs of overlapping slots.
    #[inline]
    pub(crate) fn num_arcs(&self) -> usize {
        self.arc_start.last().copied().unwrap_or(0)
    }

    /// A dense id for the arc `(x, y)`, if the slots overlap.
    pub(crate) fn arc_id(&self, x: usize, y: usize) -> Option<usize> {
        self.neighbors[x]
            .iter()
            .position(|&(z, _)| z == y)
            .map(|k| self.arc_start[x] + k)
    }

    #[inline]
    pub(crate) fn degree(&self, x: usize) -> usize {
        self.neighbors[x].len()
    }

    /// Every ordered pair of overlapping slots.
    pub(crate) fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(x, ns)| ns.iter().map(move |&(y, _)| (x, y)))
    }

    /// Do two words agree on the cell shared by their slots?
    #[inline]
    pub(crate) fn agree(&self, overlap: Overlap, wx: usize, wy: usize) -> bool {
        let (i, j) = overlap;
        match (self.words[wx].letters.get(i), self.words[wy].letters.get(j)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
