//! This crate fills crossword grids from a vocabulary.
//! Each slot of the grid is a variable, each crossing is a constraint.

pub mod crossword;

mod consistency;
mod domain;
mod error;
mod model;
mod search;

use std::collections::BTreeMap;
use std::fmt;
use std::ops;

pub use crossword::Crossword;
pub use error::Error;
pub use model::PuzzleModel;
pub use search::{solve, Search, Solver};

/// The direction a slot is read in.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Direction {
    Across,
    Down,
}

/// A puzzle variable: a run of fillable cells.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

/// The character offsets at which two crossing slots share a cell.
pub type Overlap = (usize, usize);

/// A result during a puzzle solution search (Err = contradiction).
pub type PsResult<T> = Result<T, Error>;

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Self {
        Slot {
            row,
            col,
            direction,
            length,
        }
    }

    /// The (row, col) of every cell covered by the slot, in reading order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(move |k| match self.direction {
            Direction::Across => (self.row, self.col + k),
            Direction::Down => (self.row + k, self.col),
        })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        write!(
            f,
            "{} ({}) at ({}, {})",
            direction, self.length, self.row, self.col
        )
    }
}

/// A dictionary mapping slots to the words placed in them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Assignment {
    words: BTreeMap<Slot, String>,
}

impl Assignment {
    pub fn get(&self, slot: &Slot) -> Option<&str> {
        self.words.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over the placed words in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &str)> {
        self.words.iter().map(|(slot, word)| (slot, word.as_str()))
    }

    pub(crate) fn insert(&mut self, slot: Slot, word: String) {
        self.words.insert(slot, word);
    }
}

impl ops::Index<&Slot> for Assignment {
    type Output = str;

    /// Get the word placed in a slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot has not been assigned.
    fn index(&self, slot: &Slot) -> &str {
        match self.words.get(slot) {
            Some(word) => word,
            None => panic!("unassigned"),
        }
    }
}
