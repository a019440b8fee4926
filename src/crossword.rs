//! A crossword grid and word list read from text.
//!
//! The structure has one line per row: `_` is a cell to fill, anything
//! else is blocked.  Short rows are padded with blocked cells.  The word
//! list has one word per line.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use crate::{Assignment, Direction, Error, Overlap, PsResult, PuzzleModel, Slot};

/// A crossword puzzle.
#[derive(Clone, Debug)]
pub struct Crossword {
    width: usize,
    height: usize,
    structure: Vec<Vec<bool>>,
    words: BTreeSet<String>,
    variables: Vec<Slot>,
    overlaps: HashMap<(Slot, Slot), Overlap>,
}

impl Crossword {
    /// Build a puzzle from the text of a structure and of a word list.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossword_csp::{Crossword, PuzzleModel};
    ///
    /// let puzzle = Crossword::new("#___\n#_##", "cat\nox").expect("puzzle");
    /// assert_eq!(puzzle.width(), 4);
    /// assert_eq!(puzzle.variables().count(), 2);
    /// ```
    pub fn new(structure: &str, words: &str) -> PsResult<Self> {
        let rows = structure
            .lines()
            .map(|line| line.chars().map(|c| c == '_').collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let height = rows.len();
        if height == 0 {
            return Err(Error::EmptyStructure);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let structure = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, false);
                row
            })
            .collect::<Vec<_>>();

        let words = words
            .lines()
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(str::to_uppercase)
            .collect();

        let mut crossword = Crossword {
            width,
            height,
            structure,
            words,
            variables: Vec::new(),
            overlaps: HashMap::new(),
        };
        crossword.variables = crossword.find_slots();
        crossword.overlaps = crossword.find_overlaps();
        Ok(crossword)
    }

    /// Build a puzzle from a structure file and a word list file.
    pub fn from_files<P, Q>(structure: P, words: Q) -> PsResult<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let structure = fs::read_to_string(structure)?;
        let words = fs::read_to_string(words)?;
        Crossword::new(&structure, &words)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Is the cell part of the grid to fill?  Cells outside the grid are
    /// blocked.
    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        self.structure
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// The word list, upper-cased.
    pub fn words(&self) -> &BTreeSet<String> {
        &self.words
    }

    /// The letters of an assignment laid out on the grid.
    pub fn letter_grid(&self, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
        let mut letters = vec![vec![None; self.width]; self.height];
        for (slot, word) in assignment.iter() {
            for ((row, col), c) in slot.cells().zip(word.chars()) {
                if let Some(cell) = letters.get_mut(row).and_then(|r| r.get_mut(col)) {
                    *cell = Some(c);
                }
            }
        }
        letters
    }

    /// Draw an assignment as text, one line per row.  Blocked cells are
    /// drawn as `█`, empty cells as a space.
    pub fn render(&self, assignment: &Assignment) -> String {
        let letters = self.letter_grid(assignment);
        let mut out = String::with_capacity(self.height * (self.width * 3 + 1));
        for (row, cells) in letters.iter().enumerate() {
            for (col, letter) in cells.iter().enumerate() {
                if self.is_fillable(row, col) {
                    out.push(letter.unwrap_or(' '));
                } else {
                    out.push('█');
                }
            }
            out.push('\n');
        }
        out
    }

    /// Maximal runs of at least two fillable cells, row by row.
    fn find_slots(&self) -> Vec<Slot> {
        let mut slots = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                if !self.is_fillable(row, col) {
                    continue;
                }

                if col == 0 || !self.is_fillable(row, col - 1) {
                    let length = (col..self.width)
                        .take_while(|&c| self.is_fillable(row, c))
                        .count();
                    if length > 1 {
                        slots.push(Slot::new(row, col, Direction::Across, length));
                    }
                }

                if row == 0 || !self.is_fillable(row - 1, col) {
                    let length = (row..self.height)
                        .take_while(|&r| self.is_fillable(r, col))
                        .count();
                    if length > 1 {
                        slots.push(Slot::new(row, col, Direction::Down, length));
                    }
                }
            }
        }
        slots
    }

    fn find_overlaps(&self) -> HashMap<(Slot, Slot), Overlap> {
        let mut cells: HashMap<(usize, usize), Vec<(Slot, usize)>> = HashMap::new();
        for &slot in self.variables.iter() {
            for (offset, cell) in slot.cells().enumerate() {
                cells.entry(cell).or_default().push((slot, offset));
            }
        }

        let mut overlaps = HashMap::new();
        for sharing in cells.values() {
            for &(a, i) in sharing.iter() {
                for &(b, j) in sharing.iter() {
                    if a != b {
                        overlaps.insert((a, b), (i, j));
                    }
                }
            }
        }
        overlaps
    }
}

impl PuzzleModel for Crossword {
    fn variables<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Slot> + 'a> {
        Box::new(self.variables.iter())
    }

    fn neighbors<'a>(&'a self, slot: &Slot) -> Box<dyn Iterator<Item = &'a Slot> + 'a> {
        let slot = *slot;
        Box::new(
            self.variables
                .iter()
                .filter(move |other| self.overlaps.contains_key(&(slot, **other))),
        )
    }

    fn overlap(&self, a: &Slot, b: &Slot) -> Option<Overlap> {
        self.overlaps.get(&(*a, *b)).copied()
    }

    fn vocabulary<'a>(&'a self) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(self.words.iter().map(String::as_str))
    }
}
