//! The solver and its intermediate search state.

use bit_set::BitSet;
use log::{debug, trace};
use std::cell::Cell;
use std::cmp::Reverse;
use std::fmt;
use std::iter;

use crate::domain::Domains;
use crate::model::{Problem, PuzzleModel};
use crate::{Assignment, Error, PsResult, Slot};

/// A puzzle ready to be solved.
pub struct Solver {
    problem: Problem,

    // The number of guesses taken by the last search.
    num_guesses: Cell<u32>,
}

/// Intermediate puzzle search state: the candidate words of every slot.
#[derive(Clone)]
pub struct Search<'a> {
    pub(crate) problem: &'a Problem,
    pub(crate) domains: Domains,
}

/// The words placed so far.
struct Partial {
    words: Vec<Option<usize>>,
    used: BitSet,
    count: usize,
}

/// A slot whose candidates are being tried.
struct Frame {
    slot: usize,
    order: Vec<usize>,
    next: usize,

    // The domains before the slot was assigned.
    domains: Domains,
}

/// Solve a puzzle.
///
/// # Examples
///
/// ```
/// let puzzle = crossword_csp::Crossword::new("___", "cat\ndog").expect("puzzle");
/// let solution = crossword_csp::solve(&puzzle).expect("solution");
/// assert_eq!(solution.len(), 1);
/// ```
pub fn solve<P: PuzzleModel + ?Sized>(puzzle: &P) -> PsResult<Assignment> {
    Solver::new(puzzle).solve()
}

/*--------------------------------------------------------------*/

impl Solver {
    pub fn new<P: PuzzleModel + ?Sized>(puzzle: &P) -> Self {
        Solver {
            problem: Problem::new(puzzle),
            num_guesses: Cell::new(0),
        }
    }

    /// Find a solution to the puzzle.
    ///
    /// Fails with `UnsatisfiableDomain` when consistency alone rules
    /// every word out of some slot, and with `NoSolution` when the
    /// search is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossword_csp::{Crossword, Error, Solver};
    ///
    /// let puzzle = Crossword::new("____", "cat\ndog").expect("puzzle");
    /// let solver = Solver::new(&puzzle);
    /// assert!(matches!(solver.solve(), Err(Error::UnsatisfiableDomain(_))));
    /// assert_eq!(solver.num_guesses(), 0);
    /// ```
    pub fn solve(&self) -> PsResult<Assignment> {
        self.num_guesses.set(0);

        let mut search = Search::new(&self.problem);
        search.constrain()?;

        let result = search.backtrack(&self.num_guesses);
        debug!(
            "search finished after {} guesses: {}",
            self.num_guesses.get(),
            if result.is_ok() { "solved" } else { "no solution" }
        );
        result
    }

    /// Enforce node and arc consistency without guessing.
    /// Primarily for testing.
    pub fn step(&self) -> PsResult<Search<'_>> {
        let mut search = Search::new(&self.problem);
        search.constrain()?;
        Ok(search)
    }

    /// Get the number of guesses taken to solve the last puzzle.
    pub fn num_guesses(&self) -> u32 {
        self.num_guesses.get()
    }
}

/*--------------------------------------------------------------*/

impl Partial {
    fn new(num_slots: usize) -> Self {
        Partial {
            words: vec![None; num_slots],
            used: BitSet::new(),
            count: 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.count == self.words.len()
    }

    fn place(&mut self, slot: usize, word: usize) {
        debug_assert!(self.words[slot].is_none());
        self.words[slot] = Some(word);
        self.used.insert(word);
        self.count += 1;
    }

    fn unplace(&mut self, slot: usize) {
        if let Some(word) = self.words[slot].take() {
            self.used.remove(word);
            self.count -= 1;
        }
    }
}

impl Frame {
    fn next_candidate(&mut self) -> Option<usize> {
        let word = self.order.get(self.next).copied();
        self.next += 1;
        word
    }
}

/*--------------------------------------------------------------*/

impl<'a> Search<'a> {
    pub(crate) fn new(problem: &'a Problem) -> Self {
        Search {
            problem,
            domains: Domains::full(problem.num_slots(), problem.num_words()),
        }
    }

    /// Get an iterator over the candidate words of a slot.
    pub fn candidates(&self, slot: &Slot) -> Box<dyn Iterator<Item = &str> + '_> {
        match self.problem.slot_index(slot) {
            Some(x) => Box::new(
                self.domains
                    .iter(x)
                    .map(move |w| self.problem.words[w].text.as_str()),
            ),
            None => Box::new(iter::empty()),
        }
    }

    /// Count the candidate words of a slot.
    pub fn num_candidates(&self, slot: &Slot) -> usize {
        self.problem
            .slot_index(slot)
            .map_or(0, |x| self.domains.len(x))
    }

    /// Node consistency, then arc consistency over the whole puzzle.
    pub(crate) fn constrain(&mut self) -> PsResult<()> {
        self.enforce_node_consistency();
        self.ac3()?;

        debug!(
            "consistent: {} slots, {} words, {} candidates left",
            self.problem.num_slots(),
            self.problem.num_words(),
            (0..self.problem.num_slots())
                .map(|x| self.domains.len(x))
                .sum::<usize>()
        );
        Ok(())
    }

    /// Pick the unassigned slot with the fewest candidates, preferring
    /// the one with the most neighbors.
    fn select_unassigned(&self, partial: &Partial) -> Option<usize> {
        (0..self.problem.num_slots())
            .filter(|&x| partial.words[x].is_none())
            .min_by_key(|&x| (self.domains.len(x), Reverse(self.problem.degree(x))))
    }

    /// The candidates of a slot, least constraining first: words are
    /// ranked by how many neighbor candidates they would rule out.
    fn order_domain_values(&self, x: usize) -> Vec<usize> {
        let problem = self.problem;
        let mut ranked = self
            .domains
            .iter(x)
            .map(|w| {
                let ruled_out = problem.neighbors[x]
                    .iter()
                    .map(|&(y, overlap)| {
                        self.domains
                            .iter(y)
                            .map(|v| !problem.agree(overlap, w, v) as usize)
                            .sum::<usize>()
                    })
                    .sum::<usize>();
                (ruled_out, w)
            })
            .collect::<Vec<_>>();

        ranked.sort_by_key(|&(ruled_out, _)| ruled_out);
        ranked.into_iter().map(|(_, w)| w).collect()
    }

    /// Can `w` go into slot `x` given the words placed so far?
    fn consistent(&self, partial: &Partial, x: usize, w: usize) -> bool {
        let problem = self.problem;
        if problem.words[w].len() != problem.slots[x].length || partial.used.contains(w) {
            return false;
        }

        problem.neighbors[x]
            .iter()
            .all(|&(y, overlap)| match partial.words[y] {
                Some(v) => problem.agree(overlap, w, v),
                None => true,
            })
    }

    /// Depth-first search over assignments, keeping one frame per
    /// assigned slot on an explicit stack.
    fn backtrack(mut self, num_guesses: &Cell<u32>) -> PsResult<Assignment> {
        let problem = self.problem;
        let mut partial = Partial::new(problem.num_slots());
        let mut stack: Vec<Frame> = Vec::with_capacity(problem.num_slots());

        loop {
            if partial.is_complete() {
                return Ok(self.assignment(&partial));
            }

            let x = match self.select_unassigned(&partial) {
                Some(x) => x,
                None => return Err(Error::NoSolution),
            };

            stack.push(Frame {
                slot: x,
                order: self.order_domain_values(x),
                next: 0,
                domains: self.domains.clone(),
            });

            loop {
                let frame = match stack.last_mut() {
                    Some(frame) => frame,
                    None => return Err(Error::NoSolution),
                };

                let x = frame.slot;
                let w = match frame.next_candidate() {
                    Some(w) => w,
                    None => {
                        // Dead end: undo the parent's word and move on to
                        // its next candidate.
                        stack.pop();
                        if let Some(parent) = stack.last() {
                            trace!("backtrack from {}", problem.slots[x]);
                            partial.unplace(parent.slot);
                        }
                        continue;
                    }
                };

                if !self.consistent(&partial, x, w) {
                    continue;
                }

                num_guesses.set(num_guesses.get() + 1);
                trace!("guess {} = {}", problem.slots[x], problem.words[w].text);

                let mut branch = Search {
                    problem,
                    domains: frame.domains.clone(),
                };
                branch.domains.set_word(x, w);
                if branch
                    .ac3_with(problem.neighbors[x].iter().map(|&(z, _)| (z, x)))
                    .is_err()
                {
                    continue;
                }

                partial.place(x, w);
                self.domains = branch.domains;
                break;
            }
        }
    }

    fn assignment(&self, partial: &Partial) -> Assignment {
        let mut assignment = Assignment::default();
        for (x, word) in partial.words.iter().enumerate() {
            if let Some(w) = *word {
                assignment.insert(self.problem.slots[x], self.problem.words[w].text.clone());
            }
        }
        assignment
    }
}

impl fmt::Debug for Search<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "Search={{")?;
        for (x, slot) in self.problem.slots.iter().enumerate() {
            writeln!(f)?;
            write!(f, "  {}:", slot)?;
            for w in self.domains.iter(x) {
                write!(f, " {}", self.problem.words[w].text)?;
            }
        }
        write!(f, "}}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Partial, Search};
    use crate::model::Problem;
    use crate::{Crossword, Direction, Slot, Solver};

    fn make_problem(structure: &str, words: &str) -> Problem {
        let puzzle = Crossword::new(structure, words).expect("puzzle");
        Problem::new(&puzzle)
    }

    fn index(problem: &Problem, slot: Slot) -> usize {
        problem.slot_index(&slot).expect("slot")
    }

    fn texts(problem: &Problem, words: Vec<usize>) -> Vec<&str> {
        words
            .into_iter()
            .map(|w| problem.words[w].text.as_str())
            .collect()
    }

    #[test]
    fn test_no_vars() {
        let puzzle = Crossword::new("#_#", "cat").expect("puzzle");
        let solver = Solver::new(&puzzle);
        assert!(solver.solve().expect("solution").is_empty());
        assert!(solver.step().is_ok());
        assert_eq!(solver.num_guesses(), 0);
    }

    #[test]
    fn test_select_fewest_candidates() {
        let problem = make_problem("___#__", "cat\ndog\neel\nox\n");
        let mut search = Search::new(&problem);
        search.enforce_node_consistency();

        let long = index(&problem, Slot::new(0, 0, Direction::Across, 3));
        let short = index(&problem, Slot::new(0, 4, Direction::Across, 2));
        assert_eq!(search.domains.len(long), 3);
        assert_eq!(search.domains.len(short), 1);

        let mut partial = Partial::new(problem.num_slots());
        assert_eq!(search.select_unassigned(&partial), Some(short));

        partial.place(short, 0);
        assert_eq!(search.select_unassigned(&partial), Some(long));

        partial.place(long, 1);
        assert_eq!(search.select_unassigned(&partial), None);
    }

    #[test]
    fn test_select_tie_prefers_degree() {
        // Three 3-letter slots: the middle down slot crosses both across
        // slots, the across slots cross only the down slot.
        let problem = make_problem("___\n#_#\n___", "cat\nact\nbat\n");
        let mut search = Search::new(&problem);
        search.enforce_node_consistency();

        let down = index(&problem, Slot::new(0, 1, Direction::Down, 3));
        assert_eq!(problem.degree(down), 2);

        let partial = Partial::new(problem.num_slots());
        assert_eq!(search.select_unassigned(&partial), Some(down));
    }

    #[test]
    fn test_least_constraining_first() {
        let problem = make_problem(
            "___\n_##\n_##\n_##",
            "cat\ndog\ncode\ncoin\ndusk\n",
        );
        let mut search = Search::new(&problem);
        search.enforce_node_consistency();

        // CAT rules out DUSK, DOG rules out CODE and COIN.
        let across = index(&problem, Slot::new(0, 0, Direction::Across, 3));
        assert_eq!(
            texts(&problem, search.order_domain_values(across)),
            vec!["CAT", "DOG"]
        );

        // Every down word rules out one across word: ties keep their order.
        let down = index(&problem, Slot::new(0, 0, Direction::Down, 4));
        assert_eq!(
            texts(&problem, search.order_domain_values(down)),
            vec!["CODE", "COIN", "DUSK"]
        );

        // Ordering leaves the domains alone.
        assert_eq!(search.domains.len(across), 2);
        assert_eq!(search.domains.len(down), 3);
    }

    #[test]
    fn test_consistent() {
        let problem = make_problem("___\n_##\n_##", "cat\ncow\ndog\n");
        let search = Search::new(&problem);

        let across = index(&problem, Slot::new(0, 0, Direction::Across, 3));
        let down = index(&problem, Slot::new(0, 0, Direction::Down, 3));
        let word = |text: &str| {
            problem
                .words
                .iter()
                .position(|w| w.text == text)
                .expect("word")
        };

        let mut partial = Partial::new(problem.num_slots());
        partial.place(across, word("CAT"));

        assert!(search.consistent(&partial, down, word("COW")));
        assert!(!search.consistent(&partial, down, word("DOG")));
        // Already used.
        assert!(!search.consistent(&partial, down, word("CAT")));

        partial.unplace(across);
        assert!(search.consistent(&partial, down, word("CAT")));
    }

    #[test]
    fn test_consistent_length() {
        let problem = make_problem("___", "cat\nox\n");
        let search = Search::new(&problem);
        let partial = Partial::new(problem.num_slots());

        assert!(search.consistent(&partial, 0, 0));
        assert!(!search.consistent(&partial, 0, 1));
    }

    #[test]
    fn test_search_leaves_step_domains_alone() {
        let puzzle = Crossword::new("___\n_##\n_##", "cat\ncow\ndog\ndig\n").expect("puzzle");
        let solver = Solver::new(&puzzle);

        let before = solver.step().expect("consistent");
        let domains = before.domains.clone();
        assert!(solver.solve().is_ok());
        assert_eq!(before.domains, domains);
    }

    #[test]
    fn test_ruled_out_count_within_one_block() {
        // Several neighbor candidates share a bit-set block.
        let puzzle = Crossword::new(
            "#_\n__\n_#\n__\n",
            "AAA\nABB\nBCC\nBABB\nAB\nBA\nCB\nBBB\nBCCC\nBBCB\nBBA",
        )
        .expect("puzzle");
        let dict = crate::solve(&puzzle).expect("solution");

        assert_eq!(&dict[&Slot::new(1, 0, Direction::Down, 3)], "ABB");
        assert_eq!(&dict[&Slot::new(1, 0, Direction::Across, 2)], "AB");
        assert_eq!(&dict[&Slot::new(3, 0, Direction::Across, 2)], "BA");
        assert_eq!(&dict[&Slot::new(0, 1, Direction::Down, 2)], "CB");
    }

    #[test]
    fn test_backtrack_to_next_candidate() {
        // CAT is forced across the top.  ABA comes first for the down slot
        // but leaves CAT as the only word for the bottom, which is taken:
        // the search must back up and take ABC, then ICE.
        let puzzle = Crossword::new("___\n#_#\n___", "aba\nabc\ncat\nice\n").expect("puzzle");
        let solver = Solver::new(&puzzle);
        let dict = solver.solve().expect("solution");

        assert_eq!(&dict[&Slot::new(0, 0, Direction::Across, 3)], "CAT");
        assert_eq!(&dict[&Slot::new(0, 1, Direction::Down, 3)], "ABC");
        assert_eq!(&dict[&Slot::new(2, 0, Direction::Across, 3)], "ICE");

        // CAT, ABA (abandoned), ABC, ICE.
        assert_eq!(solver.num_guesses(), 4);
    }
}
