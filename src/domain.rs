//! Candidate words per slot.

use bit_set::BitSet;
use std::rc::Rc;

/// The candidate words of every slot, as sets of word indices.
///
/// Cloning is cheap: each slot's set is shared until one of the clones
/// modifies it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Domains {
    sets: Vec<Rc<BitSet>>,
}

impl Domains {
    /// Every slot starts with the whole vocabulary.
    pub(crate) fn full(num_slots: usize, num_words: usize) -> Self {
        let mut all = BitSet::with_capacity(num_words);
        for w in 0..num_words {
            all.insert(w);
        }

        let all = Rc::new(all);
        Domains {
            sets: vec![all; num_slots],
        }
    }

    #[inline]
    pub(crate) fn len(&self, slot: usize) -> usize {
        self.sets[slot].len()
    }

    #[inline]
    pub(crate) fn is_empty(&self, slot: usize) -> bool {
        self.sets[slot].is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, slot: usize, word: usize) -> bool {
        self.sets[slot].contains(word)
    }

    pub(crate) fn iter(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        self.sets[slot].iter()
    }

    /// The first slot left without candidates, if any.
    pub(crate) fn first_empty(&self) -> Option<usize> {
        self.sets.iter().position(|set| set.is_empty())
    }

    /// Keep only the words accepted by `keep`.  Returns whether anything
    /// was removed.
    pub(crate) fn retain<F>(&mut self, slot: usize, mut keep: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        let discard = self.sets[slot]
            .iter()
            .filter(|&w| !keep(w))
            .collect::<Vec<_>>();

        if discard.is_empty() {
            return false;
        }

        let set = Rc::make_mut(&mut self.sets[slot]);
        for w in discard {
            set.remove(w);
        }
        true
    }

    /// Reduce a slot to a single word.
    pub(crate) fn set_word(&mut self, slot: usize, word: usize) {
        if self.len(slot) == 1 && self.contains(slot, word) {
            return;
        }

        let mut set = BitSet::new();
        set.insert(word);
        self.sets[slot] = Rc::new(set);
    }
}

#[cfg(test)]
mod tests {
    use super::Domains;

    #[test]
    fn test_copy_on_write() {
        let mut parent = Domains::full(2, 4);
        let child = parent.clone();

        assert!(parent.retain(0, |w| w % 2 == 0));
        assert_eq!(parent.iter(0).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(parent.len(1), 4);
        assert_eq!(child.len(0), 4);

        assert!(!parent.retain(0, |_| true));
    }

    #[test]
    fn test_set_word() {
        let mut domains = Domains::full(1, 3);
        domains.set_word(0, 1);
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(domains.first_empty(), None);

        domains.retain(0, |_| false);
        assert_eq!(domains.first_empty(), Some(0));
    }
}
