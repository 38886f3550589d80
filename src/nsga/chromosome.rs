//! Bit-set chromosomes.
//!
//! A [`Chromosome`] is a gene subset over `0..num_genes`, stored as
//! fixed-width `u64` words (gene `g` lives in word `g / 64`, bit `g % 64`).
//!
//! # Ordering
//!
//! Chromosomes are totally ordered by their *significant* words (trailing
//! all-zero words dropped), compared word by word from word 0 as **signed**
//! `i64` values, so a word with bit 63 set (gene `64 * w + 63`) sorts below
//! every non-negative word. When one sequence is a prefix of the other, the
//! shorter one comes first. The order has no fitness meaning, but it fixes
//! the layout of a deduplicated pool, which proportional selection scans in
//! order.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

const WORD_BITS: usize = 64;

/// A gene subset encoded as a bit vector.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    words: Vec<u64>,
    num_genes: usize,
}

impl Chromosome {
    /// Creates an empty chromosome over `num_genes` genes.
    pub fn new(num_genes: usize) -> Self {
        Self {
            words: vec![0; num_genes.div_ceil(WORD_BITS)],
            num_genes,
        }
    }

    /// Creates a chromosome with the given genes set.
    ///
    /// # Panics
    /// Panics if any gene is `>= num_genes`.
    pub fn from_indices<I: IntoIterator<Item = usize>>(num_genes: usize, genes: I) -> Self {
        let mut c = Self::new(num_genes);
        for g in genes {
            c.set(g);
        }
        c
    }

    pub fn set(&mut self, gene: usize) {
        let (w, mask) = self.locate(gene);
        self.words[w] |= mask;
    }

    pub fn get(&self, gene: usize) -> bool {
        let (w, mask) = self.locate(gene);
        self.words[w] & mask != 0
    }

    /// Toggles one gene.
    pub fn flip(&mut self, gene: usize) {
        let (w, mask) = self.locate(gene);
        self.words[w] ^= mask;
    }

    /// Number of genes set.
    pub fn count_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `true` if no gene is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterates over set genes in ascending order.
    pub fn genes(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(wi * WORD_BITS + tz)
            })
        })
    }

    /// Set genes as an ascending list.
    pub fn to_sorted_indices(&self) -> Vec<usize> {
        self.genes().collect()
    }

    /// Overwrites genes `0..prefix` with the corresponding genes of `donor`.
    ///
    /// Used by one-point crossover.
    pub fn copy_prefix_from(&mut self, donor: &Chromosome, prefix: usize) {
        debug_assert_eq!(self.num_genes, donor.num_genes);
        let prefix = prefix.min(self.num_genes);
        let full = prefix / WORD_BITS;
        self.words[..full].copy_from_slice(&donor.words[..full]);
        let rem = prefix % WORD_BITS;
        if rem > 0 {
            let mask = (1u64 << rem) - 1;
            self.words[full] = (self.words[full] & !mask) | (donor.words[full] & mask);
        }
    }

    /// Words with trailing all-zero words removed.
    pub fn significant_words(&self) -> &[u64] {
        let len = self
            .words
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |i| i + 1);
        &self.words[..len]
    }

    fn locate(&self, gene: usize) -> (usize, u64) {
        assert!(
            gene < self.num_genes,
            "gene {gene} out of range for {} genes",
            self.num_genes
        );
        (gene / WORD_BITS, 1u64 << (gene % WORD_BITS))
    }
}

impl PartialEq for Chromosome {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for Chromosome {}

impl Hash for Chromosome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

impl Ord for Chromosome {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.significant_words();
        let b = other.significant_words();
        for (&x, &y) in a.iter().zip(b.iter()) {
            match (x as i64).cmp(&(y as i64)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        a.len().cmp(&b.len())
    }
}

impl PartialOrd for Chromosome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.genes()).finish()
    }
}
