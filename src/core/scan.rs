use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::core::rate::Rate;

/// How overlapping pairs are enumerated within one supplier's rates.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Strategy {
    /// Test every pair, quadratic in the number of rates.
    #[default]
    Pairwise,

    /// Sweep the rates by start date keeping the ones still in effect, `O(n log n + k)`.
    SweepLine,
}

impl Strategy {
    #[cfg(test)]
    pub const ALL: [Self; 2] = [Self::Pairwise, Self::SweepLine];

    /// Find the overlapping pairs.
    ///
    /// The rates *must* be well-formed and sorted by `(start, id)`. Returned index pairs `(i, j)`
    /// always have `i < j`, the order of the pairs themselves is unspecified.
    #[must_use]
    pub fn scan(self, rates: &[&Rate]) -> Vec<(usize, usize)> {
        match self {
            Self::Pairwise => scan_pairwise(rates),
            Self::SweepLine => sweep(rates),
        }
    }
}

fn scan_pairwise(rates: &[&Rate]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, first) in rates.iter().enumerate() {
        for (j, second) in rates.iter().enumerate().skip(i + 1) {
            if first.period.intersection(second.period).is_some() {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

fn sweep(rates: &[&Rate]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    // Rates still in effect, ordered by their effective end:
    let mut active = BTreeSet::<(NaiveDate, usize)>::new();

    for (j, rate) in rates.iter().enumerate() {
        while let Some(&(end, _)) = active.first()
            && end < rate.period.start
        {
            active.pop_first();
        }
        // Every active rate started no later and has not ended yet:
        pairs.extend(active.iter().map(|&(_, i)| (i, j)));
        active.insert((rate.period.effective_end(), j));
    }

    pairs
}
