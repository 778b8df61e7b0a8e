//! Category usage statistics

use crate::{dataset::Dataset, Result};
use std::{
    cmp::Reverse,
    collections::HashMap,
    fmt,
};

/// Number of articles of each category
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CategoryCounts {
    /// Occurence count of each category label
    counts: HashMap<Box<str>, usize>,

    /// Number of articles that were tabulated
    total: usize,
}
//
impl CategoryCounts {
    /// Count the articles of each category in a dataset
    ///
    /// Fails if an article does not have a string category.
    pub fn tabulate(dataset: &Dataset) -> Result<Self> {
        let mut result = Self::default();
        for record in dataset.records() {
            result.add(record.category()?);
        }
        log::debug!(
            "Found {} categories across {} records",
            result.counts.len(),
            result.total
        );
        Ok(result)
    }

    /// Record one more article of a certain category
    fn add(&mut self, category: &str) {
        match self.counts.get_mut(category) {
            Some(count) => *count += 1,
            None => {
                log::trace!("Discovered category {category:?}");
                self.counts.insert(category.into(), 1);
            }
        }
        self.total += 1;
    }

    /// Number of articles of a certain category
    pub fn get(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Number of articles that were tabulated
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct categories
    pub fn num_categories(&self) -> usize {
        self.counts.len()
    }

    /// Categories and their counts, most frequent first
    ///
    /// Categories with equal counts are sorted by label.
    pub fn by_decreasing_count(&self) -> Vec<(&str, usize)> {
        let mut sorted = self
            .counts
            .iter()
            .map(|(category, &count)| (&**category, count))
            .collect::<Vec<_>>();
        sorted.sort_unstable_by_key(|&(category, count)| (Reverse(count), category));
        sorted
    }
}
//
impl fmt::Display for CategoryCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_HEADER: &str = "CATEGORY";
        const COUNT_HEADER: &str = "COUNT";
        const TOTAL_LABEL: &str = "TOTAL";
        let sorted = self.by_decreasing_count();
        let label_width = (sorted.iter().map(|(category, _)| category.chars().count()))
            .chain([LABEL_HEADER.len(), TOTAL_LABEL.len()])
            .max()
            .unwrap_or(0);
        let count_width = self.total.to_string().len().max(COUNT_HEADER.len());
        writeln!(f, "{LABEL_HEADER:<label_width$}  {COUNT_HEADER:>count_width$}")?;
        for (category, count) in sorted {
            writeln!(f, "{category:<label_width$}  {count:>count_width$}")?;
        }
        write!(f, "{TOTAL_LABEL:<label_width$}  {:>count_width$}", self.total)
    }
}
