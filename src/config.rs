//! Processing pipeline configuration

use crate::Args;
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Name of the newline-delimited JSON dataset
pub const DATASET_FILE: &str = "News_Category_Dataset_v2.json";

/// Record field that holds the category label
pub const CATEGORY_FIELD: &str = "category";

/// Categories that make up the training split
pub const TRAIN_CATEGORIES: &[&str] = &["TECH", "SCIENCE", "CRIME", "SPORTS"];

/// Output file of the training split
pub const TRAIN_FILE: &str = "train_data.csv";

/// Categories that are kept away from training, to be used as unseen data
pub const UNSEEN_CATEGORIES: &[&str] = &["RELIGION"];

/// Output file of the unseen-categories split
pub const UNSEEN_FILE: &str = "new_data.csv";

/// Final process configuration
///
/// This is the result of resolving the hardcoded file names and category
/// lists against the digested [`Args`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    /// Newline-delimited JSON dataset to be loaded
    pub input: PathBuf,

    /// Split that is used for training
    pub train: SplitConfig,

    /// Split of categories that training must not see
    pub unseen: SplitConfig,
}
//
impl Config {
    /// Determine process configuration from CLI arguments
    pub(crate) fn new(args: Args) -> Arc<Self> {
        let Args { data_dir } = args;
        Arc::new(Self::in_dir(&data_dir))
    }

    /// Configuration where all files live in a given directory
    pub fn in_dir(dir: &Path) -> Self {
        let config = Self {
            input: dir.join(DATASET_FILE),
            train: SplitConfig::new(TRAIN_CATEGORIES, dir.join(TRAIN_FILE)),
            unseen: SplitConfig::new(UNSEEN_CATEGORIES, dir.join(UNSEEN_FILE)),
        };
        config.warn_on_overlap();
        config
    }

    /// Iterate over the splits to be exported, in output order
    pub fn splits(&self) -> impl Iterator<Item = &SplitConfig> {
        [&self.train, &self.unseen].into_iter()
    }

    /// Report categories that would end up in both splits
    fn warn_on_overlap(&self) {
        for label in self.train.labels.intersection(&self.unseen.labels) {
            log::warn!(
                "Category {label:?} belongs to both splits, its records will be exported twice"
            );
        }
    }
}

/// Subset of the dataset that is exported to its own file
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SplitConfig {
    /// Accepted category labels
    pub labels: BTreeSet<Box<str>>,

    /// Labels in the order they were listed, for display purposes
    pub listed: Box<[Box<str>]>,

    /// Destination CSV file, overwritten if present
    pub output: PathBuf,
}
//
impl SplitConfig {
    /// Set up a split from a list of labels
    pub fn new(labels: &[&str], output: PathBuf) -> Self {
        let listed = labels.iter().map(|&label| Box::from(label)).collect::<Box<[_]>>();
        Self {
            labels: listed.iter().cloned().collect(),
            listed,
            output,
        }
    }

    /// Truth that a record of this category belongs to the split
    pub fn accepts(&self, category: &str) -> bool {
        self.labels.contains(category)
    }
}
