//! In-memory news article dataset, loaded from newline-delimited JSON
//!
//! Every line of the input file holds one JSON object describing an article.
//! The whole file is loaded up front and is not modified afterwards.

use crate::{
    config::CATEGORY_FIELD,
    progress::{ProgressReport, Work},
    Result,
};
use anyhow::Context;
use serde_json::{Map, Value};
use std::{collections::HashSet, path::Path};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

/// Fields of an article, in the order in which they appear on its line
pub type Fields = Map<String, Value>;

/// Every article from the input file, in file order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    /// Union of all field names, in order of first appearance
    columns: Box<[Box<str>]>,

    /// Articles, in file order
    records: Box<[Record]>,
}
//
impl Dataset {
    /// Build a dataset from the fields of each article, in file order
    #[cfg(test)]
    pub fn from_fields(fields: impl IntoIterator<Item = Fields>) -> Self {
        let mut builder = DatasetBuilder::default();
        for fields in fields {
            builder.add_record(fields);
        }
        builder.finish()
    }

    /// Field names, in order of first appearance across records
    pub fn columns(&self) -> &[Box<str>] {
        &self.columns[..]
    }

    /// Articles, in file order
    pub fn records(&self) -> &[Record] {
        &self.records[..]
    }

    /// Number of articles
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Article from the dataset
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Position of the article in the input file, starting at 0
    index: usize,

    /// Contents of the article's JSON object
    fields: Fields,
}
//
impl Record {
    /// Position of the article in the input file, starting at 0
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of a field, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Category label of the article
    ///
    /// Fails if the article has no category, or a category that is not a
    /// string.
    pub fn category(&self) -> Result<&str> {
        match self.fields.get(CATEGORY_FIELD) {
            Some(Value::String(category)) => Ok(category),
            Some(other) => anyhow::bail!(
                "record #{} has a non-string {CATEGORY_FIELD:?} field: {other}",
                self.index
            ),
            None => anyhow::bail!("record #{} has no {CATEGORY_FIELD:?} field", self.index),
        }
    }
}

/// Accumulator of dataset records
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    /// Columns seen so far, in order of first appearance
    columns: Vec<Box<str>>,

    /// Set of the names in `columns`
    known_columns: HashSet<Box<str>>,

    /// Records accumulated so far
    records: Vec<Record>,
}
//
impl DatasetBuilder {
    /// Integrate the next record from the input file
    pub fn add_record(&mut self, fields: Fields) {
        for name in fields.keys() {
            if !self.known_columns.contains(name.as_str()) {
                log::trace!("Discovered column {name:?}");
                self.known_columns.insert(name.as_str().into());
                self.columns.push(name.as_str().into());
            }
        }
        self.records.push(Record {
            index: self.records.len(),
            fields,
        });
    }

    /// Freeze the dataset once all records have been added
    pub fn finish(self) -> Dataset {
        Dataset {
            columns: self.columns.into(),
            records: self.records.into(),
        }
    }
}

/// Load a newline-delimited JSON file
///
/// Any line that is not a JSON object aborts the whole load.
pub async fn load(path: &Path, report: &ProgressReport) -> Result<Dataset> {
    // Open the input file
    let context = || format!("opening {}", path.display());
    let file = File::open(path).await.with_context(context)?;
    let size = file.metadata().await.with_context(context)?.len();
    let bytes = report.add("Loading dataset", Work::Bytes(size));

    // Parse it line by line
    let mut reader = BufReader::new(file);
    let mut builder = DatasetBuilder::default();
    let mut line = String::new();
    for line_number in 1usize.. {
        line.clear();
        let context = || format!("reading line {line_number} of {}", path.display());
        let read = reader.read_line(&mut line).await.with_context(context)?;
        if read == 0 {
            break;
        }
        bytes.make_progress(read as u64);
        let fields = serde_json::from_str::<Fields>(&line).with_context(|| {
            format!("parsing line {line_number} of {} as a JSON object", path.display())
        })?;
        builder.add_record(fields);
    }
    bytes.finish();

    let dataset = builder.finish();
    log::info!(
        "Loaded {} records from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.columns()
    );
    Ok(dataset)
}
