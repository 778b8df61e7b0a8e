//! Export of dataset subsets as CSV files

use crate::{
    config::SplitConfig,
    dataset::{Dataset, Record},
    progress::{ProgressReport, ProgressTracker, Work},
    Result,
};
use anyhow::Context;
use csv_async::AsyncWriterBuilder;
use serde_json::Value;
use std::borrow::Cow;
use tokio::{fs::File, io::AsyncWrite};

/// Write the records of a split to its output file
///
/// Any previous version of the output file is overwritten. Returns the number
/// of records that were written.
pub async fn export(
    dataset: &Dataset,
    split: &SplitConfig,
    report: &ProgressReport,
) -> Result<usize> {
    let selected = select(dataset, split)?;
    let context = || format!("writing {}", split.output.display());
    let file = File::create(&split.output).await.with_context(context)?;
    let rows = report.add(
        format!("Writing {}", split.output.display()),
        Work::Steps(selected.len()),
    );
    write_csv(file, dataset.columns(), &selected, &rows)
        .await
        .with_context(context)?;
    rows.finish();
    log::info!(
        "Wrote {} records of categories {:?} to {}",
        selected.len(),
        split.listed,
        split.output.display()
    );
    Ok(selected.len())
}

/// Pick the records that belong to a split, in dataset order
pub fn select<'dataset>(
    dataset: &'dataset Dataset,
    split: &SplitConfig,
) -> Result<Vec<&'dataset Record>> {
    let mut selected = Vec::new();
    for record in dataset.records() {
        if split.accepts(record.category()?) {
            selected.push(record);
        }
    }
    Ok(selected)
}

/// Write records as CSV, preceded by a header row
///
/// The first column holds each record's position in the dataset and has an
/// empty header; the other columns are the dataset's fields. Without any
/// field there is no table to speak of, and nothing is written.
pub async fn write_csv<W: AsyncWrite + Unpin>(
    output: W,
    columns: &[Box<str>],
    records: &[&Record],
    progress: &ProgressTracker,
) -> Result<()> {
    let mut writer = AsyncWriterBuilder::new().create_writer(output);
    if columns.is_empty() {
        debug_assert!(records.is_empty(), "records without fields cannot be selected");
        writer.flush().await?;
        return Ok(());
    }
    writer
        .write_record(std::iter::once("").chain(columns.iter().map(|column| &**column)))
        .await?;
    let mut row = Vec::with_capacity(columns.len() + 1);
    for record in records {
        row.clear();
        row.push(Cow::Owned(record.index().to_string()));
        row.extend(columns.iter().map(|column| cell(record.get(column))));
        writer.write_record(row.iter().map(|cell| cell.as_bytes())).await?;
        progress.make_progress(1);
    }
    writer.flush().await?;
    Ok(())
}

/// CSV cell contents for a record field
fn cell(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Fields;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn dataset(values: impl IntoIterator<Item = Value>) -> Dataset {
        Dataset::from_fields(values.into_iter().map(|value| match value {
            Value::Object(fields) => fields,
            other => panic!("{other} is not an object"),
        }))
    }

    fn scenario() -> Dataset {
        dataset([
            json!({"category": "TECH", "headline": "A"}),
            json!({"category": "RELIGION", "headline": "B"}),
            json!({"category": "MISC", "headline": "C"}),
        ])
    }

    async fn to_csv(dataset: &Dataset, split: &SplitConfig) -> String {
        let selected = select(dataset, split).unwrap();
        let mut output = Vec::new();
        let progress = ProgressReport::hidden().add("Testing", Work::Steps(selected.len()));
        write_csv(&mut output, dataset.columns(), &selected, &progress)
            .await
            .unwrap();
        String::from_utf8(output).unwrap().replace("\r\n", "\n")
    }

    #[test]
    fn selection_preserves_order() {
        let dataset = dataset(
            ["SPORTS", "RELIGION", "TECH", "MISC", "SPORTS", "CRIME"]
                .map(|category| json!({ "category": category })),
        );
        let split = SplitConfig::new(&["TECH", "SPORTS", "CRIME"], PathBuf::new());
        let indices = select(&dataset, &split)
            .unwrap()
            .into_iter()
            .map(Record::index)
            .collect::<Vec<_>>();
        assert_eq!(indices, [0, 2, 4, 5]);
    }

    #[test]
    fn selection_requires_categories() {
        let dataset = dataset([json!({"category": "TECH"}), json!({"headline": "?"})]);
        let split = SplitConfig::new(&["TECH"], PathBuf::new());
        assert!(select(&dataset, &split).is_err());
    }

    #[tokio::test]
    async fn scenario_rows() {
        let dataset = scenario();
        let train = SplitConfig::new(&["TECH", "SCIENCE", "CRIME", "SPORTS"], PathBuf::new());
        assert_eq!(to_csv(&dataset, &train).await, ",category,headline\n0,TECH,A\n");
        let unseen = SplitConfig::new(&["RELIGION"], PathBuf::new());
        assert_eq!(
            to_csv(&dataset, &unseen).await,
            ",category,headline\n1,RELIGION,B\n"
        );
    }

    #[tokio::test]
    async fn empty_split_has_header_only() {
        let split = SplitConfig::new(&["WEIRD NEWS"], PathBuf::new());
        assert_eq!(to_csv(&scenario(), &split).await, ",category,headline\n");
    }

    #[tokio::test]
    async fn cells_follow_dataset_columns() {
        let dataset = dataset([
            json!({"category": "TECH", "headline": "Hello, \"world\"", "authors": null}),
            json!({"link": "https://example.com", "category": "TECH", "score": 1.5,
                   "tags": ["a", "b"], "featured": true}),
        ]);
        let split = SplitConfig::new(&["TECH"], PathBuf::new());
        assert_eq!(
            to_csv(&dataset, &split).await,
            ",category,headline,authors,link,score,tags,featured\n\
             0,TECH,\"Hello, \"\"world\"\"\",,,,,\n\
             1,TECH,,,https://example.com,1.5,\"[\"\"a\"\",\"\"b\"\"]\",true\n"
        );
    }

    #[tokio::test]
    async fn empty_dataset_exports_empty_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("train_data.csv");
        std::fs::write(&output, "stale\n").unwrap();
        let split = SplitConfig::new(&["TECH"], output.clone());
        let written = export(&Dataset::default(), &split, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }

    #[tokio::test]
    async fn shared_label_goes_to_both_splits() {
        let dir = TempDir::new().unwrap();
        let first = SplitConfig::new(&["TECH", "RELIGION"], dir.path().join("first.csv"));
        let second = SplitConfig::new(&["RELIGION"], dir.path().join("second.csv"));
        let dataset = scenario();
        for split in [&first, &second] {
            export(&dataset, split, &ProgressReport::hidden()).await.unwrap();
        }
        let read = |path: &std::path::Path| {
            std::fs::read_to_string(path).unwrap().replace("\r\n", "\n")
        };
        assert_eq!(
            read(&first.output),
            ",category,headline\n0,TECH,A\n1,RELIGION,B\n"
        );
        assert_eq!(read(&second.output), ",category,headline\n1,RELIGION,B\n");
    }

    #[tokio::test]
    async fn export_overwrites_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("train_data.csv");
        std::fs::write(&output, "stale contents that are longer than the new ones\n").unwrap();
        let split = SplitConfig::new(&["MISC"], output.clone());
        let written = export(&scenario(), &split, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(written, 1);
        let contents = std::fs::read_to_string(&output).unwrap().replace("\r\n", "\n");
        assert_eq!(contents, ",category,headline\n2,MISC,C\n");
    }

    #[tokio::test]
    async fn export_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let split = SplitConfig::new(&["TECH"], dir.path().join("absent").join("out.csv"));
        let error = export(&scenario(), &split, &ProgressReport::hidden())
            .await
            .unwrap_err();
        assert!(format!("{error:#}").contains("writing"), "{error:#}");
    }

    #[test]
    fn cell_encoding() {
        let fields = json!({"s": "text", "n": 3, "b": false, "z": null});
        let fields: &Fields = fields.as_object().unwrap();
        assert_eq!(cell(fields.get("s")), "text");
        assert_eq!(cell(fields.get("n")), "3");
        assert_eq!(cell(fields.get("b")), "false");
        assert_eq!(cell(fields.get("z")), "");
        assert_eq!(cell(fields.get("absent")), "");
    }
}
