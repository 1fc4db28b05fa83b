use log::{debug, info, warn};
use std::{io, io::Write, path::Path};
use super::config::Config;
use super::dynamo::TableStore;
use super::error::{LoaderError, StoreError};
use super::parser::{parse_json_file, RecordBatch};

/// Outcome of one pass over the record batch.
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    pub table_name: String,
    pub attempted: usize,
    pub succeeded: usize,
    // key labels of the records that could not be written, in file order
    pub failed: Vec<String>,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

// check the file, decode it, then connect and put every record
// nothing is connected unless the file decodes completely
pub async fn run<S, F, W>(
    config: &Config,
    filename: &Path,
    connect: F,
    out: &mut W,
) -> Result<LoadReport, LoaderError>
where
    S: TableStore,
    F: FnOnce(&Config) -> Result<S, StoreError>,
    W: Write,
{
    if !filename.exists() {
        return Err(LoaderError::FileNotFound(filename.to_path_buf()));
    }

    info!("Reading {}", filename.display());
    let batch = parse_json_file(filename)?;
    debug!("Decoded {} records from {}", batch.len(), filename.display());

    let store = connect(config).map_err(LoaderError::Connect)?;

    Ok(load_records(&store, &batch, &config.key_field, out).await)
}

// put records one at a time in file order, a failed record never stops the rest
pub async fn load_records<S, W>(store: &S, batch: &RecordBatch, key_field: &str, out: &mut W) -> LoadReport
where
    S: TableStore,
    W: Write,
{
    let mut report = LoadReport {
        table_name: store.table_name().to_owned(),
        ..Default::default()
    };

    print_line(out, format_args!("Loading {} items into {}...", batch.len(), report.table_name));

    for record in batch {
        let key = record.key_label(key_field);
        report.attempted += 1;

        match store.put_item(record).await {
            Ok(()) => {
                report.succeeded += 1;
                print_line(out, format_args!("Added item: {}", key));
            }
            Err(error) => {
                debug!("Put failed for {}: {:?}", key, error);
                print_line(out, format_args!("Error adding item {}: {}", key, error));
                report.failed.push(key);
            }
        }
    }

    print_line(out, format_args!("Data loading complete!"));
    print_line(
        out,
        format_args!(
            "{}/{} items saved to {}",
            report.succeeded, report.attempted, report.table_name
        ),
    );

    report
}

// fatal errors always fail, failed records only fail the process with --strict
pub fn exit_code(config: &Config, result: &Result<LoadReport, LoaderError>) -> i32 {
    match result {
        Ok(report) if config.strict && report.has_failures() => 1,
        Ok(_) => 0,
        Err(_) => 1,
    }
}

// console output is best effort, a closed stdout must not stop the upload
fn print_line<W: Write>(out: &mut W, line: std::fmt::Arguments) {
    let result: io::Result<()> = writeln!(out, "{}", line).and_then(|_| out.flush());
    if let Err(error) = result {
        warn!("Cannot write progress output: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::get_arguments_from;
    use crate::modules::parser::{parse_json_text, Record};
    use async_trait::async_trait;
    use rusoto_core::RusotoError;
    use rusoto_dynamodb::PutItemError;
    use std::{cell::Cell, sync::Mutex};

    // records every put, fails the ones whose key is listed
    #[derive(Default)]
    struct MemoryStore {
        failing_keys: Vec<String>,
        puts: Mutex<Vec<Record>>,
    }

    impl MemoryStore {
        fn failing_on(keys: &[&str]) -> MemoryStore {
            MemoryStore {
                failing_keys: keys.iter().map(|k| k.to_string()).collect(),
                ..Default::default()
            }
        }

        fn put_keys(&self) -> Vec<String> {
            self.puts
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.key_label("product_id"))
                .collect()
        }
    }

    #[async_trait]
    impl TableStore for MemoryStore {
        fn table_name(&self) -> &str {
            "product-catalog"
        }

        async fn put_item(&self, record: &Record) -> Result<(), StoreError> {
            self.puts.lock().unwrap().push(record.clone());
            if self.failing_keys.contains(&record.key_label("product_id")) {
                return Err(StoreError::PutItem(RusotoError::Service(
                    PutItemError::ProvisionedThroughputExceeded("Rate of requests exceeds the allowed throughput".to_string()),
                )));
            }
            Ok(())
        }
    }

    fn output_lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out).unwrap().lines().map(|l| l.to_string()).collect()
    }

    fn config() -> Config {
        get_arguments_from(vec!["json_to_dynamo", "product-catalog", "products.json"])
            .unwrap()
            .1
    }

    fn json_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn every_record_is_put_in_order() {
        let batch = parse_json_text(
            r#"[{"product_id": "p1"}, {"product_id": "p2"}, {"product_id": "p3"}]"#,
        )
        .unwrap();
        let store = MemoryStore::default();
        let mut out = Vec::new();

        let report = load_records(&store, &batch, "product_id", &mut out).await;

        assert_eq!(store.put_keys(), vec!["p1", "p2", "p3"]);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 3);
        assert!(!report.has_failures());
        assert_eq!(
            output_lines(out),
            vec![
                "Loading 3 items into product-catalog...",
                "Added item: p1",
                "Added item: p2",
                "Added item: p3",
                "Data loading complete!",
                "3/3 items saved to product-catalog",
            ]
        );
    }

    #[tokio::test]
    async fn failed_record_does_not_stop_the_batch() {
        let batch = parse_json_text(
            r#"[{"product_id": "p1"}, {"product_id": "p2"}, {"product_id": "p3"}]"#,
        )
        .unwrap();
        let store = MemoryStore::failing_on(&["p2"]);
        let mut out = Vec::new();

        let report = load_records(&store, &batch, "product_id", &mut out).await;
        let lines = output_lines(out);

        assert_eq!(store.put_keys(), vec!["p1", "p2", "p3"]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, vec!["p2"]);
        assert_eq!(lines.iter().filter(|l| l.starts_with("Added item: ")).count(), 2);

        let failures: Vec<_> = lines.iter().filter(|l| l.starts_with("Error adding item ")).collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Error adding item p2: "));
        assert!(failures[0].contains("Rate of requests exceeds the allowed throughput"));
    }

    #[tokio::test]
    async fn record_without_key_uses_placeholder() {
        let batch = parse_json_text(r#"[{"name": "Desk lamp", "price": 24.50}]"#).unwrap();
        let store = MemoryStore::default();
        let mut out = Vec::new();

        let report = load_records(&store, &batch, "product_id", &mut out).await;

        assert_eq!(store.puts.lock().unwrap().len(), 1);
        assert_eq!(report.succeeded, 1);
        assert!(output_lines(out).contains(&"Added item: unknown".to_string()));
    }

    #[tokio::test]
    async fn missing_file_never_connects() {
        let connected = Cell::new(false);
        let mut out = Vec::new();

        let result = run(
            &config(),
            Path::new("/definitely/not/here/products.json"),
            |_: &Config| {
                connected.set(true);
                Ok(MemoryStore::default())
            },
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(LoaderError::FileNotFound(_))));
        assert!(!connected.get());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_never_connects() {
        let file = json_file(r#"[{"product_id": "p1"}, {"product_id": "#);
        let connected = Cell::new(false);
        let mut out = Vec::new();

        let result = run(
            &config(),
            file.path(),
            |_: &Config| {
                connected.set(true);
                Ok(MemoryStore::default())
            },
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(LoaderError::Decode(_))));
        assert!(!connected.get());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn connect_failure_is_fatal() {
        let file = json_file(r#"[{"product_id": "p1"}]"#);
        let mut out = Vec::new();

        let result = run(
            &config(),
            file.path(),
            |config: &Config| -> Result<MemoryStore, StoreError> {
                Err(StoreError::InvalidRegion(config.region.to_owned()))
            },
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(LoaderError::Connect(StoreError::InvalidRegion(_)))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn run_reports_partial_failure() {
        let file = json_file(
            r#"[{"product_id": "p1", "price": 19.99}, {"product_id": "p2", "price": 5}]"#,
        );
        let mut out = Vec::new();

        let report = run(
            &config(),
            file.path(),
            |_: &Config| Ok(MemoryStore::failing_on(&["p1"])),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(report.table_name, "product-catalog");
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);
        assert!(report.has_failures());
    }

    fn report_with_failures(failed: &[&str]) -> LoadReport {
        LoadReport {
            table_name: "product-catalog".to_string(),
            attempted: 3,
            succeeded: 3 - failed.len(),
            failed: failed.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn strict_config() -> Config {
        get_arguments_from(vec!["json_to_dynamo", "--strict", "product-catalog", "products.json"])
            .unwrap()
            .1
    }

    #[test]
    fn failed_records_exit_zero_by_default() {
        let result = Ok(report_with_failures(&["p2"]));
        assert_eq!(exit_code(&config(), &result), 0);
    }

    #[test]
    fn failed_records_exit_one_when_strict() {
        let result = Ok(report_with_failures(&["p2"]));
        assert_eq!(exit_code(&strict_config(), &result), 1);
    }

    #[test]
    fn clean_run_exits_zero_when_strict() {
        let result = Ok(report_with_failures(&[]));
        assert_eq!(exit_code(&strict_config(), &result), 0);
    }

    #[test]
    fn fatal_error_exits_one() {
        let result = Err(LoaderError::FileNotFound(Path::new("products.json").to_path_buf()));
        assert_eq!(exit_code(&config(), &result), 1);
        assert_eq!(exit_code(&strict_config(), &result), 1);
    }
}
