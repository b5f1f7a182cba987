//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - Config files driving the stage factories
//! - Source -> Transform* -> Sink runs against the memory store and SQLite
//! - Short-circuit behavior when a stage fails

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ObjectStoreConfig, SinkConfig, TransformConfig, WriteMode};

    const PIPELINE_TOML: &str = r#"
name = "api-to-db"

[source]
kind = "http"
url = "https://api.example.com/data"

[[transforms]]
kind = "drop_missing"
columns = ["date"]

[[transforms]]
kind = "parse_date"
column = "date"

[sink]
kind = "relational"
url = "sqlite://warehouse.db"
table = "cleaned_api_data"
mode = "append"

[timeouts]
source_secs = 5
sink_secs = 0
"#;

    #[test]
    fn test_toml_and_json_describe_the_same_pipeline() {
        let from_toml = ConfigLoader::load_from_str(PIPELINE_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&from_toml).unwrap();
        let from_json = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(from_json.name, "api-to-db");
        assert_eq!(from_json.source, from_toml.source);
        assert_eq!(
            from_json.transforms,
            vec![
                TransformConfig::DropMissing {
                    columns: vec!["date".into()]
                },
                TransformConfig::ParseDate {
                    column: "date".into(),
                    format: "%Y-%m-%d".into()
                },
            ]
        );
        assert_eq!(
            from_json.sink,
            SinkConfig::Relational {
                url: "sqlite://warehouse.db".into(),
                table: "cleaned_api_data".into(),
                mode: WriteMode::Append,
            }
        );
        assert_eq!(from_json.object_store, ObjectStoreConfig::default());
        assert_eq!(from_json.timeouts.sink(), None);
    }

    #[test]
    fn test_invalid_table_name_is_rejected() {
        let content = PIPELINE_TOML.replace("cleaned_api_data", "cleaned-api-data");
        let err = ConfigLoader::load_from_str(&content, ConfigFormat::Toml)
            .unwrap_err()
            .to_string();
        assert!(err.contains("sink.table"), "got: {err}");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use contracts::{
        Ack, Batch, ContractError, DataSink, DataSource, ErrorKind, ObjectFormat, SinkConfig,
        SourceConfig, Stage, TransformConfig, Value, WriteMode,
    };
    use dispatcher::{create_sink, ObjectStoreSink, RelationalSink};
    use ingestion::{create_source, CsvFileSource, ObjectStoreSource};
    use runner::PipelineRunner;
    use storage::MemoryStore;
    use transform::build_transforms;

    const SCENARIO_CSV: &str = "id,date\n1,2024-01-01\n2,\n3,bad\n";

    /// Sink that only counts calls
    #[derive(Clone, Default)]
    struct CountingSink {
        calls: Arc<AtomicUsize>,
    }

    impl DataSink for CountingSink {
        fn name(&self) -> &str {
            "counting"
        }

        async fn persist(&mut self, batch: &Batch) -> Result<Ack, ContractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Ack {
                sink: "counting".into(),
                destination: "nowhere".into(),
                rows_written: batch.len(),
                bytes_written: None,
            })
        }
    }

    fn write_csv(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_drop_then_parse_fails_on_bad_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "scenario.csv", SCENARIO_CSV);

        let transforms = build_transforms(&[
            TransformConfig::DropMissing {
                columns: vec!["date".into()],
            },
            TransformConfig::ParseDate {
                column: "date".into(),
                format: "%Y-%m-%d".into(),
            },
        ]);
        let sink = CountingSink::default();
        let calls = Arc::clone(&sink.calls);

        let mut runner = PipelineRunner::new("scenario", CsvFileSource::new(&path), transforms, sink);
        let result = runner.run().await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage, Stage::Transform);
        assert_eq!(failure.stage_name, "parse_date(date)");
        assert_eq!(failure.kind(), ErrorKind::TransformTypeError);
        match &failure.error {
            ContractError::TransformType { column, row, .. } => {
                assert_eq!(column.as_deref(), Some("date"));
                // Second row of the filtered batch: the record with id 3.
                assert_eq!(*row, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(result.stats.rows_fetched, Some(3));
        assert_eq!(result.stats.rows_persisted, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drop_missing_keeps_complete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "scenario.csv", SCENARIO_CSV);

        let transforms = build_transforms(&[TransformConfig::DropMissing {
            columns: vec!["date".into()],
        }]);
        let mut runner = PipelineRunner::new(
            "drop-only",
            CsvFileSource::new(&path),
            transforms,
            CountingSink::default(),
        );
        let result = runner.run().await;

        let ack = result.outcome.as_ref().unwrap();
        assert_eq!(ack.rows_written, 2);
        assert_eq!(result.stats.rows_dropped(), Some(1));
        assert_eq!(runner.sink().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_source_file_never_reaches_sink() {
        let sink = CountingSink::default();
        let mut runner = PipelineRunner::new(
            "missing",
            CsvFileSource::new("/nonexistent/input.csv"),
            Vec::new(),
            sink,
        );
        let result = runner.run().await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage, Stage::Source);
        assert_eq!(failure.kind(), ErrorKind::SourceUnavailable);
        assert_eq!(runner.sink().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_csv_round_trip_through_object_store_keeps_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "orders.csv",
            "id,customer,amount,shipped,date\n\
             1,Ada,12.5,true,2024-01-01\n\
             2,\"Lovelace, A\",3,false,\n\
             3,,7.25,,2024-02-29\n",
        );

        let source = CsvFileSource::new(&path);
        let original = source.fetch().await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let mut sink =
            ObjectStoreSink::new(Arc::clone(&store), "bucket", "raw/orders.csv", None);
        let ack = sink.persist(&original).await.unwrap();
        assert_eq!(ack.destination, "memory://bucket/raw/orders.csv");
        assert_eq!(
            store.content_type("bucket", "raw/orders.csv").await.as_deref(),
            Some("text/csv")
        );

        let reread = ObjectStoreSource::new(store, "bucket", "raw/orders.csv", None)
            .fetch()
            .await
            .unwrap();

        let names = |b: &Batch| b.schema().names().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(names(&reread), names(&original));
        assert_eq!(reread.len(), original.len());
        assert_eq!(reread.value(1, "customer"), original.value(1, "customer"));
        assert_eq!(reread.value(1, "date"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_json_object_round_trip_keeps_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "in.csv", "b,a\n1,x\n2,y\n");

        let store = Arc::new(MemoryStore::new());
        let original = CsvFileSource::new(&path).fetch().await.unwrap();
        ObjectStoreSink::new(
            Arc::clone(&store),
            "bucket",
            "out/data",
            Some(ObjectFormat::Json),
        )
        .persist(&original)
        .await
        .unwrap();

        let reread = ObjectStoreSource::new(store, "bucket", "out/data", Some(ObjectFormat::Json))
            .fetch()
            .await
            .unwrap();
        let names: Vec<&str> = reread.schema().names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(reread.value(0, "a"), Some(&Value::Text("x".into())));
    }

    #[tokio::test]
    async fn test_configured_pipeline_csv_to_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "input.csv",
            "id,date,amount\n1,2024-01-01,10\n2,,20\n3,2024-01-03,30\n",
        );
        let db = dir.path().join("warehouse.db");
        let url = format!("sqlite://{}", db.display());

        let store = Arc::new(MemoryStore::new());
        let source = create_source(
            &SourceConfig::CsvFile {
                path,
                delimiter: ',',
            },
            reqwest::Client::new(),
            Arc::clone(&store),
        );
        let transforms = build_transforms(&[
            TransformConfig::DropMissing { columns: vec![] },
            TransformConfig::ParseDate {
                column: "date".into(),
                format: "%Y-%m-%d".into(),
            },
            TransformConfig::Scale {
                factor: 2.0,
                columns: vec!["amount".into()],
            },
        ]);
        let sink = create_sink(
            &SinkConfig::Relational {
                url: url.clone(),
                table: "processed_data".into(),
                mode: WriteMode::Replace,
            },
            store,
        );

        let mut runner = PipelineRunner::new("csv-to-db", source, transforms, sink);
        let result = runner.run().await;
        let ack = result.outcome.unwrap();
        assert_eq!(ack.rows_written, 2);
        assert_eq!(ack.destination, format!("{url}#processed_data"));

        let conn = rusqlite::Connection::open(&db).unwrap();
        let rows: Vec<(i64, String, i64)> = conn
            .prepare("SELECT id, date, amount FROM processed_data ORDER BY id")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (1, "2024-01-01".to_string(), 20),
                (3, "2024-01-03".to_string(), 60),
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_twice_keeps_only_second_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("replace.db");
        let url = format!("sqlite://{}", db.display());

        let first = CsvFileSource::new(write_csv(dir.path(), "a.csv", "id,legacy\n1,x\n"))
            .fetch()
            .await
            .unwrap();
        let second = CsvFileSource::new(write_csv(dir.path(), "b.csv", "id,score\n1,9.5\n2,7\n"))
            .fetch()
            .await
            .unwrap();

        RelationalSink::new(url.as_str(), "results", WriteMode::Replace)
            .persist(&first)
            .await
            .unwrap();
        RelationalSink::new(url.as_str(), "results", WriteMode::Replace)
            .persist(&second)
            .await
            .unwrap();

        let conn = rusqlite::Connection::open(&db).unwrap();
        let columns: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('results')")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(columns, vec!["id", "score"]);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_sink_deadline_leaves_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("deadline.db");
        let url = format!("sqlite://{}", db.display());

        let mut body = String::from("id,label\n");
        for i in 0..200_000 {
            body.push_str(&format!("{i},row{i}\n"));
        }
        let path = write_csv(dir.path(), "large.csv", &body);

        let mut runner = PipelineRunner::new(
            "slow-sink",
            CsvFileSource::new(&path),
            Vec::new(),
            RelationalSink::new(url.as_str(), "t", WriteMode::Append),
        )
        .with_sink_deadline(Some(std::time::Duration::from_millis(5)));
        let result = runner.run().await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage, Stage::Sink);
        assert_eq!(failure.kind(), ErrorKind::SinkUnavailable);

        // Wait for the abandoned writer to release the database lock.
        let conn = rusqlite::Connection::open(&db).unwrap();
        conn.busy_timeout(std::time::Duration::from_secs(30)).unwrap();
        conn.execute_batch("BEGIN IMMEDIATE; ROLLBACK;").unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 't'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
