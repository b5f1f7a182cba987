//! Human-readable descriptions of configuration sections.

use contracts::{
    ObjectFormat, ObjectStoreConfig, SinkConfig, SourceConfig, TransformConfig, WriteMode,
};

/// Where the source reads from
pub fn source_location(source: &SourceConfig) -> String {
    match source {
        SourceConfig::Http { url } => url.clone(),
        SourceConfig::CsvFile { path, delimiter } => {
            if *delimiter == ',' {
                path.clone()
            } else {
                format!("{path} (delimiter {delimiter:?})")
            }
        }
        SourceConfig::ObjectStore {
            bucket,
            key,
            format,
        } => format!("{bucket}/{key} ({})", format_name(ObjectFormat::resolve(*format, key))),
    }
}

/// Transform kind with its parameters
pub fn transform(transform: &TransformConfig) -> String {
    match transform {
        TransformConfig::DropMissing { columns } => {
            format!("drop_missing columns={}", column_list(columns, "all"))
        }
        TransformConfig::ParseDate { column, format } => {
            format!("parse_date column={column} format={format}")
        }
        TransformConfig::Scale { factor, columns } => {
            format!("scale factor={factor} columns={}", column_list(columns, "all numeric"))
        }
    }
}

fn column_list(columns: &[String], empty: &str) -> String {
    if columns.is_empty() {
        empty.to_string()
    } else {
        format!("[{}]", columns.join(", "))
    }
}

/// Where the sink writes to
pub fn sink_destination(sink: &SinkConfig) -> String {
    match sink {
        SinkConfig::ObjectStore {
            bucket,
            key,
            format,
        } => format!("{bucket}/{key} ({})", format_name(ObjectFormat::resolve(*format, key))),
        SinkConfig::Relational { url, table, mode } => {
            format!("{url} table '{table}' ({})", mode_name(*mode))
        }
        SinkConfig::Log => "tracing log".to_string(),
    }
}

/// Backend name with its settings
pub fn object_store(store: &ObjectStoreConfig) -> String {
    match store {
        ObjectStoreConfig::S3 {
            region,
            endpoint,
            profile,
        } => {
            let mut parts = vec!["s3".to_string()];
            if let Some(region) = region {
                parts.push(format!("region={region}"));
            }
            if let Some(endpoint) = endpoint {
                parts.push(format!("endpoint={endpoint}"));
            }
            if let Some(profile) = profile {
                parts.push(format!("profile={profile}"));
            }
            parts.join(" ")
        }
        ObjectStoreConfig::Local { root } => format!("local root={root}"),
        ObjectStoreConfig::Memory => "memory".to_string(),
    }
}

pub fn mode_name(mode: WriteMode) -> &'static str {
    match mode {
        WriteMode::Replace => "replace",
        WriteMode::Append => "append",
    }
}

fn format_name(format: ObjectFormat) -> &'static str {
    match format {
        ObjectFormat::Json => "json",
        ObjectFormat::Csv => "csv",
    }
}
