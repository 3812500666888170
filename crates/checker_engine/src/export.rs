use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Fail")]
    Fail,
}

impl Verdict {
    pub fn from_alive(alive: bool) -> Self {
        if alive {
            Verdict::Ok
        } else {
            Verdict::Fail
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

/// One exported row. `result` is empty for URLs that were never checked;
/// JSON writes both empty columns as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Result", with = "blank_if_none")]
    pub result: Option<Verdict>,
    #[serde(rename = "Code", with = "blank_if_none")]
    pub status_code: Option<u16>,
}

mod blank_if_none {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Value(T),
        Text(String),
        Null(()),
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        match Field::<T>::deserialize(deserializer)? {
            Field::Value(value) => Ok(Some(value)),
            Field::Text(text) if text.is_empty() => Ok(None),
            Field::Text(text) => Err(D::Error::custom(format!("unexpected value {text:?}"))),
            Field::Null(()) => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain list of URLs, one per line.
    Text,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(ExportFormat::Text),
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export path {0:?} has no file name")]
    MissingFileName(PathBuf),
}

pub fn render_export(records: &[ResultRecord], format: ExportFormat) -> Result<String, ExportError> {
    let rendered = match format {
        ExportFormat::Text => records
            .iter()
            .map(|record| record.url.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        ExportFormat::Csv => render_csv(records),
        ExportFormat::Json => serde_json::to_string(records)?,
    };
    Ok(rendered)
}

pub fn write_export(
    path: &Path,
    records: &[ResultRecord],
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExportError::MissingFileName(path.to_path_buf()))?;
    let content = render_export(records, format)?;
    let written = AtomicFileWriter::for_path(path).write(filename, &content)?;
    Ok(written)
}

fn render_csv(records: &[ResultRecord]) -> String {
    let mut csv = String::from("URL,Result,Code\r\n");
    for record in records {
        let result = record.result.map(|v| v.to_string()).unwrap_or_default();
        let code = record
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{}\r\n",
            csv_field(&record.url),
            result,
            code
        ));
    }
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
