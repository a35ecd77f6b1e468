// ABOUTME: Storage collaborator that persists named artifacts for one run.
// ABOUTME: Defines the Sink trait, DirSink (filesystem) and MemorySink, and the artifact naming scheme.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::category::Category;
use crate::error::ScrapeError;
use crate::extract::{ArtifactSet, ExtractedField};

pub mod archive;

/// Destination for named artifacts.
///
/// Names are plain file names, unique within one run.
pub trait Sink {
    /// Writes `lines` joined with `\n`.
    fn put_text(&mut self, name: &str, lines: &[String]) -> Result<(), ScrapeError>;

    /// Writes a pretty-printed JSON document.
    fn put_json(&mut self, name: &str, value: &serde_json::Value) -> Result<(), ScrapeError>;

    /// Writes rows as CSV; rows may have different lengths.
    fn put_csv(&mut self, name: &str, rows: &[Vec<String>]) -> Result<(), ScrapeError>;

    /// Writes raw bytes, e.g. a downloaded media item.
    fn put_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ScrapeError>;
}

/// Name of the list artifact for a text or URL category.
pub fn text_artifact_name(category: Category) -> String {
    format!("{}.txt", category.name())
}

/// Name of the CSV artifact for the table at `index`.
pub fn table_artifact_name(index: usize) -> String {
    format!("table_{}.csv", index)
}

pub const PERSONAL_ARTIFACT_NAME: &str = "personal.json";

/// Writes every entry of `artifacts` to `sink` and returns the artifact names in write order.
///
/// The first failing write aborts the run.
pub fn write_artifacts(
    sink: &mut dyn Sink,
    artifacts: &ArtifactSet,
) -> Result<Vec<String>, ScrapeError> {
    let mut written = Vec::new();
    for (category, field) in artifacts.iter() {
        match field {
            ExtractedField::Strings(lines) | ExtractedField::Urls(lines) => {
                let name = text_artifact_name(category);
                sink.put_text(&name, lines)?;
                written.push(name);
            }
            ExtractedField::Tables(tables) => {
                for (index, table) in tables.iter().enumerate() {
                    let name = table_artifact_name(index);
                    sink.put_csv(&name, &table.rows)?;
                    written.push(name);
                }
            }
            ExtractedField::Personal(info) => {
                let value = serde_json::to_value(info).map_err(|e| {
                    ScrapeError::sink(PERSONAL_ARTIFACT_NAME, "WriteArtifacts", Some(e.into()))
                })?;
                sink.put_json(PERSONAL_ARTIFACT_NAME, &value)?;
                written.push(PERSONAL_ARTIFACT_NAME.to_string());
            }
        }
    }
    Ok(written)
}

fn csv_bytes(rows: &[Vec<String>]) -> Result<Vec<u8>, anyhow::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    Ok(writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?)
}

fn json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, anyhow::Error> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Sink writing artifacts as files in one output directory.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Creates the output directory (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ScrapeError::sink(dir.display().to_string(), "CreateDir", Some(e.into()))
        })?;
        Ok(Self { dir })
    }

    /// Like `create`, but first removes every entry already in the directory.
    pub fn create_clean(dir: impl Into<PathBuf>) -> Result<Self, ScrapeError> {
        let dir = dir.into();
        if dir.is_dir() {
            clear_dir(&dir).map_err(|e| {
                ScrapeError::sink(dir.display().to_string(), "CleanDir", Some(e.into()))
            })?;
        }
        Self::create(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), ScrapeError> {
        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(|e| {
            ScrapeError::sink(path.display().to_string(), "WriteArtifact", Some(e.into()))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
        Ok(())
    }
}

impl Sink for DirSink {
    fn put_text(&mut self, name: &str, lines: &[String]) -> Result<(), ScrapeError> {
        self.write(name, lines.join("\n").as_bytes())
    }

    fn put_json(&mut self, name: &str, value: &serde_json::Value) -> Result<(), ScrapeError> {
        let bytes = json_bytes(value)
            .map_err(|e| ScrapeError::sink(name, "EncodeJson", Some(e)))?;
        self.write(name, &bytes)
    }

    fn put_csv(&mut self, name: &str, rows: &[Vec<String>]) -> Result<(), ScrapeError> {
        let bytes = csv_bytes(rows).map_err(|e| ScrapeError::sink(name, "EncodeCsv", Some(e)))?;
        self.write(name, &bytes)
    }

    fn put_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ScrapeError> {
        self.write(name, bytes)
    }
}

fn clear_dir(dir: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Sink keeping artifacts in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The artifact decoded as UTF-8 (lossy).
    pub fn text(&self, name: &str) -> Option<String> {
        self.artifacts
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Sink for MemorySink {
    fn put_text(&mut self, name: &str, lines: &[String]) -> Result<(), ScrapeError> {
        self.artifacts
            .insert(name.to_string(), lines.join("\n").into_bytes());
        Ok(())
    }

    fn put_json(&mut self, name: &str, value: &serde_json::Value) -> Result<(), ScrapeError> {
        let bytes = json_bytes(value)
            .map_err(|e| ScrapeError::sink(name, "EncodeJson", Some(e)))?;
        self.artifacts.insert(name.to_string(), bytes);
        Ok(())
    }

    fn put_csv(&mut self, name: &str, rows: &[Vec<String>]) -> Result<(), ScrapeError> {
        let bytes = csv_bytes(rows).map_err(|e| ScrapeError::sink(name, "EncodeCsv", Some(e)))?;
        self.artifacts.insert(name.to_string(), bytes);
        Ok(())
    }

    fn put_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ScrapeError> {
        self.artifacts.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
