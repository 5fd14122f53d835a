//! Writer configuration: the end-of-line style, the validated [`WriterConfig`]
//! and the [`CsvWriterOptions`] table that can be loaded from a config file.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::{
    error::WriterError,
    item::csv::{csv_encoder::CsvFormat, rotating_csv_writer::RotatingCsvWriterBuilder},
};

/// Record terminator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Eol {
    #[default]
    Lf,
    CrLf,
}

impl Eol {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Eol::Lf => b"\n",
            Eol::CrLf => b"\r\n",
        }
    }
}

impl FromStr for Eol {
    type Err = WriterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "LF" => Ok(Eol::Lf),
            "CRLF" | "CR+LF" => Ok(Eol::CrLf),
            _ => Err(WriterError::Configuration(format!(
                "Unknown eol {value:?}, expected LF or CRLF"
            ))),
        }
    }
}

impl TryFrom<String> for Eol {
    type Error = WriterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Eol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eol::Lf => f.write_str("LF"),
            Eol::CrLf => f.write_str("CRLF"),
        }
    }
}

/// Immutable configuration of a [`RotatingCsvWriter`](super::rotating_csv_writer::RotatingCsvWriter).
///
/// Only built through [`RotatingCsvWriterBuilder`], which validates every field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    pub(crate) directory: PathBuf,
    pub(crate) base_filename: String,
    pub(crate) header: Option<Vec<String>>,
    pub(crate) max_lines: Option<u64>,
    pub(crate) format: CsvFormat,
    pub(crate) add_utf8_bom: bool,
}

impl WriterConfig {
    /// Canonical directory the files are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base_filename(&self) -> &str {
        &self.base_filename
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Maximum number of data rows per physical file, `None` when unbounded.
    pub fn max_lines(&self) -> Option<u64> {
        self.max_lines
    }

    pub fn format(&self) -> &CsvFormat {
        &self.format
    }

    pub fn add_utf8_bom(&self) -> bool {
        self.add_utf8_bom
    }

    /// File name of the `sequence`-th physical file: `<base>.csv`, then `<base>-2.csv`, ...
    pub fn file_name(&self, sequence: u64) -> String {
        if sequence > 1 {
            format!("{}-{}.csv", self.base_filename, sequence)
        } else {
            format!("{}.csv", self.base_filename)
        }
    }
}

/// Resolve `directory` to a canonical path and check it can receive files.
pub(crate) fn resolve_directory(directory: &Path) -> Result<PathBuf, WriterError> {
    let unusable = || {
        WriterError::Configuration(format!(
            "Folder {} does not exist or is not writable",
            directory.display()
        ))
    };

    let real_path = fs::canonicalize(directory).map_err(|_| unusable())?;
    let metadata = fs::metadata(&real_path).map_err(|_| unusable())?;
    if !metadata.is_dir() || metadata.permissions().readonly() {
        return Err(unusable());
    }
    Ok(real_path)
}

pub(crate) fn validate_base_filename(base_filename: &str) -> Result<(), WriterError> {
    if base_filename.is_empty() {
        return Err(WriterError::Configuration(
            "Base filename must not be empty".to_string(),
        ));
    }
    if base_filename.contains(['/', '\\']) {
        return Err(WriterError::Configuration(format!(
            "Base filename {base_filename} must not contain a path separator"
        )));
    }
    Ok(())
}

/// Writer options as they appear in a configuration file.
///
/// ```
/// use rotating_csv::item::csv::csv_options::{CsvWriterOptions, Eol};
///
/// let options: CsvWriterOptions = serde_json::from_str(
///     r#"{ "header": ["col1", "col2"], "max_lines": 3, "eol": "CR+LF" }"#,
/// ).unwrap();
///
/// assert_eq!(options.max_lines, Some(3));
/// assert_eq!(options.eol, Eol::CrLf);
/// assert_eq!(options.delimiter, ",");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvWriterOptions {
    pub header: Vec<String>,
    /// Zero or negative means unbounded.
    pub max_lines: Option<i64>,
    pub delimiter: String,
    pub enclosure: String,
    /// Empty disables the legacy escape character.
    pub escape: String,
    pub eol: Eol,
    pub add_utf8_bom: bool,
}

impl Default for CsvWriterOptions {
    fn default() -> Self {
        CsvWriterOptions {
            header: Vec::new(),
            max_lines: None,
            delimiter: ",".to_string(),
            enclosure: "\"".to_string(),
            escape: String::new(),
            eol: Eol::Lf,
            add_utf8_bom: false,
        }
    }
}

impl CsvWriterOptions {
    /// Check the single-character options and turn the table into a builder.
    pub fn to_builder(&self) -> Result<RotatingCsvWriterBuilder, WriterError> {
        let delimiter = single_char("delimiter", &self.delimiter)?;
        let enclosure = single_char("enclosure", &self.enclosure)?;
        let escape = optional_char("escape", &self.escape)?;

        let mut builder = RotatingCsvWriterBuilder::new()
            .header(self.header.iter())
            .delimiter(delimiter)
            .enclosure(enclosure)
            .eol(self.eol)
            .add_utf8_bom(self.add_utf8_bom);
        if let Some(max_lines) = self.max_lines.filter(|max| *max > 0) {
            builder = builder.max_lines(max_lines as u64);
        }
        if let Some(escape) = escape {
            builder = builder.escape(escape);
        }
        Ok(builder)
    }
}

fn single_char(option: &str, value: &str) -> Result<char, WriterError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(WriterError::Configuration(format!(
            "Option {option} must be a single character, got {value:?}"
        ))),
    }
}

fn optional_char(option: &str, value: &str) -> Result<Option<char>, WriterError> {
    if value.is_empty() {
        return Ok(None);
    }
    single_char(option, value).map(Some)
}
