/// CSV output split across a series of bounded-size files.
///
/// # Module Architecture
///
/// 1. **RotatingCsvWriter**: owns one open file at a time, counts data rows and
///    starts `<base>-2.csv`, `<base>-3.csv`... whenever the configured row
///    limit is reached. The header, when configured, is repeated at the top of
///    every file.
///
/// 2. **CsvFormat**: encodes one row as a record. Fields containing the
///    delimiter, the enclosure, the escape character or whitespace are
///    enclosed, and enclosure characters inside them are doubled.
///
/// 3. **CsvWriterOptions**: the option table (header, max_lines, delimiter,
///    enclosure, escape, eol, add_utf8_bom) as read from a configuration file.
///
/// 4. **SinkFactory**: creates the byte stream behind each physical file.
///    [`sink::FileSinkFactory`] writes buffered binary files; closures can be
///    used to plug in other streams.
///
/// # Examples
///
/// ```
/// use rotating_csv::item::csv::csv_options::{CsvWriterOptions, Eol};
/// use rotating_csv::item::csv::rotating_csv_writer::RotatingCsvWriter;
///
/// # fn main() -> Result<(), rotating_csv::WriterError> {
/// let dir = tempfile::tempdir().unwrap();
/// let options = CsvWriterOptions {
///     delimiter: ";".to_string(),
///     eol: Eol::CrLf,
///     add_utf8_bom: true,
///     ..Default::default()
/// };
///
/// let mut writer = RotatingCsvWriter::from_options(dir.path(), "report", &options)?;
/// writer.write(&["id", "label"])?;
/// writer.write(&["1", "first; second"])?;
/// writer.close()?;
///
/// let bytes = std::fs::read(dir.path().join("report.csv")).unwrap();
/// assert_eq!(bytes, b"\xEF\xBB\xBFid;label\r\n1;\"first; second\"\r\n");
/// # Ok(())
/// # }
/// ```
pub mod csv_encoder;

pub mod csv_options;

pub mod rotating_csv_writer;

pub mod sink;
