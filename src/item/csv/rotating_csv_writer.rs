use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    core::item::ItemWriter,
    error::WriterError,
    item::csv::{
        csv_encoder::CsvFormat,
        csv_options::{
            CsvWriterOptions, Eol, WriterConfig, resolve_directory, validate_base_filename,
        },
        sink::{FileSinkFactory, SinkFactory},
    },
};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Counters and bookkeeping of a writer, separate from the open stream.
#[derive(Debug, Default)]
struct WriterState {
    file_sequence: u64,
    lines_in_current_file: u64,
    total_lines: u64,
    current_pathname: Option<PathBuf>,
    written_files: Vec<PathBuf>,
}

/// A CSV writer that starts a new file every `max_lines` data rows.
///
/// Files are named `<base>.csv`, `<base>-2.csv`, `<base>-3.csv`... inside the
/// configured directory. When a header is configured it is the first record of
/// every file and is never counted as a data row.
///
/// ```
/// use rotating_csv::item::csv::rotating_csv_writer::RotatingCsvWriterBuilder;
///
/// # fn main() -> Result<(), rotating_csv::WriterError> {
/// let dir = tempfile::tempdir().unwrap();
/// let mut writer = RotatingCsvWriterBuilder::new()
///     .header(["col1", "col2"])
///     .max_lines(2)
///     .build(dir.path(), "export")?;
///
/// writer.write(&["a", "b"])?;
/// writer.write(&["c", "d"])?;
/// writer.write(&["e", "f"])?;
/// writer.close()?;
///
/// assert_eq!(writer.total_lines(), 3);
/// assert_eq!(writer.file_count(), 2);
/// assert_eq!(
///     std::fs::read_to_string(dir.path().join("export-2.csv")).unwrap(),
///     "col1,col2\ne,f\n"
/// );
/// # Ok(())
/// # }
/// ```
pub struct RotatingCsvWriter<F: SinkFactory = FileSinkFactory> {
    config: WriterConfig,
    factory: F,
    sink: Option<F::Sink>,
    state: WriterState,
    buffer: Vec<u8>,
}

impl RotatingCsvWriter<FileSinkFactory> {
    /// Build a file-backed writer from an option table.
    pub fn from_options<P: AsRef<Path>>(
        directory: P,
        base_filename: &str,
        options: &CsvWriterOptions,
    ) -> Result<Self, WriterError> {
        options.to_builder()?.build(directory, base_filename)
    }
}

impl<F: SinkFactory> RotatingCsvWriter<F> {
    fn new(config: WriterConfig, factory: F) -> Result<Self, WriterError> {
        let mut writer = RotatingCsvWriter {
            config,
            factory,
            sink: None,
            state: WriterState::default(),
            buffer: Vec::new(),
        };
        writer.open()?;
        Ok(writer)
    }

    fn open(&mut self) -> Result<(), WriterError> {
        if self.sink.is_some() {
            return Err(WriterError::AlreadyOpen(self.config.base_filename.clone()));
        }

        self.state.file_sequence += 1;
        self.state.lines_in_current_file = 0;
        let pathname = self
            .config
            .directory
            .join(self.config.file_name(self.state.file_sequence));

        let mut sink = self.factory.create(&pathname).map_err(|error| {
            WriterError::io(
                format!(
                    "Error during the opening of the {} file",
                    pathname.display()
                ),
                error,
            )
        })?;
        debug!(
            "Opened CSV file {} with {} line endings",
            pathname.display(),
            self.config.format.eol
        );
        self.state.current_pathname = Some(pathname.clone());
        self.state.written_files.push(pathname);

        if self.config.add_utf8_bom {
            sink.write_all(&UTF8_BOM).map_err(|error| {
                WriterError::io(
                    format!(
                        "Error during the UTF8-BOM writing in {} file",
                        self.config.base_filename
                    ),
                    error,
                )
            })?;
        }
        self.sink = Some(sink);

        if let Some(header) = self.config.header.clone() {
            self.write_record(&header)?;
        }
        Ok(())
    }

    /// Encode `fields` into the open sink without touching the counters.
    fn write_record<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), WriterError> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| WriterError::NotOpen(self.config.base_filename.clone()))?;

        self.buffer.clear();
        self.config.format.encode_record(fields, &mut self.buffer);
        sink.write_all(&self.buffer).map_err(|error| {
            WriterError::io(
                format!(
                    "Error during the writing in {} file",
                    self.config.base_filename
                ),
                error,
            )
        })
    }

    fn rotate(&mut self) -> Result<(), WriterError> {
        self.close()?;
        self.open()?;
        info!(
            "Rotated to CSV file {} after {} lines",
            self.config.file_name(self.state.file_sequence),
            self.state.total_lines
        );
        Ok(())
    }

    /// Append one data row, rotating to a new file first when the current one is full.
    ///
    /// If the header cannot be written to a freshly rotated file, that file stays
    /// open without a header and a retried `write` appends the row to it.
    pub fn write<S: AsRef<str>>(&mut self, row: &[S]) -> Result<(), WriterError> {
        if self.sink.is_none() {
            return Err(WriterError::NotOpen(self.config.base_filename.clone()));
        }

        if self
            .config
            .max_lines
            .is_some_and(|max_lines| self.state.lines_in_current_file == max_lines)
        {
            self.rotate()?;
        }

        self.write_record(row)?;
        self.state.lines_in_current_file += 1;
        self.state.total_lines += 1;
        Ok(())
    }

    /// Flush buffered rows of the current file. Does nothing once closed.
    pub fn flush(&mut self) -> Result<(), WriterError> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush().map_err(|error| {
                WriterError::io(
                    format!(
                        "Error during the flushing of {} file",
                        self.config.base_filename
                    ),
                    error,
                )
            }),
            None => Ok(()),
        }
    }

    /// Flush and release the current file. Calling it again is a no-op.
    ///
    /// The file is released even when the final flush fails.
    pub fn close(&mut self) -> Result<(), WriterError> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };

        let result = sink.flush();
        drop(sink);
        result.map_err(|error| {
            WriterError::io(
                format!(
                    "Error during the closing of {} file",
                    self.config.base_filename
                ),
                error,
            )
        })?;

        if let Some(pathname) = &self.state.current_pathname {
            info!(
                "Closed CSV file {} with {} lines",
                pathname.display(),
                self.state.lines_in_current_file
            );
        }
        Ok(())
    }

    /// Data rows written so far, headers excluded.
    pub fn total_lines(&self) -> u64 {
        self.state.total_lines
    }

    /// Data rows in the current (or last) file.
    pub fn lines_in_current_file(&self) -> u64 {
        self.state.lines_in_current_file
    }

    /// Path of the most recently opened file. Still available after `close`.
    pub fn current_pathname(&self) -> Option<&Path> {
        self.state.current_pathname.as_deref()
    }

    pub fn file_count(&self) -> u64 {
        self.state.file_sequence
    }

    /// Every file opened by this writer, in order.
    pub fn written_files(&self) -> &[PathBuf] {
        &self.state.written_files
    }

    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }
}

impl<F: SinkFactory, S: AsRef<str>> ItemWriter<[S]> for RotatingCsvWriter<F> {
    fn write(&mut self, item: &[S]) -> Result<(), WriterError> {
        RotatingCsvWriter::write(self, item)
    }

    fn flush(&mut self) -> Result<(), WriterError> {
        RotatingCsvWriter::flush(self)
    }

    fn close(&mut self) -> Result<(), WriterError> {
        RotatingCsvWriter::close(self)
    }
}

impl<F: SinkFactory> Drop for RotatingCsvWriter<F> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!("Unable to close CSV file on drop: {error}");
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RotatingCsvWriterBuilder {
    header: Option<Vec<String>>,
    max_lines: Option<u64>,
    format: CsvFormat,
    add_utf8_bom: bool,
}

impl RotatingCsvWriterBuilder {
    pub fn new() -> RotatingCsvWriterBuilder {
        RotatingCsvWriterBuilder::default()
    }

    /// Header record repeated at the top of every file. An empty header means none.
    pub fn header<I, S>(mut self, header: I) -> RotatingCsvWriterBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        self.header = if header.is_empty() { None } else { Some(header) };
        self
    }

    /// Data rows per file. Zero means unbounded.
    pub fn max_lines(mut self, max_lines: u64) -> RotatingCsvWriterBuilder {
        self.max_lines = if max_lines == 0 { None } else { Some(max_lines) };
        self
    }

    pub fn get_max_lines(&self) -> Option<u64> {
        self.max_lines
    }

    pub fn delimiter(mut self, delimiter: char) -> RotatingCsvWriterBuilder {
        self.format.delimiter = delimiter;
        self
    }

    pub fn enclosure(mut self, enclosure: char) -> RotatingCsvWriterBuilder {
        self.format.enclosure = enclosure;
        self
    }

    pub fn escape(mut self, escape: char) -> RotatingCsvWriterBuilder {
        self.format.escape = Some(escape);
        self
    }

    pub fn eol(mut self, eol: Eol) -> RotatingCsvWriterBuilder {
        self.format.eol = eol;
        self
    }

    pub fn add_utf8_bom(mut self, yes: bool) -> RotatingCsvWriterBuilder {
        self.add_utf8_bom = yes;
        self
    }

    /// Validate the configuration and open the first file in `directory`.
    pub fn build<P: AsRef<Path>>(
        self,
        directory: P,
        base_filename: &str,
    ) -> Result<RotatingCsvWriter<FileSinkFactory>, WriterError> {
        self.build_with_factory(directory, base_filename, FileSinkFactory)
    }

    /// Same as [`build`](Self::build) with a custom source of byte streams.
    pub fn build_with_factory<P: AsRef<Path>, F: SinkFactory>(
        self,
        directory: P,
        base_filename: &str,
        factory: F,
    ) -> Result<RotatingCsvWriter<F>, WriterError> {
        if self.format.delimiter == self.format.enclosure {
            return Err(WriterError::Configuration(format!(
                "Delimiter and enclosure must differ, both are {:?}",
                self.format.delimiter
            )));
        }
        if self.format.escape == Some(self.format.enclosure) {
            return Err(WriterError::Configuration(format!(
                "Escape and enclosure must differ, both are {:?}",
                self.format.enclosure
            )));
        }
        validate_base_filename(base_filename)?;
        let directory = resolve_directory(directory.as_ref())?;

        let config = WriterConfig {
            directory,
            base_filename: base_filename.to_string(),
            header: self.header,
            max_lines: self.max_lines,
            format: self.format,
            add_utf8_bom: self.add_utf8_bom,
        };
        RotatingCsvWriter::new(config, factory)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::BTreeMap,
        io::{self, Write},
        path::{Path, PathBuf},
        rc::Rc,
    };

    use super::RotatingCsvWriterBuilder;
    use crate::{core::item::ItemWriter, error::WriterError};

    type Files = Rc<RefCell<BTreeMap<PathBuf, Vec<u8>>>>;

    /// In-memory stream that lands in a shared map when flushed.
    struct MemorySink {
        path: PathBuf,
        buffer: Vec<u8>,
        files: Files,
    }

    impl Write for MemorySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.files
                .borrow_mut()
                .insert(self.path.clone(), self.buffer.clone());
            Ok(())
        }
    }

    fn memory_factory(files: Files) -> impl FnMut(&Path) -> io::Result<MemorySink> {
        move |path: &Path| {
            Ok(MemorySink {
                path: path.to_path_buf(),
                buffer: Vec::new(),
                files: Rc::clone(&files),
            })
        }
    }

    fn contents(files: &Files, name: &str) -> String {
        let files = files.borrow();
        let (_, bytes) = files
            .iter()
            .find(|(path, _)| path.file_name().is_some_and(|file| file == name))
            .unwrap_or_else(|| panic!("{name} was not written"));
        String::from_utf8(bytes.clone()).unwrap()
    }

    #[test]
    fn rotates_before_the_row_that_exceeds_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .max_lines(3)
            .build_with_factory(dir.path(), "my-csv", memory_factory(Rc::clone(&files)))
            .unwrap();

        for row in [["a a", "bb"], ["cc", "dd"], ["ee", "ff"]] {
            writer.write(&row).unwrap();
        }
        assert_eq!(writer.file_count(), 1);
        assert_eq!(writer.lines_in_current_file(), 3);

        writer.write(&["gg", "hh"]).unwrap();
        assert_eq!(writer.file_count(), 2);
        assert_eq!(writer.lines_in_current_file(), 1);
        writer.close().unwrap();

        assert_eq!(contents(&files, "my-csv.csv"), "\"a a\",bb\ncc,dd\nee,ff\n");
        assert_eq!(contents(&files, "my-csv-2.csv"), "gg,hh\n");
        assert_eq!(writer.total_lines(), 4);
    }

    #[test]
    fn header_is_repeated_and_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .header(["col1", "col2"])
            .max_lines(1)
            .build_with_factory(dir.path(), "my-csv", memory_factory(Rc::clone(&files)))
            .unwrap();
        assert_eq!(writer.total_lines(), 0);
        assert_eq!(writer.lines_in_current_file(), 0);

        writer.write(&["a", "b"]).unwrap();
        writer.write(&["c", "d"]).unwrap();
        writer.close().unwrap();

        assert_eq!(contents(&files, "my-csv.csv"), "col1,col2\na,b\n");
        assert_eq!(contents(&files, "my-csv-2.csv"), "col1,col2\nc,d\n");
        assert_eq!(writer.total_lines(), 2);
    }

    #[test]
    fn bom_starts_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .add_utf8_bom(true)
            .max_lines(1)
            .build_with_factory(dir.path(), "bom", memory_factory(Rc::clone(&files)))
            .unwrap();
        writer.write(&["a"]).unwrap();
        writer.write(&["b"]).unwrap();
        writer.close().unwrap();

        assert_eq!(contents(&files, "bom.csv"), "\u{feff}a\n");
        assert_eq!(contents(&files, "bom-2.csv"), "\u{feff}b\n");
    }

    #[test]
    fn write_after_close_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .build_with_factory(dir.path(), "my-csv", memory_factory(Rc::clone(&files)))
            .unwrap();
        writer.write(&["a a", "bb"]).unwrap();
        writer.close().unwrap();
        assert!(!writer.is_open());

        let error = writer.write(&["cc", "dd"]).unwrap_err();
        assert!(matches!(error, WriterError::NotOpen(_)));
        assert_eq!(error.to_string(), "Handle does not exist. File my-csv");
        assert_eq!(writer.total_lines(), 1);
    }

    #[test]
    fn close_is_idempotent_and_keeps_pathname() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .build_with_factory(dir.path(), "my-csv", memory_factory(Rc::clone(&files)))
            .unwrap();
        writer.write(&["a"]).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();

        assert_eq!(writer.total_lines(), 1);
        let pathname = writer.current_pathname().unwrap();
        assert!(pathname.is_absolute());
        assert!(pathname.ends_with("my-csv.csv"));
    }

    #[test]
    fn opening_twice_is_an_invariant_violation() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .build_with_factory(dir.path(), "my-csv", memory_factory(Rc::clone(&files)))
            .unwrap();

        assert!(matches!(writer.open(), Err(WriterError::AlreadyOpen(_))));
        assert_eq!(writer.file_count(), 1);
    }

    #[test]
    fn item_writer_writes_a_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        let mut writer = RotatingCsvWriterBuilder::new()
            .max_lines(2)
            .build_with_factory(dir.path(), "chunk", memory_factory(Rc::clone(&files)))
            .unwrap();

        let rows = [vec!["1", "a"], vec!["2", "b"], vec!["3", "c"]];
        let written = writer
            .write_all_items(rows.iter().map(|row| row.as_slice()))
            .unwrap();
        ItemWriter::<[&str]>::close(&mut writer).unwrap();

        assert_eq!(written, 3);
        assert_eq!(contents(&files, "chunk.csv"), "1,a\n2,b\n");
        assert_eq!(contents(&files, "chunk-2.csv"), "3,c\n");
    }

    #[test]
    fn drop_flushes_the_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = Files::default();
        {
            let mut writer = RotatingCsvWriterBuilder::new()
                .build_with_factory(dir.path(), "dropped", memory_factory(Rc::clone(&files)))
                .unwrap();
            writer.write(&["a", "b"]).unwrap();
        }
        assert_eq!(contents(&files, "dropped.csv"), "a,b\n");
    }

    #[test]
    fn delimiter_equal_to_enclosure_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = RotatingCsvWriterBuilder::new()
            .delimiter('"')
            .build(dir.path(), "my-csv");
        assert!(matches!(result, Err(WriterError::Configuration(_))));
    }

    #[test]
    fn escape_equal_to_enclosure_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = RotatingCsvWriterBuilder::new()
            .escape('"')
            .build(dir.path(), "my-csv");

        match result {
            Err(WriterError::Configuration(message)) => {
                assert_eq!(message, "Escape and enclosure must differ, both are '\"'")
            }
            _ => panic!("expected a configuration error"),
        }
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn escape_equal_to_custom_enclosure_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = RotatingCsvWriterBuilder::new()
            .enclosure('#')
            .escape('#')
            .build(dir.path(), "my-csv");
        assert!(matches!(result, Err(WriterError::Configuration(_))));
    }
}
