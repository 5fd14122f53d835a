use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Creates the byte stream backing one physical CSV file.
///
/// Any `FnMut(&Path) -> io::Result<W>` closure is a factory, which lets tests
/// substitute in-memory or failing streams.
pub trait SinkFactory {
    type Sink: Write;

    fn create(&mut self, path: &Path) -> io::Result<Self::Sink>;
}

/// Buffered file output. Files are truncated when they already exist and are
/// never subject to line-ending translation.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSinkFactory;

impl SinkFactory for FileSinkFactory {
    type Sink = BufWriter<File>;

    fn create(&mut self, path: &Path) -> io::Result<Self::Sink> {
        File::create(path).map(BufWriter::new)
    }
}

impl<F, W> SinkFactory for F
where
    F: FnMut(&Path) -> io::Result<W>,
    W: Write,
{
    type Sink = W;

    fn create(&mut self, path: &Path) -> io::Result<W> {
        self(path)
    }
}
