//! Byte streams standing in for the files a writer creates.
use mockall::mock;

use std::io::{self, Write};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

/// A stream that accepts every byte and flushes cleanly.
pub fn healthy_file() -> MockFile {
    let mut file = MockFile::new();
    file.expect_write().returning(|buf| Ok(buf.len()));
    file.expect_flush().returning(|| Ok(()));
    file
}

/// A stream whose writes all fail with `message`. Flushing still succeeds so
/// the writer can release it.
pub fn failing_file(message: &'static str) -> MockFile {
    let mut file = MockFile::new();
    file.expect_write()
        .returning(move |_| Err(io::Error::other(message)));
    file.expect_flush().returning(|| Ok(()));
    file
}
