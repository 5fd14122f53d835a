use crate::error::WriterError;

/// Output side of a batch step: receives items one at a time and owns whatever
/// resource they end up in.
pub trait ItemWriter<W: ?Sized> {
    fn write(&mut self, item: &W) -> Result<(), WriterError>;

    /// Flush buffered output to the underlying resource.
    fn flush(&mut self) -> Result<(), WriterError>;

    fn close(&mut self) -> Result<(), WriterError> {
        Ok(())
    }

    /// Write every item of a chunk, stopping at the first failure.
    ///
    /// Returns the number of items written.
    fn write_all_items<'a, I>(&mut self, items: I) -> Result<usize, WriterError>
    where
        I: IntoIterator<Item = &'a W>,
        W: 'a,
    {
        let mut written = 0;
        for item in items {
            self.write(item)?;
            written += 1;
        }
        Ok(written)
    }
}
