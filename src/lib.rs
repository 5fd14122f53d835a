#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Rotating CSV

 A sequential CSV writer for batch and export jobs that must emit large tabular
 datasets as a series of bounded-size files.

 ## Core Concepts

- **RotatingCsvWriter:** Owns exactly one open output file. Rows are encoded and
  appended to it until the configured row limit is reached, then the file is
  closed and `<base>-2.csv`, `<base>-3.csv`... is started.
- **Header:** An optional record written at the top of every file, original and
  continuation alike. It never counts as a data row.
- **CsvFormat:** Delimiter, enclosure, legacy escape character and record
  terminator (`LF` or `CRLF`) used to encode rows.
- **ItemWriter:** The batch-step output seam. The rotating writer accepts any
  slice of string-like fields as an item.

 ## Options

| **Option**    | **Default** | **Effect**                                  |
|---------------|-------------|---------------------------------------------|
| header        | none        | first record of every file                  |
| max_lines     | unbounded   | data rows per file                          |
| delimiter     | `,`         | field separator                             |
| enclosure     | `"`         | quote character                             |
| escape        | empty       | enclosure after it is not doubled           |
| eol           | `LF`        | record terminator (`LF` or `CRLF`)          |
| add_utf8_bom  | false       | prefix every file with `EF BB BF`           |

 ## Getting Started

```rust
# use rotating_csv::{item::csv::rotating_csv_writer::RotatingCsvWriterBuilder, WriterError};
fn main() -> Result<(), WriterError> {
#   let dir = tempfile::tempdir().unwrap();
#   let export_dir = dir.path();
    let mut writer = RotatingCsvWriterBuilder::new()
        .header(["col1", "col2"])
        .max_lines(3)
        .build(export_dir, "my-csv")?;

    for row in [["a a", "bb"], ["cc", "dd"], ["ee", "ff"], ["gg", "hh"]] {
        writer.write(&row)?;
    }
    writer.close()?;

    // my-csv.csv holds the header and three rows, my-csv-2.csv the header and "gg,hh"
    assert_eq!(writer.total_lines(), 4);
    assert!(writer.current_pathname().unwrap().ends_with("my-csv-2.csv"));

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core traits shared by batch writers
pub mod core;

/// Error types for writer operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Writers (for exemple: the rotating csv writer)
pub mod item;
