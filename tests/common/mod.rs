pub mod mocks;

use std::{fs, path::Path};


/// Assert that `dir/filename` holds exactly `rows`, each followed by `eol`,
/// after the optional `prefix` bytes.
pub fn assert_csv_file(dir: &Path, filename: &str, rows: &[&str], eol: &str, prefix: &[u8]) {
    let path = dir.join(filename);
    assert!(path.exists(), "File not found: {}", path.display());

    let mut expected = prefix.to_vec();
    for row in rows {
        expected.extend_from_slice(row.as_bytes());
        expected.extend_from_slice(eol.as_bytes());
    }
    let content = fs::read(&path).unwrap();
    assert_eq!(
        String::from_utf8_lossy(&content),
        String::from_utf8_lossy(&expected),
        "Content not same in {filename}"
    );
    assert_eq!(content, expected);
}
