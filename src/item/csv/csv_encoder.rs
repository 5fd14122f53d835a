use crate::item::csv::csv_options::Eol;

/// Field and record separators used when encoding a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsvFormat {
    pub delimiter: char,
    pub enclosure: char,
    /// Legacy escape character. An enclosure right after it is not doubled.
    pub escape: Option<char>,
    pub eol: Eol,
}

impl Default for CsvFormat {
    fn default() -> Self {
        CsvFormat {
            delimiter: ',',
            enclosure: '"',
            escape: None,
            eol: Eol::Lf,
        }
    }
}

impl CsvFormat {
    /// Encode `fields` as one record, terminator included, and append it to `out`.
    ///
    /// ```
    /// use rotating_csv::item::csv::csv_encoder::CsvFormat;
    ///
    /// let mut out = Vec::new();
    /// CsvFormat::default().encode_record(&["a a", "bb", "c\"c"], &mut out);
    /// assert_eq!(out, b"\"a a\",bb,\"c\"\"c\"\n");
    /// ```
    pub fn encode_record<S: AsRef<str>>(&self, fields: &[S], out: &mut Vec<u8>) {
        let mut line = String::new();
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                line.push(self.delimiter);
            }
            self.encode_field(field.as_ref(), &mut line);
        }
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(self.eol.as_bytes());
    }

    fn encode_field(&self, field: &str, line: &mut String) {
        if !self.needs_enclosure(field) {
            line.push_str(field);
            return;
        }

        line.push(self.enclosure);
        let mut escaped = false;
        for c in field.chars() {
            if Some(c) == self.escape {
                escaped = true;
            } else if !escaped && c == self.enclosure {
                line.push(self.enclosure);
            } else {
                escaped = false;
            }
            line.push(c);
        }
        line.push(self.enclosure);
    }

    fn needs_enclosure(&self, field: &str) -> bool {
        field.chars().any(|c| {
            c == self.delimiter
                || c == self.enclosure
                || Some(c) == self.escape
                || matches!(c, '\n' | '\r' | '\t' | ' ')
        })
    }
}
