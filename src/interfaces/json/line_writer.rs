use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Writes one compact JSON document per line.
pub struct JsonLineWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_document_per_line() {
        let mut writer = JsonLineWriter::new(Vec::new());
        writer.write(&json!({"step": 1})).unwrap();
        writer.write(&json!({"step": 2, "nested": {"ok": true}})).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec![r#"{"step":1}"#, r#"{"nested":{"ok":true},"step":2}"#]);
    }
}
