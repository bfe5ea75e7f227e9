//! Newline-delimited message framing over stdin and stdout.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// Reads one JSON message per line and writes one per line.
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdioTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next non-empty line, or `None` at end of input.
    pub fn read_message(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    pub fn write_message(&mut self, message: &str) -> io::Result<()> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    #[cfg(test)]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_skips_blank_lines_and_stops_at_eof() {
        let input = Cursor::new("\n{\"a\":1}\r\n\n  \n{\"b\":2}");
        let mut transport = StdioTransport::new(input, Vec::new());
        assert_eq!(transport.read_message().unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(transport.read_message().unwrap().as_deref(), Some("{\"b\":2}"));
        assert_eq!(transport.read_message().unwrap(), None);
    }

    #[test]
    fn test_writes_one_line_per_message() {
        let mut transport = StdioTransport::new(Cursor::new(""), Vec::new());
        transport.write_message("{}").unwrap();
        transport.write_message("[]").unwrap();
        assert_eq!(transport.into_writer(), b"{}\n[]\n");
    }
}
