use anyhow::Result;
use std::collections::VecDeque;

/// Byte ring for line-oriented SSE framing.
///
/// Provider chunks are not aligned to lines, so bytes are accumulated and
/// complete lines are drained from the front.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Next complete line, trimmed. `None` until a `\n` has arrived.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        match String::from_utf8(line_bytes) {
            Ok(line) => Some(Ok(line.trim().to_string())),
            Err(e) => Some(Err(anyhow::anyhow!("Invalid UTF-8 in stream line: {}", e))),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_in_order() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"data: a\r\ndata: b\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: a");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: b");
        assert!(buffer.next_line().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line_waits_for_newline() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"data: {\"cont");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.len(), 12);

        buffer.extend(b"ent\":1}\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: {\"content\":1}");
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut buffer = CircularLineBuffer::with_capacity(16);
        let bytes = "pena\u{e7}\u{e3}o\n".as_bytes();

        buffer.extend(&bytes[..5]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&bytes[5..]);

        assert_eq!(buffer.next_line().unwrap().unwrap(), "pena\u{e7}\u{e3}o");
    }
}
