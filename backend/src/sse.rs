//! Server-sent events framing shared by the chat endpoint, the language
//! model adapter and the terminal client.
//!
//! Only the `data:` field is used. Frames are separated by a blank line and
//! the UI message stream ends with a `[DONE]` sentinel.

use bytes::Bytes;

/// Payload of the frame that closes a UI message stream.
pub const DONE: &str = "[DONE]";

/// Encode one `data:` frame.
///
/// # Examples
/// ```
/// assert_eq!(hello_assistant::sse::frame("{}"), "data: {}\n\n");
/// ```
#[must_use]
pub fn frame(data: &str) -> String {
    format!("data: {data}\n\n")
}

/// Incremental decoder turning a byte stream into `data:` payloads.
///
/// Bytes are buffered until a blank line closes the event, so multi-byte
/// characters split across network chunks decode correctly. Carriage returns
/// are dropped so `\r\n` framing is accepted too.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes to the buffer.
    pub fn push_bytes(&mut self, chunk: &Bytes) {
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
    }

    /// Extract the `data:` payloads of every complete event in the buffer.
    ///
    /// Multiple `data:` lines in one event are joined with `\n`; events with
    /// no data lines (comments, keep-alives) are skipped.
    pub fn extract_data(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();
        while let Some(pos) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            let text = String::from_utf8_lossy(&block[..pos]);
            if let Some(data) = data_of(&text) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload of a trailing event that was not closed by a blank line.
    pub fn finish(self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buffer);
        data_of(text.trim_end_matches('\n'))
    }

    /// Return the remaining (incomplete) data in the buffer.
    pub fn residue(&self) -> &[u8] {
        &self.buffer
    }
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\n\n")
}

fn data_of(block: &str) -> Option<String> {
    let lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn extracts_complete_events() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&Bytes::from("data: {\"x\":1}\n\ndata: [DONE]\n\n"));
        assert_eq!(buf.extract_data(), vec!["{\"x\":1}", "[DONE]"]);
        assert!(buf.residue().is_empty());
    }

    #[rstest]
    fn keeps_partial_event_until_closed() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&Bytes::from("data: hel"));
        assert!(buf.extract_data().is_empty());
        buf.push_bytes(&Bytes::from("lo\n\n"));
        assert_eq!(buf.extract_data(), vec!["hello"]);
    }

    #[rstest]
    fn joins_split_multibyte_characters() {
        let encoded = "data: 回答\n\n".as_bytes().to_vec();
        let (head, tail) = encoded.split_at(8);
        let mut buf = SseBuffer::new();
        buf.push_bytes(&Bytes::copy_from_slice(head));
        buf.push_bytes(&Bytes::copy_from_slice(tail));
        assert_eq!(buf.extract_data(), vec!["回答"]);
    }

    #[rstest]
    fn accepts_crlf_and_skips_comments() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&Bytes::from(": keep-alive\r\n\r\ndata: a\r\ndata: b\r\n\r\n"));
        assert_eq!(buf.extract_data(), vec!["a\nb"]);
    }

    #[rstest]
    fn finish_returns_unterminated_event() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&Bytes::from("data: tail\n"));
        assert!(buf.extract_data().is_empty());
        assert_eq!(buf.finish().as_deref(), Some("tail"));
    }

    #[rstest]
    fn frame_round_trips_through_the_buffer() {
        let mut buf = SseBuffer::new();
        buf.push_bytes(&Bytes::from(frame("{\"type\":\"finish\"}")));
        assert_eq!(buf.extract_data(), vec!["{\"type\":\"finish\"}"]);
    }
}
