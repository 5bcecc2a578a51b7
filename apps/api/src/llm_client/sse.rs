//! Incremental decoder for the `text/event-stream` bodies returned by
//! OpenAI-compatible chat completion endpoints.

/// One decoded `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsePayload {
    Data(String),
    /// The `[DONE]` sentinel that closes an OpenAI-style stream.
    Done,
}

/// Splits raw network chunks into complete lines and extracts their `data:` payloads.
///
/// Bytes are buffered until a newline arrives, so multi-byte UTF-8 sequences split
/// across network chunks are decoded intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SsePayload> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = parse_line(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flushes a final unterminated line once the connection has closed.
    pub fn finish(&mut self) -> Option<SsePayload> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(raw: &[u8]) -> Option<SsePayload> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?.trim_start();

    match data {
        "" => None,
        "[DONE]" => Some(SsePayload::Done),
        other => Some(SsePayload::Data(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_complete_lines() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.push(b"data: {\"a\":1}\n\ndata: [DONE]\n\n");
        assert_eq!(
            payloads,
            vec![
                SsePayload::Data("{\"a\":1}".to_string()),
                SsePayload::Done
            ]
        );
    }

    #[test]
    fn test_buffers_partial_lines_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"text\":").is_empty());
        let payloads = decoder.push(b"\"hi\"}\r\n");
        assert_eq!(payloads, vec![SsePayload::Data("{\"text\":\"hi\"}".to_string())]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let encoded = "data: 你好\n".as_bytes();
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&encoded[..8]).is_empty());
        let payloads = decoder.push(&encoded[8..]);
        assert_eq!(payloads, vec![SsePayload::Data("你好".to_string())]);
    }

    #[test]
    fn test_ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.push(b": keep-alive\nevent: message\nid: 7\n\n");
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), Some(SsePayload::Done));
        assert_eq!(decoder.finish(), None);
    }
}
