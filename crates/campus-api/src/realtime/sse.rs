// ── Server-sent events decoding ──
//
// Incremental decoder for `text/event-stream` bodies. Bytes arrive in
// arbitrary chunks; events are emitted once their terminating blank
// line has been seen.

use bytes::{Buf, BytesMut};

/// A single decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: BytesMut,
}

impl SseDecoder {
    /// Feed a chunk and return every event it completes.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        // CR never appears unescaped inside JSON payloads, so stripping it
        // turns CRLF framing into plain LF framing.
        self.buffer
            .extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_blank_line(&self.buffer) {
            let block = self.buffer.split_to(end);
            self.buffer.advance(2);
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }
        events
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = Some(value.to_owned()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }

    Some(SseEvent {
        event: event.unwrap_or_else(|| "message".into()),
        data: data.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_single_event() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"event: put\ndata: {\"path\":\"/\",\"data\":null}\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: "put".into(),
                data: r#"{"path":"/","data":null}"#.into(),
            }]
        );
    }

    #[test]
    fn holds_partial_event_until_terminated() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"event: keep-alive\nda").is_empty());
        let events = decoder.feed(b"ta: null\n\nevent: put\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "keep-alive");
        assert_eq!(events[0].data, "null");
    }

    #[test]
    fn handles_crlf_framing_and_comments() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b": comment\r\nevent: cancel\r\ndata: null\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "cancel");
    }

    #[test]
    fn joins_multiline_data() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"data: a\ndata: b\n\n");
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn multibyte_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        let bytes = "event: put\ndata: \"é\"\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap_or(0) + 1;
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let events = decoder.feed(&bytes[split..]);
        assert_eq!(events[0].data, "\"é\"");
    }
}
