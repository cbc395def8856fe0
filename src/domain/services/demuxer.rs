#[cfg(test)]
#[path = "demuxer_test.rs"]
mod tests;

use crate::domain::models::AgentProgress;
use crate::domain::models::StreamEvent;

pub const STATUS_MARKER: &str = "[AGENT_UPDATE]";
pub const CODE_START_MARKER: &str = "[CODE_START]";
pub const CODE_END_MARKER: &str = "[CODE_END]";

/// Outcome of scanning the text that follows a status marker.
#[derive(Debug, PartialEq, Eq)]
enum StatusScan {
    /// A balanced object ends at this byte offset (exclusive).
    Complete(usize),
    /// Not a single-line object. Parsing resumes at this byte offset.
    Malformed(usize),
    /// More input is needed to decide.
    Pending,
}

/// Splits the model's output into status events and code fragments.
///
/// Fragments are fed in arrival order with no assumption about where their
/// boundaries fall. Status lines are only emitted once their JSON object is
/// complete, while code is emitted as soon as it cannot be the start of the
/// closing marker.
#[derive(Default)]
pub struct StreamDemuxer {
    buffer: String,
    in_code: bool,
}

impl StreamDemuxer {
    pub fn feed(&mut self, fragment: &str) -> Vec<StreamEvent> {
        self.buffer.push_str(fragment);

        let mut events = vec![];
        self.drain(&mut events);
        return events;
    }

    /// Flushes whatever the stream left behind and resets the demuxer.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = vec![];

        // An unterminated status candidate must not swallow the code block behind it.
        if !self.in_code {
            if let Some(idx) = self.buffer.find(CODE_START_MARKER) {
                tracing::debug!("dropping unterminated agent update at end of stream");
                self.buffer.drain(..idx + CODE_START_MARKER.len());
                self.in_code = true;
                self.drain(&mut events);
            }
        }

        if self.in_code {
            let rest = self.buffer.replace(CODE_END_MARKER, "");
            if !rest.is_empty() {
                events.push(StreamEvent::Code(rest));
            }
        } else if !self.buffer.trim().is_empty() {
            tracing::debug!(
                remaining = self.buffer.len(),
                "discarding trailing model output"
            );
        }

        self.buffer.clear();
        self.in_code = false;
        return events;
    }

    fn drain(&mut self, events: &mut Vec<StreamEvent>) {
        loop {
            let progressed = if self.in_code {
                self.drain_code(events)
            } else {
                self.drain_preamble(events)
            };

            if !progressed {
                break;
            }
        }
    }

    fn drain_code(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        if let Some(idx) = self.buffer.find(CODE_END_MARKER) {
            if idx > 0 {
                events.push(StreamEvent::Code(self.buffer[..idx].to_string()));
            }
            self.buffer.drain(..idx + CODE_END_MARKER.len());
            self.in_code = false;
            return true;
        }

        let held = partial_marker_len(&self.buffer, CODE_END_MARKER);
        let ready = self.buffer.len() - held;
        if ready > 0 {
            events.push(StreamEvent::Code(self.buffer[..ready].to_string()));
            self.buffer.drain(..ready);
        }

        return false;
    }

    fn drain_preamble(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        let status_idx = self.buffer.find(STATUS_MARKER);
        let code_idx = self.buffer.find(CODE_START_MARKER);

        match (status_idx, code_idx) {
            (Some(status), code) if code.map_or(true, |code| return status < code) => {
                self.buffer.drain(..status);
                return self.take_status(events);
            }
            (_, Some(code)) => {
                self.buffer.drain(..code + CODE_START_MARKER.len());
                self.in_code = true;
                return true;
            }
            (_, None) => {
                let held = partial_marker_len(&self.buffer, STATUS_MARKER)
                    .max(partial_marker_len(&self.buffer, CODE_START_MARKER));
                let discard = self.buffer.len() - held;
                self.buffer.drain(..discard);
                return false;
            }
        }
    }

    /// Expects the buffer to start with `STATUS_MARKER`.
    fn take_status(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        let body_start = STATUS_MARKER.len();

        match scan_status(&self.buffer[body_start..]) {
            StatusScan::Complete(len) => {
                let json = &self.buffer[body_start..body_start + len];
                match serde_json::from_str::<AgentProgress>(json) {
                    Ok(progress) => events.push(StreamEvent::Status(progress)),
                    Err(err) => {
                        tracing::debug!(error = ?err, json, "dropping unparseable agent update");
                    }
                }
                self.buffer.drain(..body_start + len);
                return true;
            }
            StatusScan::Malformed(resume) => {
                tracing::debug!(
                    line = &self.buffer[..body_start + resume],
                    "dropping malformed agent update"
                );
                self.buffer.drain(..body_start + resume);
                return true;
            }
            StatusScan::Pending => {
                return false;
            }
        }
    }
}

/// Finds where the single-line JSON object at the start of `text` ends.
/// Leading spaces are allowed, anything else before the `{` is not.
fn scan_status(text: &str) -> StatusScan {
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, char) in text.char_indices() {
        if depth == 0 {
            match char {
                ' ' | '\t' | '\r' => continue,
                '{' => {
                    depth = 1;
                    continue;
                }
                _ => return StatusScan::Malformed(idx),
            }
        }

        if char == '\n' {
            return StatusScan::Malformed(idx + 1);
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if char == '\\' {
                escaped = true;
            } else if char == '"' {
                in_string = false;
            }
            continue;
        }

        match char {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return StatusScan::Complete(idx + 1);
                }
            }
            _ => (),
        }
    }

    return StatusScan::Pending;
}

/// Length of the longest proper prefix of `marker` that `text` ends with.
fn partial_marker_len(text: &str, marker: &str) -> usize {
    let longest = (marker.len() - 1).min(text.len());
    for len in (1..=longest).rev() {
        if text.ends_with(&marker[..len]) {
            return len;
        }
    }

    return 0;
}
