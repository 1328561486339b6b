//! Records produced while consuming runtime output streams.
//!
//! Pure types only: no I/O, no async.

/// One decoded build-log record from the container runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEvent {
    /// Human-readable build output, when present.
    pub stream: Option<String>,
    /// Set when the runtime reports the build as failed.
    pub error: Option<String>,
}

impl BuildEvent {
    /// Build output with surrounding whitespace removed, `None` when blank.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.stream
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Opaque handle for one remote command invocation.
#[derive(Debug, PartialEq, Eq)]
pub struct ExecutionContext {
    pub id: String,
}

/// Completion record of one remote command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Number of output lines delivered.
    pub lines: usize,
    /// Exit code reported by the runtime; `None` if it could not tell.
    pub exit_code: Option<i64>,
}

impl ExecOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Reassembles lines from arbitrarily chunked output.
///
/// Chunk boundaries from the runtime do not line up with newlines. Complete
/// lines come out of [`push`](Self::push) in input order, trimmed; the
/// trailing partial line comes out of [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                lines.push(decode(&self.pending));
                self.pending.clear();
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Flush the unterminated remainder, if it holds anything but whitespace.
    pub fn finish(&mut self) -> Option<String> {
        let line = decode(&self.pending);
        self.pending.clear();
        (!line.is_empty()).then_some(line)
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
