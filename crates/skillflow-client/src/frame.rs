// ─── FrameReassembler ─────────────────────────────────────────────────────

/// Turns arbitrarily-chunked network data into complete newline-delimited
/// frames.
///
/// Holds a single carry-over buffer. Each [`push`](Self::push) appends the
/// fragment, hands back every piece terminated by `\n`, and keeps the last
/// (possibly empty) piece for the next call. The buffer is byte-based so a
/// multi-byte UTF-8 character split across two chunks is rebuilt before it
/// is decoded. The output depends only on the concatenated bytes, never on
/// where the chunk boundaries fell.
#[derive(Debug, Default)]
pub struct FrameReassembler {
    buffer: Vec<u8>,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment` and return the frames it completed, in order.
    pub fn push(&mut self, fragment: &[u8]) -> Vec<String> {
        // Earlier bytes are known to be newline-free; only scan the new ones.
        let Some(offset) = fragment.iter().rposition(|&b| b == b'\n') else {
            self.buffer.extend_from_slice(fragment);
            return Vec::new();
        };
        let last_newline = self.buffer.len() + offset;
        self.buffer.extend_from_slice(fragment);

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// End of data: drop any unterminated remainder and return its length.
    pub fn finish(self) -> usize {
        self.buffer.len()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
