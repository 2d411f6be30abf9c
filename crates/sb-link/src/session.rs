//! Frame assembly over a polled link.

use std::time::Duration;

use sb_ir::{Frame, FRAME_SIZE};

use crate::traits::{Link, LinkError, Pause, ThreadPause};

/// Bounds on the blocking part of a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Read attempts per poll before giving up on the frame
    pub max_attempts: u32,
    /// Pause between attempts
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 8, retry_interval: Duration::from_millis(100) }
    }
}

/// Poll counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Polls that found no data ready
    pub idle: u64,
    pub frames: u64,
    /// Polls that ran out of attempts
    pub exhausted: u64,
    pub timeouts: u64,
    pub disconnects: u64,
    /// Tail bytes of abandoned frames skipped to stay frame-aligned
    pub discarded: u64,
}

/// Delivers complete frames from a link, or nothing this tick.
pub struct TransportSession<L, Z = ThreadPause> {
    link: L,
    pacer: Z,
    policy: RetryPolicy,
    stats: SessionStats,
    /// Bytes of an abandoned frame still to be drained from the link
    discard: usize,
}

impl<L: Link> TransportSession<L, ThreadPause> {
    pub fn new(link: L, policy: RetryPolicy) -> Self {
        Self::with_pacer(link, policy, ThreadPause)
    }
}

impl<L: Link, Z: Pause> TransportSession<L, Z> {
    pub fn with_pacer(link: L, policy: RetryPolicy, pacer: Z) -> Self {
        Self { link, pacer, policy, stats: SessionStats::default(), discard: 0 }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn pacer(&self) -> &Z {
        &self.pacer
    }

    /// Bytes still owed from a frame abandoned by an earlier poll.
    pub fn pending_discard(&self) -> usize {
        self.discard
    }

    /// Next complete frame, if one can be read within the retry budget.
    ///
    /// Returns immediately when the link reports no pending data. A frame
    /// left incomplete when attempts run out is dropped, and its remaining
    /// bytes are drained (sharing the attempt budget) before the next frame
    /// is assembled, so the stream stays frame-aligned.
    pub fn poll_frame(&mut self) -> Option<Frame> {
        if !self.link.data_ready() {
            self.stats.idle += 1;
            return None;
        }

        let mut frame = Frame::zeroed();
        let mut filled = 0;
        for attempt in 1..=self.policy.max_attempts {
            let draining = self.discard > 0;
            let target = if draining {
                &mut frame.as_bytes_mut()[..self.discard]
            } else {
                &mut frame.as_bytes_mut()[filled..]
            };
            match self.link.read(target) {
                Ok(n) if draining => {
                    self.discard = self.discard.saturating_sub(n);
                    self.stats.discarded += n as u64;
                    if self.discard == 0 {
                        log::debug!("resynchronised after dropped frame");
                    }
                }
                Ok(n) => {
                    filled += n;
                    if filled == FRAME_SIZE {
                        self.stats.frames += 1;
                        return Some(frame);
                    }
                }
                Err(LinkError::Timeout) => {
                    self.stats.timeouts += 1;
                    log::debug!("link read timeout (attempt {})", attempt);
                }
                Err(LinkError::Disconnected) => {
                    self.stats.disconnects += 1;
                    self.discard = 0;
                    log::warn!("link disconnected mid-frame ({} of {} bytes)", filled, FRAME_SIZE);
                    return None;
                }
            }
            if attempt < self.policy.max_attempts {
                self.pacer.pause(self.policy.retry_interval);
            }
        }

        self.stats.exhausted += 1;
        if filled > 0 {
            self.discard = FRAME_SIZE - filled;
        }
        log::warn!(
            "no complete frame after {} attempts ({} of {} bytes); skipping tick",
            self.policy.max_attempts,
            filled,
            FRAME_SIZE
        );
        None
    }
}
