//! Remote link frame decoding.
//!
//! Each call handles at most one complete frame and buffers nothing
//! between calls. Unknown tags are ignored so newer hosts can add message
//! kinds without stalling older devices.

use sb_formats::{decode_frame, Command, FormatError};
use sb_ir::{Frame, MidiBatch, Tag};

use crate::clock::ClockReconciler;
use crate::player::SeqPlayer;
use crate::sequencer::SequenceEngine;
use crate::storage::BulkStorage;

/// What one frame did.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// A session started at device time `epoch_us`
    SessionStarted { epoch_us: u64 },
    /// Events forwarded; `raised` had their tick lifted to keep order
    Batch { sent: usize, raised: usize },
    /// A batch arrived before any session start and was dropped
    NoSession { dropped: usize },
    /// Unrecognised tag
    Ignored(Tag),
    /// Malformed frame
    Rejected(FormatError),
}

/// Running counters over all decoded frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub sessions: u64,
    pub batches: u64,
    pub events_sent: u64,
    pub events_dropped: u64,
    pub ticks_raised: u64,
    pub ignored: u64,
    pub rejected: u64,
}

/// Turns frames into clock updates and player events.
#[derive(Clone, Debug, Default)]
pub struct RemoteEventDecoder {
    stats: DecoderStats,
}

impl RemoteEventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Decode `frame` received at device time `now_us` and apply it.
    pub fn process<P: SeqPlayer, S: BulkStorage>(
        &mut self,
        frame: &Frame,
        now_us: u64,
        clock: &mut ClockReconciler,
        engine: &mut SequenceEngine<P, S>,
    ) -> FrameOutcome {
        match decode_frame(frame) {
            Ok(Command::SessionStart) => {
                clock.on_session_start(now_us);
                self.stats.sessions += 1;
                log::info!("session start at {}us", now_us);
                FrameOutcome::SessionStarted { epoch_us: now_us }
            }
            Ok(Command::MidiBatch(batch)) => self.apply_batch(&batch, now_us, clock, engine),
            Ok(Command::Unknown(tag)) => {
                self.stats.ignored += 1;
                log::debug!("ignoring frame with unknown tag {}", tag);
                FrameOutcome::Ignored(tag)
            }
            Err(e) => {
                self.stats.rejected += 1;
                log::warn!("dropping malformed {} frame: {}", frame.tag(), e);
                FrameOutcome::Rejected(e)
            }
        }
    }

    fn apply_batch<P: SeqPlayer, S: BulkStorage>(
        &mut self,
        batch: &MidiBatch,
        now_us: u64,
        clock: &mut ClockReconciler,
        engine: &mut SequenceEngine<P, S>,
    ) -> FrameOutcome {
        self.stats.batches += 1;
        if clock.epoch().is_none() {
            self.stats.events_dropped += batch.len() as u64;
            log::warn!("dropping {} events received before session start", batch.len());
            return FrameOutcome::NoSession { dropped: batch.len() };
        }

        // Leads count from the transport position at arrival; every event
        // therefore lands at or after it.
        let position = engine.position();
        let mut floor = position;
        let mut raised = 0;
        for msg in batch {
            let Some(lead) = clock.ticks_for(msg.time_us as u64, now_us, &*engine) else {
                continue;
            };
            let due = position.saturating_add(lead);
            let tick = if due < floor {
                raised += 1;
                log::debug!("raising tick {} to {} to keep submission order", due, floor);
                floor
            } else {
                due
            };
            floor = tick;

            log::debug!(
                "ch{:2} {} {:3} {:3} @ {} ({}us)",
                msg.channel().index(),
                msg.kind().label(),
                msg.data1,
                msg.data2,
                tick,
                msg.time_us
            );
            engine.send_event(tick, msg.status, msg.data1, msg.data2);
        }

        self.stats.events_sent += batch.len() as u64;
        self.stats.ticks_raised += raised as u64;
        FrameOutcome::Batch { sent: batch.len(), raised }
    }
}
