//! Host timestamp to sequencer tick reconciliation.

use sb_ir::Tick;

/// Tempo-dependent mapping from elapsed seconds to ticks.
pub trait TickMapper {
    /// Must be monotonic non-decreasing in `seconds`.
    fn seconds_to_ticks(&self, seconds: f64) -> Tick;
}

/// Converts session-relative event timestamps into scheduling lead ticks.
///
/// Event timestamps are host offsets from the start of the host's session.
/// The epoch is the device clock reading when that session started, so
/// `now_us - epoch` is how far into the session the device is. An event's
/// lead is its offset minus that elapsed time; both sides are measured from
/// the same session start.
///
/// Tempo is read from the mapper at conversion time, never cached.
#[derive(Clone, Debug, Default)]
pub struct ClockReconciler {
    epoch: Option<u64>,
    clamped: u64,
}

impl ClockReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session at device time `now_us`.
    pub fn on_session_start(&mut self, now_us: u64) {
        if let Some(prev) = self.epoch {
            log::info!("session restarted (epoch {} -> {})", prev, now_us);
        }
        self.epoch = Some(now_us);
    }

    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// Device time elapsed since the epoch, if a session is running.
    pub fn elapsed(&self, now_us: u64) -> Option<u64> {
        self.epoch.map(|epoch| now_us.saturating_sub(epoch))
    }

    /// Events that were already due on arrival and were clamped to a zero lead.
    pub fn clamped(&self) -> u64 {
        self.clamped
    }

    /// Ticks from now until an event at session offset `event_us` is due,
    /// given device time `now_us`. `None` without a session.
    pub fn ticks_for(
        &mut self,
        event_us: u64,
        now_us: u64,
        mapper: &impl TickMapper,
    ) -> Option<Tick> {
        let elapsed = self.elapsed(now_us)?;
        let Some(lead_us) = event_us.checked_sub(elapsed) else {
            self.clamped += 1;
            log::warn!(
                "event at {}us arrived {}us into the session ({}us late); clamped to now",
                event_us,
                elapsed,
                elapsed - event_us
            );
            return Some(0);
        };
        Some(mapper.seconds_to_ticks(lead_us as f64 / 1_000_000.0))
    }
}
