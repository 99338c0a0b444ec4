use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

pub const INSERT_DELAY: Duration = Duration::from_millis(800);
pub const DISPENSE_DELAY: Duration = Duration::from_millis(1500);
pub const COMPLETED_RESET_DELAY: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Idle,
    Inserting,
    Processing,
    Dispensing,
    Completed,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStatus::Idle => "idle",
            TransferStatus::Inserting => "inserting",
            TransferStatus::Processing => "processing",
            TransferStatus::Dispensing => "dispensing",
            TransferStatus::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// `Demo` wraps the real processing phase with the cosmetic
/// inserting/dispensing phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerMode {
    Basic,
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyOutcome {
    /// The caller must submit exactly one transaction.
    Submit,
    /// Another request is in flight.
    Ignored,
    ConfigMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    fires_at: Instant,
    next: TransferStatus,
}

/// Per-session UI status machine. At most one tip is in flight: `buy` only
/// leaves `Idle`, and only success, error or the reset timer return to it.
#[derive(Debug)]
pub struct TipSequencer {
    mode: SequencerMode,
    status: TransferStatus,
    lcd: String,
    timer: Option<Timer>,
    succeeded: bool,
    disposed: bool,
}

impl TipSequencer {
    pub fn new(mode: SequencerMode) -> Self {
        Self {
            mode,
            status: TransferStatus::Idle,
            lcd: idle_message(mode).to_string(),
            timer: None,
            succeeded: false,
            disposed: false,
        }
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn lcd(&self) -> &str {
        &self.lcd
    }

    #[cfg(test)]
    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// `config_errors` are the names of unset settings; any of them blocks
    /// submission and leaves the machine idle.
    pub fn buy(&mut self, now: Instant, config_errors: &[&str]) -> BuyOutcome {
        if self.disposed || self.status != TransferStatus::Idle {
            debug!(status = %self.status, "buy ignored");
            return BuyOutcome::Ignored;
        }
        if !config_errors.is_empty() {
            warn!(missing = ?config_errors, "buy blocked by missing configuration");
            self.lcd = "CONFIG MISSING".to_string();
            return BuyOutcome::ConfigMissing;
        }

        self.succeeded = false;
        match self.mode {
            SequencerMode::Basic => self.enter(TransferStatus::Processing),
            SequencerMode::Demo => {
                self.enter(TransferStatus::Inserting);
                self.schedule(now + INSERT_DELAY, TransferStatus::Processing);
            }
        }
        BuyOutcome::Submit
    }

    pub fn on_success(&mut self, now: Instant) {
        if self.disposed || self.status == TransferStatus::Idle {
            return;
        }
        match (self.mode, self.status) {
            (SequencerMode::Demo, TransferStatus::Inserting) => {
                // Let the insert animation finish; advance() picks this up.
                self.succeeded = true;
            }
            (SequencerMode::Demo, TransferStatus::Processing) => {
                self.enter(TransferStatus::Dispensing);
                self.schedule(now + DISPENSE_DELAY, TransferStatus::Completed);
            }
            (_, TransferStatus::Processing) => self.complete(now),
            _ => {}
        }
    }

    pub fn on_error(&mut self, message: &str) {
        if self.disposed {
            return;
        }
        warn!(status = %self.status, error = message, "transaction failed");
        self.timer = None;
        self.succeeded = false;
        self.status = TransferStatus::Idle;
        self.lcd = "TX FAILED".to_string();
    }

    /// Fires the pending timer if it is due.
    pub fn advance(&mut self, now: Instant) {
        let Some(timer) = self.timer else {
            return;
        };
        if now < timer.fires_at {
            return;
        }
        self.timer = None;

        match timer.next {
            TransferStatus::Processing => {
                self.enter(TransferStatus::Processing);
                if self.succeeded {
                    self.succeeded = false;
                    self.on_success(timer.fires_at);
                }
            }
            TransferStatus::Completed => self.complete(timer.fires_at),
            other => self.enter(other),
        }
    }

    /// Cancels any pending timer; later events are ignored.
    pub fn dispose(&mut self) {
        self.timer = None;
        self.disposed = true;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.fires_at)
    }

    fn complete(&mut self, now: Instant) {
        self.enter(TransferStatus::Completed);
        self.lcd = "SUCCESS".to_string();
        self.schedule(now + COMPLETED_RESET_DELAY, TransferStatus::Idle);
    }

    fn enter(&mut self, status: TransferStatus) {
        info!(from = %self.status, to = %status, "tip status");
        self.status = status;
        self.lcd = match status {
            TransferStatus::Idle => idle_message(self.mode),
            TransferStatus::Inserting => "INSERTING...",
            TransferStatus::Processing => "TX PENDING...",
            TransferStatus::Dispensing => "DISPENSING...",
            TransferStatus::Completed => "THANK YOU!",
        }
        .to_string();
    }

    fn schedule(&mut self, fires_at: Instant, next: TransferStatus) {
        self.timer = Some(Timer { fires_at, next });
    }
}

fn idle_message(mode: SequencerMode) -> &'static str {
    match mode {
        SequencerMode::Basic => "READY",
        SequencerMode::Demo => "DEMO: SEPOLIA -> BASE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_flow_returns_to_idle_after_reset_delay() {
        let start = Instant::now();
        let mut seq = TipSequencer::new(SequencerMode::Basic);

        assert_eq!(seq.buy(start, &[]), BuyOutcome::Submit);
        assert_eq!(seq.status(), TransferStatus::Processing);

        seq.on_success(start);
        assert_eq!(seq.status(), TransferStatus::Completed);
        assert_eq!(seq.lcd(), "SUCCESS");

        seq.advance(start + COMPLETED_RESET_DELAY - Duration::from_millis(1));
        assert_eq!(seq.status(), TransferStatus::Completed);

        seq.advance(start + COMPLETED_RESET_DELAY);
        assert_eq!(seq.status(), TransferStatus::Idle);
        assert!(!seq.has_pending_timer());
    }

    #[test]
    fn buy_is_ignored_while_in_flight() {
        let start = Instant::now();
        let mut seq = TipSequencer::new(SequencerMode::Demo);
        assert_eq!(seq.buy(start, &[]), BuyOutcome::Submit);
        assert_eq!(seq.buy(start, &[]), BuyOutcome::Ignored);

        seq.advance(start + INSERT_DELAY);
        assert_eq!(seq.status(), TransferStatus::Processing);
        assert_eq!(seq.buy(start + INSERT_DELAY, &[]), BuyOutcome::Ignored);

        seq.on_success(start + INSERT_DELAY);
        assert_eq!(seq.buy(start + INSERT_DELAY, &[]), BuyOutcome::Ignored);
    }

    #[test]
    fn error_always_returns_to_idle() {
        let start = Instant::now();
        let reach = |steps: usize| {
            let mut seq = TipSequencer::new(SequencerMode::Demo);
            seq.buy(start, &[]);
            if steps > 0 {
                seq.advance(start + INSERT_DELAY);
            }
            if steps > 1 {
                seq.on_success(start + INSERT_DELAY);
            }
            if steps > 2 {
                seq.advance(start + INSERT_DELAY + DISPENSE_DELAY);
            }
            seq
        };

        let expected = [
            TransferStatus::Inserting,
            TransferStatus::Processing,
            TransferStatus::Dispensing,
            TransferStatus::Completed,
        ];
        for (steps, status) in expected.into_iter().enumerate() {
            let mut seq = reach(steps);
            assert_eq!(seq.status(), status);
            seq.on_error("reverted");
            assert_eq!(seq.status(), TransferStatus::Idle);
            assert_eq!(seq.lcd(), "TX FAILED");
            assert!(!seq.has_pending_timer());
        }
    }

    #[test]
    fn demo_flow_walks_every_phase() {
        let start = Instant::now();
        let mut seq = TipSequencer::new(SequencerMode::Demo);
        seq.buy(start, &[]);
        assert_eq!(seq.status(), TransferStatus::Inserting);

        seq.advance(start + INSERT_DELAY);
        assert_eq!(seq.status(), TransferStatus::Processing);

        seq.on_success(start + INSERT_DELAY);
        assert_eq!(seq.status(), TransferStatus::Dispensing);

        let dispensed = start + INSERT_DELAY + DISPENSE_DELAY;
        seq.advance(dispensed);
        assert_eq!(seq.status(), TransferStatus::Completed);

        seq.advance(dispensed + COMPLETED_RESET_DELAY);
        assert_eq!(seq.status(), TransferStatus::Idle);
        assert_eq!(seq.next_deadline(), None);
    }

    #[test]
    fn early_success_waits_for_insert_animation() {
        let start = Instant::now();
        let mut seq = TipSequencer::new(SequencerMode::Demo);
        seq.buy(start, &[]);
        seq.on_success(start);
        assert_eq!(seq.status(), TransferStatus::Inserting);

        seq.advance(start + INSERT_DELAY);
        assert_eq!(seq.status(), TransferStatus::Dispensing);
    }

    #[test]
    fn missing_config_keeps_machine_idle() {
        let mut seq = TipSequencer::new(SequencerMode::Demo);
        let outcome = seq.buy(Instant::now(), &["COLA_DEMO_RECIPIENT"]);
        assert_eq!(outcome, BuyOutcome::ConfigMissing);
        assert_eq!(seq.status(), TransferStatus::Idle);
        assert_eq!(seq.lcd(), "CONFIG MISSING");
    }

    #[test]
    fn dispose_cancels_pending_timer() {
        let start = Instant::now();
        let mut seq = TipSequencer::new(SequencerMode::Basic);
        seq.buy(start, &[]);
        seq.on_success(start);
        assert!(seq.has_pending_timer());

        seq.dispose();
        assert!(!seq.has_pending_timer());
        seq.advance(start + COMPLETED_RESET_DELAY);
        assert_eq!(seq.status(), TransferStatus::Completed);
        assert_eq!(seq.buy(start + COMPLETED_RESET_DELAY, &[]), BuyOutcome::Ignored);
    }
}
