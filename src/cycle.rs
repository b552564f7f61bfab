//! One wake cycle, from boot to deep sleep
//!
//! Every boot runs the same straight line:
//!
//! 1. `WakeConfigPending` - arm the wake lines
//! 1. `Classified` - work out why we woke up
//! 1. `CounterUpdated` - load, advance and store the counter
//! 1. `Rendered` - draw the time and hibernate the panel
//! 1. `SleepArmed` - arm the wake lines again
//! 1. `LowPower` - deep sleep, never returns
//!
//! The hardware is reached only through [`WakeControl`], [`RenderSink`] and
//! [`PersistentStore`], so the whole cycle can run against fakes.

use core::fmt::Debug;

use log::{debug, error, info, warn};

use crate::clock::{ClockState, ClockTime};
use crate::config::ClockConfig;
use crate::store::PersistentStore;
use crate::wake::{classify, Classification, LineMask, WakeCause, WakeConfig};

/// Wake source and sleep control of the chip
pub trait WakeControl {
    type Error: Debug;

    /// Declare which lines may end deep sleep. Must be idempotent.
    fn arm(&mut self, config: &WakeConfig) -> Result<(), Self::Error>;

    /// Why the current boot happened
    fn wake_cause(&self) -> WakeCause;

    /// Lines that triggered an `Ext1` wake
    fn triggering_lines(&self) -> LineMask;

    /// Enter deep sleep. The next thing that runs is a fresh boot.
    fn enter_deep_sleep(&mut self) -> !;
}

/// Display collaborator, fire-and-forget from the cycle's point of view
pub trait RenderSink {
    type Error: Debug;

    /// Full refresh showing `text` centered on the panel
    fn render(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Put the panel in its lowest power holding state
    fn hibernate(&mut self) -> Result<(), Self::Error>;
}

/// Position of a cycle in its linear state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CyclePhase {
    WakeConfigPending,
    Classified,
    CounterUpdated,
    Rendered,
    SleepArmed,
    LowPower,
}

/// What happened during a cycle, for logs and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cause: WakeCause,
    pub lines: LineMask,
    pub classification: Classification,
    pub state: ClockState,
    pub time: ClockTime,
}

/// A cycle that has not run yet
pub struct WakeCycle<'a, S, W, R> {
    store: &'a mut S,
    wake: &'a mut W,
    sink: &'a mut R,
    config: ClockConfig,
    phase: CyclePhase,
}

impl<'a, S, W, R> WakeCycle<'a, S, W, R>
where
    S: PersistentStore,
    W: WakeControl,
    R: RenderSink,
{
    pub fn new(store: &'a mut S, wake: &'a mut W, sink: &'a mut R, config: ClockConfig) -> Self {
        WakeCycle {
            store,
            wake,
            sink,
            config,
            phase: CyclePhase::WakeConfigPending,
        }
    }

    /// Run the whole cycle and go to sleep
    pub fn run(self) -> ! {
        self.prepare().sleep()
    }

    /// Run everything up to and including re-arming the wake sources.
    ///
    /// The returned [`ArmedCycle`] can only go to sleep.
    pub fn prepare(mut self) -> ArmedCycle<'a, W> {
        let wake_config = self.config.wake_config();
        self.arm(&wake_config);

        let cause = self.wake.wake_cause();
        info!("{}", cause.description());
        let lines = if cause == WakeCause::Ext1 {
            self.wake.triggering_lines()
        } else {
            LineMask::EMPTY
        };
        info!("Wakeup pin: {}", lines.decode());
        let classification = classify(cause, lines, self.config.tick_line, self.config.zero_line);
        self.enter(CyclePhase::Classified);

        let mut state = self.store.load();
        if !state.is_valid() {
            warn!(
                "Stored minute {} is outside the day, it will wrap",
                state.minute_count
            );
        }
        let time = state.apply(&classification);
        self.store.store(&state);
        info!("Boot number: {}", state.boot_count);
        info!("Time: {}", time);
        self.enter(CyclePhase::CounterUpdated);

        let text = time.to_string();
        if let Err(e) = self.sink.render(&text) {
            error!("Failed to render time: {:?}", e);
        }
        if let Err(e) = self.sink.hibernate() {
            error!("Failed to hibernate display: {:?}", e);
        }
        self.enter(CyclePhase::Rendered);

        // Rendering may have touched the RTC GPIOs, so arm once more
        self.arm(&wake_config);
        self.enter(CyclePhase::SleepArmed);

        ArmedCycle {
            wake: self.wake,
            report: CycleReport {
                cause,
                lines,
                classification,
                state,
                time,
            },
        }
    }

    fn arm(&mut self, wake_config: &WakeConfig) {
        debug!(
            "Arming wakeup on lines {} ({:?})",
            wake_config.lines, wake_config.level
        );
        if let Err(e) = self.wake.arm(wake_config) {
            error!("Failed to arm wakeup sources: {:?}", e);
        }
    }

    fn enter(&mut self, next: CyclePhase) {
        debug!("Cycle {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// A finished cycle waiting for its terminal transition
pub struct ArmedCycle<'a, W> {
    wake: &'a mut W,
    report: CycleReport,
}

impl<W: WakeControl> ArmedCycle<'_, W> {
    pub fn phase(&self) -> CyclePhase {
        CyclePhase::SleepArmed
    }

    pub fn report(&self) -> &CycleReport {
        &self.report
    }

    /// Enter `LowPower`
    pub fn sleep(self) -> ! {
        debug!("Cycle {:?} -> {:?}", CyclePhase::SleepArmed, CyclePhase::LowPower);
        info!("Going to sleep now");
        self.wake.enter_deep_sleep()
    }
}
