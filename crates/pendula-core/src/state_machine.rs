use serde::Serialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Enums & Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
    Restarting = 2, // Waiting out the settling delay before start()
}

impl RunState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Restarting => "Restarting",
        }
    }
}

/// Pause between a restart and the automatic start that follows it.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// What the frame loop should do when a scheduled frame fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecision {
    /// Integrate and publish a frame; stay scheduled.
    Advance,
    /// Loop was stopped since the last frame: drop the schedule, free the lock.
    Release,
    /// No frame is scheduled.
    Skip,
}

// ---------------------------------------------------------------------------
// State Machine
// ---------------------------------------------------------------------------

/// Bookkeeping for the animation loop. Time is the host's monotonic clock,
/// expressed as elapsed time since the host started.
#[derive(Debug, Clone)]
pub struct RunStateMachine {
    state: RunState,

    /// A frame callback is pending. While true the owner holds the lock.
    frame_scheduled: bool,

    /// When the pending restart may call start().
    restart_at: Option<Duration>,

    settle_delay: Duration,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new(SETTLE_DELAY)
    }
}

impl RunStateMachine {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            state: RunState::Idle,
            frame_scheduled: false,
            restart_at: None,
            settle_delay,
        }
    }

    pub fn current_state(&self) -> RunState {
        self.state
    }

    pub fn frame_scheduled(&self) -> bool {
        self.frame_scheduled
    }

    pub fn restart_at(&self) -> Option<Duration> {
        self.restart_at
    }

    /// Enter Running. Returns `true` when a new frame had to be scheduled,
    /// i.e. the caller just took the lock rather than reusing a pending frame.
    pub fn run(&mut self) -> bool {
        self.state = RunState::Running;
        self.restart_at = None;
        let newly_scheduled = !self.frame_scheduled;
        self.frame_scheduled = true;
        newly_scheduled
    }

    /// Running or Restarting -> Idle. A pending frame still fires once and
    /// sees the stop.
    pub fn stop(&mut self) {
        self.state = RunState::Idle;
        self.restart_at = None;
    }

    pub fn begin_restart(&mut self, now: Duration) {
        self.state = RunState::Restarting;
        self.restart_at = Some(now + self.settle_delay);
    }

    pub fn restart_due(&self, now: Duration) -> bool {
        match (self.state, self.restart_at) {
            (RunState::Restarting, Some(at)) => now >= at,
            _ => false,
        }
    }

    /// Called at the top of every frame callback.
    pub fn on_frame(&mut self) -> FrameDecision {
        if !self.frame_scheduled {
            return FrameDecision::Skip;
        }
        if self.state == RunState::Running {
            FrameDecision::Advance
        } else {
            self.frame_scheduled = false;
            FrameDecision::Release
        }
    }

    /// Abort after a fatal frame. Returns whether a frame was scheduled,
    /// in which case the caller still holds the lock.
    pub fn halt(&mut self) -> bool {
        let held = self.frame_scheduled;
        self.state = RunState::Idle;
        self.frame_scheduled = false;
        self.restart_at = None;
        held
    }
}
