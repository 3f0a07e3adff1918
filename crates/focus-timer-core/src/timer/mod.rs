mod engine;
mod scheduler;
mod session;

pub use engine::{TimerEngine, AUTO_START_DELAY, DEFAULT_COUNTDOWN_SECS, TICK_PERIOD};
pub use scheduler::{Ticker, Timeout};
pub use session::{Mode, SessionType, TimerStatus};
