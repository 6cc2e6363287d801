use std::time::{Duration, Instant};

/// Paces a loop to one iteration per `target_delta_time`, sleeping only for
/// whatever the iteration itself did not use up. The clock starts at
/// construction, so the first `sleep` waits too.
pub struct Sleeper {
    pub target_delta_time: Duration,
    pub last_instant: Instant,
}

impl Sleeper {
    pub fn new(target_delta_time: Duration) -> Self {
        Self {
            target_delta_time,
            last_instant: Instant::now(),
        }
    }

    pub fn sleep(&mut self) -> bool {
        let slept = match self.remaining() {
            Some(remaining) => {
                spin_sleep::sleep(remaining);
                true
            }
            None => false,
        };

        self.last_instant = Instant::now();
        slept
    }

    pub fn in_time(&self) -> bool {
        self.remaining().is_some()
    }

    fn remaining(&self) -> Option<Duration> {
        self.target_delta_time
            .checked_sub(self.last_instant.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }
}
