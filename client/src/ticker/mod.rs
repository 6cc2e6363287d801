use std::{
    io::{self, Write},
    sync::{
        mpsc::{self, Sender},
        Arc, RwLock,
    },
    thread,
    time::Duration,
};

use libgame::Universe;
use sleeper::Sleeper;
use tracing::{debug, info, warn};

use crate::{write_state, State};

pub mod sleeper;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Handle to the background thread that renders, ticks and waits.
pub struct TickerHost {
    stop_sender: Sender<()>,
    rate_sender: Sender<Duration>,
}

impl TickerHost {
    pub fn start(state_arc: Arc<RwLock<State>>, interval: Duration) -> Self {
        let (stop_sender, stop_receiver) = mpsc::channel();
        let (rate_sender, rate_receiver) = mpsc::channel::<Duration>();

        thread::spawn(move || {
            let mut sleeper = Sleeper::new(interval);

            while stop_receiver.try_recv().is_err() {
                let frame = {
                    let mut state = write_state(&state_arc);
                    let frame = render_frame(&state.universe, state.clear_screen);
                    state.universe.tick();
                    frame
                };

                if let Err(e) = io::stdout().lock().write_all(frame.as_bytes()) {
                    warn!("Writing frame failed: {e}");
                    break;
                }

                if let Ok(rate) = rate_receiver.try_recv() {
                    debug!(interval_ms = rate.as_millis() as u64, "ticker rate changed");
                    sleeper.target_delta_time = rate;
                }

                if !sleeper.target_delta_time.is_zero() && !sleeper.in_time() {
                    debug!("frame took longer than the ticker interval");
                }

                sleeper.sleep();
            }

            debug!("ticker thread finished");
        });

        info!(interval_ms = interval.as_millis() as u64, "ticker started");
        Self {
            stop_sender,
            rate_sender,
        }
    }

    pub fn stop(self) {
        // The thread may already be gone if stdout was closed.
        let _ = self.stop_sender.send(());
        info!("ticker stopped");
    }

    /// Returns false when the ticker thread has already exited.
    pub fn set_rate(&mut self, rate: Duration) -> bool {
        self.rate_sender.send(rate).is_ok()
    }
}

/// Starts the ticker, or retimes it when one is already running. A ticker
/// whose thread has died is replaced.
pub fn spawn_ticker(state_arc: Arc<RwLock<State>>) {
    let mut state = write_state(&state_arc);
    let interval = state.interval;

    if let Some(ticker) = state.ticker.as_mut() {
        if ticker.set_rate(interval) {
            return;
        }

        warn!("ticker thread had exited, restarting it");
        state.ticker = None;
    }

    state.ticker = Some(TickerHost::start(state_arc.clone(), interval));
}

/// Returns whether a ticker was running.
pub fn stop_ticker(state_arc: &Arc<RwLock<State>>) -> bool {
    let ticker = write_state(state_arc).ticker.take();

    match ticker {
        Some(ticker) => {
            ticker.stop();
            true
        }
        None => false,
    }
}

pub fn render_frame(universe: &Universe, clear_screen: bool) -> String {
    let rendered = universe.render();

    if clear_screen {
        format!("{CLEAR_SCREEN}{rendered}\n")
    } else {
        format!("{rendered}\n")
    }
}

/// Drives `universe` without a console: writes a frame, ticks, waits, and
/// repeats `generations` times.
pub fn run_headless<W>(
    universe: &mut Universe,
    generations: u64,
    interval: Duration,
    clear_screen: bool,
    out: &mut W,
) -> io::Result<()>
where
    W: Write,
{
    let mut sleeper = Sleeper::new(interval);

    for _ in 0..generations {
        out.write_all(render_frame(universe, clear_screen).as_bytes())?;
        out.flush()?;
        universe.tick();
        sleeper.sleep();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn frame_is_render_plus_separator() {
        let universe = Universe::new(3, 2).unwrap();

        assert_eq!(render_frame(&universe, false), format!("{}\n", universe.render()));
        assert!(render_frame(&universe, true).starts_with(CLEAR_SCREEN));
    }

    #[test]
    fn headless_writes_each_generation() {
        let mut universe = Universe::new(4, 4).unwrap();
        let mut out = Vec::new();

        run_headless(&mut universe, 2, Duration::ZERO, false, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "◼◻◼◻\n◼◻◼◼\n◼◻◼◻\n◼◻◼◻\n\n\
             ◼◻◼◻\n◼◻◼◻\n◼◻◼◻\n◼◻◼◻\n\n"
        );
        assert_eq!(universe.generation(), 2);
    }

    /// Records when each frame reaches the writer.
    struct TimedWriter {
        flushes: Vec<Instant>,
    }

    impl Write for TimedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes.push(Instant::now());
            Ok(())
        }
    }

    #[test]
    fn headless_waits_between_every_frame() {
        let interval = Duration::from_millis(60);
        let mut universe = Universe::new(4, 4).unwrap();
        let mut out = TimedWriter {
            flushes: Vec::new(),
        };

        run_headless(&mut universe, 3, interval, false, &mut out).unwrap();

        // The pacing clock starts just before the first write, so allow a
        // little slack under the full interval.
        assert_eq!(out.flushes.len(), 3);
        for pair in out.flushes.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= interval * 9 / 10, "gap {gap:?}");
        }
    }

    #[test]
    fn dead_ticker_is_restarted() {
        let universe = Universe::new(3, 3).unwrap();
        let state_arc = Arc::new(RwLock::new(State::new(
            universe,
            Duration::from_secs(60),
            false,
        )));

        // A host whose thread is gone: its receivers are already dropped.
        let (stop_sender, _) = mpsc::channel();
        let (rate_sender, _) = mpsc::channel();
        let mut dead = TickerHost {
            stop_sender,
            rate_sender,
        };
        assert!(!dead.set_rate(Duration::from_secs(1)));
        write_state(&state_arc).ticker = Some(dead);

        spawn_ticker(state_arc.clone());

        let mut state = write_state(&state_arc);
        let ticker = state.ticker.as_mut().unwrap();
        assert!(ticker.set_rate(Duration::from_secs(60)));
        drop(state);

        assert!(stop_ticker(&state_arc));
    }
}
