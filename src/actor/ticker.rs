//! Ticker Actor: The display clock.
//!
//! Every tick is a display frame. The app loop drains the frame queue on each
//! tick, which is what bounds publishes to the configured refresh rate.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest single sleep, so shutdown is noticed promptly.
const MAX_NAP: Duration = Duration::from_millis(5);

/// A display frame.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Frame number (monotonically increasing).
    pub frame: u64,
    /// Time elapsed since the ticker was started.
    pub elapsed: Duration,
}

/// Ticker actor that generates display frames.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
    interval: Duration,
}

impl TickerActor {
    /// Spawn a ticker firing every `interval`.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    pub fn spawn(interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        // Ticks must not queue up behind a slow loop
        let (tick_tx, tick_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name("architect-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &shutdown_clone, interval);
            })
            .expect("Failed to spawn ticker thread");

        Self {
            handle: Some(handle),
            shutdown,
            tick_rx,
            interval,
        }
    }

    /// Tick receiver, for use with `select!`.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// Time between ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, interval: Duration) {
        let start = Instant::now();
        let mut frame = 0u64;
        let mut next_tick = start + interval;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < next_tick {
                thread::sleep((next_tick - now).min(MAX_NAP));
                continue;
            }

            // Full: the last frame is still unconsumed, drop this one
            let tick = Tick {
                frame,
                elapsed: now - start,
            };
            if let Err(TrySendError::Disconnected(_)) = tick_tx.try_send(tick) {
                break;
            }

            frame += 1;
            next_tick += interval;
            if next_tick < now {
                next_tick = now + interval;
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_basic() {
        let ticker = TickerActor::spawn(Duration::from_millis(10));

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert_eq!(tick.unwrap().frame, 0);

        let tick2 = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick2.unwrap().frame >= 1);

        ticker.join();
    }

    #[test]
    fn test_ticks_do_not_queue() {
        let ticker = TickerActor::spawn(Duration::from_millis(2));
        thread::sleep(Duration::from_millis(50));
        assert!(ticker.receiver().len() <= 1);
        ticker.join();
    }

    #[test]
    fn test_ticker_shutdown() {
        let ticker = TickerActor::spawn(Duration::from_millis(100));
        assert_eq!(ticker.interval(), Duration::from_millis(100));
        ticker.shutdown();
        ticker.join();
    }
}
