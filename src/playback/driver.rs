// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Async clock driver: ticks the engine at a frame interval.
//!
//! The driver stands in for the host's per-frame callback mechanism.
//! It is a single cooperative task; stopping is a watch-channel signal
//! observed between ticks, so no tick ever runs after shutdown has
//! completed and the task handle has been awaited.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::TimelineEngine;

/// Default frame interval (~60 ticks per second)
pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Handle to the running tick task
pub struct ClockDriver {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ClockDriver {
    /// Spawn the tick loop over a shared engine
    ///
    /// The engine lock is held for one whole tick at a time; no tick
    /// state crosses an await point.
    pub fn spawn(engine: Arc<Mutex<TimelineEngine>>, frame: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        match engine.lock() {
                            Ok(mut engine) => engine.tick(),
                            Err(_) => {
                                warn!("engine lock poisoned, stopping driver");
                                break;
                            }
                        }
                    }
                }
            }
            debug!("clock driver exited");
        });

        Self { stop_tx, handle }
    }

    /// Spawn with the default frame interval
    pub fn spawn_default(engine: Arc<Mutex<TimelineEngine>>) -> Self {
        Self::spawn(engine, DEFAULT_FRAME)
    }

    /// Signal stop and wait for the task to finish
    ///
    /// After this returns, no further tick will run.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{AudioClock, ExecutionSink, SystemAudioClock};
    use crate::timeline::{MemoryStore, NewSegment};
    use anyhow::Result;

    /// Sink counting pushes behind a shared handle
    #[derive(Clone, Default)]
    struct CountingSink {
        pushes: Arc<Mutex<usize>>,
    }

    impl ExecutionSink for CountingSink {
        fn set_code(&mut self, _code: &str) -> Result<()> {
            *self.pushes.lock().unwrap() += 1;
            Ok(())
        }

        fn evaluate(&mut self) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn playing_engine(sink: CountingSink) -> Arc<Mutex<TimelineEngine>> {
        let mut engine = TimelineEngine::new(
            Box::new(MemoryStore::new()),
            Box::new(SystemAudioClock::new()),
            Box::new(sink),
        );
        let track = engine.add_track(None);
        engine
            .add_segment(&track, NewSegment::new("s(\"bd\")").at(0.0).lasting(60.0))
            .unwrap();
        engine.play();
        Arc::new(Mutex::new(engine))
    }

    #[tokio::test]
    async fn test_driver_ticks_and_advances_playhead() {
        let sink = CountingSink::default();
        let engine = playing_engine(sink.clone());

        let driver = ClockDriver::spawn(engine.clone(), Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(50)).await;
        driver.shutdown().await;

        assert!(*sink.pushes.lock().unwrap() >= 1);
        assert!(engine.lock().unwrap().playhead() > 0.0);
    }

    #[tokio::test]
    async fn test_no_tick_after_shutdown() {
        let sink = CountingSink::default();
        let engine = playing_engine(sink.clone());

        let driver = ClockDriver::spawn(engine.clone(), Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        driver.shutdown().await;

        let frozen = engine.lock().unwrap().playhead();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(engine.lock().unwrap().playhead(), frozen);
    }

    #[tokio::test]
    async fn test_monotonic_audio_clock() {
        let clock = SystemAudioClock::new();
        let a = clock.now();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b = clock.now();
        assert!(b >= a);
    }
}
