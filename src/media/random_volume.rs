use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::store::{MediaIntent, MediaState, MediaStore};

#[derive(Debug, Clone, Copy)]
pub struct RandomVolumeOptions {
    /// Time between volume changes
    pub interval: Duration,
    /// Volume set when the timer starts, between 0 and 1
    pub initial_volume: f64,
    /// Unmute the media when the timer starts
    pub unmute: bool,
}

impl Default for RandomVolumeOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            initial_volume: 1.0,
            unmute: true,
        }
    }
}

/// One timer tick. Skipped while the user holds the volume slider or the
/// media is paused.
pub fn tick(state: &MediaState, slider_pointer_down: bool, rng: &mut impl Rng) -> Option<MediaIntent> {
    if slider_pointer_down || state.paused {
        return None;
    }
    let volume = rng.random::<f64>().clamp(0.0, 1.0);
    Some(MediaIntent::SetVolume(volume))
}

/// Running random-volume timer. Dropping it stops the timer.
pub struct RandomVolume {
    slider_pointer_down: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl RandomVolume {
    /// Start the timer on the current tokio runtime. `notify` is called with
    /// every intent dispatched to `store`, after the store is unlocked.
    pub fn start<S, F>(store: Arc<Mutex<S>>, options: RandomVolumeOptions, notify: F) -> Self
    where
        S: MediaStore + Send + 'static,
        F: Fn(MediaIntent) + Send + Sync + 'static,
    {
        tracing::info!(interval_ms = options.interval.as_millis() as u64, "starting random volume");

        {
            let mut initial = vec![MediaIntent::SetVolume(options.initial_volume)];
            if options.unmute {
                initial.push(MediaIntent::Unmute);
            }
            if let Ok(mut guard) = store.lock() {
                for &intent in &initial {
                    guard.dispatch(intent);
                }
            }
            for intent in initial {
                notify(intent);
            }
        }

        let slider_pointer_down = Arc::new(AtomicBool::new(false));
        let slider_flag = Arc::clone(&slider_pointer_down);
        let task = tokio::spawn(async move {
            let mut rng = StdRng::from_os_rng();
            let mut ticks = interval_at(Instant::now() + options.interval, options.interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;
                let picked = {
                    let Ok(mut guard) = store.lock() else {
                        tracing::error!("media store lock poisoned, stopping random volume");
                        return;
                    };
                    let picked = tick(&guard.state(), slider_flag.load(Ordering::SeqCst), &mut rng);
                    if let Some(intent) = picked {
                        guard.dispatch(intent);
                    }
                    picked
                };
                // Store is unlocked here so `notify` may read it
                if let Some(intent) = picked {
                    tracing::debug!(?intent, "random volume");
                    notify(intent);
                }
            }
        });

        Self {
            slider_pointer_down,
            task,
        }
    }

    /// Pointer went down (or up / cancel) on the volume slider
    pub fn set_slider_pointer_down(&self, down: bool) {
        self.slider_pointer_down.store(down, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RandomVolume {
    fn drop(&mut self) {
        tracing::info!("stopping random volume");
        self.task.abort();
    }
}
