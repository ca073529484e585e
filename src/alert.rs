/*
 *  alert.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Coin alert - blink the strip when a coin drops
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::display::{Color, DisplayError, PixelBuffer, SharedLedStrip};

/// Coin mech input
pub trait CoinSensor: Send {
    /// True once per inserted coin
    fn coin_inserted(&mut self) -> bool;
}

/// Cabinet without a coin switch wired up
#[derive(Debug, Default)]
pub struct NoCoinSensor;

impl CoinSensor for NoCoinSensor {
    fn coin_inserted(&mut self) -> bool {
        false
    }
}

/// Flash the whole strip `color` for `duration`, then put the last transition
/// frame back. The strip lock is held throughout so no animation frame lands
/// mid-blink; an animated effect repaints on its next frame anyway.
pub async fn blink_once(
    leds: &SharedLedStrip,
    color: Color,
    duration: Duration,
    backdrop: Option<&PixelBuffer>,
) -> Result<(), DisplayError> {
    let mut strip = leds.lock().await;
    let flash = PixelBuffer::filled(strip.pixel_count(), color);
    strip.submit_immediate(&flash)?;
    tokio::time::sleep(duration).await;
    if let Some(frame) = backdrop {
        strip.submit_immediate(frame)?;
    }
    Ok(())
}

/// Background task polling a [`CoinSensor`]
pub struct CoinWatcher {
    stop_sender: Option<mpsc::Sender<()>>,
    poll_handle: Option<JoinHandle<()>>,
}

impl CoinWatcher {
    pub fn start(
        mut sensor: Box<dyn CoinSensor>,
        leds: SharedLedStrip,
        backdrop: watch::Receiver<Option<PixelBuffer>>,
        poll: Duration,
        blink: Duration,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel(1);

        let poll_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(poll) => {
                        if !sensor.coin_inserted() {
                            continue;
                        }
                        info!("coin inserted");
                        let frame = backdrop.borrow().clone();
                        if let Err(e) = blink_once(&leds, Color::YELLOW, blink, frame.as_ref()).await {
                            error!("Error in coin blink: {}", e);
                        }
                    }
                    _ = rx.recv() => {
                        debug!("coin watcher received stop signal. Exiting.");
                        break;
                    }
                }
            }
        });

        Self { stop_sender: Some(tx), poll_handle: Some(poll_handle) }
    }

    pub async fn stop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.send(()).await;
        }
        if let Some(handle) = self.poll_handle.take() {
            if let Err(e) = handle.await {
                warn!("coin watcher ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for CoinWatcher {
    fn drop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.try_send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::{LedOp, MockLedStrip};
    use crate::display::shared_leds;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Reports `coins` insertions, one per poll
    struct Coins(Arc<AtomicUsize>);

    impl CoinSensor for Coins {
        fn coin_inserted(&mut self) -> bool {
            self.0
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[tokio::test]
    async fn test_blink_restores_backdrop() {
        let mock = MockLedStrip::new(3);
        let leds = shared_leds(mock.clone());
        let backdrop = PixelBuffer::filled(3, Color::new(1, 2, 3));

        blink_once(&leds, Color::YELLOW, Duration::from_millis(1), Some(&backdrop))
            .await
            .unwrap();

        assert_eq!(
            mock.ops(),
            vec![
                LedOp::Immediate(PixelBuffer::filled(3, Color::YELLOW)),
                LedOp::Immediate(backdrop),
            ]
        );
    }

    #[tokio::test]
    async fn test_watcher_blinks_per_coin() {
        let mock = MockLedStrip::new(2);
        let leds = shared_leds(mock.clone());
        let (_tx, rx) = watch::channel(Some(PixelBuffer::black(2)));
        let coins = Arc::new(AtomicUsize::new(2));

        let mut watcher = CoinWatcher::start(
            Box::new(Coins(coins.clone())),
            leds,
            rx,
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        for _ in 0..200 {
            if coins.load(Ordering::SeqCst) == 0 && mock.ops().len() == 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        watcher.stop().await;

        let state = mock.state();
        let state = state.lock().unwrap();
        assert_eq!(state.immediate_count(), 4);
        assert_eq!(state.frames()[0], &PixelBuffer::filled(2, Color::YELLOW));
    }

    #[tokio::test]
    async fn test_no_sensor_never_blinks() {
        let mock = MockLedStrip::new(2);
        let (_tx, rx) = watch::channel(None);
        let mut watcher = CoinWatcher::start(
            Box::new(NoCoinSensor),
            shared_leds(mock.clone()),
            rx,
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        watcher.stop().await;
        assert!(mock.ops().is_empty());
    }
}
