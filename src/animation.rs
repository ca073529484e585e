/*
 *  animation.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Animation sessions - one cancellable frame loop per running effect
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
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::audio::AudioSampler;
use crate::display::{PixelOrder, SharedLedStrip};
use crate::effects::{EffectSpec, FrameGenerator, SubmitMode};
use crate::pacer::Pacer;

/// A running effect
///
/// The session holds the only sender of its cancellation token. Dropping a
/// session without calling [`AnimationSession::stop`] still cancels the loop
/// (the receiver sees the sender go away) but does not wait for it.
pub struct AnimationSession {
    id: u64,
    effect: EffectSpec,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
    audio: Option<AudioSampler>,
}

impl AnimationSession {
    /// Spawn the frame loop for `generator`, or an idle wait when there is none
    /// (solid effects hold the frame the coordinator faded in).
    pub fn start(
        id: u64,
        effect: EffectSpec,
        generator: Option<Box<dyn FrameGenerator>>,
        leds: SharedLedStrip,
        order: PixelOrder,
        audio: Option<AudioSampler>,
    ) -> Self {
        let (cancel, token) = watch::channel(false);
        let handle = match generator {
            Some(generator) => {
                info!("session {}: animating {}", id, effect);
                tokio::spawn(drive(id, generator, leds, order, token))
            }
            None => {
                info!("session {}: holding {}", id, effect);
                tokio::spawn(hold(id, token))
            }
        };
        Self { id, effect, cancel, handle, audio }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn effect(&self) -> &EffectSpec {
        &self.effect
    }

    /// True once the loop has exited on its own (audio loss, panic)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal cancellation and wait for the loop to exit, at most `timeout`.
    ///
    /// A loop that overruns is aborted at its next await point. The audio
    /// sampler, if any, is torn down after the loop has gone.
    pub async fn stop(mut self, timeout: Duration) {
        let _ = self.cancel.send(true);

        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(())) => debug!("session {} joined", self.id),
            Ok(Err(e)) if e.is_panic() => error!("session {} panicked: {}", self.id, e),
            Ok(Err(e)) => warn!("session {} ended abnormally: {}", self.id, e),
            Err(_) => {
                warn!(
                    "session {} ignored cancellation for {:?}, aborting",
                    self.id, timeout
                );
                self.handle.abort();
                let _ = (&mut self.handle).await;
            }
        }

        if let Some(audio) = self.audio.take() {
            // joining the capture thread blocks
            if let Err(e) = tokio::task::spawn_blocking(move || drop(audio)).await {
                warn!("session {}: audio teardown failed: {}", self.id, e);
            }
        }
    }
}

fn cancelled(token: &watch::Receiver<bool>) -> bool {
    *token.borrow()
}

/// Frame loop: generate, remap, submit under the LED lock, sleep to the next
/// deadline. Cancellation is checked before generating and again once the lock
/// is held, so nothing is drawn after the token flips.
async fn drive(
    id: u64,
    mut generator: Box<dyn FrameGenerator>,
    leds: SharedLedStrip,
    order: PixelOrder,
    mut token: watch::Receiver<bool>,
) {
    let mode = generator.submit_mode();
    let mut pacer = Pacer::new(generator.cadence());
    let mut frames: u64 = 0;

    loop {
        if cancelled(&token) {
            break;
        }

        let frame = match generator.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("session {}: {}; ending session", id, e);
                break;
            }
        };

        {
            let mut strip = leds.lock().await;
            if cancelled(&token) {
                break;
            }
            let result = strip.remap(&order, &frame).and_then(|device_frame| match mode {
                SubmitMode::Immediate => strip.submit_immediate(&device_frame),
                SubmitMode::Faded(timing) => {
                    strip.configure_blend(timing)?;
                    strip.submit_faded(&device_frame)
                }
            });
            match result {
                Ok(()) => frames += 1,
                Err(e) => warn!("session {}: frame skipped: {}", id, e),
            }
        }

        tokio::select! {
            _ = tokio::time::sleep_until(pacer.next_deadline()) => {}
            changed = token.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!("session {}: stopped after {} frames", id, frames);
}

/// Solid effects: nothing to draw, just wait to be cancelled
async fn hold(id: u64, mut token: watch::Receiver<bool>) {
    while !cancelled(&token) {
        if token.changed().await.is_err() {
            break;
        }
    }
    debug!("session {}: released", id);
}
