/*
 *  coordinator.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Effect coordinator - switches LEDs and marquee when the game changes
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

use std::path::PathBuf;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tokio::sync::watch;

use crate::animation::AnimationSession;
use crate::audio::{AudioError, AudioSampler, AudioSettings};
use crate::config::{Config, GameLibrary, IdleConfig, Timings};
use crate::constants::{IDLE_GAME, NUM_LEDS};
use crate::display::{Color, PixelBuffer, PixelOrder, SharedLedStrip, SharedVfd};
use crate::effects::{build_generator, initial_frame, EffectKind, EffectSpec, FrameGenerator};
use crate::presentation::Presentation;
use crate::unknown_games::UnknownGamesLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Nothing applied yet, or shut down
    Idle,
    /// Between cancelling the old session and starting the new one
    Transitioning,
    Active(EffectSpec),
}

/// Everything the cabinet shows for one game
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub effect: EffectSpec,
    pub text: String,
    pub artwork: Option<PathBuf>,
}

/// Owns the animation session and both displays' game-level state.
///
/// Not reentrant: `apply_game` takes `&mut self`, so a game change that
/// arrives mid-transition waits for the current one to finish.
pub struct EffectCoordinator {
    leds: SharedLedStrip,
    presentation: Presentation,
    library: GameLibrary,
    unknown_log: UnknownGamesLog,
    unknown_effects: Vec<EffectKind>,
    idle: IdleConfig,
    timings: Timings,
    order: PixelOrder,
    audio: AudioSettings,
    num_leds: usize,
    state: CoordinatorState,
    session: Option<AnimationSession>,
    next_session_id: u64,
    backdrop: watch::Sender<Option<PixelBuffer>>,
    rng: StdRng,
}

impl EffectCoordinator {
    pub fn new(leds: SharedLedStrip, vfd: SharedVfd, config: &Config) -> Self {
        let timings = config.timings();
        let presentation = Presentation::new(
            vfd,
            config.vfd(),
            config.banner().to_string(),
            timings.text_rewrite(),
        );
        let (backdrop, _) = watch::channel(None);
        Self {
            leds,
            presentation,
            library: config.games(),
            unknown_log: UnknownGamesLog::new(config.unknown_games_log()),
            unknown_effects: config.unknown_effects(),
            idle: config.idle(),
            timings,
            order: config.pixel_order(),
            audio: config.audio(),
            num_leds: NUM_LEDS,
            state: CoordinatorState::Idle,
            session: None,
            next_session_id: 1,
            backdrop,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the random source used for unknown games
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Id of the running session, if any
    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(AnimationSession::id)
    }

    pub fn session_effect(&self) -> Option<EffectSpec> {
        self.session.as_ref().map(|s| *s.effect())
    }

    /// The device-order frame faded in at the last transition. The coin blink
    /// restores it so solid scenes do not stay yellow.
    pub fn backdrop(&self) -> watch::Receiver<Option<PixelBuffer>> {
        self.backdrop.subscribe()
    }

    /// Work out what to show for `exe`. Unknown games get random settings and
    /// are written to the unknown-games log.
    pub async fn resolve(&mut self, exe: &str) -> Scene {
        if exe == IDLE_GAME {
            return Scene {
                effect: EffectSpec::solid(self.idle.color),
                text: self.idle.scroll_text.clone(),
                artwork: self.idle.ascii_file.clone(),
            };
        }

        if let Some(entry) = self.library.get(exe) {
            return Scene {
                effect: entry.effect(),
                text: entry.scroll_text.clone(),
                artwork: entry.ascii_file.clone(),
            };
        }

        warn!("Unknown game: {}", exe);
        let kind = self
            .unknown_effects
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(EffectKind::Solid);
        let effect = EffectSpec::new(kind, Color::random(&mut self.rng), Color::random(&mut self.rng));
        let text = format!("Playing Unknown Game ({})", exe);

        let log = self.unknown_log.clone();
        let (name, line) = (exe.to_string(), text.clone());
        match tokio::task::spawn_blocking(move || log.record(&name, &effect, &line)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("{}", e),
            Err(e) => error!("unknown games log writer failed: {}", e),
        }
        Scene { effect, text, artwork: None }
    }

    /// Switch everything over to `exe`.
    ///
    /// Order: stop the old session, fade to the new effect's first frame and
    /// let it settle, update the marquee, then start the new session.
    pub async fn apply_game(&mut self, exe: &str) {
        let scene = self.resolve(exe).await;
        info!("applying {} => {}", exe, scene.effect);
        self.state = CoordinatorState::Transitioning;

        self.stop_session().await;

        self.fade_in(&scene.effect).await;
        tokio::time::sleep(self.timings.settle()).await;

        self.present(&scene).await;

        self.start_session(scene.effect).await;
    }

    /// Check on a session that may have ended by itself. A VU meter that lost
    /// its audio stream is replaced by a solid session on its base color.
    pub async fn reap(&mut self) {
        let finished = self.session.as_ref().is_some_and(AnimationSession::is_finished);
        if !finished {
            return;
        }
        if let Some(session) = self.session.take() {
            let effect = *session.effect();
            warn!("session {} ({}) ended on its own", session.id(), effect.kind);
            session.stop(self.timings.join_timeout()).await;
            self.launch(EffectSpec::solid(effect.color1), None);
        }
    }

    /// Stop the running session. The marquee keeps whatever it last showed.
    pub async fn shutdown(&mut self) {
        self.stop_session().await;
        self.state = CoordinatorState::Idle;
        info!("coordinator stopped");
    }

    async fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop(self.timings.join_timeout()).await;
        }
    }

    async fn fade_in(&mut self, effect: &EffectSpec) {
        let frame = initial_frame(effect, self.num_leds);
        let mut leds = self.leds.lock().await;
        let result = leds.remap(&self.order, &frame).and_then(|device_frame| {
            leds.configure_blend(self.timings.transition_blend)?;
            leds.submit_faded(&device_frame)?;
            Ok(device_frame)
        });
        match result {
            Ok(device_frame) => {
                self.backdrop.send_replace(Some(device_frame));
            }
            Err(e) => warn!("transition fade failed: {}", e),
        }
    }

    async fn present(&self, scene: &Scene) {
        if let Err(e) = self.presentation.reset().await {
            warn!("VFD reset failed: {}", e);
        }
        if let Some(path) = scene.artwork.as_deref() {
            if let Err(e) = self.presentation.show_artwork(path).await {
                error!("Error showing artwork: {}", e);
            }
        }
        if let Err(e) = self.presentation.set_text(&scene.text).await {
            error!("Error setting VFD text: {}", e);
        }
    }

    async fn start_session(&mut self, effect: EffectSpec) {
        if effect.kind != EffectKind::VuMeter {
            self.launch(effect, None);
            return;
        }

        match self.start_audio().await {
            Ok(sampler) => {
                info!("VU meter listening on {}", sampler.device());
                self.launch(effect, Some(sampler));
            }
            Err(e) => {
                error!("VU meter unavailable ({}), holding solid color", e);
                self.launch(EffectSpec::solid(effect.color1), None);
            }
        }
    }

    async fn start_audio(&self) -> Result<AudioSampler, AudioError> {
        if !self.audio.enabled {
            return Err(AudioError::Config("audio disabled in configuration".into()));
        }
        let settings = self.audio.clone();
        // device discovery and stream start block
        tokio::task::spawn_blocking(move || AudioSampler::start(settings))
            .await
            .map_err(|e| AudioError::Thread(e.to_string()))?
    }

    fn launch(&mut self, effect: EffectSpec, audio: Option<AudioSampler>) {
        let amplitude = audio.as_ref().map(AudioSampler::amplitude);
        let generator = build_generator(&effect, self.num_leds, amplitude);
        self.spawn_session(effect, generator, audio);
    }

    fn spawn_session(
        &mut self,
        effect: EffectSpec,
        generator: Option<Box<dyn FrameGenerator>>,
        audio: Option<AudioSampler>,
    ) {
        let id = self.next_session_id;
        self.next_session_id += 1;

        self.session = Some(AnimationSession::start(
            id,
            effect,
            generator,
            self.leds.clone(),
            self.order.clone(),
            audio,
        ));
        self.state = CoordinatorState::Active(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::{LedOp, MockLedStrip, MockVfd, VfdOp};
    use crate::display::{shared_leds, shared_vfd, BlendTiming};

    fn config(extra: &str) -> Config {
        let log = std::env::temp_dir().join(format!(
            "cabinet-glow-coord-{}-{}.txt",
            std::process::id(),
            extra.len()
        ));
        let yaml = format!(
            "unknown_games_log: {}\ntimings:\n  settle_ms: 5\n  text_rewrite_ms: 1\n  join_timeout_ms: 500\naudio:\n  enabled: false\n{}",
            log.display(),
            extra
        );
        Config::from_yaml_str(&yaml).unwrap()
    }

    fn coordinator(cfg: &Config) -> (EffectCoordinator, MockLedStrip, MockVfd) {
        let leds = MockLedStrip::new(NUM_LEDS);
        let vfd = MockVfd::new();
        let coord = EffectCoordinator::new(shared_leds(leds.clone()), shared_vfd(vfd.clone()), cfg)
            .with_rng(StdRng::seed_from_u64(7));
        (coord, leds, vfd)
    }

    #[tokio::test]
    async fn test_idle_scene_is_solid_yellow() {
        let cfg = config("");
        let (mut coord, leds, vfd) = coordinator(&cfg);
        coord.apply_game(IDLE_GAME).await;

        assert_eq!(coord.state(), CoordinatorState::Active(EffectSpec::solid(Color::IDLE_YELLOW)));
        let ops = leds.ops();
        assert_eq!(ops[0], LedOp::Blend(BlendTiming::new(60, 2)));
        assert_eq!(ops[1], LedOp::Faded(PixelBuffer::filled(NUM_LEDS, Color::IDLE_YELLOW)));

        let vfd_ops = vfd.ops();
        assert_eq!(&vfd_ops[..2], &[VfdOp::Reset, VfdOp::Power(true)]);
        let texts = vfd.state().lock().unwrap().texts().iter().map(|t| t.to_string()).collect::<Vec<_>>();
        assert_eq!(texts, vec![cfg.banner().to_string(), cfg.banner().to_string()]);
        coord.shutdown().await;
        assert_eq!(coord.state(), CoordinatorState::Idle);
    }

    #[tokio::test]
    async fn test_vu_without_audio_falls_back_to_solid() {
        let cfg = config("games:\n  vu.exe:\n    led_effect: vu-meter\n    led_color: [9, 9, 9]\n");
        let (mut coord, _leds, _vfd) = coordinator(&cfg);
        coord.apply_game("vu.exe").await;
        assert_eq!(coord.session_effect(), Some(EffectSpec::solid(Color::new(9, 9, 9))));
        coord.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_game_uses_allowed_effects() {
        let cfg = config("unknown_effects: [theater-chase]\n");
        let (mut coord, _leds, vfd) = coordinator(&cfg);
        let scene = coord.resolve("mystery.exe").await;
        assert_eq!(scene.effect.kind, EffectKind::TheaterChase);
        assert_eq!(scene.text, "Playing Unknown Game (mystery.exe)");
        let logged = std::fs::read_to_string(cfg.unknown_games_log()).unwrap();
        assert!(logged.contains("mystery.exe:"));

        coord.apply_game("mystery.exe").await;
        let texts = vfd.state().lock().unwrap().texts().iter().map(|t| t.to_string()).collect::<Vec<_>>();
        assert!(texts[0].starts_with("Playing Unknown Game (mystery.exe)   "));
        coord.shutdown().await;
        std::fs::remove_file(cfg.unknown_games_log()).ok();
    }

    #[tokio::test]
    async fn test_session_ids_increase() {
        let cfg = config("games:\n  a.exe: {led_effect: rainbow}\n");
        let (mut coord, _leds, _vfd) = coordinator(&cfg);
        coord.apply_game("a.exe").await;
        let first = coord.session_id().unwrap();
        coord.apply_game(IDLE_GAME).await;
        assert!(coord.session_id().unwrap() > first);
        coord.shutdown().await;
        assert_eq!(coord.session_id(), None);
    }

    #[tokio::test]
    async fn test_backdrop_tracks_last_fade() {
        let cfg = config("games:\n  red.exe: {led_color: [255, 0, 0]}\n");
        let (mut coord, _leds, _vfd) = coordinator(&cfg);
        let backdrop = coord.backdrop();
        coord.apply_game("red.exe").await;
        assert_eq!(
            *backdrop.borrow(),
            Some(PixelBuffer::filled(NUM_LEDS, Color::new(255, 0, 0)))
        );
        coord.shutdown().await;
    }

    /// Stands in for a VU meter whose capture stream died
    struct LostAudio;

    impl FrameGenerator for LostAudio {
        fn next_frame(&mut self) -> Result<PixelBuffer, crate::effects::EffectError> {
            Err(crate::effects::EffectError::AudioLost("device unplugged".into()))
        }
        fn submit_mode(&self) -> crate::effects::SubmitMode {
            crate::effects::SubmitMode::Immediate
        }
        fn cadence(&self) -> std::time::Duration {
            std::time::Duration::from_millis(5)
        }
    }

    #[tokio::test]
    async fn test_reap_replaces_dead_session_with_solid() {
        let cfg = config("");
        let (mut coord, leds, _vfd) = coordinator(&cfg);
        let color1 = Color::new(40, 50, 60);
        let vu = EffectSpec::new(EffectKind::VuMeter, color1, Color::BLACK);

        coord.spawn_session(vu, Some(Box::new(LostAudio)), None);
        let dead = coord.session_id();
        for _ in 0..100 {
            if coord.session.as_ref().is_some_and(AnimationSession::is_finished) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        coord.reap().await;
        assert_eq!(coord.session_effect(), Some(EffectSpec::solid(color1)));
        assert_eq!(coord.state(), CoordinatorState::Active(EffectSpec::solid(color1)));
        assert_ne!(coord.session_id(), dead);
        assert!(leds.ops().is_empty());

        // a live session is left alone
        let live = coord.session_id();
        coord.reap().await;
        assert_eq!(coord.session_id(), live);
        coord.shutdown().await;
    }
}
