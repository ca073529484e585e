/*
 *  main.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
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

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use tokio::signal::unix::{signal, SignalKind};

use cabinet_glow::alert::{CoinWatcher, NoCoinSensor};
use cabinet_glow::config::{self, Cli};
use cabinet_glow::constants::{COIN_BLINK_DURATION, IDLE_GAME, NUM_LEDS};
use cabinet_glow::display::drivers::{EmulatorLedStrip, EmulatorVfd};
use cabinet_glow::display::{shared_leds, shared_vfd};
use cabinet_glow::{EffectCoordinator, GameWatcher, ProcfsSource};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", config::dump(&config)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} lighting up the cabinet", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    // no hardware backends yet, the emulators log what the cabinet would show
    let leds = shared_leds(EmulatorLedStrip::new(NUM_LEDS));
    let vfd = shared_vfd(EmulatorVfd::new());

    let mut coordinator = EffectCoordinator::new(leds.clone(), vfd, &config);
    coordinator.apply_game(IDLE_GAME).await;

    let coin = config.coin();
    let mut coin_watcher = coin.enabled.then(|| {
        CoinWatcher::start(
            Box::new(NoCoinSensor),
            leds.clone(),
            coordinator.backdrop(),
            std::time::Duration::from_millis(coin.poll_ms),
            COIN_BLINK_DURATION,
        )
    });

    let mut watcher = GameWatcher::new(Box::new(ProcfsSource::new()), config.game_dirs());

    tokio::select! {
        result = signal_handler() => {
            result.context("installing signal handlers")?;
        }
        _ = watcher.run(&mut coordinator, config.poll_interval()) => {}
    }

    if let Some(coin_watcher) = coin_watcher.as_mut() {
        coin_watcher.stop().await;
    }
    coordinator.shutdown().await;
    info!("Exiting");
    Ok(())
}
