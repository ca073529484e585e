/*
 *  lib.rs
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

//! Game-aware lighting for an arcade cabinet: watches for a game process,
//! then drives the LED strip effect and the marquee VFD to match.

pub mod alert;
pub mod animation;
pub mod audio;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod display;
pub mod effects;
pub mod pacer;
pub mod presentation;
pub mod unknown_games;
pub mod watcher;

pub use coordinator::{CoordinatorState, EffectCoordinator};
pub use watcher::{GameWatcher, ProcfsSource};
