/*
 *  pacer.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame deadline pacing for the animation driver
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
use tokio::time::Instant;

pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

// effects tick between 10ms (rainbow) and 50ms (chase, sine)
// a serial strip controller keeps up with either
impl Pacer {
    pub fn new(frame: Duration) -> Self {
        Self { next_deadline: Instant::now(), frame }
    }

    /// Schedule and return the next frame deadline.
    /// A caller that fell behind is re-anchored to now rather than bursting to catch up.
    pub fn next_deadline(&mut self) -> Instant {
        let now = Instant::now();
        self.next_deadline += self.frame;
        if self.next_deadline < now {
            self.next_deadline = now;
        }
        self.next_deadline
    }
}
