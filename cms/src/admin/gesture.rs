// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::GestureConfig;
use chrono::{DateTime, Duration, Utc};
use log::debug;

/// Click counter that reveals the admin toggle.
///
/// The count falls back to zero once `window` passes without a click. The
/// reset is applied lazily on the next click or read, which behaves like a
/// timer restarted on every click.
#[derive(Debug, Clone)]
pub struct ActivationGesture {
    required: u32,
    window: Duration,
    count: u32,
    last_click: Option<DateTime<Utc>>,
}

impl ActivationGesture {
    pub fn new(required: u32, window: Duration) -> Self {
        Self {
            required: required.max(1),
            window,
            count: 0,
            last_click: None,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.clicks, Duration::milliseconds(config.window_ms as i64))
    }

    pub fn count_at(&self, now: DateTime<Utc>) -> u32 {
        match self.last_click {
            Some(last) if now - last < self.window => self.count,
            _ => 0,
        }
    }

    /// Records a click; returns true when it completes the gesture, which
    /// also resets the count.
    pub fn register(&mut self, now: DateTime<Utc>) -> bool {
        self.count = self.count_at(now) + 1;
        self.last_click = Some(now);
        debug!("Activation click {}/{}", self.count, self.required);
        if self.count >= self.required {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture() -> ActivationGesture {
        ActivationGesture::from_config(&GestureConfig::default())
    }

    #[test]
    fn three_quick_clicks_complete_the_gesture() {
        let mut gesture = gesture();
        let start = Utc::now();
        assert!(!gesture.register(start));
        assert!(!gesture.register(start + Duration::milliseconds(2900)));
        assert!(gesture.register(start + Duration::milliseconds(5800)));
        assert_eq!(gesture.count_at(start + Duration::milliseconds(5800)), 0);
    }

    #[test]
    fn a_three_second_pause_resets_the_count() {
        let mut gesture = gesture();
        let start = Utc::now();
        gesture.register(start);
        gesture.register(start + Duration::milliseconds(500));
        let later = start + Duration::milliseconds(3500);
        assert_eq!(gesture.count_at(later), 0);
        assert!(!gesture.register(later));
        assert!(!gesture.register(later + Duration::milliseconds(500)));
        assert_eq!(gesture.count_at(later + Duration::milliseconds(500)), 2);
    }

    #[test]
    fn the_window_is_measured_from_the_latest_click() {
        let mut gesture = gesture();
        let start = Utc::now();
        gesture.register(start);
        gesture.register(start + Duration::milliseconds(3000));
        assert_eq!(gesture.count_at(start + Duration::milliseconds(3000)), 1);
    }
}
