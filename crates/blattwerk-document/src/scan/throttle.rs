// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame throttle for the analysis loop: the frame source may deliver at any
// rate, the analyzer sees at most one frame per interval and always the most
// recent one.

use std::time::Duration;

/// Latest-frame slot with a minimum release interval.
#[derive(Debug)]
pub struct FrameThrottle<T> {
    min_interval: Duration,
    last_release: Option<Duration>,
    latest: Option<T>,
    dropped: u64,
}

impl<T> FrameThrottle<T> {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: None,
            latest: None,
            dropped: 0,
        }
    }

    /// Hand in a new frame. An older frame still waiting is discarded.
    pub fn offer(&mut self, frame: T) {
        if self.latest.replace(frame).is_some() {
            self.dropped += 1;
        }
    }

    /// Take the waiting frame if the interval since the last release has
    /// elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        let due = match self.last_release {
            Some(last) => now.saturating_sub(last) >= self.min_interval,
            None => true,
        };
        if !due {
            return None;
        }
        let frame = self.latest.take()?;
        self.last_release = Some(now);
        Some(frame)
    }

    pub fn has_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Frames replaced before they were ever polled.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn releases_most_recent_frame() {
        let mut throttle = FrameThrottle::new(ms(80));
        throttle.offer(1);
        throttle.offer(2);
        throttle.offer(3);
        assert_eq!(throttle.poll(ms(0)), Some(3));
        assert_eq!(throttle.dropped(), 2);
        assert!(!throttle.has_pending());
    }

    #[test]
    fn holds_frames_until_interval_elapses() {
        let mut throttle = FrameThrottle::new(ms(80));
        throttle.offer("a");
        assert_eq!(throttle.poll(ms(100)), Some("a"));
        throttle.offer("b");
        assert_eq!(throttle.poll(ms(150)), None);
        assert!(throttle.has_pending());
        assert_eq!(throttle.poll(ms(180)), Some("b"));
    }

    #[test]
    fn at_most_one_release_per_interval_at_high_rate() {
        let mut throttle = FrameThrottle::new(ms(80));
        let mut released = Vec::new();
        // A 240 Hz source polled on every frame for one second.
        for i in 0..240u64 {
            let now = Duration::from_micros(i * 4167);
            throttle.offer(i);
            if throttle.poll(now).is_some() {
                released.push(now);
            }
        }
        for pair in released.windows(2) {
            assert!(pair[1] - pair[0] >= ms(80));
        }
        assert!(released.len() >= 11 && released.len() <= 13, "{}", released.len());
    }

    #[test]
    fn empty_poll_does_not_consume_interval() {
        let mut throttle: FrameThrottle<u8> = FrameThrottle::new(ms(80));
        assert_eq!(throttle.poll(ms(0)), None);
        throttle.offer(7);
        assert_eq!(throttle.poll(ms(10)), Some(7));
    }
}
