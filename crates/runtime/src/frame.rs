use foundation::time::Time;

/// Per-frame timing handed to everything that animates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame (0 for the first frame).
    pub dt_s: f64,
    /// Elapsed time since the clock started.
    pub time: Time,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time::zero(),
        }
    }
}

/// Monotonic elapsed-time clock driven by host timestamps.
///
/// Hosts hand in whatever timestamp their frame scheduler provides (seconds);
/// the first sample becomes the origin. Timestamps that run backwards are
/// clamped so elapsed time never decreases.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    origin_s: Option<f64>,
    last: Option<Frame>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, now_s: f64) -> Frame {
        let origin = *self.origin_s.get_or_insert(now_s);
        let elapsed = (now_s - origin).max(0.0);

        let frame = match self.last {
            None => Frame::first(),
            Some(prev) => {
                let elapsed = elapsed.max(prev.time.0);
                Frame {
                    index: prev.index + 1,
                    dt_s: elapsed - prev.time.0,
                    time: Time(elapsed),
                }
            }
        };
        self.last = Some(frame);
        frame
    }

    /// The most recent frame, or the first frame if the clock never ticked.
    pub fn current(&self) -> Frame {
        self.last.unwrap_or_else(Frame::first)
    }
}

#[cfg(test)]
mod tests {
    use super::FrameClock;
    use foundation::time::Time;

    #[test]
    fn first_sample_is_origin() {
        let mut clock = FrameClock::new();
        let f0 = clock.advance(120.0);
        assert_eq!(f0.index, 0);
        assert_eq!(f0.time, Time(0.0));

        let f1 = clock.advance(120.5);
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
        assert_eq!(f1.dt_s, 0.5);
    }

    #[test]
    fn never_runs_backwards() {
        let mut clock = FrameClock::new();
        clock.advance(10.0);
        clock.advance(12.0);
        let f = clock.advance(11.0);
        assert_eq!(f.time, Time(2.0));
        assert_eq!(f.dt_s, 0.0);
    }
}
