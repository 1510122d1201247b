use core::fmt;

/// Number of TDMA frames in a GSM hyperframe, after which the frame number wraps to 0.
pub const GSM_HYPERFRAME: u32 = 2048 * 26 * 51;

/// Position on the GSM TDMA frame clock, as reported by the DSP in every time indication.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct GsmTime {
    /// Frame number, from 0 to GSM_HYPERFRAME - 1
    pub fn_: u32,
}

/// Difference between two frame numbers, handling wrap-around of the hyperframe.
pub fn fn_diff(a: u32, b: u32) -> i32 {
    let wrap = GSM_HYPERFRAME as i64;
    let mut diff = a as i64 - b as i64;
    while diff < -wrap / 2 {
        diff += wrap;
    }
    while diff >= wrap / 2 {
        diff -= wrap;
    }
    diff as i32
}

impl GsmTime {
    pub fn new(fn_: u32) -> GsmTime {
        GsmTime { fn_: fn_ % GSM_HYPERFRAME }
    }

    /// Superframe counter, 0..2047
    pub fn t1(self) -> u16 {
        ((self.fn_ / (26 * 51)) % 2048) as u16
    }

    /// Position in the 26-multiframe
    pub fn t2(self) -> u8 {
        (self.fn_ % 26) as u8
    }

    /// Position in the 51-multiframe
    pub fn t3(self) -> u8 {
        (self.fn_ % 51) as u8
    }

    /// Add a (possibly negative) number of frames
    pub fn add_frames(self, frames: i32) -> GsmTime {
        let fn_ = (self.fn_ as i64 + frames as i64).rem_euclid(GSM_HYPERFRAME as i64);
        GsmTime { fn_: fn_ as u32 }
    }

    /// Difference between two times in frames
    pub fn diff(self, b: Self) -> i32 {
        fn_diff(self.fn_, b.fn_)
    }

    #[inline(always)]
    pub fn age(self, now: GsmTime) -> i32 {
        now.diff(self)
    }
}

impl fmt::Display for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7}={:4}/{:02}/{:02}", self.fn_, self.t1(), self.t2(), self.t3())
    }
}

impl fmt::Debug for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7}={:4}/{:02}/{:02}", self.fn_, self.t1(), self.t2(), self.t3())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_frames_and_diff() {
        let initial_time = GsmTime::default();

        let mut time = initial_time;
        // Enough iterations that the hyperframe wraps several times
        let iterations = 10000;
        let increment = 12345;
        for _ in 0..iterations {
            let time2 = time.add_frames(increment);
            assert_eq!(time2.diff(time), increment);
            assert_eq!(time.diff(time2), -increment);
            time = time2;
        }

        for _ in 0..iterations {
            let time2 = time.add_frames(-increment);
            assert_eq!(time2.diff(time), -increment);
            time = time2;
        }

        assert_eq!(time, initial_time);
    }

    #[test]
    fn test_t1_t2_t3() {
        let t = GsmTime::new(26 * 51 + 52);
        assert_eq!(t.t1(), 1);
        assert_eq!(t.t2(), 0);
        assert_eq!(t.t3(), 1);
        assert_eq!(GsmTime::new(GSM_HYPERFRAME).fn_, 0);
        assert_eq!(GsmTime::default().add_frames(-1).fn_, GSM_HYPERFRAME - 1);
    }
}
