//! Linear acceleration ramp.
//!
//! The step period is interpolated from the start period to the cruise period over the first
//! `accel_steps` steps, then held at the cruise period.

/// Steps over which a motion of `steps` ramps up.
pub fn accel_steps_for(steps: u32, max_accel_steps: u32) -> u32 {
    steps.min(max_accel_steps)
}

/// Period to program after `steps_done` completed steps.
///
/// Integer arithmetic, truncating. The result always lies between `start_delay_us` and
/// `target_delay_us`, whichever of the two is larger.
pub fn ramp_delay(start_delay_us: u32, target_delay_us: u32, steps_done: u32, accel_steps: u32) -> u32 {
    if steps_done >= accel_steps {
        return target_delay_us;
    }
    let start = u64::from(start_delay_us);
    let target = u64::from(target_delay_us);
    let done = u64::from(steps_done);
    let accel = u64::from(accel_steps);
    let delay = if target <= start {
        start - (start - target) * done / accel
    } else {
        // cruising slower than the start speed
        start + (target - start) * done / accel
    };
    delay as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accel_steps_for_long_move() {
        assert_eq!(accel_steps_for(1000, 30), 30);
    }

    #[test]
    fn test_accel_steps_for_short_move() {
        assert_eq!(accel_steps_for(12, 30), 12);
        assert_eq!(accel_steps_for(1, 30), 1);
    }

    #[test]
    fn test_ramp_delay_starts_at_start_delay() {
        assert_eq!(ramp_delay(314159, 5000, 0, 30), 314159);
    }

    #[test]
    fn test_ramp_delay_interpolates() {
        // (314159 - 5000) * 15 / 30 = 154579 (truncated)
        assert_eq!(ramp_delay(314159, 5000, 15, 30), 314159 - 154579);
        // (314159 - 5000) * 1 / 5 = 61831 (truncated)
        assert_eq!(ramp_delay(314159, 5000, 1, 5), 314159 - 61831);
    }

    #[test]
    fn test_ramp_delay_plateau() {
        assert_eq!(ramp_delay(314159, 5000, 30, 30), 5000);
        assert_eq!(ramp_delay(314159, 5000, 500, 30), 5000);
    }

    #[test]
    fn test_ramp_delay_strictly_decreasing() {
        let mut previous = u32::MAX;
        for done in 0..30 {
            let delay = ramp_delay(314159, 5000, done, 30);
            assert!(delay < previous);
            assert!(delay > 5000);
            previous = delay;
        }
        assert_eq!(ramp_delay(314159, 5000, 30, 30), 5000);
    }

    #[test]
    fn test_ramp_delay_slower_cruise_ramps_up() {
        let mut previous = 0;
        for done in 0..30 {
            let delay = ramp_delay(314159, 600000, done, 30);
            assert!(delay >= 314159 && delay < 600000);
            assert!(delay >= previous);
            previous = delay;
        }
        assert_eq!(ramp_delay(314159, 600000, 30, 30), 600000);
    }

    #[test]
    fn test_ramp_delay_large_values_do_not_overflow() {
        let delay = ramp_delay(u32::MAX, 1, 29, 30);
        assert!(delay > 1);
        assert!(delay < u32::MAX);
    }

    #[test]
    fn test_ramp_delay_no_ramp() {
        assert_eq!(ramp_delay(314159, 5000, 0, 0), 5000);
    }
}
