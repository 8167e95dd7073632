#![allow(dead_code)]

use common::{OutputPinBase, StepTimerBase};

#[derive(Default)]
pub struct Pin {
    high: bool,
    pub rising_edges: u32,
}

impl OutputPinBase for Pin {
    fn set_high(&mut self) {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_high(&self) -> bool {
        self.high
    }
}

/// Records what the step generators program, and keeps a running clock of elapsed reloads.
#[derive(Default)]
pub struct Timer {
    pub enabled: bool,
    pub disables: u32,
    pub reload: u32,
    pub now_us: u64,
}

impl Timer {
    /// Let the programmed reload run out, as the hardware would before the next interrupt.
    pub fn elapse(&mut self) {
        self.now_us += u64::from(self.reload);
    }
}

impl StepTimerBase for Timer {
    fn enable_interrupt(&mut self) {
        self.enabled = true;
    }

    fn disable_interrupt(&mut self) {
        self.enabled = false;
        self.disables += 1;
    }

    fn set_reload(&mut self, ticks: u32) {
        self.reload = ticks;
    }

    fn reset_counter(&mut self) {}
}
