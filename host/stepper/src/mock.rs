use common::{OutputPinBase, StepTimerBase};

pub struct PinMock {
    state: bool,
    rising_edges: u32,
}

impl PinMock {
    pub fn new() -> Self {
        Self {
            state: false,
            rising_edges: 0,
        }
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising_edges
    }
}

impl OutputPinBase for PinMock {
    fn set_high(&mut self) {
        if !self.state {
            self.rising_edges += 1;
        }
        self.state = true;
    }

    fn set_low(&mut self) {
        self.state = false;
    }

    fn is_high(&self) -> bool {
        self.state
    }
}

#[derive(Default)]
pub struct StepTimerMock {
    pub interrupt_enabled: bool,
    pub enable_count: u32,
    pub disable_count: u32,
    pub reload: u32,
    pub counter_resets: u32,
}

impl StepTimerMock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepTimerBase for StepTimerMock {
    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
        self.enable_count += 1;
    }

    fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
        self.disable_count += 1;
    }

    fn set_reload(&mut self, ticks: u32) {
        self.reload = ticks;
    }

    fn reset_counter(&mut self) {
        self.counter_resets += 1;
    }
}
