/// Per-cycle timing handed to every `tick()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Monotonic control-cycle counter.
    pub cycle: u64,
    pub dt_seconds: f32,
}

impl TickContext {
    pub fn new(cycle: u64, dt_seconds: f32) -> Self {
        Self { cycle, dt_seconds }
    }

    /// Context for the following control cycle.
    pub fn next(self) -> Self {
        Self {
            cycle: self.cycle.wrapping_add(1),
            dt_seconds: self.dt_seconds,
        }
    }
}
