use std::time::Duration;

/// Simulation clock handed to every tick: the delta since the previous tick
/// and the total time since the experience started.
#[derive(Clone, Debug)]
pub struct Time {
    pub elapsed: Duration,
    pub total: Duration,
}

impl Time {
    pub fn zero() -> Time {
        Time {
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
        }
    }

    /// The clock one tick later.
    pub fn advanced(&self, delta: Duration) -> Time {
        Time {
            elapsed: delta,
            total: self.total + delta,
        }
    }
}
