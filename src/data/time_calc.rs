use std::time::Duration;

/// Running record of inference durations.
#[derive(Debug, Default)]
pub struct TimeCalc {
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    pub fn n(&self) -> usize {
        self.duration.len()
    }

    pub fn avg(&self) -> Duration {
        match self.n() {
            0 => Duration::ZERO,
            n => self.total() / n as u32,
        }
    }

    pub fn push(&mut self, x: Duration) {
        self.duration.push(x);
    }
}
