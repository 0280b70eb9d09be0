use std::time::Duration;

pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub started_at: f64,
    pub duration: Duration,
}

impl Transition {
    pub fn new(started_at: f64, duration: Duration) -> Self {
        Self {
            started_at,
            duration,
        }
    }

    pub fn linear(&self, now: f64) -> f32 {
        let duration = self.duration.as_secs_f64();
        if duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / duration).clamp(0.0, 1.0) as f32
    }

    pub fn eased(&self, now: f64) -> f32 {
        ease_cubic_in_out(self.linear(now))
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.linear(now) >= 1.0
    }
}
