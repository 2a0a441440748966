use rand::Rng;

/// Which glove threw the displayed strike. Purely visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchSide {
    Left,
    Right,
}

/// Transient HUD flash fired on each punch event: a short, fading pulse on
/// a random side, aged by the tick loop. One flash at a time; a new punch
/// restarts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactFx {
    pub is_active: bool,
    pub side: PunchSide,
    pub power: u32,
    age: f64,
    max_age: f64,
}

impl Default for ImpactFx {
    fn default() -> Self {
        Self {
            is_active: false,
            side: PunchSide::Left,
            power: 0,
            age: 0.0,
            max_age: 0.5,
        }
    }
}

impl ImpactFx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger<R: Rng>(&mut self, rng: &mut R, power: u32) {
        self.is_active = true;
        self.side = if rng.gen_bool(0.5) {
            PunchSide::Left
        } else {
            PunchSide::Right
        };
        self.power = power;
        self.age = 0.0;
    }

    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }
        self.age += dt;
        if self.age >= self.max_age {
            self.is_active = false;
        }
    }

    /// 1.0 at impact fading linearly to 0.0; drives the pulse brightness.
    pub fn brightness(&self) -> f64 {
        if !self.is_active {
            return 0.0;
        }
        (1.0 - self.age / self.max_age).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_idle_until_triggered() {
        let fx = ImpactFx::new();
        assert!(!fx.is_active);
        assert_eq!(fx.brightness(), 0.0);
    }

    #[test]
    fn test_trigger_activates_at_full_brightness() {
        let mut fx = ImpactFx::new();
        fx.trigger(&mut StdRng::seed_from_u64(1), 88);
        assert!(fx.is_active);
        assert_eq!(fx.power, 88);
        assert_eq!(fx.brightness(), 1.0);
    }

    #[test]
    fn test_fades_out_and_deactivates() {
        let mut fx = ImpactFx::new();
        fx.trigger(&mut StdRng::seed_from_u64(2), 50);

        fx.update(0.25);
        assert!(fx.is_active);
        assert!((fx.brightness() - 0.5).abs() < 1e-9);

        fx.update(0.25);
        assert!(!fx.is_active);
        assert_eq!(fx.brightness(), 0.0);
    }

    #[test]
    fn test_retrigger_restarts_fade() {
        let mut fx = ImpactFx::new();
        let mut rng = StdRng::seed_from_u64(3);
        fx.trigger(&mut rng, 40);
        fx.update(0.4);
        fx.trigger(&mut rng, 95);
        assert_eq!(fx.brightness(), 1.0);
        assert_eq!(fx.power, 95);
    }

    #[test]
    fn test_update_when_idle_is_noop() {
        let mut fx = ImpactFx::new();
        fx.update(10.0);
        assert!(!fx.is_active);
    }

    #[test]
    fn test_both_sides_occur() {
        let mut fx = ImpactFx::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut seen_left = false;
        let mut seen_right = false;
        for _ in 0..50 {
            fx.trigger(&mut rng, 10);
            match fx.side {
                PunchSide::Left => seen_left = true,
                PunchSide::Right => seen_right = true,
            }
        }
        assert!(seen_left && seen_right);
    }
}
