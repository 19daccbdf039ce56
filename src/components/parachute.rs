pub use crate::events::EventTag;

/// A parachute component: drag properties, the event that triggers its
/// deployment, and a deployment flag that only ever flips false → true.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parachute {
    pub drag_coefficient: f64,
    pub reference_area_m2: f64,
    pub trigger: EventTag,
    deployed: bool,
}

impl Parachute {
    pub fn new(drag_coefficient: f64, reference_area_m2: f64, trigger: EventTag) -> Self {
        Self {
            drag_coefficient,
            reference_area_m2,
            trigger,
            deployed: false,
        }
    }

    pub fn is_deployed(&self) -> bool {
        self.deployed
    }

    /// Idempotent: calling this a second time leaves `deployed` unchanged.
    pub fn deploy(&mut self) {
        self.deployed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_is_idempotent() {
        let mut chute = Parachute::new(1.5, 2.0, EventTag::Apogee);
        assert!(!chute.is_deployed());
        chute.deploy();
        assert!(chute.is_deployed());
        chute.deploy();
        assert!(chute.is_deployed());
    }
}
