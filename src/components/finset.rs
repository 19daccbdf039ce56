/// A trapezoidal fin set: root/tip chord, span, sweep, and axial position
/// along the body tube, plus fin count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finset {
    pub root_chord_m: f64,
    pub tip_chord_m: f64,
    pub span_m: f64,
    pub sweep_rad: f64,
    pub position_m: f64,
    pub fin_count: u32,
    pub mass_kg: f64,
}

impl Finset {
    pub fn get_mass(&self) -> f64 {
        self.mass_kg
    }

    /// ½·(root+tip)·span·fin_count
    pub fn get_planform_area(&self) -> f64 {
        0.5 * (self.root_chord_m + self.tip_chord_m) * self.span_m * self.fin_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planform_area_matches_formula() {
        let f = Finset {
            root_chord_m: 0.2,
            tip_chord_m: 0.1,
            span_m: 0.15,
            sweep_rad: 0.3,
            position_m: 1.0,
            fin_count: 4,
            mass_kg: 0.3,
        };
        assert_eq!(f.get_planform_area(), 0.5 * 0.3 * 0.15 * 4.0);
    }
}
