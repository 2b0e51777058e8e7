use shardfall_core::NoiseParams;

/// Value noise over the integer lattice: each corner gets a hashed value in
/// `[0, 1)` and points in between are bilinearly interpolated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NoiseField {
    params: NoiseParams,
}

impl NoiseField {
    pub fn new(params: NoiseParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> NoiseParams {
        self.params
    }

    /// Hash of one lattice corner.
    pub fn lattice(&self, ix: i32, iz: i32) -> f64 {
        let NoiseParams { k1, k2, k3 } = self.params;
        let n = (f64::from(ix) * k1 + f64::from(iz) * k2).sin() * k3;
        n - n.floor()
    }

    /// Expects finite inputs.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        debug_assert!(x.is_finite() && z.is_finite(), "noise sampled at ({x}, {z})");

        let fx = x.floor();
        let fz = z.floor();
        let sx = x - fx;
        let sz = z - fz;
        let ix = fx as i32;
        let iz = fz as i32;

        let a = self.lattice(ix, iz);
        let b = self.lattice(ix.wrapping_add(1), iz);
        let c = self.lattice(ix, iz.wrapping_add(1));
        let d = self.lattice(ix.wrapping_add(1), iz.wrapping_add(1));
        bilerp(a, b, c, d, sx, sz)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(NoiseParams::default())
    }
}

pub(crate) fn bilerp(a: f64, b: f64, c: f64, d: f64, sx: f64, sz: f64) -> f64 {
    (a * (1.0 - sx) + b * sx) * (1.0 - sz) + (c * (1.0 - sx) + d * sx) * sz
}
