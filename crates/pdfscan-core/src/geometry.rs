/// A 2D affine transform `[a b c d e f]`.
///
/// Maps a point with `x' = a*x + c*y + e` and `y' = b*x + d*y + f`
/// (row-vector convention, `p' = p · M`). Used for both the text matrix
/// and the line matrix of the text state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity transform `[1 0 0 1 0 0]`.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// A pure translation `[1 0 0 1 tx ty]`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build a matrix from its six components in PDF order.
    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    /// The six components in PDF order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Compose `self` then `next`: the result applies `self` first and
    /// `next` second (`p · self · next`).
    pub fn then(&self, next: &Matrix) -> Matrix {
        Matrix {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    /// Translation components `(e, f)`: where the origin lands.
    pub fn origin(&self) -> (f64, f64) {
        (self.e, self.f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_default() {
        assert_eq!(Matrix::default(), Matrix::identity());
        assert_eq!(Matrix::identity().to_array(), [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn identity_then_translation() {
        let m = Matrix::identity().then(&Matrix::translation(10.0, 20.0));
        assert_eq!(m.to_array(), [1.0, 0.0, 0.0, 1.0, 10.0, 20.0]);
    }

    #[test]
    fn translations_accumulate() {
        let m = Matrix::translation(10.0, 20.0).then(&Matrix::translation(5.0, 5.0));
        assert_eq!(m.origin(), (15.0, 25.0));
    }

    #[test]
    fn composition_order_matters() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::translation(10.0, 0.0);

        // Translation applied after scaling is not scaled.
        assert_eq!(scale.then(&shift).origin(), (10.0, 0.0));
        // Translation applied before scaling is scaled.
        assert_eq!(shift.then(&scale).origin(), (20.0, 0.0));
    }

    #[test]
    fn general_composition_matches_formula() {
        let m1 = Matrix::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let m2 = Matrix::new(7.0, 8.0, 9.0, 10.0, 11.0, 12.0);
        let m = m1.then(&m2);
        assert_eq!(
            m.to_array(),
            [
                1.0 * 7.0 + 2.0 * 9.0,
                1.0 * 8.0 + 2.0 * 10.0,
                3.0 * 7.0 + 4.0 * 9.0,
                3.0 * 8.0 + 4.0 * 10.0,
                5.0 * 7.0 + 6.0 * 9.0 + 11.0,
                5.0 * 8.0 + 6.0 * 10.0 + 12.0,
            ]
        );
    }

    #[test]
    fn array_round_trip() {
        let arr = [0.5, 0.0, 0.0, 0.5, 72.0, 700.0];
        assert_eq!(Matrix::from_array(arr).to_array(), arr);
    }
}
