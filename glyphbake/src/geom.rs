// Copyright 2025 the Glyphbake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projective transforms for the one-sided perspective warp.
//!
//! Affine work goes through [`kurbo::Affine`]; this module only adds the
//! 3x3 homography that affine matrices cannot express.

use kurbo::Point;

/// A 3x3 projective transform, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography([[f64; 3]; 3]);

impl Homography {
    /// The identity transform.
    pub const IDENTITY: Self = Self([[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]]);

    /// Build the homography mapping the four `src` points onto `dst`.
    ///
    /// Points are given in consistent winding order (conventionally
    /// top-left, top-right, bottom-right, bottom-left). Returns `None`
    /// when the correspondence is degenerate, e.g. three collinear
    /// points.
    pub fn from_quad(src: [Point; 4], dst: [Point; 4]) -> Option<Self> {
        // Direct linear transform: 8 equations in the 8 unknowns
        // h00..h21, with h22 fixed to 1.
        let mut m = [[0.0_f64; 9]; 8];
        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);
            m[2 * i] = [x, y, 1., 0., 0., 0., -u * x, -u * y, u];
            m[2 * i + 1] = [0., 0., 0., x, y, 1., -v * x, -v * y, v];
        }

        let h = solve_8x8(&mut m)?;
        Some(Self([
            [h[0], h[1], h[2]],
            [h[3], h[4], h[5]],
            [h[6], h[7], 1.],
        ]))
    }

    /// The inverse transform, or `None` if this transform is singular.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.0;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut adj = [[0.0_f64; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                let (r1, r2) = ((r + 1) % 3, (r + 2) % 3);
                let (c1, c2) = ((c + 1) % 3, (c + 2) % 3);
                // Transposed cofactor.
                adj[c][r] = (m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]) * inv_det;
            }
        }
        Some(Self(adj))
    }

    /// Apply the transform to a point, with perspective division.
    pub fn apply(&self, p: Point) -> Point {
        let m = &self.0;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        Point::new(
            (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w,
            (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w,
        )
    }
}

/// Gaussian elimination with partial pivoting on an 8x9 augmented system.
fn solve_8x8(m: &mut [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&a, &b| {
            m[a][col]
                .abs()
                .partial_cmp(&m[b][col].abs())
                .expect("pivot magnitudes are finite")
        })?;
        if m[pivot][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        for row in 0..8 {
            if row == col {
                continue;
            }
            let f = m[row][col] / m[col][col];
            for k in col..9 {
                m[row][k] -= f * m[col][k];
            }
        }
    }
    let mut out = [0.0_f64; 8];
    for (i, item) in out.iter_mut().enumerate() {
        *item = m[i][8] / m[i][i];
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_quad() {
        let quad = [
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(10., 10.),
            Point::new(0., 10.),
        ];
        let h = Homography::from_quad(quad, quad).unwrap();
        assert_close(h.apply(Point::new(3., 7.)), Point::new(3., 7.));
    }

    #[test]
    fn maps_corners_exactly() {
        let src = [
            Point::new(0., 0.),
            Point::new(20., 0.),
            Point::new(20., 10.),
            Point::new(0., 10.),
        ];
        let dst = [
            Point::new(4., 0.),
            Point::new(20., 0.),
            Point::new(20., 10.),
            Point::new(0., 10.),
        ];
        let h = Homography::from_quad(src, dst).unwrap();
        for i in 0..4 {
            assert_close(h.apply(src[i]), dst[i]);
        }
    }

    #[test]
    fn inverse_round_trips() {
        let src = [
            Point::new(0., 0.),
            Point::new(20., 0.),
            Point::new(20., 10.),
            Point::new(0., 10.),
        ];
        let dst = [
            Point::new(2., 1.),
            Point::new(18., 0.),
            Point::new(20., 9.),
            Point::new(0., 10.),
        ];
        let h = Homography::from_quad(src, dst).unwrap();
        let inv = h.inverse().unwrap();
        let p = Point::new(5., 5.);
        assert_close(inv.apply(h.apply(p)), p);
    }

    #[test]
    fn collinear_points_are_rejected() {
        let src = [
            Point::new(0., 0.),
            Point::new(1., 1.),
            Point::new(2., 2.),
            Point::new(3., 3.),
        ];
        assert!(Homography::from_quad(src, src).is_none());
    }
}
