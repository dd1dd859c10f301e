use anyhow::{bail, Result};
use nalgebra::DMatrix;

/// Closed catalogue of parametric graphons, symmetric kernels on [0,1]²
/// interpreted as edge-probability generators for exchangeable random graphs.
///
/// Forms 4, 6 and 10 can stray outside [0,1] near the boundary of the unit
/// square; values are clamped at the point of Bernoulli use, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Graphon {
    /// w(u, v) = u·v
    Product,
    /// w(u, v) = exp(-(u^0.7 + v^0.7))
    ExpPower,
    /// w(u, v) = 0.25·(u² + v² + √u + √v)
    QuadraticRoot,
    /// w(u, v) = 0.5·(u + v)
    Mean,
    /// w(u, v) = 1 / (1 + exp(-10·(u² + v²)))
    SteepLogistic,
    /// w(u, v) = |u - v|
    Distance,
    /// w(u, v) = 1 / (1 + exp(-(max(u,v)² + min(u,v)⁴)))
    MinMaxLogistic,
    /// w(u, v) = exp(-max(u, v)^0.75)
    ExpMax,
    /// w(u, v) = exp(-0.5·(min(u, v) + √u + √v))
    ExpMinRoot,
    /// w(u, v) = ln(1 + 0.5·max(u, v))
    LogMax,
}

impl Graphon {
    pub const ALL: [Graphon; 10] = [
        Graphon::Product,
        Graphon::ExpPower,
        Graphon::QuadraticRoot,
        Graphon::Mean,
        Graphon::SteepLogistic,
        Graphon::Distance,
        Graphon::MinMaxLogistic,
        Graphon::ExpMax,
        Graphon::ExpMinRoot,
        Graphon::LogMax,
    ];

    /// Resolve a 1-based catalogue index into a graphon.
    pub fn from_index(index: usize) -> Result<Graphon> {
        if index == 0 || index > Self::ALL.len() {
            bail!(
                "graphon index {} outside the catalogue range 1..={}",
                index,
                Self::ALL.len()
            );
        }
        Ok(Self::ALL[index - 1])
    }

    /// 1-based catalogue index of this graphon.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|g| g == self)
            .map(|pos| pos + 1)
            .unwrap_or(0)
    }

    fn kernel(&self, u: f64, v: f64) -> f64 {
        match self {
            Graphon::Product => u * v,
            Graphon::ExpPower => (-(u.powf(0.7) + v.powf(0.7))).exp(),
            Graphon::QuadraticRoot => 0.25 * ((u * u + u.sqrt()) + (v * v + v.sqrt())),
            Graphon::Mean => 0.5 * (u + v),
            Graphon::SteepLogistic => 1.0 / (1.0 + (-10.0 * (u * u + v * v)).exp()),
            Graphon::Distance => (u - v).abs(),
            Graphon::MinMaxLogistic => {
                let hi = u.max(v);
                let lo = u.min(v);
                1.0 / (1.0 + (-(hi * hi + lo.powi(4))).exp())
            }
            Graphon::ExpMax => (-u.max(v).powf(0.75)).exp(),
            Graphon::ExpMinRoot => (-0.5 * (u.min(v) + u.sqrt() + v.sqrt())).exp(),
            Graphon::LogMax => (1.0 + 0.5 * u.max(v)).ln(),
        }
    }

    /// Evaluate the kernel over every pair of node positions.
    ///
    /// The result is an n×n matrix with `W[(i, j)] = w(x_i, x_j)`, symmetric
    /// by construction. Pure and deterministic given `positions`.
    pub fn evaluate(&self, positions: &[f64]) -> DMatrix<f64> {
        let n = positions.len();
        DMatrix::from_fn(n, n, |i, j| self.kernel(positions[i], positions[j]))
    }
}
