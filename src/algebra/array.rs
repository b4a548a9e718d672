//! Arrays/vectors: componentwise broadcasting and textbook matrix algebra
//! (§4.5). An array is a list with the additional constraint that every
//! row has equal length, enforced at construction.

use crate::error::ErrorKind;
use crate::number::{promote, Real};
use crate::settings::Settings;

/// A 1-D vector or 2-D matrix of [`Real`] values, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    rows: usize,
    cols: usize,
    data: Vec<Real>,
}

impl Array {
    pub fn vector(values: Vec<Real>) -> Self {
        let cols = values.len();
        Array { rows: 1, cols, data: values }
    }

    pub fn matrix(rows: usize, cols: usize, data: Vec<Real>) -> Result<Self, ErrorKind> {
        if data.len() != rows * cols {
            return Err(ErrorKind::InvalidDimension);
        }
        Ok(Array { rows, cols, data })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, r: usize, c: usize) -> &Real {
        &self.data[r * self.cols + c]
    }

    /// The full row-major backing data, for the object codec.
    pub fn data(&self) -> &[Real] {
        &self.data
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    fn is_scalar(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }
}

/// Applies `op` componentwise, broadcasting a 1x1 operand against any shape
/// (§4.5: "scalar broadcasts for mixed scalar/array arguments").
fn broadcast(
    a: &Array,
    b: &Array,
    settings: &Settings,
    op: impl Fn(&Real, &Real, &Settings) -> Real,
) -> Result<Array, ErrorKind> {
    if a.is_scalar() {
        let s = a.data[0].clone();
        let data = b.data.iter().map(|v| op(&s, v, settings)).collect();
        return Ok(Array { rows: b.rows, cols: b.cols, data });
    }
    if b.is_scalar() {
        let s = b.data[0].clone();
        let data = a.data.iter().map(|v| op(v, &s, settings)).collect();
        return Ok(Array { rows: a.rows, cols: a.cols, data });
    }
    if !a.same_shape(b) {
        return Err(ErrorKind::InvalidDimension);
    }
    let data = a.data.iter().zip(&b.data).map(|(x, y)| op(x, y, settings)).collect();
    Ok(Array { rows: a.rows, cols: a.cols, data })
}

pub fn add(a: &Array, b: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    broadcast(a, b, settings, promote::add)
}

pub fn sub(a: &Array, b: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    broadcast(a, b, settings, promote::sub)
}

/// Elementwise `*`; use [`matmul`] for the linear-algebra product.
pub fn mul_elementwise(a: &Array, b: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    broadcast(a, b, settings, promote::mul)
}

/// Elementwise `/`, broadcasting the same way [`mul_elementwise`] does; use
/// [`matdiv`] for the linear-algebra quotient.
pub fn div_elementwise(a: &Array, b: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    if a.is_scalar() {
        let s = a.data[0].clone();
        let data = b
            .data
            .iter()
            .map(|v| promote::div(&s, v, settings))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Array { rows: b.rows, cols: b.cols, data });
    }
    if b.is_scalar() {
        let s = b.data[0].clone();
        let data = a
            .data
            .iter()
            .map(|v| promote::div(v, &s, settings))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Array { rows: a.rows, cols: a.cols, data });
    }
    if !a.same_shape(b) {
        return Err(ErrorKind::InvalidDimension);
    }
    let data = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(x, y)| promote::div(x, y, settings))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Array { rows: a.rows, cols: a.cols, data })
}

/// Textbook `(m x n) * (n x p) -> (m x p)` matrix product (§4.5).
pub fn matmul(a: &Array, b: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    if a.cols != b.rows {
        return Err(ErrorKind::InvalidDimension);
    }
    let mut data = Vec::with_capacity(a.rows * b.cols);
    for i in 0..a.rows {
        for j in 0..b.cols {
            let mut acc = Real::Integer(crate::number::integer::Integer::small(0));
            for k in 0..a.cols {
                let term = promote::mul(a.get(i, k), b.get(k, j), settings);
                acc = promote::add(&acc, &term, settings);
            }
            data.push(acc);
        }
    }
    Array::matrix(a.rows, b.cols, data)
}

/// Division by a matrix is `a * inverse(b)`; refuses non-square or
/// singular `b` with *Divide by zero* (§4.5).
pub fn matdiv(a: &Array, b: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    let inv = inverse(b, settings)?;
    matmul(a, &inv, settings)
}

fn to_f64(r: &Real, settings: &Settings) -> f64 {
    r.to_decimal(settings.precision()).to_f64_lossy()
}

fn from_f64(v: f64, settings: &Settings) -> Real {
    Real::Decimal(crate::number::decimal::Decimal::from_f64(v, settings.precision()))
}

/// Determinant via cofactor expansion: `O(n!)` but textbook-simple, and
/// arrays here are small enough that asymptotic cost doesn't matter.
pub fn determinant(m: &Array, settings: &Settings) -> Result<Real, ErrorKind> {
    if m.rows != m.cols {
        return Err(ErrorKind::InvalidDimension);
    }
    let n = m.rows;
    let grid: Vec<f64> = m.data.iter().map(|r| to_f64(r, settings)).collect();
    Ok(from_f64(det_f64(&grid, n), settings))
}

fn det_f64(grid: &[f64], n: usize) -> f64 {
    if n == 1 {
        return grid[0];
    }
    if n == 2 {
        return grid[0] * grid[3] - grid[1] * grid[2];
    }
    let mut det = 0.0;
    for col in 0..n {
        let minor = minor_f64(grid, n, 0, col);
        let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
        det += sign * grid[col] * det_f64(&minor, n - 1);
    }
    det
}

fn minor_f64(grid: &[f64], n: usize, skip_row: usize, skip_col: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity((n - 1) * (n - 1));
    for r in 0..n {
        if r == skip_row {
            continue;
        }
        for c in 0..n {
            if c == skip_col {
                continue;
            }
            out.push(grid[r * n + c]);
        }
    }
    out
}

/// Matrix inverse via the cofactor/adjugate method; singular matrices are
/// *Divide by zero* per §4.5.
pub fn inverse(m: &Array, settings: &Settings) -> Result<Array, ErrorKind> {
    if m.rows != m.cols {
        return Err(ErrorKind::InvalidDimension);
    }
    let n = m.rows;
    let grid: Vec<f64> = m.data.iter().map(|r| to_f64(r, settings)).collect();
    let det = det_f64(&grid, n);
    if det.abs() < f64::EPSILON {
        return Err(ErrorKind::DivideByZero);
    }
    let mut adjugate = vec![0.0f64; n * n];
    for r in 0..n {
        for c in 0..n {
            let minor = minor_f64(&grid, n, r, c);
            let cofactor = det_f64(&minor, n - 1) * if (r + c) % 2 == 0 { 1.0 } else { -1.0 };
            adjugate[c * n + r] = cofactor / det; // transpose while writing
        }
    }
    let data = adjugate.into_iter().map(|v| from_f64(v, settings)).collect();
    Array::matrix(n, n, data)
}

/// Frobenius norm, the default `abs` on arrays (§4.5).
pub fn frobenius_norm(m: &Array, settings: &Settings) -> Real {
    let sum_sq: f64 = m.data.iter().map(|v| to_f64(v, settings).powi(2)).sum();
    from_f64(sum_sq.sqrt(), settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::integer::Integer;

    fn int(v: i64) -> Real {
        Real::Integer(Integer::small(v))
    }

    #[test]
    fn scalar_broadcasts_over_vector() {
        let s = Settings::default();
        let v = Array::vector(vec![int(1), int(2), int(3)]);
        let scalar = Array::vector(vec![int(10)]);
        let sum = add(&v, &scalar, &s).unwrap();
        assert_eq!(sum.data, vec![int(11), int(12), int(13)]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let s = Settings::default();
        let a = Array::vector(vec![int(1), int(2)]);
        let b = Array::vector(vec![int(1), int(2), int(3)]);
        assert_eq!(add(&a, &b, &s), Err(ErrorKind::InvalidDimension));
    }

    #[test]
    fn two_by_two_matmul() {
        let s = Settings::default();
        let a = Array::matrix(2, 2, vec![int(1), int(2), int(3), int(4)]).unwrap();
        let identity = Array::matrix(2, 2, vec![int(1), int(0), int(0), int(1)]).unwrap();
        let product = matmul(&a, &identity, &s).unwrap();
        assert_eq!(product, a);
    }

    #[test]
    fn singular_matrix_inverse_is_divide_by_zero() {
        let s = Settings::default();
        let singular = Array::matrix(2, 2, vec![int(1), int(2), int(2), int(4)]).unwrap();
        assert_eq!(inverse(&singular, &s), Err(ErrorKind::DivideByZero));
    }
}
