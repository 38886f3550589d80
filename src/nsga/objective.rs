//! Fixed-length objective vectors.
//!
//! [`ObjectiveVector`] carries one value per objective. Arithmetic is
//! component-wise and named explicitly; multi-objective comparisons are
//! exposed as predicates ([`dominates_all`](ObjectiveVector::dominates_all),
//! [`equals_all`](ObjectiveVector::equals_all)) rather than through
//! `PartialOrd`, because "greater in every component" is not a total order.

use std::ops::Index;

/// A vector of objective (or scaled fitness) values, one per objective.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveVector(Vec<f64>);

#[allow(clippy::should_implement_trait)] // by-reference arithmetic, no operator impls
impl ObjectiveVector {
    /// Creates a vector from raw values.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Creates a vector of `len` copies of `value`.
    pub fn filled(len: usize, value: f64) -> Self {
        Self(vec![value; len])
    }

    /// Creates a zero vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self::filled(len, 0.0)
    }

    /// Number of objectives.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Component-wise `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    /// Component-wise `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }

    /// Component-wise `self * other`.
    pub fn mul(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a * b)
    }

    /// Component-wise `self / other`. Division by zero follows IEEE 754.
    pub fn div(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a / b)
    }

    /// Multiplies every component by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self.map(|a| a * factor)
    }

    /// Divides every component by `divisor`.
    pub fn div_scalar(&self, divisor: f64) -> Self {
        self.map(|a| a / divisor)
    }

    /// Negates every component.
    pub fn neg(&self) -> Self {
        self.map(|a| -a)
    }

    /// Absolute value of every component.
    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    /// Component-wise minimum.
    pub fn min_with(&self, other: &Self) -> Self {
        self.zip_with(other, f64::min)
    }

    /// Component-wise maximum.
    pub fn max_with(&self, other: &Self) -> Self {
        self.zip_with(other, f64::max)
    }

    /// Accumulates `other` into `self` in place.
    pub fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.len(), other.len(), "objective length mismatch");
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }

    /// `true` if every component of `self` is strictly greater than the
    /// corresponding component of `other`.
    pub fn dominates_all(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a > b)
    }

    /// `true` if every component compares equal.
    pub fn equals_all(&self, other: &Self) -> bool {
        self.len() == other.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }

    /// `true` if any component is infinite or NaN.
    pub fn any_non_finite(&self) -> bool {
        self.0.iter().any(|v| !v.is_finite())
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.iter().map(|&a| f(a)).collect())
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        debug_assert_eq!(self.len(), other.len(), "objective length mismatch");
        Self(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        )
    }
}

impl Index<usize> for ObjectiveVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> ObjectiveVector {
        ObjectiveVector::new(values.to_vec())
    }

    #[test]
    fn test_componentwise_arithmetic() {
        let a = v(&[1.0, 4.0]);
        let b = v(&[2.0, 2.0]);
        assert_eq!(a.add(&b).as_slice(), &[3.0, 6.0]);
        assert_eq!(a.sub(&b).as_slice(), &[-1.0, 2.0]);
        assert_eq!(a.mul(&b).as_slice(), &[2.0, 8.0]);
        assert_eq!(a.div(&b).as_slice(), &[0.5, 2.0]);
        assert_eq!(a.scale(2.0).as_slice(), &[2.0, 8.0]);
        assert_eq!(a.neg().abs().as_slice(), &[1.0, 4.0]);
    }

    #[test]
    fn test_min_max_with() {
        let a = v(&[1.0, 5.0]);
        let b = v(&[3.0, 2.0]);
        assert_eq!(a.min_with(&b).as_slice(), &[1.0, 2.0]);
        assert_eq!(a.max_with(&b).as_slice(), &[3.0, 5.0]);
    }

    #[test]
    fn test_predicates_require_every_component() {
        let a = v(&[2.0, 3.0]);
        let b = v(&[1.0, 3.0]);
        assert!(!a.dominates_all(&b)); // tie in second component
        assert!(a.dominates_all(&v(&[1.0, 2.0])));
        assert!(a.equals_all(&v(&[2.0, 3.0])));
        assert!(!a.equals_all(&b));
    }

    #[test]
    fn test_division_by_zero_is_non_finite() {
        let a = v(&[1.0, 0.0]);
        let z = ObjectiveVector::zeros(2);
        let q = a.div(&z);
        assert!(q[0].is_infinite());
        assert!(q[1].is_nan());
        assert!(q.any_non_finite());
        assert!(!a.any_non_finite());
    }

    #[test]
    fn test_add_assign() {
        let mut acc = ObjectiveVector::zeros(3);
        acc.add_assign(&v(&[1.0, 2.0, 3.0]));
        acc.add_assign(&v(&[1.0, 1.0, 1.0]));
        assert_eq!(acc.as_slice(), &[2.0, 3.0, 4.0]);
    }
}
