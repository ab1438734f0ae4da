//! Affine points on short Weierstrass curves y² = x³ + ax + b.
//!
//! The identity element carries no coordinates. Construction validates the
//! curve equation, so every non-identity [`Point`] in circulation satisfies
//! it.

use num_bigint::BigUint;

use super::{error::CryptoError, field::FieldElement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    x: Option<FieldElement>,
    y: Option<FieldElement>,
    a: FieldElement,
    b: FieldElement,
}

impl Point {
    pub fn new(
        x: FieldElement,
        y: FieldElement,
        a: FieldElement,
        b: FieldElement,
    ) -> Result<Self, CryptoError> {
        // y² == x³ + ax + b
        let lhs = y.mul(&y)?;
        let rhs = x.mul(&x)?.mul(&x)?.add(&a.mul(&x)?)?.add(&b)?;
        if lhs != rhs {
            return Err(CryptoError::PointNotOnCurve {
                x: x.num().clone(),
                y: y.num().clone(),
            });
        }
        Ok(Self {
            x: Some(x),
            y: Some(y),
            a,
            b,
        })
    }

    /// The identity element (point at infinity) of the given curve.
    pub fn infinity(a: FieldElement, b: FieldElement) -> Self {
        Self {
            x: None,
            y: None,
            a,
            b,
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_none()
    }

    pub fn x(&self) -> Option<&FieldElement> {
        self.x.as_ref()
    }

    pub fn y(&self) -> Option<&FieldElement> {
        self.y.as_ref()
    }

    fn same_curve(&self, other: &Self) -> Result<(), CryptoError> {
        if self.a != other.a || self.b != other.b {
            return Err(CryptoError::CurveMismatch);
        }
        Ok(())
    }

    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_curve(other)?;

        let (x1, y1) = match (&self.x, &self.y) {
            (Some(x), Some(y)) => (x, y),
            _ => return Ok(other.clone()),
        };
        let (x2, y2) = match (&other.x, &other.y) {
            (Some(x), Some(y)) => (x, y),
            _ => return Ok(self.clone()),
        };

        if x1 == x2 && y1 != y2 {
            // Vertical line through inverses.
            return Ok(Self::infinity(self.a.clone(), self.b.clone()));
        }

        let s = if x1 == x2 {
            // Doubling. A vertical tangent (y = 0) yields the identity.
            if y1.is_zero() {
                return Ok(Self::infinity(self.a.clone(), self.b.clone()));
            }
            x1.mul(x1)?.scale(3).add(&self.a)?.div(&y1.scale(2))?
        } else {
            y2.sub(y1)?.div(&x2.sub(x1)?)?
        };

        let x3 = s.mul(&s)?.sub(x1)?.sub(x2)?;
        let y3 = s.mul(&x1.sub(&x3)?)?.sub(y1)?;
        Ok(Self {
            x: Some(x3),
            y: Some(y3),
            a: self.a.clone(),
            b: self.b.clone(),
        })
    }

    /// Binary double-and-add from the least significant bit up.
    pub fn scalar_mul(&self, coefficient: &BigUint) -> Result<Self, CryptoError> {
        let mut coef = coefficient.clone();
        let mut current = self.clone();
        let mut result = Self::infinity(self.a.clone(), self.b.clone());
        while coef.bits() > 0 {
            if coef.bit(0) {
                result = result.add(&current)?;
            }
            current = current.add(&current)?;
            coef >>= 1;
        }
        Ok(result)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.x, &self.y) {
            (Some(x), Some(y)) => write!(f, "Point({},{})_{}_{}", x.num(), y.num(), self.a.num(), self.b.num()),
            _ => write!(f, "Point(infinity)"),
        }
    }
}
