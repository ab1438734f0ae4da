//! Modular arithmetic over a prime field.
//!
//! A [`FieldElement`] pairs a value with its modulus. Operations are only
//! defined between elements of the same field; mixing moduli is a
//! [`CryptoError::FieldMismatch`]. All operations return new elements.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use super::error::CryptoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    num: BigUint,
    prime: BigUint,
}

/// The two square roots of a quadratic residue, labeled by parity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareRoots {
    pub even: FieldElement,
    pub odd: FieldElement,
}

impl FieldElement {
    pub fn new(num: BigUint, prime: BigUint) -> Result<Self, CryptoError> {
        if num >= prime {
            return Err(CryptoError::OutOfFieldRange { num, prime });
        }
        Ok(Self { num, prime })
    }

    pub fn zero(prime: BigUint) -> Self {
        Self {
            num: BigUint::zero(),
            prime,
        }
    }

    pub fn num(&self) -> &BigUint {
        &self.num
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_even(&self) -> bool {
        (&self.num % 2u8).is_zero()
    }

    fn same_field(&self, other: &Self) -> Result<(), CryptoError> {
        if self.prime != other.prime {
            return Err(CryptoError::FieldMismatch);
        }
        Ok(())
    }

    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        Ok(Self {
            num: (&self.num + &other.num) % &self.prime,
            prime: self.prime.clone(),
        })
    }

    pub fn sub(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        // Lift before subtracting so the difference stays non-negative.
        Ok(Self {
            num: (&self.num + &self.prime - &other.num) % &self.prime,
            prime: self.prime.clone(),
        })
    }

    pub fn mul(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        Ok(Self {
            num: (&self.num * &other.num) % &self.prime,
            prime: self.prime.clone(),
        })
    }

    pub fn div(&self, other: &Self) -> Result<Self, CryptoError> {
        self.same_field(other)?;
        self.mul(&other.inverse()?)
    }

    /// Multiplies by a small scalar, for the `2y` and `3x²` terms of the
    /// tangent-slope formula.
    pub fn scale(&self, k: u32) -> Self {
        Self {
            num: (&self.num * k) % &self.prime,
            prime: self.prime.clone(),
        }
    }

    /// Fast modular exponentiation. Negative exponents are reduced modulo
    /// p − 1 (Fermat), so `pow(-1)` is the multiplicative inverse on
    /// non-zero elements.
    pub fn pow(&self, exponent: &BigInt) -> Self {
        let p_minus_one = BigInt::from_biguint(Sign::Plus, &self.prime - 1u8);
        let mut exp = exponent % &p_minus_one;
        if exp.sign() == Sign::Minus {
            exp += &p_minus_one;
        }
        let exp = exp.to_biguint().expect("exponent reduced to non-negative");
        Self {
            num: self.num.modpow(&exp, &self.prime),
            prime: self.prime.clone(),
        }
    }

    /// Multiplicative inverse by Fermat's little theorem: a^(p−2) mod p.
    pub fn inverse(&self) -> Result<Self, CryptoError> {
        if self.num.is_zero() {
            return Err(CryptoError::DivisionByZero);
        }
        let exp = &self.prime - 2u8;
        Ok(Self {
            num: self.num.modpow(&exp, &self.prime),
            prime: self.prime.clone(),
        })
    }

    /// Square root for fields with p ≡ 3 (mod 4): v^((p+1)/4) mod p.
    /// Returns both roots (v, p−v) labeled by parity. The result is only a
    /// square root when the element is a quadratic residue; callers that
    /// can't assume residuosity must check by squaring.
    pub fn sqrt(&self) -> Result<SquareRoots, CryptoError> {
        if (&self.prime % 4u8) != BigUint::from(3u8) {
            return Err(CryptoError::NoSqrtMethod);
        }
        let exp = (&self.prime + 1u8) >> 2;
        let root = Self {
            num: self.num.modpow(&exp, &self.prime),
            prime: self.prime.clone(),
        };
        let other = Self {
            num: if root.num.is_zero() {
                BigUint::zero()
            } else {
                &self.prime - &root.num
            },
            prime: self.prime.clone(),
        };
        Ok(if root.is_even() {
            SquareRoots {
                even: root,
                odd: other,
            }
        } else {
            SquareRoots {
                even: other,
                odd: root,
            }
        })
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement_{}({})", self.prime, self.num)
    }
}

/// Constructor for small fields, mostly useful in tests and examples.
pub fn element(num: u64, prime: u64) -> Result<FieldElement, CryptoError> {
    FieldElement::new(BigUint::from(num), BigUint::from(prime))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(num: u64, prime: u64) -> FieldElement {
        element(num, prime).unwrap()
    }

    #[test]
    fn construction_range_check() {
        assert!(element(19, 19).is_err());
        assert!(element(0, 19).is_ok());
        assert!(element(18, 19).is_ok());
    }

    #[test]
    fn addition_wraps() {
        assert_eq!(fe(7, 13).add(&fe(12, 13)).unwrap(), fe(6, 13));
        // Commutativity
        assert_eq!(fe(12, 13).add(&fe(7, 13)).unwrap(), fe(6, 13));
    }

    #[test]
    fn subtraction_wraps() {
        assert_eq!(fe(2, 19).sub(&fe(9, 19)).unwrap(), fe(12, 19));
    }

    #[test]
    fn multiplication_associates() {
        let (a, b, c) = (fe(3, 13), fe(12, 13), fe(10, 13));
        let left = a.mul(&b).unwrap().mul(&c).unwrap();
        let right = a.mul(&b.mul(&c).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn inverse_times_self_is_one() {
        for n in 1..19u64 {
            let a = fe(n, 19);
            assert_eq!(a.mul(&a.inverse().unwrap()).unwrap(), fe(1, 19));
        }
    }

    #[test]
    fn division() {
        // 2/7 = 2 * 7^17 = 3 (mod 19)
        assert_eq!(fe(2, 19).div(&fe(7, 19)).unwrap(), fe(3, 19));
        assert_eq!(
            fe(2, 19).div(&fe(0, 19)),
            Err(CryptoError::DivisionByZero)
        );
    }

    #[test]
    fn negative_exponents_reduce() {
        use num_bigint::BigInt;
        // 7^-3 == 7^(18-3) (mod 19)
        let a = fe(7, 19);
        assert_eq!(a.pow(&BigInt::from(-3)), a.pow(&BigInt::from(15)));
    }

    #[test]
    fn mixing_fields_fails() {
        assert_eq!(
            fe(1, 13).add(&fe(1, 19)),
            Err(CryptoError::FieldMismatch)
        );
    }

    #[test]
    fn sqrt_labels_parity() {
        // p = 19, 5² = 6 (mod 19); roots of 6 are 5 and 14.
        let roots = fe(6, 19).sqrt().unwrap();
        assert_eq!(roots.odd, fe(5, 19));
        assert_eq!(roots.even, fe(14, 19));
    }

    #[test]
    fn sqrt_requires_three_mod_four() {
        assert_eq!(fe(2, 13).sqrt(), Err(CryptoError::NoSqrtMethod));
    }
}
