//! Short-Weierstrass curve arithmetic over named curves
//!
//! Affine coordinates with double-and-add scalar multiplication. Field
//! inversions go through Fermat (both supported field primes are prime),
//! so the only non-invertible case is the point at infinity, which is
//! handled explicitly.

use rand::Rng;

use crate::math::bigint::BigInt256;
use crate::math::constants::*;

/// Affine curve point; `infinity` marks the group identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: BigInt256,
    pub y: BigInt256,
    pub infinity: bool,
}

impl Point {
    /// Group identity
    pub fn infinity() -> Self {
        Point {
            x: BigInt256::zero(),
            y: BigInt256::zero(),
            infinity: true,
        }
    }

    /// Affine coordinates; None for the identity
    pub fn affine(&self) -> Option<(BigInt256, BigInt256)> {
        if self.infinity {
            None
        } else {
            Some((self.x, self.y))
        }
    }
}

/// Named curves the engine recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveName {
    Secp256k1,
    Secp128r1,
}

impl std::fmt::Display for CurveName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveName::Secp256k1 => write!(f, "secp256k1"),
            CurveName::Secp128r1 => write!(f, "secp128r1"),
        }
    }
}

impl std::str::FromStr for CurveName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "secp256k1" => Ok(CurveName::Secp256k1),
            "secp128r1" => Ok(CurveName::Secp128r1),
            _ => Err(anyhow::anyhow!(
                "unknown curve: {}. Supported: secp256k1, secp128r1",
                s
            )),
        }
    }
}

/// Curve group parameters plus the generator
#[derive(Debug, Clone)]
pub struct Curve {
    pub name: CurveName,
    /// Field prime
    pub p: BigInt256,
    /// Group order
    pub n: BigInt256,
    pub a: BigInt256,
    pub b: BigInt256,
    g: Point,
}

impl Curve {
    /// Construct a curve by name
    pub fn new(name: CurveName) -> Self {
        match name {
            CurveName::Secp256k1 => Curve {
                name,
                p: BigInt256::from_hex(SECP256K1_P),
                n: BigInt256::from_hex(SECP256K1_N),
                a: BigInt256::from_hex(SECP256K1_A),
                b: BigInt256::from_hex(SECP256K1_B),
                g: Point {
                    x: BigInt256::from_hex(SECP256K1_GX),
                    y: BigInt256::from_hex(SECP256K1_GY),
                    infinity: false,
                },
            },
            CurveName::Secp128r1 => Curve {
                name,
                p: BigInt256::from_hex(SECP128R1_P),
                n: BigInt256::from_hex(SECP128R1_N),
                a: BigInt256::from_hex(SECP128R1_A),
                b: BigInt256::from_hex(SECP128R1_B),
                g: Point {
                    x: BigInt256::from_hex(SECP128R1_GX),
                    y: BigInt256::from_hex(SECP128R1_GY),
                    infinity: false,
                },
            },
        }
    }

    pub fn secp256k1() -> Self {
        Curve::new(CurveName::Secp256k1)
    }

    pub fn secp128r1() -> Self {
        Curve::new(CurveName::Secp128r1)
    }

    /// Generator point
    pub fn generator(&self) -> Point {
        self.g
    }

    /// Group order
    pub fn order(&self) -> BigInt256 {
        self.n
    }

    /// Scalar bit width of the curve order
    pub fn order_bits(&self) -> usize {
        self.n.bit_length()
    }

    /// Coordinate byte width: ceil(bits(n)/8)
    pub fn coord_bytes(&self) -> usize {
        (self.order_bits() + 7) / 8
    }

    /// Random scalar in [1, n)
    pub fn rand_scalar<R: Rng>(&self, rng: &mut R) -> BigInt256 {
        BigInt256::rand_below(&self.n, rng)
    }

    /// Point addition
    pub fn point_add(&self, p1: &Point, p2: &Point) -> Point {
        if p1.infinity {
            return *p2;
        }
        if p2.infinity {
            return *p1;
        }
        if p1.x == p2.x {
            if p1.y == p2.y {
                return self.point_double(p1);
            }
            // P + (-P)
            return Point::infinity();
        }

        // lambda = (y2 - y1) / (x2 - x1)
        let dx = p2.x.sub_mod(&p1.x, &self.p);
        let dy = p2.y.sub_mod(&p1.y, &self.p);
        let lambda = match dx.mod_inverse(&self.p) {
            Some(inv) => dy.mul_mod(&inv, &self.p),
            None => return Point::infinity(),
        };

        let x3 = lambda
            .mul_mod(&lambda, &self.p)
            .sub_mod(&p1.x, &self.p)
            .sub_mod(&p2.x, &self.p);
        let y3 = lambda
            .mul_mod(&p1.x.sub_mod(&x3, &self.p), &self.p)
            .sub_mod(&p1.y, &self.p);

        Point {
            x: x3,
            y: y3,
            infinity: false,
        }
    }

    /// Point doubling
    pub fn point_double(&self, point: &Point) -> Point {
        if point.infinity || point.y.is_zero() {
            return Point::infinity();
        }

        // lambda = (3x^2 + a) / 2y
        let three_x2 = point
            .x
            .mul_mod(&point.x, &self.p)
            .mul_mod(&BigInt256::from_u64(3), &self.p);
        let num = three_x2.add_mod(&self.a, &self.p);
        let denom = point.y.add_mod(&point.y, &self.p);
        let lambda = match denom.mod_inverse(&self.p) {
            Some(inv) => num.mul_mod(&inv, &self.p),
            None => return Point::infinity(),
        };

        let x3 = lambda
            .mul_mod(&lambda, &self.p)
            .sub_mod(&point.x, &self.p)
            .sub_mod(&point.x, &self.p);
        let y3 = lambda
            .mul_mod(&point.x.sub_mod(&x3, &self.p), &self.p)
            .sub_mod(&point.y, &self.p);

        Point {
            x: x3,
            y: y3,
            infinity: false,
        }
    }

    /// Scalar multiplication k·P, double-and-add from the top bit
    pub fn point_mul(&self, point: &Point, k: &BigInt256) -> Point {
        let k = k.rem(&self.n);
        if k.is_zero() || point.infinity {
            return Point::infinity();
        }

        let mut result = Point::infinity();
        for bit in (0..k.bit_length()).rev() {
            result = self.point_double(&result);
            if k.get_bit(bit) {
                result = self.point_add(&result, point);
            }
        }
        result
    }

    /// k·G
    pub fn scalar_mul_base(&self, k: &BigInt256) -> Point {
        self.point_mul(&self.g, k)
    }

    /// Curve membership check: y^2 == x^3 + ax + b
    pub fn is_on_curve(&self, point: &Point) -> bool {
        if point.infinity {
            return true;
        }
        let y2 = point.y.mul_mod(&point.y, &self.p);
        let x3 = point
            .x
            .mul_mod(&point.x, &self.p)
            .mul_mod(&point.x, &self.p);
        let rhs = x3
            .add_mod(&point.x.mul_mod(&self.a, &self.p), &self.p)
            .add_mod(&self.b, &self.p);
        y2 == rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_on_curve() {
        for curve in [Curve::secp256k1(), Curve::secp128r1()] {
            assert!(curve.is_on_curve(&curve.generator()), "{}", curve.name);
        }
    }

    #[test]
    fn test_order_annihilates_generator() {
        let curve = Curve::secp128r1();
        let n = curve.order();
        assert!(curve.scalar_mul_base(&n).infinity);
    }

    #[test]
    fn test_small_multiples_consistent() {
        let curve = Curve::secp128r1();
        let g = curve.generator();
        let two_g = curve.point_double(&g);
        let three_g = curve.point_add(&two_g, &g);
        assert_eq!(curve.scalar_mul_base(&BigInt256::from_u64(2)), two_g);
        assert_eq!(curve.scalar_mul_base(&BigInt256::from_u64(3)), three_g);
        assert!(curve.is_on_curve(&three_g));
    }

    #[test]
    fn test_point_mul_distributes() {
        // (a+b)G == aG + bG
        let curve = Curve::secp128r1();
        let a = BigInt256::from_u64(123_456_789);
        let b = BigInt256::from_u64(987_654_321);
        let lhs = curve.scalar_mul_base(&(a + b));
        let rhs = curve.point_add(
            &curve.scalar_mul_base(&a),
            &curve.scalar_mul_base(&b),
        );
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_secp256k1_known_2g() {
        let curve = Curve::secp256k1();
        let two_g = curve.scalar_mul_base(&BigInt256::from_u64(2));
        let (x, _) = two_g.affine().unwrap();
        assert_eq!(
            x,
            BigInt256::from_hex(
                "C6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5"
            )
        );
    }

    #[test]
    fn test_coord_bytes() {
        assert_eq!(Curve::secp256k1().coord_bytes(), 32);
        assert_eq!(Curve::secp128r1().coord_bytes(), 16);
    }
}
