//! Scalar and complex number primitives shared by the transform kernels.
//!
//! The transforms are generic over [`Float`] so the same kernels run in
//! single precision (the default analysis/synthesis boundary) or in double
//! precision. Float math uses the standard library with the `std` feature and
//! falls back to `libm` without it.

use core::f32::consts::PI as PI32;
use core::f64::consts::PI as PI64;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Minimal float abstraction for the FFT kernels.
pub trait Float:
    Copy
    + PartialEq
    + PartialOrd
    + core::fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(x: f64) -> Self;
    fn to_f64(self) -> f64;
    /// Convert a length or index. Returns `None` if the value cannot be
    /// represented exactly.
    fn from_usize(x: usize) -> Option<Self>;
    fn sin_cos(self) -> (Self, Self);
    fn pi() -> Self;
}

impl Float for f32 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
    #[inline(always)]
    fn one() -> Self {
        1.0
    }
    #[inline(always)]
    fn from_f64(x: f64) -> Self {
        x as f32
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_usize(x: usize) -> Option<Self> {
        const MAX_EXACT: usize = 1usize << 24;
        if x < MAX_EXACT {
            Some(x as f32)
        } else {
            None
        }
    }
    #[inline(always)]
    fn sin_cos(self) -> (Self, Self) {
        #[cfg(feature = "std")]
        {
            f32::sin_cos(self)
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sincosf(self)
        }
    }
    fn pi() -> Self {
        PI32
    }
}

impl Float for f64 {
    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
    #[inline(always)]
    fn one() -> Self {
        1.0
    }
    #[inline(always)]
    fn from_f64(x: f64) -> Self {
        x
    }
    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
    fn from_usize(x: usize) -> Option<Self> {
        const MAX_EXACT: usize = 1usize << 53;
        if x < MAX_EXACT {
            Some(x as f64)
        } else {
            None
        }
    }
    #[inline(always)]
    fn sin_cos(self) -> (Self, Self) {
        math::sin_cos(self)
    }
    fn pi() -> Self {
        PI64
    }
}

/// `f64` functions used outside the kernels.
pub(crate) mod math {
    macro_rules! unary {
        ($($name:ident => $std:ident, $libm:ident;)*) => {$(
            #[inline]
            pub(crate) fn $name(x: f64) -> f64 {
                #[cfg(feature = "std")]
                {
                    f64::$std(x)
                }
                #[cfg(not(feature = "std"))]
                {
                    libm::$libm(x)
                }
            }
        )*};
    }

    unary! {
        cos => cos, cos;
        ln => ln, log;
        exp => exp, exp;
        sqrt => sqrt, sqrt;
        abs => abs, fabs;
        round => round, round;
        ceil => ceil, ceil;
    }

    #[inline]
    pub(crate) fn hypot(x: f64, y: f64) -> f64 {
        #[cfg(feature = "std")]
        {
            f64::hypot(x, y)
        }
        #[cfg(not(feature = "std"))]
        {
            libm::hypot(x, y)
        }
    }

    #[inline]
    pub(crate) fn sin_cos(x: f64) -> (f64, f64) {
        #[cfg(feature = "std")]
        {
            f64::sin_cos(x)
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sincos(x)
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Complex<T: Float> {
    pub re: T,
    pub im: T,
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

impl<T: Float> Complex<T> {
    #[inline(always)]
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero())
    }

    /// `exp(i·theta)`.
    #[inline(always)]
    pub fn expi(theta: T) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new(cos, sin)
    }

    #[inline(always)]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    #[inline(always)]
    pub fn scale(self, k: T) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    /// Multiply by `-i`.
    #[inline(always)]
    pub fn mul_neg_i(self) -> Self {
        Self::new(self.im, -self.re)
    }

    /// Multiply by `i`.
    #[inline(always)]
    pub fn mul_i(self) -> Self {
        Self::new(-self.im, self.re)
    }
}

impl<T: Float> Neg for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl<T: Float> Add for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }
}

impl<T: Float> Sub for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self::new(self.re - other.re, self.im - other.im)
    }
}

impl<T: Float> Mul for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }
}
