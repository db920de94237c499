//! Grid element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a grid cell.
///
/// Every element type designates one value as the missing sentinel:
/// NaN for floating-point cells, the type minimum for integer cells.
/// Callers never test the representation directly; they go through
/// [`GridElement::is_missing`].
pub trait GridElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// The missing-value sentinel for this type
    fn missing() -> Self;

    /// Check whether this value is the missing sentinel
    fn is_missing(&self) -> bool;

    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_grid_element_int {
    ($t:ty) => {
        impl GridElement for $t {
            fn missing() -> Self {
                <$t>::MIN
            }

            fn is_missing(&self) -> bool {
                *self == <$t>::MIN
            }

            fn is_float() -> bool {
                false
            }
        }
    };
}

macro_rules! impl_grid_element_float {
    ($t:ty) => {
        impl GridElement for $t {
            fn missing() -> Self {
                <$t>::NAN
            }

            fn is_missing(&self) -> bool {
                self.is_nan()
            }

            fn is_float() -> bool {
                true
            }
        }
    };
}

impl_grid_element_int!(i8);
impl_grid_element_int!(i16);
impl_grid_element_int!(i32);
impl_grid_element_int!(i64);
impl_grid_element_float!(f32);
impl_grid_element_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_sentinel() {
        assert!(<i32 as GridElement>::missing().is_missing());
        assert!(!0i32.is_missing());
        assert!(!(-1i32).is_missing());
    }

    #[test]
    fn test_float_sentinel() {
        assert!(<f64 as GridElement>::missing().is_missing());
        assert!(!0.0f64.is_missing());
        assert!(f64::NAN.is_missing());
    }
}
