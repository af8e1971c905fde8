//! Binary operation contract over native payloads.

/// Combines two native payloads into a new value.
///
/// The native object store exposes `combine(a, b)` for any payload type
/// implementing this trait. Numeric implementations add; integer types
/// wrap on overflow so a combine never panics.
pub trait Combine {
    /// Produce the combination of `self` and `other`.
    fn combine(&self, other: &Self) -> Self;
}

macro_rules! combine_float {
    ($($t:ty),*) => {
        $(impl Combine for $t {
            fn combine(&self, other: &Self) -> Self {
                self + other
            }
        })*
    };
}

macro_rules! combine_int {
    ($($t:ty),*) => {
        $(impl Combine for $t {
            fn combine(&self, other: &Self) -> Self {
                self.wrapping_add(*other)
            }
        })*
    };
}

combine_float!(f32, f64);
combine_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
