/// Implements a `std::ops` trait for a single-field tuple newtype by delegating to the inner value.
///
/// ```
/// use paywatch_common::op;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Meters(i64);
///
/// op!(inplace Meters, AddAssign, add_assign);
///
/// let mut m = Meters(3);
/// m += Meters(4);
/// assert_eq!(m, Meters(7));
/// ```
#[macro_export]
macro_rules! op {
    (inplace $type:ty, $trait:ident, $fn:ident) => {
        impl std::ops::$trait for $type {
            fn $fn(&mut self, rhs: Self) {
                std::ops::$trait::$fn(&mut self.0, rhs.0)
            }
        }
    };
}
