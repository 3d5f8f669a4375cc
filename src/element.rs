/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use std::fmt;

use num_traits::NumAssign;

/// Contract shared by every element kind a [`crate::Matrix`] can hold.
///
/// The important piece is [`Element::DEFAULT`]: the value used wherever an operation
/// introduces cells that have no source counterpart (reshape growth, `extend`,
/// unboxing an absent cell). For the numeric kinds this is zero, for `bool` it is
/// `false`, for `char` the zero character, and for the boxed form `Option<T>` it is
/// `None`.
///
/// `Send + Sync` are required because bulk operations may fan out across rayon
/// workers.
pub trait Element: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The element kind's default value, used for growth fills.
    const DEFAULT: Self;
}

macro_rules! impl_element {
    ($($t:ty => $default:expr),* $(,)?) => {
        $(
            impl Element for $t {
                const DEFAULT: Self = $default;
            }
        )*
    };
}

impl_element! {
    i8 => 0,
    i16 => 0,
    i32 => 0,
    i64 => 0,
    f32 => 0.0,
    f64 => 0.0,
    bool => false,
    char => '\0',
}

/// The boxed/generic element kind: an absent cell is `None`.
impl<T: Element> Element for Option<T> {
    const DEFAULT: Self = None;
}

/// Element kinds that support arithmetic (`add`, `subtract`, `multiply`, the range
/// factories).
///
/// Supplied by `num_traits` rather than hand-rolled operator bounds; the blanket
/// impl covers exactly the numeric primitives (`bool`, `char` and `Option<T>` do
/// not implement `NumAssign`).
pub trait Numeric: Element + Copy + NumAssign + PartialOrd {}

impl<T> Numeric for T where T: Element + Copy + NumAssign + PartialOrd {}

/// Cell rendering for [`std::fmt::Display`] on matrices.
///
/// This exists instead of a plain `T: Display` bound so the boxed form can render
/// an absent cell as the literal `null`.
pub trait DisplayCell {
    fn fmt_cell(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

macro_rules! impl_display_cell {
    ($($t:ty),* $(,)?) => {
        $(
            impl DisplayCell for $t {
                fn fmt_cell(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self)
                }
            }
        )*
    };
}

impl_display_cell!(i8, i16, i32, i64, f32, f64, bool, char);

impl<T: DisplayCell> DisplayCell for Option<T> {
    fn fmt_cell(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(v) => v.fmt_cell(f),
            None => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_kind() {
        assert_eq!(i8::DEFAULT, 0);
        assert_eq!(i64::DEFAULT, 0);
        assert_eq!(f64::DEFAULT, 0.0);
        assert!(!bool::DEFAULT);
        assert_eq!(char::DEFAULT, '\0');
        assert_eq!(<Option<i32>>::DEFAULT, None);
    }

    #[test]
    fn numeric_is_implemented_for_the_numeric_kinds() {
        fn assert_numeric<T: Numeric>() {}
        assert_numeric::<i8>();
        assert_numeric::<i16>();
        assert_numeric::<i32>();
        assert_numeric::<i64>();
        assert_numeric::<f32>();
        assert_numeric::<f64>();
    }
}
