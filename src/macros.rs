//! # **Macros Module** - *Per-kind boilerplate*
//!
//! Helpers that expand one arm per [`NumericKind`](crate::NumericKind), so
//! that adding a kind only touches the variant lists.

/// Implements [`Element`](crate::traits::type_unions::Element) for each
/// `type => Variant` pair, linking the Rust type to the matching
/// `NumericKind`, `Array` and `Scalar` variants, plus the `From`
/// conversions into `Array` and `Scalar`.
#[macro_export]
macro_rules! impl_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl $crate::traits::type_unions::Element for $t {
                const KIND: $crate::NumericKind = $crate::NumericKind::$variant;

                #[inline]
                fn into_array(arr: $crate::DenseArray<$t>) -> $crate::Array {
                    $crate::Array::$variant(arr)
                }

                #[inline]
                fn try_from_array(arr: $crate::Array) -> Result<$crate::DenseArray<$t>, $crate::Array> {
                    match arr {
                        $crate::Array::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }

                #[inline]
                fn as_dense(arr: &$crate::Array) -> Option<&$crate::DenseArray<$t>> {
                    match arr {
                        $crate::Array::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                #[inline]
                fn into_scalar(self) -> $crate::Scalar {
                    $crate::Scalar::$variant(self)
                }

                #[inline]
                fn try_from_scalar(s: $crate::Scalar) -> Result<$t, $crate::Scalar> {
                    match s {
                        $crate::Scalar::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl From<$crate::DenseArray<$t>> for $crate::Array {
                #[inline]
                fn from(arr: $crate::DenseArray<$t>) -> Self {
                    $crate::Array::$variant(arr)
                }
            }

            impl From<$t> for $crate::Scalar {
                #[inline]
                fn from(v: $t) -> Self {
                    $crate::Scalar::$variant(v)
                }
            }
        )*
    };
}

/// Binds the inner `DenseArray<T>` of any `Array` variant to `$a` and
/// evaluates `$body` with it.
///
/// ```rust
/// use minstride::{Array, DenseArray, match_array};
///
/// let arr = Array::from(DenseArray::from_vec(vec![1i32, 2, 3]));
/// let n = match_array!(&arr, a => a.len());
/// assert_eq!(n, 3);
/// ```
#[macro_export]
macro_rules! match_array {
    ($arr:expr, $a:ident => $body:expr) => {
        match $arr {
            $crate::Array::Bool($a) => $body,
            $crate::Array::Int8($a) => $body,
            $crate::Array::Int16($a) => $body,
            $crate::Array::Int32($a) => $body,
            $crate::Array::Int64($a) => $body,
            $crate::Array::Isize($a) => $body,
            $crate::Array::UInt8($a) => $body,
            $crate::Array::UInt16($a) => $body,
            $crate::Array::UInt32($a) => $body,
            $crate::Array::UInt64($a) => $body,
            $crate::Array::Usize($a) => $body,
            $crate::Array::Float32($a) => $body,
            $crate::Array::Float64($a) => $body,
            $crate::Array::Complex64($a) => $body,
            $crate::Array::Complex128($a) => $body,
            $crate::Array::String($a) => $body,
        }
    };
}

/// Evaluates `$body` with `$t` aliased to the element type of a runtime kind.
///
/// `$kind` is a `NumericKind`; the listed arms decide which kinds are
/// reachable and `$fallback` handles the rest.
///
/// ```rust
/// use minstride::{NumericKind, with_kind};
///
/// let width = with_kind!(NumericKind::Int16, |T| std::mem::size_of::<T>(), [Int16 => i16, Int32 => i32], 0);
/// assert_eq!(width, 2);
/// ```
#[macro_export]
macro_rules! with_kind {
    ($kind:expr, |$t:ident| $body:expr, [$($variant:ident => $ty:ty),* $(,)?], $fallback:expr) => {
        match $kind {
            $(
                $crate::NumericKind::$variant => {
                    type $t = $ty;
                    $body
                }
            )*
            #[allow(unreachable_patterns)]
            _ => $fallback,
        }
    };
}

/// Builds a row-major `DenseArray` from a shape and a list of values.
///
/// ```rust
/// use minstride::dense;
///
/// let a = dense![[2, 2]; 1.0f64, 2.0, 3.0, 4.0];
/// assert_eq!(a.shape(), &[2, 2]);
/// ```
#[macro_export]
macro_rules! dense {
    ([$($dim:expr),* $(,)?]; $($x:expr),* $(,)?) => {
        $crate::DenseArray::from_shape_vec(&[$($dim),*], vec![$($x),*])
            .expect("dense!: shape does not match element count")
    };
}
