//! Copy-on-write array helpers.
//!
//! Every function here produces a *new* array that differs from its input by
//! one appended, one changed, or one truncated slot. The input is never
//! mutated; unchanged slots are cloned, which for `Arc`-held children is a
//! reference-count bump.

use arrayvec::ArrayVec;

/// Returns a copy of `xs` with `x` appended.
///
/// Precondition: `xs` is not full.
pub(crate) fn append<T: Clone, const N: usize>(xs: &ArrayVec<T, N>, x: T) -> ArrayVec<T, N> {
    debug_assert!(xs.len() < N);
    let mut out: ArrayVec<T, N> = xs.iter().cloned().collect();
    out.push(x);
    out
}

/// Returns a copy of `xs` with slot `index` replaced by `x`.
pub(crate) fn update<T: Clone, const N: usize>(
    xs: &ArrayVec<T, N>,
    index: usize,
    x: T,
) -> ArrayVec<T, N> {
    debug_assert!(index < xs.len());
    let mut out: ArrayVec<T, N> = xs.iter().cloned().collect();
    out[index] = x;
    out
}

/// Returns a copy of the first `len` slots of `xs`.
pub(crate) fn truncate<T: Clone, const N: usize>(xs: &ArrayVec<T, N>, len: usize) -> ArrayVec<T, N> {
    debug_assert!(len <= xs.len());
    xs.iter().take(len).cloned().collect()
}

/// Returns a copy of `xs` with `x` appended, as a boxed slice.
pub(crate) fn slice_append<T: Clone>(xs: &[T], x: T) -> Box<[T]> {
    let mut out = Vec::with_capacity(xs.len() + 1);
    out.extend_from_slice(xs);
    out.push(x);
    out.into_boxed_slice()
}

/// Returns a copy of `xs` with slot `index` replaced by `x`, as a boxed slice.
pub(crate) fn slice_update<T: Clone>(xs: &[T], index: usize, x: T) -> Box<[T]> {
    debug_assert!(index < xs.len());
    let mut out = xs.to_vec();
    out[index] = x;
    out.into_boxed_slice()
}

/// Returns a copy of `xs` with slot `index` dropped, as a boxed slice.
pub(crate) fn slice_excise<T: Clone>(xs: &[T], index: usize) -> Box<[T]> {
    debug_assert!(index < xs.len());
    xs.iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, v)| v.clone())
        .collect()
}
