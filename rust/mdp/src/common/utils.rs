use crate::*;
use ndarray::ArrayView1;

/// Relative slack under which two action values count as tied.
pub const TIE_TOLERANCE: Continous = 1e-12;

/// Sup-norm distance `max_s |a[s] - b[s]|`.
///
/// A NaN entry (e.g. `inf - inf`) makes the whole distance NaN, so callers
/// can tell an overflowed sweep from a converged one.
pub fn max_abs_diff(a: ArrayView1<Continous>, b: ArrayView1<Continous>) -> Continous {
    assert_eq!(a.len(), b.len(), "Vectors must have the same length.");

    a.iter().zip(b.iter()).fold(0., |delta, (x, y)| {
        let d = (x - y).abs();
        if d.is_nan() || d > delta {
            d
        } else {
            delta
        }
    })
}

/// First index attaining the maximum, together with the maximum itself.
/// Values within [`TIE_TOLERANCE`] of the running best count as ties and
/// keep the lower index.
///
/// Returns `None` for an empty slice.
pub fn argmax_first(xs: ArrayView1<Continous>) -> Option<(Discrete, Continous)> {
    xs.iter().enumerate().fold(None, |best, (i, &x)| match best {
        None => Some((i, x)),
        Some((_, b)) if x > b + TIE_TOLERANCE * b.abs().max(1.) => Some((i, x)),
        Some((j, b)) => Some((j, b.max(x))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use ndarray::array;

    #[test]
    fn max_abs_diff_uses_absolute_value() {
        let old = array![1., 5., -2.];
        let new = array![1.5, 2., -2.];

        assert_float_eq!(max_abs_diff(old.view(), new.view()), 3., abs <= 1e-12);
        assert_float_eq!(max_abs_diff(new.view(), old.view()), 3., abs <= 1e-12);
    }

    #[test]
    fn max_abs_diff_keeps_nan() {
        let old = array![f64::INFINITY, 1.];
        let new = array![f64::INFINITY, 4.];
        assert!(max_abs_diff(old.view(), new.view()).is_nan());

        let old = array![5., f64::INFINITY];
        let new = array![1., f64::INFINITY];
        assert!(max_abs_diff(old.view(), new.view()).is_nan());

        let old = array![5., 2.];
        assert!(max_abs_diff(old.view(), new.view()).is_infinite());
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax_first(array![1., 3., 3.].view()), Some((1, 3.)));
        assert_eq!(
            argmax_first(array![2., 2. + 1e-15, 1.].view()).map(|x| x.0),
            Some(0)
        );
        assert_eq!(argmax_first(array![-4., -1., -2.].view()), Some((1, -1.)));
        assert_eq!(argmax_first(Values::zeros(0).view()), None);
    }
}
