use std::iter;

use ndarray::{Array1, ArrayView1};
use num_traits::Float;

use crate::{LinearityError, Result};

/// Generate the ideal integer code positions `[0, 1, ..., n - 1]` in the element type `E`
///
/// The ramp is built by repeated addition of one, which is exact for every code count a real
/// converter can have, so no fallible numeric cast is needed.
///
/// # Examples
///
/// ```
/// use adc_linearity::math::code_ramp;
/// use ndarray::arr1;
///
/// let ramp = code_ramp::<f64>(4);
/// assert_eq!(ramp, arr1(&[0., 1., 2., 3.]));
/// ```
pub fn code_ramp<E: Float>(n: usize) -> Array1<E> {
    iter::successors(Some(E::zero()), |code| Some(*code + E::one()))
        .take(n)
        .collect()
}

/// Largest absolute value in `values`, zero for an empty series
///
/// # Examples
///
/// ```
/// use adc_linearity::math::max_abs;
/// use ndarray::arr1;
///
/// let values = arr1(&[0.25, -0.5, 0.125]);
/// assert_eq!(max_abs(values.view()), 0.5);
/// ```
pub fn max_abs<E: Float>(values: ArrayView1<E>) -> E {
    values
        .iter()
        .fold(E::zero(), |extreme, value| extreme.max(value.abs()))
}

/// Reject a step size that is not strictly positive, including NaN
pub(crate) fn ensure_positive_lsb<E: Float>(lsb: E) -> Result<()> {
    if lsb > E::zero() {
        Ok(())
    } else {
        Err(LinearityError::invalid(
            "the LSB step size must be strictly positive",
        ))
    }
}

/// Reject a pair of series which are not aligned over the same code range
pub(crate) fn ensure_same_len<E>(
    left: ArrayView1<E>,
    right: ArrayView1<E>,
    what: &str,
) -> Result<()> {
    if left.len() == right.len() {
        Ok(())
    } else {
        Err(LinearityError::invalid(format!(
            "{what}: series of length {} and {} do not cover the same codes",
            left.len(),
            right.len()
        )))
    }
}

/// Reject a series with fewer than `minimum` codes
pub(crate) fn ensure_min_codes(len: usize, minimum: usize, what: &str) -> Result<()> {
    if len >= minimum {
        Ok(())
    } else {
        Err(LinearityError::invalid(format!(
            "{what}: at least {minimum} codes are required, got {len}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, Array1};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_isaac::isaac64::Isaac64Rng;

    use super::{code_ramp, ensure_min_codes, ensure_positive_lsb, ensure_same_len, max_abs};
    use crate::LinearityError;

    #[test]
    fn code_ramps_count_up_from_zero() {
        let ramp = code_ramp::<f32>(256);
        assert_eq!(ramp.len(), 256);
        for (code, value) in ramp.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = code as f32;
            assert_eq!(*value, expected);
        }
        assert!(code_ramp::<f64>(0).is_empty());
    }

    #[test]
    fn max_abs_finds_the_largest_magnitude() {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let values: Array1<f64> = Array1::random_using(64, Uniform::new(-3., 2.), &mut rng);

        let expected = values
            .iter()
            .map(|value| value.abs())
            .fold(0., f64::max);
        approx::assert_relative_eq!(max_abs(values.view()), expected);
        assert_eq!(max_abs(Array1::<f64>::zeros(0).view()), 0.);
    }

    #[test]
    fn non_positive_lsb_is_rejected() {
        assert!(ensure_positive_lsb(0.1).is_ok());
        for lsb in [0., -0.1, f64::NAN] {
            assert!(matches!(
                ensure_positive_lsb(lsb),
                Err(LinearityError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn misaligned_series_are_rejected() {
        let three = arr1(&[0., 1., 2.]);
        let two = arr1(&[0., 1.]);
        assert!(ensure_same_len(three.view(), three.view(), "levels").is_ok());
        assert!(matches!(
            ensure_same_len(three.view(), two.view(), "levels"),
            Err(LinearityError::InvalidInput(_))
        ));
        assert!(ensure_min_codes(2, 2, "levels").is_ok());
        assert!(ensure_min_codes(1, 2, "levels").is_err());
    }
}
