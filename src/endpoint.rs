use log::debug;
use ndarray::{Array1, ArrayView1, ScalarOperand};
use num_traits::Float;

use crate::math::{ensure_min_codes, ensure_same_len};
use crate::{LinearityError, Result};

/// Offset and gain error of a converter, derived once from its end points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorPair<E> {
    /// Observed level at code zero
    offset: E,
    /// Dimensionless multiplier mapping the offset-corrected top code onto the ideal top code
    gain: E,
}

impl<E: Float> ErrorPair<E> {
    pub const fn offset(&self) -> E {
        self.offset
    }

    pub const fn gain(&self) -> E {
        self.gain
    }

    /// The offset error expressed in units of `lsb`
    pub fn offset_in_lsb(&self, lsb: E) -> E {
        self.offset / lsb
    }
}

/// Result of a two-point end-point correction
#[derive(Clone, Debug)]
pub struct EndpointCorrection<E> {
    errors: ErrorPair<E>,
    offset_corrected: Array1<E>,
    corrected: Array1<E>,
}

impl<E> EndpointCorrection<E> {
    pub const fn errors(&self) -> &ErrorPair<E> {
        &self.errors
    }

    /// Measured levels with the code-zero level subtracted
    pub const fn offset_corrected(&self) -> &Array1<E> {
        &self.offset_corrected
    }

    /// Offset-corrected levels scaled by the gain factor
    pub const fn corrected(&self) -> &Array1<E> {
        &self.corrected
    }
}

/// Carry out end-point correction of `actual` against `ideal`
///
/// The code-zero observation is taken as the offset and subtracted from every level. The gain
/// then maps the offset-corrected top code onto the ideal top code, so the corrected curve agrees
/// with the ideal one at both end points and every remaining deviation is non-linearity.
///
/// # Errors
/// - [`LinearityError::InvalidInput`] if the series differ in length or hold fewer than two codes
/// - [`LinearityError::DivisionByZero`] if the offset-corrected top level is exactly zero
///
/// # Examples
///
/// ```
/// use adc_linearity::endpoint::correct;
/// use ndarray::arr1;
///
/// let ideal = arr1(&[0.0, 0.1, 0.2, 0.3]);
/// let actual = arr1(&[0.05, 0.2, 0.3, 0.45]);
/// let correction = correct(ideal.view(), actual.view()).unwrap();
///
/// assert_eq!(correction.errors().offset(), 0.05);
/// assert_eq!(correction.offset_corrected()[0], 0.0);
/// ```
pub fn correct<E: Float + ScalarOperand>(
    ideal: ArrayView1<E>,
    actual: ArrayView1<E>,
) -> Result<EndpointCorrection<E>> {
    ensure_same_len(ideal, actual, "end-point correction")?;
    ensure_min_codes(actual.len(), 2, "end-point correction")?;
    let top = actual.len() - 1;

    let offset = actual[0];
    let offset_corrected = actual.mapv(|level| level - offset);

    if offset_corrected[top] == E::zero() {
        return Err(LinearityError::DivisionByZero);
    }
    let gain = ideal[top] / offset_corrected[top];
    let corrected = &offset_corrected * gain;

    debug!(
        "end-point correction over {} codes: offset {}, gain {}",
        actual.len(),
        offset.to_f64().unwrap_or(f64::NAN),
        gain.to_f64().unwrap_or(f64::NAN)
    );

    Ok(EndpointCorrection {
        errors: ErrorPair { offset, gain },
        offset_corrected,
        corrected,
    })
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, Array1};
    use ndarray_rand::rand::{Rng, SeedableRng};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use proptest::prelude::*;
    use rand_isaac::isaac64::Isaac64Rng;

    use super::correct;
    use crate::linearity::ideal_levels;
    use crate::{LinearityError, Result};

    #[test]
    fn measured_three_bit_levels_are_corrected() -> Result<()> {
        let ideal = ideal_levels(8, 0.1)?;
        let actual = arr1(&[-0.01, 0.105, 0.195, 0.28, 0.37, 0.48, 0.6, 0.75]);

        let correction = correct(ideal.view(), actual.view())?;

        approx::assert_relative_eq!(correction.errors().offset(), -0.01);
        approx::assert_relative_eq!(correction.offset_corrected()[7], 0.76, epsilon = 1e-12);
        approx::assert_relative_eq!(
            correction.errors().gain(),
            0.7 / 0.76,
            max_relative = 1e-12
        );
        approx::assert_relative_eq!(correction.corrected()[7], 0.7, epsilon = 1e-12);
        approx::assert_relative_eq!(correction.errors().offset_in_lsb(0.1), -0.1, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn linear_converter_is_restored_to_ideal() -> Result<()> {
        let seed = 40;
        let mut rng = Isaac64Rng::seed_from_u64(seed);
        let lsb: f64 = rng.gen_range(0.01..1.0);
        let offset: f64 = rng.gen_range(-0.5..0.5);
        let gain: f64 = rng.gen_range(0.5..2.0);

        let ideal = ideal_levels(16, lsb)?;
        let actual = ideal.mapv(|level| level * gain + offset);
        let correction = correct(ideal.view(), actual.view())?;

        approx::assert_relative_eq!(correction.errors().gain(), 1. / gain, max_relative = 1e-10);
        for (corrected, expected) in correction.corrected().iter().zip(ideal.iter()) {
            approx::assert_abs_diff_eq!(*corrected, *expected, epsilon = 1e-10);
        }
        Ok(())
    }

    #[test]
    fn flat_converter_is_a_division_by_zero() {
        let ideal = arr1(&[0., 0.1, 0.2]);
        let actual = arr1(&[0.3, 0.31, 0.3]);
        assert!(matches!(
            correct(ideal.view(), actual.view()),
            Err(LinearityError::DivisionByZero)
        ));
    }

    #[test]
    fn malformed_series_are_invalid_input() {
        let ideal = arr1(&[0., 0.1, 0.2]);
        let short = arr1(&[0., 0.1]);
        assert!(matches!(
            correct(ideal.view(), short.view()),
            Err(LinearityError::InvalidInput(_))
        ));

        let single = arr1(&[0.5]);
        assert!(matches!(
            correct(single.view(), single.view()),
            Err(LinearityError::InvalidInput(_))
        ));
    }

    proptest! {
        #[test]
        // Code zero is always pulled to exactly zero and the top code onto the ideal top code
        fn end_points_agree_with_ideal(
            seed in any::<u64>(),
            num_codes in 2..64usize,
        ) {
            let mut rng = Isaac64Rng::seed_from_u64(seed);
            let ideal = ideal_levels(num_codes, 0.1).unwrap();
            let noise: Array1<f64> =
                Array1::random_using(num_codes, Uniform::new(-0.04, 0.04), &mut rng);
            let actual = &ideal + &noise + 0.02;

            let correction = correct(ideal.view(), actual.view()).unwrap();
            let top = num_codes - 1;

            prop_assert_eq!(correction.offset_corrected()[0], 0.0);
            prop_assert_eq!(correction.corrected()[0], 0.0);
            approx::assert_relative_eq!(
                correction.corrected()[top],
                ideal[top],
                max_relative = 1e-12
            );
        }
    }
}
