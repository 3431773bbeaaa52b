//! Mantissa rounding of scalars, arrays, variables and datasets.

use crate::bits::BitFloat;
use crate::data::{check_keepbits, Dataset, FloatArray, Keepbits, Variable, KEEPBITS_ATTRIBUTE};
use crate::error::Result;
use ndarray::{Array, ArrayBase, Data, Dimension};
use rayon::prelude::*;
use tracing::{debug, info};

/// Round a raw bit pattern to `keepbits` of its `mantissa_bits` mantissa bits.
///
/// Adds half a unit of the last kept bit (minus one, plus the kept bit
/// itself so that ties go to even) and clears the dropped bits. A carry out
/// of the mantissa increments the exponent, which is the correctly rounded
/// result at a power-of-two boundary.
#[inline]
pub const fn round_bits(raw: u64, keepbits: u32, mantissa_bits: u32) -> u64 {
    if keepbits >= mantissa_bits {
        return raw;
    }
    let maskbits = mantissa_bits - keepbits;
    let mask = u64::MAX << maskbits;
    let half_quantum1 = (1u64 << (maskbits - 1)) - 1;
    raw.wrapping_add(((raw >> maskbits) & 1) + half_quantum1) & mask
}

/// Round one value to `keepbits` mantissa bits. NaN is returned unchanged.
///
/// `keepbits` must not exceed the mantissa width of `T`; larger values
/// leave the value unchanged.
///
/// Finite values within half a quantum of the largest finite magnitude
/// round up to infinity of the same sign, as IEEE rounding overflow does.
/// The relative error bound of `2^-(keepbits + 1)` holds for every other
/// normal value.
#[inline]
pub fn bitround_value<T: BitFloat>(value: T, keepbits: u32) -> T {
    if value.is_nan() {
        return value;
    }
    T::from_raw(round_bits(value.to_raw(), keepbits, T::FORMAT.mantissa_bits))
}

/// Round every element of an array into a new array.
pub fn bitround<T, S, D>(array: &ArrayBase<S, D>, keepbits: u32) -> Result<Array<T, D>>
where
    T: BitFloat,
    S: Data<Elem = T>,
    D: Dimension,
{
    let keepbits = check_keepbits(keepbits as i64, T::FORMAT)?;
    Ok(array.mapv(|x| bitround_value(x, keepbits)))
}

/// Round a variable, recording the keepbits in its attributes.
pub fn bitround_variable(variable: &Variable, keepbits: u32) -> Result<Variable> {
    let data = match variable.data() {
        FloatArray::F32(a) => FloatArray::F32(bitround(a, keepbits)?),
        FloatArray::F64(a) => FloatArray::F64(bitround(a, keepbits)?),
    };
    debug!(variable = variable.name(), keepbits, "Bitrounded variable");
    Ok(variable.with_data(data)?.with_attr(KEEPBITS_ATTRIBUTE, keepbits))
}

/// Round every variable of a dataset with its own keepbits.
///
/// All keepbits are resolved before any rounding, so a missing or
/// out-of-range entry fails the call without producing output.
pub fn bitround_dataset(dataset: &Dataset, keepbits: &Keepbits) -> Result<Dataset> {
    let resolved = dataset
        .iter()
        .map(|v| keepbits.resolve(v.name(), v.format()))
        .collect::<Result<Vec<u32>>>()?;
    info!(n_variables = dataset.len(), keepbits = %keepbits, "Bitrounding dataset");

    let variables = dataset
        .variables()
        .par_iter()
        .zip(resolved.par_iter())
        .map(|(v, &k)| bitround_variable(v, k))
        .collect::<Result<Vec<_>>>()?;
    Dataset::new(variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BitinfoError;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, ArrayD, IxDyn};

    fn wave(n: usize) -> Array1<f32> {
        Array1::from_shape_fn(n, |i| ((i as f32) * 0.731).sin() * 1000.0 + 0.123)
    }

    #[test]
    fn test_full_mantissa_is_identity() {
        let a = wave(200);
        let r = bitround(&a, 23).unwrap();
        for (x, y) in a.iter().zip(r.iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        let b = array![std::f64::consts::PI, -1e-300];
        let rb = bitround(&b, 52).unwrap();
        assert_eq!(rb[0].to_bits(), b[0].to_bits());
        assert_eq!(rb[1].to_bits(), b[1].to_bits());
    }

    #[test]
    fn test_ties_round_to_even() {
        // keepbits = 1: representable neighbours in [1, 2) are 1.0, 1.5, 2.0
        // 1.25 lies halfway between 1.0 (even) and 1.5 (odd)
        assert_eq!(bitround_value(1.25f32, 1), 1.0);
        // 1.75 lies halfway between 1.5 (odd) and 2.0 (even)
        assert_eq!(bitround_value(1.75f32, 1), 2.0);
        assert_eq!(bitround_value(-1.75f64, 1), -2.0);
        assert_eq!(bitround_value(1.25f64, 1), 1.0);
    }

    #[test]
    fn test_rounds_to_nearest_not_truncates() {
        // 1.3 is nearer to 1.25 than 1.0 at two mantissa bits
        assert_eq!(bitround_value(1.3f32, 2), 1.25);
        assert_eq!(bitround_value(1.4f32, 2), 1.5);
    }

    #[test]
    fn test_carry_into_exponent() {
        let just_below_two = f32::from_bits(2.0f32.to_bits() - 1);
        assert_eq!(bitround_value(just_below_two, 5), 2.0);
    }

    #[test]
    fn test_keepbits_zero_keeps_sign_and_exponent() {
        assert_eq!(bitround_value(1.4f32, 0), 1.0);
        assert_eq!(bitround_value(1.6f32, 0), 2.0);
        assert_eq!(bitround_value(-3.5f64, 0), -4.0);
        assert_eq!(bitround_value(-0.7f32, 0), -0.5);
    }

    #[test]
    fn test_keepbits_zero_ties_follow_exponent_parity() {
        // 3.0 = 1.5 * 2^1: exponent field 128 is even, stays at 2.0
        assert_eq!(bitround_value(3.0f32, 0), 2.0);
        // 6.0 = 1.5 * 2^2: exponent field 129 is odd, goes up to 8.0
        assert_eq!(bitround_value(6.0f32, 0), 8.0);
    }

    #[test]
    fn test_special_values_unchanged() {
        let nan = f32::from_bits(0x7fc0_1234);
        for k in [0, 3, 10, 22] {
            assert_eq!(bitround_value(nan, k).to_bits(), nan.to_bits());
            assert_eq!(bitround_value(f32::INFINITY, k), f32::INFINITY);
            assert_eq!(bitround_value(f32::NEG_INFINITY, k), f32::NEG_INFINITY);
            assert_eq!(bitround_value(0.0f32, k).to_bits(), 0.0f32.to_bits());
            assert_eq!(bitround_value(-0.0f32, k).to_bits(), (-0.0f32).to_bits());
        }
        let nan64 = f64::from_bits(0x7ff8_0000_dead_beef);
        assert_eq!(bitround_value(nan64, 7).to_bits(), nan64.to_bits());
    }

    #[test]
    fn test_idempotent_and_error_bound() {
        let a = wave(1000);
        for k in [0u32, 1, 4, 7, 12, 22] {
            let once = bitround(&a, k).unwrap();
            let twice = bitround(&once, k).unwrap();
            assert_eq!(once, twice);
            let bound = 2f64.powi(-(k as i32 + 1));
            for (x, y) in a.iter().zip(once.iter()) {
                let rel = ((*y as f64 - *x as f64) / *x as f64).abs();
                assert!(rel <= bound, "k={} x={} y={} rel={}", k, x, y, rel);
            }
        }
    }

    #[test]
    fn test_monotone() {
        let mut values: Vec<f64> = (0..2000).map(|i| (i as f64 - 1000.0) * 0.0137).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let a = Array1::from(values);
        let r = bitround(&a, 3).unwrap();
        assert!(r.windows(2).into_iter().all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_invalid_keepbits() {
        let a = array![1.0f32];
        assert!(matches!(
            bitround(&a, 24),
            Err(BitinfoError::InvalidKeepbits { keepbits: 24, max: 23 })
        ));
        let b = array![1.0f64];
        assert!(bitround(&b, 52).is_ok());
        assert!(bitround(&b, 53).is_err());
    }

    #[test]
    fn test_input_untouched() {
        let a = wave(10);
        let copy = a.clone();
        let _ = bitround(&a, 2).unwrap();
        assert_eq!(a, copy);
    }

    #[test]
    fn test_variable_records_keepbits() {
        let data = ArrayD::from_shape_vec(IxDyn(&[4]), vec![1.1f32, 2.2, 3.3, 4.4]).unwrap();
        let v = Variable::new("air", vec!["time".into()], data).unwrap();
        let r = bitround_variable(&v, 5).unwrap();
        assert_eq!(r.keepbits_attr(), Some(5));
        assert_eq!(r.name(), "air");
        let values = r.data().to_f64_vec();
        assert_relative_eq!(values[0], 1.09375);
    }

    #[test]
    fn test_dataset_with_mapping() {
        let a = ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.3f32, 1.7]).unwrap();
        let b = ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.3f64, 1.7]).unwrap();
        let ds = Dataset::new(vec![
            Variable::new("a", vec!["t".into()], a).unwrap(),
            Variable::new("b", vec!["t".into()], b).unwrap(),
        ])
        .unwrap();

        let keep = Keepbits::from_counts([("a", 0), ("b", 2)]);
        let r = bitround_dataset(&ds, &keep).unwrap();
        assert_eq!(r.get("a").unwrap().data().to_f64_vec(), vec![1.0, 2.0]);
        assert_eq!(r.get("b").unwrap().data().to_f64_vec(), vec![1.25, 1.75]);

        let partial = Keepbits::from_counts([("a", 0)]);
        assert!(matches!(
            bitround_dataset(&ds, &partial),
            Err(BitinfoError::VariableNotFound(name)) if name == "b"
        ));
        assert!(matches!(
            bitround_dataset(&ds, &Keepbits::Uniform(30)),
            Err(BitinfoError::InvalidKeepbits { .. })
        ));
    }

    #[test]
    fn test_largest_values_overflow_to_infinity() {
        assert_eq!(bitround_value(f32::MAX, 0), f32::INFINITY);
        assert_eq!(bitround_value(-f32::MAX, 10), f32::NEG_INFINITY);
        assert_eq!(bitround_value(f64::MAX, 20), f64::INFINITY);
        // Full mantissa and rounding down stay finite
        assert_eq!(bitround_value(f32::MAX, 23), f32::MAX);
        let below = f32::from_bits(0x7F00_0000);
        assert_eq!(bitround_value(below, 0), below);
    }
}
