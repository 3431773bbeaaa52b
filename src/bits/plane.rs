//! Bit-plane extraction.

use super::BitFloat;
use crate::error::{BitinfoError, Result};
use ndarray::{Array, ArrayBase, Data, Dimension};

/// Value (0 or 1) of bit `bit` of a raw pattern of the given width.
///
/// Bit 0 is the most significant (sign) bit.
#[inline]
pub fn bit_of(raw: u64, bit: usize, width: u32) -> u8 {
    ((raw >> (width as usize - 1 - bit)) & 1) as u8
}

/// Same-shape array of raw bit patterns.
pub fn bit_pattern<T, S, D>(array: &ArrayBase<S, D>) -> Array<u64, D>
where
    T: BitFloat,
    S: Data<Elem = T>,
    D: Dimension,
{
    array.mapv(T::to_raw)
}

/// Extract bit plane `bit` of every element.
pub fn bitplane<T, S, D>(array: &ArrayBase<S, D>, bit: usize) -> Result<Array<u8, D>>
where
    T: BitFloat,
    S: Data<Elem = T>,
    D: Dimension,
{
    let width = T::FORMAT.width;
    if bit >= width as usize {
        return Err(BitinfoError::BitIndexOutOfRange {
            bit,
            width: width as usize,
        });
    }
    Ok(array.mapv(|x| bit_of(x.to_raw(), bit, width)))
}

/// Extract all bit planes, sign bit first.
///
/// The raw patterns are read once and shared by every plane.
pub fn bitplanes<T, S, D>(array: &ArrayBase<S, D>) -> Vec<Array<u8, D>>
where
    T: BitFloat,
    S: Data<Elem = T>,
    D: Dimension,
{
    let width = T::FORMAT.width;
    let raw = bit_pattern(array);
    (0..width as usize)
        .map(|bit| raw.mapv(|r| bit_of(r, bit, width)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_bitplane_sign_and_exponent() {
        let a = array![1.0f32, -2.0, 0.5];
        let sign = bitplane(&a, 0).unwrap();
        assert_eq!(sign.to_vec(), vec![0, 1, 0]);

        // 1.0 = 0x3f800000: first exponent bit is 0, the next seven are 1
        let e1 = bitplane(&a, 1).unwrap();
        assert_eq!(e1.to_vec(), vec![0, 1, 0]);
        let e2 = bitplane(&a, 2).unwrap();
        assert_eq!(e2.to_vec(), vec![1, 0, 1]);
    }

    #[test]
    fn test_bitplane_keeps_shape() {
        let a = Array2::<f64>::from_elem((3, 4), 1.25);
        let plane = bitplane(&a, 13).unwrap();
        assert_eq!(plane.shape(), &[3, 4]);
        // 1.25 = 1.01b: second mantissa bit set
        assert!(plane.iter().all(|&b| b == 1));
    }

    #[test]
    fn test_bitplane_out_of_range() {
        let a = array![1.0f32];
        assert!(matches!(
            bitplane(&a, 32),
            Err(BitinfoError::BitIndexOutOfRange { bit: 32, width: 32 })
        ));
    }

    #[test]
    fn test_bitplanes_reassemble_value() {
        let a = array![3.141_592_7f32, -0.001];
        let planes = bitplanes(&a);
        assert_eq!(planes.len(), 32);
        for (i, &x) in a.iter().enumerate() {
            let raw = planes
                .iter()
                .fold(0u32, |acc, plane| (acc << 1) | plane[i] as u32);
            assert_eq!(raw, x.to_bits());
        }
    }
}
