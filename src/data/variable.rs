//! Named n-dimensional float variables.

use super::FloatFormat;
use crate::error::{BitinfoError, Result};
use ndarray::{ArrayD, Axis};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute key under which the keepbits of a rounded variable are recorded.
pub const KEEPBITS_ATTRIBUTE: &str = "_QuantizeBitRoundNumberOfSignificantDigits";

/// Array payload of a variable, tagged by element type.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatArray {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl FloatArray {
    /// Bit layout of the elements.
    pub fn format(&self) -> FloatFormat {
        match self {
            Self::F32(_) => FloatFormat::SINGLE,
            Self::F64(_) => FloatFormat::DOUBLE,
        }
    }

    /// Name of the element type as used in dataset files.
    pub fn dtype(&self) -> &'static str {
        match self {
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(a) => a.shape(),
            Self::F64(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(a) => a.len(),
            Self::F64(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements widened to f64, in row-major order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::F32(a) => a.iter().map(|&x| x as f64).collect(),
            Self::F64(a) => a.iter().copied().collect(),
        }
    }

    /// Contiguous slab `start..end` along `axis`.
    pub fn slice_axis(&self, axis: usize, start: usize, end: usize) -> FloatArray {
        let range = ndarray::Slice::from(start..end);
        match self {
            Self::F32(a) => Self::F32(a.slice_axis(Axis(axis), range).to_owned()),
            Self::F64(a) => Self::F64(a.slice_axis(Axis(axis), range).to_owned()),
        }
    }

    /// Join arrays of the same element type end to end along `axis`.
    pub fn concatenate(axis: usize, parts: &[FloatArray]) -> Result<FloatArray> {
        let first = parts
            .first()
            .ok_or_else(|| BitinfoError::EmptyData("nothing to concatenate".to_string()))?;
        let shape_err = |e: ndarray::ShapeError| BitinfoError::InvalidParameter(e.to_string());
        match first {
            Self::F32(_) => {
                let views = parts
                    .iter()
                    .map(|p| match p {
                        Self::F32(a) => Ok(a.view()),
                        other => Err(mixed_types(first, other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::F32(ndarray::concatenate(Axis(axis), &views).map_err(shape_err)?))
            }
            Self::F64(_) => {
                let views = parts
                    .iter()
                    .map(|p| match p {
                        Self::F64(a) => Ok(a.view()),
                        other => Err(mixed_types(first, other)),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::F64(ndarray::concatenate(Axis(axis), &views).map_err(shape_err)?))
            }
        }
    }
}

fn mixed_types(a: &FloatArray, b: &FloatArray) -> BitinfoError {
    BitinfoError::InvalidParameter(format!(
        "cannot concatenate {} with {}",
        a.dtype(),
        b.dtype()
    ))
}

impl From<ArrayD<f32>> for FloatArray {
    fn from(array: ArrayD<f32>) -> Self {
        Self::F32(array)
    }
}

impl From<ArrayD<f64>> for FloatArray {
    fn from(array: ArrayD<f64>) -> Self {
        Self::F64(array)
    }
}

/// A named float array with named dimensions and free-form attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    dims: Vec<String>,
    data: FloatArray,
    attrs: BTreeMap<String, Value>,
}

impl Variable {
    /// Create a variable, checking that every axis has a dimension name.
    pub fn new(name: &str, dims: Vec<String>, data: impl Into<FloatArray>) -> Result<Self> {
        let data = data.into();
        if dims.len() != data.ndim() {
            return Err(BitinfoError::DimensionMismatch {
                expected: data.ndim(),
                actual: dims.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            dims,
            data,
            attrs: BTreeMap::new(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    #[inline]
    pub fn data(&self) -> &FloatArray {
        &self.data
    }

    #[inline]
    pub fn attrs(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }

    #[inline]
    pub fn format(&self) -> FloatFormat {
        self.data.format()
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Axis index of a named dimension.
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| BitinfoError::UnknownDimension {
                variable: self.name.clone(),
                dim: dim.to_string(),
            })
    }

    /// Length of a named dimension.
    pub fn dim_len(&self, dim: &str) -> Result<usize> {
        Ok(self.shape()[self.axis_of(dim)?])
    }

    /// A copy carrying the same name, dimensions and attributes over new data.
    pub fn with_data(&self, data: impl Into<FloatArray>) -> Result<Self> {
        let mut out = Self::new(&self.name, self.dims.clone(), data)?;
        out.attrs = self.attrs.clone();
        Ok(out)
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Keepbits recorded on this variable by a previous rounding, if any.
    pub fn keepbits_attr(&self) -> Option<u32> {
        self.attrs
            .get(KEEPBITS_ATTRIBUTE)
            .and_then(Value::as_u64)
            .and_then(|k| u32::try_from(k).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    fn grid() -> Variable {
        let data = Array::from_shape_fn(IxDyn(&[2, 3]), |ix| (ix[0] * 3 + ix[1]) as f32);
        Variable::new("t", vec!["lat".into(), "lon".into()], data).unwrap()
    }

    #[test]
    fn test_dims_must_match_ndim() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[4]));
        let err = Variable::new("x", vec!["a".into(), "b".into()], data).unwrap_err();
        assert!(matches!(
            err,
            BitinfoError::DimensionMismatch { expected: 1, actual: 2 }
        ));
    }

    #[test]
    fn test_axis_lookup() {
        let v = grid();
        assert_eq!(v.axis_of("lon").unwrap(), 1);
        assert_eq!(v.dim_len("lat").unwrap(), 2);
        assert!(matches!(
            v.axis_of("time"),
            Err(BitinfoError::UnknownDimension { .. })
        ));
    }

    #[test]
    fn test_slice_axis() {
        let v = grid();
        let slab = v.data().slice_axis(1, 1, 3);
        assert_eq!(slab.shape(), &[2, 2]);
        assert_eq!(slab.to_f64_vec(), vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_concatenate_restores_slabs() {
        let v = grid();
        let parts = vec![v.data().slice_axis(1, 0, 1), v.data().slice_axis(1, 1, 3)];
        let joined = FloatArray::concatenate(1, &parts).unwrap();
        assert_eq!(&joined, v.data());

        let mixed = vec![parts[0].clone(), FloatArray::F64(ArrayD::zeros(IxDyn(&[2, 1])))];
        assert!(FloatArray::concatenate(1, &mixed).is_err());
    }

    #[test]
    fn test_keepbits_attr() {
        let v = grid().with_attr(KEEPBITS_ATTRIBUTE, 7u32);
        assert_eq!(v.keepbits_attr(), Some(7));
        assert_eq!(grid().keepbits_attr(), None);
        let huge = grid().with_attr(KEEPBITS_ATTRIBUTE, 1u64 << 33);
        assert_eq!(huge.keepbits_attr(), None);
        let negative = grid().with_attr(KEEPBITS_ATTRIBUTE, -3);
        assert_eq!(negative.keepbits_attr(), None);
    }
}
