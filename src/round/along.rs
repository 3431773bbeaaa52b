//! Side-by-side comparison of inflevels on slabs of one dataset.

use super::codec::bitround;
use crate::data::{Dataset, FloatArray, Variable};
use crate::error::{BitinfoError, Result};
use crate::info::BitInformation;
use crate::keepbits::{get_keepbits, validate_inflevel};
use tracing::debug;

/// Inflevels used by [`bitround_along_dim`] when none are given.
pub const DEFAULT_INFLEVELS: [f64; 5] = [1.0, 0.9999, 0.99, 0.975, 0.95];

/// Round consecutive slabs along `dim` with the keepbits of successive
/// inflevels and join them back together.
///
/// The dimension is split into `inflevels.len()` slabs of equal length, the
/// last one taking any remainder. A slab with inflevel 1.0 is left as is.
/// Useful to show the effect of each inflevel side by side.
pub fn bitround_along_dim(
    dataset: &Dataset,
    bitinfo: &BitInformation,
    dim: &str,
    inflevels: &[f64],
) -> Result<Dataset> {
    if inflevels.is_empty() {
        return Err(BitinfoError::InvalidParameter(
            "at least one inflevel is required".to_string(),
        ));
    }
    for &level in inflevels {
        validate_inflevel(level)?;
    }
    let keepbits = inflevels
        .iter()
        .map(|&level| get_keepbits(bitinfo, level))
        .collect::<Result<Vec<_>>>()?;

    let variables = dataset
        .iter()
        .map(|variable| {
            let axis = variable.axis_of(dim)?;
            let len = variable.shape()[axis];
            if len < inflevels.len() {
                return Err(BitinfoError::InvalidParameter(format!(
                    "dimension '{}' of '{}' has {} positions, fewer than {} inflevels",
                    dim,
                    variable.name(),
                    len,
                    inflevels.len()
                )));
            }
            let stride = len / inflevels.len();

            let slabs = inflevels
                .iter()
                .zip(&keepbits)
                .enumerate()
                .map(|(i, (&level, kb))| {
                    let start = stride * i;
                    let end = if i == inflevels.len() - 1 { len } else { start + stride };
                    let slab = variable.data().slice_axis(axis, start, end);
                    if level == 1.0 {
                        return Ok(slab);
                    }
                    let k = kb.resolve(variable.name(), variable.format())?;
                    debug!(
                        variable = variable.name(),
                        start,
                        end,
                        inflevel = level,
                        keepbits = k,
                        "Bitrounding slab"
                    );
                    round_slab(&slab, k)
                })
                .collect::<Result<Vec<_>>>()?;

            variable.with_data(FloatArray::concatenate(axis, &slabs)?)
        })
        .collect::<Result<Vec<Variable>>>()?;

    Dataset::new(variables)
}

fn round_slab(slab: &FloatArray, keepbits: u32) -> Result<FloatArray> {
    Ok(match slab {
        FloatArray::F32(a) => FloatArray::F32(bitround(a, keepbits)?),
        FloatArray::F64(a) => FloatArray::F64(bitround(a, keepbits)?),
    })
}
