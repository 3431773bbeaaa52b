//! Bitwise real information content along a reduction axis.

use super::counts::BitPairCounts;
use super::entropy::{bit_information, noise_floor};
use super::{BitInformation, InformationConfig, InformationProfile};
use crate::bits::BitFloat;
use crate::data::{Dataset, FloatArray, Variable};
use crate::error::{BitinfoError, Result};
use ndarray::{ArrayBase, ArrayView1, Axis, Data, Dimension};
use rayon::prelude::*;
use tracing::{debug, info};

/// Accumulate adjacent-pair bit counts along `axis`.
///
/// Every 1-D lane along `axis` is an independent sample; the lanes are
/// counted in parallel and their tables merged.
pub fn bit_pair_counts<T, S, D>(
    array: &ArrayBase<S, D>,
    axis: usize,
    masked_value: Option<f64>,
) -> BitPairCounts
where
    T: BitFloat,
    S: Data<Elem = T>,
    D: Dimension,
{
    let width = T::FORMAT.width;
    let lanes: Vec<ArrayView1<'_, T>> = array.lanes(Axis(axis)).into_iter().collect();
    lanes
        .par_iter()
        .fold(
            || BitPairCounts::new(width),
            |mut acc, lane| {
                acc.add_sequence(lane.iter(), masked_value);
                acc
            },
        )
        .reduce(|| BitPairCounts::new(width), |a, b| a.merge(&b))
}

/// Turn pair counts into an information profile.
pub fn profile_from_counts<T: BitFloat>(
    counts: &BitPairCounts,
    config: &InformationConfig,
) -> Result<InformationProfile> {
    let floor = if config.set_zero_insignificant {
        Some(noise_floor(counts.n_pairs(), config.confidence)?)
    } else {
        None
    };

    let values = (0..counts.width() as usize)
        .map(|bit| {
            let ic = bit_information(counts.table(bit));
            match floor {
                Some(f) if ic <= f => 0.0,
                _ => ic,
            }
        })
        .collect();

    InformationProfile::new(T::FORMAT, values, counts.n_pairs())
}

/// Information profile of an array along one axis.
///
/// `dim` names the axis in error messages.
pub fn bitinformation_array<T, S, D>(
    array: &ArrayBase<S, D>,
    axis: usize,
    dim: &str,
    config: &InformationConfig,
) -> Result<InformationProfile>
where
    T: BitFloat,
    S: Data<Elem = T>,
    D: Dimension,
{
    config.validate()?;
    if axis >= array.ndim() {
        return Err(BitinfoError::InvalidParameter(format!(
            "axis {} out of range for a {}-dimensional array",
            axis,
            array.ndim()
        )));
    }
    let len = array.len_of(Axis(axis));
    if len < 2 {
        return Err(BitinfoError::EmptyReductionAxis {
            dim: dim.to_string(),
            len,
        });
    }

    let counts = bit_pair_counts(array, axis, config.masked_value);
    profile_from_counts::<T>(&counts, config)
}

/// Information profile of a variable.
///
/// With `dim = None` the profile is computed along every dimension with at
/// least two positions and the per-bit maximum is kept.
pub fn bitinformation_variable(
    variable: &Variable,
    dim: Option<&str>,
    config: &InformationConfig,
) -> Result<InformationProfile> {
    let profile = match dim {
        Some(dim) => along(variable, dim, config)?,
        None => {
            let candidates: Vec<&String> = variable
                .dims()
                .iter()
                .zip(variable.shape())
                .filter(|(_, &len)| len >= 2)
                .map(|(d, _)| d)
                .collect();
            let mut profiles = candidates.into_iter().map(|d| along(variable, d, config));
            let first = profiles.next().ok_or_else(|| BitinfoError::EmptyReductionAxis {
                dim: "<any>".to_string(),
                len: variable.shape().iter().copied().max().unwrap_or(0),
            })??;
            profiles.try_fold(first, |acc, p| acc.max(&p?))?
        }
    };

    debug!(
        variable = variable.name(),
        dim = dim.unwrap_or("<all>"),
        n_pairs = profile.n_pairs(),
        total = profile.total(),
        "Estimated bitwise information"
    );
    Ok(profile)
}

fn along(variable: &Variable, dim: &str, config: &InformationConfig) -> Result<InformationProfile> {
    let axis = variable.axis_of(dim)?;
    match variable.data() {
        FloatArray::F32(a) => bitinformation_array(a, axis, dim, config),
        FloatArray::F64(a) => bitinformation_array(a, axis, dim, config),
    }
}

/// Information profiles of every variable of a dataset.
///
/// Variables are analysed independently and in parallel.
pub fn bitinformation(
    dataset: &Dataset,
    dim: Option<&str>,
    config: &InformationConfig,
) -> Result<BitInformation> {
    config.validate()?;
    info!(
        n_variables = dataset.len(),
        dim = dim.unwrap_or("<all>"),
        confidence = config.confidence,
        "Analysing bitwise information"
    );
    let profiles = dataset
        .variables()
        .par_iter()
        .map(|v| -> Result<(String, InformationProfile)> {
            Ok((v.name().to_string(), bitinformation_variable(v, dim, config)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(profiles.into_iter().collect())
}
