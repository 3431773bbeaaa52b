//! Ordered collections of named variables and their JSON file format.

use super::{FloatArray, Variable};
use crate::error::{BitinfoError, Result};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// An ordered collection of variables with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    variables: Vec<Variable>,
}

impl Dataset {
    /// Create a dataset, rejecting duplicate variable names.
    pub fn new(variables: Vec<Variable>) -> Result<Self> {
        let mut seen = HashSet::new();
        for v in &variables {
            if !seen.insert(v.name().to_string()) {
                return Err(BitinfoError::InvalidParameter(format!(
                    "duplicate variable name '{}'",
                    v.name()
                )));
            }
        }
        Ok(Self { variables })
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Result<&Variable> {
        self.variables
            .iter()
            .find(|v| v.name() == name)
            .ok_or_else(|| BitinfoError::VariableNotFound(name.to_string()))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Parse a dataset from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let record: DatasetRecord = serde_json::from_str(json)?;
        record.try_into()
    }

    /// Serialize to the JSON representation.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&DatasetRecord::from(self))?)
    }

    /// Load a dataset from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let record: DatasetRecord = serde_json::from_reader(reader)?;
        record.try_into()
    }

    /// Write the dataset to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &DatasetRecord::from(self))?;
        writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

/// On-disk form of a dataset.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetRecord {
    variables: Vec<VariableRecord>,
}

/// On-disk form of a variable. Data is row-major; `null` encodes NaN.
#[derive(Debug, Serialize, Deserialize)]
struct VariableRecord {
    name: String,
    dims: Vec<String>,
    shape: Vec<usize>,
    dtype: String,
    data: Vec<Option<Sample>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, Value>,
}

/// One stored element. JSON numbers cannot be infinite, so infinities are
/// written as the strings `"inf"` and `"-inf"`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Sample {
    Number(f64),
    Special(String),
}

fn encode_sample(x: f64) -> Option<Sample> {
    if x.is_nan() {
        None
    } else if x == f64::INFINITY {
        Some(Sample::Special("inf".to_string()))
    } else if x == f64::NEG_INFINITY {
        Some(Sample::Special("-inf".to_string()))
    } else {
        Some(Sample::Number(x))
    }
}

fn decode_sample(sample: Option<Sample>) -> Result<f64> {
    match sample {
        None => Ok(f64::NAN),
        Some(Sample::Number(x)) => Ok(x),
        Some(Sample::Special(s)) => match s.as_str() {
            "inf" | "+inf" => Ok(f64::INFINITY),
            "-inf" => Ok(f64::NEG_INFINITY),
            "nan" => Ok(f64::NAN),
            other => Err(BitinfoError::InvalidParameter(format!(
                "invalid data value '{}'",
                other
            ))),
        },
    }
}

impl From<&Dataset> for DatasetRecord {
    fn from(ds: &Dataset) -> Self {
        let variables = ds
            .iter()
            .map(|v| VariableRecord {
                name: v.name().to_string(),
                dims: v.dims().to_vec(),
                shape: v.shape().to_vec(),
                dtype: v.data().dtype().to_string(),
                data: v
                    .data()
                    .to_f64_vec()
                    .into_iter()
                    .map(encode_sample)
                    .collect(),
                attrs: v.attrs().clone(),
            })
            .collect();
        Self { variables }
    }
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = BitinfoError;

    fn try_from(record: DatasetRecord) -> Result<Self> {
        let variables = record
            .variables
            .into_iter()
            .map(Variable::try_from)
            .collect::<Result<Vec<_>>>()?;
        Dataset::new(variables)
    }
}

impl TryFrom<VariableRecord> for Variable {
    type Error = BitinfoError;

    fn try_from(record: VariableRecord) -> Result<Self> {
        let expected: usize = record.shape.iter().product();
        if record.data.len() != expected {
            return Err(BitinfoError::DimensionMismatch {
                expected,
                actual: record.data.len(),
            });
        }
        let values = record
            .data
            .into_iter()
            .map(decode_sample)
            .collect::<Result<Vec<f64>>>()?;
        let shape = IxDyn(&record.shape);
        let data = match record.dtype.as_str() {
            "float32" | "f32" => {
                FloatArray::F32(array_from(shape, values.iter().map(|&x| x as f32).collect())?)
            }
            "float64" | "f64" => FloatArray::F64(array_from(shape, values)?),
            other => {
                return Err(BitinfoError::UnsupportedFormat {
                    dtype: other.to_string(),
                })
            }
        };
        let mut variable = Variable::new(&record.name, record.dims, data)?;
        for (key, value) in record.attrs {
            variable = variable.with_attr(&key, value);
        }
        Ok(variable)
    }
}

fn array_from<T>(shape: IxDyn, values: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(shape, values)
        .map_err(|e| BitinfoError::InvalidParameter(format!("bad array shape: {}", e)))
}
