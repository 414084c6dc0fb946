//! Contiguous, immutable-after-construction datasets.
//!
//! Inputs and outputs are stored row-major in flat buffers so that moving a
//! sample means moving one input row and its matching output row together.

use crate::DataError;

/// A supervised classification dataset: inputs (X) and one-hot outputs (Y).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<f64>,
    outputs: Vec<f64>,
    len: usize,
    num_inputs: usize,
    num_outputs: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers of shape `(len, num_inputs)` and
    /// `(len, num_outputs)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        outputs: Vec<f64>,
        num_inputs: usize,
        num_outputs: usize,
    ) -> Result<Self, DataError> {
        if num_inputs == 0 || num_outputs == 0 {
            return Err(DataError::Shape(format!(
                "arity must be > 0, got {num_inputs} inputs / {num_outputs} outputs"
            )));
        }
        if !inputs.len().is_multiple_of(num_inputs) {
            return Err(DataError::Shape(format!(
                "inputs length {} is not divisible by {num_inputs}",
                inputs.len()
            )));
        }
        let len = inputs.len() / num_inputs;
        if outputs.len() != len * num_outputs {
            return Err(DataError::Shape(format!(
                "outputs length {} does not match {len} samples * {num_outputs} outputs",
                outputs.len()
            )));
        }

        Ok(Self {
            inputs,
            outputs,
            len,
            num_inputs,
            num_outputs,
        })
    }

    /// Build a dataset from per-sample rows (copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], outputs: &[Vec<f64>]) -> Result<Self, DataError> {
        if inputs.len() != outputs.len() {
            return Err(DataError::Shape(format!(
                "inputs/outputs length mismatch: {} vs {}",
                inputs.len(),
                outputs.len()
            )));
        }
        let num_inputs = inputs.first().map_or(0, Vec::len);
        let num_outputs = outputs.first().map_or(0, Vec::len);

        let mut flat_inputs = Vec::with_capacity(inputs.len() * num_inputs);
        let mut flat_outputs = Vec::with_capacity(outputs.len() * num_outputs);
        for (i, (x, y)) in inputs.iter().zip(outputs).enumerate() {
            if x.len() != num_inputs || y.len() != num_outputs {
                return Err(DataError::Shape(format!(
                    "row {i} has {} inputs / {} outputs, expected {num_inputs} / {num_outputs}",
                    x.len(),
                    y.len()
                )));
            }
            flat_inputs.extend_from_slice(x);
            flat_outputs.extend_from_slice(y);
        }

        Self::from_flat(flat_inputs, flat_outputs, num_inputs, num_outputs)
    }

    /// An empty dataset with the given arity.
    #[must_use]
    pub fn empty(num_inputs: usize, num_outputs: usize) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            len: 0,
            num_inputs,
            num_outputs,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[inline]
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Returns the `idx`-th input row.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    #[must_use]
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.num_inputs;
        &self.inputs[start..start + self.num_inputs]
    }

    /// Returns the `idx`-th output (target) row.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    #[must_use]
    pub fn output(&self, idx: usize) -> &[f64] {
        let start = idx * self.num_outputs;
        &self.outputs[start..start + self.num_outputs]
    }

    /// Class indicator of sample `idx`: the last output equal to 1.0.
    ///
    /// Rows with several 1.0 entries violate the one-hot invariant; which of
    /// them is reported is unspecified beyond being deterministic.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn class_of(&self, idx: usize) -> Option<usize> {
        self.output(idx).iter().rposition(|&v| v == 1.0)
    }

    /// A new dataset holding the samples at `indices`, in that order.
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut inputs = Vec::with_capacity(indices.len() * self.num_inputs);
        let mut outputs = Vec::with_capacity(indices.len() * self.num_outputs);
        for &idx in indices {
            inputs.extend_from_slice(self.input(idx));
            outputs.extend_from_slice(self.output(idx));
        }
        Self {
            inputs,
            outputs,
            len: indices.len(),
            num_inputs: self.num_inputs,
            num_outputs: self.num_outputs,
        }
    }

    /// Concatenate datasets of equal arity, preserving sample order.
    pub fn concat(parts: &[&Dataset]) -> Result<Self, DataError> {
        let Some(first) = parts.first() else {
            return Err(DataError::Shape("cannot concatenate zero datasets".into()));
        };
        let (num_inputs, num_outputs) = (first.num_inputs, first.num_outputs);

        let mut merged = Self::empty(num_inputs, num_outputs);
        for part in parts {
            if part.num_inputs != num_inputs || part.num_outputs != num_outputs {
                return Err(DataError::Shape(format!(
                    "arity mismatch: {}x{} vs {num_inputs}x{num_outputs}",
                    part.num_inputs, part.num_outputs
                )));
            }
            merged.inputs.extend_from_slice(&part.inputs);
            merged.outputs.extend_from_slice(&part.outputs);
            merged.len += part.len;
        }
        Ok(merged)
    }

    /// Keep only the first `len` samples.
    pub(crate) fn truncated(&self, len: usize) -> Self {
        let len = len.min(self.len);
        Self {
            inputs: self.inputs[..len * self.num_inputs].to_vec(),
            outputs: self.outputs[..len * self.num_outputs].to_vec(),
            len,
            num_inputs: self.num_inputs,
            num_outputs: self.num_outputs,
        }
    }
}
