#![allow(non_snake_case)]

//! Sparse observation models.
//!
//! Observations of a subset of state elements are represented by the value observed at each
//! slot together with the index of the state element the slot observes. A slot may be missing
//! in any cycle. For estimation the valid slots are compressed into an observation vector and
//! a linear observation model selecting the observed state elements.

use na::{allocator::Allocator, DefaultAllocator, Dim, Dynamic, MatrixMN, RealField, VectorN, U1};
use nalgebra as na;

/// Observation of a subset of state elements.
///
/// Slot k carries the value observed for state element `indices[k]`, or None when that slot is
/// missing this cycle. Several slots may observe the same state element.
pub struct SparseObservation<N: RealField> {
    /// Observed value of each slot, None where missing
    pub z: Vec<Option<N>>,
    /// State element index each slot observes
    pub indices: Vec<usize>,
}

/// The valid slots of a [`SparseObservation`] in dense form.
pub struct DenseObservation<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, Dynamic, D> + Allocator<N, Dynamic>,
{
    /// Observed values of the valid slots
    pub z: VectorN<N, Dynamic>,
    /// Linear observation model of the valid slots
    pub Hx: MatrixMN<N, Dynamic, D>,
    /// Original slot of each row of z and Hx
    pub slots: Vec<usize>,
}

impl<N: RealField> SparseObservation<N> {
    /// Creates a SparseObservation, requiring one state index per slot.
    pub fn new(z: Vec<Option<N>>, indices: Vec<usize>) -> Result<Self, &'static str> {
        if z.len() != indices.len() {
            return Err("observation and index lengths differ");
        }

        Ok(SparseObservation { z, indices })
    }

    /// Number of slots with a value this cycle.
    pub fn valid_count(&self) -> usize {
        self.z.iter().filter(|v| v.is_some()).count()
    }

    /// Compress the valid slots into dense form for a state of dimension `d`.
    ///
    /// Every slot index must lie within the state dimension, missing slots included.
    /// Returns None when every slot is missing.
    pub fn dense<D: Dim>(&self, d: D) -> Result<Option<DenseObservation<N, D>>, &'static str>
    where
        DefaultAllocator: Allocator<N, Dynamic, D> + Allocator<N, Dynamic>,
    {
        if self.indices.iter().any(|&i| i >= d.value()) {
            return Err("observation index out of state range");
        }

        let mut slots: Vec<usize> = Vec::with_capacity(self.z.len());
        let mut values: Vec<N> = Vec::with_capacity(self.z.len());
        let mut observed: Vec<usize> = Vec::with_capacity(self.z.len());
        for (slot, v) in self.z.iter().enumerate() {
            if let Some(value) = v {
                slots.push(slot);
                values.push(*value);
                observed.push(self.indices[slot]);
            }
        }
        if values.is_empty() {
            return Ok(None);
        }

        Ok(Some(DenseObservation {
            z: VectorN::from_vec_generic(Dynamic::new(values.len()), U1, values),
            Hx: observe_matrix(&observed, d)?,
            slots,
        }))
    }
}

/// Build the observation matrix selecting `indices` from a state of dimension `d`.
///
/// Row k of the matrix is all zeros except for a one at column `indices[k]`.
/// Duplicate indices are permitted, each produces its own row.
pub fn observe_matrix<N: RealField, D: Dim>(
    indices: &[usize],
    d: D,
) -> Result<MatrixMN<N, Dynamic, D>, &'static str>
where
    DefaultAllocator: Allocator<N, Dynamic, D>,
{
    if indices.iter().any(|&i| i >= d.value()) {
        return Err("observation index out of state range");
    }

    let mut Hx = MatrixMN::zeros_generic(Dynamic::new(indices.len()), d);
    for (r, &i) in indices.iter().enumerate() {
        Hx[(r, i)] = N::one();
    }

    Ok(Hx)
}
