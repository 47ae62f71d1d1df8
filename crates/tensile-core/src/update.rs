//! Read-modify-write updates at resolved index positions
//!
//! `array.at(indices).add(value)` applies the op at every occurrence of a
//! repeated index, in contrast to direct indexed assignment where duplicates
//! collapse to last-write-wins. When resolution shows no actual gather, the
//! scatter kernel is skipped and the dense elementwise op runs instead --
//! which is also the only correct choice, since duplicate-index semantics
//! exist only under a real gather.

use log::debug;

use crate::array::{Array, Operand};
use crate::engine::{Engine, GatherPlan, IndexOp};
use crate::error::Result;

/// The read-modify-write operations an indexed update supports.
///
/// Subtract and divide have no kernels of their own: they are add of a
/// negated operand and multiply by a reciprocal operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Minimum,
    Maximum,
}

/// Update selector returned by [`Array::at`].
pub struct AtIndices<'a, E: Engine> {
    array: &'a Array<E>,
    ops: Vec<IndexOp<E::Handle>>,
}

impl<'a, E: Engine> AtIndices<'a, E> {
    pub(crate) fn new(array: &'a Array<E>, ops: Vec<IndexOp<E::Handle>>) -> Self {
        Self { array, ops }
    }

    pub fn add(&self, value: impl Into<Operand<E>>) -> Result<Array<E>> {
        self.apply(UpdateOp::Add, value.into())
    }

    pub fn subtract(&self, value: impl Into<Operand<E>>) -> Result<Array<E>> {
        self.apply(UpdateOp::Subtract, value.into())
    }

    pub fn multiply(&self, value: impl Into<Operand<E>>) -> Result<Array<E>> {
        self.apply(UpdateOp::Multiply, value.into())
    }

    pub fn divide(&self, value: impl Into<Operand<E>>) -> Result<Array<E>> {
        self.apply(UpdateOp::Divide, value.into())
    }

    pub fn minimum(&self, value: impl Into<Operand<E>>) -> Result<Array<E>> {
        self.apply(UpdateOp::Minimum, value.into())
    }

    pub fn maximum(&self, value: impl Into<Operand<E>>) -> Result<Array<E>> {
        self.apply(UpdateOp::Maximum, value.into())
    }

    fn apply(&self, op: UpdateOp, value: Operand<E>) -> Result<Array<E>> {
        let engine = self.array.engine();
        let shape = self.array.shape();
        let plan = engine.resolve_index(&shape, &self.ops)?;
        // Scalar values adopt the array's dtype before they reach a kernel.
        let value = self.array.operand_handle(value)?;

        let handle = match plan {
            GatherPlan::Full => {
                debug!("indexed update covers the whole array; dense path");
                dense(engine, self.array.handle(), op, &value)?
            }
            GatherPlan::Slice {
                starts,
                stops,
                strides,
            } => {
                debug!("indexed update is a single slice; dense path");
                let sub = engine.slice(self.array.handle(), &starts, &stops, &strides)?;
                let updated = dense(engine, &sub, op, &value)?;
                engine.slice_update(self.array.handle(), &updated, &starts, &stops, &strides)?
            }
            GatherPlan::Gather { indices, axes } => {
                debug!("indexed update gathers; scatter kernel path");
                let dst = self.array.handle();
                match op {
                    UpdateOp::Add => engine.scatter_add(dst, &indices, &value, &axes)?,
                    UpdateOp::Subtract => {
                        let negated = engine.negative(&value)?;
                        engine.scatter_add(dst, &indices, &negated, &axes)?
                    }
                    UpdateOp::Multiply => engine.scatter_prod(dst, &indices, &value, &axes)?,
                    UpdateOp::Divide => {
                        let reciprocal = engine.reciprocal(&value)?;
                        engine.scatter_prod(dst, &indices, &reciprocal, &axes)?
                    }
                    UpdateOp::Minimum => engine.scatter_min(dst, &indices, &value, &axes)?,
                    UpdateOp::Maximum => engine.scatter_max(dst, &indices, &value, &axes)?,
                }
            }
        };
        Ok(Array::from_parts(engine.clone(), handle))
    }
}

/// Dense elementwise application of an update op on a (broadcast) value.
fn dense<E: Engine>(
    engine: &E,
    target: &E::Handle,
    op: UpdateOp,
    value: &E::Handle,
) -> Result<E::Handle> {
    match op {
        UpdateOp::Add => engine.add(target, value),
        UpdateOp::Subtract => {
            let negated = engine.negative(value)?;
            engine.add(target, &negated)
        }
        UpdateOp::Multiply => engine.multiply(target, value),
        UpdateOp::Divide => {
            let reciprocal = engine.reciprocal(value)?;
            engine.multiply(target, &reciprocal)
        }
        UpdateOp::Minimum => engine.minimum(target, value),
        UpdateOp::Maximum => engine.maximum(target, value),
    }
}
