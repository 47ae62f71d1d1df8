//! The user-facing array type over an engine handle
//!
//! Every operation returns a new `Array`; nothing mutates in place. The
//! engine is the only thing that ever computes; this type arranges
//! promotion, forcing and materialization around it.

use num_complex::Complex32;

use crate::dtype::{Dtype, Element};
use crate::engine::{Engine, GatherPlan, IndexOp};
use crate::error::{Error, Result};
use crate::layout::element_count;
use crate::scalar::{self, Scalar};
use crate::update::AtIndices;
use crate::view::{ArrayData, MaterializePolicy};

/// An N-dimensional array backed by an external engine handle.
#[derive(Clone)]
pub struct Array<E: Engine> {
    engine: E,
    handle: E::Handle,
}

impl<E: Engine> std::fmt::Debug for Array<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array")
            .field("dtype", &self.dtype())
            .field("shape", &self.shape())
            .finish()
    }
}

impl<E: Engine> Array<E> {
    pub(crate) fn from_parts(engine: E, handle: E::Handle) -> Self {
        Self { engine, handle }
    }

    /// Construct from a host buffer; the data is copied into engine
    /// ownership.
    pub fn from_slice<T: Element>(engine: E, data: &[T], shape: &[usize]) -> Result<Self> {
        let expected = element_count(shape);
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                shape: shape.to_vec(),
                expected,
                got: data.len(),
            });
        }
        let repr: Vec<T::Repr> = data.iter().map(|&v| v.to_repr()).collect();
        let bytes: &[u8] = bytemuck::cast_slice(&repr);
        let handle = engine.from_bytes(bytes, shape, T::DTYPE)?;
        Ok(Self { engine, handle })
    }

    /// Materialize a bare scalar as a rank-0 array.
    ///
    /// With `dtype` present this is the explicit construction path (bools
    /// become 1/0 under the requested dtype); without it the literal's
    /// default dtype applies.
    pub fn from_scalar(engine: E, scalar: impl Into<Scalar>, dtype: Option<Dtype>) -> Result<Self> {
        let scalar = scalar.into();
        let value = match dtype {
            Some(dtype) => scalar::resolve_with_dtype(scalar, dtype)?,
            None => scalar::resolve(scalar, None)?,
        };
        let handle = engine.scalar(value)?;
        Ok(Self { engine, handle })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn handle(&self) -> &E::Handle {
        &self.handle
    }

    pub fn dtype(&self) -> Dtype {
        self.engine.dtype(&self.handle)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.engine.shape(&self.handle)
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Logical number of elements.
    pub fn size(&self) -> usize {
        element_count(&self.shape())
    }

    /// Flattened contiguous read-out.
    ///
    /// Forces the handle, then copies the logical contents out through the
    /// strided machinery. Fails with [`Error::TypeMismatch`] when `T` is not
    /// exactly the array's dtype; no implicit cast is ever inserted here.
    pub fn as_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype() {
            return Err(Error::TypeMismatch {
                expected: self.dtype(),
                got: T::DTYPE,
            });
        }
        self.engine.force(&self.handle)?;
        let buffer = self.engine.buffer(&self.handle)?;
        let bytes = buffer.as_strided()?.materialize_contiguous();
        let repr: Vec<T::Repr> = bytemuck::pod_collect_to_vec(&bytes);
        Ok(repr.into_iter().map(T::from_repr).collect())
    }

    /// Extract the single element of a one-element array.
    pub fn item<T: Element>(&self) -> Result<T> {
        let values = self.as_vec::<T>()?;
        if values.len() != 1 {
            return Err(Error::ShapeMismatch {
                shape: self.shape(),
                expected: 1,
                got: values.len(),
            });
        }
        Ok(values[0])
    }

    /// Export the underlying buffer under a materialization policy.
    ///
    /// Forces the handle first; the strides a policy sees are only final
    /// after that. A borrowed result is valid only while `self` lives, and
    /// the caller must not rebind the source while holding it.
    pub fn as_data(&self, policy: MaterializePolicy) -> Result<ArrayData<'_>> {
        self.engine.force(&self.handle)?;
        let buffer = self.engine.buffer(&self.handle)?;
        Ok(buffer.as_strided()?.to_data(policy))
    }

    /// Convert to another dtype: the one explicit cast step.
    pub fn astype(&self, dtype: Dtype) -> Result<Self> {
        let handle = self.engine.astype(&self.handle, dtype)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    // -- elementwise -------------------------------------------------------

    pub fn add(&self, rhs: impl Into<Operand<E>>) -> Result<Self> {
        let rhs = self.operand_handle(rhs.into())?;
        let handle = self.engine.add(&self.handle, &rhs)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    /// Subtract is add of the negated operand; there is no separate kernel.
    pub fn subtract(&self, rhs: impl Into<Operand<E>>) -> Result<Self> {
        let rhs = self.operand_handle(rhs.into())?;
        let negated = self.engine.negative(&rhs)?;
        let handle = self.engine.add(&self.handle, &negated)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    pub fn multiply(&self, rhs: impl Into<Operand<E>>) -> Result<Self> {
        let rhs = self.operand_handle(rhs.into())?;
        let handle = self.engine.multiply(&self.handle, &rhs)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    /// Divide is multiply by the reciprocal operand; there is no separate
    /// kernel.
    pub fn divide(&self, rhs: impl Into<Operand<E>>) -> Result<Self> {
        let rhs = self.operand_handle(rhs.into())?;
        let reciprocal = self.engine.reciprocal(&rhs)?;
        let handle = self.engine.multiply(&self.handle, &reciprocal)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    pub fn minimum(&self, rhs: impl Into<Operand<E>>) -> Result<Self> {
        let rhs = self.operand_handle(rhs.into())?;
        let handle = self.engine.minimum(&self.handle, &rhs)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    pub fn maximum(&self, rhs: impl Into<Operand<E>>) -> Result<Self> {
        let rhs = self.operand_handle(rhs.into())?;
        let handle = self.engine.maximum(&self.handle, &rhs)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    // -- indexed operations ------------------------------------------------

    /// Gather elements along an axis.
    pub fn take(&self, indices: &Array<E>, axis: i32) -> Result<Self> {
        let handle = self.engine.take(&self.handle, &indices.handle, axis)?;
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    /// Direct indexed assignment: duplicate indices collapse last-write-wins.
    pub fn index_assign(
        &self,
        ops: &[IndexOp<E::Handle>],
        value: impl Into<Operand<E>>,
    ) -> Result<Self> {
        let shape = self.shape();
        let plan = self.engine.resolve_index(&shape, ops)?;
        let value = self.operand_handle(value.into())?;
        let handle = match plan {
            GatherPlan::Full => {
                let starts = vec![0i64; shape.len()];
                let stops: Vec<i64> = shape.iter().map(|&n| n as i64).collect();
                let strides = vec![1i64; shape.len()];
                self.engine
                    .slice_update(&self.handle, &value, &starts, &stops, &strides)?
            }
            GatherPlan::Slice {
                starts,
                stops,
                strides,
            } => self
                .engine
                .slice_update(&self.handle, &value, &starts, &stops, &strides)?,
            GatherPlan::Gather { indices, axes } => {
                self.engine.scatter(&self.handle, &indices, &value, &axes)?
            }
        };
        Ok(Self::from_parts(self.engine.clone(), handle))
    }

    /// Read-modify-write update selector: every occurrence of a repeated
    /// index is applied, unlike [`Array::index_assign`].
    pub fn at(&self, ops: Vec<IndexOp<E::Handle>>) -> AtIndices<'_, E> {
        AtIndices::new(self, ops)
    }

    /// Coerce an operand for combination with this array. A bare scalar
    /// adopts this array's dtype (weak scalar typing; the array wins); an
    /// array operand is passed through as-is, further promotion being the
    /// kernel's business.
    pub(crate) fn operand_handle(&self, operand: Operand<E>) -> Result<E::Handle> {
        match operand {
            Operand::Scalar(s) => {
                let value = s.for_array(self.dtype())?;
                self.engine.scalar(value)
            }
            Operand::Array(a) => Ok(a.handle),
        }
    }
}

/// Right-hand operand of an elementwise or update operation.
#[derive(Debug, Clone)]
pub enum Operand<E: Engine> {
    Scalar(Scalar),
    Array(Array<E>),
}

impl<E: Engine> From<&Array<E>> for Operand<E> {
    fn from(a: &Array<E>) -> Self {
        Operand::Array(a.clone())
    }
}

impl<E: Engine> From<Array<E>> for Operand<E> {
    fn from(a: Array<E>) -> Self {
        Operand::Array(a)
    }
}

macro_rules! scalar_operand {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<E: Engine> From<$ty> for Operand<E> {
                fn from(v: $ty) -> Self {
                    Operand::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

scalar_operand!(bool, i32, i64, f32, f64, Complex32);

impl<E: Engine> From<&Array<E>> for IndexOp<E::Handle> {
    fn from(a: &Array<E>) -> Self {
        IndexOp::Array(a.handle().clone())
    }
}
