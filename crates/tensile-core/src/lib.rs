//! Tensile core - strided-array host layer over an external compute engine
//!
//! This crate owns the parts of an array library that live on the host: the
//! closed dtype set and its numeric limits, the rules for combining bare
//! scalars with dtypes and arrays, strided views with contiguity analysis
//! and the N-dimensional copy that materializes them, and the coordinator
//! that turns `at(indices).op(value)` into scatter kernels or dense
//! fallbacks. Everything compute-shaped sits behind the [`Engine`] trait.

pub mod array;
pub mod dtype;
pub mod engine;
pub mod error;
pub mod layout;
pub mod scalar;
pub mod update;
pub mod view;

pub use array::{Array, Operand};
pub use dtype::{Dtype, Element, FloatLimits};
pub use engine::{BufferView, Engine, GatherPlan, IndexOp};
pub use error::{Error, Result};
pub use scalar::{resolve, resolve_with_dtype, Scalar, ScalarValue};
pub use update::{AtIndices, UpdateOp};
pub use view::{ArrayData, BufferRef, MaterializePolicy, StridedView};
