//! The seam to the external compute engine
//!
//! Everything compute-shaped lives behind this trait: lazily-computed array
//! handles tagged with a dtype and shape, a blocking force call, a small set
//! of elementwise and scatter kernels, and a raw buffer accessor that is
//! valid after forcing. The core only arranges calls into it; it never does
//! kernel math itself.

use crate::dtype::Dtype;
use crate::error::Result;
use crate::scalar::ScalarValue;
use crate::view::StridedView;

/// A borrowed look at an engine buffer after forcing.
#[derive(Debug, Clone)]
pub struct BufferView<'a> {
    pub bytes: &'a [u8],
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    /// Element strides; only final once the handle has been forced.
    pub strides: Vec<isize>,
    /// Element offset of the first logical element.
    pub offset: usize,
}

impl<'a> BufferView<'a> {
    /// Wrap the buffer in the strided-view machinery.
    pub fn as_strided(&self) -> Result<StridedView<'a>> {
        StridedView::new(self.bytes, &self.shape, &self.strides, self.offset, self.dtype)
    }
}

/// One step of an index expression. Resolution of these against a shape is
/// the engine's business, not the core's.
#[derive(Debug, Clone)]
pub enum IndexOp<H> {
    /// Single position along the next axis; negative counts from the end.
    Index(i64),
    /// Half-open range with step along the next axis.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: i64,
    },
    /// Consume as many full axes as needed to pad out the expression.
    Ellipsis,
    /// Insert a broadcast axis.
    NewAxis,
    /// Gather along the next axis with an integer array.
    Array(H),
}

impl<H> IndexOp<H> {
    /// Full range over one axis.
    pub fn full() -> Self {
        IndexOp::Slice {
            start: None,
            stop: None,
            step: 1,
        }
    }

    pub fn range(start: i64, stop: i64) -> Self {
        IndexOp::Slice {
            start: Some(start),
            stop: Some(stop),
            step: 1,
        }
    }
}

/// Outcome of index resolution: either no gather is needed, or a scatter
/// kernel must run over explicit index vectors.
///
/// The distinction carries semantics, not just performance: duplicate-index
/// behavior only exists when a real gather is present.
#[derive(Debug, Clone)]
pub enum GatherPlan<H> {
    /// The whole array is addressed.
    Full,
    /// One strided slice is addressed, no gather.
    Slice {
        starts: Vec<i64>,
        stops: Vec<i64>,
        strides: Vec<i64>,
    },
    /// A real gather: index arrays zipped over `axes`.
    Gather { indices: Vec<H>, axes: Vec<i32> },
}

/// The external compute engine.
///
/// Handles are opaque and lazily computed; [`Engine::force`] is the one
/// blocking call and must be made before [`Engine::buffer`] is meaningful.
/// Forcing is idempotent and never retriggers computation.
pub trait Engine: Clone {
    type Handle: Clone;

    // construction
    /// Copy a host buffer into engine ownership.
    fn from_bytes(&self, bytes: &[u8], shape: &[usize], dtype: Dtype) -> Result<Self::Handle>;
    /// Rank-0 array holding one scalar.
    fn scalar(&self, value: ScalarValue) -> Result<Self::Handle>;

    // metadata and materialization
    fn dtype(&self, h: &Self::Handle) -> Dtype;
    fn shape(&self, h: &Self::Handle) -> Vec<usize>;
    /// Block until the handle is materialized.
    fn force(&self, h: &Self::Handle) -> Result<()>;
    /// Raw buffer access; call [`Engine::force`] first.
    fn buffer<'a>(&self, h: &'a Self::Handle) -> Result<BufferView<'a>>;

    // elementwise kernels (broadcasting is the kernel's business)
    fn add(&self, a: &Self::Handle, b: &Self::Handle) -> Result<Self::Handle>;
    fn multiply(&self, a: &Self::Handle, b: &Self::Handle) -> Result<Self::Handle>;
    fn minimum(&self, a: &Self::Handle, b: &Self::Handle) -> Result<Self::Handle>;
    fn maximum(&self, a: &Self::Handle, b: &Self::Handle) -> Result<Self::Handle>;
    fn negative(&self, a: &Self::Handle) -> Result<Self::Handle>;
    fn reciprocal(&self, a: &Self::Handle) -> Result<Self::Handle>;
    /// Value conversion to another dtype: the one explicit cast step.
    fn astype(&self, a: &Self::Handle, dtype: Dtype) -> Result<Self::Handle>;

    // indexed kernels
    fn take(&self, a: &Self::Handle, indices: &Self::Handle, axis: i32) -> Result<Self::Handle>;
    /// Plain scatter: duplicate indices collapse last-write-wins.
    fn scatter(
        &self,
        dst: &Self::Handle,
        indices: &[Self::Handle],
        updates: &Self::Handle,
        axes: &[i32],
    ) -> Result<Self::Handle>;
    /// Accumulating scatters: every occurrence of a repeated index applies.
    fn scatter_add(
        &self,
        dst: &Self::Handle,
        indices: &[Self::Handle],
        updates: &Self::Handle,
        axes: &[i32],
    ) -> Result<Self::Handle>;
    fn scatter_prod(
        &self,
        dst: &Self::Handle,
        indices: &[Self::Handle],
        updates: &Self::Handle,
        axes: &[i32],
    ) -> Result<Self::Handle>;
    fn scatter_min(
        &self,
        dst: &Self::Handle,
        indices: &[Self::Handle],
        updates: &Self::Handle,
        axes: &[i32],
    ) -> Result<Self::Handle>;
    fn scatter_max(
        &self,
        dst: &Self::Handle,
        indices: &[Self::Handle],
        updates: &Self::Handle,
        axes: &[i32],
    ) -> Result<Self::Handle>;
    fn slice(
        &self,
        a: &Self::Handle,
        starts: &[i64],
        stops: &[i64],
        strides: &[i64],
    ) -> Result<Self::Handle>;
    fn slice_update(
        &self,
        dst: &Self::Handle,
        update: &Self::Handle,
        starts: &[i64],
        stops: &[i64],
        strides: &[i64],
    ) -> Result<Self::Handle>;

    // index resolution (the indexing collaborator)
    /// Resolve heterogeneous index operations against a shape. The core
    /// consumes the plan; it does not define indexing semantics.
    fn resolve_index(
        &self,
        shape: &[usize],
        ops: &[IndexOp<Self::Handle>],
    ) -> Result<GatherPlan<Self::Handle>>;

    // process-wide configuration forwarding
    fn memory_limit(&self) -> usize;
    /// Set the limit, returning the previous value.
    fn set_memory_limit(&self, limit: usize) -> usize;
    fn cache_limit(&self) -> usize;
    fn set_cache_limit(&self, limit: usize) -> usize;
}
