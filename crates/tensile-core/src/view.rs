//! Strided views over byte buffers and contiguous materialization
//!
//! A view never owns its buffer. It describes a logical N-dimensional array
//! inside borrowed bytes and knows how to copy that region out into a fresh
//! contiguous buffer, whatever the strides look like.

use log::trace;

use crate::dtype::Dtype;
use crate::error::{Error, Result};
use crate::layout::{
    contiguous_boundary_dim, element_count, physical_extent, row_major_strides, MAX_RANK,
};

/// Immutable descriptor of a strided region inside a byte buffer.
///
/// Strides are in elements and may be negative or zero; `offset` is the
/// element offset of the first logical element. The buffer reference is a
/// non-owning borrow: the view is valid only while its source is.
#[derive(Debug, Clone)]
pub struct StridedView<'a> {
    bytes: &'a [u8],
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
    dtype: Dtype,
}

impl<'a> StridedView<'a> {
    /// Create a view, validating that every reachable element offset stays
    /// inside the buffer.
    ///
    /// # Panics
    /// Panics if `shape` and `strides` differ in length or the rank exceeds
    /// [`MAX_RANK`]; both are programmer errors.
    pub fn new(
        bytes: &'a [u8],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        dtype: Dtype,
    ) -> Result<Self> {
        assert_eq!(shape.len(), strides.len(), "rank mismatch");
        assert!(shape.len() <= MAX_RANK, "rank exceeds MAX_RANK");

        let available = bytes.len() / dtype.size_of();
        if element_count(shape) > 0 {
            // Lowest and highest element offsets the view can touch.
            let mut lo = offset as isize;
            let mut hi = offset as isize;
            for (&n, &s) in shape.iter().zip(strides.iter()) {
                let span = (n as isize - 1) * s;
                if span >= 0 {
                    hi += span;
                } else {
                    lo += span;
                }
            }
            if lo < 0 || hi as usize >= available {
                return Err(Error::ShapeMismatch {
                    shape: shape.to_vec(),
                    expected: hi.max(0) as usize + 1,
                    got: available,
                });
            }
        }

        Ok(Self {
            bytes,
            shape: shape.to_vec(),
            strides: strides.to_vec(),
            offset,
            dtype,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Logical number of elements.
    pub fn size(&self) -> usize {
        element_count(&self.shape)
    }

    /// Buffer span in elements, which differs from [`StridedView::size`]
    /// for broadcast, offset or reversed views. Callers reading through the
    /// raw strides of a no-copy export size their accesses with this.
    pub fn physical_extent(&self) -> usize {
        physical_extent(&self.shape, &self.strides)
    }

    /// Copy the logical contents into a fresh contiguous row-major buffer.
    ///
    /// Contiguity is recomputed on every call; nothing is cached, because
    /// the strides of an engine buffer are only final once it has been
    /// forced.
    pub fn materialize_contiguous(&self) -> Vec<u8> {
        let item = self.dtype.size_of();
        let total = self.size();
        let mut out = vec![0u8; total * item];
        if total == 0 {
            return out;
        }

        let boundary = contiguous_boundary_dim(&self.shape, &self.strides);
        if boundary == 0 {
            let start = self.offset * item;
            out.copy_from_slice(&self.bytes[start..start + total * item]);
            return out;
        }

        // One flat run per index tuple over the dims before the boundary.
        let run: usize = self.shape[boundary..].iter().product();
        let run_bytes = run * item;
        trace!("materialize: boundary={boundary} run={run} of {total} elements");

        let mut index = [0usize; MAX_RANK];
        let mut dst = 0usize;
        loop {
            // Raw signed stride math reproduces reversed and offset views
            // with no special cases.
            let mut src = self.offset as isize;
            for d in 0..boundary {
                src += index[d] as isize * self.strides[d];
            }
            let start = src as usize * item;
            out[dst..dst + run_bytes].copy_from_slice(&self.bytes[start..start + run_bytes]);
            dst += run_bytes;

            // Odometer increment: innermost of the outer dims fastest,
            // carrying outward; done when the outermost would carry.
            let mut d = boundary;
            loop {
                if d == 0 {
                    return out;
                }
                d -= 1;
                index[d] += 1;
                if index[d] < self.shape[d] {
                    break;
                }
                index[d] = 0;
            }
        }
    }

    /// Export the view under a materialization policy.
    pub fn to_data(&self, policy: MaterializePolicy) -> ArrayData<'a> {
        let item = self.dtype.size_of();
        match policy {
            MaterializePolicy::Copy => ArrayData {
                buffer: BufferRef::Owned(self.materialize_contiguous()),
                dtype: self.dtype,
                shape: self.shape.clone(),
                strides: row_major_strides(&self.shape),
                offset: 0,
            },
            MaterializePolicy::NoCopyIfContiguous => {
                if contiguous_boundary_dim(&self.shape, &self.strides) == 0 {
                    let start = self.offset * item;
                    ArrayData {
                        buffer: BufferRef::Borrowed(
                            &self.bytes[start..start + self.size() * item],
                        ),
                        dtype: self.dtype,
                        shape: self.shape.clone(),
                        strides: row_major_strides(&self.shape),
                        offset: 0,
                    }
                } else {
                    self.to_data(MaterializePolicy::Copy)
                }
            }
            MaterializePolicy::NoCopyAlways => ArrayData {
                buffer: BufferRef::Borrowed(self.bytes),
                dtype: self.dtype,
                shape: self.shape.clone(),
                strides: self.strides.clone(),
                offset: self.offset,
            },
        }
    }
}

/// How [`StridedView::to_data`] may hand back the underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializePolicy {
    /// Independent contiguous buffer with its own lifetime.
    Copy,
    /// Borrow the source buffer when the view is already contiguous, fall
    /// back to a copy otherwise.
    NoCopyIfContiguous,
    /// Always borrow, reporting the raw (possibly non-canonical, possibly
    /// negative) strides. Never copies.
    NoCopyAlways,
}

/// The buffer behind an exported view: an owned copy, or a borrow that is
/// valid only while the source array lives.
#[derive(Debug)]
pub enum BufferRef<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl BufferRef<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            BufferRef::Owned(v) => v,
            BufferRef::Borrowed(b) => b,
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, BufferRef::Borrowed(_))
    }
}

/// Result of exporting a view under a [`MaterializePolicy`].
#[derive(Debug)]
pub struct ArrayData<'a> {
    pub buffer: BufferRef<'a>,
    pub dtype: Dtype,
    pub shape: Vec<usize>,
    /// Element strides of `buffer`; canonical row-major except under
    /// [`MaterializePolicy::NoCopyAlways`].
    pub strides: Vec<isize>,
    /// Element offset of the first logical element; nonzero only under
    /// [`MaterializePolicy::NoCopyAlways`].
    pub offset: usize,
}
