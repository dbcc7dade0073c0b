//! GPU vertex/index storage for a [`QuadBatch`].
//!
//! Storage only grows, and only when a frame's batch no longer fits. Growth is
//! tight: the new capacity is exactly the batch size. Frames that fit are
//! written in place from offset 0; unused trailing capacity is left as is.

use wgpu::util::DeviceExt;

use super::batch::{triangulate_quads, QuadBatch, Vertex};
use super::error::GraphicsError;
use super::RenderCtx;

/// Which of the two buffers an allocation is for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Minimal buffer API the pair needs from a graphics device.
pub trait BufferDevice {
    type Buffer;

    /// Largest buffer the device can allocate, in bytes.
    fn max_buffer_size(&self) -> u64;

    /// Allocates a buffer sized to `contents` and fills it.
    fn create_buffer(&self, kind: BufferKind, contents: &[u8]) -> Self::Buffer;

    /// Overwrites `contents.len()` bytes of `buffer` starting at `offset`.
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, contents: &[u8]);

    /// Releases a buffer's storage.
    fn destroy_buffer(&self, buffer: Self::Buffer);
}

impl BufferDevice for RenderCtx<'_> {
    type Buffer = wgpu::Buffer;

    fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    fn create_buffer(&self, kind: BufferKind, contents: &[u8]) -> wgpu::Buffer {
        let (label, usage) = match kind {
            BufferKind::Vertex => ("quadbatch vbo", wgpu::BufferUsages::VERTEX),
            BufferKind::Index => ("quadbatch ibo", wgpu::BufferUsages::INDEX),
        };
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: usage | wgpu::BufferUsages::COPY_DST,
        })
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, contents: &[u8]) {
        self.queue.write_buffer(buffer, offset, contents);
    }

    fn destroy_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}

/// Result of one [`GpuBufferPair::synchronize`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SyncOutcome {
    /// Batch was empty; nothing touched.
    Skipped,
    /// Existing storage was large enough and was partially rewritten.
    Updated { vertices: usize },
    /// Storage was replaced with a tight allocation of `capacity` vertices.
    Reallocated { capacity: usize },
}

/// Vertex + index buffers persisting across frames.
#[derive(Debug)]
pub struct GpuBufferPair<B> {
    vertex: Option<B>,
    index: Option<B>,
    /// Vertices the current storage was allocated for.
    capacity: usize,
    /// Triangle-list indices uploaded for the last synchronized batch.
    draw_index_count: u32,
    triangles: Vec<u32>,
}

impl<B> Default for GpuBufferPair<B> {
    fn default() -> Self {
        Self {
            vertex: None,
            index: None,
            capacity: 0,
            draw_index_count: 0,
            triangles: Vec::new(),
        }
    }
}

impl<B> GpuBufferPair<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex capacity of the current storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index count to pass to the draw call for the last synchronized batch.
    #[inline]
    pub fn draw_index_count(&self) -> u32 {
        self.draw_index_count
    }

    /// Current `(vertex, index)` storage, if any has been allocated.
    pub fn buffers(&self) -> Option<(&B, &B)> {
        Some((self.vertex.as_ref()?, self.index.as_ref()?))
    }

    /// Uploads `batch`, growing storage if it no longer fits.
    ///
    /// Must run once per frame after all quads are added and before drawing.
    pub fn synchronize<D>(
        &mut self,
        device: &D,
        batch: &QuadBatch,
    ) -> Result<SyncOutcome, GraphicsError>
    where
        D: BufferDevice<Buffer = B>,
    {
        let size = batch.vertex_count();
        if size == 0 {
            self.draw_index_count = 0;
            return Ok(SyncOutcome::Skipped);
        }

        let mut triangles = std::mem::take(&mut self.triangles);
        triangulate_quads(batch.indices(), &mut triangles);

        let outcome = self.upload(device, batch.vertices(), &triangles);
        if outcome.is_ok() {
            self.draw_index_count = triangles.len() as u32;
        }
        self.triangles = triangles;
        outcome
    }

    fn upload<D>(
        &mut self,
        device: &D,
        vertices: &[Vertex],
        triangles: &[u32],
    ) -> Result<SyncOutcome, GraphicsError>
    where
        D: BufferDevice<Buffer = B>,
    {
        let size = vertices.len();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(triangles);

        if let (Some(vbo), Some(ibo)) = (&self.vertex, &self.index) {
            if size <= self.capacity {
                device.write_buffer(vbo, 0, vertex_bytes);
                device.write_buffer(ibo, 0, index_bytes);
                return Ok(SyncOutcome::Updated { vertices: size });
            }
        }

        let limit = device.max_buffer_size();
        for requested in [vertex_bytes.len() as u64, index_bytes.len() as u64] {
            if requested > limit {
                return Err(GraphicsError::BufferTooLarge { requested, limit });
            }
        }

        let previous = self.capacity;
        self.release(device);

        self.vertex = Some(device.create_buffer(BufferKind::Vertex, vertex_bytes));
        self.index = Some(device.create_buffer(BufferKind::Index, index_bytes));

        log::debug!(
            "quad buffers reallocated: {} -> {} vertices ({} + {} bytes)",
            previous,
            size,
            vertex_bytes.len(),
            index_bytes.len()
        );
        self.capacity = size;

        Ok(SyncOutcome::Reallocated { capacity: size })
    }

    /// Destroys the current storage and drops capacity back to 0, so the
    /// next non-empty sync allocates from scratch.
    pub fn release<D>(&mut self, device: &D)
    where
        D: BufferDevice<Buffer = B>,
    {
        if let Some(vbo) = self.vertex.take() {
            device.destroy_buffer(vbo);
        }
        if let Some(ibo) = self.index.take() {
            device.destroy_buffer(ibo);
        }
        self.capacity = 0;
        self.draw_index_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::render::batch::{BatchConfig, Quad};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create { id: u32, kind: BufferKind, len: usize },
        Write { id: u32, offset: u64, len: usize },
        Destroy { id: u32 },
    }

    /// Records every buffer call; buffers are plain ids.
    struct RecordingDevice {
        limit: u64,
        next_id: Cell<u32>,
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingDevice {
        fn new() -> Self {
            Self::with_limit(u64::MAX)
        }

        fn with_limit(limit: u64) -> Self {
            Self {
                limit,
                next_id: Cell::new(0),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn take_calls(&self) -> Vec<Call> {
            self.calls.take()
        }
    }

    impl BufferDevice for RecordingDevice {
        type Buffer = u32;

        fn max_buffer_size(&self) -> u64 {
            self.limit
        }

        fn create_buffer(&self, kind: BufferKind, contents: &[u8]) -> u32 {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.calls.borrow_mut().push(Call::Create { id, kind, len: contents.len() });
            id
        }

        fn write_buffer(&self, buffer: &u32, offset: u64, contents: &[u8]) {
            self.calls.borrow_mut().push(Call::Write { id: *buffer, offset, len: contents.len() });
        }

        fn destroy_buffer(&self, buffer: u32) {
            self.calls.borrow_mut().push(Call::Destroy { id: buffer });
        }
    }

    const VERTEX_SIZE: usize = std::mem::size_of::<Vertex>();

    fn batch_of(quads: usize) -> QuadBatch {
        let mut b = QuadBatch::new(BatchConfig::default());
        for i in 0..quads {
            b.add_quad(Quad::scaled(i as f32, 0.0, 1.0).rotated(i as f32 * 10.0));
        }
        b
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();

        assert_eq!(pair.synchronize(&dev, &batch_of(0)).unwrap(), SyncOutcome::Skipped);
        assert!(dev.take_calls().is_empty());
        assert_eq!(pair.capacity(), 0);
        assert!(pair.buffers().is_none());
    }

    #[test]
    fn empty_batch_keeps_existing_storage() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();
        pair.synchronize(&dev, &batch_of(3)).unwrap();
        dev.take_calls();

        assert_eq!(pair.synchronize(&dev, &batch_of(0)).unwrap(), SyncOutcome::Skipped);
        assert!(dev.take_calls().is_empty());
        assert_eq!(pair.capacity(), 12);
        assert_eq!(pair.draw_index_count(), 0);
        assert!(pair.buffers().is_some());
    }

    #[test]
    fn first_frame_allocates_tightly() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();

        let outcome = pair.synchronize(&dev, &batch_of(2)).unwrap();
        assert_eq!(outcome, SyncOutcome::Reallocated { capacity: 8 });
        assert_eq!(pair.capacity(), 8);
        assert_eq!(pair.draw_index_count(), 12);
        assert_eq!(
            dev.take_calls(),
            vec![
                Call::Create { id: 0, kind: BufferKind::Vertex, len: 8 * VERTEX_SIZE },
                Call::Create { id: 1, kind: BufferKind::Index, len: 12 * 4 },
            ]
        );
    }

    #[test]
    fn fitting_batch_is_written_in_place() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();
        pair.synchronize(&dev, &batch_of(4)).unwrap();
        dev.take_calls();

        // same size
        assert_eq!(
            pair.synchronize(&dev, &batch_of(4)).unwrap(),
            SyncOutcome::Updated { vertices: 16 }
        );
        // smaller: only the live prefix is written, capacity stays
        assert_eq!(
            pair.synchronize(&dev, &batch_of(1)).unwrap(),
            SyncOutcome::Updated { vertices: 4 }
        );
        assert_eq!(pair.capacity(), 16);
        assert_eq!(pair.draw_index_count(), 6);

        assert_eq!(
            dev.take_calls(),
            vec![
                Call::Write { id: 0, offset: 0, len: 16 * VERTEX_SIZE },
                Call::Write { id: 1, offset: 0, len: 24 * 4 },
                Call::Write { id: 0, offset: 0, len: 4 * VERTEX_SIZE },
                Call::Write { id: 1, offset: 0, len: 6 * 4 },
            ]
        );
    }

    #[test]
    fn growth_replaces_storage_with_exact_capacity() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();
        pair.synchronize(&dev, &batch_of(2)).unwrap();
        dev.take_calls();

        let outcome = pair.synchronize(&dev, &batch_of(3)).unwrap();
        assert_eq!(outcome, SyncOutcome::Reallocated { capacity: 12 });
        assert_eq!(pair.capacity(), 12);
        assert_eq!(
            dev.take_calls(),
            vec![
                Call::Destroy { id: 0 },
                Call::Destroy { id: 1 },
                Call::Create { id: 2, kind: BufferKind::Vertex, len: 12 * VERTEX_SIZE },
                Call::Create { id: 3, kind: BufferKind::Index, len: 18 * 4 },
            ]
        );
        assert_eq!(pair.buffers(), Some((&2, &3)));
    }

    #[test]
    fn shrink_then_grow_within_capacity_never_reallocates() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();
        pair.synchronize(&dev, &batch_of(9)).unwrap();

        for quads in [1, 5, 9, 3] {
            let outcome = pair.synchronize(&dev, &batch_of(quads)).unwrap();
            assert_eq!(outcome, SyncOutcome::Updated { vertices: quads * 4 });
        }
        assert_eq!(pair.capacity(), 36);
    }

    #[test]
    fn oversized_allocation_fails_and_keeps_storage() {
        let limit = (4 * VERTEX_SIZE) as u64;
        let dev = RecordingDevice::with_limit(limit);
        let mut pair = GpuBufferPair::new();
        pair.synchronize(&dev, &batch_of(1)).unwrap();
        dev.take_calls();

        let err = pair.synchronize(&dev, &batch_of(2)).unwrap_err();
        assert!(matches!(
            err,
            GraphicsError::BufferTooLarge { requested, limit: l }
                if requested == (8 * VERTEX_SIZE) as u64 && l == limit
        ));
        assert!(dev.take_calls().is_empty());
        assert_eq!(pair.capacity(), 4);
        assert_eq!(pair.buffers(), Some((&0, &1)));
    }

    #[test]
    fn release_destroys_and_resets_capacity() {
        let dev = RecordingDevice::new();
        let mut pair = GpuBufferPair::new();
        pair.synchronize(&dev, &batch_of(2)).unwrap();
        dev.take_calls();

        pair.release(&dev);
        assert!(pair.buffers().is_none());
        assert_eq!(pair.capacity(), 0);
        assert_eq!(pair.draw_index_count(), 0);
        assert_eq!(dev.take_calls(), vec![Call::Destroy { id: 0 }, Call::Destroy { id: 1 }]);

        let outcome = pair.synchronize(&dev, &batch_of(1)).unwrap();
        assert_eq!(outcome, SyncOutcome::Reallocated { capacity: 4 });
        assert_eq!(pair.capacity(), 4);

        // grows again only once the batch outgrows the fresh storage
        assert_eq!(
            pair.synchronize(&dev, &batch_of(1)).unwrap(),
            SyncOutcome::Updated { vertices: 4 }
        );
    }
}
