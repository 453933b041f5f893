use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::error::GlResult;
use crate::handle::{BindRef, Category, Owned, ResourceHandle};
use crate::types::AccessFlags;
use std::{ffi::c_void, slice};
use tracing::trace;

impl_handle_type!(
    /// Buffer object name.
    pub struct Buffer { kind: "buffer", is: is_buffer, delete: delete_buffer }
);

impl Buffer {
    /// Creates a buffer of `bytes` bytes bound to `target`, initialized from `data` if given.
    pub fn create(gl: &Gl, target: GLenum, data: Option<&[u8]>, bytes: usize) -> GlResult<Owned<Buffer>> {
        if let Some(data) = data {
            if bytes > data.len() {
                return Err(gl_error!(
                    InvalidParameter("initial data is smaller than the buffer"),
                    "Buffer::create"
                ));
            }
        }
        let buffer = Owned::new(gl, Buffer(gl.gen_buffer()));
        gl.check("glGenBuffers")?;
        let _bind = buffer.bind(gl, target)?;
        let usage = if data.is_some() {
            gl::STATIC_DRAW
        } else {
            gl::DYNAMIC_DRAW
        };
        gl.buffer_data(target, bytes as GLsizeiptr, data.map(|d| &d[..bytes]), usage);
        gl.check("glBufferData")?;
        trace!(name = buffer.raw(), target, bytes, "created buffer");
        Ok(buffer)
    }

    pub fn bind(&self, gl: &Gl, target: GLenum) -> GlResult<BindRef> {
        let guard = BindRef::new(gl, target, self.0, |gl, target, name| {
            gl.bind_buffer(target, name)
        });
        gl.check("glBindBuffer")?;
        Ok(guard)
    }

    pub fn validate(gl: &Gl, handle: ResourceHandle) -> Option<Buffer> {
        handle.validate(gl, Category::Buffer).map(Buffer)
    }

    pub fn to_handle(self) -> ResourceHandle {
        ResourceHandle::new(Category::Buffer, self.0)
    }

    /// Maps the buffer bound to `target`, the whole of it when `offset` and `length` are both 0.
    ///
    /// The buffer stays bound to `target` until the mapping is dropped. Whole-buffer mappings
    /// need `size`, the byte size of the buffer, to expose its contents.
    pub fn map(
        &self,
        gl: &Gl,
        target: GLenum,
        offset: usize,
        length: usize,
        size: usize,
        access: AccessFlags,
    ) -> GlResult<MappedBuffer> {
        let bind = self.bind(gl, target)?;
        let (ptr, len) = if offset == 0 && length == 0 {
            let ptr = gl.map_buffer(target, access.to_gl_access());
            gl.check("glMapBuffer")?;
            (ptr, size)
        } else {
            let ptr = gl.map_buffer_range(
                target,
                offset as GLintptr,
                length as GLsizeiptr,
                access.to_gl_bits(),
            );
            gl.check("glMapBufferRange")?;
            (ptr, length)
        };
        if ptr.is_null() {
            return Err(gl_error!(Null("mapping returned a null pointer"), "Buffer::map"));
        }
        Ok(MappedBuffer {
            gl: gl.clone(),
            target,
            ptr,
            len,
            unmapped: false,
            _bind: bind,
        })
    }

    /// Unmaps a mapping left open with [`MappedBuffer::leak`].
    pub fn unmap(&self, gl: &Gl, target: GLenum) -> GlResult<()> {
        let _bind = self.bind(gl, target)?;
        unmap(gl, target)
    }
}

/// A mapped range of a buffer. Unmapped when dropped, or explicitly with [`MappedBuffer::unmap`].
pub struct MappedBuffer {
    gl: Gl,
    target: GLenum,
    ptr: *mut c_void,
    len: usize,
    unmapped: bool,
    _bind: BindRef,
}

impl MappedBuffer {
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the driver keeps `len` bytes at `ptr` mapped until unmap
        unsafe { slice::from_raw_parts(self.ptr as *const u8, self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` keeps the slice unique
        unsafe { slice::from_raw_parts_mut(self.ptr as *mut u8, self.len) }
    }

    /// Keeps the buffer mapped past the lifetime of the guard; the caller unmaps it later.
    pub fn leak(mut self) -> *mut c_void {
        self.unmapped = true;
        self.ptr
    }

    pub fn unmap(mut self) -> GlResult<()> {
        self.unmapped = true;
        unmap(&self.gl, self.target)
    }
}

impl Drop for MappedBuffer {
    fn drop(&mut self) {
        if !self.unmapped {
            if let Err(e) = unmap(&self.gl, self.target) {
                tracing::warn!("failed to unmap buffer: {}", e);
            }
        }
    }
}

fn unmap(gl: &Gl, target: GLenum) -> GlResult<()> {
    let ok = gl.unmap_buffer(target);
    gl.check("glUnmapBuffer")?;
    if !ok {
        // the store was corrupted while mapped
        return Err(gl_error!(InvalidCall("buffer contents were lost while mapped"), "glUnmapBuffer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordingDriver;
    use crate::error::ErrorKind;
    use std::rc::Rc;

    fn recording() -> (Rc<RecordingDriver>, Gl) {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        (driver, gl)
    }

    #[test]
    fn create_uploads_and_restores_binding() {
        let (driver, gl) = recording();
        let buffer = Buffer::create(&gl, gl::ARRAY_BUFFER, Some(&[1, 2, 3, 4]), 4).unwrap();
        assert!(buffer.is_valid());
        assert_eq!(driver.buffer_contents(buffer.raw()).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(driver.bound(gl::ARRAY_BUFFER), 0);
        let usage = driver
            .calls()
            .into_iter()
            .find(|c| c.name == "glBufferData")
            .unwrap()
            .args[2];
        assert_eq!(usage, gl::STATIC_DRAW as i64);
    }

    #[test]
    fn create_without_data_is_dynamic() {
        let (driver, gl) = recording();
        let buffer = Buffer::create(&gl, gl::SHADER_STORAGE_BUFFER, None, 16).unwrap();
        assert_eq!(driver.buffer_contents(buffer.raw()).unwrap(), vec![0; 16]);
        let call = driver.calls().into_iter().find(|c| c.name == "glBufferData").unwrap();
        assert_eq!(call.args[2], gl::DYNAMIC_DRAW as i64);
    }

    #[test]
    fn short_data_is_rejected_before_any_call() {
        let (driver, gl) = recording();
        let err = Buffer::create(&gl, gl::ARRAY_BUFFER, Some(&[0; 4]), 8).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidParameter(_)));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn map_unmaps_on_drop() {
        let (driver, gl) = recording();
        let buffer = Buffer::create(&gl, gl::COPY_READ_BUFFER, Some(&[7; 8]), 8).unwrap();
        {
            let mut mapped = buffer
                .map(&gl, gl::COPY_READ_BUFFER, 0, 0, 8, AccessFlags::READ | AccessFlags::WRITE)
                .unwrap();
            assert!(driver.is_mapped(buffer.raw()));
            assert_eq!(mapped.as_bytes(), &[7; 8]);
            mapped.as_bytes_mut()[0] = 1;
        }
        assert!(!driver.is_mapped(buffer.raw()));
        assert_eq!(driver.buffer_contents(buffer.raw()).unwrap()[0], 1);
        assert_eq!(driver.bound(gl::COPY_READ_BUFFER), 0);
    }

    #[test]
    fn ranged_map_uses_access_bits() {
        let (driver, gl) = recording();
        let buffer = Buffer::create(&gl, gl::ARRAY_BUFFER, Some(&[0, 1, 2, 3]), 4).unwrap();
        let mapped = buffer.map(&gl, gl::ARRAY_BUFFER, 2, 2, 4, AccessFlags::READ).unwrap();
        assert_eq!(mapped.as_bytes(), &[2, 3]);
        let call = driver
            .calls()
            .into_iter()
            .find(|c| c.name == "glMapBufferRange")
            .unwrap();
        assert_eq!(call.args[3], gl::MAP_READ_BIT as i64);
        mapped.unmap().unwrap();
        assert!(!driver.is_mapped(buffer.raw()));
    }

    #[test]
    fn handle_round_trip() {
        let (_driver, gl) = recording();
        let buffer = Buffer::create(&gl, gl::ARRAY_BUFFER, None, 4).unwrap();
        let h = buffer.to_handle();
        assert_eq!(Buffer::validate(&gl, h), Some(buffer.get()));
        assert_eq!(
            crate::texture::Texture::validate(&gl, h),
            None
        );
    }
}
