use crate::api::gl::types::*;
use crate::api::Gl;
use crate::error::GlResult;
use crate::format::{GlFormat, PixelFormat};
use crate::handle::{BindRef, Category, Owned, ResourceHandle};
use crate::types::Vec2i;
use tracing::trace;

impl_handle_type!(
    /// Renderbuffer object name.
    pub struct Renderbuffer { kind: "renderbuffer", is: is_renderbuffer, delete: delete_renderbuffer }
);

impl Renderbuffer {
    pub fn create(
        gl: &Gl,
        target: GLenum,
        format: PixelFormat,
        size: Vec2i,
        samples: i32,
    ) -> GlResult<Owned<Renderbuffer>> {
        let glfmt = GlFormat::create(format, false);
        if !glfmt.is_valid() {
            return Err(gl_error!(InvalidFormat(format), "Renderbuffer::create"));
        }

        let renderbuffer = Owned::new(gl, Renderbuffer(gl.gen_renderbuffer()));
        gl.check("glGenRenderbuffers")?;
        let _bind = renderbuffer.bind(gl, target)?;
        gl.renderbuffer_storage_multisample(
            target,
            samples,
            glfmt.internal_format,
            size.x,
            size.y,
        );
        gl.check("glRenderbufferStorageMultisample")?;
        trace!(name = renderbuffer.raw(), ?format, samples, "created renderbuffer");
        Ok(renderbuffer)
    }

    pub fn bind(&self, gl: &Gl, target: GLenum) -> GlResult<BindRef> {
        let guard = BindRef::new(gl, target, self.0, |gl, target, name| {
            gl.bind_renderbuffer(target, name)
        });
        gl.check("glBindRenderbuffer")?;
        Ok(guard)
    }

    pub fn validate(gl: &Gl, handle: ResourceHandle) -> Option<Renderbuffer> {
        handle.validate(gl, Category::Renderbuffer).map(Renderbuffer)
    }

    pub fn to_handle(self) -> ResourceHandle {
        ResourceHandle::new(Category::Renderbuffer, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{gl, RecordingDriver};
    use crate::error::ErrorKind;
    use std::rc::Rc;

    #[test]
    fn storage_uses_translated_format() {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        let rb = Renderbuffer::create(
            &gl,
            gl::RENDERBUFFER,
            PixelFormat::D24_UNorm_S8_UInt,
            Vec2i::new(64, 32),
            4,
        )
        .unwrap();
        let call = driver
            .calls()
            .into_iter()
            .find(|c| c.name == "glRenderbufferStorageMultisample")
            .unwrap();
        assert_eq!(
            call.args,
            vec![gl::RENDERBUFFER as i64, 4, gl::DEPTH24_STENCIL8 as i64, 64, 32]
        );
        assert_eq!(driver.bound(gl::RENDERBUFFER), 0);
        assert_eq!(Renderbuffer::validate(&gl, rb.to_handle()), Some(rb.get()));
    }

    #[test]
    fn invalid_format() {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        let err = Renderbuffer::create(&gl, gl::RENDERBUFFER, PixelFormat::Unknown, Vec2i::new(1, 1), 0)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat(PixelFormat::Unknown));
        assert_eq!(driver.call_count("glGenRenderbuffers"), 0);
    }
}
