use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::error::GlResult;
use crate::handle::{BindRef, Category, Owned, ResourceHandle};
use crate::texture::Texture;
use std::convert::TryFrom;
use tracing::trace;

impl_handle_type!(
    /// Framebuffer object name.
    pub struct Framebuffer { kind: "framebuffer", is: is_framebuffer, delete: delete_framebuffer }
);

/// How colour images are attached to a framebuffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Texture target of the images (`TEXTURE_1D`, `TEXTURE_3D`, anything else attaches whole).
    pub texture_target: GLenum,
    pub level: GLint,
    /// Layer of 3D images.
    pub zoffset: GLint,
}

impl Attachment {
    pub const fn new(texture_target: GLenum) -> Attachment {
        Attachment {
            texture_target,
            level: 0,
            zoffset: 0,
        }
    }
}

impl Framebuffer {
    /// Creates a framebuffer with `textures` as its colour images.
    pub fn create(
        gl: &Gl,
        target: GLenum,
        attachment: Attachment,
        textures: &[Texture],
    ) -> GlResult<Owned<Framebuffer>> {
        let fb = Owned::new(gl, Framebuffer(gl.gen_framebuffer()));
        gl.check("glGenFramebuffers")?;
        fb.attach(gl, target, attachment, 0, textures)?;
        trace!(name = fb.raw(), target, count = textures.len(), "created framebuffer");
        Ok(fb)
    }

    /// Attaches `textures` after the `attached` colour images already present, and returns the
    /// new colour image count.
    pub fn attach(
        &self,
        gl: &Gl,
        target: GLenum,
        attachment: Attachment,
        attached: u32,
        textures: &[Texture],
    ) -> GlResult<u32> {
        let _bind = self.bind(gl, target)?;

        let max = gl.get_integer(gl::MAX_COLOR_ATTACHMENTS) as u32;
        let requested = match u32::try_from(textures.len()).ok().and_then(|n| attached.checked_add(n)) {
            Some(requested) if requested <= max => requested,
            requested => {
                let requested = requested.unwrap_or(u32::MAX);
                return Err(gl_error!(
                    TooManyRenderTargets { requested, max },
                    "Framebuffer::attach"
                ));
            }
        };

        for (i, tex) in textures.iter().enumerate() {
            let point = gl::COLOR_ATTACHMENT0 + attached + i as u32;
            match attachment.texture_target {
                gl::TEXTURE_1D => {
                    gl.framebuffer_texture_1d(target, point, gl::TEXTURE_1D, tex.raw(), attachment.level);
                    gl.check("glFramebufferTexture1D")?;
                }
                gl::TEXTURE_3D => {
                    gl.framebuffer_texture_3d(
                        target,
                        point,
                        gl::TEXTURE_3D,
                        tex.raw(),
                        attachment.level,
                        attachment.zoffset,
                    );
                    gl.check("glFramebufferTexture3D")?;
                }
                _ => {
                    gl.framebuffer_texture(target, point, tex.raw(), attachment.level);
                    gl.check("glFramebufferTexture")?;
                }
            }
        }

        let draw_buffers: Vec<GLenum> = (0..requested).map(|i| gl::COLOR_ATTACHMENT0 + i).collect();
        gl.draw_buffers(&draw_buffers);
        gl.check("glDrawBuffers")?;

        check_status(gl, target)?;
        Ok(requested)
    }

    /// Attaches a depth and/or stencil image.
    pub fn attach_depth_stencil(
        &self,
        gl: &Gl,
        target: GLenum,
        depth: bool,
        stencil: bool,
        texture: Texture,
    ) -> GlResult<()> {
        let point = match (depth, stencil) {
            (true, true) => gl::DEPTH_STENCIL_ATTACHMENT,
            (true, false) => gl::DEPTH_ATTACHMENT,
            (false, true) => gl::STENCIL_ATTACHMENT,
            (false, false) => {
                return Err(gl_error!(
                    InvalidParameter("neither depth nor stencil requested"),
                    "Framebuffer::attach_depth_stencil"
                ))
            }
        };
        let _bind = self.bind(gl, target)?;
        gl.framebuffer_texture(target, point, texture.raw(), 0);
        gl.check("glFramebufferTexture")?;
        check_status(gl, target)
    }

    pub fn bind(&self, gl: &Gl, target: GLenum) -> GlResult<BindRef> {
        let guard = BindRef::new(gl, target, self.0, |gl, target, name| {
            gl.bind_framebuffer(target, name)
        });
        gl.check("glBindFramebuffer")?;
        Ok(guard)
    }

    pub fn validate(gl: &Gl, handle: ResourceHandle) -> Option<Framebuffer> {
        handle.validate(gl, Category::Framebuffer).map(Framebuffer)
    }

    pub fn to_handle(self) -> ResourceHandle {
        ResourceHandle::new(Category::Framebuffer, self.0)
    }
}

fn check_status(gl: &Gl, target: GLenum) -> GlResult<()> {
    let status = gl.check_framebuffer_status(target);
    gl.check("glCheckFramebufferStatus")?;
    if status != gl::FRAMEBUFFER_COMPLETE {
        return Err(gl_error!(FramebufferIncomplete(status), "glCheckFramebufferStatus"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Driver, RecordingDriver};
    use crate::error::ErrorKind;
    use std::rc::Rc;

    fn recording() -> (Rc<RecordingDriver>, Gl) {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        (driver, gl)
    }

    fn textures(driver: &RecordingDriver, n: usize) -> Vec<Texture> {
        (0..n).map(|_| Texture::from_raw(driver.gen_texture())).collect()
    }

    #[test]
    fn colour_images_get_consecutive_attachment_points() {
        let (driver, gl) = recording();
        let tex = textures(&driver, 3);
        let fb = Framebuffer::create(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), &tex).unwrap();
        let points: Vec<i64> = driver
            .calls()
            .into_iter()
            .filter(|c| c.name == "glFramebufferTexture")
            .map(|c| c.args[1])
            .collect();
        assert_eq!(
            points,
            vec![
                gl::COLOR_ATTACHMENT0 as i64,
                gl::COLOR_ATTACHMENT1 as i64,
                gl::COLOR_ATTACHMENT2 as i64
            ]
        );
        let draw = driver.calls().into_iter().find(|c| c.name == "glDrawBuffers").unwrap();
        assert_eq!(draw.args.len(), 3);
        assert_eq!(driver.bound(gl::DRAW_FRAMEBUFFER), 0);
        assert!(fb.is_valid());
    }

    #[test]
    fn later_attachments_continue_the_count() {
        let (driver, gl) = recording();
        let fb = Framebuffer::create(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_1D), &textures(&driver, 2)).unwrap();
        driver.clear_calls();
        let count = fb
            .attach(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_1D), 2, &textures(&driver, 1))
            .unwrap();
        assert_eq!(count, 3);
        let call = driver
            .calls()
            .into_iter()
            .find(|c| c.name == "glFramebufferTexture1D")
            .unwrap();
        assert_eq!(call.args[1], gl::COLOR_ATTACHMENT2 as i64);
    }

    #[test]
    fn too_many_render_targets() {
        let (driver, gl) = recording();
        let max = driver.get_integer(gl::MAX_COLOR_ATTACHMENTS) as usize;
        let err = Framebuffer::create(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), &textures(&driver, max + 1))
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TooManyRenderTargets {
                requested: max as u32 + 1,
                max: max as u32
            }
        );
        assert_eq!(driver.call_count("glFramebufferTexture"), 0);
        // the half-built framebuffer is deleted with its owner
        assert_eq!(driver.call_count("glDeleteFramebuffers"), 1);
    }

    #[test]
    fn huge_attached_count_is_refused() {
        let (driver, gl) = recording();
        let fb = Framebuffer::create(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), &[]).unwrap();
        driver.clear_calls();
        let err = fb
            .attach(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), u32::MAX, &textures(&driver, 2))
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TooManyRenderTargets {
                requested: u32::MAX,
                max: 8
            }
        );
        assert_eq!(driver.call_count("glFramebufferTexture"), 0);
    }

    #[test]
    fn incomplete_status_is_reported() {
        let (driver, gl) = recording();
        driver.set_framebuffer_status(gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT);
        let err = Framebuffer::create(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), &[]).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::FramebufferIncomplete(gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT)
        );
    }

    #[test]
    fn depth_stencil_attachment_point() {
        let (driver, gl) = recording();
        let fb = Framebuffer::create(&gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), &textures(&driver, 1)).unwrap();
        let depth = textures(&driver, 1)[0];
        for &(d, s, point) in &[
            (true, true, gl::DEPTH_STENCIL_ATTACHMENT),
            (true, false, gl::DEPTH_ATTACHMENT),
            (false, true, gl::STENCIL_ATTACHMENT),
        ] {
            driver.clear_calls();
            fb.attach_depth_stencil(&gl, gl::FRAMEBUFFER, d, s, depth).unwrap();
            let call = driver
                .calls()
                .into_iter()
                .find(|c| c.name == "glFramebufferTexture")
                .unwrap();
            assert_eq!(call.args[1], point as i64);
        }
    }
}
