use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::{ext, Gl};
use crate::error::GlResult;
use crate::format::{GlFormat, PixelFormat};
use crate::handle::{BindRef, Category, Owned, ResourceHandle};
use crate::mapping::{AddressMode, Comparison};
use crate::types::{Sampler, Vec2i};
use tracing::trace;

impl_handle_type!(
    /// Texture object name.
    pub struct Texture { kind: "texture", is: is_texture, delete: delete_texture }
);

fn is_multisample(target: GLenum) -> bool {
    target == gl::TEXTURE_2D_MULTISAMPLE || target == gl::PROXY_TEXTURE_2D_MULTISAMPLE
}

impl Texture {
    /// Creates a 2D texture with one level, or a multisample texture with `levels_or_samples`
    /// samples when `target` is a multisample target.
    #[allow(clippy::too_many_arguments)]
    pub fn create2d(
        gl: &Gl,
        target: GLenum,
        format: PixelFormat,
        srgb: bool,
        size: Vec2i,
        sampler: &Sampler,
        data: Option<&[u8]>,
        levels_or_samples: i32,
    ) -> GlResult<Owned<Texture>> {
        let glfmt = GlFormat::create(format, srgb);
        if !glfmt.is_valid() {
            return Err(gl_error!(InvalidFormat(format), "Texture::create2d"));
        }
        if let Some(data) = data {
            if !is_multisample(target) && data.len() < glfmt.image_bytes(size.x, size.y) {
                return Err(gl_error!(
                    InvalidParameter("image data is smaller than the texture"),
                    "Texture::create2d"
                ));
            }
        }

        let texture = Owned::new(gl, Texture(gl.gen_texture()));
        gl.check("glGenTextures")?;
        let _bind = texture.bind(gl, target)?;

        if is_multisample(target) {
            gl.tex_image_2d_multisample(
                target,
                levels_or_samples,
                glfmt.internal_format,
                size.x,
                size.y,
                true,
            );
            gl.check("glTexImage2DMultisample")?;
        } else {
            // rows of the source data are tightly packed
            let prev_unpack_alignment = gl.get_integer(gl::UNPACK_ALIGNMENT);
            gl.pixel_store(gl::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                target,
                0,
                glfmt.internal_format as GLint,
                size.x,
                size.y,
                glfmt.components,
                glfmt.ty,
                data,
            );
            let uploaded = gl.check("glTexImage2D");
            gl.pixel_store(gl::UNPACK_ALIGNMENT, prev_unpack_alignment);
            uploaded?;
            Texture::apply_sampler(gl, target, sampler)?;
        }

        trace!(name = texture.raw(), target, ?format, width = size.x, height = size.y, "created texture");
        Ok(texture)
    }

    pub fn bind(&self, gl: &Gl, target: GLenum) -> GlResult<BindRef> {
        let guard = BindRef::new(gl, target, self.0, |gl, target, name| {
            gl.bind_texture(target, name)
        });
        gl.check("glBindTexture")?;
        Ok(guard)
    }

    pub fn validate(gl: &Gl, handle: ResourceHandle) -> Option<Texture> {
        handle.validate(gl, Category::Texture).map(Texture)
    }

    pub fn to_handle(self) -> ResourceHandle {
        ResourceHandle::new(Category::Texture, self.0)
    }

    /// Applies filtering, level-of-detail, addressing and comparison state to the texture bound
    /// to `target`.
    pub fn apply_sampler(gl: &Gl, target: GLenum, sampler: &Sampler) -> GlResult<()> {
        let f = sampler.filter;
        let linear = |b: bool| (if b { gl::LINEAR } else { gl::NEAREST }) as GLint;

        gl.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, linear(f.mag_linear()));
        gl.check("glTexParameteri")?;
        gl.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, linear(f.min_linear()));
        gl.check("glTexParameteri")?;

        gl.tex_parameter_f(target, gl::TEXTURE_MAX_LOD, sampler.max_lod);
        gl.check("glTexParameterf")?;
        gl.tex_parameter_f(target, gl::TEXTURE_MIN_LOD, sampler.min_lod);
        gl.check("glTexParameterf")?;
        gl.tex_parameter_f(target, gl::TEXTURE_LOD_BIAS, sampler.mip_bias);
        gl.check("glTexParameterf")?;

        if f.anisotropic() {
            gl.tex_parameter_f(
                target,
                ext::TEXTURE_MAX_ANISOTROPY,
                sampler.max_anisotropy as GLfloat,
            );
            gl.check("glTexParameterf")?;
        }

        const WRAP: [GLenum; 3] = [gl::TEXTURE_WRAP_S, gl::TEXTURE_WRAP_T, gl::TEXTURE_WRAP_R];
        for (&pname, &raw) in WRAP.iter().zip(sampler.addressing.iter()) {
            if raw == 0 {
                continue;
            }
            let mode = AddressMode::from_raw(raw).ok_or_else(|| {
                gl_error!(InvalidParameter("texture address mode out of range"), "Texture::apply_sampler")
            })?;
            gl.tex_parameter_i(target, pname, mode.to_gl() as GLint);
            gl.check("glTexParameteri")?;
            if mode == AddressMode::Border {
                let c = crate::context::color_floats(sampler.border_color, false);
                gl.tex_parameter_fv(target, gl::TEXTURE_BORDER_COLOR, &c);
                gl.check("glTexParameterfv")?;
            }
        }

        if f.comparison() && sampler.comparison != Comparison::Disabled as u8 {
            gl.tex_parameter_i(
                target,
                gl::TEXTURE_COMPARE_MODE,
                gl::COMPARE_REF_TO_TEXTURE as GLint,
            );
            gl.check("glTexParameteri")?;
            let func = Comparison::from_raw(sampler.comparison)
                .ok_or_else(|| gl_error!(InvalidComparison(sampler.comparison), "Texture::apply_sampler"))?;
            gl.tex_parameter_i(target, gl::TEXTURE_COMPARE_FUNC, func.to_gl() as GLint);
            gl.check("glTexParameteri")?;
        }
        Ok(())
    }
}
