//! Per-session executor of pipeline state, draws and transfers.
//!
//! OpenGL state is global, so the context keeps a shadow copy of what it last applied and only
//! issues native calls for the parts that change.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::{ext, Gl};
use crate::buffer::Buffer;
use crate::error::GlResult;
use crate::handle::{Category, ResourceHandle};
use crate::mapping::{Comparison, Cull, Fill, Primitive};
use crate::program::ProgramObject;
use crate::renderbuffer::Renderbuffer;
use crate::texture::Texture;
use crate::types::{
    BarrierFlags, Blend, ClearFlags, Color16, PipelineFlags, Rect, ShaderParameter, ShaderValue, Vec2i, Vec3i,
    Viewport,
};
use tracing::{trace, trace_span};

/// Pipeline flags that map to a `glEnable` capability.
const CAPS: &[(PipelineFlags, GLenum)] = &[
    (PipelineFlags::ALPHA_TO_COVERAGE, gl::SAMPLE_ALPHA_TO_COVERAGE),
    (PipelineFlags::BLEND, gl::BLEND),
    (PipelineFlags::SCISSOR, gl::SCISSOR_TEST),
    (PipelineFlags::DEPTH, gl::DEPTH_TEST),
    (PipelineFlags::STENCIL, gl::STENCIL_TEST),
    (PipelineFlags::CONSERVATIVE_RASTER, ext::CONSERVATIVE_RASTERIZATION_NV),
    (PipelineFlags::MULTISAMPLE, gl::MULTISAMPLE),
    (PipelineFlags::ANTIALIASED_LINE, gl::LINE_SMOOTH),
    (PipelineFlags::RENDERTARGET_SRGB, gl::FRAMEBUFFER_SRGB),
];

type IntBox = (GLint, GLint, GLsizei, GLsizei);

/// One rendering session on a device.
///
/// Owns none of the objects it operates on.
#[derive(Debug)]
pub struct Context {
    gl: Gl,
    dim: Vec2i,
    blend: Blend,
    blend_factor: [f32; 4],
    flags: PipelineFlags,
    cull: Cull,
    fill: Fill,
    depth_func: Comparison,
    depth_bias: (f32, f32),
    sample_mask: u32,
    framebuffer: GLuint,
    scissor: IntBox,
    scissor_enabled: bool,
    viewport: Viewport,
    primitive: Primitive,
    index_type: Option<GLenum>,
    program: GLuint,
    workgroup: Option<Vec3i>,
}

impl Context {
    /// A context whose shadow state matches a freshly created OpenGL context.
    pub fn new(gl: &Gl, dim: Vec2i) -> Context {
        Context {
            gl: gl.clone(),
            dim,
            blend: Blend::DEFAULT,
            blend_factor: [0.0; 4],
            flags: PipelineFlags::DEPTH_WRITE
                | PipelineFlags::FRONT_COUNTER_CLOCKWISE
                | PipelineFlags::DEPTH_CLIP
                | PipelineFlags::MULTISAMPLE,
            cull: Cull::None,
            fill: Fill::Fill,
            depth_func: Comparison::Less,
            depth_bias: (0.0, 0.0),
            sample_mask: !0,
            framebuffer: 0,
            scissor: (0, 0, dim.x, dim.y),
            scissor_enabled: false,
            viewport: Viewport {
                pos: [0.0; 3],
                dim: [dim.x as f32, dim.y as f32, 1.0],
            },
            primitive: Primitive::Triangle,
            index_type: None,
            program: 0,
            workgroup: None,
        }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    pub fn dim(&self) -> Vec2i {
        self.dim
    }

    pub fn resize(&mut self, dim: Vec2i) {
        self.dim = dim;
    }

    /// Program applied by the last pipeline, 0 if none.
    pub fn program(&self) -> GLuint {
        self.program
    }

    pub fn workgroup(&self) -> Option<Vec3i> {
        self.workgroup
    }

    pub fn framebuffer(&self) -> GLuint {
        self.framebuffer
    }

    pub fn index_type(&self) -> Option<GLenum> {
        self.index_type
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn blend_factor(&self) -> [f32; 4] {
        self.blend_factor
    }

    //----------------------------------------------------------------------------------------------

    /// Makes `program` current. A compute program carries its workgroup extent.
    pub fn use_program(&mut self, program: ProgramObject, workgroup: Option<Vec3i>) -> GlResult<()> {
        self.gl.use_program(program.raw());
        self.gl.check("glUseProgram")?;
        self.program = program.raw();
        self.workgroup = workgroup;
        Ok(())
    }

    /// Forgets the current pipeline.
    pub fn clear_program(&mut self) -> GlResult<()> {
        self.program = 0;
        self.workgroup = None;
        self.gl.use_program(0);
        self.gl.check("glUseProgram")
    }

    pub fn apply_primitive(&mut self, primitive: Primitive, index_type: Option<GLenum>) {
        self.primitive = primitive;
        self.index_type = index_type;
    }

    pub fn apply_blend(&mut self, blend: &Blend, factor: [f32; 4], force: bool) -> GlResult<()> {
        let gl = &self.gl;
        let last = self.blend;
        if force
            || (last.src, last.dst, last.src_alpha, last.dst_alpha)
                != (blend.src, blend.dst, blend.src_alpha, blend.dst_alpha)
        {
            gl.blend_func_separate(
                blend.src.to_gl(),
                blend.dst.to_gl(),
                blend.src_alpha.to_gl(),
                blend.dst_alpha.to_gl(),
            );
            gl.check("glBlendFuncSeparate")?;
        }
        if force || (last.op, last.op_alpha) != (blend.op, blend.op_alpha) {
            gl.blend_equation_separate(blend.op.to_gl(), blend.op_alpha.to_gl());
            gl.check("glBlendEquationSeparate")?;
        }
        if force || last.write_mask != blend.write_mask {
            let [r, g, b, a] = blend.mask();
            gl.color_mask(r, g, b, a);
            gl.check("glColorMask")?;
        }
        if force || self.blend_factor != factor {
            gl.blend_color(factor[0], factor[1], factor[2], factor[3]);
            gl.check("glBlendColor")?;
        }
        if force || last != *blend || self.blend_factor != factor {
            trace!(?blend, ?factor, "blend state");
        }
        self.blend = *blend;
        self.blend_factor = factor;
        Ok(())
    }

    pub fn apply_flags(&mut self, flags: PipelineFlags) -> GlResult<()> {
        let diff = self.flags ^ flags;
        if diff.is_empty() {
            return Ok(());
        }
        let gl = &self.gl;
        for &(flag, cap) in CAPS {
            if diff.contains(flag) {
                if flags.contains(flag) {
                    gl.enable(cap);
                    gl.check("glEnable")?;
                } else {
                    gl.disable(cap);
                    gl.check("glDisable")?;
                }
            }
        }
        if diff.contains(PipelineFlags::DEPTH_WRITE) {
            gl.depth_mask(flags.contains(PipelineFlags::DEPTH_WRITE));
            gl.check("glDepthMask")?;
        }
        if diff.contains(PipelineFlags::FRONT_COUNTER_CLOCKWISE) {
            let mode = if flags.contains(PipelineFlags::FRONT_COUNTER_CLOCKWISE) {
                gl::CCW
            } else {
                gl::CW
            };
            gl.front_face(mode);
            gl.check("glFrontFace")?;
        }
        if diff.contains(PipelineFlags::DEPTH_CLIP) {
            // clipping is the absence of clamping
            if flags.contains(PipelineFlags::DEPTH_CLIP) {
                gl.disable(gl::DEPTH_CLAMP);
                gl.check("glDisable")?;
            } else {
                gl.enable(gl::DEPTH_CLAMP);
                gl.check("glEnable")?;
            }
        }
        trace!(?flags, "pipeline flags");
        self.flags = flags;
        self.scissor_enabled = flags.contains(PipelineFlags::SCISSOR);
        Ok(())
    }

    pub fn apply_cull(&mut self, cull: Cull) -> GlResult<()> {
        if self.cull == cull {
            return Ok(());
        }
        let gl = &self.gl;
        if cull == Cull::None {
            gl.disable(gl::CULL_FACE);
            gl.check("glDisable")?;
        } else {
            if self.cull == Cull::None {
                gl.enable(gl::CULL_FACE);
                gl.check("glEnable")?;
            }
            gl.cull_face(cull.to_gl());
            gl.check("glCullFace")?;
        }
        trace!(?cull, "cull mode");
        self.cull = cull;
        Ok(())
    }

    pub fn apply_fill(&mut self, fill: Fill) -> GlResult<()> {
        if self.fill == fill {
            return Ok(());
        }
        self.gl.polygon_mode(gl::FRONT_AND_BACK, fill.to_gl());
        self.gl.check("glPolygonMode")?;
        trace!(?fill, "fill mode");
        self.fill = fill;
        Ok(())
    }

    /// `Comparison::Disabled` leaves the depth function alone.
    pub fn apply_depth_func(&mut self, func: Comparison) -> GlResult<()> {
        if func == Comparison::Disabled || self.depth_func == func {
            return Ok(());
        }
        self.gl.depth_func(func.to_gl());
        self.gl.check("glDepthFunc")?;
        trace!(?func, "depth function");
        self.depth_func = func;
        Ok(())
    }

    pub fn apply_depth_bias(&mut self, bias: f32, slope_scaled: f32) -> GlResult<()> {
        let (last_bias, last_slope) = self.depth_bias;
        if (last_bias, last_slope) == (bias, slope_scaled) {
            return Ok(());
        }
        let gl = &self.gl;
        let was_on = last_bias != 0.0 || last_slope != 0.0;
        let on = bias != 0.0 || slope_scaled != 0.0;
        if on != was_on {
            if on {
                gl.enable(gl::POLYGON_OFFSET_FILL);
                gl.check("glEnable")?;
            } else {
                gl.disable(gl::POLYGON_OFFSET_FILL);
                gl.check("glDisable")?;
            }
        }
        gl.polygon_offset(slope_scaled, bias);
        gl.check("glPolygonOffset")?;
        trace!(bias, slope_scaled, "depth bias");
        self.depth_bias = (bias, slope_scaled);
        Ok(())
    }

    pub fn apply_sample_mask(&mut self, mask: u32) -> GlResult<()> {
        if self.sample_mask == mask {
            return Ok(());
        }
        self.gl.sample_mask_i(0, mask);
        self.gl.check("glSampleMaski")?;
        trace!(mask, "sample mask");
        self.sample_mask = mask;
        Ok(())
    }

    pub fn apply_framebuffer(&mut self, framebuffer: GLuint) -> GlResult<()> {
        if self.framebuffer == framebuffer {
            return Ok(());
        }
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);
        self.gl.check("glBindFramebuffer")?;
        trace!(framebuffer, "render target");
        self.framebuffer = framebuffer;
        Ok(())
    }

    //----------------------------------------------------------------------------------------------

    fn graphics_program(&self, callsite: &'static str) -> GlResult<()> {
        if self.program == 0 || self.workgroup.is_some() {
            return Err(gl_error!(InvalidCall("no graphics pipeline applied"), callsite));
        }
        Ok(())
    }

    /// Instanced iff `instances` is not 0.
    pub fn draw_arrays(&self, vertices: u32, instances: u32, first_vertex: u32, first_instance: u32) -> GlResult<()> {
        self.graphics_program("Context::draw_arrays")?;
        let mode = self.primitive.to_gl();
        if instances != 0 {
            self.gl.draw_arrays_instanced_base_instance(
                mode,
                first_vertex as GLint,
                vertices as GLsizei,
                instances as GLsizei,
                first_instance,
            );
            self.gl.check("glDrawArraysInstancedBaseInstance")
        } else {
            self.gl.draw_arrays(mode, first_vertex as GLint, vertices as GLsizei);
            self.gl.check("glDrawArrays")
        }
    }

    pub fn draw_indexed(
        &self,
        indices: u32,
        instances: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) -> GlResult<()> {
        self.graphics_program("Context::draw_indexed")?;
        let ty = self
            .index_type
            .ok_or_else(|| gl_error!(InvalidCall("pipeline has no index buffer"), "Context::draw_indexed"))?;
        let mode = self.primitive.to_gl();
        let offset = first_index as usize * type_bytes(ty);
        if instances != 0 {
            self.gl.draw_elements_instanced_base_vertex_base_instance(
                mode,
                indices as GLsizei,
                ty,
                offset,
                instances as GLsizei,
                base_vertex,
                first_instance,
            );
            self.gl.check("glDrawElementsInstancedBaseVertexBaseInstance")
        } else {
            self.gl
                .draw_elements_base_vertex(mode, indices as GLsizei, ty, offset, base_vertex);
            self.gl.check("glDrawElementsBaseVertex")
        }
    }

    pub fn draw_mesh(&self, first: u32, count: u32) -> GlResult<()> {
        self.graphics_program("Context::draw_mesh")?;
        self.gl.draw_mesh_tasks(first, count);
        self.gl.check("glDrawMeshTasksNV")
    }

    pub fn dispatch(&self) -> GlResult<()> {
        let groups = self
            .workgroup
            .ok_or_else(|| gl_error!(InvalidCall("no compute pipeline applied"), "Context::dispatch"))?;
        let _span = trace_span!("dispatch", x = groups.x, y = groups.y, z = groups.z).entered();
        self.gl
            .dispatch_compute(groups.x as GLuint, groups.y as GLuint, groups.z as GLuint);
        self.gl.check("glDispatchCompute")
    }

    pub fn barrier(&self, flags: BarrierFlags) -> GlResult<()> {
        let bits = flags.to_gl();
        if bits == 0 {
            return Ok(());
        }
        self.gl.memory_barrier(bits);
        self.gl.check("glMemoryBarrier")
    }

    //----------------------------------------------------------------------------------------------

    /// Copies `bytes` bytes between two buffers.
    pub fn copy_subresource(
        &self,
        src: ResourceHandle,
        dst: ResourceHandle,
        src_offset: usize,
        dst_offset: usize,
        bytes: usize,
    ) -> GlResult<()> {
        const CALLSITE: &str = "Context::copy_subresource";
        if src.name_if(Category::Buffer).is_none() || dst.name_if(Category::Buffer).is_none() {
            return Err(gl_error!(CategoryMismatch, CALLSITE));
        }
        let gl = &self.gl;
        let src = Buffer::validate(gl, src).ok_or_else(|| gl_error!(InvalidParameter("source buffer is not live"), CALLSITE))?;
        let dst = Buffer::validate(gl, dst)
            .ok_or_else(|| gl_error!(InvalidParameter("destination buffer is not live"), CALLSITE))?;
        let _read = src.bind(gl, gl::COPY_READ_BUFFER)?;
        let _write = dst.bind(gl, gl::COPY_WRITE_BUFFER)?;
        gl.copy_buffer_sub_data(
            gl::COPY_READ_BUFFER,
            gl::COPY_WRITE_BUFFER,
            src_offset as GLintptr,
            dst_offset as GLintptr,
            bytes as GLsizeiptr,
        );
        gl.check("glCopyBufferSubData")
    }

    /// Copies a region between two textures or two renderbuffers.
    ///
    /// The region is 3D if `size.z` is set, 2D if `size.y` is, 1D otherwise.
    pub fn copy_resource_region(
        &self,
        src: ResourceHandle,
        dst: ResourceHandle,
        level: i32,
        src_offset: Vec3i,
        dst_offset: Vec3i,
        size: Vec3i,
    ) -> GlResult<()> {
        const CALLSITE: &str = "Context::copy_resource_region";
        let gl = &self.gl;
        let (src, dst, target) = match (src.category(), dst.category()) {
            (Some(Category::Texture), Some(Category::Texture)) => {
                let src = Texture::validate(gl, src)
                    .ok_or_else(|| gl_error!(InvalidParameter("source texture is not live"), CALLSITE))?;
                let dst = Texture::validate(gl, dst)
                    .ok_or_else(|| gl_error!(InvalidParameter("destination texture is not live"), CALLSITE))?;
                let target = if size.z != 0 {
                    gl::TEXTURE_3D
                } else if size.y != 0 {
                    gl::TEXTURE_2D
                } else {
                    gl::TEXTURE_1D
                };
                (src.raw(), dst.raw(), target)
            }
            (Some(Category::Renderbuffer), Some(Category::Renderbuffer)) => {
                let src = Renderbuffer::validate(gl, src)
                    .ok_or_else(|| gl_error!(InvalidParameter("source renderbuffer is not live"), CALLSITE))?;
                let dst = Renderbuffer::validate(gl, dst)
                    .ok_or_else(|| gl_error!(InvalidParameter("destination renderbuffer is not live"), CALLSITE))?;
                (src.raw(), dst.raw(), gl::RENDERBUFFER)
            }
            _ => return Err(gl_error!(CategoryMismatch, CALLSITE)),
        };
        gl.copy_image_sub_data(
            (src, target, level),
            src_offset.to_array(),
            (dst, target, level),
            dst_offset.to_array(),
            [size.x.max(1), size.y.max(1), size.z.max(1)],
        );
        gl.check("glCopyImageSubData")
    }

    /// Clears the current render target, restricted to `rects` if there are any.
    pub fn clear(&self, flags: ClearFlags, color: Color16, stencil: u8, depth: f32, rects: &[Rect]) -> GlResult<()> {
        let gl = &self.gl;
        if flags.contains(ClearFlags::COLOR) {
            let [r, g, b, a] = color_floats(color, false);
            gl.clear_color(r, g, b, a);
            gl.check("glClearColor")?;
        }
        if flags.contains(ClearFlags::DEPTH) {
            gl.clear_depth(depth as GLdouble);
            gl.check("glClearDepth")?;
        }
        if flags.contains(ClearFlags::STENCIL) {
            gl.clear_stencil(stencil as GLint);
            gl.check("glClearStencil")?;
        }

        let mask = flags.to_gl();
        if rects.is_empty() {
            gl.clear(mask);
            return gl.check("glClear");
        }

        if !self.scissor_enabled {
            gl.enable(gl::SCISSOR_TEST);
            gl.check("glEnable")?;
        }
        let cleared = rects.iter().try_for_each(|rect| {
            let (x, y, w, h) = rect.to_box();
            gl.scissor(x, y, w, h);
            gl.check("glScissor")?;
            gl.clear(mask);
            gl.check("glClear")
        });
        let (x, y, w, h) = self.scissor;
        gl.scissor(x, y, w, h);
        if !self.scissor_enabled {
            gl.disable(gl::SCISSOR_TEST);
        }
        cleared?;
        gl.check("glScissor")
    }

    /// Uploads parameters to the program of the current pipeline.
    pub fn set_shader_uniforms(&self, params: &[(ShaderParameter, ShaderValue)]) -> GlResult<()> {
        if self.program == 0 {
            return Err(gl_error!(InvalidCall("no pipeline applied"), "Context::set_shader_uniforms"));
        }
        let program = ProgramObject::from_raw(self.program);
        for (param, value) in params {
            program.push_parameter(&self.gl, param, value)?;
        }
        Ok(())
    }

    pub fn set_viewports(&mut self, viewports: &[Viewport]) -> GlResult<()> {
        let v = match viewports {
            [] => return Ok(()),
            [v] => *v,
            _ => return Err(gl_error!(NotImplemented("multiple viewports"), "Context::set_viewports")),
        };
        let (x, y, w, h) = Rect::new(v.pos[0], v.pos[1], v.pos[0] + v.dim[0], v.pos[1] + v.dim[1]).to_box();
        self.gl.viewport(x, y, w, h);
        self.gl.check("glViewport")?;
        self.viewport = v;
        Ok(())
    }

    pub fn set_scissors(&mut self, rects: &[Rect]) -> GlResult<()> {
        let rect = match rects {
            [] => return Ok(()),
            [r] => *r,
            _ => return Err(gl_error!(NotImplemented("multiple scissor rects"), "Context::set_scissors")),
        };
        let (x, y, w, h) = rect.to_box();
        self.gl.scissor(x, y, w, h);
        self.gl.check("glScissor")?;
        self.scissor = (x, y, w, h);
        Ok(())
    }

    /// Resets the viewport to the whole surface, scissored to `area` if given.
    pub fn begin_draw(&mut self, area: Option<&Rect>) -> GlResult<()> {
        let dim = self.dim;
        self.set_viewports(&[Viewport {
            pos: [0.0; 3],
            dim: [dim.x as f32, dim.y as f32, 1.0],
        }])?;
        if let Some(area) = area {
            self.set_scissors(&[*area])?;
            if !self.scissor_enabled {
                self.gl.enable(gl::SCISSOR_TEST);
                self.gl.check("glEnable")?;
                self.scissor_enabled = true;
                self.flags.insert(PipelineFlags::SCISSOR);
            }
        }
        Ok(())
    }

    pub fn end_draw(&self) -> GlResult<()> {
        self.gl.flush();
        self.gl.check("glFlush")
    }
}

//--------------------------------------------------------------------------------------------------

/// RGBA components in `[0, 1]`, optionally converted from sRGB to linear.
pub fn color_floats(color: impl Into<Color16>, linearize: bool) -> [f32; 4] {
    let c = color.into();
    let mut out = [
        c.r as f32 / 65535.0,
        c.g as f32 / 65535.0,
        c.b as f32 / 65535.0,
        c.a as f32 / 65535.0,
    ];
    if linearize {
        for v in out.iter_mut() {
            *v = to_linear_rgb(*v);
        }
    }
    out
}

pub fn to_linear_rgb(srgb: f32) -> f32 {
    if srgb <= 0.04045 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

pub fn to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Components of an attribute with `length` rows and `multi` columns.
pub fn multi_count(length: u32, multi: u32) -> u32 {
    length * multi.max(1)
}

/// Size in bytes of one element of type `ty`, 0 for unknown types.
pub fn type_bytes(ty: GLenum) -> usize {
    match ty {
        gl::BYTE | gl::UNSIGNED_BYTE => 1,
        gl::SHORT | gl::UNSIGNED_SHORT | gl::HALF_FLOAT => 2,
        gl::INT | gl::UNSIGNED_INT | gl::FLOAT => 4,
        gl::DOUBLE => 8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color8;

    #[test]
    fn color_conversion() {
        assert_eq!(color_floats(Color16::WHITE, false), [1.0; 4]);
        let c = color_floats(Color8::rgba(255, 0, 51, 0), false);
        assert_eq!(c, [1.0, 0.0, 0.2, 0.0]);
        let lin = color_floats(Color8::rgba(255, 0, 128, 255), true);
        assert!((lin[0] - 1.0).abs() < 1e-5);
        assert_eq!(lin[1], 0.0);
        assert!((lin[2] - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn srgb_round_trip() {
        for &v in &[0.0f32, 0.01, 0.2, 0.5, 0.73, 1.0] {
            assert!((to_srgb(to_linear_rgb(v)) - v).abs() < 1e-5);
        }
        assert!((to_linear_rgb(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn sizes() {
        assert_eq!(multi_count(4, 0), 4);
        assert_eq!(multi_count(4, 3), 12);
        assert_eq!(type_bytes(gl::UNSIGNED_SHORT), 2);
        assert_eq!(type_bytes(gl::DOUBLE), 8);
        assert_eq!(type_bytes(gl::RGBA), 0);
    }
}
