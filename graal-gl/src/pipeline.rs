//! Pipeline compilation: immutable program + vertex input + fixed-function state, compiled once
//! and applied to a [`Context`] any number of times.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::buffer::Buffer;
use crate::context::{color_floats, Context};
use crate::error::GlResult;
use crate::framebuffer::Framebuffer;
use crate::handle::{Category, Owned, ResourceHandle};
use crate::mapping::{self, Comparison, Cull, Fill, Primitive, ShaderStage, StencilOp};
use crate::program::ProgramObject;
use crate::shader::ShaderObject;
use crate::types::{Blend, Color16, PipelineFlags, PipelineMembers, Vec3i, VertexParameter};
use crate::vertex_array::{VertexArrayObject, VertexBuffer};
use tracing::{debug, trace_span};

/// Boundary description of a graphics pipeline.
///
/// Enumerated fields carry their raw boundary value; only the fields flagged in `members` are
/// read. Shader slots are indexed by [`ShaderStage`] and a zero name means the stage is absent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PipelineDesc {
    pub members: PipelineMembers,
    pub shaders: [ShaderObject; ShaderStage::COUNT],
    pub blend_factor: Color16,
    pub flags: PipelineFlags,
    pub sample_mask: u32,
    pub stencil_ref: u32,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub stencil_fail_op: u8,
    pub stencil_depth_fail_op: u8,
    pub stencil_pass_op: u8,
    pub stencil_func: u8,
    pub depth_func: u8,
    pub fill: u8,
    pub cull: u8,
    pub primitive: u8,
    pub depth_bias: i32,
    pub slope_scaled_depth_bias: f32,
    /// Ignored: there is only ever one device.
    pub node_mask: u32,
}

impl PipelineDesc {
    pub fn shader(&self, stage: ShaderStage) -> Option<ShaderObject> {
        let shader = self.shaders[stage as usize];
        if shader.raw() != 0 {
            Some(shader)
        } else {
            None
        }
    }

    pub fn with_shader(mut self, stage: ShaderStage, shader: ShaderObject) -> PipelineDesc {
        self.shaders[stage as usize] = shader;
        self
    }

    fn has(&self, member: PipelineMembers) -> bool {
        self.members.contains(member)
    }
}

/// Decodes a field if `member` is flagged, failing with `err` on an out-of-range value.
#[track_caller]
fn decode<T>(
    desc: &PipelineDesc,
    member: PipelineMembers,
    raw: u8,
    from_raw: fn(u8) -> Option<T>,
    err: fn(u8) -> crate::error::ErrorKind,
) -> GlResult<Option<T>> {
    if !desc.has(member) {
        return Ok(None);
    }
    match from_raw(raw) {
        Some(v) => Ok(Some(v)),
        None => Err(crate::error::GlError::new(err(raw), "PipelineState::create")),
    }
}

/// A compiled graphics pipeline.
///
/// Owns its program and vertex array. The render target and buffers it reads from are only
/// referenced and must outlive it.
#[derive(Debug)]
pub struct PipelineState {
    members: PipelineMembers,
    program: Owned<ProgramObject>,
    vao: Owned<VertexArrayObject>,
    render_target: Option<Framebuffer>,
    index_type: Option<GLenum>,
    blend: Blend,
    blend_factor: Option<[f32; 4]>,
    flags: Option<PipelineFlags>,
    cull: Option<Cull>,
    fill: Option<Fill>,
    primitive: Primitive,
    depth_func: Option<Comparison>,
    stencil_func: Option<Comparison>,
    stencil_ref: Option<u32>,
    stencil_read_mask: Option<u8>,
    stencil_write_mask: Option<u8>,
    stencil_ops: Option<[StencilOp; 3]>,
    depth_bias: Option<(f32, f32)>,
    sample_mask: Option<u32>,
}

impl PipelineState {
    /// Compiles a graphics pipeline.
    ///
    /// Everything that can be checked without the driver is checked before the first native call.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        gl: &Gl,
        desc: &PipelineDesc,
        render_target: ResourceHandle,
        blend: Blend,
        vertex_buffers: &[(ResourceHandle, u32)],
        attributes: &[VertexParameter],
        index_buffer: ResourceHandle,
        index_stride: u8,
    ) -> GlResult<PipelineState> {
        const CALLSITE: &str = "PipelineState::create";

        let index_type = match (mapping::index_type(index_stride), index_buffer.is_null()) {
            (Some(ty), false) => Some(ty),
            (Some(_), true) => None,
            (None, true) if index_stride == 0 => None,
            _ => return Err(gl_error!(InvalidIndexStride(index_stride), CALLSITE)),
        };

        use crate::error::ErrorKind as K;
        let primitive = decode(desc, PipelineMembers::PRIMITIVE, desc.primitive, Primitive::from_raw, K::InvalidPrimitive)?;
        let depth_func = decode(desc, PipelineMembers::DEPTH_FUNC, desc.depth_func, Comparison::from_raw, K::InvalidDepthFunc)?;
        let stencil_func = decode(desc, PipelineMembers::STENCIL_FUNC, desc.stencil_func, Comparison::from_raw, K::InvalidStencilFunc)?;
        let fail_op = decode(desc, PipelineMembers::STENCIL_OP, desc.stencil_fail_op, StencilOp::from_raw, K::InvalidStencilFailOp)?;
        let depth_fail_op = decode(
            desc,
            PipelineMembers::STENCIL_OP,
            desc.stencil_depth_fail_op,
            StencilOp::from_raw,
            K::InvalidStencilDepthFailOp,
        )?;
        let pass_op = decode(desc, PipelineMembers::STENCIL_OP, desc.stencil_pass_op, StencilOp::from_raw, K::InvalidStencilPassOp)?;
        let fill = decode(desc, PipelineMembers::FILL, desc.fill, Fill::from_raw, |_| {
            K::InvalidParameter("invalid fill mode")
        })?;
        let cull = decode(desc, PipelineMembers::CULL, desc.cull, Cull::from_raw, |_| {
            K::InvalidParameter("invalid cull mode")
        })?;

        if desc.shader(ShaderStage::Vertex).is_none() {
            return Err(gl_error!(
                InvalidParameter("Can't have a null vertex shader on graphics pipeline!"),
                CALLSITE
            ));
        }

        if !render_target.is_null() && render_target.name_if(Category::Framebuffer).is_none() {
            return Err(gl_error!(CategoryMismatch, CALLSITE));
        }
        if !index_buffer.is_null() && index_buffer.name_if(Category::Buffer).is_none() {
            return Err(gl_error!(CategoryMismatch, CALLSITE));
        }
        if vertex_buffers
            .iter()
            .any(|(vb, _)| vb.name_if(Category::Buffer).is_none())
        {
            return Err(gl_error!(CategoryMismatch, CALLSITE));
        }

        // structural checks passed, from here on the driver is involved
        let _span = trace_span!("create_pipeline", members = desc.members.bits()).entered();

        let render_target = if render_target.is_null() {
            None
        } else {
            Some(
                Framebuffer::validate(gl, render_target)
                    .ok_or_else(|| gl_error!(InvalidParameter("render target is not live"), CALLSITE))?,
            )
        };
        let index_buffer = if index_buffer.is_null() {
            None
        } else {
            Some(
                Buffer::validate(gl, index_buffer)
                    .ok_or_else(|| gl_error!(InvalidParameter("index buffer is not live"), CALLSITE))?,
            )
        };
        let vertex_buffers = vertex_buffers
            .iter()
            .map(|&(handle, stride)| {
                Buffer::validate(gl, handle)
                    .map(|buffer| VertexBuffer { buffer, stride })
                    .ok_or_else(|| gl_error!(InvalidParameter("vertex buffer is not live"), CALLSITE))
            })
            .collect::<GlResult<Vec<_>>>()?;

        let program = ProgramObject::create(gl)?;
        for stage in ShaderStage::ALL {
            if let Some(shader) = desc.shader(*stage) {
                program.attach(gl, shader)?;
            }
        }
        program.link(gl)?;

        let vao = VertexArrayObject::create(gl, program.get(), attributes, &vertex_buffers, index_buffer)?;

        let stencil_ops = match (fail_op, depth_fail_op, pass_op) {
            (Some(fail), Some(depth_fail), Some(pass)) => Some([fail, depth_fail, pass]),
            _ => None,
        };

        let state = PipelineState {
            members: desc.members,
            program,
            vao,
            render_target,
            index_type,
            blend,
            blend_factor: if desc.has(PipelineMembers::BLEND_FACTOR) {
                Some(color_floats(desc.blend_factor, false))
            } else {
                None
            },
            flags: if desc.has(PipelineMembers::FLAGS) {
                Some(desc.flags)
            } else {
                None
            },
            cull,
            fill,
            primitive: primitive.unwrap_or(Primitive::Triangle),
            depth_func,
            stencil_func,
            stencil_ref: if desc.has(PipelineMembers::STENCIL_REF) {
                Some(desc.stencil_ref)
            } else {
                None
            },
            stencil_read_mask: if desc.has(PipelineMembers::STENCIL_READ_MASK) {
                Some(desc.stencil_read_mask)
            } else {
                None
            },
            stencil_write_mask: if desc.has(PipelineMembers::STENCIL_WRITE_MASK) {
                Some(desc.stencil_write_mask)
            } else {
                None
            },
            stencil_ops,
            depth_bias: if desc.has(PipelineMembers::DEPTH_SLOPE_BIAS) {
                Some((desc.depth_bias as f32, desc.slope_scaled_depth_bias))
            } else {
                None
            },
            sample_mask: if desc.has(PipelineMembers::SAMPLE_MASK) {
                Some(desc.sample_mask)
            } else {
                None
            },
        };
        debug!(
            program = state.program.raw(),
            vao = state.vao.raw(),
            attributes = attributes.len(),
            indexed = index_type.is_some(),
            "created graphics pipeline"
        );
        Ok(state)
    }

    pub fn members(&self) -> PipelineMembers {
        self.members
    }

    pub fn program(&self) -> ProgramObject {
        self.program.get()
    }

    pub fn vertex_array(&self) -> VertexArrayObject {
        self.vao.get()
    }

    pub fn render_target(&self) -> Option<Framebuffer> {
        self.render_target
    }

    pub fn index_type(&self) -> Option<GLenum> {
        self.index_type
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Makes this pipeline current on `ctx`, touching only the state that differs.
    pub fn apply(&self, ctx: &mut Context) -> GlResult<()> {
        ctx.use_program(self.program.get(), None)?;
        {
            // stays bound until the next pipeline replaces it
            let gl = ctx.gl();
            gl.bind_vertex_array(self.vao.raw());
            gl.check("glBindVertexArray")?;
        }
        ctx.apply_framebuffer(self.render_target.map_or(0, |fb| fb.raw()))?;

        let factor = self.blend_factor.unwrap_or_else(|| ctx.blend_factor());
        ctx.apply_blend(&self.blend, factor, false)?;
        if let Some(flags) = self.flags {
            ctx.apply_flags(flags)?;
        }
        if let Some(cull) = self.cull {
            ctx.apply_cull(cull)?;
        }
        if let Some(fill) = self.fill {
            ctx.apply_fill(fill)?;
        }
        ctx.apply_primitive(self.primitive, self.index_type);
        if let Some(func) = self.depth_func {
            ctx.apply_depth_func(func)?;
        }
        self.apply_stencil(ctx.gl())?;
        if let Some((bias, slope)) = self.depth_bias {
            ctx.apply_depth_bias(bias, slope)?;
        }
        if let Some(mask) = self.sample_mask {
            ctx.apply_sample_mask(mask)?;
        }
        Ok(())
    }

    fn apply_stencil(&self, gl: &Gl) -> GlResult<()> {
        if self.stencil_func.is_some() || self.stencil_ref.is_some() || self.stencil_read_mask.is_some() {
            let func = match self.stencil_func {
                Some(func) if func != Comparison::Disabled => func.to_gl(),
                _ => gl.get_integer(gl::STENCIL_FUNC) as GLenum,
            };
            let reference = match self.stencil_ref {
                Some(r) => r as GLint,
                None => gl.get_integer(gl::STENCIL_REF),
            };
            let mask = match self.stencil_read_mask {
                Some(m) => GLuint::from(m),
                None => gl.get_integer(gl::STENCIL_VALUE_MASK) as GLuint,
            };
            gl.stencil_func(func, reference, mask);
            gl.check("glStencilFunc")?;
        }

        if let Some(ops) = self.stencil_ops {
            let queries = [gl::STENCIL_FAIL, gl::STENCIL_PASS_DEPTH_FAIL, gl::STENCIL_PASS_DEPTH_PASS];
            let mut native = [0; 3];
            for (i, op) in ops.iter().enumerate() {
                native[i] = match op {
                    StencilOp::None => gl.get_integer(queries[i]) as GLenum,
                    op => op.to_gl(),
                };
            }
            gl.stencil_op(native[0], native[1], native[2]);
            gl.check("glStencilOp")?;
        }

        if let Some(mask) = self.stencil_write_mask {
            gl.stencil_mask(GLuint::from(mask));
            gl.check("glStencilMask")?;
        }
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------

/// A compiled compute pipeline with a fixed dispatch extent.
#[derive(Debug)]
pub struct ComputePipelineState {
    program: Owned<ProgramObject>,
    workgroup: Vec3i,
    flags: PipelineFlags,
}

impl ComputePipelineState {
    pub fn create(gl: &Gl, shader: ShaderObject, workgroup: Vec3i, flags: PipelineFlags) -> GlResult<ComputePipelineState> {
        const CALLSITE: &str = "ComputePipelineState::create";
        if shader.raw() == 0
            || !shader.is_compiled(gl)
            || gl.get_shader_iv(shader.raw(), gl::SHADER_TYPE) != gl::COMPUTE_SHADER as GLint
        {
            return Err(gl_error!(InvalidComputeShader, CALLSITE));
        }
        let _span = trace_span!("create_compute_pipeline", x = workgroup.x, y = workgroup.y, z = workgroup.z).entered();
        let program = ProgramObject::create(gl)?;
        program.attach(gl, shader)?;
        program.link(gl)?;
        debug!(program = program.raw(), ?workgroup, "created compute pipeline");
        Ok(ComputePipelineState {
            program,
            workgroup,
            flags,
        })
    }

    pub fn program(&self) -> ProgramObject {
        self.program.get()
    }

    pub fn workgroup(&self) -> Vec3i {
        self.workgroup
    }

    pub fn flags(&self) -> PipelineFlags {
        self.flags
    }

    pub fn apply(&self, ctx: &mut Context) -> GlResult<()> {
        ctx.use_program(self.program.get(), Some(self.workgroup))
    }
}
