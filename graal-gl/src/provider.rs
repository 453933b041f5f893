//! The graphics interface: the function table hosts drive the backend through.
//!
//! Every operation reports failures through `tracing` and hands back a sentinel or a boundary
//! code; nothing crosses this boundary as a `Result`.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::buffer::Buffer;
use crate::caps::Caps;
use crate::config::ProviderConfig;
use crate::context::Context;
use crate::error::{ErrorCode, GlResult};
use crate::format::{GlFormat, PixelFormat};
use crate::framebuffer::{Attachment, Framebuffer};
use crate::handle::{Category, Owned, ResourceHandle};
use crate::mapping::{ShaderStage, Usage};
use crate::pipeline::{ComputePipelineState, PipelineDesc, PipelineState};
use crate::renderbuffer::Renderbuffer;
use crate::shader::ShaderObject;
use crate::texture::Texture;
use crate::types::{
    AccessFlags, BarrierFlags, Blend, ClearFlags, Color16, PipelineFlags, Rect, Sampler, ShaderParameter, ShaderValue,
    Vec2i, Vec3i, VertexParameter, Viewport,
};
use slotmap::{Key, SlotMap};
use std::{collections::HashMap, ffi::c_void, ptr::NonNull};
use tracing::{debug, info};

slotmap::new_key_type! {
    /// A rendering session created by [`GraphicsInterface::create_context`].
    pub struct ContextId;
    /// A graphics or compute pipeline. The default value is the null pipeline.
    pub struct PipelineId;
}

/// Compiled shader object handed to the host. `ShaderId::NULL` is the failure sentinel.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShaderId(pub GLuint);

impl ShaderId {
    pub const NULL: ShaderId = ShaderId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn object(self) -> ShaderObject {
        ShaderObject::from_raw(self.0)
    }
}

/// The open command list of a context.
///
/// Commands are not deferred: they execute on the context as they are recorded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommandList(ContextId);

impl CommandList {
    pub fn context(self) -> ContextId {
        self.0
    }
}

#[derive(Debug)]
pub enum Pipeline {
    Graphics(PipelineState),
    Compute(ComputePipelineState),
}

impl Pipeline {
    pub fn apply(&self, ctx: &mut Context) -> GlResult<()> {
        match self {
            Pipeline::Graphics(p) => p.apply(ctx),
            Pipeline::Compute(p) => p.apply(ctx),
        }
    }
}

/// The operations a graphics backend exposes to its host.
pub trait GraphicsInterface {
    fn caps(&self) -> Caps;

    fn create_context(&mut self, size: Vec2i, backbuffer: PixelFormat) -> Option<ContextId>;
    fn resize_context(&mut self, context: ContextId, size: Vec2i) -> i32;
    fn destroy_context(&mut self, context: ContextId) -> i32;

    /// `stage` is the raw [`ShaderStage`] value.
    fn compile_shader(&mut self, stage: u8, source: &str) -> ShaderId;
    fn destroy_shader(&mut self, shader: ShaderId) -> i32;

    fn create_command_list(&mut self, context: ContextId, bundle: bool) -> Option<CommandList>;
    fn destroy_command_list(&mut self, commands: CommandList) -> i32;

    fn clear(&mut self, commands: CommandList, flags: ClearFlags, color: Color16, stencil: u8, depth: f32, rects: &[Rect])
        -> i32;
    fn copy_resource(&mut self, commands: CommandList, src: ResourceHandle, dst: ResourceHandle, size: Vec3i, level: i32)
        -> i32;
    fn copy_subresource(
        &mut self,
        commands: CommandList,
        src: ResourceHandle,
        dst: ResourceHandle,
        src_offset: usize,
        dst_offset: usize,
        bytes: usize,
    ) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn copy_resource_region(
        &mut self,
        commands: CommandList,
        src: ResourceHandle,
        dst: ResourceHandle,
        level: i32,
        src_offset: Vec3i,
        dst_offset: Vec3i,
        size: Vec3i,
    ) -> i32;
    fn draw(&mut self, commands: CommandList, vertices: u32, instances: u32, first_vertex: u32, first_instance: u32) -> i32;
    fn draw_indexed(
        &mut self,
        commands: CommandList,
        indices: u32,
        instances: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) -> i32;
    fn draw_mesh(&mut self, commands: CommandList, first: u32, count: u32) -> i32;
    fn dispatch(&mut self, commands: CommandList) -> i32;
    fn sync_point(&mut self, commands: CommandList, barrier: BarrierFlags) -> i32;
    fn set_pipeline_state(&mut self, commands: CommandList, pipeline: PipelineId) -> i32;
    fn set_viewports(&mut self, commands: CommandList, viewports: &[Viewport]) -> i32;
    fn set_scissors(&mut self, commands: CommandList, rects: &[Rect]) -> i32;
    fn set_shader_constants(&mut self, commands: CommandList, constants: &[(ShaderParameter, ShaderValue)]) -> i32;
    fn execute(&mut self, context: ContextId, commands: CommandList) -> i32;

    #[allow(clippy::too_many_arguments)]
    fn create_pipeline_state(
        &mut self,
        desc: &PipelineDesc,
        render_target: ResourceHandle,
        blend: &Blend,
        vertex_buffers: &[(ResourceHandle, u32)],
        attributes: &[VertexParameter],
        index_buffer: ResourceHandle,
        index_stride: u8,
    ) -> PipelineId;
    fn create_compute_pipeline(&mut self, shader: ShaderId, workgroup: Vec3i, flags: PipelineFlags) -> PipelineId;
    fn destroy_pipeline_state(&mut self, pipeline: PipelineId) -> i32;

    /// `usage` is the raw [`Usage`] value.
    fn create_buffer(&mut self, data: Option<&[u8]>, bytes: usize, usage: u8) -> ResourceHandle;
    #[allow(clippy::too_many_arguments)]
    fn create_texture(
        &mut self,
        size: Vec2i,
        usage: u8,
        format: PixelFormat,
        sampler: &Sampler,
        data: Option<&[u8]>,
        samples: i32,
    ) -> ResourceHandle;
    fn create_render_target(
        &mut self,
        depth_stencil: ResourceHandle,
        textures: &[ResourceHandle],
        attachments: ClearFlags,
    ) -> ResourceHandle;
    fn destroy_resource(&mut self, resource: ResourceHandle) -> i32;
    fn map_resource(
        &mut self,
        resource: ResourceHandle,
        offset: usize,
        length: usize,
        usage: u8,
        access: AccessFlags,
    ) -> Option<NonNull<c_void>>;
    fn unmap_resource(&mut self, resource: ResourceHandle, usage: u8) -> i32;

    fn begin_draw(&mut self, context: ContextId, area: Option<&Rect>) -> i32;
    fn end_draw(&mut self, context: ContextId) -> i32;
}

//--------------------------------------------------------------------------------------------------

fn report(result: GlResult<()>) -> i32 {
    match result {
        Ok(()) => ErrorCode::Success.into(),
        Err(e) => e.log(),
    }
}

fn usage(raw: u8, callsite: &'static str) -> GlResult<Usage> {
    match Usage::from_raw(raw) {
        Some(usage) if usage != Usage::Unknown => Ok(usage),
        _ => Err(gl_error!(InvalidUsage(raw), callsite)),
    }
}

/// The OpenGL implementation of [`GraphicsInterface`].
pub struct Provider {
    gl: Gl,
    config: ProviderConfig,
    contexts: SlotMap<ContextId, Context>,
    pipelines: SlotMap<PipelineId, Pipeline>,
    open_list: Option<CommandList>,
    /// Binding targets with a mapped buffer, and that buffer.
    mapped: HashMap<GLenum, GLuint>,
}

impl Provider {
    /// `gl` must be current on the calling thread for the lifetime of the provider.
    pub fn new(gl: Gl, config: ProviderConfig) -> Provider {
        info!(?config, "Initializing...");
        Provider {
            gl: gl.with_error_checks(config.check_errors),
            config,
            contexts: SlotMap::with_key(),
            pipelines: SlotMap::with_key(),
            open_list: None,
            mapped: HashMap::new(),
        }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(id)
    }

    pub fn pipeline(&self, id: PipelineId) -> Option<&Pipeline> {
        self.pipelines.get(id)
    }

    /// Runs `f` on the context of `commands`, which must be the open list.
    fn record(
        &mut self,
        commands: CommandList,
        callsite: &'static str,
        f: impl FnOnce(&mut Context) -> GlResult<()>,
    ) -> i32 {
        report(open_context(&mut self.contexts, self.open_list, commands, callsite).and_then(f))
    }

    fn new_pipeline(&mut self, pipeline: GlResult<Pipeline>) -> PipelineId {
        match pipeline {
            Ok(p) => self.pipelines.insert(p),
            Err(e) => {
                e.log();
                PipelineId::null()
            }
        }
    }

    fn render_target(&self, depth_stencil: ResourceHandle, textures: &[ResourceHandle], attachments: ClearFlags) -> GlResult<ResourceHandle> {
        const CALLSITE: &str = "Provider::create_render_target";
        let gl = &self.gl;
        let textures = textures
            .iter()
            .map(|&t| match t.category() {
                Some(Category::Texture) => {
                    Texture::validate(gl, t).ok_or_else(|| gl_error!(InvalidParameter("texture is not live"), CALLSITE))
                }
                _ => Err(gl_error!(CategoryMismatch, CALLSITE)),
            })
            .collect::<GlResult<Vec<_>>>()?;
        if let Some(max) = self.config.max_render_targets {
            let requested = textures.len() as u32;
            if requested > max {
                return Err(gl_error!(TooManyRenderTargets { requested, max }, CALLSITE));
            }
        }

        let fb = Framebuffer::create(gl, gl::FRAMEBUFFER, Attachment::new(gl::TEXTURE_2D), &textures)?;
        let depth = attachments.contains(ClearFlags::DEPTH);
        let stencil = attachments.contains(ClearFlags::STENCIL);
        if depth || stencil {
            let texture = Texture::validate(gl, depth_stencil)
                .ok_or_else(|| gl_error!(InvalidParameter("depth-stencil texture is not live"), CALLSITE))?;
            fb.attach_depth_stencil(gl, gl::FRAMEBUFFER, depth, stencil, texture)?;
        }
        Ok(fb.into_inner().to_handle())
    }

    fn map(
        &mut self,
        resource: ResourceHandle,
        offset: usize,
        length: usize,
        usage: u8,
        access: AccessFlags,
    ) -> GlResult<NonNull<c_void>> {
        const CALLSITE: &str = "Provider::map_resource";
        let target = self::usage(usage, CALLSITE)?.to_gl();
        if self.mapped.contains_key(&target) {
            return Err(gl_error!(InvalidCall("a buffer is already mapped on this target"), CALLSITE));
        }
        let buffer = Buffer::validate(&self.gl, resource)
            .ok_or_else(|| gl_error!(InvalidParameter("only live buffers can be mapped"), CALLSITE))?;
        let ptr = buffer.map(&self.gl, target, offset, length, 0, access)?.leak();
        let ptr = NonNull::new(ptr).ok_or_else(|| gl_error!(Null("glMapBuffer"), CALLSITE))?;
        self.mapped.insert(target, buffer.raw());
        debug!(buffer = buffer.raw(), gl_target = target, offset, length, "mapped buffer");
        Ok(ptr)
    }

    fn unmap(&mut self, resource: ResourceHandle, usage: u8) -> GlResult<()> {
        const CALLSITE: &str = "Provider::unmap_resource";
        let target = self::usage(usage, CALLSITE)?.to_gl();
        let buffer = Buffer::validate(&self.gl, resource)
            .ok_or_else(|| gl_error!(InvalidParameter("only live buffers can be unmapped"), CALLSITE))?;
        if self.mapped.get(&target) != Some(&buffer.raw()) {
            return Err(gl_error!(InvalidCall("Mismatched MapResource / UnmapResource pair"), CALLSITE));
        }
        self.mapped.remove(&target);
        buffer.unmap(&self.gl, target)
    }

    fn destroy(&mut self, resource: ResourceHandle) -> GlResult<()> {
        const CALLSITE: &str = "Provider::destroy_resource";
        let gl = &self.gl;
        let invalid = || gl_error!(InvalidParameter("not a live resource"), CALLSITE);
        match resource.category() {
            Some(Category::Framebuffer) => Owned::new(gl, Framebuffer::validate(gl, resource).ok_or_else(invalid)?).reset(),
            Some(Category::Texture) => Owned::new(gl, Texture::validate(gl, resource).ok_or_else(invalid)?).reset(),
            Some(Category::Renderbuffer) => {
                Owned::new(gl, Renderbuffer::validate(gl, resource).ok_or_else(invalid)?).reset()
            }
            Some(Category::Buffer) => {
                let buffer = Buffer::validate(gl, resource).ok_or_else(invalid)?;
                // deleting a buffer unmaps it
                self.mapped.retain(|_, name| *name != buffer.raw());
                Owned::new(gl, buffer).reset()
            }
            _ => Err(invalid()),
        }
    }
}

fn open_context<'a>(
    contexts: &'a mut SlotMap<ContextId, Context>,
    open: Option<CommandList>,
    commands: CommandList,
    callsite: &'static str,
) -> GlResult<&'a mut Context> {
    if open != Some(commands) {
        return Err(gl_error!(InvalidCall("command list is not open"), callsite));
    }
    contexts
        .get_mut(commands.0)
        .ok_or_else(|| gl_error!(InvalidParameter("context was destroyed"), callsite))
}

impl GraphicsInterface for Provider {
    fn caps(&self) -> Caps {
        Caps::query(&self.gl)
    }

    fn create_context(&mut self, size: Vec2i, backbuffer: PixelFormat) -> Option<ContextId> {
        if !GlFormat::create(backbuffer, false).is_valid() {
            gl_error!(InvalidFormat(backbuffer), "Provider::create_context").log();
            return None;
        }
        let id = self.contexts.insert(Context::new(&self.gl, size));
        debug!(?id, width = size.x, height = size.y, "created context");
        Some(id)
    }

    fn resize_context(&mut self, context: ContextId, size: Vec2i) -> i32 {
        match self.contexts.get_mut(context) {
            Some(ctx) => {
                ctx.resize(size);
                ErrorCode::Success.into()
            }
            None => gl_error!(InvalidParameter("unknown context"), "Provider::resize_context").log(),
        }
    }

    fn destroy_context(&mut self, context: ContextId) -> i32 {
        if self.contexts.remove(context).is_none() {
            return gl_error!(InvalidParameter("unknown context"), "Provider::destroy_context").log();
        }
        if self.open_list.map(CommandList::context) == Some(context) {
            self.open_list = None;
        }
        ErrorCode::Success.into()
    }

    fn compile_shader(&mut self, stage: u8, source: &str) -> ShaderId {
        let stage = match ShaderStage::from_raw(stage) {
            Some(stage) => stage,
            None => {
                gl_error!(InvalidShaderStage(stage), "Provider::compile_shader").log();
                return ShaderId::NULL;
            }
        };
        match ShaderObject::create(&self.gl, source, stage) {
            Ok(shader) => ShaderId(shader.into_inner().raw()),
            Err(e) => {
                e.log();
                ShaderId::NULL
            }
        }
    }

    fn destroy_shader(&mut self, shader: ShaderId) -> i32 {
        if shader.is_null() || !self.gl.is_shader(shader.0) {
            return gl_error!(InvalidParameter("Invalid shader!"), "Provider::destroy_shader").log();
        }
        report(Owned::new(&self.gl, shader.object()).reset())
    }

    fn create_command_list(&mut self, context: ContextId, bundle: bool) -> Option<CommandList> {
        const CALLSITE: &str = "Provider::create_command_list";
        if self.open_list.is_some() {
            gl_error!(
                InvalidCall("This backend can't do multiple command lists at the same time!"),
                CALLSITE
            )
            .log();
            return None;
        }
        if !self.contexts.contains_key(context) {
            gl_error!(InvalidParameter("unknown context"), CALLSITE).log();
            return None;
        }
        let list = CommandList(context);
        self.open_list = Some(list);
        debug!(?context, bundle, "opened command list");
        Some(list)
    }

    fn destroy_command_list(&mut self, commands: CommandList) -> i32 {
        if self.open_list != Some(commands) {
            return gl_error!(
                InvalidCall("Mismatched CreateCommandList / DestroyCommandList pair"),
                "Provider::destroy_command_list"
            )
            .log();
        }
        self.open_list = None;
        ErrorCode::Success.into()
    }

    fn clear(&mut self, commands: CommandList, flags: ClearFlags, color: Color16, stencil: u8, depth: f32, rects: &[Rect]) -> i32 {
        self.record(commands, "Provider::clear", |ctx| ctx.clear(flags, color, stencil, depth, rects))
    }

    fn copy_resource(&mut self, commands: CommandList, src: ResourceHandle, dst: ResourceHandle, size: Vec3i, level: i32) -> i32 {
        match (src.category(), dst.category()) {
            (Some(Category::Buffer), Some(Category::Buffer)) => {
                self.copy_subresource(commands, src, dst, 0, 0, size.x.max(0) as usize)
            }
            (Some(Category::Texture), Some(Category::Texture))
            | (Some(Category::Renderbuffer), Some(Category::Renderbuffer)) => {
                self.copy_resource_region(commands, src, dst, level, Vec3i::default(), Vec3i::default(), size)
            }
            _ => gl_error!(InvalidParameter("Mismatched src / dest resources"), "Provider::copy_resource").log(),
        }
    }

    fn copy_subresource(
        &mut self,
        commands: CommandList,
        src: ResourceHandle,
        dst: ResourceHandle,
        src_offset: usize,
        dst_offset: usize,
        bytes: usize,
    ) -> i32 {
        self.record(commands, "Provider::copy_subresource", |ctx| {
            ctx.copy_subresource(src, dst, src_offset, dst_offset, bytes)
        })
    }

    fn copy_resource_region(
        &mut self,
        commands: CommandList,
        src: ResourceHandle,
        dst: ResourceHandle,
        level: i32,
        src_offset: Vec3i,
        dst_offset: Vec3i,
        size: Vec3i,
    ) -> i32 {
        self.record(commands, "Provider::copy_resource_region", |ctx| {
            ctx.copy_resource_region(src, dst, level, src_offset, dst_offset, size)
        })
    }

    fn draw(&mut self, commands: CommandList, vertices: u32, instances: u32, first_vertex: u32, first_instance: u32) -> i32 {
        self.record(commands, "Provider::draw", |ctx| {
            ctx.draw_arrays(vertices, instances, first_vertex, first_instance)
        })
    }

    fn draw_indexed(
        &mut self,
        commands: CommandList,
        indices: u32,
        instances: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) -> i32 {
        self.record(commands, "Provider::draw_indexed", |ctx| {
            ctx.draw_indexed(indices, instances, first_index, base_vertex, first_instance)
        })
    }

    fn draw_mesh(&mut self, commands: CommandList, first: u32, count: u32) -> i32 {
        self.record(commands, "Provider::draw_mesh", |ctx| ctx.draw_mesh(first, count))
    }

    fn dispatch(&mut self, commands: CommandList) -> i32 {
        self.record(commands, "Provider::dispatch", |ctx| ctx.dispatch())
    }

    fn sync_point(&mut self, commands: CommandList, barrier: BarrierFlags) -> i32 {
        self.record(commands, "Provider::sync_point", |ctx| ctx.barrier(barrier))
    }

    fn set_pipeline_state(&mut self, commands: CommandList, pipeline: PipelineId) -> i32 {
        const CALLSITE: &str = "Provider::set_pipeline_state";
        let ctx = match open_context(&mut self.contexts, self.open_list, commands, CALLSITE) {
            Ok(ctx) => ctx,
            Err(e) => return e.log(),
        };
        if pipeline.is_null() {
            if let Err(e) = ctx.clear_program() {
                e.log();
            }
            return ErrorCode::InvalidParameter.into();
        }
        match self.pipelines.get(pipeline) {
            Some(p) => report(p.apply(ctx)),
            None => gl_error!(InvalidParameter("unknown pipeline"), CALLSITE).log(),
        }
    }

    fn set_viewports(&mut self, commands: CommandList, viewports: &[Viewport]) -> i32 {
        self.record(commands, "Provider::set_viewports", |ctx| ctx.set_viewports(viewports))
    }

    fn set_scissors(&mut self, commands: CommandList, rects: &[Rect]) -> i32 {
        self.record(commands, "Provider::set_scissors", |ctx| ctx.set_scissors(rects))
    }

    fn set_shader_constants(&mut self, commands: CommandList, constants: &[(ShaderParameter, ShaderValue)]) -> i32 {
        self.record(commands, "Provider::set_shader_constants", |ctx| {
            ctx.set_shader_uniforms(constants)
        })
    }

    fn execute(&mut self, _context: ContextId, _commands: CommandList) -> i32 {
        // commands already ran as they were recorded
        ErrorCode::Success.into()
    }

    fn create_pipeline_state(
        &mut self,
        desc: &PipelineDesc,
        render_target: ResourceHandle,
        blend: &Blend,
        vertex_buffers: &[(ResourceHandle, u32)],
        attributes: &[VertexParameter],
        index_buffer: ResourceHandle,
        index_stride: u8,
    ) -> PipelineId {
        let state = PipelineState::create(
            &self.gl,
            desc,
            render_target,
            *blend,
            vertex_buffers,
            attributes,
            index_buffer,
            index_stride,
        );
        self.new_pipeline(state.map(Pipeline::Graphics))
    }

    fn create_compute_pipeline(&mut self, shader: ShaderId, workgroup: Vec3i, flags: PipelineFlags) -> PipelineId {
        let state = ComputePipelineState::create(&self.gl, shader.object(), workgroup, flags);
        self.new_pipeline(state.map(Pipeline::Compute))
    }

    fn destroy_pipeline_state(&mut self, pipeline: PipelineId) -> i32 {
        match self.pipelines.remove(pipeline) {
            Some(_) => ErrorCode::Success.into(),
            None => gl_error!(InvalidParameter("unknown pipeline"), "Provider::destroy_pipeline_state").log(),
        }
    }

    fn create_buffer(&mut self, data: Option<&[u8]>, bytes: usize, usage: u8) -> ResourceHandle {
        let buffer = self::usage(usage, "Provider::create_buffer")
            .and_then(|usage| Buffer::create(&self.gl, usage.to_gl(), data, bytes));
        match buffer {
            Ok(buffer) => buffer.into_inner().to_handle(),
            Err(e) => {
                e.log();
                ResourceHandle::NULL
            }
        }
    }

    fn create_texture(
        &mut self,
        size: Vec2i,
        usage: u8,
        format: PixelFormat,
        sampler: &Sampler,
        data: Option<&[u8]>,
        samples: i32,
    ) -> ResourceHandle {
        let gl = &self.gl;
        let srgb = self.config.srgb_textures;
        let handle = self::usage(usage, "Provider::create_texture").and_then(|usage| match usage {
            Usage::Renderbuffer => Renderbuffer::create(gl, gl::RENDERBUFFER, format, size, samples)
                .map(|rb| rb.into_inner().to_handle()),
            usage => Texture::create2d(gl, usage.to_gl(), format, srgb, size, sampler, data, samples)
                .map(|tex| tex.into_inner().to_handle()),
        });
        handle.unwrap_or_else(|e| {
            e.log();
            ResourceHandle::NULL
        })
    }

    fn create_render_target(
        &mut self,
        depth_stencil: ResourceHandle,
        textures: &[ResourceHandle],
        attachments: ClearFlags,
    ) -> ResourceHandle {
        self.render_target(depth_stencil, textures, attachments)
            .unwrap_or_else(|e| {
                e.log();
                ResourceHandle::NULL
            })
    }

    fn destroy_resource(&mut self, resource: ResourceHandle) -> i32 {
        report(self.destroy(resource))
    }

    fn map_resource(
        &mut self,
        resource: ResourceHandle,
        offset: usize,
        length: usize,
        usage: u8,
        access: AccessFlags,
    ) -> Option<NonNull<c_void>> {
        self.map(resource, offset, length, usage, access)
            .map_err(|e| e.log())
            .ok()
    }

    fn unmap_resource(&mut self, resource: ResourceHandle, usage: u8) -> i32 {
        report(self.unmap(resource, usage))
    }

    fn begin_draw(&mut self, context: ContextId, area: Option<&Rect>) -> i32 {
        match self.contexts.get_mut(context) {
            Some(ctx) => report(ctx.begin_draw(area)),
            None => gl_error!(MissingParameter("context"), "Provider::begin_draw").log(),
        }
    }

    fn end_draw(&mut self, context: ContextId) -> i32 {
        match self.contexts.get(context) {
            Some(ctx) => report(ctx.end_draw()),
            None => gl_error!(MissingParameter("context"), "Provider::end_draw").log(),
        }
    }
}
