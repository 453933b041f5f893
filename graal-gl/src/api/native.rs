use super::{gl, Driver};
use gl::types::*;
use std::{
    ffi::{c_void, CStr, CString},
    mem, ptr,
};

type DrawMeshTasksNvFn = extern "system" fn(GLuint, GLuint);

/// Forwards every call to the current OpenGL context through the `gl` crate.
///
/// The context must stay current on the calling thread for as long as the driver is used.
pub struct NativeDriver {
    draw_mesh_tasks_nv: Option<DrawMeshTasksNvFn>,
}

impl NativeDriver {
    /// Loads the entry points with the given loader (usually the windowing library's
    /// `get_proc_address`).
    ///
    /// # Safety
    ///
    /// The loader must return valid function pointers for the current context, or null.
    pub unsafe fn load_with<F>(mut loader: F) -> NativeDriver
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(|s| loader(s));
        let p = loader("glDrawMeshTasksNV");
        let draw_mesh_tasks_nv = if p.is_null() {
            None
        } else {
            Some(mem::transmute::<*const c_void, DrawMeshTasksNvFn>(p))
        };
        NativeDriver { draw_mesh_tasks_nv }
    }
}

fn gl_bool(b: bool) -> GLboolean {
    if b {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
    data.map_or(ptr::null(), |d| d.as_ptr() as *const c_void)
}

unsafe fn info_log(
    obj: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut log_size: GLint = 0;
    get_iv(obj, gl::INFO_LOG_LENGTH, &mut log_size);
    if log_size <= 0 {
        return String::new();
    }
    let mut log_buf: Vec<u8> = vec![0; log_size as usize];
    let mut written: GLsizei = 0;
    get_log(obj, log_size, &mut written, log_buf.as_mut_ptr() as *mut GLchar);
    log_buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log_buf).into_owned()
}

impl Driver for NativeDriver {
    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn get_integer(&self, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { gl::GetIntegerv(pname, &mut v) };
        v
    }

    fn get_integer_indexed(&self, pname: GLenum, index: GLuint) -> GLint {
        let mut v = 0;
        unsafe { gl::GetIntegeri_v(pname, index, &mut v) };
        v
    }

    fn get_float(&self, pname: GLenum) -> GLfloat {
        let mut v = 0.0;
        unsafe { gl::GetFloatv(pname, &mut v) };
        v
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        unsafe {
            let s = gl::GetString(name);
            if s.is_null() {
                None
            } else {
                Some(CStr::from_ptr(s as *const _).to_string_lossy().into_owned())
            }
        }
    }

    fn extensions(&self) -> Vec<String> {
        let count = self.get_integer(gl::NUM_EXTENSIONS).max(0) as GLuint;
        (0..count)
            .filter_map(|i| unsafe {
                let s = gl::GetStringi(gl::EXTENSIONS, i);
                if s.is_null() {
                    None
                } else {
                    Some(CStr::from_ptr(s as *const _).to_string_lossy().into_owned())
                }
            })
            .collect()
    }

    fn flush(&self) {
        unsafe { gl::Flush() }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_buffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { gl::GenBuffers(1, &mut obj) };
        obj
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn is_buffer(&self, buffer: GLuint) -> bool {
        unsafe { gl::IsBuffer(buffer) == gl::TRUE }
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn bind_buffer_base(&self, target: GLenum, index: GLuint, buffer: GLuint) {
        unsafe { gl::BindBufferBase(target, index, buffer) }
    }

    fn bind_buffer_range(
        &self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        unsafe { gl::BindBufferRange(target, index, buffer, offset, size) }
    }

    fn buffer_data(&self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        unsafe { gl::BufferData(target, size, data_ptr(data), usage) }
    }

    fn copy_buffer_sub_data(
        &self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    ) {
        unsafe { gl::CopyBufferSubData(read_target, write_target, read_offset, write_offset, size) }
    }

    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void {
        unsafe { gl::MapBuffer(target, access) }
    }

    fn map_buffer_range(
        &self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        unsafe { gl::MapBufferRange(target, offset, length, access) }
    }

    fn unmap_buffer(&self, target: GLenum) -> bool {
        unsafe { gl::UnmapBuffer(target) == gl::TRUE }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_texture(&self) -> GLuint {
        let mut obj = 0;
        unsafe { gl::GenTextures(1, &mut obj) };
        obj
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn is_texture(&self, texture: GLuint) -> bool {
        unsafe { gl::IsTexture(texture) == gl::TRUE }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn pixel_store(&self, pname: GLenum, param: GLint) {
        unsafe { gl::PixelStorei(pname, param) }
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        data: Option<&[u8]>,
    ) {
        unsafe {
            gl::TexImage2D(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                data_ptr(data),
            )
        }
    }

    fn tex_image_2d_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        fixed_sample_locations: bool,
    ) {
        unsafe {
            gl::TexImage2DMultisample(
                target,
                samples,
                internal_format,
                width,
                height,
                gl_bool(fixed_sample_locations),
            )
        }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { gl::TexParameteri(target, pname, param) }
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        unsafe { gl::TexParameterf(target, pname, param) }
    }

    fn tex_parameter_fv(&self, target: GLenum, pname: GLenum, params: &[GLfloat; 4]) {
        unsafe { gl::TexParameterfv(target, pname, params.as_ptr()) }
    }

    fn copy_image_sub_data(
        &self,
        src: (GLuint, GLenum, GLint),
        src_offset: [GLint; 3],
        dst: (GLuint, GLenum, GLint),
        dst_offset: [GLint; 3],
        size: [GLsizei; 3],
    ) {
        unsafe {
            gl::CopyImageSubData(
                src.0,
                src.1,
                src.2,
                src_offset[0],
                src_offset[1],
                src_offset[2],
                dst.0,
                dst.1,
                dst.2,
                dst_offset[0],
                dst_offset[1],
                dst_offset[2],
                size[0],
                size[1],
                size[2],
            )
        }
    }

    fn is_sampler(&self, sampler: GLuint) -> bool {
        unsafe { gl::IsSampler(sampler) == gl::TRUE }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_renderbuffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { gl::GenRenderbuffers(1, &mut obj) };
        obj
    }

    fn delete_renderbuffer(&self, renderbuffer: GLuint) {
        unsafe { gl::DeleteRenderbuffers(1, &renderbuffer) }
    }

    fn is_renderbuffer(&self, renderbuffer: GLuint) -> bool {
        unsafe { gl::IsRenderbuffer(renderbuffer) == gl::TRUE }
    }

    fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint) {
        unsafe { gl::BindRenderbuffer(target, renderbuffer) }
    }

    fn renderbuffer_storage_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        unsafe { gl::RenderbufferStorageMultisample(target, samples, internal_format, width, height) }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_framebuffer(&self) -> GLuint {
        let mut obj = 0;
        unsafe { gl::GenFramebuffers(1, &mut obj) };
        obj
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        unsafe { gl::DeleteFramebuffers(1, &framebuffer) }
    }

    fn is_framebuffer(&self, framebuffer: GLuint) -> bool {
        unsafe { gl::IsFramebuffer(framebuffer) == gl::TRUE }
    }

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        unsafe { gl::BindFramebuffer(target, framebuffer) }
    }

    fn framebuffer_texture_1d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        unsafe { gl::FramebufferTexture1D(target, attachment, textarget, texture, level) }
    }

    fn framebuffer_texture_2d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        unsafe { gl::FramebufferTexture2D(target, attachment, textarget, texture, level) }
    }

    fn framebuffer_texture_3d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
        zoffset: GLint,
    ) {
        unsafe { gl::FramebufferTexture3D(target, attachment, textarget, texture, level, zoffset) }
    }

    fn framebuffer_texture(&self, target: GLenum, attachment: GLenum, texture: GLuint, level: GLint) {
        unsafe { gl::FramebufferTexture(target, attachment, texture, level) }
    }

    fn draw_buffers(&self, buffers: &[GLenum]) {
        unsafe { gl::DrawBuffers(buffers.len() as GLsizei, buffers.as_ptr()) }
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        unsafe { gl::CheckFramebufferStatus(target) }
    }

    //----------------------------------------------------------------------------------------------
    fn create_shader(&self, ty: GLenum) -> GLuint {
        unsafe { gl::CreateShader(ty) }
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn is_shader(&self, shader: GLuint) -> bool {
        unsafe { gl::IsShader(shader) == gl::TRUE }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let srcs = [source.as_ptr() as *const GLchar];
        let lens = [source.len() as GLint];
        unsafe { gl::ShaderSource(shader, 1, srcs.as_ptr(), lens.as_ptr()) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { gl::GetShaderiv(shader, pname, &mut v) };
        v
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        unsafe { info_log(shader, gl::GetShaderiv, gl::GetShaderInfoLog) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn is_program(&self, program: GLuint) -> bool {
        unsafe { gl::IsProgram(program) == gl::TRUE }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut v = 0;
        unsafe { gl::GetProgramiv(program, pname, &mut v) };
        v
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        unsafe { info_log(program, gl::GetProgramiv, gl::GetProgramInfoLog) }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn get_attrib_location(&self, program: GLuint, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetAttribLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn uniform_fv(&self, location: GLint, size: u8, values: &[GLfloat]) {
        let count = (values.len() / size.max(1) as usize) as GLsizei;
        let p = values.as_ptr();
        unsafe {
            match size {
                1 => gl::Uniform1fv(location, count, p),
                2 => gl::Uniform2fv(location, count, p),
                3 => gl::Uniform3fv(location, count, p),
                _ => gl::Uniform4fv(location, count, p),
            }
        }
    }

    fn uniform_iv(&self, location: GLint, size: u8, values: &[GLint]) {
        let count = (values.len() / size.max(1) as usize) as GLsizei;
        let p = values.as_ptr();
        unsafe {
            match size {
                1 => gl::Uniform1iv(location, count, p),
                2 => gl::Uniform2iv(location, count, p),
                3 => gl::Uniform3iv(location, count, p),
                _ => gl::Uniform4iv(location, count, p),
            }
        }
    }

    fn uniform_uiv(&self, location: GLint, size: u8, values: &[GLuint]) {
        let count = (values.len() / size.max(1) as usize) as GLsizei;
        let p = values.as_ptr();
        unsafe {
            match size {
                1 => gl::Uniform1uiv(location, count, p),
                2 => gl::Uniform2uiv(location, count, p),
                3 => gl::Uniform3uiv(location, count, p),
                _ => gl::Uniform4uiv(location, count, p),
            }
        }
    }

    fn uniform_matrix_fv(&self, location: GLint, cols: u8, rows: u8, values: &[GLfloat]) {
        let count = (values.len() / (cols as usize * rows as usize).max(1)) as GLsizei;
        let p = values.as_ptr();
        unsafe {
            match (cols, rows) {
                (2, 2) => gl::UniformMatrix2fv(location, count, gl::FALSE, p),
                (2, 3) => gl::UniformMatrix2x3fv(location, count, gl::FALSE, p),
                (2, 4) => gl::UniformMatrix2x4fv(location, count, gl::FALSE, p),
                (3, 2) => gl::UniformMatrix3x2fv(location, count, gl::FALSE, p),
                (3, 3) => gl::UniformMatrix3fv(location, count, gl::FALSE, p),
                (3, 4) => gl::UniformMatrix3x4fv(location, count, gl::FALSE, p),
                (4, 2) => gl::UniformMatrix4x2fv(location, count, gl::FALSE, p),
                (4, 3) => gl::UniformMatrix4x3fv(location, count, gl::FALSE, p),
                _ => gl::UniformMatrix4fv(location, count, gl::FALSE, p),
            }
        }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_vertex_array(&self) -> GLuint {
        let mut obj = 0;
        unsafe { gl::GenVertexArrays(1, &mut obj) };
        obj
    }

    fn delete_vertex_array(&self, array: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &array) }
    }

    fn is_vertex_array(&self, array: GLuint) -> bool {
        unsafe { gl::IsVertexArray(array) == gl::TRUE }
    }

    fn bind_vertex_array(&self, array: GLuint) {
        unsafe { gl::BindVertexArray(array) }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                ty,
                gl_bool(normalized),
                stride,
                offset as *const c_void,
            )
        }
    }

    fn vertex_attrib_divisor(&self, index: GLuint, divisor: GLuint) {
        unsafe { gl::VertexAttribDivisor(index, divisor) }
    }

    //----------------------------------------------------------------------------------------------
    fn enable(&self, cap: GLenum) {
        unsafe { gl::Enable(cap) }
    }

    fn disable(&self, cap: GLenum) {
        unsafe { gl::Disable(cap) }
    }

    fn is_enabled(&self, cap: GLenum) -> bool {
        unsafe { gl::IsEnabled(cap) == gl::TRUE }
    }

    fn blend_func_separate(&self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) {
        unsafe { gl::BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    fn blend_equation_separate(&self, mode_rgb: GLenum, mode_alpha: GLenum) {
        unsafe { gl::BlendEquationSeparate(mode_rgb, mode_alpha) }
    }

    fn blend_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        unsafe { gl::BlendColor(r, g, b, a) }
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        unsafe { gl::ColorMask(gl_bool(r), gl_bool(g), gl_bool(b), gl_bool(a)) }
    }

    fn depth_mask(&self, flag: bool) {
        unsafe { gl::DepthMask(gl_bool(flag)) }
    }

    fn depth_func(&self, func: GLenum) {
        unsafe { gl::DepthFunc(func) }
    }

    fn front_face(&self, mode: GLenum) {
        unsafe { gl::FrontFace(mode) }
    }

    fn cull_face(&self, mode: GLenum) {
        unsafe { gl::CullFace(mode) }
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        unsafe { gl::PolygonMode(face, mode) }
    }

    fn polygon_offset(&self, factor: GLfloat, units: GLfloat) {
        unsafe { gl::PolygonOffset(factor, units) }
    }

    fn stencil_func(&self, func: GLenum, reference: GLint, mask: GLuint) {
        unsafe { gl::StencilFunc(func, reference, mask) }
    }

    fn stencil_op(&self, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        unsafe { gl::StencilOp(sfail, dpfail, dppass) }
    }

    fn stencil_mask(&self, mask: GLuint) {
        unsafe { gl::StencilMask(mask) }
    }

    fn sample_mask_i(&self, index: GLuint, mask: GLbitfield) {
        unsafe { gl::SampleMaski(index, mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn scissor(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Scissor(x, y, width, height) }
    }

    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear_depth(&self, depth: GLdouble) {
        unsafe { gl::ClearDepth(depth) }
    }

    fn clear_stencil(&self, s: GLint) {
        unsafe { gl::ClearStencil(s) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    //----------------------------------------------------------------------------------------------
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }

    fn draw_arrays_instanced_base_instance(
        &self,
        mode: GLenum,
        first: GLint,
        count: GLsizei,
        instances: GLsizei,
        base_instance: GLuint,
    ) {
        unsafe { gl::DrawArraysInstancedBaseInstance(mode, first, count, instances, base_instance) }
    }

    fn draw_elements_base_vertex(
        &self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        offset: usize,
        base_vertex: GLint,
    ) {
        unsafe { gl::DrawElementsBaseVertex(mode, count, ty, offset as *const c_void, base_vertex) }
    }

    fn draw_elements_instanced_base_vertex_base_instance(
        &self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        offset: usize,
        instances: GLsizei,
        base_vertex: GLint,
        base_instance: GLuint,
    ) {
        unsafe {
            gl::DrawElementsInstancedBaseVertexBaseInstance(
                mode,
                count,
                ty,
                offset as *const c_void,
                instances,
                base_vertex,
                base_instance,
            )
        }
    }

    fn draw_mesh_tasks(&self, first: GLuint, count: GLuint) {
        if let Some(f) = self.draw_mesh_tasks_nv {
            f(first, count)
        }
    }

    fn dispatch_compute(&self, x: GLuint, y: GLuint, z: GLuint) {
        unsafe { gl::DispatchCompute(x, y, z) }
    }

    fn memory_barrier(&self, barriers: GLbitfield) {
        unsafe { gl::MemoryBarrier(barriers) }
    }
}
