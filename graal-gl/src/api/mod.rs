//! The narrow set of OpenGL entry points issued by this crate.
//!
//! Every wrapper holds a [`Gl`], a cheap clonable handle to a [`Driver`]. The real implementation
//! ([`NativeDriver`]) forwards to the `gl` crate; [`RecordingDriver`] is an in-memory stand-in
//! that records every call, used by the tests.
pub use ::gl;

use crate::error::{GlError, GlResult};
use gl::types::*;
use std::{ffi::c_void, fmt, ops::Deref, rc::Rc};

mod native;
mod recording;

pub use native::NativeDriver;
pub use recording::{Call, ComputeKernel, Dispatch, RecordingDriver, UniformValue};

/// Enums missing from the core-profile bindings.
pub mod ext {
    use super::gl::types::GLenum;

    pub const TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FE;
    pub const MAX_TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FF;
    pub const ALPHA: GLenum = 0x1906;
    pub const ALPHA8: GLenum = 0x803C;
    pub const MAX_TEXTURE_COORDS: GLenum = 0x8871;

    pub const MESH_SHADER_NV: GLenum = 0x9559;
    pub const TASK_SHADER_NV: GLenum = 0x955A;
    pub const MAX_MESH_OUTPUT_VERTICES_NV: GLenum = 0x9538;
    pub const MAX_MESH_OUTPUT_PRIMITIVES_NV: GLenum = 0x9539;
    pub const MAX_TASK_OUTPUT_COUNT_NV: GLenum = 0x953A;
    pub const MAX_MESH_WORK_GROUP_SIZE_NV: GLenum = 0x953B;
    pub const MAX_TASK_WORK_GROUP_SIZE_NV: GLenum = 0x953C;
    pub const MAX_DRAW_MESH_TASKS_COUNT_NV: GLenum = 0x953D;

    pub const CONSERVATIVE_RASTERIZATION_NV: GLenum = 0x9346;
}

/// OpenGL entry points, one method per native call.
///
/// Pointer arguments of the C API are replaced by slices and strings; the only raw pointers
/// left are the ones returned by the buffer mapping calls.
pub trait Driver {
    fn get_error(&self) -> GLenum;
    fn get_integer(&self, pname: GLenum) -> GLint;
    fn get_integer_indexed(&self, pname: GLenum, index: GLuint) -> GLint;
    fn get_float(&self, pname: GLenum) -> GLfloat;
    fn get_string(&self, name: GLenum) -> Option<String>;
    fn extensions(&self) -> Vec<String>;
    fn flush(&self);

    // --- buffers ---
    fn gen_buffer(&self) -> GLuint;
    fn delete_buffer(&self, buffer: GLuint);
    fn is_buffer(&self, buffer: GLuint) -> bool;
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    fn bind_buffer_base(&self, target: GLenum, index: GLuint, buffer: GLuint);
    fn bind_buffer_range(
        &self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    );
    fn buffer_data(&self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum);
    fn copy_buffer_sub_data(
        &self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    );
    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void;
    fn map_buffer_range(
        &self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void;
    fn unmap_buffer(&self, target: GLenum) -> bool;

    // --- textures ---
    fn gen_texture(&self) -> GLuint;
    fn delete_texture(&self, texture: GLuint);
    fn is_texture(&self, texture: GLuint) -> bool;
    fn bind_texture(&self, target: GLenum, texture: GLuint);
    fn active_texture(&self, unit: GLenum);
    fn pixel_store(&self, pname: GLenum, param: GLint);
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
    );
    fn tex_image_2d_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        fixed_sample_locations: bool,
    );
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat);
    fn tex_parameter_fv(&self, target: GLenum, pname: GLenum, params: &[GLfloat; 4]);
    fn copy_image_sub_data(
        &self,
        src: (GLuint, GLenum, GLint),
        src_offset: [GLint; 3],
        dst: (GLuint, GLenum, GLint),
        dst_offset: [GLint; 3],
        size: [GLsizei; 3],
    );
    fn is_sampler(&self, sampler: GLuint) -> bool;

    // --- renderbuffers ---
    fn gen_renderbuffer(&self) -> GLuint;
    fn delete_renderbuffer(&self, renderbuffer: GLuint);
    fn is_renderbuffer(&self, renderbuffer: GLuint) -> bool;
    fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint);
    fn renderbuffer_storage_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    );

    // --- framebuffers ---
    fn gen_framebuffer(&self) -> GLuint;
    fn delete_framebuffer(&self, framebuffer: GLuint);
    fn is_framebuffer(&self, framebuffer: GLuint) -> bool;
    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint);
    fn framebuffer_texture_1d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn framebuffer_texture_2d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn framebuffer_texture_3d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
        zoffset: GLint,
    );
    fn framebuffer_texture(&self, target: GLenum, attachment: GLenum, texture: GLuint, level: GLint);
    fn draw_buffers(&self, buffers: &[GLenum]);
    fn check_framebuffer_status(&self, target: GLenum) -> GLenum;

    // --- shaders & programs ---
    fn create_shader(&self, ty: GLenum) -> GLuint;
    fn delete_shader(&self, shader: GLuint);
    fn is_shader(&self, shader: GLuint) -> bool;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint;
    fn get_shader_info_log(&self, shader: GLuint) -> String;
    fn create_program(&self) -> GLuint;
    fn delete_program(&self, program: GLuint);
    fn is_program(&self, program: GLuint) -> bool;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn validate_program(&self, program: GLuint);
    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint;
    fn get_program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint;
    fn get_attrib_location(&self, program: GLuint, name: &str) -> GLint;

    /// `glUniform{size}fv`; `values.len()` is a multiple of `size`.
    fn uniform_fv(&self, location: GLint, size: u8, values: &[GLfloat]);
    fn uniform_iv(&self, location: GLint, size: u8, values: &[GLint]);
    fn uniform_uiv(&self, location: GLint, size: u8, values: &[GLuint]);
    /// `glUniformMatrix{cols}x{rows}fv`, column-major, not transposed.
    fn uniform_matrix_fv(&self, location: GLint, cols: u8, rows: u8, values: &[GLfloat]);

    // --- vertex arrays ---
    fn gen_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, array: GLuint);
    fn is_vertex_array(&self, array: GLuint) -> bool;
    fn bind_vertex_array(&self, array: GLuint);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );
    fn vertex_attrib_divisor(&self, index: GLuint, divisor: GLuint);

    // --- fixed-function state ---
    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
    fn is_enabled(&self, cap: GLenum) -> bool;
    fn blend_func_separate(&self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum);
    fn blend_equation_separate(&self, mode_rgb: GLenum, mode_alpha: GLenum);
    fn blend_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool);
    fn depth_mask(&self, flag: bool);
    fn depth_func(&self, func: GLenum);
    fn front_face(&self, mode: GLenum);
    fn cull_face(&self, mode: GLenum);
    fn polygon_mode(&self, face: GLenum, mode: GLenum);
    fn polygon_offset(&self, factor: GLfloat, units: GLfloat);
    fn stencil_func(&self, func: GLenum, reference: GLint, mask: GLuint);
    fn stencil_op(&self, sfail: GLenum, dpfail: GLenum, dppass: GLenum);
    fn stencil_mask(&self, mask: GLuint);
    fn sample_mask_i(&self, index: GLuint, mask: GLbitfield);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn scissor(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn clear_depth(&self, depth: GLdouble);
    fn clear_stencil(&self, s: GLint);
    fn clear(&self, mask: GLbitfield);

    // --- work submission ---
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
    fn draw_arrays_instanced_base_instance(
        &self,
        mode: GLenum,
        first: GLint,
        count: GLsizei,
        instances: GLsizei,
        base_instance: GLuint,
    );
    fn draw_elements_base_vertex(
        &self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        offset: usize,
        base_vertex: GLint,
    );
    fn draw_elements_instanced_base_vertex_base_instance(
        &self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        offset: usize,
        instances: GLsizei,
        base_vertex: GLint,
        base_instance: GLuint,
    );
    fn draw_mesh_tasks(&self, first: GLuint, count: GLuint);
    fn dispatch_compute(&self, x: GLuint, y: GLuint, z: GLuint);
    fn memory_barrier(&self, barriers: GLbitfield);
}

/// Handle to the driver, shared by every object created from it.
#[derive(Clone)]
pub struct Gl {
    driver: Rc<dyn Driver>,
    check_errors: bool,
}

impl Gl {
    pub fn new(driver: impl Driver + 'static) -> Gl {
        Gl::from_rc(Rc::new(driver))
    }

    /// Wraps an already shared driver. Tests keep their own `Rc` to inspect it.
    pub fn from_rc(driver: Rc<dyn Driver>) -> Gl {
        Gl {
            driver,
            check_errors: true,
        }
    }

    /// Disables or enables `glGetError` sampling after native calls.
    pub fn with_error_checks(mut self, check_errors: bool) -> Gl {
        self.check_errors = check_errors;
        self
    }

    pub fn checks_errors(&self) -> bool {
        self.check_errors
    }

    /// Samples the driver error flag right after the call named `callsite`.
    #[track_caller]
    pub fn check(&self, callsite: &'static str) -> GlResult<()> {
        if !self.check_errors {
            return Ok(());
        }
        match self.driver.get_error() {
            gl::NO_ERROR => Ok(()),
            code => Err(GlError::driver(code, callsite)),
        }
    }
}

impl Deref for Gl {
    type Target = dyn Driver;

    fn deref(&self) -> &Self::Target {
        &*self.driver
    }
}

impl fmt::Debug for Gl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Gl")
            .field("check_errors", &self.check_errors)
            .finish()
    }
}
