//! In-memory driver that records every call.
use super::{gl, Driver};
use gl::types::*;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    ffi::c_void,
    fmt, ptr,
};

/// One recorded entry point with its integer arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub name: &'static str,
    pub args: Vec<i64>,
}

/// A value last written with one of the `glUniform*` calls.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(Vec<f32>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Matrix { cols: u8, rows: u8, values: Vec<f32> },
}

/// Stands in for the GPU on `glDispatchCompute`.
pub type ComputeKernel = Box<dyn Fn(&mut Dispatch)>;

/// What a compute kernel sees: the workgroup count, the uniforms of the current program and the
/// storage buffers bound to indexed `SHADER_STORAGE_BUFFER` slots.
pub struct Dispatch<'a> {
    pub groups: [GLuint; 3],
    program: GLuint,
    state: &'a mut State,
}

impl<'a> Dispatch<'a> {
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        let loc = *self.state.programs.get(&self.program)?.uniforms.get(name)?;
        self.state.uniform_values.get(&(self.program, loc))
    }

    pub fn uniform_i32(&self, name: &str) -> Option<i32> {
        match self.uniform(name)? {
            UniformValue::Int(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Contents of the buffer bound at the given storage slot.
    pub fn read_storage(&self, binding: GLuint) -> Option<Vec<u8>> {
        let buffer = self.state.storage_bindings.get(&binding)?;
        self.state.buffers.get(buffer).map(|b| b.data.clone())
    }

    /// Overwrites the start of the buffer bound at the given storage slot.
    pub fn write_storage(&mut self, binding: GLuint, bytes: &[u8]) -> bool {
        let buffer = match self.state.storage_bindings.get(&binding) {
            Some(b) => *b,
            None => return false,
        };
        match self.state.buffers.get_mut(&buffer) {
            Some(b) if b.data.len() >= bytes.len() => {
                b.data[..bytes.len()].copy_from_slice(bytes);
                true
            }
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Kind {
    Buffer,
    Texture,
    Renderbuffer,
    Framebuffer,
    VertexArray,
}

#[derive(Default)]
struct BufferStore {
    data: Vec<u8>,
    mapped: bool,
}

struct ShaderState {
    ty: GLenum,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct ProgramState {
    shaders: Vec<GLuint>,
    linked: bool,
    validated: bool,
    log: String,
    uniforms: HashMap<String, GLint>,
    attribs: HashMap<String, GLint>,
}

struct State {
    next_name: GLuint,
    objects: HashMap<GLuint, Kind>,
    shaders: HashMap<GLuint, ShaderState>,
    programs: HashMap<GLuint, ProgramState>,
    buffers: HashMap<GLuint, BufferStore>,
    bindings: HashMap<GLenum, GLuint>,
    storage_bindings: HashMap<GLuint, GLuint>,
    uniform_values: HashMap<(GLuint, GLint), UniformValue>,
    enabled: HashSet<GLenum>,
    integers: HashMap<GLenum, GLint>,
    floats: HashMap<GLenum, GLfloat>,
    strings: HashMap<GLenum, String>,
    extensions: Vec<String>,
    errors: Vec<GLenum>,
    framebuffer_status: GLenum,
    calls: Vec<Call>,
}

/// `*_BINDING` query → binding target.
fn binding_target(pname: GLenum) -> Option<GLenum> {
    Some(match pname {
        gl::ARRAY_BUFFER_BINDING => gl::ARRAY_BUFFER,
        gl::ELEMENT_ARRAY_BUFFER_BINDING => gl::ELEMENT_ARRAY_BUFFER,
        gl::COPY_READ_BUFFER_BINDING => gl::COPY_READ_BUFFER,
        gl::COPY_WRITE_BUFFER_BINDING => gl::COPY_WRITE_BUFFER,
        gl::PIXEL_PACK_BUFFER_BINDING => gl::PIXEL_PACK_BUFFER,
        gl::PIXEL_UNPACK_BUFFER_BINDING => gl::PIXEL_UNPACK_BUFFER,
        gl::UNIFORM_BUFFER_BINDING => gl::UNIFORM_BUFFER,
        gl::SHADER_STORAGE_BUFFER_BINDING => gl::SHADER_STORAGE_BUFFER,
        gl::TRANSFORM_FEEDBACK_BUFFER_BINDING => gl::TRANSFORM_FEEDBACK_BUFFER,
        gl::TEXTURE_BINDING_1D => gl::TEXTURE_1D,
        gl::TEXTURE_BINDING_2D => gl::TEXTURE_2D,
        gl::TEXTURE_BINDING_3D => gl::TEXTURE_3D,
        gl::TEXTURE_BINDING_2D_MULTISAMPLE => gl::TEXTURE_2D_MULTISAMPLE,
        gl::RENDERBUFFER_BINDING => gl::RENDERBUFFER,
        gl::DRAW_FRAMEBUFFER_BINDING => gl::DRAW_FRAMEBUFFER,
        gl::READ_FRAMEBUFFER_BINDING => gl::READ_FRAMEBUFFER,
        gl::VERTEX_ARRAY_BINDING => gl::VERTEX_ARRAY_BINDING,
        gl::CURRENT_PROGRAM => gl::CURRENT_PROGRAM,
        _ => return None,
    })
}

impl State {
    fn new() -> State {
        let mut integers = HashMap::new();
        integers.insert(gl::MAX_COLOR_ATTACHMENTS, 8);
        integers.insert(gl::MAX_DRAW_BUFFERS, 8);
        integers.insert(gl::MAX_TEXTURE_SIZE, 16384);
        integers.insert(gl::MAX_VERTEX_ATTRIBS, 16);
        integers.insert(gl::MAX_SAMPLES, 8);
        integers.insert(gl::MAX_SHADER_STORAGE_BUFFER_BINDINGS, 8);
        integers.insert(gl::MAJOR_VERSION, 4);
        integers.insert(gl::MINOR_VERSION, 5);
        integers.insert(gl::UNPACK_ALIGNMENT, 4);
        integers.insert(gl::ACTIVE_TEXTURE, gl::TEXTURE0 as GLint);
        integers.insert(gl::STENCIL_FUNC, gl::ALWAYS as GLint);
        integers.insert(gl::STENCIL_VALUE_MASK, -1);
        integers.insert(gl::STENCIL_WRITEMASK, -1);
        integers.insert(gl::STENCIL_FAIL, gl::KEEP as GLint);
        integers.insert(gl::STENCIL_PASS_DEPTH_FAIL, gl::KEEP as GLint);
        integers.insert(gl::STENCIL_PASS_DEPTH_PASS, gl::KEEP as GLint);

        let mut strings = HashMap::new();
        strings.insert(gl::VENDOR, "graal-gl".to_string());
        strings.insert(gl::RENDERER, "recording driver".to_string());
        strings.insert(gl::VERSION, "4.5 (recording)".to_string());
        strings.insert(gl::SHADING_LANGUAGE_VERSION, "4.50".to_string());

        let mut enabled = HashSet::new();
        enabled.insert(gl::DITHER);
        enabled.insert(gl::MULTISAMPLE);

        State {
            next_name: 1,
            objects: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            bindings: HashMap::new(),
            storage_bindings: HashMap::new(),
            uniform_values: HashMap::new(),
            enabled,
            integers,
            floats: HashMap::new(),
            strings,
            extensions: Vec::new(),
            errors: Vec::new(),
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            calls: Vec::new(),
        }
    }

    fn alloc(&mut self, kind: Option<Kind>) -> GLuint {
        let name = self.next_name;
        self.next_name += 1;
        if let Some(kind) = kind {
            self.objects.insert(name, kind);
        }
        name
    }

    fn is(&self, name: GLuint, kind: Kind) -> bool {
        name != 0 && self.objects.get(&name) == Some(&kind)
    }

    fn delete(&mut self, name: GLuint, kind: Kind) {
        if self.is(name, kind) {
            self.objects.remove(&name);
            self.buffers.remove(&name);
            // deleting a bound object reverts the binding to zero
            self.bindings.retain(|_, bound| *bound != name);
        }
    }

    fn bound(&self, target: GLenum) -> GLuint {
        self.bindings.get(&target).copied().unwrap_or(0)
    }

    fn bound_buffer(&mut self, target: GLenum) -> Option<&mut BufferStore> {
        let name = self.bound(target);
        self.buffers.get_mut(&name)
    }

    fn set_uniform(&mut self, location: GLint, value: UniformValue) {
        let program = self.bound(gl::CURRENT_PROGRAM);
        if program == 0 || location < 0 {
            return;
        }
        self.uniform_values.insert((program, location), value);
    }
}

/// A fake [`Driver`] keeping object tables, bindings and buffer storage in memory.
///
/// Every state-changing entry point is appended to an ordered call log (queries are not).
/// Shader sources containing `#error` fail to compile, with the rest of that line as the log.
pub struct RecordingDriver {
    state: RefCell<State>,
    kernel: RefCell<Option<ComputeKernel>>,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        RecordingDriver::new()
    }
}

impl fmt::Debug for RecordingDriver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RecordingDriver")
            .field("objects", &state.objects.len())
            .field("calls", &state.calls.len())
            .finish()
    }
}

impl RecordingDriver {
    pub fn new() -> RecordingDriver {
        RecordingDriver {
            state: RefCell::new(State::new()),
            kernel: RefCell::new(None),
        }
    }

    fn record(&self, name: &'static str, args: &[i64]) {
        self.state.borrow_mut().calls.push(Call {
            name,
            args: args.to_vec(),
        });
    }

    //----------------------------------------------------------------------------------------------
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.borrow().calls.iter().map(|c| c.name).collect()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.name == name)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Overrides the value returned by `glGetIntegerv(pname)`.
    pub fn set_integer(&self, pname: GLenum, value: GLint) {
        self.state.borrow_mut().integers.insert(pname, value);
    }

    pub fn set_float(&self, pname: GLenum, value: GLfloat) {
        self.state.borrow_mut().floats.insert(pname, value);
    }

    pub fn set_extensions(&self, extensions: &[&str]) {
        self.state.borrow_mut().extensions = extensions.iter().map(|s| s.to_string()).collect();
    }

    /// Queues an error code for the next `glGetError`.
    pub fn inject_error(&self, code: GLenum) {
        self.state.borrow_mut().errors.push(code);
    }

    pub fn set_framebuffer_status(&self, status: GLenum) {
        self.state.borrow_mut().framebuffer_status = status;
    }

    pub fn set_compute_kernel(&self, kernel: impl Fn(&mut Dispatch) + 'static) {
        *self.kernel.borrow_mut() = Some(Box::new(kernel));
    }

    pub fn bound(&self, target: GLenum) -> GLuint {
        self.state.borrow().bound(target)
    }

    pub fn buffer_contents(&self, buffer: GLuint) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).map(|b| b.data.clone())
    }

    pub fn is_mapped(&self, buffer: GLuint) -> bool {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .map_or(false, |b| b.mapped)
    }

    pub fn uniform(&self, program: GLuint, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let loc = *state.programs.get(&program)?.uniforms.get(name)?;
        state.uniform_values.get(&(program, loc)).cloned()
    }

    pub fn shader_stage(&self, shader: GLuint) -> Option<GLenum> {
        self.state.borrow().shaders.get(&shader).map(|s| s.ty)
    }

    /// Number of live objects of every kind, shaders and programs included.
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.objects.len() + state.shaders.len() + state.programs.len()
    }
}

impl Driver for RecordingDriver {
    fn get_error(&self) -> GLenum {
        let mut state = self.state.borrow_mut();
        if state.errors.is_empty() {
            gl::NO_ERROR
        } else {
            state.errors.remove(0)
        }
    }

    fn get_integer(&self, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        if let Some(target) = binding_target(pname) {
            return state.bound(target) as GLint;
        }
        if pname == gl::FRAMEBUFFER_BINDING {
            return state.bound(gl::DRAW_FRAMEBUFFER) as GLint;
        }
        state.integers.get(&pname).copied().unwrap_or(0)
    }

    fn get_integer_indexed(&self, pname: GLenum, index: GLuint) -> GLint {
        let state = self.state.borrow();
        if pname == gl::SHADER_STORAGE_BUFFER_BINDING {
            return state.storage_bindings.get(&index).copied().unwrap_or(0) as GLint;
        }
        state.integers.get(&pname).copied().unwrap_or(0)
    }

    fn get_float(&self, pname: GLenum) -> GLfloat {
        self.state.borrow().floats.get(&pname).copied().unwrap_or(0.0)
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        self.state.borrow().strings.get(&name).cloned()
    }

    fn extensions(&self) -> Vec<String> {
        self.state.borrow().extensions.clone()
    }

    fn flush(&self) {
        self.record("glFlush", &[]);
    }

    //----------------------------------------------------------------------------------------------
    fn gen_buffer(&self) -> GLuint {
        let name = {
            let mut state = self.state.borrow_mut();
            let name = state.alloc(Some(Kind::Buffer));
            state.buffers.insert(name, BufferStore::default());
            name
        };
        self.record("glGenBuffers", &[name as i64]);
        name
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record("glDeleteBuffers", &[buffer as i64]);
        let mut state = self.state.borrow_mut();
        state.delete(buffer, Kind::Buffer);
        state.storage_bindings.retain(|_, b| *b != buffer);
    }

    fn is_buffer(&self, buffer: GLuint) -> bool {
        self.state.borrow().is(buffer, Kind::Buffer)
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.record("glBindBuffer", &[target as i64, buffer as i64]);
        self.state.borrow_mut().bindings.insert(target, buffer);
    }

    fn bind_buffer_base(&self, target: GLenum, index: GLuint, buffer: GLuint) {
        self.record("glBindBufferBase", &[target as i64, index as i64, buffer as i64]);
        let mut state = self.state.borrow_mut();
        state.bindings.insert(target, buffer);
        if target == gl::SHADER_STORAGE_BUFFER {
            state.storage_bindings.insert(index, buffer);
        }
    }

    fn bind_buffer_range(
        &self,
        target: GLenum,
        index: GLuint,
        buffer: GLuint,
        offset: GLintptr,
        size: GLsizeiptr,
    ) {
        self.record(
            "glBindBufferRange",
            &[target as i64, index as i64, buffer as i64, offset as i64, size as i64],
        );
        let mut state = self.state.borrow_mut();
        state.bindings.insert(target, buffer);
        if target == gl::SHADER_STORAGE_BUFFER {
            state.storage_bindings.insert(index, buffer);
        }
    }

    fn buffer_data(&self, target: GLenum, size: GLsizeiptr, data: Option<&[u8]>, usage: GLenum) {
        self.record("glBufferData", &[target as i64, size as i64, usage as i64]);
        let mut state = self.state.borrow_mut();
        match state.bound_buffer(target) {
            Some(store) => {
                let size = size.max(0) as usize;
                store.data = match data {
                    Some(d) => d[..size.min(d.len())].to_vec(),
                    None => vec![0; size],
                };
                store.data.resize(size, 0);
            }
            None => state.errors.push(gl::INVALID_OPERATION),
        }
    }

    fn copy_buffer_sub_data(
        &self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: GLintptr,
        write_offset: GLintptr,
        size: GLsizeiptr,
    ) {
        self.record(
            "glCopyBufferSubData",
            &[
                read_target as i64,
                write_target as i64,
                read_offset as i64,
                write_offset as i64,
                size as i64,
            ],
        );
        let mut state = self.state.borrow_mut();
        let (ro, wo, n) = (read_offset as usize, write_offset as usize, size as usize);
        let src = state
            .bound_buffer(read_target)
            .and_then(|b| b.data.get(ro..ro + n).map(|s| s.to_vec()));
        let ok = match (src, state.bound_buffer(write_target)) {
            (Some(bytes), Some(dst)) if dst.data.len() >= wo + n => {
                dst.data[wo..wo + n].copy_from_slice(&bytes);
                true
            }
            _ => false,
        };
        if !ok {
            state.errors.push(gl::INVALID_VALUE);
        }
    }

    fn map_buffer(&self, target: GLenum, access: GLenum) -> *mut c_void {
        self.record("glMapBuffer", &[target as i64, access as i64]);
        let mut state = self.state.borrow_mut();
        let p = match state.bound_buffer(target) {
            Some(store) if !store.mapped => {
                store.mapped = true;
                store.data.as_mut_ptr() as *mut c_void
            }
            _ => ptr::null_mut(),
        };
        if p.is_null() {
            state.errors.push(gl::INVALID_OPERATION);
        }
        p
    }

    fn map_buffer_range(
        &self,
        target: GLenum,
        offset: GLintptr,
        length: GLsizeiptr,
        access: GLbitfield,
    ) -> *mut c_void {
        self.record(
            "glMapBufferRange",
            &[target as i64, offset as i64, length as i64, access as i64],
        );
        let mut state = self.state.borrow_mut();
        let (offset, length) = (offset.max(0) as usize, length.max(0) as usize);
        let p = match state.bound_buffer(target) {
            Some(store) if !store.mapped && offset + length <= store.data.len() => {
                store.mapped = true;
                store.data[offset..].as_mut_ptr() as *mut c_void
            }
            _ => ptr::null_mut(),
        };
        if p.is_null() {
            state.errors.push(gl::INVALID_OPERATION);
        }
        p
    }

    fn unmap_buffer(&self, target: GLenum) -> bool {
        self.record("glUnmapBuffer", &[target as i64]);
        let mut state = self.state.borrow_mut();
        match state.bound_buffer(target) {
            Some(store) if store.mapped => {
                store.mapped = false;
                true
            }
            _ => {
                state.errors.push(gl::INVALID_OPERATION);
                false
            }
        }
    }

    //----------------------------------------------------------------------------------------------
    fn gen_texture(&self) -> GLuint {
        let name = self.state.borrow_mut().alloc(Some(Kind::Texture));
        self.record("glGenTextures", &[name as i64]);
        name
    }

    fn delete_texture(&self, texture: GLuint) {
        self.record("glDeleteTextures", &[texture as i64]);
        self.state.borrow_mut().delete(texture, Kind::Texture);
    }

    fn is_texture(&self, texture: GLuint) -> bool {
        self.state.borrow().is(texture, Kind::Texture)
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        self.record("glBindTexture", &[target as i64, texture as i64]);
        self.state.borrow_mut().bindings.insert(target, texture);
    }

    fn active_texture(&self, unit: GLenum) {
        self.record("glActiveTexture", &[unit as i64]);
        self.state
            .borrow_mut()
            .integers
            .insert(gl::ACTIVE_TEXTURE, unit as GLint);
    }

    fn pixel_store(&self, pname: GLenum, param: GLint) {
        self.record("glPixelStorei", &[pname as i64, param as i64]);
        self.state.borrow_mut().integers.insert(pname, param);
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
        _data: Option<&[u8]>,
    ) {
        self.record(
            "glTexImage2D",
            &[
                target as i64,
                level as i64,
                internal_format as i64,
                width as i64,
                height as i64,
                format as i64,
                ty as i64,
            ],
        );
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
        self.record(
            "glTexImage2DMultisample",
            &[
                target as i64,
                samples as i64,
                internal_format as i64,
                width as i64,
                height as i64,
                fixed_sample_locations as i64,
            ],
        );
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        self.record("glTexParameteri", &[target as i64, pname as i64, param as i64]);
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, _param: GLfloat) {
        self.record("glTexParameterf", &[target as i64, pname as i64]);
    }

    fn tex_parameter_fv(&self, target: GLenum, pname: GLenum, _params: &[GLfloat; 4]) {
        self.record("glTexParameterfv", &[target as i64, pname as i64]);
    }

    fn copy_image_sub_data(
        &self,
        src: (GLuint, GLenum, GLint),
        src_offset: [GLint; 3],
        dst: (GLuint, GLenum, GLint),
        dst_offset: [GLint; 3],
        size: [GLsizei; 3],
    ) {
        let mut args = vec![src.0 as i64, src.1 as i64, src.2 as i64];
        args.extend(src_offset.iter().map(|&v| v as i64));
        args.extend(&[dst.0 as i64, dst.1 as i64, dst.2 as i64]);
        args.extend(dst_offset.iter().map(|&v| v as i64));
        args.extend(size.iter().map(|&v| v as i64));
        self.record("glCopyImageSubData", &args);
    }

    fn is_sampler(&self, _sampler: GLuint) -> bool {
        false
    }

    //----------------------------------------------------------------------------------------------
    fn gen_renderbuffer(&self) -> GLuint {
        let name = self.state.borrow_mut().alloc(Some(Kind::Renderbuffer));
        self.record("glGenRenderbuffers", &[name as i64]);
        name
    }

    fn delete_renderbuffer(&self, renderbuffer: GLuint) {
        self.record("glDeleteRenderbuffers", &[renderbuffer as i64]);
        self.state
            .borrow_mut()
            .delete(renderbuffer, Kind::Renderbuffer);
    }

    fn is_renderbuffer(&self, renderbuffer: GLuint) -> bool {
        self.state.borrow().is(renderbuffer, Kind::Renderbuffer)
    }

    fn bind_renderbuffer(&self, target: GLenum, renderbuffer: GLuint) {
        self.record("glBindRenderbuffer", &[target as i64, renderbuffer as i64]);
        self.state.borrow_mut().bindings.insert(target, renderbuffer);
    }

    fn renderbuffer_storage_multisample(
        &self,
        target: GLenum,
        samples: GLsizei,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        self.record(
            "glRenderbufferStorageMultisample",
            &[
                target as i64,
                samples as i64,
                internal_format as i64,
                width as i64,
                height as i64,
            ],
        );
    }

    //----------------------------------------------------------------------------------------------
    fn gen_framebuffer(&self) -> GLuint {
        let name = self.state.borrow_mut().alloc(Some(Kind::Framebuffer));
        self.record("glGenFramebuffers", &[name as i64]);
        name
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        self.record("glDeleteFramebuffers", &[framebuffer as i64]);
        self.state
            .borrow_mut()
            .delete(framebuffer, Kind::Framebuffer);
    }

    fn is_framebuffer(&self, framebuffer: GLuint) -> bool {
        self.state.borrow().is(framebuffer, Kind::Framebuffer)
    }

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        self.record("glBindFramebuffer", &[target as i64, framebuffer as i64]);
        let mut state = self.state.borrow_mut();
        if target == gl::FRAMEBUFFER {
            state.bindings.insert(gl::DRAW_FRAMEBUFFER, framebuffer);
            state.bindings.insert(gl::READ_FRAMEBUFFER, framebuffer);
        } else {
            state.bindings.insert(target, framebuffer);
        }
    }

    fn framebuffer_texture_1d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        self.record(
            "glFramebufferTexture1D",
            &[target as i64, attachment as i64, textarget as i64, texture as i64, level as i64],
        );
    }

    fn framebuffer_texture_2d(
        &self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        self.record(
            "glFramebufferTexture2D",
            &[target as i64, attachment as i64, textarget as i64, texture as i64, level as i64],
        );
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
        self.record(
            "glFramebufferTexture3D",
            &[
                target as i64,
                attachment as i64,
                textarget as i64,
                texture as i64,
                level as i64,
                zoffset as i64,
            ],
        );
    }

    fn framebuffer_texture(&self, target: GLenum, attachment: GLenum, texture: GLuint, level: GLint) {
        self.record(
            "glFramebufferTexture",
            &[target as i64, attachment as i64, texture as i64, level as i64],
        );
    }

    fn draw_buffers(&self, buffers: &[GLenum]) {
        let args: Vec<i64> = buffers.iter().map(|&b| b as i64).collect();
        self.record("glDrawBuffers", &args);
    }

    fn check_framebuffer_status(&self, _target: GLenum) -> GLenum {
        self.state.borrow().framebuffer_status
    }

    //----------------------------------------------------------------------------------------------
    fn create_shader(&self, ty: GLenum) -> GLuint {
        let name = {
            let mut state = self.state.borrow_mut();
            let name = state.alloc(None);
            state.shaders.insert(
                name,
                ShaderState {
                    ty,
                    source: String::new(),
                    compiled: false,
                    log: String::new(),
                },
            );
            name
        };
        self.record("glCreateShader", &[ty as i64, name as i64]);
        name
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record("glDeleteShader", &[shader as i64]);
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn is_shader(&self, shader: GLuint) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        self.record("glShaderSource", &[shader as i64]);
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record("glCompileShader", &[shader as i64]);
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            match s.source.lines().find(|l| l.trim_start().starts_with("#error")) {
                Some(line) => {
                    s.compiled = false;
                    s.log = line.trim_start()["#error".len()..].trim().to_string();
                }
                None => {
                    s.compiled = true;
                    s.log.clear();
                }
            }
        }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let s = match state.shaders.get(&shader) {
            Some(s) => s,
            None => return 0,
        };
        match pname {
            gl::COMPILE_STATUS => s.compiled as GLint,
            gl::SHADER_TYPE => s.ty as GLint,
            gl::INFO_LOG_LENGTH => {
                if s.log.is_empty() {
                    0
                } else {
                    s.log.len() as GLint + 1
                }
            }
            _ => 0,
        }
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn create_program(&self) -> GLuint {
        let name = {
            let mut state = self.state.borrow_mut();
            let name = state.alloc(None);
            state.programs.insert(name, ProgramState::default());
            name
        };
        self.record("glCreateProgram", &[name as i64]);
        name
    }

    fn delete_program(&self, program: GLuint) {
        self.record("glDeleteProgram", &[program as i64]);
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        state.uniform_values.retain(|(p, _), _| *p != program);
    }

    fn is_program(&self, program: GLuint) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record("glAttachShader", &[program as i64, shader as i64]);
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.errors.push(gl::INVALID_VALUE);
            return;
        }
        if let Some(p) = state.programs.get_mut(&program) {
            p.shaders.push(shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        self.record("glLinkProgram", &[program as i64]);
        let mut state = self.state.borrow_mut();
        let all_compiled = match state.programs.get(&program) {
            Some(p) => {
                !p.shaders.is_empty()
                    && p.shaders
                        .iter()
                        .all(|s| state.shaders.get(s).map_or(false, |s| s.compiled))
            }
            None => return,
        };
        if let Some(p) = state.programs.get_mut(&program) {
            p.linked = all_compiled;
            p.log = if all_compiled {
                String::new()
            } else {
                "link error: no compiled shader attached".to_string()
            };
        }
    }

    fn validate_program(&self, program: GLuint) {
        self.record("glValidateProgram", &[program as i64]);
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.validated = p.linked;
        }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let p = match state.programs.get(&program) {
            Some(p) => p,
            None => return 0,
        };
        match pname {
            gl::LINK_STATUS => p.linked as GLint,
            gl::VALIDATE_STATUS => p.validated as GLint,
            gl::ATTACHED_SHADERS => p.shaders.len() as GLint,
            gl::INFO_LOG_LENGTH => {
                if p.log.is_empty() {
                    0
                } else {
                    p.log.len() as GLint + 1
                }
            }
            _ => 0,
        }
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: GLuint) {
        self.record("glUseProgram", &[program as i64]);
        self.state
            .borrow_mut()
            .bindings
            .insert(gl::CURRENT_PROGRAM, program);
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program) {
            Some(p) if p.linked => {
                let next = p.uniforms.len() as GLint;
                *p.uniforms.entry(name.to_string()).or_insert(next)
            }
            _ => -1,
        }
    }

    fn get_attrib_location(&self, program: GLuint, name: &str) -> GLint {
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program) {
            Some(p) if p.linked => {
                let next = p.attribs.len() as GLint;
                *p.attribs.entry(name.to_string()).or_insert(next)
            }
            _ => -1,
        }
    }

    fn uniform_fv(&self, location: GLint, size: u8, values: &[GLfloat]) {
        let name = match size {
            1 => "glUniform1fv",
            2 => "glUniform2fv",
            3 => "glUniform3fv",
            _ => "glUniform4fv",
        };
        self.record(name, &[location as i64]);
        self.state
            .borrow_mut()
            .set_uniform(location, UniformValue::Float(values.to_vec()));
    }

    fn uniform_iv(&self, location: GLint, size: u8, values: &[GLint]) {
        let name = match size {
            1 => "glUniform1iv",
            2 => "glUniform2iv",
            3 => "glUniform3iv",
            _ => "glUniform4iv",
        };
        self.record(name, &[location as i64]);
        self.state
            .borrow_mut()
            .set_uniform(location, UniformValue::Int(values.to_vec()));
    }

    fn uniform_uiv(&self, location: GLint, size: u8, values: &[GLuint]) {
        let name = match size {
            1 => "glUniform1uiv",
            2 => "glUniform2uiv",
            3 => "glUniform3uiv",
            _ => "glUniform4uiv",
        };
        self.record(name, &[location as i64]);
        self.state
            .borrow_mut()
            .set_uniform(location, UniformValue::UInt(values.to_vec()));
    }

    fn uniform_matrix_fv(&self, location: GLint, cols: u8, rows: u8, values: &[GLfloat]) {
        let name = match (cols, rows) {
            (2, 2) => "glUniformMatrix2fv",
            (2, 3) => "glUniformMatrix2x3fv",
            (2, 4) => "glUniformMatrix2x4fv",
            (3, 2) => "glUniformMatrix3x2fv",
            (3, 3) => "glUniformMatrix3fv",
            (3, 4) => "glUniformMatrix3x4fv",
            (4, 2) => "glUniformMatrix4x2fv",
            (4, 3) => "glUniformMatrix4x3fv",
            _ => "glUniformMatrix4fv",
        };
        self.record(name, &[location as i64]);
        self.state.borrow_mut().set_uniform(
            location,
            UniformValue::Matrix {
                cols,
                rows,
                values: values.to_vec(),
            },
        );
    }

    //----------------------------------------------------------------------------------------------
    fn gen_vertex_array(&self) -> GLuint {
        let name = self.state.borrow_mut().alloc(Some(Kind::VertexArray));
        self.record("glGenVertexArrays", &[name as i64]);
        name
    }

    fn delete_vertex_array(&self, array: GLuint) {
        self.record("glDeleteVertexArrays", &[array as i64]);
        self.state.borrow_mut().delete(array, Kind::VertexArray);
    }

    fn is_vertex_array(&self, array: GLuint) -> bool {
        self.state.borrow().is(array, Kind::VertexArray)
    }

    fn bind_vertex_array(&self, array: GLuint) {
        self.record("glBindVertexArray", &[array as i64]);
        self.state
            .borrow_mut()
            .bindings
            .insert(gl::VERTEX_ARRAY_BINDING, array);
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record("glEnableVertexAttribArray", &[index as i64]);
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
        self.record(
            "glVertexAttribPointer",
            &[
                index as i64,
                size as i64,
                ty as i64,
                normalized as i64,
                stride as i64,
                offset as i64,
            ],
        );
    }

    fn vertex_attrib_divisor(&self, index: GLuint, divisor: GLuint) {
        self.record("glVertexAttribDivisor", &[index as i64, divisor as i64]);
    }

    //----------------------------------------------------------------------------------------------
    fn enable(&self, cap: GLenum) {
        self.record("glEnable", &[cap as i64]);
        self.state.borrow_mut().enabled.insert(cap);
    }

    fn disable(&self, cap: GLenum) {
        self.record("glDisable", &[cap as i64]);
        self.state.borrow_mut().enabled.remove(&cap);
    }

    fn is_enabled(&self, cap: GLenum) -> bool {
        self.state.borrow().enabled.contains(&cap)
    }

    fn blend_func_separate(&self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) {
        self.record(
            "glBlendFuncSeparate",
            &[src_rgb as i64, dst_rgb as i64, src_alpha as i64, dst_alpha as i64],
        );
    }

    fn blend_equation_separate(&self, mode_rgb: GLenum, mode_alpha: GLenum) {
        self.record("glBlendEquationSeparate", &[mode_rgb as i64, mode_alpha as i64]);
    }

    fn blend_color(&self, _r: GLfloat, _g: GLfloat, _b: GLfloat, _a: GLfloat) {
        self.record("glBlendColor", &[]);
    }

    fn color_mask(&self, r: bool, g: bool, b: bool, a: bool) {
        self.record("glColorMask", &[r as i64, g as i64, b as i64, a as i64]);
    }

    fn depth_mask(&self, flag: bool) {
        self.record("glDepthMask", &[flag as i64]);
    }

    fn depth_func(&self, func: GLenum) {
        self.record("glDepthFunc", &[func as i64]);
    }

    fn front_face(&self, mode: GLenum) {
        self.record("glFrontFace", &[mode as i64]);
    }

    fn cull_face(&self, mode: GLenum) {
        self.record("glCullFace", &[mode as i64]);
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        self.record("glPolygonMode", &[face as i64, mode as i64]);
    }

    fn polygon_offset(&self, _factor: GLfloat, _units: GLfloat) {
        self.record("glPolygonOffset", &[]);
    }

    fn stencil_func(&self, func: GLenum, reference: GLint, mask: GLuint) {
        self.record("glStencilFunc", &[func as i64, reference as i64, mask as i64]);
        let mut state = self.state.borrow_mut();
        state.integers.insert(gl::STENCIL_FUNC, func as GLint);
        state.integers.insert(gl::STENCIL_REF, reference);
        state.integers.insert(gl::STENCIL_VALUE_MASK, mask as GLint);
    }

    fn stencil_op(&self, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        self.record("glStencilOp", &[sfail as i64, dpfail as i64, dppass as i64]);
        let mut state = self.state.borrow_mut();
        state.integers.insert(gl::STENCIL_FAIL, sfail as GLint);
        state.integers.insert(gl::STENCIL_PASS_DEPTH_FAIL, dpfail as GLint);
        state.integers.insert(gl::STENCIL_PASS_DEPTH_PASS, dppass as GLint);
    }

    fn stencil_mask(&self, mask: GLuint) {
        self.record("glStencilMask", &[mask as i64]);
        self.state
            .borrow_mut()
            .integers
            .insert(gl::STENCIL_WRITEMASK, mask as GLint);
    }

    fn sample_mask_i(&self, index: GLuint, mask: GLbitfield) {
        self.record("glSampleMaski", &[index as i64, mask as i64]);
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record("glViewport", &[x as i64, y as i64, width as i64, height as i64]);
    }

    fn scissor(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record("glScissor", &[x as i64, y as i64, width as i64, height as i64]);
    }

    fn clear_color(&self, _r: GLfloat, _g: GLfloat, _b: GLfloat, _a: GLfloat) {
        self.record("glClearColor", &[]);
    }

    fn clear_depth(&self, _depth: GLdouble) {
        self.record("glClearDepth", &[]);
    }

    fn clear_stencil(&self, s: GLint) {
        self.record("glClearStencil", &[s as i64]);
    }

    fn clear(&self, mask: GLbitfield) {
        self.record("glClear", &[mask as i64]);
    }

    //----------------------------------------------------------------------------------------------
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record("glDrawArrays", &[mode as i64, first as i64, count as i64]);
    }

    fn draw_arrays_instanced_base_instance(
        &self,
        mode: GLenum,
        first: GLint,
        count: GLsizei,
        instances: GLsizei,
        base_instance: GLuint,
    ) {
        self.record(
            "glDrawArraysInstancedBaseInstance",
            &[
                mode as i64,
                first as i64,
                count as i64,
                instances as i64,
                base_instance as i64,
            ],
        );
    }

    fn draw_elements_base_vertex(
        &self,
        mode: GLenum,
        count: GLsizei,
        ty: GLenum,
        offset: usize,
        base_vertex: GLint,
    ) {
        self.record(
            "glDrawElementsBaseVertex",
            &[mode as i64, count as i64, ty as i64, offset as i64, base_vertex as i64],
        );
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
        self.record(
            "glDrawElementsInstancedBaseVertexBaseInstance",
            &[
                mode as i64,
                count as i64,
                ty as i64,
                offset as i64,
                instances as i64,
                base_vertex as i64,
                base_instance as i64,
            ],
        );
    }

    fn draw_mesh_tasks(&self, first: GLuint, count: GLuint) {
        self.record("glDrawMeshTasksNV", &[first as i64, count as i64]);
    }

    fn dispatch_compute(&self, x: GLuint, y: GLuint, z: GLuint) {
        self.record("glDispatchCompute", &[x as i64, y as i64, z as i64]);
        let kernel = self.kernel.borrow();
        if let Some(kernel) = kernel.as_ref() {
            let mut state = self.state.borrow_mut();
            let program = state.bound(gl::CURRENT_PROGRAM);
            let mut dispatch = Dispatch {
                groups: [x, y, z],
                program,
                state: &mut *state,
            };
            kernel(&mut dispatch);
        }
    }

    fn memory_barrier(&self, barriers: GLbitfield) {
        self.record("glMemoryBarrier", &[barriers as i64]);
    }
}
