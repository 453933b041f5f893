//! Linked programs, and the per-draw upload of their parameters.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::buffer::Buffer;
use crate::error::GlResult;
use crate::handle::Owned;
use crate::mapping::ShaderType;
use crate::shader::ShaderObject;
use crate::texture::Texture;
use crate::types::{ShaderParameter, ShaderValue};
use tracing::trace;

impl_handle_type!(
    /// Program object name.
    pub struct ProgramObject { kind: "program", is: is_program, delete: delete_program }
);

impl ProgramObject {
    pub fn create(gl: &Gl) -> GlResult<Owned<ProgramObject>> {
        let program = Owned::new(gl, ProgramObject(gl.create_program()));
        gl.check("glCreateProgram")?;
        if program.is_empty() {
            return Err(gl_error!(Null("glCreateProgram returned 0"), "ProgramObject::create"));
        }
        Ok(program)
    }

    /// Attaches a compiled shader. The program does not take ownership of it.
    pub fn attach(&self, gl: &Gl, shader: ShaderObject) -> GlResult<()> {
        gl.attach_shader(self.0, shader.raw());
        gl.check("glAttachShader")
    }

    /// Links, then validates the program.
    pub fn link(&self, gl: &Gl) -> GlResult<()> {
        gl.link_program(self.0);
        gl.check("glLinkProgram")?;
        if gl.get_program_iv(self.0, gl::LINK_STATUS) != gl::TRUE as GLint {
            return Err(gl_error!(ProgramLink(self.log(gl)), "glLinkProgram"));
        }
        gl.validate_program(self.0);
        gl.check("glValidateProgram")?;
        trace!(name = self.0, "linked program");
        Ok(())
    }

    pub fn log(&self, gl: &Gl) -> String {
        gl.get_program_info_log(self.0)
    }

    /// Passed validation against the current driver state.
    pub fn is_validated(&self, gl: &Gl) -> bool {
        gl.is_program(self.0) && gl.get_program_iv(self.0, gl::VALIDATE_STATUS) == gl::TRUE as GLint
    }

    /// Uploads one parameter. The program must be in use.
    pub fn push_parameter(&self, gl: &Gl, param: &ShaderParameter, value: &ShaderValue) -> GlResult<()> {
        match param.ty {
            ShaderType::Buffer => {
                let buffer = resource(value)
                    .and_then(|h| Buffer::validate(gl, h))
                    .ok_or_else(|| gl_error!(CategoryMismatch, "ProgramObject::push_parameter"))?;
                if param.length == 0 {
                    gl.bind_buffer_base(gl::SHADER_STORAGE_BUFFER, param.count, buffer.raw());
                    gl.check("glBindBufferBase")
                } else {
                    gl.bind_buffer_range(
                        gl::SHADER_STORAGE_BUFFER,
                        param.count,
                        buffer.raw(),
                        param.width as GLintptr,
                        param.length as GLsizeiptr,
                    );
                    gl.check("glBindBufferRange")
                }
            }
            ShaderType::Texture | ShaderType::TextureCube => {
                let texture = resource(value)
                    .and_then(|h| Texture::validate(gl, h))
                    .ok_or_else(|| gl_error!(CategoryMismatch, "ProgramObject::push_parameter"))?;
                let target = if param.ty == ShaderType::TextureCube {
                    gl::TEXTURE_CUBE_MAP
                } else {
                    gl::TEXTURE_2D
                };
                gl.active_texture(gl::TEXTURE0 + param.count);
                gl.check("glActiveTexture")?;
                gl.bind_texture(target, texture.raw());
                gl.check("glBindTexture")?;
                if !param.name.is_empty() {
                    let location = gl.get_uniform_location(self.0, param.name);
                    gl.uniform_iv(location, 1, &[param.count as GLint]);
                    gl.check("glUniform1iv")?;
                }
                Ok(())
            }
            ty => {
                let utype = uniform_type(ty, param.length, param.width);
                let location = gl.get_uniform_location(self.0, param.name);
                set_uniform(gl, location, utype, param.count.max(1), value)
            }
        }
    }
}

fn resource(value: &ShaderValue) -> Option<crate::handle::ResourceHandle> {
    match *value {
        ShaderValue::Resource(h) => Some(h),
        _ => None,
    }
}

/// The GL uniform type of a parameter with `length` components and `multi` columns, or 0 if
/// there is none.
pub fn uniform_type(ty: ShaderType, length: u32, multi: u32) -> GLenum {
    if multi > 1 && ty != ShaderType::Float {
        return 0;
    }
    match ty {
        ShaderType::Float => match (multi.max(1), length) {
            (1, 1) => gl::FLOAT,
            (1, 2) => gl::FLOAT_VEC2,
            (1, 3) => gl::FLOAT_VEC3,
            (1, 4) => gl::FLOAT_VEC4,
            (2, 1) => gl::FLOAT_VEC2,
            (2, 2) => gl::FLOAT_MAT2,
            (2, 3) => gl::FLOAT_MAT2x3,
            (2, 4) => gl::FLOAT_MAT2x4,
            (3, 1) => gl::FLOAT_VEC3,
            (3, 2) => gl::FLOAT_MAT3x2,
            (3, 3) => gl::FLOAT_MAT3,
            (3, 4) => gl::FLOAT_MAT3x4,
            (4, 1) => gl::FLOAT_VEC4,
            (4, 2) => gl::FLOAT_MAT4x2,
            (4, 3) => gl::FLOAT_MAT4x3,
            (4, 4) => gl::FLOAT_MAT4,
            _ => 0,
        },
        ShaderType::Double if length == 1 => gl::DOUBLE,
        ShaderType::Half if length == 1 => gl::HALF_FLOAT,
        ShaderType::Int => match length {
            1 => gl::INT,
            2 => gl::INT_VEC2,
            3 => gl::INT_VEC3,
            4 => gl::INT_VEC4,
            _ => 0,
        },
        ShaderType::UInt => match length {
            1 => gl::UNSIGNED_INT,
            2 => gl::UNSIGNED_INT_VEC2,
            3 => gl::UNSIGNED_INT_VEC3,
            4 => gl::UNSIGNED_INT_VEC4,
            _ => 0,
        },
        ShaderType::Texture | ShaderType::TextureCube => gl::TEXTURE0 + length,
        _ => 0,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum UniformShape {
    Float(u8),
    Int(u8),
    UInt(u8),
    Matrix { cols: u8, rows: u8 },
    Double,
}

impl UniformShape {
    fn of(utype: GLenum) -> Option<UniformShape> {
        use UniformShape::*;
        Some(match utype {
            gl::FLOAT | gl::HALF_FLOAT => Float(1),
            gl::FLOAT_VEC2 => Float(2),
            gl::FLOAT_VEC3 => Float(3),
            gl::FLOAT_VEC4 => Float(4),
            gl::INT | gl::BOOL => Int(1),
            gl::INT_VEC2 | gl::BOOL_VEC2 => Int(2),
            gl::INT_VEC3 | gl::BOOL_VEC3 => Int(3),
            gl::INT_VEC4 | gl::BOOL_VEC4 => Int(4),
            gl::UNSIGNED_INT => UInt(1),
            gl::UNSIGNED_INT_VEC2 => UInt(2),
            gl::UNSIGNED_INT_VEC3 => UInt(3),
            gl::UNSIGNED_INT_VEC4 => UInt(4),
            gl::FLOAT_MAT2 => Matrix { cols: 2, rows: 2 },
            gl::FLOAT_MAT2x3 => Matrix { cols: 2, rows: 3 },
            gl::FLOAT_MAT2x4 => Matrix { cols: 2, rows: 4 },
            gl::FLOAT_MAT3x2 => Matrix { cols: 3, rows: 2 },
            gl::FLOAT_MAT3 => Matrix { cols: 3, rows: 3 },
            gl::FLOAT_MAT3x4 => Matrix { cols: 3, rows: 4 },
            gl::FLOAT_MAT4x2 => Matrix { cols: 4, rows: 2 },
            gl::FLOAT_MAT4x3 => Matrix { cols: 4, rows: 3 },
            gl::FLOAT_MAT4 => Matrix { cols: 4, rows: 4 },
            gl::DOUBLE
            | gl::DOUBLE_VEC2
            | gl::DOUBLE_VEC3
            | gl::DOUBLE_VEC4
            | gl::DOUBLE_MAT2
            | gl::DOUBLE_MAT3
            | gl::DOUBLE_MAT4 => Double,
            _ => return None,
        })
    }

    fn components(self) -> usize {
        match self {
            UniformShape::Float(n) | UniformShape::Int(n) | UniformShape::UInt(n) => n as usize,
            UniformShape::Matrix { cols, rows } => (cols * rows) as usize,
            UniformShape::Double => 1,
        }
    }
}

/// Takes the first `n` values, or fails if there are fewer.
fn take<T>(values: &[T], n: usize) -> GlResult<&[T]> {
    values
        .get(..n)
        .ok_or_else(|| gl_error!(InvalidParameter("too few values for uniform"), "set_uniform"))
}

/// Uploads `count` elements of uniform type `utype` at `location` of the program in use.
pub fn set_uniform(gl: &Gl, location: GLint, utype: GLenum, count: u32, value: &ShaderValue) -> GlResult<()> {
    let shape = match UniformShape::of(utype) {
        Some(shape) => shape,
        None if utype == 0 => return Err(gl_error!(InvalidShaderType(0), "set_uniform")),
        None => return Err(gl_error!(InvalidParameter("unsupported uniform type"), "set_uniform")),
    };
    let n = shape.components() * count as usize;
    let mismatch = || gl_error!(InvalidParameter("value does not match the uniform type"), "set_uniform");

    match shape {
        UniformShape::Double => Err(gl_error!(NotImplemented("double uniforms"), "set_uniform")),
        UniformShape::Float(size) => {
            match *value {
                ShaderValue::Float(v) => gl.uniform_fv(location, size, take(&[v], n)?),
                ShaderValue::Floats(v) => gl.uniform_fv(location, size, take(v, n)?),
                _ => return Err(mismatch()),
            }
            gl.check("glUniform*fv")
        }
        UniformShape::Int(size) => {
            match *value {
                ShaderValue::Int(v) => gl.uniform_iv(location, size, take(&[v], n)?),
                ShaderValue::Ints(v) => gl.uniform_iv(location, size, take(v, n)?),
                _ => return Err(mismatch()),
            }
            gl.check("glUniform*iv")
        }
        UniformShape::UInt(size) => {
            match *value {
                ShaderValue::UInt(v) => gl.uniform_uiv(location, size, take(&[v], n)?),
                ShaderValue::UInts(v) => gl.uniform_uiv(location, size, take(v, n)?),
                _ => return Err(mismatch()),
            }
            gl.check("glUniform*uiv")
        }
        UniformShape::Matrix { cols, rows } => {
            match *value {
                ShaderValue::Floats(v) => gl.uniform_matrix_fv(location, cols, rows, take(v, n)?),
                _ => return Err(mismatch()),
            }
            gl.check("glUniformMatrix*fv")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Driver, RecordingDriver, UniformValue};
    use crate::error::ErrorKind;
    use crate::mapping::ShaderStage;
    use std::rc::Rc;

    fn linked(driver: &Rc<RecordingDriver>) -> (Gl, Owned<ProgramObject>, Owned<ShaderObject>) {
        let gl = Gl::from_rc(driver.clone());
        let shader = ShaderObject::create(&gl, "void main() {}", ShaderStage::Compute).unwrap();
        let program = ProgramObject::create(&gl).unwrap();
        program.attach(&gl, shader.get()).unwrap();
        program.link(&gl).unwrap();
        gl.use_program(program.raw());
        (gl, program, shader)
    }

    #[test]
    fn uniform_types_by_shape() {
        assert_eq!(uniform_type(ShaderType::Float, 3, 0), gl::FLOAT_VEC3);
        assert_eq!(uniform_type(ShaderType::Float, 1, 3), gl::FLOAT_VEC3);
        assert_eq!(uniform_type(ShaderType::Float, 3, 2), gl::FLOAT_MAT2x3);
        assert_eq!(uniform_type(ShaderType::Float, 2, 4), gl::FLOAT_MAT4x2);
        assert_eq!(uniform_type(ShaderType::Float, 4, 4), gl::FLOAT_MAT4);
        assert_eq!(uniform_type(ShaderType::Int, 2, 2), 0);
        assert_eq!(uniform_type(ShaderType::UInt, 4, 1), gl::UNSIGNED_INT_VEC4);
        assert_eq!(uniform_type(ShaderType::Double, 1, 0), gl::DOUBLE);
        assert_eq!(uniform_type(ShaderType::Double, 2, 0), 0);
        assert_eq!(uniform_type(ShaderType::Texture, 3, 0), gl::TEXTURE3);
        assert_eq!(uniform_type(ShaderType::Float, 5, 0), 0);
    }

    #[test]
    fn link_failure_returns_log() {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        let program = ProgramObject::create(&gl).unwrap();
        let err = program.link(&gl).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ProgramLink(ref log) if log.contains("no compiled shader")));
        assert_eq!(driver.call_count("glValidateProgram"), 0);
        assert!(!program.is_validated(&gl));
    }

    #[test]
    fn dispatch_by_shape() {
        let driver = Rc::new(RecordingDriver::new());
        let (gl, program, _shader) = linked(&driver);

        driver.clear_calls();
        let m = [1.0f32; 16];
        set_uniform(&gl, 0, gl::FLOAT_MAT3x4, 1, &ShaderValue::Floats(&m)).unwrap();
        set_uniform(&gl, 1, gl::INT_VEC2, 1, &ShaderValue::Ints(&[1, 2])).unwrap();
        set_uniform(&gl, 2, gl::UNSIGNED_INT, 1, &ShaderValue::UInt(7)).unwrap();
        set_uniform(&gl, 3, gl::FLOAT_VEC4, 2, &ShaderValue::Floats(&[0.5; 8])).unwrap();
        assert_eq!(
            driver.call_names(),
            vec!["glUniformMatrix3x4fv", "glUniform2iv", "glUniform1uiv", "glUniform4fv"]
        );
        assert!(program.is_validated(&gl));
    }

    #[test]
    fn doubles_and_bad_values() {
        let driver = Rc::new(RecordingDriver::new());
        let (gl, _program, _shader) = linked(&driver);
        let err = set_uniform(&gl, 0, gl::DOUBLE, 1, &ShaderValue::Double(1.0)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotImplemented(_)));
        let err = set_uniform(&gl, 0, 0, 1, &ShaderValue::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidShaderType(0));
        let err = set_uniform(&gl, 0, gl::FLOAT_VEC3, 1, &ShaderValue::Floats(&[1.0])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidParameter(_)));
        let err = set_uniform(&gl, 0, gl::FLOAT, 1, &ShaderValue::Int(1)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidParameter(_)));
    }

    #[test]
    fn plain_parameter_lands_in_program() {
        let driver = Rc::new(RecordingDriver::new());
        let (gl, program, _shader) = linked(&driver);
        program
            .push_parameter(&gl, &ShaderParameter::new("dt", 1, 0, 0, ShaderType::Int), &ShaderValue::Int(3))
            .unwrap();
        assert_eq!(driver.uniform(program.raw(), "dt"), Some(UniformValue::Int(vec![3])));
    }

    #[test]
    fn buffer_parameters_bind_storage_slots() {
        let driver = Rc::new(RecordingDriver::new());
        let (gl, program, _shader) = linked(&driver);
        let buffer = Buffer::create(&gl, gl::SHADER_STORAGE_BUFFER, None, 64).unwrap();
        let value = ShaderValue::Resource(buffer.to_handle());
        program
            .push_parameter(&gl, &ShaderParameter::new("whole", 0, 0, 2, ShaderType::Buffer), &value)
            .unwrap();
        program
            .push_parameter(&gl, &ShaderParameter::new("part", 16, 32, 3, ShaderType::Buffer), &value)
            .unwrap();
        assert_eq!(driver.get_integer_indexed(gl::SHADER_STORAGE_BUFFER_BINDING, 2), buffer.raw() as GLint);
        let range = driver
            .calls()
            .into_iter()
            .find(|c| c.name == "glBindBufferRange")
            .unwrap();
        assert_eq!(range.args, vec![gl::SHADER_STORAGE_BUFFER as i64, 3, buffer.raw() as i64, 32, 16]);

        let texture = Texture::from_raw(driver.gen_texture()).to_handle();
        let err = program
            .push_parameter(
                &gl,
                &ShaderParameter::new("whole", 0, 0, 2, ShaderType::Buffer),
                &ShaderValue::Resource(texture),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CategoryMismatch);
    }

    #[test]
    fn texture_parameters_use_their_unit() {
        let driver = Rc::new(RecordingDriver::new());
        let (gl, program, _shader) = linked(&driver);
        let texture = Texture::from_raw(driver.gen_texture());
        program
            .push_parameter(
                &gl,
                &ShaderParameter::new("albedo", 0, 0, 2, ShaderType::Texture),
                &ShaderValue::Resource(texture.to_handle()),
            )
            .unwrap();
        assert_eq!(driver.bound(gl::TEXTURE_2D), texture.raw());
        assert_eq!(driver.uniform(program.raw(), "albedo"), Some(UniformValue::Int(vec![2])));
    }
}
