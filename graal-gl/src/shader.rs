use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::error::GlResult;
use crate::handle::Owned;
use crate::mapping::ShaderStage;
use tracing::{debug, trace};

impl_handle_type!(
    /// Shader object name.
    pub struct ShaderObject { kind: "shader", is: is_shader, delete: delete_shader }
);

impl ShaderObject {
    /// Compiles GLSL source for `stage`.
    ///
    /// On failure the compiler log is returned as is and the shader object is deleted.
    pub fn create(gl: &Gl, source: &str, stage: ShaderStage) -> GlResult<Owned<ShaderObject>> {
        let shader = Owned::new(gl, ShaderObject(gl.create_shader(stage.to_gl())));
        gl.check("glCreateShader")?;
        if shader.is_empty() {
            return Err(gl_error!(Null("glCreateShader returned 0"), "ShaderObject::create"));
        }
        gl.shader_source(shader.raw(), source);
        gl.check("glShaderSource")?;
        gl.compile_shader(shader.raw());
        gl.check("glCompileShader")?;

        if gl.get_shader_iv(shader.raw(), gl::COMPILE_STATUS) != gl::TRUE as GLint {
            let log = shader.log(gl);
            debug!(?stage, "shader compilation failed");
            return Err(gl_error!(ShaderCompilation(log), "glCompileShader"));
        }
        trace!(name = shader.raw(), ?stage, "compiled shader");
        Ok(shader)
    }

    /// Live and successfully compiled.
    pub fn is_compiled(&self, gl: &Gl) -> bool {
        gl.is_shader(self.0) && gl.get_shader_iv(self.0, gl::COMPILE_STATUS) == gl::TRUE as GLint
    }

    pub fn log(&self, gl: &Gl) -> String {
        gl.get_shader_info_log(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordingDriver;
    use crate::error::ErrorKind;
    use std::rc::Rc;

    #[test]
    fn compile_log_is_returned_verbatim() {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        let err = ShaderObject::create(&gl, "#error 0:12: 'vec5' : undeclared", ShaderStage::Vertex)
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::ShaderCompilation("0:12: 'vec5' : undeclared".to_string())
        );
        assert_eq!(driver.call_count("glDeleteShader"), 1);
        assert_eq!(driver.live_objects(), 0);
    }

    #[test]
    fn compiled_shader_is_valid() {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        let shader = ShaderObject::create(&gl, "void main() {}", ShaderStage::Compute).unwrap();
        assert!(shader.is_compiled(&gl));
        assert_eq!(driver.shader_stage(shader.raw()), Some(gl::COMPUTE_SHADER));
        assert!(!ShaderObject::from_raw(9999).is_compiled(&gl));
    }
}
