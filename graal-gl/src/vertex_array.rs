use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::buffer::Buffer;
use crate::error::GlResult;
use crate::handle::{BindRef, Owned};
use crate::program::ProgramObject;
use crate::types::VertexParameter;
use tracing::{debug, trace};

// vertex array: describes where the vertex stage reads its inputs from

impl_handle_type!(
    /// Vertex array object name.
    pub struct VertexArrayObject { kind: "vertex array", is: is_vertex_array, delete: delete_vertex_array }
);

/// A vertex buffer and the byte stride between its vertices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexBuffer {
    pub buffer: Buffer,
    pub stride: u32,
}

impl VertexArrayObject {
    /// Builds a vertex array reading `attributes` from `vertex_buffers`, with `index_buffer` as
    /// its element array.
    pub fn create(
        gl: &Gl,
        program: ProgramObject,
        attributes: &[VertexParameter],
        vertex_buffers: &[VertexBuffer],
        index_buffer: Option<Buffer>,
    ) -> GlResult<Owned<VertexArrayObject>> {
        for attr in attributes {
            if attr.index as usize >= vertex_buffers.len() {
                return Err(gl_error!(
                    InvalidParameter("Parameter index exceeds buffer count"),
                    "VertexArrayObject::create"
                ));
            }
            if attr.ty.to_gl() == 0 {
                return Err(gl_error!(InvalidShaderType(attr.ty as u8), "VertexArrayObject::create"));
            }
        }

        let vao = Owned::new(gl, VertexArrayObject(gl.gen_vertex_array()));
        gl.check("glGenVertexArrays")?;
        let _bind = vao.bind(gl)?;

        // the element array binding is part of the vertex array state, and stays
        if let Some(index_buffer) = index_buffer {
            gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer.raw());
            gl.check("glBindBuffer")?;
        }

        for attr in attributes {
            let source = vertex_buffers[attr.index as usize];
            let _buffer = source.buffer.bind(gl, gl::ARRAY_BUFFER)?;

            let location = gl.get_attrib_location(program.raw(), attr.name);
            if location < 0 {
                debug!(name = attr.name, "vertex attribute not used by the program");
                continue;
            }
            let location = location as GLuint;
            gl.enable_vertex_attrib_array(location);
            gl.check("glEnableVertexAttribArray")?;

            let size = attr.length as GLint * attr.multi.max(1) as GLint;
            gl.vertex_attrib_pointer(
                location,
                size,
                attr.ty.to_gl(),
                false,
                source.stride as GLsizei,
                attr.offset as usize,
            );
            gl.check("glVertexAttribPointer")?;

            let divisor = if attr.per_instance {
                attr.step.max(1)
            } else {
                attr.step
            };
            gl.vertex_attrib_divisor(location, divisor);
            gl.check("glVertexAttribDivisor")?;
        }

        trace!(name = vao.raw(), attributes = attributes.len(), "created vertex array");
        Ok(vao)
    }

    pub fn bind(&self, gl: &Gl) -> GlResult<BindRef> {
        let guard = BindRef::vertex_array(gl, self.0);
        gl.check("glBindVertexArray")?;
        Ok(guard)
    }
}
