//! Object names, single-owner handles, bind guards and the tagged boundary handle.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::Gl;
use crate::error::GlResult;
use std::{fmt, mem, ops::Deref};
use tracing::{trace, warn};

/// A non-owning, copyable OpenGL object name of a particular kind.
pub trait GlObject: Copy + Default + Eq + fmt::Debug {
    /// Human-readable kind, used in logs.
    const KIND: &'static str;

    fn from_name(name: GLuint) -> Self;
    fn name(&self) -> GLuint;
    /// Native `glIsX` query.
    fn is_live(gl: &Gl, name: GLuint) -> bool;
    /// Native deletion.
    fn delete(gl: &Gl, name: GLuint);
}

macro_rules! impl_handle_type {
    ($(#[$m:meta])* $v:vis struct $name:ident { kind: $kind:expr, is: $is:ident, delete: $delete:ident }) => {
        $(#[$m])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $v struct $name($crate::api::gl::types::GLuint);

        impl $name {
            /// Wraps a raw object name. The name is not checked.
            $v const fn from_raw(obj: $crate::api::gl::types::GLuint) -> $name {
                $name(obj)
            }

            $v const fn raw(self) -> $crate::api::gl::types::GLuint {
                self.0
            }
        }

        impl $crate::handle::GlObject for $name {
            const KIND: &'static str = $kind;

            fn from_name(name: $crate::api::gl::types::GLuint) -> Self {
                $name(name)
            }

            fn name(&self) -> $crate::api::gl::types::GLuint {
                self.0
            }

            fn is_live(gl: &$crate::api::Gl, name: $crate::api::gl::types::GLuint) -> bool {
                gl.$is(name)
            }

            fn delete(gl: &$crate::api::Gl, name: $crate::api::gl::types::GLuint) {
                gl.$delete(name)
            }
        }
    };
}

//--------------------------------------------------------------------------------------------------

/// Owns one OpenGL object and deletes it exactly once.
///
/// Not clonable. `release` hands the name out and leaves the owner empty; dropping an empty owner
/// does nothing.
pub struct Owned<T: GlObject> {
    gl: Gl,
    obj: T,
}

impl<T: GlObject> Owned<T> {
    pub fn new(gl: &Gl, obj: T) -> Owned<T> {
        Owned {
            gl: gl.clone(),
            obj,
        }
    }

    /// An owner holding nothing.
    pub fn empty(gl: &Gl) -> Owned<T> {
        Owned::new(gl, T::default())
    }

    pub fn get(&self) -> T {
        self.obj
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    pub fn is_empty(&self) -> bool {
        self.obj.name() == 0
    }

    /// Non-empty and recognized by the driver.
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && T::is_live(&self.gl, self.obj.name())
    }

    /// Gives up ownership without deleting the object.
    pub fn release(&mut self) -> T {
        mem::take(&mut self.obj)
    }

    pub fn into_inner(mut self) -> T {
        self.release()
    }

    /// Deletes the object if there is one. Calling it again is a no-op.
    pub fn reset(&mut self) -> GlResult<()> {
        let obj = self.release();
        if obj.name() == 0 {
            return Ok(());
        }
        trace!(kind = T::KIND, name = obj.name(), "delete");
        T::delete(&self.gl, obj.name());
        self.gl.check("glDelete*")
    }
}

impl<T: GlObject> Deref for Owned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.obj
    }
}

impl<T: GlObject> Drop for Owned<T> {
    fn drop(&mut self) {
        if let Err(e) = self.reset() {
            warn!(kind = T::KIND, "failed to delete object: {}", e);
        }
    }
}

impl<T: GlObject> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.obj).finish()
    }
}

//--------------------------------------------------------------------------------------------------

/// The query returning the object currently bound to `target`.
pub fn binding_query(target: GLenum) -> Option<GLenum> {
    Some(match target {
        gl::ARRAY_BUFFER => gl::ARRAY_BUFFER_BINDING,
        gl::ELEMENT_ARRAY_BUFFER => gl::ELEMENT_ARRAY_BUFFER_BINDING,
        gl::COPY_READ_BUFFER => gl::COPY_READ_BUFFER_BINDING,
        gl::COPY_WRITE_BUFFER => gl::COPY_WRITE_BUFFER_BINDING,
        gl::PIXEL_PACK_BUFFER => gl::PIXEL_PACK_BUFFER_BINDING,
        gl::PIXEL_UNPACK_BUFFER => gl::PIXEL_UNPACK_BUFFER_BINDING,
        gl::UNIFORM_BUFFER => gl::UNIFORM_BUFFER_BINDING,
        gl::SHADER_STORAGE_BUFFER => gl::SHADER_STORAGE_BUFFER_BINDING,
        gl::TRANSFORM_FEEDBACK_BUFFER => gl::TRANSFORM_FEEDBACK_BUFFER_BINDING,
        gl::TEXTURE_1D => gl::TEXTURE_BINDING_1D,
        gl::TEXTURE_2D => gl::TEXTURE_BINDING_2D,
        gl::TEXTURE_3D => gl::TEXTURE_BINDING_3D,
        gl::TEXTURE_2D_MULTISAMPLE => gl::TEXTURE_BINDING_2D_MULTISAMPLE,
        gl::RENDERBUFFER => gl::RENDERBUFFER_BINDING,
        gl::FRAMEBUFFER | gl::DRAW_FRAMEBUFFER => gl::DRAW_FRAMEBUFFER_BINDING,
        gl::READ_FRAMEBUFFER => gl::READ_FRAMEBUFFER_BINDING,
        _ => return None,
    })
}

/// Restores the previous binding of a target when dropped.
#[must_use = "the binding is undone as soon as the guard is dropped"]
pub struct BindRef {
    gl: Gl,
    target: GLenum,
    previous: GLuint,
    rebind: fn(&Gl, GLenum, GLuint),
}

impl BindRef {
    /// Binds `name` to `target` with `bind`, remembering what was bound before.
    pub fn new(gl: &Gl, target: GLenum, name: GLuint, bind: fn(&Gl, GLenum, GLuint)) -> BindRef {
        let previous = binding_query(target)
            .map(|q| gl.get_integer(q) as GLuint)
            .unwrap_or(0);
        bind(gl, target, name);
        BindRef {
            gl: gl.clone(),
            target,
            previous,
            rebind: bind,
        }
    }

    /// Binds a vertex array object.
    pub fn vertex_array(gl: &Gl, name: GLuint) -> BindRef {
        let previous = gl.get_integer(gl::VERTEX_ARRAY_BINDING) as GLuint;
        gl.bind_vertex_array(name);
        BindRef {
            gl: gl.clone(),
            target: gl::VERTEX_ARRAY_BINDING,
            previous,
            rebind: |gl, _, name| gl.bind_vertex_array(name),
        }
    }

    pub fn target(&self) -> GLenum {
        self.target
    }

    pub fn previous(&self) -> GLuint {
        self.previous
    }
}

impl Drop for BindRef {
    fn drop(&mut self) {
        (self.rebind)(&self.gl, self.target, self.previous);
    }
}

//--------------------------------------------------------------------------------------------------

/// Object categories that can cross the boundary inside a [`ResourceHandle`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Texture = 1,
    Buffer = 2,
    Framebuffer = 3,
    Renderbuffer = 4,
    Sampler = 5,
}

impl Category {
    pub fn from_tag(tag: u8) -> Option<Category> {
        match tag {
            1 => Some(Category::Texture),
            2 => Some(Category::Buffer),
            3 => Some(Category::Framebuffer),
            4 => Some(Category::Renderbuffer),
            5 => Some(Category::Sampler),
            _ => None,
        }
    }

    fn is_live(self, gl: &Gl, name: GLuint) -> bool {
        match self {
            Category::Texture => gl.is_texture(name),
            Category::Buffer => gl.is_buffer(name),
            Category::Framebuffer => gl.is_framebuffer(name),
            Category::Renderbuffer => gl.is_renderbuffer(name),
            Category::Sampler => gl.is_sampler(name),
        }
    }
}

const TAG_BITS: u32 = 3;
const TAG_SHIFT: u32 = (mem::size_of::<usize>() as u32) * 8 - TAG_BITS;
const NAME_MASK: usize = (1 << TAG_SHIFT) - 1;

/// Opaque word exchanged across the graphics interface: a category tag in the top three bits,
/// the object name in the rest.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceHandle(usize);

impl ResourceHandle {
    pub const NULL: ResourceHandle = ResourceHandle(0);

    pub fn new(category: Category, name: GLuint) -> ResourceHandle {
        ResourceHandle(((category as usize) << TAG_SHIFT) | (name as usize & NAME_MASK))
    }

    pub const fn from_raw(raw: usize) -> ResourceHandle {
        ResourceHandle(raw)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn category(self) -> Option<Category> {
        Category::from_tag((self.0 >> TAG_SHIFT) as u8)
    }

    pub fn name(self) -> GLuint {
        (self.0 & NAME_MASK) as GLuint
    }

    /// The object name if the tag says `category`, without asking the driver.
    pub fn name_if(self, category: Category) -> Option<GLuint> {
        if self.category() == Some(category) {
            Some(self.name())
        } else {
            None
        }
    }

    /// Tag check, then the driver's `glIsX` for that category.
    pub fn validate(self, gl: &Gl, category: Category) -> Option<GLuint> {
        let name = self.name_if(category)?;
        if category.is_live(gl, name) {
            Some(name)
        } else {
            None
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.category() {
            Some(c) => write!(f, "ResourceHandle({:?} {})", c, self.name()),
            None if self.is_null() => write!(f, "ResourceHandle(NULL)"),
            None => write!(f, "ResourceHandle(invalid {:#x})", self.0),
        }
    }
}
