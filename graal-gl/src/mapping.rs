//! Boundary enums with stable integer values, and their OpenGL translations.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::ext;

macro_rules! gl_enum {
    (
        $(#[$m:meta])*
        pub enum $name:ident {
            $( $(#[$vm:meta])* $variant:ident = $value:literal => $native:expr, )*
        }
    ) => {
        $(#[$m])*
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vm])* $variant = $value, )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Decodes a boundary value.
            pub fn from_raw(raw: u8) -> Option<$name> {
                match raw {
                    $( $value => Some($name::$variant), )*
                    _ => None,
                }
            }

            pub fn to_gl(self) -> GLenum {
                match self {
                    $( $name::$variant => $native, )*
                }
            }
        }
    };
}

gl_enum! {
    /// What a resource is created for; selects the binding target.
    pub enum Usage {
        Unknown = 0 => 0,
        VertexData = 1 => gl::ARRAY_BUFFER,
        VertexIndices = 2 => gl::ELEMENT_ARRAY_BUFFER,
        PixelRead = 3 => gl::PIXEL_PACK_BUFFER,
        PixelWrite = 4 => gl::PIXEL_UNPACK_BUFFER,
        CopyRead = 5 => gl::COPY_READ_BUFFER,
        CopyWrite = 6 => gl::COPY_WRITE_BUFFER,
        TextureBuffer = 7 => gl::TEXTURE_BUFFER,
        Transform = 8 => gl::TRANSFORM_FEEDBACK_BUFFER,
        Uniform = 9 => gl::UNIFORM_BUFFER,
        Texture1D = 10 => gl::TEXTURE_1D,
        Texture2D = 11 => gl::TEXTURE_2D,
        Texture3D = 12 => gl::TEXTURE_3D,
        Texture2DMultisample = 13 => gl::TEXTURE_2D_MULTISAMPLE,
        Texture2DMultisampleProxy = 14 => gl::PROXY_TEXTURE_2D_MULTISAMPLE,
        Renderbuffer = 15 => gl::RENDERBUFFER,
        StorageBuffer = 16 => gl::SHADER_STORAGE_BUFFER,
    }
}

impl Usage {
    pub fn is_multisample(self) -> bool {
        matches!(
            self,
            Usage::Texture2DMultisample | Usage::Texture2DMultisampleProxy
        )
    }
}

gl_enum! {
    /// Shader stage. Also the index of the stage's slot in a pipeline description.
    pub enum ShaderStage {
        Pixel = 0 => gl::FRAGMENT_SHADER,
        Vertex = 1 => gl::VERTEX_SHADER,
        Geometry = 2 => gl::GEOMETRY_SHADER,
        Hull = 3 => gl::TESS_CONTROL_SHADER,
        Domain = 4 => gl::TESS_EVALUATION_SHADER,
        Compute = 5 => gl::COMPUTE_SHADER,
        Mesh = 6 => ext::MESH_SHADER_NV,
        Task = 7 => ext::TASK_SHADER_NV,
    }
}

impl ShaderStage {
    pub const COUNT: usize = 8;
}

gl_enum! {
    /// Element type of a vertex attribute or shader parameter.
    ///
    /// The resource types have no vertex attribute equivalent and translate to 0.
    pub enum ShaderType {
        Half = 0 => gl::HALF_FLOAT,
        Float = 1 => gl::FLOAT,
        Double = 2 => gl::DOUBLE,
        Int = 3 => gl::INT,
        UInt = 4 => gl::UNSIGNED_INT,
        Color32 = 5 => gl::UNSIGNED_INT,
        Texture = 6 => 0,
        TextureCube = 7 => 0,
        Buffer = 8 => 0,
    }
}

gl_enum! {
    /// Depth, stencil and sampler comparison. `Disabled` leaves the test untouched.
    pub enum Comparison {
        Disabled = 0 => 0,
        Never = 1 => gl::NEVER,
        Less = 2 => gl::LESS,
        Equal = 3 => gl::EQUAL,
        LessEqual = 4 => gl::LEQUAL,
        Greater = 5 => gl::GREATER,
        NotEqual = 6 => gl::NOTEQUAL,
        GreaterEqual = 7 => gl::GEQUAL,
        Always = 8 => gl::ALWAYS,
    }
}

gl_enum! {
    pub enum Primitive {
        Point = 0 => gl::POINTS,
        Line = 1 => gl::LINES,
        Triangle = 2 => gl::TRIANGLES,
        LineStrip = 3 => gl::LINE_STRIP,
        TriangleStrip = 4 => gl::TRIANGLE_STRIP,
        LineAdjacency = 5 => gl::LINES_ADJACENCY,
        TriangleAdjacency = 6 => gl::TRIANGLES_ADJACENCY,
        LineStripAdjacency = 7 => gl::LINE_STRIP_ADJACENCY,
        TriangleStripAdjacency = 8 => gl::TRIANGLE_STRIP_ADJACENCY,
    }
}

gl_enum! {
    /// Blend factor. Values 12 and 13 are unassigned.
    pub enum BlendOperand {
        Zero = 1 => gl::ZERO,
        One = 2 => gl::ONE,
        SrcColor = 3 => gl::SRC_COLOR,
        InvSrcColor = 4 => gl::ONE_MINUS_SRC_COLOR,
        SrcAlpha = 5 => gl::SRC_ALPHA,
        InvSrcAlpha = 6 => gl::ONE_MINUS_SRC_ALPHA,
        DstAlpha = 7 => gl::DST_ALPHA,
        InvDstAlpha = 8 => gl::ONE_MINUS_DST_ALPHA,
        DstColor = 9 => gl::DST_COLOR,
        InvDstColor = 10 => gl::ONE_MINUS_DST_COLOR,
        SrcAlphaSaturate = 11 => gl::SRC_ALPHA_SATURATE,
        BlendFactor = 14 => gl::CONSTANT_COLOR,
        InvBlendFactor = 15 => gl::ONE_MINUS_CONSTANT_COLOR,
        Src1Color = 16 => gl::SRC1_COLOR,
        InvSrc1Color = 17 => gl::ONE_MINUS_SRC1_COLOR,
        Src1Alpha = 18 => gl::SRC1_ALPHA,
        InvSrc1Alpha = 19 => gl::ONE_MINUS_SRC1_ALPHA,
    }
}

gl_enum! {
    pub enum BlendOp {
        Add = 1 => gl::FUNC_ADD,
        Subtract = 2 => gl::FUNC_SUBTRACT,
        RevSubtract = 3 => gl::FUNC_REVERSE_SUBTRACT,
        Min = 4 => gl::MIN,
        Max = 5 => gl::MAX,
    }
}

gl_enum! {
    /// Stencil operation. `None` keeps whatever the driver currently has.
    pub enum StencilOp {
        None = 0 => 0,
        Keep = 1 => gl::KEEP,
        Zero = 2 => gl::ZERO,
        Replace = 3 => gl::REPLACE,
        IncrSat = 4 => gl::INCR,
        DecrSat = 5 => gl::DECR,
        Invert = 6 => gl::INVERT,
        Incr = 7 => gl::INCR_WRAP,
        Decr = 8 => gl::DECR_WRAP,
    }
}

gl_enum! {
    pub enum Fill {
        Fill = 0 => gl::FILL,
        Line = 1 => gl::LINE,
        Point = 2 => gl::POINT,
    }
}

gl_enum! {
    /// Face culling. `None` disables `GL_CULL_FACE`.
    pub enum Cull {
        None = 0 => 0,
        Front = 1 => gl::FRONT,
        Back = 2 => gl::BACK,
    }
}

gl_enum! {
    /// Texture coordinate wrapping. 0 leaves the axis at the driver default.
    pub enum AddressMode {
        Wrap = 1 => gl::REPEAT,
        Mirror = 2 => gl::MIRRORED_REPEAT,
        Clamp = 3 => gl::CLAMP_TO_EDGE,
        Border = 4 => gl::CLAMP_TO_BORDER,
        MirrorOnce = 5 => gl::MIRROR_CLAMP_TO_EDGE,
    }
}

/// `GL_UNSIGNED_{BYTE,SHORT,INT}` for an index stride of 1, 2 or 4 bytes.
pub fn index_type(stride: u8) -> Option<GLenum> {
    match stride {
        1 => Some(gl::UNSIGNED_BYTE),
        2 => Some(gl::UNSIGNED_SHORT),
        4 => Some(gl::UNSIGNED_INT),
        _ => None,
    }
}
