//! Plain description types exchanged across the graphics interface.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::handle::ResourceHandle;
use crate::mapping::{BlendOp, BlendOperand, ShaderType};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// 8-bit colour, stored in BGRA order.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color8 {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Color8 {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color8 {
        Color8 { b, g, r, a }
    }

    /// Unpacks `0xAARRGGBB`.
    pub const fn from_argb(v: u32) -> Color8 {
        Color8 {
            b: v as u8,
            g: (v >> 8) as u8,
            r: (v >> 16) as u8,
            a: (v >> 24) as u8,
        }
    }
}

/// 16-bit colour, stored in BGRA order.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color16 {
    pub b: u16,
    pub g: u16,
    pub r: u16,
    pub a: u16,
}

pub type Color = Color16;

impl Color16 {
    pub const TRANSPARENT: Color16 = Color16::rgba(0, 0, 0, 0);
    pub const WHITE: Color16 = Color16::rgba(0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF);

    pub const fn rgba(r: u16, g: u16, b: u16, a: u16) -> Color16 {
        Color16 { b, g, r, a }
    }
}

impl From<Color8> for Color16 {
    fn from(c: Color8) -> Color16 {
        // 0xAB -> 0xABAB keeps full intensity at full intensity
        let w = |v: u8| (v as u16) << 8 | v as u16;
        Color16::rgba(w(c.r), w(c.g), w(c.b), w(c.a))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Rect {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Integer `(x, y, width, height)`: left and top are floored, right and bottom ceiled.
    pub fn to_box(&self) -> (GLint, GLint, GLsizei, GLsizei) {
        let l = self.left.floor() as GLint;
        let t = self.top.floor() as GLint;
        let r = self.right.ceil() as GLint;
        let b = self.bottom.ceil() as GLint;
        (l, t, r - l, b - t)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pos: [f32; 3],
    pub dim: [f32; 3],
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Vec2i {
        Vec2i { x, y }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3i {
    pub const fn new(x: i32, y: i32, z: i32) -> Vec3i {
        Vec3i { x, y, z }
    }

    pub fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

//--------------------------------------------------------------------------------------------------

/// Packed sampler filter: two bits each for mip, mag and min filtering (1 = linear), then the
/// anisotropic and comparison bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(pub u8);

impl Filter {
    pub const MIN_MAG_MIP_POINT: Filter = Filter(0x00);
    pub const MIN_MAG_POINT_MIP_LINEAR: Filter = Filter(0x01);
    pub const MIN_POINT_MAG_LINEAR_MIP_POINT: Filter = Filter(0x04);
    pub const MIN_POINT_MAG_MIP_LINEAR: Filter = Filter(0x05);
    pub const MIN_LINEAR_MAG_MIP_POINT: Filter = Filter(0x10);
    pub const MIN_LINEAR_MAG_POINT_MIP_LINEAR: Filter = Filter(0x11);
    pub const MIN_MAG_LINEAR_MIP_POINT: Filter = Filter(0x14);
    pub const MIN_MAG_MIP_LINEAR: Filter = Filter(0x15);
    pub const ANISOTROPIC: Filter = Filter(0x55);
    pub const COMPARISON: u8 = 0x80;

    pub fn mip_linear(self) -> bool {
        self.0 & 0x03 == 1
    }

    pub fn mag_linear(self) -> bool {
        (self.0 >> 2) & 0x03 == 1
    }

    pub fn min_linear(self) -> bool {
        (self.0 >> 4) & 0x03 == 1
    }

    pub fn anisotropic(self) -> bool {
        self.0 & 0x40 != 0
    }

    pub fn comparison(self) -> bool {
        self.0 & Filter::COMPARISON != 0
    }

    /// The same filter with the comparison bit set.
    pub fn with_comparison(self) -> Filter {
        Filter(self.0 | Filter::COMPARISON)
    }
}

/// How a texture is sampled. Address modes and comparison carry their raw boundary values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampler {
    pub filter: Filter,
    pub addressing: [u8; 3],
    pub max_anisotropy: u8,
    pub comparison: u8,
    pub mip_bias: f32,
    pub min_lod: f32,
    pub max_lod: f32,
    pub border_color: Color16,
}

impl Default for Sampler {
    fn default() -> Sampler {
        Sampler {
            filter: Filter::MIN_MAG_MIP_LINEAR,
            addressing: [0; 3],
            max_anisotropy: 0,
            comparison: 0,
            mip_bias: 0.0,
            min_lod: -1000.0,
            max_lod: 1000.0,
            border_color: Color16::TRANSPARENT,
        }
    }
}

//--------------------------------------------------------------------------------------------------

/// Colour blend equation of a render target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Blend {
    pub src: BlendOperand,
    pub dst: BlendOperand,
    pub op: BlendOp,
    pub src_alpha: BlendOperand,
    pub dst_alpha: BlendOperand,
    pub op_alpha: BlendOp,
    /// RGBA write mask in the low four bits (bit 0 = red).
    pub write_mask: u8,
}

impl Blend {
    /// Straight alpha.
    pub const NORMAL: Blend = Blend {
        src: BlendOperand::SrcAlpha,
        dst: BlendOperand::InvSrcAlpha,
        op: BlendOp::Add,
        src_alpha: BlendOperand::SrcAlpha,
        dst_alpha: BlendOperand::InvSrcAlpha,
        op_alpha: BlendOp::Add,
        write_mask: 0b1111,
    };

    /// Premultiplied alpha.
    pub const PREMULTIPLY: Blend = Blend {
        src: BlendOperand::One,
        dst: BlendOperand::InvSrcAlpha,
        op: BlendOp::Add,
        src_alpha: BlendOperand::One,
        dst_alpha: BlendOperand::InvSrcAlpha,
        op_alpha: BlendOp::Add,
        write_mask: 0b1111,
    };

    /// OpenGL's initial blend state.
    pub const DEFAULT: Blend = Blend {
        src: BlendOperand::One,
        dst: BlendOperand::Zero,
        op: BlendOp::Add,
        src_alpha: BlendOperand::One,
        dst_alpha: BlendOperand::Zero,
        op_alpha: BlendOp::Add,
        write_mask: 0b1111,
    };

    pub fn mask(&self) -> [bool; 4] {
        [
            self.write_mask & 0b0001 != 0,
            self.write_mask & 0b0010 != 0,
            self.write_mask & 0b0100 != 0,
            self.write_mask & 0b1000 != 0,
        ]
    }
}

impl Default for Blend {
    fn default() -> Blend {
        Blend::PREMULTIPLY
    }
}

//--------------------------------------------------------------------------------------------------

/// A shader input set per draw.
///
/// For `Buffer` parameters `width` is the byte offset, `length` the byte size (0 binds the whole
/// buffer) and `count` the storage binding index. For `Texture` parameters `count` is the texture
/// unit. Otherwise `length` is the number of components, `width` the number of columns (0 or 1 for
/// vectors) and `count` the array length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShaderParameter<'a> {
    pub name: &'a str,
    pub length: u32,
    pub width: u32,
    pub count: u32,
    pub ty: ShaderType,
}

impl<'a> ShaderParameter<'a> {
    pub const fn new(name: &'a str, length: u32, width: u32, count: u32, ty: ShaderType) -> Self {
        ShaderParameter {
            name,
            length,
            width,
            count,
            ty,
        }
    }
}

/// Value bound to a [`ShaderParameter`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShaderValue<'a> {
    Float(f32),
    Double(f64),
    Int(i32),
    UInt(u32),
    Floats(&'a [f32]),
    Doubles(&'a [f64]),
    Ints(&'a [i32]),
    UInts(&'a [u32]),
    Resource(ResourceHandle),
}

/// One vertex attribute read from a vertex buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexParameter<'a> {
    pub name: &'a str,
    /// Byte offset inside a vertex.
    pub offset: u32,
    /// Attribute divisor.
    pub step: u32,
    pub length: u8,
    /// Number of columns for matrix attributes; 0 counts as 1.
    pub multi: u8,
    pub ty: ShaderType,
    /// Index of the vertex buffer the attribute is read from.
    pub index: u8,
    pub per_instance: bool,
}

impl<'a> VertexParameter<'a> {
    pub const fn new(name: &'a str, offset: u32, length: u8, ty: ShaderType) -> Self {
        VertexParameter {
            name,
            offset,
            step: 0,
            length,
            multi: 0,
            ty,
            index: 0,
            per_instance: false,
        }
    }
}

//--------------------------------------------------------------------------------------------------

bitflags! {
    /// Which fields of a pipeline description are set.
    #[derive(Default)]
    pub struct PipelineMembers: u64 {
        const VS = 1 << 0;
        const GS = 1 << 1;
        const HS = 1 << 2;
        const DS = 1 << 3;
        const PS = 1 << 4;
        const CS = 1 << 5;
        const MS = 1 << 6;
        const TS = 1 << 7;
        const BLEND_FACTOR = 1 << 8;
        const FLAGS = 1 << 9;
        const SAMPLE_MASK = 1 << 10;
        const STENCIL_REF = 1 << 11;
        const STENCIL_READ_MASK = 1 << 12;
        const STENCIL_WRITE_MASK = 1 << 13;
        const STENCIL_OP = 1 << 14;
        const STENCIL_FUNC = 1 << 17;
        const DEPTH_FUNC = 1 << 18;
        const FILL = 1 << 19;
        const CULL = 1 << 20;
        const PRIMITIVE = 1 << 21;
        const DEPTH_SLOPE_BIAS = 1 << 22;
        const NODE_MASK = 1 << 24;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct PipelineFlags: u16 {
        const ALPHA_TO_COVERAGE = 1 << 0;
        const BLEND = 1 << 1;
        const SCISSOR = 1 << 2;
        const DEPTH = 1 << 3;
        const STENCIL = 1 << 4;
        const DEPTH_WRITE = 1 << 5;
        const CONSERVATIVE_RASTER = 1 << 6;
        const FRONT_COUNTER_CLOCKWISE = 1 << 7;
        const DEPTH_CLIP = 1 << 8;
        const MULTISAMPLE = 1 << 9;
        const ANTIALIASED_LINE = 1 << 10;
        const TOOL_DEBUG = 1 << 11;
        const INDEPENDENT_BLEND = 1 << 12;
        const RENDERTARGET_SRGB = 1 << 13;
    }
}

bitflags! {
    pub struct BarrierFlags: u32 {
        const VERTEX = 1 << 0;
        const ELEMENT = 1 << 1;
        const UNIFORM = 1 << 2;
        const TEXTURE_FETCH = 1 << 3;
        const TEXTURE_UPDATE = 1 << 4;
        const IMAGE_ACCESS = 1 << 5;
        const COMMAND = 1 << 6;
        const PIXEL = 1 << 7;
        const BUFFER = 1 << 8;
        const RENDER_TARGET = 1 << 9;
        const STORAGE_BUFFER = 1 << 10;
        const TRANSFORM_FEEDBACK = 1 << 11;
        const ATOMIC_COUNTER = 1 << 12;
    }
}

impl BarrierFlags {
    /// The `glMemoryBarrier` bitfield.
    pub fn to_gl(self) -> GLbitfield {
        const MAP: [(BarrierFlags, GLbitfield); 13] = [
            (BarrierFlags::VERTEX, gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT),
            (BarrierFlags::ELEMENT, gl::ELEMENT_ARRAY_BARRIER_BIT),
            (BarrierFlags::UNIFORM, gl::UNIFORM_BARRIER_BIT),
            (BarrierFlags::TEXTURE_FETCH, gl::TEXTURE_FETCH_BARRIER_BIT),
            (BarrierFlags::TEXTURE_UPDATE, gl::TEXTURE_UPDATE_BARRIER_BIT),
            (BarrierFlags::IMAGE_ACCESS, gl::SHADER_IMAGE_ACCESS_BARRIER_BIT),
            (BarrierFlags::COMMAND, gl::COMMAND_BARRIER_BIT),
            (BarrierFlags::PIXEL, gl::PIXEL_BUFFER_BARRIER_BIT),
            (BarrierFlags::BUFFER, gl::BUFFER_UPDATE_BARRIER_BIT),
            (BarrierFlags::RENDER_TARGET, gl::FRAMEBUFFER_BARRIER_BIT),
            (BarrierFlags::STORAGE_BUFFER, gl::SHADER_STORAGE_BARRIER_BIT),
            (BarrierFlags::TRANSFORM_FEEDBACK, gl::TRANSFORM_FEEDBACK_BARRIER_BIT),
            (BarrierFlags::ATOMIC_COUNTER, gl::ATOMIC_COUNTER_BARRIER_BIT),
        ];
        MAP.iter()
            .filter(|(flag, _)| self.contains(*flag))
            .fold(0, |bits, (_, gl_bit)| bits | gl_bit)
    }
}

bitflags! {
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const ACCUMULATOR = 1 << 3;
    }
}

impl ClearFlags {
    /// The `glClear` mask. The accumulation buffer does not exist in core profiles and is ignored.
    pub fn to_gl(self) -> GLbitfield {
        let mut mask = 0;
        if self.contains(ClearFlags::COLOR) {
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearFlags::DEPTH) {
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearFlags::STENCIL) {
            mask |= gl::STENCIL_BUFFER_BIT;
        }
        mask
    }
}

bitflags! {
    pub struct AccessFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const PERSISTENT = 1 << 2;
        const INVALIDATE_RANGE = 1 << 3;
        const INVALIDATE_BUFFER = 1 << 4;
        const UNSYNCHRONIZED = 1 << 5;
    }
}

impl AccessFlags {
    /// `glMapBufferRange` access bits.
    pub fn to_gl_bits(self) -> GLbitfield {
        let mut bits = 0;
        if self.contains(AccessFlags::READ) {
            bits |= gl::MAP_READ_BIT;
        }
        if self.contains(AccessFlags::WRITE) {
            bits |= gl::MAP_WRITE_BIT;
        }
        if self.contains(AccessFlags::PERSISTENT) {
            bits |= gl::MAP_PERSISTENT_BIT;
        }
        if self.contains(AccessFlags::INVALIDATE_RANGE) {
            bits |= gl::MAP_INVALIDATE_RANGE_BIT;
        }
        if self.contains(AccessFlags::INVALIDATE_BUFFER) {
            bits |= gl::MAP_INVALIDATE_BUFFER_BIT;
        }
        if self.contains(AccessFlags::UNSYNCHRONIZED) {
            bits |= gl::MAP_UNSYNCHRONIZED_BIT;
        }
        bits
    }

    /// `glMapBuffer` access enum.
    pub fn to_gl_access(self) -> GLenum {
        match (
            self.contains(AccessFlags::READ),
            self.contains(AccessFlags::WRITE),
        ) {
            (true, false) => gl::READ_ONLY,
            (false, true) => gl::WRITE_ONLY,
            _ => gl::READ_WRITE,
        }
    }
}

bitflags! {
    /// Capability bits reported by the provider. The low four bits hold the API.
    #[derive(Default)]
    pub struct Features: u32 {
        const API_OPENGL_ES = 1;
        const API_OPENGL = 2;
        const IMMEDIATE_MODE = 1 << 4;
        const RENDER_TARGET = 1 << 5;
        const BLEND_EX = 1 << 6;
        const BACKGROUND_OPACITY = 1 << 7;
        const LINES_ALPHA = 1 << 8;
        const BLEND_GAMMA = 1 << 9;
        const ANISOTROPIC_FILTER = 1 << 10;
        const HALF_FLOAT = 1 << 11;
        const ATOMIC_COUNTERS = 1 << 12;
        const STORAGE_BUFFER = 1 << 13;
        const SYNC = 1 << 14;
        const INSTANCING = 1 << 15;
        const MULTITHREADING = 1 << 16;
        const COMMAND_BUNDLES = 1 << 17;
        const INDEPENDENT_BLEND = 1 << 18;
        const COMPUTE_SHADER = 1 << 19;
        const TESSELATION_SHADER = 1 << 20;
        const MESH_SHADER = 1 << 21;
        const HEADLESS = 1 << 22;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_bits() {
        let f = Filter::MIN_LINEAR_MAG_MIP_POINT;
        assert!(f.min_linear() && !f.mag_linear() && !f.mip_linear());
        assert!(Filter::ANISOTROPIC.anisotropic());
        assert!(!Filter::MIN_MAG_MIP_LINEAR.anisotropic());
        assert!(Filter::MIN_MAG_MIP_POINT.with_comparison().comparison());
        assert_eq!(Filter::ANISOTROPIC.with_comparison().0, 0xd5);
    }

    #[test]
    fn barrier_bits_translate_individually() {
        assert_eq!(BarrierFlags::empty().to_gl(), 0);
        assert_eq!(
            BarrierFlags::STORAGE_BUFFER.to_gl(),
            gl::SHADER_STORAGE_BARRIER_BIT
        );
        assert_eq!(
            (BarrierFlags::VERTEX | BarrierFlags::ATOMIC_COUNTER).to_gl(),
            gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT | gl::ATOMIC_COUNTER_BARRIER_BIT
        );
    }

    #[test]
    fn access_translation() {
        assert_eq!(AccessFlags::READ.to_gl_access(), gl::READ_ONLY);
        assert_eq!(AccessFlags::WRITE.to_gl_access(), gl::WRITE_ONLY);
        assert_eq!(AccessFlags::all().to_gl_access(), gl::READ_WRITE);
        assert_eq!(
            (AccessFlags::WRITE | AccessFlags::INVALIDATE_BUFFER).to_gl_bits(),
            gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_BUFFER_BIT
        );
    }

    #[test]
    fn clear_ignores_accumulator() {
        assert_eq!(
            ClearFlags::all().to_gl(),
            gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT
        );
    }

    #[test]
    fn rect_rounds_outward() {
        let r = Rect::new(1.5, 2.25, 10.1, 20.0);
        assert_eq!(r.to_box(), (1, 2, 10, 18));
    }

    #[test]
    fn colors_are_bgra() {
        let c = Color8::from_argb(0x80FF4010);
        assert_eq!((c.r, c.g, c.b, c.a), (0xFF, 0x40, 0x10, 0x80));
        assert_eq!(Color16::from(c), Color16::rgba(0xFFFF, 0x4040, 0x1010, 0x8080));
    }

    #[test]
    fn blend_write_mask() {
        let mut b = Blend::NORMAL;
        b.write_mask = 0b0101;
        assert_eq!(b.mask(), [true, false, true, false]);
        assert_eq!(Blend::default(), Blend::PREMULTIPLY);
    }
}
