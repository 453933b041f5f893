//! Pixel formats and their OpenGL `(internal format, components, type)` triples.
use crate::api::gl;
use crate::api::gl::types::GLenum;
use crate::api::ext;

macro_rules! pixel_formats {
    ($($name:ident,)*) => {
        /// Abstract pixel formats, numbered in declaration order starting at zero.
        #[allow(non_camel_case_types)]
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum PixelFormat {
            $($name,)*
        }

        impl PixelFormat {
            /// Every format, indexed by its boundary value.
            pub const ALL: &'static [PixelFormat] = &[$(PixelFormat::$name,)*];
        }
    };
}

pixel_formats! {
    Unknown,
    R8G8B8A8_UInt,
    A8_UNorm,
    A8P8,
    AI44,
    AYUV,
    B4G4R4A4_UNorm,
    B5G5R5A1_UNorm,
    B5G6R5_UNorm,
    B8G8R8A8_Typeless,
    B8G8R8A8_UNorm,
    B8G8R8A8_UNorm_SRGB,
    B8G8R8X8_Typeless,
    B8G8R8X8_UNorm,
    B8G8R8X8_UNorm_SRGB,
    BC1_Typeless,
    BC1_UNorm,
    BC1_UNorm_SRGB,
    BC2_Typeless,
    BC2_UNorm,
    BC2_UNorm_SRGB,
    BC3_Typeless,
    BC3_UNorm,
    BC3_UNorm_SRGB,
    BC4_SNorm,
    BC4_Typeless,
    BC4_UNorm,
    BC5_SNorm,
    BC5_Typeless,
    BC5_UNorm,
    BC6H_SF16,
    BC6H_Typeless,
    BC6H_UF16,
    BC7_Typeless,
    BC7_UNorm,
    BC7_UNorm_SRGB,
    D16_UNorm,
    D24_UNorm_S8_UInt,
    D24_UNorm_X8_Typeless,
    D32_Float,
    D32_Float_S8X24_UInt,
    G8R8_G8B8_UNorm,
    IA44,
    NV11,
    NV12,
    P010,
    P016,
    P208,
    P8,
    R1_UNorm,
    R10G10B10_XR_BIAS_A2_UNorm,
    R10G10B10A2_Typeless,
    R10G10B10A2_UInt,
    R10G10B10A2_UNorm,
    R11G11B10_Float,
    R16_Float,
    R16_Int,
    R16_SNorm,
    R16_Typeless,
    R16_UInt,
    R16_UNorm,
    R16G16_Float,
    R16G16_Int,
    R16G16_SNorm,
    R16G16_Typeless,
    R16G16_UInt,
    R16G16_UNorm,
    R16G16B16_Float,
    R16G16B16_Int,
    R16G16B16_SNorm,
    R16G16B16_Typeless,
    R16G16B16_UInt,
    R16G16B16_UNorm,
    R16G16B16A16_Float,
    R16G16B16A16_Int,
    R16G16B16A16_SNorm,
    R16G16B16A16_Typeless,
    R16G16B16A16_UInt,
    R16G16B16A16_UNorm,
    R24_UNorm_X8_Typeless,
    R24G8_Typeless,
    R32_Float,
    R32_Float_X8X24_Typeless,
    R32_Int,
    R32_Typeless,
    R32_UInt,
    R32G32_Float,
    R32G32_Int,
    R32G32_Typeless,
    R32G32_UInt,
    R32G32B32_Float,
    R32G32B32_Int,
    R32G32B32_Typeless,
    R32G32B32_UInt,
    R32G32B32A32_Float,
    R32G32B32A32_Int,
    R32G32B32A32_Typeless,
    R32G32B32A32_UInt,
    R32G8X24_Typeless,
    R5G5B5A1_UNorm,
    R5G6B5_UNorm,
    R8_Int,
    R8_SNorm,
    R8_Typeless,
    R8_UInt,
    R8_UNorm,
    R8G8_B8G8_UNorm,
    R8G8_Int,
    R8G8_SNorm,
    R8G8_Typeless,
    R8G8_UInt,
    R8G8_UNorm,
    R8G8B8A8_Int,
    R8G8B8A8_SNorm,
    R8G8B8A8_Typeless,
    R8G8B8A8_UNorm,
    R8G8B8A8_UNorm_SRGB,
    R8G8B8X8_Int,
    R8G8B8X8_SNorm,
    R8G8B8X8_Typeless,
    R8G8B8X8_UInt,
    R8G8B8X8_UNorm,
    R9G9B9E5_SHAREDEXP,
    V208,
    V408,
    X24_Typeless_G8_UInt,
    X32_Typeless_G8X24_UInt,
    Y210,
    Y216,
    Y410,
    Y416,
    YUY2,
}

impl PixelFormat {
    pub fn from_raw(raw: u8) -> Option<PixelFormat> {
        PixelFormat::ALL.get(raw as usize).copied()
    }

    pub fn is_depth(self) -> bool {
        matches!(
            self,
            PixelFormat::D16_UNorm
                | PixelFormat::D24_UNorm_S8_UInt
                | PixelFormat::D24_UNorm_X8_Typeless
                | PixelFormat::D32_Float
                | PixelFormat::D32_Float_S8X24_UInt
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::D24_UNorm_S8_UInt | PixelFormat::D32_Float_S8X24_UInt
        )
    }
}

/// Format triple passed to `glTexImage*` and friends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlFormat {
    pub internal_format: GLenum,
    pub components: GLenum,
    pub ty: GLenum,
}

const fn f(internal_format: GLenum, components: GLenum, ty: GLenum) -> GlFormat {
    GlFormat {
        internal_format,
        components,
        ty,
    }
}

/// Every triple this crate will hand to the driver.
///
/// The first entry for a given internal format is the one [`GlFormat::map`] returns.
pub const LEGAL_FORMATS: &[GlFormat] = &[
    f(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
    f(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
    f(gl::RGBA8_SNORM, gl::RGBA, gl::BYTE),
    f(gl::RGBA4, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4),
    f(gl::RGB10_A2, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV),
    f(gl::RGB5_A1, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
    f(gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
    f(gl::RGBA32F, gl::RGBA, gl::FLOAT),
    f(gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE),
    f(gl::RGBA8I, gl::RGBA_INTEGER, gl::BYTE),
    f(gl::RGBA16UI, gl::RGBA_INTEGER, gl::UNSIGNED_SHORT),
    f(gl::RGBA16I, gl::RGBA_INTEGER, gl::SHORT),
    f(gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT),
    f(gl::RGBA32I, gl::RGBA_INTEGER, gl::INT),
    f(gl::RGB10_A2UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT_2_10_10_10_REV),
    f(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
    f(gl::SRGB8, gl::RGB, gl::UNSIGNED_BYTE),
    f(gl::RGB8_SNORM, gl::RGB, gl::BYTE),
    f(gl::R11F_G11F_B10F, gl::RGB, gl::UNSIGNED_INT_10F_11F_11F_REV),
    f(gl::RGB9_E5, gl::RGB, gl::UNSIGNED_INT_5_9_9_9_REV),
    f(gl::RGB16F, gl::RGB, gl::HALF_FLOAT),
    f(gl::RGB32F, gl::RGB, gl::FLOAT),
    f(gl::RGB8UI, gl::RGB_INTEGER, gl::UNSIGNED_BYTE),
    f(gl::RGB8I, gl::RGB_INTEGER, gl::BYTE),
    f(gl::RGB16UI, gl::RGB_INTEGER, gl::UNSIGNED_SHORT),
    f(gl::RGB16I, gl::RGB_INTEGER, gl::SHORT),
    f(gl::RGB32UI, gl::RGB_INTEGER, gl::UNSIGNED_INT),
    f(gl::RGB32I, gl::RGB_INTEGER, gl::INT),
    f(gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
    f(gl::RG8_SNORM, gl::RG, gl::BYTE),
    f(gl::RG16F, gl::RG, gl::HALF_FLOAT),
    f(gl::RG32F, gl::RG, gl::FLOAT),
    f(gl::RG8UI, gl::RG_INTEGER, gl::UNSIGNED_BYTE),
    f(gl::RG8I, gl::RG_INTEGER, gl::BYTE),
    f(gl::RG16UI, gl::RG_INTEGER, gl::UNSIGNED_SHORT),
    f(gl::RG16I, gl::RG_INTEGER, gl::SHORT),
    f(gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT),
    f(gl::RG32I, gl::RG_INTEGER, gl::INT),
    f(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
    f(gl::R8_SNORM, gl::RED, gl::BYTE),
    f(gl::R16F, gl::RED, gl::HALF_FLOAT),
    f(gl::R32F, gl::RED, gl::FLOAT),
    f(gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE),
    f(gl::R8I, gl::RED_INTEGER, gl::BYTE),
    f(gl::R16UI, gl::RED_INTEGER, gl::UNSIGNED_SHORT),
    f(gl::R16I, gl::RED_INTEGER, gl::SHORT),
    f(gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT),
    f(gl::R32I, gl::RED_INTEGER, gl::INT),
    f(gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE),
    f(gl::RGB, gl::RGB, gl::UNSIGNED_BYTE),
    f(ext::ALPHA, ext::ALPHA, gl::UNSIGNED_BYTE),
    f(gl::RG, gl::RG, gl::UNSIGNED_BYTE),
    f(gl::RED, gl::RED, gl::UNSIGNED_BYTE),
    f(gl::DEPTH_STENCIL, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8),
    f(gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT),
    f(gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT),
    f(gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
    f(gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8),
    f(
        gl::DEPTH32F_STENCIL8,
        gl::DEPTH_STENCIL,
        gl::FLOAT_32_UNSIGNED_INT_24_8_REV,
    ),
    f(gl::DEPTH_COMPONENT, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT),
    // alternates emitted by `create`
    f(gl::RGBA, gl::RGBA, gl::FLOAT),
    f(gl::RGBA, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV),
    f(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
    f(gl::RGB, gl::RGB, gl::FLOAT),
    f(gl::RGB, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
    f(gl::RG, gl::RG, gl::UNSIGNED_INT),
    f(gl::RG, gl::RG, gl::UNSIGNED_INT_24_8),
    f(gl::RED, gl::RED, gl::FLOAT),
    f(gl::RGBA16, gl::RGBA, gl::UNSIGNED_SHORT),
    f(gl::RGBA16, gl::RGBA, gl::HALF_FLOAT),
    f(gl::RGBA16_SNORM, gl::RGBA, gl::SHORT),
    f(gl::RGB16, gl::RGB, gl::UNSIGNED_SHORT),
    f(gl::RGB16, gl::RGB, gl::HALF_FLOAT),
    f(gl::RGB16_SNORM, gl::RGB, gl::SHORT),
    f(gl::RG16, gl::RG, gl::UNSIGNED_SHORT),
    f(gl::RG16, gl::RG, gl::HALF_FLOAT),
    f(gl::RG16_SNORM, gl::RG, gl::SHORT),
    f(gl::R16, gl::RED, gl::UNSIGNED_SHORT),
    f(gl::R16, gl::RED, gl::HALF_FLOAT),
    f(gl::R16_SNORM, gl::RED, gl::SHORT),
    f(gl::SRGB_ALPHA, gl::RGBA, gl::UNSIGNED_BYTE),
    f(gl::SRGB, gl::RGB, gl::UNSIGNED_BYTE),
    f(gl::SRGB8_ALPHA8, gl::BGRA, gl::UNSIGNED_BYTE),
    f(gl::SRGB8, gl::BGR, gl::UNSIGNED_BYTE),
    f(gl::RGBA4, gl::BGRA, gl::UNSIGNED_SHORT_4_4_4_4_REV),
    f(gl::DEPTH_COMPONENT32, gl::DEPTH_COMPONENT, gl::FLOAT),
    f(ext::ALPHA8, ext::ALPHA, gl::UNSIGNED_BYTE),
    f(gl::BGRA, gl::BGRA, gl::UNSIGNED_BYTE),
    f(gl::BGRA, gl::BGRA, gl::UNSIGNED_SHORT_1_5_5_5_REV),
    f(gl::BGR, gl::BGR, gl::UNSIGNED_BYTE),
    f(gl::BGR, gl::BGR, gl::UNSIGNED_SHORT_5_6_5_REV),
];

impl GlFormat {
    pub const INVALID: GlFormat = f(0, 0, 0);

    pub fn is_valid(&self) -> bool {
        self.internal_format != 0
    }

    /// The preferred triple for an internal format, or [`GlFormat::INVALID`].
    pub fn map(internal_format: GLenum) -> GlFormat {
        LEGAL_FORMATS
            .iter()
            .find(|fmt| fmt.internal_format == internal_format)
            .copied()
            .unwrap_or(GlFormat::INVALID)
    }

    /// Bytes per texel of client data in this format, 0 if the triple is not one we know.
    pub fn texel_bytes(&self) -> usize {
        let packed = match self.ty {
            gl::UNSIGNED_SHORT_4_4_4_4
            | gl::UNSIGNED_SHORT_4_4_4_4_REV
            | gl::UNSIGNED_SHORT_5_5_5_1
            | gl::UNSIGNED_SHORT_1_5_5_5_REV
            | gl::UNSIGNED_SHORT_5_6_5
            | gl::UNSIGNED_SHORT_5_6_5_REV => 2,
            gl::UNSIGNED_INT_2_10_10_10_REV
            | gl::UNSIGNED_INT_10F_11F_11F_REV
            | gl::UNSIGNED_INT_5_9_9_9_REV
            | gl::UNSIGNED_INT_24_8 => 4,
            gl::FLOAT_32_UNSIGNED_INT_24_8_REV => 8,
            _ => 0,
        };
        if packed != 0 {
            return packed;
        }
        let components = match self.components {
            gl::RED | gl::RED_INTEGER | ext::ALPHA | gl::DEPTH_COMPONENT => 1,
            gl::RG | gl::RG_INTEGER | gl::DEPTH_STENCIL => 2,
            gl::RGB | gl::BGR | gl::RGB_INTEGER => 3,
            gl::RGBA | gl::BGRA | gl::RGBA_INTEGER => 4,
            _ => 0,
        };
        let component_bytes = match self.ty {
            gl::BYTE | gl::UNSIGNED_BYTE => 1,
            gl::SHORT | gl::UNSIGNED_SHORT | gl::HALF_FLOAT => 2,
            gl::INT | gl::UNSIGNED_INT | gl::FLOAT => 4,
            _ => 0,
        };
        components * component_bytes
    }

    /// Bytes of tightly packed client data needed for a `width` x `height` image.
    pub fn image_bytes(&self, width: i32, height: i32) -> usize {
        width.max(0) as usize * height.max(0) as usize * self.texel_bytes()
    }

    /// Translates an abstract pixel format.
    ///
    /// `srgb` selects the sRGB internal format for 8-bit RGB(A) formats. Block-compressed, video
    /// and packed-shared-exponent formats are not supported and return [`GlFormat::INVALID`].
    pub fn create(format: PixelFormat, srgb: bool) -> GlFormat {
        use PixelFormat::*;
        match format {
            R32G32B32A32_Typeless => f(gl::RGBA, gl::RGBA, gl::FLOAT),
            R32G32B32A32_Float => f(gl::RGBA32F, gl::RGBA, gl::FLOAT),
            R32G32B32A32_UInt => f(gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT),
            R32G32B32A32_Int => f(gl::RGBA32I, gl::RGBA_INTEGER, gl::INT),
            R32G32B32_Typeless => f(gl::RGB, gl::RGB, gl::FLOAT),
            R32G32B32_Float => f(gl::RGB32F, gl::RGB, gl::FLOAT),
            R32G32B32_UInt => f(gl::RGB32UI, gl::RGB_INTEGER, gl::UNSIGNED_INT),
            R32G32B32_Int => f(gl::RGB32I, gl::RGB_INTEGER, gl::INT),
            R16G16B16A16_Typeless => f(gl::RGBA16, gl::RGBA, gl::HALF_FLOAT),
            R16G16B16A16_Float => f(gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
            R16G16B16A16_UNorm => f(gl::RGBA16, gl::RGBA, gl::UNSIGNED_SHORT),
            R16G16B16A16_UInt => f(gl::RGBA16UI, gl::RGBA_INTEGER, gl::UNSIGNED_SHORT),
            R16G16B16A16_SNorm => f(gl::RGBA16_SNORM, gl::RGBA, gl::SHORT),
            R16G16B16A16_Int => f(gl::RGBA16I, gl::RGBA_INTEGER, gl::SHORT),
            R16G16B16_Typeless => f(gl::RGB16, gl::RGB, gl::HALF_FLOAT),
            R16G16B16_Float => f(gl::RGB16F, gl::RGB, gl::HALF_FLOAT),
            R16G16B16_UNorm => f(gl::RGB16, gl::RGB, gl::UNSIGNED_SHORT),
            R16G16B16_UInt => f(gl::RGB16UI, gl::RGB_INTEGER, gl::UNSIGNED_SHORT),
            R16G16B16_SNorm => f(gl::RGB16_SNORM, gl::RGB, gl::SHORT),
            R16G16B16_Int => f(gl::RGB16I, gl::RGB_INTEGER, gl::SHORT),
            R32G32_Typeless => f(gl::RG, gl::RG, gl::UNSIGNED_INT),
            R32G32_Float => f(gl::RG32F, gl::RG, gl::FLOAT),
            R32G32_UInt => f(gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT),
            R32G32_Int => f(gl::RG32I, gl::RG_INTEGER, gl::INT),
            D32_Float_S8X24_UInt => f(
                gl::DEPTH32F_STENCIL8,
                gl::DEPTH_STENCIL,
                gl::FLOAT_32_UNSIGNED_INT_24_8_REV,
            ),
            R10G10B10A2_Typeless => f(gl::RGBA, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV),
            R10G10B10A2_UNorm => f(gl::RGB10_A2, gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV),
            R10G10B10A2_UInt => f(
                gl::RGB10_A2UI,
                gl::RGBA_INTEGER,
                gl::UNSIGNED_INT_2_10_10_10_REV,
            ),
            R11G11B10_Float => f(
                gl::R11F_G11F_B10F,
                gl::RGB,
                gl::UNSIGNED_INT_10F_11F_11F_REV,
            ),
            R8G8B8A8_Typeless if srgb => f(gl::SRGB_ALPHA, gl::RGBA, gl::UNSIGNED_BYTE),
            R8G8B8A8_Typeless => f(gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE),
            R8G8B8A8_UNorm if srgb => f(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
            R8G8B8A8_UNorm => f(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
            R8G8B8A8_UNorm_SRGB => f(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
            R8G8B8A8_UInt => f(gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE),
            R8G8B8A8_SNorm => f(gl::RGBA8_SNORM, gl::RGBA, gl::BYTE),
            R8G8B8A8_Int => f(gl::RGBA8I, gl::RGBA_INTEGER, gl::BYTE),
            R8G8B8X8_Typeless if srgb => f(gl::SRGB, gl::RGB, gl::UNSIGNED_BYTE),
            R8G8B8X8_Typeless => f(gl::RGB, gl::RGB, gl::UNSIGNED_BYTE),
            R8G8B8X8_UNorm if srgb => f(gl::SRGB8, gl::RGB, gl::UNSIGNED_BYTE),
            R8G8B8X8_UNorm => f(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
            R8G8B8X8_SNorm => f(gl::RGB8_SNORM, gl::RGB, gl::BYTE),
            R8G8B8X8_UInt => f(gl::RGB8UI, gl::RGB_INTEGER, gl::UNSIGNED_BYTE),
            R8G8B8X8_Int => f(gl::RGB8I, gl::RGB_INTEGER, gl::BYTE),
            R16G16_Typeless => f(gl::RG16, gl::RG, gl::HALF_FLOAT),
            R16G16_Float => f(gl::RG16F, gl::RG, gl::HALF_FLOAT),
            R16G16_UNorm => f(gl::RG16, gl::RG, gl::UNSIGNED_SHORT),
            R16G16_UInt => f(gl::RG16UI, gl::RG_INTEGER, gl::UNSIGNED_SHORT),
            R16G16_SNorm => f(gl::RG16_SNORM, gl::RG, gl::SHORT),
            R16G16_Int => f(gl::RG16I, gl::RG_INTEGER, gl::SHORT),
            R32_Typeless => f(gl::RED, gl::RED, gl::FLOAT),
            R32_Float => f(gl::R32F, gl::RED, gl::FLOAT),
            R32_UInt => f(gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT),
            R32_Int => f(gl::R32I, gl::RED_INTEGER, gl::INT),
            D32_Float => f(gl::DEPTH_COMPONENT32, gl::DEPTH_COMPONENT, gl::FLOAT),
            D24_UNorm_X8_Typeless => f(gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::UNSIGNED_INT),
            D16_UNorm => f(gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT),
            R24G8_Typeless => f(gl::RG, gl::RG, gl::UNSIGNED_INT_24_8),
            D24_UNorm_S8_UInt => f(gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8),
            R8G8_Typeless => f(gl::RG, gl::RG, gl::UNSIGNED_BYTE),
            R8G8_UNorm => f(gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
            R8G8_UInt => f(gl::RG8UI, gl::RG_INTEGER, gl::UNSIGNED_BYTE),
            R8G8_SNorm => f(gl::RG8_SNORM, gl::RG, gl::BYTE),
            R8G8_Int => f(gl::RG8I, gl::RG_INTEGER, gl::BYTE),
            R16_Typeless => f(gl::R16, gl::RED, gl::HALF_FLOAT),
            R16_Float => f(gl::R16F, gl::RED, gl::HALF_FLOAT),
            R16_UNorm => f(gl::R16, gl::RED, gl::UNSIGNED_SHORT),
            R16_UInt => f(gl::R16UI, gl::RED_INTEGER, gl::UNSIGNED_SHORT),
            R16_SNorm => f(gl::R16_SNORM, gl::RED, gl::SHORT),
            R16_Int => f(gl::R16I, gl::RED_INTEGER, gl::SHORT),
            R8_Typeless => f(gl::RED, gl::RED, gl::UNSIGNED_BYTE),
            R8_UNorm => f(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            R8_UInt => f(gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE),
            R8_SNorm => f(gl::R8_SNORM, gl::RED, gl::BYTE),
            R8_Int => f(gl::R8I, gl::RED_INTEGER, gl::BYTE),
            A8_UNorm => f(ext::ALPHA8, ext::ALPHA, gl::UNSIGNED_BYTE),
            R5G6B5_UNorm => f(gl::RGB, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
            R5G5B5A1_UNorm => f(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
            B5G6R5_UNorm => f(gl::BGR, gl::BGR, gl::UNSIGNED_SHORT_5_6_5_REV),
            B5G5R5A1_UNorm => f(gl::BGRA, gl::BGRA, gl::UNSIGNED_SHORT_1_5_5_5_REV),
            B4G4R4A4_UNorm => f(gl::RGBA4, gl::BGRA, gl::UNSIGNED_SHORT_4_4_4_4_REV),
            B8G8R8A8_UNorm | B8G8R8A8_Typeless => f(gl::BGRA, gl::BGRA, gl::UNSIGNED_BYTE),
            B8G8R8A8_UNorm_SRGB => f(gl::SRGB8_ALPHA8, gl::BGRA, gl::UNSIGNED_BYTE),
            B8G8R8X8_UNorm | B8G8R8X8_Typeless => f(gl::BGR, gl::BGR, gl::UNSIGNED_BYTE),
            B8G8R8X8_UNorm_SRGB => f(gl::SRGB8, gl::BGR, gl::UNSIGNED_BYTE),
            _ => GlFormat::INVALID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_only_emits_legal_triples() {
        for &format in PixelFormat::ALL {
            for &srgb in &[false, true] {
                let glfmt = GlFormat::create(format, srgb);
                if glfmt.is_valid() {
                    assert!(
                        LEGAL_FORMATS.contains(&glfmt),
                        "{:?} (srgb={}) -> {:?} is not a legal format",
                        format,
                        srgb,
                        glfmt
                    );
                }
            }
        }
    }

    #[test]
    fn boundary_values_follow_declaration_order() {
        assert_eq!(PixelFormat::from_raw(0), Some(PixelFormat::Unknown));
        assert_eq!(PixelFormat::from_raw(1), Some(PixelFormat::R8G8B8A8_UInt));
        assert_eq!(PixelFormat::from_raw(131), Some(PixelFormat::YUY2));
        assert_eq!(PixelFormat::from_raw(132), None);
        for (i, &format) in PixelFormat::ALL.iter().enumerate() {
            assert_eq!(format as usize, i);
        }
    }

    #[test]
    fn unsupported_formats_are_invalid() {
        assert!(!GlFormat::create(PixelFormat::Unknown, false).is_valid());
        assert!(!GlFormat::create(PixelFormat::BC1_UNorm, false).is_valid());
        assert!(!GlFormat::create(PixelFormat::R9G9B9E5_SHAREDEXP, false).is_valid());
        assert!(!GlFormat::create(PixelFormat::NV12, true).is_valid());
        assert!(!GlFormat::map(0xDEAD).is_valid());
    }

    #[test]
    fn integer_formats_use_integer_components() {
        let rg = GlFormat::create(PixelFormat::R32G32_UInt, false);
        assert_eq!(rg, f(gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT));
        let r8 = GlFormat::create(PixelFormat::R8_UInt, false);
        assert_eq!(r8, f(gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE));
    }

    #[test]
    fn texel_sizes() {
        let size = |format| GlFormat::create(format, false).texel_bytes();
        assert_eq!(size(PixelFormat::R8G8B8A8_UNorm), 4);
        assert_eq!(size(PixelFormat::R32G32B32_Float), 12);
        assert_eq!(size(PixelFormat::R16G16_Float), 4);
        assert_eq!(size(PixelFormat::R8_UInt), 1);
        assert_eq!(size(PixelFormat::B5G6R5_UNorm), 2);
        assert_eq!(size(PixelFormat::D24_UNorm_S8_UInt), 4);
        assert_eq!(GlFormat::INVALID.texel_bytes(), 0);
        assert_eq!(GlFormat::create(PixelFormat::R8G8B8A8_UNorm, false).image_bytes(16, 16), 1024);
        assert_eq!(GlFormat::create(PixelFormat::R8G8B8A8_UNorm, false).image_bytes(-1, 16), 0);
    }

    #[test]
    fn every_legal_format_has_a_texel_size() {
        for fmt in LEGAL_FORMATS {
            assert_ne!(fmt.texel_bytes(), 0, "{:?}", fmt);
        }
    }

    #[test]
    fn srgb_only_affects_8bit_color() {
        assert_eq!(
            GlFormat::create(PixelFormat::R8G8B8A8_UNorm, true).internal_format,
            gl::SRGB8_ALPHA8
        );
        assert_eq!(
            GlFormat::create(PixelFormat::R8G8B8A8_UNorm, false).internal_format,
            gl::RGBA8
        );
        assert_eq!(
            GlFormat::create(PixelFormat::R32_Float, true),
            GlFormat::create(PixelFormat::R32_Float, false)
        );
    }

    #[test]
    fn map_prefers_sized_component_order() {
        assert_eq!(
            GlFormat::map(gl::RGBA),
            f(gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE)
        );
        assert_eq!(
            GlFormat::map(gl::DEPTH24_STENCIL8),
            GlFormat::create(PixelFormat::D24_UNorm_S8_UInt, false)
        );
    }
}
