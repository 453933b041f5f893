//! Driver capabilities.
use crate::api::gl;
use crate::api::gl::types::*;
use crate::api::{ext, Gl};
use crate::types::{Features, Vec3i};
use serde::Serialize;
use tracing::debug;

/// Extensions that each enable one feature bit.
const EXTENSION_FEATURES: &[(&str, Features)] = &[
    ("GL_ARB_blend_func_extended", Features::BLEND_EX),
    ("GL_ARB_texture_filter_anisotropic", Features::ANISOTROPIC_FILTER),
    ("GL_ARB_half_float_pixel", Features::HALF_FLOAT),
    ("GL_ARB_shader_atomic_counters", Features::ATOMIC_COUNTERS),
    ("GL_ARB_shader_storage_buffer_object", Features::STORAGE_BUFFER),
    ("GL_ARB_sync", Features::SYNC),
    ("GL_ARB_draw_instanced", Features::INSTANCING),
    ("GL_ARB_compute_shader", Features::COMPUTE_SHADER),
    ("GL_ARB_tessellation_shader", Features::TESSELATION_SHADER),
    ("GL_NV_mesh_shader", Features::MESH_SHADER),
];

/// What the driver can do.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Caps {
    #[serde(serialize_with = "serialize_features")]
    pub features: Features,
    /// 2.1 is 21, 4.5 is 45.
    pub version: i32,
    /// 1.10 is 110, 4.50 is 450.
    pub glsl: i32,
    pub max_texture_size: i32,
    pub max_3d_texture_size: i32,
    pub max_cube_texture_size: i32,
    pub max_renderbuffer_size: i32,
    pub max_rendertargets: i32,
    pub max_multisampling: i32,
    pub max_vertex_attributes: i32,
    pub max_texture_samplers: i32,
    pub max_samplers: i32,
    pub max_texture_bias: f32,
    pub max_texture_anisotropy: f32,
    pub max_storage_buffers: i32,
    pub max_storage_block_size: i32,
    pub max_work_group_count: Vec3i,
    pub max_work_group_size: Vec3i,
    pub max_work_group_invocations: i32,
    pub max_mesh_work_group_size: i32,
}

fn serialize_features<S: serde::Serializer>(features: &Features, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u32(features.bits())
}

impl Caps {
    /// Features every OpenGL driver this crate runs on has.
    pub fn baseline() -> Features {
        Features::API_OPENGL | Features::IMMEDIATE_MODE | Features::BACKGROUND_OPACITY | Features::LINES_ALPHA
    }

    pub fn query(gl: &Gl) -> Caps {
        let extensions = gl.extensions();
        let has = |name: &str| extensions.iter().any(|e| e == name);

        let mut features = Caps::baseline();
        if has("GL_EXT_texture_sRGB") && has("GL_ARB_framebuffer_sRGB") {
            features |= Features::BLEND_GAMMA;
        }
        for &(name, feature) in EXTENSION_FEATURES {
            if has(name) {
                features |= feature;
            }
        }

        let int = |pname: GLenum| gl.get_integer(pname);
        let vec3 = |pname: GLenum| {
            Vec3i::new(
                gl.get_integer_indexed(pname, 0),
                gl.get_integer_indexed(pname, 1),
                gl.get_integer_indexed(pname, 2),
            )
        };

        let version = match (int(gl::MAJOR_VERSION), int(gl::MINOR_VERSION)) {
            (0, _) => 20,
            (major, minor) => major * 10 + minor,
        };
        let glsl = gl
            .get_string(gl::SHADING_LANGUAGE_VERSION)
            .and_then(|v| parse_glsl_version(&v))
            .unwrap_or(110);

        let caps = Caps {
            features,
            version,
            glsl,
            max_texture_size: int(gl::MAX_TEXTURE_SIZE),
            max_3d_texture_size: int(gl::MAX_3D_TEXTURE_SIZE),
            max_cube_texture_size: int(gl::MAX_CUBE_MAP_TEXTURE_SIZE),
            max_renderbuffer_size: int(gl::MAX_RENDERBUFFER_SIZE),
            max_rendertargets: int(gl::MAX_COLOR_ATTACHMENTS),
            max_multisampling: int(gl::MAX_SAMPLES),
            max_vertex_attributes: int(gl::MAX_VERTEX_ATTRIBS),
            max_texture_samplers: int(gl::MAX_TEXTURE_IMAGE_UNITS),
            max_samplers: int(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
            max_texture_bias: gl.get_float(gl::MAX_TEXTURE_LOD_BIAS),
            max_texture_anisotropy: if features.contains(Features::ANISOTROPIC_FILTER) {
                gl.get_float(ext::MAX_TEXTURE_MAX_ANISOTROPY)
            } else {
                0.0
            },
            max_storage_buffers: int(gl::MAX_SHADER_STORAGE_BUFFER_BINDINGS),
            max_storage_block_size: int(gl::MAX_SHADER_STORAGE_BLOCK_SIZE),
            max_work_group_count: vec3(gl::MAX_COMPUTE_WORK_GROUP_COUNT),
            max_work_group_size: vec3(gl::MAX_COMPUTE_WORK_GROUP_SIZE),
            max_work_group_invocations: int(gl::MAX_COMPUTE_WORK_GROUP_INVOCATIONS),
            max_mesh_work_group_size: if features.contains(Features::MESH_SHADER) {
                int(ext::MAX_MESH_WORK_GROUP_SIZE_NV)
            } else {
                0
            },
        };
        // limits unknown to older drivers raise GL_INVALID_ENUM and read as 0
        for _ in 0..16 {
            if gl.get_error() == gl::NO_ERROR {
                break;
            }
        }

        debug!(features = caps.features.bits(), version, glsl, "queried driver caps");
        caps
    }
}

/// "4.50 NVIDIA 460.1" is 450, "3.3" is 330.
fn parse_glsl_version(s: &str) -> Option<i32> {
    let number = s.split_whitespace().next()?;
    let mut parts = number.splitn(2, '.');
    let major: i32 = parts.next()?.parse().ok()?;
    let minor: String = parts.next().unwrap_or("0").chars().take(2).collect();
    let scale = if minor.len() == 1 { 10 } else { 1 };
    Some(major * 100 + minor.parse::<i32>().ok()? * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordingDriver;
    use std::rc::Rc;

    #[test]
    fn glsl_version_strings() {
        assert_eq!(parse_glsl_version("4.50"), Some(450));
        assert_eq!(parse_glsl_version("1.10"), Some(110));
        assert_eq!(parse_glsl_version("4.60 NVIDIA 460.91"), Some(460));
        assert_eq!(parse_glsl_version("3.3"), Some(330));
        assert_eq!(parse_glsl_version(""), None);
        assert_eq!(parse_glsl_version("OpenGL ES"), None);
    }

    #[test]
    fn features_follow_extensions() {
        let driver = Rc::new(RecordingDriver::new());
        let gl = Gl::from_rc(driver.clone());
        let caps = Caps::query(&gl);
        assert_eq!(caps.features, Caps::baseline());
        assert_eq!(caps.version, 45);
        assert_eq!(caps.glsl, 450);
        assert_eq!(caps.max_rendertargets, 8);

        // sRGB blending needs both halves
        driver.set_extensions(&["GL_EXT_texture_sRGB", "GL_ARB_compute_shader"]);
        let caps = Caps::query(&gl);
        assert!(!caps.features.contains(Features::BLEND_GAMMA));
        assert!(caps.features.contains(Features::COMPUTE_SHADER));

        driver.set_extensions(&["GL_EXT_texture_sRGB", "GL_ARB_framebuffer_sRGB", "GL_NV_mesh_shader"]);
        let caps = Caps::query(&gl);
        assert!(caps.features.contains(Features::BLEND_GAMMA | Features::MESH_SHADER));
    }
}
