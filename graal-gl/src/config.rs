use serde::{Deserialize, Serialize};

/// Provider settings, usually deserialized from the host's configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Sample `glGetError` after every native call.
    pub check_errors: bool,
    /// Create textures with sRGB internal formats where one exists.
    pub srgb_textures: bool,
    /// Optional cap on colour attachments, below the driver maximum.
    pub max_render_targets: Option<u32>,
}

impl Default for ProviderConfig {
    fn default() -> ProviderConfig {
        ProviderConfig {
            check_errors: true,
            srgb_textures: false,
            max_render_targets: None,
        }
    }
}
