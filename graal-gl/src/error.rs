//! Error type returned by every fallible operation of this crate.
use crate::api::gl::types::GLenum;
use crate::format::PixelFormat;
use std::panic::Location;
use thiserror::Error;
use tracing::error;

/// Integer codes returned across the graphics interface boundary.
///
/// Driver errors and framebuffer statuses are returned as their (positive) GL enum value instead.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success = 0,
    Unknown = -1,
    NotImplemented = -2,
    MissingParameter = -0xFFFD,
    UnknownCommandCategory,
    InvalidKind,
    ClipboardFailure,
    InvalidCursor,
    InvalidDisplay,
    InvalidParameter,
    InvalidCall,
    Null,
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> i32 {
        code as i32
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErrorKind {
    #[error("driver error 0x{0:04X}")]
    Driver(GLenum),
    #[error("framebuffer incomplete (status 0x{0:04X})")]
    FramebufferIncomplete(GLenum),
    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),
    #[error("program link failed: {0}")]
    ProgramLink(String),
    #[error("invalid index stride {0}")]
    InvalidIndexStride(u8),
    #[error("too many render targets: {requested} requested, at most {max}")]
    TooManyRenderTargets { requested: u32, max: u32 },
    #[error("compute pipeline requires a valid compute shader")]
    InvalidComputeShader,
    #[error("invalid primitive topology {0}")]
    InvalidPrimitive(u8),
    #[error("invalid depth function {0}")]
    InvalidDepthFunc(u8),
    #[error("invalid stencil function {0}")]
    InvalidStencilFunc(u8),
    #[error("invalid stencil fail operation {0}")]
    InvalidStencilFailOp(u8),
    #[error("invalid stencil depth-fail operation {0}")]
    InvalidStencilDepthFailOp(u8),
    #[error("invalid stencil pass operation {0}")]
    InvalidStencilPassOp(u8),
    #[error("invalid comparison function {0}")]
    InvalidComparison(u8),
    #[error("invalid shader type {0}")]
    InvalidShaderType(u8),
    #[error("invalid usage {0}")]
    InvalidUsage(u8),
    #[error("invalid shader stage {0}")]
    InvalidShaderStage(u8),
    #[error("unsupported pixel format {0:?}")]
    InvalidFormat(PixelFormat),
    #[error("resource handle does not refer to the expected kind of object")]
    CategoryMismatch,
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid call: {0}")]
    InvalidCall(&'static str),
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("null result: {0}")]
    Null(&'static str),
}

impl ErrorKind {
    /// The integer reported across the boundary for this kind of error.
    pub fn code(&self) -> i32 {
        match *self {
            ErrorKind::Driver(code) | ErrorKind::FramebufferIncomplete(code) => code as i32,
            ErrorKind::ShaderCompilation(_)
            | ErrorKind::ProgramLink(_)
            | ErrorKind::InvalidComputeShader => ErrorCode::InvalidKind.into(),
            ErrorKind::TooManyRenderTargets { .. } => ErrorCode::InvalidParameter.into(),
            ErrorKind::InvalidIndexStride(_)
            | ErrorKind::InvalidPrimitive(_)
            | ErrorKind::InvalidDepthFunc(_)
            | ErrorKind::InvalidStencilFunc(_)
            | ErrorKind::InvalidStencilFailOp(_)
            | ErrorKind::InvalidStencilDepthFailOp(_)
            | ErrorKind::InvalidStencilPassOp(_)
            | ErrorKind::InvalidComparison(_)
            | ErrorKind::InvalidShaderType(_)
            | ErrorKind::InvalidUsage(_)
            | ErrorKind::InvalidShaderStage(_)
            | ErrorKind::InvalidFormat(_)
            | ErrorKind::CategoryMismatch
            | ErrorKind::InvalidParameter(_) => ErrorCode::InvalidParameter.into(),
            ErrorKind::MissingParameter(_) => ErrorCode::MissingParameter.into(),
            ErrorKind::InvalidCall(_) => ErrorCode::InvalidCall.into(),
            ErrorKind::NotImplemented(_) => ErrorCode::NotImplemented.into(),
            ErrorKind::Null(_) => ErrorCode::Null.into(),
        }
    }
}

/// A failed operation, with the place it was detected.
#[must_use]
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind} ({callsite} at {file}:{line})")]
pub struct GlError {
    pub kind: ErrorKind,
    /// Name of the native call or operation that failed.
    pub callsite: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl GlError {
    #[track_caller]
    pub fn new(kind: ErrorKind, callsite: &'static str) -> GlError {
        let location = Location::caller();
        GlError {
            kind,
            callsite,
            file: location.file(),
            line: location.line(),
        }
    }

    #[track_caller]
    pub fn driver(code: GLenum, callsite: &'static str) -> GlError {
        GlError::new(ErrorKind::Driver(code), callsite)
    }

    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Reports the error and returns its boundary code.
    pub fn log(&self) -> i32 {
        error!(
            callsite = self.callsite,
            file = self.file,
            line = self.line,
            code = self.code(),
            "{}",
            self.kind
        );
        self.code()
    }
}

pub type GlResult<T> = Result<T, GlError>;

/// Builds a [`GlError`] located at the invocation site.
///
/// `gl_error!(InvalidParameter("offset"), "copy_subresource")`
#[macro_export]
macro_rules! gl_error {
    ($kind:ident { $($field:ident $(: $val:expr)?),* $(,)? }, $callsite:expr) => {
        $crate::error::GlError::new($crate::error::ErrorKind::$kind { $($field $(: $val)?),* }, $callsite)
    };
    ($kind:ident $( ( $($arg:expr),* ) )?, $callsite:expr) => {
        $crate::error::GlError::new($crate::error::ErrorKind::$kind $( ( $($arg),* ) )?, $callsite)
    };
}
