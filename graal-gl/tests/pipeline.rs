mod common;

use common::recording;
use graal_gl::api::gl;
use graal_gl::buffer::Buffer;
use graal_gl::mapping::{BlendOperand, Cull, Fill, ShaderStage};
use graal_gl::shader::ShaderObject;
use graal_gl::*;

fn vertex_only(gl: &Gl) -> (handle::Owned<ShaderObject>, PipelineDesc) {
    let vs = ShaderObject::create(gl, "void main() { gl_Position = vec4(0.0); }", ShaderStage::Vertex).unwrap();
    let desc = PipelineDesc::default().with_shader(ShaderStage::Vertex, vs.get());
    (vs, desc)
}

#[test]
fn bad_index_strides_fail_before_any_call() {
    let (driver, gl) = recording();
    let (_vs, desc) = vertex_only(&gl);
    let index_buffer = ResourceHandle::new(Category::Buffer, 77);
    driver.clear_calls();

    for &stride in &[3u8, 5, 255, 0] {
        let err = PipelineState::create(&gl, &desc, ResourceHandle::NULL, Blend::DEFAULT, &[], &[], index_buffer, stride)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidIndexStride(stride));
        assert_eq!(err.code(), ErrorCode::InvalidParameter as i32);
    }
    assert!(driver.calls().is_empty());
}

#[test]
fn index_stride_picks_index_type() {
    let (_driver, gl) = recording();
    let (_vs, desc) = vertex_only(&gl);
    let indices = Buffer::create(&gl, gl::ELEMENT_ARRAY_BUFFER, Some(&[0; 12]), 12).unwrap();
    let ib = indices.get().to_handle();

    let state = PipelineState::create(&gl, &desc, ResourceHandle::NULL, Blend::DEFAULT, &[], &[], ib, 2).unwrap();
    assert_eq!(state.index_type(), Some(gl::UNSIGNED_SHORT));
    let state = PipelineState::create(&gl, &desc, ResourceHandle::NULL, Blend::DEFAULT, &[], &[], ib, 4).unwrap();
    assert_eq!(state.index_type(), Some(gl::UNSIGNED_INT));
    // a stride without an index buffer is not an error
    let state =
        PipelineState::create(&gl, &desc, ResourceHandle::NULL, Blend::DEFAULT, &[], &[], ResourceHandle::NULL, 2).unwrap();
    assert_eq!(state.index_type(), None);
}

#[test]
fn missing_vertex_shader() {
    let (driver, gl) = recording();
    let err = PipelineState::create(
        &gl,
        &PipelineDesc::default(),
        ResourceHandle::NULL,
        Blend::DEFAULT,
        &[],
        &[],
        ResourceHandle::NULL,
        0,
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidParameter(_)));
    assert!(driver.calls().is_empty());
}

#[test]
fn handles_of_the_wrong_kind() {
    let (_driver, gl) = recording();
    let (_vs, desc) = vertex_only(&gl);
    let texture = ResourceHandle::new(Category::Texture, 5);

    let err = PipelineState::create(&gl, &desc, texture, Blend::DEFAULT, &[], &[], ResourceHandle::NULL, 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::CategoryMismatch);
    let err = PipelineState::create(&gl, &desc, ResourceHandle::NULL, Blend::DEFAULT, &[(texture, 16)], &[], ResourceHandle::NULL, 0)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CategoryMismatch);
}

#[test]
fn reapplying_a_pipeline_touches_nothing_new() {
    let (driver, gl) = recording();
    let (_vs, base) = vertex_only(&gl);
    let desc = PipelineDesc {
        members: PipelineMembers::FLAGS | PipelineMembers::CULL | PipelineMembers::FILL,
        flags: PipelineFlags::BLEND
            | PipelineFlags::DEPTH_WRITE
            | PipelineFlags::FRONT_COUNTER_CLOCKWISE
            | PipelineFlags::DEPTH_CLIP
            | PipelineFlags::MULTISAMPLE,
        cull: Cull::Back as u8,
        fill: Fill::Line as u8,
        ..base
    };
    let blend = Blend {
        src: BlendOperand::SrcAlpha,
        dst: BlendOperand::InvSrcAlpha,
        ..Blend::DEFAULT
    };
    let state = PipelineState::create(&gl, &desc, ResourceHandle::NULL, blend, &[], &[], ResourceHandle::NULL, 0).unwrap();
    let mut ctx = Context::new(&gl, Vec2i::new(320, 240));

    driver.clear_calls();
    state.apply(&mut ctx).unwrap();
    assert_eq!(driver.call_count("glBlendFuncSeparate"), 1);
    assert_eq!(driver.call_count("glEnable"), 2); // blend, cull face
    assert_eq!(driver.call_count("glCullFace"), 1);
    assert_eq!(driver.call_count("glPolygonMode"), 1);
    assert!(driver.is_enabled(gl::BLEND));

    driver.clear_calls();
    state.apply(&mut ctx).unwrap();
    for name in &[
        "glBlendFuncSeparate",
        "glBlendEquationSeparate",
        "glColorMask",
        "glEnable",
        "glDisable",
        "glCullFace",
        "glPolygonMode",
        "glFrontFace",
        "glDepthMask",
    ] {
        assert_eq!(driver.call_count(name), 0, "{} issued twice", name);
    }
    assert_eq!(driver.call_count("glUseProgram"), 1);
}

#[test]
fn render_target_is_bound_on_apply() {
    let (driver, gl) = recording();
    let (_vs, desc) = vertex_only(&gl);
    let tex = texture::Texture::create2d(
        &gl,
        gl::TEXTURE_2D,
        PixelFormat::R8G8B8A8_UNorm,
        false,
        Vec2i::new(16, 16),
        &Sampler::default(),
        None,
        0,
    )
    .unwrap();
    let fb = framebuffer::Framebuffer::create(&gl, gl::FRAMEBUFFER, framebuffer::Attachment::new(gl::TEXTURE_2D), &[tex.get()])
        .unwrap();
    let state = PipelineState::create(&gl, &desc, fb.get().to_handle(), Blend::DEFAULT, &[], &[], ResourceHandle::NULL, 0)
        .unwrap();
    assert_eq!(state.render_target(), Some(fb.get()));

    let mut ctx = Context::new(&gl, Vec2i::new(16, 16));
    state.apply(&mut ctx).unwrap();
    assert_eq!(ctx.framebuffer(), fb.raw());
    assert_eq!(driver.bound(gl::DRAW_FRAMEBUFFER), fb.raw());
}
