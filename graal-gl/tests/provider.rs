mod common;

use common::{int_bytes, ints_from_bytes, Fixture};
use graal_gl::api::gl;
use graal_gl::*;
use std::slice;

const BACKBUFFER: PixelFormat = PixelFormat::B8G8R8A8_UNorm;

fn code(code: ErrorCode) -> i32 {
    code.into()
}

fn color_texture(p: &mut Provider, size: i32) -> ResourceHandle {
    p.create_texture(
        Vec2i::new(size, size),
        Usage::Texture2D as u8,
        PixelFormat::R8G8B8A8_UNorm,
        &Sampler::default(),
        None,
        0,
    )
}

#[test]
fn one_command_list_at_a_time() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let ctx = p.create_context(Vec2i::new(64, 64), BACKBUFFER).unwrap();

    let list = p.create_command_list(ctx, false).unwrap();
    assert!(p.create_command_list(ctx, false).is_none());
    assert_eq!(p.execute(ctx, list), 0);
    assert_eq!(p.destroy_command_list(list), 0);
    assert_eq!(p.destroy_command_list(list), code(ErrorCode::InvalidCall));

    // a closed list records nothing
    f.driver.clear_calls();
    assert_eq!(
        f.provider.clear(list, ClearFlags::COLOR, Color16::WHITE, 0, 1.0, &[]),
        code(ErrorCode::InvalidCall)
    );
    assert_eq!(f.driver.call_count("glClear"), 0);

    let p = &mut f.provider;
    let again = p.create_command_list(ctx, true).unwrap();
    assert_eq!(p.destroy_command_list(again), 0);
}

#[test]
fn destroying_a_context_closes_its_list() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let first = p.create_context(Vec2i::new(8, 8), BACKBUFFER).unwrap();
    p.create_command_list(first, false).unwrap();
    assert_eq!(p.destroy_context(first), 0);
    assert!(p.context(first).is_none());
    assert_eq!(p.destroy_context(first), code(ErrorCode::InvalidParameter));

    let second = p.create_context(Vec2i::new(8, 8), BACKBUFFER).unwrap();
    assert!(p.create_command_list(second, false).is_some());
    assert!(p.create_command_list(first, false).is_none());
}

#[test]
fn context_needs_a_renderable_backbuffer() {
    let mut f = Fixture::new();
    assert!(f
        .provider
        .create_context(Vec2i::new(8, 8), PixelFormat::BC1_UNorm)
        .is_none());
    let ctx = f.provider.create_context(Vec2i::new(8, 8), BACKBUFFER).unwrap();
    assert_eq!(f.provider.resize_context(ctx, Vec2i::new(32, 16)), 0);
    assert_eq!(f.provider.context(ctx).unwrap().dim(), Vec2i::new(32, 16));
}

#[test]
fn map_and_unmap_pair_up() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let usage = Usage::StorageBuffer as u8;
    let buffer = p.create_buffer(Some(&int_bytes(&[1, 2, 3, 4])), 16, usage);
    assert_eq!(buffer.category(), Some(Category::Buffer));

    let ptr = p.map_resource(buffer, 0, 0, usage, AccessFlags::READ).unwrap();
    let contents = unsafe { slice::from_raw_parts(ptr.as_ptr() as *const u8, 16) };
    assert_eq!(ints_from_bytes(contents), vec![1, 2, 3, 4]);
    assert!(f.driver.is_mapped(buffer.name()));

    let p = &mut f.provider;
    // the target already has a mapping
    assert!(p.map_resource(buffer, 0, 0, usage, AccessFlags::READ).is_none());
    assert_eq!(p.unmap_resource(buffer, Usage::VertexData as u8), code(ErrorCode::InvalidCall));
    assert_eq!(p.unmap_resource(buffer, usage), 0);
    assert_eq!(p.unmap_resource(buffer, usage), code(ErrorCode::InvalidCall));
    assert!(!f.driver.is_mapped(buffer.name()));

    let p = &mut f.provider;
    let ptr = p.map_resource(buffer, 4, 8, usage, AccessFlags::READ).unwrap();
    let range = unsafe { slice::from_raw_parts(ptr.as_ptr() as *const u8, 8) };
    assert_eq!(ints_from_bytes(range), vec![2, 3]);
    assert_eq!(f.driver.call_count("glMapBufferRange"), 1);
    assert_eq!(f.provider.unmap_resource(buffer, usage), 0);
}

#[test]
fn only_buffers_map() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let texture = color_texture(p, 4);
    assert!(!texture.is_null());
    assert!(p
        .map_resource(texture, 0, 0, Usage::Texture2D as u8, AccessFlags::READ)
        .is_none());
    let buffer = p.create_buffer(None, 16, Usage::VertexData as u8);
    assert!(p.map_resource(buffer, 0, 0, 0, AccessFlags::WRITE).is_none());
}

#[test]
fn destroying_a_mapped_buffer_frees_its_target() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let usage = Usage::CopyRead as u8;
    let first = p.create_buffer(None, 16, usage);
    let second = p.create_buffer(None, 16, usage);
    assert!(p.map_resource(first, 0, 0, usage, AccessFlags::WRITE).is_some());
    assert_eq!(p.destroy_resource(first), 0);
    assert!(p.map_resource(second, 0, 0, usage, AccessFlags::WRITE).is_some());
    assert_eq!(p.unmap_resource(second, usage), 0);
}

#[test]
fn clear_with_rects_restores_the_scissor() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let ctx = p.create_context(Vec2i::new(64, 64), BACKBUFFER).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    assert_eq!(p.set_scissors(list, &[Rect::new(1.0, 2.0, 11.0, 12.0)]), 0);

    f.driver.clear_calls();
    let rects = [Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(8.0, 8.0, 16.0, 16.0)];
    assert_eq!(
        f.provider.clear(list, ClearFlags::COLOR, Color16::WHITE, 0, 1.0, &rects),
        0
    );
    assert_eq!(
        f.driver.call_names(),
        vec![
            "glClearColor",
            "glEnable",
            "glScissor",
            "glClear",
            "glScissor",
            "glClear",
            "glScissor",
            "glDisable"
        ]
    );
    let scissors: Vec<Vec<i64>> = f
        .driver
        .calls()
        .into_iter()
        .filter(|c| c.name == "glScissor")
        .map(|c| c.args)
        .collect();
    assert_eq!(scissors, vec![vec![0, 0, 8, 8], vec![8, 8, 8, 8], vec![1, 2, 10, 10]]);
    assert!(!f.driver.is_enabled(gl::SCISSOR_TEST));
}

#[test]
fn several_viewports_are_not_implemented() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let ctx = p.create_context(Vec2i::new(64, 64), BACKBUFFER).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    let viewport = Viewport {
        pos: [0.0; 3],
        dim: [32.0, 32.0, 1.0],
    };
    assert_eq!(p.set_viewports(list, &[viewport, viewport]), code(ErrorCode::NotImplemented));
    assert_eq!(p.set_viewports(list, &[viewport]), 0);
    let rect = Rect::new(0.0, 0.0, 4.0, 4.0);
    assert_eq!(p.set_scissors(list, &[rect, rect]), code(ErrorCode::NotImplemented));
}

#[test]
fn null_pipeline_clears_the_program() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let ctx = p.create_context(Vec2i::new(64, 64), BACKBUFFER).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    assert_eq!(p.set_pipeline_state(list, PipelineId::default()), code(ErrorCode::InvalidParameter));
    assert_eq!(p.context(ctx).unwrap().program(), 0);
    assert_eq!(p.draw(list, 3, 0, 0, 0), code(ErrorCode::InvalidCall));
}

#[test]
fn graphics_pipeline_draws() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let vs = p.compile_shader(ShaderStage::Vertex as u8, "void main() {}");
    let ps = p.compile_shader(ShaderStage::Pixel as u8, "void main() {}");
    let desc = PipelineDesc {
        members: PipelineMembers::VS | PipelineMembers::PS,
        ..PipelineDesc::default()
            .with_shader(ShaderStage::Vertex, vs.object())
            .with_shader(ShaderStage::Pixel, ps.object())
    };
    let pipeline =
        p.create_pipeline_state(&desc, ResourceHandle::NULL, &Blend::DEFAULT, &[], &[], ResourceHandle::NULL, 0);
    assert!(p.pipeline(pipeline).is_some());

    let ctx = p.create_context(Vec2i::new(64, 64), BACKBUFFER).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    assert_eq!(p.set_pipeline_state(list, pipeline), 0);
    assert_eq!(p.draw(list, 3, 0, 0, 0), 0);
    assert_eq!(p.draw(list, 3, 2, 0, 0), 0);
    assert_eq!(p.draw_indexed(list, 3, 0, 0, 0, 0), code(ErrorCode::InvalidCall));
    assert_eq!(p.dispatch(list), code(ErrorCode::InvalidCall));
    assert_eq!(p.destroy_command_list(list), 0);
    assert_eq!(f.driver.call_count("glDrawArrays"), 1);
    assert_eq!(f.driver.call_count("glDrawArraysInstancedBaseInstance"), 1);

    let p = &mut f.provider;
    assert_eq!(p.destroy_pipeline_state(pipeline), 0);
    assert_eq!(p.destroy_pipeline_state(pipeline), code(ErrorCode::InvalidParameter));
}

#[test]
fn failed_pipeline_is_null() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let pipeline = p.create_pipeline_state(
        &PipelineDesc::default(),
        ResourceHandle::NULL,
        &Blend::DEFAULT,
        &[],
        &[],
        ResourceHandle::NULL,
        0,
    );
    assert_eq!(pipeline, PipelineId::default());
}

#[test]
fn shader_lifecycle() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    assert!(p.compile_shader(99, "void main() {}").is_null());
    assert!(p
        .compile_shader(ShaderStage::Pixel as u8, "#error unterminated comment")
        .is_null());

    let shader = p.compile_shader(ShaderStage::Geometry as u8, "void main() {}");
    assert!(!shader.is_null());
    assert_eq!(f.driver.shader_stage(shader.0), Some(gl::GEOMETRY_SHADER));
    let p = &mut f.provider;
    assert_eq!(p.destroy_shader(shader), 0);
    assert_eq!(p.destroy_shader(shader), code(ErrorCode::InvalidParameter));
    assert_eq!(p.destroy_shader(ShaderId::NULL), code(ErrorCode::InvalidParameter));
}

#[test]
fn render_targets() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let color = color_texture(p, 16);
    let depth = p.create_texture(
        Vec2i::new(16, 16),
        Usage::Texture2D as u8,
        PixelFormat::D24_UNorm_S8_UInt,
        &Sampler::default(),
        None,
        0,
    );
    assert!(!depth.is_null());

    let rt = p.create_render_target(depth, &[color], ClearFlags::DEPTH | ClearFlags::STENCIL);
    assert_eq!(rt.category(), Some(Category::Framebuffer));
    let attached: Vec<i64> = f
        .driver
        .calls()
        .into_iter()
        .filter(|c| c.name == "glFramebufferTexture")
        .map(|c| c.args[1])
        .collect();
    assert_eq!(
        attached,
        vec![gl::COLOR_ATTACHMENT0 as i64, gl::DEPTH_STENCIL_ATTACHMENT as i64]
    );

    let p = &mut f.provider;
    assert!(p
        .create_render_target(ResourceHandle::NULL, &[color], ClearFlags::DEPTH)
        .is_null());
    assert!(p.create_render_target(ResourceHandle::NULL, &[rt], ClearFlags::empty()).is_null());
    assert_eq!(p.destroy_resource(rt), 0);
    assert_eq!(p.destroy_resource(rt), code(ErrorCode::InvalidParameter));
}

#[test]
fn render_target_limit() {
    let mut f = Fixture::new();
    f.driver.set_integer(gl::MAX_COLOR_ATTACHMENTS, 2);
    let p = &mut f.provider;
    let textures: Vec<ResourceHandle> = (0..3).map(|_| color_texture(p, 4)).collect();
    assert!(!p.create_render_target(ResourceHandle::NULL, &textures[..2], ClearFlags::empty()).is_null());
    assert!(p.create_render_target(ResourceHandle::NULL, &textures, ClearFlags::empty()).is_null());

    let mut f = Fixture::with_config(ProviderConfig {
        max_render_targets: Some(1),
        ..ProviderConfig::default()
    });
    let p = &mut f.provider;
    let textures: Vec<ResourceHandle> = (0..2).map(|_| color_texture(p, 4)).collect();
    f.driver.clear_calls();
    assert!(f
        .provider
        .create_render_target(ResourceHandle::NULL, &textures, ClearFlags::empty())
        .is_null());
    assert_eq!(f.driver.call_count("glGenFramebuffers"), 0);
}

#[test]
fn renderbuffer_usage_makes_a_renderbuffer() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let rb = p.create_texture(
        Vec2i::new(8, 8),
        Usage::Renderbuffer as u8,
        PixelFormat::D24_UNorm_S8_UInt,
        &Sampler::default(),
        None,
        4,
    );
    assert_eq!(rb.category(), Some(Category::Renderbuffer));
    assert_eq!(f.driver.call_count("glRenderbufferStorageMultisample"), 1);
    assert_eq!(f.provider.destroy_resource(rb), 0);
    assert_eq!(f.driver.call_count("glDeleteRenderbuffers"), 1);
}

#[test]
fn srgb_textures_follow_config() {
    let mut f = Fixture::with_config(ProviderConfig {
        srgb_textures: true,
        ..ProviderConfig::default()
    });
    color_texture(&mut f.provider, 4);
    let image = f
        .driver
        .calls()
        .into_iter()
        .find(|c| c.name == "glTexImage2D")
        .unwrap();
    assert_eq!(image.args[2], gl::SRGB8_ALPHA8 as i64);
}

#[test]
fn short_texture_data_is_refused() {
    let mut f = Fixture::new();
    let texture = f.provider.create_texture(
        Vec2i::new(16, 16),
        Usage::Texture2D as u8,
        PixelFormat::R8G8B8A8_UNorm,
        &Sampler::default(),
        Some(&[0; 4]),
        0,
    );
    assert!(texture.is_null());
    assert_eq!(f.driver.call_count("glTexImage2D"), 0);
}

#[test]
fn copies_dispatch_on_resource_kind() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let ctx = p.create_context(Vec2i::new(8, 8), BACKBUFFER).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    let src = p.create_buffer(Some(&int_bytes(&[7, 8, 9])), 12, Usage::VertexData as u8);
    let dst = p.create_buffer(None, 12, Usage::VertexData as u8);
    let texture = color_texture(p, 4);
    let other = color_texture(p, 4);

    assert_eq!(p.copy_resource(list, src, dst, Vec3i::new(8, 0, 0), 0), 0);
    assert_eq!(p.copy_resource(list, src, texture, Vec3i::new(8, 0, 0), 0), code(ErrorCode::InvalidParameter));
    assert_eq!(p.copy_resource(list, texture, other, Vec3i::new(4, 4, 0), 0), 0);
    assert_eq!(ints_from_bytes(&f.driver.buffer_contents(dst.name()).unwrap()), vec![7, 8, 0]);
    assert_eq!(f.driver.call_count("glCopyImageSubData"), 1);
}

#[test]
fn begin_draw_needs_a_context() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let ctx = p.create_context(Vec2i::new(40, 30), BACKBUFFER).unwrap();
    assert_eq!(p.begin_draw(ctx, Some(&Rect::new(0.0, 0.0, 10.0, 10.0))), 0);
    let viewport = f.driver.calls().into_iter().find(|c| c.name == "glViewport").unwrap();
    assert_eq!(viewport.args, vec![0, 0, 40, 30]);
    assert!(f.driver.is_enabled(gl::SCISSOR_TEST));

    let p = &mut f.provider;
    assert_eq!(p.destroy_context(ctx), 0);
    assert_eq!(p.begin_draw(ctx, None), code(ErrorCode::MissingParameter));
    assert_eq!(p.end_draw(ctx), code(ErrorCode::MissingParameter));
}

#[test]
fn driver_errors_surface_as_native_codes() {
    let mut f = Fixture::new();
    f.driver.inject_error(gl::OUT_OF_MEMORY);
    assert!(f.provider.create_buffer(None, 1 << 20, Usage::VertexData as u8).is_null());

    // without error checks the same failure goes unnoticed
    let mut f = Fixture::with_config(ProviderConfig {
        check_errors: false,
        ..ProviderConfig::default()
    });
    f.driver.inject_error(gl::OUT_OF_MEMORY);
    assert!(!f.provider.create_buffer(None, 16, Usage::VertexData as u8).is_null());
}

#[test]
fn caps_through_the_interface() {
    let mut f = Fixture::new();
    f.driver.set_extensions(&["GL_ARB_compute_shader", "GL_ARB_shader_storage_buffer_object"]);
    let caps = f.interface().caps();
    assert_eq!(caps.version, 45);
    assert!(caps
        .features
        .contains(Features::COMPUTE_SHADER | Features::STORAGE_BUFFER | Caps::baseline()));
    let json = serde_json::to_value(&caps).unwrap();
    assert_eq!(json["glsl"], 450);
}
