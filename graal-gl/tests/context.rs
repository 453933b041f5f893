mod common;

use common::recording;
use graal_gl::api::gl;
use graal_gl::buffer::Buffer;
use graal_gl::handle::Owned;
use graal_gl::renderbuffer::Renderbuffer;
use graal_gl::texture::Texture;
use graal_gl::*;

fn texture(gl: &Gl) -> Owned<Texture> {
    Texture::create2d(
        gl,
        gl::TEXTURE_2D,
        PixelFormat::R8G8B8A8_UNorm,
        false,
        Vec2i::new(8, 8),
        &Sampler::default(),
        None,
        0,
    )
    .unwrap()
}

fn renderbuffer(gl: &Gl) -> Owned<Renderbuffer> {
    Renderbuffer::create(gl, gl::RENDERBUFFER, PixelFormat::R8G8B8A8_UNorm, Vec2i::new(8, 8), 0).unwrap()
}

fn buffer(gl: &Gl) -> Owned<Buffer> {
    Buffer::create(gl, gl::ARRAY_BUFFER, None, 16).unwrap()
}

#[test]
fn buffer_copy_of_other_kinds_touches_nothing() {
    let (driver, gl) = recording();
    let ctx = Context::new(&gl, Vec2i::new(8, 8));
    let buf = buffer(&gl).get().to_handle();
    let tex = texture(&gl).get().to_handle();
    let rb = renderbuffer(&gl).get().to_handle();

    for &(src, dst) in &[(tex, buf), (buf, tex), (buf, rb), (tex, tex), (ResourceHandle::NULL, buf)] {
        driver.clear_calls();
        let err = ctx.copy_subresource(src, dst, 0, 0, 4).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CategoryMismatch);
        assert!(driver.calls().is_empty(), "{:?} -> {:?}", src, dst);
    }
}

#[test]
fn region_copy_of_mixed_kinds_touches_nothing() {
    let (driver, gl) = recording();
    let ctx = Context::new(&gl, Vec2i::new(8, 8));
    let buf = buffer(&gl);
    let tex = texture(&gl);
    let rb = renderbuffer(&gl);
    let (buf, tex, rb) = (buf.get().to_handle(), tex.get().to_handle(), rb.get().to_handle());

    let size = Vec3i::new(4, 4, 0);
    for &(src, dst) in &[(tex, rb), (rb, tex), (buf, buf), (tex, buf), (ResourceHandle::NULL, tex)] {
        driver.clear_calls();
        let err = ctx
            .copy_resource_region(src, dst, 0, Vec3i::default(), Vec3i::default(), size)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CategoryMismatch);
        assert!(driver.calls().is_empty(), "{:?} -> {:?}", src, dst);
    }
}

#[test]
fn region_copy_target_follows_extent() {
    let (driver, gl) = recording();
    let ctx = Context::new(&gl, Vec2i::new(8, 8));
    let a = texture(&gl);
    let b = texture(&gl);
    let (src, dst) = (a.get().to_handle(), b.get().to_handle());

    for &(size, target, extent) in &[
        (Vec3i::new(4, 0, 0), gl::TEXTURE_1D, [4, 1, 1]),
        (Vec3i::new(4, 2, 0), gl::TEXTURE_2D, [4, 2, 1]),
        (Vec3i::new(4, 2, 3), gl::TEXTURE_3D, [4, 2, 3]),
    ] {
        driver.clear_calls();
        ctx.copy_resource_region(src, dst, 1, Vec3i::new(1, 0, 0), Vec3i::default(), size)
            .unwrap();
        let copy = driver.calls().into_iter().find(|c| c.name == "glCopyImageSubData").unwrap();
        assert_eq!(copy.args[0], a.raw() as i64);
        assert_eq!(copy.args[1], target as i64);
        assert_eq!(copy.args[2], 1);
        assert_eq!(copy.args[3], 1);
        assert_eq!(copy.args[6], b.raw() as i64);
        assert_eq!(copy.args[7], target as i64);
        assert_eq!(&copy.args[12..], &extent.iter().map(|&v| v as i64).collect::<Vec<_>>()[..]);
    }
}

#[test]
fn renderbuffer_copies_use_the_renderbuffer_target() {
    let (driver, gl) = recording();
    let ctx = Context::new(&gl, Vec2i::new(8, 8));
    let a = renderbuffer(&gl);
    let b = renderbuffer(&gl);
    driver.clear_calls();
    ctx.copy_resource_region(
        a.get().to_handle(),
        b.get().to_handle(),
        0,
        Vec3i::default(),
        Vec3i::default(),
        Vec3i::new(8, 8, 0),
    )
    .unwrap();
    let copy = driver.calls().into_iter().find(|c| c.name == "glCopyImageSubData").unwrap();
    assert_eq!(copy.args[1], gl::RENDERBUFFER as i64);
    assert_eq!(copy.args[7], gl::RENDERBUFFER as i64);
}

#[test]
fn dead_objects_are_not_category_errors() {
    let (driver, gl) = recording();
    let ctx = Context::new(&gl, Vec2i::new(8, 8));
    let live_tex = texture(&gl);
    let dead_tex = texture(&gl).get().to_handle();
    let live_buf = buffer(&gl);
    let dead_buf = buffer(&gl).get().to_handle();

    driver.clear_calls();
    let err = ctx
        .copy_resource_region(dead_tex, live_tex.get().to_handle(), 0, Vec3i::default(), Vec3i::default(), Vec3i::new(1, 1, 0))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidParameter("source texture is not live"));
    let err = ctx.copy_subresource(live_buf.get().to_handle(), dead_buf, 0, 0, 4).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidParameter("destination buffer is not live"));
    assert_eq!(driver.call_count("glCopyImageSubData"), 0);
    assert_eq!(driver.call_count("glCopyBufferSubData"), 0);
}
