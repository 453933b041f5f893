//! Multiplies 1024 integers by 3 on the GPU and reads them back.
//!
//! Needs an OpenGL 4.3 driver. `RUST_LOG=graal_gl=trace` shows every pipeline and dispatch.
use anyhow::{anyhow, bail};
use glutin::dpi::PhysicalSize;
use glutin::event_loop::EventLoop;
use glutin::{Api, ContextBuilder, GlProfile, GlRequest};
use graal_gl::mapping::ShaderType;
use graal_gl::*;
use std::slice;

const COUNT: usize = 1024;
const K: i32 = 3;

const SOURCE: &str = r#"#version 430
layout(local_size_x = 64) in;
uniform int dt;
layout(std430, binding = 0) buffer inblock { int src[]; };
layout(std430, binding = 1) buffer outblock { int dst[]; };
void main() {
    uint i = gl_GlobalInvocationID.x;
    dst[i] = src[i] * dt;
}
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let el = EventLoop::new();
    let context = ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (4, 3)))
        .with_gl_profile(GlProfile::Core)
        .build_headless(&el, PhysicalSize::new(1, 1))?;
    let context = unsafe { context.make_current() }.map_err(|(_, e)| e)?;
    let driver = unsafe { NativeDriver::load_with(|s| context.get_proc_address(s)) };

    let mut provider = Provider::new(Gl::new(driver), ProviderConfig::default());
    let caps = provider.caps();
    println!("{}", serde_json::to_string_pretty(&caps)?);
    if !caps.features.contains(Features::COMPUTE_SHADER) {
        bail!("the driver has no compute shaders");
    }

    let shader = provider.compile_shader(ShaderStage::Compute as u8, SOURCE);
    if shader.is_null() {
        bail!("compute shader did not compile");
    }
    let pipeline = provider.create_compute_pipeline(shader, Vec3i::new((COUNT / 64) as i32, 1, 1), PipelineFlags::empty());

    let bytes = COUNT * 4;
    let input: Vec<u8> = (0..COUNT as i32).flat_map(|v| v.to_le_bytes().to_vec()).collect();
    let storage = Usage::StorageBuffer as u8;
    let inblock = provider.create_buffer(Some(&input), bytes, storage);
    let outblock = provider.create_buffer(None, bytes, storage);
    let readback = provider.create_buffer(None, bytes, Usage::CopyWrite as u8);

    let ctx = provider
        .create_context(Vec2i::new(1, 1), PixelFormat::R8G8B8A8_UNorm)
        .ok_or_else(|| anyhow!("could not create a context"))?;
    let list = provider
        .create_command_list(ctx, false)
        .ok_or_else(|| anyhow!("could not open a command list"))?;
    let constants = [
        (ShaderParameter::new("dt", 1, 0, 1, ShaderType::Int), ShaderValue::Int(K)),
        (ShaderParameter::new("inblock", 0, 0, 0, ShaderType::Buffer), ShaderValue::Resource(inblock)),
        (ShaderParameter::new("outblock", 0, 0, 1, ShaderType::Buffer), ShaderValue::Resource(outblock)),
    ];
    let status = [
        provider.set_pipeline_state(list, pipeline),
        provider.set_shader_constants(list, &constants),
        provider.dispatch(list),
        provider.sync_point(list, BarrierFlags::STORAGE_BUFFER),
        provider.copy_subresource(list, outblock, readback, 0, 0, bytes),
        provider.execute(ctx, list),
        provider.destroy_command_list(list),
    ];
    if let Some(code) = status.iter().find(|&&c| c != 0) {
        bail!("command failed with code {}", code);
    }

    let ptr = provider
        .map_resource(readback, 0, 0, storage, AccessFlags::READ)
        .ok_or_else(|| anyhow!("could not map the result"))?;
    let mapped = unsafe { slice::from_raw_parts(ptr.as_ptr() as *const i32, COUNT) };
    let wrong = mapped.iter().enumerate().filter(|(i, &v)| v != *i as i32 * K).count();
    provider.unmap_resource(readback, storage);
    if wrong != 0 {
        bail!("{} of {} values are wrong", wrong, COUNT);
    }
    println!("{} values multiplied by {}", COUNT, K);

    for &buffer in &[inblock, outblock, readback] {
        provider.destroy_resource(buffer);
    }
    provider.destroy_pipeline_state(pipeline);
    provider.destroy_shader(shader);
    provider.destroy_context(ctx);
    Ok(())
}
