mod common;

use common::{int_bytes, ints_from_bytes, Fixture};
use graal_gl::api::gl;
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

/// Does what `SOURCE` does, for the recording driver.
fn multiply_kernel(fixture: &Fixture) {
    fixture.driver.set_compute_kernel(|dispatch| {
        let k = dispatch.uniform_i32("dt").unwrap_or(0);
        let input = ints_from_bytes(&dispatch.read_storage(0).unwrap_or_default());
        let invocations = dispatch.groups[0] as usize * 64;
        let output: Vec<i32> = input.iter().take(invocations).map(|v| v * k).collect();
        dispatch.write_storage(1, &int_bytes(&output));
    });
}

#[test]
fn multiply_round_trip() {
    let mut f = Fixture::new();
    multiply_kernel(&f);
    let p = &mut f.provider;

    let shader = p.compile_shader(ShaderStage::Compute as u8, SOURCE);
    assert!(!shader.is_null());
    let pipeline = p.create_compute_pipeline(shader, Vec3i::new((COUNT / 64) as i32, 1, 1), PipelineFlags::empty());
    assert!(p.pipeline(pipeline).is_some());

    let bytes = COUNT * 4;
    let values: Vec<i32> = (0..COUNT as i32).collect();
    let storage = Usage::StorageBuffer as u8;
    let input = p.create_buffer(Some(&int_bytes(&values)), bytes, storage);
    let output = p.create_buffer(None, bytes, storage);
    let readback = p.create_buffer(None, bytes, Usage::CopyWrite as u8);
    assert!(!input.is_null() && !output.is_null() && !readback.is_null());

    let ctx = p.create_context(Vec2i::new(1, 1), PixelFormat::R8G8B8A8_UNorm).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    assert_eq!(p.set_pipeline_state(list, pipeline), 0);
    let constants = [
        (ShaderParameter::new("dt", 1, 0, 1, ShaderType::Int), ShaderValue::Int(K)),
        (ShaderParameter::new("inblock", 0, 0, 0, ShaderType::Buffer), ShaderValue::Resource(input)),
        (ShaderParameter::new("outblock", 0, 0, 1, ShaderType::Buffer), ShaderValue::Resource(output)),
    ];
    assert_eq!(p.set_shader_constants(list, &constants), 0);
    assert_eq!(p.dispatch(list), 0);
    assert_eq!(p.sync_point(list, BarrierFlags::STORAGE_BUFFER), 0);
    assert_eq!(p.copy_subresource(list, output, readback, 0, 0, bytes), 0);
    assert_eq!(p.execute(ctx, list), 0);
    assert_eq!(p.destroy_command_list(list), 0);

    let ptr = p.map_resource(readback, 0, 0, storage, AccessFlags::READ).unwrap();
    let mapped = unsafe { slice::from_raw_parts(ptr.as_ptr() as *const u8, bytes) };
    let result = ints_from_bytes(mapped);
    assert_eq!(result.len(), COUNT);
    for (i, v) in result.iter().enumerate() {
        assert_eq!(*v, i as i32 * K, "element {}", i);
    }
    assert_eq!(f.provider.unmap_resource(readback, storage), 0);

    let dispatch = f.driver.calls().into_iter().find(|c| c.name == "glDispatchCompute").unwrap();
    assert_eq!(dispatch.args, vec![16, 1, 1]);
    let barrier = f.driver.calls().into_iter().find(|c| c.name == "glMemoryBarrier").unwrap();
    assert_eq!(barrier.args, vec![gl::SHADER_STORAGE_BARRIER_BIT as i64]);

    let p = &mut f.provider;
    for &buffer in &[input, output, readback] {
        assert_eq!(p.destroy_resource(buffer), 0);
    }
    assert_eq!(p.destroy_pipeline_state(pipeline), 0);
    assert_eq!(p.destroy_shader(shader), 0);
}

#[test]
fn compute_pipeline_rejects_other_stages() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let vs = p.compile_shader(ShaderStage::Vertex as u8, "void main() {}");
    assert_eq!(
        p.create_compute_pipeline(vs, Vec3i::new(1, 1, 1), PipelineFlags::empty()),
        PipelineId::default()
    );
    assert_eq!(
        p.create_compute_pipeline(ShaderId::NULL, Vec3i::new(1, 1, 1), PipelineFlags::empty()),
        PipelineId::default()
    );
}

#[test]
fn compute_pipeline_does_not_draw() {
    let mut f = Fixture::new();
    let p = &mut f.provider;
    let cs = p.compile_shader(ShaderStage::Compute as u8, SOURCE);
    let pipeline = p.create_compute_pipeline(cs, Vec3i::new(4, 1, 1), PipelineFlags::empty());
    let ctx = p.create_context(Vec2i::new(1, 1), PixelFormat::R8G8B8A8_UNorm).unwrap();
    let list = p.create_command_list(ctx, false).unwrap();
    assert_eq!(p.set_pipeline_state(list, pipeline), 0);
    assert_eq!(p.context(ctx).unwrap().workgroup(), Some(Vec3i::new(4, 1, 1)));
    assert_eq!(p.draw(list, 3, 0, 0, 0), ErrorCode::InvalidCall as i32);
    assert_eq!(p.dispatch(list), 0);
}
