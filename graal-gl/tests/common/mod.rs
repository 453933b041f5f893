#![allow(dead_code)]
use graal_gl::{Gl, GraphicsInterface, Provider, ProviderConfig, RecordingDriver};
use std::rc::Rc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn recording() -> (Rc<RecordingDriver>, Gl) {
    init_tracing();
    let driver = Rc::new(RecordingDriver::new());
    let gl = Gl::from_rc(driver.clone());
    (driver, gl)
}

/// A provider over a recording driver.
pub struct Fixture {
    pub driver: Rc<RecordingDriver>,
    pub provider: Provider,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture::with_config(ProviderConfig::default())
    }

    pub fn with_config(config: ProviderConfig) -> Fixture {
        let (driver, gl) = recording();
        Fixture {
            driver,
            provider: Provider::new(gl, config),
        }
    }

    pub fn interface(&mut self) -> &mut dyn GraphicsInterface {
        &mut self.provider
    }
}

/// Little-endian bytes of `values`.
pub fn int_bytes(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes().to_vec()).collect()
}

pub fn ints_from_bytes(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
