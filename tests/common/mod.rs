#![allow(dead_code)]

pub mod synthetic_image;

/// Route library logs to the test harness once per binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
