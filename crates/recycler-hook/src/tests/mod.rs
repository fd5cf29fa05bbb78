//! Engine-level tests against scripted curve engines


mod test_hook_flow;

/// Route `log` output through the test harness; run with `RUST_LOG=debug`
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
