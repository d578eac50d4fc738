pub mod api;
pub mod core;

pub fn init_logging() {
    // 重复初始化直接忽略（测试会多次调用）
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
