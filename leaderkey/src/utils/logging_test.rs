#[cfg(test)]
mod tests {
    use super::super::logging::{init_logging, DEFAULT_FILTER};

    #[test]
    fn test_logging_initialization_is_idempotent() {
        // 同一进程内只能安装一次全局 subscriber，第二次调用必须安全返回
        init_logging();
        assert!(!init_logging());
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
