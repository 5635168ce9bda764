use std::env;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_LOG_SPEC: &str = "info, actix_web=info";
const DEFAULT_LOG_DIR: &str = "./logs";

pub struct Config {
    pub bind_addr: String,
    /// Falls back to the in-process store when unset.
    pub redis_url: Option<String>,
    pub log_spec: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Config {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned()),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            log_spec: env::var("LOG_SPEC").unwrap_or_else(|_| DEFAULT_LOG_SPEC.to_owned()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_owned()),
        }
    }
}
