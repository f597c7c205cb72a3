//! Configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Rendered clips, served under `/media`
    pub out_dir: PathBuf,
    /// Static assets, served under `/public`
    pub public_dir: PathBuf,
    /// Renders allowed to run at once; further jobs stay queued
    pub max_concurrent_renders: usize,
    /// Renders running longer than this are failed. `None` disables the limit.
    pub render_timeout: Option<Duration>,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let timeout_secs: u64 = parsed("RENDER_TIMEOUT_SECS", 900);

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("4000")),
            out_dir: PathBuf::from(env::var("OUT_DIR").unwrap_or_else(|_| String::from("./out"))),
            public_dir: PathBuf::from(
                env::var("PUBLIC_DIR").unwrap_or_else(|_| String::from("./public")),
            ),
            max_concurrent_renders: parsed("MAX_CONCURRENT_RENDERS", 2).max(1),
            render_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| String::from("ffmpeg")),
            ffprobe_bin: env::var("FFPROBE_BIN").unwrap_or_else(|_| String::from("ffprobe")),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_falls_back_on_garbage() {
        env::set_var("REELCUT_TEST_PARSED", "not-a-number");
        assert_eq!(parsed("REELCUT_TEST_PARSED", 7u64), 7);
        env::set_var("REELCUT_TEST_PARSED", " 12 ");
        assert_eq!(parsed("REELCUT_TEST_PARSED", 7u64), 12);
        env::remove_var("REELCUT_TEST_PARSED");
        assert_eq!(parsed("REELCUT_TEST_PARSED", 7u64), 7);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            addr: "0.0.0.0".to_string(),
            port: "4000".to_string(),
            out_dir: PathBuf::from("out"),
            public_dir: PathBuf::from("public"),
            max_concurrent_renders: 2,
            render_timeout: None,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        };
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
    }
}
