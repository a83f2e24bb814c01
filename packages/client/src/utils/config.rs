use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(Config::new);

pub struct Config {
    pub server_url: String,
    pub ws_url: String,
}

impl Config {
    fn new() -> Self {
        Self {
            server_url: env::var("SERVER_URL").expect("SERVER_URL must be set"),
            ws_url: env::var("WS_URL").expect("WS_URL must be set"),
        }
    }
}
