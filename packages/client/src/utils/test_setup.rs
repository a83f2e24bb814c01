use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt().with_test_writer().try_init().ok();
        // バックアップ値を設定（.envファイルが存在しない場合のデフォルト値）
        if std::env::var("SERVER_URL").is_err() {
            std::env::set_var("SERVER_URL", "http://localhost:8080");
        }
        if std::env::var("WS_URL").is_err() {
            std::env::set_var("WS_URL", "ws://localhost:8080");
        }
    });
}
