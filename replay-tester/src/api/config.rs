use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://192.168.40.95:9750/vip-member";

/// Connection and login details for the VIP member backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// One-time code sent with the login form.
    pub otp: String,
    pub user_type: String,
    pub device_id: String,
    /// Admin front-end origin sent as `Origin` and `Referer`.
    pub origin: String,
    pub lang: String,
    pub image: PathBuf,
    pub upload_folder: String,
    pub category_id: u64,
    /// Where `slow_apis.json` and `fast_apis.json` are written.
    pub ledger_dir: PathBuf,
    pub latency_threshold_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            username: "devvip".to_string(),
            password: "123456".to_string(),
            otp: "000000".to_string(),
            user_type: "staff_vip".to_string(),
            device_id: "web_172.16.10.100_1234567890".to_string(),
            origin: "http://192.168.40.95:8090".to_string(),
            lang: "zh".to_string(),
            image: PathBuf::from("tests/images/scan.png"),
            upload_folder: "waterbar_category".to_string(),
            category_id: 130,
            ledger_dir: PathBuf::from("target/api-ledger"),
            latency_threshold_ms: 100,
        }
    }
}

impl ApiConfig {
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn referer(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }
}
