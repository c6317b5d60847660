use chrono::Utc;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::auth::{AuthSession, with_origin};
use super::client::{Body, TimedClient, TimedResponse};
use super::config::ApiConfig;
use super::error::ApiError;
use super::ledger::LatencyLedger;
use crate::common::FlowResult;

const WORDS: [&str; 16] = [
    "sun", "sky", "sea", "tea", "joy", "fun", "cat", "dog", "win", "pro", "max", "zen", "art",
    "box", "bee", "fan",
];
const SERVICE_TYPE: &str = "LIFESTYLE";
const ID_FIELDS: [&str; 4] = ["id", "announceId", "announcementId", "announce_id"];
const ANNOUNCEMENT_LIST: &str = "/announcement/getList?title=&status=&announceType=&startDate=&endDate=&offset=0&limit=10";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ApiFlow {
    Login,
    CreateCategory,
    UpdateCategory,
    DeleteAnnouncement,
}

impl ApiFlow {
    pub const ALL: [Self; 4] = [
        Self::Login,
        Self::CreateCategory,
        Self::UpdateCategory,
        Self::DeleteAnnouncement,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CreateCategory => "create-category",
            Self::UpdateCategory => "update-category",
            Self::DeleteAnnouncement => "delete-announcement",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|flow| flow.key() == wanted)
    }
}

/// The backend checks, sharing one client, one login and one ledger.
#[derive(Debug)]
pub struct ApiChecks {
    cfg: ApiConfig,
    client: TimedClient,
    auth: AuthSession,
    rng: Mutex<ChaCha8Rng>,
}

impl ApiChecks {
    pub fn new(cfg: ApiConfig, seed: u64) -> Result<Self, ApiError> {
        let ledger = LatencyLedger::new(&cfg.ledger_dir, cfg.latency_threshold_ms);
        if let Err(err) = ledger.reset() {
            warn!(
                "failed to reset latency ledgers in {}: {err}",
                cfg.ledger_dir.display()
            );
        }
        let client = TimedClient::new(ledger, Duration::from_secs(30))?;
        Ok(Self {
            cfg,
            client,
            auth: AuthSession::new(),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        })
    }

    pub async fn run(&self, flow: ApiFlow) -> FlowResult {
        let start = Instant::now();
        let outcome = match flow {
            ApiFlow::Login => self.login().await,
            ApiFlow::CreateCategory => self.create_category().await,
            ApiFlow::UpdateCategory => self.update_category().await,
            ApiFlow::DeleteAnnouncement => self.delete_first_announcement().await,
        };
        let (passed, detail) = match outcome {
            Ok(detail) => (true, detail),
            Err(err) => (false, err.to_string()),
        };
        FlowResult {
            flow: flow.key().to_string(),
            passed,
            detail,
            requests: self.client.take_timings(),
            duration: start.elapsed(),
        }
    }

    async fn login(&self) -> Result<String, ApiError> {
        self.auth.authorization(&self.client, &self.cfg).await?;
        Ok(format!("authorized as {}", self.cfg.username))
    }

    async fn create_category(&self) -> Result<String, ApiError> {
        let image = self.upload_configured_image().await?;
        let status = if self.with_rng(|rng| rng.gen_bool(0.5)) {
            "active"
        } else {
            "inactive"
        };
        let payload = self.category_payload(status, &image);
        let request = self.client.http().post(self.cfg.url("/categories"));
        let response = self.send_category(request, &payload).await?;
        expect_success("create category", &response)?;
        let name = payload["name"].as_str().unwrap_or_default();
        Ok(format!("created {name} ({status}): {}", response.body))
    }

    async fn update_category(&self) -> Result<String, ApiError> {
        let image = self.upload_configured_image().await?;
        let payload = self.category_payload("inactive", &image);
        let url = self.cfg.url(&format!(
            "/categories/update?categoryId={}",
            self.cfg.category_id
        ));
        let request = self.client.http().patch(url);
        let response = self.send_category(request, &payload).await?;
        expect_success("update category", &response)?;
        Ok(format!(
            "updated category {}: {}",
            self.cfg.category_id, response.body
        ))
    }

    async fn delete_first_announcement(&self) -> Result<String, ApiError> {
        let list_url = self.cfg.url(ANNOUNCEMENT_LIST);
        let request = with_origin(self.client.http().get(&list_url), &self.cfg);
        let request = self.auth.authorize(request, &self.client, &self.cfg).await?;
        let list = self.client.send(request).await?;
        info!("announcement list response: {}", list.body);

        let first = list
            .body
            .json()
            .and_then(first_record)
            .ok_or_else(|| ApiError::NoRecords("announcement list".to_string()))?;
        let id = record_id(first).ok_or_else(|| ApiError::NoId(first.clone()))?;

        let request = self
            .client
            .http()
            .get(self.cfg.url("/announcement/delete_by_id"))
            .query(&[("id", id.as_str())]);
        info!("deleting announcement {id}");
        let request = self.auth.authorize(request, &self.client, &self.cfg).await?;
        let deleted = self.client.send(request).await?;
        if deleted.body.code() != Some(0) {
            return Err(ApiError::Rejected {
                action: "delete announcement",
                status: deleted.status,
                body: deleted.body.to_string(),
            });
        }
        Ok(format!("deleted announcement {id}"))
    }

    async fn send_category(
        &self,
        request: reqwest::RequestBuilder,
        payload: &Value,
    ) -> Result<TimedResponse, ApiError> {
        let request = with_origin(request, &self.cfg)
            .header("Accept-Language", "en-US,en;q=0.9")
            .json(payload);
        let request = self.auth.authorize(request, &self.client, &self.cfg).await?;
        let response = self.client.send(request).await?;
        info!(
            "category response {} in {} ms: {}",
            response.status,
            response.elapsed.as_millis(),
            response.body
        );
        Ok(response)
    }

    async fn upload_configured_image(&self) -> Result<String, ApiError> {
        let path = &self.cfg.image;
        if !path.exists() {
            return Err(ApiError::ImageMissing(path.display().to_string()));
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "scan.png".to_string(), |n| n.to_string_lossy().into_owned());
        self.upload_image(bytes, &file_name).await
    }

    /// Multipart upload, then raw bytes, then a synthesised storage path.
    pub async fn upload_image(&self, bytes: Vec<u8>, file_name: &str) -> Result<String, ApiError> {
        let folder = &self.cfg.upload_folder;
        let url = self
            .cfg
            .url(&format!("/vip_member/uploadImage?folder={folder}"));

        let part = Part::bytes(bytes.clone())
            .file_name(file_name.to_string())
            .mime_str("image/png")?;
        let form = Form::new().part("files", part).text("folder", folder.clone());
        let request = with_origin(self.client.http().post(&url).multipart(form), &self.cfg);
        let request = self.auth.authorize(request, &self.client, &self.cfg).await?;
        let multipart = self.client.send(request).await?;
        info!("upload (multipart) time: {} ms", multipart.elapsed.as_millis());
        if let Some(path) = uploaded_path(&multipart.body) {
            return Ok(path);
        }

        let request = self
            .client
            .http()
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        let request = self.auth.authorize(request, &self.client, &self.cfg).await?;
        let raw = self.client.send(request).await?;
        info!("upload (raw) time: {} ms", raw.elapsed.as_millis());
        if let Some(path) = uploaded_path(&raw.body) {
            return Ok(path);
        }

        let path = fallback_image_path(folder, file_name, Utc::now().timestamp_millis());
        warn!("image upload rejected, using {path}");
        Ok(path)
    }

    fn category_payload(&self, status: &str, image: &str) -> Value {
        let (name, description) = self.with_rng(|rng| (pick_word(rng), pick_word(rng)));
        json!({
            "name": name,
            "description": description,
            "status": status,
            "image": image,
            "serviceType": SERVICE_TYPE,
        })
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        match self.rng.lock() {
            Ok(mut rng) => f(&mut rng),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

fn expect_success(action: &'static str, response: &TimedResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::Rejected {
            action,
            status: response.status,
            body: response.body.to_string(),
        })
    }
}

pub fn pick_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or(WORDS[0])
}

/// Storage path from a successful upload: `data[0]` when `code == 0`.
pub fn uploaded_path(body: &Body) -> Option<String> {
    if body.code() != Some(0) {
        return None;
    }
    match body.json()?.get("data")?.as_array()?.first()? {
        Value::String(path) => Some(path.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn fallback_image_path(folder: &str, file_name: &str, millis: i64) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("vip-member/{folder}/{stem}_{millis}{ext}")
}

/// First record of a list response, whichever envelope it comes in.
pub fn first_record(body: &Value) -> Option<&Value> {
    fn head(list: Option<&Value>) -> Option<&Value> {
        list?.as_array()?.first().filter(|v| is_truthy(v))
    }
    if body.is_array() {
        return head(Some(body));
    }
    head(body.get("data"))
        .or_else(|| head(body.get("data").and_then(|data| data.get("list"))))
        .or_else(|| head(body.get("list")))
        .or_else(|| head(body.get("records")))
}

/// The record's id, or the record itself when it is a bare id.
pub fn record_id(record: &Value) -> Option<String> {
    let value = match record {
        Value::Object(fields) => ID_FIELDS.iter().find_map(|field| fields.get(*field))?,
        Value::Number(_) | Value::String(_) => record,
        _ => return None,
    };
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_reads_every_envelope() {
        let shapes = [
            json!([{"id": 1}]),
            json!({"data": [{"id": 1}]}),
            json!({"data": {"list": [{"id": 1}], "total": 9}}),
            json!({"list": [{"id": 1}]}),
            json!({"records": [{"id": 1}]}),
        ];
        for shape in &shapes {
            assert_eq!(first_record(shape), Some(&json!({"id": 1})), "{shape}");
        }
        assert_eq!(first_record(&json!({"data": []})), None);
        assert_eq!(first_record(&json!({"code": 0})), None);
    }

    #[test]
    fn record_id_tries_known_fields_in_order() {
        assert_eq!(record_id(&json!({"id": 12})).as_deref(), Some("12"));
        assert_eq!(
            record_id(&json!({"announceId": "a-9", "announce_id": "x"})).as_deref(),
            Some("a-9")
        );
        assert_eq!(record_id(&json!({"announce_id": 4})).as_deref(), Some("4"));
        assert_eq!(record_id(&json!(77)).as_deref(), Some("77"));
        assert_eq!(record_id(&json!("abc")).as_deref(), Some("abc"));
        assert_eq!(record_id(&json!({"title": "no id"})), None);
        assert_eq!(record_id(&json!({"id": null, "announceId": 3})), None);
    }

    #[test]
    fn upload_path_requires_code_zero_and_data() {
        let ok = Body::Json(json!({"code": 0, "data": ["vip-member/waterbar_category/a.png"]}));
        assert_eq!(
            uploaded_path(&ok).as_deref(),
            Some("vip-member/waterbar_category/a.png")
        );
        assert_eq!(uploaded_path(&Body::Json(json!({"code": 0, "data": []}))), None);
        assert_eq!(uploaded_path(&Body::Json(json!({"code": 500, "data": ["x"]}))), None);
        assert_eq!(uploaded_path(&Body::Text("Bad Gateway".into())), None);
    }

    #[test]
    fn fallback_path_keeps_stem_and_extension() {
        assert_eq!(
            fallback_image_path("waterbar_category", "scan.png", 1_700_000_000_000),
            "vip-member/waterbar_category/scan_1700000000000.png"
        );
        assert_eq!(
            fallback_image_path("f", "noext", 5),
            "vip-member/f/noext_5"
        );
    }

    #[test]
    fn words_come_from_the_fixed_list() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(WORDS.contains(&pick_word(&mut rng)));
        }
    }

    #[test]
    fn flow_names_parse() {
        assert_eq!(ApiFlow::parse("delete_announcement"), Some(ApiFlow::DeleteAnnouncement));
        assert_eq!(ApiFlow::parse("Login"), Some(ApiFlow::Login));
        assert_eq!(ApiFlow::parse("refund"), None);
    }
}
