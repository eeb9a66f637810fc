use std::sync::Arc;

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::tokio::io::AsyncReadExt;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::geocode::Geocoder;
use crate::notify::{BadgeBoard, BadgeCounts};
use crate::security::auth::AdminUser;
use crate::storage::MediaStore;
use crate::store::Store;

/// Current badge counts, refreshed from the store when possible.
#[get("/api/badges")]
pub fn badges(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    board: &State<Arc<BadgeBoard>>,
) -> Json<BadgeCounts> {
    match board.refresh(&***store) {
        Ok(counts) => Json(counts),
        Err(e) => {
            log::warn!("Badge refresh failed: {}", e);
            Json(board.get())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[post("/api/geocode", format = "json", data = "<req>")]
pub async fn geocode(_admin: AdminUser, geocoder: &State<Geocoder>, req: Json<GeocodeRequest>) -> Json<Value> {
    match geocoder.geocode(&req.address, req.city.as_deref()).await {
        Ok(point) => Json(json!({
            "longitude": point.longitude,
            "latitude": point.latitude,
            "formatted_address": point.formatted_address,
        })),
        Err(e) => {
            log::warn!("Geocode '{}' failed: {}", req.address, e);
            Json(json!({ "error": e.to_string() }))
        }
    }
}

#[derive(FromForm)]
pub struct UploadForm<'f> {
    pub folder: String,
    pub file: TempFile<'f>,
}

#[post("/api/upload", data = "<form>")]
pub async fn upload(_admin: AdminUser, media: &State<MediaStore>, form: Form<UploadForm<'_>>) -> Json<Value> {
    let mut bytes = Vec::with_capacity(form.file.len() as usize);
    let read = async {
        let reader = form.file.open().await?;
        rocket::tokio::pin!(reader);
        reader.read_to_end(&mut bytes).await
    };
    if let Err(e) = read.await {
        log::error!("Failed to read upload: {}", e);
        return Json(json!({ "error": "读取上传文件失败" }));
    }

    match media.save(form.folder.trim(), &bytes) {
        Ok(url) => {
            log::info!("Uploaded {} ({} bytes)", url, bytes.len());
            Json(json!({ "url": url }))
        }
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub url: String,
}

#[post("/api/upload/delete", format = "json", data = "<req>")]
pub fn upload_delete(_admin: AdminUser, media: &State<MediaStore>, req: Json<DeleteRequest>) -> Json<Value> {
    match media.delete_by_url(&req.url) {
        Ok(()) => Json(json!({ "ok": true })),
        Err(e) => {
            log::warn!("Failed to delete {}: {}", req.url, e);
            Json(json!({ "ok": false, "error": e.to_string() }))
        }
    }
}
