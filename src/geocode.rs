use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;

const AMAP_GEOCODE_URL: &str = "https://restapi.amap.com/v3/geocode/geo";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub formatted_address: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum GeocodeError {
    #[error("地理编码未配置（缺少高德 Web 服务 Key）")]
    Disabled,
    #[error("请先填写门店地址")]
    EmptyAddress,
    /// Provider answered but refused; fields are passed through untouched.
    #[error("高德地图API错误: {info} (状态码: {status}, 信息码: {infocode})")]
    Provider {
        status: String,
        info: String,
        infocode: String,
    },
    #[error("网络请求失败: {0}")]
    Network(String),
    #[error("无法解析高德返回的坐标: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct AmapResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    infocode: String,
    #[serde(default)]
    geocodes: Vec<AmapGeocode>,
}

#[derive(Debug, Deserialize)]
struct AmapGeocode {
    #[serde(default)]
    location: String,
    /// A string normally, an empty array when AMap has nothing to say.
    #[serde(default)]
    formatted_address: Value,
}

/// Parse `"lng,lat"`.
pub fn parse_location(location: &str) -> Option<(f64, f64)> {
    let (lng, lat) = location.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return None;
    }
    Some((lng, lat))
}

fn interpret(body: AmapResponse, address: &str) -> Result<GeoPoint, GeocodeError> {
    let first = match body.geocodes.into_iter().next() {
        Some(g) if body.status == "1" => g,
        _ => {
            return Err(GeocodeError::Provider {
                status: body.status,
                info: body.info,
                infocode: body.infocode,
            })
        }
    };
    let (longitude, latitude) =
        parse_location(&first.location).ok_or_else(|| GeocodeError::Malformed(first.location.clone()))?;
    let formatted_address = first
        .formatted_address
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(address)
        .to_string();
    Ok(GeoPoint {
        longitude,
        latitude,
        formatted_address,
    })
}

/// AMap web-service geocoder (address + city -> coordinates).
pub struct Geocoder {
    client: reqwest::Client,
    key: String,
    default_city: String,
    endpoint: String,
}

impl Geocoder {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Geocoder {
            client,
            key: cfg.amap_key.trim().to_string(),
            default_city: cfg.amap_default_city.clone(),
            endpoint: AMAP_GEOCODE_URL.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.key.is_empty()
    }

    pub async fn geocode(&self, address: &str, city: Option<&str>) -> Result<GeoPoint, GeocodeError> {
        if !self.is_enabled() {
            return Err(GeocodeError::Disabled);
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_city);

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("key", self.key.as_str()), ("address", address), ("city", city)])
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;
        let body: AmapResponse = resp
            .json()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;
        log::debug!("AMap geocode '{}' -> status {} ({})", address, body.status, body.info);
        interpret(body, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> AmapResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn location_string_is_lng_then_lat() {
        assert_eq!(parse_location("116.680200,23.356300"), Some((116.6802, 23.3563)));
        assert_eq!(parse_location("116.68"), None);
        assert_eq!(parse_location("200,23"), None);
    }

    #[test]
    fn success_response_yields_point() {
        let p = interpret(
            body(r#"{"status":"1","info":"OK","infocode":"10000","geocodes":[{"location":"116.680200,23.356300","formatted_address":"广东省汕头市金平区中山路123号"}]}"#),
            "中山路123号",
        )
        .unwrap();
        assert_eq!(p.longitude, 116.6802);
        assert_eq!(p.latitude, 23.3563);
        assert_eq!(p.formatted_address, "广东省汕头市金平区中山路123号");
    }

    #[test]
    fn empty_formatted_address_falls_back_to_input() {
        let p = interpret(
            body(r#"{"status":"1","info":"OK","infocode":"10000","geocodes":[{"location":"116.1,23.1","formatted_address":[]}]}"#),
            "东厦路789号",
        )
        .unwrap();
        assert_eq!(p.formatted_address, "东厦路789号");
    }

    #[test]
    fn provider_errors_are_passed_through_verbatim() {
        let err = interpret(
            body(r#"{"status":"0","info":"INVALID_USER_KEY","infocode":"10001"}"#),
            "x",
        )
        .unwrap_err();
        assert_eq!(
            err,
            GeocodeError::Provider {
                status: "0".into(),
                info: "INVALID_USER_KEY".into(),
                infocode: "10001".into(),
            }
        );
        assert!(err.to_string().contains("INVALID_USER_KEY"));
        assert!(err.to_string().contains("10001"));

        // status 1 with no match is still a provider-side failure
        let err = interpret(body(r#"{"status":"1","info":"OK","infocode":"10000","geocodes":[]}"#), "x").unwrap_err();
        assert!(matches!(err, GeocodeError::Provider { .. }));
    }

    #[rocket::async_test]
    async fn disabled_without_key() {
        let g = Geocoder::from_config(&AppConfig::default());
        assert!(!g.is_enabled());
        assert_eq!(g.geocode("中山路", None).await, Err(GeocodeError::Disabled));
    }
}
