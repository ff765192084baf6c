//! Best-effort geolocation lookups against free public providers.
//!
//! Every lookup tries a primary provider and then a fallback. Failures are
//! logged and surface as an empty [`Place`] or a missing image, never as an
//! error to the caller.

use std::net::IpAddr;
use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::hotel::Coordinates;
use crate::models::place::Place;

const NOMINATIM_REVERSE: &str = "https://nominatim.openstreetmap.org/reverse";
const BIGDATACLOUD_REVERSE: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";
const IPAPI_CO: &str = "https://ipapi.co";
const IP_API_COM: &str = "http://ip-api.com/json";
const WIKIPEDIA_SUMMARY: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const WIKIPEDIA_QUERY: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("trip-planner-api/", env!("CARGO_PKG_VERSION"));
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    display_name: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimResponse> for Place {
    fn from(response: NominatimResponse) -> Self {
        let address = response.address.unwrap_or_default();
        Place {
            city: non_blank(address.city)
                .or_else(|| non_blank(address.town))
                .or_else(|| non_blank(address.village))
                .or_else(|| non_blank(address.county)),
            state: non_blank(address.state),
            country: non_blank(address.country),
            display_name: non_blank(response.display_name),
            latitude: response.lat.and_then(|lat| lat.parse().ok()),
            longitude: response.lon.and_then(|lon| lon.parse().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BigDataCloudResponse {
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<BigDataCloudResponse> for Place {
    fn from(response: BigDataCloudResponse) -> Self {
        let city = non_blank(response.city).or_else(|| non_blank(response.locality));
        let state = non_blank(response.principal_subdivision);
        let country = non_blank(response.country_name);
        let display_name = {
            let parts: Vec<&str> = [&city, &state, &country]
                .into_iter()
                .filter_map(|part| part.as_deref())
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        };
        Place {
            city,
            state,
            country,
            display_name,
            latitude: response.latitude,
            longitude: response.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IpapiCoResponse {
    #[serde(default)]
    error: bool,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl IpapiCoResponse {
    fn into_place(self) -> Option<Place> {
        if self.error {
            return None;
        }
        let place = Place {
            city: non_blank(self.city),
            state: non_blank(self.region),
            country: non_blank(self.country_name),
            display_name: None,
            latitude: self.latitude,
            longitude: self.longitude,
        };
        (!place.is_empty()).then_some(place)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpApiComResponse {
    status: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiComResponse {
    fn into_place(self) -> Option<Place> {
        if self.status.as_deref() != Some("success") {
            return None;
        }
        let place = Place {
            city: non_blank(self.city),
            state: non_blank(self.region_name),
            country: non_blank(self.country),
            display_name: None,
            latitude: self.lat,
            longitude: self.lon,
        };
        (!place.is_empty()).then_some(place)
    }
}

#[derive(Debug, Deserialize)]
struct WikiImage {
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WikiSummaryResponse {
    originalimage: Option<WikiImage>,
    thumbnail: Option<WikiImage>,
}

impl WikiSummaryResponse {
    fn image_url(self) -> Option<String> {
        non_blank(self.originalimage.and_then(|image| image.source))
            .or_else(|| non_blank(self.thumbnail.and_then(|image| image.source)))
    }
}

#[derive(Debug, Deserialize)]
pub struct WikiQueryResponse {
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    pages: Vec<WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    original: Option<WikiImage>,
    thumbnail: Option<WikiImage>,
}

impl WikiQueryResponse {
    fn image_url(self) -> Option<String> {
        self.query?.pages.into_iter().find_map(|page| {
            non_blank(page.original.and_then(|image| image.source))
                .or_else(|| non_blank(page.thumbnail.and_then(|image| image.source)))
        })
    }
}

/// Caller address from the first `X-Forwarded-For` hop, else the peer.
pub fn client_ip(forwarded_for: Option<&str>, peer: Option<&str>) -> Option<IpAddr> {
    let forwarded = forwarded_for
        .and_then(|header| header.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());
    forwarded.or_else(|| {
        peer.and_then(|addr| {
            addr.parse::<std::net::SocketAddr>()
                .map(|socket| socket.ip())
                .or_else(|_| addr.parse::<IpAddr>())
                .ok()
        })
    })
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}

#[derive(Clone)]
pub struct GeoService {
    http: reqwest::Client,
}

impl GeoService {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        provider: &str,
        request: reqwest::RequestBuilder,
    ) -> Option<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("{provider} request failed: {err}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("{provider} returned {}", response.status());
            return None;
        }
        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(err) => {
                warn!("{provider} returned an unreadable body: {err}");
                None
            }
        }
    }

    pub async fn reverse_geocode(&self, at: Coordinates) -> Place {
        let lat = at.lat.to_string();
        let lng = at.lng.to_string();

        let nominatim = self
            .http
            .get(NOMINATIM_REVERSE)
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lng.as_str()),
                ("zoom", "10"),
            ]);
        if let Some(place) = self
            .fetch::<NominatimResponse>("nominatim", nominatim)
            .await
            .map(Place::from)
            .filter(|place| !place.is_empty())
        {
            return place;
        }

        debug!("falling back to bigdatacloud for {lat},{lng}");
        let bigdatacloud = self.http.get(BIGDATACLOUD_REVERSE).query(&[
            ("latitude", lat.as_str()),
            ("longitude", lng.as_str()),
            ("localityLanguage", "en"),
        ]);
        self.fetch::<BigDataCloudResponse>("bigdatacloud", bigdatacloud)
            .await
            .map(Place::from)
            .unwrap_or_default()
    }

    /// Looks up `ip`; private or missing addresses let the provider use the
    /// address it sees.
    pub async fn locate_ip(&self, ip: Option<IpAddr>) -> Place {
        let ip = ip.filter(is_public);

        let ipapi_url = match ip {
            Some(ip) => format!("{IPAPI_CO}/{ip}/json/"),
            None => format!("{IPAPI_CO}/json/"),
        };
        if let Some(place) = self
            .fetch::<IpapiCoResponse>("ipapi.co", self.http.get(ipapi_url))
            .await
            .and_then(IpapiCoResponse::into_place)
        {
            return place;
        }

        let ip_api_url = match ip {
            Some(ip) => format!("{IP_API_COM}/{ip}"),
            None => IP_API_COM.to_string(),
        };
        self.fetch::<IpApiComResponse>("ip-api.com", self.http.get(ip_api_url))
            .await
            .and_then(IpApiComResponse::into_place)
            .unwrap_or_default()
    }

    pub async fn wiki_image(&self, query: &str) -> Option<String> {
        let title = query.trim();
        if title.is_empty() {
            return None;
        }

        let mut summary_url = url::Url::parse(WIKIPEDIA_SUMMARY).ok()?;
        summary_url
            .path_segments_mut()
            .ok()?
            .push(&title.replace(' ', "_"));
        if let Some(image) = self
            .fetch::<WikiSummaryResponse>("wikipedia summary", self.http.get(summary_url))
            .await
            .and_then(WikiSummaryResponse::image_url)
        {
            return Some(image);
        }

        let query = self.http.get(WIKIPEDIA_QUERY).query(&[
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("prop", "pageimages"),
            ("piprop", "original|thumbnail"),
            ("pithumbsize", "800"),
            ("redirects", "1"),
            ("titles", title),
        ]);
        self.fetch::<WikiQueryResponse>("wikipedia pageimages", query)
            .await
            .and_then(WikiQueryResponse::image_url)
    }
}
