//! Beacon tracker
//!
//! Holds the parameter map of one `__utm.gif` beacon, fills in the defaults
//! the receiving service expects and embeds the utme codec as the `utme`
//! parameter. Tracking produces a [`BeaconRequest`]; sending it is up to the
//! caller.

use crate::config::AppConfig;
use crate::request::{anonymize_ip, to_query, visitor_id};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use utme_codec::{CustomVariable, Event, Result, Utme, UtmeInput};

/// Beacon path, prefixed with `http://www` or `https://ssl`
pub const UTM_GIF_LOCATION: &str = ".google-analytics.com/__utm.gif";

/// Stub for the `__utma` cookie the service expects
pub const UTMCC_STUB: &str = "__utma=999.999.999.999.999.1;";

/// Parameter key holding the serialized codec
pub const UTME_KEY: &str = "utme";

/// A fully built beacon request, ready to be sent
#[derive(Debug, Clone)]
pub struct BeaconRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub issued_at: DateTime<Utc>,
}

pub struct Tracker {
    location: String,
    params: BTreeMap<String, String>,
    utme: Utme,
}

/// Random number in `0..0x7fffffff`, as the service expects for ids
fn random_number() -> u32 {
    rand::rng().random_range(0..0x7fff_ffff)
}

fn random_id() -> String {
    random_number().to_string()
}

impl Tracker {
    /// Create a tracker with default parameters, request metadata and the
    /// configured overrides applied in that order
    pub fn new(config: &AppConfig) -> Result<Self> {
        let scheme = if config.tracker.use_ssl {
            "https://ssl"
        } else {
            "http://www"
        };

        let mut tracker = Self {
            location: format!("{}{}", scheme, UTM_GIF_LOCATION),
            params: BTreeMap::new(),
            utme: Utme::new(),
        };

        let defaults = [
            ("utmac", config.tracker.account_id.clone().unwrap_or_default()),
            ("utmcc", UTMCC_STUB.to_string()),
            ("utmcs", "UTF-8".to_string()),
            ("utmhid", random_id()),
            ("utmn", random_id()),
            ("utmvid", random_id()),
            ("utmwv", config.tracker.version.clone()),
            ("utmul", config.tracker.language.clone()),
        ];
        for (key, value) in defaults {
            tracker.params.insert(key.to_string(), value);
        }

        let request = &config.request;
        let metadata = [
            ("utmhn", request.host.clone()),
            ("utmr", request.referrer.clone()),
            ("utmp", request.path.clone()),
            ("utmip", request.remote_addr.as_deref().map(anonymize_ip)),
            (
                "utmvid",
                request
                    .user_agent
                    .as_deref()
                    .map(|agent| visitor_id(agent, random_number())),
            ),
        ];
        for (key, value) in metadata {
            if let Some(value) = value {
                tracker.params.insert(key.to_string(), value);
            }
        }

        for (key, value) in &config.params {
            tracker.set(key, value.as_str())?;
        }

        Ok(tracker)
    }

    /// Set a beacon parameter
    ///
    /// The `utme` key is routed through [`Utme::parse`] so stored strings are
    /// rehydrated into a codec that can be mutated further.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if key == UTME_KEY {
            self.utme = Utme::parse(value)?;
        } else {
            self.params.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    /// Get a beacon parameter (the `utme` parameter is not included)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Replace the codec from any accepted input
    pub fn set_utme<'a>(&mut self, input: impl Into<UtmeInput<'a>>) -> Result<()> {
        self.utme = Utme::parse(input)?;
        Ok(())
    }

    pub fn utme(&self) -> &Utme {
        &self.utme
    }

    pub fn set_custom_variable(&mut self, slot: usize, variable: CustomVariable) -> Result<&mut Self> {
        self.utme.set_custom_variable(slot, variable)?;
        Ok(self)
    }

    pub fn unset_custom_variable(&mut self, slot: usize) -> Result<&mut Self> {
        self.utme.unset_custom_variable(slot)?;
        Ok(self)
    }

    /// Build the beacon URL for the current state
    pub fn tracking_url(&self) -> anyhow::Result<String> {
        let mut params = self.params.clone();
        params.insert(UTME_KEY.to_string(), self.utme.serialize());
        Ok(format!("{}?{}", self.location, to_query(&params)?))
    }

    /// Set the event and track
    pub fn track_event(&mut self, event: Event) -> anyhow::Result<BeaconRequest> {
        self.utme.set_event(event);
        self.track()
    }

    /// Optionally set the page path and track
    pub fn track_page_view(&mut self, path: Option<&str>) -> anyhow::Result<BeaconRequest> {
        if let Some(path) = path {
            self.params.insert("utmp".to_string(), path.to_string());
        }
        self.track()
    }

    /// Build the request for the current state, then reset the codec so the
    /// event and custom variables are not reused by later requests
    pub fn track(&mut self) -> anyhow::Result<BeaconRequest> {
        let request = BeaconRequest {
            url: self.tracking_url()?,
            headers: vec![
                ("User-Agent", format!("utme-cli/{}", env!("CARGO_PKG_VERSION"))),
                (
                    "Accept-Language",
                    self.get("utmul").unwrap_or("de").to_string(),
                ),
            ],
            issued_at: Utc::now(),
        };
        log::info!("Built beacon request: {}", request.url);

        self.utme = Utme::new();
        self.params.insert("utmn".to_string(), random_id());
        Ok(request)
    }
}
