//! Tracking API specifics
//!
//! The tracking server has a single route returning the last known location of the tracked
//! person.  The token is sent as-is in the `Authorization` header.
//!
//! Two payload shapes are accepted:
//!
//! - the full one: `{ "tracking": { "lat", "lng" }, "location": { "name", "typeId" } | null }`
//! - the reduced one: `{ "lat", "lng" }`
//!
//! A 401 is the only answer that stops the daemon, everything else is retried at the next poll.
//!
//! This implement the `SampleSource` trait described in `lib`.
//!

use std::time::{Duration, Instant};

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info, trace};

use proximity_common::Coordinate;

use crate::{http_get, http_get_auth};
use crate::{Auth, FetchError, LocationSample, PlaceKind, PlaceMetadata, SampleSource};

/// Default request timeout
pub const DEF_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracker represent what is needed to connect & auth to and fetch data from the tracking API.
///
#[derive(Clone, Debug)]
pub struct Tracker {
    /// Full URL of the "last location" route
    pub url: String,
    /// Resolved token, if any
    token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// reqwest blocking client
    pub client: Client,
}

impl Tracker {
    /// Build the client, resolving the token now so that a missing variable is caught
    /// at startup and not at the first poll.
    ///
    #[tracing::instrument(skip(auth))]
    pub fn new(url: &str, auth: &Auth, timeout: Duration) -> Result<Self, FetchError> {
        trace!("tracker::new({auth})");

        let token = auth.token()?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Tracker {
            url: url.to_owned(),
            token,
            timeout,
            client,
        })
    }
}

/// Position as sent by the API
///
#[derive(Debug, Deserialize)]
struct Point {
    lat: f64,
    lng: f64,
}

/// Named place as sent by the API
///
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    name: String,
    type_id: PlaceKind,
}

/// JSON payload from the tracking route
///
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Full {
        tracking: Point,
        #[serde(default)]
        location: Option<Place>,
    },
    Reduced(Point),
}

impl From<Payload> for LocationSample {
    fn from(value: Payload) -> Self {
        match value {
            Payload::Full { tracking, location } => LocationSample::new(
                Coordinate::new(tracking.lat, tracking.lng),
                location.map(|p| PlaceMetadata {
                    name: p.name,
                    kind: p.type_id,
                }),
            ),
            Payload::Reduced(p) => LocationSample::new(Coordinate::new(p.lat, p.lng), None),
        }
    }
}

impl SampleSource for Tracker {
    fn name(&self) -> String {
        "tracker".to_string()
    }

    /// Single call API
    ///
    #[tracing::instrument(skip(self))]
    fn fetch_once(&self) -> Result<LocationSample, FetchError> {
        trace!("Fetching data from {}…", self.url);

        let start = Instant::now();
        let resp = match &self.token {
            Some(token) => http_get_auth!(self, &self.url, token),
            None => http_get!(self, &self.url),
        };
        let resp = resp?;
        info!("http response took {}s", start.elapsed().as_secs_f64());

        debug!("{:?}", &resp);

        // Check status
        //
        match resp.status() {
            StatusCode::UNAUTHORIZED => {
                error!("client not authorized");
                return Err(FetchError::Unauthorized);
            }
            code if !code.is_success() => {
                error!("Error({}): {:?}", code, resp.headers());
                return Err(FetchError::Status(code.as_u16()));
            }
            _ => trace!("OK"),
        }

        let body = resp.text()?;
        let payload: Payload = serde_json::from_str(&body)?;
        Ok(payload.into())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    const ROUTE: &str = "/tracking/lastLocation";

    /// Log sink shared with the test
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    /// Run `f` with the logs going to a fresh `Capture`
    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let res = tracing::subscriber::with_default(subscriber, f);
        (res, capture.contents())
    }

    fn setup_tracker(server: &MockServer, timeout: Duration) -> Tracker {
        let auth = Auth::Key {
            api_key: "FOOBAR".to_string(),
        };
        Tracker::new(&server.url(ROUTE), &auth, timeout).unwrap()
    }

    #[test_pretty_log::test]
    fn test_tracker_full_payload() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path(ROUTE)
                .header("authorization", "FOOBAR")
                .header(
                    "user-agent",
                    format!("{}/{}", crate_name!(), crate_version!()),
                );
            then.status(200).json_body(json!({
                "tracking": { "lat": 45.815, "lng": 15.982 },
                "location": { "name": "Office", "typeId": "work" }
            }));
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let s = site.fetch_once();
        m.assert();

        let s = s.unwrap();
        assert_eq!(Coordinate::new(45.815, 15.982), s.position);
        assert_eq!(Some(PlaceMetadata::new("Office", PlaceKind::Work)), s.place);
    }

    #[test]
    fn test_tracker_null_location() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(200).json_body(json!({
                "tracking": { "lat": 44.5, "lng": 15.5 },
                "location": null
            }));
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let s = site.fetch_once().unwrap();
        m.assert();
        assert_eq!(Coordinate::new(44.5, 15.5), s.position);
        assert!(s.place.is_none());
    }

    #[test]
    fn test_tracker_reduced_payload() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(200).json_body(json!({ "lat": 44.5, "lng": 15.5 }));
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let s = site.fetch_once().unwrap();
        m.assert();
        assert_eq!(Coordinate::new(44.5, 15.5), s.position);
        assert!(s.place.is_none());
    }

    #[test]
    fn test_tracker_home_kind() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(200).json_body(json!({
                "tracking": { "lat": 44.117965, "lng": 15.234143 },
                "location": { "name": "Home", "typeId": "home" }
            }));
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let s = site.fetch_once().unwrap();
        assert_eq!(PlaceKind::Home, s.place.unwrap().kind);
    }

    #[test]
    fn test_tracker_unauthorized() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(401);
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let s = site.fetch_once();
        m.assert();

        let err = s.unwrap_err();
        assert!(matches!(err, FetchError::Unauthorized));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_tracker_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(502);
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let err = site.fetch_once().unwrap_err();
        assert!(matches!(err, FetchError::Status(502)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_tracker_garbage() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(200).body("<html>maintenance</html>");
        });

        let site = setup_tracker(&server, DEF_TIMEOUT);
        let err = site.fetch_once().unwrap_err();
        assert!(matches!(err, FetchError::Decoding(_)));
    }

    #[test]
    fn test_tracker_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "lat": 44.5, "lng": 15.5 }));
        });

        let site = setup_tracker(&server, Duration::from_millis(200));
        let err = site.fetch_once().unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_tracker_response_time_logged_on_answer_only() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(ROUTE);
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "lat": 44.5, "lng": 15.5 }));
        });

        let slow = setup_tracker(&server, Duration::from_millis(200));
        let (res, logs) = with_captured_logs(|| slow.fetch_once());
        assert!(res.is_err());
        assert!(!logs.contains("http response took"));

        let patient = setup_tracker(&server, Duration::from_secs(5));
        let (res, logs) = with_captured_logs(|| patient.fetch_once());
        assert!(res.is_ok());
        assert!(logs.contains("http response took"));
    }

    #[test]
    fn test_tracker_anon_sends_no_authorization() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path(ROUTE).header_exists("authorization");
            then.status(200).json_body(json!({ "lat": 1.0, "lng": 2.0 }));
        });

        let site = Tracker::new(&server.url(ROUTE), &Auth::Anon, DEF_TIMEOUT).unwrap();
        let err = site.fetch_once().unwrap_err();
        assert_eq!(0, m.hits());
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[test]
    fn test_tracker_missing_token_env() {
        let auth = Auth::Env {
            token_env: "PROXIMITY_TEST_TRACKER_NOT_SET".to_string(),
        };

        let t = Tracker::new("http://localhost/", &auth, DEF_TIMEOUT);
        assert!(matches!(t, Err(FetchError::Auth(_))));
    }
}
