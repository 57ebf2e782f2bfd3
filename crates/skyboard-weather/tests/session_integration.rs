//! Integration tests for WeatherSession using wiremock.

#![allow(clippy::panic)]

use skyboard_weather::prefs::{self, LOCATION_STORAGE_KEY};
use skyboard_weather::{
    Coordinates, LocationPreference, MemoryStore, PreferenceStore, ProviderSettings,
    SessionState, StaticLocator, TemperatureUnit, WeatherCache, WeatherError, WeatherProvider,
    WeatherSession,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}],
        "main": {"temp": 9.0, "feels_like": 7.5, "temp_min": 8.0, "temp_max": 10.0,
                 "humidity": 81, "pressure": 1009},
        "wind": {"speed": 5.2, "deg": 300},
        "name": name,
        "sys": {"country": "US"}
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "list": [{
            "dt": 1_700_000_000,
            "main": {"temp": 9.0, "feels_like": 7.0, "temp_min": 8.0, "temp_max": 10.0, "humidity": 80},
            "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}]
        }],
        "city": {"name": "Portland", "country": "US", "timezone": -28800}
    })
}

/// Mount weather endpoints answering with `name` for the given latitude.
async fn mount_weather_at(server: &MockServer, lat: &str, name: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", lat))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body(name))
                .set_delay(delay),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", lat))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

async fn mount_zip(server: &MockServer, zip: &str, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", format!("{},US", zip)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "zip": zip, "lat": lat, "lon": lon, "country": "US"
        })))
        .mount(server)
        .await;
}

fn session(server: &MockServer, store: Arc<MemoryStore>) -> WeatherSession {
    let settings = ProviderSettings {
        api_base_url: format!("{}/data/2.5", server.uri()),
        onecall_url: format!("{}/data/3.0/onecall", server.uri()),
        geo_url: format!("{}/geo/1.0", server.uri()),
        api_key: "test-key".into(),
    };
    let provider = WeatherProvider::new(
        settings,
        Arc::new(WeatherCache::default()),
        Arc::new(StaticLocator::new(Coordinates::new(45.5152, -122.6784))),
    )
    .unwrap();

    WeatherSession::new(provider, store, TemperatureUnit::Fahrenheit, "US")
}

fn place_name(state: &SessionState) -> &str {
    match state {
        SessionState::Ready { weather, .. } => &weather.current.place_name,
        other => panic!("expected Ready, got {:?}", other),
    }
}

#[tokio::test]
async fn test_initialize_uses_device_location_without_saved_preference() {
    let server = MockServer::start().await;
    mount_weather_at(&server, "45.5152", "Portland", Duration::ZERO).await;

    let mut session = session(&server, Arc::new(MemoryStore::new()));
    session.initialize();
    assert_eq!(session.state(), &SessionState::Loading);

    let state = session.settle().await;
    assert_eq!(place_name(state), "Portland");
    // Onecall is not mounted; the daily forecast is simply missing
    match state {
        SessionState::Ready { weather, unit } => {
            assert!(weather.daily.is_none());
            assert_eq!(*unit, TemperatureUnit::Fahrenheit);
        }
        other => panic!("expected Ready, got {:?}", other),
    }
}

#[tokio::test]
async fn test_initialize_prefers_saved_location() {
    let server = MockServer::start().await;
    mount_zip(&server, "10001", 40.7506, -73.9972).await;
    mount_weather_at(&server, "40.7506", "New York", Duration::ZERO).await;

    let store = Arc::new(MemoryStore::new());
    prefs::save_location(
        store.as_ref(),
        &LocationPreference {
            zip_code: "10001".into(),
            name: "New York".into(),
        },
    )
    .unwrap();

    let mut session = session(&server, store);
    session.initialize();
    let state = session.settle().await;

    assert_eq!(place_name(state), "New York");
    let geocodes = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/geo/1.0/zip")
        .count();
    assert_eq!(geocodes, 1);
}

#[tokio::test]
async fn test_search_persists_location_preference() {
    let server = MockServer::start().await;
    mount_zip(&server, "94103", 37.7725, -122.4091).await;
    mount_weather_at(&server, "37.7725", "San Francisco", Duration::ZERO).await;

    let store = Arc::new(MemoryStore::new());
    let mut session = session(&server, store.clone());

    assert!(session.search_location("  94103 "));
    session.settle().await;

    let raw = store.get(LOCATION_STORAGE_KEY).unwrap().unwrap();
    assert_eq!(raw, r#"{"zipCode":"94103","name":"San Francisco"}"#);
    assert_eq!(
        session.location_preference(),
        Some(LocationPreference {
            zip_code: "94103".into(),
            name: "San Francisco".into(),
        })
    );
}

#[tokio::test]
async fn test_failed_search_keeps_previous_preference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let previous = LocationPreference {
        zip_code: "60601".into(),
        name: "Chicago".into(),
    };
    prefs::save_location(store.as_ref(), &previous).unwrap();

    let mut session = session(&server, store);
    session.search_location("00000");
    let state = session.settle().await;

    assert_eq!(
        state,
        &SessionState::Errored(WeatherError::LocationNotFound("Location not found".into()))
    );
    assert_eq!(session.location_preference(), Some(previous));
}

#[tokio::test]
async fn test_refresh_after_failed_search_uses_device_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", "00000,US"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_weather_at(&server, "45.5152", "Portland", Duration::ZERO).await;

    let store = Arc::new(MemoryStore::new());
    let mut session = session(&server, store.clone());

    session.search_location("00000");
    assert!(matches!(
        session.settle().await,
        SessionState::Errored(WeatherError::LocationNotFound(_))
    ));

    session.refresh();
    let state = session.settle().await;

    assert_eq!(place_name(state), "Portland");
    assert_eq!(session.location_preference(), None);
    assert_eq!(store.get(LOCATION_STORAGE_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_toggle_unit_does_not_refetch() {
    let server = MockServer::start().await;
    mount_weather_at(&server, "45.5152", "Portland", Duration::ZERO).await;

    let store = Arc::new(MemoryStore::new());
    let mut session = session(&server, store.clone());
    session.initialize();
    session.settle().await;
    let requests = server.received_requests().await.unwrap().len();

    assert_eq!(session.toggle_unit(), TemperatureUnit::Celsius);
    assert!(matches!(
        session.state(),
        SessionState::Ready { unit: TemperatureUnit::Celsius, .. }
    ));
    assert_eq!(prefs::load_unit(store.as_ref()), Some(TemperatureUnit::Celsius));
    assert_eq!(server.received_requests().await.unwrap().len(), requests);
}

#[tokio::test]
async fn test_refresh_within_ttl_hits_cache() {
    let server = MockServer::start().await;
    mount_weather_at(&server, "45.5152", "Portland", Duration::ZERO).await;

    let mut session = session(&server, Arc::new(MemoryStore::new()));
    session.initialize();
    session.settle().await;
    let requests = server.received_requests().await.unwrap().len();

    session.refresh();
    assert!(session.state().is_loading());
    let state = session.settle().await;

    assert_eq!(place_name(state), "Portland");
    assert_eq!(server.received_requests().await.unwrap().len(), requests);
}

#[tokio::test]
async fn test_newer_search_supersedes_older_one() {
    let server = MockServer::start().await;
    mount_zip(&server, "97201", 45.5, -122.7).await;
    mount_zip(&server, "98101", 47.6, -122.3).await;
    mount_weather_at(&server, "45.5", "Slow Town", Duration::from_millis(500)).await;
    mount_weather_at(&server, "47.6", "Seattle", Duration::ZERO).await;

    let store = Arc::new(MemoryStore::new());
    let mut session = session(&server, store.clone());

    session.search_location("97201");
    session.search_location("98101");
    let state = session.settle().await;
    assert_eq!(place_name(state), "Seattle");

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(!session.poll());
    assert_eq!(place_name(session.state()), "Seattle");
    assert_eq!(session.location_preference().unwrap().zip_code, "98101");
}

#[tokio::test]
async fn test_device_permission_denied_surfaces_as_error() {
    struct Denied;

    #[async_trait::async_trait]
    impl skyboard_weather::DeviceLocator for Denied {
        async fn current_location(&self) -> Result<Coordinates, WeatherError> {
            Err(WeatherError::PermissionDenied("User denied location access".into()))
        }
    }

    let server = MockServer::start().await;
    let settings = ProviderSettings {
        api_base_url: format!("{}/data/2.5", server.uri()),
        onecall_url: format!("{}/data/3.0/onecall", server.uri()),
        geo_url: format!("{}/geo/1.0", server.uri()),
        api_key: "test-key".into(),
    };
    let provider =
        WeatherProvider::new(settings, Arc::new(WeatherCache::default()), Arc::new(Denied))
            .unwrap();
    let mut session = WeatherSession::new(
        provider,
        Arc::new(MemoryStore::new()),
        TemperatureUnit::Celsius,
        "US",
    );

    session.initialize();
    let state = session.settle().await;

    assert_eq!(
        state,
        &SessionState::Errored(WeatherError::PermissionDenied(
            "User denied location access".into()
        ))
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}
