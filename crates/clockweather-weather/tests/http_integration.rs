//! Integration tests for the fetcher, forecast provider and geocoder using wiremock.

use std::time::Duration;

use clockweather_weather::fetch::USER_AGENT;
use clockweather_weather::{
    Coordinates, FetchError, Geocoder, HttpSession, WeatherError, WeatherIcon, WeatherProvider,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body(temperature: f64, weathercode: i64) -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.0,
        "longitude": 13.0,
        "current_weather": {
            "temperature": temperature,
            "windspeed": 9.7,
            "winddirection": 240,
            "weathercode": weathercode,
            "time": "2026-10-18T12:00"
        }
    })
}

#[tokio::test]
async fn test_fetch_json_success_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = HttpSession::new().unwrap();
    let value: serde_json::Value = session
        .get_json(&format!("{}/data", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(value["ok"], true);
}

#[tokio::test]
async fn test_fetch_json_non_200_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let session = HttpSession::new().unwrap();
    let result: Result<serde_json::Value, _> = session.get_json(&mock_server.uri()).await;

    assert!(matches!(result, Err(FetchError::Status(503))), "{result:?}");
}

#[tokio::test]
async fn test_fetch_json_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let session = HttpSession::new().unwrap();
    let result: Result<serde_json::Value, _> = session.get_json(&mock_server.uri()).await;

    assert!(matches!(result, Err(FetchError::EmptyBody)), "{result:?}");
}

#[tokio::test]
async fn test_fetch_json_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let session = HttpSession::new().unwrap();
    let result: Result<serde_json::Value, _> = session.get_json(&mock_server.uri()).await;

    assert!(matches!(result, Err(FetchError::Parse(_))), "{result:?}");
}

#[tokio::test]
async fn test_fetch_json_transport_failure() {
    // Bind and drop a server so the port refuses connections
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let session = HttpSession::new().unwrap();
    let result: Result<serde_json::Value, _> = session.get_json(&uri).await;

    assert!(matches!(result, Err(FetchError::Transport(_))), "{result:?}");
}

#[tokio::test]
async fn test_abort_cancels_in_flight_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let session = std::sync::Arc::new(HttpSession::new().unwrap());
    let request = {
        let session = session.clone();
        let url = mock_server.uri();
        tokio::spawn(async move { session.get_json::<serde_json::Value>(&url).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    session.abort();

    let result = tokio::time::timeout(Duration::from_secs(2), request)
        .await
        .expect("abort should settle the request promptly")
        .unwrap();
    assert!(matches!(result, Err(FetchError::Aborted)), "{result:?}");
}

#[tokio::test]
async fn test_provider_maps_current_weather() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52"))
        .and(query_param("longitude", "13"))
        .and(query_param("current_weather", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(21.4, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(format!("{}/v1/forecast", mock_server.uri()));
    let session = HttpSession::new().unwrap();
    let observation = provider
        .current(&session, Coordinates::new(52.0, 13.0))
        .await
        .unwrap();

    assert_eq!(observation.text, "21°C");
    assert_eq!(observation.icon, WeatherIcon::PartlyCloudy);
}

#[tokio::test]
async fn test_provider_rejects_missing_current_weather() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"latitude": 52.0})))
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(mock_server.uri());
    let session = HttpSession::new().unwrap();
    let result = provider.current(&session, Coordinates::new(52.0, 13.0)).await;

    assert!(matches!(result, Err(WeatherError::MissingField("current_weather"))));
}

#[tokio::test]
async fn test_geocoder_returns_first_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Osnabrück"))
        .and(query_param("count", "1"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "name": "Osnabrück",
                "admin1": "Lower Saxony",
                "country": "Germany",
                "latitude": 52.27264,
                "longitude": 8.0498
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let geocoder = Geocoder::with_base_url(format!("{}/v1/search", mock_server.uri()));
    let session = HttpSession::new().unwrap();
    let place = geocoder.search(&session, "Osnabrück").await.unwrap().unwrap();

    assert_eq!(place.label, "Osnabrück, Lower Saxony, Germany");
    assert_eq!(place.coordinates, Coordinates::new(52.27264, 8.0498));
}

#[tokio::test]
async fn test_geocoder_empty_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&mock_server)
        .await;

    let geocoder = Geocoder::with_base_url(mock_server.uri());
    let session = HttpSession::new().unwrap();

    assert_eq!(geocoder.search(&session, "Nowhere").await.unwrap(), None);
}

#[tokio::test]
async fn test_geocoder_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let geocoder = Geocoder::with_base_url(mock_server.uri());
    let session = HttpSession::new().unwrap();
    let err = geocoder.search(&session, "Berlin").await.unwrap_err();

    assert!(matches!(err, WeatherError::Fetch(FetchError::Status(500))));
    assert!(!err.is_aborted());
}
