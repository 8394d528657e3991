use hk_carpark::{
    Config,
    api::{Client, Dataset, Error, FetchError, Lang, Query, VehicleType},
    config::RetryPolicy,
};
use serde_json::json;
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_PATH: &str = "/v1/carpark-info-vacancy";

fn config(server: &MockServer) -> Config {
    Config {
        base_url: format!("{}{API_PATH}", server.uri()),
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        },
        ..Default::default()
    }
}

fn requests(rt: &Runtime, server: &MockServer) -> Vec<wiremock::Request> {
    rt.block_on(server.received_requests()).unwrap_or_default()
}

#[test]
fn fetch_returns_results() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("data", "info"))
            .and(query_param("vehicleTypes", "privateCar"))
            .and(query_param("lang", "zh_TW"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "park_Id": "10", "name": "A" }, { "park_Id": "11" }]
            })))
            .mount(&server),
    );

    let client = Client::new(&config(&server)).unwrap();
    let query = Query::new(Dataset::Info, VehicleType::PrivateCar, Lang::ZhTw);
    let results = client.fetch(&query).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["name"], "A");
}

#[test]
fn optional_parameters_are_omitted() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server),
    );

    let client = Client::new(&config(&server)).unwrap();
    let results = client
        .fetch_str("vacancy", "LGV", "en_US", None, None)
        .unwrap();
    assert!(results.is_empty());

    let requests = requests(&rt, &server);
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("data=vacancy&vehicleTypes=LGV&lang=en_US")
    );
}

#[test]
fn optional_parameters_are_sent() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(query_param("carparkIds", "10,11"))
            .and(query_param("extent", "114.1,22.2,114.3,22.4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [{}] })))
            .mount(&server),
    );

    let client = Client::new(&config(&server)).unwrap();
    let ids = vec!["10".to_string(), "11".to_string()];
    let results = client
        .fetch_str(
            "info",
            "privateCar",
            "zh_CN",
            Some(ids.as_slice()),
            Some("114.1,22.2,114.3,22.4"),
        )
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn invalid_arguments_never_hit_the_network() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    let client = Client::new(&config(&server)).unwrap();

    let err = client
        .fetch_str("parking", "privateCar", "zh_TW", None, None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref arg) if arg.name == "data"));

    let err = client
        .fetch_str("info", "bicycle", "zh_TW", None, None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref arg) if arg.name == "vehicleTypes"));

    let err = client
        .fetch_str("info", "privateCar", "fr_FR", None, None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref arg) if arg.name == "lang"));

    assert!(requests(&rt, &server).is_empty());
}

#[test]
fn server_errors_are_retried() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server),
    );

    let client = Client::new(&config(&server)).unwrap();
    let query = Query::new(Dataset::Info, VehicleType::Coach, Lang::EnUs);
    let err = client.fetch(&query).unwrap_err();
    assert!(matches!(
        err,
        Error::Fetch(FetchError::Status { status: 503, .. })
    ));
    assert_eq!(requests(&rt, &server).len(), 3);
}

#[test]
fn retry_recovers_after_transient_error() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [{}] })))
            .mount(&server)
            .await;
    });

    let client = Client::new(&config(&server)).unwrap();
    let query = Query::new(Dataset::Vacancy, VehicleType::PrivateCar, Lang::ZhTw);
    assert_eq!(client.fetch(&query).unwrap().len(), 1);
    assert_eq!(requests(&rt, &server).len(), 2);
}

#[test]
fn client_errors_are_not_retried() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server),
    );

    let client = Client::new(&config(&server)).unwrap();
    let query = Query::new(Dataset::Info, VehicleType::PrivateCar, Lang::ZhTw);
    let err = client.fetch(&query).unwrap_err();
    assert!(matches!(
        err,
        Error::Fetch(FetchError::Status { status: 404, .. })
    ));
    assert_eq!(requests(&rt, &server).len(), 1);
}

#[test]
fn body_without_results_is_a_fetch_error() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server),
    );

    let client = Client::new(&config(&server)).unwrap();
    let query = Query::new(Dataset::Info, VehicleType::PrivateCar, Lang::ZhTw);
    let err = client.fetch(&query).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Body { .. })));
    assert_eq!(requests(&rt, &server).len(), 1);
}

#[test]
fn timeout_is_a_fetch_error() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "results": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server),
    );

    let config = Config {
        timeout: Duration::from_millis(50),
        retry: RetryPolicy::none(),
        ..config(&server)
    };
    let client = Client::new(&config).unwrap();
    let query = Query::new(Dataset::Info, VehicleType::PrivateCar, Lang::ZhTw);
    let err = client.fetch(&query).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Timeout { .. })));
}
