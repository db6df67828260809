use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use crate::error::Error;
use crate::models::BookingRequest;

pub const RESERVATION_ENDPOINT: &str =
    "https://api.nibol.co/v2/app/business/reservation/desk/create";

#[derive(Clone)]
pub struct DeskClient {
    client: Client,
    endpoint: String,
}

impl DeskClient {
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // a token with bytes invalid in a header is sent without auth and
        // rejected remotely, like an empty one
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(AUTHORIZATION, val);
        }
        headers
    }

    /// Reserve the desk described by `request`. Any 2xx is a success; other
    /// statuses come back as `RemoteRejection` with the raw body.
    pub async fn book(&self, request: &BookingRequest, token: &str) -> Result<(), Error> {
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(Self::headers(token))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!("Booking response (status {}): {}", status, text);

        if !status.is_success() {
            return Err(Error::RemoteRejection {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> BookingRequest {
        BookingRequest {
            day: "20210210".into(),
            weekday: 3,
            from: 900,
            to: 1800,
            desk_id: "desk-1".into(),
            space_id: "space-9".into(),
        }
    }

    fn client_for(server: &MockServer) -> DeskClient {
        DeskClient::new(&format!("{}/reservation/desk/create", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_book_success_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reservation/desk/create"))
            .and(header("Authorization", "Bearer tok"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "day": "20210210",
                "from": 900,
                "to": 1800,
                "desk_id": "desk-1",
                "space_id": "space-9",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.book(&request(), "tok").await.unwrap();
    }

    #[tokio::test]
    async fn test_book_any_2xx_is_success() {
        for status in [200u16, 204, 299] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let client = client_for(&server);
            assert!(client.book(&request(), "tok").await.is_ok(), "status {status}");
        }
    }

    #[tokio::test]
    async fn test_book_rejection_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"unauthorized"}"#))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.book(&request(), "").await.unwrap_err();
        match err {
            Error::RemoteRejection { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, r#"{"error":"unauthorized"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_book_redirect_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.book(&request(), "tok").await.unwrap_err();
        assert!(matches!(err, Error::RemoteRejection { status: 304, .. }));
    }

    #[tokio::test]
    async fn test_book_connection_refused_is_network_error() {
        // grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let endpoint = format!("http://127.0.0.1:{port}/reservation/desk/create");

        let client = DeskClient::new(&endpoint).unwrap();
        let err = client.book(&request(), "tok").await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {err:?}");
    }
}
