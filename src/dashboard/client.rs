use std::time::Duration;

use reqwest::header::COOKIE;
use serde::Serialize;
use url::Url;

use crate::dashboard::view::ViewState;

/// Calls gateway routes the way a dashboard page does.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    cookie: Option<String>,
}

/// The mail page: labels and threads fetched side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub labels: ViewState,
    pub threads: ViewState,
}

impl DashboardClient {
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self {
            http,
            base_url,
            cookie: None,
        })
    }

    /// Send `cookie_name=token` with every call.
    pub fn with_session(mut self, cookie_name: &str, token: &str) -> Self {
        self.cookie = Some(format!("{}={}", cookie_name, token));
        self
    }

    /// GET a gateway path such as `/api/mail/labels?x=1`.
    pub async fn fetch(&self, path_and_query: &str) -> ViewState {
        let url = match self.base_url.join(path_and_query) {
            Ok(url) => url,
            Err(e) => return ViewState::Error(format!("Invalid path '{}': {}", path_and_query, e)),
        };

        let mut request = self.http.get(url);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return ViewState::from_transport_error(&e),
        };
        let status = response.status();
        match response.bytes().await {
            Ok(body) => ViewState::from_response(status, &body),
            Err(e) => ViewState::from_transport_error(&e),
        }
    }

    pub async fn overview(&self) -> Overview {
        let (labels, threads) = tokio::join!(
            self.fetch("/api/mail/labels"),
            self.fetch("/api/mail/threads")
        );
        Overview { labels, threads }
    }
}
