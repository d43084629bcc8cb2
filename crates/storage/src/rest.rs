//! REST document store.
//!
//! Speaks JSON to a backend exposing the document collections under
//! `api/{collection}`. Query values are passed as a single equality
//! parameter; the backend returns documents with their `id` embedded.
//! The transport sits behind [`HttpClient`] so request construction can
//! be exercised with a scripted client.

use liftlog_domain::StorageError;
use serde_json::Value;

use crate::{Collection, Document, DocumentStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl HttpRequest {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            body: None,
        }
    }

    fn with_body(method: Method, path: String, body: Value) -> Self {
        Self {
            method,
            path,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StorageError>;
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unexpected status code: {0}")]
pub struct StatusCodeError(pub u16);

pub struct Rest<C> {
    client: C,
}

impl Rest<ReqwestClient> {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: ReqwestClient::new(base_url),
        }
    }
}

impl<C> Rest<C> {
    pub const fn with_client(client: C) -> Self {
        Self { client }
    }
}

impl<C: HttpClient> DocumentStore for Rest<C> {
    async fn get_by_id(
        &self,
        collection: &Collection,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        let response = self
            .client
            .send(HttpRequest::new(
                Method::Get,
                format!("api/{}/{id}", collection.path()),
            ))
            .await?;
        match response.status {
            200 => {
                let mut document = object(response.body)?;
                document.remove("id");
                Ok(Some(document))
            }
            404 => Ok(None),
            status => Err(unexpected_status(status)),
        }
    }

    async fn query_equals(
        &self,
        collection: &Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Document)>, StorageError> {
        let response = self
            .client
            .send(HttpRequest::new(
                Method::Get,
                format!("api/{}?{field}={}", collection.path(), query_value(value)),
            ))
            .await?;
        if response.status != 200 {
            return Err(unexpected_status(response.status));
        }
        let Value::Array(items) = response.body else {
            return Err(StorageError::InvalidDocument(String::from(
                "expected an array",
            )));
        };
        items
            .into_iter()
            .map(|item| split_id(object(item)?))
            .collect()
    }

    async fn create(
        &self,
        collection: &Collection,
        data: Document,
    ) -> Result<String, StorageError> {
        let response = self
            .client
            .send(HttpRequest::with_body(
                Method::Post,
                format!("api/{}", collection.path()),
                Value::Object(data),
            ))
            .await?;
        if !matches!(response.status, 200 | 201) {
            return Err(unexpected_status(response.status));
        }
        match response.body.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            _ => Err(StorageError::InvalidDocument(String::from(
                "missing id in response",
            ))),
        }
    }

    async fn set_merge(
        &self,
        collection: &Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .send(HttpRequest::with_body(
                Method::Put,
                format!("api/{}/{id}", collection.path()),
                Value::Object(data),
            ))
            .await?;
        match response.status {
            200 | 201 | 204 => Ok(()),
            status => Err(unexpected_status(status)),
        }
    }

    async fn update_merge(
        &self,
        collection: &Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .send(HttpRequest::with_body(
                Method::Patch,
                format!("api/{}/{id}", collection.path()),
                Value::Object(data),
            ))
            .await?;
        match response.status {
            200 | 204 => Ok(()),
            404 => Err(StorageError::NotFound),
            status => Err(unexpected_status(status)),
        }
    }

    async fn delete(&self, collection: &Collection, id: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .send(HttpRequest::new(
                Method::Delete,
                format!("api/{}/{id}", collection.path()),
            ))
            .await?;
        match response.status {
            200 | 204 => Ok(()),
            status => Err(unexpected_status(status)),
        }
    }
}

fn object(value: Value) -> Result<Document, StorageError> {
    match value {
        Value::Object(document) => Ok(document),
        _ => Err(StorageError::InvalidDocument(String::from(
            "expected an object",
        ))),
    }
}

fn split_id(mut document: Document) -> Result<(String, Document), StorageError> {
    match document.remove("id") {
        Some(Value::String(id)) => Ok((id, document)),
        _ => Err(StorageError::InvalidDocument(String::from("missing id"))),
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        value => value.to_string(),
    }
}

fn unexpected_status(status: u16) -> StorageError {
    StorageError::Other(Box::new(StatusCodeError(status)))
}

pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StorageError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, request.path));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                StorageError::NoConnection
            } else {
                StorageError::Other(Box::new(err))
            }
        })?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use liftlog_domain::UserID;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct ScriptedClient {
        requests: RefCell<Vec<HttpRequest>>,
        responses: RefCell<VecDeque<Result<HttpResponse, StorageError>>>,
    }

    impl ScriptedClient {
        fn respond(status: u16, body: Value) -> Self {
            let client = Self::default();
            client
                .responses
                .borrow_mut()
                .push_back(Ok(HttpResponse { status, body }));
            client
        }

        fn fail(error: StorageError) -> Self {
            let client = Self::default();
            client.responses.borrow_mut().push_back(Err(error));
            client
        }
    }

    impl HttpClient for ScriptedClient {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StorageError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected request")
        }
    }

    fn templates() -> Collection {
        Collection::ExerciseTemplates(UserID::from("alice"))
    }

    #[tokio::test]
    async fn test_get_by_id_request_and_response() {
        let rest = Rest::with_client(ScriptedClient::respond(
            200,
            json!({"id": "t1", "name": "Bench Press"}),
        ));
        let document = rest.get_by_id(&templates(), "t1").await.unwrap().unwrap();
        assert_eq!(document.get("name"), Some(&json!("Bench Press")));
        assert_eq!(document.get("id"), None);
        assert_eq!(
            rest.client.requests.borrow()[0],
            HttpRequest {
                method: Method::Get,
                path: String::from("api/users/alice/exerciseTemplates/t1"),
                body: None,
            }
        );
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let rest = Rest::with_client(ScriptedClient::respond(404, Value::Null));
        assert_eq!(rest.get_by_id(&templates(), "t1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_query_equals_request_and_split_ids() {
        let rest = Rest::with_client(ScriptedClient::respond(
            200,
            json!([{"id": "t1", "name": "Bench Press"}]),
        ));
        let documents = rest
            .query_equals(&templates(), "standardizedName", &json!("bench press"))
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].0, "t1");
        assert_eq!(documents[0].1.get("id"), None);
        assert_eq!(
            rest.client.requests.borrow()[0].path,
            "api/users/alice/exerciseTemplates?standardizedName=bench press"
        );
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id() {
        let rest = Rest::with_client(ScriptedClient::respond(201, json!({"id": "t9"})));
        let id = rest
            .create(&templates(), Document::new())
            .await
            .unwrap();
        assert_eq!(id, "t9");
        assert_eq!(rest.client.requests.borrow()[0].method, Method::Post);
        assert_eq!(
            rest.client.requests.borrow()[0].body,
            Some(json!({}))
        );
    }

    #[tokio::test]
    async fn test_set_merge_uses_put() {
        let rest = Rest::with_client(ScriptedClient::respond(204, Value::Null));
        rest.set_merge(
            &Collection::Sessions,
            "alice_p1_w1_2",
            match json!({"week": 2}) {
                Value::Object(document) => document,
                _ => unreachable!(),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            rest.client.requests.borrow()[0],
            HttpRequest {
                method: Method::Put,
                path: String::from("api/sessions/alice_p1_w1_2"),
                body: Some(json!({"week": 2})),
            }
        );
    }

    #[tokio::test]
    async fn test_update_merge_maps_missing_document() {
        let rest = Rest::with_client(ScriptedClient::respond(404, Value::Null));
        assert!(matches!(
            rest.update_merge(&Collection::Programs, "p1", Document::new())
                .await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(rest.client.requests.borrow()[0].method, Method::Patch);
    }

    #[tokio::test]
    async fn test_delete_request() {
        let rest = Rest::with_client(ScriptedClient::respond(204, Value::Null));
        rest.delete(&Collection::Programs, "p1").await.unwrap();
        assert_eq!(
            rest.client.requests.borrow()[0].path,
            "api/programs/p1"
        );
    }

    #[tokio::test]
    async fn test_unexpected_status_is_an_error() {
        let rest = Rest::with_client(ScriptedClient::respond(500, Value::Null));
        let result = rest.get_by_id(&Collection::Sessions, "s1").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "unexpected status code: 500"
        );
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let rest = Rest::with_client(ScriptedClient::fail(StorageError::NoConnection));
        assert!(matches!(
            rest.get_by_id(&Collection::Sessions, "s1").await,
            Err(StorageError::NoConnection)
        ));
    }
}
