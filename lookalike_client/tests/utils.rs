#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{StatusCode, Uri, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

/// What the mock backend saw in one multipart upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Upload {
    pub path: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub garment_type: String,
    pub garment_layer: String,
}

#[derive(Clone)]
struct MockState {
    response: Arc<Mutex<(StatusCode, String)>>,
    uploads: Arc<Mutex<Vec<Upload>>>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

/// In-process stand-in for the image search backend.
pub struct MockBackend {
    pub base_url: String,
    state: MockState,
}

impl MockBackend {
    pub async fn set_response(&self, status: StatusCode, body: impl Into<String>) {
        *self.state.response.lock().await = (status, body.into());
    }

    /// Hold every following `/process` request until the returned gate is
    /// notified.
    pub async fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.state.gate.lock().await = Some(gate.clone());
        gate
    }

    pub async fn uploads(&self) -> Vec<Upload> {
        self.state.uploads.lock().await.clone()
    }
}

async fn process(
    State(state): State<MockState>,
    uri: Uri,
    mut multipart: Multipart,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let mut upload = Upload {
        path: uri.path().to_string(),
        ..Upload::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.content_type = field.content_type().map(str::to_string);
                upload.size = field.bytes().await.map(|bytes| bytes.len()).unwrap_or_default();
            }
            "garment_type" => upload.garment_type = field.text().await.unwrap_or_default(),
            "garment_layer" => upload.garment_layer = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }
    state.uploads.lock().await.push(upload);
    let gate = state.gate.lock().await.clone();
    if let Some(gate) = gate {
        gate.notified().await;
    }
    let (status, body) = state.response.lock().await.clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Serve the mock on an ephemeral port, initially answering `/process`
/// with the given status and body.
pub async fn spawn_backend(
    status: StatusCode,
    body: impl Into<String>,
) -> Result<MockBackend, Box<dyn std::error::Error>> {
    let state = MockState {
        response: Arc::new(Mutex::new((status, body.into()))),
        uploads: Arc::new(Mutex::new(vec![])),
        gate: Arc::new(Mutex::new(None)),
    };
    let router = Router::new()
        .route("/process", post(process))
        .route("/process/", post(process))
        .route("/health/", get(health))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let _ = tokio::spawn(async move { axum::serve(listener, router).await });
    Ok(MockBackend {
        base_url: format!("http://{addr}"),
        state,
    })
}

/// Address nothing is listening on.
pub async fn unused_base_url() -> Result<String, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

pub fn coat_response() -> Value {
    json!(
        {
            "success": true,
            "data": {
                "description": "ok",
                "results": [
                    {
                        "name": "Coat A",
                        "price": "$50",
                        "rating": 4.5,
                        "cosine_similarity": 0.92,
                        "image_url": "u1",
                        "product_url": "p1"
                    }
                ]
            }
        }
    )
}
