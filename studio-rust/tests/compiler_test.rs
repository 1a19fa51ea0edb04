use axum::{http::StatusCode, routing::post, Json, Router};
use forge_studio::{CompileError, CompiledComponent, ComponentCompiler, HttpCompiler};
use serde_json::{json, Value};

async fn compile(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let code = body["code"].as_str().unwrap_or_default().to_string();
    if code.contains("<broken") {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Expected >" })),
        )
    } else if code.is_empty() {
        (StatusCode::BAD_GATEWAY, Json(json!({ "unexpected": true })))
    } else {
        (
            StatusCode::OK,
            Json(json!({ "js": format!("export default /* {} */ null;", code.len()) })),
        )
    }
}

async fn spawn_compiler() -> String {
    let app = Router::new().route("/api/compile", post(compile));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/compile")
}

#[tokio::test]
async fn returns_compiled_module() {
    let compiler = HttpCompiler::new(spawn_compiler().await);

    let compiled = compiler.compile("<h1>Hi</h1>").await.unwrap();

    assert_eq!(
        compiled,
        CompiledComponent {
            js: "export default /* 11 */ null;".to_string()
        }
    );
}

#[tokio::test]
async fn surfaces_compiler_errors() {
    let compiler = HttpCompiler::new(spawn_compiler().await);

    let error = compiler.compile("<broken").await.unwrap_err();

    assert!(matches!(error, CompileError::Rejected(ref message) if message == "Expected >"));
}

#[tokio::test]
async fn unexpected_bodies_are_invalid_responses() {
    let compiler = HttpCompiler::new(spawn_compiler().await);

    let error = compiler.compile("").await.unwrap_err();

    match error {
        CompileError::InvalidResponse(status, body) => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert!(body.contains("unexpected"));
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}
