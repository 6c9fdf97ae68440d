use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use registro_academico::api::router;
use registro_academico::models::course::COURSES;
use registro_academico::state::AppState;
use registro_academico::store::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let store = SqliteStore::in_memory().await.expect("in-memory store");
    router(AppState::new(Arc::new(store)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn ana() -> Value {
    json!({
        "codigo": "AB-12",
        "nombre": "Ana Ruiz",
        "email": "ana@x.com",
        "telefono": "123456789",
        "curso": "CS101",
        "fecha_nacimiento": "2005-06-15"
    })
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_collection_shows_placeholder_row() {
    let app = app().await;
    let (status, page) = send(&app, Method::GET, "/api/cursos", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["table"]["body"]["kind"], "empty");
    assert_eq!(page["table"]["body"]["message"], "No hay cursos registrados");
    assert_eq!(page["table"]["body"]["colspan"], COURSES.columns.len());
    assert_eq!(page["form"]["title"], "Registrar Nuevo Curso");
    assert_eq!(page["form"]["submit"]["caption"], "Registrar Curso");
}

#[tokio::test]
async fn test_submit_creates_record_and_renders_row() {
    let app = app().await;
    let (status, page) = send(&app, Method::POST, "/api/estudiantes/form", Some(ana())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["notice"]["kind"], "success");
    assert_eq!(page["notice"]["message"], "Estudiante registrado exitosamente");
    assert_eq!(page["form"]["values"]["codigo"], "");

    let rows = page["table"]["body"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["cells"][0]["text"], "AB-12");
    assert_eq!(rows[0]["actions"][0], json!({"action": "edit", "id": 1}));
    assert_eq!(rows[0]["actions"][1], json!({"action": "delete", "id": 1}));
}

#[tokio::test]
async fn test_invalid_submit_is_bad_request_and_keeps_values() {
    let app = app().await;
    let mut values = ana();
    values["codigo"] = json!("ab12");

    let (status, page) = send(&app, Method::POST, "/api/estudiantes/form", Some(values)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(page["notice"]["kind"], "error");
    assert_eq!(
        page["notice"]["message"],
        "El código debe tener el formato AB-12 (dos letras, guión, dos números)"
    );
    assert_eq!(page["form"]["values"]["codigo"], "ab12");
    assert_eq!(page["table"]["body"]["kind"], "empty");
}

#[tokio::test]
async fn test_duplicate_submit_is_conflict() {
    let app = app().await;
    send(&app, Method::POST, "/api/estudiantes/form", Some(ana())).await;

    let mut again = ana();
    again["email"] = json!("otra@x.com");
    let (status, page) = send(&app, Method::POST, "/api/estudiantes/form", Some(again)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        page["notice"]["message"],
        "Error al guardar el estudiante: Ya existe un estudiante con este código"
    );
    assert_eq!(page["form"]["values"]["email"], "otra@x.com");
    assert_eq!(page["table"]["body"]["rows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_edit_update_cycle() {
    let app = app().await;
    send(&app, Method::POST, "/api/estudiantes/form", Some(ana())).await;

    let (status, page) = send(&app, Method::POST, "/api/estudiantes/1/edit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["form"]["mode"], json!({"mode": "edit", "id": 1}));
    assert_eq!(page["form"]["title"], "Editar Estudiante");
    assert_eq!(page["form"]["values"]["nombre"], "Ana Ruiz");

    let mut edited = ana();
    edited["curso"] = json!("CS202");
    let (status, page) = send(&app, Method::POST, "/api/estudiantes/form", Some(edited)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["notice"]["message"], "Estudiante actualizado exitosamente");
    assert_eq!(page["form"]["mode"], json!({"mode": "create"}));

    let rows = page["table"]["body"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["cells"][3]["text"], "CS202");
}

#[tokio::test]
async fn test_cancel_edit_returns_to_create_mode() {
    let app = app().await;
    send(&app, Method::POST, "/api/estudiantes/form", Some(ana())).await;
    send(&app, Method::POST, "/api/estudiantes/1/edit", None).await;

    let (status, page) = send(&app, Method::POST, "/api/estudiantes/form/cancel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["form"]["mode"], json!({"mode": "create"}));
    assert_eq!(page["form"]["values"]["nombre"], "");
}

#[tokio::test]
async fn test_edit_of_missing_record_is_not_found() {
    let app = app().await;
    let (status, page) = send(&app, Method::POST, "/api/profesores/9/edit", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(page["notice"]["message"], "Error al cargar el profesor");
    assert_eq!(page["form"]["mode"], json!({"mode": "create"}));
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let app = app().await;
    send(&app, Method::POST, "/api/estudiantes/form", Some(ana())).await;

    let (status, page) = send(&app, Method::DELETE, "/api/estudiantes/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["notice"]["message"], "Estudiante eliminado exitosamente");
    assert_eq!(page["table"]["body"]["kind"], "empty");
    assert_eq!(page["table"]["body"]["message"], "No hay estudiantes registrados");

    let (status, page) = send(&app, Method::DELETE, "/api/estudiantes/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(page["notice"]["message"], "Error al eliminar el estudiante");
}

#[tokio::test]
async fn test_search_filters_rendered_rows() {
    let app = app().await;
    for (codigo, nombre, profesor) in [
        ("II-51", "Redes", "Marta Gil"),
        ("II-52", "Bases de Datos", "Luis Pardo"),
    ] {
        let course = json!({
            "codigo": codigo,
            "nombre": nombre,
            "profesor": profesor,
            "horario": "Lun 8:00",
            "creditos": "4",
            "descripcion": ""
        });
        let (status, _) = send(&app, Method::POST, "/api/cursos/form", Some(course)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, page) = send(&app, Method::GET, "/api/cursos/search?q=red", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = page["table"]["body"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["cells"][0]["text"], "II-51");
    assert_eq!(rows[0]["cells"][5]["text"], "Sin descripción");

    let (_, page) = send(&app, Method::GET, "/api/cursos/search?q=", None).await;
    assert_eq!(page["table"]["body"]["rows"].as_array().unwrap().len(), 2);
}
