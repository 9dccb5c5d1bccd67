#![allow(dead_code)]

use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Starts a throwaway prediction service and returns its API base URL.
pub async fn spawn_service(routes: fn(&mut web::ServiceConfig)) -> String {
    let server = HttpServer::new(move || App::new().configure(routes))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{addr}/api")
}

/// Like [`spawn_service`] with [`prediction_service`], also returning the
/// number of `/metadata` requests served so far.
pub async fn spawn_counted_service() -> (String, web::Data<AtomicUsize>) {
    let hits = web::Data::new(AtomicUsize::new(0));
    let shared = hits.clone();
    let server = HttpServer::new(move || App::new().app_data(shared.clone()).configure(prediction_service))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{addr}/api"), hits)
}

pub fn hits(counter: &web::Data<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// A base URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api")
}

pub fn prediction_service(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .route("/metadata", web::get().to(metadata))
            .route("/predict", web::post().to(predict))
            .route("/predict-batch", web::post().to(predict_batch)),
    );
}

pub fn broken_service(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").default_service(web::to(|| async {
        HttpResponse::BadGateway().content_type("text/plain").body("Bad Gateway")
    })));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "model_loaded": true,
        "r2_score": 0.8121,
        "mae": 1.16,
    }))
}

async fn metadata(hits: Option<web::Data<AtomicUsize>>) -> HttpResponse {
    if let Some(hits) = hits {
        hits.fetch_add(1, Ordering::SeqCst);
    }
    HttpResponse::Ok().json(json!({
        "r2_score": 0.8121,
        "mae": 1.16,
        "features": ["G1", "G2", "studytime", "absences"],
        "categorical_features": [],
        "numerical_features": ["G1", "G2", "studytime", "absences"],
        "feature_importance": {"G2": 0.31, "G1": 0.28, "studytime": 0.12, "absences": 0.08},
        "grade_distribution": [
            {"range": "0-10", "count": 60},
            {"range": "10-15", "count": 120},
            {"range": "15-20", "count": 90}
        ],
        "training_samples": 395,
        "model_type": "Random Forest"
    }))
}

// The predicted grade is G2 + 0.5; a few ages trigger failure responses.
fn grade_for(student: &Value) -> Option<f64> {
    let wire_ok = student.get("Pstatus").is_some() && student["higher"].is_string() && student["famsize"].is_string();
    if !wire_ok {
        return None;
    }
    student["G2"].as_f64().map(|g2| g2 + 0.5)
}

async fn predict(body: web::Json<Value>) -> HttpResponse {
    match body["age"].as_i64() {
        Some(21) => HttpResponse::InternalServerError().json(json!({"detail": "bad input"})),
        Some(22) => HttpResponse::UnprocessableEntity().json(json!({
            "detail": [{"loc": ["body", "age"], "msg": "ensure this value is less than 22", "type": "value_error"}]
        })),
        _ => match grade_for(&body) {
            Some(grade) => HttpResponse::Ok().json(json!({
                "predicted_grade": grade,
                "confidence": {"r2_score": 0.8121, "mae": 1.16}
            })),
            None => HttpResponse::BadRequest().json(json!({"error": "unexpected request shape"})),
        },
    }
}

// Answers with a bare list of grades in submission order.
async fn predict_batch(body: web::Json<Value>) -> HttpResponse {
    let predictions: Vec<f64> = body["students"]
        .as_array()
        .map(|students| students.iter().map(|s| grade_for(s).unwrap_or(0.0)).collect())
        .unwrap_or_default();
    HttpResponse::Ok().json(json!({ "predictions": predictions }))
}
