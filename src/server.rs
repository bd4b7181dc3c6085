// src/server.rs

use serde_json::json;
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tracing::{error, info};
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::store::TableStore;

const RESET_MESSAGE: &str = "Tabela de dados resetada com sucesso.";

fn with_store(
    store: Arc<TableStore>,
) -> impl Filter<Extract = (Arc<TableStore>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&json!({
        "status": "healthy",
        "service": "coleta"
    })))
}

fn error_reply(message: String) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

async fn reset_dados(store: Arc<TableStore>) -> Result<impl Reply, Rejection> {
    let outcome = tokio::task::spawn_blocking(move || store.truncate()).await;

    Ok(match outcome {
        Ok(Ok(removed)) => {
            info!(removed, "reset_dados");
            warp::reply::with_status(
                warp::reply::json(&json!({ "message": RESET_MESSAGE })),
                StatusCode::OK,
            )
        }
        Ok(Err(e)) => {
            error!("reset_dados failed: {:?}", e);
            error_reply(format!("{:#}", e))
        }
        Err(e) => {
            error!("reset_dados task failed: {}", e);
            error_reply(e.to_string())
        }
    })
}

async fn dados(store: Arc<TableStore>) -> Result<impl Reply, Rejection> {
    let outcome = tokio::task::spawn_blocking(move || store.load_records()).await;

    Ok(match outcome {
        Ok(Ok(records)) => {
            warp::reply::with_status(warp::reply::json(&records), StatusCode::OK)
        }
        Ok(Err(e)) => {
            error!("dados failed: {:?}", e);
            error_reply(format!("{:#}", e))
        }
        Err(e) => {
            error!("dados task failed: {}", e);
            error_reply(e.to_string())
        }
    })
}

/// `GET /health`, `GET /dados`, `POST /reset_dados`.
pub fn routes(
    store: Arc<TableStore>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let reset = warp::path("reset_dados")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_store(store.clone()))
        .and_then(reset_dados);

    let rows = warp::path("dados")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store))
        .and_then(dados);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_header("content-type");

    health.or(reset).or(rows).with(cors)
}

pub async fn serve(store: Arc<TableStore>, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server starting on port {}", port);
    info!("Data endpoint: GET http://localhost:{}/dados", port);
    info!("Reset endpoint: POST http://localhost:{}/reset_dados", port);
    warp::serve(routes(store)).run(addr).await;
}
