//! HTTP front end: worker-facing and admin routes, logging setup and server startup.

use std::io::Write;
use std::net::SocketAddr;

use actix_web::dev::{Server, ServerHandle};
use actix_web::{HttpRequest, HttpResponse, HttpServer, delete, error, get, post, web};
use log::{error, info};

use crate::config::ServerConfig;
use crate::coord_state::CoordState;
use crate::error::CoordinatorError;
use crate::io_struct::{AdminAddInput, RegisterReqInput, WorkerIdInput};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    error!("JSON payload error: {:?}", err);
    match &err {
        error::JsonPayloadError::OverflowKnownLength { length, limit } => {
            error::ErrorPayloadTooLarge(format!(
                "Payload too large: {} bytes exceeds limit of {} bytes",
                length, limit
            ))
        }
        error::JsonPayloadError::Overflow { limit } => {
            error::ErrorPayloadTooLarge(format!("Payload exceeds limit of {} bytes", limit))
        }
        _ => error::ErrorBadRequest(format!("Invalid JSON payload: {}", err)),
    }
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

#[post("/register_worker")]
pub async fn register_worker(
    req: web::Json<RegisterReqInput>,
    app_state: web::Data<CoordState>,
) -> Result<HttpResponse, CoordinatorError> {
    let worker_id = app_state.register(&req)?;
    Ok(HttpResponse::Ok().content_type(TEXT_PLAIN).body(worker_id))
}

#[post("/query_global_model_status")]
pub async fn query_global_model_status(
    req: web::Json<WorkerIdInput>,
    app_state: web::Data<CoordState>,
) -> Result<HttpResponse, CoordinatorError> {
    let status = app_state.global_model_status(&req.worker_id)?;
    Ok(HttpResponse::Ok().content_type(TEXT_PLAIN).body(status))
}

#[post("/return_global_model")]
pub async fn return_global_model(
    req: web::Json<WorkerIdInput>,
    app_state: web::Data<CoordState>,
) -> Result<HttpResponse, CoordinatorError> {
    let model = app_state.global_model(&req.worker_id)?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(model))
}

#[post("/receive_worker_update/{worker_id}")]
pub async fn receive_worker_update(
    path: web::Path<String>,
    body: web::Bytes,
    app_state: web::Data<CoordState>,
) -> HttpResponse {
    let outcome = app_state.submit_update(&path.into_inner(), body);
    HttpResponse::Ok()
        .content_type(TEXT_PLAIN)
        .body(outcome.message())
}

#[get("/workers")]
pub async fn list_workers(app_state: web::Data<CoordState>) -> HttpResponse {
    HttpResponse::Ok().json(app_state.list_workers())
}

#[post("/workers")]
pub async fn add_worker(
    body: web::Bytes,
    app_state: web::Data<CoordState>,
) -> Result<HttpResponse, actix_web::Error> {
    // an empty body is treated like `{}`
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        AdminAddInput::default()
    } else {
        serde_json::from_slice::<AdminAddInput>(&body)
            .map_err(|e| error::ErrorBadRequest(format!("Invalid JSON payload: {}", e)))?
    };
    let workers = app_state.admin_add(&input)?;
    Ok(HttpResponse::Ok().json(workers))
}

#[delete("/workers/{worker_id}")]
pub async fn remove_worker(
    path: web::Path<String>,
    app_state: web::Data<CoordState>,
) -> HttpResponse {
    let workers = app_state.admin_remove(&path.into_inner());
    HttpResponse::Ok().json(workers)
}

/// Routes served to workers.
pub fn worker_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(register_worker)
        .service(query_global_model_status)
        .service(return_global_model)
        .service(receive_worker_update);
}

/// Routes served to operators.
pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_workers)
        .service(add_worker)
        .service(remove_worker);
}

/// Both servers bound and ready to run.
pub struct CoordinatorServers {
    pub worker_addrs: Vec<SocketAddr>,
    pub admin_addrs: Vec<SocketAddr>,
    worker: Server,
    admin: Server,
}

impl CoordinatorServers {
    pub fn bind(config: &ServerConfig, state: CoordState) -> std::io::Result<Self> {
        let app_state = web::Data::new(state);
        let max_payload_size = config.max_payload_size;

        let worker_state = app_state.clone();
        let worker = HttpServer::new(move || {
            actix_web::App::new()
                .wrap(actix_web::middleware::Logger::default())
                .app_data(worker_state.clone())
                .app_data(
                    web::JsonConfig::default()
                        .limit(max_payload_size)
                        .error_handler(json_error_handler),
                )
                .app_data(web::PayloadConfig::default().limit(max_payload_size))
                .configure(worker_routes)
        })
        .bind((config.host.as_str(), config.port))?;

        let admin_state = app_state;
        let admin = HttpServer::new(move || {
            actix_web::App::new()
                .wrap(actix_web::middleware::Logger::default())
                .app_data(admin_state.clone())
                .configure(admin_routes)
        })
        .bind((config.admin_host.as_str(), config.admin_port))?;

        Ok(Self {
            worker_addrs: worker.addrs(),
            admin_addrs: admin.addrs(),
            worker: worker.run(),
            admin: admin.run(),
        })
    }

    pub fn handles(&self) -> (ServerHandle, ServerHandle) {
        (self.worker.handle(), self.admin.handle())
    }

    /// Runs until both servers have stopped.
    pub async fn run(self) -> std::io::Result<()> {
        tokio::try_join!(self.worker, self.admin)?;
        Ok(())
    }
}

pub fn init_logging(level: log::LevelFilter) {
    // RUST_LOG, when set, overrides the configured level
    let _ = env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .try_init();
}

pub async fn startup(config: ServerConfig, state: CoordState) -> std::io::Result<()> {
    let servers = CoordinatorServers::bind(&config, state)?;
    info!("Serving workers on {:?}", servers.worker_addrs);
    info!("Serving admin API on {:?}", servers.admin_addrs);

    let (worker_handle, admin_handle) = servers.handles();
    tokio::select! {
        res = servers.run() => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            tokio::join!(worker_handle.stop(true), admin_handle.stop(true));
            Ok(())
        }
    }
}
