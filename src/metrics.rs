use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpResponse};
use chrono::{DateTime, Timelike, Utc};
use futures_util::future::{ok, Ready};
use rusqlite::params;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

struct MetricUpdate {
    path: String,
    method: String,
    status_code: u16,
    timestamp: DateTime<Utc>,
}

/// Request counters. Writes are batched through a channel to a background
/// thread so recording never blocks a request.
#[derive(Clone)]
pub struct MetricsCollector {
    db_path: PathBuf,
    cache: Arc<Mutex<HashMap<String, u64>>>, // total count per path
    start_time: DateTime<Utc>,
    tx: Sender<MetricUpdate>,
}

#[derive(Serialize)]
pub struct EndpointStats {
    pub path: String,
    pub total_count: u64,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub endpoints: Vec<EndpointStats>,
    pub total_calls: u64,
    pub uptime_secs: i64,
}

impl MetricsCollector {
    pub fn new(db_path: PathBuf) -> Self {
        let start_time = Utc::now();

        let (tx, rx) = channel::<MetricUpdate>();
        let db_path_clone = db_path.clone();

        if let Err(e) = Self::init_db(&db_path) {
            log::error!("Failed to initialize metrics database: {}", e);
        }

        let collector = MetricsCollector {
            db_path,
            cache: Arc::new(Mutex::new(HashMap::new())),
            start_time,
            tx,
        };

        if let Err(e) = collector.load_cache() {
            log::error!("Failed to load metrics cache: {}", e);
        }

        // Background writer thread; exits when the last sender is dropped
        std::thread::spawn(move || {
            while let Ok(update) = rx.recv() {
                if let Err(e) = Self::persist_metric(
                    &db_path_clone,
                    &update.path,
                    &update.method,
                    update.status_code,
                    update.timestamp,
                ) {
                    log::error!("Failed to persist metric: {}", e);
                }
            }
        });

        collector
    }

    fn init_db(db_path: &PathBuf) -> Result<(), rusqlite::Error> {
        let conn = rusqlite::Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS minute_metrics (
                timestamp TEXT NOT NULL,
                path TEXT NOT NULL,
                method TEXT NOT NULL,
                status_code INTEGER NOT NULL DEFAULT 200,
                count INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (timestamp, path, method, status_code)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_minute_metrics_timestamp
             ON minute_metrics(timestamp DESC)",
            [],
        )?;

        Ok(())
    }

    fn minute_key(timestamp: DateTime<Utc>) -> String {
        // Truncate to minute precision
        timestamp
            .with_second(0)
            .unwrap()
            .with_nanosecond(0)
            .unwrap()
            .to_rfc3339()
    }

    fn persist_metric(
        db_path: &PathBuf,
        path: &str,
        method: &str,
        status_code: u16,
        timestamp: DateTime<Utc>,
    ) -> Result<(), rusqlite::Error> {
        let conn = rusqlite::Connection::open(db_path)?;
        let minute = Self::minute_key(timestamp);

        conn.execute(
            "INSERT INTO minute_metrics (timestamp, path, method, status_code, count) VALUES (?1, ?2, ?3, ?4, 1)
             ON CONFLICT(timestamp, path, method, status_code) DO UPDATE SET count = count + 1",
            params![minute, path, method, status_code],
        )?;

        Ok(())
    }

    fn load_cache(&self) -> Result<(), rusqlite::Error> {
        let conn = rusqlite::Connection::open(&self.db_path)?;

        let mut stmt =
            conn.prepare("SELECT path, SUM(count) as total FROM minute_metrics GROUP BY path")?;
        let rows = stmt.query_map([], |row| {
            let path: String = row.get(0)?;
            let total: u64 = row.get(1)?;
            Ok((path, total))
        })?;

        let mut cache = self.cache.lock().unwrap();
        for row in rows.flatten() {
            cache.insert(row.0, row.1);
        }

        Ok(())
    }

    pub fn record(&self, path: &str, method: &str, status_code: u16) {
        let timestamp = Utc::now();

        {
            let mut cache = self.cache.lock().unwrap();
            *cache.entry(path.to_string()).or_insert(0) += 1;
        }

        // Non-blocking; persistence happens on the writer thread
        let _ = self.tx.send(MetricUpdate {
            path: path.to_string(),
            method: method.to_string(),
            status_code,
            timestamp,
        });
    }

    pub fn get_metrics(&self) -> MetricsResponse {
        let cache = self.cache.lock().unwrap();
        let total_calls = cache.values().sum::<u64>();
        let mut endpoints: Vec<EndpointStats> = cache
            .iter()
            .map(|(path, count)| EndpointStats {
                path: path.clone(),
                total_count: *count,
            })
            .collect();
        endpoints.sort_by(|a, b| b.total_count.cmp(&a.total_count));

        MetricsResponse {
            endpoints,
            total_calls,
            uptime_secs: (Utc::now() - self.start_time).num_seconds(),
        }
    }
}

// Middleware implementation
impl<S, B> Transform<S, ServiceRequest> for MetricsCollector
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(MetricsMiddleware {
            service,
            metrics: self.clone(),
        })
    }
}

pub struct MetricsMiddleware<S> {
    service: S,
    metrics: MetricsCollector,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();
        let method = req.method().to_string();
        let should_track = path.starts_with("/api/") || path == "/health" || path == "/";
        let metrics = self.metrics.clone();

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;

            if should_track {
                let status_code = res.status().as_u16();
                metrics.record(&path, &method, status_code);
            }

            Ok(res)
        })
    }
}

pub async fn get_metrics_handler(
    metrics: actix_web::web::Data<MetricsCollector>,
) -> HttpResponse {
    HttpResponse::Ok().json(metrics.get_metrics())
}
