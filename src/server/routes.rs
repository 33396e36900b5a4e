use std::collections::HashMap;
use warp::Filter;

use crate::core::{HealthChecker, PipelineMetrics};
use crate::store::{FlipFilter, FlipStore};

#[derive(Clone)]
pub struct AppState {
    pub store: FlipStore,
    pub health: HealthChecker,
    pub metrics: PipelineMetrics,
}

/// Builds the query filter from `/items` parameters. Anything missing or
/// unparseable falls back to 0 / false.
pub fn parse_filter(params: &HashMap<String, String>) -> FlipFilter {
    let int = |key: &str| -> i64 {
        params
            .get(key)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
            .max(0)
    };
    let flag = |key: &str| -> bool { params.get(key).map(|v| parse_bool(v)).unwrap_or(false) };

    FlipFilter {
        min_profit: int("min_profit"),
        max_price: int("max_price"),
        include_cosmetic: flag("pet_skins"),
        include_manipulation_suspected: flag("manipulation"),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True")
}

pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let items = warp::path("items")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state.clone())
        .and_then(|params: HashMap<String, String>, state: AppState| async move {
            let filter = parse_filter(&params);
            let flips = state.store.query(&filter).await;
            tracing::debug!(?filter, results = flips.len(), "Handled /items");
            Ok::<_, warp::Rejection>(warp::reply::json(&flips))
        });

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state.clone())
        .and_then(|state: AppState| async move {
            let status = state.health.get_status().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&status))
        });

    let metrics = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state)
        .map(|state: AppState| {
            warp::reply::with_header(
                state.metrics.render(),
                "content-type",
                "text/plain; version=0.0.4",
            )
        });

    items.or(health).or(metrics)
}
