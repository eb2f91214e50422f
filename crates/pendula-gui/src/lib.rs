//! Pendula GUI - JSON API for a double-pendulum renderer
//!
//! Features:
//! - Slider specs and defaults for building a control panel
//! - Headless batch runs returned frame by frame
//! - Chart series (energy, angles, divergence, trajectories)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pendula_core::CartesianFrame;
use pendula_sim::{run_batch, BatchResult, ParamSpec, SimulationConfig, SLIDERS};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Charts served under `/api/chart/{chart_type}`.
pub const CHART_TYPES: [&str; 5] = ["energy", "phi1", "phi2", "spread", "trajectory"];

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Per-request limits for batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSettings {
    /// Frames when the query does not say.
    pub default_frames: usize,
    /// Upper bound on frames per request.
    pub max_frames: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_frames: 300,
            max_frames: 5_000,
        }
    }
}

/// Creates the Axum router with all routes
pub fn create_router(settings: ApiSettings) -> Router {
    Router::new()
        .route("/api/params", get(handle_params))
        .route("/api/simulate", get(handle_simulate))
        .route("/api/chart/{chart_type}", get(handle_chart_data))
        .with_state(settings)
}

/// Parse config and frame count from query parameters
fn parse_config(params: &HashMap<String, String>, settings: &ApiSettings) -> (SimulationConfig, usize) {
    let mut config = SimulationConfig::default();

    macro_rules! parse_param {
        ($field:ident, $type:ty) => {
            if let Some(val) = params
                .get(stringify!($field))
                .and_then(|v| v.parse::<$type>().ok())
            {
                config.$field = val;
            }
        };
    }

    parse_param!(l1, f64);
    parse_param!(m1, f64);
    parse_param!(l2, f64);
    parse_param!(m2, f64);
    parse_param!(phi1_init, f64);
    parse_param!(phi2_init, f64);
    parse_param!(pendulum_number, usize);
    parse_param!(deviation, f64);
    parse_param!(randomness, f64);
    parse_param!(trails, bool);
    parse_param!(trail_length, usize);
    parse_param!(trail_update_interval, usize);

    if let Some(seed) = params.get("seed").and_then(|v| v.parse::<u64>().ok()) {
        config.seed = Some(seed);
    }

    let frames = params
        .get("frames")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(settings.default_frames)
        .min(settings.max_frames);

    (config, frames)
}

fn run(params: &HashMap<String, String>, settings: &ApiSettings) -> Result<BatchResult, ApiError> {
    let (config, frames) = parse_config(params, settings);
    debug!(pendulums = config.pendulum_number, frames, "batch requested");
    run_batch(&config, frames).map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_params() -> Json<ParamsResponse> {
    Json(ParamsResponse {
        sliders: SLIDERS.to_vec(),
        defaults: SimulationConfig::default(),
        chart_types: CHART_TYPES.to_vec(),
    })
}

/// Handle simulation request
async fn handle_simulate(
    State(settings): State<ApiSettings>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<SimulateResponse> {
    let result = run(&params, &settings)?;
    Ok(Json(SimulateResponse::from(result)))
}

/// Handle specific chart data requests
async fn handle_chart_data(
    State(settings): State<ApiSettings>,
    Path(chart_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<ChartData> {
    if !CHART_TYPES.contains(&chart_type.as_str()) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("unknown chart type '{chart_type}'"),
        ));
    }
    let result = run(&params, &settings)?;
    generate_chart_data(&chart_type, &result)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("unknown chart type '{chart_type}'")))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ParamsResponse {
    sliders: Vec<ParamSpec>,
    defaults: SimulationConfig,
    chart_types: Vec<&'static str>,
}

#[derive(Serialize)]
struct SimulateResponse {
    config: SimulationConfig,
    view_scale: f64,
    time: Vec<f64>,
    frames: Vec<Vec<CartesianFrame>>,
    trails: Vec<Vec<[f64; 2]>>,
    energy: Vec<f64>,
    energy_drift: f64,
    success: bool,
}

impl From<BatchResult> for SimulateResponse {
    fn from(res: BatchResult) -> Self {
        let energy_drift = res.energy_drift();
        Self {
            config: res.config,
            view_scale: res.view_scale,
            time: res.time,
            frames: res.frames,
            trails: res.trails,
            energy: res.energy,
            energy_drift,
            success: true,
        }
    }
}

#[derive(Serialize)]
struct ChartData {
    time: Vec<f64>,
    /// One line per pendulum; a single line for batch-wide quantities.
    series: Vec<Vec<f64>>,
    /// Lower-bob (x, y) path per pendulum, for trajectory charts.
    paths: Option<Vec<(Vec<f64>, Vec<f64>)>>,
    title: String,
    y_label: String,
    chart_type: String,
}

/// Per-pendulum columns out of per-frame rows.
fn per_pendulum(rows: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    (0..n).map(|i| rows.iter().map(|row| row[i]).collect()).collect()
}

fn lower_path(res: &BatchResult, i: usize) -> (Vec<f64>, Vec<f64>) {
    res.frames.iter().map(|frame| (frame[i].x2, frame[i].y2)).unzip()
}

fn generate_chart_data(chart_type: &str, res: &BatchResult) -> Option<ChartData> {
    let n = res.pendulum_count();

    let chart = match chart_type {
        "energy" => ChartData {
            time: res.time.clone(),
            series: vec![res.energy.clone()],
            paths: None,
            title: "Total Energy vs Time".to_string(),
            y_label: "Energy".to_string(),
            chart_type: "2d".to_string(),
        },
        "phi1" => ChartData {
            time: res.time.clone(),
            series: per_pendulum(&res.phi1, n),
            paths: None,
            title: "Upper Angle vs Time".to_string(),
            y_label: "phi1 (rad)".to_string(),
            chart_type: "2d".to_string(),
        },
        "phi2" => ChartData {
            time: res.time.clone(),
            series: per_pendulum(&res.phi2, n),
            paths: None,
            title: "Lower Angle vs Time".to_string(),
            y_label: "phi2 (rad)".to_string(),
            chart_type: "2d".to_string(),
        },
        "spread" => ChartData {
            time: res.time.clone(),
            series: vec![(0..res.frame_count()).map(|k| res.lower_spread(k)).collect()],
            paths: None,
            title: "Lower Bob Spread vs Time".to_string(),
            y_label: "Spread".to_string(),
            chart_type: "2d".to_string(),
        },
        "trajectory" => ChartData {
            time: res.time.clone(),
            series: vec![],
            paths: Some((0..n).map(|i| lower_path(res, i)).collect()),
            title: "Lower Bob Paths".to_string(),
            y_label: "Position".to_string(),
            chart_type: "path".to_string(),
        },
        _ => return None,
    };
    Some(chart)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn batch(pairs: &[(&str, &str)]) -> BatchResult {
        run(&query(pairs), &ApiSettings::default()).unwrap()
    }

    #[test]
    fn test_parse_config_overrides_defaults() {
        let settings = ApiSettings::default();
        let (config, frames) = parse_config(
            &query(&[
                ("l1", "4.5"),
                ("pendulum_number", "12"),
                ("trails", "true"),
                ("seed", "9"),
                ("m2", "not-a-number"),
            ]),
            &settings,
        );
        assert_eq!(config.l1, 4.5);
        assert_eq!(config.pendulum_number, 12);
        assert!(config.trails);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.m2, 5.0);
        assert_eq!(frames, settings.default_frames);

        let (_, frames) = parse_config(&query(&[("frames", "1000000")]), &settings);
        assert_eq!(frames, settings.max_frames);
    }

    #[test]
    fn test_frame_cap_follows_settings() {
        let settings = ApiSettings {
            default_frames: 10,
            max_frames: 50,
        };
        assert_eq!(parse_config(&query(&[]), &settings).1, 10);
        assert_eq!(parse_config(&query(&[("frames", "51")]), &settings).1, 50);
    }

    #[test]
    fn test_simulation_runs() {
        let res = SimulateResponse::from(batch(&[("frames", "20"), ("seed", "1")]));
        assert_eq!(res.time.len(), 21);
        assert_eq!(res.frames.len(), res.time.len());
        assert_eq!(res.frames[0].len(), 1);
        assert!(res.energy_drift < 1e-8);
        assert!(res.success);
    }

    #[test]
    fn test_chart_generation() {
        let res = batch(&[("frames", "10"), ("pendulum_number", "3"), ("deviation", "0.01")]);

        let chart = generate_chart_data("phi2", &res).unwrap();
        assert_eq!(chart.series.len(), 3);
        assert!(chart.series.iter().all(|s| s.len() == 11));

        let chart = generate_chart_data("energy", &res).unwrap();
        assert_eq!(chart.title, "Total Energy vs Time");
        assert_eq!(chart.series.len(), 1);

        let chart = generate_chart_data("spread", &res).unwrap();
        assert!(chart.series[0][0] > 0.0);

        assert!(generate_chart_data("typo", &res).is_none());
        for chart_type in CHART_TYPES {
            assert!(generate_chart_data(chart_type, &res).is_some(), "{chart_type}");
        }
    }

    #[test]
    fn test_trajectory_paths() {
        let res = batch(&[("frames", "5"), ("pendulum_number", "2")]);
        let chart = generate_chart_data("trajectory", &res).unwrap();
        let paths = chart.paths.unwrap();
        assert_eq!(paths.len(), 2);
        let (x, y) = &paths[1];
        assert_eq!(x.len(), 6);
        assert_eq!(y.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_chart_is_not_found() {
        let err = handle_chart_data(
            State(ApiSettings::default()),
            Path("typo".to_string()),
            Query(query(&[("frames", "2")])),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_config_is_unprocessable() {
        for bad in [("pendulum_number", "0"), ("pendulum_number", "50000000"), ("l1", "40")] {
            let err = handle_simulate(State(ApiSettings::default()), Query(query(&[bad])))
                .await
                .err()
                .unwrap();
            assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY, "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_params_lists_every_slider() {
        let Json(res) = handle_params().await;
        assert_eq!(res.sliders.len(), SLIDERS.len());
        assert_eq!(res.defaults, SimulationConfig::default());
        assert_eq!(res.chart_types.len(), CHART_TYPES.len());
    }
}
