use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_hunt_core::autopilot::Autopilot;
use maze_hunt_core::config::TuningConfig;
use maze_hunt_core::constants::{get_mode_label, TICK_RATE};
use maze_hunt_core::engine::{Agent, GameEngine, PlayerBody};
use maze_hunt_core::grid::{BodyProfile, Grid};
use maze_hunt_core::types::{GameMode, GameOverReason, RuntimeEvent};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    seconds: Option<u32>,
    #[arg(long)]
    seed: Option<u32>,
    /// Use the slower single-mode speed constants.
    #[arg(long)]
    classic: bool,
    /// JSON file with tuning overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    mode: GameMode,
    seconds: u32,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    mode: GameMode,
    seconds: u32,
    reason: String,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    kills: u32,
    score: u32,
    waves: u32,
    #[serde(rename = "agentsSpawned")]
    agents_spawned: usize,
    #[serde(rename = "shotsFired")]
    shots_fired: u32,
    #[serde(rename = "aggroEvents")]
    aggro_events: u32,
    #[serde(rename = "stuckTicks")]
    stuck_ticks: u64,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: i64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: i64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

impl RunSummary {
    fn from_runs(
        match_id: String,
        started_at_ms: i64,
        finished_at_ms: i64,
        runs: Vec<ScenarioRunResult>,
    ) -> Self {
        let mut reason_counts = BTreeMap::new();
        let mut anomaly_count = 0;
        let mut total_duration_ms = 0;
        let mut scenarios = Vec::with_capacity(runs.len());
        for run in runs {
            *reason_counts.entry(run.result.reason.clone()).or_insert(0) += 1;
            anomaly_count += run.anomaly_records.len();
            total_duration_ms += run.result.duration_ms;
            scenarios.push(run.result);
        }
        let scenario_count = scenarios.len();
        Self {
            match_id,
            started_at_ms,
            finished_at_ms,
            scenario_count,
            anomaly_count,
            average_duration_ms: total_duration_ms.checked_div(scenario_count as u64).unwrap_or(0),
            reason_counts,
            scenarios,
        }
    }

    fn exit_code(&self) -> i32 {
        if self.anomaly_count > 0 {
            1
        } else {
            0
        }
    }
}

#[derive(Default)]
struct AnomalyLog {
    records: Vec<AnomalyRecord>,
    messages: Vec<String>,
    seen: HashSet<String>,
}

impl AnomalyLog {
    // Every occurrence is recorded; the result line lists each message once.
    fn push(&mut self, tick: u64, message: String) {
        if self.seen.insert(message.clone()) {
            self.messages.push(message.clone());
        }
        self.records.push(AnomalyRecord { tick, message });
    }
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = Utc::now().timestamp_millis();
    let match_id = cli.match_id.clone().unwrap_or_else(|| {
        let seed = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
        format!("sim-{seed}-{run_started_at_ms}")
    });

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            emit_log(
                "error",
                "config_load_failed",
                &match_id,
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let mut runs = Vec::new();
    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "mode": scenario.mode,
                "seconds": scenario.seconds,
            }),
        );
        let scenario_run = run_scenario(&scenario, &config);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationMs": scenario_run.result.duration_ms,
                "kills": scenario_run.result.kills,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => eprintln!("[simulate] failed to serialize result: {error}"),
        }
        runs.push(scenario_run);
    }

    let summary = RunSummary::from_runs(
        match_id.clone(),
        run_started_at_ms,
        Utc::now().timestamp_millis(),
        runs,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    std::process::exit(summary.exit_code());
}

fn resolve_config(cli: &Cli) -> Result<TuningConfig, maze_hunt_core::config::ConfigError> {
    match cli.config.as_ref() {
        Some(path) => TuningConfig::load(path),
        None if cli.classic => Ok(TuningConfig::classic()),
        None => Ok(TuningConfig::default()),
    }
}

fn run_scenario(scenario: &Scenario, config: &TuningConfig) -> ScenarioRunResult {
    let mut engine = GameEngine::new(scenario.mode, scenario.seed, config.clone());
    let mut pilot = Autopilot::for_engine(&engine);
    let max_ticks = scenario.seconds as u64 * TICK_RATE as u64;

    let mut aggro_events = 0u32;
    let mut anomalies = AnomalyLog::default();
    let mut last_tick = 0u64;

    while !engine.is_ended() && engine.tick() < max_ticks {
        let input = pilot.next_input(&engine);
        engine.step(&input);
        last_tick = engine.tick();
        let player = engine.player();
        for message in frame_anomalies(
            &engine.world.grid,
            engine.config.player_radius,
            &player.body,
            engine.agents(),
        ) {
            anomalies.push(last_tick, message);
        }

        let snapshot = engine.build_snapshot(true);
        aggro_events += snapshot
            .events
            .iter()
            .filter(|event| matches!(event, RuntimeEvent::AgentAggro { .. }))
            .count() as u32;
    }

    let summary = engine.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            mode: scenario.mode,
            seconds: scenario.seconds,
            reason: game_over_reason_key(summary.reason),
            duration_ms: summary.duration_ms,
            kills: summary.kills,
            score: summary.score,
            waves: summary.waves,
            agents_spawned: summary.agents_spawned,
            shots_fired: summary.shots_fired,
            aggro_events,
            stuck_ticks: engine.stuck_ticks(),
            anomalies: anomalies.messages,
        },
        anomaly_records: anomalies.records,
        finished_tick: last_tick,
    }
}

fn frame_anomalies<'a>(
    grid: &Grid,
    player_radius: f32,
    player: &PlayerBody,
    agents: impl IntoIterator<Item = &'a Agent>,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let size = grid.size() as i32;
    let in_grid = |x: i32, z: i32| x >= 0 && z >= 0 && x < size && z < size;

    if !player.position.is_finite() || !player.velocity.is_finite() {
        anomalies.push("player state is not finite".to_string());
    } else if grid.is_wall_at(
        player.position,
        BodyProfile::Thick {
            radius: player_radius,
        },
    ) {
        anomalies.push("player overlaps a wall".to_string());
    }

    for agent in agents {
        if !agent.position.is_finite() || !agent.y.is_finite() {
            anomalies.push(format!("agent {} position is not finite", agent.id.0));
            continue;
        }
        let (x, z) = grid.world_to_cell(agent.position);
        if !in_grid(x, z) {
            anomalies.push(format!("agent {} left the grid", agent.id.0));
        } else if grid.is_wall_at(agent.position, BodyProfile::Thin) {
            anomalies.push(format!("agent {} is inside a wall", agent.id.0));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let mode = cli.mode.as_deref().and_then(GameMode::parse);

    if cli.single || mode.is_some() || cli.seconds.is_some() {
        let mode = mode.unwrap_or(GameMode::Hunt);
        let seconds = cli.seconds.unwrap_or(60).clamp(1, 600);
        return vec![Scenario {
            name: format!("custom-{}", get_mode_label(mode)),
            mode,
            seconds,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-check-hunt".to_string(),
            mode: GameMode::Hunt,
            seconds: 60,
            seed,
        },
        Scenario {
            name: "endurance-survival".to_string(),
            mode: GameMode::Survival,
            seconds: 180,
            seed: seed.wrapping_add(1),
        },
    ]
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => eprintln!("[simulate] failed to serialize log line: {error}"),
    }
}

fn game_over_reason_key(reason: Option<GameOverReason>) -> String {
    match reason {
        Some(GameOverReason::Escaped) => "escaped",
        Some(GameOverReason::Caught) => "caught",
        None => "timeout",
    }
    .to_string()
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
