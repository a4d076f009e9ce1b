//! Startup configuration
//!
//! Everything is read once from the command line or the environment into a [`LoadConfig`]
//! (what each simulated user does) and [`RunSettings`] (how many users, for how long).
use clap::{ArgAction, Parser, ValueEnum};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use swarm::WaitTime;

pub const DEFAULT_HOST: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PASSWORD: &str = "locustpass";
pub const DEFAULT_USERNAME_PREFIX: &str = "locust_admin";

/// Scenario configuration shared by every simulated user.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    /// Scheme, host and port of the backend.
    pub host: String,
    /// Prefix placed before every `api/...` endpoint, e.g. `v2/`.
    pub base_path: String,
    pub password: String,
    pub username_prefix: String,
    /// Seed one nutrient, fish and feed per authenticated user.
    pub create_resources: bool,
    pub wait: WaitTime,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            base_path: String::new(),
            password: DEFAULT_PASSWORD.to_string(),
            username_prefix: DEFAULT_USERNAME_PREFIX.to_string(),
            create_resources: true,
            wait: WaitTime::zero(),
        }
    }
}

impl LoadConfig {
    /// `<host>/<base_path>`, always ending with a slash.
    pub fn api_base(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            format!("{host}/")
        } else {
            format!("{host}/{path}/")
        }
    }
}

/// Which user profiles to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Registers, seeds resources, then lists, calculates and pings.
    Optikorm,
    /// Anonymous nutrient listing with no pacing, to push raw throughput.
    SimpleReader,
    /// Both profiles side by side, users split evenly.
    Mixed,
}

/// Harness settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub profile: Profile,
    pub users: usize,
    pub spawn_rate: f64,
    pub run_time: Option<Duration>,
    pub tps: Option<NonZeroU32>,
    pub report_interval: Duration,
}

impl RunSettings {
    /// Split users and spawn rate between the two profiles of a mixed run. The odd user goes to
    /// the OPTIKORM profile.
    pub fn split(&self) -> (RunSettings, RunSettings) {
        let optikorm_users = self.users - self.users / 2;
        let reader_users = self.users / 2;
        let share = |users: usize| {
            if self.users == 0 {
                0.
            } else {
                self.spawn_rate * users as f64 / self.users as f64
            }
        };

        (
            RunSettings {
                profile: Profile::Optikorm,
                users: optikorm_users,
                spawn_rate: share(optikorm_users),
                ..self.clone()
            },
            RunSettings {
                profile: Profile::SimpleReader,
                users: reader_users,
                spawn_rate: share(reader_users),
                ..self.clone()
            },
        )
    }
}

/// OPTIKORM backend load test
#[derive(Parser, Debug)]
#[command(name = "optikorm-load")]
#[command(version)]
pub struct Cli {
    /// Backend scheme, host and port
    #[arg(long, env = "LOCUST_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Prefix placed before every `api/...` path
    #[arg(long, env = "LOCUST_BASE_PATH", default_value = "")]
    pub base_path: String,

    /// Password for every registered account
    #[arg(long, env = "LOCUST_PASSWORD", default_value = DEFAULT_PASSWORD)]
    pub password: String,

    #[arg(long, env = "LOCUST_USERNAME_PREFIX", default_value = DEFAULT_USERNAME_PREFIX)]
    pub username_prefix: String,

    /// `1` to create a nutrient, fish and feed per user on startup
    #[arg(
        long,
        env = "CREATE_RESOURCES",
        default_value = "1",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub create_resources: bool,

    /// Minimum wait between two tasks, in seconds
    #[arg(long, env = "LOCUST_WAIT_MIN", default_value_t = 0)]
    pub wait_min: u64,

    /// Maximum wait between two tasks, in seconds
    #[arg(long, env = "LOCUST_WAIT_MAX", default_value_t = 0)]
    pub wait_max: u64,

    /// Number of concurrent users
    #[arg(short, long, env = "LOCUST_USERS", default_value_t = 1)]
    pub users: usize,

    /// Users started per second
    #[arg(short = 'r', long, env = "LOCUST_SPAWN_RATE", default_value_t = 1.)]
    pub spawn_rate: f64,

    /// Stop after this long (e.g. `90s`, `10m`); runs until Ctrl-C otherwise
    #[arg(short = 't', long, env = "LOCUST_RUN_TIME", value_parser = humantime::parse_duration)]
    pub run_time: Option<Duration>,

    #[arg(long, env = "LOCUST_PROFILE", value_enum, default_value_t = Profile::Optikorm)]
    pub profile: Profile,

    /// Cap on transactions per second across all users
    #[arg(long)]
    pub tps: Option<NonZeroU32>,

    /// Interval between two logged measurements
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub report_interval: Duration,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            host: self.host.clone(),
            base_path: self.base_path.clone(),
            password: self.password.clone(),
            username_prefix: self.username_prefix.clone(),
            create_resources: self.create_resources,
            wait: WaitTime::between(
                Duration::from_secs(self.wait_min),
                Duration::from_secs(self.wait_max),
            ),
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            profile: self.profile,
            users: self.users,
            spawn_rate: self.spawn_rate,
            run_time: self.run_time,
            tps: self.tps,
            report_interval: self.report_interval,
        }
    }
}

/// Only the exact value `1` enables a flag.
fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(value == "1")
}
