//! Embedded PostgreSQL worker used by the store integration tests.
//!
//! `pg_embedded_setup_unpriv` runs this binary under an unprivileged user when
//! the test process is root. It is invoked as `pg_worker <action> <payload>`,
//! where the payload is a JSON [`WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Report, Result, bail, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let request = WorkerRequest::from_args(env::args_os().skip(1))?;
    request.run()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClusterAction {
    Setup,
    Start,
    Stop,
}

impl ClusterAction {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => bail!("unknown cluster action '{other}'; expected setup, start or stop"),
        }
    }
}

impl fmt::Display for ClusterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

#[derive(Debug)]
struct WorkerRequest {
    action: ClusterAction,
    payload_path: PathBuf,
}

impl WorkerRequest {
    fn from_args(mut args: impl Iterator<Item = OsString>) -> Result<Self> {
        let action = args
            .next()
            .ok_or_else(|| eyre!("missing cluster action"))?;
        let action = ClusterAction::parse(&action.to_string_lossy())?;
        let payload_path = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("missing payload path"))?;
        if let Some(extra) = args.next() {
            bail!("unexpected argument {}", extra.to_string_lossy());
        }
        Ok(Self {
            action,
            payload_path,
        })
    }

    fn run(self) -> Result<()> {
        let payload = read_payload(&self.payload_path)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| Report::new(err).wrap_err("invalid postgres settings in payload"))?;
        for (key, value) in payload.environment {
            // SAFETY: no other threads exist yet; the runtime is built below.
            match value {
                Some(value) => unsafe { env::set_var(&key, value.expose()) },
                None => unsafe { env::remove_var(&key) },
            }
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("failed to build worker runtime")?;
        let mut cluster = PostgreSQL::new(settings);
        let action = self.action;
        runtime
            .block_on(async move {
                match action {
                    ClusterAction::Setup => cluster.setup().await,
                    ClusterAction::Start => cluster.start().await,
                    ClusterAction::Stop => cluster.stop().await,
                }
            })
            .with_context(|| format!("cluster {action} failed"))
    }
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse payload {}", path.display()))
}
