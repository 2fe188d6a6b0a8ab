//! Binary entry point for the `devicefarm` CLI.

mod cli;

use std::env;
use std::io::{self, Write};
use std::process;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use devicefarm::{
    BlobTransfer, ClientError, CommandRunner, ConfigError, DeviceFarm, DeviceFarmConfig, Gateway,
    HttpBlobTransfer, HttpGateway, PollError, PollSettings, PoolSync, ProcessCommandRunner,
    TransportError, git_branch, run_all,
};

use cli::{Cli, DevicesCommand, PoolCommand, PoolsCommand, UploadCommand, WaitCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("uploads did not complete: {0}")]
    Wait(#[from] PollError<TransportError>),
    #[error("pre-upload command `{command}` failed: {message}")]
    Before { command: String, message: String },
    #[error("working directory is not usable: {0}")]
    WorkingDirectory(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

struct App<G, B, R> {
    farm: DeviceFarm<G, B>,
    config: DeviceFarmConfig,
    runner: R,
    workdir: Utf8PathBuf,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = DeviceFarmConfig::load_without_cli_args()?;
    config.validate()?;
    debug!(endpoint = %config.endpoint, "loaded configuration");

    let gateway = HttpGateway::new(
        config.endpoint.clone(),
        config.auth_token.clone(),
        config.http_timeout(),
    )?;
    let blob = HttpBlobTransfer::new(config.http_timeout())?;
    let farm = DeviceFarm::new(gateway, blob).with_poll_settings(config.poll_settings());

    let cwd = env::current_dir().map_err(|err| CliError::WorkingDirectory(err.to_string()))?;
    let workdir = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| CliError::WorkingDirectory(path.display().to_string()))?;

    let app = App {
        farm,
        config,
        runner: ProcessCommandRunner,
        workdir,
    };
    app.dispatch(cli, &mut io::stdout()).await
}

impl<G, B, R> App<G, B, R>
where
    G: Gateway,
    B: BlobTransfer,
    R: CommandRunner,
{
    async fn dispatch(&self, cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
        match cli {
            Cli::Devices(args) => self.devices(&args, out).await,
            Cli::Pools(args) => self.pools(&args, out).await,
            Cli::Pool(args) => self.pool(&args, out).await,
            Cli::Upload(args) => self.upload(&args, out).await,
            Cli::Wait(args) => self.wait(&args, out).await,
        }
    }

    async fn devices(&self, args: &DevicesCommand, out: &mut impl Write) -> Result<(), CliError> {
        let devices = self
            .farm
            .search_devices(&args.query, args.android, args.ios)
            .await?;
        for device in devices {
            writeln!(
                out,
                "{}\t{}\t{}",
                device.arn,
                device.platform.as_str(),
                device.name
            )?;
        }
        Ok(())
    }

    async fn pools(&self, args: &PoolsCommand, out: &mut impl Write) -> Result<(), CliError> {
        let project = self.config.resolve_project(args.project.as_deref())?;
        for pool in self.farm.list_device_pools(&project).await? {
            writeln!(out, "{}\t{}", pool.arn, pool.name)?;
        }
        Ok(())
    }

    async fn pool(&self, args: &PoolCommand, out: &mut impl Write) -> Result<(), CliError> {
        let project = self.config.resolve_project(args.project.as_deref())?;
        let outcome = self
            .farm
            .ensure_device_pool(&project, &args.name, &args.devices)
            .await?;
        let action = match outcome {
            PoolSync::Created(_) => "created",
            PoolSync::Updated(_) => "updated",
            PoolSync::Unchanged(_) => "unchanged",
        };
        writeln!(out, "{action}\t{}", outcome.pool().arn)?;
        Ok(())
    }

    async fn upload(&self, args: &UploadCommand, out: &mut impl Write) -> Result<(), CliError> {
        let project = self.config.resolve_project(args.project.as_deref())?;
        let path = self.workdir.join(&args.file);

        for step in run_all(&self.runner, &self.workdir, &args.before) {
            if let Some(err) = step.error {
                return Err(CliError::Before {
                    command: step.command,
                    message: err.to_string(),
                });
            }
            info!(command = %step.command, "pre-upload command finished");
        }

        let name = args
            .name
            .clone()
            .unwrap_or_else(|| default_upload_name(&self.runner, &self.workdir, &path));
        let job = self
            .farm
            .upload_file(&project, &path, &args.kind, Some(&name))
            .await?;
        writeln!(out, "{}\t{}", job.arn, job.status)?;
        Ok(())
    }

    async fn wait(&self, args: &WaitCommand, out: &mut impl Write) -> Result<(), CliError> {
        let settings = PollSettings::from_millis(
            args.timeout_ms.unwrap_or(self.config.poll_timeout_ms),
            args.interval_ms.unwrap_or(self.config.poll_interval_ms),
        );
        self.farm
            .wait_for_uploads_with(settings, &args.uploads)
            .await?;
        for arn in &args.uploads {
            writeln!(out, "{arn}\tSUCCEEDED")?;
        }
        Ok(())
    }
}

fn default_upload_name<R: CommandRunner>(runner: &R, workdir: &Utf8Path, path: &Utf8Path) -> String {
    let file_name = path.file_name().unwrap_or(path.as_str());
    match git_branch(runner, workdir) {
        Ok(branch) => format!("{branch}-{file_name}"),
        Err(err) => {
            debug!(error = %err, "upload name falls back to the file name");
            file_name.to_owned()
        }
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
