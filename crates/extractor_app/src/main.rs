use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use extractor_app::platform::{
    bootstrap, logging, render, AppConfig, Cli, Command, JobController, TerminalHost,
};
use extractor_core::{AppViewModel, Msg, PhaseKind, UrlMode};
use extractor_engine::{LocalStore, ReqwestBackend, SettingsStore};
use log::LevelFilter;

/// Upper bound on how long one run keeps tracking a job.
const MAX_TRACKING: Duration = Duration::from_secs(6 * 60 * 60);

fn main() -> anyhow::Result<ExitCode> {
    let invocation = Cli::parse().into_invocation();
    let config = invocation.config;

    logging::initialize(config.log_destination, LevelFilter::Info, &config.state_dir);
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    if invocation.command == Command::Check {
        return check_backend(&config, &runtime);
    }

    let tab_url = match &invocation.command {
        Command::Tab { url } => Some(url.clone()),
        _ => None,
    };
    let host = Arc::new(TerminalHost::new(tab_url));
    let mut controller = bootstrap(&config, runtime.handle().clone(), host)?;

    let view = controller.attach();
    print_view(&view);
    if let Some(quality) = invocation.quality {
        controller.dispatch(Msg::QualitySelected(quality));
    }

    match invocation.command {
        Command::Submit { url } => {
            controller.dispatch(Msg::ModeSelected(UrlMode::Manual));
            controller.dispatch(Msg::ManualInputChanged(url));
            submit(&mut controller);
        }
        Command::Tab { .. } => {
            controller.dispatch(Msg::ModeSelected(UrlMode::ActiveTab));
            submit(&mut controller);
        }
        Command::Resume => {
            if view.active_job.is_none() {
                println!("No extraction in progress.");
                controller.detach();
                return Ok(ExitCode::SUCCESS);
            }
        }
        Command::Check => {}
    }

    let finished = controller.run_until(
        MAX_TRACKING,
        |view| !matches!(view.phase, PhaseKind::Submitting | PhaseKind::Active),
        print_view,
    );
    let view = controller.view();
    if view.download_enabled {
        controller.dispatch(Msg::DownloadClicked);
    }
    controller.detach();

    if !finished {
        eprintln!("Still running; use `resume` to keep tracking.");
        return Ok(ExitCode::from(1));
    }
    Ok(match view.phase {
        PhaseKind::Completed => ExitCode::SUCCESS,
        _ => ExitCode::from(1),
    })
}

fn submit(controller: &mut JobController) {
    if let Some(view) = controller.dispatch(Msg::SubmitClicked) {
        print_view(&view);
    }
}

fn print_view(view: &AppViewModel) {
    for line in render::render(view) {
        println!("{line}");
    }
}

fn check_backend(config: &AppConfig, runtime: &tokio::runtime::Runtime) -> anyhow::Result<ExitCode> {
    let settings = SettingsStore::new(LocalStore::new(config.state_dir.clone()));
    let stored_api_url = settings.api_url().context("reading api url")?;
    let backend = ReqwestBackend::new(config.backend_settings(stored_api_url))
        .context("building backend client")?;

    match runtime.block_on(backend.server_info()) {
        Ok(info) => {
            println!(
                "{} at {}: {} (version {})",
                info.message,
                backend.base_url(),
                info.status,
                info.version
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Backend at {} is not reachable: {err}", backend.base_url());
            Ok(ExitCode::from(1))
        }
    }
}
