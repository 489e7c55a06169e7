//! Probe run command handler

use ecoverse_probe::config::RunOverrides;
use ecoverse_probe::{
    EcoverseApiClient, OutputFormat, ProbeConfig, ProbeError, ProbeResult, ProbeRunner,
    ProbeSettings, StepId, StepSelection,
};

use crate::RunArgs;

pub async fn handle_run_command(
    args: RunArgs,
    mut config: ProbeConfig,
    format: OutputFormat,
) -> ProbeResult<()> {
    config.apply_run_overrides(RunOverrides {
        base_url: args.base_url,
        auth_token: args.token,
        extended: args.extended,
    });
    config.validate()?;

    // Reject unknown step names before any request is made
    let selection = StepSelection {
        extended: config.probe.extended,
        only: parse_steps(&args.only)?,
        skip: parse_steps(&args.skip)?,
    };

    let client = EcoverseApiClient::new(config.endpoint.clone().into())?;
    let settings = ProbeSettings::from_config(&config).with_selection(selection);
    let runner = ProbeRunner::new(client, settings);

    let report = match runner.run().await {
        Ok(report) => report,
        Err(e @ ProbeError::BackendUnreachable { .. }) => {
            eprintln!("✗ Backend is not reachable. Please start the server.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    println!("{}", format.render(&report)?);
    report.into_result().map(|_| ())
}

fn parse_steps(names: &[String]) -> ProbeResult<Vec<StepId>> {
    names
        .iter()
        .flat_map(|name| name.split(','))
        .filter(|name| !name.trim().is_empty())
        .map(str::parse)
        .collect()
}
