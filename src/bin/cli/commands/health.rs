//! Health command handler

use ecoverse_probe::probe::{wait_for_backend, ReadinessPolicy};
use ecoverse_probe::{EcoverseApi, EcoverseApiClient, ProbeConfig, ProbeResult};

pub async fn handle_health_command(wait: bool, config: &ProbeConfig) -> ProbeResult<()> {
    config.validate()?;
    let client = EcoverseApiClient::new(config.endpoint.clone().into())?;
    println!("Checking backend health at {}health ...", client.base_url());

    if wait {
        let policy = ReadinessPolicy::from(&config.readiness);
        match wait_for_backend(&client, &policy).await {
            Ok(attempts) => {
                println!("  ✓ Backend is healthy after {} attempt(s)", attempts);
                Ok(())
            }
            Err(e) => {
                println!("  ✗ {}", e);
                Err(e)
            }
        }
    } else {
        match client.health_check().await {
            Ok(()) => {
                println!("  ✓ Backend is healthy");
                Ok(())
            }
            Err(e) => {
                println!("  ✗ Backend health check failed: {}", e);
                Err(e)
            }
        }
    }
}
