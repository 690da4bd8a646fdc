use std::env;
use std::time::Duration;

use switcher_breeze::{AcController, AcMode, HttpGateway, ShutoffOutcome};

#[tokio::main]
async fn main() -> switcher_breeze::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let usage = "usage: control <ip> <device-id> [--http]";
    let ip = args.get(1).expect(usage);
    let device_id = args.get(2).expect(usage);
    let use_http = args.iter().any(|a| a == "--http");

    let mut gateway = HttpGateway::builder(ip, device_id);
    if use_http {
        gateway = gateway.protocol("http");
    }

    let controller = AcController::builder(gateway.build())
        .default_mode(AcMode::Cool)
        .default_temperature(24)
        .on_shutoff(|outcome| match outcome {
            ShutoffOutcome::Completed { status } => {
                println!("Shut-off fired, device OFF (mode {})", status.mode);
            }
            ShutoffOutcome::GatewayFailed { reason, .. } => {
                eprintln!("Shut-off fired but device did not confirm OFF: {reason}");
            }
        })
        .build()?;

    println!("Turning AC on at {ip}...");
    let status = controller.set_power(true, AcMode::Cool, 24).await?;
    println!(
        "On: mode {} at {}\u{00b0}C",
        status.mode, status.temperature
    );

    let status = controller.schedule_shutoff(5).await?;
    println!(
        "Shut-off armed, {} minute(s) remaining",
        status.shutoff_remaining_minutes.unwrap_or(0)
    );

    match controller.refresh_status().await {
        Ok(snapshot) => println!(
            "Device reports: power={} mode={} target={}\u{00b0}C",
            snapshot.power_on, snapshot.mode, snapshot.target_temperature
        ),
        Err(e) => eprintln!("Status poll failed: {e}"),
    }

    // Keep the process alive until the timer fires.
    tokio::time::sleep(Duration::from_secs(6 * 60)).await;
    Ok(())
}
