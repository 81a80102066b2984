use lorry::{config::AppConfig, LorryApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    log::info!(
        "Truck model: {}, wheel model: {}",
        config.truck_model_path.display(),
        config.wheel_model_path.display()
    );

    if let Err(err) = LorryApp::run(config) {
        log::error!("{err:#}");
        return Err(err);
    }
    Ok(())
}
