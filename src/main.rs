use anyhow::Context;
use tradevo::ConfigStore;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = ConfigStore::default();
    let config = store.get().context("failed to load configuration")?;
    let report = config.validation();

    for section in report.sections() {
        log::info!(
            "{}: {}",
            section.section(),
            if section.is_valid() { "ready" } else { "not ready" }
        );
    }
    for section in report.unready_sections() {
        log::warn!("Running without {}", section);
    }
    if !config.telegram().is_configured() {
        log::info!("Telegram notifications disabled");
    }
    log::info!("Exchanges with credentials: {:?}", config.exchanges().configured());

    report.startup_check().context("configuration is invalid")?;
    Ok(())
}
