use rapidfast::prelude::*;

mod app_module;
mod infrastructure;
mod modules;

use app_module::AppModule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    rapidfast::logging::init(&config);

    tracing::info!("Starting {}...", config.app.name);

    let mut app = Application::builder().config(config).build()?;
    app.initialize(&[ClassRef::module::<AppModule>()])?;

    for route in app.routes() {
        tracing::info!("Mapped {{{}, {}}} route", route.path, route.method);
    }

    app.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
