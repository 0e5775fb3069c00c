use filedrop_core::Config;
use filedrop_infra::LogFormat;

// mimalloc keeps fragmentation low on musl-based container images
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    filedrop_infra::init_telemetry("filedrop-api", LogFormat::parse(&config.base.log_format))?;

    let (_state, router) = filedrop_api::setup::initialize_app(&config).await?;

    filedrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
