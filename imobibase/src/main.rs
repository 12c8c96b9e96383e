use clap::Parser;
use color_eyre::eyre;
use imobibase::consts::VERSION;
use imobibase_config::Configuration;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// imobibase CRM server
#[derive(Parser)]
#[command(about, author, version = VERSION)]
struct Args {
    /// Path to the configuration file
    #[clap(long, short)]
    config: PathBuf,
}

async fn boot() -> eyre::Result<()> {
    let args = Args::parse();
    let config = Configuration::load(args.config).await?;
    imobibase::observability::initialise()?;

    let state = imobibase::initialise_state(&config)?;
    imobibase::http::run(state, config).await?;

    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024) // Set the stack size to 4MiB
        .build()?;

    runtime.block_on(boot())
}
