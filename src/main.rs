use anyhow::Result;
use log::info;

use movecast_rs::engine::stream::StreamEngine;
use movecast_rs::scheduler::FragmentScheduler;
use movecast_rs::{arbiter, config, event, net, stdin, transcript};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = config::load().await?;

    let bus = event::EventBus::new();
    event::debug(&bus);

    let (engine, mix_output) = StreamEngine::start();
    let scheduler = FragmentScheduler::new(engine);

    arbiter::init(&bus, scheduler, &config);
    transcript::init(&bus);
    net::init(config.listen_addr.clone(), mix_output);
    stdin::init(&bus, &config);

    info!("movecast ready, type 'help' for commands");

    tokio::signal::ctrl_c().await?;

    Ok(())
}
