mod anim;
mod app;
mod behavior;
mod click;
mod config;
mod controller;
mod ecs;
mod mouse;
mod pet;
mod platform;
mod snapshot;
mod util;
mod world;

fn main() {
    env_logger::init();
    log::info!("DeskPet starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
