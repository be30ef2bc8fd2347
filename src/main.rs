mod app;
mod audio;
mod config;
mod gesture;
mod library;
mod mpris;
mod playlist;
mod runtime;
mod store;
mod timer;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
