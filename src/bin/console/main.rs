//! saavy-console - eight detuned voices through the mixing console
//!
//! Run with: RUST_LOG=info cargo run --bin saavy-console

mod app;
mod voice;

use app::ConsoleApp;
use saavy_console::{Bus, FxParameter};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ConsoleApp::new()
        .voices(8)
        .cores(2)
        .send(Bus::Chorus, 40)
        .send(Bus::PlateReverb, 30)
        .fx_return(Bus::Chorus, 80)
        .fx_return(Bus::PlateReverb, 70)
        .parameter(FxParameter::PlateReverbSize, 80)
        .run()
}
