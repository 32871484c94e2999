//! Terminal dashboard that redraws the latest readings on a fixed interval
use city_weather::{dashboard, Settings};
use clap::{Arg, ArgAction, Command};
use log::error;

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("Weather dashboard")
        .version("0.1.0")
        .about("Real-time weather dashboard over the local store")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .action(ArgAction::SetTrue)
                .help("Draws a single frame and exits"),
        )
        .get_matches();

    let config = matches.get_one::<String>("config").map(String::as_str);
    let settings = match Settings::new(config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error while reading settings: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dashboard::run(&settings, matches.get_flag("once")) {
        error!("{}", e);
        std::process::exit(1);
    }
}
