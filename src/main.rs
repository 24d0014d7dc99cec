use log::{error, info};

use site_interactions::{config, Site};

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting site interactions");
    match Site::mount() {
        Ok(site) => site.forget(),
        Err(e) => error!("Failed to mount site interactions: {}", e),
    }
}
