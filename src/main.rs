use img_fixer::{
    common::errors::handle_error,
    config::FixerConfig,
    workflow::{processors::setup::initialize_logger, run},
};

fn main() {
    initialize_logger();

    if let Err(err) = FixerConfig::from_working_dir().and_then(|config| run(&config)) {
        handle_error(err.context("Aborted before any file was processed"));
    }
}
