use fern::colors::{Color, ColoredLevelConfig};
use super::config::Config;

// diagnostic logs go to stderr (and optionally a file), progress lines stay on stdout
pub fn setup_logger(config: &Config) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .debug(Color::Cyan)
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .trace(Color::Magenta);

    let stderr_dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(config.log_level)
        // rusoto and hyper are noisy at debug level
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("rusoto_core", log::LevelFilter::Info)
        .chain(stderr_dispatch);

    if let Some(log_file) = &config.log_file {
        let file_dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::log_file(log_file)?);
        dispatch = dispatch.chain(file_dispatch);
    }

    dispatch.apply()?;
    Ok(())
}
