//! Main application entry point (native).
//!
//! ```text
//! typefield [--config config.json] [--shortcuts] [script.json]
//! ```

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Typefield");

    if let Err(err) = run() {
        eprintln!("typefield: {err}");
        std::process::exit(1);
    }
}

#[cfg(feature = "native")]
fn run() -> Result<(), typefield_app::AppError> {
    use std::path::PathBuf;
    use typefield_app::{App, AppConfig, AppError, Script, ShortcutRegistry};

    let mut config_path: Option<PathBuf> = None;
    let mut script_path: Option<PathBuf> = None;
    let mut shortcuts = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| AppError::Config("--config needs a path".into()))?;
                config_path = Some(PathBuf::from(path));
            }
            "--shortcuts" => shortcuts = true,
            _ => script_path = Some(PathBuf::from(arg)),
        }
    }

    if shortcuts {
        ShortcutRegistry::print_all();
        return Ok(());
    }
    let Some(script_path) = script_path else {
        println!("Usage: typefield [--config config.json] [--shortcuts] <script.json>");
        return Ok(());
    };

    let config = match config_path {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    let script = Script::load(&script_path)?;
    let mut app = App::from_config(&config, Box::new(script.assistant()))?;

    let summary = pollster::block_on(async {
        if config.restore_last_session {
            app.restore_session().await?;
        }
        app.replay(&script).await
    })?;
    println!("{summary}");
    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
