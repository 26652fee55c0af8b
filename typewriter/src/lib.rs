//! typewriter crate root
//!
//! Front-end pieces around `typewriter-core`: the [`Desk`] that executes the
//! machine's effects, the desk configuration, terminal rendering and the
//! REPL command language used by the `typewriter` binary.

pub mod config;
pub mod console;
pub mod desk;
pub mod repl;

pub use config::{DeskConfig, StorageConfig, StoreBackend};
pub use console::{render_sheet, ConsoleSink};
pub use desk::Desk;
pub use repl::{parse_line, Command, Line};

use tracing::info;
use typewriter_core::{Exporter, FeedbackSink};

/// Build a desk from configuration: open the store, pick theme and ink.
pub fn open_desk<S: FeedbackSink>(config: DeskConfig, sink: S) -> anyhow::Result<Desk<S>> {
    let store = config.storage.open()?;
    info!(backend = store.backend_name(), "letter store ready");
    let exporter = Exporter::new(config.export_dir.clone());

    let mut desk = Desk::new(config.base, store, exporter, sink);
    desk.set_theme(&config.theme);
    desk.set_ink(config.ink);
    Ok(desk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typewriter_core::{Feedback, InkColor};

    #[test]
    fn open_desk_applies_theme_and_ink() {
        let config = DeskConfig {
            theme: "vintage".into(),
            ink: InkColor::Green,
            ..DeskConfig::default()
        };
        let desk = open_desk(config, Vec::<Feedback>::new()).unwrap();
        assert_eq!(desk.theme().name, "vintage");
        assert_eq!(desk.ink(), InkColor::Green);
        assert_eq!(desk.store().backend_name(), "memory");
    }
}
