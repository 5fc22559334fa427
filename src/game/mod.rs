pub mod achievement_tracker;
pub mod catalog_provider;
pub mod game_engine;
pub mod game_state;
pub mod modes;
pub mod progression;
pub mod scheduler;
pub mod scoring;
pub mod settings;
pub mod stats_manager;
pub mod word_selector;

pub use catalog_provider::{JsonFileCatalogProvider, StaticCatalogProvider, WordCatalogProvider};
pub use game_engine::GameEngine;

#[cfg(test)]
pub mod tests {
    use std::sync::Once;
    use test_context::TestContext;

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger;

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });

            UsingLogger
        }
    }
}
