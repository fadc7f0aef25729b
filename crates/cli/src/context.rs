//! # Command context
//!
//! Everything one command invocation shares: settings, console, registries
//! and the driver. The driver is built on first use and cached, so a
//! command never constructs more than one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dbforge_codegen::GeneratorRegistry;
use dbforge_core::{ForgeError, ForgeResult};
use dbforge_driver::{
    ConnectionConfig, Driver, DriverFactory, InputInterface, OutputInterface, SeedRegistry,
};
use tracing::debug;

use crate::adapter::{InputAdapter, OutputAdapter};
use crate::console::{Input, Output};
use crate::settings::Settings;

pub struct CommandContext {
    settings: Settings,
    input: Arc<Input>,
    output: Arc<Output>,
    working_dir: PathBuf,
    factory: DriverFactory,
    seeds: SeedRegistry,
    generators: GeneratorRegistry,
    dry_run: bool,
    password: Option<String>,
    driver: Option<Box<dyn Driver>>,
}

impl CommandContext {
    pub fn new(settings: Settings, input: Arc<Input>, output: Arc<Output>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            input,
            output,
            working_dir: working_dir.into(),
            factory: DriverFactory::with_builtins(),
            seeds: SeedRegistry::new(),
            generators: GeneratorRegistry::with_builtins(),
            dry_run: false,
            password: None,
            driver: None,
        }
    }

    pub fn with_factory(mut self, factory: DriverFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_seeds(mut self, seeds: SeedRegistry) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_generators(mut self, generators: GeneratorRegistry) -> Self {
        self.generators = generators;
        self
    }

    /// Print statements instead of running them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Password that replaces the configured one
    pub fn password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &Arc<Input> {
        &self.input
    }

    pub fn output(&self) -> &Arc<Output> {
        &self.output
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn seeds(&self) -> &SeedRegistry {
        &self.seeds
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Resolve a possibly relative path against the working directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.working_dir.join(path)
    }

    // ====================================================================
    // Driver
    // ====================================================================

    pub fn connection_config(&self) -> ForgeResult<ConnectionConfig> {
        self.settings
            .connection_config(self.dry_run, self.password.as_deref())
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// The driver for this invocation, built on the first call
    pub fn driver(&mut self) -> ForgeResult<&mut dyn Driver> {
        if self.driver.is_none() {
            let config = self.connection_config()?;
            let input: Arc<dyn InputInterface> = Arc::new(InputAdapter::new(self.input.clone()));
            let output: Arc<dyn OutputInterface> = Arc::new(OutputAdapter::new(self.output.clone()));
            let driver = self.factory.build(config, input, output)?;
            debug!(driver = %driver.describe(), "Driver ready");
            self.driver = Some(driver);
        }

        match self.driver.as_deref_mut() {
            Some(driver) => Ok(driver),
            None => Err(ForgeError::internal("driver was not built")),
        }
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("settings", &self.settings)
            .field("working_dir", &self.working_dir)
            .field("dry_run", &self.dry_run)
            .field("driver", &self.driver.as_ref().map(|d| d.describe()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbforge_driver::testing::{MemoryDriver, MemoryHandle};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context(factory: DriverFactory) -> CommandContext {
        let mut settings = Settings::default();
        settings.database.kind = "memory".into();
        settings.database.database = "app".into();
        let output = Arc::new(Output::buffered().0);
        CommandContext::new(settings, Arc::new(Input::new(["db:seed"])), output, ".")
            .with_factory(factory)
    }

    #[test]
    fn test_driver_is_built_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let handle = MemoryHandle::default();
        let mut factory = DriverFactory::with_builtins();
        {
            let built = built.clone();
            let handle = handle.clone();
            factory.register_adapter(MemoryDriver::NAME, move |config| {
                built.fetch_add(1, Ordering::SeqCst);
                Box::new(MemoryDriver::with_handle(config, handle.clone()))
            });
        }

        let mut ctx = context(factory);
        assert!(!ctx.has_driver());
        assert_eq!(ctx.driver().unwrap().describe(), "timed(memory)");
        ctx.driver().unwrap();
        assert!(ctx.has_driver());
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prefix_wrapper_applied_from_settings() {
        let mut factory = DriverFactory::with_builtins();
        factory.register_adapter(MemoryDriver::NAME, |config| Box::new(MemoryDriver::new(config)));

        let mut ctx = context(factory);
        ctx.settings.database.prefix = "app_".into();
        let driver = ctx.driver().unwrap();
        assert_eq!(driver.describe(), "prefix(timed(memory))");
        assert_eq!(driver.config().default_migration_table, "app_migrations");
    }

    #[test]
    fn test_unknown_adapter() {
        let mut ctx = context(DriverFactory::with_builtins());
        let err = ctx.driver().err().unwrap();
        assert_eq!(err.to_string(), "Adapter \"memory\" has not been registered");
        assert!(!ctx.has_driver());
    }
}
