use crate::{ChildProcess, ControlResult, ControlServer, InstanceLock, shutdown_signal};

use std::future::Future;

use log::{error, info};
use wp_config::{ConfigStore, ControlConfig, SupervisorSettings, WallpaperDefaults, store_port};

/// Brings up the control server for one wallpaper feature and keeps it
/// alive until it is stopped.
pub struct Supervisor<S: ConfigStore> {
    store: S,
    defaults: WallpaperDefaults,
    control: ControlConfig,
}

impl<S: ConfigStore> Supervisor<S> {
    pub fn new(store: S, defaults: WallpaperDefaults, control: ControlConfig) -> Self {
        Self {
            store,
            defaults,
            control,
        }
    }

    /// Run until a `stop` request or a termination signal.
    ///
    /// Signal handlers are in place before anything is bound or spawned.
    pub async fn run(&self) -> ControlResult<()> {
        let shutdown = shutdown_signal();
        self.run_until(shutdown).await
    }

    /// Boot sequence:
    /// 1. Load `command`, `startNow` and `singleInstance`
    /// 2. Take the instance lock when `singleInstance` is set
    /// 3. Bind the control server on an ephemeral port
    /// 4. Persist the port
    /// 5. Start the child when `startNow` is set
    /// 6. Serve until stopped or `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> ControlResult<()>
    where
        F: Future<Output = ()>,
    {
        let name = self.defaults.name;
        let settings = SupervisorSettings::load(&self.store, &self.defaults)?;

        // Held until this function returns.
        let _lock = if settings.single_instance {
            Some(InstanceLock::acquire(
                &self.control.lock_dir(),
                self.defaults.lock_name,
            )?)
        } else {
            None
        };

        let child = ChildProcess::new(settings.command.clone(), self.control.stop_grace());
        let mut server =
            ControlServer::bind(&self.control.host, child, self.control.request_timeout()).await?;
        let port = server.port();

        store_port(&self.store, port)?;
        info!("{name} server on port {port}, command: {}", settings.command);

        if settings.start_now {
            if let Err(e) = server.start_child().await {
                error!("{name}: failed to start wallpaper at boot: {e}");
                return Err(e);
            }
        } else {
            info!("{name}: startNow is off, waiting for a start request");
        }

        server.serve_until(shutdown).await
    }
}
