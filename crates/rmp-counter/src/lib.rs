pub mod database;
pub mod error;
pub mod logging;
pub mod model;
pub mod state;
pub mod tags;
pub mod view_model;

pub use crate::{
    error::CoreError,
    state::{ReadState, StateHolder, Subscription},
    view_model::{NativeModel, ViewModel},
};

use crate::{error::core_error, model::Model};
use anyhow::Context;
use log::debug;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;

uniffi::setup_scaffolding!();

/// Requests sent from the frontend to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Action {
    Increment,
    Decrement,
}

/// State changes sent from the model to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ModelUpdate {
    CountChanged { count: i32 },
}

/// Options for constructing an [`RmpModel`].
#[derive(Debug, Clone, uniffi::Record)]
pub struct CoreOptions {
    /// Whether to install the platform logger. Frontends with their own
    /// logger pass false.
    pub init_logging: bool,
    /// Keep state in memory only, without touching the data directory.
    pub in_memory: bool,
}

impl Default for CoreOptions {
    fn default() -> Self {
        Self {
            init_logging: true,
            in_memory: false,
        }
    }
}

/// Foreign trait implemented by frontends for receiving model updates.
#[uniffi::export(with_foreign)]
pub trait RmpViewModel: Send + Sync {
    fn model_update(&self, model_update: ModelUpdate);
}

/// Source of truth for application state.
///
/// Created by the frontend with a data directory. Updates are delivered on a
/// dedicated thread once a listener registers.
///
/// The delivery thread holds the listener until [`RmpModel::stop_listening`]
/// is called or the model is dropped. A foreign listener that also owns its
/// model must call `stop_listening` when it is torn down (`onCleared` on
/// Android), otherwise neither is ever released.
#[derive(Debug, uniffi::Object)]
pub struct RmpModel {
    data_dir: String,
    model: Mutex<Model>,
    /// `None` once stopped.
    update_tx: Mutex<Option<mpsc::UnboundedSender<ModelUpdate>>>,
    update_rx: Mutex<Option<mpsc::UnboundedReceiver<ModelUpdate>>>,
}

#[uniffi::export]
impl RmpModel {
    #[uniffi::constructor]
    pub fn new(data_dir: String) -> Result<Arc<Self>, CoreError> {
        Self::with_options(data_dir, CoreOptions::default())
    }

    #[uniffi::constructor]
    pub fn with_options(data_dir: String, options: CoreOptions) -> Result<Arc<Self>, CoreError> {
        if options.init_logging {
            logging::init_logging();
        }

        debug!("core: opening model in {data_dir}");

        let model = Model::open(Path::new(&data_dir), options.in_memory)
            .with_context(|| format!("failed to open model in {data_dir}"))?;

        let (update_tx, update_rx) = mpsc::unbounded_channel();

        Ok(Arc::new(Self {
            data_dir,
            model: Mutex::new(model),
            update_tx: Mutex::new(Some(update_tx)),
            update_rx: Mutex::new(Some(update_rx)),
        }))
    }

    pub fn action(&self, action: Action) {
        let mut model = self.model.lock().unwrap();
        let update = model.apply(action);

        // queued while holding the lock so delivery order matches state order
        let sent = match &*self.update_tx.lock().unwrap() {
            Some(update_tx) => update_tx.send(update).is_ok(),
            None => false,
        };
        if !sent {
            debug!("core: update dropped, not delivering updates");
        }
    }

    /// Registers the listener and starts delivering updates to it.
    ///
    /// Updates produced before this call are discarded, since
    /// [`RmpModel::get_count`] already reflects them. Only one listener can
    /// ever be registered per model.
    pub fn listen_for_model_updates(&self, updater: Arc<dyn RmpViewModel>) -> Result<(), CoreError> {
        // no action can slip in between draining and starting delivery
        let _model = self.model.lock().unwrap();

        let mut update_rx = self
            .update_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| core_error!("already listening for model updates"))?;

        let mut stale = 0;
        while update_rx.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!("core: discarded {stale} updates queued before listening");
        }

        std::thread::Builder::new()
            .name("model-updates".to_string())
            .spawn(move || {
                debug!("core: delivering model updates");

                while let Some(update) = update_rx.blocking_recv() {
                    updater.model_update(update);
                }

                debug!("core: update channel closed");
            })
            .context("failed to spawn update thread")?;

        Ok(())
    }

    /// Stops delivering updates and releases the listener.
    ///
    /// Updates already queued are still delivered, then the delivery thread
    /// exits. Actions keep working but no longer produce updates. Calling it
    /// again is a no-op.
    pub fn stop_listening(&self) {
        if self.update_tx.lock().unwrap().take().is_some() {
            debug!("core: stopped listening for model updates");
        }
    }

    pub fn get_count(&self) -> i32 {
        self.model.lock().unwrap().count()
    }

    pub fn data_dir(&self) -> String {
        self.data_dir.clone()
    }

    pub fn setup_logging(&self) {
        logging::init_logging();
    }
}

impl NativeModel for RmpModel {
    fn create(data_dir: String) -> Result<Arc<Self>, CoreError> {
        RmpModel::new(data_dir)
    }

    fn action(&self, action: Action) {
        RmpModel::action(self, action)
    }

    fn listen_for_model_updates(&self, updater: Arc<dyn RmpViewModel>) -> Result<(), CoreError> {
        RmpModel::listen_for_model_updates(self, updater)
    }

    fn get_count(&self) -> i32 {
        RmpModel::get_count(self)
    }

    fn stop_listening(&self) {
        RmpModel::stop_listening(self)
    }
}

/// Default data directory for desktop frontends.
pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let project_dirs = directories_next::ProjectDirs::from("", "", "rmp-counter")
        .context("failed to get project directories")?;
    Ok(project_dirs.data_local_dir().to_path_buf())
}
