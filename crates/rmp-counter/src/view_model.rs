//! Frontend-side adapter between a native model and the presentation layer.

use crate::{
    Action, CoreError, ModelUpdate, RmpModel, RmpViewModel,
    state::{ReadState, StateHolder},
};
use log::debug;
use std::sync::Arc;

/// Capabilities a [`ViewModel`] needs from the model it wraps.
pub trait NativeModel: Send + Sync + 'static {
    /// Constructs the model with its storage location.
    fn create(data_dir: String) -> Result<Arc<Self>, CoreError>
    where
        Self: Sized;

    fn action(&self, action: Action);

    fn listen_for_model_updates(&self, updater: Arc<dyn RmpViewModel>) -> Result<(), CoreError>;

    fn get_count(&self) -> i32;

    /// Stops delivering updates and releases the registered listener.
    fn stop_listening(&self);
}

/// Keeps an observable count in sync with a native model.
///
/// The count is only ever written by updates coming back from the model.
/// [`ViewModel::action`] forwards to the model and leaves the count alone.
///
/// Dropping the ViewModel stops the model's update delivery.
pub struct ViewModel<M: NativeModel = RmpModel> {
    model: Arc<M>,
    updater: Arc<Updater>,
}

/// Listener registered with the native model. Holds the state cell only, so
/// the model never keeps the ViewModel itself alive.
#[derive(Debug)]
struct Updater {
    count: StateHolder<i32>,
}

impl RmpViewModel for Updater {
    fn model_update(&self, model_update: ModelUpdate) {
        match model_update {
            ModelUpdate::CountChanged { count } => self.count.set(count),
        }
    }
}

impl<M: NativeModel> ViewModel<M> {
    /// Creates the native model in `data_dir` and attaches to it.
    pub fn new(data_dir: impl Into<String>) -> Result<Self, CoreError> {
        let model = M::create(data_dir.into())?;
        Self::attach(model)
    }

    /// Attaches to an existing model.
    ///
    /// The count is seeded from the model, then seeded again once the
    /// listener is registered, so an action applied in between is not lost.
    pub fn attach(model: Arc<M>) -> Result<Self, CoreError> {
        let updater = Arc::new(Updater {
            count: StateHolder::new(model.get_count()),
        });
        model.listen_for_model_updates(updater.clone())?;
        updater.count.set(model.get_count());

        debug!("view model: attached with count {}", updater.count.read());

        Ok(Self { model, updater })
    }

    pub fn count(&self) -> ReadState<i32> {
        self.updater.count.read_only()
    }

    pub fn action(&self, action: Action) {
        self.model.action(action);
    }

    pub fn on_update(&self, model_update: ModelUpdate) {
        self.updater.model_update(model_update);
    }

    #[cfg(test)]
    fn model(&self) -> &Arc<M> {
        &self.model
    }
}

impl<M: NativeModel> Drop for ViewModel<M> {
    fn drop(&mut self) {
        self.model.stop_listening();
    }
}

impl<M: NativeModel> std::fmt::Debug for ViewModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("count", &self.updater.count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::core_error;
    use std::sync::Mutex;

    /// Applies actions immediately and emits the new count synchronously.
    struct EchoModel {
        count: Mutex<i32>,
        updater: Mutex<Option<Arc<dyn RmpViewModel>>>,
    }

    impl EchoModel {
        fn starting_at(count: i32) -> Arc<Self> {
            Arc::new(Self {
                count: Mutex::new(count),
                updater: Mutex::new(None),
            })
        }
    }

    impl NativeModel for EchoModel {
        fn create(data_dir: String) -> Result<Arc<Self>, CoreError> {
            if data_dir.is_empty() {
                return Err(core_error!("empty data dir"));
            }
            Ok(Self::starting_at(0))
        }

        fn action(&self, action: Action) {
            let count = {
                let mut count = self.count.lock().unwrap();
                match action {
                    Action::Increment => *count += 1,
                    Action::Decrement => *count -= 1,
                }
                *count
            };
            if let Some(updater) = &*self.updater.lock().unwrap() {
                updater.model_update(ModelUpdate::CountChanged { count });
            }
        }

        fn listen_for_model_updates(
            &self,
            updater: Arc<dyn RmpViewModel>,
        ) -> Result<(), CoreError> {
            *self.updater.lock().unwrap() = Some(updater);
            Ok(())
        }

        fn get_count(&self) -> i32 {
            *self.count.lock().unwrap()
        }

        fn stop_listening(&self) {
            self.updater.lock().unwrap().take();
        }
    }

    /// Accepts actions but never emits an update.
    struct SilentModel {
        actions: Mutex<Vec<Action>>,
        stopped: std::sync::atomic::AtomicBool,
    }

    impl NativeModel for SilentModel {
        fn create(_data_dir: String) -> Result<Arc<Self>, CoreError> {
            Ok(Arc::new(Self {
                actions: Mutex::new(Vec::new()),
                stopped: Default::default(),
            }))
        }

        fn action(&self, action: Action) {
            self.actions.lock().unwrap().push(action);
        }

        fn listen_for_model_updates(
            &self,
            _updater: Arc<dyn RmpViewModel>,
        ) -> Result<(), CoreError> {
            Ok(())
        }

        fn get_count(&self) -> i32 {
            10
        }

        fn stop_listening(&self) {
            self.stopped
                .store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[test]
    fn seeds_count_from_model() {
        let view_model = ViewModel::attach(EchoModel::starting_at(-4)).unwrap();
        assert_eq!(view_model.count().read(), -4);
    }

    #[test]
    fn follows_count_through_scenario() {
        let view_model = ViewModel::<EchoModel>::new("data").unwrap();
        assert_eq!(view_model.count().read(), 0);

        view_model.action(Action::Increment);
        assert_eq!(view_model.count().read(), 1);

        view_model.action(Action::Decrement);
        assert_eq!(view_model.count().read(), 0);

        view_model.action(Action::Decrement);
        assert_eq!(view_model.count().read(), -1);
    }

    #[test]
    fn tracks_model_over_action_sequences() {
        let sequences: &[&[Action]] = &[
            &[Action::Increment; 5],
            &[Action::Decrement; 3],
            &[
                Action::Increment,
                Action::Decrement,
                Action::Decrement,
                Action::Increment,
                Action::Increment,
                Action::Increment,
            ],
        ];

        for sequence in sequences {
            let model = EchoModel::starting_at(0);
            let view_model = ViewModel::attach(model.clone()).unwrap();

            for action in sequence.iter() {
                view_model.action(*action);
                assert_eq!(view_model.count().read(), model.get_count());
            }
        }
    }

    #[test]
    fn observers_see_every_update() {
        let view_model = ViewModel::attach(EchoModel::starting_at(0)).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = view_model.count().subscribe({
            let seen = seen.clone();
            move |count| seen.lock().unwrap().push(*count)
        });

        view_model.action(Action::Increment);
        view_model.action(Action::Increment);
        view_model.action(Action::Decrement);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn action_does_not_touch_count() {
        let view_model = ViewModel::<SilentModel>::new("data").unwrap();

        view_model.action(Action::Increment);
        view_model.action(Action::Increment);

        assert_eq!(view_model.count().read(), 10);
        assert_eq!(
            *view_model.model().actions.lock().unwrap(),
            vec![Action::Increment, Action::Increment]
        );
    }

    #[test]
    fn on_update_writes_count() {
        let view_model = ViewModel::<SilentModel>::new("data").unwrap();

        view_model.on_update(ModelUpdate::CountChanged { count: 99 });

        assert_eq!(view_model.count().read(), 99);
    }

    #[test]
    fn late_observer_reads_current_count() {
        let view_model = ViewModel::attach(EchoModel::starting_at(0)).unwrap();
        view_model.action(Action::Increment);
        view_model.action(Action::Increment);

        let late = view_model.count();

        assert_eq!(late.read(), 2);
    }

    #[test]
    fn drop_stops_model_delivery() {
        let model = EchoModel::starting_at(0);
        let view_model = ViewModel::attach(model.clone()).unwrap();
        assert!(model.updater.lock().unwrap().is_some());

        drop(view_model);

        assert!(model.updater.lock().unwrap().is_none());
    }

    #[test]
    fn drop_stops_silent_model() {
        let model = SilentModel::create(String::new()).unwrap();
        let view_model = ViewModel::attach(model.clone()).unwrap();

        drop(view_model);

        assert!(model.stopped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn propagates_construction_failure() {
        let result = ViewModel::<EchoModel>::new("");
        assert!(result.is_err());
    }
}
