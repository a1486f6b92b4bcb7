//! The map screen: lifecycle, location, marker workflow and map surface wired
//! together behind one event-driven entry point per user or platform event.

use std::cell::{Ref, RefCell, RefMut};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::geometry::{CameraTarget, LatLng};
use crate::location::{LocationProvider, LocationTracker, PERMISSION_DENIED_NOTICE};
use crate::marker::MarkerRecord;
use crate::notification::Notifier;
use crate::presentation::{info_window, InfoWindow, MapSurface, MapView};
use crate::repository::MarkerRepository;
use crate::state::{AppEvent, AppState, StateError, StateMachine};
use crate::storage::{InMemoryMarkerStore, MarkerStore, SqliteMarkerStore};
use crate::workflow::{MarkerWorkflow, PersistenceFailure};

/// Where markers are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    InMemory,
    File(PathBuf),
    /// `database_path` from the config, or the per-user default.
    Configured,
}

pub fn open_marker_store(
    location: &StoreLocation,
    config: &AppConfig,
) -> AppResult<Arc<dyn MarkerStore>> {
    let path = match location {
        StoreLocation::InMemory => {
            tracing::info!("using in-memory marker store");
            return Ok(Arc::new(InMemoryMarkerStore::new()));
        }
        StoreLocation::File(path) => path.clone(),
        StoreLocation::Configured => config.resolve_database_path()?,
    };
    tracing::info!(path = %path.display(), "opening marker database");
    Ok(Arc::new(SqliteMarkerStore::open(&path)?))
}

pub struct App<S, P> {
    machine: StateMachine,
    config: AppConfig,
    workflow: MarkerWorkflow,
    tracker: LocationTracker,
    provider: P,
    notifier: Box<dyn Notifier>,
    map: Rc<RefCell<MapView<S>>>,
}

impl<S, P> App<S, P>
where
    S: MapSurface + 'static,
    P: LocationProvider,
{
    pub fn new(
        config: AppConfig,
        store: Arc<dyn MarkerStore>,
        surface: S,
        provider: P,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let map = Rc::new(RefCell::new(MapView::new(surface)));
        let mut workflow = MarkerWorkflow::new(MarkerRepository::new(store));

        let render_target = Rc::clone(&map);
        workflow.subscribe(move |markers| render_target.borrow_mut().render_markers(markers));

        Self {
            machine: StateMachine::new(),
            config,
            workflow,
            tracker: LocationTracker::new(),
            provider,
            notifier,
            map,
        }
    }

    pub fn state(&self) -> AppState {
        self.machine.state()
    }

    pub fn markers(&self) -> &[MarkerRecord] {
        self.workflow.markers()
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.tracker.last_fix()
    }

    pub fn map(&self) -> Ref<'_, MapView<S>> {
        self.map.borrow()
    }

    pub fn map_mut(&mut self) -> RefMut<'_, MapView<S>> {
        self.map.borrow_mut()
    }

    /// Map surface is up: start accepting input and load saved markers.
    pub fn on_map_ready(&mut self) -> AppResult<()> {
        self.machine.transition(AppEvent::MapReady)?;
        self.workflow.load_markers();
        Ok(())
    }

    pub fn on_permission_result(&mut self, granted: bool) -> AppResult<()> {
        if !self.machine.can_transition(AppEvent::PermissionGranted) {
            return Err(StateError::MapNotReady {
                state: self.machine.state(),
            }
            .into());
        }

        self.tracker.set_permission(granted);
        if granted {
            self.tracker.start_updates(&mut self.provider)?;
            self.machine.transition(AppEvent::PermissionGranted)?;
        } else {
            self.tracker.stop_updates(&mut self.provider);
            self.notifier.notify(PERMISSION_DENIED_NOTICE);
            self.machine.transition(AppEvent::PermissionDenied)?;
        }
        Ok(())
    }

    /// Applies a fix from the location provider. Returns `false` when updates
    /// are not active and the fix was ignored.
    pub fn on_location_update(&mut self, fix: LatLng) -> bool {
        if self.machine.state() != AppState::Tracking {
            tracing::debug!(%fix, "ignoring location fix while not tracking");
            return false;
        }
        self.tracker.record_fix(fix);

        let mut map = self.map.borrow_mut();
        map.place_user_pin(fix);
        if self.config.recenter_on_location_update {
            map.move_camera(CameraTarget::at_default_zoom(fix));
        }
        true
    }

    pub fn on_map_long_press(&mut self, point: LatLng) -> AppResult<MarkerRecord> {
        self.ensure_map_ready()?;
        let record = self
            .workflow
            .record_marker_at(point, self.tracker.last_fix());
        self.map.borrow_mut().show_latest_info_window();
        Ok(record)
    }

    pub fn on_clear_pressed(&mut self) -> AppResult<()> {
        self.ensure_map_ready()?;
        self.workflow.clear_all_markers();
        Ok(())
    }

    pub fn on_center_pressed(&mut self) -> AppResult<Option<CameraTarget>> {
        self.ensure_map_ready()?;
        let target = self.workflow.recenter_on(self.tracker.last_fix());
        if let Some(target) = target {
            self.map.borrow_mut().move_camera(target);
        }
        Ok(target)
    }

    pub fn info_window_at(&self, position: LatLng) -> InfoWindow {
        info_window(position, self.tracker.last_fix())
    }

    /// Applies finished background work; call regularly from the UI loop.
    pub fn pump(&mut self) -> Vec<PersistenceFailure> {
        self.workflow.poll()
    }

    pub fn settle(&mut self) -> Vec<PersistenceFailure> {
        self.workflow.settle()
    }

    pub fn shutdown(&mut self) -> Vec<PersistenceFailure> {
        self.tracker.stop_updates(&mut self.provider);
        let failures = self.workflow.settle();
        tracing::info!(markers = self.workflow.markers().len(), "map screen closed");
        failures
    }

    fn ensure_map_ready(&self) -> AppResult<()> {
        let state = self.machine.state();
        if state.accepts_map_input() {
            Ok(())
        } else {
            Err(StateError::MapNotReady { state }.into())
        }
    }
}
