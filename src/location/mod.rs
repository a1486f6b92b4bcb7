use thiserror::Error;

use crate::geometry::LatLng;

/// Transient notice shown when the user refuses location access.
pub const PERMISSION_DENIED_NOTICE: &str = "Location permission was denied.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationPermission {
    #[default]
    Unknown,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationPriority {
    #[default]
    HighAccuracy,
    Balanced,
    LowPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocationRequest {
    pub priority: LocationPriority,
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission has not been granted")]
    PermissionNotGranted,
    #[error("location provider failed: {message}")]
    Provider { message: String },
}

pub type LocationResult<T> = std::result::Result<T, LocationError>;

/// Source of location fixes. Fixes themselves are delivered to
/// [`LocationTracker::record_fix`] by whoever owns the provider.
pub trait LocationProvider {
    fn request_updates(&mut self, request: LocationRequest) -> LocationResult<()>;
    fn stop_updates(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixKind {
    First,
    Moved,
}

/// Permission state and the most recent fix.
#[derive(Debug, Default)]
pub struct LocationTracker {
    permission: LocationPermission,
    last_fix: Option<LatLng>,
    updates_active: bool,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permission(&self) -> LocationPermission {
        self.permission
    }

    pub fn last_fix(&self) -> Option<LatLng> {
        self.last_fix
    }

    pub fn updates_active(&self) -> bool {
        self.updates_active
    }

    pub fn set_permission(&mut self, granted: bool) -> LocationPermission {
        self.permission = if granted {
            LocationPermission::Granted
        } else {
            LocationPermission::Denied
        };
        tracing::info!(permission = ?self.permission, "location permission updated");
        self.permission
    }

    /// Starts high-accuracy updates once permission is granted. Calling it
    /// again while updates are running is a no-op.
    pub fn start_updates(&mut self, provider: &mut dyn LocationProvider) -> LocationResult<()> {
        if self.permission != LocationPermission::Granted {
            return Err(LocationError::PermissionNotGranted);
        }
        if self.updates_active {
            return Ok(());
        }
        provider.request_updates(LocationRequest::default())?;
        self.updates_active = true;
        tracing::debug!("location updates requested");
        Ok(())
    }

    pub fn stop_updates(&mut self, provider: &mut dyn LocationProvider) {
        if self.updates_active {
            provider.stop_updates();
            self.updates_active = false;
        }
    }

    pub fn record_fix(&mut self, fix: LatLng) -> FixKind {
        let kind = if self.last_fix.is_some() {
            FixKind::Moved
        } else {
            FixKind::First
        };
        self.last_fix = Some(fix);
        tracing::trace!(latitude = fix.latitude, longitude = fix.longitude, ?kind, "location fix");
        kind
    }
}
