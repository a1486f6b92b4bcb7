/// Lifecycle of the map screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Before the map surface is ready; no map interaction is possible.
    #[default]
    Created,
    /// Map is up and markers are loaded or loading; no location updates.
    MapReady,
    /// Map is up and location updates are flowing.
    Tracking,
}

impl AppState {
    pub const fn accepts_map_input(self) -> bool {
        matches!(self, Self::MapReady | Self::Tracking)
    }
}
