//! What the map shows: pin text, the info window, and the layer that keeps
//! marker pins in step with the workflow's marker list.

use crate::geodesy::geodesic_distance;
use crate::geometry::{CameraTarget, LatLng};
use crate::marker::MarkerRecord;
use crate::workflow::format_kilometers;

pub const MARKER_TITLE: &str = "Marker";
pub const USER_LOCATION_TITLE: &str = "Current location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PinSpec {
    pub position: LatLng,
    pub title: String,
    pub snippet: Option<String>,
}

/// The map widget, supplied by whatever toolkit hosts the app.
pub trait MapSurface {
    /// Places a pin; `None` when the surface refused it.
    fn add_pin(&mut self, pin: &PinSpec) -> Option<PinId>;
    fn move_pin(&mut self, id: PinId, position: LatLng);
    fn remove_pin(&mut self, id: PinId);
    fn show_info_window(&mut self, id: PinId);
    fn move_camera(&mut self, target: CameraTarget);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoWindow {
    pub title: String,
    pub snippet: String,
}

/// Coordinate with at most six fraction digits and no trailing zeros.
pub fn format_coordinate(value: f64) -> String {
    let fixed = format!("{value:.6}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn coordinate_line(position: LatLng) -> String {
    format!(
        "Latitude: {}, Longitude: {}",
        format_coordinate(position.latitude),
        format_coordinate(position.longitude)
    )
}

pub fn marker_snippet(record: &MarkerRecord) -> String {
    format!(
        "{}\nDistance: {} km",
        coordinate_line(record.position()),
        format_kilometers(record.distance_meters)
    )
}

/// Info window contents, with the distance measured from where the user is
/// now rather than where they were when the marker was placed.
pub fn info_window(position: LatLng, user_location: Option<LatLng>) -> InfoWindow {
    let distance = user_location
        .map(|user| format_kilometers(geodesic_distance(user, position)))
        .unwrap_or_else(|| "-".to_string());
    InfoWindow {
        title: MARKER_TITLE.to_string(),
        snippet: format!("{}\nDistance: {distance} km", coordinate_line(position)),
    }
}

pub fn marker_pin(record: &MarkerRecord) -> PinSpec {
    PinSpec {
        position: record.position(),
        title: MARKER_TITLE.to_string(),
        snippet: Some(marker_snippet(record)),
    }
}

/// Pins owned by the app on a [`MapSurface`].
#[derive(Debug, Default)]
pub struct MarkerLayer {
    marker_pins: Vec<PinId>,
    user_pin: Option<PinId>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_pin_count(&self) -> usize {
        self.marker_pins.len()
    }

    /// Replaces every marker pin with one per record. The user pin stays.
    pub fn render_markers(&mut self, surface: &mut dyn MapSurface, records: &[MarkerRecord]) {
        for id in self.marker_pins.drain(..) {
            surface.remove_pin(id);
        }
        self.marker_pins = records
            .iter()
            .filter_map(|record| surface.add_pin(&marker_pin(record)))
            .collect();
        tracing::debug!(pins = self.marker_pins.len(), "rendered marker pins");
    }

    pub fn show_latest_info_window(&self, surface: &mut dyn MapSurface) {
        if let Some(id) = self.marker_pins.last() {
            surface.show_info_window(*id);
        }
    }

    pub fn place_user_pin(&mut self, surface: &mut dyn MapSurface, position: LatLng) {
        match self.user_pin {
            Some(id) => surface.move_pin(id, position),
            None => {
                self.user_pin = surface.add_pin(&PinSpec {
                    position,
                    title: USER_LOCATION_TITLE.to_string(),
                    snippet: None,
                });
            }
        }
    }
}

/// A [`MapSurface`] together with the pins the app placed on it.
#[derive(Debug)]
pub struct MapView<S> {
    surface: S,
    layer: MarkerLayer,
}

impl<S: MapSurface> MapView<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            layer: MarkerLayer::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn layer(&self) -> &MarkerLayer {
        &self.layer
    }

    pub fn render_markers(&mut self, records: &[MarkerRecord]) {
        self.layer.render_markers(&mut self.surface, records);
    }

    pub fn show_latest_info_window(&mut self) {
        self.layer.show_latest_info_window(&mut self.surface);
    }

    pub fn place_user_pin(&mut self, position: LatLng) {
        self.layer.place_user_pin(&mut self.surface, position);
    }

    pub fn move_camera(&mut self, target: CameraTarget) {
        self.surface.move_camera(target);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum SurfaceCall {
        Add(PinId, PinSpec),
        Move(PinId, LatLng),
        Remove(PinId),
        ShowInfo(PinId),
        Camera(CameraTarget),
    }

    /// Map surface that records every call and tracks live pins.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) calls: Vec<SurfaceCall>,
        pub(crate) pins: Vec<(PinId, PinSpec)>,
        next_id: u64,
    }

    impl RecordingSurface {
        pub(crate) fn pins_titled(&self, title: &str) -> Vec<&PinSpec> {
            self.pins
                .iter()
                .map(|(_, pin)| pin)
                .filter(|pin| pin.title == title)
                .collect()
        }

        pub(crate) fn cameras(&self) -> Vec<CameraTarget> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    SurfaceCall::Camera(target) => Some(*target),
                    _ => None,
                })
                .collect()
        }
    }

    impl MapSurface for RecordingSurface {
        fn add_pin(&mut self, pin: &PinSpec) -> Option<PinId> {
            let id = PinId(self.next_id);
            self.next_id += 1;
            self.pins.push((id, pin.clone()));
            self.calls.push(SurfaceCall::Add(id, pin.clone()));
            Some(id)
        }

        fn move_pin(&mut self, id: PinId, position: LatLng) {
            if let Some((_, pin)) = self.pins.iter_mut().find(|(pin_id, _)| *pin_id == id) {
                pin.position = position;
            }
            self.calls.push(SurfaceCall::Move(id, position));
        }

        fn remove_pin(&mut self, id: PinId) {
            self.pins.retain(|(pin_id, _)| *pin_id != id);
            self.calls.push(SurfaceCall::Remove(id));
        }

        fn show_info_window(&mut self, id: PinId) {
            self.calls.push(SurfaceCall::ShowInfo(id));
        }

        fn move_camera(&mut self, target: CameraTarget) {
            self.calls.push(SurfaceCall::Camera(target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingSurface, SurfaceCall};
    use super::*;

    #[test]
    fn coordinates_keep_up_to_six_fraction_digits() {
        assert_eq!(format_coordinate(10.0), "10");
        assert_eq!(format_coordinate(-23.5505), "-23.5505");
        assert_eq!(format_coordinate(46.123456789), "46.123457");
        assert_eq!(format_coordinate(-0.0000001), "0");
    }

    #[test]
    fn snippet_lists_coordinates_and_stored_distance() {
        let record = MarkerRecord::new(10.0, 20.5, 1500.0);
        assert_eq!(
            marker_snippet(&record),
            "Latitude: 10, Longitude: 20.5\nDistance: 1.5 km"
        );
    }

    #[test]
    fn info_window_measures_from_current_location() {
        let window = info_window(LatLng::new(0.0, 1.0), Some(LatLng::new(0.0, 0.0)));
        assert_eq!(window.title, MARKER_TITLE);
        assert_eq!(
            window.snippet,
            "Latitude: 0, Longitude: 1\nDistance: 111.3 km"
        );

        let unknown = info_window(LatLng::new(0.0, 1.0), None);
        assert!(unknown.snippet.ends_with("Distance: - km"));
    }

    #[test]
    fn render_replaces_marker_pins_but_keeps_user_pin() {
        let mut view = MapView::new(RecordingSurface::default());
        view.place_user_pin(LatLng::new(0.0, 0.0));
        view.render_markers(&[
            MarkerRecord::new(1.0, 1.0, 0.0),
            MarkerRecord::new(2.0, 2.0, 0.0),
        ]);
        view.render_markers(&[MarkerRecord::new(3.0, 3.0, 0.0)]);

        let markers = view.surface().pins_titled(MARKER_TITLE);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].position, LatLng::new(3.0, 3.0));
        assert_eq!(view.surface().pins_titled(USER_LOCATION_TITLE).len(), 1);
        assert_eq!(view.layer().marker_pin_count(), 1);
    }

    #[test]
    fn user_pin_is_added_once_then_moved() {
        let mut view = MapView::new(RecordingSurface::default());
        view.place_user_pin(LatLng::new(0.0, 0.0));
        view.place_user_pin(LatLng::new(0.5, 0.5));

        let users = view.surface().pins_titled(USER_LOCATION_TITLE);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].position, LatLng::new(0.5, 0.5));
        assert!(view
            .surface()
            .calls
            .iter()
            .any(|call| matches!(call, SurfaceCall::Move(_, _))));
    }

    #[test]
    fn latest_info_window_targets_last_marker_pin() {
        let mut view = MapView::new(RecordingSurface::default());
        view.show_latest_info_window();
        assert!(view.surface().calls.is_empty());

        view.render_markers(&[
            MarkerRecord::new(1.0, 1.0, 0.0),
            MarkerRecord::new(2.0, 2.0, 0.0),
        ]);
        view.show_latest_info_window();
        assert_eq!(
            view.surface().calls.last(),
            Some(&SurfaceCall::ShowInfo(PinId(1)))
        );
    }
}
