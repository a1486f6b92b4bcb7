/// Meters as kilometers with exactly one decimal digit.
///
/// Rounds half up (`50 m -> "0.1"`) and always uses `.` as the separator.
pub fn format_kilometers(meters: f32) -> String {
    let tenths = (f64::from(meters) / 100.0).round();
    if tenths == 0.0 {
        return "0.0".to_string();
    }
    format!("{:.1}", tenths / 10.0)
}
