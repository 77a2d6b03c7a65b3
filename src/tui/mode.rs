// state local to tui: the simulated compass the arrow keys steer.
// `orientation_on` is synced from DisplayState each loop
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub sim_heading: f64, // 0..360
    pub sim_tilt: f64,    // -180..180
    pub orientation_on: bool,
}

impl TuiState {
    pub fn turn(&mut self, delta: f64) {
        self.sim_heading = (self.sim_heading + delta).rem_euclid(360.0);
    }

    pub fn tilt(&mut self, delta: f64) {
        self.sim_tilt = (self.sim_tilt + delta).clamp(-180.0, 180.0);
    }
}
