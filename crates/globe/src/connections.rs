use foundation::math::{Vec3, project};

/// Radius the arc endpoints sit on, just above the ocean surface.
pub const ENDPOINT_RADIUS: f64 = 1.01;

/// One animated city pair, coordinates as `[lon, lat]` degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlowConnection {
    pub label: &'static str,
    pub from: [f64; 2],
    pub to: [f64; 2],
}

impl FlowConnection {
    pub const fn new(label: &'static str, from: [f64; 2], to: [f64; 2]) -> Self {
        Self { label, from, to }
    }

    pub fn endpoints(&self) -> (Vec3, Vec3) {
        (
            project(self.from[0], self.from[1], ENDPOINT_RADIUS),
            project(self.to[0], self.to[1], ENDPOINT_RADIUS),
        )
    }
}

const CONNECTIONS: [FlowConnection; 20] = [
    FlowConnection::new("Delhi -> New York", [77.2, 28.6], [-74.0, 40.7]),
    FlowConnection::new("Paris -> Tokyo", [2.3, 48.9], [139.7, 35.7]),
    FlowConnection::new("London -> Rio de Janeiro", [-0.1, 51.5], [-43.2, -22.9]),
    FlowConnection::new("Sydney -> Dubai", [151.2, -33.9], [55.3, 25.3]),
    FlowConnection::new("San Francisco -> Beijing", [-122.4, 37.8], [116.4, 39.9]),
    FlowConnection::new("Rome -> Mumbai", [12.5, 41.9], [72.8, 19.0]),
    FlowConnection::new("Singapore -> Mexico City", [103.8, 1.3], [-99.1, 19.4]),
    FlowConnection::new("Cairo -> Wellington", [31.2, 30.0], [174.8, -41.3]),
    FlowConnection::new("Buenos Aires -> Moscow", [-58.4, -34.6], [37.6, 55.8]),
    FlowConnection::new("Seoul -> Berlin", [126.9, 37.6], [13.4, 52.5]),
    FlowConnection::new("Madrid -> Sydney", [-3.7, 40.4], [151.2, -33.9]),
    FlowConnection::new("Bangkok -> London", [100.5, 13.7], [-0.1, 51.5]),
    FlowConnection::new("Brasilia -> Shanghai", [-47.9, -15.8], [121.5, 31.2]),
    FlowConnection::new("Stockholm -> Los Angeles", [18.4, 59.3], [-118.2, 34.1]),
    FlowConnection::new("Johannesburg -> Hong Kong", [28.0, -26.2], [114.1, 22.3]),
    FlowConnection::new("Canberra -> Amsterdam", [149.1, -35.3], [4.9, 52.4]),
    FlowConnection::new("Tokyo -> New York", [139.7, 35.7], [-73.9, 40.7]),
    FlowConnection::new("Toronto -> Delhi", [-79.4, 43.7], [77.2, 28.6]),
    FlowConnection::new("Dubai -> Paris", [55.3, 25.3], [2.3, 48.9]),
    FlowConnection::new("Honolulu -> Sydney", [-157.8, 21.3], [151.2, -33.9]),
];

/// The hand-authored city pairs, in animation order.
pub fn default_connections() -> &'static [FlowConnection] {
    &CONNECTIONS
}
