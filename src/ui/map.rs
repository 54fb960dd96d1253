/// Interactive map for manual location pinning
///
/// A canvas widget with a plain graticule, a center crosshair and the pin
/// marker. Clicking converts the cursor position to a coordinate and emits
/// it as a message; the wheel zooms; recentering is programmatic via
/// `recenter`. No tile server is in scope, so the map is schematic — what
/// matters is the click-to-coordinate mapping and the confirmed pin.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use crate::state::data::Coordinate;
use crate::Message;

/// Degrees per pixel at zoom 1.0
const BASE_SCALE: f64 = 0.0002;

/// Graticule spacing in degrees
const GRID_STEP: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct MapView {
    center: Coordinate,
    zoom: f64,
    pin: Option<Coordinate>,
}

impl MapView {
    pub fn new(center: Coordinate) -> Self {
        Self {
            center,
            zoom: 1.0,
            pin: None,
        }
    }

    /// Programmatic re-centering (e.g. onto a freshly dropped pin)
    pub fn recenter(&mut self, center: Coordinate) {
        self.center = center;
    }

    pub fn set_pin(&mut self, pin: Coordinate) {
        self.pin = Some(pin);
    }

    pub fn clear_pin(&mut self) {
        self.pin = None;
    }

    pub fn pin(&self) -> Option<Coordinate> {
        self.pin
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom * (1.0 + delta)).clamp(0.25, 50.0);
    }

    fn degrees_per_pixel(&self) -> f64 {
        BASE_SCALE / self.zoom
    }

    /// Widget-relative pixel position -> coordinate
    fn coordinate_at(&self, position: Point, bounds_size: iced::Size) -> Coordinate {
        let scale = self.degrees_per_pixel();
        let dx = position.x as f64 - bounds_size.width as f64 / 2.0;
        let dy = position.y as f64 - bounds_size.height as f64 / 2.0;

        // Screen y grows downward; latitude grows upward
        Coordinate::new(self.center.lat - dy * scale, self.center.lng + dx * scale)
    }

    /// Coordinate -> widget-relative pixel position
    fn position_of(&self, coordinate: Coordinate, bounds_size: iced::Size) -> Point {
        let scale = self.degrees_per_pixel();
        let dx = (coordinate.lng - self.center.lng) / scale;
        let dy = (self.center.lat - coordinate.lat) / scale;

        Point::new(
            (bounds_size.width as f64 / 2.0 + dx) as f32,
            (bounds_size.height as f64 / 2.0 + dy) as f32,
        )
    }
}

impl canvas::Program<Message> for MapView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let size = bounds.size();

        // Background
        frame.fill_rectangle(
            Point::ORIGIN,
            size,
            Color::from_rgb(0.88, 0.92, 0.88),
        );

        // Graticule: one line per GRID_STEP degrees, aligned to the grid
        let scale = self.degrees_per_pixel();
        let grid_color = Color::from_rgba(0.3, 0.45, 0.3, 0.35);

        let west = self.center.lng - (size.width as f64 / 2.0) * scale;
        let east = self.center.lng + (size.width as f64 / 2.0) * scale;
        let mut lng = (west / GRID_STEP).ceil() * GRID_STEP;
        while lng <= east {
            let x = self.position_of(Coordinate::new(self.center.lat, lng), size).x;
            frame.stroke(
                &Path::line(Point::new(x, 0.0), Point::new(x, size.height)),
                Stroke::default().with_color(grid_color).with_width(1.0),
            );
            lng += GRID_STEP;
        }

        let south = self.center.lat - (size.height as f64 / 2.0) * scale;
        let north = self.center.lat + (size.height as f64 / 2.0) * scale;
        let mut lat = (south / GRID_STEP).ceil() * GRID_STEP;
        while lat <= north {
            let y = self.position_of(Coordinate::new(lat, self.center.lng), size).y;
            frame.stroke(
                &Path::line(Point::new(0.0, y), Point::new(size.width, y)),
                Stroke::default().with_color(grid_color).with_width(1.0),
            );
            lat += GRID_STEP;
        }

        // Center crosshair
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        let crosshair = Color::from_rgba(0.2, 0.2, 0.2, 0.6);
        frame.stroke(
            &Path::line(
                Point::new(center.x - 8.0, center.y),
                Point::new(center.x + 8.0, center.y),
            ),
            Stroke::default().with_color(crosshair).with_width(1.0),
        );
        frame.stroke(
            &Path::line(
                Point::new(center.x, center.y - 8.0),
                Point::new(center.x, center.y + 8.0),
            ),
            Stroke::default().with_color(crosshair).with_width(1.0),
        );

        // Pin marker: stem plus head, leaflet-style
        if let Some(pin) = self.pin {
            let tip = self.position_of(pin, size);
            let head = Point::new(tip.x, tip.y - 14.0);
            let pin_color = Color::from_rgb(0.75, 0.15, 0.15);

            frame.stroke(
                &Path::line(tip, head),
                Stroke::default().with_color(pin_color).with_width(3.0),
            );
            frame.fill(&Path::circle(head, 6.0), pin_color);
            frame.fill(&Path::circle(head, 2.5), Color::WHITE);
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Click drops (or moves) the pin
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    let coordinate = self.coordinate_at(position, bounds.size());
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::MapClicked(coordinate)),
                    );
                }
            }

            // Wheel zooms around the center
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.position_in(bounds).is_some() {
                    let zoom_delta = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y as f64 * 0.1,
                        mouse::ScrollDelta::Pixels { y, .. } => y as f64 * 0.01,
                    };
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::MapZoomed(zoom_delta)),
                    );
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }
}
