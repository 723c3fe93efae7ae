//! Before/after comparison slider interaction model
//!
//! The gallery page overlays a "before" photo on an "after" photo and lets
//! the visitor drag a divider to reveal more or less of the "before" image.
//! This module is the single source of truth for that interaction: the
//! served gallery script follows the same rules.
//!
//! The model uses one pointer-event abstraction for mouse and touch alike.
//! While a drag is active, every move updates the position - matching
//! document-level event capture, where dragging continues even when the
//! pointer leaves the container. After release, moves are ignored.

use serde::{Deserialize, Serialize};

/// Horizontal extent of the slider's container, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub width: f64,
}

/// A unified pointer event (mouse or touch), horizontal axis only
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed on the drag handle
    Down,
    /// Pointer moved to page x-coordinate `x`
    Move { x: f64 },
    /// Pointer released
    Up,
}

/// Comparison slider state: a divider position in [0, 100] percent from the
/// container's left edge, plus whether a drag is active.
///
/// Position 0 shows only the "after" image; 100 shows only "before".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSlider {
    position: f64,
    dragging: bool,
}

impl ComparisonSlider {
    /// Divider centered, no drag active
    pub fn new() -> Self {
        Self {
            position: 50.0,
            dragging: false,
        }
    }

    /// Start at a given position, clamped to [0, 100]
    pub fn at(position: f64) -> Self {
        Self {
            position: position.clamp(0.0, 100.0),
            dragging: false,
        }
    }

    /// Current divider position in [0, 100]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feed one pointer event through the state machine.
    ///
    /// `rect` is the container's current bounding box, re-read per event so
    /// layout changes mid-drag do not skew the mapping.
    pub fn handle(&mut self, event: PointerEvent, rect: ContainerRect) {
        match event {
            PointerEvent::Down => {
                self.dragging = true;
            }
            PointerEvent::Move { x } => {
                if self.dragging {
                    self.position = position_from_pointer(x, rect);
                }
            }
            PointerEvent::Up => {
                self.dragging = false;
            }
        }
    }

    /// CSS clip rule for the "before" layer: clipped from the right so the
    /// left `position` percent of it stays visible.
    pub fn clip_inset(&self) -> String {
        format!("inset(0 {}% 0 0)", 100.0 - self.position)
    }
}

impl Default for ComparisonSlider {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a page x-coordinate into the [0, 100] position space of `rect`.
/// Coordinates outside the container clamp to the nearest edge; degenerate
/// containers pin the divider to the left edge.
fn position_from_pointer(x: f64, rect: ContainerRect) -> f64 {
    if rect.width <= 0.0 || !rect.width.is_finite() {
        return 0.0;
    }
    (((x - rect.left) / rect.width) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: ContainerRect = ContainerRect {
        left: 0.0,
        width: 400.0,
    };

    fn dragging_slider() -> ComparisonSlider {
        let mut slider = ComparisonSlider::new();
        slider.handle(PointerEvent::Down, RECT);
        slider
    }

    #[test]
    fn starts_centered_and_idle() {
        let slider = ComparisonSlider::new();
        assert_eq!(slider.position(), 50.0);
        assert!(!slider.is_dragging());
    }

    #[test]
    fn move_maps_container_fraction_to_percent() {
        let mut slider = dragging_slider();
        slider.handle(PointerEvent::Move { x: 100.0 }, RECT);
        assert_eq!(slider.position(), 25.0);
    }

    #[test]
    fn left_edge_gives_zero_right_overshoot_clamps() {
        let mut slider = dragging_slider();

        slider.handle(PointerEvent::Move { x: 0.0 }, RECT);
        assert_eq!(slider.position(), 0.0);

        slider.handle(PointerEvent::Move { x: 1200.0 }, RECT);
        assert_eq!(slider.position(), 100.0);

        slider.handle(PointerEvent::Move { x: -300.0 }, RECT);
        assert_eq!(slider.position(), 0.0);
    }

    #[test]
    fn moves_ignored_before_down_and_after_up() {
        let mut slider = ComparisonSlider::new();
        slider.handle(PointerEvent::Move { x: 100.0 }, RECT);
        assert_eq!(slider.position(), 50.0);

        slider.handle(PointerEvent::Down, RECT);
        slider.handle(PointerEvent::Move { x: 100.0 }, RECT);
        slider.handle(PointerEvent::Up, RECT);
        assert_eq!(slider.position(), 25.0);

        slider.handle(PointerEvent::Move { x: 300.0 }, RECT);
        assert_eq!(slider.position(), 25.0);
    }

    #[test]
    fn offset_container_is_respected() {
        let rect = ContainerRect {
            left: 200.0,
            width: 400.0,
        };
        let mut slider = ComparisonSlider::new();
        slider.handle(PointerEvent::Down, rect);
        slider.handle(PointerEvent::Move { x: 300.0 }, rect);
        assert_eq!(slider.position(), 25.0);
    }

    #[test]
    fn degenerate_container_pins_left() {
        let rect = ContainerRect {
            left: 10.0,
            width: 0.0,
        };
        let mut slider = ComparisonSlider::new();
        slider.handle(PointerEvent::Down, rect);
        slider.handle(PointerEvent::Move { x: 500.0 }, rect);
        assert_eq!(slider.position(), 0.0);
    }

    #[test]
    fn clip_inset_tracks_position() {
        assert_eq!(ComparisonSlider::at(0.0).clip_inset(), "inset(0 100% 0 0)");
        assert_eq!(ComparisonSlider::at(100.0).clip_inset(), "inset(0 0% 0 0)");
        assert_eq!(ComparisonSlider::at(25.0).clip_inset(), "inset(0 75% 0 0)");
    }
}
