//! Marker icon rules shared by every backend
//!
//! The vehicle status colors are relied on by legends and filters, so both
//! backends must take them from here.

use freightmap_types::{CargoType, Marker, MarkerKind, VehicleCategory, VehicleStatus};

/// Background tint of cargo icons
pub const CARGO_COLOR: &str = "#0EA5E9";

/// Tint of the "you are here" placemark
pub const USER_LOCATION_COLOR: &str = "#10B981";

/// Stroke of a drawn route
pub const ROUTE_COLOR: &str = "#8B5CF6";

pub const FREE_COLOR: &str = "#22c55e";
pub const HAS_SPACE_COLOR: &str = "#eab308";
pub const FULL_COLOR: &str = "#ef4444";

pub fn status_color(status: VehicleStatus) -> &'static str {
    match status {
        VehicleStatus::Free => FREE_COLOR,
        VehicleStatus::HasSpace => HAS_SPACE_COLOR,
        VehicleStatus::Full => FULL_COLOR,
    }
}

/// Booked cargo (accepted, in transit, delivered) is never drawn
pub fn is_displayable(marker: &Marker) -> bool {
    !marker.is_booked()
}

/// White glyph drawn on the cargo tint
pub fn cargo_glyph(cargo_type: Option<CargoType>) -> &'static str {
    match cargo_type.unwrap_or(CargoType::Box) {
        CargoType::Box => {
            r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="white" stroke="white" stroke-width="1.5"><rect x="7" y="7" width="10" height="10" rx="1"/></svg>"#
        }
        CargoType::Pallet => {
            r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="white" stroke="white" stroke-width="1.5"><path d="M8 4 L8 20 L16 20 L16 4 Z M8 4 L10 2 L14 2 L16 4 M8 20 L10 22 L14 22 L16 20" stroke-linejoin="round"/><line x1="8" y1="10" x2="16" y2="10"/><line x1="8" y1="16" x2="16" y2="16"/></svg>"#
        }
        CargoType::Oversized => {
            r#"<svg width="24" height="24" viewBox="0 0 24 24"><text x="12" y="18" font-size="18" font-weight="bold" fill="white" text-anchor="middle" font-family="monospace">Н</text></svg>"#
        }
    }
}

/// Vehicle outline stroked in `ink`
pub fn vehicle_glyph(category: Option<VehicleCategory>, ink: &str) -> String {
    match category.unwrap_or(VehicleCategory::Car) {
        VehicleCategory::Car => format!(
            r#"<svg width="26" height="26" viewBox="0 0 24 24" fill="none" stroke="{c}" stroke-width="2"><path d="M14 16H9m10 0h3v-3.15a1 1 0 0 0-.84-.99L16 11l-2.7-3.6a1 1 0 0 0-.8-.4H5.24a2 2 0 0 0-1.8 1.1l-.8 1.63A6 6 0 0 0 2 12.42V14a2 2 0 0 0 2 2h2"/><circle cx="6.5" cy="16.5" r="2.5" fill="{c}"/><circle cx="16.5" cy="16.5" r="2.5" fill="{c}"/></svg>"#,
            c = ink
        ),
        VehicleCategory::Truck => format!(
            r#"<svg width="26" height="26" viewBox="0 0 24 24" fill="none" stroke="{c}" stroke-width="2"><rect x="1" y="6" width="15" height="12" rx="1"/><path d="M16 8h3l3 3v5h-3"/><circle cx="5.5" cy="18.5" r="2.5" fill="{c}"/><circle cx="18.5" cy="18.5" r="2.5" fill="{c}"/></svg>"#,
            c = ink
        ),
        VehicleCategory::Semi => format!(
            r#"<svg width="26" height="26" viewBox="0 0 24 24" fill="none" stroke="{c}" stroke-width="2"><rect x="1" y="6" width="10" height="10" rx="1"/><path d="M11 8h4l4 4v4h-2"/><rect x="15" y="14" width="8" height="4" rx="1"/><circle cx="5" cy="18" r="2" fill="{c}"/><circle cx="15" cy="18" r="2" fill="{c}"/><circle cx="20" cy="18" r="2" fill="{c}"/></svg>"#,
            c = ink
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Glyph {
    Cargo(Option<CargoType>),
    Vehicle(Option<VehicleCategory>),
}

/// What to draw for a marker and the color it is keyed to.
/// Backends choose the frame and the ink from `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub kind: MarkerKind,
    pub glyph: Glyph,
    pub color: &'static str,
}

impl Icon {
    /// SVG of the glyph. Cargo glyphs are always white; vehicles take `ink`.
    pub fn svg(&self, ink: &str) -> String {
        match self.glyph {
            Glyph::Cargo(cargo_type) => cargo_glyph(cargo_type).to_string(),
            Glyph::Vehicle(category) => vehicle_glyph(category, ink),
        }
    }
}

pub fn icon_for(marker: &Marker) -> Icon {
    match marker.kind {
        MarkerKind::Cargo => Icon {
            kind: MarkerKind::Cargo,
            glyph: Glyph::Cargo(marker.cargo_type()),
            color: CARGO_COLOR,
        },
        MarkerKind::Driver => Icon {
            kind: MarkerKind::Driver,
            glyph: Glyph::Vehicle(marker.vehicle_category()),
            color: status_color(marker.vehicle_status().unwrap_or_default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(VehicleStatus::Free), "#22c55e");
        assert_eq!(status_color(VehicleStatus::HasSpace), "#eab308");
        assert_eq!(status_color(VehicleStatus::Full), "#ef4444");
    }

    #[test]
    fn test_driver_icon_follows_status() {
        let marker = Marker::driver("d", 0.0, 0.0).with_vehicle(VehicleCategory::Semi, VehicleStatus::Full);
        let icon = icon_for(&marker);
        assert_eq!(icon.kind, MarkerKind::Driver);
        assert_eq!(icon.color, FULL_COLOR);
        assert_eq!(icon.glyph, Glyph::Vehicle(Some(VehicleCategory::Semi)));
        assert!(icon.svg(icon.color).contains(FULL_COLOR));
        assert!(icon.svg("white").contains(r#"stroke="white""#));

        // Missing status counts as free
        let icon = icon_for(&Marker::driver("d2", 0.0, 0.0));
        assert_eq!(icon.color, FREE_COLOR);
    }

    #[test]
    fn test_cargo_glyphs_are_distinct() {
        let glyphs = [
            cargo_glyph(Some(CargoType::Box)),
            cargo_glyph(Some(CargoType::Pallet)),
            cargo_glyph(Some(CargoType::Oversized)),
        ];
        assert_ne!(glyphs[0], glyphs[1]);
        assert_ne!(glyphs[1], glyphs[2]);
        assert_eq!(cargo_glyph(None), glyphs[0]);
        assert_eq!(icon_for(&Marker::cargo("c", 0.0, 0.0)).color, CARGO_COLOR);
        assert_ne!(CARGO_COLOR, FREE_COLOR);
    }

    #[test]
    fn test_booked_cargo_not_displayable() {
        for status in ["accepted", "in_transit", "delivered"] {
            assert!(!is_displayable(&Marker::cargo("c", 0.0, 0.0).with_status(status)));
        }
        assert!(is_displayable(&Marker::cargo("c", 0.0, 0.0).with_status("Ожидает")));
        // The rule only concerns cargo
        assert!(is_displayable(&Marker::driver("d", 0.0, 0.0).with_status("delivered")));
    }
}
