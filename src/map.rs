//! Contact map.
//!
//! With a mapping library ([`MapBackend`]) the `#map` container gets a tile
//! layer, a view centered on the practice and a marker popup. Without one it
//! gets a plain link to the location on OpenStreetMap.

use maud::html;

use crate::config::ContactConfig;
use crate::dom::{Document, ElementBuilder, NodeId};
use crate::mount::{MountError, require_id};

pub const MAP_ROOT: &str = "map";

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// The host's mapping library.
pub trait MapBackend {
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str);
    fn set_view(&mut self, latitude: f64, longitude: f64, zoom: u8);
    /// Add a marker whose popup shows `popup_html`, opened immediately.
    fn add_marker(&mut self, latitude: f64, longitude: f64, popup_html: &str);
}

/// OpenStreetMap permalink for the practice location.
pub fn osm_link(contact: &ContactConfig) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={zoom}/{lat}/{lon}",
        lat = contact.latitude,
        lon = contact.longitude,
        zoom = contact.zoom
    )
}

/// Popup markup: practice name over the street address.
pub fn popup_html(contact: &ContactConfig) -> String {
    html! {
        strong { (contact.practice_name) }
        br;
        (contact.address)
    }
    .into_string()
}

#[derive(Debug)]
pub struct ContactMap {
    container: NodeId,
}

impl ContactMap {
    pub fn mount(
        doc: &mut Document,
        contact: &ContactConfig,
        backend: Option<&mut dyn MapBackend>,
    ) -> Result<Self, MountError> {
        let container = require_id(doc, MAP_ROOT)?;
        let Some(backend) = backend else {
            doc.add_class(container, "map-fallback");
            let link = ElementBuilder::new(doc, container, "a")
                .class("map-link")
                .attr("href", osm_link(contact))
                .attr("target", "_blank")
                .attr("rel", "noopener")
                .text(format!("View {} on OpenStreetMap", contact.practice_name))
                .finish();
            doc.set_attr(
                link,
                "aria-label",
                format!("Map of {}, opens in a new tab", contact.address),
            );
            return Err(MountError::LibraryUnavailable("map"));
        };

        backend.add_tile_layer(TILE_URL, TILE_ATTRIBUTION);
        backend.set_view(contact.latitude, contact.longitude, contact.zoom);
        backend.add_marker(contact.latitude, contact.longitude, &popup_html(contact));
        doc.set_attr(container, "role", "application");
        doc.set_attr(
            container,
            "aria-label",
            format!("Map showing {}", contact.address),
        );
        Ok(Self { container })
    }

    pub fn container(&self) -> NodeId {
        self.container
    }
}
