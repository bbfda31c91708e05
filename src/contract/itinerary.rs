//! The travel itinerary mailed once a reservation is confirmed and signed.

use super::common::{display_reservation_date, non_blank, or_placeholder, NOT_SPECIFIED};
use super::{Document, DocumentBuilder};
use crate::reserva::model::{Reservation, User};

pub const ITINERARY_TITLE: &str = "Itinerario de Viaje";

/// `firstName` (or `username`) followed by `lastName`.
fn traveller_name(user: &User) -> String {
    let first = non_blank(user.first_name.as_deref())
        .or_else(|| non_blank(user.username.as_deref()))
        .unwrap_or(NOT_SPECIFIED);
    let last = user.last_name.as_deref().unwrap_or_default();
    format!("{first} {last}").trim().to_string()
}

/// First value with visible content, else the placeholder.
fn first_of(values: [Option<&str>; 2]) -> String {
    values
        .into_iter()
        .find_map(non_blank)
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

pub fn itinerary_document(reservation: &Reservation, user: &User) -> Document {
    let mut doc = DocumentBuilder::new(ITINERARY_TITLE);

    doc.centered(18.0, ITINERARY_TITLE).gap(1.0).rows(
        14.0,
        [
            format!("Nombre: {}", traveller_name(user)),
            format!(
                "Nacionalidad: {}",
                first_of([user.nationality.as_deref(), reservation.nacionalidad.as_deref()])
            ),
            format!(
                "Email: {}",
                first_of([user.email.as_deref(), reservation.email.as_deref()])
            ),
            format!(
                "Teléfono: {}",
                first_of([user.phone.as_deref(), reservation.telefono.as_deref()])
            ),
            format!(
                "Fecha de viaje: {}",
                display_reservation_date(reservation.fecha.as_deref(), NOT_SPECIFIED)
            ),
        ],
    );
    doc.gap(1.0);

    if let Some(tour) = &reservation.tour {
        doc.underlined(14.0, "Detalles del Tour:")
            .text(
                12.0,
                format!("Nombre del Tour: {}", or_placeholder(tour.nombre.as_deref(), NOT_SPECIFIED)),
            )
            .text(
                12.0,
                format!(
                    "Descripción: {}",
                    or_placeholder(tour.descripcion.as_deref(), NOT_SPECIFIED)
                ),
            )
            .gap(1.0);
    }

    if let Some(message) = non_blank(reservation.mensaje.as_deref()) {
        doc.underlined(14.0, "Requerimientos Especiales / Mensaje:")
            .text(12.0, message)
            .gap(1.0);
    }

    doc.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reserva::model::Tour;

    fn reservation() -> Reservation {
        Reservation {
            id: 12,
            fecha: Some("2025-08-03T00:00:00.000Z".to_string()),
            mensaje: Some("Vegetariano".to_string()),
            tour: Some(Tour {
                id: 2,
                nombre: Some("Xochimilco".to_string()),
                descripcion: Some("Trajinera y mercado".to_string()),
                ..Tour::default()
            }),
            telefono: Some("55 1234".to_string()),
            ..Reservation::default()
        }
    }

    #[test]
    fn test_itinerary_lists_traveller_and_tour() {
        let user = User {
            id: 1,
            username: Some("ana.t".to_string()),
            email: Some("ana@example.com".to_string()),
            last_name: Some("Torres".to_string()),
            ..User::default()
        };
        let doc = itinerary_document(&reservation(), &user);
        let texts: Vec<&str> = doc.texts().collect();

        assert_eq!(texts[0], "Itinerario de Viaje");
        assert!(texts.contains(&"Nombre: ana.t Torres"));
        assert!(texts.contains(&"Nacionalidad: No especificado"));
        assert!(texts.contains(&"Email: ana@example.com"));
        assert!(texts.contains(&"Teléfono: 55 1234"));
        assert!(texts.contains(&"Fecha de viaje: 3/8/2025"));
        assert!(texts.contains(&"Nombre del Tour: Xochimilco"));
        assert!(texts.contains(&"Descripción: Trajinera y mercado"));
        assert!(texts.contains(&"Vegetariano"));
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let reservation = Reservation {
            id: 3,
            ..Reservation::default()
        };
        let doc = itinerary_document(&reservation, &User::default());

        assert!(doc.contains("Nombre: No especificado"));
        assert!(doc.contains("Fecha de viaje: No especificado"));
        assert!(!doc.contains("Detalles del Tour:"));
        assert!(!doc.contains("Requerimientos Especiales"));
    }
}
