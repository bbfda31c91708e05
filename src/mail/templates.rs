//! Message bodies for the reservation emails.

use super::{EmailAttachment, OutgoingEmail};
use crate::contract::common::{display_reservation_date, or_placeholder, NOT_SPECIFIED};
use crate::reserva::model::Reservation;

const NO_MESSAGE: &str = "Sin mensaje adicional";

pub fn itinerary_filename(reservation_id: i64) -> String {
    format!("Itinerario-{}.pdf", reservation_id)
}

/// Itinerary PDF for a confirmed and signed reservation.
pub fn itinerary(from: &str, reservation_id: i64, to: &str, cc: &str, pdf: Vec<u8>) -> OutgoingEmail {
    OutgoingEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        cc: vec![cc.to_string()],
        subject: "Itinerario de Viaje Confirmado".to_string(),
        text: "¡Su itinerario está listo! Adjunto encontrará los detalles de su reserva.\n\nGracias por elegirnos."
            .to_string(),
        attachments: vec![EmailAttachment {
            filename: itinerary_filename(reservation_id),
            content: pdf,
        }],
    }
}

/// Sent when an admin confirms a reservation and no e-signature step runs.
pub fn confirmation(from: &str, reservation: &Reservation, to: &str, cc: Option<&str>) -> OutgoingEmail {
    let participants = reservation
        .personas
        .map(|count| count.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let message = reservation
        .mensaje
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(|m| format!("Tu mensaje: {}\n\n", m))
        .unwrap_or_default();

    OutgoingEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        cc: cc.map(|address| vec![address.to_string()]).unwrap_or_default(),
        subject: "Confirmación de reservación".to_string(),
        text: format!(
            "¡Su reserva ha sido confirmada!\n\nDetalles de su reservación:\nID: {}\nFecha: {}\nParticipantes: {}\n\n{}Pronto recibirá los documentos para firma electrónica.",
            reservation.id,
            display_reservation_date(reservation.fecha.as_deref(), NOT_SPECIFIED),
            participants,
            message
        ),
        attachments: Vec::new(),
    }
}

/// Acknowledgement to the client right after booking.
pub fn client_receipt(from: &str, reservation: &Reservation, to: &str, name: &str) -> OutgoingEmail {
    OutgoingEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        cc: Vec::new(),
        subject: "Recibimos tu reserva".to_string(),
        text: format!(
            "Hola! {},\n\nHemos recibido tu solicitud de reserva.\n\nEstamos procesando tu información y pronto recibirás actualizaciones.\n\n{}\n\nGracias por elegirnos.",
            name,
            or_placeholder(reservation.mensaje.as_deref(), NO_MESSAGE)
        ),
        attachments: Vec::new(),
    }
}

pub fn admin_notification(from: &str, reservation: &Reservation, admin: &str) -> OutgoingEmail {
    OutgoingEmail {
        from: from.to_string(),
        to: vec![admin.to_string()],
        cc: Vec::new(),
        subject: "Nueva reservación creada".to_string(),
        text: format!(
            "Nueva reservación registrada:\nID: {}\nFecha del tour: {}\nMensaje: {}\nConfirmada: {}",
            reservation.id,
            or_placeholder(reservation.fecha.as_deref(), NOT_SPECIFIED),
            or_placeholder(reservation.mensaje.as_deref(), NO_MESSAGE),
            if reservation.is_confirmed() { "Sí" } else { "No" }
        ),
        attachments: Vec::new(),
    }
}
