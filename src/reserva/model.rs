use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::cms::lenient;

/// A reservation record with its relations, in the CMS's field names.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct Reservation {
    pub id: i64,
    #[serde(rename = "Fecha", default, deserialize_with = "lenient::text")]
    pub fecha: Option<String>,
    #[serde(rename = "Mensaje", default, deserialize_with = "lenient::text")]
    pub mensaje: Option<String>,
    #[serde(rename = "Confirmacion", default, deserialize_with = "lenient::flag")]
    pub confirmacion: Option<bool>,
    #[serde(rename = "documentoFirmado", default, deserialize_with = "lenient::flag")]
    pub documento_firmado: Option<bool>,
    #[serde(rename = "docusignEnvelopeId", default, deserialize_with = "lenient::text")]
    pub docusign_envelope_id: Option<String>,
    #[serde(rename = "users_permissions_user", default, deserialize_with = "lenient::relation")]
    pub user: Option<User>,
    #[serde(rename = "tour_id", default, deserialize_with = "lenient::relation")]
    pub tour: Option<Tour>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub contrato_generado: Option<Value>,
    /// Contact details captured on the booking form, used when the linked
    /// user lacks them.
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(rename = "nombreCompleto", default, deserialize_with = "lenient::text")]
    pub nombre_completo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nacionalidad: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub personas: Option<u32>,
}

impl Reservation {
    pub fn is_confirmed(&self) -> bool {
        self.confirmacion.unwrap_or(false)
    }

    pub fn is_signed(&self) -> bool {
        self.documento_firmado.unwrap_or(false)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct User {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(rename = "firstName", default, deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(rename = "Nationality", default, deserialize_with = "lenient::text")]
    pub nationality: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct Tour {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub precio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ubicacion: Option<String>,
}

/// Partial update sent back to the CMS. Unset fields are left untouched.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ReservationPatch {
    #[serde(rename = "documentoFirmado", skip_serializing_if = "Option::is_none")]
    pub documento_firmado: Option<bool>,
    #[serde(rename = "docusignEnvelopeId", skip_serializing_if = "Option::is_none")]
    pub docusign_envelope_id: Option<String>,
}

impl ReservationPatch {
    pub fn signed() -> Self {
        Self {
            documento_firmado: Some(true),
            ..Self::default()
        }
    }

    pub fn envelope(envelope_id: impl Into<String>) -> Self {
        Self {
            docusign_envelope_id: Some(envelope_id.into()),
            ..Self::default()
        }
    }
}

/// The record carried by a lifecycle event. Only the fields the reactions
/// look at before re-fetching.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LifecycleEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub contrato_generado: Option<Value>,
}

impl LifecycleEntry {
    /// True when the event is the upload of the generated contract itself.
    pub fn has_generated_contract(&self) -> bool {
        match &self.contrato_generado {
            None | Some(Value::Null) => false,
            Some(Value::Array(files)) => !files.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}
