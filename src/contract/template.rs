//! The tour service contract.
//!
//! The legal text is fixed. Only the tourist, tour and signing-date fields
//! change between reservations, and every one of them has a fallback so a
//! sparse record still yields a complete contract.

use chrono::{Datelike, NaiveDate};

use super::common::{non_blank, or_placeholder, spanish_month, NOT_SPECIFIED, NOT_SPECIFIED_FEM};
use super::{Document, DocumentBuilder};
use crate::reserva::model::{Tour, User};

pub const CONTRACT_TITLE: &str = "Contrato de Prestacion del Servicio Turistico de Tour";
pub const DEFAULT_CLIENT_NAME: &str = "CLIENTE";
pub const DEFAULT_LOCATION: &str = "Ciudad de México";

const TITLE_SIZE: f32 = 12.0;
const SECTION_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 9.0;
const SIGNATURE_LINE: &str = "_______________________";

/// Values interpolated into the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFields {
    pub tourist_name: String,
    pub nationality: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub tour_name: String,
    pub signed_on: NaiveDate,
}

impl ContractFields {
    /// Resolve every field from the linked records, applying fallbacks.
    pub fn from_records(user: &User, tour: &Tour, signed_on: NaiveDate) -> Self {
        Self {
            tourist_name: full_name(user),
            nationality: or_placeholder(user.nationality.as_deref(), NOT_SPECIFIED_FEM),
            email: or_placeholder(user.email.as_deref(), NOT_SPECIFIED),
            phone: or_placeholder(user.phone.as_deref(), NOT_SPECIFIED),
            location: or_placeholder(tour.ubicacion.as_deref(), DEFAULT_LOCATION),
            tour_name: or_placeholder(tour.nombre.as_deref(), NOT_SPECIFIED),
            signed_on,
        }
    }
}

/// `firstName lastName` trimmed, or `CLIENTE` when both are empty.
pub fn full_name(user: &User) -> String {
    let first = user.first_name.as_deref().unwrap_or_default();
    let last = user.last_name.as_deref().unwrap_or_default();
    let joined = format!("{first} {last}");
    non_blank(Some(joined.trim()))
        .unwrap_or(DEFAULT_CLIENT_NAME)
        .to_string()
}

/// Provider details that are not part of the reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSettings {
    pub provider_email: String,
    pub provider_phone: String,
    /// Year in words for the closing statement.
    pub year_text: String,
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            provider_email: "admin@sitiosdeinteresmexico.com".to_string(),
            provider_phone: "(+52) 55 68 88 86 86".to_string(),
            year_text: "DOS MIL VEINTICINCO".to_string(),
        }
    }
}

pub fn contract_document(fields: &ContractFields, settings: &ContractSettings) -> Document {
    let mut doc = DocumentBuilder::new(CONTRACT_TITLE);

    title(&mut doc, fields);
    provider_declarations(&mut doc, settings);
    tourist_declarations(&mut doc, fields);
    joint_declarations(&mut doc, fields);
    clauses(&mut doc);
    contracted_services(&mut doc, fields);
    closing(&mut doc, fields, settings);

    doc.build()
}

fn title(doc: &mut DocumentBuilder, fields: &ContractFields) {
    doc.centered(TITLE_SIZE, "CONTRATO DE PRESTACION  DEL SERVICIO  TURISTICO DE  TOUR QUE")
        .centered(TITLE_SIZE, "CELEBRA  COMO PRESTADOR \"SITIOS  DE  INTERES  MÉXICO\" Y COMO")
        .centered(
            TITLE_SIZE,
            format!("TURISTA {}; LOS CUALES EN COMUNIDAD SE OTORGAN", fields.tourist_name),
        )
        .centered(TITLE_SIZE, "PRESTACIONES Y SE SOMETEN A LOS DEBERES QUE CONSTAN EN ESTA")
        .centered(TITLE_SIZE, "ACTA, Y PREVIO A PUNTUALIZARLAS REALIZAN LAS SIGUIENTES:")
        .gap(1.0)
        .heading(TITLE_SIZE, "DECLARACIONES")
        .gap(0.5);
}

fn provider_declarations(doc: &mut DocumentBuilder, settings: &ContractSettings) {
    doc.text(SECTION_SIZE, "I. DECLARA EL PRESTADOR DE SERVICIOS TURISTICO:")
        .gap(0.5)
        .rows(
            BODY_SIZE,
            [
                "1. QUE ES UNA AGENCIA DE VIAJES REGISTRADA ANTE LA SECRETARÍA DE TURISMO EN EL REGISTRO NACIONAL DE TURISMO SEGUN EL CERTIFICADO DE INSCRIPCIONN CON NUMERO 0417028467cb6.",
                "2. QUE TIENE POR DOMICILIO EL QUE SE ENCUENTRA EN CIRCUITO SANTA FE 29, CLUB DE GOLF SANTA FE, XOCHITEPEC, MORELOS, CP: 62790.",
                "3. QUE CUENTA  CON  LAS  CAPACIDADES  MATERIALES,  HUMANOS Y FINANCIERAS PARA CUMPLIR CON EL OBJETO DEL CONTRATO.",
                "4. QUE EL REGISTRO FEDERAL DE CONTRIBUYENTE ES VEUS9408SX0.",
                "5. QUE EN ESTE ACTO LO HACE POR CONDUCTO DEL c. SANTIAGO JOSE VERDUZCO UZCANGA, MISMO QUE ES CAPAZ Y SE ENCUENTRA EN PLENITUD DE SUS FACULTADES.",
                "6. QUE  SEÑALA  COMO  DOMICILIO  CONVENCIONAL  EL  QUE  SE ENCUENTRA EN AVENIDA DE LAS FUENTES 41-A, PISO 12, COLONIA LOMAS DE TECAMACHALCO, C.P. 53950, NAUCALPAN DE JUAREZ, EN EL ESTADO DE MEXICO, MEXICO.",
                "7. QUE  LA  PAGINA  WEB  DEL  PRESTADOR  DE  SERVICIOS  ES  LA SIGUIENTE https://sitiosdeinteresmexico.com",
            ],
        )
        .text(
            BODY_SIZE,
            format!(
                "8. QUE EL   CORREO   ELECTRONICO   DE   CONTACTO   ES: {} Y NUMERO  TELEFONICO  DE  ATENCION  Y REFERENCIAS ES: {}.",
                settings.provider_email, settings.provider_phone
            ),
        )
        .text(
            BODY_SIZE,
            "9. QUE  PARA  LA  CONTRATACION  DEL  SERVICIO  TURISTICO  SE  DA CUMPLIMIENTO A LA LEY GENERAL DE TURISMO Y SU REGLAMENTO.",
        )
        .gap(1.0);
}

fn tourist_declarations(doc: &mut DocumentBuilder, fields: &ContractFields) {
    doc.text(SECTION_SIZE, "II. DECLARA EL TURISTA")
        .gap(0.5)
        .text(
            BODY_SIZE,
            format!(
                "1. QUE ES DE NACIONALIDAD {}, RESIDE EN SU PAIS EN LA SIGUIENTE DIRECCION ______________.",
                fields.nationality
            ),
        )
        .rows(
            BODY_SIZE,
            [
                "2. QUE ES SU DESEO CONTRATAR LOS SERVICIOS DEL PRESTADOR DE  SERVICIOS  TURISTICOS  PARA  CONOCER  LOS  RECURSOS HUMANOS, CULTURALES Y NATURALES DE MÉXICO.",
                "3. QUE ES SOLVENTE Y CUENTA CON LOS RECURSOS SUFICIENTES PARA CRUBIR CON SUS DEBERES",
                "4. QUE  BAJO  PROTESTA  DE  MANIFESTARSE  CON  VERDAD RESPECTO A LOS ORIGINES DE SUS INGRES QUE, ESTOS NO SON DE PROCEDENCIA ILICITA.",
            ],
        )
        .text(
            BODY_SIZE,
            format!(
                "5. QUE  SU  CORREO  ELECTRONICO  ES {} Y  SU NUMERO TELEFONO {}.",
                fields.email, fields.phone
            ),
        )
        .text(BODY_SIZE, "6. QUE SE HOSPEDARA EN: Hotel/Alojamiento no especificado.")
        .gap(1.0);
}

fn joint_declarations(doc: &mut DocumentBuilder, fields: &ContractFields) {
    doc.text(SECTION_SIZE, "IV.- LAS PARTES DECLARAN")
        .gap(0.5)
        .rows(
            BODY_SIZE,
            [
                "1. QUE  EN  CELEBRACION  DEL  PRESENTE  ACTO  NO  EXISTIO ERROR,  DOLO  MALA  FE  O  CUALQUIER  OTRO  VICIO  EN  EL CONSENTIMIENTO DE LAS PARTES QUE PUDIERA ANULAR EN CONTENIDO DEL PRESENTE CONTRATO.",
                "2. QUE  LAS  PARTES  UTILIZARAN  TECNOLOGIAS  DE  LA INFORMACION Y COMUNICACION, POR LO QUE ADMITEN LAS PRACTICAS Y COSTUMBRES GENERALES.",
            ],
        )
        .text(
            BODY_SIZE,
            format!(
                "3. QUE EL SERVICIO QUE SE CONTRATARA TOMARA LUGAR EN EL ESTADO {}, MEXICO.",
                fields.location
            ),
        )
        .rows(
            BODY_SIZE,
            [
                "4. QUE PUNTO DE ORIGEN SERA EL HOSPEDAJE",
                "5. QUE TODOS LOS PRECIOS SON EN PESOS MEXICANOS",
                "6. QUE SE RECONOCEN MUTUAMENTE LA PERSONALIDAD QUE OSTENTAN Y ESTAN DE ACUERDO EN CELEBRAR EL PRESENTE CONTRATO AL TENOR DE LOS SIGUIENTES:",
            ],
        )
        .gap(1.0);
}

fn paragraph(doc: &mut DocumentBuilder, text: &str) {
    doc.text(BODY_SIZE, text).gap(0.5);
}

fn table(doc: &mut DocumentBuilder, heading: &str, rows: &[&str]) {
    doc.text(TABLE_SIZE, heading)
        .rows(TABLE_SIZE, rows.iter().copied())
        .gap(0.5);
}

fn clauses(doc: &mut DocumentBuilder) {
    doc.heading(TITLE_SIZE, "C L A U S U L A S").gap(1.0);

    paragraph(
        doc,
        "PRIMERA.-LAS  PARTES  PACTAN  QUE  EN  CASO  DE  EVENTOS  QUE ARRIESGUEN EL  CUMPLIMIENTO  MATERIAL  O  JURIDICO  DE LAS PRESTACIONES  DEL  CONTRATO O  EL  OBJETO  DEL  MISMO, SE INVOLUCRARA A LA ASOCIACION CIVIL \"ASIA-AMERICA ENLACE\", LA QUE SE CONSTITUYO BAJO  LA  FE  DEL  NOTARIO  PUBLICO  NUMERO  239  DE  LA CIUDAD DE MEXICO EN EL TESTIMONIO NOTARIAL NUMERO 20,232 PARA DESIGNARLA  COMO REPRESENTANTE  LEGAL  Y  ASESORA  JURIDICA; ENCONTRANDOSE  EN  CONSECUENCIA,  CON FACULTADES  SUFICIENTES PARA INTERPONER RECURSOS Y PROMOVER ACCIONES PARA DEFENDER EL CUMPLIMIENTO DEL CONTRATO; ASI COMO LOS DERECHOS HUMANOS Y GARANTIAS INDIVIDUALES QUE TIENE EL TURISTA. MAXIME SI SE ATENTA CONTRA LA LIBERTAD PERSONAL AL RECONOCERSE QUE EL TURISTA ES EXTRANJERO,  NO  HABLA  EL  IDIOMA  ESPAÑOL Y SE  ENCUENTRA EN  EL TRAFICO INTERNACIONAL;",
    );
    paragraph(
        doc,
        "O EN SUPUESTO DE QUE EL TURISTA SEA NACIONAL, LAS PARTES PACTAN QUE SE PROPORCIONARA GRATUITAMENTE ASESORIA JURIDICA, A CARGO DEL  PRESTADOR  DE  SERVICIOS  TURISTIVOS,  LA  CUAL  DEBERA  SER ADECUADA,  TOTAL  Y  CONGRUENTEPOR  PERSONA  DEBIDAMENTE PORTADORA DE CEDULA Y TITULO PROFESIONAL COMO PROFESIONAL EN DERECHO, Y TENDERA A QUE SE CUMPLA EL OBJETO DEL CONTRATO.",
    );
    paragraph(
        doc,
        "SEGUNDA.- QUE EL SERVICIO DE TOUR CONSISTE EN EL DESPLAZAMIENTO PERSONAL DEL TURISTA DE UN PUNTO DE ORIGEN A LAS ATRACCIONES TURISTICAS QUE SE NOTIFIQUEN. LAS PARTES ACUERDAN QUE EL VIAJE INICIA AL MOMENTO QUE EL TURISTA ABORDA EL TRANSPORTE Y TERMINA AL MOMENTO DEL ÚLTIMO DESCENSO.",
    );
    paragraph(
        doc,
        "TERCERA.-EL COSTO DEL SERVICIO SE RESPONDERA A LA SUMATORIA DE LOS  CONCEPOS  QUE  SE  PACTAN  EN  LAS  TAMBLAS TABLAS QUE  SE INSERTARAN.",
    );

    table(
        doc,
        "NUMERO DE PERSONAS",
        &["1  $2300.00", "2 A 3  $2800.00", "4 A 6  $3300.00", "7 A 11  $6400.00", "+12  $8300.00"],
    );
    table(
        doc,
        "NUMERO DE ATRACCIONES VISITADAS",
        &["1   $5000.00", "2 A 5  $4600.00", "6 A 8  $4200.00", "+9  $3500.00"],
    );
    table(
        doc,
        "TIPO DE AUTOMOVIL",
        &[
            "SEDAN  $4000.00",
            "SEDAN PREMIUM  $8500.00",
            "CAMIONETA – 3 PLAZAS-  $4600.00",
            "CAMIONETA -5 PLAZAS-  $6000.00",
            "CAMIONETA PREMIUM  $8500.00",
            "SUBURBAN  $9500.00",
        ],
    );
    table(
        doc,
        "HORAS EFECTIVAS DE TRANSPORTE",
        &[
            "1 A 3 HORAS  $710.00 POR CADA HORA",
            "4 A 6:00 HORAS  $550.00 POR CADA HORA",
            "6 A 8:00 HORAS  $450.00 POR CADA HORA",
            "8:00 A 9:00 HORAS  $420.00 POR CADA HORA",
            "+10 HORAS  $400.00 POR CADA HORA",
        ],
    );

    paragraph(
        doc,
        "LAS PARTES CONVIENEN QUE EL NUMERO DE PASAJEROS DURANTE EL SERVICIO NO  PODRAN  VARIAR,  SALVO  EL AUMENTO RESPECTIVO  DE AUMENTO DE TARIFA. LA QUE SOLO ACEPTARA PRUEBA EN CONTRARIO POR PARTE DEL TURISTA.",
    );
    paragraph(
        doc,
        "EN TORNO AL MEDIO DE TRANSPORTE EL TURISTA PODRA SOLICITAR EL CAMBIO DEL TRANSPORTE LA QUE SE CONCEDERA POR MUTUO ACUERDO.",
    );
    paragraph(
        doc,
        "LAS PARTES ACUERDAN QUE LOS MONTOS QUE SE ESTABLECIERON EN LAS TABLAS SON ACUMULATIVOS.",
    );
    paragraph(
        doc,
        "CUARTA.- EL PRESTADOR DE SERVICIOS SE COMPROMETE A LLEVAR UNA BITACORA EN LA QUE MINIMAMENTE SE IDENTIFIQUE LA ATRACCION QUE SE VISITO, LA HORA EN LA QUE SE LLEGO Y LA HORA EN LA QUE SE RETIRO.",
    );
    paragraph(
        doc,
        "QUINTA.- LAS  PARTES  ACUERDAN  QUE DESCENSO  POR  ATRACCION CONSISTIRAN TODAS AQUELLAS MENOS LAS QUE SEAN EN TIENDAS DE CONVINIENCIA Y SANITARIOS PUBLICOS.",
    );
    paragraph(
        doc,
        "SEXTA.- SERA  CARGA  DEL  PRESTADOR  DE  SERVICIOS  EL  PAGO  DE ESTACIONAMIENTOS Y GASOLINA.",
    );
    paragraph(
        doc,
        "SEPTIMA.- RECARGAR GASOLINA MAS DE UNA VEZ SIN JUSTIFICACION A RAZON DE DISTANCIA RECORRIDA Y TIEMPO, HARA QUE EL PRESTADOR DE SERVICIO SEA MERECEDORA A UNA PENA CONVENCIONAL DEL 10% DEL TOTAL DEL SERVICIO.",
    );
    paragraph(
        doc,
        "DECIMA  OCTAVA.- LAS  PARTES  ACUERDAN  QUE  LOS  SERVICIOS CONTRATADOS SERAN:",
    );
}

/// The services actually booked: one person, one attraction, a sedan.
fn contracted_services(doc: &mut DocumentBuilder, fields: &ContractFields) {
    table(doc, "NUMERO DE PERSONAS", &["1  X", "2 A 3", "4 A 6", "7 A 11", "+12"]);

    let attraction = format!("1   {}", fields.tour_name);
    table(
        doc,
        "NUMERO DE ATRACCIONES VISITADAS",
        &[attraction.as_str(), "2 A 5", "6 A 8", "+9"],
    );
    table(
        doc,
        "TIPO DE AUTOMOVIL",
        &[
            "SEDAN  X",
            "SEDAN PREMIUM",
            "CAMIONETA – 3 PLAZAS-",
            "CAMIONETA – MAXIMO 5 PLAZAS-",
            "CAMIONETA PREMIUM",
            "CAMIONETA DE MÁS DE 5 PLAZAS",
        ],
    );

    paragraph(
        doc,
        "DECIMA  NOVENA.- LAS  PARTES  PACTAN  QUE  LOS  COSTOS  DE  LAS ATRACCIONES SERAN A COSTA DEL TURISTA.",
    );
    paragraph(
        doc,
        "ASI COMO QUE ACUERDAN QUE EL TIPO DEL CAMBIO PARA: EL DOLAR - MONEDA DE USO CORRIENTE DE LOS ESTADOS UNIDOS DE AMERICA- SERA DE  $15.00  (QUINCE  PESOS  MONEDA  NACIONAL  00/100)  POR  CADA  UNO, PARA EL EURO -MONEDA DE USO CORRIENTE EN LA UNION EURPEA- $16.50 (DIECISEIS PESOS CON CINCUENTA CENTAVOS MONEDA NACIONAL 50/100), Y PARA EL YUAN (MONEDA DE USO CORRIENTE EN LA REPUBLICA POPULAR CHINA) (MONEDA NACIONAL).",
    );
}

fn closing(doc: &mut DocumentBuilder, fields: &ContractFields, settings: &ContractSettings) {
    doc.gap(2.0)
        .text(
            BODY_SIZE,
            format!(
                "HABIENDO LEIDO TODAS Y CADA UNA DE LAS PARTES DE ESTE CONTRATO, ASÍ COMO LAS CONSECUENCIAS QUE SE DERIVAN DEL MISMO POR MEDIOS ELECTRONICOS EL DÍA {} DEL MES {} DE {}",
                fields.signed_on.day(),
                spanish_month(fields.signed_on),
                settings.year_text
            ),
        )
        .gap(2.0)
        .text(BODY_SIZE, SIGNATURE_LINE)
        .text(BODY_SIZE, "PRESTADOR DE SERVICIOS")
        .gap(2.0)
        .right(BODY_SIZE, SIGNATURE_LINE)
        .right(BODY_SIZE, fields.tourist_name.as_str())
        .right(BODY_SIZE, "TURISTA");
}
