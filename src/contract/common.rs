//! Common utilities for document generation.
//!
//! Shared helpers for Spanish date formatting, placeholder fallbacks and
//! file naming.

use chrono::{Datelike, Local, NaiveDate};

pub const NOT_SPECIFIED: &str = "No especificado";
pub const NOT_SPECIFIED_FEM: &str = "No especificada";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Lowercase Spanish month name (e.g. "octubre").
pub fn spanish_month(date: NaiveDate) -> &'static str {
    MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)]
}

/// Short Mexican date format, day and month unpadded (e.g. "5/3/2025").
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Parse the reservation date as stored by the CMS: a plain date or an
/// ISO 8601 timestamp, whose calendar date is taken as written.
pub fn parse_reservation_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        value
            .get(..10)
            .filter(|_| value[10..].starts_with('T'))
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    })
}

/// Reservation date for display, `fallback` when absent. Unparseable values
/// are shown as stored.
pub fn display_reservation_date(value: Option<&str>, fallback: &str) -> String {
    match non_blank(value) {
        Some(raw) => parse_reservation_date(raw)
            .map(format_short_date)
            .unwrap_or_else(|| raw.to_string()),
        None => fallback.to_string(),
    }
}

/// `Some` only for values with visible content.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn or_placeholder(value: Option<&str>, fallback: &str) -> String {
    non_blank(value).unwrap_or(fallback).to_string()
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}
