//! Server-rendered booking dashboard
//!
//! Plain HTML forms posting back to the server; no client-side scripting.

use crate::{
    api::handlers::chat::on_agent,
    render::render_error,
    types::{AppError, NewBooking, Turf},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Html, Form};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AvailabilityForm {
    pub turf_id: i64,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingForm {
    pub turf_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<BookingForm> for NewBooking {
    fn from(form: BookingForm) -> Self {
        NewBooking {
            turf_id: form.turf_id,
            customer_name: form.customer_name.trim().to_string(),
            customer_phone: form.customer_phone.trim().to_string(),
            booking_date: form.booking_date,
            start_time: form.start_time,
            end_time: form.end_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub message: String,
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#1b1b1b}\
h1{color:#1f7a3a}section{border:1px solid #ddd;border-radius:8px;padding:1rem;margin:1rem 0}\
label{display:block;margin:.4rem 0}input,select,textarea{padding:.3rem;min-width:14rem}\
pre{background:#f5f5f5;padding:1rem;border-radius:6px;white-space:pre-wrap}\
.error{border-color:#c0392b}.muted{color:#777;font-size:.9rem}";

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title><style>{STYLE}</style></head>\
         <body><h1>🏟️ Turf Booking</h1>{body}</body></html>",
        title = escape(title),
    ))
}

fn result_page(title: &str, text: &str, failed: bool) -> Html<String> {
    let class = if failed { " class=\"error\"" } else { "" };
    page(
        title,
        &format!(
            "<section{class}><h2>{}</h2><pre>{}</pre></section><p><a href=\"/\">← Back to dashboard</a></p>",
            escape(title),
            escape(text),
        ),
    )
}

fn error_page(title: &str, err: &AppError) -> (StatusCode, Html<String>) {
    (err.status_code(), result_page(title, &render_error(err), true))
}

fn turf_options(turfs: &[Turf]) -> String {
    turfs
        .iter()
        .map(|t| {
            format!(
                "<option value=\"{}\">{} ({})</option>",
                t.id,
                escape(&t.name),
                escape(&t.location)
            )
        })
        .collect()
}

/// Dashboard home: catalog, bookings and the three forms.
pub async fn index(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    let service = &state.bookings;
    let (turfs, bookings) = match (service.store().list_turfs().await, service.bookings_text().await) {
        (Ok(turfs), Ok(bookings)) => (turfs, bookings),
        (Err(e), _) | (_, Err(e)) => return error_page("Dashboard unavailable", &e),
    };
    let catalog = crate::render::turf_list(&turfs, service.currency());
    let options = turf_options(&turfs);
    let status = state.agent.status();

    let body = format!(
        "<section><h2>Check availability</h2>\
         <form method=\"post\" action=\"/dashboard/availability\">\
         <label>Turf <select name=\"turf_id\">{options}</select></label>\
         <label>Date <input type=\"date\" name=\"date\" required></label>\
         <button type=\"submit\">Check</button></form></section>\
         <section><h2>Make a booking</h2>\
         <form method=\"post\" action=\"/dashboard/book\">\
         <label>Turf <select name=\"turf_id\">{options}</select></label>\
         <label>Name <input name=\"customer_name\" required></label>\
         <label>Phone <input name=\"customer_phone\" required></label>\
         <label>Date <input type=\"date\" name=\"booking_date\" required></label>\
         <label>Start <input type=\"time\" name=\"start_time\" step=\"60\" required></label>\
         <label>End <input type=\"time\" name=\"end_time\" step=\"60\" required></label>\
         <button type=\"submit\">Book</button></form></section>\
         <section><h2>Ask the assistant</h2>\
         <form method=\"post\" action=\"/dashboard/chat\">\
         <textarea name=\"message\" rows=\"3\" required placeholder=\"Is Green Valley free tomorrow evening?\"></textarea>\
         <p><button type=\"submit\">Send</button></p></form>\
         <p class=\"muted\">Agent initialized: {initialized} · worker running: {alive}</p></section>\
         <section><h2>Turfs</h2><pre>{catalog}</pre></section>\
         <section><h2>Bookings</h2><pre>{bookings}</pre></section>",
        initialized = status.initialized,
        alive = status.worker_alive,
        catalog = escape(&catalog),
        bookings = escape(&bookings),
    );

    (StatusCode::OK, page("Turf Booking Dashboard", &body))
}

pub async fn check_availability(
    State(state): State<AppState>,
    Form(form): Form<AvailabilityForm>,
) -> (StatusCode, Html<String>) {
    match state
        .bookings
        .availability_text(form.turf_id, &form.date)
        .await
    {
        Ok(text) => (StatusCode::OK, result_page("Availability", &text, false)),
        Err(e) => error_page("Availability", &e),
    }
}

pub async fn book(
    State(state): State<AppState>,
    Form(form): Form<BookingForm>,
) -> (StatusCode, Html<String>) {
    let request = NewBooking::from(form);
    match state.bookings.book_text(&request).await {
        Ok(text) => (StatusCode::CREATED, result_page("Booking", &text, false)),
        Err(e) => error_page("Booking", &e),
    }
}

pub async fn chat(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> (StatusCode, Html<String>) {
    let message = form.message.trim().to_string();
    if message.is_empty() {
        return error_page(
            "Assistant",
            &AppError::Validation("Message cannot be empty".to_string()),
        );
    }

    match on_agent(&state.agent, move |agent| agent.send_message(&message)).await {
        Ok(reply) => (StatusCode::OK, result_page("Assistant", &reply, false)),
        Err(e) => error_page("Assistant", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_booking_form_trims_contact_details() {
        let request = NewBooking::from(BookingForm {
            turf_id: 2,
            customer_name: "  Priya ".into(),
            customer_phone: " 9876543210".into(),
            booking_date: "2030-01-02".into(),
            start_time: "10:00".into(),
            end_time: "11:00".into(),
        });
        assert_eq!(request.customer_name, "Priya");
        assert_eq!(request.customer_phone, "9876543210");
    }
}
